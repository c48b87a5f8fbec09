//! Open Library: one host serving two providers with different cache
//! lifetimes, book-by-ISBN lookups and free-text search.

use super::http::{endpoint_with_query, mismatch, parse_json};
use crate::core::{Adapter, Book, BookSummary, FetchError, Payload, ProviderSpec, Query};
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, Debug)]
struct Named {
    name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct Cover {
    large: Option<String>,
}

#[derive(Deserialize, Debug)]
struct BookRecord {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<Named>,
    #[serde(default)]
    cover: Cover,
    #[serde(default)]
    publishers: Vec<Named>,
    publish_date: Option<String>,
    #[serde(default)]
    subjects: Vec<Named>,
    url: Option<String>,
}

fn names(items: Vec<Named>) -> Vec<String> {
    items.into_iter().filter_map(|n| n.name).collect()
}

pub struct OpenLibraryBookProvider {
    spec: ProviderSpec,
}

impl OpenLibraryBookProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec }
    }
}

impl Adapter for OpenLibraryBookProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        let Query::BookByIsbn { isbn } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        let bibkey = format!("ISBN:{isbn}");
        endpoint_with_query(
            &self.spec.base_url,
            &["api", "books"],
            &[
                ("bibkeys", bibkey.as_str()),
                ("format", "json"),
                ("jscmd", "data"),
            ],
        )
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        let Query::BookByIsbn { isbn } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        // Keyed by the requested bibkey; unknown ISBNs yield `{}`.
        let mut books: HashMap<String, BookRecord> = parse_json(self.spec.id, body)?;
        let book = books
            .remove(&format!("ISBN:{isbn}"))
            .ok_or_else(|| FetchError::not_found(format!("Book with ISBN {isbn} not found")))?;

        Ok(Payload::Book(Book {
            title: book.title,
            authors: names(book.authors),
            cover: book.cover.large,
            publishers: names(book.publishers),
            publish_date: book.publish_date,
            subjects: names(book.subjects),
            url: book.url,
        }))
    }
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Deserialize, Debug)]
struct SearchDoc {
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
    first_publish_year: Option<i32>,
    #[serde(default)]
    isbn: Vec<String>,
    key: Option<String>,
}

pub struct OpenLibrarySearchProvider {
    spec: ProviderSpec,
}

impl OpenLibrarySearchProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec }
    }
}

impl Adapter for OpenLibrarySearchProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        let Query::BookSearch { query: text, limit } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        let limit = limit.to_string();
        endpoint_with_query(
            &self.spec.base_url,
            &["search.json"],
            &[("q", text.as_str()), ("limit", limit.as_str())],
        )
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        let Query::BookSearch { query: text, .. } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        let data: SearchResponse = parse_json(self.spec.id, body)?;
        if data.docs.is_empty() {
            return Err(FetchError::not_found(format!(
                "No books found for query: {text}"
            )));
        }

        Ok(Payload::Books(
            data.docs
                .into_iter()
                .map(|doc| BookSummary {
                    title: doc.title,
                    authors: doc.author_name,
                    first_publish_year: doc.first_publish_year,
                    isbn: doc.isbn.into_iter().next().unwrap_or_default(),
                    key: doc.key,
                })
                .collect(),
        ))
    }
}
