//! The capability set every upstream integration provides.

use super::error::FetchError;
use super::payload::Payload;
use super::provider::ProviderSpec;
use super::query::Query;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};

#[async_trait]
pub trait Adapter: Send + Sync {
    fn spec(&self) -> &ProviderSpec;

    /// Upstream URL (path and query string) for `query`.
    fn request(&self, query: &Query) -> Result<Url, FetchError>;

    /// Extra request headers, on top of the client-wide ones.
    fn headers(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Maps a non-success status to a failure. Most upstreams only ever
    /// signal trouble this way; those that answer 404 for a missing resource
    /// override this.
    fn classify_status(&self, _query: &Query, status: StatusCode) -> FetchError {
        FetchError::unavailable(format!("HTTP error: {status}"))
    }

    /// Extracts the fields the internal shape needs from a success body.
    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError>;

    /// Performs exactly one bounded upstream call. Never touches shared state.
    async fn fetch(&self, client: &reqwest::Client, query: &Query) -> Result<Payload, FetchError> {
        crate::providers::http::execute(self, client, query).await
    }
}
