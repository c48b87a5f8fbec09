use super::http::{endpoint, mismatch, parse_json};
use crate::core::{Adapter, CountryInfo, CurrencyInfo, FetchError, Payload, ProviderSpec, Query};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::collections::BTreeMap;

pub struct RestCountriesProvider {
    spec: ProviderSpec,
}

impl RestCountriesProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec }
    }
}

#[derive(Deserialize, Debug, Default)]
struct Name {
    common: Option<String>,
    official: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct Flags {
    png: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Currency {
    name: Option<String>,
    symbol: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Country {
    #[serde(default)]
    name: Name,
    #[serde(default)]
    capital: Vec<String>,
    population: Option<u64>,
    area: Option<f64>,
    region: Option<String>,
    subregion: Option<String>,
    #[serde(default)]
    flags: Flags,
    #[serde(default)]
    currencies: BTreeMap<String, Currency>,
    #[serde(default)]
    languages: BTreeMap<String, String>,
    #[serde(default)]
    timezones: Vec<String>,
    cca2: Option<String>,
}

fn no_country(name: &str) -> FetchError {
    FetchError::not_found(format!("Country '{name}' not found"))
}

impl Adapter for RestCountriesProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        let Query::CountryInfo { name } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        endpoint(&self.spec.base_url, &["v3.1", "name", name.as_str()])
    }

    fn classify_status(&self, query: &Query, status: StatusCode) -> FetchError {
        match query {
            Query::CountryInfo { name } if status == StatusCode::NOT_FOUND => no_country(name),
            _ => FetchError::unavailable(format!("HTTP error: {status}")),
        }
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        let Query::CountryInfo { name } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        let countries: Vec<Country> = parse_json(self.spec.id, body)?;
        // Partial name matches come back in relevance order.
        let country = countries.into_iter().next().ok_or_else(|| no_country(name))?;

        Ok(Payload::Country(Box::new(CountryInfo {
            name: country.name.common,
            official_name: country.name.official,
            capital: country.capital.into_iter().next().unwrap_or_default(),
            population: country.population,
            area: country.area,
            region: country.region,
            subregion: country.subregion,
            flag: country.flags.png,
            currencies: country
                .currencies
                .into_iter()
                .map(|(code, c)| {
                    (
                        code,
                        CurrencyInfo {
                            name: c.name,
                            symbol: c.symbol,
                        },
                    )
                })
                .collect(),
            languages: country.languages,
            timezones: country.timezones,
            code: country.cca2,
        })))
    }
}
