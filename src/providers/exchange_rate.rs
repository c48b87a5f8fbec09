use super::http::{endpoint_with_query, mismatch, parse_json};
use crate::core::{Adapter, FetchError, Payload, ProviderSpec, Query};
use reqwest::Url;
use serde::Deserialize;
use std::collections::BTreeMap;

pub struct ExchangeRateProvider {
    spec: ProviderSpec,
}

impl ExchangeRateProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec }
    }
}

#[derive(Deserialize, Debug)]
struct RatesResponse {
    success: Option<bool>,
    error: Option<serde_json::Value>,
    rates: Option<BTreeMap<String, f64>>,
}

impl Adapter for ExchangeRateProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        let Query::ExchangeRates { base, symbols } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        let symbols = symbols.join(",");
        endpoint_with_query(
            &self.spec.base_url,
            &["latest"],
            &[("base", base.as_str()), ("symbols", symbols.as_str())],
        )
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        let Query::ExchangeRates { base, symbols } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        let data: RatesResponse = parse_json(self.spec.id, body)?;
        if data.success == Some(false) {
            let reason = data.error.map(|e| e.to_string()).unwrap_or_default();
            return Err(FetchError::unavailable(format!(
                "exchangerate.host rejected request: {reason}"
            )));
        }
        let rates = data
            .rates
            .ok_or_else(|| FetchError::unavailable("Response has no 'rates' object"))?;
        if rates.is_empty() {
            return Err(FetchError::not_found(format!(
                "No exchange rates found for {base} -> {}",
                symbols.join(",")
            )));
        }
        Ok(Payload::Rates(rates))
    }
}
