use super::http::{endpoint_with_query, mismatch, parse_json};
use crate::core::{Adapter, CryptoPrice, FetchError, Payload, ProviderSpec, Query};
use reqwest::Url;
use std::collections::HashMap;

pub struct CoinGeckoProvider {
    spec: ProviderSpec,
}

impl CoinGeckoProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec }
    }
}

// {"bitcoin": {"usd": 43250.75}}; unknown ids are simply absent.
type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

impl Adapter for CoinGeckoProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        let Query::CryptoPrice {
            coin_id,
            vs_currency,
        } = query
        else {
            return Err(mismatch(self.spec.id, query));
        };
        endpoint_with_query(
            &self.spec.base_url,
            &["api", "v3", "simple", "price"],
            &[("ids", coin_id.as_str()), ("vs_currencies", vs_currency.as_str())],
        )
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        let Query::CryptoPrice {
            coin_id,
            vs_currency,
        } = query
        else {
            return Err(mismatch(self.spec.id, query));
        };
        let data: SimplePriceResponse = parse_json(self.spec.id, body)?;
        let price = data
            .get(coin_id)
            .ok_or_else(|| FetchError::not_found(format!("Cryptocurrency '{coin_id}' not found")))?
            .get(vs_currency)
            .copied()
            .flatten()
            .ok_or_else(|| {
                FetchError::not_found(format!(
                    "No '{vs_currency}' price for cryptocurrency '{coin_id}'"
                ))
            })?;

        Ok(Payload::Crypto(CryptoPrice {
            coin_id: coin_id.clone(),
            currency: vs_currency.clone(),
            price,
        }))
    }
}
