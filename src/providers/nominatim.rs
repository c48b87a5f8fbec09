//! OpenStreetMap Nominatim geocoder.
//!
//! The public instance's usage policy requires an identifying User-Agent and
//! caps clients at one request per second; the spacing is enforced by the
//! aggregator's rate gate from this provider's `min_interval`.

use super::http::{endpoint_with_query, mismatch, parse_json};
use crate::core::{Adapter, FetchError, Location, Payload, ProviderSpec, Query};
use reqwest::Url;
use serde::Deserialize;

pub struct NominatimProvider {
    spec: ProviderSpec,
    user_agent: String,
}

impl NominatimProvider {
    pub fn new(spec: ProviderSpec, user_agent: &str) -> Self {
        Self {
            spec,
            user_agent: user_agent.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct Place {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

fn coordinate(field: &str, raw: &str) -> Result<f64, FetchError> {
    raw.parse()
        .map_err(|_| FetchError::unavailable(format!("Invalid {field} in geocode result: '{raw}'")))
}

impl Adapter for NominatimProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        let Query::Geocode { address } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        endpoint_with_query(
            &self.spec.base_url,
            &["search"],
            &[("q", address.as_str()), ("format", "json"), ("limit", "1")],
        )
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![("User-Agent", self.user_agent.clone())]
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        let Query::Geocode { address } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        let places: Vec<Place> = parse_json(self.spec.id, body)?;
        let place = places.into_iter().next().ok_or_else(|| {
            FetchError::not_found(format!("Location not found for address: {address}"))
        })?;

        Ok(Payload::Location(Location {
            lat: coordinate("lat", &place.lat)?,
            lon: coordinate("lon", &place.lon)?,
            display_name: place.display_name,
        }))
    }
}
