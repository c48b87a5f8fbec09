use super::http::{endpoint, mismatch, parse_json};
use crate::core::{Adapter, FetchError, IpLocation, Payload, ProviderSpec, Query};
use reqwest::Url;
use serde::Deserialize;

/// Geolocates the address the request leaves from.
pub struct IpApiProvider {
    spec: ProviderSpec,
}

impl IpApiProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec }
    }
}

#[derive(Deserialize, Debug)]
struct IpResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    ip: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    country_code: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
    currency: Option<String>,
}

impl Adapter for IpApiProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        if *query != Query::IpGeolocation {
            return Err(mismatch(self.spec.id, query));
        }
        endpoint(&self.spec.base_url, &["json", ""])
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        if *query != Query::IpGeolocation {
            return Err(mismatch(self.spec.id, query));
        }
        // ipapi.co reports quota and lookup failures in a 200 body.
        let data: IpResponse = parse_json(self.spec.id, body)?;
        if data.error {
            return Err(FetchError::unavailable(format!(
                "ipapi.co error: {}",
                data.reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(Payload::IpLocation(IpLocation {
            ip: data.ip,
            city: data.city,
            region: data.region,
            country: data.country_name,
            country_code: data.country_code,
            latitude: data.latitude,
            longitude: data.longitude,
            timezone: data.timezone,
            currency: data.currency,
        }))
    }
}
