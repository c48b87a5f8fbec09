use super::http::{endpoint_with_query, mismatch, parse_json};
use crate::core::{
    Adapter, AirQualityStation, Coordinates, FetchError, Measurement, Payload, ProviderSpec, Query,
};
use reqwest::Url;
use serde::Deserialize;

pub struct OpenAqProvider {
    spec: ProviderSpec,
}

impl OpenAqProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec }
    }
}

#[derive(Deserialize, Debug)]
struct LatestResponse {
    #[serde(default)]
    results: Vec<Station>,
}

#[derive(Deserialize, Debug)]
struct Station {
    location: Option<String>,
    city: Option<String>,
    country: Option<String>,
    coordinates: Option<RawCoordinates>,
    #[serde(default)]
    measurements: Vec<RawMeasurement>,
}

#[derive(Deserialize, Debug)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawMeasurement {
    parameter: String,
    value: f64,
    unit: String,
    last_updated: Option<String>,
}

impl Adapter for OpenAqProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        let Query::AirQuality {
            country_code,
            limit,
        } = query
        else {
            return Err(mismatch(self.spec.id, query));
        };
        let limit = limit.to_string();
        endpoint_with_query(
            &self.spec.base_url,
            &["v2", "latest"],
            &[("limit", limit.as_str()), ("country", country_code.as_str())],
        )
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        let Query::AirQuality { country_code, .. } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        let data: LatestResponse = parse_json(self.spec.id, body)?;
        if data.results.is_empty() {
            return Err(FetchError::not_found(format!(
                "No air quality stations found for {country_code}"
            )));
        }

        Ok(Payload::AirQuality(
            data.results
                .into_iter()
                .map(|s| AirQualityStation {
                    location: s.location,
                    city: s.city,
                    country: s.country,
                    coordinates: s.coordinates.map(|c| Coordinates {
                        latitude: c.latitude,
                        longitude: c.longitude,
                    }),
                    measurements: s
                        .measurements
                        .into_iter()
                        .map(|m| Measurement {
                            parameter: m.parameter,
                            value: m.value,
                            unit: m.unit,
                            last_updated: m.last_updated,
                        })
                        .collect(),
                })
                .collect(),
        ))
    }
}
