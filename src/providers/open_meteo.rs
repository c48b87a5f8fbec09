use super::http::{endpoint_with_query, mismatch, parse_json};
use crate::core::{Adapter, CurrentWeather, FetchError, Payload, ProviderSpec, Query};
use reqwest::Url;
use serde::Deserialize;

pub struct OpenMeteoProvider {
    spec: ProviderSpec,
}

impl OpenMeteoProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec }
    }
}

#[derive(Deserialize, Debug)]
struct ForecastResponse {
    current_weather: Option<CurrentWeatherBlock>,
}

// Only the three fields we keep; the rest of the block is ignored.
#[derive(Deserialize, Debug)]
struct CurrentWeatherBlock {
    temperature: f64,
    windspeed: f64,
    weathercode: u32,
}

impl Adapter for OpenMeteoProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        let Query::Weather {
            latitude,
            longitude,
        } = query
        else {
            return Err(mismatch(self.spec.id, query));
        };
        let (latitude, longitude) = (latitude.to_string(), longitude.to_string());
        endpoint_with_query(
            &self.spec.base_url,
            &["v1", "forecast"],
            &[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current_weather", "true"),
            ],
        )
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        let Query::Weather {
            latitude,
            longitude,
        } = query
        else {
            return Err(mismatch(self.spec.id, query));
        };
        let data: ForecastResponse = parse_json(self.spec.id, body)?;
        let current = data.current_weather.ok_or_else(|| {
            FetchError::not_found(format!(
                "Weather data not available for {latitude},{longitude}"
            ))
        })?;

        Ok(Payload::Weather(CurrentWeather {
            temperature: current.temperature,
            windspeed: current.windspeed,
            weathercode: current.weathercode,
        }))
    }
}
