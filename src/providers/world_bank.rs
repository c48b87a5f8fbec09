use super::http::{endpoint_with_query, mismatch, parse_json};
use crate::core::{Adapter, FetchError, MacroPoint, Payload, ProviderSpec, Query};
use reqwest::Url;
use serde::Deserialize;

pub struct WorldBankProvider {
    spec: ProviderSpec,
}

impl WorldBankProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec }
    }
}

#[derive(Deserialize, Debug)]
struct Labelled {
    value: Option<String>,
}

#[derive(Deserialize, Debug)]
struct DataPoint {
    date: String,
    value: Option<f64>,
    country: Option<Labelled>,
    indicator: Option<Labelled>,
}

impl Adapter for WorldBankProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        let Query::MacroIndicator {
            country,
            indicator,
            date_range,
        } = query
        else {
            return Err(mismatch(self.spec.id, query));
        };
        let date = date_range
            .as_ref()
            .map(|(start, end)| format!("{start}:{end}"));
        let mut params = Vec::with_capacity(3);
        if let Some(date) = date.as_deref() {
            params.push(("date", date));
        }
        params.push(("format", "json"));
        params.push(("per_page", "100"));

        endpoint_with_query(
            &self.spec.base_url,
            &["v2", "country", country.as_str(), "indicator", indicator.as_str()],
            &params,
        )
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        let Query::MacroIndicator {
            country, indicator, ..
        } = query
        else {
            return Err(mismatch(self.spec.id, query));
        };
        let not_found = || {
            FetchError::not_found(format!(
                "No data found for indicator {indicator} in {country}"
            ))
        };

        // `[metadata, points]` on success; a bare `[{"message": ...}]` for
        // unknown countries or indicators.
        let mut parts: Vec<serde_json::Value> = parse_json(self.spec.id, body)?;
        if parts.len() < 2 {
            return Err(not_found());
        }
        let points: Option<Vec<DataPoint>> = serde_json::from_value(parts.swap_remove(1))
            .map_err(|e| {
                FetchError::unavailable(format!(
                    "Failed to parse JSON response for {}: {e}",
                    self.spec.id
                ))
            })?;
        let points = points.filter(|p| !p.is_empty()).ok_or_else(not_found)?;

        Ok(Payload::Macro(
            points
                .into_iter()
                .map(|p| MacroPoint {
                    date: p.date,
                    value: p.value,
                    country: p.country.and_then(|c| c.value),
                    indicator: p.indicator.and_then(|i| i.value),
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProviderId;
    use crate::providers::testing::{client, mock_spec};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GDP_PATH: &str = "/v2/country/KE/indicator/NY.GDP.MKTP.CD";

    #[tokio::test]
    async fn test_successful_indicator_fetch_with_range() {
        let body = r#"[
            {"page": 1, "pages": 1, "per_page": 100, "total": 2},
            [
                {"indicator": {"id": "NY.GDP.MKTP.CD", "value": "GDP (current US$)"},
                 "country": {"id": "KE", "value": "Kenya"},
                 "date": "2023", "value": 107440000000.0},
                {"indicator": {"id": "NY.GDP.MKTP.CD", "value": "GDP (current US$)"},
                 "country": {"id": "KE", "value": "Kenya"},
                 "date": "2022", "value": null}
            ]
        ]"#;
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(GDP_PATH))
            .and(query_param("date", "2022:2023"))
            .and(query_param("format", "json"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
        let provider = WorldBankProvider::new(mock_spec(ProviderId::MacroIndicator, &mock_server));

        let query =
            Query::macro_indicator("ke", "ny.gdp.mktp.cd", Some("2022"), Some("2023")).unwrap();
        let result = provider.fetch(&client(), &query).await.unwrap();
        let Payload::Macro(points) = result else {
            panic!("Expected macro payload");
        };
        assert_eq!(points.len(), 2);
        assert_eq!(
            points[0],
            MacroPoint {
                date: "2023".to_string(),
                value: Some(107440000000.0),
                country: Some("Kenya".to_string()),
                indicator: Some("GDP (current US$)".to_string()),
            }
        );
        assert_eq!(points[1].value, None);
    }

    #[tokio::test]
    async fn test_request_without_range_omits_date() {
        let spec = ProviderSpec::default_for(ProviderId::MacroIndicator);
        let provider = WorldBankProvider::new(spec);
        let query = Query::macro_indicator("KE", "SP.POP.TOTL", None, None).unwrap();

        let url = provider.request(&query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.worldbank.org/v2/country/KE/indicator/SP.POP.TOTL?format=json&per_page=100"
        );
    }

    async fn assert_not_found(body: &str) {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(GDP_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
        let provider = WorldBankProvider::new(mock_spec(ProviderId::MacroIndicator, &mock_server));

        let query = Query::macro_indicator("KE", "NY.GDP.MKTP.CD", None, None).unwrap();
        let err = provider.fetch(&client(), &query).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::not_found("No data found for indicator NY.GDP.MKTP.CD in KE"),
            "body: {body}"
        );
    }

    #[tokio::test]
    async fn test_single_element_response_is_not_found() {
        assert_not_found(r#"[{"message": [{"id": "120", "value": "Invalid value"}]}]"#).await;
    }

    #[tokio::test]
    async fn test_null_data_is_not_found() {
        assert_not_found(r#"[{"page": 0, "total": 0}, null]"#).await;
    }

    #[tokio::test]
    async fn test_empty_data_is_not_found() {
        assert_not_found(r#"[{"page": 1, "total": 0}, []]"#).await;
    }
}
