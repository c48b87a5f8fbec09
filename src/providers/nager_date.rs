use super::http::{endpoint, mismatch, parse_json};
use crate::core::{Adapter, FetchError, Holiday, Payload, ProviderSpec, Query};
use chrono::NaiveDate;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

pub struct NagerDateProvider {
    spec: ProviderSpec,
}

impl NagerDateProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PublicHoliday {
    date: NaiveDate,
    local_name: String,
    name: String,
    country_code: String,
    #[serde(default)]
    global: bool,
    #[serde(default)]
    types: Vec<String>,
}

fn no_holidays(country_code: &str, year: i32) -> FetchError {
    FetchError::not_found(format!(
        "No public holidays found for {country_code} in {year}"
    ))
}

impl Adapter for NagerDateProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        let Query::Holidays { country_code, year } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        let year = year.to_string();
        endpoint(
            &self.spec.base_url,
            &["api", "v3", "PublicHolidays", year.as_str(), country_code.as_str()],
        )
    }

    fn classify_status(&self, query: &Query, status: StatusCode) -> FetchError {
        match query {
            Query::Holidays { country_code, year } if status == StatusCode::NOT_FOUND => {
                no_holidays(country_code, *year)
            }
            _ => FetchError::unavailable(format!("HTTP error: {status}")),
        }
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        let Query::Holidays { country_code, year } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        // Unsupported countries answer 204 with an empty body.
        if body.trim().is_empty() {
            return Err(no_holidays(country_code, *year));
        }
        let holidays: Vec<PublicHoliday> = parse_json(self.spec.id, body)?;
        if holidays.is_empty() {
            return Err(no_holidays(country_code, *year));
        }

        Ok(Payload::Holidays(
            holidays
                .into_iter()
                .map(|h| Holiday {
                    date: h.date,
                    local_name: h.local_name,
                    name: h.name,
                    country_code: h.country_code,
                    global: h.global,
                    types: h.types,
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
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/PublicHolidays/2024/KE"))
            .respond_with(response)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_holiday_fetch() {
        let body = r#"[
            {"date": "2024-01-01", "localName": "New Year's Day", "name": "New Year's Day",
             "countryCode": "KE", "fixed": false, "global": true, "counties": null,
             "launchYear": null, "types": ["Public"]},
            {"date": "2024-06-01", "localName": "Madaraka Day", "name": "Madaraka Day",
             "countryCode": "KE", "global": true, "types": ["Public"]}
        ]"#;
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
        let provider = NagerDateProvider::new(mock_spec(ProviderId::Holidays, &mock_server));

        let query = Query::holidays("ke", 2024).unwrap();
        let Payload::Holidays(holidays) = provider.fetch(&client(), &query).await.unwrap() else {
            panic!("Expected holidays payload");
        };
        assert_eq!(holidays.len(), 2);
        assert_eq!(
            holidays[1],
            Holiday {
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                local_name: "Madaraka Day".to_string(),
                name: "Madaraka Day".to_string(),
                country_code: "KE".to_string(),
                global: true,
                types: vec!["Public".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_upstream_404_is_not_found() {
        let mock_server = create_mock_server(ResponseTemplate::new(404)).await;
        let provider = NagerDateProvider::new(mock_spec(ProviderId::Holidays, &mock_server));

        let query = Query::holidays("KE", 2024).unwrap();
        let err = provider.fetch(&client(), &query).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::not_found("No public holidays found for KE in 2024")
        );
    }

    #[tokio::test]
    async fn test_no_content_is_not_found() {
        let mock_server = create_mock_server(ResponseTemplate::new(204)).await;
        let provider = NagerDateProvider::new(mock_spec(ProviderId::Holidays, &mock_server));

        let query = Query::holidays("KE", 2024).unwrap();
        let err = provider.fetch(&client(), &query).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_empty_list_is_not_found() {
        let mock_server =
            create_mock_server(ResponseTemplate::new(200).set_body_string("[]")).await;
        let provider = NagerDateProvider::new(mock_spec(ProviderId::Holidays, &mock_server));

        let query = Query::holidays("KE", 2024).unwrap();
        let err = provider.fetch(&client(), &query).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
