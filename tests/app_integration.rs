use feedgate::core::{
    Aggregator, AppConfig, CarbonInput, Envelope, FetchError, Payload, ProviderId, Query,
};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(
        url_path: &str,
        status: u16,
        mock_response: &str,
        expected_calls: u64,
    ) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .expect(expected_calls)
            .mount(&mock_server)
            .await;

        mock_server
    }

    /// Writes a config pointing each `(provider, server)` pair at its mock.
    pub fn write_config(
        dir: &std::path::Path,
        environment: &str,
        servers: &[(&str, &MockServer)],
    ) -> std::path::PathBuf {
        let mut yaml = format!(
            "environment: {environment}\nuser_agent: \"feedgate-tests/1.0 (ops@example.org)\"\nproviders:\n"
        );
        for (provider, server) in servers {
            yaml.push_str(&format!("  {provider}:\n    base_url: \"{}\"\n", server.uri()));
        }
        let config_path = dir.join("config.yaml");
        std::fs::write(&config_path, yaml).unwrap();
        config_path
    }
}

const WEATHER_RESPONSE: &str = r#"{
    "latitude": -1.25,
    "longitude": 36.75,
    "current_weather": {"temperature": 22.5, "windspeed": 10.2, "weathercode": 0, "time": "2024-01-01T12:00"}
}"#;

#[test_log::test(tokio::test)]
async fn test_weather_is_fetched_once_and_served_from_cache() {
    let mock_server =
        test_utils::create_mock_server("/v1/forecast", 200, WEATHER_RESPONSE, 1).await;
    let temp_dir = TempDir::new().unwrap();
    let config_path =
        test_utils::write_config(temp_dir.path(), "production", &[("weather", &mock_server)]);

    let config = AppConfig::load_from_path(&config_path).unwrap();
    let aggregator = Aggregator::from_config(&config).unwrap();
    assert_eq!(
        aggregator.spec(ProviderId::Weather).unwrap().ttl,
        Duration::from_secs(1800)
    );

    let query = Query::weather(-1.286389, 36.817223).unwrap();
    let first = aggregator.fetch(&query).await.unwrap();
    let second = aggregator.fetch(&query).await.unwrap();
    info!(?first, "Weather fetched");

    assert_eq!(first, second);
    let Payload::Weather(weather) = first else {
        panic!("Expected weather payload");
    };
    assert_eq!(weather.temperature, 22.5);
    assert_eq!(weather.weathercode, 0);
    // `expect(1)` on the mock is verified when the server drops.
}

#[test_log::test(tokio::test)]
async fn test_failing_provider_is_isolated() {
    let crypto_server =
        test_utils::create_mock_server("/api/v3/simple/price", 500, "", 1).await;
    let weather_server =
        test_utils::create_mock_server("/v1/forecast", 200, WEATHER_RESPONSE, 1).await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(
        temp_dir.path(),
        "development",
        &[("crypto_price", &crypto_server), ("weather", &weather_server)],
    );

    let config = AppConfig::load_from_path(&config_path).unwrap();
    let aggregator = Aggregator::from_config(&config).unwrap();

    let crypto = Query::crypto_price("bitcoin", "usd").unwrap();
    let weather = Query::weather(-1.286389, 36.817223).unwrap();
    let (crypto, weather) = tokio::join!(
        aggregator.fetch_envelope(&crypto),
        aggregator.fetch_envelope(&weather)
    );

    assert_eq!(crypto.status(), 500);
    let Envelope::Failure { detail, .. } = crypto else {
        panic!("Expected failure envelope");
    };
    assert!(detail.contains("500"), "development detail: {detail}");
    assert_eq!(weather.status(), 200);
}

#[test_log::test(tokio::test)]
async fn test_not_found_is_not_cached_end_to_end() {
    let mock_server =
        test_utils::create_mock_server("/api/v3/simple/price", 200, "{}", 2).await;
    let temp_dir = TempDir::new().unwrap();
    let config_path =
        test_utils::write_config(temp_dir.path(), "production", &[("crypto_price", &mock_server)]);

    let config = AppConfig::load_from_path(&config_path).unwrap();
    let aggregator = Aggregator::from_config(&config).unwrap();
    let query = Query::crypto_price("notacoin", "usd").unwrap();

    for _ in 0..2 {
        assert_eq!(
            aggregator.fetch(&query).await,
            Err(FetchError::not_found("Cryptocurrency 'notacoin' not found"))
        );
    }
}

#[test_log::test(tokio::test)]
async fn test_geocode_sends_configured_user_agent() {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Nairobi, Kenya"))
        .and(header("User-Agent", "feedgate-tests/1.0 (ops@example.org)"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"lat": "-1.2832533", "lon": "36.8172449", "display_name": "Nairobi, Kenya"}]"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let config_path =
        test_utils::write_config(temp_dir.path(), "production", &[("geocode", &mock_server)]);

    let config = AppConfig::load_from_path(&config_path).unwrap();
    let aggregator = Aggregator::from_config(&config).unwrap();

    // Differently spelled, same cache slot.
    let a = Query::geocode("Nairobi, Kenya").unwrap();
    let b = Query::geocode("nairobi,   KENYA").unwrap();
    aggregator.fetch(&a).await.unwrap();
    let location = aggregator.fetch(&b).await.unwrap();
    assert!(matches!(location, Payload::Location(l) if l.lat < 0.0));
}

#[test_log::test(tokio::test)]
async fn test_run_fetch_command_with_config() {
    let mock_server =
        test_utils::create_mock_server("/v1/forecast", 200, WEATHER_RESPONSE, 1).await;
    let temp_dir = TempDir::new().unwrap();
    let config_path =
        test_utils::write_config(temp_dir.path(), "production", &[("weather", &mock_server)]);

    let command = feedgate::AppCommand::Fetch {
        provider: ProviderId::Weather,
        params: vec!["lat=-1.286389".to_string(), "lon=36.817223".to_string()],
    };
    let result = feedgate::run_command(command, config_path.to_str()).await;
    assert!(result.is_ok(), "{result:?}");
}

#[test_log::test(tokio::test)]
async fn test_run_fetch_command_fails_on_not_found() {
    let mock_server = test_utils::create_mock_server(
        "/v3.1/name/Atlantis",
        404,
        r#"{"status": 404, "message": "Not Found"}"#,
        1,
    )
    .await;
    let temp_dir = TempDir::new().unwrap();
    let config_path =
        test_utils::write_config(temp_dir.path(), "production", &[("country_info", &mock_server)]);

    let command = feedgate::AppCommand::Fetch {
        provider: ProviderId::CountryInfo,
        params: vec!["name=Atlantis".to_string()],
    };
    let err = feedgate::run_command(command, config_path.to_str())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("status 404"), "{err}");
}

#[test_log::test(tokio::test)]
async fn test_run_fetch_command_rejects_bad_params_without_calling_upstream() {
    let mock_server = test_utils::create_mock_server("/v1/forecast", 200, "{}", 0).await;
    let temp_dir = TempDir::new().unwrap();
    let config_path =
        test_utils::write_config(temp_dir.path(), "production", &[("weather", &mock_server)]);

    let command = feedgate::AppCommand::Fetch {
        provider: ProviderId::Weather,
        params: vec!["lat=95".to_string(), "lon=0".to_string()],
    };
    let err = feedgate::run_command(command, config_path.to_str())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("latitude"), "{err:#}");
}

#[test_log::test(tokio::test)]
async fn test_run_providers_command() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "environment: development\n").unwrap();

    feedgate::run_command(feedgate::AppCommand::Providers, config_path.to_str())
        .await
        .unwrap();
}

#[test_log::test(tokio::test)]
async fn test_run_carbon_command_ignores_config() {
    let input = CarbonInput {
        electricity_kwh: 1000.0,
        fuel_liters: 50.0,
        flights_km: 5000.0,
        ..Default::default()
    };

    // An unreadable config would fail any command that loads it.
    let command = feedgate::AppCommand::Carbon { input, json: true };
    feedgate::run_command(command, Some("/nonexistent/config.yaml"))
        .await
        .unwrap();
}

#[test_log::test(tokio::test)]
async fn test_run_carbon_command_rejects_negative_input() {
    let command = feedgate::AppCommand::Carbon {
        input: CarbonInput {
            fuel_liters: -5.0,
            ..Default::default()
        },
        json: false,
    };
    let err = feedgate::run_command(command, Some("/nonexistent/config.yaml"))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("fuel_liters"), "{err:#}");
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_an_error() {
    let err = feedgate::run_command(
        feedgate::AppCommand::Providers,
        Some("/nonexistent/config.yaml"),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
