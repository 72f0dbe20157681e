//! Integration tests for the weather API client.
//!
//! These tests use wiremock to simulate the geocoding and forecast
//! services and verify parsing and the distinct error cases.

use moodflow::{
    WeatherApiClient, WeatherError,
    config::{NetworkConfig, WeatherConfig},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const GEOCODING_BODY: &str = r#"{
    "results": [
        {"name": "Paris", "latitude": 48.85341, "longitude": 2.3488, "country": "France", "admin1": "Île-de-France"}
    ],
    "generationtime_ms": 0.5
}"#;

const FORECAST_BODY: &str = r#"{
    "latitude": 48.86,
    "longitude": 2.35,
    "daily": {
        "time": ["2025-10-20", "2025-10-21", "2025-10-22", "2025-10-23", "2025-10-24", "2025-10-25", "2025-10-26"],
        "weather_code": [0, 2, 3, 61, 95, 45, 71],
        "temperature_2m_max": [18.2, 17.5, 15.0, 12.3, 14.1, 11.0, 2.5],
        "temperature_2m_min": [9.0, 8.1, 7.7, 6.4, 8.8, 5.0, -1.5]
    }
}"#;

fn client_for(server: &MockServer) -> WeatherApiClient {
    let weather = WeatherConfig {
        geocoding_url: format!("{}/v1/search", server.uri()),
        forecast_url: format!("{}/v1/forecast", server.uri()),
        ..WeatherConfig::default()
    };
    let network = NetworkConfig {
        request_timeout_secs: 10,
        connect_timeout_secs: 5,
    };
    WeatherApiClient::new(&weather, &network).expect("Client creation should succeed")
}

async fn mount_geocoding(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Test geocoding followed by a forecast fetch.
#[tokio::test]
async fn test_fetch_city_forecast_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Paris"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GEOCODING_BODY))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "48.85341"))
        .and(query_param("forecast_days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORECAST_BODY))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let forecast = client.fetch_city_forecast("Paris").await.unwrap();

    assert_eq!(forecast.city_label, "Paris, France");
    assert_eq!(forecast.days.len(), 7);
    assert_eq!(forecast.days[3].weather_code, 61);
    assert_eq!(forecast.days[3].condition().label, "Moderate rain");
    assert_eq!(forecast.days[6].temp_min, -1.5);
}

/// Test that an unknown city is reported as such.
#[tokio::test]
async fn test_city_not_found() {
    let mock_server = MockServer::start().await;
    mount_geocoding(&mock_server, r#"{"generationtime_ms": 0.3}"#).await;

    let client = client_for(&mock_server);
    let result = client.fetch_city_forecast("Atlantis").await;

    match result {
        Err(WeatherError::CityNotFound(city)) => assert_eq!(city, "Atlantis"),
        other => panic!("expected CityNotFound, got {:?}", other),
    }
}

/// Test that an empty city never reaches the server.
#[tokio::test]
async fn test_empty_city_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch_city_forecast("").await;

    assert!(matches!(result, Err(WeatherError::EmptyCity)));
}

/// Test handling of HTTP 500 errors from the forecast service.
#[tokio::test]
async fn test_forecast_server_error() {
    let mock_server = MockServer::start().await;
    mount_geocoding(&mock_server, GEOCODING_BODY).await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch_city_forecast("Paris").await;

    let err = result.unwrap_err();
    assert!(matches!(err, WeatherError::Status { stage: "forecast", .. }));
    assert!(err.to_string().contains("500"), "Error should mention status code");
}

/// Test handling of HTTP errors from the geocoding service.
#[tokio::test]
async fn test_geocoding_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch_city_forecast("Paris").await;

    assert!(matches!(
        result,
        Err(WeatherError::Status {
            stage: "geocoding",
            ..
        })
    ));
}

/// Test a forecast response without daily data.
#[tokio::test]
async fn test_forecast_without_daily_block() {
    let mock_server = MockServer::start().await;
    mount_geocoding(&mock_server, GEOCODING_BODY).await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"latitude": 48.86}"#))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch_city_forecast("Paris").await;

    assert!(matches!(result, Err(WeatherError::EmptyForecast)));
}

/// Test a forecast response with empty daily columns.
#[tokio::test]
async fn test_forecast_with_empty_days() {
    let mock_server = MockServer::start().await;
    mount_geocoding(&mock_server, GEOCODING_BODY).await;

    let body = r#"{"daily": {"time": [], "weather_code": [], "temperature_2m_max": [], "temperature_2m_min": []}}"#;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch_city_forecast("Paris").await;

    assert!(matches!(result, Err(WeatherError::EmptyForecast)));
}

/// Test handling of malformed JSON response.
#[tokio::test]
async fn test_forecast_invalid_json() {
    let mock_server = MockServer::start().await;
    mount_geocoding(&mock_server, GEOCODING_BODY).await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch_city_forecast("Paris").await;

    assert!(matches!(result, Err(WeatherError::Malformed(_))));
}

/// Test that an unreachable server is a request error.
#[tokio::test]
async fn test_connection_refused() {
    let weather = WeatherConfig {
        geocoding_url: "http://127.0.0.1:1/v1/search".to_string(),
        ..WeatherConfig::default()
    };
    let network = NetworkConfig {
        request_timeout_secs: 2,
        connect_timeout_secs: 1,
    };
    let client = WeatherApiClient::new(&weather, &network).unwrap();

    let result = client.geocode("Paris").await;

    assert!(matches!(
        result,
        Err(WeatherError::Request {
            stage: "geocoding",
            ..
        })
    ));
}
