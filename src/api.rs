//! Open-Meteo geocoding and daily forecast client.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{NetworkConfig, WeatherConfig};
use crate::weather::WeatherForecastDay;

/// Errors from looking up a city's forecast. Each failure has its own message.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("enter a city to run the prediction")]
    EmptyCity,
    #[error("city not found: {0}")]
    CityNotFound(String),
    #[error("{stage} request failed: {source}")]
    Request {
        stage: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{stage} service returned error status: {status}")]
    Status {
        stage: &'static str,
        status: StatusCode,
    },
    #[error("weather service returned no forecast days")]
    EmptyForecast,
    #[error("malformed weather data: {0}")]
    Malformed(String),
}

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
}

impl Location {
    /// "Name, Country" or just the name.
    pub fn label(&self) -> String {
        match &self.country {
            Some(country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Location>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyForecast>,
}

/// Column-oriented `daily` block of a forecast response.
#[derive(Debug, Default, Deserialize)]
pub struct DailyForecast {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default, alias = "weathercode")]
    pub weather_code: Vec<Option<i32>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
}

impl DailyForecast {
    /// Convert to one row per day. Days with missing values are dropped.
    pub fn into_days(self) -> Result<Vec<WeatherForecastDay>, WeatherError> {
        let n = self.time.len();
        if self.weather_code.len() != n
            || self.temperature_2m_max.len() != n
            || self.temperature_2m_min.len() != n
        {
            return Err(WeatherError::Malformed(format!(
                "daily columns differ in length: {} dates, {} codes, {} max, {} min",
                n,
                self.weather_code.len(),
                self.temperature_2m_max.len(),
                self.temperature_2m_min.len()
            )));
        }

        let mut days = Vec::with_capacity(n);
        for (i, time) in self.time.iter().enumerate() {
            let date = NaiveDate::parse_from_str(time, "%Y-%m-%d")
                .map_err(|e| WeatherError::Malformed(format!("bad date '{}': {}", time, e)))?;
            if let (Some(weather_code), Some(temp_max), Some(temp_min)) = (
                self.weather_code[i],
                self.temperature_2m_max[i],
                self.temperature_2m_min[i],
            ) {
                days.push(WeatherForecastDay {
                    date,
                    weather_code,
                    temp_max,
                    temp_min,
                });
            }
        }

        if days.is_empty() {
            return Err(WeatherError::EmptyForecast);
        }
        Ok(days)
    }
}

/// Forecast for a resolved city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityForecast {
    pub city_label: String,
    pub location: Location,
    pub days: Vec<WeatherForecastDay>,
}

/// API client for geocoding and daily forecasts.
#[derive(Clone, Debug)]
pub struct WeatherApiClient {
    client: reqwest::Client,
    geocoding_url: String,
    forecast_url: String,
    language: String,
    forecast_days: usize,
}

impl WeatherApiClient {
    /// Create a new API client with configurable timeouts.
    pub fn new(weather_config: &WeatherConfig, network_config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network_config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network_config.connect_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            geocoding_url: weather_config.geocoding_url.clone(),
            forecast_url: weather_config.forecast_url.clone(),
            language: weather_config.language.clone(),
            forecast_days: weather_config.forecast_days,
        })
    }

    /// Resolve a city name to its best match.
    pub async fn geocode(&self, city: &str) -> Result<Location, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyCity);
        }

        let url = build_url(
            &self.geocoding_url,
            &[
                ("name", city.to_string()),
                ("count", "1".to_string()),
                ("language", self.language.clone()),
                ("format", "json".to_string()),
            ],
        )?;
        debug!(%url, "Geocoding city");

        let response: GeocodingResponse = self.get_json(url, "geocoding").await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::CityNotFound(city.to_string()))
    }

    /// Fetch the daily forecast at a location.
    pub async fn fetch_forecast(
        &self,
        location: &Location,
    ) -> Result<Vec<WeatherForecastDay>, WeatherError> {
        let url = build_url(
            &self.forecast_url,
            &[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                (
                    "daily",
                    "weather_code,temperature_2m_max,temperature_2m_min".to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("forecast_days", self.forecast_days.to_string()),
            ],
        )?;
        debug!(%url, "Fetching forecast");

        let response: ForecastResponse = self.get_json(url, "forecast").await?;
        response
            .daily
            .ok_or(WeatherError::EmptyForecast)?
            .into_days()
    }

    /// Geocode `city`, then fetch its forecast.
    pub async fn fetch_city_forecast(&self, city: &str) -> Result<CityForecast, WeatherError> {
        let location = self.geocode(city).await?;
        let days = self.fetch_forecast(&location).await?;
        debug!(city = %location.label(), days = days.len(), "Forecast received");

        Ok(CityForecast {
            city_label: location.label(),
            location,
            days,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        stage: &'static str,
    ) -> Result<T, WeatherError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| WeatherError::Request { stage, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status { stage, status });
        }

        let body = response
            .text()
            .await
            .map_err(|source| WeatherError::Request { stage, source })?;

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::Malformed(format!("{} response: {}", stage, e)))
    }
}

fn build_url(base: &str, params: &[(&str, String)]) -> Result<Url, WeatherError> {
    Url::parse_with_params(base, params)
        .map_err(|e| WeatherError::Malformed(format!("invalid service URL '{}': {}", base, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Daily Forecast Parsing Tests ====================

    fn daily(json: &str) -> DailyForecast {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_into_days_parses_columns() {
        let days = daily(
            r#"{
                "time": ["2025-10-20", "2025-10-21"],
                "weather_code": [0, 61],
                "temperature_2m_max": [18.5, 12.0],
                "temperature_2m_min": [9.1, 7.4]
            }"#,
        )
        .into_days()
        .unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 10, 20).unwrap());
        assert_eq!(days[1].weather_code, 61);
        assert_eq!(days[1].temp_max, 12.0);
        assert_eq!(days[0].temp_min, 9.1);
    }

    #[test]
    fn test_into_days_accepts_legacy_weathercode() {
        let days = daily(
            r#"{"time": ["2025-10-20"], "weathercode": [3],
                "temperature_2m_max": [10.0], "temperature_2m_min": [4.0]}"#,
        )
        .into_days()
        .unwrap();

        assert_eq!(days[0].weather_code, 3);
    }

    #[test]
    fn test_into_days_skips_null_values() {
        let days = daily(
            r#"{"time": ["2025-10-20", "2025-10-21"], "weather_code": [null, 2],
                "temperature_2m_max": [10.0, 11.0], "temperature_2m_min": [4.0, 5.0]}"#,
        )
        .into_days()
        .unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].weather_code, 2);
    }

    #[test]
    fn test_into_days_empty_is_error() {
        assert!(matches!(
            DailyForecast::default().into_days(),
            Err(WeatherError::EmptyForecast)
        ));
    }

    #[test]
    fn test_into_days_length_mismatch_is_malformed() {
        let result = daily(
            r#"{"time": ["2025-10-20", "2025-10-21"], "weather_code": [1],
                "temperature_2m_max": [10.0, 11.0], "temperature_2m_min": [4.0, 5.0]}"#,
        )
        .into_days();

        assert!(matches!(result, Err(WeatherError::Malformed(_))));
    }

    #[test]
    fn test_into_days_bad_date_is_malformed() {
        let result = daily(
            r#"{"time": ["20/10/2025"], "weather_code": [1],
                "temperature_2m_max": [10.0], "temperature_2m_min": [4.0]}"#,
        )
        .into_days();

        assert!(matches!(result, Err(WeatherError::Malformed(_))));
    }

    // ==================== Location Tests ====================

    #[test]
    fn test_location_label() {
        let mut location = Location {
            name: "Lyon".to_string(),
            latitude: 45.75,
            longitude: 4.85,
            country: Some("France".to_string()),
            admin1: None,
        };
        assert_eq!(location.label(), "Lyon, France");

        location.country = None;
        assert_eq!(location.label(), "Lyon");
    }

    #[test]
    fn test_build_url_encodes_params() {
        let url = build_url(
            "https://example.com/v1/search",
            &[("name", "Saint Étienne".to_string())],
        )
        .unwrap();

        assert_eq!(url.query(), Some("name=Saint+%C3%89tienne"));
        assert!(build_url("not a url", &[]).is_err());
    }

    #[test]
    fn test_error_messages_are_distinct() {
        let messages = [
            WeatherError::EmptyCity.to_string(),
            WeatherError::CityNotFound("Atlantis".to_string()).to_string(),
            WeatherError::Status {
                stage: "forecast",
                status: StatusCode::BAD_GATEWAY,
            }
            .to_string(),
            WeatherError::EmptyForecast.to_string(),
        ];

        assert!(messages[1].contains("Atlantis"));
        assert!(messages[2].contains("502"));
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    // ==================== WeatherApiClient Construction Tests ====================

    #[test]
    fn test_api_client_creation() {
        let result = WeatherApiClient::new(&WeatherConfig::default(), &NetworkConfig::default());
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_empty_city_rejected_before_request() {
        let config = WeatherConfig {
            geocoding_url: "http://127.0.0.1:9/unreachable".to_string(),
            ..WeatherConfig::default()
        };
        let client = WeatherApiClient::new(&config, &NetworkConfig::default()).unwrap();

        assert!(matches!(
            client.fetch_city_forecast("   ").await,
            Err(WeatherError::EmptyCity)
        ));
    }
}
