use crate::config::toml_config::WeatherConfig;
use crate::domain::model::{Location, WeatherReading};
use crate::domain::ports::ConditionSource;
use crate::utils::error::{Result, StormError};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use url::Url;

/// Open-Meteo 回傳的 `current` 時間格式（當地時間，無秒數）
const OPEN_METEO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentConditions {
    time: Option<String>,
    #[serde(default, deserialize_with = "lenient_millimetres")]
    rain: Option<f64>,
    #[serde(default, deserialize_with = "lenient_millimetres")]
    precipitation: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// 接受數字或數字字串（如 "0.4"）；空字串與 null 視為缺值
fn lenient_millimetres<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid millimetre value '{}': {}", text, e)))
        }
    }
}

/// Current-conditions lookup against the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    client: Client,
    endpoint: Url,
}

impl OpenMeteoSource {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| StormError::ConfigValidationError {
            field: "weather.endpoint".to_string(),
            message: format!("Invalid URL: {}", e),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| StormError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, endpoint })
    }

    fn request_url(&self, location: &Location) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("latitude", &location.latitude.to_string())
            .append_pair("longitude", &location.longitude.to_string())
            .append_pair("current", "precipitation,rain")
            .append_pair("timezone", &location.timezone);
        url
    }

    fn parse_reading(location: &Location, body: &str) -> Result<WeatherReading> {
        let parsed: ForecastResponse =
            serde_json::from_str(body).map_err(|e| StormError::WeatherUnavailable {
                message: format!("Unparseable weather response: {}", e),
            })?;

        // 缺少欄位或為 null 時視為 0 mm
        let current = parsed.current.unwrap_or_default();
        let rain = current.rain.unwrap_or(0.0);
        let precipitation = current.precipitation.unwrap_or(0.0);

        let observed_at = current.time.as_deref().and_then(|time| {
            NaiveDateTime::parse_from_str(time, OPEN_METEO_TIME_FORMAT)
                .map_err(|e| {
                    tracing::debug!("Ignoring unrecognised observation time '{}': {}", time, e);
                })
                .ok()
        });

        Ok(WeatherReading::from_measurements(
            location.name.clone(),
            rain,
            precipitation,
            observed_at,
        ))
    }
}

#[async_trait]
impl ConditionSource for OpenMeteoSource {
    async fn current(&self, location: &Location) -> Result<WeatherReading> {
        let url = self.request_url(location);
        tracing::debug!("Making weather request to: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StormError::WeatherUnavailable {
                message: format!("Request failed: {}", e),
            })?;

        tracing::debug!("Weather response status: {}", response.status());

        let response = response
            .error_for_status()
            .map_err(|e| StormError::WeatherUnavailable {
                message: format!("Weather API returned an error: {}", e),
            })?;

        let body = response
            .text()
            .await
            .map_err(|e| StormError::WeatherUnavailable {
                message: format!("Failed to read weather response: {}", e),
            })?;

        let reading = Self::parse_reading(location, &body)?;
        tracing::info!(
            "🌦️ {}: rain={:.2} mm, precip={:.2} mm → raining={}",
            reading.location,
            reading.rain_mm,
            reading.precipitation_mm,
            reading.is_raining()
        );

        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Condition;
    use httpmock::prelude::*;

    fn config_for(server: &MockServer) -> WeatherConfig {
        WeatherConfig {
            endpoint: server.url("/v1/forecast"),
            timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn test_rain_reported() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/forecast")
                .query_param("latitude", "21.3069")
                .query_param("longitude", "-157.8583")
                .query_param("current", "precipitation,rain")
                .query_param("timezone", "Pacific/Honolulu");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "latitude": 21.3,
                    "longitude": -157.875,
                    "current": {"time": "2026-10-18T09:45", "interval": 900, "precipitation": 0.4, "rain": 0.4}
                }));
        });

        let source = OpenMeteoSource::new(&config_for(&server)).unwrap();
        let reading = source.current(&Location::default()).await.unwrap();

        api_mock.assert();
        assert_eq!(reading.condition, Condition::Rain);
        assert_eq!(reading.location, "Honolulu, HI");
        assert!(reading.observed_at.is_some());
    }

    #[tokio::test]
    async fn test_dry_weather_reported() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/v1/forecast");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "current": {"time": "2026-10-18T09:45", "precipitation": 0.0, "rain": 0.0}
                }));
        });

        let source = OpenMeteoSource::new(&config_for(&server)).unwrap();
        let reading = source.current(&Location::default()).await.unwrap();

        api_mock.assert();
        assert!(!reading.is_raining());
    }

    #[tokio::test]
    async fn test_null_and_missing_fields_count_as_zero() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/forecast");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"current": {"rain": null}}));
        });

        let source = OpenMeteoSource::new(&config_for(&server)).unwrap();
        let reading = source.current(&Location::default()).await.unwrap();

        assert!(!reading.is_raining());
        assert_eq!(reading.rain_mm, 0.0);
        assert_eq!(reading.precipitation_mm, 0.0);
        assert!(reading.observed_at.is_none());
    }

    #[tokio::test]
    async fn test_missing_current_object_counts_as_dry() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/v1/forecast");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"latitude": 21.3, "longitude": -157.875}));
        });

        let source = OpenMeteoSource::new(&config_for(&server)).unwrap();
        let reading = source.current(&Location::default()).await.unwrap();

        api_mock.assert();
        assert!(!reading.is_raining());
        assert_eq!(reading.rain_mm, 0.0);
        assert_eq!(reading.precipitation_mm, 0.0);
    }

    #[tokio::test]
    async fn test_numeric_strings_are_accepted() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/forecast");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "current": {"time": "2026-10-18T09:45", "rain": "0.4", "precipitation": ""}
                }));
        });

        let source = OpenMeteoSource::new(&config_for(&server)).unwrap();
        let reading = source.current(&Location::default()).await.unwrap();

        assert!(reading.is_raining());
        assert_eq!(reading.rain_mm, 0.4);
        assert_eq!(reading.precipitation_mm, 0.0);
    }

    #[test]
    fn test_non_numeric_string_is_unparseable() {
        let body = r#"{"current": {"rain": "heavy"}}"#;
        let result = OpenMeteoSource::parse_reading(&Location::default(), body);

        assert!(matches!(result, Err(StormError::WeatherUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_server_error_is_weather_unavailable() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/v1/forecast");
            then.status(500);
        });

        let source = OpenMeteoSource::new(&config_for(&server)).unwrap();
        let result = source.current(&Location::default()).await;

        api_mock.assert();
        assert!(matches!(result, Err(StormError::WeatherUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_non_json_body_is_weather_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/forecast");
            then.status(200).body("<html>maintenance</html>");
        });

        let source = OpenMeteoSource::new(&config_for(&server)).unwrap();
        let result = source.current(&Location::default()).await;

        match result {
            Err(StormError::WeatherUnavailable { message }) => {
                assert!(message.contains("Unparseable"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = WeatherConfig {
            endpoint: "not a url".to_string(),
            timeout_seconds: 10,
        };
        assert!(OpenMeteoSource::new(&config).is_err());
    }
}
