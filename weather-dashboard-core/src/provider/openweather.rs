use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::model::{CurrentWeather, ForecastSample, ForecastSeries};

use super::{FetchError, WeatherSource};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const CURRENT_ENDPOINT: &str = "current weather";
const FORECAST_ENDPOINT: &str = "5-day forecast";

/// Client for the OpenWeather current-conditions and forecast endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        city: &str,
        endpoint: &'static str,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        debug!(%status, bytes = body.len(), "{endpoint} response received");

        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    country: Option<String>,
    sys: Option<OwSys>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwCurrentResponse> for CurrentWeather {
    fn from(parsed: OwCurrentResponse) -> Self {
        let country = parsed
            .country
            .or_else(|| parsed.sys.and_then(|sys| sys.country))
            .unwrap_or_default();

        Self {
            location_name: parsed.name,
            country,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            condition: first_description(&parsed.weather),
        }
    }
}

impl From<OwForecastEntry> for ForecastSample {
    fn from(entry: OwForecastEntry) -> Self {
        Self {
            dt: entry.dt,
            temperature_c: entry.main.temp,
            feels_like_c: entry.main.feels_like,
            humidity_pct: entry.main.humidity,
            wind_speed_mps: entry.wind.speed,
            condition: first_description(&entry.weather),
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current(&self, city: &str) -> Result<CurrentWeather, FetchError> {
        let parsed: OwCurrentResponse = self.get_json("weather", city, CURRENT_ENDPOINT).await?;
        Ok(parsed.into())
    }

    #[instrument(skip(self))]
    async fn forecast(&self, city: &str) -> Result<ForecastSeries, FetchError> {
        let parsed: OwForecastResponse =
            self.get_json("forecast", city, FORECAST_ENDPOINT).await?;
        Ok(parsed.list.into_iter().map(ForecastSample::from).collect())
    }
}

fn first_description(weather: &[OwWeather]) -> String {
    weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_targets_public_endpoint() {
        let client = OpenWeatherClient::new("KEY".into());
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenWeatherClient::with_base_url("KEY".into(), "http://localhost:1234/");
        assert_eq!(client.base_url(), "http://localhost:1234");
    }

    #[test]
    fn current_response_reads_top_level_country() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "name": "Paris",
            "country": "FR",
            "main": { "temp": 15.4, "feels_like": 14.1, "humidity": 60 },
            "wind": { "speed": 3.2 },
            "weather": [{ "description": "clear sky" }]
        }))
        .expect("valid payload");

        let current = CurrentWeather::from(parsed);
        assert_eq!(current.location_name, "Paris");
        assert_eq!(current.country, "FR");
        assert_eq!(current.condition, "clear sky");
        assert_eq!(current.humidity_pct, 60);
    }

    #[test]
    fn current_response_falls_back_to_sys_country() {
        let parsed: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "name": "Oslo",
            "sys": { "country": "NO" },
            "main": { "temp": -3.0, "feels_like": -7.5, "humidity": 91 },
            "wind": { "speed": 5.0 },
            "weather": [{ "description": "light snow" }]
        }))
        .expect("valid payload");

        assert_eq!(CurrentWeather::from(parsed).country, "NO");
    }

    #[test]
    fn empty_weather_array_yields_unknown_condition() {
        let entry: OwForecastEntry = serde_json::from_value(serde_json::json!({
            "dt": 1_705_276_800,
            "main": { "temp": 1.0, "feels_like": 0.0, "humidity": 70 },
            "wind": { "speed": 1.0 },
            "weather": []
        }))
        .expect("valid payload");

        assert_eq!(ForecastSample::from(entry).condition, "Unknown");
    }

    #[test]
    fn missing_main_block_is_a_decode_error() {
        let res = serde_json::from_value::<OwCurrentResponse>(serde_json::json!({
            "name": "Paris",
            "wind": { "speed": 3.2 }
        }));
        assert!(res.is_err());
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(500);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "°".repeat(300);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), 203);
    }
}
