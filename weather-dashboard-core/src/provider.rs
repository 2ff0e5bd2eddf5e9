use crate::model::{CurrentWeather, ForecastSeries};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Why a single upstream request did not produce usable data.
///
/// The dashboard collapses every variant into one user-facing message; the
/// variants exist so the cause can be logged.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("failed to parse {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of current conditions and the 5-day forecast for a city name.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<CurrentWeather, FetchError>;

    async fn forecast(&self, city: &str) -> Result<ForecastSeries, FetchError>;
}
