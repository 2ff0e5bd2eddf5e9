use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of current conditions for a city, in metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location_name: String,
    /// ISO country code; empty when the upstream response omits it.
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub condition: String,
}

/// One 3-hour sample of the 5-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Unix timestamp (seconds) the sample refers to.
    pub dt: i64,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub condition: String,
}

impl ForecastSample {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.dt, 0).single()
    }
}

/// Chronological forecast samples as returned upstream.
pub type ForecastSeries = Vec<ForecastSample>;
