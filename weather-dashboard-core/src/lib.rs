//! Core library for the `weather-dashboard` CLI.
//!
//! This crate defines:
//! - Configuration (API key, upstream URL, favorites location)
//! - The OpenWeather client behind the [`WeatherSource`] trait
//! - The persisted favorites store
//! - Dashboard state, the forecast day reducer and the view model
//!
//! It is used by `weather-dashboard-cli`, but any front end can drive a
//! [`Dashboard`] and render it with [`view::render`].

pub mod config;
pub mod dashboard;
pub mod favorites;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod view;

pub use config::Config;
pub use dashboard::{Dashboard, FETCH_ERROR_MESSAGE, Status};
pub use favorites::{FavoritesStorage, FavoritesStore, JsonFileStorage, MemoryStorage};
pub use forecast::{MAX_FORECAST_DAYS, forecast_days};
pub use model::{CurrentWeather, ForecastSample, ForecastSeries};
pub use provider::{FetchError, OpenWeatherClient, WeatherSource};
pub use view::{View, render};

/// Builds a dashboard wired to OpenWeather and the on-disk favorites slot
/// described by `config`.
pub fn dashboard_from_config(config: &Config) -> anyhow::Result<Dashboard> {
    let client = OpenWeatherClient::with_base_url(config.api_key(), config.base_url());
    let favorites = FavoritesStore::open(JsonFileStorage::new(config.favorites_path()?));
    Ok(Dashboard::new(Box::new(client), favorites))
}
