//! View state and the user intents that change it.

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    favorites::FavoritesStore,
    model::{CurrentWeather, ForecastSeries},
    provider::{FetchError, WeatherSource},
};

/// The only failure message ever shown to the user.
pub const FETCH_ERROR_MESSAGE: &str =
    "Failed to fetch weather data. Please check the city name and try again";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    pub loading: bool,
    pub error: Option<String>,
}

/// Everything the view reads: query text, last successful lookup, favorites
/// and the loading/error flags.
#[derive(Debug)]
pub struct Dashboard {
    source: Box<dyn WeatherSource>,
    favorites: FavoritesStore,
    query: String,
    current: Option<CurrentWeather>,
    forecast: Option<ForecastSeries>,
    status: Status,
}

impl Dashboard {
    pub fn new(source: Box<dyn WeatherSource>, favorites: FavoritesStore) -> Self {
        Self {
            source,
            favorites,
            query: String::new(),
            current: None,
            forecast: None,
            status: Status::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn current(&self) -> Option<&CurrentWeather> {
        self.current.as_ref()
    }

    pub fn forecast(&self) -> Option<&ForecastSeries> {
        self.forecast.as_ref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    /// Looks up the query text. Blank input is ignored; returns whether a
    /// lookup was started.
    pub async fn submit(&mut self) -> bool {
        let city = self.query.trim().to_string();
        if city.is_empty() {
            return false;
        }
        self.fetch_weather(&city).await;
        true
    }

    /// Fetches current conditions, then the forecast, for `city`.
    ///
    /// Both results become visible together. On any failure the previous
    /// results stay and the status carries [`FETCH_ERROR_MESSAGE`].
    pub async fn fetch_weather(&mut self, city: &str) {
        self.begin_fetch();
        let outcome = fetch_pair(self.source.as_ref(), city).await;
        self.settle(city, outcome);
    }

    /// Re-runs the lookup for the favorite at `index`. Returns `false` when
    /// there is no such favorite.
    pub async fn select_favorite(&mut self, index: usize) -> bool {
        let Some(city) = self.favorites.get(index).map(str::to_string) else {
            return false;
        };
        self.fetch_weather(&city).await;
        true
    }

    /// Toggles `city` in the favorites. Returns the new membership.
    pub fn toggle_favorite(&mut self, city: &str) -> bool {
        self.favorites.toggle(city)
    }

    /// Toggles the city currently on display, if any.
    pub fn toggle_current_favorite(&mut self) -> Option<bool> {
        let name = self.current.as_ref()?.location_name.clone();
        Some(self.favorites.toggle(&name))
    }

    pub fn is_favorite(&self, city: &str) -> bool {
        self.favorites.is_favorite(city)
    }

    /// Marks a lookup as in flight and clears any previous error.
    pub fn begin_fetch(&mut self) {
        self.status = Status {
            loading: true,
            error: None,
        };
    }

    fn settle(
        &mut self,
        city: &str,
        outcome: Result<(CurrentWeather, ForecastSeries), FetchError>,
    ) {
        match outcome {
            Ok((current, forecast)) => {
                debug!(city, samples = forecast.len(), "weather lookup succeeded");
                self.current = Some(current);
                self.forecast = Some(forecast);
                self.query.clear();
            }
            Err(err) => {
                warn!(city, error = %err, "weather lookup failed");
                self.status.error = Some(FETCH_ERROR_MESSAGE.to_string());
            }
        }
        self.status.loading = false;
    }
}

async fn fetch_pair(
    source: &dyn WeatherSource,
    city: &str,
) -> Result<(CurrentWeather, ForecastSeries), FetchError> {
    let current = source.current(city).await?;
    let forecast = source.forecast(city).await?;
    Ok((current, forecast))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{favorites::MemoryStorage, model::ForecastSample};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, Default)]
    struct Calls {
        current: AtomicUsize,
        forecast: AtomicUsize,
    }

    #[derive(Debug)]
    struct FakeSource {
        known_city: &'static str,
        forecast_fails: bool,
        calls: Arc<Calls>,
    }

    fn not_found(endpoint: &'static str) -> FetchError {
        FetchError::Status {
            endpoint,
            status: StatusCode::NOT_FOUND,
            body: "city not found".into(),
        }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn current(&self, city: &str) -> Result<CurrentWeather, FetchError> {
            self.calls.current.fetch_add(1, Ordering::SeqCst);
            if city != self.known_city {
                return Err(not_found("current weather"));
            }
            Ok(CurrentWeather {
                location_name: city.to_string(),
                country: "XX".into(),
                temperature_c: 20.0,
                feels_like_c: 19.0,
                humidity_pct: 40,
                wind_speed_mps: 1.5,
                condition: "few clouds".into(),
            })
        }

        async fn forecast(&self, city: &str) -> Result<ForecastSeries, FetchError> {
            self.calls.forecast.fetch_add(1, Ordering::SeqCst);
            if self.forecast_fails || city != self.known_city {
                return Err(not_found("5-day forecast"));
            }
            Ok(vec![ForecastSample {
                dt: 1_705_276_800,
                temperature_c: 18.0,
                feels_like_c: 17.0,
                humidity_pct: 45,
                wind_speed_mps: 2.0,
                condition: "rain".into(),
            }])
        }
    }

    fn dashboard(known_city: &'static str, forecast_fails: bool) -> (Dashboard, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let source = FakeSource {
            known_city,
            forecast_fails,
            calls: Arc::clone(&calls),
        };
        let favorites = FavoritesStore::open(MemoryStorage::new());
        (Dashboard::new(Box::new(source), favorites), calls)
    }

    #[tokio::test]
    async fn successful_lookup_populates_state_and_clears_query() {
        let (mut dash, calls) = dashboard("Lima", false);
        dash.set_query("  Lima ");

        assert!(dash.submit().await);

        assert_eq!(dash.status(), &Status::default());
        assert_eq!(dash.current().map(|c| c.location_name.as_str()), Some("Lima"));
        assert_eq!(dash.forecast().map(Vec::len), Some(1));
        assert_eq!(dash.query(), "");
        assert_eq!(calls.current.load(Ordering::SeqCst), 1);
        assert_eq!(calls.forecast.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_query_is_ignored() {
        let (mut dash, calls) = dashboard("Lima", false);
        dash.set_query("   ");

        assert!(!dash.submit().await);
        assert_eq!(calls.current.load(Ordering::SeqCst), 0);
        assert_eq!(dash.query(), "   ");
    }

    #[tokio::test]
    async fn failed_current_lookup_skips_forecast_and_keeps_state() {
        let (mut dash, calls) = dashboard("Lima", false);
        dash.fetch_weather("Lima").await;
        let before_current = dash.current().cloned();
        let before_forecast = dash.forecast().cloned();

        dash.set_query("Nowhereville");
        dash.submit().await;

        assert!(!dash.status().loading);
        assert_eq!(dash.status().error.as_deref(), Some(FETCH_ERROR_MESSAGE));
        assert_eq!(dash.current().cloned(), before_current);
        assert_eq!(dash.forecast().cloned(), before_forecast);
        assert_eq!(dash.query(), "Nowhereville");
        assert_eq!(calls.current.load(Ordering::SeqCst), 2);
        assert_eq!(calls.forecast.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_first_lookup_leaves_panels_empty() {
        let (mut dash, _) = dashboard("Lima", false);
        dash.fetch_weather("Atlantis").await;

        assert!(dash.current().is_none());
        assert!(dash.forecast().is_none());
        assert_eq!(dash.status().error.as_deref(), Some(FETCH_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn failed_forecast_fails_whole_lookup() {
        let (mut dash, calls) = dashboard("Lima", true);
        dash.fetch_weather("Lima").await;

        assert!(dash.current().is_none());
        assert!(dash.forecast().is_none());
        assert!(!dash.status().loading);
        assert_eq!(dash.status().error.as_deref(), Some(FETCH_ERROR_MESSAGE));
        assert_eq!(calls.forecast.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn new_lookup_clears_previous_error() {
        let (mut dash, _) = dashboard("Lima", false);
        dash.fetch_weather("Atlantis").await;
        assert!(dash.status().error.is_some());

        dash.fetch_weather("Lima").await;
        assert!(dash.status().error.is_none());
    }

    #[test]
    fn begin_fetch_sets_loading_and_clears_error() {
        let (mut dash, _) = dashboard("Lima", false);
        dash.status.error = Some("old".into());

        dash.begin_fetch();

        assert!(dash.status().loading);
        assert!(dash.status().error.is_none());
    }

    #[tokio::test]
    async fn select_favorite_fetches_that_city() {
        let (mut dash, calls) = dashboard("Lima", false);
        dash.toggle_favorite("Lima");

        assert!(dash.select_favorite(0).await);
        assert_eq!(dash.current().map(|c| c.location_name.as_str()), Some("Lima"));

        assert!(!dash.select_favorite(5).await);
        assert_eq!(calls.current.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn toggle_current_favorite_uses_displayed_city() {
        let (mut dash, _) = dashboard("Lima", false);
        assert_eq!(dash.toggle_current_favorite(), None);

        dash.fetch_weather("Lima").await;
        assert_eq!(dash.toggle_current_favorite(), Some(true));
        assert!(dash.is_favorite("Lima"));
        assert_eq!(dash.toggle_current_favorite(), Some(false));
        assert!(dash.favorites().is_empty());
    }
}
