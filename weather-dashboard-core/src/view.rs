//! Pure projection of [`Dashboard`] state into what the terminal shows.

use chrono::TimeZone;
use serde::Serialize;
use std::fmt::{self, Display};

use crate::{
    dashboard::Dashboard,
    forecast::{MAX_FORECAST_DAYS, forecast_days},
    model::{CurrentWeather, ForecastSample},
};

pub const TITLE: &str = "Weather Dashboard";
pub const SEARCH_PLACEHOLDER: &str = "Enter city name...";
pub const SEARCH_LABEL: &str = "Search";
pub const SEARCHING_LABEL: &str = "Searching...";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub search: SearchBar,
    pub error: Option<String>,
    /// Favorite chips; empty means the section is hidden.
    pub favorites: Vec<String>,
    pub current: Option<CurrentPanel>,
    pub forecast: Option<ForecastPanel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchBar {
    pub query: String,
    pub placeholder: &'static str,
    pub button_label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPanel {
    pub city: String,
    pub title: String,
    pub temperature: String,
    pub condition: String,
    pub is_favorite: bool,
    pub wind: String,
    pub humidity: String,
    pub feels_like: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPanel {
    pub days: Vec<ForecastCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastCard {
    /// e.g. "Mon, Jan 15"
    pub label: String,
    pub temperature: String,
    pub condition: String,
}

/// Builds the view for `dashboard`, bucketing forecast days in `tz`.
pub fn render<Tz>(dashboard: &Dashboard, tz: &Tz) -> View
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let status = dashboard.status();

    View {
        search: SearchBar {
            query: dashboard.query().to_string(),
            placeholder: SEARCH_PLACEHOLDER,
            button_label: if status.loading {
                SEARCHING_LABEL
            } else {
                SEARCH_LABEL
            },
            enabled: !status.loading,
        },
        error: status.error.clone(),
        favorites: dashboard.favorites().list().to_vec(),
        current: dashboard
            .current()
            .map(|current| current_panel(current, dashboard.is_favorite(&current.location_name))),
        forecast: dashboard.forecast().map(|series| ForecastPanel {
            days: forecast_days(series, tz)
                .into_iter()
                .map(|sample| forecast_card(sample, tz))
                .collect(),
        }),
    }
}

fn current_panel(current: &CurrentWeather, is_favorite: bool) -> CurrentPanel {
    let title = if current.country.is_empty() {
        current.location_name.clone()
    } else {
        format!("{}, {}", current.location_name, current.country)
    };

    CurrentPanel {
        city: current.location_name.clone(),
        title,
        temperature: celsius(current.temperature_c),
        condition: current.condition.clone(),
        is_favorite,
        wind: format!("{} m/s", current.wind_speed_mps),
        humidity: format!("{}%", current.humidity_pct),
        feels_like: format!("{} feels like", celsius(current.feels_like_c)),
    }
}

fn forecast_card<Tz>(sample: &ForecastSample, tz: &Tz) -> ForecastCard
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let label = sample
        .timestamp()
        .map(|ts| ts.with_timezone(tz).format("%a, %b %-d").to_string())
        .unwrap_or_default();

    ForecastCard {
        label,
        temperature: celsius(sample.temperature_c),
        condition: sample.condition.clone(),
    }
}

/// Rounds halves up (toward +∞) and never prints "-0".
fn celsius(value: f64) -> String {
    format!("{}°C", (value + 0.5).floor() as i64)
}

impl Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;
        writeln!(f)?;

        let input = if self.search.query.is_empty() {
            self.search.placeholder
        } else {
            self.search.query.as_str()
        };
        writeln!(f, "[ {input} ] [{}]", self.search.button_label)?;

        if let Some(error) = &self.error {
            writeln!(f)?;
            writeln!(f, "! {error}")?;
        }

        if !self.favorites.is_empty() {
            writeln!(f)?;
            writeln!(f, "Favorite Locations")?;
            let chips: Vec<String> = self
                .favorites
                .iter()
                .enumerate()
                .map(|(i, city)| format!("[{}] {city}", i + 1))
                .collect();
            writeln!(f, "  {}", chips.join("  "))?;
        }

        if let Some(current) = &self.current {
            writeln!(f)?;
            let heart = if current.is_favorite { "♥" } else { "♡" };
            writeln!(f, "{}  {heart}", current.title)?;
            writeln!(f, "  {}", current.temperature)?;
            writeln!(f, "  {}", current.condition)?;
            writeln!(
                f,
                "  Wind {}  |  Humidity {}  |  {}",
                current.wind, current.humidity, current.feels_like
            )?;
        }

        if let Some(forecast) = &self.forecast {
            writeln!(f)?;
            writeln!(f, "{MAX_FORECAST_DAYS}-Day Forecast")?;
            for day in &forecast.days {
                writeln!(
                    f,
                    "  {:<12} {:>6}  {}",
                    day.label, day.temperature, day.condition
                )?;
            }
        }

        Ok(())
    }
}
