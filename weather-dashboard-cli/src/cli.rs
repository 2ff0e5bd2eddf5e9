use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use weather_dashboard_core::{
    Config, FavoritesStore, JsonFileStorage, dashboard_from_config, render,
};

use crate::interactive;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// Defaults to the interactive dashboard.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Search cities and manage favorites interactively.
    Interactive,

    /// Show current weather and the 5-day forecast for a city.
    Show {
        /// City name, e.g. "Paris".
        city: String,

        /// Print the rendered dashboard as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List favorite cities.
    Favorites,

    /// Add a city to the favorites, or remove it if already there.
    Favorite {
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(config),
            Command::Interactive => {
                let dashboard = dashboard_from_config(&config)?;
                interactive::run(dashboard).await
            }
            Command::Show { city, json } => show(&config, &city, json).await,
            Command::Favorites => {
                let store = open_favorites(&config)?;
                if store.is_empty() {
                    println!("No favorite locations yet.");
                }
                for (i, city) in store.list().iter().enumerate() {
                    println!("{:>3}. {city}", i + 1);
                }
                Ok(())
            }
            Command::Favorite { city } => {
                let city = city.trim();
                if city.is_empty() {
                    bail!("City name must not be empty");
                }
                let mut store = open_favorites(&config)?;
                if store.toggle(city) {
                    println!("Added {city} to favorites");
                } else {
                    println!("Removed {city} from favorites");
                }
                Ok(())
            }
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Get one at https://openweathermap.org/api")
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(config: &Config, city: &str, json: bool) -> anyhow::Result<()> {
    let mut dashboard = dashboard_from_config(config)?;
    dashboard.set_query(city);
    if !dashboard.submit().await {
        bail!("City name must not be empty");
    }

    let view = render(&dashboard, &Local);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&view).context("Failed to serialize dashboard")?
        );
    } else {
        print!("{view}");
    }

    if let Some(error) = &dashboard.status().error {
        bail!("{error}");
    }
    Ok(())
}

fn open_favorites(config: &Config) -> anyhow::Result<FavoritesStore> {
    Ok(FavoritesStore::open(JsonFileStorage::new(
        config.favorites_path()?,
    )))
}
