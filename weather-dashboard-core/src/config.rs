use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::provider::openweather::DEFAULT_BASE_URL;

/// Environment variable that overrides the API key from the config file.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

const FAVORITES_FILE_NAME: &str = "favorites.json";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// base_url = "https://api.openweathermap.org/data/2.5"
/// favorites_file = "/home/me/.local/share/weather-dashboard/favorites.json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,

    /// OpenWeather-compatible API root; defaults to the public endpoint.
    pub base_url: Option<String>,

    pub favorites_file: Option<PathBuf>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// API key from the environment, falling back to the config file.
    ///
    /// A missing key is not an error here: requests go out with an empty key
    /// and fail upstream like any other lookup.
    pub fn api_key(&self) -> String {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .unwrap_or_default()
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Where the favorites slot lives: the configured file, or
    /// `favorites.json` under the platform data directory.
    pub fn favorites_path(&self) -> Result<PathBuf> {
        match &self.favorites_file {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join(FAVORITES_FILE_NAME)),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-dashboard", "weather-dashboard")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
