//! Bookmarked city names, written through to a single persisted slot.

use anyhow::{Context, Result};
use std::{
    fmt::Debug,
    fs, io,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::{debug, warn};

/// A single durable key-value slot holding the serialized favorites list.
pub trait FavoritesStorage: Send + Sync + Debug {
    /// Returns `None` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;

    fn write(&self, value: &str) -> Result<()>;
}

/// Slot backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FavoritesStorage for JsonFileStorage {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| {
                format!("Failed to read favorites file: {}", self.path.display())
            }),
        }
    }

    fn write(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create favorites directory: {}", parent.display())
            })?;
        }

        fs::write(&self.path, value)
            .with_context(|| format!("Failed to write favorites file: {}", self.path.display()))
    }
}

/// In-memory slot. Clones share the same slot, so a fresh store opened on a
/// clone sees what a previous store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().map(|slot| slot.clone()).unwrap_or_default()
    }
}

impl FavoritesStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("favorites slot lock poisoned"))?;
        Ok(slot.clone())
    }

    fn write(&self, value: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("favorites slot lock poisoned"))?;
        *slot = Some(value.to_string());
        Ok(())
    }
}

/// Ordered set of favorite city names.
#[derive(Debug)]
pub struct FavoritesStore {
    cities: Vec<String>,
    storage: Box<dyn FavoritesStorage>,
}

impl FavoritesStore {
    /// Loads the persisted list. Missing, unreadable or corrupt data starts
    /// the store empty.
    pub fn open(storage: impl FavoritesStorage + 'static) -> Self {
        let cities = match storage.read() {
            Ok(Some(raw)) => parse_favorites(&raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "could not read favorites, starting empty");
                Vec::new()
            }
        };

        debug!(count = cities.len(), "favorites loaded");

        Self {
            cities,
            storage: Box::new(storage),
        }
    }

    /// Adds `city` if absent, removes it otherwise. Returns the new membership.
    pub fn toggle(&mut self, city: &str) -> bool {
        let now_favorite = match self.cities.iter().position(|c| c == city) {
            Some(idx) => {
                self.cities.remove(idx);
                false
            }
            None => {
                self.cities.push(city.to_string());
                true
            }
        };

        self.persist();
        now_favorite
    }

    pub fn is_favorite(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    pub fn list(&self) -> &[String] {
        &self.cities
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cities.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.cities)
            .context("Failed to serialize favorites")
            .and_then(|json| self.storage.write(&json));

        if let Err(err) = result {
            warn!(error = %format!("{err:#}"), "could not persist favorites");
        }
    }
}

fn parse_favorites(raw: &str) -> Vec<String> {
    let parsed: Vec<String> = match serde_json::from_str(raw) {
        Ok(list) => list,
        Err(err) => {
            warn!(error = %err, "persisted favorites are invalid, starting empty");
            return Vec::new();
        }
    };

    let mut cities: Vec<String> = Vec::with_capacity(parsed.len());
    for city in parsed {
        if !cities.contains(&city) {
            cities.push(city);
        }
    }
    cities
}
