//! User preference store.
//!
//! Preferences are plain string key-value pairs (temperature unit, remembered
//! location, auto-refresh and alert settings). The persistence backend is
//! injected so tests run against an in-memory map while production uses a
//! JSON file next to the config. Writes are last-writer-wins; the store is
//! the only mutable state that outlives a single page view.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::TemperatureUnit;
use crate::error::AppError;

/// Preference keys. Kept as plain strings so backends stay schema-free.
pub mod keys {
    pub const TEMPERATURE_UNIT: &str = "temperature_unit";
    pub const REMEMBER_LOCATION: &str = "remember_location";
    pub const SAVED_COORDINATES: &str = "saved_coordinates";
    pub const SAVED_LOCATION_NAME: &str = "saved_location_name";
    pub const IS_CURRENT_LOCATION: &str = "is_current_location";
    pub const AUTO_REFRESH: &str = "auto_refresh";
    pub const WEATHER_ALERTS: &str = "weather_alerts";
}

/// Persistence backend for the settings store.
pub trait SettingsBackend: Send + Sync {
    /// Load all persisted pairs. Missing storage is an empty map, not an error.
    fn load_all(&self) -> Result<HashMap<String, String>, AppError>;

    /// Persist the full pair set.
    fn persist(&self, pairs: &HashMap<String, String>) -> Result<(), AppError>;
}

/// In-memory backend for tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pairs: Mutex<HashMap<String, String>>,
}

impl SettingsBackend for MemoryBackend {
    fn load_all(&self) -> Result<HashMap<String, String>, AppError> {
        Ok(self.pairs.lock().clone())
    }

    fn persist(&self, pairs: &HashMap<String, String>) -> Result<(), AppError> {
        *self.pairs.lock() = pairs.clone();
        Ok(())
    }
}

/// JSON-file backend for production.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SettingsBackend for JsonFileBackend {
    fn load_all(&self) -> Result<HashMap<String, String>, AppError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents)
            .map_err(|e| AppError::Service(format!("Settings file is malformed: {}", e)))
    }

    fn persist(&self, pairs: &HashMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(pairs)
            .map_err(|e| AppError::Service(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

type Subscriber = Box<dyn Fn(&str) + Send + Sync>;

/// Injected settings store with get/set/subscribe.
pub struct SettingsStore {
    backend: Arc<dyn SettingsBackend>,
    pairs: RwLock<HashMap<String, String>>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl SettingsStore {
    /// Create a store over the given backend, loading persisted pairs.
    pub fn new(backend: Arc<dyn SettingsBackend>) -> Result<Self, AppError> {
        let pairs = backend.load_all()?;
        Ok(Self {
            backend,
            pairs: RwLock::new(pairs),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Raw string read.
    pub fn get(&self, key: &str) -> Option<String> {
        self.pairs.read().get(key).cloned()
    }

    /// Raw string write; persists and notifies subscribers.
    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), AppError> {
        {
            let mut pairs = self.pairs.write();
            pairs.insert(key.to_string(), value.into());
            self.backend.persist(&pairs)?;
        }
        self.notify(key);
        Ok(())
    }

    /// Remove a key; persists and notifies subscribers if it was present.
    pub fn remove(&self, key: &str) -> Result<(), AppError> {
        let removed = {
            let mut pairs = self.pairs.write();
            let removed = pairs.remove(key).is_some();
            if removed {
                self.backend.persist(&pairs)?;
            }
            removed
        };
        if removed {
            self.notify(key);
        }
        Ok(())
    }

    /// Register a callback invoked with the changed key after each write.
    pub fn subscribe(&self, f: impl Fn(&str) + Send + Sync + 'static) {
        self.subscribers.lock().push(Box::new(f));
    }

    fn notify(&self, key: &str) {
        for sub in self.subscribers.lock().iter() {
            sub(key);
        }
    }

    /// JSON-typed read for structured values (saved coordinates, alerts).
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring malformed setting {}: {}", key, e);
                None
            }
        }
    }

    /// JSON-typed write for structured values.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::Service(format!("Failed to serialize setting: {}", e)))?;
        self.set(key, raw)
    }

    /// Preferred temperature unit; defaults to celsius.
    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.get_json(keys::TEMPERATURE_UNIT).unwrap_or_default()
    }

    pub fn set_temperature_unit(&self, unit: TemperatureUnit) -> Result<(), AppError> {
        self.set_json(keys::TEMPERATURE_UNIT, &unit)
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key).as_deref() == Some("true")
    }

    fn set_flag(&self, key: &str, value: bool) -> Result<(), AppError> {
        self.set(key, if value { "true" } else { "false" })
    }

    pub fn remember_location(&self) -> bool {
        self.flag(keys::REMEMBER_LOCATION)
    }

    pub fn set_remember_location(&self, value: bool) -> Result<(), AppError> {
        self.set_flag(keys::REMEMBER_LOCATION, value)
    }

    pub fn is_current_location(&self) -> bool {
        self.flag(keys::IS_CURRENT_LOCATION)
    }

    pub fn set_is_current_location(&self, value: bool) -> Result<(), AppError> {
        self.set_flag(keys::IS_CURRENT_LOCATION, value)
    }

    pub fn auto_refresh(&self) -> bool {
        self.flag(keys::AUTO_REFRESH)
    }

    pub fn set_auto_refresh(&self, value: bool) -> Result<(), AppError> {
        self.set_flag(keys::AUTO_REFRESH, value)
    }

    pub fn saved_location_name(&self) -> Option<String> {
        self.get(keys::SAVED_LOCATION_NAME)
    }

    pub fn set_saved_location_name(&self, name: &str) -> Result<(), AppError> {
        self.set(keys::SAVED_LOCATION_NAME, name)
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("pairs", &*self.pairs.read())
            .finish_non_exhaustive()
    }
}
