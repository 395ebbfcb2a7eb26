//! Settings persistence collaborator.
//!
//! The store is an opaque string key-value map; the settings live under
//! [`SETTINGS_KEY`] as one JSON document. Loading never fails: a missing,
//! unreadable or malformed document is logged and the defaults are used.

use std::collections::HashMap;

use crate::config::Settings;
use crate::constants::SETTINGS_KEY;
use crate::error::StoreError;

/// Key-value persistence backend
pub trait SettingsStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: SettingsStore + ?Sized> SettingsStore for &mut S {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).save(key, value)
    }
}

/// In-process store, for tests and hosts without durable storage
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_string(), value.to_string());
        store
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load persisted settings, falling back to defaults on any failure.
pub fn load_settings<S: SettingsStore + ?Sized>(store: &S) -> Settings {
    let raw = match store.load(SETTINGS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Settings::default(),
        Err(e) => {
            tracing::warn!("Failed to load settings: {}", e);
            return Settings::default();
        }
    };

    match Settings::from_json_lenient(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings: {}", e);
            Settings::default()
        }
    }
}

/// Persist `settings`. Failures are logged and reported as `false`.
pub fn save_settings<S: SettingsStore + ?Sized>(store: &mut S, settings: &Settings) -> bool {
    let result = settings
        .to_json()
        .map_err(StoreError::from)
        .and_then(|json| store.save(SETTINGS_KEY, &json));
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to save settings: {}", e);
            false
        }
    }
}
