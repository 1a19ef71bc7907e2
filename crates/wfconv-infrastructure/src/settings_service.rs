//! Settings persistence.

use std::sync::Arc;

use serde_json::Value;
use wfconv_core::settings::Settings;
use wfconv_core::storage::KeyValueStore;

/// Key of the settings record.
pub const SETTINGS_KEY: &str = "workflowConverterSettings_v2";

/// Loads and saves the singleton [`Settings`] record.
///
/// Shares the key-value medium with the entitlement store under its own key.
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads settings, falling back field by field to defaults.
    ///
    /// An unreadable medium or a record that is not JSON yields
    /// `Settings::default()`.
    pub fn load(&self) -> Settings {
        let raw = match self.store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Settings::default(),
            Err(e) => {
                tracing::error!("Failed to load settings: {}", e);
                return Settings::default();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(record) => Settings::from_stored(&record),
            Err(e) => {
                tracing::error!("Stored settings are not valid JSON: {}", e);
                Settings::default()
            }
        }
    }

    /// Overwrites the stored record. Failures are logged, not returned.
    pub fn save(&self, settings: &Settings) {
        let json = match serde_json::to_string(settings) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize settings: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(SETTINGS_KEY, json) {
            tracing::error!("Failed to save settings: {}", e);
        }
    }
}
