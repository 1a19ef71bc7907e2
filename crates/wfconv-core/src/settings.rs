//! User-chosen settings: generation provider, API key and theme.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Generation backends wfconv can talk to.
///
/// Only Gemini is implemented; new backends are added as variants and wired
/// up in the gateway's provider dispatch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
}

/// Colour theme preference. Stored only; nothing in wfconv renders it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// The persisted settings record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub theme: Theme,
}

impl Settings {
    /// Builds settings from a loosely-typed stored record.
    ///
    /// Each field is picked on its own and falls back to its default when it
    /// is missing, empty, or of the wrong shape, so records written by older
    /// or newer versions still load.
    pub fn from_stored(record: &Value) -> Self {
        let defaults = Settings::default();

        let provider = record
            .get("provider")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.provider);

        let api_key = record
            .get("apiKey")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or(defaults.api_key);

        let theme = record
            .get("theme")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.theme);

        Self {
            provider,
            api_key,
            theme,
        }
    }

    /// Returns true when a non-blank API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Copy with the API key reduced to a short hint, for display and reports.
    pub fn masked(&self) -> Self {
        Self {
            api_key: self.api_key.as_deref().map(mask_key),
            ..self.clone()
        }
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}
