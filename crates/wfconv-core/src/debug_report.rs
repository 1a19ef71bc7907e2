//! Diagnostic snapshot of local entitlement data, for the developer account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::settings::Settings;
use crate::user::User;

/// Everything stored locally, plus where it was collected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugReport {
    pub generated_at: DateTime<Utc>,
    pub users: BTreeMap<String, User>,
    /// Settings with the API key masked.
    pub settings: Settings,
    pub environment: Environment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub os: String,
    pub arch: String,
    pub version: String,
}

impl DebugReport {
    pub fn new(users: BTreeMap<String, User>, settings: &Settings) -> Self {
        Self {
            generated_at: Utc::now(),
            users,
            settings: settings.masked(),
            environment: Environment {
                os: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// `workflow_converter_debug_report_<UTC timestamp>.json`
    pub fn file_name(&self) -> String {
        format!(
            "workflow_converter_debug_report_{}.json",
            self.generated_at.format("%Y%m%dT%H%M%SZ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_masks_api_key() {
        let settings = Settings {
            api_key: Some("secret-api-key-value".to_string()),
            ..Settings::default()
        };
        let report = DebugReport::new(BTreeMap::new(), &settings);
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("secret-api-key-value"));
        assert!(json.contains("generatedAt"));
    }

    #[test]
    fn test_file_name() {
        let report = DebugReport::new(BTreeMap::new(), &Settings::default());
        let name = report.file_name();
        assert!(name.starts_with("workflow_converter_debug_report_"));
        assert!(name.ends_with("Z.json"));
        assert!(!name.contains(':'));
    }
}
