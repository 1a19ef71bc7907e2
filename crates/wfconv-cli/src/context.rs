use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use wfconv_application::ConverterApp;
use wfconv_application::mail::DEFAULT_DEVELOPER_EMAIL;
use wfconv_core::storage::KeyValueStore;
use wfconv_infrastructure::{EntitlementStore, JsonFileStore, SettingsStore, WfconvPaths};
use wfconv_interaction::ConversionGateway;

/// Overrides the developer address used for mail links and admin checks.
pub const DEVELOPER_EMAIL_ENV: &str = "WFCONV_DEVELOPER_EMAIL";

/// Everything a command needs, wired to the on-disk store.
pub struct Context {
    pub app: ConverterApp,
    pub entitlements: EntitlementStore,
}

impl Context {
    pub fn open(data_dir: Option<PathBuf>, timeout: Option<Duration>) -> Result<Self> {
        let paths = WfconvPaths::new(data_dir);
        let store_file = paths
            .store_file()
            .context("Failed to resolve the wfconv data directory")?;
        tracing::debug!(path = %store_file.display(), "Opening store");

        let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(store_file));
        let entitlements = EntitlementStore::new(store.clone());

        let mut gateway = ConversionGateway::new();
        if let Some(timeout) = timeout {
            gateway = gateway.with_timeout(timeout);
        }

        let developer_email = std::env::var(DEVELOPER_EMAIL_ENV)
            .ok()
            .filter(|email| !email.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DEVELOPER_EMAIL.to_string());

        let app = ConverterApp::new(
            entitlements.clone(),
            SettingsStore::new(store),
            Arc::new(gateway),
        )
        .with_developer_email(developer_email);

        Ok(Self { app, entitlements })
    }
}
