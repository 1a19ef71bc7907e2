//! The conversion workbench: source document, entitlement gates and results.
//!
//! `ConverterApp` owns the transient state of one user session (the source
//! text, detected platform, last result and last error) and decides whether a
//! conversion may run. Persistent state goes through the entitlement and
//! settings stores it was built with.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use wfconv_core::conversion::{ConversionError, WorkflowConverter, converted_file_name};
use wfconv_core::debug_report::DebugReport;
use wfconv_core::platform::Platform;
use wfconv_core::settings::Settings;
use wfconv_core::user::{User, is_valid_email};
use wfconv_infrastructure::{EntitlementStore, SettingsStore};

use crate::mail;

pub const MISSING_SOURCE_MESSAGE: &str = "Please provide a source workflow first.";
pub const MISSING_API_KEY_MESSAGE: &str = "API Key is not set. Please add it in settings.";
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON format. Please check the provided content.";
pub const WRONG_FILE_TYPE_MESSAGE: &str = "Please upload a valid .json file.";
pub const READ_FAILED_MESSAGE: &str = "Failed to read the file.";

/// Result of feeding new source text to the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Blank input; the source was cleared.
    Cleared,
    /// Valid JSON, pretty-printed and attributed to a platform.
    Parsed(Platform),
    /// Not JSON. The raw text is kept and an input error is set.
    Invalid,
    /// The file could not be used; nothing else changed.
    Rejected(String),
}

/// What happened when a conversion was requested.
///
/// Gates are checked in declaration order and the first failing one wins.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutcome {
    MissingSource,
    LoginRequired,
    ApiKeyMissing,
    UpgradeRequired,
    /// The backend ran but produced no usable document. No quota was spent.
    Failed(ConversionError),
    Converted { json: Value, user: User },
}

impl ConvertOutcome {
    /// True only for `Converted`.
    pub fn is_converted(&self) -> bool {
        matches!(self, ConvertOutcome::Converted { .. })
    }

    /// True when the outcome was decided locally without calling the backend.
    pub fn is_gate(&self) -> bool {
        !matches!(
            self,
            ConvertOutcome::Failed(_) | ConvertOutcome::Converted { .. }
        )
    }

    /// User-facing explanation for everything but success.
    pub fn message(&self) -> Option<String> {
        match self {
            ConvertOutcome::MissingSource => Some(MISSING_SOURCE_MESSAGE.to_string()),
            ConvertOutcome::LoginRequired => {
                Some("Please log in before converting a workflow.".to_string())
            }
            ConvertOutcome::ApiKeyMissing => Some(MISSING_API_KEY_MESSAGE.to_string()),
            ConvertOutcome::UpgradeRequired => Some(
                "You have used all your free conversions. Upgrade to Pro to continue."
                    .to_string(),
            ),
            ConvertOutcome::Failed(err) => Some(err.to_string()),
            ConvertOutcome::Converted { .. } => None,
        }
    }
}

/// How a login went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// An existing account.
    Returning(User),
    /// A new account. The activation link mails the reference code to the
    /// developer.
    Registered {
        user: User,
        reference_code: String,
        activation_link: String,
    },
}

impl LoginOutcome {
    pub fn user(&self) -> &User {
        match self {
            LoginOutcome::Returning(user) | LoginOutcome::Registered { user, .. } => user,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("No account found for {0}.")]
    UnknownAccount(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnlockError {
    #[error("Please log in first.")]
    NotLoggedIn,
    #[error("Please enter a code.")]
    EmptyCode,
    #[error("Invalid code. Please try again.")]
    InvalidCode,
}

/// Orchestrates ingestion, entitlement checks and conversion.
pub struct ConverterApp {
    entitlements: EntitlementStore,
    settings_store: SettingsStore,
    converter: Arc<dyn WorkflowConverter>,
    developer_email: String,

    settings: Settings,
    current_user: Option<User>,
    source_json: Option<String>,
    source_platform: Platform,
    converted: Option<Value>,
    error: Option<String>,
    busy: bool,
}

impl ConverterApp {
    /// Builds the app, restoring settings and the session from the stores.
    pub fn new(
        entitlements: EntitlementStore,
        settings_store: SettingsStore,
        converter: Arc<dyn WorkflowConverter>,
    ) -> Self {
        let settings = settings_store.load();
        let current_user = entitlements.current_user();

        Self {
            entitlements,
            settings_store,
            converter,
            developer_email: mail::DEFAULT_DEVELOPER_EMAIL.to_string(),
            settings,
            current_user,
            source_json: None,
            source_platform: Platform::default(),
            converted: None,
            error: None,
            busy: false,
        }
    }

    /// Sets the address that receives mail links and owns admin features.
    pub fn with_developer_email(mut self, email: impl Into<String>) -> Self {
        self.developer_email = email.into();
        self
    }

    // ============================================================================
    // Source document
    // ============================================================================

    /// Replaces the source document with `text`.
    ///
    /// Clears any previous result and error first. Valid JSON is stored
    /// pretty-printed and its platform detected; invalid JSON is stored as-is
    /// with an input error and the platform untouched.
    pub fn ingest(&mut self, text: &str) -> IngestOutcome {
        self.converted = None;
        self.error = None;

        if text.trim().is_empty() {
            self.source_json = None;
            return IngestOutcome::Cleared;
        }

        match serde_json::from_str::<Value>(text) {
            Ok(parsed) => {
                let formatted =
                    serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| text.to_string());
                self.source_json = Some(formatted);
                self.source_platform = Platform::detect(&parsed);
                tracing::debug!(platform = %self.source_platform, "Ingested source workflow");
                IngestOutcome::Parsed(self.source_platform)
            }
            Err(e) => {
                tracing::debug!("Source is not valid JSON: {}", e);
                self.source_json = Some(text.to_string());
                self.error = Some(INVALID_JSON_MESSAGE.to_string());
                IngestOutcome::Invalid
            }
        }
    }

    /// Reads a `.json` file and ingests it.
    pub fn ingest_file(&mut self, path: &Path) -> IngestOutcome {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if !is_json {
            self.error = Some(WRONG_FILE_TYPE_MESSAGE.to_string());
            return IngestOutcome::Rejected(WRONG_FILE_TYPE_MESSAGE.to_string());
        }

        match std::fs::read_to_string(path) {
            Ok(text) => self.ingest(&text),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to read source file: {}", e);
                self.error = Some(READ_FAILED_MESSAGE.to_string());
                IngestOutcome::Rejected(READ_FAILED_MESSAGE.to_string())
            }
        }
    }

    /// Drops the source, result and error.
    pub fn clear(&mut self) {
        self.source_json = None;
        self.converted = None;
        self.error = None;
    }

    pub fn swap_platforms(&mut self) {
        self.source_platform = self.source_platform.opposite();
    }

    /// Makes `target` the conversion target, swapping if needed.
    pub fn set_target(&mut self, target: Platform) {
        if self.target_platform() != target {
            self.swap_platforms();
        }
    }

    pub fn source_platform(&self) -> Platform {
        self.source_platform
    }

    pub fn target_platform(&self) -> Platform {
        self.source_platform.opposite()
    }

    pub fn source_json(&self) -> Option<&str> {
        self.source_json.as_deref()
    }

    pub fn converted_json(&self) -> Option<&Value> {
        self.converted.as_ref()
    }

    /// The converted document, pretty-printed.
    pub fn converted_json_pretty(&self) -> Option<String> {
        self.converted
            .as_ref()
            .and_then(|json| serde_json::to_string_pretty(json).ok())
    }

    /// `converted_<target>_workflow.json`
    pub fn download_file_name(&self) -> String {
        converted_file_name(self.target_platform())
    }

    /// The last error shown to the user, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a backend call is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    // ============================================================================
    // Conversion
    // ============================================================================

    /// Runs the gate sequence and, if every gate passes, the conversion.
    ///
    /// Gates, in order: source present, logged in, API key set, quota left
    /// (or pro). A failing gate returns without touching the backend. A
    /// successful conversion by a free user spends one unit of quota.
    pub async fn convert(&mut self) -> ConvertOutcome {
        let Some(source) = self.source_json.clone() else {
            self.error = Some(MISSING_SOURCE_MESSAGE.to_string());
            return ConvertOutcome::MissingSource;
        };

        let Some(user) = self.current_user.clone() else {
            return ConvertOutcome::LoginRequired;
        };

        if !self.settings.has_api_key() {
            self.error = Some(MISSING_API_KEY_MESSAGE.to_string());
            return ConvertOutcome::ApiKeyMissing;
        }

        if !user.is_pro && self.entitlements.remaining_quota(&user.email) == 0 {
            tracing::info!(email = %user.email, "Free quota exhausted");
            return ConvertOutcome::UpgradeRequired;
        }

        self.error = None;
        self.converted = None;
        let target = self.target_platform();

        self.busy = true;
        let result = self
            .converter
            .convert(&source, target, &self.settings)
            .await;
        self.busy = false;

        match result {
            Ok(json) => {
                self.converted = Some(json.clone());
                let user = if user.is_pro {
                    user
                } else {
                    self.entitlements
                        .debit_quota(&user.email)
                        .unwrap_or(user)
                };
                self.current_user = Some(user.clone());
                tracing::info!(to = %target, "Conversion succeeded");
                ConvertOutcome::Converted { json, user }
            }
            Err(err) => {
                tracing::warn!(to = %target, "Conversion failed: {}", err);
                self.error = Some(err.to_string());
                ConvertOutcome::Failed(err)
            }
        }
    }

    // ============================================================================
    // Account
    // ============================================================================

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Logs in, registering the email if it has no account yet.
    pub fn login(&mut self, email: &str) -> Result<LoginOutcome, LoginError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(LoginError::InvalidEmail);
        }

        let outcome = if self.entitlements.exists(email) {
            let user = self
                .entitlements
                .login(email, false)
                .ok_or_else(|| LoginError::UnknownAccount(email.to_string()))?;
            LoginOutcome::Returning(user)
        } else {
            let reference_code = self.entitlements.issue_code(email);
            let activation_link =
                mail::signup_link(&self.developer_email, email, &reference_code);
            let user = self
                .entitlements
                .login(email, true)
                .ok_or_else(|| LoginError::UnknownAccount(email.to_string()))?;
            LoginOutcome::Registered {
                user,
                reference_code,
                activation_link,
            }
        };

        self.current_user = Some(outcome.user().clone());
        Ok(outcome)
    }

    pub fn logout(&mut self) {
        self.entitlements.logout();
        self.current_user = None;
    }

    /// Unlocks pro for the logged-in user.
    pub fn unlock_pro(&mut self, code: &str) -> Result<User, UnlockError> {
        let email = self
            .current_user
            .as_ref()
            .map(|user| user.email.clone())
            .ok_or(UnlockError::NotLoggedIn)?;

        let code = code.trim();
        if code.is_empty() {
            return Err(UnlockError::EmptyCode);
        }

        let user = self
            .entitlements
            .grant_pro(&email, code)
            .ok_or(UnlockError::InvalidCode)?;
        self.current_user = Some(user.clone());
        Ok(user)
    }

    /// Free conversions left for the logged-in user.
    pub fn remaining_quota(&self) -> Option<u32> {
        self.current_user
            .as_ref()
            .map(|user| self.entitlements.remaining_quota(&user.email))
    }

    /// True when the logged-in user is the developer.
    pub fn is_admin(&self) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|user| user.email == self.developer_email)
    }

    /// Snapshot of local data. Only available to the developer.
    pub fn debug_report(&self) -> Option<DebugReport> {
        if !self.is_admin() {
            return None;
        }
        Some(DebugReport::new(self.entitlements.users(), &self.settings))
    }

    /// Feedback mail link from the logged-in user.
    pub fn feedback_link(&self, rating: u8, feedback: &str) -> Option<String> {
        let user = self.current_user.as_ref()?;
        Some(mail::feedback_link(
            &self.developer_email,
            &user.email,
            rating.clamp(1, 5),
            feedback,
        ))
    }

    pub fn upgrade_link(&self) -> String {
        mail::upgrade_link(&self.developer_email)
    }

    // ============================================================================
    // Settings
    // ============================================================================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces and persists the settings.
    pub fn save_settings(&mut self, settings: Settings) {
        self.settings_store.save(&settings);
        self.settings = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use wfconv_infrastructure::MemoryStore;

    struct EchoConverter;

    #[async_trait]
    impl WorkflowConverter for EchoConverter {
        async fn convert(
            &self,
            _source_json: &str,
            target: Platform,
            _settings: &Settings,
        ) -> Result<Value, ConversionError> {
            Ok(json!({ "target": target.to_string() }))
        }
    }

    fn app() -> ConverterApp {
        let store = Arc::new(MemoryStore::new());
        ConverterApp::new(
            EntitlementStore::new(store.clone()),
            SettingsStore::new(store),
            Arc::new(EchoConverter),
        )
    }

    #[test]
    fn test_ingest_keeps_key_order() {
        let mut app = app();
        app.ingest(r#"{"name":"W","nodes":[],"connections":{},"active":false}"#);

        let source = app.source_json().unwrap();
        let name = source.find("\"name\"").unwrap();
        let nodes = source.find("\"nodes\"").unwrap();
        let connections = source.find("\"connections\"").unwrap();
        let active = source.find("\"active\"").unwrap();
        assert!(name < nodes && nodes < connections && connections < active);
    }

    #[tokio::test]
    async fn test_converted_output_keeps_key_order() {
        struct OrderedConverter;

        #[async_trait]
        impl WorkflowConverter for OrderedConverter {
            async fn convert(
                &self,
                _source_json: &str,
                _target: Platform,
                _settings: &Settings,
            ) -> Result<Value, ConversionError> {
                serde_json::from_str(r#"{"name":"Flow","flow":[],"metadata":{}}"#)
                    .map_err(|e| ConversionError::Backend(e.to_string()))
            }
        }

        let store = Arc::new(MemoryStore::new());
        let mut app = ConverterApp::new(
            EntitlementStore::new(store.clone()),
            SettingsStore::new(store),
            Arc::new(OrderedConverter),
        );
        app.save_settings(Settings {
            api_key: Some("k".to_string()),
            ..Settings::default()
        });
        app.login("a@b.com").unwrap();
        app.ingest("{}");
        assert!(app.convert().await.is_converted());

        let pretty = app.converted_json_pretty().unwrap();
        let name = pretty.find("\"name\"").unwrap();
        let flow = pretty.find("\"flow\"").unwrap();
        let metadata = pretty.find("\"metadata\"").unwrap();
        assert!(name < flow && flow < metadata);
    }

    #[test]
    fn test_ingest_n8n_document() {
        let mut app = app();
        let outcome = app.ingest(r#"{"nodes":[{"id":1}],"connections":{"a":1}}"#);

        assert_eq!(outcome, IngestOutcome::Parsed(Platform::N8n));
        assert_eq!(app.source_platform(), Platform::N8n);
        assert_eq!(app.target_platform(), Platform::Make);
        assert!(app.source_json().unwrap().contains("\n"));
        assert_eq!(app.error(), None);
    }

    #[test]
    fn test_ingest_make_document() {
        let mut app = app();
        app.swap_platforms();
        let outcome = app.ingest(r#"{"flow":[],"metadata":{}}"#);
        assert_eq!(outcome, IngestOutcome::Parsed(Platform::Make));
    }

    #[test]
    fn test_ingest_invalid_keeps_text_and_platform() {
        let mut app = app();
        app.set_target(Platform::Make);
        assert_eq!(app.source_platform(), Platform::N8n);

        let outcome = app.ingest("{not json");
        assert_eq!(outcome, IngestOutcome::Invalid);
        assert_eq!(app.source_json(), Some("{not json"));
        assert_eq!(app.error(), Some(INVALID_JSON_MESSAGE));
        assert_eq!(app.source_platform(), Platform::N8n);
    }

    #[test]
    fn test_ingest_blank_clears_source() {
        let mut app = app();
        app.ingest("{}");
        assert_eq!(app.ingest("   \n"), IngestOutcome::Cleared);
        assert_eq!(app.source_json(), None);
    }

    #[test]
    fn test_ingest_file_rejects_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.txt");
        std::fs::write(&path, "{}").unwrap();

        let mut app = app();
        let outcome = app.ingest_file(&path);
        assert_eq!(
            outcome,
            IngestOutcome::Rejected(WRONG_FILE_TYPE_MESSAGE.to_string())
        );
        assert_eq!(app.source_json(), None);
    }

    #[test]
    fn test_ingest_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        let outcome = app.ingest_file(&dir.path().join("absent.json"));
        assert_eq!(
            outcome,
            IngestOutcome::Rejected(READ_FAILED_MESSAGE.to_string())
        );
        assert_eq!(app.error(), Some(READ_FAILED_MESSAGE));
    }

    #[test]
    fn test_ingest_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.JSON");
        std::fs::write(&path, r#"{"flow":[]}"#).unwrap();

        let mut app = app();
        assert_eq!(app.ingest_file(&path), IngestOutcome::Parsed(Platform::Make));
    }

    #[test]
    fn test_set_target_is_idempotent() {
        let mut app = app();
        app.set_target(Platform::Make);
        app.set_target(Platform::Make);
        assert_eq!(app.target_platform(), Platform::Make);
        assert_eq!(app.download_file_name(), "converted_make_workflow.json");
    }

    #[test]
    fn test_login_rejects_invalid_email() {
        let mut app = app();
        assert_eq!(app.login("not-an-email"), Err(LoginError::InvalidEmail));
        assert!(app.current_user().is_none());
    }

    #[test]
    fn test_login_new_user_gets_activation_link() {
        let mut app = app();
        let outcome = app.login("a@b.com").unwrap();

        match outcome {
            LoginOutcome::Registered {
                user,
                reference_code,
                activation_link,
            } => {
                assert_eq!(user.conversion_count, 5);
                assert_eq!(reference_code, "AAAAAAA");
                assert!(activation_link.starts_with("mailto:developer@example.com"));
                assert!(activation_link.contains("AAAAAAA"));
            }
            other => panic!("expected registration, got {:?}", other),
        }
        assert_eq!(app.remaining_quota(), Some(5));
    }

    #[test]
    fn test_login_returning_user() {
        let mut app = app();
        app.login("a@b.com").unwrap();
        app.logout();
        assert!(app.current_user().is_none());

        let outcome = app.login("a@b.com").unwrap();
        assert!(matches!(outcome, LoginOutcome::Returning(_)));
    }

    #[test]
    fn test_unlock_requires_session_and_code() {
        let mut app = app();
        assert_eq!(app.unlock_pro("AAAAAAA"), Err(UnlockError::NotLoggedIn));

        app.login("a@b.com").unwrap();
        assert_eq!(app.unlock_pro("  "), Err(UnlockError::EmptyCode));
        assert_eq!(app.unlock_pro("WRONG"), Err(UnlockError::InvalidCode));
        assert!(!app.current_user().unwrap().is_pro);

        let user = app.unlock_pro("aaaaaaa").unwrap();
        assert!(user.is_pro);
        assert!(app.current_user().unwrap().is_pro);
    }

    #[test]
    fn test_admin_only_for_developer() {
        let mut app = app().with_developer_email("dev@corp.io");
        app.login("a@b.com").unwrap();
        assert!(!app.is_admin());
        assert!(app.debug_report().is_none());

        app.login("dev@corp.io").unwrap();
        assert!(app.is_admin());
        let report = app.debug_report().unwrap();
        assert_eq!(report.users.len(), 2);
    }

    #[test]
    fn test_feedback_link_needs_session() {
        let mut app = app();
        assert!(app.feedback_link(5, "great").is_none());
        app.login("a@b.com").unwrap();
        assert!(app.feedback_link(5, "great").is_some());
    }

    #[tokio::test]
    async fn test_convert_without_source() {
        let mut app = app();
        let outcome = app.convert().await;
        assert_eq!(outcome, ConvertOutcome::MissingSource);
        assert_eq!(app.error(), Some(MISSING_SOURCE_MESSAGE));
    }

    #[tokio::test]
    async fn test_save_settings_enables_conversion() {
        let mut app = app();
        app.ingest("{}");
        app.login("a@b.com").unwrap();
        assert_eq!(app.convert().await, ConvertOutcome::ApiKeyMissing);

        app.save_settings(Settings {
            api_key: Some("k".to_string()),
            ..Settings::default()
        });
        let outcome = app.convert().await;
        assert!(outcome.is_converted());
        assert_eq!(app.remaining_quota(), Some(4));
        assert!(!app.is_busy());
    }
}
