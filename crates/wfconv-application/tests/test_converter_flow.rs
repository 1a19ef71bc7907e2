use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use wfconv_application::{ConvertOutcome, ConverterApp, LoginOutcome};
use wfconv_core::conversion::{ConversionError, WorkflowConverter};
use wfconv_core::platform::Platform;
use wfconv_core::settings::Settings;
use wfconv_core::storage::KeyValueStore;
use wfconv_infrastructure::{EntitlementStore, JsonFileStore, MemoryStore, SettingsStore};

/// Converter double that counts calls and replays a fixed result.
struct ScriptedConverter {
    calls: AtomicUsize,
    targets: Mutex<Vec<Platform>>,
    result: Result<Value, ConversionError>,
}

impl ScriptedConverter {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
            result: Ok(json!({"nodes": [], "connections": {}})),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
            result: Err(ConversionError::Backend(message.to_string())),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkflowConverter for ScriptedConverter {
    async fn convert(
        &self,
        _source_json: &str,
        target: Platform,
        _settings: &Settings,
    ) -> Result<Value, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().push(target);
        self.result.clone()
    }
}

fn build(store: Arc<dyn KeyValueStore>, converter: Arc<ScriptedConverter>) -> ConverterApp {
    ConverterApp::new(
        EntitlementStore::new(store.clone()),
        SettingsStore::new(store),
        converter,
    )
}

fn with_key() -> Settings {
    Settings {
        api_key: Some("test-key".to_string()),
        ..Settings::default()
    }
}

const MAKE_SCENARIO: &str = r#"{"name":"Scenario","flow":[{"id":1,"module":"http:ActionSendData"}]}"#;

#[tokio::test]
async fn test_free_quota_then_unlock() {
    let converter = ScriptedConverter::ok();
    let mut app = build(Arc::new(MemoryStore::new()), converter.clone());
    app.save_settings(with_key());
    app.ingest(MAKE_SCENARIO);

    let outcome = app.login("a@b.com").unwrap();
    assert!(matches!(outcome, LoginOutcome::Registered { .. }));

    for expected_left in (0..5).rev() {
        let outcome = app.convert().await;
        match outcome {
            ConvertOutcome::Converted { user, .. } => {
                assert_eq!(user.conversion_count, expected_left);
            }
            other => panic!("expected conversion, got {:?}", other),
        }
    }
    assert_eq!(converter.calls(), 5);

    let outcome = app.convert().await;
    assert_eq!(outcome, ConvertOutcome::UpgradeRequired);
    assert!(outcome.is_gate());
    assert_eq!(converter.calls(), 5);

    let user = app.unlock_pro("AAAAAAA").unwrap();
    assert!(user.is_pro);

    let outcome = app.convert().await;
    match outcome {
        ConvertOutcome::Converted { user, .. } => {
            assert!(user.is_pro);
            assert_eq!(user.conversion_count, 0);
        }
        other => panic!("expected conversion, got {:?}", other),
    }
    assert_eq!(converter.calls(), 6);
    assert_eq!(app.remaining_quota(), Some(0));
}

#[tokio::test]
async fn test_gate_order() {
    let converter = ScriptedConverter::ok();
    let mut app = build(Arc::new(MemoryStore::new()), converter.clone());

    assert_eq!(app.convert().await, ConvertOutcome::MissingSource);

    app.ingest(MAKE_SCENARIO);
    assert_eq!(app.convert().await, ConvertOutcome::LoginRequired);

    app.login("a@b.com").unwrap();
    assert_eq!(app.convert().await, ConvertOutcome::ApiKeyMissing);

    app.save_settings(with_key());
    assert!(app.convert().await.is_converted());
    assert_eq!(converter.calls(), 1);
}

#[tokio::test]
async fn test_converts_toward_opposite_platform() {
    let converter = ScriptedConverter::ok();
    let mut app = build(Arc::new(MemoryStore::new()), converter.clone());
    app.save_settings(with_key());
    app.login("a@b.com").unwrap();

    app.ingest(MAKE_SCENARIO);
    app.convert().await;
    app.ingest(r#"{"nodes":[{"name":"Start"}],"connections":{"Start":{}}}"#);
    app.convert().await;

    let targets = converter.targets.lock().unwrap().clone();
    assert_eq!(targets, vec![Platform::N8n, Platform::Make]);
    assert_eq!(app.download_file_name(), "converted_make_workflow.json");
}

#[tokio::test]
async fn test_failed_conversion_keeps_quota() {
    let converter = ScriptedConverter::failing("model returned prose");
    let mut app = build(Arc::new(MemoryStore::new()), converter.clone());
    app.save_settings(with_key());
    app.login("a@b.com").unwrap();
    app.ingest(MAKE_SCENARIO);

    let outcome = app.convert().await;
    assert!(matches!(outcome, ConvertOutcome::Failed(_)));
    assert_eq!(
        app.error(),
        Some("Failed to convert workflow. Reason: model returned prose")
    );
    assert!(app.converted_json().is_none());
    assert_eq!(app.remaining_quota(), Some(5));
}

#[tokio::test]
async fn test_new_input_clears_previous_result() {
    let converter = ScriptedConverter::ok();
    let mut app = build(Arc::new(MemoryStore::new()), converter);
    app.save_settings(with_key());
    app.login("a@b.com").unwrap();
    app.ingest(MAKE_SCENARIO);
    app.convert().await;
    assert!(app.converted_json_pretty().is_some());

    app.ingest("{broken");
    assert!(app.converted_json().is_none());
    assert!(app.error().is_some());
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&path));
        let mut app = build(store, ScriptedConverter::ok());
        app.save_settings(with_key());
        app.login("a@b.com").unwrap();
        app.ingest(MAKE_SCENARIO);
        assert!(app.convert().await.is_converted());
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&path));
    let app = build(store, ScriptedConverter::ok());
    let user = app.current_user().expect("session restored");
    assert_eq!(user.email, "a@b.com");
    assert_eq!(user.conversion_count, 4);
    assert!(app.settings().has_api_key());
}

#[tokio::test]
async fn test_unavailable_storage_blocks_free_conversions() {
    let converter = ScriptedConverter::ok();
    let mut app = build(Arc::new(MemoryStore::unavailable()), converter.clone());
    app.save_settings(with_key());
    app.ingest(MAKE_SCENARIO);

    // The account exists only for this session; the quota table stays empty.
    let outcome = app.login("a@b.com").unwrap();
    assert_eq!(outcome.user().conversion_count, 5);
    assert_eq!(app.convert().await, ConvertOutcome::UpgradeRequired);
    assert_eq!(converter.calls(), 0);
}
