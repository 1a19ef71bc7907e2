pub mod entitlement_service;
pub mod paths;
pub mod settings_service;
pub mod storage;

pub use crate::entitlement_service::EntitlementStore;
pub use crate::paths::WfconvPaths;
pub use crate::settings_service::SettingsStore;
pub use crate::storage::{JsonFileStore, MemoryStore};
