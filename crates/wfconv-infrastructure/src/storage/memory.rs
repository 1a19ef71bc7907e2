//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::Mutex;

use wfconv_core::error::{Result, WfconvError};
use wfconv_core::storage::KeyValueStore;

/// A [`KeyValueStore`] that lives only as long as the process.
///
/// `unavailable()` builds a store whose every operation fails, which models
/// a storage medium that cannot be reached.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every read and write.
    pub fn unavailable() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            unavailable: true,
        }
    }

    /// Pre-populates `key`, bypassing availability. Handy for seeding raw data.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(entries) = self.entries.get_mut() {
            entries.insert(key.into(), value.into());
        }
        self
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        if self.unavailable {
            return Err(WfconvError::storage("store is unavailable"));
        }
        self.entries
            .lock()
            .map_err(|_| WfconvError::storage("store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Option<String>,
    ) -> Result<()> {
        let mut entries = self.entries()?;
        if let Some(value) = f(entries.remove(key)) {
            entries.insert(key.to_string(), value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let store = MemoryStore::new();
        store.set("a", "1".to_string()).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_unavailable_fails_everything() {
        let store = MemoryStore::unavailable();
        assert!(store.get("a").is_err());
        assert!(store.set("a", "1".to_string()).is_err());
        assert!(store.remove("a").is_err());
        assert!(store.update("a", &mut |v: Option<String>| v).is_err());
    }

    #[test]
    fn test_update_replaces_and_removes() {
        let store = MemoryStore::new().with_entry("k", "a");
        store
            .update("k", &mut |v: Option<String>| v.map(|v| format!("{v}b")))
            .unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("ab"));

        store.update("k", &mut |_: Option<String>| None).unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_with_entry() {
        let store = MemoryStore::new().with_entry("k", "v");
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
