//! Key-value persistence abstraction.
//!
//! Entitlement and settings records are stored as whole JSON-serialized
//! values under fixed string keys. The medium behind the keys is pluggable so
//! the same services run against a file on disk or an in-memory map.

use crate::error::Result;

/// A durable string-to-string map.
///
/// Implementations must be safe to share across threads and, for `update`,
/// across every handle that points at the same medium.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Read-modify-write of one key as a single exclusive step.
    ///
    /// `f` is called once with the current value and returns the new one;
    /// `None` removes the key. No other `update`, `set` or `remove` on the
    /// same medium runs in between.
    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Option<String>,
    ) -> Result<()>;
}
