//! Error types for wfconv.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the storage and domain layers.
///
/// User-facing failures (bad input, missing configuration, entitlement gates)
/// are not errors at this level; they are modelled as outcomes by the
/// orchestrator. This type covers the plumbing underneath.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum WfconvError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Storage medium error (unavailable store, lock failure)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },
}

impl WfconvError {
    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<std::io::Error> for WfconvError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for WfconvError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, WfconvError>`.
pub type Result<T> = std::result::Result<T, WfconvError>;
