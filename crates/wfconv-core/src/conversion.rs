//! Conversion contract shared by the gateway and the orchestrator.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::platform::Platform;
use crate::settings::Settings;

/// Why a conversion produced no document.
///
/// The display text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Provider or API key not usable. No remote call was made.
    #[error("{0}")]
    Config(String),

    /// Transport failure, backend failure, or a reply that is not JSON.
    #[error("Failed to convert workflow. Reason: {0}")]
    Backend(String),
}

impl ConversionError {
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Turns a workflow document into the other platform's schema.
///
/// Exactly one attempt per call; every failure comes back as a
/// `ConversionError` value.
#[async_trait]
pub trait WorkflowConverter: Send + Sync {
    async fn convert(
        &self,
        source_json: &str,
        target: Platform,
        settings: &Settings,
    ) -> Result<Value, ConversionError>;
}

/// Conventional file name for a converted document.
pub fn converted_file_name(target: Platform) -> String {
    format!("converted_{target}_workflow.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converted_file_name() {
        assert_eq!(
            converted_file_name(Platform::N8n),
            "converted_n8n_workflow.json"
        );
        assert_eq!(
            converted_file_name(Platform::Make),
            "converted_make_workflow.json"
        );
    }

    #[test]
    fn test_backend_error_display() {
        let err = ConversionError::Backend("expected value at line 1".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to convert workflow. Reason: expected value at line 1"
        );
        assert!(!err.is_config());
    }
}
