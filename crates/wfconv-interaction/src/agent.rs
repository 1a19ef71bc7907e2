//! The seam between the gateway and a concrete generation backend.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a generation backend.
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// The request could not be built or the reply had no usable content.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Transport failure or a non-success HTTP status.
    #[error("{message}")]
    ProcessError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Whether a later identical request could succeed. wfconv never retries on
    /// its own; this is surfaced for the caller to decide.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::ProcessError {
                is_retryable: true,
                ..
            }
        )
    }
}

/// One text-in, text-out generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: Option<f32>,
    /// MIME type the backend is asked to answer in (structured output mode).
    pub response_mime_type: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            response_mime_type: None,
        }
    }

    /// Asks for a JSON-only reply.
    pub fn json(mut self) -> Self {
        self.response_mime_type = Some("application/json".to_string());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A backend that turns a prompt into text.
#[async_trait]
pub trait GenerationAgent: Send + Sync {
    /// Short description used in logs.
    fn expertise(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, AgentError>;
}
