//! Conversion gateway: prompt in, workflow JSON out.
//!
//! One backend call per conversion. Whatever goes wrong (missing key,
//! transport, backend status, unparseable reply) is returned as a
//! [`ConversionError`]; nothing escapes as a panic.

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;

use wfconv_core::conversion::{ConversionError, WorkflowConverter};
use wfconv_core::platform::Platform;
use wfconv_core::settings::{Provider, Settings};

use crate::agent::{GenerationAgent, GenerationRequest};
use crate::gemini_api_agent::{DEFAULT_GEMINI_MODEL, GeminiApiAgent};
use crate::prompts::render_conversion_prompt;

/// Sampling temperature for conversions; low to keep output near-deterministic.
pub const CONVERSION_TEMPERATURE: f32 = 0.1;

const MISSING_KEY_MESSAGE: &str =
    "API key is not configured. Please add your API key in the settings.";

static FENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").expect("fence pattern is a valid regex")
});

/// Builds the backend for the configured provider and runs conversions on it.
#[derive(Debug, Clone, Default)]
pub struct ConversionGateway {
    model: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ConversionGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the provider's default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the provider's endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Bounds each backend call. Without it a call may wait indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Creates the agent for `settings.provider`.
    ///
    /// Fails with a configuration error, before any network activity, when
    /// no usable API key is set.
    pub fn create_agent(
        &self,
        settings: &Settings,
    ) -> Result<Box<dyn GenerationAgent>, ConversionError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConversionError::Config(MISSING_KEY_MESSAGE.to_string()))?;

        match settings.provider {
            Provider::Gemini => {
                let mut agent = GeminiApiAgent::new(
                    api_key,
                    self.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL),
                );
                if let Some(base_url) = &self.base_url {
                    agent = agent.with_base_url(base_url.as_str());
                }
                if let Some(timeout) = self.timeout {
                    agent = agent
                        .with_timeout(timeout)
                        .map_err(|e| ConversionError::Config(e.to_string()))?;
                }
                Ok(Box::new(agent))
            }
        }
    }
}

#[async_trait]
impl WorkflowConverter for ConversionGateway {
    async fn convert(
        &self,
        source_json: &str,
        target: Platform,
        settings: &Settings,
    ) -> Result<Value, ConversionError> {
        let agent = self.create_agent(settings)?;
        convert_with_agent(agent.as_ref(), source_json, target).await
    }
}

/// Runs one conversion on an already-built agent.
pub async fn convert_with_agent(
    agent: &dyn GenerationAgent,
    source_json: &str,
    target: Platform,
) -> Result<Value, ConversionError> {
    let prompt = render_conversion_prompt(source_json, target)
        .map_err(|e| ConversionError::Backend(format!("Failed to build prompt: {e}")))?;

    let request = GenerationRequest::new(prompt)
        .json()
        .with_temperature(CONVERSION_TEMPERATURE);

    tracing::info!(
        to = %target,
        agent = agent.expertise(),
        "Requesting workflow conversion"
    );

    let reply = agent.generate(&request).await.map_err(|e| {
        tracing::error!("Generation backend error: {}", e);
        ConversionError::Backend(e.to_string())
    })?;

    let cleaned = strip_code_fence(&reply);
    serde_json::from_str(cleaned).map_err(|e| {
        tracing::error!("Backend reply is not valid JSON: {}", e);
        ConversionError::Backend(e.to_string())
    })
}

/// Removes a surrounding markdown code fence, if the whole reply is one.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    match FENCE_PATTERN.captures(trimmed).and_then(|caps| caps.get(2)) {
        Some(body) if !body.as_str().is_empty() => body.as_str().trim(),
        _ => trimmed,
    }
}
