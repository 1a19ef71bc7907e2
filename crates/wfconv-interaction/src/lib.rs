//! Talking to generation backends and turning their replies into workflows.

pub mod agent;
pub mod gateway;
pub mod gemini_api_agent;
pub mod prompts;

pub use agent::{AgentError, GenerationAgent, GenerationRequest};
pub use gateway::ConversionGateway;
pub use gemini_api_agent::GeminiApiAgent;
