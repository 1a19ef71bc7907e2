//! Workflow platforms and source-platform detection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// An automation platform whose workflow schema wfconv understands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    /// Make.com (formerly Integromat) blueprints.
    #[default]
    Make,
    /// n8n workflows.
    N8n,
}

impl Platform {
    /// Returns the other platform. Conversions always go from one to the other.
    pub fn opposite(self) -> Self {
        match self {
            Platform::Make => Platform::N8n,
            Platform::N8n => Platform::Make,
        }
    }

    /// Guesses which platform produced `document`.
    ///
    /// A document with both `nodes` and `connections` is n8n; one with `flow`
    /// or `blueprint` is Make. Anything else is assumed to be Make.
    pub fn detect(document: &Value) -> Self {
        let has = |key: &str| document.get(key).is_some_and(is_truthy);

        if has("nodes") && has("connections") {
            Platform::N8n
        } else {
            // `flow` / `blueprint` and the fallback agree on Make.
            Platform::Make
        }
    }
}

/// JavaScript-style truthiness, matching how workflow exports are usually probed.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
