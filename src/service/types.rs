// Wire types for the review generation service

use serde::{Deserialize, Serialize};

use crate::catalog::CapabilityCatalog;

/// Body of `POST /api/generate-review`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub case_description: String,
    pub selected_capabilities: Vec<String>,
}

/// Body of `POST /api/improve-review`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImproveRequest {
    pub original_case: String,
    pub improvement_prompt: String,
    pub selected_capabilities: Vec<String>,
}

/// Response of `GET /api/capabilities`
#[derive(Debug, Clone, Deserialize)]
pub struct CapabilitiesResponse {
    pub capabilities: CapabilityCatalog,
}

/// Error body returned by the service. `message` is the service's own
/// envelope; `detail` is what framework-level validation failures carry.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    pub(crate) fn into_message(self) -> Option<String> {
        if let Some(message) = self.message.filter(|m| !m.trim().is_empty()) {
            return Some(message);
        }
        match self.detail? {
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

/// Best human-readable message for a non-success body.
pub(crate) fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(message) = envelope.into_message() {
            return message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
