//! HTTP API types
//!
//! The contract is deliberately tiny:
//! - Request body: {"text": "..."} - the field is optional, absent means ""
//! - Response body: {"embedding": [0.1, 0.2, 0.3, ...]}
//! - Failure body: {"error": "..."} with a non-200 status

use serde::{Deserialize, Serialize};

/// Embedding request
///
/// A missing `text` field decodes to the empty string, which is itself a
/// valid input - the model's embedding of "" is returned for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Text to embed
    #[serde(default)]
    pub text: String,
}

/// Embedding response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    /// The embedding vector
    pub embedding: Vec<f32>,
}

impl EmbedResponse {
    /// Create a new response
    pub fn new(embedding: Vec<f32>) -> Self {
        Self { embedding }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Error code (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    /// Create error with code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Request body could not be read
    pub fn body_read_failed() -> Self {
        Self {
            error: "Failed to read request body".to_string(),
            code: Some("BODY_READ_FAILED".to_string()),
        }
    }

    /// Request body is not valid JSON
    pub fn invalid_json() -> Self {
        Self {
            error: "Request body is not valid JSON".to_string(),
            code: Some("INVALID_JSON".to_string()),
        }
    }

    /// Request body exceeds the configured size limit
    pub fn body_too_large(length: usize, max: usize) -> Self {
        Self {
            error: format!(
                "Request body of {} bytes exceeds the limit of {} bytes",
                length, max
            ),
            code: Some("BODY_TOO_LARGE".to_string()),
        }
    }

    /// Only POST is served
    pub fn method_not_allowed(method: &str) -> Self {
        Self {
            error: format!("Method {} not allowed, use POST", method),
            code: Some("METHOD_NOT_ALLOWED".to_string()),
        }
    }

    /// Inference failed
    pub fn internal_error(details: impl Into<String>) -> Self {
        Self {
            error: format!("Embedding generation failed: {}", details.into()),
            code: Some("INTERNAL_ERROR".to_string()),
        }
    }
}
