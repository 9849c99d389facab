//! Inference backend abstraction
//!
//! A backend turns a prompt into response text. Transport failures are
//! reported as [`BackendError`], which the routing engine folds into an
//! inline `[ERROR] ...` response instead of failing the request.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Prefix of every inline backend failure message
pub const ERROR_MARKER: &str = "[ERROR]";

/// Whether a response text is an inline backend failure
pub fn is_error_response(text: &str) -> bool {
    text.starts_with(ERROR_MARKER)
}

/// Backend transport failure
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{backend} is not configured: {reason}")]
    NotConfigured { backend: String, reason: String },

    #[error("{backend} API timeout after {}s", .timeout.as_secs_f64())]
    Timeout { backend: String, timeout: Duration },

    #[error("Cannot connect to {backend} at {url}. Ensure it is running and accessible.")]
    Unreachable { backend: String, url: String },

    #[error("{backend} API error: {status} - {body}")]
    Status {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("{backend} returned an unexpected response: {message}")]
    Decode { backend: String, message: String },

    #[error("{backend} API request failed: {message}")]
    Request { backend: String, message: String },
}

impl BackendError {
    /// Human-readable inline form returned as response text
    pub fn inline_message(&self) -> String {
        format!("{} {}", ERROR_MARKER, self)
    }

    /// Map a reqwest failure onto a backend error
    pub(crate) fn from_reqwest(
        backend: &str,
        url: &str,
        timeout: Duration,
        err: reqwest::Error,
    ) -> Self {
        let backend = backend.to_string();
        if err.is_timeout() {
            Self::Timeout { backend, timeout }
        } else if err.is_connect() {
            Self::Unreachable {
                backend,
                url: url.to_string(),
            }
        } else if err.is_decode() {
            Self::Decode {
                backend,
                message: err.to_string(),
            }
        } else {
            Self::Request {
                backend,
                message: err.to_string(),
            }
        }
    }
}

/// Maximum number of characters of an error body kept in a status error
const MAX_ERROR_BODY_CHARS: usize = 500;

pub(crate) fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        truncated.push_str("...");
        truncated
    }
}

/// An inference backend reachable by the routing engine
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Generate a response for a prompt
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;

    /// Configured model name
    fn model(&self) -> &str;

    /// Human-readable backend name (used in logs and error messages)
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_message_has_marker() {
        let err = BackendError::Timeout {
            backend: "Ollama".to_string(),
            timeout: Duration::from_secs(60),
        };
        let msg = err.inline_message();
        assert_eq!(msg, "[ERROR] Ollama API timeout after 60s");
        assert!(is_error_response(&msg));
    }

    #[test]
    fn test_status_message() {
        let err = BackendError::Status {
            backend: "OpenAI".to_string(),
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(
            err.inline_message(),
            "[ERROR] OpenAI API error: 429 - rate limited"
        );
    }

    #[test]
    fn test_plain_text_is_not_error() {
        assert!(!is_error_response("Canberra is the capital."));
        assert!(!is_error_response(" [ERROR] leading space"));
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");
        let long = "x".repeat(600);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert!(truncated.ends_with("..."));
    }
}
