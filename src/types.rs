//! Core request/response types for the gateway
//!
//! All types use camelCase JSON serialization for wire compatibility.

use crate::privacy::Detection;
use serde::{Deserialize, Serialize};

/// Backend selected for a request
///
/// Assigned once per request by the routing engine and never changed
/// afterwards. The same value is written to the audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Remote, third-party inference backend
    Cloud,
    /// Locally hosted inference backend
    Sovereign,
}

impl Route {
    /// Lowercase wire name (`"cloud"` / `"sovereign"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::Sovereign => "sovereign",
        }
    }

    /// Whether the request was kept inside the sovereign boundary
    pub fn is_sovereign(&self) -> bool {
        matches!(self, Self::Sovereign)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound gateway request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    /// User prompt to be processed
    pub prompt: String,

    /// Optional caller identifier
    #[serde(default, alias = "user_id", alias = "userId")]
    pub caller_id: Option<String>,

    /// Optional session identifier
    #[serde(default, alias = "session_id")]
    pub session_id: Option<String>,
}

impl GatewayRequest {
    /// Create a request with no caller or session metadata
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            caller_id: None,
            session_id: None,
        }
    }

    /// Attach a caller identifier
    pub fn with_caller(mut self, caller_id: impl Into<String>) -> Self {
        self.caller_id = Some(caller_id.into());
        self
    }

    /// Attach a session identifier
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Result of processing one request through the gateway
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    /// Backend response text, or an inline `[ERROR] ...` message when the
    /// backend call failed
    pub response: String,

    /// Routing decision used to produce the response
    pub route: Route,

    /// Aggregate sensitivity score (0.0 - 1.0)
    pub score: f64,

    /// Redacted detections found in the prompt
    pub detections: Vec<Detection>,

    /// Model that generated the response
    pub model_identifier: String,

    /// Backend call latency in milliseconds
    pub processing_time_ms: f64,

    /// Response timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
