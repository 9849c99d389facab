//! Audit record schema

use crate::privacy::PiiKind;
use crate::types::Route;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of the human-readable summary line
pub const SUMMARY_PREFIX: &str = "[AUDIT]";

/// One routing decision, as persisted
///
/// Field order is the serialized order and is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub route: Route,
    pub score: f64,
    /// One entry per detection, duplicates included
    pub detected_kinds: Vec<PiiKind>,
    pub model_identifier: String,
    #[serde(default)]
    pub caller_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub source_address: Option<String>,
    pub prompt_length: usize,
    pub response_length: usize,
    pub processing_time_ms: f64,
    /// `route == sovereign`, kept for log consumers that filter on it
    #[serde(default)]
    pub sovereignty_enforced: bool,
}

impl AuditRecord {
    /// Record a decision made now
    pub fn new(
        route: Route,
        score: f64,
        detected_kinds: Vec<PiiKind>,
        model_identifier: impl Into<String>,
        prompt_length: usize,
        response_length: usize,
        processing_time_ms: f64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            route,
            score,
            detected_kinds,
            model_identifier: model_identifier.into(),
            caller_id: None,
            session_id: None,
            source_address: None,
            prompt_length,
            response_length,
            processing_time_ms,
            sovereignty_enforced: route.is_sovereign(),
        }
    }

    pub fn with_caller(mut self, caller_id: Option<String>) -> Self {
        self.caller_id = caller_id;
        self
    }

    pub fn with_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_source_address(mut self, source_address: Option<String>) -> Self {
        self.source_address = source_address;
        self
    }

    /// Human-readable one-line summary
    pub fn summary_line(&self) -> String {
        let kinds = if self.detected_kinds.is_empty() {
            "None".to_string()
        } else {
            self.detected_kinds
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "{} {} | Route: {} | PII Score: {:.2} | PII Types: {} | Model: {} | Processing: {:.1}ms",
            SUMMARY_PREFIX,
            self.timestamp.to_rfc3339(),
            self.route.as_str().to_uppercase(),
            self.score,
            kinds,
            self.model_identifier,
            self.processing_time_ms,
        )
    }
}
