//! Content inspector
//!
//! Runs every catalog detector plus a sensitive-topic keyword scorer over a
//! prompt and folds the results into one sensitivity score in `[0, 1]`.
//!
//! Detectors run independently, so one substring can produce detections of
//! several kinds (a ten-digit Medicare number also contains a four-digit
//! postcode candidate). Every extra detection pushes the score up, which is
//! the conservative direction for routing.

use super::catalog::{PatternCatalog, PiiKind};
use super::redact::redact;
use super::validate::ChecksumMode;
use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Score contributed by each distinct keyword present
pub const KEYWORD_WEIGHT: f64 = 0.15;
/// Upper bound on the keyword contribution
pub const KEYWORD_CAP: f64 = 0.6;
/// Score contributed by each detection
pub const PATTERN_WEIGHT: f64 = 0.2;
/// Upper bound on the pattern contribution
pub const PATTERN_CAP: f64 = 0.8;
/// Bonus when detections cover two or more kinds
pub const MULTI_KIND_BONUS: f64 = 0.1;

/// Sensitive-topic keywords, matched case-insensitively as substrings
pub const SENSITIVE_KEYWORDS: &[&str] = &[
    "medicare",
    "tfn",
    "tax file",
    "driver licence",
    "drivers license",
    "passport",
    "credit card",
    "bank account",
    "bsb",
    "account number",
    "diagnosis",
    "patient",
    "medical record",
    "prescription",
    "medication",
    "legal advice",
    "court case",
    "criminal",
    "conviction",
    "salary",
    "income",
    "superannuation",
    "super",
    "pension",
    "australian security",
    "classified",
    "confidential",
];

/// One sensitive match, already redacted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    kind: PiiKind,
    redacted_value: String,
    confidence: f64,
    span: (usize, usize),
}

impl Detection {
    /// Build a detection from a raw match. The raw value is redacted here and
    /// not retained.
    pub fn new(kind: PiiKind, matched: &str, confidence: f64, span: (usize, usize)) -> Self {
        Self {
            kind,
            redacted_value: redact(matched, kind),
            confidence: confidence.clamp(0.0, 1.0),
            span,
        }
    }

    pub fn kind(&self) -> PiiKind {
        self.kind
    }

    pub fn redacted_value(&self) -> &str {
        &self.redacted_value
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Byte offsets `(start, end)` of the match in the inspected text
    pub fn span(&self) -> (usize, usize) {
        self.span
    }
}

/// Outcome of inspecting one prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionResult {
    detections: Vec<Detection>,
    score: f64,
}

impl InspectionResult {
    fn empty() -> Self {
        Self::default()
    }

    /// Detections in catalog order
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn has_detections(&self) -> bool {
        !self.detections.is_empty()
    }

    /// Kind of every detection, duplicates included
    pub fn kinds(&self) -> Vec<PiiKind> {
        self.detections.iter().map(|d| d.kind).collect()
    }

    pub fn distinct_kinds(&self) -> BTreeSet<PiiKind> {
        self.detections.iter().map(|d| d.kind).collect()
    }

    pub fn into_parts(self) -> (Vec<Detection>, f64) {
        (self.detections, self.score)
    }
}

/// Combine the keyword count, detection count and distinct-kind count into
/// the aggregate score
pub fn aggregate_score(keyword_hits: usize, detections: usize, distinct_kinds: usize) -> f64 {
    let keyword_score = (keyword_hits as f64 * KEYWORD_WEIGHT).min(KEYWORD_CAP);
    let pattern_score = (detections as f64 * PATTERN_WEIGHT).min(PATTERN_CAP);
    let mut score = (keyword_score + pattern_score).min(1.0);
    if distinct_kinds >= 2 {
        score = (score + MULTI_KIND_BONUS).min(1.0);
    }
    score
}

/// Borrow the text out of a JSON value, rejecting every other type
pub fn expect_text(value: &serde_json::Value) -> Result<&str> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        other => Err(GatewayError::InvalidInput(format!(
            "Expected string, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Detects sensitive content and scores it
#[derive(Debug, Clone)]
pub struct ContentInspector {
    catalog: PatternCatalog,
    keywords: Vec<String>,
    checksum_mode: ChecksumMode,
}

impl ContentInspector {
    pub fn new(catalog: PatternCatalog, checksum_mode: ChecksumMode) -> Self {
        Self {
            catalog,
            keywords: SENSITIVE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            checksum_mode,
        }
    }

    /// Inspector over the Australian catalog with format-only validation
    pub fn australian() -> Result<Self> {
        Ok(Self::new(PatternCatalog::australian()?, ChecksumMode::FormatOnly))
    }

    /// Append keywords to the built-in list. Blank and duplicate entries are
    /// ignored.
    pub fn with_extra_keywords<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in extra {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
        self
    }

    pub fn checksum_mode(&self) -> ChecksumMode {
        self.checksum_mode
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Inspect text
    pub fn inspect(&self, text: &str) -> InspectionResult {
        if text.trim().is_empty() {
            return InspectionResult::empty();
        }

        let lowered = text.to_lowercase();
        let keyword_hits = self
            .keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .count();

        let mut detections = Vec::new();
        for detector in self.catalog.iter() {
            for m in detector.regex().find_iter(text) {
                let confidence = detector.confidence_for(m.as_str(), self.checksum_mode);
                detections.push(Detection::new(
                    detector.kind(),
                    m.as_str(),
                    confidence,
                    (m.start(), m.end()),
                ));
            }
        }

        let distinct = detections
            .iter()
            .map(|d| d.kind)
            .collect::<BTreeSet<_>>()
            .len();
        let score = aggregate_score(keyword_hits, detections.len(), distinct);

        tracing::debug!(
            keyword_hits,
            detections = detections.len(),
            distinct_kinds = distinct,
            score,
            "Content inspected"
        );

        InspectionResult { detections, score }
    }

    /// Inspect raw bytes, which must be UTF-8 text
    pub fn inspect_bytes(&self, bytes: &[u8]) -> Result<InspectionResult> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| GatewayError::InvalidInput(format!("Input is not UTF-8 text: {}", e)))?;
        Ok(self.inspect(text))
    }

    /// Inspect a JSON value, which must be a string
    pub fn inspect_value(&self, value: &serde_json::Value) -> Result<InspectionResult> {
        expect_text(value).map(|text| self.inspect(text))
    }
}
