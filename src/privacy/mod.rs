//! Sensitive content detection
//!
//! - Pattern catalog of jurisdiction-specific identifier detectors
//! - Checksum validators for numeric identifiers
//! - Partial redaction of matched values
//! - Content inspector combining detectors with a keyword scorer

pub mod catalog;
pub mod inspector;
pub mod redact;
pub mod validate;

pub use catalog::{
    Detector, DetectorSpec, PatternCatalog, PiiKind, RedactionClass, AUSTRALIAN_DETECTORS,
};
pub use inspector::{
    aggregate_score, expect_text, ContentInspector, Detection, InspectionResult,
    SENSITIVE_KEYWORDS,
};
pub use redact::redact;
pub use validate::{validate_medicare, validate_tfn, ChecksumMode};
