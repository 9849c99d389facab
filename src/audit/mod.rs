//! Compliance audit trail
//!
//! One [`AuditRecord`] per processed request, appended to a JSONL file and
//! replayed newest-first for dashboards.

pub mod log;
pub mod record;
pub mod summary;

pub use log::{ComplianceLog, AUDIT_TARGET};
pub use record::AuditRecord;
pub use summary::AuditSummary;
