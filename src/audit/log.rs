//! Append-only compliance log
//!
//! Each record is written as one JSON line followed by one human-readable
//! summary line. Both lines go out in a single write under the log's lock,
//! so concurrent appends never interleave and readers holding the same lock
//! never see half a record. Only the JSON lines are read back.

use super::record::AuditRecord;
use crate::error::{GatewayError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Tracing target the console mirror of each record is emitted on
pub const AUDIT_TARGET: &str = "sovereign_audit";

/// File-backed JSONL audit log
#[derive(Debug)]
pub struct ComplianceLog {
    path: PathBuf,
    lock: Mutex<()>,
    writable: bool,
}

impl ComplianceLog {
    /// Open (creating if needed) the log file and its parent directory
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|e| {
                GatewayError::Audit(format!(
                    "Failed to create audit directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                GatewayError::Audit(format!(
                    "Failed to open audit file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        tracing::info!(path = %path.display(), "Compliance log opened");
        Ok(Self {
            path,
            lock: Mutex::new(()),
            writable: true,
        })
    }

    /// Handle for reading an existing log. Touches nothing on disk and
    /// refuses appends.
    pub fn open_read_only(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            writable: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record, returning any write failure
    pub async fn try_append(&self, record: &AuditRecord) -> Result<()> {
        if !self.writable {
            return Err(GatewayError::Audit(format!(
                "Audit file {} is open read-only",
                self.path.display()
            )));
        }
        let summary = record.summary_line();
        let mut buf = serde_json::to_string(record)?;
        buf.push('\n');
        buf.push_str(&summary);
        buf.push('\n');

        {
            let _guard = self.lock.lock().await;
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await
                .map_err(|e| {
                    GatewayError::Audit(format!(
                        "Failed to open audit file {}: {}",
                        self.path.display(),
                        e
                    ))
                })?;
            file.write_all(buf.as_bytes())
                .await
                .map_err(|e| GatewayError::Audit(format!("Failed to write audit record: {}", e)))?;
            file.sync_data()
                .await
                .map_err(|e| GatewayError::Audit(format!("Failed to sync audit file: {}", e)))?;
        }

        tracing::info!(target: AUDIT_TARGET, "{}", summary);
        Ok(())
    }

    /// Append a record. Failures are reported through diagnostics only and
    /// never reach the caller.
    pub async fn append(&self, record: &AuditRecord) {
        if let Err(e) = self.try_append(record).await {
            tracing::error!(
                path = %self.path.display(),
                route = %record.route,
                error = %e,
                "Audit record write failed"
            );
        }
    }

    /// Up to `limit` most recent records, newest first.
    ///
    /// A missing file reads as empty; lines that do not parse as records
    /// (summary lines, corruption) are skipped.
    pub async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let content = {
            let _guard = self.lock.lock().await;
            match fs::read_to_string(&self.path).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => {
                    return Err(GatewayError::Audit(format!(
                        "Failed to read audit file {}: {}",
                        self.path.display(),
                        e
                    )))
                }
            }
        };

        let records = content
            .lines()
            .rev()
            .map(str::trim)
            .filter(|line| line.starts_with('{'))
            .filter_map(|line| serde_json::from_str::<AuditRecord>(line).ok())
            .take(limit)
            .collect();
        Ok(records)
    }
}
