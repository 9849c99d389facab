//! Aggregate view over a window of audit records

use super::record::AuditRecord;
use crate::privacy::PiiKind;
use crate::types::Route;
use serde::Serialize;
use std::collections::BTreeMap;

/// Totals over a set of records, as shown on the compliance dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total: usize,
    pub cloud: usize,
    pub sovereign: usize,
    /// `sovereign / total`, 0.0 for an empty window
    pub sovereign_ratio: f64,
    pub mean_score: f64,
    pub mean_processing_time_ms: f64,
    /// Detections per kind across the window
    pub kind_counts: BTreeMap<PiiKind, usize>,
}

impl AuditSummary {
    pub fn from_records(records: &[AuditRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let total = records.len();
        let sovereign = records
            .iter()
            .filter(|r| r.route == Route::Sovereign)
            .count();
        let mut kind_counts = BTreeMap::new();
        for kind in records.iter().flat_map(|r| r.detected_kinds.iter()) {
            *kind_counts.entry(*kind).or_insert(0) += 1;
        }

        let n = total as f64;
        Self {
            total,
            cloud: total - sovereign,
            sovereign,
            sovereign_ratio: sovereign as f64 / n,
            mean_score: records.iter().map(|r| r.score).sum::<f64>() / n,
            mean_processing_time_ms: records.iter().map(|r| r.processing_time_ms).sum::<f64>() / n,
            kind_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window() {
        let summary = AuditSummary::from_records(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.sovereign_ratio, 0.0);
        assert!(summary.kind_counts.is_empty());
    }

    #[test]
    fn test_counts_and_means() {
        let records = vec![
            AuditRecord::new(
                Route::Sovereign,
                0.8,
                vec![PiiKind::Medicare, PiiKind::Postcode],
                "llama3 (local)",
                10,
                10,
                100.0,
            ),
            AuditRecord::new(Route::Cloud, 0.0, vec![], "gpt-4o", 10, 10, 50.0),
            AuditRecord::new(
                Route::Sovereign,
                0.4,
                vec![PiiKind::Postcode],
                "llama3 (local)",
                10,
                10,
                150.0,
            ),
            AuditRecord::new(Route::Cloud, 0.0, vec![], "gpt-4o", 10, 10, 100.0),
        ];
        let summary = AuditSummary::from_records(&records);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.sovereign, 2);
        assert_eq!(summary.cloud, 2);
        assert_eq!(summary.sovereign_ratio, 0.5);
        assert!((summary.mean_score - 0.3).abs() < 1e-9);
        assert_eq!(summary.mean_processing_time_ms, 100.0);
        assert_eq!(summary.kind_counts.get(&PiiKind::Postcode), Some(&2));
        assert_eq!(summary.kind_counts.get(&PiiKind::Medicare), Some(&1));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["kindCounts"]["postcode"], 2);
        assert_eq!(json["sovereignRatio"], 0.5);
    }
}
