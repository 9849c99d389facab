//! Performance benchmarks for sovereign-gateway
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use sovereign_gateway::audit::{AuditRecord, ComplianceLog};
use sovereign_gateway::privacy::{redact, ContentInspector, PiiKind};
use sovereign_gateway::Route;

const BENIGN: &str = "What is the capital of Australia and how many people live there?";
const SENSITIVE: &str = "Patient Jane, Medicare 1234 567 890, TFN 123456782, \
                         mobile 0412 345 678, email jane@example.com, BSB 062-000, \
                         account 12345678. Diagnosis attached, please keep confidential.";

fn bench_inspect(c: &mut Criterion) {
    let inspector = ContentInspector::australian().unwrap();

    c.bench_function("inspect benign", |b| {
        b.iter(|| inspector.inspect(BENIGN));
    });

    c.bench_function("inspect sensitive", |b| {
        b.iter(|| inspector.inspect(SENSITIVE));
    });

    let long = SENSITIVE.repeat(50);
    c.bench_function("inspect 50x sensitive", |b| {
        b.iter(|| inspector.inspect(&long));
    });
}

fn bench_redact(c: &mut Criterion) {
    c.bench_function("redact medicare", |b| {
        b.iter(|| redact("1234 567 890", PiiKind::Medicare));
    });
    c.bench_function("redact email", |b| {
        b.iter(|| redact("jane.citizen@example.com.au", PiiKind::Email));
    });
}

fn bench_audit_append(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = tempfile::TempDir::new().unwrap();
    let log = rt
        .block_on(ComplianceLog::open(dir.path().join("bench_audit.log")))
        .unwrap();
    let record = AuditRecord::new(
        Route::Sovereign,
        0.9,
        vec![PiiKind::Medicare, PiiKind::Postcode],
        "llama3 (local)",
        120,
        480,
        850.0,
    );

    c.bench_function("ComplianceLog append", |b| {
        b.to_async(&rt).iter(|| log.try_append(&record));
    });

    c.bench_function("ComplianceLog recent(50)", |b| {
        b.to_async(&rt).iter(|| log.recent(50));
    });
}

criterion_group!(benches, bench_inspect, bench_redact, bench_audit_append);
criterion_main!(benches);
