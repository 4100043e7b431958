//! End-to-end runs against the bundled SQLite backend.

use std::fs;

use dblat_bench::runner::{run_concurrent, run_sequential};
use dblat_bench::{harness, Backend, BackendSelection, BenchConfig, Mode, RunPlan, SqliteBackend};

struct Scratch {
    dir: tempfile::TempDir,
}

impl Scratch {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn backend(&self) -> SqliteBackend {
        let backend = SqliteBackend::new(self.dir.path().join("bench.db"));
        backend.setup().unwrap();
        backend
    }

    fn config(&self) -> BenchConfig {
        BenchConfig::new()
            .with_backends(BackendSelection::Sqlite)
            .with_sqlite_path(self.dir.path().join("bench.db"))
            .with_out(self.dir.path().join("results/result.csv"))
            .with_payload_size(64)
            .with_warmup(2)
    }
}

#[test]
fn test_round_trip_and_missing_key() {
    let scratch = Scratch::new();
    let backend = scratch.backend();
    let mut conn = backend.connect().unwrap();

    let payload = dblat_bench::payload::generate(128);
    backend.write_one(&mut conn, "k1", &payload, true).unwrap();
    assert_eq!(backend.read_one(&mut conn, "k1").unwrap(), Some(payload));
    assert_eq!(backend.read_one(&mut conn, "nope").unwrap(), None);
}

#[test]
fn test_sequential_both_reads_back_written_values() {
    let scratch = Scratch::new();
    let backend = scratch.backend();
    let plan = RunPlan {
        mode: Mode::Both,
        ops: 20,
        payload_size: 16,
        warmup: 3,
        concurrency: 1,
    };

    let report = run_sequential(&backend, &plan).unwrap();
    assert_eq!(report.records.len(), 40);

    let mut conn = backend.connect().unwrap();
    for record in &report.records {
        let value = backend.read_one(&mut conn, &record.key).unwrap().unwrap();
        assert_eq!(value.len(), 16);
    }
}

#[test]
fn test_concurrent_workers_share_file() {
    let scratch = Scratch::new();
    let backend = scratch.backend();
    let plan = RunPlan {
        mode: Mode::Read,
        ops: 40,
        payload_size: 16,
        warmup: 0,
        concurrency: 4,
    };

    let report = run_concurrent(&backend, &plan).unwrap();
    assert_eq!(report.records.len(), 40);
    assert!(report.records.iter().all(|r| r.worker.is_some()));
}

#[test]
fn test_harness_writes_sequential_csv() {
    let scratch = Scratch::new();
    let config = scratch.config().with_ops(15);

    let reports = harness::run(&config).unwrap();
    assert_eq!(reports.len(), 1);

    let report = &reports[0];
    assert_eq!(report.csv_path, scratch.dir.path().join("results/sqlite_seq_64.csv"));
    assert_eq!(report.summary.unwrap().count, 15);

    let content = fs::read_to_string(&report.csv_path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 16);
    assert_eq!(lines[0], "db,op,payload_size,index,latency_ms,key");
    assert!(lines[1].starts_with("sqlite,write,64,0,"));
    assert!(lines[1].ends_with(",sqlite_k_64_0"));
}

#[test]
fn test_harness_writes_concurrent_csv() {
    let scratch = Scratch::new();
    let config = scratch.config().with_ops(10).with_concurrency(3).with_mode(Mode::Both);

    let reports = harness::run(&config).unwrap();
    let report = &reports[0];
    assert_eq!(
        report.csv_path,
        scratch.dir.path().join("results/sqlite_concurrency_64_th3.csv")
    );
    // 3 workers x 3 iterations x (write + read)
    assert_eq!(report.summary.unwrap().count, 18);

    let content = fs::read_to_string(&report.csv_path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("db,op,payload_size,index,latency_ms,key,thread")
    );
    assert_eq!(lines.count(), 18);
}

#[test]
fn test_harness_rerun_overwrites_results() {
    let scratch = Scratch::new();

    harness::run(&scratch.config().with_ops(30)).unwrap();
    let reports = harness::run(&scratch.config().with_ops(5)).unwrap();

    let content = fs::read_to_string(&reports[0].csv_path).unwrap();
    assert_eq!(content.lines().count(), 6);
}

#[test]
fn test_harness_rejects_invalid_config() {
    let scratch = Scratch::new();
    let result = harness::run(&scratch.config().with_payload_size(0));
    assert!(matches!(result, Err(dblat_bench::Error::Config(_))));
    assert!(!scratch.dir.path().join("bench.db").exists());
}
