//! Sequential and concurrent runners.
//!
//! Both runners time exactly one adapter call per record. Keys, payloads and
//! connections are prepared before the clock starts.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::backends::{close_quietly, Backend};
use crate::config::Mode;
use crate::error::Result;
use crate::payload;
use crate::record::{timed, OpKind, OperationRecord};
use crate::writer::{self, CONCURRENT_HEADER, SEQUENTIAL_HEADER};

/// Parameters of a single backend run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub mode: Mode,
    /// Sequential loop count, or the total divided across workers.
    pub ops: usize,
    pub payload_size: usize,
    /// Warmup iterations; sequential runs only.
    pub warmup: usize,
    /// Worker count. One selects the sequential runner.
    pub concurrency: usize,
}

impl RunPlan {
    /// Operations each worker executes. The remainder of the division is dropped.
    pub fn ops_per_worker(&self) -> usize {
        self.ops / self.concurrency.max(1)
    }

    pub fn is_concurrent(&self) -> bool {
        self.concurrency > 1
    }
}

/// How a run was executed; selects the result header and file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLayout {
    Sequential,
    Concurrent { threads: usize },
}

/// Records captured by one run, in execution order (worker order for
/// concurrent runs).
#[derive(Debug, Clone)]
pub struct RunReport {
    pub backend: &'static str,
    pub payload_size: usize,
    pub layout: RunLayout,
    pub records: Vec<OperationRecord>,
}

impl RunReport {
    /// Latencies in record order.
    pub fn latencies(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.latency_ms).collect()
    }

    pub fn header(&self) -> &'static [&'static str] {
        match self.layout {
            RunLayout::Sequential => SEQUENTIAL_HEADER,
            RunLayout::Concurrent { .. } => CONCURRENT_HEADER,
        }
    }

    /// Result file path inside `dir`.
    pub fn output_path(&self, dir: &Path) -> PathBuf {
        let threads = match self.layout {
            RunLayout::Sequential => None,
            RunLayout::Concurrent { threads } => Some(threads),
        };
        writer::output_path(dir, self.backend, self.payload_size, threads)
    }

    /// Write all records to the result file inside `dir`, replacing any
    /// previous file for the same parameters.
    pub fn flush(&self, dir: &Path) -> Result<PathBuf> {
        let path = self.output_path(dir);
        writer::write_csv(&path, self.header(), self.records.iter().map(|r| r.fields()))?;
        Ok(path)
    }
}

/// Key for iteration `index` of a sequential run.
pub fn sequential_key(backend: &str, payload_size: usize, index: usize) -> String {
    format!("{backend}_k_{payload_size}_{index}")
}

/// Key for global index `index` executed by `worker`.
pub fn worker_key(backend: &str, worker: usize, payload_size: usize, index: usize) -> String {
    format!("{backend}_t{worker}_k_{payload_size}_{index}")
}

/// Whether a timed read is preceded by an untimed write of the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadSeed {
    /// Only in `read` mode; `both` reads the key its timed write just stored.
    ReadModeOnly,
    /// Before every timed read.
    Always,
}

impl ReadSeed {
    fn applies(self, mode: Mode) -> bool {
        self == ReadSeed::Always || mode == Mode::Read
    }
}

/// One prepared iteration.
struct Iteration {
    index: usize,
    key: String,
    payload: Vec<u8>,
    worker: Option<usize>,
}

impl Iteration {
    fn record(&self, backend: &'static str, op: OpKind, latency_ms: f64) -> OperationRecord {
        OperationRecord {
            backend,
            op,
            payload_size: self.payload.len(),
            index: self.index,
            latency_ms,
            key: self.key.clone(),
            worker: self.worker,
        }
    }
}

fn execute<B: Backend>(
    backend: &B,
    conn: &mut B::Conn,
    mode: Mode,
    seed: ReadSeed,
    it: &Iteration,
    out: &mut Vec<OperationRecord>,
) -> Result<()> {
    if mode.writes() {
        let ((), ms) = timed(|| backend.write_one(conn, &it.key, &it.payload, true))?;
        out.push(it.record(backend.name(), OpKind::Write, ms));
    }
    if mode.reads() {
        if seed.applies(mode) {
            backend.write_one(conn, &it.key, &it.payload, true)?;
        }
        let (_, ms) = timed(|| backend.read_one(conn, &it.key))?;
        out.push(it.record(backend.name(), OpKind::Read, ms));
    }
    Ok(())
}

/// Run `plan` with the sequential runner when `concurrency` is one, otherwise
/// with the concurrent runner.
pub fn run<B: Backend>(backend: &B, plan: &RunPlan) -> Result<RunReport> {
    if plan.is_concurrent() {
        run_concurrent(backend, plan)
    } else {
        run_sequential(backend, plan)
    }
}

/// Sequential runner: warmup, then `plan.ops` iterations each on a fresh
/// connection.
pub fn run_sequential<B: Backend>(backend: &B, plan: &RunPlan) -> Result<RunReport> {
    let name = backend.name();

    debug!(backend = name, iterations = plan.warmup, "warmup");
    for i in 0..plan.warmup {
        let key = format!("warmup_{i}");
        let mut conn = backend.connect()?;
        if plan.mode.writes() {
            backend.write_one(&mut conn, &key, &payload::generate(plan.payload_size), true)?;
        }
        if plan.mode.reads() {
            backend.read_one(&mut conn, &key)?;
        }
        close_quietly(backend, conn);
    }

    info!(backend = name, ops = plan.ops, mode = %plan.mode, "sequential run");
    let mut records = Vec::new();
    for index in 0..plan.ops {
        let it = Iteration {
            index,
            key: sequential_key(name, plan.payload_size, index),
            payload: payload::generate(plan.payload_size),
            worker: None,
        };
        let mut conn = backend.connect()?;
        execute(backend, &mut conn, plan.mode, ReadSeed::ReadModeOnly, &it, &mut records)?;
        close_quietly(backend, conn);
    }

    Ok(RunReport {
        backend: name,
        payload_size: plan.payload_size,
        layout: RunLayout::Sequential,
        records,
    })
}

/// Concurrent runner: `plan.concurrency` workers, each owning one connection
/// for its partition. Results are merged only after every worker has finished.
pub fn run_concurrent<B: Backend>(backend: &B, plan: &RunPlan) -> Result<RunReport> {
    let threads = plan.concurrency.max(1);
    let ops_per = plan.ops_per_worker();
    let dropped = plan.ops - ops_per * threads;

    info!(
        backend = backend.name(),
        threads,
        ops_per,
        dropped,
        mode = %plan.mode,
        "concurrent run"
    );

    let results: Vec<Result<Vec<OperationRecord>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|worker| scope.spawn(move || run_worker(backend, plan, worker, ops_per)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    });

    let mut records = Vec::new();
    for worker_records in results {
        records.extend(worker_records?);
    }

    Ok(RunReport {
        backend: backend.name(),
        payload_size: plan.payload_size,
        layout: RunLayout::Concurrent { threads },
        records,
    })
}

fn run_worker<B: Backend>(
    backend: &B,
    plan: &RunPlan,
    worker: usize,
    ops_per: usize,
) -> Result<Vec<OperationRecord>> {
    let name = backend.name();
    let mut conn = backend.connect()?;
    let mut records = Vec::new();

    for i in 0..ops_per {
        let index = worker * ops_per + i;
        let it = Iteration {
            index,
            key: worker_key(name, worker, plan.payload_size, index),
            payload: payload::generate(plan.payload_size),
            worker: Some(worker),
        };
        execute(backend, &mut conn, plan.mode, ReadSeed::Always, &it, &mut records)?;
    }

    close_quietly(backend, conn);
    debug!(backend = name, worker, records = records.len(), "worker finished");
    Ok(records)
}
