//! Orchestration of a full benchmark invocation.
//!
//! Constructs the selected backends, runs `setup` on all of them, then runs
//! each backend in turn, flushing its result file and summarizing its latencies.

use std::path::PathBuf;

use tracing::info;

use crate::backends::{AnyBackend, BackendKind};
use crate::config::BenchConfig;
use crate::error::Result;
use crate::stats::Summary;

/// Outcome of one backend run.
#[derive(Debug, Clone)]
pub struct BackendReport {
    pub kind: BackendKind,
    pub payload_size: usize,
    /// Result file written for the run.
    pub csv_path: PathBuf,
    /// `None` when the run captured no records.
    pub summary: Option<Summary>,
}

/// Run every backend selected by `config`.
///
/// The first error aborts the invocation; result files of backends that
/// already finished stay on disk.
pub fn run(config: &BenchConfig) -> Result<Vec<BackendReport>> {
    run_with(config, |_| {})
}

/// Like [`run`], invoking `on_report` as soon as each backend finishes.
pub fn run_with<F>(config: &BenchConfig, mut on_report: F) -> Result<Vec<BackendReport>>
where
    F: FnMut(&BackendReport),
{
    config.validate()?;

    let targets = config
        .backends
        .kinds()
        .into_iter()
        .map(|kind| AnyBackend::open(kind, config))
        .collect::<Result<Vec<_>>>()?;

    for backend in &targets {
        info!(backend = backend.name(), "setting up");
        backend.setup()?;
    }

    let plan = config.plan();
    let dir = config.results_dir();
    let mut reports = Vec::with_capacity(targets.len());

    for backend in &targets {
        info!(backend = backend.name(), "running");
        let run = backend.run(&plan)?;
        let csv_path = run.flush(&dir)?;
        let summary = Summary::from_latencies(&run.latencies());

        info!(
            backend = backend.name(),
            records = run.records.len(),
            path = %csv_path.display(),
            "results written"
        );

        let report = BackendReport {
            kind: backend.kind(),
            payload_size: plan.payload_size,
            csv_path,
            summary,
        };
        on_report(&report);
        reports.push(report);
    }

    Ok(reports)
}
