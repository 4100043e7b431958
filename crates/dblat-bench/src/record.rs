//! Operation records and the latency recorder.

use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::error::Result;

/// Kind of a single timed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Write,
    Read,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Write => "write",
            OpKind::Read => "read",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One measured operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRecord {
    /// Backend name (`sqlite`, `postgres`, `redis`).
    pub backend: &'static str,
    pub op: OpKind,
    pub payload_size: usize,
    /// Sequence index; global across workers for concurrent runs.
    pub index: usize,
    /// Latency of the adapter call in fractional milliseconds.
    pub latency_ms: f64,
    pub key: String,
    /// Worker id, present only for concurrent runs.
    pub worker: Option<usize>,
}

impl OperationRecord {
    /// CSV fields in header order. The worker column is emitted only when set.
    pub fn fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.backend.to_string(),
            self.op.to_string(),
            self.payload_size.to_string(),
            self.index.to_string(),
            self.latency_ms.to_string(),
            self.key.clone(),
        ];
        if let Some(worker) = self.worker {
            fields.push(worker.to_string());
        }
        fields
    }
}

/// Run `op` between two monotonic timestamps.
///
/// Returns the call's output and the elapsed time in fractional milliseconds.
/// Anything the caller prepares before invoking this (keys, payloads,
/// connections) stays outside the measured window.
pub fn timed<T>(op: impl FnOnce() -> Result<T>) -> Result<(T, f64)> {
    let start = Instant::now();
    let out = op()?;
    let elapsed = start.elapsed();
    Ok((out, elapsed.as_secs_f64() * 1_000.0))
}
