//! Latency summary statistics.

use serde::Serialize;

/// Summary of a latency sequence, all values in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    /// Population standard deviation.
    pub std_ms: f64,
}

impl Summary {
    /// Summarize `latencies`. Returns `None` for an empty sequence.
    pub fn from_latencies(latencies: &[f64]) -> Option<Self> {
        if latencies.is_empty() {
            return None;
        }

        let count = latencies.len();
        let mean = latencies.iter().sum::<f64>() / count as f64;
        let variance = latencies.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

        let mut sorted = latencies.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            count,
            mean_ms: mean,
            p50_ms: percentile(&sorted, 50.0),
            p95_ms: percentile(&sorted, 95.0),
            p99_ms: percentile(&sorted, 99.0),
            std_ms: variance.sqrt(),
        })
    }
}

/// Percentile `pct` (0 to 100) of an ascending, non-empty slice, linearly
/// interpolated between the two closest ranks.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
