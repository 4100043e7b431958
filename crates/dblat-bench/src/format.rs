//! Summary output formatting.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use serde::Serialize;

use crate::stats::Summary;

/// Output format for run summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table
    Text,
    /// One JSON object per backend
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Summary line for one backend run.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow<'a> {
    pub backend: &'a str,
    pub payload_size: usize,
    #[serde(flatten)]
    pub summary: &'a Summary,
}

/// Render summaries in `format`.
pub fn render(rows: &[SummaryRow<'_>], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_table(rows)),
        OutputFormat::Json => render_json(rows),
    }
}

fn render_table(rows: &[SummaryRow<'_>]) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("db"),
        Cell::new("payload"),
        Cell::new("count"),
        Cell::new("mean (ms)"),
        Cell::new("p50 (ms)"),
        Cell::new("p95 (ms)"),
        Cell::new("p99 (ms)"),
        Cell::new("std (ms)"),
    ]);

    for row in rows {
        let s = row.summary;
        table.add_row(vec![
            Cell::new(row.backend),
            Cell::new(row.payload_size),
            Cell::new(s.count),
            Cell::new(format!("{:.3}", s.mean_ms)),
            Cell::new(format!("{:.3}", s.p50_ms)),
            Cell::new(format!("{:.3}", s.p95_ms)),
            Cell::new(format!("{:.3}", s.p99_ms)),
            Cell::new(format!("{:.3}", s.std_ms)),
        ]);
    }

    table.to_string()
}

fn render_json(rows: &[SummaryRow<'_>]) -> serde_json::Result<String> {
    let lines = rows
        .iter()
        .map(serde_json::to_string)
        .collect::<serde_json::Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}
