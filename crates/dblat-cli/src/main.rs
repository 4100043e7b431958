//! dblat - latency benchmark driver.

mod args;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::Args;
use dblat_bench::format::{render, SummaryRow};
use dblat_bench::harness;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dblat=info,dblat_bench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!(error = %e, "benchmark failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.into_config();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backends = ?config.backends,
        ops = config.ops,
        payload = config.payload_size,
        mode = %config.mode,
        concurrency = config.concurrency,
        "starting benchmark"
    );

    let format = config.format;
    let mut render_error = None;
    harness::run_with(&config, |report| match &report.summary {
        Some(summary) => {
            let row = SummaryRow {
                backend: report.kind.name(),
                payload_size: report.payload_size,
                summary,
            };
            match render(&[row], format) {
                Ok(out) => println!("{}", out),
                Err(e) => {
                    render_error.get_or_insert(e);
                }
            }
        }
        None => {
            tracing::warn!(backend = report.kind.name(), "no measurements captured");
        }
    })?;

    match render_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
