//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use dblat_bench::backends::{postgres, redis, sqlite};
use dblat_bench::config::{
    DEFAULT_CONCURRENCY, DEFAULT_OPS, DEFAULT_OUT, DEFAULT_PAYLOAD_SIZE, DEFAULT_WARMUP,
};
use dblat_bench::pool::DEFAULT_MAX_IDLE;
use dblat_bench::{BackendSelection, BenchConfig, Mode, OutputFormat};

/// Read/write latency benchmark for SQLite, PostgreSQL and Redis
#[derive(Parser, Debug)]
#[command(name = "dblat")]
#[command(version, about = "Read/write latency benchmark for SQLite, PostgreSQL and Redis", long_about = None)]
pub struct Args {
    /// Backend(s) to exercise.
    #[arg(long, value_enum, default_value_t = BackendSelection::All)]
    pub db: BackendSelection,

    /// Total operations (divided across workers when concurrency > 1).
    #[arg(long, default_value_t = DEFAULT_OPS)]
    pub ops: usize,

    /// Payload size in bytes.
    #[arg(long, default_value_t = DEFAULT_PAYLOAD_SIZE)]
    pub payload: usize,

    /// Timed operation(s) per iteration.
    #[arg(long, value_enum, default_value_t = Mode::Write)]
    pub mode: Mode,

    /// Worker count; 1 runs sequentially.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Base output path; result files are written to its directory.
    #[arg(long, default_value = DEFAULT_OUT)]
    pub out: PathBuf,

    /// Warmup iterations before a sequential run.
    #[arg(long, default_value_t = DEFAULT_WARMUP)]
    pub warmup: usize,

    /// SQLite database file.
    #[arg(long, default_value = sqlite::DEFAULT_PATH)]
    pub sqlite_path: PathBuf,

    /// PostgreSQL connection URL.
    #[arg(long, default_value = postgres::DEFAULT_URL)]
    pub postgres_url: String,

    /// Redis server URL.
    #[arg(long, default_value = redis::DEFAULT_URL)]
    pub redis_url: String,

    /// Idle connections kept by the Redis pool.
    #[arg(long, default_value_t = DEFAULT_MAX_IDLE)]
    pub redis_pool_size: usize,

    /// Summary output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Args {
    /// Convert command-line arguments to harness configuration.
    pub fn into_config(self) -> BenchConfig {
        BenchConfig::new()
            .with_backends(self.db)
            .with_ops(self.ops)
            .with_payload_size(self.payload)
            .with_mode(self.mode)
            .with_concurrency(self.concurrency)
            .with_out(self.out)
            .with_warmup(self.warmup)
            .with_sqlite_path(self.sqlite_path)
            .with_postgres_url(self.postgres_url)
            .with_redis_url(self.redis_url)
            .with_redis_pool_size(self.redis_pool_size)
            .with_format(self.format)
    }
}
