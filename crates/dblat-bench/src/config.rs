//! Harness configuration.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::backends::{postgres, redis, sqlite, BackendKind};
use crate::error::{Error, Result};
use crate::format::OutputFormat;
use crate::pool::DEFAULT_MAX_IDLE;
use crate::runner::RunPlan;

/// Default total operation count.
pub const DEFAULT_OPS: usize = 2000;

/// Default payload size in bytes.
pub const DEFAULT_PAYLOAD_SIZE: usize = 256;

/// Default worker count. One selects the sequential runner.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Default warmup iterations for sequential runs.
pub const DEFAULT_WARMUP: usize = 10;

/// Default base output path. Result files land in its parent directory.
pub const DEFAULT_OUT: &str = "results/result.csv";

/// Which timed operations each iteration performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One timed write.
    Write,
    /// An untimed write, then one timed read.
    Read,
    /// A timed write, then a timed read of the same key.
    Both,
}

impl Mode {
    /// Whether iterations time a write.
    pub fn writes(&self) -> bool {
        matches!(self, Mode::Write | Mode::Both)
    }

    /// Whether iterations time a read.
    pub fn reads(&self) -> bool {
        matches!(self, Mode::Read | Mode::Both)
    }

    /// Timed operations per iteration.
    pub fn ops_per_iteration(&self) -> usize {
        usize::from(self.writes()) + usize::from(self.reads())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Write => write!(f, "write"),
            Mode::Read => write!(f, "read"),
            Mode::Both => write!(f, "both"),
        }
    }
}

/// Backends selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendSelection {
    Sqlite,
    Postgres,
    Redis,
    All,
}

impl BackendSelection {
    /// Selected kinds in benchmark order.
    pub fn kinds(&self) -> Vec<BackendKind> {
        match self {
            BackendSelection::Sqlite => vec![BackendKind::Sqlite],
            BackendSelection::Postgres => vec![BackendKind::Postgres],
            BackendSelection::Redis => vec![BackendKind::Redis],
            BackendSelection::All => BackendKind::ALL.to_vec(),
        }
    }
}

/// Harness configuration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Backends to exercise.
    pub backends: BackendSelection,

    /// Total operations: the loop count for sequential runs, divided across
    /// workers for concurrent runs.
    pub ops: usize,

    /// Payload size in bytes.
    pub payload_size: usize,

    /// Operation kinds per iteration.
    pub mode: Mode,

    /// Worker count.
    pub concurrency: usize,

    /// Warmup iterations before the sequential measured loop.
    pub warmup: usize,

    /// Base output path.
    pub out: PathBuf,

    /// SQLite database file.
    pub sqlite_path: PathBuf,

    /// PostgreSQL connection URL.
    pub postgres_url: String,

    /// Redis server URL.
    pub redis_url: String,

    /// Idle connections kept by the Redis pool.
    pub redis_pool_size: usize,

    /// Summary rendering.
    pub format: OutputFormat,
}

impl BenchConfig {
    pub fn new() -> Self {
        Self {
            backends: BackendSelection::All,
            ops: DEFAULT_OPS,
            payload_size: DEFAULT_PAYLOAD_SIZE,
            mode: Mode::Write,
            concurrency: DEFAULT_CONCURRENCY,
            warmup: DEFAULT_WARMUP,
            out: PathBuf::from(DEFAULT_OUT),
            sqlite_path: PathBuf::from(sqlite::DEFAULT_PATH),
            postgres_url: postgres::DEFAULT_URL.to_string(),
            redis_url: redis::DEFAULT_URL.to_string(),
            redis_pool_size: DEFAULT_MAX_IDLE,
            format: OutputFormat::Text,
        }
    }

    /// Set the backend selection.
    pub fn with_backends(mut self, backends: BackendSelection) -> Self {
        self.backends = backends;
        self
    }

    /// Set the total operation count.
    pub fn with_ops(mut self, ops: usize) -> Self {
        self.ops = ops;
        self
    }

    /// Set the payload size.
    pub fn with_payload_size(mut self, size: usize) -> Self {
        self.payload_size = size;
        self
    }

    /// Set the operation mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the worker count.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the warmup iteration count.
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    /// Set the base output path.
    pub fn with_out(mut self, out: impl Into<PathBuf>) -> Self {
        self.out = out.into();
        self
    }

    /// Set the SQLite database file.
    pub fn with_sqlite_path(mut self, path: impl AsRef<Path>) -> Self {
        self.sqlite_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the PostgreSQL URL.
    pub fn with_postgres_url(mut self, url: impl Into<String>) -> Self {
        self.postgres_url = url.into();
        self
    }

    /// Set the Redis URL.
    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = url.into();
        self
    }

    /// Set the Redis idle pool size.
    pub fn with_redis_pool_size(mut self, size: usize) -> Self {
        self.redis_pool_size = size;
        self
    }

    /// Set the summary format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Reject configurations the runners cannot execute.
    pub fn validate(&self) -> Result<()> {
        if self.payload_size == 0 {
            return Err(Error::Config("payload size must be positive".into()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".into()));
        }
        if self.ops == 0 {
            return Err(Error::Config("operation count must be positive".into()));
        }
        if self.concurrency > 1 && self.ops < self.concurrency {
            return Err(Error::Config(format!(
                "{} operations cannot be split across {} workers",
                self.ops, self.concurrency
            )));
        }
        Ok(())
    }

    /// Directory receiving the per-backend result files.
    pub fn results_dir(&self) -> PathBuf {
        match self.out.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Runner parameters derived from this configuration.
    pub fn plan(&self) -> RunPlan {
        RunPlan {
            mode: self.mode,
            ops: self.ops,
            payload_size: self.payload_size,
            warmup: self.warmup,
            concurrency: self.concurrency,
        }
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self::new()
    }
}
