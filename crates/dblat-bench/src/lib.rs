//! dblat - read/write latency harness.
//!
//! Measures per-operation latency against SQLite, PostgreSQL and Redis through
//! a common [`Backend`] interface, either on a single connection loop or across
//! a fixed pool of worker threads.
//!
//! # Components
//!
//! - **Payload**: random buffers, one per operation
//! - **Backends**: SQLite, PostgreSQL and Redis adapters
//! - **Runner**: sequential and concurrent drivers producing [`OperationRecord`]s
//! - **Writer**: per-run CSV result files
//! - **Stats**: count, mean, p50/p95/p99 and standard deviation
//! - **Harness**: setup, run and summarize every selected backend

pub mod backends;
pub mod config;
pub mod error;
pub mod format;
pub mod harness;
pub mod payload;
pub mod pool;
pub mod record;
pub mod runner;
pub mod stats;
pub mod writer;

pub use backends::{AnyBackend, Backend, BackendKind, PostgresBackend, RedisBackend, SqliteBackend};
pub use config::{BackendSelection, BenchConfig, Mode};
pub use error::{Error, Result};
pub use format::{OutputFormat, SummaryRow};
pub use harness::BackendReport;
pub use record::{OpKind, OperationRecord};
pub use runner::{RunLayout, RunPlan, RunReport};
pub use stats::Summary;
