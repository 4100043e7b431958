//! Backend adapters.
//!
//! Each adapter exposes the same capability set over a native client so the
//! runners can drive SQLite, PostgreSQL and Redis identically.

pub mod postgres;
pub mod redis;
pub mod sqlite;

use std::fmt;

use serde::Serialize;

use crate::config::BenchConfig;
use crate::error::Result;
use crate::runner::{self, RunPlan, RunReport};

pub use self::postgres::PostgresBackend;
pub use self::redis::RedisBackend;
pub use self::sqlite::SqliteBackend;

/// Capability set shared by all benchmarked stores.
///
/// Connections are owned by exactly one runner loop or worker thread at a
/// time. Adapters themselves are shared by reference across workers.
pub trait Backend: Sync {
    /// Connection handle opened by [`Backend::connect`].
    type Conn;

    /// Short backend name used in keys, records and file names.
    fn name(&self) -> &'static str;

    /// Open (or check out) a connection.
    fn connect(&self) -> Result<Self::Conn>;

    /// Ensure the `kv` table exists. Idempotent.
    fn setup(&self) -> Result<()>;

    /// Insert or overwrite `key`. With `commit` set the write is durable on return.
    fn write_one(&self, conn: &mut Self::Conn, key: &str, payload: &[u8], commit: bool)
        -> Result<()>;

    /// Read the value stored under `key`, `None` if it was never written.
    fn read_one(&self, conn: &mut Self::Conn, key: &str) -> Result<Option<Vec<u8>>>;

    /// Close a connection, reporting any failure.
    fn close(&self, conn: Self::Conn) -> Result<()>;
}

/// Close `conn`, discarding any error.
pub fn close_quietly<B: Backend + ?Sized>(backend: &B, conn: B::Conn) {
    if let Err(e) = backend.close(conn) {
        tracing::debug!(backend = backend.name(), error = %e, "close failed, ignoring");
    }
}

/// The closed set of supported stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Sqlite,
    Postgres,
    Redis,
}

impl BackendKind {
    /// All kinds, in the order they are benchmarked.
    pub const ALL: [BackendKind; 3] = [
        BackendKind::Sqlite,
        BackendKind::Postgres,
        BackendKind::Redis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Sqlite => sqlite::NAME,
            BackendKind::Postgres => postgres::NAME,
            BackendKind::Redis => redis::NAME,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A constructed adapter of any kind.
pub enum AnyBackend {
    Sqlite(SqliteBackend),
    Postgres(PostgresBackend),
    Redis(RedisBackend),
}

impl AnyBackend {
    /// Construct the adapter for `kind` from the harness configuration.
    ///
    /// No connection is opened here; unreachable servers surface on the first
    /// `setup` or `connect`.
    pub fn open(kind: BackendKind, config: &BenchConfig) -> Result<Self> {
        Ok(match kind {
            BackendKind::Sqlite => AnyBackend::Sqlite(SqliteBackend::new(&config.sqlite_path)),
            BackendKind::Postgres => {
                AnyBackend::Postgres(PostgresBackend::new(&config.postgres_url)?)
            }
            BackendKind::Redis => AnyBackend::Redis(RedisBackend::new(
                &config.redis_url,
                config.redis_pool_size,
            )?),
        })
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            AnyBackend::Sqlite(_) => BackendKind::Sqlite,
            AnyBackend::Postgres(_) => BackendKind::Postgres,
            AnyBackend::Redis(_) => BackendKind::Redis,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn setup(&self) -> Result<()> {
        match self {
            AnyBackend::Sqlite(b) => b.setup(),
            AnyBackend::Postgres(b) => b.setup(),
            AnyBackend::Redis(b) => b.setup(),
        }
    }

    /// Run `plan` against this backend with the runner it selects.
    pub fn run(&self, plan: &RunPlan) -> Result<RunReport> {
        match self {
            AnyBackend::Sqlite(b) => runner::run(b, plan),
            AnyBackend::Postgres(b) => runner::run(b, plan),
            AnyBackend::Redis(b) => runner::run(b, plan),
        }
    }
}

impl fmt::Debug for AnyBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyBackend").field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let names: Vec<_> = BackendKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["sqlite", "postgres", "redis"]);
    }

    #[test]
    fn test_open_sqlite_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.db");
        let config = BenchConfig::default().with_sqlite_path(&path);

        let backend = AnyBackend::open(BackendKind::Sqlite, &config).unwrap();
        assert_eq!(backend.kind(), BackendKind::Sqlite);
        assert!(!path.exists());
    }
}
