//! SQLite backend.
//!
//! Each connection opens the database file directly. Concurrent workers rely on
//! SQLite's busy timeout to serialize writers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use super::Backend;
use crate::error::{Error, Result};

pub const NAME: &str = "sqlite";

/// Default database file, relative to the working directory.
pub const DEFAULT_PATH: &str = "test_sqlite.db";

/// How long a connection waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// SQLite backend for latency runs.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl Backend for SqliteBackend {
    type Conn = Connection;

    fn name(&self) -> &'static str {
        NAME
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).map_err(|e| Error::connection(NAME, e))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| Error::connection(NAME, e))?;
        Ok(conn)
    }

    fn setup(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch("CREATE TABLE IF NOT EXISTS kv (k TEXT PRIMARY KEY, v BLOB)")
            .map_err(|e| Error::schema_setup(NAME, e))?;
        super::close_quietly(self, conn);
        Ok(())
    }

    fn write_one(&self, conn: &mut Connection, key: &str, payload: &[u8], commit: bool) -> Result<()> {
        // Uncommitted writes accumulate in one open transaction until a
        // committing write flushes it.
        if !commit && conn.is_autocommit() {
            conn.execute_batch("BEGIN")?;
        }
        conn.execute(
            "INSERT OR REPLACE INTO kv (k, v) VALUES (?1, ?2)",
            params![key, payload],
        )?;
        if commit && !conn.is_autocommit() {
            conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn read_one(&self, conn: &mut Connection, key: &str) -> Result<Option<Vec<u8>>> {
        let value = conn
            .query_row("SELECT v FROM kv WHERE k = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn close(&self, conn: Connection) -> Result<()> {
        conn.close().map_err(|(_, e)| Error::Sqlite(e))
    }
}
