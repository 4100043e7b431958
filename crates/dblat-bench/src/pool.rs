//! Connection pooling for the Redis backend.
//!
//! A synchronous checkout pool shared by every worker. Each checked-out
//! connection is used by one worker at a time and goes back to the idle list
//! when dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use redis::ConnectionLike;

use crate::error::{Error, Result};

/// Default number of idle connections kept for reuse.
pub const DEFAULT_MAX_IDLE: usize = 10;

/// Configuration for the connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Server URL, e.g. `redis://localhost:6379/`.
    pub url: String,
    /// Maximum number of idle connections retained. Extra returns are closed.
    pub max_idle: usize,
}

impl PoolConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_idle: DEFAULT_MAX_IDLE,
        }
    }

    /// Set the idle connection cap.
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }
}

/// Internal pool state.
struct PoolInner {
    client: redis::Client,
    max_idle: usize,
    idle: Mutex<Vec<redis::Connection>>,
    opened: AtomicU64,
}

impl PoolInner {
    fn acquire(&self) -> Result<redis::Connection> {
        {
            let mut idle = self.idle.lock();
            while let Some(conn) = idle.pop() {
                if conn.is_open() {
                    return Ok(conn);
                }
                // Dead connection, discard it
            }
        }

        let conn = self
            .client
            .get_connection()
            .map_err(|e| Error::connection(crate::backends::redis::NAME, e))?;
        self.opened.fetch_add(1, Ordering::Relaxed);
        Ok(conn)
    }

    fn release(&self, conn: redis::Connection) {
        if !conn.is_open() {
            return;
        }
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(conn);
        }
    }
}

/// A connection checked out of a [`ConnectionPool`].
pub struct PooledConnection {
    connection: Option<redis::Connection>,
    pool: Arc<PoolInner>,
}

impl PooledConnection {
    /// Borrow the underlying connection.
    pub fn get(&mut self) -> Result<&mut redis::Connection> {
        self.connection
            .as_mut()
            .ok_or_else(|| Error::connection(crate::backends::redis::NAME, "connection released"))
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.connection.take() {
            self.pool.release(conn);
        }
    }
}

/// A pool of Redis connections shared across workers.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Create a pool. The URL is validated but no connection is opened.
    pub fn new(config: PoolConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| Error::connection(crate::backends::redis::NAME, e))?;
        Ok(Self {
            inner: Arc::new(PoolInner {
                client,
                max_idle: config.max_idle,
                idle: Mutex::new(Vec::new()),
                opened: AtomicU64::new(0),
            }),
        })
    }

    /// Check out an idle connection, opening a new one if none is available.
    pub fn acquire(&self) -> Result<PooledConnection> {
        let conn = self.inner.acquire()?;
        Ok(PooledConnection {
            connection: Some(conn),
            pool: self.inner.clone(),
        })
    }

    /// Number of connections currently idle in the pool.
    pub fn idle_connections(&self) -> usize {
        self.inner.idle.lock().len()
    }

    /// Total connections opened over the pool's lifetime.
    pub fn opened_connections(&self) -> u64 {
        self.inner.opened.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("max_idle", &self.inner.max_idle)
            .field("opened", &self.opened_connections())
            .finish()
    }
}
