//! Redis backend.
//!
//! All workers share one [`ConnectionPool`]; `connect` checks a connection out
//! and `close` hands it back.

use super::Backend;
use crate::error::Result;
use crate::pool::{ConnectionPool, PoolConfig, PooledConnection};

pub const NAME: &str = "redis";

/// Default server URL.
pub const DEFAULT_URL: &str = "redis://localhost:6379/";

/// Redis backend for latency runs.
#[derive(Debug, Clone)]
pub struct RedisBackend {
    pool: ConnectionPool,
}

impl RedisBackend {
    /// Create a backend for `url` keeping at most `max_idle` idle connections.
    pub fn new(url: &str, max_idle: usize) -> Result<Self> {
        let pool = ConnectionPool::new(PoolConfig::new(url).with_max_idle(max_idle))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

impl Backend for RedisBackend {
    type Conn = PooledConnection;

    fn name(&self) -> &'static str {
        NAME
    }

    fn connect(&self) -> Result<PooledConnection> {
        self.pool.acquire()
    }

    /// Redis is schemaless; nothing to create.
    fn setup(&self) -> Result<()> {
        Ok(())
    }

    fn write_one(
        &self,
        conn: &mut PooledConnection,
        key: &str,
        payload: &[u8],
        _commit: bool,
    ) -> Result<()> {
        ::redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .query::<()>(conn.get()?)?;
        Ok(())
    }

    fn read_one(&self, conn: &mut PooledConnection, key: &str) -> Result<Option<Vec<u8>>> {
        let value = ::redis::cmd("GET")
            .arg(key)
            .query::<Option<Vec<u8>>>(conn.get()?)?;
        Ok(value)
    }

    fn close(&self, conn: PooledConnection) -> Result<()> {
        drop(conn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_from_env() -> RedisBackend {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        RedisBackend::new(&url, 4).unwrap()
    }

    #[test]
    fn test_setup_is_noop() {
        let backend = RedisBackend::new("redis://127.0.0.1:1/", 1).unwrap();
        backend.setup().unwrap();
        assert_eq!(backend.pool().opened_connections(), 0);
    }

    // Requires a running server; see REDIS_URL.
    #[test]
    #[ignore]
    fn test_round_trip_against_server() {
        let backend = backend_from_env();
        let mut conn = backend.connect().unwrap();

        backend.write_one(&mut conn, "dblat_test_rt", b"value", true).unwrap();
        assert_eq!(
            backend.read_one(&mut conn, "dblat_test_rt").unwrap(),
            Some(b"value".to_vec())
        );
        assert_eq!(
            backend.read_one(&mut conn, "dblat_test_missing").unwrap(),
            None
        );
        backend.close(conn).unwrap();
        assert_eq!(backend.pool().idle_connections(), 1);
    }
}
