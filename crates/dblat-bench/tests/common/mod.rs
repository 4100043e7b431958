//! Shared test backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dblat_bench::{Backend, Result};
use parking_lot::Mutex;

/// In-process key-value backend that counts connection lifecycle events.
#[derive(Default)]
pub struct MemoryBackend {
    data: Mutex<HashMap<String, Vec<u8>>>,
    pub connects: AtomicUsize,
    pub closes: AtomicUsize,
    pub writes: AtomicUsize,
    pub reads: AtomicUsize,
}

/// Connection handle: the id of the connection, in open order.
pub struct MemoryConn {
    pub id: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }
}

impl Backend for MemoryBackend {
    type Conn = MemoryConn;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn connect(&self) -> Result<MemoryConn> {
        let id = self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConn { id })
    }

    fn setup(&self) -> Result<()> {
        Ok(())
    }

    fn write_one(&self, _conn: &mut MemoryConn, key: &str, payload: &[u8], _commit: bool) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.data.lock().insert(key.to_string(), payload.to_vec());
        Ok(())
    }

    fn read_one(&self, _conn: &mut MemoryConn, key: &str) -> Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.data.lock().get(key).cloned())
    }

    fn close(&self, _conn: MemoryConn) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Memory backend whose connection open and close each take `delay`.
pub struct SlowConnectBackend {
    pub inner: MemoryBackend,
    pub delay: Duration,
}

impl SlowConnectBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryBackend::new(),
            delay,
        }
    }
}

impl Backend for SlowConnectBackend {
    type Conn = MemoryConn;

    fn name(&self) -> &'static str {
        "slow"
    }

    fn connect(&self) -> Result<MemoryConn> {
        std::thread::sleep(self.delay);
        self.inner.connect()
    }

    fn setup(&self) -> Result<()> {
        Ok(())
    }

    fn write_one(&self, conn: &mut MemoryConn, key: &str, payload: &[u8], commit: bool) -> Result<()> {
        self.inner.write_one(conn, key, payload, commit)
    }

    fn read_one(&self, conn: &mut MemoryConn, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.read_one(conn, key)
    }

    fn close(&self, conn: MemoryConn) -> Result<()> {
        std::thread::sleep(self.delay);
        self.inner.close(conn)
    }
}
