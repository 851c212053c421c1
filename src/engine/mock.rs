//! Mock IO engine for testing
//!
//! Delegates to a real [`SyncEngine`] and injects faults on demand, so tests
//! can check that storage errors surface as fatal run errors.
//!
//! # Features
//!
//! - Fail every write after the first N
//! - Fail every sync
//! - Truncate reads to a fixed number of bytes
//! - Count operations per type
//!
//! # Example
//!
//! ```
//! use durabench::engine::mock::MockEngine;
//!
//! let engine = MockEngine::new();
//! engine.fail_writes_after(10);
//! assert_eq!(engine.write_count(), 0);
//! ```

use super::sync::SyncEngine;
use super::IOEngine;
use std::io;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

const UNLIMITED: u64 = u64::MAX;

/// Mock IO engine for testing
#[derive(Debug)]
pub struct MockEngine {
    inner: SyncEngine,
    /// Writes allowed before every further write fails
    writes_allowed: AtomicU64,
    fail_sync: AtomicBool,
    /// Reads return at most this many bytes
    read_limit: AtomicU64,
    writes: AtomicU64,
    reads: AtomicU64,
    syncs: AtomicU64,
}

impl MockEngine {
    /// Create a new mock engine that behaves like [`SyncEngine`]
    pub fn new() -> Self {
        Self::wrapping(SyncEngine::default())
    }

    pub fn wrapping(inner: SyncEngine) -> Self {
        Self {
            inner,
            writes_allowed: AtomicU64::new(UNLIMITED),
            fail_sync: AtomicBool::new(false),
            read_limit: AtomicU64::new(UNLIMITED),
            writes: AtomicU64::new(0),
            reads: AtomicU64::new(0),
            syncs: AtomicU64::new(0),
        }
    }

    /// Let `n` more writes through, then fail every write with EIO
    pub fn fail_writes_after(&self, n: u64) {
        let done = self.writes.load(Ordering::SeqCst);
        self.writes_allowed.store(done.saturating_add(n), Ordering::SeqCst);
    }

    pub fn set_fail_sync(&self, fail: bool) {
        self.fail_sync.store(fail, Ordering::SeqCst);
    }

    /// Make every read return at most `limit` bytes
    pub fn truncate_reads_to(&self, limit: u64) {
        self.read_limit.store(limit, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn sync_count(&self) -> u64 {
        self.syncs.load(Ordering::SeqCst)
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn injected() -> io::Error {
    io::Error::from_raw_os_error(libc::EIO)
}

impl IOEngine for MockEngine {
    fn read_at(&self, fd: RawFd, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let limit = self.read_limit.load(Ordering::SeqCst);
        let len = buf.len().min(usize::try_from(limit).unwrap_or(usize::MAX));
        self.inner.read_at(fd, &mut buf[..len], offset)
    }

    fn write_at(&self, fd: RawFd, buf: &[u8], offset: u64) -> io::Result<usize> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst);
        if n >= self.writes_allowed.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.write_at(fd, buf, offset)
    }

    fn sync(&self, fd: RawFd) -> io::Result<()> {
        self.syncs.fetch_add(1, Ordering::SeqCst);
        if self.fail_sync.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.sync(fd)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::os::unix::io::AsRawFd;
    use tempfile::TempDir;

    #[test]
    fn test_mock_passes_through() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, vec![b'a'; 32]).unwrap();
        let file = OpenOptions::new().read(true).write(true).open(&path).unwrap();

        let engine = MockEngine::new();
        engine.write_at(file.as_raw_fd(), b"bb", 0).unwrap();
        engine.sync(file.as_raw_fd()).unwrap();
        let mut buf = vec![0u8; 32];
        assert_eq!(engine.read_at(file.as_raw_fd(), &mut buf, 0).unwrap(), 32);
        assert_eq!(&buf[..3], b"bba");
        assert_eq!((engine.write_count(), engine.read_count(), engine.sync_count()), (1, 1, 1));
    }

    #[test]
    fn test_mock_injects_faults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, vec![b'a'; 32]).unwrap();
        let file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
        let fd = file.as_raw_fd();

        let engine = MockEngine::new();
        engine.fail_writes_after(1);
        assert!(engine.write_at(fd, b"x", 0).is_ok());
        assert_eq!(engine.write_at(fd, b"x", 0).unwrap_err().raw_os_error(), Some(libc::EIO));

        engine.set_fail_sync(true);
        assert!(engine.sync(fd).is_err());

        engine.truncate_reads_to(8);
        let mut buf = vec![0u8; 32];
        assert_eq!(engine.read_at(fd, &mut buf, 0).unwrap(), 8);
    }
}
