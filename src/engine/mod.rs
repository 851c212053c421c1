//! IO engine abstraction
//!
//! An IO engine issues the positioned reads and writes of the file pool and the
//! durable-sync call that follows every counted operation. The File Pool owns
//! one engine and calls it for every operation; it never touches the fd with
//! anything else once the pool is filled.
//!
//! # Engine Types
//!
//! - **Synchronous**: blocking pread/pwrite plus fsync/fdatasync (production)
//! - **Mock**: wraps the synchronous engine and injects faults (tests)
//!
//! # Example
//!
//! ```no_run
//! use durabench::config::workload::SyncMethod;
//! use durabench::engine::{IOEngine, sync::SyncEngine};
//! use std::os::unix::io::AsRawFd;
//!
//! let file = std::fs::OpenOptions::new().read(true).write(true).open("dat/test_file_0").unwrap();
//! let engine = SyncEngine::new(SyncMethod::Fsync);
//! engine.write_at(file.as_raw_fd(), b"hello", 0).unwrap();
//! engine.sync(file.as_raw_fd()).unwrap();
//! ```

use std::io;
use std::os::unix::io::RawFd;
use std::sync::Arc;

/// IO engine trait for all backends
///
/// Engines are shared by every worker of a run, so they must be `Send + Sync`
/// and keep no per-operation state.
pub trait IOEngine: Send + Sync {
    /// Read up to `buf.len()` bytes at `offset`
    ///
    /// Retries partial reads and stops early only at end of file, so a
    /// return value smaller than `buf.len()` means the file is too short.
    fn read_at(&self, fd: RawFd, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Write all of `buf` at `offset`, retrying partial writes
    fn write_at(&self, fd: RawFd, buf: &[u8], offset: u64) -> io::Result<usize>;

    /// Force buffered data for `fd` through to the media
    fn sync(&self, fd: RawFd) -> io::Result<()>;

    /// Get engine name for logging
    fn name(&self) -> &'static str;
}

impl<E: IOEngine + ?Sized> IOEngine for Arc<E> {
    fn read_at(&self, fd: RawFd, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(fd, buf, offset)
    }

    fn write_at(&self, fd: RawFd, buf: &[u8], offset: u64) -> io::Result<usize> {
        (**self).write_at(fd, buf, offset)
    }

    fn sync(&self, fd: RawFd) -> io::Result<()> {
        (**self).sync(fd)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

pub mod mock;
pub mod sync;
