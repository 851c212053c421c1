//! File pool
//!
//! A fixed set of pre-sized files created once, before the workload starts,
//! and never created, resized or deleted afterwards. Every read and write goes
//! through the pool's [`IOEngine`] and is followed (write) or preceded (read)
//! by a durable sync, so the time a caller measures around a call includes
//! the store-to-media latency.
//!
//! # Layout
//!
//! ```text
//! <dir>/test_file_0
//! <dir>/test_file_1
//! ...
//! ```
//!
//! # Example
//!
//! ```no_run
//! use durabench::config::workload::SyncMethod;
//! use durabench::target::FilePool;
//!
//! let pool = FilePool::initialize("dat", 4, 1024 * 1024, SyncMethod::Fsync).unwrap();
//! let payload = vec![b'x'; 1024 * 1024];
//! pool.write_at(2, 0, &payload).unwrap();
//! ```

pub mod file;

use crate::config::workload::SyncMethod;
use crate::engine::sync::SyncEngine;
use crate::engine::IOEngine;
use crate::error::{BenchError, IoOp};
use crate::Result;
use anyhow::Context;
use file::FileSlot;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name prefix; slot `i` lives in `<dir>/test_file_<i>`
pub const FILE_PREFIX: &str = "test_file_";

/// Path of slot `id` inside `directory`
pub fn slot_path(directory: &Path, id: usize) -> PathBuf {
    directory.join(format!("{}{}", FILE_PREFIX, id))
}

/// Fixed pool of pre-filled files
pub struct FilePool {
    file_size: u64,
    slots: Vec<FileSlot>,
    engine: Box<dyn IOEngine>,
}

impl FilePool {
    /// Create `count` files of `size` bytes in `directory` using the
    /// synchronous engine
    pub fn initialize(
        directory: impl Into<PathBuf>,
        count: usize,
        size: u64,
        sync_method: SyncMethod,
    ) -> Result<Self> {
        Self::initialize_with_engine(directory, count, size, Box::new(SyncEngine::new(sync_method)))
    }

    /// Create and fill every slot with the given engine
    ///
    /// The directory is created if missing. Returns only after every file has
    /// been filled and synced; the first failure aborts initialization.
    pub fn initialize_with_engine(
        directory: impl Into<PathBuf>,
        count: usize,
        size: u64,
        engine: Box<dyn IOEngine>,
    ) -> Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory).map_err(|source| BenchError::Init {
            path: directory.clone(),
            source,
        })?;

        info!(
            "Initializing {} files of {} bytes in {} ({} engine)",
            count,
            size,
            directory.display(),
            engine.name()
        );

        let mut slots = Vec::with_capacity(count);
        for id in 0..count {
            let path = slot_path(&directory, id);
            let slot = FileSlot::create(id, path, size, engine.as_ref())
                .with_context(|| format!("Failed to initialize file pool slot {}", id))?;
            println!("{} created.", slot.path().display());
            slots.push(slot);
        }

        Ok(Self {
            file_size: size,
            slots,
            engine,
        })
    }

    fn slot(&self, id: usize) -> Result<&FileSlot> {
        self.slots
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("slot {} does not exist (pool has {} files)", id, self.slots.len()))
    }

    /// Write all of `buf` at `offset` of slot `id`, then durably sync
    ///
    /// `offset + buf.len()` must not exceed the file size; violations are
    /// rejected before any IO.
    pub fn write_at(&self, id: usize, offset: u64, buf: &[u8]) -> Result<()> {
        let slot = self.slot(id)?;
        slot.check_range(offset, buf.len())?;

        self.engine
            .write_at(slot.fd(), buf, offset)
            .map_err(|source| BenchError::Io {
                op: IoOp::Write,
                path: slot.path().to_path_buf(),
                offset,
                source,
            })?;
        self.sync_slot(slot, offset)
    }

    /// Durably sync slot `id`, then read exactly `buf.len()` bytes at `offset`
    ///
    /// Fewer bytes than requested is a [`BenchError::ShortRead`].
    pub fn read_at(&self, id: usize, offset: u64, buf: &mut [u8]) -> Result<()> {
        let slot = self.slot(id)?;
        slot.check_range(offset, buf.len())?;
        self.sync_slot(slot, offset)?;

        let actual = self
            .engine
            .read_at(slot.fd(), buf, offset)
            .map_err(|source| BenchError::Io {
                op: IoOp::Read,
                path: slot.path().to_path_buf(),
                offset,
                source,
            })?;

        if actual != buf.len() {
            return Err(BenchError::ShortRead {
                path: slot.path().to_path_buf(),
                expected: buf.len(),
                actual,
            }
            .into());
        }
        Ok(())
    }

    fn sync_slot(&self, slot: &FileSlot, offset: u64) -> Result<()> {
        self.engine.sync(slot.fd()).map_err(|source| {
            BenchError::Io {
                op: IoOp::Sync,
                path: slot.path().to_path_buf(),
                offset,
                source,
            }
            .into()
        })
    }

    /// Release every file handle; the files stay on disk
    pub fn close_all(&mut self) {
        self.slots.clear();
    }

    /// Split the pool into `workers` disjoint contiguous ranges of equal size
    ///
    /// Each range holds `len / workers` slots. Slots past the last range are
    /// not used by any worker.
    pub fn partition(&self, workers: usize) -> Vec<Range<usize>> {
        partition_ranges(self.slots.len(), workers)
    }

    /// On-disk length of slot `id`
    pub fn disk_size(&self, id: usize) -> Result<u64> {
        let slot = self.slot(id)?;
        slot.disk_size()
            .with_context(|| format!("Failed to stat {}", slot.path().display()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn file_size(&self) -> u64 {
        self.file_size
    }
}

/// Contiguous equal-size ranges of `count` items for `workers` workers
pub fn partition_ranges(count: usize, workers: usize) -> Vec<Range<usize>> {
    if workers == 0 {
        return Vec::new();
    }
    let per_worker = count / workers;
    let unused = count - per_worker * workers;
    if unused > 0 {
        warn!(
            "{} file(s) not divisible among {} workers; the last {} are unused",
            count, workers, unused
        );
    }

    (0..workers)
        .map(|w| w * per_worker..(w + 1) * per_worker)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngine;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_size_invariant() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("dat");
        let pool = FilePool::initialize(&dir, 4, 64 * 1024, SyncMethod::Fsync).unwrap();

        assert_eq!(pool.len(), 4);
        for id in 0..4 {
            assert_eq!(pool.disk_size(id).unwrap(), 64 * 1024);
            assert!(slot_path(&dir, id).exists());
        }
        assert!(!slot_path(&dir, 4).exists());
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let pool = FilePool::initialize(temp_dir.path(), 2, 8192, SyncMethod::Fdatasync).unwrap();

        pool.write_at(1, 100, b"hello").unwrap();
        let mut buf = vec![0u8; 8192];
        pool.read_at(1, 0, &mut buf).unwrap();
        assert_eq!(&buf[100..105], b"hello");
        assert_eq!(buf[99], b'a');
        assert_eq!(pool.disk_size(1).unwrap(), 8192);
    }

    #[test]
    fn test_write_out_of_bounds_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let pool = FilePool::initialize(temp_dir.path(), 1, 4096, SyncMethod::Fsync).unwrap();

        let err = pool.write_at(0, 4000, &[b'x'; 100]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BenchError>(),
            Some(BenchError::OutOfBounds { offset: 4000, len: 100, .. })
        ));
        assert_eq!(pool.disk_size(0).unwrap(), 4096);
        assert!(pool.write_at(7, 0, b"x").is_err());
    }

    #[test]
    fn test_short_read_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let pool = FilePool::initialize(temp_dir.path(), 1, 8192, SyncMethod::Fsync).unwrap();

        // Someone else truncates the file behind the pool's back
        let file = std::fs::OpenOptions::new()
            .write(true)
            .open(slot_path(temp_dir.path(), 0))
            .unwrap();
        file.set_len(1000).unwrap();

        let mut buf = vec![0u8; 8192];
        let err = pool.read_at(0, 0, &mut buf).unwrap_err();
        match err.downcast_ref::<BenchError>() {
            Some(BenchError::ShortRead { expected, actual, .. }) => {
                assert_eq!(*expected, 8192);
                assert_eq!(*actual, 1000);
            }
            other => panic!("expected short read, got {:?}", other),
        }
    }

    #[test]
    fn test_injected_failures() {
        let temp_dir = TempDir::new().unwrap();
        let mock = Arc::new(MockEngine::new());
        let pool = FilePool::initialize_with_engine(
            temp_dir.path(),
            1,
            4096,
            Box::new(Arc::clone(&mock)),
        )
        .unwrap();

        mock.fail_writes_after(0);
        let err = pool.write_at(0, 0, b"x").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BenchError>(),
            Some(BenchError::Io { op: IoOp::Write, .. })
        ));

        mock.set_fail_sync(true);
        let mut buf = vec![0u8; 16];
        let err = pool.read_at(0, 0, &mut buf).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BenchError>(),
            Some(BenchError::Io { op: IoOp::Sync, .. })
        ));
    }

    #[test]
    fn test_initialize_fails_on_sync_error() {
        let temp_dir = TempDir::new().unwrap();
        let mock = MockEngine::new();
        mock.set_fail_sync(true);

        let err = FilePool::initialize_with_engine(temp_dir.path(), 3, 4096, Box::new(mock))
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<BenchError>(),
            Some(BenchError::Init { .. })
        ));
        // Aborted at the first slot
        assert!(!slot_path(temp_dir.path(), 1).exists());
    }

    #[test]
    fn test_partition() {
        assert_eq!(partition_ranges(8, 4), vec![0..2, 2..4, 4..6, 6..8]);
        assert_eq!(partition_ranges(7, 3), vec![0..2, 2..4, 4..6]);
        assert_eq!(partition_ranges(5, 1), vec![0..5]);
        assert!(partition_ranges(5, 0).is_empty());
    }

    #[test]
    fn test_close_all() {
        let temp_dir = TempDir::new().unwrap();
        let mut pool = FilePool::initialize(temp_dir.path(), 2, 4096, SyncMethod::Fsync).unwrap();
        pool.close_all();
        assert!(pool.is_empty());
        // Files are kept
        assert!(slot_path(temp_dir.path(), 1).exists());
    }
}
