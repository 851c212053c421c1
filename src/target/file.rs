//! Pool file implementation

use crate::engine::IOEngine;
use crate::error::BenchError;
use crate::Result;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Filler byte written to every slot at initialization
pub const FILL_BYTE: u8 = b'a';

/// Chunk size used while filling a slot
const FILL_CHUNK_SIZE: usize = 1024 * 1024;

/// One pre-sized file of the pool
///
/// The handle stays open for the lifetime of the slot and is closed on drop.
#[derive(Debug)]
pub struct FileSlot {
    id: usize,
    path: PathBuf,
    file: File,
    size: u64,
}

impl FileSlot {
    /// Create (or truncate) the file at `path`, fill it to exactly `size`
    /// bytes of [`FILL_BYTE`] and durably sync it
    pub fn create(id: usize, path: PathBuf, size: u64, engine: &dyn IOEngine) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| BenchError::Init {
                path: path.clone(),
                source,
            })?;

        let slot = Self {
            id,
            path,
            file,
            size,
        };
        slot.fill(engine).map_err(|source| BenchError::Init {
            path: slot.path.clone(),
            source,
        })?;

        Ok(slot)
    }

    /// Write the filler content over `[0, size)` in 1 MiB chunks, then sync
    fn fill(&self, engine: &dyn IOEngine) -> io::Result<()> {
        let start = Instant::now();
        let chunk = vec![FILL_BYTE; FILL_CHUNK_SIZE.min(self.size as usize)];
        let fd = self.fd();
        let mut offset = 0u64;

        while offset < self.size {
            let len = ((self.size - offset) as usize).min(chunk.len());
            engine.write_at(fd, &chunk[..len], offset)?;
            offset += len as u64;
        }
        engine.sync(fd)?;

        debug!(
            "Filled {} ({} bytes) in {:.3}s",
            self.path.display(),
            self.size,
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Configured size; never changes after creation
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Current on-disk length
    pub fn disk_size(&self) -> io::Result<u64> {
        self.file.metadata().map(|m| m.len())
    }

    /// Reject ranges that would extend the file
    #[inline]
    pub fn check_range(&self, offset: u64, len: usize) -> std::result::Result<(), BenchError> {
        match offset.checked_add(len as u64) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(BenchError::OutOfBounds {
                slot: self.id,
                offset,
                len,
                size: self.size,
            }),
        }
    }
}
