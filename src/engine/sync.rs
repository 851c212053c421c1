//! Synchronous IO engine
//!
//! Blocking `pread`/`pwrite` with durable sync through `fsync` or `fdatasync`.
//! One operation is in flight per caller; parallelism comes from running
//! several workers, each on its own files.

use super::IOEngine;
use crate::config::workload::SyncMethod;
use std::io;
use std::os::unix::io::RawFd;

/// Synchronous IO engine
#[derive(Debug, Clone, Copy)]
pub struct SyncEngine {
    sync_method: SyncMethod,
}

impl SyncEngine {
    pub fn new(sync_method: SyncMethod) -> Self {
        Self { sync_method }
    }

    /// Perform a read operation using pread
    ///
    /// Handles partial reads by retrying until the full amount is read, an
    /// error occurs, or EOF is reached. Interrupted calls are retried.
    #[inline(always)]
    fn do_read(&self, fd: RawFd, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut total_read = 0;

        while total_read < buf.len() {
            let remaining = &mut buf[total_read..];
            let current_offset = offset + total_read as u64;

            // SAFETY: `remaining` is a valid writable region of `remaining.len()` bytes
            let result = unsafe {
                libc::pread(
                    fd,
                    remaining.as_mut_ptr() as *mut libc::c_void,
                    remaining.len(),
                    current_offset as libc::off_t,
                )
            };

            if result < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }

            if result == 0 {
                // EOF; the caller decides whether a short read is fatal
                break;
            }

            total_read += result as usize;
        }

        Ok(total_read)
    }

    /// Perform a write operation using pwrite
    ///
    /// Handles partial writes by retrying until the full amount is written.
    #[inline(always)]
    fn do_write(&self, fd: RawFd, buf: &[u8], offset: u64) -> io::Result<usize> {
        let mut total_written = 0;

        while total_written < buf.len() {
            let remaining = &buf[total_written..];
            let current_offset = offset + total_written as u64;

            // SAFETY: `remaining` is a valid readable region of `remaining.len()` bytes
            let result = unsafe {
                libc::pwrite(
                    fd,
                    remaining.as_ptr() as *const libc::c_void,
                    remaining.len(),
                    current_offset as libc::off_t,
                )
            };

            if result < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }

            if result == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "pwrite wrote 0 bytes",
                ));
            }

            total_written += result as usize;
        }

        Ok(total_written)
    }

    /// Synchronize all modified data and metadata
    fn do_fsync(&self, fd: RawFd) -> io::Result<()> {
        // SAFETY: fsync only requires a valid fd
        let result = unsafe { libc::fsync(fd) };
        if result < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Synchronize modified data (metadata only when needed to read it back)
    fn do_fdatasync(&self, fd: RawFd) -> io::Result<()> {
        // SAFETY: fdatasync only requires a valid fd
        let result = unsafe { libc::fdatasync(fd) };
        if result < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new(SyncMethod::default())
    }
}

impl IOEngine for SyncEngine {
    fn read_at(&self, fd: RawFd, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.do_read(fd, buf, offset)
    }

    fn write_at(&self, fd: RawFd, buf: &[u8], offset: u64) -> io::Result<usize> {
        self.do_write(fd, buf, offset)
    }

    fn sync(&self, fd: RawFd) -> io::Result<()> {
        match self.sync_method {
            SyncMethod::Fsync => self.do_fsync(fd),
            SyncMethod::Fdatasync => self.do_fdatasync(fd),
        }
    }

    fn name(&self) -> &'static str {
        "sync"
    }
}
