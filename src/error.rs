//! Error taxonomy
//!
//! Every error that reaches the benchmark core is fatal to the run. The variants
//! here are the typed root causes; call sites wrap them in `anyhow` context so the
//! binary can print the full chain, and tests can `downcast_ref::<BenchError>()`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// IO operation that failed during the steady-state loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Read,
    Write,
    Sync,
}

impl std::fmt::Display for IoOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoOp::Read => write!(f, "read"),
            IoOp::Write => write!(f, "write"),
            IoOp::Sync => write!(f, "sync"),
        }
    }
}

/// Fatal benchmark errors
#[derive(Debug, Error)]
pub enum BenchError {
    /// Invalid run configuration, detected before any IO
    #[error("{0}")]
    Config(String),

    /// A pool file could not be created, filled or synced
    #[error("failed to initialize {}: {source}", path.display())]
    Init {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Read, write or sync failure while the workload is running
    #[error("{op} failed on {} at offset {offset}: {source}", path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// Fewer bytes came back than were requested
    #[error("short read on {}: expected {expected} bytes, got {actual}", path.display())]
    ShortRead {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// Requested range does not fit in the slot
    #[error("range {offset}+{len} exceeds size {size} of slot {slot}")]
    OutOfBounds {
        slot: usize,
        offset: u64,
        len: usize,
        size: u64,
    },

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}

impl BenchError {
    /// Shorthand for configuration errors
    pub fn config(msg: impl Into<String>) -> Self {
        BenchError::Config(msg.into())
    }
}
