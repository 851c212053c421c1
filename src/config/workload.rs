//! Workload definition structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Workload policy applied to the file pool
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Overwrite a whole random file per iteration (throughput-write)
    Write,
    /// Read a whole random file per iteration (throughput-read)
    Read,
    /// Small random-offset writes, unbounded (endurance-write)
    Endurance,
}

impl Mode {
    /// Whether the mode terminates through the stability detector
    pub fn is_throughput(&self) -> bool {
        matches!(self, Mode::Write | Mode::Read)
    }

    /// Label used in report lines ("Write count: ...")
    pub fn verb(&self) -> &'static str {
        match self {
            Mode::Read => "read",
            Mode::Write | Mode::Endurance => "write",
        }
    }

    /// Operations between two report lines unless configured otherwise
    pub fn default_report_interval(&self) -> u64 {
        match self {
            Mode::Write | Mode::Read => 100,
            Mode::Endurance => 10_000,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Write
    }
}

/// How an operation is forced through to the media
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncMethod {
    /// fsync(2): data and metadata
    Fsync,
    /// fdatasync(2): data and the metadata needed to read it back
    Fdatasync,
}

impl Default for SyncMethod {
    fn default() -> Self {
        Self::Fsync
    }
}

/// Convergence test parameters for throughput runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Operations between two aggregate-throughput samples
    #[serde(default = "default_sample_interval")]
    pub sample_interval: u64,
    /// Samples required before convergence can be declared
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Absolute tolerance in bytes/second between the last two samples
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_sample_interval() -> u64 {
    100
}

fn default_min_samples() -> usize {
    10
}

fn default_tolerance() -> f64 {
    1024.0 * 1024.0
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            sample_interval: default_sample_interval(),
            min_samples: default_min_samples(),
            tolerance: default_tolerance(),
        }
    }
}

// Display trait implementations

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Write => write!(f, "write"),
            Mode::Read => write!(f, "read"),
            Mode::Endurance => write!(f, "endurance"),
        }
    }
}

impl fmt::Display for SyncMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMethod::Fsync => write!(f, "fsync"),
            SyncMethod::Fdatasync => write!(f, "fdatasync"),
        }
    }
}

impl fmt::Display for StabilityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "every {} ops, min {} samples, tolerance {:.0} B/s",
            self.sample_interval, self.min_samples, self.tolerance
        )
    }
}
