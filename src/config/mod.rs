//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! The core only ever sees a validated [`Config`].

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;
pub mod workload;

use crate::util::time::format_bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use workload::*;

/// Smallest allowed pool
pub const MIN_FILE_COUNT: usize = 1;
/// Largest allowed pool
pub const MAX_FILE_COUNT: usize = 1024;
/// Smallest allowed file (4 KB)
pub const MIN_FILE_SIZE: u64 = 4 * 1024;
/// Largest allowed file (16 GB)
pub const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024 * 1024;
/// Endurance writes are shorter than this unless configured otherwise
pub const DEFAULT_ENDURANCE_MAX_WRITE: u64 = MIN_FILE_SIZE;

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub pool: PoolConfig,
    #[serde(default)]
    pub workload: WorkloadConfig,
    #[serde(default)]
    pub workers: WorkerConfig,
    #[serde(default)]
    pub stability: StabilityConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Config {
    /// Configuration with defaults for everything but the pool shape
    pub fn new(directory: impl Into<PathBuf>, file_count: usize, file_size: u64, mode: Mode) -> Self {
        Self {
            pool: PoolConfig {
                directory: directory.into(),
                file_count,
                file_size,
                sync_method: SyncMethod::default(),
            },
            workload: WorkloadConfig {
                mode,
                ..WorkloadConfig::default()
            },
            workers: WorkerConfig::default(),
            stability: StabilityConfig::default(),
            output: OutputConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }

    /// Operations between report lines (mode-dependent default)
    pub fn report_interval(&self) -> u64 {
        self.output
            .report_interval
            .unwrap_or_else(|| self.workload.mode.default_report_interval())
    }

    /// Whether the run uses the partitioned multi-worker variant
    pub fn is_parallel(&self) -> bool {
        self.workers.threads > 1
    }
}

/// File pool shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Working directory holding the pool files
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Number of files
    #[serde(default)]
    pub file_count: usize,
    /// Size of each file in bytes
    #[serde(default)]
    pub file_size: u64,
    /// Durable sync call used after every operation
    #[serde(default)]
    pub sync_method: SyncMethod,
}

fn default_directory() -> PathBuf {
    PathBuf::from("dat")
}

/// Workload policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Workload policy
    #[serde(default)]
    pub mode: Mode,
    /// Endurance writes are in [1, endurance_max_write) bytes
    #[serde(default = "default_endurance_max_write")]
    pub endurance_max_write: u64,
    /// Base seed (worker i uses seed + i); clock-seeded when absent
    pub seed: Option<u64>,
    /// Iteration cap for single-worker runs
    pub max_iterations: Option<u64>,
}

fn default_endurance_max_write() -> u64 {
    DEFAULT_ENDURANCE_MAX_WRITE
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            endurance_max_write: default_endurance_max_write(),
            seed: None,
            max_iterations: None,
        }
    }
}

/// Worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of worker threads
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Fixed iteration budget per worker in the parallel variant
    #[serde(default = "default_iterations")]
    pub iterations: u64,
}

fn default_threads() -> usize {
    1
}

fn default_iterations() -> u64 {
    1000
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            iterations: default_iterations(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Operations between report lines (defaults per mode)
    pub report_interval: Option<u64>,
    /// JSON results file
    pub json_output: Option<PathBuf>,
}

/// Runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Dry run mode
    #[serde(default)]
    pub dry_run: bool,
}

// Display trait implementations

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Pool: {}", self.pool)?;
        writeln!(f, "  Workload: {}", self.workload)?;
        writeln!(f, "  Workers: {}", self.workers)?;
        if self.workload.mode.is_throughput() && !self.is_parallel() {
            writeln!(f, "  Stability: {}", self.stability)?;
        }
        writeln!(f, "  Report: every {} ops", self.report_interval())?;
        Ok(())
    }
}

impl fmt::Display for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} in {} ({})",
            self.file_count,
            format_bytes(self.file_size),
            self.directory.display(),
            self.sync_method
        )
    }
}

impl fmt::Display for WorkloadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mode)?;
        if self.mode == Mode::Endurance {
            write!(f, ", writes < {}", format_bytes(self.endurance_max_write))?;
        }
        if let Some(seed) = self.seed {
            write!(f, ", seed={}", seed)?;
        }
        if let Some(max) = self.max_iterations {
            write!(f, ", max_iterations={}", max)?;
        }
        Ok(())
    }
}

impl fmt::Display for WorkerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} thread(s)", self.threads)?;
        if self.threads > 1 {
            write!(f, ", {} iterations each", self.iterations)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_defaults() {
        let config = Config::new("/tmp/pool", 4, 1024 * 1024, Mode::Write);
        assert_eq!(config.pool.file_count, 4);
        assert_eq!(config.pool.sync_method, SyncMethod::Fsync);
        assert_eq!(config.workers.threads, 1);
        assert!(!config.is_parallel());
        assert_eq!(config.report_interval(), 100);
    }

    #[test]
    fn test_report_interval_override() {
        let mut config = Config::new("/tmp/pool", 1, MIN_FILE_SIZE, Mode::Endurance);
        assert_eq!(config.report_interval(), 10_000);
        config.output.report_interval = Some(7);
        assert_eq!(config.report_interval(), 7);
    }

    #[test]
    fn test_display_mentions_pool() {
        let config = Config::new("/tmp/pool", 2, 16 * 1024, Mode::Endurance);
        let text = config.to_string();
        assert!(text.contains("2 x 16.00 KB"));
        assert!(text.contains("endurance"));
        assert!(!text.contains("Stability"));
    }
}
