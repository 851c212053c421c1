//! CLI argument parsing using clap

use clap::error::ErrorKind;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// durabench - durable random-I/O throughput and endurance benchmark
#[derive(Parser, Debug)]
#[command(name = "durabench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Number of files in the pool (1-1024)
    #[arg(value_name = "FILE_COUNT", required_unless_present = "config")]
    pub file_count: Option<usize>,

    /// Size of each file (e.g., 4096, 16k, 1mb, 2G)
    #[arg(value_name = "FILE_SIZE", required_unless_present = "config")]
    pub file_size: Option<String>,

    /// Optional unit for FILE_SIZE: kb, mb or gb
    #[arg(value_name = "UNIT")]
    pub unit: Option<String>,

    // === Workload Options ===
    /// Workload policy [default: write]
    #[arg(short = 'm', long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Number of worker threads (>1 partitions the pool) [default: 1]
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Working directory for the pool files
    #[arg(short = 'd', long)]
    pub dir: Option<PathBuf>,

    /// Iterations per worker when running with more than one thread
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Stop a single-worker run after this many operations
    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// Endurance writes are shorter than this (e.g., 4k)
    #[arg(long)]
    pub endurance_max_write: Option<String>,

    /// Base random seed (worker i uses seed + i)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Durable sync call issued after every operation [default: fsync]
    #[arg(long, value_enum)]
    pub sync_method: Option<SyncMethodArg>,

    // === Stability Options ===
    /// Operations between throughput samples
    #[arg(long)]
    pub sample_interval: Option<u64>,

    /// Samples required before a run may converge
    #[arg(long)]
    pub min_samples: Option<usize>,

    /// Convergence tolerance in bytes/second (e.g., 512k, 1m)
    #[arg(long)]
    pub tolerance: Option<String>,

    // === Output Options ===
    /// Operations between progress lines
    #[arg(long)]
    pub report_interval: Option<u64>,

    /// Write results as JSON to this file
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    // === Configuration File ===
    /// TOML configuration file (command line values take precedence)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Dry run - validate configuration without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

/// Workload policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Overwrite whole files until throughput stabilizes
    Write,
    /// Read whole files until throughput stabilizes
    Read,
    /// Small random writes until stopped
    Endurance,
}

/// Durable sync call
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SyncMethodArg {
    Fsync,
    Fdatasync,
}

impl Cli {
    /// Parse CLI arguments, returning clap's error for the caller to report
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Whether a parse error only printed usage (help, version, missing or
    /// extra arguments) and should exit 0
    pub fn is_usage_exit(err: &clap::Error) -> bool {
        matches!(
            err.kind(),
            ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::MissingRequiredArgument
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                | ErrorKind::UnknownArgument
        )
    }

    /// Log filter directive for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
