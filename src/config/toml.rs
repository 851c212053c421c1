//! TOML configuration file parsing

use super::cli_convert::*;
use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config =
        ::toml::from_str(contents).context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Build the run configuration from CLI arguments, reading `--config` first if given
pub fn load_config(cli: &Cli) -> Result<Config> {
    let base = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => Config::new(default_directory(), 0, 0, Mode::default()),
    };
    merge_cli_with_config(cli, base)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    // Pool shape from positionals
    if let Some(count) = cli.file_count {
        config.pool.file_count = count;
    }
    if let Some(ref size) = cli.file_size {
        config.pool.file_size = parse_file_size(size, cli.unit.as_deref())?;
    }
    if let Some(ref dir) = cli.dir {
        config.pool.directory = dir.clone();
    }
    if let Some(method) = cli.sync_method {
        config.pool.sync_method = convert_sync_method(method);
    }

    // Override workload settings
    if let Some(mode) = cli.mode {
        config.workload.mode = convert_mode(mode);
    }
    if let Some(ref max_write) = cli.endurance_max_write {
        config.workload.endurance_max_write = parse_size(max_write)?;
    }
    if let Some(seed) = cli.seed {
        config.workload.seed = Some(seed);
    }
    if let Some(max) = cli.max_iterations {
        config.workload.max_iterations = Some(max);
    }

    // Override worker settings
    if let Some(threads) = cli.threads {
        config.workers.threads = threads;
    }
    if let Some(iterations) = cli.iterations {
        config.workers.iterations = iterations;
    }

    // Override stability settings
    if let Some(interval) = cli.sample_interval {
        config.stability.sample_interval = interval;
    }
    if let Some(min) = cli.min_samples {
        config.stability.min_samples = min;
    }
    if let Some(ref tolerance) = cli.tolerance {
        config.stability.tolerance = parse_tolerance(tolerance)?;
    }

    // Override output settings
    if let Some(interval) = cli.report_interval {
        config.output.report_interval = Some(interval);
    }
    if let Some(ref path) = cli.json_output {
        config.output.json_output = Some(path.clone());
    }

    // Override runtime settings
    if cli.dry_run {
        config.runtime.dry_run = true;
    }

    Ok(config)
}
