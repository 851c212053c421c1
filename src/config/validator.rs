//! Configuration validation
//!
//! Every failure is a [`BenchError::Config`] so the binary can map it to a
//! non-zero exit before any file is touched.

use super::*;
use crate::error::BenchError;
use anyhow::Result;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_pool(&config.pool)?;
    validate_workload(&config.workload, config.pool.file_size)?;
    validate_workers(&config.workers, config.pool.file_count)?;
    if config.is_parallel() && config.workload.max_iterations.is_some() {
        anyhow::bail!(BenchError::config(
            "max_iterations caps single-worker runs; use iterations with more than one thread"
        ));
    }
    validate_stability(&config.stability)?;
    validate_output(&config.output)?;

    Ok(())
}

/// Validate pool shape
pub fn validate_pool(pool: &PoolConfig) -> Result<()> {
    if pool.file_count < MIN_FILE_COUNT {
        anyhow::bail!(BenchError::config(format!(
            "File count should be no less than {}",
            MIN_FILE_COUNT
        )));
    }
    if pool.file_count > MAX_FILE_COUNT {
        anyhow::bail!(BenchError::config(format!(
            "File count should be no larger than {}",
            MAX_FILE_COUNT
        )));
    }
    if pool.file_size < MIN_FILE_SIZE {
        anyhow::bail!(BenchError::config(format!(
            "File size should be no less than {}",
            format_bytes(MIN_FILE_SIZE)
        )));
    }
    if pool.file_size > MAX_FILE_SIZE {
        anyhow::bail!(BenchError::config(format!(
            "File size should be no larger than {}",
            format_bytes(MAX_FILE_SIZE)
        )));
    }
    if pool.directory.as_os_str().is_empty() {
        anyhow::bail!(BenchError::config("Pool directory must not be empty"));
    }

    Ok(())
}

/// Validate workload configuration
pub fn validate_workload(workload: &WorkloadConfig, file_size: u64) -> Result<()> {
    if workload.mode == Mode::Endurance {
        // Lengths are drawn from [1, endurance_max_write), so at least 2
        if workload.endurance_max_write < 2 || workload.endurance_max_write > file_size {
            anyhow::bail!(BenchError::config(format!(
                "endurance_max_write must be between 2 and the file size ({}), got {}",
                file_size, workload.endurance_max_write
            )));
        }
    }

    if workload.max_iterations == Some(0) {
        anyhow::bail!(BenchError::config("max_iterations must be at least 1"));
    }

    Ok(())
}

/// Validate worker configuration
pub fn validate_workers(workers: &WorkerConfig, file_count: usize) -> Result<()> {
    if workers.threads == 0 {
        anyhow::bail!(BenchError::config("threads must be at least 1"));
    }
    if workers.threads > 1 {
        if workers.threads > file_count {
            anyhow::bail!(BenchError::config(format!(
                "threads ({}) must not exceed file count ({})",
                workers.threads, file_count
            )));
        }
        if workers.iterations == 0 {
            anyhow::bail!(BenchError::config("iterations must be at least 1"));
        }
    }

    Ok(())
}

/// Validate stability detector parameters
pub fn validate_stability(stability: &StabilityConfig) -> Result<()> {
    if stability.sample_interval == 0 {
        anyhow::bail!(BenchError::config("sample_interval must be at least 1"));
    }
    if stability.min_samples < 2 {
        anyhow::bail!(BenchError::config(format!(
            "min_samples must be at least 2, got {}",
            stability.min_samples
        )));
    }
    if !stability.tolerance.is_finite() || stability.tolerance < 0.0 {
        anyhow::bail!(BenchError::config(format!(
            "tolerance must be a non-negative number, got {}",
            stability.tolerance
        )));
    }

    Ok(())
}

/// Validate output configuration
pub fn validate_output(output: &OutputConfig) -> Result<()> {
    if output.report_interval == Some(0) {
        anyhow::bail!(BenchError::config("report_interval must be at least 1"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_msg(result: Result<()>) -> String {
        let err = result.unwrap_err();
        match err.downcast_ref::<BenchError>() {
            Some(BenchError::Config(msg)) => msg.clone(),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_default_config() {
        let config = Config::new("dat", 4, 1024 * 1024, Mode::Write);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_file_count_bounds() {
        let config = Config::new("dat", 1025, MIN_FILE_SIZE, Mode::Write);
        assert_eq!(
            config_msg(validate_config(&config)),
            "File count should be no larger than 1024"
        );

        let config = Config::new("dat", 0, MIN_FILE_SIZE, Mode::Write);
        assert!(validate_config(&config).is_err());

        let config = Config::new("dat", MAX_FILE_COUNT, MIN_FILE_SIZE, Mode::Write);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_file_size_bounds() {
        let config = Config::new("dat", 1, MIN_FILE_SIZE - 1, Mode::Write);
        assert_eq!(
            config_msg(validate_config(&config)),
            "File size should be no less than 4.00 KB"
        );

        let config = Config::new("dat", 1, MAX_FILE_SIZE + 1, Mode::Write);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_max_iterations_single_worker_only() {
        let mut config = Config::new("dat", 4, MIN_FILE_SIZE, Mode::Write);
        config.workload.max_iterations = Some(10);
        assert!(validate_config(&config).is_ok());

        config.workers.threads = 2;
        assert!(config_msg(validate_config(&config)).contains("use iterations"));

        config.workload.max_iterations = None;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_endurance_max_write() {
        let mut config = Config::new("dat", 1, 16 * 1024, Mode::Endurance);
        assert!(validate_config(&config).is_ok());

        config.workload.endurance_max_write = 1;
        assert!(validate_config(&config).is_err());

        config.workload.endurance_max_write = 32 * 1024;
        assert!(validate_config(&config).is_err());

        // Ignored outside endurance mode
        config.workload.mode = Mode::Write;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_workers() {
        let mut config = Config::new("dat", 2, MIN_FILE_SIZE, Mode::Write);
        config.workers.threads = 0;
        assert!(validate_config(&config).is_err());

        config.workers.threads = 3;
        assert!(config_msg(validate_config(&config)).contains("must not exceed file count"));

        config.workers.threads = 2;
        config.workers.iterations = 0;
        assert!(validate_config(&config).is_err());

        config.workers.iterations = 10;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_stability() {
        let mut stability = StabilityConfig::default();
        assert!(validate_stability(&stability).is_ok());

        stability.tolerance = 0.0;
        assert!(validate_stability(&stability).is_ok());

        stability.tolerance = f64::NAN;
        assert!(validate_stability(&stability).is_err());

        stability.tolerance = -1.0;
        assert!(validate_stability(&stability).is_err());

        stability = StabilityConfig { min_samples: 1, ..StabilityConfig::default() };
        assert!(validate_stability(&stability).is_err());

        stability = StabilityConfig { sample_interval: 0, ..StabilityConfig::default() };
        assert!(validate_stability(&stability).is_err());
    }

    #[test]
    fn test_validate_report_interval() {
        let output = OutputConfig { report_interval: Some(0), json_output: None };
        assert!(validate_output(&output).is_err());
    }
}
