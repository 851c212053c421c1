//! Statistics collection
//!
//! Cumulative run counters, latency percentiles and the convergence test.
//!
//! - [`Sample`]: one completed, durably synced operation
//! - [`RunStats`]: cumulative counters at a point in time
//! - [`aggregator::StatsAggregator`]: shared, mutex-protected accumulation
//! - [`stability::StabilityDetector`]: decides when throughput has settled
//! - [`live::ProgressReporter`]: periodic report lines
//!
//! # Example
//!
//! ```
//! use durabench::stats::{RunStats, Sample};
//! use std::time::Duration;
//!
//! let mut stats = RunStats::default();
//! stats.apply(&Sample::new(4096, Duration::from_millis(2)));
//! stats.apply(&Sample::new(4096, Duration::from_millis(2)));
//!
//! assert_eq!(stats.operation_count, 2);
//! assert_eq!(stats.throughput(), 2_048_000.0);
//! ```

pub mod aggregator;
pub mod histogram;
pub mod live;
pub mod stability;

use crate::util::time::calculate_throughput;
use std::time::Duration;

/// One completed, durably synced operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub bytes_transferred: u64,
    /// Time from issuing the IO until its sync returned
    pub elapsed: Duration,
}

impl Sample {
    pub fn new(bytes_transferred: u64, elapsed: Duration) -> Self {
        Self {
            bytes_transferred,
            elapsed,
        }
    }
}

/// Cumulative run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub operation_count: u64,
    pub total_bytes: u64,
    /// Sum of the synced operation times (not wall-clock)
    pub total_duration: Duration,
}

impl RunStats {
    /// Add one sample
    #[inline]
    pub fn apply(&mut self, sample: &Sample) {
        self.operation_count += 1;
        self.total_bytes += sample.bytes_transferred;
        self.total_duration += sample.elapsed;
    }

    /// Aggregate throughput `total_bytes / total_duration` in bytes/second
    pub fn throughput(&self) -> f64 {
        calculate_throughput(self.total_bytes, self.total_duration)
    }

    /// Throughput over an externally measured interval (e.g. wall-clock)
    pub fn throughput_over(&self, elapsed: Duration) -> f64 {
        calculate_throughput(self.total_bytes, elapsed)
    }
}

/// Latency percentiles of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub min: Duration,
    pub mean: Duration,
    pub max: Duration,
    pub p50: Duration,
    pub p90: Duration,
    pub p99: Duration,
    pub p999: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_stats_apply() {
        let mut stats = RunStats::default();
        for _ in 0..10 {
            stats.apply(&Sample::new(1024 * 1024, Duration::from_millis(100)));
        }
        assert_eq!(stats.operation_count, 10);
        assert_eq!(stats.total_bytes, 10 * 1024 * 1024);
        assert_eq!(stats.total_duration, Duration::from_secs(1));
        assert_eq!(stats.throughput(), 10.0 * 1024.0 * 1024.0);
    }

    #[test]
    fn test_throughput_empty() {
        let stats = RunStats::default();
        assert_eq!(stats.throughput(), 0.0);
        assert_eq!(stats.throughput_over(Duration::from_secs(1)), 0.0);
    }
}
