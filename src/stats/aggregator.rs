//! Statistics aggregation
//!
//! One aggregator is shared by every worker of a run. Counters and the
//! latency histogram are updated together under a single mutex, so a
//! snapshot never observes a half-applied sample.
//!
//! # Example
//!
//! ```
//! use durabench::stats::aggregator::StatsAggregator;
//! use durabench::stats::Sample;
//! use std::time::Duration;
//!
//! let aggregator = StatsAggregator::new().unwrap();
//! aggregator.record(Sample::new(4096, Duration::from_micros(100)));
//! let after = aggregator.record(Sample::new(8192, Duration::from_micros(150)));
//!
//! assert_eq!(after.operation_count, 2);
//! assert_eq!(aggregator.snapshot().total_bytes, 12288);
//! ```

use super::histogram::LatencyHistogram;
use super::{LatencySummary, RunStats, Sample};
use crate::Result;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct Inner {
    stats: RunStats,
    latency: LatencyHistogram,
}

/// Thread-safe accumulator of run statistics
#[derive(Debug)]
pub struct StatsAggregator {
    inner: Mutex<Inner>,
}

impl StatsAggregator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            inner: Mutex::new(Inner {
                stats: RunStats::default(),
                latency: LatencyHistogram::new()?,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // `record` has no panic point between field updates
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add one sample and return the counters including it
    ///
    /// Because the returned snapshot is taken in the same critical section,
    /// exactly one caller observes each operation count.
    pub fn record(&self, sample: Sample) -> RunStats {
        let mut inner = self.lock();
        inner.stats.apply(&sample);
        inner.latency.record(sample.elapsed);
        inner.stats
    }

    /// Consistent copy of the counters
    pub fn snapshot(&self) -> RunStats {
        self.lock().stats
    }

    /// Latency percentiles, `None` before the first sample
    pub fn latency_summary(&self) -> Option<LatencySummary> {
        let inner = self.lock();
        let h = &inner.latency;
        Some(LatencySummary {
            min: h.min()?,
            mean: h.mean()?,
            max: h.max()?,
            p50: h.percentile(50.0)?,
            p90: h.percentile(90.0)?,
            p99: h.percentile(99.0)?,
            p999: h.percentile(99.9)?,
        })
    }
}
