//! HDR histogram for latency tracking
//!
//! Wraps `hdrhistogram` with nanosecond resolution, 1ns to 1h range and three
//! significant digits. Values outside the range are clamped.

use crate::Result;
use anyhow::Context;
use hdrhistogram::Histogram;
use std::time::Duration;

/// Largest trackable latency (1 hour in nanoseconds)
const MAX_TRACKABLE_NANOS: u64 = 3_600_000_000_000;

#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    histogram: Histogram<u64>,
}

impl LatencyHistogram {
    pub fn new() -> Result<Self> {
        let histogram = Histogram::new_with_bounds(1, MAX_TRACKABLE_NANOS, 3)
            .context("Failed to create latency histogram")?;

        Ok(Self { histogram })
    }

    #[inline]
    pub fn record(&mut self, latency: Duration) {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        let value = nanos.clamp(1, MAX_TRACKABLE_NANOS);
        let _ = self.histogram.record(value);
    }

    /// Latency at `percentile` (0-100), `None` when empty
    pub fn percentile(&self, percentile: f64) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.value_at_percentile(percentile)))
    }

    pub fn min(&self) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.min()))
    }

    pub fn max(&self) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.max()))
    }

    pub fn mean(&self) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.mean() as u64))
    }

    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.len() == 0
    }
}
