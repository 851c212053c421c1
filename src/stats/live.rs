//! Live progress reporting
//!
//! Every `interval` operations a two-line report is printed:
//!
//! ```text
//! Write count: 300; Total write size: 300.00 MB; Elapsed time: 2.5170 seconds
//! Average write speed is: 119.19 MB /s.
//! ```
//!
//! Throughput modes report the summed synced operation time as elapsed time.
//! Endurance mode reports wall-clock time since the workload started.
//!
//! The reporter is fed the snapshot returned by
//! [`StatsAggregator::record`](super::aggregator::StatsAggregator::record), so in
//! a parallel run exactly one worker prints each boundary.

use super::RunStats;
use crate::config::workload::Mode;
use crate::util::time::{format_bytes, format_throughput};
use std::time::{Duration, Instant};

/// Clock used for the elapsed-time column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElapsedClock {
    /// Sum of synced operation times
    Busy,
    /// Wall-clock since the reporter was started
    Wall,
}

/// Periodic report printer
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    verb: &'static str,
    interval: u64,
    clock: ElapsedClock,
    started: Instant,
}

impl ProgressReporter {
    /// Reporter for `mode`, printing every `interval` operations
    pub fn new(mode: Mode, interval: u64) -> Self {
        let clock = if mode.is_throughput() {
            ElapsedClock::Busy
        } else {
            ElapsedClock::Wall
        };
        Self {
            verb: mode.verb(),
            interval: interval.max(1),
            clock,
            started: Instant::now(),
        }
    }

    /// Restart the wall clock (called when the workload starts)
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }

    /// Whether `stats` sits on a report boundary
    #[inline]
    pub fn is_due(&self, stats: &RunStats) -> bool {
        stats.operation_count > 0 && stats.operation_count % self.interval == 0
    }

    /// Elapsed time for `stats` on this reporter's clock
    pub fn elapsed(&self, stats: &RunStats) -> Duration {
        match self.clock {
            ElapsedClock::Busy => stats.total_duration,
            ElapsedClock::Wall => self.started.elapsed(),
        }
    }

    /// Print the report if `stats` is on a boundary
    pub fn observe(&self, stats: &RunStats) {
        if self.is_due(stats) {
            let (count_line, speed_line) = self.format(stats, self.elapsed(stats));
            println!("{}", count_line);
            println!("{}", speed_line);
        }
    }

    /// Format both report lines for `stats` over `elapsed`
    pub fn format(&self, stats: &RunStats, elapsed: Duration) -> (String, String) {
        let label = capitalize(self.verb);
        let precision = match self.clock {
            ElapsedClock::Busy => 4,
            ElapsedClock::Wall => 2,
        };
        let count_line = format!(
            "{} count: {}; Total {} size: {}; Elapsed time: {:.*} seconds",
            label,
            stats.operation_count,
            self.verb,
            format_bytes(stats.total_bytes),
            precision,
            elapsed.as_secs_f64()
        );
        let speed_line = format!(
            "Average {} speed is: {}.",
            self.verb,
            format_throughput(stats.throughput_over(elapsed))
        );
        (count_line, speed_line)
    }
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
