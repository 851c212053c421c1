//! Worker implementation
//!
//! A worker runs the workload loop over its own contiguous range of pool
//! slots with its own random source. Per iteration it picks a slot uniformly
//! from its range, performs one durable operation through the [`FilePool`],
//! times it (sync included) and records the [`Sample`] in the shared
//! [`StatsAggregator`].
//!
//! # Operations per mode
//!
//! - **write**: whole-file overwrite at offset 0 with a fresh payload (single
//!   worker) or the next pre-generated payload (parallel)
//! - **read**: sync, then whole-file read at offset 0 into a buffer allocated
//!   once per worker
//! - **endurance**: a run of one random letter, length in
//!   `[1, endurance_max_write)`, at a random in-bounds offset
//!
//! # Example
//!
//! ```no_run
//! use durabench::config::{Config, workload::Mode};
//! use durabench::stats::aggregator::StatsAggregator;
//! use durabench::target::FilePool;
//! use durabench::worker::Worker;
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! let config = Config::new("dat", 4, 1024 * 1024, Mode::Write);
//! let pool = Arc::new(FilePool::initialize("dat", 4, 1024 * 1024, config.pool.sync_method)?);
//! let aggregator = Arc::new(StatsAggregator::new()?);
//!
//! let mut worker = Worker::new(0, &config, pool, aggregator, 0..4)?;
//! let outcome = worker.run(Some(1000), &AtomicBool::new(false))?;
//! println!("worker 0 finished {} operations", outcome.operations);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::config::workload::Mode;
use crate::config::Config;
use crate::distribution::{uniform::UniformDistribution, Distribution};
use crate::stats::aggregator::StatsAggregator;
use crate::stats::live::ProgressReporter;
use crate::stats::{RunStats, Sample};
use crate::target::FilePool;
use crate::util::buffer::{BufferPool, EndurancePlan};
use crate::Result;
use anyhow::Context;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// Where write-mode payloads come from
enum Payloads {
    /// Regenerated before every write
    Fresh(Vec<u8>),
    /// Pre-generated, cycled round-robin
    Pooled(BufferPool),
}

/// Result of a worker loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerOutcome {
    /// Operations this worker completed
    pub operations: u64,
    /// Whether the loop ended because the stop flag was raised
    pub interrupted: bool,
}

/// Workload loop over one partition of the pool
pub struct Worker {
    id: usize,
    mode: Mode,
    slots: Range<usize>,
    file_size: u64,
    endurance_max_write: u64,
    pool: Arc<FilePool>,
    aggregator: Arc<StatsAggregator>,
    dist: Box<dyn Distribution>,
    reporter: ProgressReporter,
    payloads: Payloads,
    /// Read destination, or endurance payload scratch
    buf: Vec<u8>,
    operations: u64,
}

impl Worker {
    /// Create a worker over `slots`, seeded `seed + id` when a seed is configured
    ///
    /// A worker in a parallel run (`threads > 1`) pre-generates its write
    /// payloads; a single worker regenerates one per iteration.
    pub fn new(
        id: usize,
        config: &Config,
        pool: Arc<FilePool>,
        aggregator: Arc<StatsAggregator>,
        slots: Range<usize>,
    ) -> Result<Self> {
        let seed = config.workload.seed.map(|s| s.wrapping_add(id as u64));
        let dist = Box::new(UniformDistribution::from_optional_seed(seed));
        Self::with_distribution(id, config, pool, aggregator, slots, dist)
    }

    /// Create a worker with an explicit random source
    pub fn with_distribution(
        id: usize,
        config: &Config,
        pool: Arc<FilePool>,
        aggregator: Arc<StatsAggregator>,
        slots: Range<usize>,
        mut dist: Box<dyn Distribution>,
    ) -> Result<Self> {
        if slots.is_empty() || slots.end > pool.len() {
            anyhow::bail!(
                "Worker {}: invalid slot range {:?} for a pool of {} files",
                id,
                slots,
                pool.len()
            );
        }

        let mode = config.workload.mode;
        let file_size = pool.file_size();
        let file_len = usize::try_from(file_size)
            .with_context(|| format!("File size {} does not fit in memory", file_size))?;

        let payloads = match mode {
            Mode::Write if config.is_parallel() => {
                let count = BufferPool::capacity_for(file_size);
                debug!("Worker {}: pre-generating {} payloads of {} bytes", id, count, file_size);
                Payloads::Pooled(BufferPool::generate(dist.as_mut(), count, file_len))
            }
            Mode::Write => Payloads::Fresh(vec![0u8; file_len]),
            Mode::Read | Mode::Endurance => Payloads::Fresh(Vec::new()),
        };
        let buf = match mode {
            Mode::Read => vec![0u8; file_len],
            Mode::Endurance => Vec::with_capacity(config.workload.endurance_max_write as usize),
            Mode::Write => Vec::new(),
        };

        Ok(Self {
            id,
            mode,
            slots,
            file_size,
            endurance_max_write: config.workload.endurance_max_write,
            pool,
            aggregator,
            dist,
            reporter: ProgressReporter::new(mode, config.report_interval()),
            payloads,
            buf,
            operations: 0,
        })
    }

    /// Operations completed so far
    pub fn operations(&self) -> u64 {
        self.operations
    }

    /// Restart the reporter's wall clock; call right before the loop starts
    pub fn start_clock(&mut self) {
        self.reporter.restart();
    }

    /// Pick a slot uniformly from this worker's range
    #[inline]
    fn select_slot(&mut self) -> usize {
        let len = (self.slots.end - self.slots.start) as u64;
        self.slots.start + self.dist.uniform_index(len) as usize
    }

    /// Perform one operation and return the aggregate counters including it
    ///
    /// Any IO failure is returned as is; the caller ends the run.
    pub fn step(&mut self) -> Result<RunStats> {
        let slot = self.select_slot();

        let sample = match self.mode {
            Mode::Write => {
                let payload: &[u8] = match &mut self.payloads {
                    Payloads::Fresh(buf) => {
                        self.dist.fill_letters(buf);
                        &buf[..]
                    }
                    Payloads::Pooled(pool) => pool.next_buffer(),
                };
                let start = Instant::now();
                self.pool.write_at(slot, 0, payload)?;
                Sample::new(self.file_size, start.elapsed())
            }
            Mode::Read => {
                let start = Instant::now();
                self.pool.read_at(slot, 0, &mut self.buf)?;
                Sample::new(self.file_size, start.elapsed())
            }
            Mode::Endurance => {
                let plan = EndurancePlan::draw(self.dist.as_mut(), self.file_size, self.endurance_max_write);
                trace!("Worker {}: slot {} offset {} len {}", self.id, slot, plan.offset, plan.length);
                let payload = plan.payload(&mut self.buf);
                let start = Instant::now();
                self.pool.write_at(slot, plan.offset, payload)?;
                Sample::new(plan.length as u64, start.elapsed())
            }
        };

        self.operations += 1;
        let stats = self.aggregator.record(sample);
        self.reporter.observe(&stats);
        Ok(stats)
    }

    /// Run until `limit` operations are done or `stop_flag` is raised
    ///
    /// With no limit the loop only ends through the stop flag or an error.
    pub fn run(&mut self, limit: Option<u64>, stop_flag: &AtomicBool) -> Result<WorkerOutcome> {
        let start_ops = self.operations;
        self.start_clock();

        loop {
            if stop_flag.load(Ordering::Relaxed) {
                debug!("Worker {}: stop requested after {} operations", self.id, self.operations - start_ops);
                return Ok(WorkerOutcome {
                    operations: self.operations - start_ops,
                    interrupted: true,
                });
            }
            if let Some(limit) = limit {
                if self.operations - start_ops >= limit {
                    return Ok(WorkerOutcome {
                        operations: self.operations - start_ops,
                        interrupted: false,
                    });
                }
            }

            self.step()
                .with_context(|| format!("Worker {} failed", self.id))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::workload::SyncMethod;
    use tempfile::TempDir;

    fn setup(mode: Mode, count: usize, size: u64) -> (TempDir, Config, Arc<FilePool>, Arc<StatsAggregator>) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::new(temp_dir.path(), count, size, mode);
        config.workload.seed = Some(42);
        let pool = Arc::new(FilePool::initialize(temp_dir.path(), count, size, SyncMethod::Fsync).unwrap());
        let aggregator = Arc::new(StatsAggregator::new().unwrap());
        (temp_dir, config, pool, aggregator)
    }

    #[test]
    fn test_write_step_records_full_file() {
        let (_dir, config, pool, aggregator) = setup(Mode::Write, 2, 8192);
        let mut worker = Worker::new(0, &config, Arc::clone(&pool), Arc::clone(&aggregator), 0..2).unwrap();

        let stats = worker.step().unwrap();
        assert_eq!(stats.operation_count, 1);
        assert_eq!(stats.total_bytes, 8192);
        assert_eq!(pool.disk_size(0).unwrap(), 8192);
        assert_eq!(pool.disk_size(1).unwrap(), 8192);
    }

    #[test]
    fn test_write_replaces_filler() {
        let (dir, config, pool, aggregator) = setup(Mode::Write, 1, 4096);
        let mut worker = Worker::new(0, &config, pool, aggregator, 0..1).unwrap();
        worker.step().unwrap();

        let content = std::fs::read(crate::target::slot_path(dir.path(), 0)).unwrap();
        assert_eq!(content.len(), 4096);
        assert!(content.iter().all(|c| c.is_ascii_lowercase()));
        assert!(content.iter().any(|&c| c != b'a'));
    }

    #[test]
    fn test_read_run() {
        let (_dir, config, pool, aggregator) = setup(Mode::Read, 3, 4096);
        let mut worker = Worker::new(0, &config, pool, Arc::clone(&aggregator), 0..3).unwrap();

        let outcome = worker.run(Some(25), &AtomicBool::new(false)).unwrap();
        assert_eq!(outcome, WorkerOutcome { operations: 25, interrupted: false });
        assert_eq!(aggregator.snapshot().total_bytes, 25 * 4096);
    }

    #[test]
    fn test_endurance_keeps_size() {
        let (_dir, mut config, pool, aggregator) = setup(Mode::Endurance, 1, 16 * 1024);
        config.workload.endurance_max_write = 4096;
        let mut worker = Worker::new(0, &config, Arc::clone(&pool), Arc::clone(&aggregator), 0..1).unwrap();

        worker.run(Some(200), &AtomicBool::new(false)).unwrap();
        let stats = aggregator.snapshot();
        assert_eq!(stats.operation_count, 200);
        assert!(stats.total_bytes >= 200 && stats.total_bytes < 200 * 4096);
        assert_eq!(pool.disk_size(0).unwrap(), 16 * 1024);
    }

    #[test]
    fn test_stays_in_partition() {
        let (dir, mut config, pool, aggregator) = setup(Mode::Write, 4, 4096);
        config.workers.threads = 2;
        let mut worker = Worker::new(1, &config, pool, aggregator, 2..4).unwrap();
        worker.run(Some(50), &AtomicBool::new(false)).unwrap();

        // Slots outside 2..4 still hold the filler
        for id in 0..2 {
            let content = std::fs::read(crate::target::slot_path(dir.path(), id)).unwrap();
            assert!(content.iter().all(|&c| c == b'a'));
        }
    }

    #[test]
    fn test_stop_flag_interrupts() {
        let (_dir, config, pool, aggregator) = setup(Mode::Endurance, 1, 8192);
        let mut worker = Worker::new(0, &config, pool, aggregator, 0..1).unwrap();

        let outcome = worker.run(None, &AtomicBool::new(true)).unwrap();
        assert!(outcome.interrupted);
        assert_eq!(outcome.operations, 0);
    }

    #[test]
    fn test_invalid_slot_range() {
        let (_dir, config, pool, aggregator) = setup(Mode::Write, 2, 4096);
        assert!(Worker::new(0, &config, Arc::clone(&pool), Arc::clone(&aggregator), 1..3).is_err());
        assert!(Worker::new(0, &config, pool, aggregator, 1..1).is_err());
    }

    #[test]
    fn test_seeded_workers_repeat() {
        let pick = |seed: u64| {
            let (_dir, mut config, pool, aggregator) = setup(Mode::Endurance, 4, 8192);
            config.workload.seed = Some(seed);
            let mut worker = Worker::new(0, &config, pool, aggregator, 0..4).unwrap();
            (0..20).map(|_| worker.select_slot()).collect::<Vec<_>>()
        };
        assert_eq!(pick(7), pick(7));
    }
}
