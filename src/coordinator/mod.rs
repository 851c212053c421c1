//! Benchmark driver
//!
//! Runs one benchmark through its states:
//!
//! ```text
//! Initializing -> Filling -> Running -> Converged | Completed | Interrupted
//! ```
//!
//! A single-worker throughput run feeds the aggregate throughput to a
//! [`StabilityDetector`] every `sample_interval` operations and ends once it
//! converges. Endurance runs until the stop flag is raised. Either can be
//! capped with `max_iterations`.
//!
//! With more than one thread the pool is partitioned and each worker runs a
//! fixed number of iterations on its own range. The first failing worker
//! raises the stop flag so the others wind down, and its error is returned.

use crate::config::validator::validate_config;
use crate::config::workload::Mode;
use crate::config::Config;
use crate::engine::IOEngine;
use crate::error::BenchError;
use crate::stats::aggregator::StatsAggregator;
use crate::stats::stability::StabilityDetector;
use crate::stats::{LatencySummary, RunStats};
use crate::target::{partition_ranges, FilePool};
use crate::worker::{Worker, WorkerOutcome};
use crate::Result;
use anyhow::Context;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Lifecycle state of a benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Initializing,
    Filling,
    Running,
    /// Throughput stabilized
    Converged,
    /// Iteration budget exhausted
    Completed,
    /// Stop flag raised
    Interrupted,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Initializing => "initializing",
            RunState::Filling => "filling",
            RunState::Running => "running",
            RunState::Converged => "converged",
            RunState::Completed => "completed",
            RunState::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of a run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: Mode,
    pub state: RunState,
    pub stats: RunStats,
    /// Wall-clock time spent in Running
    pub wall: Duration,
    pub latency: Option<LatencySummary>,
    /// Throughput samples handed to the stability detector
    pub stability_samples: usize,
    pub workers: usize,
}

impl RunReport {
    /// Bytes per second: over summed operation time for throughput modes,
    /// over wall-clock time for endurance
    pub fn throughput(&self) -> f64 {
        if self.mode.is_throughput() {
            self.stats.throughput()
        } else {
            self.stats.throughput_over(self.wall)
        }
    }
}

/// One benchmark run over a validated configuration
pub struct Benchmark {
    config: Config,
    state: RunState,
    stop_flag: Arc<AtomicBool>,
    engine: Option<Box<dyn IOEngine>>,
}

impl Benchmark {
    /// Validate `config` and prepare a run
    pub fn new(config: Config) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self {
            config,
            state: RunState::Initializing,
            stop_flag: Arc::new(AtomicBool::new(false)),
            engine: None,
        })
    }

    /// Use an externally owned stop flag (e.g. one set by a signal handler)
    pub fn with_stop_flag(mut self, stop_flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = stop_flag;
        self
    }

    /// Perform IO through `engine` instead of the configured sync engine
    pub fn with_engine(mut self, engine: Box<dyn IOEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn transition(&mut self, next: RunState) {
        debug!("Benchmark state: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Fill the pool and run the workload to a terminal state
    ///
    /// Any IO failure ends the run with that error. Files are never removed.
    pub fn run(&mut self) -> Result<RunReport> {
        if self.state != RunState::Initializing {
            anyhow::bail!("Benchmark already ran (state: {})", self.state);
        }

        let threads = self.config.workers.threads;
        let partitions = partition_ranges(self.config.pool.file_count, threads);
        debug!("Partitions: {:?}", partitions);

        self.transition(RunState::Filling);
        println!("--- Initializing files ---");
        let pool = self.fill_pool()?;
        let pool = Arc::new(pool);
        let aggregator = Arc::new(StatsAggregator::new()?);

        self.transition(RunState::Running);
        println!("--- Performing {} test ---", self.config.workload.mode);
        let started = Instant::now();
        let (state, stability_samples) = if self.config.is_parallel() {
            (self.run_parallel(&pool, &aggregator)?, 0)
        } else {
            self.run_single(&pool, &aggregator)?
        };
        let wall = started.elapsed();
        self.transition(state);

        if let Ok(mut pool) = Arc::try_unwrap(pool) {
            pool.close_all();
        }

        let stats = aggregator.snapshot();
        info!(
            "Run {} after {} operations ({} bytes) in {:.3}s",
            state,
            stats.operation_count,
            stats.total_bytes,
            wall.as_secs_f64()
        );

        Ok(RunReport {
            mode: self.config.workload.mode,
            state,
            stats,
            wall,
            latency: aggregator.latency_summary(),
            stability_samples,
            workers: threads,
        })
    }

    fn fill_pool(&mut self) -> Result<FilePool> {
        let pool_config = &self.config.pool;
        let pool = match self.engine.take() {
            Some(engine) => FilePool::initialize_with_engine(
                pool_config.directory.clone(),
                pool_config.file_count,
                pool_config.file_size,
                engine,
            ),
            None => FilePool::initialize(
                pool_config.directory.clone(),
                pool_config.file_count,
                pool_config.file_size,
                pool_config.sync_method,
            ),
        };
        pool.context("Failed to initialize files")
    }

    /// Single worker over the whole pool; returns the end state and the
    /// number of stability samples taken
    fn run_single(
        &self,
        pool: &Arc<FilePool>,
        aggregator: &Arc<StatsAggregator>,
    ) -> Result<(RunState, usize)> {
        let stability = &self.config.stability;
        let mut detector = self
            .config
            .workload
            .mode
            .is_throughput()
            .then(|| StabilityDetector::new(stability.min_samples, stability.tolerance));
        let max_iterations = self.config.workload.max_iterations;

        let mut worker = Worker::new(
            0,
            &self.config,
            Arc::clone(pool),
            Arc::clone(aggregator),
            0..pool.len(),
        )?;
        worker.start_clock();

        let samples = |d: &Option<StabilityDetector>| d.as_ref().map_or(0, |d| d.samples());

        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                info!("Stop requested after {} operations", worker.operations());
                return Ok((RunState::Interrupted, samples(&detector)));
            }
            if let Some(cap) = max_iterations {
                if worker.operations() >= cap {
                    return Ok((RunState::Completed, samples(&detector)));
                }
            }

            let stats = worker.step().context("Workload failed")?;

            if let Some(detector) = detector.as_mut() {
                if stats.operation_count % stability.sample_interval == 0 {
                    let throughput = stats.throughput();
                    debug!("Stability sample {}: {:.0} B/s", detector.samples() + 1, throughput);
                    if detector.push(throughput) {
                        info!(
                            "Throughput converged after {} samples ({} operations)",
                            detector.samples(),
                            stats.operation_count
                        );
                        return Ok((RunState::Converged, detector.samples()));
                    }
                }
            }
        }
    }

    /// Partitioned run with one thread per worker
    fn run_parallel(&self, pool: &Arc<FilePool>, aggregator: &Arc<StatsAggregator>) -> Result<RunState> {
        let threads = self.config.workers.threads;
        let iterations = self.config.workers.iterations;
        let partitions = pool.partition(threads);

        let mut handles = Vec::with_capacity(partitions.len());
        for (id, slots) in partitions.into_iter().enumerate() {
            let config = self.config.clone();
            let pool = Arc::clone(pool);
            let aggregator = Arc::clone(aggregator);
            let stop_flag = Arc::clone(&self.stop_flag);

            let spawned = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || -> Result<WorkerOutcome> {
                    let _guard = StopOnPanic(Arc::clone(&stop_flag));
                    debug!("Worker {} starting on slots {:?}", id, slots);
                    let result = Worker::new(id, &config, pool, aggregator, slots)
                        .and_then(|mut worker| worker.run(Some(iterations), &stop_flag));
                    if result.is_err() {
                        stop_flag.store(true, Ordering::Relaxed);
                    }
                    result
                });

            match spawned {
                Ok(handle) => handles.push((id, handle)),
                Err(e) => {
                    self.stop_flag.store(true, Ordering::Relaxed);
                    join_all(handles);
                    return Err(e).with_context(|| format!("Failed to spawn worker {}", id));
                }
            }
        }

        let mut interrupted = false;
        let mut first_error = None;
        for (id, result) in join_all(handles) {
            match result {
                Ok(outcome) => {
                    debug!("Worker {} finished {} operations", id, outcome.operations);
                    interrupted |= outcome.interrupted;
                }
                Err(e) => {
                    warn!("Worker {} failed: {:#}", id, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        Ok(if interrupted {
            RunState::Interrupted
        } else {
            RunState::Completed
        })
    }
}

/// Raises the stop flag if the owning thread unwinds
struct StopOnPanic(Arc<AtomicBool>);

impl Drop for StopOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::Relaxed);
        }
    }
}

type WorkerHandle = (usize, thread::JoinHandle<Result<WorkerOutcome>>);

/// Join every worker in id order, mapping panics to [`BenchError::WorkerPanicked`]
fn join_all(handles: Vec<WorkerHandle>) -> Vec<(usize, Result<WorkerOutcome>)> {
    handles
        .into_iter()
        .map(|(id, handle)| {
            let result = handle
                .join()
                .unwrap_or_else(|_| Err(BenchError::WorkerPanicked(id).into()));
            (id, result)
        })
        .collect()
}
