//! durabench - Durable random-I/O benchmark
//!
//! durabench measures sustained throughput and long-term wear behaviour of block
//! storage. It creates a fixed pool of pre-filled files once, then repeatedly
//! writes or reads them at random, forcing every operation through to the media
//! (fsync/fdatasync) before it is timed.
//!
//! # Architecture
//!
//! - **Workload generation**: explicit, seedable random sources and payloads
//! - **File pool**: fixed set of pre-sized files with durable positioned IO
//! - **Workers**: one loop per partition of the pool, throughput or endurance policy
//! - **Statistics**: mutex-protected aggregate counters with latency histogram
//! - **Stability detection**: two-point convergence test ending throughput runs

pub mod config;
pub mod coordinator;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod output;
pub mod stats;
pub mod target;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{Benchmark, RunReport, RunState};
pub use error::BenchError;

/// Result type used throughout durabench
pub type Result<T> = anyhow::Result<T>;
