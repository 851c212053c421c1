//! Random source for workload generation
//!
//! Workers never share random state. Each one owns a [`Distribution`] object
//! seeded either from the high-resolution clock or from an explicit seed, so a
//! run can be made reproducible and the parallel variant gets independent
//! streams (`base_seed + worker_id`).
//!
//! # Example
//!
//! ```
//! use durabench::distribution::{Distribution, uniform::UniformDistribution};
//!
//! let mut dist = UniformDistribution::with_seed(7);
//! let slot = dist.uniform_index(4);
//! assert!(slot < 4);
//!
//! // Degenerate ranges yield 0 instead of failing
//! assert_eq!(dist.uniform_range(10, 10), 0);
//! ```

/// Distribution trait for slot, length and offset selection
///
/// Distributions must be `Send` so a worker thread can own one.
pub trait Distribution: Send {
    /// Uniform index in `[0, n)`; returns 0 when `n == 0`
    fn uniform_index(&mut self, n: u64) -> u64;

    /// Uniform value in `[lo, hi)`
    ///
    /// Returns 0 when the range is empty or inverted (`hi <= lo`) or when
    /// `lo <= 0`. This is a policy, not an error: callers get a harmless value
    /// and no panic.
    fn uniform_range(&mut self, lo: i64, hi: i64) -> i64;

    /// Single random lowercase ASCII letter
    fn random_letter(&mut self) -> u8;

    /// Fill `buf` with random lowercase letters, then shuffle it
    fn fill_letters(&mut self, buf: &mut [u8]);
}

pub mod uniform;
