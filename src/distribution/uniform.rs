//! Uniform random distribution
//!
//! Uses the xoshiro256++ PRNG, which is fast and has good statistical
//! properties. It is queried once or twice per operation and for every byte
//! of a throughput-write payload.

use super::Distribution;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::{SystemTime, UNIX_EPOCH};

/// Uniform random distribution
pub struct UniformDistribution {
    rng: Xoshiro256PlusPlus,
}

impl UniformDistribution {
    /// Create a new uniform distribution seeded from the system clock
    pub fn new() -> Self {
        Self::with_seed(clock_seed())
    }

    /// Create a new uniform distribution with specific seed
    ///
    /// Useful for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Seeded from `seed` when given, otherwise from the clock
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }
}

impl Default for UniformDistribution {
    fn default() -> Self {
        Self::new()
    }
}

/// Nanoseconds since the epoch, folded into 64 bits
pub fn clock_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    (nanos as u64) ^ ((nanos >> 64) as u64)
}

impl Distribution for UniformDistribution {
    #[inline(always)]
    fn uniform_index(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    #[inline]
    fn uniform_range(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo || lo <= 0 {
            return 0;
        }
        self.rng.gen_range(lo..hi)
    }

    #[inline]
    fn random_letter(&mut self) -> u8 {
        self.rng.gen_range(b'a'..=b'z')
    }

    fn fill_letters(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.rng.gen_range(b'a'..=b'z');
        }
        buf.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_index_basic() {
        let mut dist = UniformDistribution::new();

        for _ in 0..100 {
            assert!(dist.uniform_index(1000) < 1000);
        }
        assert_eq!(dist.uniform_index(0), 0);
        assert_eq!(dist.uniform_index(1), 0);
    }

    #[test]
    fn test_uniform_distribution_seeded() {
        let mut dist1 = UniformDistribution::with_seed(12345);
        let mut dist2 = UniformDistribution::with_seed(12345);

        // Same seed should produce same sequence
        for _ in 0..10 {
            assert_eq!(dist1.uniform_index(1000), dist2.uniform_index(1000));
            assert_eq!(dist1.uniform_range(1, 4096), dist2.uniform_range(1, 4096));
        }
    }

    #[test]
    fn test_uniform_range_degenerate() {
        let mut dist = UniformDistribution::with_seed(1);
        assert_eq!(dist.uniform_range(5, 5), 0);
        assert_eq!(dist.uniform_range(9, 3), 0);
        assert_eq!(dist.uniform_range(0, 100), 0);
        assert_eq!(dist.uniform_range(-5, 100), 0);
        assert_eq!(dist.uniform_range(i64::MIN, i64::MAX), 0);
    }

    #[test]
    fn test_uniform_range_coverage() {
        let mut dist = UniformDistribution::with_seed(42);
        let (lo, hi) = (1i64, 101i64);
        let mut buckets = vec![0u32; 10];

        for _ in 0..100_000 {
            let v = dist.uniform_range(lo, hi);
            assert!(v >= lo && v < hi, "value {} outside [{}, {})", v, lo, hi);
            buckets[((v - lo) / 10) as usize] += 1;
        }

        // Each bucket should hold roughly 10000 samples
        for count in buckets {
            assert!(count > 9000 && count < 11000, "Bucket count {} outside expected range", count);
        }
    }

    #[test]
    fn test_random_letter_is_lowercase() {
        let mut dist = UniformDistribution::with_seed(3);
        let mut seen = [false; 26];
        for _ in 0..10_000 {
            let c = dist.random_letter();
            assert!(c.is_ascii_lowercase());
            seen[(c - b'a') as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_fill_letters() {
        let mut dist = UniformDistribution::with_seed(9);
        let mut buf = vec![0u8; 4096];
        dist.fill_letters(&mut buf);
        assert!(buf.iter().all(|c| c.is_ascii_lowercase()));
        // Not a single repeated byte
        assert!(buf.iter().any(|&c| c != buf[0]));
    }
}
