//! Throughput convergence detection
//!
//! A two-point finite-difference test: a throughput run is stable once enough
//! aggregate-throughput samples have been taken and the last two differ by
//! less than an absolute tolerance. The tolerance is in bytes/second and does
//! not scale with file size, so it has to be chosen for the hardware at hand.

/// Whether `history` has converged
///
/// False while `history` holds fewer than `min_samples` values (and always
/// for fewer than two). Otherwise true iff the last two values differ by
/// strictly less than `tolerance`, so a tolerance of 0 never converges.
pub fn is_stable(history: &[f64], min_samples: usize, tolerance: f64) -> bool {
    let n = history.len();
    if n < min_samples.max(2) {
        return false;
    }
    (history[n - 1] - history[n - 2]).abs() < tolerance
}

/// Running convergence test over aggregate-throughput samples
#[derive(Debug, Clone)]
pub struct StabilityDetector {
    history: Vec<f64>,
    min_samples: usize,
    tolerance: f64,
}

impl StabilityDetector {
    pub fn new(min_samples: usize, tolerance: f64) -> Self {
        Self {
            history: Vec::new(),
            min_samples,
            tolerance,
        }
    }

    /// Record a sample and report whether the series is now stable
    pub fn push(&mut self, throughput: f64) -> bool {
        self.history.push(throughput);
        self.is_stable()
    }

    pub fn is_stable(&self) -> bool {
        is_stable(&self.history, self.min_samples, self.tolerance)
    }

    /// Number of samples taken so far
    pub fn samples(&self) -> usize {
        self.history.len()
    }
}
