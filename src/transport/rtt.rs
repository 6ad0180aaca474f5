//! Round-trip latency estimate for ack-wait sessions.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Weight kept from the previous estimate on each update.
const SMOOTHING: f64 = 0.9;

// ============================================================================
// RttEstimate
// ============================================================================

/// Exponentially weighted moving average of send+ack latency.
///
/// `estimate' = 0.9 * estimate + 0.1 * sample`, starting from zero.
/// Observational only: nothing paces or backs off on it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RttEstimate {
    /// Current estimate in seconds.
    estimate_secs: f64,
    /// Number of samples folded in.
    samples: u64,
}

impl RttEstimate {
    /// Creates an estimate with no samples.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            estimate_secs: 0.0,
            samples: 0,
        }
    }

    /// Folds one round-trip sample into the estimate.
    pub fn update(&mut self, sample: Duration) {
        self.estimate_secs =
            SMOOTHING * self.estimate_secs + (1.0 - SMOOTHING) * sample.as_secs_f64();
        self.samples += 1;
    }

    /// Current estimate.
    #[inline]
    #[must_use]
    pub fn estimate(&self) -> Duration {
        Duration::from_secs_f64(self.estimate_secs)
    }

    /// Current estimate in milliseconds.
    #[inline]
    #[must_use]
    pub fn estimate_ms(&self) -> f64 {
        self.estimate_secs * 1000.0
    }

    /// Number of samples folded in so far.
    #[inline]
    #[must_use]
    pub const fn samples(&self) -> u64 {
        self.samples
    }
}

// ============================================================================
// Tests
// ============================================================================
