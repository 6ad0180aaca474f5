//! Diagnostic counters shared between the supervisor task and callers.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

// ============================================================================
// TransmitterStats
// ============================================================================

/// Lock-free counters updated by the background task.
///
/// Values are independent; a snapshot is not a consistent cut.
#[derive(Debug, Default)]
pub struct TransmitterStats {
    sessions_started: AtomicU64,
    sessions_failed: AtomicU64,
    frames_sent: AtomicU64,
    acks_received: AtomicU64,
    rtt_micros: AtomicU64,
}

/// Point-in-time copy of [`TransmitterStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Connection attempts made.
    pub sessions_started: u64,
    /// Sessions that ended with an error.
    pub sessions_failed: u64,
    /// Payloads written to the socket.
    pub frames_sent: u64,
    /// Acknowledgments consumed in ack-wait mode.
    pub acks_received: u64,
    /// Latest RTT estimate.
    pub rtt: Duration,
}

impl TransmitterStats {
    pub(crate) fn session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn session_failed(&self) {
        self.sessions_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn ack_received(&self, rtt: Duration) {
        self.acks_received.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(rtt.as_micros()).unwrap_or(u64::MAX);
        self.rtt_micros.store(micros, Ordering::Relaxed);
    }

    /// Copies the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            sessions_failed: self.sessions_failed.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            acks_received: self.acks_received.load(Ordering::Relaxed),
            rtt: Duration::from_micros(self.rtt_micros.load(Ordering::Relaxed)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
