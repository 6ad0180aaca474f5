//! Single-slot latest-wins frame handoff.
//!
//! The producer overwrites the slot; the session drains it. A payload that is
//! overwritten before the session reads it is skipped.
//!
//! ```text
//! publish(p1) ──┐
//! publish(p2) ──┼──► [ Some(p2) ] ──► take_if_present() = Some(p2)
//!               │                     take_if_present() = None
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_tungstenite::tungstenite::Bytes;
use tracing::trace;

// ============================================================================
// FrameSlot
// ============================================================================

/// Capacity-one, overwrite-on-write payload cell.
///
/// # Thread Safety
///
/// `FrameSlot` is `Send + Sync`. Both operations hold the lock only for a
/// pointer swap, so [`publish`](Self::publish) never waits on I/O.
#[derive(Default)]
pub struct FrameSlot {
    /// Pending payload, if any.
    cell: Mutex<Option<Bytes>>,
    /// Wakes an idle session when a payload lands.
    ready: Notify,
}

impl FrameSlot {
    /// Creates an empty slot.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `payload`, replacing any unconsumed value.
    ///
    /// Returns immediately; never blocks and never queues.
    pub fn publish(&self, payload: impl Into<Bytes>) {
        let payload = payload.into();
        let replaced = self.cell.lock().replace(payload).is_some();
        if replaced {
            trace!("Unsent frame overwritten");
        }
        self.ready.notify_one();
    }

    /// Returns the pending payload and clears the slot.
    #[inline]
    pub fn take_if_present(&self) -> Option<Bytes> {
        self.cell.lock().take()
    }

    /// Returns `true` if a payload is waiting.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.cell.lock().is_some()
    }

    /// Resolves once a payload has been published since the last wake-up.
    ///
    /// A publish that happened while nobody was waiting is remembered, so
    /// this can resolve immediately. The slot may already be empty again by
    /// the time the caller checks it.
    pub async fn wait_ready(&self) {
        self.ready.notified().await;
    }
}

impl fmt::Debug for FrameSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSlot")
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
