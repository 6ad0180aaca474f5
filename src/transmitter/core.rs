//! Frame transmitter facade.
//!
//! The [`Transmitter`] is what the frame producer talks to: `start`, `stop`,
//! and a non-blocking `publish`. Everything else happens on the background
//! task owned by the [`ConnectionSupervisor`].
//!
//! # Example
//!
//! ```no_run
//! use wall_frame_transmitter::{Frame, Transmitter};
//!
//! # async fn example() -> wall_frame_transmitter::Result<()> {
//! let mut transmitter = Transmitter::new("ws://127.0.0.1:8765/frames")?;
//! transmitter.start()?;
//!
//! transmitter.send_frame(&Frame::solid(30, 64, 32, [255, 0, 0]));
//!
//! transmitter.stop().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio_tungstenite::tungstenite::Bytes;
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;
use crate::frame::{Frame, FrameEncoder};
use crate::transport::{ConnectionSupervisor, FrameSlot, StatsSnapshot, TransmitterStats};

use super::builder::TransmitterBuilder;
use super::options::TransmitterOptions;

// ============================================================================
// FramePublisher
// ============================================================================

/// Cloneable producer-side handle.
///
/// Hand this to the production loop when the [`Transmitter`] itself is owned
/// elsewhere. Publishing never blocks and never fails.
#[derive(Clone)]
pub struct FramePublisher {
    /// Shared handoff slot.
    slot: Arc<FrameSlot>,
    /// Encoder for `send_frame`.
    encoder: Arc<dyn FrameEncoder>,
}

impl fmt::Debug for FramePublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePublisher")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl FramePublisher {
    /// Replaces the pending payload with `payload`.
    #[inline]
    pub fn publish(&self, payload: impl Into<Bytes>) {
        self.slot.publish(payload);
    }

    /// Encodes `frame` and publishes the result.
    pub fn send_frame(&self, frame: &Frame) {
        let payload = self.encoder.encode(frame);
        self.slot.publish(payload);
    }
}

// ============================================================================
// Transmitter
// ============================================================================

/// Streams the latest published frame to one destination.
///
/// Created by [`TransmitterBuilder::build`] in the stopped state.
pub struct Transmitter {
    /// Remote endpoint.
    destination: Url,
    /// Session and supervision options.
    options: Arc<TransmitterOptions>,
    /// Producer-side handle.
    publisher: FramePublisher,
    /// Diagnostic counters.
    stats: Arc<TransmitterStats>,
    /// Present while started.
    supervisor: Option<ConnectionSupervisor>,
}

// ============================================================================
// Transmitter - Display
// ============================================================================

impl fmt::Debug for Transmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transmitter")
            .field("destination", &self.destination.as_str())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Transmitter - Public API
// ============================================================================

impl Transmitter {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> TransmitterBuilder {
        TransmitterBuilder::new()
    }

    /// Creates a transmitter for `destination` with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination is not a valid `ws://` URL.
    pub fn new(destination: impl Into<String>) -> Result<Self> {
        Self::builder().destination(destination).build()
    }

    /// Starts the background connection task.
    ///
    /// A no-op if already running. After [`stop`](Self::stop) a fresh task is
    /// started.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) outside a tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            warn!(url = %self.destination, "Transmitter already started");
            return Ok(());
        }

        // A supervisor that gave up is finished; replace it.
        self.supervisor = None;

        let supervisor = ConnectionSupervisor::spawn(
            self.destination.clone(),
            Arc::clone(&self.options),
            Arc::clone(&self.publisher.slot),
            Arc::clone(&self.stats),
        )?;
        self.supervisor = Some(supervisor);

        Ok(())
    }

    /// Stops the background task, waiting up to the join timeout.
    ///
    /// Always leaves the transmitter stopped. A no-op if not started.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShutdownTimeout`](crate::Error::ShutdownTimeout) if
    /// the task did not finish in time; it keeps winding down on its own.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(supervisor) = self.supervisor.take() else {
            debug!("Transmitter stop requested while not started");
            return Ok(());
        };

        supervisor.stop().await
    }

    /// Replaces the pending payload. Never blocks, never fails.
    #[inline]
    pub fn publish(&self, payload: impl Into<Bytes>) {
        self.publisher.publish(payload);
    }

    /// Encodes `frame` with the configured encoder and publishes it.
    #[inline]
    pub fn send_frame(&self, frame: &Frame) {
        self.publisher.send_frame(frame);
    }

    /// Returns a cloneable handle for the producer.
    #[inline]
    #[must_use]
    pub fn publisher(&self) -> FramePublisher {
        self.publisher.clone()
    }

    /// Returns `true` while the background task is supervising sessions.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.supervisor
            .as_ref()
            .is_some_and(ConnectionSupervisor::is_running)
    }

    /// Returns a copy of the diagnostic counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns the destination URL.
    #[inline]
    #[must_use]
    pub fn destination(&self) -> &Url {
        &self.destination
    }

    /// Returns the configured options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &TransmitterOptions {
        &self.options
    }
}

// ============================================================================
// Transmitter - Internal API
// ============================================================================

impl Transmitter {
    /// Creates a stopped transmitter from validated parts.
    pub(crate) fn new_validated(
        destination: Url,
        options: TransmitterOptions,
        encoder: Arc<dyn FrameEncoder>,
    ) -> Self {
        Self {
            destination,
            options: Arc::new(options),
            publisher: FramePublisher {
                slot: Arc::new(FrameSlot::new()),
                encoder,
            },
            stats: Arc::new(TransmitterStats::default()),
            supervisor: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
