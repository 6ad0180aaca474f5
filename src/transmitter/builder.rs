//! Builder pattern for transmitter configuration.
//!
//! Provides a fluent API for configuring and creating [`Transmitter`] instances.
//!
//! # Example
//!
//! ```no_run
//! use wall_frame_transmitter::Transmitter;
//!
//! # fn example() -> wall_frame_transmitter::Result<()> {
//! let transmitter = Transmitter::builder()
//!     .destination("ws://192.168.1.20:8765/frames")
//!     .handshake(true)
//!     .ack_wait(true)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::frame::{FrameEncoder, RawFrameEncoder};
use crate::transport::RetryPolicy;

use super::core::Transmitter;
use super::options::TransmitterOptions;

// ============================================================================
// TransmitterBuilder
// ============================================================================

/// Builder for configuring a [`Transmitter`] instance.
///
/// Use [`Transmitter::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct TransmitterBuilder {
    /// Destination URL, parsed at build time.
    destination: Option<String>,
    /// Session and supervision options.
    options: TransmitterOptions,
    /// Frame encoder, defaults to [`RawFrameEncoder`].
    encoder: Option<Arc<dyn FrameEncoder>>,
}

impl fmt::Debug for TransmitterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransmitterBuilder")
            .field("destination", &self.destination)
            .field("options", &self.options)
            .field("custom_encoder", &self.encoder.is_some())
            .finish()
    }
}

// ============================================================================
// TransmitterBuilder Implementation
// ============================================================================

impl TransmitterBuilder {
    /// Creates a new builder with default options and no destination.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the destination WebSocket URL.
    ///
    /// # Arguments
    ///
    /// * `url` - `ws://host:port/path` of the display endpoint
    #[inline]
    #[must_use]
    pub fn destination(mut self, url: impl Into<String>) -> Self {
        self.destination = Some(url.into());
        self
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: TransmitterOptions) -> Self {
        self.options = options;
        self
    }

    /// Enables or disables the startup handshake read.
    #[inline]
    #[must_use]
    pub fn handshake(mut self, enabled: bool) -> Self {
        self.options.handshake = enabled;
        self
    }

    /// Enables or disables per-send acknowledgment.
    #[inline]
    #[must_use]
    pub fn ack_wait(mut self, enabled: bool) -> Self {
        self.options.ack_wait = enabled;
        self
    }

    /// Sets the send pacing interval used without ack-wait.
    #[inline]
    #[must_use]
    pub fn send_interval(mut self, interval: Duration) -> Self {
        self.options.send_interval = interval;
        self
    }

    /// Sets the reconnect backoff.
    #[inline]
    #[must_use]
    pub fn reconnect_backoff(mut self, delay: Duration) -> Self {
        self.options.backoff.reconnect = delay;
        self
    }

    /// Sets the error backoff.
    #[inline]
    #[must_use]
    pub fn error_backoff(mut self, delay: Duration) -> Self {
        self.options.backoff.error = delay;
        self
    }

    /// Sets how long `stop()` waits for the background task.
    #[inline]
    #[must_use]
    pub fn join_timeout(mut self, timeout: Duration) -> Self {
        self.options.join_timeout = timeout;
        self
    }

    /// Sets the handshake/ack receive timeout. `None` waits forever.
    #[inline]
    #[must_use]
    pub fn recv_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.options.recv_timeout = timeout;
        self
    }

    /// Sets the send timeout. `None` waits forever.
    #[inline]
    #[must_use]
    pub fn send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.options.send_timeout = timeout;
        self
    }

    /// Sets the retry policy.
    #[inline]
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.options.retry = retry;
        self
    }

    /// Sets the encoder used by `send_frame`.
    #[inline]
    #[must_use]
    pub fn encoder(mut self, encoder: impl FrameEncoder + 'static) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    /// Builds the transmitter with validation.
    ///
    /// The transmitter is not started; call [`Transmitter::start`].
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the destination is missing or not `ws://`
    /// - [`Error::Url`] if the destination does not parse
    /// - [`Error::Config`] if an option is out of range
    pub fn build(self) -> Result<Transmitter> {
        let destination = self.validate_destination()?;
        self.options.validate().map_err(Error::config)?;

        let encoder: Arc<dyn FrameEncoder> = match self.encoder {
            Some(encoder) => encoder,
            None => Arc::new(RawFrameEncoder),
        };

        Ok(Transmitter::new_validated(destination, self.options, encoder))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl TransmitterBuilder {
    /// Validates and parses the destination URL.
    fn validate_destination(&self) -> Result<Url> {
        let raw = self.destination.as_deref().ok_or_else(|| {
            Error::config(
                "Destination is required. Use .destination() to set it.\n\
                 Example: Transmitter::builder().destination(\"ws://127.0.0.1:8765/frames\")",
            )
        })?;

        let url = Url::parse(raw)?;

        match url.scheme() {
            "ws" => {}
            "wss" => {
                return Err(Error::config(
                    "wss:// destinations are not supported: TLS is not compiled in",
                ));
            }
            other => {
                return Err(Error::config(format!(
                    "Unsupported destination scheme '{other}', expected ws://"
                )));
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::config(format!("Destination has no host: {raw}")));
        }

        Ok(url)
    }
}

// ============================================================================
// Tests
// ============================================================================
