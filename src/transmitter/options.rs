//! Transmitter configuration.
//!
//! Provides a type-safe set of knobs for session behavior (handshake,
//! ack-wait, pacing) and supervision timing (backoffs, join timeout).
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use wall_frame_transmitter::TransmitterOptions;
//!
//! let options = TransmitterOptions::new()
//!     .with_handshake()
//!     .with_ack_wait()
//!     .with_recv_timeout(Some(Duration::from_secs(2)));
//!
//! assert!(options.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::transport::{BackoffPolicy, RetryPolicy};

// ============================================================================
// Constants
// ============================================================================

/// Ping interval long enough to never fire in practice (one year).
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Minimum delay between sends when not waiting for acknowledgments (~40/s).
pub const DEFAULT_SEND_INTERVAL: Duration = Duration::from_millis(25);

/// How long `stop()` waits for the background task.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on a handshake or acknowledgment receive.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on writing one outbound message.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest an idle session sleeps before re-checking stop and keep-alive.
pub const DEFAULT_IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// TransmitterOptions
// ============================================================================

/// Session and supervision configuration.
#[derive(Debug, Clone)]
pub struct TransmitterOptions {
    /// Interval between keep-alive pings.
    pub ping_interval: Duration,

    /// Consume one inbound message right after connecting.
    pub handshake: bool,

    /// Wait for one inbound message after every send.
    pub ack_wait: bool,

    /// Pause after each send when `ack_wait` is off.
    pub send_interval: Duration,

    /// Reconnect and error delays.
    pub backoff: BackoffPolicy,

    /// How long `stop()` waits for the background task.
    pub join_timeout: Duration,

    /// Upper bound on establishing a connection.
    pub connect_timeout: Duration,

    /// Upper bound on handshake/ack receives. `None` waits forever.
    pub recv_timeout: Option<Duration>,

    /// Upper bound on writing a frame or ping. `None` waits forever.
    pub send_timeout: Option<Duration>,

    /// Longest idle wait between stop checks.
    pub idle_poll_interval: Duration,

    /// When the supervisor gives up.
    pub retry: RetryPolicy,
}

impl Default for TransmitterOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl TransmitterOptions {
    /// Creates options with default settings: fire-and-forget, no handshake.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ping_interval: DEFAULT_PING_INTERVAL,
            handshake: false,
            ack_wait: false,
            send_interval: DEFAULT_SEND_INTERVAL,
            backoff: BackoffPolicy::new(),
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            recv_timeout: Some(DEFAULT_RECV_TIMEOUT),
            send_timeout: Some(DEFAULT_SEND_TIMEOUT),
            idle_poll_interval: DEFAULT_IDLE_POLL_INTERVAL,
            retry: RetryPolicy::forever(),
        }
    }

    /// Options for a display that greets on connect and acknowledges every frame.
    #[must_use]
    pub fn acknowledged() -> Self {
        Self::new().with_handshake().with_ack_wait()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl TransmitterOptions {
    /// Enables the startup handshake read.
    #[inline]
    #[must_use]
    pub fn with_handshake(mut self) -> Self {
        self.handshake = true;
        self
    }

    /// Enables per-send acknowledgment.
    #[inline]
    #[must_use]
    pub fn with_ack_wait(mut self) -> Self {
        self.ack_wait = true;
        self
    }

    /// Sets the keep-alive ping interval.
    #[inline]
    #[must_use]
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Sets the send pacing interval used without ack-wait.
    #[inline]
    #[must_use]
    pub fn with_send_interval(mut self, interval: Duration) -> Self {
        self.send_interval = interval;
        self
    }

    /// Sets the reconnect backoff.
    #[inline]
    #[must_use]
    pub fn with_reconnect_backoff(mut self, delay: Duration) -> Self {
        self.backoff.reconnect = delay;
        self
    }

    /// Sets the error backoff.
    #[inline]
    #[must_use]
    pub fn with_error_backoff(mut self, delay: Duration) -> Self {
        self.backoff.error = delay;
        self
    }

    /// Sets the stop join timeout.
    #[inline]
    #[must_use]
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the receive timeout. `None` waits forever.
    #[inline]
    #[must_use]
    pub fn with_recv_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.recv_timeout = timeout;
        self
    }

    /// Sets the send timeout. `None` waits forever.
    #[inline]
    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Sets the idle poll interval.
    #[inline]
    #[must_use]
    pub fn with_idle_poll_interval(mut self, interval: Duration) -> Self {
        self.idle_poll_interval = interval;
        self
    }

    /// Sets the retry policy.
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl TransmitterOptions {
    /// Validates the options configuration.
    ///
    /// # Errors
    ///
    /// Returns error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.send_interval.is_zero() {
            return Err("Send interval must be greater than zero".to_string());
        }
        if self.idle_poll_interval.is_zero() {
            return Err("Idle poll interval must be greater than zero".to_string());
        }
        if self.ping_interval.is_zero() {
            return Err("Ping interval must be greater than zero".to_string());
        }
        if self.join_timeout.is_zero() {
            return Err("Join timeout must be greater than zero".to_string());
        }
        if self.connect_timeout.is_zero() {
            return Err("Connect timeout must be greater than zero".to_string());
        }
        if self.recv_timeout.is_some_and(|t| t.is_zero()) {
            return Err("Receive timeout must be greater than zero".to_string());
        }
        if self.send_timeout.is_some_and(|t| t.is_zero()) {
            return Err("Send timeout must be greater than zero".to_string());
        }
        if self.retry.max_consecutive_failures == Some(0) {
            return Err("Retry limit must allow at least one attempt".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
