//! Fixed-delay retry timing.
//!
//! Two independent delays: one after a failed session (error backoff) and one
//! before every new connection attempt (reconnect backoff). No jitter, no
//! growth. By default the supervisor retries forever; [`RetryPolicy`] adds an
//! optional terminal escalation.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;

// ============================================================================
// Constants
// ============================================================================

/// Delay between the end of one session and the next connection attempt.
pub const DEFAULT_RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Pause after a mid-session transport failure.
pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(2);

// ============================================================================
// BackoffPolicy
// ============================================================================

/// Fixed reconnect and error delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Wait before starting a new session.
    pub reconnect: Duration,
    /// Wait after a session fails mid-stream.
    pub error: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl BackoffPolicy {
    /// Creates the default policy (1 s reconnect, 2 s error).
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reconnect: DEFAULT_RECONNECT_BACKOFF,
            error: DEFAULT_ERROR_BACKOFF,
        }
    }

    /// Worst-case gap between a transport failure and the next attempt.
    #[inline]
    #[must_use]
    pub fn failure_to_retry(&self) -> Duration {
        self.error + self.reconnect
    }
}

// ============================================================================
// RetryPolicy
// ============================================================================

/// Callback invoked with every failed session and the consecutive failure count.
pub type FailureHandler = Arc<dyn Fn(&Error, u32) + Send + Sync>;

/// Decides when the supervisor stops retrying.
#[derive(Clone, Default)]
pub struct RetryPolicy {
    /// Give up after this many consecutive failed sessions. `None` retries forever.
    pub max_consecutive_failures: Option<u32>,
    /// Optional observer for failed sessions.
    pub on_failure: Option<FailureHandler>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_consecutive_failures", &self.max_consecutive_failures)
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

impl RetryPolicy {
    /// Retries until explicitly stopped.
    #[inline]
    #[must_use]
    pub fn forever() -> Self {
        Self::default()
    }

    /// Gives up after `attempts` consecutive failed sessions.
    #[inline]
    #[must_use]
    pub fn limited(attempts: u32) -> Self {
        Self {
            max_consecutive_failures: Some(attempts),
            on_failure: None,
        }
    }

    /// Sets the failure observer.
    #[inline]
    #[must_use]
    pub fn with_failure_handler(
        mut self,
        handler: impl Fn(&Error, u32) + Send + Sync + 'static,
    ) -> Self {
        self.on_failure = Some(Arc::new(handler));
        self
    }

    /// Records a failed session and returns `true` if retrying should stop.
    pub(crate) fn record_failure(&self, error: &Error, consecutive: u32) -> bool {
        if let Some(handler) = &self.on_failure {
            handler(error, consecutive);
        }

        if !error.is_recoverable() {
            return true;
        }

        self.max_consecutive_failures
            .is_some_and(|max| consecutive >= max)
    }
}

// ============================================================================
// Tests
// ============================================================================
