//! Background connection supervision.
//!
//! The supervisor owns one tokio task that runs sessions back to back until
//! it is told to stop:
//!
//! ```text
//! start() ──► [ Session ] ──fail──► error backoff ──┐
//!                  ▲                                 │
//!                  └──── reconnect backoff ◄─────────┘
//! stop()  ──► running = false ──► join (bounded)
//! ```
//!
//! At most one session exists at a time. Stop is cooperative: the flag is
//! polled once per session iteration and once per cycle, and every timed wait
//! wakes early when it flips.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::transmitter::TransmitterOptions;

use super::session::Session;
use super::slot::FrameSlot;
use super::stats::TransmitterStats;

// ============================================================================
// StopSignal
// ============================================================================

/// Monotonic running flag with wake-up for timed waits.
///
/// Starts running; [`stop`](Self::stop) flips it once and for all.
#[derive(Debug, Default)]
pub struct StopSignal {
    stopped: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    /// Creates a signal in the running state.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests stop and wakes every pending wait.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Returns `true` once stop has been requested.
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Resolves when stop is requested.
    pub async fn stopped(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent stop() is not missed.
        notified.as_mut().enable();

        if self.is_stopped() {
            return;
        }
        notified.await;
    }

    /// Sleeps for `duration` or until stop.
    ///
    /// Returns `true` if the full duration elapsed.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.is_stopped();
        }

        tokio::select! {
            () = sleep(duration) => true,
            () = self.stopped() => false,
        }
    }
}

// ============================================================================
// SupervisorContext
// ============================================================================

/// State the supervision task shares with each session it runs.
pub(crate) struct SupervisorContext {
    /// Remote endpoint.
    pub destination: Url,
    /// Session and timing configuration.
    pub options: Arc<TransmitterOptions>,
    /// Latest-wins handoff from the producer.
    pub slot: Arc<FrameSlot>,
    /// Running flag.
    pub signal: Arc<StopSignal>,
    /// Diagnostic counters.
    pub stats: Arc<TransmitterStats>,
}

// ============================================================================
// ConnectionSupervisor
// ============================================================================

/// Owns the background task that keeps a session alive.
///
/// Created by `Transmitter::start`, consumed by [`stop`](Self::stop).
/// Dropping a running supervisor requests stop without waiting.
pub struct ConnectionSupervisor {
    /// Running flag shared with the task.
    signal: Arc<StopSignal>,
    /// Background task.
    task: Option<JoinHandle<Result<()>>>,
    /// How long `stop` waits for the task.
    join_timeout: Duration,
}

impl fmt::Debug for ConnectionSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSupervisor")
            .field("running", &self.is_running())
            .field("join_timeout", &self.join_timeout)
            .finish_non_exhaustive()
    }
}

impl ConnectionSupervisor {
    /// Spawns the supervision task on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if called outside a tokio runtime.
    pub(crate) fn spawn(
        destination: Url,
        options: Arc<TransmitterOptions>,
        slot: Arc<FrameSlot>,
        stats: Arc<TransmitterStats>,
    ) -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|_| Error::config("Transmitter must be started inside a tokio runtime"))?;

        let signal = Arc::new(StopSignal::new());
        let join_timeout = options.join_timeout;

        info!(url = %destination, "Connection supervisor started");

        let context = SupervisorContext {
            destination,
            options,
            slot,
            signal: Arc::clone(&signal),
            stats,
        };
        let task = handle.spawn(supervise(context));

        Ok(Self {
            signal,
            task: Some(task),
            join_timeout,
        })
    }

    /// Returns `true` until stop is requested or the task gives up.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.signal.is_stopped()
    }

    /// Requests stop and waits up to the join timeout for the task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShutdownTimeout`] if the task is still running after
    /// the timeout. The task is detached and finishes on its own.
    pub async fn stop(mut self) -> Result<()> {
        self.signal.stop();

        let Some(task) = self.task.take() else {
            return Ok(());
        };

        match timeout(self.join_timeout, task).await {
            Ok(Ok(Ok(()))) => {
                info!("Connection supervisor stopped");
                Ok(())
            }
            Ok(Ok(Err(e))) => {
                info!(error = %e, "Connection supervisor stopped after giving up");
                Ok(())
            }
            Ok(Err(e)) => {
                error!(error = %e, "Connection supervisor task panicked");
                Ok(())
            }
            Err(_) => {
                let timeout_ms = u64::try_from(self.join_timeout.as_millis()).unwrap_or(u64::MAX);
                error!(
                    severity = "critical",
                    timeout_ms, "WebSocket task did not stop in time"
                );
                Err(Error::shutdown_timeout(timeout_ms))
            }
        }
    }
}

impl Drop for ConnectionSupervisor {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.signal.stop();
        }
    }
}

// ============================================================================
// Supervision Loop
// ============================================================================

/// Runs sessions until stopped or the retry policy gives up.
async fn supervise(context: SupervisorContext) -> Result<()> {
    let mut attempt: u64 = 0;
    let mut consecutive_failures: u32 = 0;

    while !context.signal.is_stopped() {
        attempt += 1;
        context.stats.session_started();
        debug!(attempt, "Starting WebSocket session");

        let mut session = Session::new(attempt, &context);
        let result = session.run().await;

        debug!(
            attempt,
            state = ?session.state(),
            rtt_ms = session.rtt().estimate_ms(),
            "WebSocket session ended"
        );

        if session.handshake_completed() {
            consecutive_failures = 0;
        }

        if let Err(e) = result {
            context.stats.session_failed();
            consecutive_failures = consecutive_failures.saturating_add(1);

            if context.options.retry.record_failure(&e, consecutive_failures) {
                error!(
                    attempts = consecutive_failures,
                    error = %e,
                    "Giving up on destination"
                );
                context.signal.stop();
                return Err(Error::retries_exhausted(consecutive_failures));
            }

            warn!(
                attempt,
                consecutive_failures,
                "Reconnecting after failed session"
            );
        }

        if context.signal.is_stopped() {
            break;
        }
        context.signal.sleep(context.options.backoff.reconnect).await;
    }

    debug!(attempts = attempt, "Supervision loop exited");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
