//! Error types for the frame transmitter.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! Construction and lifecycle operations return [`Result<T>`] which uses [`Error`].
//! Publishing a frame never fails; delivery is best-effort.
//!
//! ```ignore
//! use wall_frame_transmitter::{Result, Transmitter};
//!
//! async fn example() -> Result<()> {
//!     let mut transmitter = Transmitter::builder()
//!         .destination("ws://127.0.0.1:9000/wall")
//!         .build()?;
//!     transmitter.start()?;
//!     transmitter.publish(vec![1, 2, 3]);
//!     transmitter.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::Url`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Session | [`Error::Timeout`], [`Error::Protocol`] |
//! | Lifecycle | [`Error::ShutdownTimeout`], [`Error::RetriesExhausted`] |
//! | External | [`Error::Io`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when transmitter options or the destination are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Destination URL could not be parsed.
    #[error("Invalid destination URL: {0}")]
    Url(#[from] url::ParseError),

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection could not be established.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection attempt did not complete in time.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// WebSocket connection closed by the remote end.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// Inbound message (handshake or acknowledgment) did not arrive in time.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Unexpected inbound traffic.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// Background task did not finish within the join timeout.
    #[error("Background task did not stop within {timeout_ms}ms")]
    ShutdownTimeout {
        /// Milliseconds waited for the task.
        timeout_ms: u64,
    },

    /// Retry policy gave up after too many consecutive failed sessions.
    #[error("Giving up after {attempts} consecutive failed sessions")]
    RetriesExhausted {
        /// Number of consecutive failures observed.
        attempts: u32,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a shutdown timeout error.
    #[inline]
    pub fn shutdown_timeout(timeout_ms: u64) -> Self {
        Self::ShutdownTimeout { timeout_ms }
    }

    /// Creates a retries exhausted error.
    #[inline]
    pub fn retries_exhausted(attempts: u32) -> Self {
        Self::RetriesExhausted { attempts }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::Timeout { .. } | Self::ShutdownTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
                | Self::Io(_)
        )
    }

    /// Returns `true` if a new session may succeed where this one failed.
    ///
    /// Configuration problems and terminal lifecycle errors are not recoverable.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Config { .. }
                | Self::Url(_)
                | Self::ShutdownTimeout { .. }
                | Self::RetriesExhausted { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
