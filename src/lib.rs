//! Wall frame transmitter - latest-wins frame streaming over WebSocket.
//!
//! This library pushes the most recently produced frame to a remote display
//! endpoint and keeps the connection alive across network failures without
//! ever blocking the producer.
//!
//! # Architecture
//!
//! The transmitter follows a producer/worker model:
//!
//! - **Producer (caller)**: calls [`Transmitter::publish`] at any rate
//! - **Worker (tokio task)**: connects, drains the slot, sends, reconnects
//!
//! Key design principles:
//!
//! - One pending frame at most: a new publish replaces the unsent one
//! - One live session at a time, retried forever with fixed backoffs
//! - Optional greeting read and per-frame acknowledgment, independently
//! - Cooperative stop with a bounded join
//!
//! # Quick Start
//!
//! ```no_run
//! use wall_frame_transmitter::{Frame, Result, Transmitter};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut transmitter = Transmitter::builder()
//!         .destination("ws://127.0.0.1:8765/frames")
//!         .handshake(true)
//!         .ack_wait(true)
//!         .build()?;
//!
//!     transmitter.start()?;
//!     transmitter.send_frame(&Frame::solid(30, 64, 32, [255, 0, 0]));
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!     transmitter.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`transmitter`] | Facade, builder and options |
//! | [`transport`] | Slot, session, supervisor, backoff |
//! | [`frame`] | Frame type and encoder seam |
//! | [`error`] | Error types and [`Result`] alias |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
pub mod error;

/// Frame type and encoders.
pub mod frame;

/// Producer-facing facade.
///
/// Use [`Transmitter::builder()`] to create a configured transmitter.
pub mod transmitter;

/// WebSocket transport and connection supervision.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Frame types
pub use frame::{Frame, FrameEncoder, RawFrameEncoder};

// Transmitter types
pub use transmitter::{FramePublisher, Transmitter, TransmitterBuilder, TransmitterOptions};

// Transport types
pub use transport::{
    BackoffPolicy, FrameSlot, RetryPolicy, RttEstimate, SessionState, StatsSnapshot,
};
