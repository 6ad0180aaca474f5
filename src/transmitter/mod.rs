//! Transmitter facade module.
//!
//! This module provides the producer-facing entry point.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Transmitter`] | Start/stop/publish surface |
//! | [`TransmitterBuilder`] | Fluent configuration builder |
//! | [`TransmitterOptions`] | Session and supervision options |
//! | [`FramePublisher`] | Cloneable producer handle |
//!
//! # Example
//!
//! ```no_run
//! use wall_frame_transmitter::{Result, Transmitter};
//!
//! # async fn example() -> Result<()> {
//! let mut transmitter = Transmitter::builder()
//!     .destination("ws://127.0.0.1:8765/frames")
//!     .ack_wait(true)
//!     .build()?;
//!
//! transmitter.start()?;
//! transmitter.publish(vec![0x01, 0x02, 0x03]);
//! transmitter.stop().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for transmitter configuration.
pub mod builder;

/// Core transmitter implementation.
pub mod core;

/// Session and supervision options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::TransmitterBuilder;
pub use self::core::{FramePublisher, Transmitter};
pub use options::TransmitterOptions;
