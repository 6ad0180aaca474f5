//! WebSocket transport layer.
//!
//! This module moves the latest frame from the producer to the remote display
//! and keeps the connection alive across failures.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                 ┌──────────────────────────┐            ┌──────────┐
//! │  Producer        │  publish(bytes) │  ConnectionSupervisor    │  WebSocket │  Display │
//! │  (any context)   │────► FrameSlot ◄┤  (one tokio task)        │◄──────────►│  server  │
//! │                  │   latest wins   │   └─► Session (one live) │            │          │
//! └──────────────────┘                 └──────────────────────────┘            └──────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `slot` | Single-slot latest-wins handoff |
//! | `backoff` | Fixed reconnect/error delays and retry limits |
//! | `rtt` | EWMA round-trip estimate |
//! | `session` | One connection: handshake, send/ack loop |
//! | `supervisor` | Background task running sessions back to back |
//! | `stats` | Diagnostic counters |

// ============================================================================
// Submodules
// ============================================================================

/// Fixed-delay retry timing.
pub mod backoff;

/// Round-trip latency estimate.
pub mod rtt;

/// One WebSocket session.
pub mod session;

/// Single-slot latest-wins frame handoff.
pub mod slot;

/// Diagnostic counters.
pub mod stats;

/// Background connection supervision.
pub mod supervisor;

// ============================================================================
// Re-exports
// ============================================================================

pub use backoff::{BackoffPolicy, FailureHandler, RetryPolicy};
pub use rtt::RttEstimate;
pub use session::{SessionEnd, SessionState};
pub use slot::FrameSlot;
pub use stats::{StatsSnapshot, TransmitterStats};
pub use supervisor::{ConnectionSupervisor, StopSignal};
