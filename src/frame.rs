//! Frame encoding seam.
//!
//! The transport treats payloads as opaque bytes. This module pairs a control
//! gain with an RGB image and turns it into one payload through a
//! [`FrameEncoder`].
//!
//! # Wire Layout of [`RawFrameEncoder`]
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | gain, `i32` big-endian |
//! | 4 | 4 | height, `u32` big-endian |
//! | 8 | 4 | width, `u32` big-endian |
//! | 12 | h×w×3 | RGB pixels, row-major |

// ============================================================================
// Imports
// ============================================================================

use image::{Rgb, RgbImage};
use tokio_tungstenite::tungstenite::Bytes;

// ============================================================================
// Constants
// ============================================================================

/// Size of the [`RawFrameEncoder`] header in bytes.
pub const RAW_HEADER_LEN: usize = 12;

// ============================================================================
// Frame
// ============================================================================

/// One image plus the control gain that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Controller gain carried alongside the image.
    pub gain: i32,
    /// Height × width × 3 pixels.
    pub image: RgbImage,
}

impl Frame {
    /// Creates a frame.
    #[inline]
    #[must_use]
    pub fn new(gain: i32, image: RgbImage) -> Self {
        Self { gain, image }
    }

    /// Creates a frame filled with a single color.
    #[must_use]
    pub fn solid(gain: i32, width: u32, height: u32, color: [u8; 3]) -> Self {
        Self::new(gain, RgbImage::from_pixel(width, height, Rgb(color)))
    }

    /// Image width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

// ============================================================================
// FrameEncoder
// ============================================================================

/// Produces one self-contained payload per frame.
pub trait FrameEncoder: Send + Sync {
    /// Encodes `frame` into the bytes sent as one WebSocket message.
    fn encode(&self, frame: &Frame) -> Bytes;
}

impl<F> FrameEncoder for F
where
    F: Fn(&Frame) -> Bytes + Send + Sync,
{
    fn encode(&self, frame: &Frame) -> Bytes {
        self(frame)
    }
}

/// Header plus raw RGB pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFrameEncoder;

impl FrameEncoder for RawFrameEncoder {
    fn encode(&self, frame: &Frame) -> Bytes {
        let pixels = frame.image.as_raw();
        let mut out = Vec::with_capacity(RAW_HEADER_LEN + pixels.len());

        out.extend_from_slice(&frame.gain.to_be_bytes());
        out.extend_from_slice(&frame.height().to_be_bytes());
        out.extend_from_slice(&frame.width().to_be_bytes());
        out.extend_from_slice(pixels);

        Bytes::from(out)
    }
}

// ============================================================================
// Tests
// ============================================================================
