//! JPEG tile encoder.
//!
//! Tiles and subject slices are handed to annotators as JPEG. This module
//! encodes [`Frame`]s at a configurable quality.
//!
//! # Design Decisions
//!
//! - **Channel layout preserved**: grayscale frames are written as 8-bit
//!   grayscale JPEG, RGB frames as 8-bit RGB. No conversion between the two.
//!
//! - **No resizing**: frames are encoded at their native size.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;

use crate::error::TileError;
use crate::stack::Frame;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// JPEG Encoder
// =============================================================================

/// JPEG encoder for frames.
///
/// # Example
///
/// ```
/// use image::GrayImage;
/// use subject_stacker::stack::Frame;
/// use subject_stacker::tile::JpegTileEncoder;
///
/// let encoder = JpegTileEncoder::new();
/// let frame = Frame::Gray(GrayImage::new(16, 16));
///
/// let jpeg = encoder.encode(&frame, 85).unwrap();
/// assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JpegTileEncoder {}

impl JpegTileEncoder {
    /// Create a new JPEG tile encoder.
    pub fn new() -> Self {
        Self {}
    }

    /// Encode a frame at the specified quality.
    ///
    /// Quality is clamped to 1-100.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::EncodeError`] if the frame has zero area or the
    /// encoder fails.
    pub fn encode(&self, frame: &Frame, quality: u8) -> Result<Bytes, TileError> {
        let quality = clamp_quality(quality);

        if frame.width() == 0 || frame.height() == 0 {
            return Err(TileError::EncodeError {
                message: format!("cannot encode empty {} frame", frame.describe()),
            });
        }

        let mut output = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut output, quality);
        let result = match frame {
            Frame::Gray(img) => img.write_with_encoder(encoder),
            Frame::Rgb(img) => img.write_with_encoder(encoder),
        };

        result.map_err(|e| TileError::EncodeError {
            message: e.to_string(),
        })?;

        Ok(Bytes::from(output))
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
