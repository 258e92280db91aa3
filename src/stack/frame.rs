//! Single-slice pixel buffers.
//!
//! Frames wrap the `image` crate's 8-bit buffers so the tiling code can be
//! written once, generic over [`image::Pixel`], and dispatched on the
//! [`Frame`] variant.

use std::fmt;

use image::{DynamicImage, GrayImage, RgbImage};

use crate::error::StackError;

// =============================================================================
// Pixel Kind
// =============================================================================

/// Channel layout of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelKind {
    /// Single 8-bit channel
    Gray,

    /// Three interleaved 8-bit channels in R, G, B order
    Rgb,
}

impl PixelKind {
    /// Number of channels per pixel.
    pub const fn channels(&self) -> usize {
        match self {
            PixelKind::Gray => 1,
            PixelKind::Rgb => 3,
        }
    }
}

impl fmt::Display for PixelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelKind::Gray => write!(f, "gray"),
            PixelKind::Rgb => write!(f, "rgb"),
        }
    }
}

// =============================================================================
// Raw Frame
// =============================================================================

/// Row-major `u8` buffer tagged with an array shape.
///
/// This is the form pixel data takes when it arrives from an external array
/// source. Only `[height, width]` and `[height, width, 3]` shapes can become a
/// [`Frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub shape: Vec<usize>,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<u8>) -> Self {
        Self {
            shape: shape.into(),
            data,
        }
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
}

// =============================================================================
// Frame
// =============================================================================

/// One slice of a stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl Frame {
    /// Validate a raw array and convert it into a frame.
    ///
    /// # Errors
    ///
    /// - [`StackError::InvalidDimensionality`] unless the shape has 2 or 3 axes
    /// - [`StackError::UnsupportedChannels`] for 3-D input whose last axis isn't 3
    /// - [`StackError::ShapeTooLarge`] if the element count overflows or a side
    ///   exceeds `u32::MAX`
    /// - [`StackError::DataLength`] if the buffer doesn't match the shape
    pub fn from_raw(raw: RawFrame) -> Result<Self, StackError> {
        let kind = match raw.shape.as_slice() {
            [_, _] => PixelKind::Gray,
            [_, _, 3] => PixelKind::Rgb,
            [_, _, channels] => {
                return Err(StackError::UnsupportedChannels {
                    channels: *channels,
                })
            }
            _ => return Err(StackError::InvalidDimensionality { ndim: raw.ndim() }),
        };

        let Some(expected) = raw
            .shape
            .iter()
            .try_fold(1usize, |acc, &axis| acc.checked_mul(axis))
        else {
            return Err(StackError::ShapeTooLarge { shape: raw.shape });
        };
        let (Ok(height), Ok(width)) = (u32::try_from(raw.shape[0]), u32::try_from(raw.shape[1]))
        else {
            return Err(StackError::ShapeTooLarge { shape: raw.shape });
        };

        if raw.data.len() != expected {
            return Err(StackError::DataLength {
                shape: raw.shape,
                expected,
                actual: raw.data.len(),
            });
        }

        let actual = raw.data.len();
        let shape = raw.shape;

        let frame = match kind {
            PixelKind::Gray => GrayImage::from_raw(width, height, raw.data).map(Frame::Gray),
            PixelKind::Rgb => RgbImage::from_raw(width, height, raw.data).map(Frame::Rgb),
        };

        frame.ok_or(StackError::DataLength {
            shape,
            expected,
            actual,
        })
    }

    /// Convert a decoded image, keeping grayscale sources single-channel.
    ///
    /// Alpha is dropped and deeper bit depths are reduced to 8 bits.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        if image.color().has_color() {
            Frame::Rgb(image.to_rgb8())
        } else {
            Frame::Gray(image.to_luma8())
        }
    }

    /// An all-`fill` frame of the given size and kind.
    pub fn filled(kind: PixelKind, width: u32, height: u32, fill: u8) -> Self {
        match kind {
            PixelKind::Gray => {
                Frame::Gray(GrayImage::from_pixel(width, height, image::Luma([fill])))
            }
            PixelKind::Rgb => Frame::Rgb(RgbImage::from_pixel(
                width,
                height,
                image::Rgb([fill, fill, fill]),
            )),
        }
    }

    pub fn kind(&self) -> PixelKind {
        match self {
            Frame::Gray(_) => PixelKind::Gray,
            Frame::Rgb(_) => PixelKind::Rgb,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Frame::Gray(img) => img.width(),
            Frame::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Frame::Gray(img) => img.height(),
            Frame::Rgb(img) => img.height(),
        }
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Array shape, `[height, width]` or `[height, width, 3]`.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = vec![self.height() as usize, self.width() as usize];
        if self.kind() == PixelKind::Rgb {
            shape.push(3);
        }
        shape
    }

    /// Interleaved sample bytes in row-major order.
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Frame::Gray(img) => img.as_raw(),
            Frame::Rgb(img) => img.as_raw(),
        }
    }

    /// Samples of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let channels = self.kind().channels();
        let start = (y as usize * self.width() as usize + x as usize) * channels;
        self.as_raw().get(start..start + channels)
    }

    /// Copy into a `DynamicImage` for encoding.
    pub fn to_dynamic(&self) -> DynamicImage {
        match self {
            Frame::Gray(img) => DynamicImage::ImageLuma8(img.clone()),
            Frame::Rgb(img) => DynamicImage::ImageRgb8(img.clone()),
        }
    }

    /// Human-readable shape, e.g. `512x480 rgb`.
    pub fn describe(&self) -> String {
        format!("{}x{} {}", self.width(), self.height(), self.kind())
    }
}

// =============================================================================
// Tests
// =============================================================================
