//! Image stack model.
//!
//! A z-stack is an ordered sequence of same-shaped 8-bit frames, either
//! grayscale (`H×W`) or RGB (`H×W×3`), indexed by z-position. The windowing
//! and tiling engines only ever read from it.
//!
//! - [`Frame`] - one slice, polymorphic over [`PixelKind`]
//! - [`RawFrame`] - shape-tagged pixel buffer, validated into a `Frame`
//! - [`ImageStack`] - uniform-shape frames plus optional source names
//! - [`load_stack`] - read a directory of PNG/JPEG/TIFF slices

mod frame;
mod loader;

pub use frame::{Frame, PixelKind, RawFrame};
pub use loader::{is_supported_image, load_stack, ImageStack, SUPPORTED_EXTENSIONS};
