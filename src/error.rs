use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building frames and stacks from pixel data
#[derive(Debug, Clone, Error)]
pub enum StackError {
    /// Input array is neither 2-D (grayscale) nor 3-D (RGB)
    #[error("Invalid dimensionality: expected 2 (H×W) or 3 (H×W×3) axes, got {ndim}")]
    InvalidDimensionality { ndim: usize },

    /// 3-D input whose last axis is not 3 channels
    #[error("Unsupported channel count: expected 3, got {channels}")]
    UnsupportedChannels { channels: usize },

    /// Buffer length disagrees with the declared shape
    #[error("Data length mismatch: shape {shape:?} needs {expected} values, got {actual}")]
    DataLength {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    /// Declared shape does not fit the pixel buffer types
    #[error("Shape {shape:?} is too large for an 8-bit frame")]
    ShapeTooLarge { shape: Vec<usize> },

    /// Frame does not match the shape of the rest of the stack
    #[error("Frame {index} has shape {actual}, stack shape is {expected}")]
    ShapeMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    /// No frames were found
    #[error("Empty stack: no images found in {0}")]
    EmptyStack(String),

    /// Image could not be decoded
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Filesystem error while listing or reading the stack
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },
}

/// Errors in window parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// Step between slices must be at least 1
    #[error("Window step must be at least 1")]
    ZeroStep,

    /// Centre advance must be at least 1
    #[error("Window group size must be at least 1")]
    ZeroGroupSize,

    /// Window extent does not fit in a `usize`
    #[error("Window span {span} with step {step} is too large")]
    Overflow { span: usize, step: usize },
}

/// Errors that can occur while tiling or encoding tiles
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Tile counts must be at least 1 on each axis
    #[error("Tile count must be at least 1 on each axis, got {n_tiles_x}x{n_tiles_y}")]
    ZeroTileCount { n_tiles_x: u32, n_tiles_y: u32 },

    /// Input pixels were rejected before tiling
    #[error("Stack error: {0}")]
    Stack(#[from] StackError),

    /// JPEG encoding failed
    #[error("Failed to encode tile: {message}")]
    EncodeError { message: String },
}

/// Errors while persisting output items
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    /// Filesystem error while writing an output file
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Encoding error
    #[error("Tile error: {0}")]
    Tile(#[from] TileError),
}

/// Errors reported by a subject catalog backend
///
/// A subject set name that is already taken is not an error; see
/// [`crate::catalog::CreateOutcome::AlreadyExists`].
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// Transport failure talking to a remote catalog
    #[error("HTTP error: {0}")]
    Http(String),

    /// Remote catalog rejected the request
    #[error("Catalog API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Local filesystem error
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Response body could not be interpreted
    #[error("Invalid catalog response: {0}")]
    InvalidResponse(String),

    /// Handle does not refer to a subject set known to this catalog
    #[error("Unknown subject set: {0}")]
    UnknownSubjectSet(String),
}

/// Errors while planning or running an upload
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// Catalog failure other than a name collision
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Filesystem error while scanning the export tree
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => CatalogError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => CatalogError::Http(err.to_string()),
        }
    }
}
