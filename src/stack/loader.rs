//! Stack container and directory loader.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StackError;

use super::frame::{Frame, PixelKind};

/// File extensions recognised as stack slices (case-insensitive).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff"];

/// Check whether a path has one of the [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

// =============================================================================
// ImageStack
// =============================================================================

/// Ordered, uniform-shape sequence of frames indexed by z-position.
#[derive(Debug, Clone)]
pub struct ImageStack {
    frames: Vec<Frame>,
    width: u32,
    height: u32,
    kind: PixelKind,
    sources: Vec<PathBuf>,
}

impl ImageStack {
    /// Build a stack from frames that must all share width, height and kind.
    ///
    /// # Errors
    ///
    /// - [`StackError::EmptyStack`] if `frames` is empty
    /// - [`StackError::ShapeMismatch`] naming the first frame that differs from frame 0
    pub fn new(frames: Vec<Frame>) -> Result<Self, StackError> {
        let first = frames
            .first()
            .ok_or_else(|| StackError::EmptyStack("in-memory stack".to_string()))?;
        let (width, height) = first.dimensions();
        let kind = first.kind();

        for (index, frame) in frames.iter().enumerate().skip(1) {
            if frame.dimensions() != (width, height) || frame.kind() != kind {
                return Err(StackError::ShapeMismatch {
                    index,
                    expected: first.describe(),
                    actual: frame.describe(),
                });
            }
        }

        Ok(Self {
            frames,
            width,
            height,
            kind,
            sources: Vec::new(),
        })
    }

    /// Attach the file each frame was read from, in z order.
    pub fn with_sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.sources = sources;
        self
    }

    /// Number of slices.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at z-index `z`.
    pub fn get(&self, z: usize) -> Option<&Frame> {
        self.frames.get(z)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// `(width, height)` shared by every frame.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn kind(&self) -> PixelKind {
        self.kind
    }

    /// Source file paths, empty for in-memory stacks.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Source file of slice `z`, if known.
    pub fn source(&self, z: usize) -> Option<&Path> {
        self.sources.get(z).map(PathBuf::as_path)
    }
}

// =============================================================================
// Loader
// =============================================================================

/// Load every supported image in `dir` as one stack, in filename order.
///
/// Subdirectories and unsupported files are ignored.
pub fn load_stack(dir: &Path) -> Result<ImageStack, StackError> {
    let io_error = |e: std::io::Error| StackError::Io {
        path: dir.to_path_buf(),
        message: e.to_string(),
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && is_supported_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(StackError::EmptyStack(dir.display().to_string()));
    }

    let mut frames = Vec::with_capacity(paths.len());
    for path in &paths {
        let image = image::open(path).map_err(|e| StackError::Decode {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let frame = Frame::from_dynamic(image);
        debug!(path = %path.display(), shape = %frame.describe(), "loaded slice");
        frames.push(frame);
    }

    let stack = ImageStack::new(frames)?.with_sources(paths);
    let (width, height) = stack.dimensions();
    info!(
        "Loaded {} slice(s) of {}x{} {} from {}",
        stack.len(),
        width,
        height,
        stack.kind(),
        dir.display()
    );

    Ok(stack)
}

// =============================================================================
// Tests
// =============================================================================
