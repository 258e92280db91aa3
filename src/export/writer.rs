//! JPEG writer for output items.

use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ExportError;
use crate::tile::{clamp_quality, JpegTileEncoder, DEFAULT_JPEG_QUALITY};

use super::items::OutputItem;

/// Totals for one [`OutputWriter::write_all`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Files written
    pub files: usize,

    /// Encoded bytes written
    pub bytes: u64,
}

impl AddAssign for ExportSummary {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.bytes += other.bytes;
    }
}

/// Persists [`OutputItem`]s as JPEG files below a root directory.
///
/// Parent directories are created as needed; existing files are overwritten.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
    quality: u8,
    encoder: JpegTileEncoder,
}

impl OutputWriter {
    /// Create a writer rooted at `root`, encoding at `quality` (clamped to 1-100).
    pub fn new(root: impl Into<PathBuf>, quality: u8) -> Self {
        Self {
            root: root.into(),
            quality: clamp_quality(quality),
            encoder: JpegTileEncoder::new(),
        }
    }

    /// Create a writer using [`DEFAULT_JPEG_QUALITY`].
    pub fn with_default_quality(root: impl Into<PathBuf>) -> Self {
        Self::new(root, DEFAULT_JPEG_QUALITY)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode and write one item, returning the absolute path and byte count.
    pub fn write(&self, item: &OutputItem<'_>) -> Result<(PathBuf, u64), ExportError> {
        let path = self.root.join(&item.relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ExportError::Io {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let data = self.encoder.encode(&item.frame, self.quality)?;
        std::fs::write(&path, &data).map_err(|e| ExportError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), bytes = data.len(), "wrote output item");
        Ok((path, data.len() as u64))
    }

    /// Write every item, stopping at the first failure.
    pub fn write_all<'a, I>(&self, items: I) -> Result<ExportSummary, ExportError>
    where
        I: IntoIterator<Item = OutputItem<'a>>,
    {
        let mut summary = ExportSummary::default();
        for item in items {
            let (_, bytes) = self.write(&item)?;
            summary.files += 1;
            summary.bytes += bytes;
        }

        info!(
            "Wrote {} file(s), {} bytes under {}",
            summary.files,
            summary.bytes,
            self.root.display()
        );
        Ok(summary)
    }
}
