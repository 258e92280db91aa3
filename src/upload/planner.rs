//! Export tree scanning.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::SubjectMetadata;
use crate::error::UploadError;
use crate::tile::TILES_DIR_PREFIX;
use crate::window::SubjectSetName;

/// One subject's worth of files destined for a subject set.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadBatch {
    pub subject_set: SubjectSetName,

    /// Files in lexical order
    pub files: Vec<PathBuf>,

    pub metadata: SubjectMetadata,

    /// 1-based index of this batch within its set
    pub part: usize,

    /// Number of batches the set was split into
    pub parts: usize,
}

/// Plans uploads from an export tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadPlanner {
    /// Maximum files per batch; 0 means one batch per set
    batch_size: usize,
}

impl UploadPlanner {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Scan `root` and return batches grouped by subject set.
    ///
    /// Each immediate sub-directory holding at least one JPEG becomes a
    /// subject set named after the directory. A `Tiles_*` grid directory
    /// inside a set becomes its own set, `{set}_{grid}`, carrying the parent's
    /// window fields plus `#tiles`. Sets and files are visited in lexical
    /// order; no other nested directories are descended into.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if a directory cannot be listed or a file
    /// cannot be hashed.
    pub fn plan(&self, root: &Path) -> Result<Vec<UploadBatch>, UploadError> {
        let mut batches = Vec::new();

        for set_dir in sorted_entries(root)?.into_iter().filter(|p| p.is_dir()) {
            let Some(name) = dir_name(&set_dir) else {
                continue;
            };
            let subject_set = SubjectSetName::from_raw(name);
            let entries = sorted_entries(&set_dir)?;

            let files = jpeg_files(&entries);
            if files.is_empty() {
                debug!(dir = %set_dir.display(), "no images, skipping directory");
            } else {
                let metadata = SubjectMetadata::for_subject_set(&subject_set);
                batches.extend(self.split(&subject_set, &metadata, files)?);
            }

            for grid_dir in entries.iter().filter(|p| p.is_dir()) {
                let Some(grid) = dir_name(grid_dir).filter(|g| g.starts_with(TILES_DIR_PREFIX))
                else {
                    continue;
                };
                let files = jpeg_files(&sorted_entries(grid_dir)?);
                if files.is_empty() {
                    continue;
                }

                let tile_set = SubjectSetName::from_raw(format!("{}_{}", name, grid));
                let mut metadata = SubjectMetadata::for_subject_set(&subject_set);
                metadata
                    .insert_hidden("subject_set", tile_set.as_str())
                    .insert_hidden("tiles", grid);
                batches.extend(self.split(&tile_set, &metadata, files)?);
            }
        }

        info!(
            root = %root.display(),
            batches = batches.len(),
            "planned upload"
        );
        Ok(batches)
    }

    fn split(
        &self,
        subject_set: &SubjectSetName,
        base: &SubjectMetadata,
        files: Vec<PathBuf>,
    ) -> Result<Vec<UploadBatch>, UploadError> {
        let chunk = if self.batch_size == 0 {
            files.len()
        } else {
            self.batch_size
        };
        let parts = files.len().div_ceil(chunk);

        files
            .chunks(chunk)
            .enumerate()
            .map(|(i, chunk)| {
                let mut metadata = base
                    .clone()
                    .with_file_digests(chunk)
                    .map_err(|e| UploadError::Io {
                        path: chunk.first().cloned().unwrap_or_default(),
                        message: e.to_string(),
                    })?;
                metadata
                    .insert_hidden("part", i + 1)
                    .insert_hidden("parts", parts);

                Ok(UploadBatch {
                    subject_set: subject_set.clone(),
                    files: chunk.to_vec(),
                    metadata,
                    part: i + 1,
                    parts,
                })
            })
            .collect()
    }
}

fn dir_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn jpeg_files(entries: &[PathBuf]) -> Vec<PathBuf> {
    entries
        .iter()
        .filter(|p| p.is_file() && is_jpeg(p))
        .cloned()
        .collect()
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, UploadError> {
    let io_error = |e: std::io::Error| UploadError::Io {
        path: dir.to_path_buf(),
        message: e.to_string(),
    };

    let mut paths = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    paths.sort();
    Ok(paths)
}
