//! Directory-backed catalog.
//!
//! Mirrors a catalog on the local filesystem, one directory per subject set:
//!
//! ```text
//! <root>/
//!   <subject set name>/
//!     manifest.json          [ManifestEntry, ...]
//!     subject_0001/<files>
//!     subject_0002/<files>
//! ```
//!
//! Useful for staging an upload for review, or for labs that host their own
//! annotation front-end. An existing set directory means the name is taken.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CatalogError;

use super::{Catalog, CreateOutcome, SubjectId, SubjectMetadata, SubjectSetHandle};

/// Manifest file name inside each subject set directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One subject as recorded in a set's manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub subject_id: SubjectId,

    /// File names relative to the subject directory
    pub files: Vec<String>,

    pub metadata: SubjectMetadata,
}

/// Catalog that stores subject sets as directories under a root.
#[derive(Debug)]
pub struct LocalCatalog {
    root: PathBuf,

    /// Serializes manifest read-modify-write cycles
    manifest_lock: Mutex<()>,
}

impl LocalCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn set_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Read a set's manifest; a missing manifest is an empty one.
    pub async fn read_manifest(&self, name: &str) -> Result<Vec<ManifestEntry>, CatalogError> {
        let path = self.set_dir(name).join(MANIFEST_FILE);
        match tokio::fs::read(&path).await {
            Ok(data) => serde_json::from_slice(&data)
                .map_err(|e| CatalogError::InvalidResponse(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn write_manifest(
        &self,
        name: &str,
        entries: &[ManifestEntry],
    ) -> Result<(), CatalogError> {
        let path = self.set_dir(name).join(MANIFEST_FILE);
        let data = serde_json::to_vec_pretty(entries)
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| io_error(&path, e))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> CatalogError {
    CatalogError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[async_trait]
impl Catalog for LocalCatalog {
    fn backend(&self) -> &str {
        "local"
    }

    async fn create_subject_set(&self, name: &str) -> Result<CreateOutcome, CatalogError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;

        let dir = self.set_dir(name);
        match tokio::fs::create_dir(&dir).await {
            Ok(()) => {
                debug!(dir = %dir.display(), "created local subject set");
                Ok(CreateOutcome::Created(SubjectSetHandle::new(name, name)))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(CreateOutcome::AlreadyExists),
            Err(e) => Err(io_error(&dir, e)),
        }
    }

    async fn attach_images(
        &self,
        set: &SubjectSetHandle,
        files: &[PathBuf],
        metadata: &SubjectMetadata,
    ) -> Result<SubjectId, CatalogError> {
        let set_dir = self.set_dir(&set.id);
        if !tokio::fs::try_exists(&set_dir).await.unwrap_or(false) {
            return Err(CatalogError::UnknownSubjectSet(set.name.clone()));
        }

        let _guard = self.manifest_lock.lock().await;
        let mut entries = self.read_manifest(&set.id).await?;
        let id = SubjectId(format!("{:04}", entries.len() + 1));

        let subject_dir = set_dir.join(format!("subject_{}", id));
        tokio::fs::create_dir_all(&subject_dir)
            .await
            .map_err(|e| io_error(&subject_dir, e))?;

        let mut names = Vec::with_capacity(files.len());
        for file in files {
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| CatalogError::Io {
                    path: file.clone(),
                    message: "path has no file name".to_string(),
                })?
                .to_string();
            let target = subject_dir.join(&name);
            tokio::fs::copy(file, &target)
                .await
                .map_err(|e| io_error(file, e))?;
            names.push(name);
        }

        entries.push(ManifestEntry {
            subject_id: id.clone(),
            files: names,
            metadata: metadata.clone(),
        });
        self.write_manifest(&set.id, &entries).await?;

        debug!(set = %set.name, subject = %id, files = files.len(), "attached images");
        Ok(id)
    }
}
