//! Subject catalog abstraction.
//!
//! A catalog is the remote registry that volunteers classify from. Subjects
//! (groups of images plus metadata) live in named subject sets.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              BatchUploader              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             Catalog Trait               │
//! │  create_subject_set → Created | Exists  │
//! │  attach_images      → SubjectId         │
//! └────────────────────┬────────────────────┘
//!                      │
//!       ┌──────────────┼───────────────────┐
//!       ▼              ▼                   ▼
//! ┌───────────┐ ┌──────────────┐ ┌──────────────────┐
//! │ InMemory  │ │ LocalCatalog │ │ PanoptesCatalog  │
//! │ (dry run) │ │ (directory)  │ │ (REST API)       │
//! └───────────┘ └──────────────┘ └──────────────────┘
//! ```
//!
//! # Name collisions
//!
//! Creating a subject set whose name is taken is an expected, recoverable
//! signal and is reported as [`CreateOutcome::AlreadyExists`], never as an
//! `Err`. Callers skip that set and continue.

mod local;
mod memory;
mod metadata;
mod panoptes;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub use local::{LocalCatalog, ManifestEntry, MANIFEST_FILE};
pub use memory::{InMemoryCatalog, StoredSubject};
pub use metadata::{file_sha256, SubjectMetadata};
pub use panoptes::{PanoptesCatalog, DEFAULT_PANOPTES_URL};

// =============================================================================
// Handles and outcomes
// =============================================================================

/// Reference to a subject set held by a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectSetHandle {
    /// Catalog-assigned identifier
    pub id: String,

    /// Display name the set was created with
    pub name: String,
}

impl SubjectSetHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Identifier of a subject created by [`Catalog::attach_images`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of asking a catalog to create a subject set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The set was created
    Created(SubjectSetHandle),

    /// A set with this name already exists; nothing was created
    AlreadyExists,
}

impl CreateOutcome {
    pub fn handle(&self) -> Option<&SubjectSetHandle> {
        match self {
            CreateOutcome::Created(handle) => Some(handle),
            CreateOutcome::AlreadyExists => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

// =============================================================================
// Catalog Trait
// =============================================================================

/// Registry of subject sets and subjects.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Short backend label for logs.
    fn backend(&self) -> &str;

    /// Create a subject set named `name`.
    ///
    /// A taken name yields `Ok(CreateOutcome::AlreadyExists)`.
    async fn create_subject_set(&self, name: &str) -> Result<CreateOutcome, CatalogError>;

    /// Create one subject from `files` and link it to `set`.
    async fn attach_images(
        &self,
        set: &SubjectSetHandle,
        files: &[PathBuf],
        metadata: &SubjectMetadata,
    ) -> Result<SubjectId, CatalogError>;
}

#[async_trait]
impl<C: Catalog + ?Sized> Catalog for Arc<C> {
    fn backend(&self) -> &str {
        (**self).backend()
    }

    async fn create_subject_set(&self, name: &str) -> Result<CreateOutcome, CatalogError> {
        (**self).create_subject_set(name).await
    }

    async fn attach_images(
        &self,
        set: &SubjectSetHandle,
        files: &[PathBuf],
        metadata: &SubjectMetadata,
    ) -> Result<SubjectId, CatalogError> {
        (**self).attach_images(set, files, metadata).await
    }
}
