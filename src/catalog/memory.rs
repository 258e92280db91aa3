//! In-memory catalog.
//!
//! Holds subject sets and subjects in process memory. Used for dry runs
//! and as a test double for the upload pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::CatalogError;

use super::{Catalog, CreateOutcome, SubjectId, SubjectMetadata, SubjectSetHandle};

/// A subject recorded by [`InMemoryCatalog`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSubject {
    pub id: SubjectId,
    pub subject_set: String,
    pub files: Vec<PathBuf>,
    pub metadata: SubjectMetadata,
}

/// Catalog backed by in-process maps.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    /// Subject sets keyed by name
    sets: RwLock<BTreeMap<String, SubjectSetHandle>>,

    /// Subjects in creation order
    subjects: RwLock<Vec<StoredSubject>>,

    next_id: AtomicU64,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register subject set names, e.g. to simulate an earlier upload.
    pub fn with_existing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next_id = 0u64;
        let sets = names
            .into_iter()
            .map(|name| {
                next_id += 1;
                let name = name.into();
                let handle = SubjectSetHandle::new(next_id.to_string(), name.clone());
                (name, handle)
            })
            .collect();

        Self {
            sets: RwLock::new(sets),
            subjects: RwLock::default(),
            next_id: AtomicU64::new(next_id),
        }
    }

    fn allocate_id(&self) -> String {
        (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    /// Names of all subject sets, sorted.
    pub async fn subject_set_names(&self) -> Vec<String> {
        self.sets.read().await.keys().cloned().collect()
    }

    /// Subjects linked to the named set, in creation order.
    pub async fn subjects_in(&self, name: &str) -> Vec<StoredSubject> {
        self.subjects
            .read()
            .await
            .iter()
            .filter(|s| s.subject_set == name)
            .cloned()
            .collect()
    }

    /// Total number of subjects.
    pub async fn subject_count(&self) -> usize {
        self.subjects.read().await.len()
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn create_subject_set(&self, name: &str) -> Result<CreateOutcome, CatalogError> {
        let mut sets = self.sets.write().await;
        if sets.contains_key(name) {
            return Ok(CreateOutcome::AlreadyExists);
        }

        let handle = SubjectSetHandle::new(self.allocate_id(), name);
        sets.insert(name.to_string(), handle.clone());
        debug!(name, id = %handle.id, "created in-memory subject set");
        Ok(CreateOutcome::Created(handle))
    }

    async fn attach_images(
        &self,
        set: &SubjectSetHandle,
        files: &[PathBuf],
        metadata: &SubjectMetadata,
    ) -> Result<SubjectId, CatalogError> {
        if !self.sets.read().await.contains_key(&set.name) {
            return Err(CatalogError::UnknownSubjectSet(set.name.clone()));
        }

        let id = SubjectId(self.allocate_id());
        self.subjects.write().await.push(StoredSubject {
            id: id.clone(),
            subject_set: set.name.clone(),
            files: files.to_vec(),
            metadata: metadata.clone(),
        });
        Ok(id)
    }
}
