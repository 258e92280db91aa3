//! Batch upload driver.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CreateOutcome, SubjectSetHandle};
use crate::error::UploadError;

use super::UploadBatch;

/// Summary of an upload run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    /// Subject sets created by this run, in order
    pub created: Vec<String>,

    /// Subject sets skipped because the name was already taken
    pub skipped: Vec<String>,

    /// Subjects attached
    pub subjects: usize,

    /// Images attached across all subjects
    pub images: usize,
}

/// Pushes [`UploadBatch`]es into a catalog.
///
/// Batches are processed sequentially. Each subject set is created on first
/// sight; if the catalog reports the name as taken, every batch for that set
/// is skipped and the run continues. Any other catalog error aborts the run.
pub struct BatchUploader<C> {
    catalog: C,
}

impl<C: Catalog> BatchUploader<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Upload all batches.
    ///
    /// # Errors
    ///
    /// Returns the first catalog error other than a name collision.
    pub async fn upload(&self, batches: &[UploadBatch]) -> Result<UploadReport, UploadError> {
        let mut report = UploadReport::default();
        let mut sets: HashMap<&str, Option<SubjectSetHandle>> = HashMap::new();

        for batch in batches {
            let name = batch.subject_set.as_str();

            if !sets.contains_key(name) {
                let handle = match self.catalog.create_subject_set(name).await? {
                    CreateOutcome::Created(handle) => {
                        report.created.push(name.to_string());
                        Some(handle)
                    }
                    CreateOutcome::AlreadyExists => {
                        warn!(
                            backend = self.catalog.backend(),
                            subject_set = name,
                            "subject set already exists, skipping"
                        );
                        report.skipped.push(name.to_string());
                        None
                    }
                };
                sets.insert(name, handle);
            }

            let Some(Some(handle)) = sets.get(name) else {
                continue;
            };

            let subject = self
                .catalog
                .attach_images(handle, &batch.files, &batch.metadata)
                .await?;
            debug!(
                subject_set = name,
                subject = %subject,
                part = batch.part,
                parts = batch.parts,
                "attached batch"
            );

            report.subjects += 1;
            report.images += batch.files.len();
        }

        info!(
            backend = self.catalog.backend(),
            created = report.created.len(),
            skipped = report.skipped.len(),
            subjects = report.subjects,
            images = report.images,
            "upload complete"
        );
        Ok(report)
    }
}
