//! Upload batching.
//!
//! Takes an export tree (one directory per subject set) and pushes it into a
//! [`Catalog`](crate::catalog::Catalog):
//!
//! ```text
//! <export root>/
//!   emb_span1_step1_z0000-0002/*.jpg ──► UploadBatch(part 1/1)
//!   emb_span1_step1_z0003-0005/*.jpg ──► UploadBatch(part 1/2), (part 2/2)
//!                      │
//!                      ▼
//!              BatchUploader::upload
//!                      │
//!        create_subject_set (once per set)
//!          ├── Created       → attach_images per batch
//!          └── AlreadyExists → skip the set, keep going
//! ```

mod planner;
mod uploader;

pub use planner::{UploadBatch, UploadPlanner};
pub use uploader::{BatchUploader, UploadReport};
