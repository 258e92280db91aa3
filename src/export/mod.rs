//! Output planning and persistence.
//!
//! The engines never touch the filesystem. This module turns their results
//! into `(relative_path, frame)` pairs ([`OutputItem`]) and writes those pairs
//! as JPEG under an output root ([`OutputWriter`]).
//!
//! Layout produced by the helpers:
//!
//! ```text
//! <root>/
//!   <subject_set_name>/<prefix>_Z0003.jpg              subject_items
//!   <subject_set_name>/Tiles_X2_Y2/<tile name>.jpg     subject_tile_items
//!   Tiles_X2_Y2_OFFSET/<tile name>.jpg                 tile_items
//! ```

mod items;
mod writer;

pub use items::{slice_file_name, subject_items, subject_tile_items, tile_items, OutputItem};
pub use writer::{ExportSummary, OutputWriter};
