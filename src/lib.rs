//! # Subject Stacker
//!
//! Prepares microscopy z-stacks for crowdsourced annotation.
//!
//! A stack of slices is cut into small ordered windows ("subject sets") that
//! volunteers classify; each slice can also be cut into a grid of tiles,
//! optionally with a second half-tile-offset grid so features on tile borders
//! appear whole in some tile. The results are written as JPEGs and uploaded
//! to a subject catalog such as Zooniverse.
//!
//! ## Features
//!
//! - **Windowing**: centre-stepped windows with configurable span, step and group size
//! - **Tiling**: fixed-size tiles with fill padding and an optional offset grid
//! - **Export**: deterministic relative paths for every subject slice and tile
//! - **Upload**: batch subject sets into a catalog, skipping names that already exist
//!
//! ## Architecture
//!
//! - [`stack`] - Frames, stacks and the directory loader
//! - [`window`] - Windowing engine and subject set naming
//! - [`tile`] - Tiling engine, naming and JPEG encoding
//! - [`export`] - Output items and the JPEG writer
//! - [`catalog`] - Catalog trait and its in-memory, local and Panoptes backends
//! - [`upload`] - Upload planning and batch uploading
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust
//! use subject_stacker::{subject_windows, Frame, PixelKind, TileSpec, Tiler, WindowSpec};
//!
//! let spec = WindowSpec::new(1, 1, 3).unwrap();
//! let names: Vec<String> = subject_windows(9, spec, "emb")
//!     .map(|s| s.name.to_string())
//!     .collect();
//! assert_eq!(names[0], "emb_span1_step1_z0000-0002");
//!
//! let frame = Frame::filled(PixelKind::Gray, 10, 10, 255);
//! let tiler = Tiler::new(TileSpec::new(2, 2, true).unwrap());
//! assert_eq!(tiler.tiles(&frame, 0).count(), 9);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod stack;
pub mod tile;
pub mod upload;
pub mod window;

// Re-export commonly used types
pub use catalog::{
    Catalog, CreateOutcome, InMemoryCatalog, LocalCatalog, PanoptesCatalog, SubjectId,
    SubjectMetadata, SubjectSetHandle,
};
pub use config::{Backend, Cli, Command, SubjectsConfig, TilesConfig, UploadConfig};
pub use error::{CatalogError, ExportError, StackError, TileError, UploadError, WindowError};
pub use export::{subject_items, tile_items, ExportSummary, OutputItem, OutputWriter};
pub use stack::{load_stack, Frame, ImageStack, PixelKind, RawFrame};
pub use tile::{
    clamp_quality, is_valid_quality, tile_file_name, tiles_dir_name, JpegTileEncoder, Tile,
    TileGeometry, TileSpec, Tiler, DEFAULT_JPEG_QUALITY,
};
pub use upload::{BatchUploader, UploadBatch, UploadPlanner, UploadReport};
pub use window::{
    prefix_from_path, subject_windows, windows, SubjectSetName, SubjectWindow, Window, WindowSpec,
};
