//! Tiling engine.
//!
//! Splits each slice of a stack into an `n_tiles_x × n_tiles_y` grid of
//! uniformly sized tiles, optionally with a second, half-tile-shifted grid so
//! that tile seams of the two tilings never coincide.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌───────────────────┐
//! │   TileSpec   │ ──▶ │   TileGeometry   │ ──▶ │      Tiler        │
//! │ (grid, flag) │     │ (sizes, offsets, │     │ (fill routine,    │
//! └──────────────┘     │  placements)     │     │  Tiles iterator)  │
//!                      └──────────────────┘     └─────────┬─────────┘
//!                                                         │ Tile
//!                                                         ▼
//!                                   ┌─────────────────────────────────────┐
//!                                   │ tiles_dir_name / tile_file_name     │
//!                                   │ JpegTileEncoder                     │
//!                                   └─────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileSpec`]: requested grid and offset flag
//! - [`TileGeometry`]: per-axis tile size, count, offset and copy placement
//! - [`Tiler`]: produces [`Tile`]s for a frame, in ascending x then y order
//! - [`tiles_dir_name`], [`tile_file_name`]: deterministic output names
//! - [`JpegTileEncoder`]: encodes a tile (or any frame) to JPEG
//!
//! The engine is pure: it reads frames, allocates one buffer per tile and
//! holds no cache.

mod encoder;
mod engine;
mod geometry;
mod naming;
mod spec;

pub use encoder::{
    clamp_quality, is_valid_quality, JpegTileEncoder, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY,
    MIN_JPEG_QUALITY,
};
pub use engine::{Tile, Tiler, Tiles};
pub use geometry::{AxisGeometry, AxisPlacement, TileGeometry, TilePlacement};
pub use naming::{tile_file_name, tiles_dir_name, TILES_DIR_PREFIX};
pub use spec::TileSpec;
