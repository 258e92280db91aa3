//! Output naming for tiles.
//!
//! Tiles of one grid share a directory named after the requested grid, and
//! each file name encodes the tile's source origin and slice:
//!
//! ```text
//! Tiles_X{n_tiles_x}_Y{n_tiles_y}[_OFFSET]/{prefix}_X{origin_x:04}_Y{origin_y:04}_Z{z:04}.jpg
//! ```
//!
//! Origins are `tile_size*index - offset` and can be negative on offset grids
//! (`X-003`). Zero padding keeps names sorting by position and depth.

use super::engine::Tile;
use super::spec::TileSpec;

/// Leading component of every tile grid directory name.
pub const TILES_DIR_PREFIX: &str = "Tiles_";

/// Directory name for a tile grid, e.g. `Tiles_X4_Y4_OFFSET`.
pub fn tiles_dir_name(spec: &TileSpec) -> String {
    let mut name = format!("{}X{}_Y{}", TILES_DIR_PREFIX, spec.n_tiles_x, spec.n_tiles_y);
    if spec.offset {
        name.push_str("_OFFSET");
    }
    name
}

/// File name for one tile.
pub fn tile_file_name(prefix: &str, tile: &Tile) -> String {
    format!(
        "{}_X{:04}_Y{:04}_Z{:04}.jpg",
        prefix, tile.origin_x, tile.origin_y, tile.z
    )
}
