//! Tile grid parameters.

use serde::{Deserialize, Serialize};

use crate::error::TileError;

/// Requested tile grid.
///
/// With `offset` set, one extra row and column of half-shifted tiles is
/// generated, so the effective grid is `(n_tiles_x + 1) × (n_tiles_y + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSpec {
    pub n_tiles_x: u32,
    pub n_tiles_y: u32,
    pub offset: bool,
}

impl TileSpec {
    /// Create a validated tile spec.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::ZeroTileCount`] if either count is zero.
    pub fn new(n_tiles_x: u32, n_tiles_y: u32, offset: bool) -> Result<Self, TileError> {
        if n_tiles_x == 0 || n_tiles_y == 0 {
            return Err(TileError::ZeroTileCount {
                n_tiles_x,
                n_tiles_y,
            });
        }
        Ok(Self {
            n_tiles_x,
            n_tiles_y,
            offset,
        })
    }

    /// Single tile covering the whole image.
    pub fn whole() -> Self {
        Self {
            n_tiles_x: 1,
            n_tiles_y: 1,
            offset: false,
        }
    }

    /// Same grid with the half-tile offset toggled.
    pub fn with_offset(self, offset: bool) -> Self {
        Self { offset, ..self }
    }

    /// Effective `(columns, rows)` including the offset row and column.
    pub fn effective_counts(&self) -> (u32, u32) {
        let extra = u32::from(self.offset);
        (self.n_tiles_x + extra, self.n_tiles_y + extra)
    }
}
