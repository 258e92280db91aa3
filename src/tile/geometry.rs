//! Tile grid geometry.
//!
//! Computes, per axis and independently for X and Y, the tile size, tile
//! count, grid offset and the source-to-destination mapping used by the fill
//! routine.
//!
//! # Mapping
//!
//! For tile index `i` on an axis of `size` pixels:
//!
//! ```text
//! tile_size = ceil(size / n_tiles)
//! offset    = ceil(tile_size / 2) if offset grid, else 0
//! raw       = [tile_size*i - offset, tile_size*i - offset + tile_size)
//! source    = raw clipped to [0, size]
//! dst_start = offset if i == 0, else 0
//! ```
//!
//! On the first tile of an offset grid the real pixels land at the far side
//! of the buffer, leaving a fill-valued margin for the area outside the image.
//! Trailing tiles are left partially filled when `size` is not a multiple of
//! `tile_size`.

/// Geometry of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisGeometry {
    /// Image extent in pixels
    pub size: u32,

    /// Tile extent in pixels, `ceil(size / n_tiles)`
    pub tile_size: u32,

    /// Tiles on this axis, including the extra offset tile
    pub count: u32,

    /// Grid shift in pixels, `ceil(tile_size / 2)` or 0
    pub offset: u32,
}

/// Source range and destination start for one axis of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisPlacement {
    pub src_start: u32,
    pub src_end: u32,
    pub dst_start: u32,
}

impl AxisPlacement {
    /// Number of real pixels copied on this axis.
    #[inline]
    pub fn len(&self) -> u32 {
        self.src_end.saturating_sub(self.src_start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AxisGeometry {
    /// `n_tiles` is the requested count; `offset` adds one tile and shifts the grid.
    pub fn new(size: u32, n_tiles: u32, offset: bool) -> Self {
        let n_tiles = n_tiles.max(1);
        let tile_size = size.div_ceil(n_tiles);

        if offset {
            Self {
                size,
                tile_size,
                count: n_tiles + 1,
                offset: tile_size.div_ceil(2),
            }
        } else {
            Self {
                size,
                tile_size,
                count: n_tiles,
                offset: 0,
            }
        }
    }

    /// Unclipped source start of tile `index`, `tile_size*index - offset`.
    #[inline]
    pub fn origin(&self, index: u32) -> i64 {
        i64::from(self.tile_size) * i64::from(index) - i64::from(self.offset)
    }

    /// Clipped copy for tile `index`.
    pub fn placement(&self, index: u32) -> AxisPlacement {
        let raw_start = self.origin(index);
        let raw_stop = raw_start + i64::from(self.tile_size);
        let size = i64::from(self.size);

        let src_start = raw_start.clamp(0, size) as u32;
        let src_end = raw_stop.clamp(0, size) as u32;
        let dst_start = if index == 0 { self.offset } else { 0 };

        AxisPlacement {
            src_start,
            src_end,
            dst_start,
        }
    }
}

/// Placement of one tile on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    pub x: AxisPlacement,
    pub y: AxisPlacement,
}

/// Full grid geometry for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGeometry {
    pub x: AxisGeometry,
    pub y: AxisGeometry,
}

impl TileGeometry {
    pub fn new(width: u32, height: u32, spec: &super::TileSpec) -> Self {
        Self {
            x: AxisGeometry::new(width, spec.n_tiles_x, spec.offset),
            y: AxisGeometry::new(height, spec.n_tiles_y, spec.offset),
        }
    }

    /// `(tile_width, tile_height)` shared by every tile.
    pub fn tile_size(&self) -> (u32, u32) {
        (self.x.tile_size, self.y.tile_size)
    }

    /// `(columns, rows)` actually generated.
    pub fn tile_count(&self) -> (u32, u32) {
        (self.x.count, self.y.count)
    }

    pub fn total_tiles(&self) -> usize {
        self.x.count as usize * self.y.count as usize
    }

    /// `(x, y)` offsets subtracted from source coordinates.
    pub fn offsets(&self) -> (u32, u32) {
        (self.x.offset, self.y.offset)
    }

    /// Unclipped source origin of a tile.
    pub fn origin(&self, tile_x: u32, tile_y: u32) -> (i64, i64) {
        (self.x.origin(tile_x), self.y.origin(tile_y))
    }

    /// Copy mapping for a tile, or `None` outside the grid.
    pub fn placement(&self, tile_x: u32, tile_y: u32) -> Option<TilePlacement> {
        if tile_x >= self.x.count || tile_y >= self.y.count {
            return None;
        }
        Some(TilePlacement {
            x: self.x.placement(tile_x),
            y: self.y.placement(tile_y),
        })
    }
}
