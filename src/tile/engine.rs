//! Tiling engine.
//!
//! Splits a frame into a grid of uniformly sized tiles. Every tile buffer has
//! the full `tile_height × tile_width` shape; pixels outside the image keep
//! the fill value (black by default).

use std::iter::FusedIterator;

use image::{ImageBuffer, Luma, Pixel, Rgb};
use tracing::debug;

use crate::error::StackError;
use crate::stack::{Frame, RawFrame};

use super::geometry::{TileGeometry, TilePlacement};
use super::spec::TileSpec;

// =============================================================================
// Tile
// =============================================================================

/// One tile of one slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Column index in the grid
    pub tile_x: u32,

    /// Row index in the grid
    pub tile_y: u32,

    /// z-index of the originating slice
    pub z: usize,

    /// Source x of the tile's left edge, `tile_width*tile_x - x_offset`
    pub origin_x: i64,

    /// Source y of the tile's top edge, `tile_height*tile_y - y_offset`
    pub origin_y: i64,

    /// Pixel data, always the full tile size
    pub frame: Frame,
}

// =============================================================================
// Tiler
// =============================================================================

/// Stateless tiling engine configured by a [`TileSpec`] and fill value.
///
/// # Example
///
/// ```
/// use image::GrayImage;
/// use subject_stacker::stack::Frame;
/// use subject_stacker::tile::{TileSpec, Tiler};
///
/// let frame = Frame::Gray(GrayImage::new(10, 10));
/// let tiler = Tiler::new(TileSpec::new(2, 2, false).unwrap());
///
/// let tiles: Vec<_> = tiler.tiles(&frame, 0).collect();
/// assert_eq!(tiles.len(), 4);
/// assert_eq!(tiles[0].frame.dimensions(), (5, 5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiler {
    spec: TileSpec,
    fill: u8,
}

impl Tiler {
    /// Create a tiler with a zero fill value.
    pub fn new(spec: TileSpec) -> Self {
        Self { spec, fill: 0 }
    }

    /// Set the value written to every sample not covered by the image.
    pub fn with_fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }

    pub fn spec(&self) -> &TileSpec {
        &self.spec
    }

    pub fn fill(&self) -> u8 {
        self.fill
    }

    /// Grid geometry for a frame.
    pub fn geometry(&self, frame: &Frame) -> TileGeometry {
        TileGeometry::new(frame.width(), frame.height(), &self.spec)
    }

    /// Produce a single tile, or `None` if the indices are outside the grid.
    pub fn tile(&self, frame: &Frame, z: usize, tile_x: u32, tile_y: u32) -> Option<Tile> {
        let geometry = self.geometry(frame);
        build_tile(frame, &geometry, self.fill, z, tile_x, tile_y)
    }

    /// Iterate all tiles of a frame in ascending `tile_x`, then `tile_y` order.
    pub fn tiles<'a>(&self, frame: &'a Frame, z: usize) -> Tiles<'a> {
        let geometry = self.geometry(frame);
        debug!(
            z,
            columns = geometry.x.count,
            rows = geometry.y.count,
            tile_width = geometry.x.tile_size,
            tile_height = geometry.y.tile_size,
            "tiling slice"
        );
        Tiles {
            frame,
            geometry,
            fill: self.fill,
            z,
            next: Some((0, 0)),
        }
    }

    /// Validate a raw array and tile it.
    ///
    /// Nothing is produced if the array is not 2-D or 3-D RGB.
    pub fn tile_raw(&self, raw: RawFrame, z: usize) -> Result<Vec<Tile>, StackError> {
        let frame = Frame::from_raw(raw)?;
        let tiles = self.tiles(&frame, z).collect();
        Ok(tiles)
    }
}

// =============================================================================
// Tiles iterator
// =============================================================================

/// Iterator over the tiles of one frame. Created by [`Tiler::tiles`].
#[derive(Debug, Clone)]
pub struct Tiles<'a> {
    frame: &'a Frame,
    geometry: TileGeometry,
    fill: u8,
    z: usize,
    next: Option<(u32, u32)>,
}

impl Tiles<'_> {
    pub fn geometry(&self) -> &TileGeometry {
        &self.geometry
    }
}

impl Iterator for Tiles<'_> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        let (tile_x, tile_y) = self.next?;
        let (columns, rows) = self.geometry.tile_count();

        self.next = if tile_y + 1 < rows {
            Some((tile_x, tile_y + 1))
        } else if tile_x + 1 < columns {
            Some((tile_x + 1, 0))
        } else {
            None
        };

        build_tile(self.frame, &self.geometry, self.fill, self.z, tile_x, tile_y)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some((tile_x, tile_y)) => {
                let rows = self.geometry.y.count as usize;
                self.geometry.total_tiles() - (tile_x as usize * rows + tile_y as usize)
            }
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Tiles<'_> {}

impl FusedIterator for Tiles<'_> {}

// =============================================================================
// Fill
// =============================================================================

fn build_tile(
    frame: &Frame,
    geometry: &TileGeometry,
    fill: u8,
    z: usize,
    tile_x: u32,
    tile_y: u32,
) -> Option<Tile> {
    let placement = geometry.placement(tile_x, tile_y)?;
    let (width, height) = geometry.tile_size();

    let tile_frame = match frame {
        Frame::Gray(src) => Frame::Gray(fill_tile(src, width, height, &placement, Luma([fill]))),
        Frame::Rgb(src) => Frame::Rgb(fill_tile(
            src,
            width,
            height,
            &placement,
            Rgb([fill, fill, fill]),
        )),
    };

    let (origin_x, origin_y) = geometry.origin(tile_x, tile_y);
    Some(Tile {
        tile_x,
        tile_y,
        z,
        origin_x,
        origin_y,
        frame: tile_frame,
    })
}

/// Copy the placed source window into a fresh `width × height` buffer.
///
/// Whole pixels are copied row by row, so every channel of an RGB source is
/// moved with the same mapping and keeps its position within the pixel.
fn fill_tile<P>(
    src: &ImageBuffer<P, Vec<u8>>,
    width: u32,
    height: u32,
    placement: &TilePlacement,
    fill: P,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let mut out = ImageBuffer::from_pixel(width, height, fill);

    let channels = P::CHANNEL_COUNT as usize;
    let copy_w = placement.x.len().min(width.saturating_sub(placement.x.dst_start)) as usize;
    let copy_h = placement.y.len().min(height.saturating_sub(placement.y.dst_start)) as usize;
    if copy_w == 0 || copy_h == 0 {
        return out;
    }

    let src_stride = src.width() as usize * channels;
    let dst_stride = width as usize * channels;
    let row_bytes = copy_w * channels;
    let src_x = placement.x.src_start as usize * channels;
    let dst_x = placement.x.dst_start as usize * channels;

    let src_data: &[u8] = src.as_raw();
    let dst_data: &mut [u8] = &mut out;

    for row in 0..copy_h {
        let src_row = (placement.y.src_start as usize + row) * src_stride + src_x;
        let dst_row = (placement.y.dst_start as usize + row) * dst_stride + dst_x;
        dst_data[dst_row..dst_row + row_bytes]
            .copy_from_slice(&src_data[src_row..src_row + row_bytes]);
    }

    out
}

// =============================================================================
// Tests
// =============================================================================
