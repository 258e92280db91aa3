//! Tiling integration tests.
//!
//! Tests verify:
//! - Every tile pixel is either the source pixel at the tile's origin or fill
//! - Regular grids cover the whole image
//! - Offset grids add one tile per axis and shift by half a tile
//! - Decoded RGB stacks tile with channels intact

use subject_stacker::error::StackError;
use subject_stacker::stack::{load_stack, Frame, PixelKind, RawFrame};
use subject_stacker::tile::{tile_file_name, TileSpec, Tiler};
use tempfile::TempDir;

use super::test_utils::{gray_stack, write_rgb_stack};

/// Assert that each tile of `frame` mirrors the source around its origin.
fn assert_tiles_match_source(frame: &Frame, tiler: Tiler) {
    let geometry = tiler.geometry(frame);
    let (tile_w, tile_h) = geometry.tile_size();
    let (width, height) = frame.dimensions();

    for tile in tiler.tiles(frame, 0) {
        assert_eq!(tile.frame.dimensions(), (tile_w, tile_h));
        assert_eq!(tile.frame.kind(), frame.kind());

        for dy in 0..tile_h {
            for dx in 0..tile_w {
                let sx = tile.origin_x + dx as i64;
                let sy = tile.origin_y + dy as i64;
                let got = tile.frame.pixel(dx, dy).unwrap();

                let inside = sx >= 0 && sy >= 0 && sx < width as i64 && sy < height as i64;
                if inside {
                    assert_eq!(got, frame.pixel(sx as u32, sy as u32).unwrap());
                } else {
                    assert!(got.iter().all(|&v| v == tiler.fill()));
                }
            }
        }
    }
}

fn gradient(width: u32, height: u32) -> Frame {
    let mut frame = Frame::filled(PixelKind::Rgb, width, height, 0);
    if let Frame::Rgb(img) = &mut frame {
        for (x, y, p) in img.enumerate_pixels_mut() {
            p.0 = [x as u8, y as u8, (x * 7 + y * 3) as u8];
        }
    }
    frame
}

// =============================================================================
// Pixel Placement
// =============================================================================

#[test]
fn test_tiles_mirror_source_across_grids() {
    let shapes = [(1, 1), (5, 3), (10, 10), (13, 7), (7, 13)];
    for (width, height) in shapes {
        let frame = gradient(width, height);
        for n_x in 1..5 {
            for n_y in 1..5 {
                for offset in [false, true] {
                    let spec = TileSpec::new(n_x, n_y, offset).unwrap();
                    assert_tiles_match_source(&frame, Tiler::new(spec).with_fill(17));
                }
            }
        }
    }
}

#[test]
fn test_regular_grid_covers_every_pixel() {
    let frame = gradient(11, 9);
    let tiler = Tiler::new(TileSpec::new(3, 2, false).unwrap());

    let mut covered = vec![false; 11 * 9];
    for tile in tiler.tiles(&frame, 0) {
        let (tw, th) = tile.frame.dimensions();
        for dy in 0..th as i64 {
            for dx in 0..tw as i64 {
                let (sx, sy) = (tile.origin_x + dx, tile.origin_y + dy);
                if (0..11).contains(&sx) && (0..9).contains(&sy) {
                    covered[(sy * 11 + sx) as usize] = true;
                }
            }
        }
    }
    assert!(covered.iter().all(|&c| c));
}

#[test]
fn test_offset_grid_shape() {
    let frame = gradient(10, 10);
    let tiler = Tiler::new(TileSpec::new(2, 2, true).unwrap());
    let tiles: Vec<_> = tiler.tiles(&frame, 3).collect();

    assert_eq!(tiles.len(), 9);
    let origins: Vec<(i64, i64)> = tiles.iter().map(|t| (t.origin_x, t.origin_y)).collect();
    assert_eq!(
        origins,
        vec![
            (-3, -3),
            (-3, 2),
            (-3, 7),
            (2, -3),
            (2, 2),
            (2, 7),
            (7, -3),
            (7, 2),
            (7, 7),
        ]
    );
    assert_eq!(tile_file_name("emb", &tiles[0]), "emb_X-003_Y-003_Z0003.jpg");
}

#[test]
fn test_whole_grid_is_identity() {
    let frame = gradient(6, 4);
    let tiles: Vec<_> = Tiler::new(TileSpec::whole()).tiles(&frame, 0).collect();
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].frame.as_raw(), frame.as_raw());
}

// =============================================================================
// Stacks
// =============================================================================

#[test]
fn test_tiles_from_decoded_rgb_stack() {
    let dir = TempDir::new().unwrap();
    write_rgb_stack(dir.path(), "rgb", 2, 9, 6);

    let stack = load_stack(dir.path()).unwrap();
    assert_eq!(stack.kind(), PixelKind::Rgb);

    let tiler = Tiler::new(TileSpec::new(2, 2, true).unwrap());
    for (z, frame) in stack.frames().iter().enumerate() {
        let tiles: Vec<_> = tiler.tiles(frame, z).collect();
        assert_eq!(tiles.len(), 9);
        assert!(tiles.iter().all(|t| t.z == z));
        assert_tiles_match_source(frame, tiler);
    }
}

#[test]
fn test_gray_stack_fill_value() {
    let stack = gray_stack(1, 5, 5);
    let tiler = Tiler::new(TileSpec::new(2, 2, true).unwrap()).with_fill(255);
    let first = tiler.tiles(&stack.frames()[0], 0).next().unwrap();

    // Top-left offset tile: padding row/column is fill, interior is slice data
    assert_eq!(first.frame.pixel(0, 0).unwrap(), &[255]);
    let (tw, th) = first.frame.dimensions();
    assert_eq!(first.frame.pixel(tw - 1, th - 1).unwrap(), &[10]);
}

#[test]
fn test_raw_frame_dimensionality() {
    let tiler = Tiler::new(TileSpec::new(2, 2, false).unwrap());

    let result = tiler.tile_raw(RawFrame::new(vec![2, 2, 2, 2], vec![0; 16]), 0);
    assert!(matches!(
        result,
        Err(StackError::InvalidDimensionality { ndim: 4 })
    ));

    let result = tiler.tile_raw(RawFrame::new(vec![usize::MAX, 2], Vec::new()), 0);
    assert!(matches!(result, Err(StackError::ShapeTooLarge { .. })));

    let tiles = tiler
        .tile_raw(RawFrame::new(vec![4, 6], vec![1; 24]), 0)
        .unwrap();
    assert_eq!(tiles.len(), 4);
    assert_eq!(tiles[0].frame.dimensions(), (3, 2));
}
