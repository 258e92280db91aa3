//! Relative output paths for windows and tiles.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::stack::{Frame, ImageStack};
use crate::tile::{tile_file_name, tiles_dir_name, Tile, Tiler};
use crate::window::SubjectWindow;

/// A frame and the path, relative to the output root, it should be written to.
#[derive(Debug, Clone)]
pub struct OutputItem<'a> {
    pub relative_path: PathBuf,
    pub frame: Cow<'a, Frame>,
}

impl<'a> OutputItem<'a> {
    pub fn borrowed(relative_path: impl Into<PathBuf>, frame: &'a Frame) -> Self {
        Self {
            relative_path: relative_path.into(),
            frame: Cow::Borrowed(frame),
        }
    }

    pub fn owned(relative_path: impl Into<PathBuf>, frame: Frame) -> OutputItem<'static> {
        OutputItem {
            relative_path: relative_path.into(),
            frame: Cow::Owned(frame),
        }
    }
}

/// File name of an untiled slice, `{prefix}_Z{z:04}.jpg`.
pub fn slice_file_name(prefix: &str, z: usize) -> String {
    format!("{}_Z{:04}.jpg", prefix, z)
}

/// One item per member slice of a subject window, under the subject set name.
///
/// Indices beyond the stack are skipped.
pub fn subject_items<'a>(
    stack: &'a ImageStack,
    subject: &SubjectWindow,
    prefix: &str,
) -> Vec<OutputItem<'a>> {
    let dir = Path::new(subject.name.as_str());
    subject
        .window
        .indices
        .iter()
        .filter_map(|&z| {
            let frame = stack.get(z)?;
            Some(OutputItem::borrowed(dir.join(slice_file_name(prefix, z)), frame))
        })
        .collect()
}

/// Tiles of every member slice of a subject window.
///
/// Written under `{subject_set_name}/{tiles_dir}/`.
pub fn subject_tile_items(
    stack: &ImageStack,
    subject: &SubjectWindow,
    tiler: Tiler,
    prefix: &str,
) -> Vec<OutputItem<'static>> {
    let dir = Path::new(subject.name.as_str()).join(tiles_dir_name(tiler.spec()));
    subject
        .window
        .indices
        .iter()
        .filter_map(|&z| stack.get(z).map(|frame| (z, frame)))
        .flat_map(|(z, frame)| tiler.tiles(frame, z))
        .filter_map(|tile| tile_item(&dir, prefix, tile))
        .collect()
}

/// Lazily tile every slice of a stack into `{tiles_dir}/`.
pub fn tile_items<'a>(
    stack: &'a ImageStack,
    tiler: Tiler,
    prefix: &'a str,
) -> impl Iterator<Item = OutputItem<'static>> + 'a {
    let dir = PathBuf::from(tiles_dir_name(tiler.spec()));
    stack
        .frames()
        .iter()
        .enumerate()
        .flat_map(move |(z, frame)| tiler.tiles(frame, z))
        .filter_map(move |tile| tile_item(&dir, prefix, tile))
}

fn tile_item(dir: &Path, prefix: &str, tile: Tile) -> Option<OutputItem<'static>> {
    let name = tile_file_name(prefix, &tile);
    if tile.frame.width() == 0 || tile.frame.height() == 0 {
        debug!(tile = %name, "skipping zero-area tile");
        return None;
    }
    Some(OutputItem::owned(dir.join(name), tile.frame))
}
