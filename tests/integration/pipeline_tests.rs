//! End-to-end export tests.
//!
//! Tests verify:
//! - A stack on disk becomes one directory per subject set
//! - Exported slices keep their identity through JPEG encoding
//! - Tile exports land in the grid directory with origin-encoded names

use std::path::PathBuf;

use subject_stacker::export::{subject_items, subject_tile_items, tile_items, OutputWriter};
use subject_stacker::stack::load_stack;
use subject_stacker::tile::{TileSpec, Tiler};
use subject_stacker::window::{prefix_from_path, subject_windows, WindowSpec};
use tempfile::TempDir;

use super::test_utils::{
    dir_names, is_valid_jpeg, mean_luma, relative_files, slice_value, write_gray_stack,
};

// =============================================================================
// Subject Export
// =============================================================================

#[test]
fn test_subject_export_layout() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_gray_stack(input.path(), "embryo", 8, 16, 12);

    let stack = load_stack(input.path()).unwrap();
    let prefix = prefix_from_path(stack.source(0).unwrap());
    assert_eq!(prefix, "embryo");

    let spec = WindowSpec::new(1, 1, 3).unwrap();
    let writer = OutputWriter::new(output.path(), 90);

    let mut total = 0;
    for subject in subject_windows(stack.len(), spec, prefix.as_str()) {
        let summary = writer
            .write_all(subject_items(&stack, &subject, &prefix))
            .unwrap();
        assert_eq!(summary.files, subject.window.len());
        total += summary.files;
    }
    assert_eq!(total, 8);

    assert_eq!(
        dir_names(output.path()),
        vec![
            "embryo_span1_step1_z0000-0002",
            "embryo_span1_step1_z0003-0005",
            "embryo_span1_step1_z0006-0007",
        ]
    );

    let files = relative_files(output.path());
    assert_eq!(files.len(), 8);
    assert_eq!(
        files[7],
        PathBuf::from("embryo_span1_step1_z0006-0007/embryo_Z0007.jpg")
    );
}

#[test]
fn test_exported_slices_keep_identity() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_gray_stack(input.path(), "s", 5, 8, 8);

    let stack = load_stack(input.path()).unwrap();
    let spec = WindowSpec::new(1, 2, 1).unwrap();
    let writer = OutputWriter::new(output.path(), 95);

    for subject in subject_windows(stack.len(), spec, "s") {
        writer
            .write_all(subject_items(&stack, &subject, "s"))
            .unwrap();
    }

    // Windows centred at 2 and 3 only: [0, 2, 4] and the short [1, 3]
    assert_eq!(
        dir_names(output.path()),
        vec!["s_span1_step2_z0000-0004", "s_span1_step2_z0001-0003"]
    );

    for z in [0usize, 2, 4] {
        let path = output
            .path()
            .join("s_span1_step2_z0000-0004")
            .join(format!("s_Z{:04}.jpg", z));
        let data = std::fs::read(&path).unwrap();
        assert!(is_valid_jpeg(&data));

        let mean = mean_luma(&path);
        assert!((mean - slice_value(z) as f64).abs() < 2.0, "z={} mean={}", z, mean);
    }
}

#[test]
fn test_degenerate_stack_exports_nothing() {
    let input = TempDir::new().unwrap();
    write_gray_stack(input.path(), "tiny", 3, 4, 4);

    let stack = load_stack(input.path()).unwrap();
    let spec = WindowSpec::new(2, 1, 1).unwrap();
    assert_eq!(subject_windows(stack.len(), spec, "tiny").count(), 0);
}

// =============================================================================
// Tile Export
// =============================================================================

#[test]
fn test_tile_export_layout() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_gray_stack(input.path(), "t", 2, 8, 8);

    let stack = load_stack(input.path()).unwrap();
    let tiler = Tiler::new(TileSpec::new(2, 2, true).unwrap());
    let summary = OutputWriter::with_default_quality(output.path())
        .write_all(tile_items(&stack, tiler, "t"))
        .unwrap();

    assert_eq!(summary.files, 2 * 9);
    assert!(summary.bytes > 0);
    assert_eq!(dir_names(output.path()), vec!["Tiles_X2_Y2_OFFSET"]);

    let files = relative_files(output.path());
    assert!(files.contains(&PathBuf::from("Tiles_X2_Y2_OFFSET/t_X-002_Y-002_Z0000.jpg")));
    assert!(files.contains(&PathBuf::from("Tiles_X2_Y2_OFFSET/t_X0006_Y0006_Z0001.jpg")));

    for file in &files {
        let img = image::open(output.path().join(file)).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
    }
}

#[test]
fn test_subject_tiles_nest_under_subject_set() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_gray_stack(input.path(), "n", 3, 6, 6);

    let stack = load_stack(input.path()).unwrap();
    let spec = WindowSpec::new(1, 1, 3).unwrap();
    let tiler = Tiler::new(TileSpec::new(2, 1, false).unwrap());
    let writer = OutputWriter::with_default_quality(output.path());

    let subject = subject_windows(stack.len(), spec, "n").next().unwrap();
    writer
        .write_all(subject_tile_items(&stack, &subject, tiler, "n"))
        .unwrap();

    let files = relative_files(output.path());
    assert_eq!(files.len(), 3 * 2);
    assert!(files.iter().all(|f| f.starts_with("n_span1_step1_z0000-0002/Tiles_X2_Y1")));
    assert!(files.contains(&PathBuf::from(
        "n_span1_step1_z0000-0002/Tiles_X2_Y1/n_X0003_Y0000_Z0002.jpg"
    )));
}
