//! Windowing integration tests.
//!
//! Tests verify:
//! - Worked examples for common span/step/group size combinations
//! - Bounds, ordering and naming hold across a sweep of parameters
//! - Degenerate and short-window behaviour

use std::collections::HashSet;

use subject_stacker::window::{subject_windows, windows, SubjectSetName, WindowSpec};

fn spec(span: usize, step: usize, group_size: usize) -> WindowSpec {
    WindowSpec::new(span, step, group_size).unwrap()
}

// =============================================================================
// Worked Examples
// =============================================================================

#[test]
fn test_contiguous_non_overlapping_windows() {
    let all: Vec<Vec<usize>> = windows(9, spec(1, 1, 3)).map(|w| w.indices).collect();
    assert_eq!(all, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8]]);
}

#[test]
fn test_strided_windows_overlap_when_group_is_small() {
    let all: Vec<Vec<usize>> = windows(12, spec(1, 2, 2)).map(|w| w.indices).collect();
    assert_eq!(
        all,
        vec![
            vec![0, 2, 4],
            vec![2, 4, 6],
            vec![4, 6, 8],
            vec![6, 8, 10],
            vec![8, 10],
        ]
    );
}

#[test]
fn test_short_trailing_window_is_flagged() {
    let all: Vec<_> = windows(10, spec(1, 1, 4)).collect();
    assert_eq!(all.len(), 3);

    let last = all.last().unwrap();
    assert_eq!(last.centre, 9);
    assert_eq!(last.indices, vec![8, 9]);
    assert!(last.is_short());
    assert_eq!(last.missing(), 1);
    assert!(all[..2].iter().all(|w| !w.is_short()));
}

#[test]
fn test_degenerate_stack_yields_nothing() {
    assert_eq!(windows(4, spec(2, 1, 1)).count(), 0);
    assert_eq!(windows(0, spec(0, 1, 1)).count(), 0);
    assert_eq!(windows(5, spec(2, 1, 5)).count(), 1);
}

#[test]
fn test_span_zero_takes_every_group_centre() {
    let centres: Vec<usize> = windows(7, spec(0, 1, 2)).map(|w| w.centre).collect();
    assert_eq!(centres, vec![0, 2, 4, 6]);
}

#[test]
fn test_subject_names() {
    let names: Vec<String> = subject_windows(9, spec(1, 1, 3), "embryo")
        .map(|s| s.name.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "embryo_span1_step1_z0000-0002",
            "embryo_span1_step1_z0003-0005",
            "embryo_span1_step1_z0006-0008",
        ]
    );
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_window_properties_sweep() {
    for n in 0..40 {
        for span in 0..4 {
            for step in 1..4 {
                for group_size in 1..6 {
                    let spec = spec(span, step, group_size);
                    let all: Vec<_> = subject_windows(n, spec, "p").collect();

                    if 2 * span * step >= n {
                        assert!(all.is_empty(), "n={} spec={:?}", n, spec);
                        continue;
                    }

                    let mut names = HashSet::new();
                    let mut previous_centre = None;
                    for (i, subject) in all.iter().enumerate() {
                        let window = &subject.window;

                        // indices in bounds, ascending, step-spaced
                        assert!(window.indices.iter().all(|&z| z < n));
                        assert!(window.indices.windows(2).all(|p| p[1] - p[0] == step));
                        assert!(window.indices.len() <= spec.nominal_len());

                        // only the last window may be short
                        if i + 1 < all.len() {
                            assert!(!window.is_short());
                        }

                        // centres strictly increase by group size
                        if let Some(prev) = previous_centre {
                            assert_eq!(window.centre, prev + group_size);
                        }
                        previous_centre = Some(window.centre);

                        assert!(names.insert(subject.name.clone()));
                        assert_eq!(
                            subject.name,
                            SubjectSetName::new("p", &spec, window.z_start(), window.z_end())
                        );
                    }

                    assert_eq!(all[0].window.centre, span * step);
                }
            }
        }
    }
}
