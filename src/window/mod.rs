//! Windowing engine.
//!
//! Partitions a z-stack of length `N` into subject windows. A window covers
//! `2*span + 1` slices spaced `step` apart around a centre slice:
//!
//! ```text
//! centre - span*step, ..., centre - step, centre, centre + step, ..., centre + span*step
//! ```
//!
//! The first centre is `span*step`, the smallest index whose window does not
//! read before slice 0. Successive centres advance by `group_size`.
//!
//! # Centre stepping
//!
//! Centres advance by `group_size`, **not** by the window width
//! `2*span*step + 1`. When `group_size` is smaller than the width, consecutive
//! windows share slices; when it is larger, slices between windows are never
//! part of any subject. This is the established behaviour of the subject sets
//! already in circulation and is kept as-is. Subject set names encode the real
//! `z_start`/`z_end` so overlapping windows still get distinct names.
//!
//! # Stack end
//!
//! Full windows are emitted while `centre + span*step <= N - 1`. The first
//! centre that fails this test, if it is still inside the stack, produces one
//! short window clamped to `N - 1` ([`Window::is_short`]) and ends the
//! sequence. When `2*span*step >= N` no window fits and the sequence is empty.
//!
//! # Example
//!
//! ```
//! use subject_stacker::window::{windows, WindowSpec};
//!
//! let spec = WindowSpec::new(1, 2, 3).unwrap();
//! let centres: Vec<usize> = windows(10, spec).map(|w| w.centre).collect();
//! assert_eq!(centres, vec![2, 5, 8]);
//! ```

mod engine;
mod name;
mod spec;

pub use engine::{subject_windows, windows, SubjectWindow, SubjectWindows, Window, Windows};
pub use name::{prefix_from_path, NameComponents, SubjectSetName, DEFAULT_PREFIX};
pub use spec::WindowSpec;
