//! Window iteration.
//!
//! [`windows`] is a pure function of the stack length and a [`WindowSpec`];
//! it never touches pixel data. Callers index into an
//! [`ImageStack`](crate::stack::ImageStack) with the emitted slice indices.

use std::iter::FusedIterator;

use tracing::{debug, warn};

use super::name::SubjectSetName;
use super::spec::WindowSpec;

// =============================================================================
// Window
// =============================================================================

/// One subject window: ordered absolute slice indices around a centre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Centre slice index
    pub centre: usize,

    /// Member slice indices in ascending order
    pub indices: Vec<usize>,

    /// Member count of a full window (`2*span + 1`)
    pub nominal_len: usize,
}

impl Window {
    /// First slice index.
    pub fn z_start(&self) -> usize {
        self.indices.first().copied().unwrap_or(self.centre)
    }

    /// Last slice index, clamped to the stack for a short window.
    pub fn z_end(&self) -> usize {
        self.indices.last().copied().unwrap_or(self.centre)
    }

    /// Number of member slices.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether this window was truncated by the end of the stack.
    pub fn is_short(&self) -> bool {
        self.indices.len() < self.nominal_len
    }

    /// Number of members lost to truncation.
    pub fn missing(&self) -> usize {
        self.nominal_len.saturating_sub(self.indices.len())
    }
}

// =============================================================================
// Windows iterator
// =============================================================================

/// Iterator over the windows of a stack, in ascending centre order.
///
/// Created by [`windows`]. Iteration cannot be restarted; call [`windows`]
/// again for a fresh sequence.
#[derive(Debug, Clone)]
pub struct Windows {
    spec: WindowSpec,
    stack_length: usize,
    next_centre: Option<usize>,
}

/// Enumerate the windows of a stack of `stack_length` slices.
///
/// Returns an empty iterator when `2*span*step >= stack_length`.
pub fn windows(stack_length: usize, spec: WindowSpec) -> Windows {
    let next_centre = if spec.is_degenerate(stack_length) {
        debug!(
            stack_length,
            extent = spec.extent(),
            "window extent does not fit in stack, no windows"
        );
        None
    } else {
        Some(spec.starting_index())
    };

    Windows {
        spec,
        stack_length,
        next_centre,
    }
}

impl Windows {
    pub fn spec(&self) -> &WindowSpec {
        &self.spec
    }

    pub fn stack_length(&self) -> usize {
        self.stack_length
    }
}

impl Iterator for Windows {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        let centre = self.next_centre?;
        // Non-degenerate specs guarantee a non-empty stack.
        let last = self.stack_length.checked_sub(1)?;

        if centre > last {
            self.next_centre = None;
            return None;
        }

        let reach = self.spec.reach();
        let start = centre - reach;
        let full = centre + reach <= last;
        let end = if full { centre + reach } else { last };

        let indices: Vec<usize> = (start..=end).step_by(self.spec.step).collect();
        let window = Window {
            centre,
            indices,
            nominal_len: self.spec.nominal_len(),
        };

        if full {
            self.next_centre = centre.checked_add(self.spec.group_size);
        } else {
            self.next_centre = None;
            warn!(
                centre,
                members = window.len(),
                nominal = window.nominal_len,
                "short trailing window at end of stack"
            );
        }

        Some(window)
    }
}

impl FusedIterator for Windows {}

// =============================================================================
// Named windows
// =============================================================================

/// A window paired with its subject set name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectWindow {
    pub window: Window,
    pub name: SubjectSetName,
}

/// Iterator over named windows. Created by [`subject_windows`].
#[derive(Debug, Clone)]
pub struct SubjectWindows {
    inner: Windows,
    prefix: String,
}

/// Enumerate windows together with their [`SubjectSetName`]s.
///
/// Names embed each window's actual `z_start`/`z_end`, so two windows of one
/// run never share a name even when their slices overlap.
pub fn subject_windows(
    stack_length: usize,
    spec: WindowSpec,
    prefix: impl Into<String>,
) -> SubjectWindows {
    SubjectWindows {
        inner: windows(stack_length, spec),
        prefix: prefix.into(),
    }
}

impl SubjectWindows {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Iterator for SubjectWindows {
    type Item = SubjectWindow;

    fn next(&mut self) -> Option<SubjectWindow> {
        let window = self.inner.next()?;
        let name = SubjectSetName::new(
            &self.prefix,
            self.inner.spec(),
            window.z_start(),
            window.z_end(),
        );
        Some(SubjectWindow { window, name })
    }
}

impl FusedIterator for SubjectWindows {}

// =============================================================================
// Tests
// =============================================================================
