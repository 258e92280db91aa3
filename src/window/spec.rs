//! Window parameters.

use serde::{Deserialize, Serialize};

use crate::error::WindowError;

/// Shape of a subject window.
///
/// - `span`: slices taken on each side of the centre (0 = centre only)
/// - `step`: z-distance between consecutive slices in a window
/// - `group_size`: z-distance between consecutive window centres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowSpec {
    pub span: usize,
    pub step: usize,
    pub group_size: usize,
}

impl WindowSpec {
    /// Create a validated window spec.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::ZeroStep`], [`WindowError::ZeroGroupSize`], or
    /// [`WindowError::Overflow`] when `2*span*step` or `2*span + 1` does not
    /// fit in a `usize`.
    pub fn new(span: usize, step: usize, group_size: usize) -> Result<Self, WindowError> {
        if step == 0 {
            return Err(WindowError::ZeroStep);
        }
        if group_size == 0 {
            return Err(WindowError::ZeroGroupSize);
        }
        let extent = span.checked_mul(step).and_then(|reach| reach.checked_mul(2));
        let nominal_len = span.checked_mul(2).and_then(|n| n.checked_add(1));
        if extent.is_none() || nominal_len.is_none() {
            return Err(WindowError::Overflow { span, step });
        }
        Ok(Self {
            span,
            step,
            group_size,
        })
    }

    /// Distance from the centre to either end of a full window.
    #[inline]
    pub fn reach(&self) -> usize {
        self.span * self.step
    }

    /// Absolute z-extent of a full window, `2*span*step`.
    #[inline]
    pub fn extent(&self) -> usize {
        2 * self.reach()
    }

    /// Member count of a full window, `2*span + 1`.
    #[inline]
    pub fn nominal_len(&self) -> usize {
        2 * self.span + 1
    }

    /// First usable centre index.
    #[inline]
    pub fn starting_index(&self) -> usize {
        self.reach()
    }

    /// Whether a stack of `stack_length` slices is too short for any window.
    #[inline]
    pub fn is_degenerate(&self, stack_length: usize) -> bool {
        self.extent() >= stack_length
    }

    /// Whether the z-ranges of consecutive windows intersect.
    pub fn overlaps(&self) -> bool {
        self.group_size <= self.extent()
    }
}
