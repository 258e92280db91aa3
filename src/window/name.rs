//! Subject set naming.
//!
//! Names double as catalog uniqueness keys and as output directory names, so
//! they encode the concrete z-range of the window rather than a loop counter:
//!
//! ```text
//! {prefix}_span{span}_step{step}_z{z_start:04}-{z_end:04}
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::spec::WindowSpec;

/// Prefix used when none can be derived from a path.
pub const DEFAULT_PREFIX: &str = "stack";

/// Deterministic key for one subject window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectSetName(String);

/// Fields recovered from a [`SubjectSetName`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameComponents {
    pub prefix: String,
    pub span: usize,
    pub step: usize,
    pub z_start: usize,
    pub z_end: usize,
}

impl SubjectSetName {
    pub fn new(prefix: &str, spec: &WindowSpec, z_start: usize, z_end: usize) -> Self {
        Self(format!(
            "{}_span{}_step{}_z{:04}-{:04}",
            prefix, spec.span, spec.step, z_start, z_end
        ))
    }

    /// Wrap an existing name, e.g. a directory name read back from disk.
    pub fn from_raw(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the name back into its fields.
    ///
    /// Returns `None` for names not produced by [`SubjectSetName::new`].
    pub fn components(&self) -> Option<NameComponents> {
        let (rest, z_range) = self.0.rsplit_once("_z")?;
        let (z_start, z_end) = z_range.split_once('-')?;
        let (rest, step) = rest.rsplit_once("_step")?;
        let (prefix, span) = rest.rsplit_once("_span")?;

        Some(NameComponents {
            prefix: prefix.to_string(),
            span: span.parse().ok()?,
            step: step.parse().ok()?,
            z_start: z_start.parse().ok()?,
            z_end: z_end.parse().ok()?,
        })
    }
}

impl fmt::Display for SubjectSetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SubjectSetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive a name prefix from a file or directory path.
///
/// Takes the file stem, folds characters other than ASCII alphanumerics and
/// `-` to `_`, then trims a trailing slice counter (digits and separators) so
/// that every slice of a stack yields the same prefix.
pub fn prefix_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let folded: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = folded
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .trim_end_matches(['_', '-']);

    if trimmed.is_empty() {
        DEFAULT_PREFIX.to_string()
    } else {
        trimmed.to_string()
    }
}
