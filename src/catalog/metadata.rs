//! Subject metadata.
//!
//! Metadata is a flat, ordered JSON object attached to each subject. Keys
//! starting with `#` are hidden from volunteers on Zooniverse and are used
//! for provenance (source range, content digests).

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::window::{NameComponents, SubjectSetName};

/// Ordered string-keyed JSON metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectMetadata(Map<String, Value>);

impl SubjectMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a visible key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a key hidden from volunteers (`#` prefix added if missing).
    pub fn insert_hidden(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        let key = if key.starts_with('#') {
            key.to_string()
        } else {
            format!("#{}", key)
        };
        self.0.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Provenance for a subject set: the name and, when it parses, the window
    /// fields it encodes.
    pub fn for_subject_set(name: &SubjectSetName) -> Self {
        let mut metadata = Self::new();
        metadata.insert_hidden("subject_set", name.as_str());

        if let Some(NameComponents {
            prefix,
            span,
            step,
            z_start,
            z_end,
        }) = name.components()
        {
            metadata
                .insert_hidden("prefix", prefix)
                .insert_hidden("span", span)
                .insert_hidden("step", step)
                .insert_hidden("z_start", z_start)
                .insert_hidden("z_end", z_end);
        }
        metadata
    }

    /// Record the SHA-256 of every file, in order, under `#sha256`.
    pub fn with_file_digests<P: AsRef<Path>>(mut self, files: &[P]) -> io::Result<Self> {
        let digests = files
            .iter()
            .map(|f| file_sha256(f.as_ref()).map(Value::from))
            .collect::<io::Result<Vec<Value>>>()?;
        self.insert_hidden("sha256", Value::Array(digests));
        Ok(self)
    }
}

/// Hex SHA-256 of a file's contents.
pub fn file_sha256(path: &Path) -> io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
