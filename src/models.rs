use std::collections::BTreeMap;
use std::path::PathBuf;

/// Normalized tag container: field name -> ordered values.
/// A field can be absent, or present with an empty value list; both are
/// treated as "no usable value" by accessors.
#[derive(Debug, Clone, Default)]
pub struct TagBag {
    fields: BTreeMap<String, Vec<String>>,
}

impl TagBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, values: Vec<String>) {
        self.fields.insert(field.to_string(), values);
    }

    /// First value of a field, or None when the field is missing or empty.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|vals| vals.first())
            .map(|s| s.as_str())
    }
}

/// One playlist entry resolved to an existing file with readable tags.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    pub path: PathBuf,
    pub tags: TagBag,
    /// Source extension, dot-prefixed and lowercased, e.g. ".flac".
    /// Empty string when the file has no extension.
    pub ext: String,
}

impl AudioAsset {
    pub fn new(path: PathBuf, tags: TagBag) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();
        AudioAsset { path, tags, ext }
    }
}

/// What the decider chose for one asset, before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Source format needs no re-encode; copy it byte-for-byte.
    Copy,
    /// Target output already exists; do nothing.
    SkipExisting,
    /// Invoke the external encoder.
    Encode,
}

/// What actually happened to one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Copied,
    Encoded,
    SkippedExisting,
    /// Encoder exited non-zero. The batch continues; a partial output file,
    /// if any, is left in place.
    Failed,
}

/// Per-asset result: the output file name (base + extension, no directory)
/// and how it was produced. Only used for the export playlist line and
/// verbose logging.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub file_name: String,
    pub outcome: Outcome,
}
