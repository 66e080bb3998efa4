use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between multiple values inside one index declaration.
pub const VALUE_SEPARATOR: char = ',';

/// A single secondary-index declaration.
///
/// The `value` may hold several values joined with commas
/// (`"red,blue"`); [`IndexPair::flatten`] splits them. A comma that belongs
/// to a value cannot be told apart from a separator.
///
/// Serialized as a two-element array `["field", "value"]` to keep encoded
/// metadata compact.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct IndexPair {
    pub field: String,
    pub value: String,
}

impl IndexPair {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Split a comma-joined declaration into single-valued pairs.
    ///
    /// Surrounding whitespace is trimmed from each value and empty pieces
    /// are skipped, so `"a, b,,c"` yields `a`, `b` and `c`.
    pub fn flatten(&self) -> impl Iterator<Item = IndexPair> + '_ {
        self.value
            .split(VALUE_SEPARATOR)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(move |v| IndexPair::new(self.field.clone(), v))
    }
}

impl From<(String, String)> for IndexPair {
    fn from((field, value): (String, String)) -> Self {
        Self { field, value }
    }
}

impl From<IndexPair> for (String, String) {
    fn from(pair: IndexPair) -> Self {
        (pair.field, pair.value)
    }
}

impl fmt::Display for IndexPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

/// Per-object metadata stored alongside the payload.
///
/// Field names are shortened on the wire (`I`, `L`, `M`, `C`) since every
/// stored object carries a copy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Secondary-index declarations, in the order they were supplied.
    #[serde(rename = "I", default)]
    pub indexes: Vec<IndexPair>,
    /// Raw link header: zero or more `</bucket/key>; riaktag="tag"` descriptors.
    #[serde(rename = "L", default)]
    pub links: String,
    /// User metadata (keys lower-cased).
    #[serde(rename = "M", default)]
    pub meta: BTreeMap<String, String>,
    /// Payload content type.
    #[serde(rename = "C", default)]
    pub content_type: String,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to add an index declaration.
    pub fn with_index(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.indexes.push(IndexPair::new(field, value));
        self
    }

    /// Builder-style helper to set the raw link header.
    pub fn with_links(mut self, links: impl Into<String>) -> Self {
        self.links = links.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// All index declarations split into single-valued pairs.
    pub fn flattened_indexes(&self) -> Vec<IndexPair> {
        self.indexes.iter().flat_map(IndexPair::flatten).collect()
    }
}
