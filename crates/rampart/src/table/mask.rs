//! Boolean masks aligned to a table.

use indexmap::IndexMap;
use serde::Serialize;

use super::frame::Index;

/// Boolean columns sharing a table's index, marking cells of interest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mask {
    index: Index,
    columns: IndexMap<String, Vec<bool>>,
}

impl Mask {
    pub fn new(index: Index) -> Self {
        Self {
            index,
            columns: IndexMap::new(),
        }
    }

    /// Add or replace a column. Its length must match the index.
    pub fn insert(&mut self, name: impl Into<String>, flags: Vec<bool>) {
        debug_assert_eq!(flags.len(), self.index.len());
        self.columns.insert(name.into(), flags);
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn column(&self, name: &str) -> Option<&[bool]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Columns in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[bool])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
