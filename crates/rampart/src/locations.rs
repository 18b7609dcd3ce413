//! Turning masks into the cell coordinates reported by failing checks.

use std::fmt;

use serde::Serialize;

use crate::table::{Label, Mask};

/// A single cell: row label and column name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub row: Label,
    pub column: String,
}

impl Location {
    pub fn new(row: impl Into<Label>, column: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, '{}')", self.row, self.column)
    }
}

/// Every marked cell of `mask`, column-major: columns in mask order, rows in
/// index order within each column.
pub fn bad_locations(mask: &Mask) -> Vec<Location> {
    let labels = mask.index().labels();
    mask.columns()
        .flat_map(|(name, flags)| {
            labels
                .iter()
                .zip(flags)
                .filter(|(_, flagged)| **flagged)
                .map(move |(label, _)| Location {
                    row: label.clone(),
                    column: name.to_string(),
                })
        })
        .collect()
}

/// Render locations as `[(1, 'a'), (0, 'b')]`.
pub fn format_locations(locations: &[Location]) -> String {
    let parts: Vec<String> = locations.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}
