//! Structural checks: column presence and order, shape, uniqueness.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{fail, format_values, select};
use crate::error::{CheckError, CheckResult, Payload, ValidationFailure};
use crate::table::Tabular;

/// Assert that `table` has `columns`.
///
/// With `exact_cols`, no other columns may be present. With `exact_order`,
/// the listed columns that are present must appear in the table in the same
/// relative order; other columns may sit between them. Every violated
/// condition is reported in one failure.
pub fn has_columns<'t, T: Tabular + ?Sized>(
    table: &'t T,
    columns: &[&str],
    exact_cols: bool,
    exact_order: bool,
) -> CheckResult<'t, T> {
    let table_columns = table.column_names();
    let mut problems = Vec::new();

    let missing: Vec<&str> = columns
        .iter()
        .filter(|c| !table_columns.contains(c))
        .copied()
        .collect();
    if !missing.is_empty() {
        problems.push(format!("table is missing columns: {missing:?}."));
    }

    if exact_cols {
        let extra: Vec<&str> = table_columns
            .iter()
            .filter(|c| !columns.contains(c))
            .copied()
            .collect();
        if !extra.is_empty() {
            problems.push(format!("table has extra columns: {extra:?}."));
        }
    }

    if exact_order {
        let positions: Vec<usize> = columns
            .iter()
            .filter_map(|c| table_columns.iter().position(|t| t == c))
            .collect();
        if !positions.is_sorted() {
            problems.push("table column order does not match the given column order.".to_string());
        }
    }

    if problems.is_empty() {
        return Ok(table);
    }
    fail(ValidationFailure::new("has_columns", problems.join(" ")))
}

/// Expected `(rows, columns)`; `None` or `-1` in either slot matches
/// anything. Other negative sizes are rejected when checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(default)]
    pub rows: Option<i64>,
    #[serde(default)]
    pub cols: Option<i64>,
}

impl Shape {
    pub fn new(rows: i64, cols: i64) -> Self {
        Self {
            rows: Some(rows),
            cols: Some(cols),
        }
    }

    /// Whether a table of this size fits; an invalid size is a configuration
    /// error.
    pub fn matches(&self, (rows, cols): (usize, usize)) -> Result<bool, CheckError> {
        let rows_ok = required(self.rows)?.is_none_or(|r| r == rows);
        let cols_ok = required(self.cols)?.is_none_or(|c| c == cols);
        Ok(rows_ok && cols_ok)
    }
}

/// The size a slot pins down, `None` for a wildcard.
fn required(slot: Option<i64>) -> Result<Option<usize>, CheckError> {
    match slot {
        None | Some(-1) => Ok(None),
        Some(n) => usize::try_from(n).map(Some).map_err(|_| {
            CheckError::config(format!("invalid shape size {n}; use -1 or null for any size"))
        }),
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dim = |d: Option<i64>| match d {
            None | Some(-1) => "*".to_string(),
            Some(n) => n.to_string(),
        };
        write!(f, "({}, {})", dim(self.rows), dim(self.cols))
    }
}

/// Assert that `table` has a known shape.
pub fn is_shape<T: Tabular + ?Sized>(table: &T, shape: Shape) -> CheckResult<'_, T> {
    let (rows, cols) = table.shape();
    if shape.matches((rows, cols))? {
        return Ok(table);
    }
    fail(ValidationFailure::new(
        "is_shape",
        format!("Expected shape: {shape}\n\t\tActual shape:   ({rows}, {cols})"),
    ))
}

/// Assert that the row index has no duplicate labels.
pub fn has_unique_index<T: Tabular + ?Sized>(table: &T) -> CheckResult<'_, T> {
    let index = table.index();
    if index.is_unique() {
        return Ok(table);
    }
    let duplicated = index.duplicated_labels();
    let labels: Vec<String> = duplicated.iter().map(ToString::to_string).collect();
    fail(
        ValidationFailure::new(
            "has_unique_index",
            format!("index has duplicate labels: [{}]", labels.join(", ")),
        )
        .with_payload(Payload::Labels(duplicated)),
    )
}

/// Assert that each listed column (all when `None`) holds distinct values.
/// Stops at the first column with repeats.
pub fn unique<'t, T: Tabular + ?Sized>(
    table: &'t T,
    columns: Option<&[&str]>,
) -> CheckResult<'t, T> {
    for column in select(table, columns)? {
        if column.is_unique() {
            continue;
        }
        let repeated: Vec<_> = column.duplicated().into_iter().cloned().collect();
        let message = format!(
            "Column '{}' contains non-unique values: {}",
            column.name(),
            format_values(&repeated)
        );
        let payload = Payload::Values(IndexMap::from([(column.name().to_string(), repeated)]));
        return fail(ValidationFailure::new("unique", message).with_payload(payload));
    }
    Ok(table)
}
