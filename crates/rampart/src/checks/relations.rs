//! Checks relating columns to each other, or tables to tables.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::{fail, format_values};
use crate::error::{CheckResult, Payload, ValidationFailure};
use crate::table::{Column, Tabular, Value};

/// Assert that every value of `many_column` maps to exactly one value of
/// `unit_column`, e.g. each employee works in a single department.
///
/// Fails on the first `many_column` value (in order of appearance) that
/// pairs with more than one unit value.
pub fn one_to_many<'t, T: Tabular + ?Sized>(
    table: &'t T,
    unit_column: &str,
    many_column: &str,
) -> CheckResult<'t, T> {
    let unit = table.require(unit_column)?;
    let many = table.require(many_column)?;

    let mut pairs: IndexMap<&Value, IndexSet<&Value>> = IndexMap::new();
    for (m, u) in many.values().iter().zip(unit.values()) {
        pairs.entry(m).or_default().insert(u);
    }

    for (m, units) in pairs {
        if units.len() < 2 {
            continue;
        }
        let units: Vec<Value> = units.into_iter().cloned().collect();
        let message = format!(
            "{m} in {many_column} has multiple values for {unit_column}: {}",
            format_values(&units)
        );
        let payload = Payload::Values(IndexMap::from([
            (many_column.to_string(), vec![m.clone()]),
            (unit_column.to_string(), units),
        ]));
        return fail(ValidationFailure::new("one_to_many", message).with_payload(payload));
    }
    Ok(table)
}

/// Knobs for [`is_same_as`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualityOptions {
    /// Require identical column dtypes.
    pub check_dtype: bool,
    /// Match columns by name rather than position.
    pub ignore_column_order: bool,
    /// Compare floats exactly instead of with `rtol`/`atol`.
    pub check_exact: bool,
    pub rtol: f64,
    pub atol: f64,
}

impl Default for EqualityOptions {
    fn default() -> Self {
        Self {
            check_dtype: true,
            ignore_column_order: false,
            check_exact: false,
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

fn values_match(left: &Value, right: &Value, options: &EqualityOptions) -> bool {
    if left == right {
        return true;
    }
    if options.check_exact || !left.is_real() || !right.is_real() {
        return false;
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) if a.is_finite() && b.is_finite() => {
            (a - b).abs() <= options.atol + options.rtol * b.abs()
        }
        _ => false,
    }
}

fn column_difference(left: &Column, right: &Column, options: &EqualityOptions) -> Option<String> {
    if options.check_dtype && left.dtype() != right.dtype() {
        return Some(format!(
            "attributes of column '{}' differ: dtype left {}, right {}",
            left.name(),
            left.dtype(),
            right.dtype()
        ));
    }

    let differing: Vec<usize> = left
        .values()
        .iter()
        .zip(right.values())
        .enumerate()
        .filter(|(_, (l, r))| !values_match(l, r, options))
        .map(|(row, _)| row)
        .collect();
    let first = *differing.first()?;
    Some(format!(
        "values of column '{}' differ ({:.1} %): first at position {}, left {}, right {}",
        left.name(),
        100.0 * differing.len() as f64 / left.len() as f64,
        first,
        left.values()[first],
        right.values()[first]
    ))
}

/// First difference between two tables, if any.
fn table_difference<T: Tabular + ?Sized, U: Tabular + ?Sized>(
    left: &T,
    right: &U,
    options: &EqualityOptions,
) -> Option<String> {
    if left.shape() != right.shape() {
        return Some(format!(
            "table shapes differ: left {:?}, right {:?}",
            left.shape(),
            right.shape()
        ));
    }

    let left_names = left.column_names();
    let right_names = right.column_names();
    let same_columns = if options.ignore_column_order {
        let mut l = left_names.clone();
        let mut r = right_names.clone();
        l.sort_unstable();
        r.sort_unstable();
        l == r
    } else {
        left_names == right_names
    };
    if !same_columns {
        return Some(format!(
            "column names differ: left {left_names:?}, right {right_names:?}"
        ));
    }

    let (left_index, right_index) = (left.index().labels(), right.index().labels());
    if let Some(pos) = left_index.iter().zip(right_index).position(|(l, r)| l != r) {
        return Some(format!(
            "index values differ: first at position {pos}, left {}, right {}",
            left_index[pos], right_index[pos]
        ));
    }

    left_names.into_iter().find_map(|name| {
        let l = left.column(name)?;
        let r = right.column(name)?;
        column_difference(l, r, options)
    })
}

/// Assert that `table` equals `other`: values, dtypes, column order and
/// index, as tuned by `options`. The underlying difference is attached as
/// the failure's cause.
pub fn is_same_as<'t, T: Tabular + ?Sized, U: Tabular + ?Sized>(
    table: &'t T,
    other: &U,
    options: &EqualityOptions,
) -> CheckResult<'t, T> {
    match table_difference(table, other, options) {
        None => Ok(table),
        Some(difference) => fail(
            ValidationFailure::new("is_same_as", "tables are not equal")
                .with_cause(ValidationFailure::new("is_same_as", difference)),
        ),
    }
}
