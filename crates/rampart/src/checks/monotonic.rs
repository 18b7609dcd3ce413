//! Monotonicity checks.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::fail;
use crate::error::{CheckError, CheckResult, Payload, ValidationFailure};
use crate::locations::{bad_locations, format_locations};
use crate::table::{Column, Mask, Tabular};

/// Required direction of a column.
///
/// `increasing: None` accepts a column that is entirely non-decreasing or
/// entirely non-increasing (strictly so when `strict`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monotonic {
    #[serde(default)]
    pub increasing: Option<bool>,
    #[serde(default)]
    pub strict: bool,
}

impl Monotonic {
    pub const fn increasing() -> Self {
        Self {
            increasing: Some(true),
            strict: false,
        }
    }

    pub const fn decreasing() -> Self {
        Self {
            increasing: Some(false),
            strict: false,
        }
    }

    /// Either direction, chosen for the whole column.
    pub const fn either() -> Self {
        Self {
            increasing: None,
            strict: false,
        }
    }

    pub const fn strict(self) -> Self {
        Self { strict: true, ..self }
    }
}

/// Whether a single step `d` goes the required way.
fn step_holds(increasing: bool, strict: bool, d: f64) -> bool {
    match (increasing, strict) {
        (true, true) => d > 0.0,
        (false, true) => d < 0.0,
        (true, false) => d >= 0.0,
        (false, false) => d <= 0.0,
    }
}

/// Flags for the rows of `column` whose step breaks `rule`. The first row
/// and steps touching missing values are never flagged.
fn violations(column: &Column, rule: Monotonic) -> Result<Vec<bool>, CheckError> {
    let diffs = column.diff().ok_or_else(|| {
        CheckError::config(format!(
            "column '{}' of dtype {} cannot be checked for monotonicity",
            column.name(),
            column.dtype()
        ))
    })?;
    let steps: Vec<(usize, f64)> = diffs
        .iter()
        .enumerate()
        .filter_map(|(row, d)| d.map(|d| (row, d)))
        .collect();

    let mut flags = vec![false; column.len()];
    let strict = rule.strict;
    match rule.increasing {
        Some(increasing) => {
            for (row, d) in steps {
                flags[row] = !step_holds(increasing, strict, d);
            }
        }
        None => {
            let rising = steps.iter().all(|&(_, d)| step_holds(true, strict, d));
            let falling = steps.iter().all(|&(_, d)| step_holds(false, strict, d));
            if !(rising || falling) {
                for (row, d) in steps {
                    flags[row] = !step_holds(true, strict, d) || !step_holds(false, strict, d);
                }
            }
        }
    }
    Ok(flags)
}

/// Assert that columns are monotonic.
///
/// `items` gives each checked column its own rule; when `None`, every
/// column is checked with `rule`. Offending rows from all columns are
/// reported together, column by column in table order.
pub fn is_monotonic<'t, T: Tabular + ?Sized>(
    table: &'t T,
    items: Option<&IndexMap<String, Monotonic>>,
    rule: Monotonic,
) -> CheckResult<'t, T> {
    if let Some(items) = items {
        for name in items.keys() {
            table.require(name)?;
        }
    }
    let rules: Vec<(&Column, Monotonic)> = table
        .columns()
        .into_iter()
        .filter_map(|c| match items {
            Some(items) => items.get(c.name()).map(|rule| (c, *rule)),
            None => Some((c, rule)),
        })
        .collect();

    let mut mask = Mask::new(table.index().clone());
    for (column, rule) in rules {
        mask.insert(column.name(), violations(column, rule)?);
    }

    let bad = bad_locations(&mask);
    if bad.is_empty() {
        return Ok(table);
    }
    let message = format!("table is not monotonic at {}", format_locations(&bad));
    fail(ValidationFailure::new("is_monotonic", message).with_payload(Payload::Locations(bad)))
}
