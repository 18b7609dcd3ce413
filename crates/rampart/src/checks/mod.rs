//! Predicate checks over tables.
//!
//! Every check takes the table first and returns it untouched on success,
//! so checks chain with `?`:
//!
//! ```
//! use rampart::checks::{has_no_nans, is_shape, Shape};
//! use rampart::table::{Column, Table};
//!
//! let table = Table::from_columns([Column::new("a", [1.0, 2.0])])?;
//! let table = has_no_nans(is_shape(&table, Shape::new(-1, 1))?, None)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod aggregate;
mod columns;
mod dtypes;
mod legacy;
mod monotonic;
mod relations;
mod suite;
mod values;

use indexmap::IndexMap;

use crate::error::{CheckError, ValidationFailure};
use crate::table::{Column, Tabular, Value};

pub use aggregate::{custom_check, multi_check, multi_check_with};
pub use columns::{has_columns, has_unique_index, is_shape, unique, Shape};
pub use dtypes::{has_dtypes, has_schema};
#[allow(deprecated)]
pub use legacy::{none_missing, unique_index, within_n_std, within_range, within_set};
pub use monotonic::{is_monotonic, Monotonic};
pub use relations::{is_same_as, one_to_many, EqualityOptions};
pub use suite::{Check, CheckSuite, CustomCheck};
pub use values::{
    has_no_infs, has_no_nans, has_no_neg_infs, has_no_nones, has_no_x, has_set_within_vals,
    has_vals_within_n_std, has_vals_within_range, has_vals_within_set,
};

/// Log and wrap a failure.
fn fail<T>(failure: ValidationFailure) -> Result<T, CheckError> {
    tracing::debug!(check = %failure.check, "check failed: {}", failure.message);
    Err(failure.into())
}

/// The columns named by `columns`, or every column when `None`.
fn select<'a, T: Tabular + ?Sized>(
    table: &'a T,
    columns: Option<&[&str]>,
) -> Result<Vec<&'a Column>, CheckError> {
    match columns {
        Some(names) => names.iter().map(|name| table.require(name)).collect(),
        None => Ok(table.columns()),
    }
}

/// Render values as `[1, 'x']`.
fn format_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> String {
    let parts: Vec<String> = values.into_iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Render a column map as `{'b': ['d']}`.
fn format_value_map(map: &IndexMap<String, Vec<Value>>) -> String {
    let parts: Vec<String> = map
        .iter()
        .map(|(column, values)| format!("'{}': {}", column, format_values(values)))
        .collect();
    format!("{{{}}}", parts.join(", "))
}
