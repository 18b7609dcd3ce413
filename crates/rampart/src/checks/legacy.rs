//! Old check names kept for callers that have not migrated.
//!
//! Each announces its replacement once on the process notice board and then
//! delegates.

use indexmap::IndexMap;

use super::{
    has_no_nans, has_unique_index, has_vals_within_n_std, has_vals_within_range,
    has_vals_within_set,
};
use crate::error::CheckResult;
use crate::notice;
use crate::table::{Tabular, Value};

#[deprecated(since = "0.1.0", note = "renamed to `has_no_nans`")]
pub fn none_missing<'t, T: Tabular + ?Sized>(
    table: &'t T,
    columns: Option<&[&str]>,
) -> CheckResult<'t, T> {
    notice::board().deprecated("none_missing", "has_no_nans");
    has_no_nans(table, columns)
}

#[deprecated(since = "0.1.0", note = "renamed to `has_unique_index`")]
pub fn unique_index<T: Tabular + ?Sized>(table: &T) -> CheckResult<'_, T> {
    notice::board().deprecated("unique_index", "has_unique_index");
    has_unique_index(table)
}

#[deprecated(since = "0.1.0", note = "renamed to `has_vals_within_set`")]
pub fn within_set<'t, T: Tabular + ?Sized>(
    table: &'t T,
    items: &IndexMap<String, Vec<Value>>,
) -> CheckResult<'t, T> {
    notice::board().deprecated("within_set", "has_vals_within_set");
    has_vals_within_set(table, items)
}

#[deprecated(since = "0.1.0", note = "renamed to `has_vals_within_range`")]
pub fn within_range<'t, T: Tabular + ?Sized>(
    table: &'t T,
    items: &IndexMap<String, (Value, Value)>,
) -> CheckResult<'t, T> {
    notice::board().deprecated("within_range", "has_vals_within_range");
    has_vals_within_range(table, items)
}

#[deprecated(since = "0.1.0", note = "renamed to `has_vals_within_n_std`")]
pub fn within_n_std<T: Tabular + ?Sized>(table: &T, n: f64) -> CheckResult<'_, T> {
    notice::board().deprecated("within_n_std", "has_vals_within_n_std");
    has_vals_within_n_std(table, n)
}
