//! Value-level checks: excluded values, set and range membership, outliers.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::{fail, format_value_map, format_values, select};
use crate::error::{CheckError, CheckResult, Payload, ValidationFailure};
use crate::locations::{bad_locations, format_locations};
use crate::table::{Column, Mask, Tabular, Value};

fn exclude<'t, T: Tabular + ?Sized>(
    check: &'static str,
    table: &'t T,
    values: &[Value],
    columns: Option<&[&str]>,
) -> CheckResult<'t, T> {
    let mut mask = Mask::new(table.index().clone());
    for column in select(table, columns)? {
        mask.insert(column.name(), column.isin(values));
    }

    let bad = bad_locations(&mask);
    if bad.is_empty() {
        return Ok(table);
    }
    let message = format!(
        "found {} of {} at {}",
        bad.len(),
        format_values(values),
        format_locations(&bad)
    );
    fail(ValidationFailure::new(check, message).with_payload(Payload::Locations(bad)))
}

/// Assert that none of `values` occur in `columns` (all when `None`).
/// Reports every offending cell.
pub fn has_no_x<'t, T: Tabular + ?Sized>(
    table: &'t T,
    values: &[Value],
    columns: Option<&[&str]>,
) -> CheckResult<'t, T> {
    exclude("has_no_x", table, values, columns)
}

/// Assert there are no `NaN`s.
pub fn has_no_nans<'t, T: Tabular + ?Sized>(
    table: &'t T,
    columns: Option<&[&str]>,
) -> CheckResult<'t, T> {
    exclude("has_no_nans", table, &[Value::Float(f64::NAN)], columns)
}

/// Assert there are no nulls.
pub fn has_no_nones<'t, T: Tabular + ?Sized>(
    table: &'t T,
    columns: Option<&[&str]>,
) -> CheckResult<'t, T> {
    exclude("has_no_nones", table, &[Value::Null], columns)
}

/// Assert there is no positive infinity.
pub fn has_no_infs<'t, T: Tabular + ?Sized>(
    table: &'t T,
    columns: Option<&[&str]>,
) -> CheckResult<'t, T> {
    exclude("has_no_infs", table, &[Value::Float(f64::INFINITY)], columns)
}

/// Assert there is no negative infinity.
pub fn has_no_neg_infs<'t, T: Tabular + ?Sized>(
    table: &'t T,
    columns: Option<&[&str]>,
) -> CheckResult<'t, T> {
    exclude("has_no_neg_infs", table, &[Value::Float(f64::NEG_INFINITY)], columns)
}

/// Assert that every required value appears somewhere in its column.
///
/// All columns are inspected before failing; the payload maps each
/// offending column to the values it lacks.
pub fn has_set_within_vals<'t, T: Tabular + ?Sized>(
    table: &'t T,
    items: &IndexMap<String, Vec<Value>>,
) -> CheckResult<'t, T> {
    let mut missing: IndexMap<String, Vec<Value>> = IndexMap::new();
    for (name, required) in items {
        let column = table.require(name)?;
        let present: HashSet<&Value> = column.distinct().into_iter().collect();
        let absent: Vec<Value> = required
            .iter()
            .filter(|v| !present.contains(v))
            .cloned()
            .collect();
        if !absent.is_empty() {
            missing.insert(name.clone(), absent);
        }
    }

    if missing.is_empty() {
        return Ok(table);
    }
    let message = format!(
        "The following column: value pairs are missing: {}",
        format_value_map(&missing)
    );
    fail(
        ValidationFailure::new("has_set_within_vals", message)
            .with_payload(Payload::Values(missing)),
    )
}

/// Failure for the entries of `column` flagged in `flags`.
fn masked(
    table: &(impl Tabular + ?Sized),
    column: &Column,
    flags: Vec<bool>,
) -> (Mask, Vec<Value>) {
    let values = column
        .values()
        .iter()
        .zip(&flags)
        .filter(|(_, bad)| **bad)
        .map(|(v, _)| v.clone())
        .collect();
    let mut mask = Mask::new(table.index().clone());
    mask.insert(column.name(), flags);
    (mask, values)
}

/// Assert that each column only holds values from its allowed set.
/// Stops at the first offending column.
pub fn has_vals_within_set<'t, T: Tabular + ?Sized>(
    table: &'t T,
    items: &IndexMap<String, Vec<Value>>,
) -> CheckResult<'t, T> {
    for (name, allowed) in items {
        let column = table.require(name)?;
        let outside: Vec<bool> = column.isin(allowed).into_iter().map(|ok| !ok).collect();
        if !outside.contains(&true) {
            continue;
        }
        let (mask, values) = masked(table, column, outside);
        let message = format!(
            "Not in set: column '{}' has values outside {}: {}",
            name,
            format_values(allowed),
            format_values(&values)
        );
        return fail(
            ValidationFailure::new("has_vals_within_set", message)
                .with_payload(Payload::Masked { mask, values }),
        );
    }
    Ok(table)
}

/// Assert that each column lies within its inclusive `(low, high)` bounds.
/// Missing values are never out of range. Stops at the first offending
/// column.
pub fn has_vals_within_range<'t, T: Tabular + ?Sized>(
    table: &'t T,
    items: &IndexMap<String, (Value, Value)>,
) -> CheckResult<'t, T> {
    for (name, (low, high)) in items {
        let column = table.require(name)?;
        let outside = column
            .values()
            .iter()
            .map(|v| outside_range(v, low, high))
            .collect::<Result<Vec<bool>, _>>()
            .map_err(|v| {
                CheckError::config(format!(
                    "column '{name}' value {v} is not comparable with range [{low}, {high}]"
                ))
            })?;
        if !outside.contains(&true) {
            continue;
        }
        let (mask, values) = masked(table, column, outside);
        let message = format!(
            "Outside range: column '{}' has values outside [{}, {}]: {}",
            name,
            low,
            high,
            format_values(&values)
        );
        return fail(
            ValidationFailure::new("has_vals_within_range", message)
                .with_payload(Payload::Masked { mask, values }),
        );
    }
    Ok(table)
}

/// `v < low || v > high`; the offending value when it cannot be compared.
fn outside_range<'a>(v: &'a Value, low: &Value, high: &Value) -> Result<bool, &'a Value> {
    if v.is_missing() {
        return Ok(false);
    }
    let below = v.compare(low).ok_or(v)?.is_lt();
    let above = v.compare(high).ok_or(v)?.is_gt();
    Ok(below || above)
}

/// Assert that every value of every real column lies strictly within `n`
/// sample standard deviations of its column mean.
///
/// A value is an outlier when `|v - mean| >= n * std`. Columns with fewer
/// than two non-missing values are skipped, as are missing cells. All
/// outliers across all columns are reported.
pub fn has_vals_within_n_std<T: Tabular + ?Sized>(table: &T, n: f64) -> CheckResult<'_, T> {
    let mut mask = Mask::new(table.index().clone());
    for column in table.columns() {
        let (Some(mean), Some(std)) = (column.mean(), column.std()) else {
            continue;
        };
        let limit = n * std;
        let flags = column
            .values()
            .iter()
            .map(|v| match v.as_f64() {
                Some(x) if !x.is_nan() => (x - mean).abs() >= limit,
                _ => false,
            })
            .collect();
        mask.insert(column.name(), flags);
    }

    let bad = bad_locations(&mask);
    if bad.is_empty() {
        return Ok(table);
    }
    let message = format!(
        "{} value(s) outside {} standard deviations: {}",
        bad.len(),
        n,
        format_locations(&bad)
    );
    fail(
        ValidationFailure::new("has_vals_within_n_std", message)
            .with_payload(Payload::Locations(bad)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::Location;
    use crate::table::Table;

    fn nan_table() -> Table {
        Table::from_columns([
            Column::new("a", [1.0, f64::NAN, 3.0]),
            Column::new("b", [f64::NAN, 5.0, 6.0]),
        ])
        .unwrap()
    }

    fn items<V: Clone>(pairs: &[(&str, V)]) -> IndexMap<String, V> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_has_no_nans_aggregates_column_major() {
        let table = nan_table();
        let err = has_no_nans(&table, None).unwrap_err();
        let failure = err.failure().unwrap();
        assert_eq!(failure.check, "has_no_nans");
        assert_eq!(
            failure.locations().unwrap(),
            &[Location::new(1, "a"), Location::new(0, "b")]
        );
    }

    #[test]
    fn test_has_no_nans_column_subset() {
        let table = Table::from_columns([
            Column::new("a", [1.0, 2.0]),
            Column::new("b", [f64::NAN, 5.0]),
        ])
        .unwrap();
        assert!(has_no_nans(&table, Some(&["a"])).is_ok());
        assert!(has_no_nans(&table, Some(&["b"])).is_err());
    }

    #[test]
    fn test_has_no_x_custom_values() {
        let table = Table::from_columns([
            Column::new("a", ["ok", "bad", "ok"]),
            Column::new("b", ["bad", "ok", "worse"]),
        ])
        .unwrap();
        let values = [Value::from("bad"), Value::from("worse")];
        let err = has_no_x(&table, &values, None).unwrap_err();
        assert_eq!(
            err.failure().unwrap().locations().unwrap(),
            &[Location::new(1, "a"), Location::new(0, "b"), Location::new(2, "b")]
        );
        assert!(has_no_x(&table, &[], None).is_ok());
    }

    #[test]
    fn test_has_no_nones_and_infs() {
        let table = Table::from_columns([
            Column::new("s", [Some("x"), None]),
            Column::new("f", [f64::INFINITY, f64::NEG_INFINITY]),
        ])
        .unwrap();
        let nones = has_no_nones(&table, None).unwrap_err();
        assert_eq!(nones.failure().unwrap().locations().unwrap(), &[Location::new(1, "s")]);
        let infs = has_no_infs(&table, None).unwrap_err();
        assert_eq!(infs.failure().unwrap().locations().unwrap(), &[Location::new(0, "f")]);
        let neg = has_no_neg_infs(&table, None).unwrap_err();
        assert_eq!(neg.failure().unwrap().locations().unwrap(), &[Location::new(1, "f")]);
    }

    #[test]
    fn test_has_set_within_vals_collects_all_columns() {
        let table = Table::from_columns([
            Column::new("a", [1, 2, 3]),
            Column::new("b", ["a", "b", "c"]),
        ])
        .unwrap();
        let ok = items(&[("a", vec![Value::Int(1), Value::Int(2)])]);
        assert!(has_set_within_vals(&table, &ok).is_ok());

        let bad = items(&[
            ("a", vec![Value::Int(1), Value::Int(9)]),
            ("b", vec![Value::from("a"), Value::from("d")]),
        ]);
        let err = has_set_within_vals(&table, &bad).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The following column: value pairs are missing: {'a': [9], 'b': ['d']}"
        );
    }

    #[test]
    fn test_has_vals_within_set_fails_fast() {
        let table = Table::from_columns([
            Column::new("a", [1, 2, 3]),
            Column::new("b", ["x", "y", "z"]),
        ])
        .unwrap();
        let allowed = items(&[
            ("a", vec![Value::Int(1), Value::Int(2)]),
            ("b", vec![Value::from("x")]),
        ]);
        let err = has_vals_within_set(&table, &allowed).unwrap_err();
        match &err.failure().unwrap().payload {
            Payload::Masked { mask, values } => {
                assert_eq!(mask.column("a").unwrap(), &[false, false, true]);
                assert!(mask.column("b").is_none());
                assert_eq!(values, &vec![Value::Int(3)]);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_has_vals_within_range_inclusive() {
        let table = Table::from_columns([
            Column::new("a", [1, 2, 3]),
            Column::new("b", ["a", "b", "c"]),
        ])
        .unwrap();
        let ok = items(&[("a", (Value::Int(1), Value::Int(3)))]);
        assert!(has_vals_within_range(&table, &ok).is_ok());

        let bad = items(&[
            ("a", (Value::Int(0), Value::Int(3))),
            ("b", (Value::from("a"), Value::from("b"))),
        ]);
        let err = has_vals_within_range(&table, &bad).unwrap_err();
        match &err.failure().unwrap().payload {
            Payload::Masked { mask, .. } => {
                assert_eq!(mask.column("b").unwrap(), &[false, false, true]);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_has_vals_within_range_incomparable_bounds() {
        let table = Table::from_columns([Column::new("b", ["a", "b"])]).unwrap();
        let bad = items(&[("b", (Value::Int(0), Value::Int(3)))]);
        assert!(has_vals_within_range(&table, &bad).unwrap_err().is_configuration());
    }

    #[test]
    fn test_has_vals_within_range_skips_missing() {
        let table = Table::from_columns([Column::new("a", [1.0, f64::NAN])]).unwrap();
        let bounds = items(&[("a", (Value::Int(0), Value::Int(2)))]);
        assert!(has_vals_within_range(&table, &bounds).is_ok());
    }

    #[test]
    fn test_has_vals_within_n_std() {
        let mut values = vec![10.0; 20];
        values.push(10.5);
        values.push(100.0);
        let table = Table::from_columns([
            Column::new("x", values),
            Column::new("label", vec!["q"; 22]),
        ])
        .unwrap();

        let err = has_vals_within_n_std(&table, 3.0).unwrap_err();
        assert_eq!(err.failure().unwrap().locations().unwrap(), &[Location::new(21, "x")]);
        assert!(has_vals_within_n_std(&table, 10.0).is_ok());
    }

    #[test]
    fn test_has_vals_within_n_std_aggregates_columns() {
        let mut a = vec![0.0; 30];
        a[3] = 50.0;
        let mut b = vec![1.0; 30];
        b[7] = -80.0;
        let table = Table::from_columns([Column::new("a", a), Column::new("b", b)]).unwrap();
        let err = has_vals_within_n_std(&table, 3.0).unwrap_err();
        assert_eq!(
            err.failure().unwrap().locations().unwrap(),
            &[Location::new(3, "a"), Location::new(7, "b")]
        );
    }
}
