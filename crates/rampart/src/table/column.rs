//! Named, typed columns and the per-column operations checks rely on.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::dtype::{DType, TimeUnit};
use super::value::Value;

/// Welford accumulator for mean and sample variance in one pass.
#[derive(Debug, Clone, Default)]
struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Sample variance (denominator `n - 1`).
    fn variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as f64)
    }
}

/// A named sequence of values sharing one dtype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    dtype: DType,
    values: Vec<Value>,
}

impl Column {
    /// Create a column, inferring its dtype from the values.
    ///
    /// Integers mixed with floats or nulls widen to `float64` with nulls
    /// stored as `NaN`. Anything that does not fit a single family is
    /// `object`.
    pub fn new<V: Into<Value>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let (dtype, values) = infer(values);
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Create a column with an explicit dtype. Values are stored as given.
    pub fn with_dtype<V: Into<Value>>(
        name: impl Into<String>,
        dtype: DType,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            name: name.into(),
            dtype,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// JSON has no NaN, so float columns read back their nulls as NaN.
    pub(crate) fn nulls_as_nan(mut self) -> Self {
        if self.dtype.is_float() {
            for value in self.values.iter_mut().filter(|v| v.is_null()) {
                *value = Value::Float(f64::NAN);
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> &DType {
        &self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Distinct values in order of first appearance.
    pub fn distinct(&self) -> Vec<&Value> {
        self.values.iter().collect::<IndexSet<_>>().into_iter().collect()
    }

    /// Values that occur more than once, in order of first repeat.
    pub fn duplicated(&self) -> Vec<&Value> {
        let mut seen = HashSet::new();
        let mut repeated = IndexSet::new();
        for value in &self.values {
            if !seen.insert(value) {
                repeated.insert(value);
            }
        }
        repeated.into_iter().collect()
    }

    /// Consecutive differences. The first entry, and any step touching a
    /// missing value, is `None`. Returns `None` when the column holds values
    /// that cannot be subtracted.
    pub fn diff(&self) -> Option<Vec<Option<f64>>> {
        if self
            .values
            .iter()
            .any(|v| !v.is_null() && !v.is_differenceable())
        {
            return None;
        }
        let mut out = Vec::with_capacity(self.values.len());
        if !self.values.is_empty() {
            out.push(None);
        }
        out.extend(self.values.windows(2).map(|w| w[1].delta(&w[0])));
        Some(out)
    }

    fn stats(&self) -> Option<RunningStats> {
        if !self.dtype.is_real() {
            return None;
        }
        let mut stats = RunningStats::default();
        for v in self.values.iter().filter_map(Value::as_f64) {
            if !v.is_nan() {
                stats.add(v);
            }
        }
        Some(stats)
    }

    /// Mean of the non-missing values of a real column.
    pub fn mean(&self) -> Option<f64> {
        self.stats()?.mean()
    }

    /// Sample standard deviation of the non-missing values of a real column.
    pub fn std(&self) -> Option<f64> {
        self.stats()?.variance().map(f64::sqrt)
    }

    pub fn is_unique(&self) -> bool {
        self.distinct().len() == self.values.len()
    }

    /// Membership mask against `candidates`.
    pub fn isin(&self, candidates: &[Value]) -> Vec<bool> {
        let set: HashSet<&Value> = candidates.iter().collect();
        self.values.iter().map(|v| set.contains(v)).collect()
    }
}

fn infer(values: Vec<Value>) -> (DType, Vec<Value>) {
    let present = || values.iter().filter(|v| !v.is_null());
    if present().next().is_none() {
        return (DType::Object, values);
    }
    let has_null = values.iter().any(Value::is_null);

    if present().all(|v| matches!(v, Value::Int(_))) && !has_null {
        return (DType::Int64, values);
    }
    if present().all(|v| matches!(v, Value::UInt(_))) && !has_null {
        return (DType::UInt64, values);
    }
    if present().all(|v| matches!(v, Value::Int(_) | Value::UInt(_) | Value::Float(_))) {
        let widened = values
            .iter()
            .map(|v| Value::Float(v.as_f64().unwrap_or(f64::NAN)))
            .collect();
        return (DType::Float64, widened);
    }
    if present().all(|v| matches!(v, Value::Bool(_))) && !has_null {
        return (DType::Bool, values);
    }
    if present().all(|v| matches!(v, Value::Complex(_))) && !has_null {
        return (DType::Complex128, values);
    }
    if present().all(|v| matches!(v, Value::DateTime(_))) {
        return (DType::Datetime64(TimeUnit::Nano), values);
    }
    if let Some(tz) = common_offset(present()) {
        return (
            DType::Datetime64Tz {
                unit: TimeUnit::Nano,
                tz,
            },
            values,
        );
    }
    if present().all(|v| matches!(v, Value::Duration(_))) {
        return (DType::Timedelta64(TimeUnit::Nano), values);
    }
    (DType::Object, values)
}

/// The shared offset of zoned timestamps, rendered like `+02:00` (`UTC` for zero).
fn common_offset<'a>(mut values: impl Iterator<Item = &'a Value>) -> Option<String> {
    let offset = |dt: &DateTime<FixedOffset>| dt.offset().fix();
    let first = match values.next()? {
        Value::DateTimeTz(dt) => offset(dt),
        _ => return None,
    };
    let same = values.all(|v| matches!(v, Value::DateTimeTz(dt) if offset(dt) == first));
    if !same {
        return None;
    }
    Some(if first.local_minus_utc() == 0 {
        "UTC".to_string()
    } else {
        first.to_string()
    })
}

/// Parse a timestamp in one of the common ISO-like layouts.
pub(crate) fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_dtypes() {
        assert_eq!(Column::new("a", [1, 2, 3]).dtype(), &DType::Int64);
        assert_eq!(Column::new("a", [1.0, 2.5]).dtype(), &DType::Float64);
        assert_eq!(Column::new("a", [true, false]).dtype(), &DType::Bool);
        assert_eq!(Column::new("a", ["x", "y"]).dtype(), &DType::Object);
        assert_eq!(
            Column::new("a", [Value::Int(1), Value::from("x")]).dtype(),
            &DType::Object
        );
    }

    #[test]
    fn test_int_with_null_widens_to_float() {
        let col = Column::new("a", [Some(1), None, Some(3)]);
        assert_eq!(col.dtype(), &DType::Float64);
        assert!(col.values()[1].is_nan());
        assert_eq!(col.values()[0], Value::Float(1.0));
    }

    #[test]
    fn test_distinct_preserves_first_appearance() {
        let col = Column::new("a", ["b", "a", "b", "c"]);
        let distinct: Vec<String> = col.distinct().iter().map(|v| v.to_string()).collect();
        assert_eq!(distinct, vec!["'b'", "'a'", "'c'"]);
        assert!(!col.is_unique());
        assert_eq!(col.duplicated(), vec![&Value::from("b")]);
    }

    #[test]
    fn test_diff() {
        let col = Column::new("a", [1.0, 3.0, f64::NAN, 2.0]);
        assert_eq!(col.diff().unwrap(), vec![None, Some(2.0), None, None]);
        assert!(Column::new("s", ["a", "b"]).diff().is_none());
        assert_eq!(Column::new("e", Vec::<i64>::new()).diff().unwrap(), Vec::<Option<f64>>::new());
    }

    #[test]
    fn test_mean_and_sample_std() {
        let col = Column::new("a", [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((col.mean().unwrap() - 5.0).abs() < 1e-12);
        // sample variance = 32 / 7
        assert!((col.std().unwrap() - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);

        let single = Column::new("b", [1.0]);
        assert_eq!(single.std(), None);
        assert_eq!(Column::new("s", ["x"]).mean(), None);
    }

    #[test]
    fn test_isin() {
        let col = Column::new("a", [1.0, f64::NAN, 3.0]);
        assert_eq!(col.isin(&[Value::Float(f64::NAN)]), vec![false, true, false]);
        assert_eq!(col.isin(&[Value::Int(3)]), vec![false, false, true]);
    }
}
