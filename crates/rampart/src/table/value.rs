//! Cell values and row labels.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::{self, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A complex number stored in a `complex128` column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// A single cell value.
///
/// Equality is membership equality: `NaN` equals `NaN`, and numbers compare
/// by value across integer and float variants (`Int(1) == Float(1.0)`).
/// Ordering is only defined between comparable kinds, see [`Value::compare`].
///
/// In JSON, scalars and strings map to themselves and every JSON string reads
/// back as [`Value::Str`]. The remaining kinds are single-key objects:
/// `{"datetime": "2024-01-01T00:00:00"}`, `{"datetime_tz": "<rfc3339>"}`,
/// `{"duration_ns": 1000}` and `{"complex": [1.0, -2.0]}`.
#[derive(Debug, Clone)]
pub enum Value {
    /// Missing value.
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Complex(Complex),
    /// Naive timestamp (no time zone).
    DateTime(NaiveDateTime),
    /// Time zone aware timestamp.
    DateTimeTz(DateTime<FixedOffset>),
    Str(String),
    Duration(TimeDelta),
}

/// Canonical hashing/equality key for a value.
#[derive(PartialEq, Eq, Hash)]
enum Key<'a> {
    Null,
    Bool(bool),
    Integral(i128),
    Float(u64),
    NaN,
    Complex(u64, u64),
    DateTime(NaiveDateTime),
    DateTimeTz(DateTime<FixedOffset>),
    Str(&'a str),
    Duration(TimeDelta),
}

/// Bit pattern of a float with `-0.0` folded into `0.0`.
fn float_bits(f: f64) -> u64 {
    if f == 0.0 { 0.0f64.to_bits() } else { f.to_bits() }
}

impl Value {
    fn key(&self) -> Key<'_> {
        match self {
            Value::Null => Key::Null,
            Value::Bool(b) => Key::Bool(*b),
            Value::Int(i) => Key::Integral(i128::from(*i)),
            Value::UInt(u) => Key::Integral(i128::from(*u)),
            Value::Float(f) if f.is_nan() => Key::NaN,
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e38 {
                    Key::Integral(*f as i128)
                } else {
                    Key::Float(float_bits(*f))
                }
            }
            Value::Complex(c) => Key::Complex(float_bits(c.re), float_bits(c.im)),
            Value::DateTime(dt) => Key::DateTime(*dt),
            Value::DateTimeTz(dt) => Key::DateTimeTz(*dt),
            Value::Str(s) => Key::Str(s),
            Value::Duration(d) => Key::Duration(*d),
        }
    }

    /// Returns true for the missing value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for a floating point `NaN`.
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_nan())
    }

    /// Returns true for null or `NaN`.
    pub fn is_missing(&self) -> bool {
        self.is_null() || self.is_nan()
    }

    /// Returns true for booleans, integers and real floats.
    pub fn is_real(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::UInt(_) | Value::Float(_)
        )
    }

    /// Numeric view of a real value (`true` is 1).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Bool(b) => Some(i128::from(*b)),
            Value::Int(i) => Some(i128::from(*i)),
            Value::UInt(u) => Some(i128::from(*u)),
            _ => None,
        }
    }

    /// Returns true when consecutive values of this kind can be differenced.
    pub fn is_differenceable(&self) -> bool {
        self.is_real()
            || matches!(
                self,
                Value::DateTime(_) | Value::DateTimeTz(_) | Value::Duration(_)
            )
    }

    /// `self - prev` as a float, `None` when either side is missing or the
    /// kinds cannot be subtracted. Temporal differences are in nanoseconds.
    pub fn delta(&self, prev: &Value) -> Option<f64> {
        let nanos = |d: TimeDelta| {
            d.num_nanoseconds()
                .map(|n| n as f64)
                .unwrap_or_else(|| d.num_microseconds().unwrap_or(i64::MAX) as f64 * 1e3)
        };
        let d = match (self, prev) {
            (Value::DateTime(a), Value::DateTime(b)) => nanos(*a - *b),
            (Value::DateTimeTz(a), Value::DateTimeTz(b)) => nanos(*a - *b),
            (Value::Duration(a), Value::Duration(b)) => nanos(*a - *b),
            (a, b) => match (a.as_i128(), b.as_i128()) {
                (Some(x), Some(y)) => (x - y) as f64,
                _ => a.as_f64()? - b.as_f64()?,
            },
        };
        (!d.is_nan()).then_some(d)
    }

    /// Orders two values of comparable kinds. Returns `None` for nulls,
    /// `NaN` and mismatched kinds.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::DateTimeTz(a), Value::DateTimeTz(b)) => Some(a.cmp(b)),
            (Value::Duration(a), Value::Duration(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_i128(), b.as_i128()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::Float(x) if x.is_nan() => write!(f, "NaN"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Complex(c) => write!(f, "({}{:+}j)", c.re, c.im),
            Value::DateTime(dt) => write!(f, "{dt}"),
            Value::DateTimeTz(dt) => write!(f, "{dt}"),
            Value::Str(s) => write!(f, "'{s}'"),
            Value::Duration(d) => write!(f, "{d}"),
        }
    }
}

const TAGS: &[&str] = &["datetime", "datetime_tz", "duration_ns", "complex"];

fn tagged<S, V>(serializer: S, tag: &'static str, value: &V) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(tag, value)?;
    map.end()
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::UInt(u) => serializer.serialize_u64(*u),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::DateTime(dt) => tagged(serializer, "datetime", dt),
            Value::DateTimeTz(dt) => tagged(serializer, "datetime_tz", dt),
            Value::Complex(c) => tagged(serializer, "complex", &(c.re, c.im)),
            Value::Duration(d) => {
                let nanos = d.num_nanoseconds().ok_or_else(|| {
                    <S::Error as ser::Error>::custom(format!("duration {d} overflows nanoseconds"))
                })?;
                tagged(serializer, "duration_ns", &nanos)
            }
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a cell value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(i64::try_from(v).map_or(Value::UInt(v), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Str(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::Str(v))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let Some(tag) = map.next_key::<String>()? else {
            return Err(de::Error::invalid_length(0, &"a single-key value object"));
        };
        let value = match tag.as_str() {
            "datetime" => Value::DateTime(map.next_value()?),
            "datetime_tz" => Value::DateTimeTz(map.next_value()?),
            "duration_ns" => Value::Duration(TimeDelta::nanoseconds(map.next_value()?)),
            "complex" => {
                let (re, im): (f64, f64) = map.next_value()?;
                Value::Complex(Complex::new(re, im))
            }
            other => return Err(de::Error::unknown_field(other, TAGS)),
        };
        if map.next_key::<IgnoredAny>()?.is_some() {
            let msg = format!("'{tag}' value object must have a single key");
            return Err(de::Error::custom(msg));
        }
        Ok(value)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Complex> for Value {
    fn from(v: Complex) -> Self {
        Value::Complex(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::DateTimeTz(v)
    }
}

impl From<TimeDelta> for Value {
    fn from(v: TimeDelta) -> Self {
        Value::Duration(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A row identifier in a table index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Str(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(i) => write!(f, "{i}"),
            Label::Str(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<i64> for Label {
    fn from(v: i64) -> Self {
        Label::Int(v)
    }
}

impl From<i32> for Label {
    fn from(v: i32) -> Self {
        Label::Int(i64::from(v))
    }
}

impl From<usize> for Label {
    fn from(v: usize) -> Self {
        Label::Int(v as i64)
    }
}

impl From<&str> for Label {
    fn from(v: &str) -> Self {
        Label::Str(v.to_string())
    }
}

impl From<String> for Label {
    fn from(v: String) -> Self {
        Label::Str(v)
    }
}
