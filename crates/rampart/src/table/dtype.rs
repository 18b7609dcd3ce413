//! Physical column data types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Resolution of temporal columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Second,
    Milli,
    Micro,
    Nano,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Second => "s",
            TimeUnit::Milli => "ms",
            TimeUnit::Micro => "us",
            TimeUnit::Nano => "ns",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "s" => Some(TimeUnit::Second),
            "ms" => Some(TimeUnit::Milli),
            "us" => Some(TimeUnit::Micro),
            "ns" => Some(TimeUnit::Nano),
            _ => None,
        }
    }
}

/// Physical storage type of a column.
///
/// Displays and parses using the conventional lowercase names, e.g. `int64`,
/// `datetime64[ns]` or `datetime64[ns, UTC]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DType {
    /// Mixed or arbitrary values.
    Object,
    Bool,
    /// Dedicated string storage.
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex128,
    Datetime64(TimeUnit),
    Datetime64Tz { unit: TimeUnit, tz: String },
    Timedelta64(TimeUnit),
}

impl DType {
    pub fn is_signed_integer(&self) -> bool {
        matches!(self, DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64)
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            DType::UInt8 | DType::UInt16 | DType::UInt32 | DType::UInt64
        )
    }

    pub fn is_integer(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// Booleans, integers and floats.
    pub fn is_real(&self) -> bool {
        matches!(self, DType::Bool) || self.is_integer() || self.is_float()
    }

    /// Real types plus complex.
    pub fn is_numeric(&self) -> bool {
        self.is_real() || matches!(self, DType::Complex128)
    }

    /// Naive or zoned timestamps.
    pub fn is_datetime(&self) -> bool {
        matches!(self, DType::Datetime64(_) | DType::Datetime64Tz { .. })
    }

    pub fn is_timedelta(&self) -> bool {
        matches!(self, DType::Timedelta64(_))
    }

    /// Resolution of a temporal type.
    pub fn unit(&self) -> Option<TimeUnit> {
        match self {
            DType::Datetime64(unit)
            | DType::Datetime64Tz { unit, .. }
            | DType::Timedelta64(unit) => Some(*unit),
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Object => "object",
            DType::Bool => "bool",
            DType::String => "string",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex128 => "complex128",
            DType::Datetime64(unit) => return write!(f, "datetime64[{}]", unit.as_str()),
            DType::Datetime64Tz { unit, tz } => {
                return write!(f, "datetime64[{}, {}]", unit.as_str(), tz);
            }
            DType::Timedelta64(unit) => return write!(f, "timedelta64[{}]", unit.as_str()),
        };
        f.write_str(name)
    }
}

impl FromStr for DType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dtype = match s {
            "object" => DType::Object,
            "bool" => DType::Bool,
            "string" => DType::String,
            "int8" => DType::Int8,
            "int16" => DType::Int16,
            "int32" => DType::Int32,
            "int64" => DType::Int64,
            "uint8" => DType::UInt8,
            "uint16" => DType::UInt16,
            "uint32" => DType::UInt32,
            "uint64" => DType::UInt64,
            "float32" => DType::Float32,
            "float64" => DType::Float64,
            "complex128" => DType::Complex128,
            _ => return parse_temporal(s).ok_or_else(|| format!("unknown dtype '{s}'")),
        };
        Ok(dtype)
    }
}

fn parse_temporal(s: &str) -> Option<DType> {
    if let Some(rest) = s.strip_prefix("timedelta64[") {
        let unit = TimeUnit::parse(rest.strip_suffix(']')?)?;
        return Some(DType::Timedelta64(unit));
    }
    let inner = s.strip_prefix("datetime64[")?.strip_suffix(']')?;
    match inner.split_once(',') {
        Some((unit, tz)) => Some(DType::Datetime64Tz {
            unit: TimeUnit::parse(unit.trim())?,
            tz: tz.trim().to_string(),
        }),
        None => Some(DType::Datetime64(TimeUnit::parse(inner)?)),
    }
}

impl TryFrom<String> for DType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DType> for String {
    fn from(value: DType) -> Self {
        value.to_string()
    }
}
