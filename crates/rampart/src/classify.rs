//! Semantic dtype names and the column predicates they stand for.

use std::fmt;
use std::str::FromStr;

use crate::error::CheckError;
use crate::table::{Column, DType, TimeUnit, Value};

/// A family of physical dtypes named by a canonical string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticDType {
    Object,
    Bool,
    String,
    Numeric,
    Float,
    Complex,
    /// Any integer width, signed or unsigned.
    Int,
    Int64,
    SignedInt,
    UnsignedInt,
    /// Naive or zoned timestamps.
    Datetime,
    /// Naive timestamps of any resolution.
    Datetime64,
    /// Nanosecond timestamps, naive or zoned.
    Datetime64Ns,
    Datetime64Tz,
    Timedelta64,
    Timedelta64Ns,
}

impl SemanticDType {
    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            SemanticDType::Object => "object",
            SemanticDType::Bool => "bool",
            SemanticDType::String => "string",
            SemanticDType::Numeric => "numeric",
            SemanticDType::Float => "float",
            SemanticDType::Complex => "complex",
            SemanticDType::Int => "int",
            SemanticDType::Int64 => "int64",
            SemanticDType::SignedInt => "signed_int",
            SemanticDType::UnsignedInt => "unsigned_int",
            SemanticDType::Datetime => "datetime",
            SemanticDType::Datetime64 => "datetime64",
            SemanticDType::Datetime64Ns => "datetime64_ns",
            SemanticDType::Datetime64Tz => "datetime64tz",
            SemanticDType::Timedelta64 => "timedelta64",
            SemanticDType::Timedelta64Ns => "timedelta64_ns",
        }
    }

    /// Whether `column` belongs to this family.
    pub fn matches(&self, column: &Column) -> bool {
        let dtype = column.dtype();
        match self {
            SemanticDType::Object => *dtype == DType::Object,
            SemanticDType::Bool => *dtype == DType::Bool,
            SemanticDType::String => match dtype {
                DType::String => true,
                DType::Object => column
                    .values()
                    .iter()
                    .all(|v| matches!(v, Value::Str(_) | Value::Null)),
                _ => false,
            },
            SemanticDType::Numeric => dtype.is_numeric(),
            SemanticDType::Float => dtype.is_float(),
            SemanticDType::Complex => *dtype == DType::Complex128,
            SemanticDType::Int => dtype.is_integer(),
            SemanticDType::Int64 => *dtype == DType::Int64,
            SemanticDType::SignedInt => dtype.is_signed_integer(),
            SemanticDType::UnsignedInt => dtype.is_unsigned_integer(),
            SemanticDType::Datetime => dtype.is_datetime(),
            SemanticDType::Datetime64 => matches!(dtype, DType::Datetime64(_)),
            SemanticDType::Datetime64Ns => {
                dtype.is_datetime() && dtype.unit() == Some(TimeUnit::Nano)
            }
            SemanticDType::Datetime64Tz => matches!(dtype, DType::Datetime64Tz { .. }),
            SemanticDType::Timedelta64 => dtype.is_timedelta(),
            SemanticDType::Timedelta64Ns => *dtype == DType::Timedelta64(TimeUnit::Nano),
        }
    }
}

impl fmt::Display for SemanticDType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SemanticDType {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "object" => SemanticDType::Object,
            "bool" => SemanticDType::Bool,
            "string" => SemanticDType::String,
            "numeric" => SemanticDType::Numeric,
            "float" => SemanticDType::Float,
            "complex" => SemanticDType::Complex,
            "int" => SemanticDType::Int,
            "int64" => SemanticDType::Int64,
            "signed_int" | "signed-int" | "signed int" | "signedint" | "sint" => {
                SemanticDType::SignedInt
            }
            "unsigned_int" | "unsigned-int" | "unsigned int" | "unsignedint" | "uint" => {
                SemanticDType::UnsignedInt
            }
            "datetime" => SemanticDType::Datetime,
            "datetime64" => SemanticDType::Datetime64,
            "datetime64_ns" => SemanticDType::Datetime64Ns,
            "datetime64tz" | "datetime64_tz" => SemanticDType::Datetime64Tz,
            "timedelta64" => SemanticDType::Timedelta64,
            "timedelta64_ns" => SemanticDType::Timedelta64Ns,
            other => {
                return Err(CheckError::config(format!(
                    "unsupported semantic dtype '{other}'"
                )));
            }
        };
        Ok(kind)
    }
}

/// Whether `column` matches the semantic dtype called `name`.
pub fn dtype_check(column: &Column, name: &str) -> Result<bool, CheckError> {
    Ok(name.parse::<SemanticDType>()?.matches(column))
}
