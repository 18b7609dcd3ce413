//! Physical and semantic dtype checks. Both stop at the first mismatch.

use indexmap::IndexMap;

use super::fail;
use crate::classify::SemanticDType;
use crate::error::{CheckError, CheckResult, ValidationFailure};
use crate::table::{DType, Tabular};

/// Assert that columns have exactly the given physical dtypes.
pub fn has_dtypes<'t, T: Tabular + ?Sized>(
    table: &'t T,
    items: &IndexMap<String, DType>,
) -> CheckResult<'t, T> {
    for (name, expected) in items {
        let column = table.require(name)?;
        if column.dtype() != expected {
            return fail(ValidationFailure::new(
                "has_dtypes",
                format!(
                    "{name} has the wrong dtype. Should be ({expected}), is ({})",
                    column.dtype()
                ),
            ));
        }
    }
    Ok(table)
}

/// Assert that columns belong to the named semantic dtype families, e.g.
/// `"int"` for any integer width.
///
/// Every name is resolved before any column is inspected, so an unknown
/// name is always a configuration error.
pub fn has_schema<'t, T: Tabular + ?Sized>(
    table: &'t T,
    schema: &IndexMap<String, String>,
) -> CheckResult<'t, T> {
    let resolved = schema
        .iter()
        .map(|(name, kind)| Ok((name, kind.parse::<SemanticDType>()?)))
        .collect::<Result<Vec<_>, CheckError>>()?;

    for (name, kind) in resolved {
        let column = table.require(name)?;
        if !kind.matches(column) {
            return fail(ValidationFailure::new(
                "has_schema",
                format!(
                    "{name} has the wrong dtype. Should be ({kind}), is ({})",
                    column.dtype()
                ),
            ));
        }
    }
    Ok(table)
}
