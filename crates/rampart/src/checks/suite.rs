//! Checks as data: a serializable check plus its parameters, and suites of
//! them loaded from JSON.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::*;
use crate::error::{CheckError, CheckResult, Error, Result};
use crate::notice::NoticeBoard;
use crate::table::{DType, Table, Tabular, Value};

type Predicate = dyn Fn(&dyn Tabular) -> std::result::Result<(), CheckError> + Send + Sync;

/// A named caller-supplied predicate, run through [`custom_check`].
#[derive(Clone)]
pub struct CustomCheck {
    name: String,
    predicate: Arc<Predicate>,
}

impl CustomCheck {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&dyn Tabular) -> std::result::Result<(), CheckError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run<'t, T: Tabular>(&self, table: &'t T) -> CheckResult<'t, T> {
        custom_check(table, &self.name, |t: &T| (self.predicate)(t))
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCheck").field("name", &self.name).finish_non_exhaustive()
    }
}

fn default_n() -> f64 {
    3.0
}

/// One check and its parameters.
///
/// Serialized with a `check` tag naming the check, e.g.
/// `{"check": "has_columns", "columns": ["a", "b"], "exact_order": true}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    HasColumns {
        columns: Vec<String>,
        #[serde(default)]
        exact_cols: bool,
        #[serde(default)]
        exact_order: bool,
    },
    HasNoX {
        values: Vec<Value>,
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    HasNoNans {
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    HasNoNones {
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    HasNoInfs {
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    HasNoNegInfs {
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    HasSetWithinVals {
        items: IndexMap<String, Vec<Value>>,
    },
    HasUniqueIndex,
    IsMonotonic {
        #[serde(default)]
        items: Option<IndexMap<String, Monotonic>>,
        #[serde(default)]
        increasing: Option<bool>,
        #[serde(default)]
        strict: bool,
    },
    IsShape {
        shape: Shape,
    },
    Unique {
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    HasValsWithinSet {
        items: IndexMap<String, Vec<Value>>,
    },
    HasValsWithinRange {
        items: IndexMap<String, (Value, Value)>,
    },
    HasValsWithinNStd {
        #[serde(default = "default_n")]
        n: f64,
    },
    HasDtypes {
        items: IndexMap<String, DType>,
    },
    HasSchema {
        schema: IndexMap<String, String>,
    },
    OneToMany {
        unit_column: String,
        many_column: String,
    },
    IsSameAs {
        other: Table,
        #[serde(default)]
        options: EqualityOptions,
    },
    MultiCheck {
        checks: Vec<Check>,
        #[serde(default)]
        warn: bool,
    },
    #[serde(skip)]
    Custom(CustomCheck),
}

fn names(columns: &Option<Vec<String>>) -> Option<Vec<&str>> {
    columns
        .as_ref()
        .map(|cols| cols.iter().map(String::as_str).collect())
}

impl Check {
    /// The check's name as used in failures and configuration.
    pub fn name(&self) -> &str {
        match self {
            Check::HasColumns { .. } => "has_columns",
            Check::HasNoX { .. } => "has_no_x",
            Check::HasNoNans { .. } => "has_no_nans",
            Check::HasNoNones { .. } => "has_no_nones",
            Check::HasNoInfs { .. } => "has_no_infs",
            Check::HasNoNegInfs { .. } => "has_no_neg_infs",
            Check::HasSetWithinVals { .. } => "has_set_within_vals",
            Check::HasUniqueIndex => "has_unique_index",
            Check::IsMonotonic { .. } => "is_monotonic",
            Check::IsShape { .. } => "is_shape",
            Check::Unique { .. } => "unique",
            Check::HasValsWithinSet { .. } => "has_vals_within_set",
            Check::HasValsWithinRange { .. } => "has_vals_within_range",
            Check::HasValsWithinNStd { .. } => "has_vals_within_n_std",
            Check::HasDtypes { .. } => "has_dtypes",
            Check::HasSchema { .. } => "has_schema",
            Check::OneToMany { .. } => "one_to_many",
            Check::IsSameAs { .. } => "is_same_as",
            Check::MultiCheck { .. } => "multi_check",
            Check::Custom(custom) => custom.name(),
        }
    }

    /// Run the check against `table`.
    pub fn run<'t, T: Tabular + Sync>(&self, table: &'t T) -> CheckResult<'t, T> {
        match self {
            Check::HasColumns {
                columns,
                exact_cols,
                exact_order,
            } => {
                let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                has_columns(table, &columns, *exact_cols, *exact_order)
            }
            Check::HasNoX { values, columns } => {
                has_no_x(table, values, names(columns).as_deref())
            }
            Check::HasNoNans { columns } => has_no_nans(table, names(columns).as_deref()),
            Check::HasNoNones { columns } => has_no_nones(table, names(columns).as_deref()),
            Check::HasNoInfs { columns } => has_no_infs(table, names(columns).as_deref()),
            Check::HasNoNegInfs { columns } => has_no_neg_infs(table, names(columns).as_deref()),
            Check::HasSetWithinVals { items } => has_set_within_vals(table, items),
            Check::HasUniqueIndex => has_unique_index(table),
            Check::IsMonotonic {
                items,
                increasing,
                strict,
            } => is_monotonic(
                table,
                items.as_ref(),
                Monotonic {
                    increasing: *increasing,
                    strict: *strict,
                },
            ),
            Check::IsShape { shape } => is_shape(table, *shape),
            Check::Unique { columns } => unique(table, names(columns).as_deref()),
            Check::HasValsWithinSet { items } => has_vals_within_set(table, items),
            Check::HasValsWithinRange { items } => has_vals_within_range(table, items),
            Check::HasValsWithinNStd { n } => has_vals_within_n_std(table, *n),
            Check::HasDtypes { items } => has_dtypes(table, items),
            Check::HasSchema { schema } => has_schema(table, schema),
            Check::OneToMany {
                unit_column,
                many_column,
            } => one_to_many(table, unit_column, many_column),
            Check::IsSameAs { other, options } => is_same_as(table, other, options),
            Check::MultiCheck { checks, warn } => multi_check(table, checks, *warn),
            Check::Custom(custom) => custom.run(table),
        }
    }
}

/// An ordered list of checks run together through [`multi_check`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckSuite {
    pub checks: Vec<Check>,
    /// Downgrade failures to notices.
    #[serde(default)]
    pub warn: bool,
}

impl CheckSuite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a check.
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_warn(mut self, warn: bool) -> Self {
        self.warn = warn;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn run<'t, T: Tabular + Sync>(&self, table: &'t T) -> CheckResult<'t, T> {
        multi_check(table, &self.checks, self.warn)
    }

    /// [`CheckSuite::run`] posting warnings to an explicit board.
    pub fn run_with<'t, T: Tabular + Sync>(
        &self,
        table: &'t T,
        board: &NoticeBoard,
    ) -> CheckResult<'t, T> {
        multi_check_with(table, &self.checks, self.warn, board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_check_names_match_tags() {
        let json = r#"[
            {"check": "has_unique_index"},
            {"check": "has_no_x", "values": [0, "x"]},
            {"check": "has_vals_within_n_std"},
            {"check": "is_shape", "shape": {"rows": -1, "cols": 2}}
        ]"#;
        let checks: Vec<Check> = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = checks.iter().map(Check::name).collect();
        assert_eq!(
            names,
            vec!["has_unique_index", "has_no_x", "has_vals_within_n_std", "is_shape"]
        );
        match &checks[2] {
            Check::HasValsWithinNStd { n } => assert_eq!(*n, 3.0),
            other => panic!("unexpected check {other:?}"),
        }
    }

    #[test]
    fn test_suite_from_json() {
        let suite = CheckSuite::from_json_str(
            r#"{
                "checks": [
                    {"check": "has_columns", "columns": ["a", "b"], "exact_order": true},
                    {"check": "has_dtypes", "items": {"a": "int64"}},
                    {"check": "has_vals_within_range", "items": {"a": [0, 10]}},
                    {"check": "is_monotonic", "items": {"a": {"increasing": true, "strict": true}}}
                ]
            }"#,
        )
        .unwrap();
        assert!(!suite.warn);

        let table = Table::from_columns([
            Column::new("a", [1, 2, 3]),
            Column::new("b", ["x", "y", "z"]),
        ])
        .unwrap();
        assert!(suite.run(&table).is_ok());
    }

    #[test]
    fn test_unknown_check_is_rejected() {
        let err = CheckSuite::from_json_str(r#"{"checks": [{"check": "is_awesome"}]}"#);
        assert!(matches!(err, Err(Error::Json(_))));
    }

    #[test]
    fn test_nested_multi_check() {
        let table = Table::from_columns([Column::new("a", [1, 1])]).unwrap();
        let check = Check::MultiCheck {
            checks: vec![Check::Unique { columns: None }],
            warn: false,
        };
        let err = check.run(&table).unwrap_err();
        assert!(err.to_string().contains("Column 'a'"));
    }

    #[test]
    fn test_custom_check_reuses_builtin_checks() {
        let no_nans = CustomCheck::new("no_nans", |t| has_no_nans(t, None).map(|_| ()));
        let in_range = CustomCheck::new("in_range", |t| {
            let bounds = IndexMap::from([("a".to_string(), (Value::Int(0), Value::Int(5)))]);
            has_vals_within_range(t, &bounds)?;
            is_shape(t, Shape::new(-1, 1)).map(|_| ())
        });

        let clean = Table::from_columns([Column::new("a", [1.0, 2.0])]).unwrap();
        assert!(Check::Custom(no_nans.clone()).run(&clean).is_ok());
        assert!(Check::Custom(in_range).run(&clean).is_ok());

        let dirty = Table::from_columns([Column::new("a", [1.0, f64::NAN])]).unwrap();
        let err = Check::Custom(no_nans).run(&dirty).unwrap_err();
        let failure = err.failure().unwrap();
        assert_eq!(failure.message, "no_nans is not true.");
        assert_eq!(failure.cause.as_ref().unwrap().check, "has_no_nans");
    }
}
