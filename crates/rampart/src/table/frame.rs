//! Tables, row indexes and the capability trait checks are written against.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::column::Column;
use super::value::Label;
use crate::error::{CheckError, Error, Result};

/// Row identifiers of a table. Labels may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index(Vec<Label>);

impl Index {
    pub fn new<L: Into<Label>>(labels: impl IntoIterator<Item = L>) -> Self {
        Self(labels.into_iter().map(Into::into).collect())
    }

    /// Default index `0..len`.
    pub fn range(len: usize) -> Self {
        Self((0..len).map(Label::from).collect())
    }

    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_unique(&self) -> bool {
        self.0.iter().collect::<HashSet<_>>().len() == self.0.len()
    }

    /// Sorted distinct labels that occur more than once.
    pub fn duplicated_labels(&self) -> Vec<Label> {
        let mut seen = HashSet::new();
        let mut repeated: Vec<Label> = self
            .0
            .iter()
            .filter(|label| !seen.insert(*label))
            .cloned()
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        repeated.sort();
        repeated
    }
}

/// Read-only view of a table.
///
/// Checks depend only on this trait. Column values, statistics and
/// membership come from [`Column`].
pub trait Tabular {
    /// Column names in table order.
    fn column_names(&self) -> Vec<&str>;

    fn column(&self, name: &str) -> Option<&Column>;

    fn index(&self) -> &Index;

    /// `(rows, columns)`.
    fn shape(&self) -> (usize, usize) {
        (self.index().len(), self.column_names().len())
    }

    /// Columns in table order.
    fn columns(&self) -> Vec<&Column> {
        self.column_names()
            .into_iter()
            .filter_map(|name| self.column(name))
            .collect()
    }

    /// Look up a column a check was told to inspect.
    fn require(&self, name: &str) -> std::result::Result<&Column, CheckError> {
        self.column(name)
            .ok_or_else(|| CheckError::config(format!("table has no column '{name}'")))
    }
}

/// In-memory table: ordered named columns sharing one index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct Table {
    index: Index,
    columns: IndexMap<String, Column>,
}

/// Serialized form of a [`Table`].
#[derive(Serialize, Deserialize)]
struct RawTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    index: Option<Index>,
    columns: Vec<Column>,
}

impl Table {
    /// An empty table over `index`; add columns with [`Table::with_column`].
    pub fn new(index: Index) -> Self {
        Self {
            index,
            columns: IndexMap::new(),
        }
    }

    /// Append a column. Its length must match the index.
    pub fn with_column(mut self, column: Column) -> Result<Self> {
        if column.len() != self.index.len() {
            return Err(Error::InvalidTable(format!(
                "column '{}' has {} rows, index has {}",
                column.name(),
                column.len(),
                self.index.len()
            )));
        }
        if self.columns.contains_key(column.name()) {
            return Err(Error::InvalidTable(format!(
                "duplicate column '{}'",
                column.name()
            )));
        }
        self.columns.insert(column.name().to_string(), column);
        Ok(self)
    }

    /// Build a table with a default `0..n` index.
    pub fn from_columns(columns: impl IntoIterator<Item = Column>) -> Result<Self> {
        let mut table = Table::default();
        let mut rows = None;
        for column in columns {
            match rows {
                None => rows = Some(column.len()),
                Some(n) if n != column.len() => {
                    return Err(Error::InvalidTable(format!(
                        "column '{}' has {} rows, expected {}",
                        column.name(),
                        column.len(),
                        n
                    )));
                }
                Some(_) => {}
            }
            if table.columns.contains_key(column.name()) {
                return Err(Error::InvalidTable(format!(
                    "duplicate column '{}'",
                    column.name()
                )));
            }
            table.columns.insert(column.name().to_string(), column);
        }
        table.index = Index::range(rows.unwrap_or(0));
        Ok(table)
    }

    /// Replace the row index.
    pub fn with_index(mut self, index: Index) -> Result<Self> {
        if !self.columns.is_empty() && index.len() != self.row_count() {
            return Err(Error::InvalidTable(format!(
                "index has {} labels, table has {} rows",
                index.len(),
                self.row_count()
            )));
        }
        self.index = index;
        Ok(self)
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

impl Tabular for Table {
    fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    fn index(&self) -> &Index {
        &self.index
    }

    fn shape(&self) -> (usize, usize) {
        (self.index.len(), self.columns.len())
    }
}

impl TryFrom<RawTable> for Table {
    type Error = Error;

    fn try_from(raw: RawTable) -> Result<Self> {
        let table = Table::from_columns(raw.columns.into_iter().map(Column::nulls_as_nan))?;
        match raw.index {
            Some(index) => table.with_index(index),
            None => Ok(table),
        }
    }
}

impl From<Table> for RawTable {
    fn from(table: Table) -> Self {
        RawTable {
            index: Some(table.index),
            columns: table.columns.into_values().collect(),
        }
    }
}
