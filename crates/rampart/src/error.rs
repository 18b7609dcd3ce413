//! Error types for the Rampart library.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::locations::Location;
use crate::table::{Label, Mask, Value};

/// Error raised while loading tables or check configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Empty file or no columns to load.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Columns and index disagree in length, or names repeat.
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for loading operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Machine-inspectable detail attached to a [`ValidationFailure`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Payload {
    /// Message only.
    #[default]
    None,
    /// Offending cells in column-major order.
    Locations(Vec<Location>),
    /// Offending values keyed by column.
    Values(IndexMap<String, Vec<Value>>),
    /// Offending row labels.
    Labels(Vec<Label>),
    /// Mask of offending entries and the values found there.
    Masked { mask: Mask, values: Vec<Value> },
    /// Every failure collected by an aggregating check, in registration order.
    Failures(Vec<ValidationFailure>),
}

/// A data invariant that did not hold.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    /// Name of the check that raised.
    pub check: String,
    pub message: String,
    pub payload: Payload,
    /// Underlying failure this one wraps.
    #[source]
    pub cause: Option<Box<ValidationFailure>>,
}

impl ValidationFailure {
    pub fn new(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            message: message.into(),
            payload: Payload::None,
            cause: None,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_cause(mut self, cause: ValidationFailure) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Offending cells, when the payload carries them.
    pub fn locations(&self) -> Option<&[Location]> {
        match &self.payload {
            Payload::Locations(locations) => Some(locations),
            _ => None,
        }
    }
}

/// Error returned by every check.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    /// The data did not satisfy the check.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The check was invoked with invalid parameters.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CheckError {
    pub fn config(message: impl Into<String>) -> Self {
        CheckError::Configuration(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CheckError::Validation(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, CheckError::Configuration(_))
    }

    /// The validation failure, if this is one.
    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            CheckError::Validation(failure) => Some(failure),
            CheckError::Configuration(_) => None,
        }
    }
}

/// Result of a check: the untouched input table, or the reason it failed.
pub type CheckResult<'t, T> = std::result::Result<&'t T, CheckError>;
