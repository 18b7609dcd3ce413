//! Rampart: inline assertion checks for tabular data pipelines.
//!
//! Checks take a table, verify one property of it and hand the same table
//! back, so they slot between pipeline stages without copying data. A
//! failing check returns a [`ValidationFailure`] that says what went wrong
//! and carries a typed payload pointing at the offending cells, columns or
//! values.
//!
//! # Example
//!
//! ```
//! use rampart::checks::{has_no_nans, unique};
//! use rampart::table::{Column, Table};
//!
//! let table = Table::from_columns([
//!     Column::new("a", [1.0, f64::NAN]),
//!     Column::new("b", ["x", "y"]),
//! ])?;
//!
//! assert!(unique(&table, Some(&["b"][..])).is_ok());
//!
//! let err = has_no_nans(&table, None).unwrap_err();
//! assert_eq!(err.failure().unwrap().locations().unwrap().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Checks can also be described as data and run together:
//!
//! ```
//! use rampart::checks::CheckSuite;
//! use rampart::table::{Column, Table};
//!
//! let suite = CheckSuite::from_json_str(
//!     r#"{"checks": [{"check": "has_columns", "columns": ["a"]}, {"check": "has_unique_index"}]}"#,
//! )?;
//! let table = Table::from_columns([Column::new("a", [1, 2, 3])])?;
//! suite.run(&table)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod checks;
pub mod classify;
pub mod error;
pub mod locations;
pub mod notice;
pub mod table;

pub use classify::{dtype_check, SemanticDType};
pub use error::{CheckError, CheckResult, Error, Payload, Result, ValidationFailure};
pub use locations::{bad_locations, Location};
pub use notice::{NoticeBoard, NoticeKind, NoticeSink};
pub use table::{Column, DType, Table, Tabular, Value};
