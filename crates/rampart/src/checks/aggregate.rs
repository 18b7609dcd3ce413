//! Checks that compose other checks.

use rayon::prelude::*;

use super::fail;
use super::suite::Check;
use crate::error::{CheckError, CheckResult, Payload, ValidationFailure};
use crate::notice::{self, NoticeBoard, NoticeKind};
use crate::table::Tabular;

/// Run every check against `table` and report all failures at once.
///
/// One check failing never stops the others. With `warn`, failures are
/// posted to the process notice board and the table is returned. A
/// configuration error from any check is returned as is.
pub fn multi_check<'t, T: Tabular + Sync>(
    table: &'t T,
    checks: &[Check],
    warn: bool,
) -> CheckResult<'t, T> {
    multi_check_with(table, checks, warn, notice::board())
}

/// [`multi_check`] posting warnings to an explicit board.
pub fn multi_check_with<'t, T: Tabular + Sync>(
    table: &'t T,
    checks: &[Check],
    warn: bool,
    board: &NoticeBoard,
) -> CheckResult<'t, T> {
    let span = tracing::debug_span!("multi_check", checks = checks.len(), warn);
    let _guard = span.enter();

    // Collected in registration order regardless of completion order
    let outcomes: Vec<Result<(), CheckError>> = checks
        .par_iter()
        .map(|check| check.run(table).map(|_| ()))
        .collect();

    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(()) => {}
            Err(CheckError::Validation(failure)) => failures.push(failure),
            Err(err) => return Err(err),
        }
    }

    if failures.is_empty() {
        return Ok(table);
    }

    if warn {
        for failure in &failures {
            board.notify(
                NoticeKind::CheckFailure,
                format!("{}: {}", failure.check, failure.message),
            );
        }
        return Ok(table);
    }

    let message = failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    fail(ValidationFailure::new("multi_check", message).with_payload(Payload::Failures(failures)))
}

/// Run a caller-supplied predicate that signals failure by returning an
/// error. Validation failures are relabeled `"<name> is not true."` with the
/// original kept as the cause.
pub fn custom_check<'t, T, F>(table: &'t T, name: &str, predicate: F) -> CheckResult<'t, T>
where
    T: Tabular + ?Sized,
    F: FnOnce(&T) -> Result<(), CheckError>,
{
    match predicate(table) {
        Ok(()) => Ok(table),
        Err(CheckError::Validation(failure)) => fail(
            ValidationFailure::new(name, format!("{name} is not true.")).with_cause(failure),
        ),
        Err(err) => Err(err),
    }
}
