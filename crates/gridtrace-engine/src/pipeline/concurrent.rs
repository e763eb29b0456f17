use std::thread;

use tracing::{info, warn};

use gridtrace_model::RunTrace;

use super::{check_property, CheckError, CheckOptions};
use crate::result::{PropertyReport, TraceProperty};

/// Run every property check side by side, one thread and one solver each.
///
/// Reports come back in [`TraceProperty::ALL`] order. The run is validated
/// once up front so shape errors never reach a worker. The first failing
/// check, in that order, decides the error.
pub fn check_all(
    trace: &RunTrace,
    options: &CheckOptions,
) -> Result<Vec<PropertyReport>, CheckError> {
    let horizon = trace.validate()?;
    info!(horizon, checks = TraceProperty::ALL.len(), "checking all properties");

    let results: Vec<Result<PropertyReport, CheckError>> = thread::scope(|scope| {
        let handles: Vec<_> = TraceProperty::ALL
            .iter()
            .map(|&property| {
                (
                    property,
                    scope.spawn(move || check_property(property, trace, options)),
                )
            })
            .collect();
        handles
            .into_iter()
            .map(|(property, handle)| {
                handle.join().unwrap_or_else(|_| {
                    warn!(property = property.name(), "check thread panicked");
                    Err(CheckError::Worker(format!(
                        "{} check thread panicked",
                        property.name()
                    )))
                })
            })
            .collect()
    });

    results.into_iter().collect()
}
