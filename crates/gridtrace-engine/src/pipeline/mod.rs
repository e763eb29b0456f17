//! Check pipeline: validate, encode, dump, solve, report.

use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use gridtrace_model::{RunTrace, TraceError};
use gridtrace_smt::backends::z3_backend::Z3Solver;
use gridtrace_smt::encoder::{
    encode_loop_freedom, encode_nearest_goal, encode_path_efficiency, encode_validity,
    NearestGoalMetric, TraceQuery,
};
use gridtrace_smt::runner::run_query;
use gridtrace_smt::solver::SmtSolver;

use crate::result::{PropertyReport, Satisfiability, TraceProperty};

mod concurrent;
mod dump;

pub use concurrent::check_all;
pub use dump::dump_query;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),
    #[error("Solver error: {0}")]
    Solver(String),
    #[error("could not write SMT dump to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Worker error: {0}")]
    Worker(String),
}

/// Knobs shared by every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Per-query solver timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
    pub nearest_metric: NearestGoalMetric,
    /// Directory receiving one `<property>.smt2` script per check.
    pub dump_smt: Option<PathBuf>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            nearest_metric: NearestGoalMetric::SignedDelta,
            dump_smt: None,
        }
    }
}

/// Build the query deciding `property` on `trace`.
pub fn encode_property(
    property: TraceProperty,
    trace: &RunTrace,
    options: &CheckOptions,
) -> Result<TraceQuery, TraceError> {
    match property {
        TraceProperty::Validity => encode_validity(trace),
        TraceProperty::LoopFreedom => encode_loop_freedom(trace),
        TraceProperty::PathEfficiency => encode_path_efficiency(trace),
        TraceProperty::NearestGoalSelection => encode_nearest_goal(trace, options.nearest_metric),
    }
}

/// Check one property with a caller-supplied solver.
///
/// The solver is reset before use. Backend faults become
/// [`CheckError::Solver`]; timeouts come back as an `Unknown` outcome.
pub fn check_property_with_solver<S: SmtSolver>(
    solver: &mut S,
    property: TraceProperty,
    trace: &RunTrace,
    options: &CheckOptions,
) -> Result<PropertyReport, CheckError> {
    let started = Instant::now();
    let horizon = trace.validate()?;
    let query = encode_property(property, trace, options)?;
    debug!(
        property = property.name(),
        horizon,
        declarations = query.declarations.len(),
        assertions = query.assertions.len(),
        obligations = query.obligations.len(),
        "property encoded"
    );

    if let Some(dir) = &options.dump_smt {
        dump_query(dir, property, &query)?;
    }

    let outcome = run_query(solver, &query).map_err(|e| CheckError::Solver(e.to_string()))?;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let report = PropertyReport {
        property,
        outcome: Satisfiability::from(outcome.result),
        implicated_steps: outcome.implicated_steps,
        horizon,
        trace_fingerprint: trace.fingerprint(),
        elapsed_ms,
    };
    info!(
        property = property.name(),
        verdict = report.outcome.verdict_class(),
        implicated = report.implicated_steps.len(),
        elapsed_ms,
        "property checked"
    );
    Ok(report)
}

/// Check one property on a fresh Z3 solver honoring `options.timeout_secs`.
pub fn check_property(
    property: TraceProperty,
    trace: &RunTrace,
    options: &CheckOptions,
) -> Result<PropertyReport, CheckError> {
    let mut solver = Z3Solver::with_timeout_secs(options.timeout_secs);
    check_property_with_solver(&mut solver, property, trace, options)
}

/// SAT: the recording obeys the world rules. UNSAT: the recording is broken.
pub fn check_validity(
    trace: &RunTrace,
    options: &CheckOptions,
) -> Result<Satisfiability, CheckError> {
    check_property(TraceProperty::Validity, trace, options).map(|r| r.outcome)
}

/// SAT: no capture-free immediate reversal. UNSAT: a loop occurred.
pub fn check_loop_freedom(
    trace: &RunTrace,
    options: &CheckOptions,
) -> Result<Satisfiability, CheckError> {
    check_property(TraceProperty::LoopFreedom, trace, options).map(|r| r.outcome)
}

/// SAT: every move approached the pursued goal. UNSAT: some move did not.
pub fn check_path_efficiency(
    trace: &RunTrace,
    options: &CheckOptions,
) -> Result<Satisfiability, CheckError> {
    check_property(TraceProperty::PathEfficiency, trace, options).map(|r| r.outcome)
}

/// SAT: every chosen goal was nearest under `options.nearest_metric`.
pub fn check_nearest_goal_selection(
    trace: &RunTrace,
    options: &CheckOptions,
) -> Result<Satisfiability, CheckError> {
    check_property(TraceProperty::NearestGoalSelection, trace, options).map(|r| r.outcome)
}
