use std::fmt;

use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

/// Answer of one satisfiability check.
#[derive(Debug, Clone, PartialEq)]
pub enum SatResult {
    Sat,
    Unsat,
    /// The backend gave up; carries its reason (timeout, resource limit, ...).
    Unknown(String),
}

impl fmt::Display for SatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SatResult::Sat => f.write_str("sat"),
            SatResult::Unsat => f.write_str("unsat"),
            SatResult::Unknown(reason) => write!(f, "unknown: {reason}"),
        }
    }
}

/// What a backend must offer to decide a [`crate::encoder::TraceQuery`].
///
/// Every run starts from `reset`, so one instance can serve many queries on
/// the thread that owns it.
pub trait SmtSolver {
    type Error: std::error::Error;

    fn declare_var(&mut self, name: &str, sort: &SmtSort) -> Result<(), Self::Error>;

    /// Add `term` (Bool-sorted) to the assertion set.
    fn assert(&mut self, term: &SmtTerm) -> Result<(), Self::Error>;

    fn check_sat(&mut self) -> Result<SatResult, Self::Error>;

    /// Whether `check_sat_assuming` honors its assumptions and
    /// `get_unsat_core_assumptions` reports a core over them.
    fn supports_assumption_unsat_core(&self) -> bool {
        false
    }

    /// Check under extra Bool literals, named by their declared variables.
    ///
    /// Without assumption support this falls back to a plain `check_sat` and
    /// the literals stay free; callers must assert them first in that case.
    fn check_sat_assuming(&mut self, _assumptions: &[String]) -> Result<SatResult, Self::Error> {
        self.check_sat()
    }

    /// Assumption names in the core of the last UNSAT `check_sat_assuming`.
    fn get_unsat_core_assumptions(&mut self) -> Result<Vec<String>, Self::Error> {
        Ok(Vec::new())
    }

    /// Drop every declaration and assertion.
    fn reset(&mut self) -> Result<(), Self::Error>;
}
