//! Drives one [`TraceQuery`] through an [`SmtSolver`].

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::encoder::variables::parse_guard_var;
use crate::encoder::TraceQuery;
use crate::solver::{SatResult, SmtSolver};
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

/// Solver answer for one query, with the steps blamed for an UNSAT answer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub result: SatResult,
    /// Sorted, deduplicated steps whose obligations appear in the unsat core.
    /// Empty unless `result` is `Unsat` and the backend produced a core.
    pub implicated_steps: Vec<usize>,
    pub solve_elapsed_ms: u128,
}

fn declare_all<S: SmtSolver>(
    solver: &mut S,
    declarations: &[(String, SmtSort)],
) -> Result<(), S::Error> {
    for (name, sort) in declarations {
        solver.declare_var(name, sort)?;
    }
    Ok(())
}

fn assert_all<S: SmtSolver>(solver: &mut S, assertions: &[SmtTerm]) -> Result<(), S::Error> {
    for assertion in assertions {
        solver.assert(assertion)?;
    }
    Ok(())
}

/// Load `query` into a freshly reset `solver` and check it.
///
/// Every obligation is asserted as `guard_k => term` and all guards are
/// assumed true. Backends without assumption support get the guards
/// asserted outright, so they still decide the same formula but cannot
/// report implicated steps.
pub fn run_query<S: SmtSolver>(solver: &mut S, query: &TraceQuery) -> Result<QueryOutcome, S::Error> {
    solver.reset()?;
    declare_all(solver, &query.declarations)?;
    assert_all(solver, &query.assertions)?;

    let guards = query.guard_names();
    for (guard, obligation) in guards.iter().zip(&query.obligations) {
        solver.declare_var(guard, &SmtSort::Bool)?;
        solver.assert(&SmtTerm::var(guard.clone()).implies(obligation.term.clone()))?;
    }
    debug!(
        declarations = query.declarations.len(),
        assertions = query.assertions.len(),
        obligations = query.obligations.len(),
        "query loaded"
    );

    let use_assumptions = !guards.is_empty() && solver.supports_assumption_unsat_core();
    let started = Instant::now();
    let result = if use_assumptions {
        solver.check_sat_assuming(&guards)?
    } else {
        for guard in &guards {
            solver.assert(&SmtTerm::var(guard.clone()))?;
        }
        solver.check_sat()?
    };
    let solve_elapsed_ms = started.elapsed().as_millis();

    let mut implicated_steps = Vec::new();
    match &result {
        SatResult::Sat => info!(solve_elapsed_ms, "query satisfiable"),
        SatResult::Unsat => {
            if use_assumptions {
                implicated_steps = solver
                    .get_unsat_core_assumptions()?
                    .iter()
                    .filter_map(|name| parse_guard_var(name))
                    .filter_map(|index| query.obligations.get(index))
                    .map(|obligation| obligation.step)
                    .collect();
                implicated_steps.sort_unstable();
                implicated_steps.dedup();
            }
            info!(
                solve_elapsed_ms,
                implicated = ?implicated_steps,
                "query unsatisfiable"
            );
        }
        SatResult::Unknown(reason) => warn!(solve_elapsed_ms, %reason, "query unknown"),
    }

    Ok(QueryOutcome {
        result,
        implicated_steps,
        solve_elapsed_ms,
    })
}
