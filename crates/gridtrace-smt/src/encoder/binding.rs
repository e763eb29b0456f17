//! Pins a concrete recorded run into a [`SymbolicRun`].

use gridtrace_model::{Direction, GridPosition, TraceError, GOAL_SLOTS};

use super::{Axis, SymbolicRun};
use crate::terms::SmtTerm;

/// Equalities fixing every variable at each step to its recorded value.
///
/// Returns one conjunction per timestep, in step order. Every sequence must
/// have exactly `run.horizon()` entries and there must be exactly three goal
/// tracks; nothing is truncated or padded.
pub fn bind_trace(
    run: &SymbolicRun,
    agent: &[GridPosition],
    goals: &[Vec<GridPosition>],
    actions: &[Direction],
) -> Result<Vec<(usize, SmtTerm)>, TraceError> {
    let horizon = run.horizon();
    expect_len("agent trace", horizon, agent.len())?;
    expect_len("action trace", horizon, actions.len())?;
    if goals.len() != GOAL_SLOTS {
        return Err(TraceError::GoalArity { found: goals.len() });
    }
    for (slot, track) in goals.iter().enumerate() {
        expect_len(&format!("goal slot {slot} trace"), horizon, track.len())?;
    }

    let bindings = (0..horizon)
        .map(|t| {
            let mut eqs = Vec::with_capacity(2 + 2 * GOAL_SLOTS + Direction::ALL.len());
            for axis in Axis::BOTH {
                eqs.push(run.agent(axis, t).eq(SmtTerm::int(axis.of(agent[t]))));
            }
            for (slot, track) in goals.iter().enumerate() {
                for axis in Axis::BOTH {
                    eqs.push(run.goal(slot, axis, t).eq(SmtTerm::int(axis.of(track[t]))));
                }
            }
            for direction in Direction::ALL {
                eqs.push(
                    run.direction(direction, t)
                        .eq(SmtTerm::bool(direction == actions[t])),
                );
            }
            (t, SmtTerm::and(eqs))
        })
        .collect();
    Ok(bindings)
}

fn expect_len(what: &str, expected: usize, found: usize) -> Result<(), TraceError> {
    if expected == found {
        Ok(())
    } else {
        Err(TraceError::ShapeMismatch {
            what: what.to_string(),
            expected,
            found,
        })
    }
}
