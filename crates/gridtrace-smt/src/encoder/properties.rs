//! Property encoders.
//!
//! Each encoder builds a fresh world model, pins the recorded run into it,
//! and adds one family of per-step obligations. The solver's answer on the
//! resulting query is the verdict: UNSAT means the property is violated
//! somewhere in the run.

use serde::{Deserialize, Serialize};

use gridtrace_model::pursuit::target_at;
use gridtrace_model::{Direction, RunTrace, TraceError, GOAL_SLOTS};

use super::{bind_trace, build_world_model, Axis, SymbolicRun, TraceQuery};
use crate::terms::SmtTerm;

/// How the nearest-goal check orders goals at a choice point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearestGoalMetric {
    /// `delta_row + delta_col`, signed. Components of opposite sign cancel,
    /// so this is not a distance in every quadrant.
    #[default]
    SignedDelta,
    /// `|delta_row| + |delta_col|`.
    Manhattan,
}

/// World model plus recorded run, with the binding asserted unconditionally.
///
/// The binder rejects a malformed run before any constraint is added.
fn pinned_model(trace: &RunTrace) -> Result<(TraceQuery, SymbolicRun), TraceError> {
    let (mut query, run) = build_world_model(trace.horizon(), trace.grid_size);
    for (_, binding) in bind_trace(&run, &trace.agent, &trace.goals, &trace.actions)? {
        query.assert_term(binding);
    }
    Ok((query, run))
}

/// World model plus recorded run and nothing else.
///
/// Here the per-step bindings themselves are the obligations, so an unsat
/// core names the steps whose recorded values break the dynamics.
pub fn encode_validity(trace: &RunTrace) -> Result<TraceQuery, TraceError> {
    let (mut query, run) = build_world_model(trace.horizon(), trace.grid_size);
    for (step, binding) in bind_trace(&run, &trace.agent, &trace.goals, &trace.actions)? {
        query.add_obligation(step, "recorded state", binding);
    }
    Ok(query)
}

/// Forbid an immediate reversal between `t` and `t + 1` unless the second
/// move lands on a cell some goal held at `t`.
pub fn encode_loop_freedom(trace: &RunTrace) -> Result<TraceQuery, TraceError> {
    let (mut query, run) = pinned_model(trace)?;
    for t in 0..run.horizon().saturating_sub(1) {
        let no_capture = SmtTerm::and(
            (0..GOAL_SLOTS)
                .map(|slot| run.agent_on_goal(t + 1, slot, t).not())
                .collect(),
        );
        let reversal = SmtTerm::or(
            Direction::ALL
                .iter()
                .map(|&d| {
                    SmtTerm::and(vec![
                        run.direction(d, t),
                        run.direction(d.reverse(), t + 1),
                    ])
                })
                .collect(),
        );
        query.add_obligation(
            t,
            "no capture-free reversal",
            SmtTerm::and(vec![no_capture, reversal]).not(),
        );
    }
    Ok(query)
}

/// While a goal is being pursued, forbid every move that does not bring the
/// agent strictly closer to it along the move's axis.
pub fn encode_path_efficiency(trace: &RunTrace) -> Result<TraceQuery, TraceError> {
    let (mut query, run) = pinned_model(trace)?;
    let segments = trace.pursuit_segments();
    for t in 0..run.horizon() {
        let Some(slot) = target_at(&segments, t) else {
            break;
        };
        let rules = Direction::ALL
            .iter()
            .map(|&direction| {
                let (axis, forward) = match direction.offset() {
                    (0, dc) => (Axis::Column, dc > 0),
                    (dr, _) => (Axis::Row, dr > 0),
                };
                let goal = run.goal(slot, axis, t);
                let agent = run.agent(axis, t);
                let not_ahead = if forward {
                    goal.le(agent)
                } else {
                    goal.ge(agent)
                };
                not_ahead.implies(run.direction(direction, t).not())
            })
            .collect();
        query.add_obligation(t, format!("monotone approach to goal {slot}"), SmtTerm::and(rules));
    }
    Ok(query)
}

/// At every choice point the chosen goal must be no farther than the other
/// two under `metric`.
pub fn encode_nearest_goal(
    trace: &RunTrace,
    metric: NearestGoalMetric,
) -> Result<TraceQuery, TraceError> {
    let (mut query, run) = pinned_model(trace)?;
    for segment in trace.pursuit_segments() {
        let t = segment.chosen_at;
        let chosen = goal_distance(&run, segment.slot, t, metric);
        let comparisons = (0..GOAL_SLOTS)
            .filter(|&other| other != segment.slot)
            .map(|other| chosen.clone().le(goal_distance(&run, other, t, metric)))
            .collect();
        query.add_obligation(
            t,
            format!("goal {} chosen as nearest", segment.slot),
            SmtTerm::and(comparisons),
        );
    }
    Ok(query)
}

fn goal_distance(run: &SymbolicRun, slot: usize, t: usize, metric: NearestGoalMetric) -> SmtTerm {
    let dr = run.delta(slot, Axis::Row, t);
    let dc = run.delta(slot, Axis::Column, t);
    match metric {
        NearestGoalMetric::SignedDelta => dr.add(dc),
        NearestGoalMetric::Manhattan => dr.abs().add(dc.abs()),
    }
}
