//! Bounded symbolic world model for recorded grid runs.
//!
//! For a horizon `T` and grid size `N` the model declares, per timestep, the
//! agent cell, the three goal cells, the signed goal-minus-agent deltas and
//! four direction indicators, and constrains them to legal dynamics. Property
//! encoders in [`properties`] pin a concrete run into this model through
//! [`binding`] and add their own constraints on top.

use gridtrace_model::{Direction, GridPosition, GOAL_SLOTS};

use crate::backends::smtlib_printer::to_smtlib;
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

pub mod binding;
pub mod properties;
pub(crate) mod variables;

pub use binding::bind_trace;
pub use properties::{
    encode_loop_freedom, encode_nearest_goal, encode_path_efficiency, encode_validity,
    NearestGoalMetric,
};

use variables::{agent_var, delta_var, direction_var, goal_var, guard_var};

/// Grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::Row, Axis::Column];

    pub(crate) fn suffix(self) -> &'static str {
        match self {
            Axis::Row => "row",
            Axis::Column => "col",
        }
    }

    /// Coordinate of `pos` along this axis.
    pub fn of(self, pos: GridPosition) -> i64 {
        match self {
            Axis::Row => pos.row,
            Axis::Column => pos.column,
        }
    }

    /// Change along this axis caused by moving in `direction`.
    pub fn offset(self, direction: Direction) -> i64 {
        let (dr, dc) = direction.offset();
        match self {
            Axis::Row => dr,
            Axis::Column => dc,
        }
    }
}

/// A constraint tied to one timestep, asserted behind a guard literal so an
/// unsat core can be mapped back to the steps involved.
#[derive(Debug, Clone, PartialEq)]
pub struct Obligation {
    pub step: usize,
    pub label: String,
    pub term: SmtTerm,
}

/// Declarations and constraints for one check.
#[derive(Debug, Clone, Default)]
pub struct TraceQuery {
    /// Variable declarations: (name, sort).
    pub declarations: Vec<(String, SmtSort)>,
    /// Unconditional assertions.
    pub assertions: Vec<SmtTerm>,
    /// Guarded per-step constraints; all guards are assumed true when solving.
    pub obligations: Vec<Obligation>,
}

impl TraceQuery {
    fn declare(&mut self, name: String, sort: SmtSort) {
        self.declarations.push((name, sort));
    }

    pub fn assert_term(&mut self, term: SmtTerm) {
        self.assertions.push(term);
    }

    pub fn add_obligation(&mut self, step: usize, label: impl Into<String>, term: SmtTerm) {
        self.obligations.push(Obligation {
            step,
            label: label.into(),
            term,
        });
    }

    /// Guard literal names, in obligation order.
    pub fn guard_names(&self) -> Vec<String> {
        (0..self.obligations.len()).map(guard_var).collect()
    }

    /// Render the query as a standalone SMT-LIB2 script.
    pub fn to_smtlib_script(&self) -> String {
        let mut out = String::new();
        out.push_str("(set-option :produce-unsat-assumptions true)\n");
        out.push_str("(set-logic QF_LIA)\n");
        for (name, sort) in &self.declarations {
            out.push_str(&format!("(declare-const {name} {})\n", sort.smtlib_name()));
        }
        let guards = self.guard_names();
        for guard in &guards {
            out.push_str(&format!("(declare-const {guard} Bool)\n"));
        }
        for assertion in &self.assertions {
            out.push_str(&format!("(assert {})\n", to_smtlib(assertion)));
        }
        for (guard, obligation) in guards.iter().zip(&self.obligations) {
            out.push_str(&format!(
                "; step {}: {}\n(assert (=> {guard} {}))\n",
                obligation.step,
                obligation.label,
                to_smtlib(&obligation.term)
            ));
        }
        if guards.is_empty() {
            out.push_str("(check-sat)\n");
        } else {
            out.push_str(&format!("(check-sat-assuming ({}))\n", guards.join(" ")));
        }
        out
    }
}

/// Solver-facing mirror of a run of `horizon` steps on an `N x N` grid.
///
/// Only hands out terms over the variables declared by
/// [`build_world_model`]; it never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicRun {
    horizon: usize,
    grid_size: u32,
}

impl SymbolicRun {
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    pub fn agent(&self, axis: Axis, step: usize) -> SmtTerm {
        SmtTerm::var(agent_var(axis, step))
    }

    pub fn goal(&self, slot: usize, axis: Axis, step: usize) -> SmtTerm {
        SmtTerm::var(goal_var(slot, axis, step))
    }

    pub fn delta(&self, slot: usize, axis: Axis, step: usize) -> SmtTerm {
        SmtTerm::var(delta_var(slot, axis, step))
    }

    pub fn direction(&self, direction: Direction, step: usize) -> SmtTerm {
        SmtTerm::var(direction_var(direction, step))
    }

    /// The agent at `agent_step` stands on the cell goal `slot` held at `goal_step`.
    pub fn agent_on_goal(&self, agent_step: usize, slot: usize, goal_step: usize) -> SmtTerm {
        SmtTerm::and(
            Axis::BOTH
                .iter()
                .map(|&axis| {
                    self.agent(axis, agent_step)
                        .eq(self.goal(slot, axis, goal_step))
                })
                .collect(),
        )
    }

    /// Goal `slot` holds the same cell at `step` and `step + 1`.
    pub fn goal_unchanged(&self, slot: usize, step: usize) -> SmtTerm {
        SmtTerm::and(
            Axis::BOTH
                .iter()
                .map(|&axis| self.goal(slot, axis, step + 1).eq(self.goal(slot, axis, step)))
                .collect(),
        )
    }

    /// Offset applied to `axis` by the move chosen at `step`, as nested `ite`s.
    fn move_offset(&self, axis: Axis, step: usize) -> SmtTerm {
        Direction::ALL
            .iter()
            .rev()
            .filter(|&&direction| axis.offset(direction) != 0)
            .fold(SmtTerm::int(0), |rest, &direction| {
                SmtTerm::ite(
                    self.direction(direction, step),
                    SmtTerm::int(axis.offset(direction)),
                    rest,
                )
            })
    }

    fn declarations(&self) -> Vec<(String, SmtSort)> {
        let mut out = Vec::new();
        for t in 0..self.horizon {
            for axis in Axis::BOTH {
                out.push((agent_var(axis, t), SmtSort::Int));
            }
            for slot in 0..GOAL_SLOTS {
                for axis in Axis::BOTH {
                    out.push((goal_var(slot, axis, t), SmtSort::Int));
                    out.push((delta_var(slot, axis, t), SmtSort::Int));
                }
            }
            for direction in Direction::ALL {
                out.push((direction_var(direction, t), SmtSort::Bool));
            }
        }
        out
    }
}

/// Build the world model for `horizon` steps on a `grid_size` square grid.
///
/// Pure function of its inputs; each call yields an independent query.
pub fn build_world_model(horizon: usize, grid_size: u32) -> (TraceQuery, SymbolicRun) {
    let run = SymbolicRun { horizon, grid_size };
    let mut query = TraceQuery::default();
    for (name, sort) in run.declarations() {
        query.declare(name, sort);
    }

    let n = SmtTerm::int(i64::from(grid_size));
    let in_bounds = |term: SmtTerm| {
        SmtTerm::and(vec![
            term.clone().ge(SmtTerm::int(0)),
            term.lt(n.clone()),
        ])
    };

    for t in 0..horizon {
        // Every coordinate stays on the grid.
        for axis in Axis::BOTH {
            query.assert_term(in_bounds(run.agent(axis, t)));
            for slot in 0..GOAL_SLOTS {
                query.assert_term(in_bounds(run.goal(slot, axis, t)));
            }
        }

        // No two goals share a cell.
        for i in 0..GOAL_SLOTS {
            for j in 0..i {
                query.assert_term(
                    SmtTerm::and(
                        Axis::BOTH
                            .iter()
                            .map(|&axis| run.goal(i, axis, t).eq(run.goal(j, axis, t)))
                            .collect(),
                    )
                    .not(),
                );
            }
        }

        // Signed deltas, goal minus agent.
        for slot in 0..GOAL_SLOTS {
            for axis in Axis::BOTH {
                query.assert_term(
                    run.delta(slot, axis, t)
                        .eq(run.goal(slot, axis, t).sub(run.agent(axis, t))),
                );
            }
        }

        // At most one direction per step.
        for (i, &a) in Direction::ALL.iter().enumerate() {
            for &b in &Direction::ALL[..i] {
                query.assert_term(
                    SmtTerm::and(vec![run.direction(a, t), run.direction(b, t)]).not(),
                );
            }
        }
    }

    for t in 0..horizon.saturating_sub(1) {
        for axis in Axis::BOTH {
            query.assert_term(
                run.agent(axis, t + 1)
                    .eq(run.agent(axis, t).add(run.move_offset(axis, t))),
            );
        }

        // A slot may only be refilled when it was captured: the agent stood on
        // it at t, or stepped onto it with the move made at t.
        for slot in 0..GOAL_SLOTS {
            query.assert_term(SmtTerm::or(vec![
                run.goal_unchanged(slot, t),
                run.agent_on_goal(t, slot, t),
                run.agent_on_goal(t + 1, slot, t),
            ]));
        }
    }

    (query, run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::z3_backend::Z3Solver;
    use crate::solver::{SatResult, SmtSolver};

    fn solve(query: &TraceQuery, extra: &[SmtTerm]) -> SatResult {
        let mut solver = Z3Solver::new();
        for (name, sort) in &query.declarations {
            solver.declare_var(name, sort).expect("declare");
        }
        for assertion in query.assertions.iter().chain(extra) {
            solver.assert(assertion).expect("assert");
        }
        solver.check_sat().expect("check")
    }

    #[test]
    fn declares_fixed_variable_count_per_step() {
        let (query, run) = build_world_model(4, 5);
        // 2 agent + 3 * (2 goal + 2 delta) + 4 directions
        assert_eq!(query.declarations.len(), 4 * 18);
        assert_eq!(run.horizon(), 4);
        assert_eq!(run.grid_size(), 5);
        assert!(query.obligations.is_empty());
    }

    #[test]
    fn empty_horizon_has_no_constraints() {
        let (query, _) = build_world_model(0, 3);
        assert!(query.declarations.is_empty());
        assert!(query.assertions.is_empty());
    }

    #[test]
    fn repeated_builds_are_identical() {
        let (a, run_a) = build_world_model(3, 4);
        let (b, run_b) = build_world_model(3, 4);
        assert_eq!(run_a, run_b);
        assert_eq!(a.declarations, b.declarations);
        assert_eq!(a.assertions, b.assertions);
    }

    #[test]
    fn move_offset_encodes_axis_moves_only() {
        let (_, run) = build_world_model(2, 3);
        assert_eq!(
            to_smtlib(&run.move_offset(Axis::Row, 0)),
            "(ite north_0 (- 1) (ite south_0 1 0))"
        );
        assert_eq!(
            to_smtlib(&run.move_offset(Axis::Column, 0)),
            "(ite east_0 1 (ite west_0 (- 1) 0))"
        );
    }

    #[test]
    fn unconstrained_model_is_satisfiable() {
        let (query, _) = build_world_model(3, 4);
        assert_eq!(solve(&query, &[]), SatResult::Sat);
    }

    #[test]
    fn two_directions_at_once_are_rejected() {
        let (query, run) = build_world_model(1, 4);
        let extra = [
            run.direction(Direction::North, 0),
            run.direction(Direction::South, 0),
        ];
        assert_eq!(solve(&query, &extra), SatResult::Unsat);
    }

    #[test]
    fn grid_too_small_for_three_goals_is_unsat() {
        let (query, _) = build_world_model(1, 1);
        assert_eq!(solve(&query, &[]), SatResult::Unsat);
    }

    #[test]
    fn goal_cannot_move_without_capture() {
        let (query, run) = build_world_model(2, 5);
        let extra = [
            run.agent(Axis::Row, 0).eq(SmtTerm::int(4)),
            run.agent(Axis::Column, 0).eq(SmtTerm::int(4)),
            run.goal(0, Axis::Row, 0).eq(SmtTerm::int(0)),
            run.goal(0, Axis::Column, 0).eq(SmtTerm::int(0)),
            run.goal(0, Axis::Row, 1).eq(SmtTerm::int(1)),
        ];
        assert_eq!(solve(&query, &extra), SatResult::Unsat);
    }

    #[test]
    fn goal_may_move_when_agent_steps_onto_it() {
        let (query, run) = build_world_model(2, 5);
        let extra = [
            run.agent(Axis::Row, 0).eq(SmtTerm::int(1)),
            run.agent(Axis::Column, 0).eq(SmtTerm::int(0)),
            run.direction(Direction::North, 0),
            run.goal(0, Axis::Row, 0).eq(SmtTerm::int(0)),
            run.goal(0, Axis::Column, 0).eq(SmtTerm::int(0)),
            run.goal(0, Axis::Row, 1).eq(SmtTerm::int(3)),
        ];
        assert_eq!(solve(&query, &extra), SatResult::Sat);
    }

    #[test]
    fn script_declares_guards_and_checks_assuming() {
        let (mut query, run) = build_world_model(1, 3);
        query.add_obligation(0, "pin", run.agent(Axis::Row, 0).eq(SmtTerm::int(1)));
        let script = query.to_smtlib_script();
        assert!(script.contains("(declare-const a_row_0 Int)"));
        assert!(script.contains("(declare-const north_0 Bool)"));
        assert!(script.contains("(declare-const guard_0 Bool)"));
        assert!(script.contains("(assert (=> guard_0 (= a_row_0 1)))"));
        assert!(script.trim_end().ends_with("(check-sat-assuming (guard_0))"));
    }

    #[test]
    fn script_without_obligations_uses_plain_check_sat() {
        let (query, _) = build_world_model(1, 3);
        assert!(query.to_smtlib_script().trim_end().ends_with("(check-sat)"));
    }
}
