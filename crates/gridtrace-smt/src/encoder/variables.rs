//! Variable naming conventions for run encodings.
//!
//! - `a_row_t`, `a_col_t`: agent cell at step t
//! - `g{i}_row_t`, `g{i}_col_t`: goal slot i at step t
//! - `d{i}_row_t`, `d{i}_col_t`: signed delta (goal i minus agent) at step t
//! - `north_t` .. `west_t`: direction indicators at step t
//! - `guard_k`: assumption literal for obligation k

use gridtrace_model::Direction;

use super::Axis;

pub(crate) fn agent_var(axis: Axis, step: usize) -> String {
    format!("a_{}_{step}", axis.suffix())
}

pub(crate) fn goal_var(slot: usize, axis: Axis, step: usize) -> String {
    format!("g{slot}_{}_{step}", axis.suffix())
}

pub(crate) fn delta_var(slot: usize, axis: Axis, step: usize) -> String {
    format!("d{slot}_{}_{step}", axis.suffix())
}

pub(crate) fn direction_var(direction: Direction, step: usize) -> String {
    format!("{}_{step}", direction.as_str())
}

pub(crate) fn guard_var(index: usize) -> String {
    format!("guard_{index}")
}

pub(crate) fn parse_guard_var(name: &str) -> Option<usize> {
    name.strip_prefix("guard_")?.parse::<usize>().ok()
}
