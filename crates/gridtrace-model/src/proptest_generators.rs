//! Proptest strategies for generating legal recorded runs.
//!
//! Runs are produced by stepping the world rules directly, the way the
//! simulation driver records them: the state at `t` is recorded together with
//! the action, then the move is applied, and a goal the agent lands on is
//! relocated to a free cell before step `t + 1` is recorded.

use proptest::prelude::*;

use crate::grid::{Direction, GridPosition};
use crate::trace::{RecordedStep, RunTrace, GOAL_SLOTS};

/// Raw material for one simulated run.
#[derive(Debug, Clone)]
pub struct RunSeed {
    pub grid_size: u32,
    pub agent: GridPosition,
    pub goals: [GridPosition; GOAL_SLOTS],
    /// Preferred action per step; replaced by its reverse when it would leave the grid.
    pub actions: Vec<Direction>,
    /// Picks the relocation cell among the free cells, modulo their count.
    pub relocations: Vec<u32>,
}

/// Simulate a run from a seed. Every produced trace satisfies the world rules.
///
/// Requires `grid_size >= 2`, in-bounds starting cells, and pairwise
/// distinct goals.
pub fn simulate_run(seed: &RunSeed) -> RunTrace {
    let mut agent = seed.agent;
    let mut goals = seed.goals;
    let mut relocations = seed.relocations.iter().copied().cycle();
    let mut steps = Vec::with_capacity(seed.actions.len());

    for &preferred in &seed.actions {
        let action = if agent.step(preferred).in_bounds(seed.grid_size) {
            preferred
        } else {
            preferred.reverse()
        };
        steps.push(RecordedStep {
            agent,
            goals,
            action,
        });

        agent = agent.step(action);
        if let Some(slot) = goals.iter().position(|g| *g == agent) {
            let free = free_cells(seed.grid_size, &goals);
            let pick = relocations.next().unwrap_or(0) as usize % free.len();
            goals[slot] = free[pick];
        }
    }

    RunTrace::from_steps(seed.grid_size, steps)
}

/// Cells not occupied by any goal, in row-major order.
///
/// The captured goal's own cell is excluded as well, so the refilled slot
/// always moves and never lands under the agent.
fn free_cells(grid_size: u32, goals: &[GridPosition; GOAL_SLOTS]) -> Vec<GridPosition> {
    let n = i64::from(grid_size);
    let mut out = Vec::new();
    for row in 0..n {
        for column in 0..n {
            let cell = GridPosition::new(row, column);
            if !goals.contains(&cell) {
                out.push(cell);
            }
        }
    }
    out
}

pub fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::North),
        Just(Direction::East),
        Just(Direction::South),
        Just(Direction::West),
    ]
}

/// Strategy for a run seed with a grid of 2..=7 cells per side and 1..=16 steps.
pub fn arb_run_seed() -> impl Strategy<Value = RunSeed> {
    (2u32..=7, 1usize..=16)
        .prop_flat_map(|(grid_size, horizon)| {
            let n = i64::from(grid_size);
            let cells: Vec<GridPosition> = (0..n)
                .flat_map(|row| (0..n).map(move |column| GridPosition::new(row, column)))
                .collect();
            (
                Just(grid_size),
                proptest::sample::subsequence(cells, 1 + GOAL_SLOTS).prop_shuffle(),
                proptest::collection::vec(arb_direction(), horizon..=horizon),
                proptest::collection::vec(any::<u32>(), 1..=4),
            )
        })
        .prop_map(|(grid_size, cells, actions, relocations)| RunSeed {
            grid_size,
            agent: cells[0],
            goals: [cells[1], cells[2], cells[3]],
            actions,
            relocations,
        })
}

/// Strategy for a legal recorded run.
pub fn arb_legal_run() -> impl Strategy<Value = RunTrace> {
    arb_run_seed().prop_map(|seed| simulate_run(&seed))
}
