#![allow(dead_code)]

use std::collections::VecDeque;

use gridtrace_model::{Direction, GridPosition, RecordedStep, RunTrace};

pub use Direction::{East as E, North as N, South as S, West as W};

pub fn p(row: i64, column: i64) -> GridPosition {
    GridPosition::new(row, column)
}

/// Records a run by replaying moves under the world rules.
///
/// A goal the agent walks onto is refilled from the queued cells, in order.
/// The cell reached by the final move is not recorded.
pub struct RunBuilder {
    grid_size: u32,
    agent: GridPosition,
    goals: [GridPosition; 3],
    refills: VecDeque<GridPosition>,
    steps: Vec<RecordedStep>,
}

impl RunBuilder {
    pub fn new(grid_size: u32, agent: GridPosition, goals: [GridPosition; 3]) -> Self {
        Self {
            grid_size,
            agent,
            goals,
            refills: VecDeque::new(),
            steps: Vec::new(),
        }
    }

    pub fn refills(mut self, cells: &[GridPosition]) -> Self {
        self.refills.extend(cells.iter().copied());
        self
    }

    pub fn moves(mut self, actions: &[Direction]) -> Self {
        for &action in actions {
            self.steps.push(RecordedStep {
                agent: self.agent,
                goals: self.goals,
                action,
            });
            self.agent = self.agent.step(action);
            if let Some(slot) = self.goals.iter().position(|g| *g == self.agent) {
                self.goals[slot] = self
                    .refills
                    .pop_front()
                    .expect("a refill cell must be queued for every capture");
            }
        }
        self
    }

    pub fn finish(self) -> RunTrace {
        RunTrace::from_steps(self.grid_size, self.steps)
    }
}
