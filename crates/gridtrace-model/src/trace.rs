use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::grid::{Direction, GridPosition};
use crate::pursuit::{self, CaptureEvent, PursuitSegment};

/// Number of goal slots in every run. Fixed, not configurable.
pub const GOAL_SLOTS: usize = 3;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("shape mismatch: {what} has length {found}, expected {expected}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    #[error("expected {GOAL_SLOTS} goal slots, got {found}")]
    GoalArity { found: usize },
    #[error("invalid action code {code} (expected 0..=3)")]
    InvalidAction { code: u8 },
    #[error("run trace JSON decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Everything the driver recorded at one timestep, before the move was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedStep {
    pub agent: GridPosition,
    pub goals: [GridPosition; GOAL_SLOTS],
    pub action: Direction,
}

/// A complete recorded run.
///
/// `goals` is slot-major: `goals[slot][t]` is the position of goal slot
/// `slot` at timestep `t`. The horizon T is the common length of `agent`,
/// `actions` and every goal track; [`RunTrace::validate`] enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTrace {
    /// Side length of the square grid.
    pub grid_size: u32,
    /// Agent position at each timestep.
    pub agent: Vec<GridPosition>,
    /// Goal slot tracks.
    pub goals: Vec<Vec<GridPosition>>,
    /// Action taken at each timestep.
    pub actions: Vec<Direction>,
}

impl RunTrace {
    pub fn new(
        grid_size: u32,
        agent: Vec<GridPosition>,
        goals: Vec<Vec<GridPosition>>,
        actions: Vec<Direction>,
    ) -> Self {
        Self {
            grid_size,
            agent,
            goals,
            actions,
        }
    }

    /// Build a trace from per-timestep records. The result is always well-shaped.
    pub fn from_steps(grid_size: u32, steps: Vec<RecordedStep>) -> Self {
        let mut agent = Vec::with_capacity(steps.len());
        let mut goals = vec![Vec::with_capacity(steps.len()); GOAL_SLOTS];
        let mut actions = Vec::with_capacity(steps.len());
        for step in steps {
            agent.push(step.agent);
            for (slot, pos) in step.goals.iter().enumerate() {
                goals[slot].push(*pos);
            }
            actions.push(step.action);
        }
        Self::new(grid_size, agent, goals, actions)
    }

    /// Decode a trace from its JSON form and validate its shape.
    pub fn from_json(raw: &str) -> Result<Self, TraceError> {
        let trace: RunTrace = serde_json::from_str(raw)?;
        trace.validate()?;
        Ok(trace)
    }

    pub fn to_json(&self) -> Result<String, TraceError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check that all sequences agree on one horizon and return it.
    ///
    /// Never truncates or pads: any disagreement is an error.
    pub fn validate(&self) -> Result<usize, TraceError> {
        if self.goals.len() != GOAL_SLOTS {
            return Err(TraceError::GoalArity {
                found: self.goals.len(),
            });
        }
        let horizon = self.agent.len();
        if self.actions.len() != horizon {
            return Err(TraceError::ShapeMismatch {
                what: "action trace".into(),
                expected: horizon,
                found: self.actions.len(),
            });
        }
        for (slot, track) in self.goals.iter().enumerate() {
            if track.len() != horizon {
                return Err(TraceError::ShapeMismatch {
                    what: format!("goal slot {slot} trace"),
                    expected: horizon,
                    found: track.len(),
                });
            }
        }
        Ok(horizon)
    }

    /// Number of recorded timesteps (the agent track length).
    pub fn horizon(&self) -> usize {
        self.agent.len()
    }

    /// Goal positions of all slots at timestep `t`.
    ///
    /// Panics if `t` is out of range or the trace is malformed; call
    /// [`RunTrace::validate`] first.
    pub fn goals_at(&self, t: usize) -> [GridPosition; GOAL_SLOTS] {
        [self.goals[0][t], self.goals[1][t], self.goals[2][t]]
    }

    pub fn capture_events(&self) -> Vec<CaptureEvent> {
        pursuit::capture_events(&self.goals)
    }

    pub fn pursuit_segments(&self) -> Vec<PursuitSegment> {
        pursuit::pursuit_segments(&self.capture_events())
    }

    /// SHA-256 over a canonical little-endian encoding of the trace.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.grid_size.to_le_bytes());
        hasher.update((self.agent.len() as u64).to_le_bytes());
        for pos in &self.agent {
            hasher.update(pos.row.to_le_bytes());
            hasher.update(pos.column.to_le_bytes());
        }
        hasher.update((self.goals.len() as u64).to_le_bytes());
        for track in &self.goals {
            hasher.update((track.len() as u64).to_le_bytes());
            for pos in track {
                hasher.update(pos.row.to_le_bytes());
                hasher.update(pos.column.to_le_bytes());
            }
        }
        hasher.update((self.actions.len() as u64).to_le_bytes());
        for action in &self.actions {
            hasher.update([action.code()]);
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn singleton() -> RunTrace {
        RunTrace::from_steps(
            3,
            vec![RecordedStep {
                agent: GridPosition::new(1, 1),
                goals: [
                    GridPosition::new(0, 0),
                    GridPosition::new(0, 2),
                    GridPosition::new(2, 2),
                ],
                action: Direction::North,
            }],
        )
    }

    #[test]
    fn from_steps_is_slot_major() {
        let trace = singleton();
        assert_eq!(trace.validate().expect("well-shaped"), 1);
        assert_eq!(trace.goals.len(), GOAL_SLOTS);
        assert_eq!(trace.goals[2][0], GridPosition::new(2, 2));
        assert_eq!(trace.goals_at(0)[1], GridPosition::new(0, 2));
    }

    #[test]
    fn empty_trace_has_zero_horizon() {
        let trace = RunTrace::from_steps(5, Vec::new());
        assert_eq!(trace.validate().expect("empty is well-shaped"), 0);
    }

    #[test]
    fn short_action_trace_is_rejected() {
        let mut trace = singleton();
        trace.actions.clear();
        match trace.validate() {
            Err(TraceError::ShapeMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, 1);
                assert_eq!(found, 0);
            }
            other => panic!("expected shape mismatch, got {other:?}"),
        }
    }

    #[test]
    fn long_goal_track_is_rejected() {
        let mut trace = singleton();
        trace.goals[1].push(GridPosition::new(1, 0));
        let err = trace.validate().expect_err("goal slot 1 is too long");
        assert!(err.to_string().contains("goal slot 1"), "got: {err}");
    }

    #[test]
    fn goal_arity_other_than_three_is_rejected() {
        let mut trace = singleton();
        trace.goals.pop();
        assert!(matches!(
            trace.validate(),
            Err(TraceError::GoalArity { found: 2 })
        ));

        let mut trace = singleton();
        trace.goals.push(vec![GridPosition::new(1, 0)]);
        assert!(matches!(
            trace.validate(),
            Err(TraceError::GoalArity { found: 4 })
        ));
    }

    #[test]
    fn json_uses_driver_encoding() {
        let raw = r#"{
            "grid_size": 3,
            "agent": [[1, 1]],
            "goals": [[[0, 0]], [[0, 2]], [[2, 2]]],
            "actions": [0]
        }"#;
        let trace = RunTrace::from_json(raw).expect("decode");
        assert_eq!(trace, singleton());

        let encoded = trace.to_json().expect("encode");
        assert_eq!(RunTrace::from_json(&encoded).expect("re-decode"), trace);
    }

    #[test]
    fn json_with_bad_action_code_is_rejected() {
        let raw = r#"{
            "grid_size": 3,
            "agent": [[1, 1]],
            "goals": [[[0, 0]], [[0, 2]], [[2, 2]]],
            "actions": [7]
        }"#;
        let err = RunTrace::from_json(raw).expect_err("action 7 is not a direction");
        assert!(matches!(err, TraceError::Decode(_)));
        assert!(err.to_string().contains("invalid action code 7"), "got: {err}");
    }

    #[test]
    fn json_with_ragged_shape_is_rejected() {
        let raw = r#"{
            "grid_size": 3,
            "agent": [[1, 1], [0, 1]],
            "goals": [[[0, 0]], [[0, 2]], [[2, 2]]],
            "actions": [0, 0]
        }"#;
        assert!(matches!(
            RunTrace::from_json(raw),
            Err(TraceError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let trace = singleton();
        assert_eq!(trace.fingerprint(), singleton().fingerprint());
        assert_eq!(trace.fingerprint().len(), 64);

        let mut moved = singleton();
        moved.actions[0] = Direction::West;
        assert_ne!(trace.fingerprint(), moved.fingerprint());
    }
}
