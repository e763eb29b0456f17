//! Capture and pursuit schedule derived from goal relocations.
//!
//! A goal slot whose position differs between `t` and `t + 1` was captured:
//! the agent walked onto its old cell and the slot was refilled elsewhere.
//! The slot captured next is, in hindsight, the goal the agent was pursuing
//! since the previous capture.

use serde::{Deserialize, Serialize};

use crate::grid::GridPosition;

/// Goal slot `slot` was captured, effective at timestep `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureEvent {
    pub slot: usize,
    pub step: usize,
}

/// Interval `[chosen_at, captured_at)` during which `slot` was the pursued goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PursuitSegment {
    pub slot: usize,
    /// Timestep at which this goal became the target.
    pub chosen_at: usize,
    /// Timestep at which the goal was captured.
    pub captured_at: usize,
}

impl PursuitSegment {
    pub fn contains(&self, t: usize) -> bool {
        (self.chosen_at..self.captured_at).contains(&t)
    }
}

/// Capture events ordered by step, then by slot.
///
/// Tracks are compared up to the shortest one; shape checking is the
/// caller's job.
pub fn capture_events(goals: &[Vec<GridPosition>]) -> Vec<CaptureEvent> {
    let horizon = goals.iter().map(Vec::len).min().unwrap_or(0);
    let mut events = Vec::new();
    for t in 0..horizon.saturating_sub(1) {
        for (slot, track) in goals.iter().enumerate() {
            if track[t] != track[t + 1] {
                events.push(CaptureEvent { slot, step: t + 1 });
            }
        }
    }
    events
}

/// Split the run into pursuit segments, one per capture.
///
/// The first goal is chosen at step 0; each later goal is chosen at the
/// step the previous one was captured. Timesteps after the last capture
/// belong to no segment.
pub fn pursuit_segments(events: &[CaptureEvent]) -> Vec<PursuitSegment> {
    let mut chosen_at = 0;
    events
        .iter()
        .map(|event| {
            let segment = PursuitSegment {
                slot: event.slot,
                chosen_at,
                captured_at: event.step,
            };
            chosen_at = event.step;
            segment
        })
        .collect()
}

/// Goal slot pursued at timestep `t`: the slot of the first capture strictly after `t`.
pub fn target_at(segments: &[PursuitSegment], t: usize) -> Option<usize> {
    segments
        .iter()
        .find(|segment| segment.captured_at > t)
        .map(|segment| segment.slot)
}
