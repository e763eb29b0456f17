#![doc = include_str!("../README.md")]

//! Recorded-run data model for gridtrace.
//!
//! This crate defines grid positions and movement directions, the
//! `RunTrace` bundle handed over by a simulation driver, shape validation,
//! and the capture and pursuit schedule that the behavioral checks derive
//! from goal relocations.

pub mod grid;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
pub mod pursuit;
pub mod trace;

pub use grid::{Direction, GridPosition};
pub use pursuit::{CaptureEvent, PursuitSegment};
pub use trace::{RecordedStep, RunTrace, TraceError, GOAL_SLOTS};
