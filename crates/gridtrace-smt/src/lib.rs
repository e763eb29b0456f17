#![doc = include_str!("../README.md")]

//! SMT encoding and solver integration for recorded grid runs.
//!
//! This crate builds QF_LIA encodings of the grid world dynamics, pins a
//! recorded run into them, adds per-step property obligations, and decides
//! the result through a pluggable solver interface with a Z3 backend.

pub mod backends;
pub mod encoder;
pub mod runner;
pub mod solver;
pub mod sorts;
pub mod terms;
