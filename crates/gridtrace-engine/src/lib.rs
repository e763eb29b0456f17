#![doc = include_str!("../README.md")]

//! gridtrace check engine.
//!
//! This crate turns a recorded run into per-property reports: it validates
//! the input, selects the encoder for each property, optionally dumps the
//! SMT-LIB script, solves, and runs the four checks side by side.

pub mod pipeline;
pub mod result;
