//! Command-line front end for `envelope-core`.
//!
//! The binary reads one payload, runs the inspection pipeline and prints
//! the report. Argument parsing and input selection live here so they can
//! be tested without spawning a process.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod args;
pub mod input;
