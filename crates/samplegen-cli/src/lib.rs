//! Samplegen CLI library.
//!
//! Argument parsing, logging setup and run summaries for the `samplegen`
//! binary, exposed as a library so they can be tested.

#![allow(clippy::format_push_string)]

pub mod cli;
pub mod formatters;
pub mod runner;

pub use cli::Cli;
