//! Core types and errors for client library sample generation.
//!
//! This crate provides the foundational types shared by every other crate in
//! the samplegen workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Error hierarchy with contextual information (`Error`, `Result`)
//! - Sample configuration types (`SampleId`, `SampleSpec`, `SampleConfig`)
//! - CLI-facing types (`cli::OutputFormat`, `cli::ExitCode`)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod error;
mod sample;

pub mod cli;

pub use error::{Error, Result};
pub use sample::{SampleConfig, SampleId, SampleSpec};
