//! Sample generation for client libraries.
//!
//! Renders one runnable sample per entry of a sample configuration using
//! Handlebars templates, streams each sample to disk chunk by chunk, and
//! writes a manifest that indexes the samples in configuration order.
//!
//! # Examples
//!
//! ```no_run
//! use samplegen_codegen::pipeline::{Pipeline, PipelineConfig};
//!
//! # fn example() -> Result<(), samplegen_core::Error> {
//! let config = PipelineConfig::new("samples.yaml", "request.bin", "templates")
//!     .with_output_dir("out");
//! let report = Pipeline::new(config).run()?;
//! println!("wrote {} samples, manifest at {}", report.samples.len(), report.manifest.display());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod duplicates;
pub mod helpers;
pub mod language;
pub mod manifest;
pub mod pipeline;
pub mod sample;
pub mod template_engine;
pub mod writer;

pub use duplicates::DuplicateIds;
pub use language::LanguageProfile;
pub use manifest::{Manifest, ManifestEntry, build_manifest};
pub use pipeline::{Pipeline, PipelineConfig, RunReport, Stage};
pub use sample::{GeneratedSample, SampleGenerator, TemplateSampleGenerator};
pub use template_engine::TemplateEngine;
pub use writer::write_chunks;
