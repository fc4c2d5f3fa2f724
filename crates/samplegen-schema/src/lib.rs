//! API schema model for sample generation.
//!
//! Decodes the protoc `CodeGeneratorRequest`, parses generator options from
//! its parameter string, and builds an immutable [`ApiSchema`] that the
//! sample generator and manifest builder query.
//!
//! # Examples
//!
//! ```no_run
//! use samplegen_schema::{ApiSchema, request};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), samplegen_core::Error> {
//! let req = request::load(Path::new("request.bin"))?;
//! let schema = ApiSchema::from_request(&req)?;
//! println!("{} {}", schema.naming().name(), schema.naming().version());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod api;
pub mod calling_form;
pub mod naming;
pub mod options;
pub mod request;

#[cfg(any(test, feature = "testing"))]
pub mod fixtures;

pub use api::{ApiSchema, Field, Message, Method, Service};
pub use calling_form::CallingForm;
pub use naming::Naming;
pub use options::Options;
