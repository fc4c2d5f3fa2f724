//! Error types for sample generation.
//!
//! Every fatal condition in a generation run maps onto one variant of
//! [`Error`]. Nothing is recovered locally: the first error aborts the run.
//!
//! # Examples
//!
//! ```
//! use samplegen_core::{Error, Result};
//!
//! fn require_id(id: &str) -> Result<()> {
//!     if id.is_empty() {
//!         return Err(Error::ConfigError {
//!             sample: None,
//!             message: "sample id cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = require_id("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for sample generation.
///
/// All errors in the system use this type, providing consistent error handling
/// across all crates in the workspace.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or unreadable input.
    ///
    /// Raised while ingesting the serialized request, the sample
    /// configuration, or the template directory.
    #[error("Invalid input {}: {message}", .path.display())]
    InputError {
        /// Path of the offending input
        path: PathBuf,
        /// Description of the problem
        message: String,
        /// Underlying error cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    ///
    /// Raised when a sample specification is missing required fields,
    /// references unknown services or methods, or cannot be cross-referenced
    /// by the manifest.
    #[error("Configuration error{}: {message}", sample_suffix(.sample.as_deref()))]
    ConfigError {
        /// Sample id the problem belongs to, if any
        sample: Option<String>,
        /// Description of the configuration problem
        message: String,
    },

    /// Template rendering or registration failed.
    ///
    /// Covers undefined variables, unknown helpers, missing templates and
    /// template syntax errors.
    #[error("Template error in '{template}'{}: {message}", sample_suffix(.sample.as_deref()))]
    TemplateError {
        /// Template name
        template: String,
        /// Sample id being rendered, if any
        sample: Option<String>,
        /// Description of the failure
        message: String,
    },

    /// Writing a sample or manifest file failed.
    #[error("Failed to write {}", .path.display())]
    IoError {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Two samples resolved to the same output path.
    #[error("Samples '{first}' and '{second}' both resolve to {}", .path.display())]
    PathCollision {
        /// The shared output path
        path: PathBuf,
        /// Id of the sample that claimed the path first
        first: String,
        /// Id of the sample that collided with it
        second: String,
    },

    /// Invalid argument error.
    ///
    /// Raised when CLI arguments or function parameters are invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

fn sample_suffix(sample: Option<&str>) -> String {
    sample.map_or_else(String::new, |id| format!(" (sample '{id}')"))
}

impl Error {
    /// Returns `true` if this is an input error.
    ///
    /// # Examples
    ///
    /// ```
    /// use samplegen_core::Error;
    /// use std::path::PathBuf;
    ///
    /// let err = Error::InputError {
    ///     path: PathBuf::from("samples.yaml"),
    ///     message: "not valid YAML".to_string(),
    ///     source: None,
    /// };
    /// assert!(err.is_input_error());
    /// ```
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InputError { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a template error.
    ///
    /// # Examples
    ///
    /// ```
    /// use samplegen_core::Error;
    ///
    /// let err = Error::TemplateError {
    ///     template: "sample".to_string(),
    ///     sample: Some("x".to_string()),
    ///     message: "Variable \"missing\" not found in strict mode".to_string(),
    /// };
    /// assert!(err.is_template_error());
    /// assert!(err.to_string().contains("sample 'x'"));
    /// ```
    #[must_use]
    pub const fn is_template_error(&self) -> bool {
        matches!(self, Self::TemplateError { .. })
    }

    /// Returns `true` if this is a file write error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::IoError { .. })
    }

    /// Returns `true` if two samples resolved to the same path.
    #[must_use]
    pub const fn is_path_collision(&self) -> bool {
        matches!(self, Self::PathCollision { .. })
    }

    /// Returns the sample id this error is attributed to, if any.
    #[must_use]
    pub fn sample_id(&self) -> Option<&str> {
        match self {
            Self::ConfigError { sample, .. } | Self::TemplateError { sample, .. } => {
                sample.as_deref()
            }
            Self::PathCollision { second, .. } => Some(second),
            _ => None,
        }
    }

    /// Names `input` as the offending file of an `InputError` raised
    /// without one. Any other error is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use samplegen_core::Error;
    /// use std::path::{Path, PathBuf};
    ///
    /// let err = Error::InputError {
    ///     path: PathBuf::new(),
    ///     message: "no proto package".to_string(),
    ///     source: None,
    /// };
    /// let err = err.with_input_path(Path::new("request.bin"));
    /// assert!(err.to_string().contains("request.bin"));
    /// ```
    #[must_use]
    pub fn with_input_path(self, input: &Path) -> Self {
        match self {
            Self::InputError {
                path,
                message,
                source,
            } if path.as_os_str().is_empty() => Self::InputError {
                path: input.to_path_buf(),
                message,
                source,
            },
            other => other,
        }
    }
}

/// Result type alias for sample generation.
///
/// This is a convenience alias for `Result<T, Error>` used throughout
/// the codebase.
pub type Result<T> = std::result::Result<T, Error>;
