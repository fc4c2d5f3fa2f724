//! CLI-specific types and utilities.
//!
//! Strong types for CLI concepts: how the run summary is printed and which
//! process exit code each failure class maps to.
//!
//! # Examples
//!
//! ```
//! use samplegen_core::cli::{ExitCode, OutputFormat};
//!
//! let format = OutputFormat::Pretty;
//! assert_eq!(format.as_str(), "pretty");
//!
//! let code = ExitCode::SUCCESS;
//! assert_eq!(code.as_i32(), 0);
//! ```

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// CLI output format for the run summary.
///
/// # Examples
///
/// ```
/// use samplegen_core::cli::OutputFormat;
///
/// let format: OutputFormat = "json".parse().unwrap();
/// assert_eq!(format, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// JSON output for machine parsing
    Json,
    /// Plain text output for scripts
    Text,
    /// Pretty-printed output with colors for human reading
    #[default]
    Pretty,
}

impl OutputFormat {
    /// Returns the string representation of the format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "pretty" => Ok(Self::Pretty),
            _ => Err(Error::InvalidArgument(format!(
                "invalid output format: '{s}' (expected: json, text, or pretty)"
            ))),
        }
    }
}

/// CLI exit code with semantic meaning.
///
/// Success is 0; every error class from [`Error`] has its own non-zero code.
///
/// # Examples
///
/// ```
/// use samplegen_core::cli::ExitCode;
/// use samplegen_core::Error;
///
/// let err = Error::InvalidArgument("bad".to_string());
/// assert_eq!(ExitCode::for_error(&err), ExitCode::ERROR);
/// assert!(!ExitCode::ERROR.is_success());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Successful execution (exit code 0).
    pub const SUCCESS: Self = Self(0);

    /// General error (exit code 1).
    pub const ERROR: Self = Self(1);

    /// Malformed or unreadable input (exit code 2).
    pub const INPUT_ERROR: Self = Self(2);

    /// Invalid sample specification (exit code 3).
    pub const CONFIG_ERROR: Self = Self(3);

    /// Template rendering failure (exit code 4).
    pub const TEMPLATE_ERROR: Self = Self(4);

    /// Output file could not be written (exit code 5).
    pub const IO_ERROR: Self = Self(5);

    /// Two samples resolved to the same output path (exit code 6).
    pub const PATH_COLLISION: Self = Self(6);

    /// Creates an exit code from an integer value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        Self(code)
    }

    /// Maps an error onto its exit code.
    #[must_use]
    pub const fn for_error(error: &Error) -> Self {
        match error {
            Error::InputError { .. } => Self::INPUT_ERROR,
            Error::ConfigError { .. } => Self::CONFIG_ERROR,
            Error::TemplateError { .. } => Self::TEMPLATE_ERROR,
            Error::IoError { .. } => Self::IO_ERROR,
            Error::PathCollision { .. } => Self::PATH_COLLISION,
            Error::InvalidArgument(_) => Self::ERROR,
        }
    }

    /// Returns the exit code as an integer.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Checks if the exit code represents success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
