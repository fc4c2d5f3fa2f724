//! Target language profile shared by sample generation and the manifest.

use serde::Serialize;

/// Where samples go and how the manifest tells tools to run them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageProfile {
    /// Manifest environment name and anchor, e.g. `python`.
    pub environment: String,
    /// Interpreter binary, e.g. `python3`.
    pub bin: String,
    /// Sample file extension without the dot.
    pub extension: String,
    /// Directory samples are written to, relative to the output directory.
    pub base_path: String,
    /// Invocation pattern, written verbatim into the manifest.
    pub invocation: String,
    /// Literal emitted at the top of every sample file.
    pub file_header: String,
}

impl LanguageProfile {
    /// The Python profile.
    #[must_use]
    pub fn python() -> Self {
        Self {
            environment: "python".to_string(),
            bin: "python3".to_string(),
            extension: "py".to_string(),
            base_path: "samples".to_string(),
            invocation: "'{bin} {path} @args'".to_string(),
            file_header: "# -*- coding: utf-8 -*-\n#\n# DO NOT EDIT! This is a generated sample.\n\n"
                .to_string(),
        }
    }
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self::python()
    }
}
