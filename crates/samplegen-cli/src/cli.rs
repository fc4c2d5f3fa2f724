//! Command-line arguments.

use chrono::{DateTime, Utc};
use clap::Parser;
use samplegen_codegen::PipelineConfig;
use samplegen_core::cli::OutputFormat;
use samplegen_core::{Error, Result};
use std::path::PathBuf;

/// Generate runnable code samples for a client library.
///
/// Reads a serialized `CodeGeneratorRequest` and a YAML sample
/// configuration, renders every sample through the `sample` template, and
/// writes the sample files plus a manifest under the output directory.
#[derive(Parser, Debug)]
#[command(name = "samplegen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// YAML file with a top-level `samples` list
    #[arg(long = "sampleconfig", value_name = "PATH")]
    pub sample_config: PathBuf,

    /// Binary `CodeGeneratorRequest` describing the API
    #[arg(long = "serialized-proto", value_name = "PATH")]
    pub serialized_proto: PathBuf,

    /// Directory of `*.hbs` templates; must contain `sample.hbs`
    #[arg(long, value_name = "PATH")]
    pub template_dir: PathBuf,

    /// Directory samples and the manifest are written under
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub output_dir: PathBuf,

    /// Unix time (seconds) stamped into the manifest file name
    #[arg(long, value_name = "SECS", env = "SOURCE_DATE_EPOCH")]
    pub manifest_time: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Summary format (json, text, pretty)
    #[arg(long = "format", default_value = "pretty")]
    pub format: String,
}

impl Cli {
    /// Parses `--format`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for an unknown format.
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.format.parse()
    }

    /// Parses `--manifest-time`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the value is not an integer or is
    /// out of range.
    pub fn manifest_time(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.manifest_time.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }

        let secs: i64 = raw.parse().map_err(|_| {
            Error::InvalidArgument(format!("invalid manifest time: '{raw}' (expected unix seconds)"))
        })?;
        DateTime::from_timestamp(secs, 0)
            .map(Some)
            .ok_or_else(|| Error::InvalidArgument(format!("manifest time out of range: {secs}")))
    }

    /// Builds the pipeline configuration from the arguments.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `--manifest-time` is invalid.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        Ok(PipelineConfig::new(
            &self.sample_config,
            &self.serialized_proto,
            &self.template_dir,
        )
        .with_output_dir(&self.output_dir)
        .with_manifest_time(self.manifest_time()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const REQUIRED: [&str; 7] = [
        "samplegen",
        "--sampleconfig",
        "samples.yaml",
        "--serialized-proto",
        "request.bin",
        "--template-dir",
        "templates",
    ];

    fn parse(extra: &[&str]) -> Cli {
        Cli::parse_from(REQUIRED.iter().chain(extra).copied())
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parsing_required() {
        let cli = parse(&[]);
        assert_eq!(cli.sample_config, PathBuf::from("samples.yaml"));
        assert_eq!(cli.serialized_proto, PathBuf::from("request.bin"));
        assert_eq!(cli.template_dir, PathBuf::from("templates"));
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert!(!cli.verbose);
        assert_eq!(cli.output_format().unwrap(), OutputFormat::Pretty);
    }

    #[test]
    fn test_cli_missing_required_fails() {
        let result = Cli::try_parse_from(["samplegen", "--sampleconfig", "samples.yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_options() {
        let cli = parse(&["--output-dir", "out", "-v", "--format", "json"]);
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert!(cli.verbose);
        assert_eq!(cli.output_format().unwrap(), OutputFormat::Json);
    }

    #[test]
    fn test_invalid_format_is_invalid_argument() {
        let cli = parse(&["--format", "xml"]);
        let err = cli.output_format().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_manifest_time_parsing() {
        let cli = parse(&["--manifest-time", "1700000000"]);
        let time = cli.manifest_time().unwrap().unwrap();
        assert_eq!(time.format("%Y%m%d.%H%M%S").to_string(), "20231114.221320");
    }

    #[test]
    fn test_manifest_time_rejects_garbage() {
        let cli = parse(&["--manifest-time", "yesterday"]);
        assert!(matches!(
            cli.manifest_time().unwrap_err(),
            Error::InvalidArgument(_)
        ));
        assert!(cli.pipeline_config().is_err());
    }

    #[test]
    fn test_manifest_time_blank_means_none() {
        let cli = parse(&["--manifest-time", " "]);
        assert_eq!(cli.manifest_time().unwrap(), None);
    }

    #[test]
    fn test_pipeline_config_carries_paths() {
        let cli = parse(&["--output-dir", "out", "--manifest-time", "0"]);
        let config = cli.pipeline_config().unwrap();
        assert_eq!(config.sample_config, PathBuf::from("samples.yaml"));
        assert_eq!(config.template_dir, PathBuf::from("templates"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.manifest_time, DateTime::from_timestamp(0, 0));
    }
}
