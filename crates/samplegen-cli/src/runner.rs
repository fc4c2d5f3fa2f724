//! Command execution and logging setup.

use anyhow::{Context, Result};
use colored::Colorize;
use samplegen_codegen::Pipeline;
use samplegen_core::cli::ExitCode;
use std::io::Write;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::formatters::format_report;

/// Initializes logging.
///
/// `--verbose` forces the `debug` level; otherwise `RUST_LOG` is honored,
/// falling back to `info`. Logs go to stderr so stdout carries only the
/// run summary.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to initialize logging")?;

    Ok(())
}

/// Runs the pipeline for `cli` and writes the summary to `out`.
///
/// Generation failures are reported on stderr and turned into their exit
/// code; only failures to emit the summary are returned as errors.
///
/// # Errors
///
/// Returns an error if the summary cannot be formatted or written.
pub fn execute<W: Write>(cli: &Cli, out: &mut W) -> Result<ExitCode> {
    let outcome = cli.output_format().and_then(|format| {
        let config = cli.pipeline_config()?;
        tracing::debug!(?config, "starting generation");
        Pipeline::new(config).run().map(|report| (format, report))
    });

    match outcome {
        Ok((format, report)) => {
            tracing::info!(
                samples = report.samples.len(),
                bytes = report.total_bytes(),
                manifest = %report.manifest.display(),
                "generation finished"
            );
            let summary = format_report(&report, format).context("failed to format summary")?;
            writeln!(out, "{summary}").context("failed to write summary")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            Ok(ExitCode::for_error(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsString;

    #[test]
    fn test_invalid_format_exits_with_general_error() {
        let cli = Cli::parse_from([
            "samplegen",
            "--sampleconfig",
            "samples.yaml",
            "--serialized-proto",
            "request.bin",
            "--template-dir",
            "templates",
            "--format",
            "xml",
        ]);
        let mut out = Vec::new();

        let code = execute(&cli, &mut out).unwrap();

        assert_eq!(code, ExitCode::ERROR);
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_template_dir_exits_with_input_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("no-templates");
        let args: Vec<OsString> = vec![
            "samplegen".into(),
            "--sampleconfig".into(),
            dir.path().join("samples.yaml").into(),
            "--serialized-proto".into(),
            dir.path().join("request.bin").into(),
            "--template-dir".into(),
            missing.into(),
        ];
        let cli = Cli::parse_from(args);
        let mut out = Vec::new();

        let code = execute(&cli, &mut out).unwrap();

        assert_eq!(code, ExitCode::INPUT_ERROR);
        assert!(out.is_empty());
    }
}
