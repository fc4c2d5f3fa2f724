//! Run summary formatters.
//!
//! The summary goes to stdout in one of three shapes: JSON for machines,
//! tab-separated text for scripts, and a colored listing for people.

use anyhow::Result;
use colored::Colorize;
use samplegen_codegen::RunReport;
use samplegen_core::cli::OutputFormat;

/// Formats a run summary in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Examples
///
/// ```
/// use samplegen_cli::formatters::format_report;
/// use samplegen_codegen::RunReport;
/// use samplegen_core::cli::OutputFormat;
/// use std::path::PathBuf;
///
/// let report = RunReport {
///     samples: Vec::new(),
///     manifest: PathBuf::from("library.v1.python.manifest.yaml"),
///     manifest_entries: 0,
/// };
///
/// let output = format_report(&report, OutputFormat::Json)?;
/// assert!(output.contains("\"manifest_entries\": 0"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_report(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(report),
        OutputFormat::Text => Ok(text::format(report)),
        OutputFormat::Pretty => Ok(pretty::format(report)),
    }
}

/// JSON output.
pub mod json {
    use super::{Result, RunReport};

    /// Pretty-printed JSON with 2-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn format(report: &RunReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

/// Plain text output.
pub mod text {
    use super::RunReport;

    /// One tab-separated line per sample (`id`, `path`, `bytes`), then the
    /// manifest path.
    pub fn format(report: &RunReport) -> String {
        let mut lines: Vec<String> = report
            .samples
            .iter()
            .map(|s| format!("{}\t{}\t{}", s.id, s.path.display(), s.bytes))
            .collect();
        lines.push(format!("manifest\t{}", report.manifest.display()));
        lines.join("\n")
    }
}

/// Colored, human-readable output.
pub mod pretty {
    use super::{Colorize, RunReport};

    /// Heading with counts, one line per sample, then the manifest.
    pub fn format(report: &RunReport) -> String {
        let mut out = format!(
            "{} {} sample(s), {} bytes\n",
            "Generated".green().bold(),
            report.samples.len().to_string().cyan(),
            report.total_bytes().to_string().cyan()
        );

        for sample in &report.samples {
            let marker = if sample.duplicate {
                format!(" {}", "(duplicate id)".yellow())
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  {} {}{marker}\n",
                sample.id.bold(),
                sample.path.display().to_string().dimmed()
            ));
        }

        out.push_str(&format!(
            "{} {} ({} entries)",
            "Manifest".blue().bold(),
            report.manifest.display(),
            report.manifest_entries
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use samplegen_codegen::pipeline::SampleReport;
    use std::path::PathBuf;

    fn report() -> RunReport {
        RunReport {
            samples: vec![
                SampleReport {
                    id: "get_book".to_string(),
                    path: PathBuf::from("out/samples/get_book.py"),
                    duplicate: false,
                    bytes: 120,
                    chunks: 2,
                },
                SampleReport {
                    id: "list".to_string(),
                    path: PathBuf::from("out/samples/list_0a1b2c3d.py"),
                    duplicate: true,
                    bytes: 80,
                    chunks: 2,
                },
            ],
            manifest: PathBuf::from("out/library.v1.python.manifest.yaml"),
            manifest_entries: 2,
        }
    }

    #[test]
    fn test_json_is_parseable() {
        let output = format_report(&report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["manifest_entries"], 2);
        assert_eq!(value["samples"][1]["duplicate"], true);
        assert_eq!(value["samples"][0]["path"], "out/samples/get_book.py");
    }

    #[test]
    fn test_text_lines() {
        let output = format_report(&report(), OutputFormat::Text).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "get_book\tout/samples/get_book.py\t120",
                "list\tout/samples/list_0a1b2c3d.py\t80",
                "manifest\tout/library.v1.python.manifest.yaml",
            ]
        );
    }

    #[test]
    fn test_text_empty_run() {
        let empty = RunReport {
            samples: Vec::new(),
            manifest: PathBuf::from("m.yaml"),
            manifest_entries: 0,
        };
        assert_eq!(text::format(&empty), "manifest\tm.yaml");
    }

    #[test]
    fn test_pretty_mentions_every_sample() {
        let output = format_report(&report(), OutputFormat::Pretty).unwrap();
        assert!(output.contains("get_book"));
        assert!(output.contains("list_0a1b2c3d.py"));
        assert!(output.contains("duplicate id"));
        assert!(output.contains("(2 entries)"));
        assert_eq!(output.lines().count(), 4);
    }
}
