//! Sample manifest.
//!
//! The manifest tells test harnesses which samples exist, where they live
//! and how to run them. It is a small YAML document built from blocks that
//! each render independently:
//!
//! ```yaml
//! type: manifest/samples
//! schema_version: 3
//! python: &python
//!   environment: python
//!   bin: python3
//!   base_path: samples
//!   invocation: '{bin} {path} @args'
//! samples:
//! - <<: *python
//!   sample: get_book
//!   path: '{base_path}/get_book.py'
//!   region_tag: library_get_book
//! ```
//!
//! Entries keep the order of the sample configuration.

use crate::language::LanguageProfile;
use chrono::{DateTime, Utc};
use samplegen_core::{Error, Result, SampleSpec};
use samplegen_schema::ApiSchema;
use serde::Serialize;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};

/// Manifest document type.
pub const MANIFEST_TYPE: &str = "manifest/samples";

/// Manifest schema version.
pub const SCHEMA_VERSION: u32 = 3;

/// One sample's manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Sample id.
    pub sample: String,
    /// Path relative to the manifest base path, `/`-separated.
    pub path: String,
    /// Region tag; empty when the spec has none.
    pub region_tag: String,
}

impl ManifestEntry {
    /// Renders the entry as a YAML list item referencing the language
    /// anchor.
    #[must_use]
    pub fn render(&self, environment: &str) -> String {
        format!(
            "- <<: *{environment}\n  sample: {}\n  path: '{{base_path}}/{}'\n  region_tag: {}",
            scalar(&self.sample),
            self.path.replace('\'', "''"),
            scalar(&self.region_tag),
        )
    }
}

/// A built manifest: its file name and ordered entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    file_name: String,
    language: LanguageProfile,
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// File name the manifest should be written under.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Entries in configuration order.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Independently rendered blocks, header first.
    #[must_use]
    pub fn blocks(&self) -> Vec<String> {
        let lang = &self.language;
        let mut blocks = vec![
            format!("type: {MANIFEST_TYPE}"),
            format!("schema_version: {SCHEMA_VERSION}"),
            format!(
                "{env}: &{env}\n  environment: {env}\n  bin: {}\n  base_path: {}\n  invocation: {}",
                scalar(&lang.bin),
                scalar(&lang.base_path),
                lang.invocation,
                env = lang.environment,
            ),
        ];

        if self.entries.is_empty() {
            blocks.push("samples: []".to_string());
        } else {
            blocks.push("samples:".to_string());
            blocks.extend(self.entries.iter().map(|e| e.render(&lang.environment)));
        }

        blocks
    }

    /// The manifest text: every block joined by a single newline.
    #[must_use]
    pub fn render(&self) -> String {
        self.blocks().join("\n")
    }
}

/// Builds the manifest for the generated samples, in the given order.
///
/// Each path must lie under the language's base path. `manifest_time`, when
/// given, is stamped into the file name in UTC.
///
/// # Errors
///
/// Returns `Error::ConfigError` if a path is outside the base path or a
/// spec's `region_tag` is not a string.
pub fn build_manifest(
    samples: &[(PathBuf, SampleSpec)],
    schema: &ApiSchema,
    language: &LanguageProfile,
    manifest_time: Option<DateTime<Utc>>,
) -> Result<Manifest> {
    let base = Path::new(&language.base_path);

    let entries = samples
        .iter()
        .map(|(path, spec)| {
            let id = spec.id().as_str();
            let relative = relative_to(path, base).ok_or_else(|| Error::ConfigError {
                sample: Some(id.to_string()),
                message: format!(
                    "sample path {} is outside the manifest base path '{}'",
                    path.display(),
                    language.base_path
                ),
            })?;

            let region_tag = match spec.field("region_tag") {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(tag)) => tag.clone(),
                Some(_) => {
                    return Err(Error::ConfigError {
                        sample: Some(id.to_string()),
                        message: "`region_tag` must be a string".to_string(),
                    });
                }
            };

            Ok(ManifestEntry {
                sample: id.to_string(),
                path: relative,
                region_tag,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let file_name = manifest_file_name(schema, &language.environment, manifest_time);
    tracing::debug!(file = %file_name, entries = entries.len(), "built manifest");

    Ok(Manifest {
        file_name,
        language: language.clone(),
        entries,
    })
}

/// `{api}.{version}.{environment}[.{YYYYMMDD}.{HHMMSS}].manifest.yaml`,
/// skipping empty segments.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use samplegen_codegen::manifest::manifest_file_name;
/// use samplegen_schema::{ApiSchema, Options};
///
/// let schema = ApiSchema::build(&[], &[], "acme.library.v1", &Options::default())?;
/// assert_eq!(manifest_file_name(&schema, "python", None), "library.v1.python.manifest.yaml");
///
/// let at = Utc.with_ymd_and_hms(2019, 7, 4, 13, 5, 9).unwrap();
/// assert_eq!(
///     manifest_file_name(&schema, "python", Some(at)),
///     "library.v1.python.20190704.130509.manifest.yaml"
/// );
/// # Ok::<(), samplegen_core::Error>(())
/// ```
#[must_use]
pub fn manifest_file_name(
    schema: &ApiSchema,
    environment: &str,
    manifest_time: Option<DateTime<Utc>>,
) -> String {
    let naming = schema.naming();
    let stamp = manifest_time.map(|t| (t.format("%Y%m%d").to_string(), t.format("%H%M%S").to_string()));

    let mut segments = vec![naming.name(), naming.version(), environment];
    if let Some((date, time)) = &stamp {
        segments.push(date);
        segments.push(time);
    }
    segments.push("manifest.yaml");

    segments
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// `path` relative to `base` as a `/`-separated string, or `None` if it
/// does not lie strictly under `base`.
fn relative_to(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let segments: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;

    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// Plain YAML scalar, single-quoted when it would not read back verbatim.
///
/// Values with control characters are written as JSON strings, which YAML
/// reads as double-quoted scalars with the same escapes.
fn scalar(value: &str) -> String {
    const SPECIAL: &[char] = &[
        ':', '#', '{', '}', '[', ']', ',', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
    ];

    if value.contains(char::is_control) {
        return Value::String(value.to_string()).to_string();
    }

    let needs_quotes = value.is_empty()
        || value.contains(SPECIAL)
        || value.starts_with(['-', '?', ' '])
        || value.ends_with(' ')
        || matches!(
            value.to_ascii_lowercase().as_str(),
            "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "~"
        )
        || value.parse::<f64>().is_ok();

    if needs_quotes {
        format!("'{}'", value.replace('\'', "''"))
    } else {
        value.to_string()
    }
}
