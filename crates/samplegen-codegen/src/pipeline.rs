//! End-to-end generation run.
//!
//! A run moves through fixed stages in a single pass:
//!
//! ```text
//! Start -> SchemaBuilt -> DuplicatesComputed -> Generating -> ManifestBuilt -> Done
//! ```
//!
//! The first error aborts the run. Files already written stay on disk and
//! no manifest is written.

use crate::duplicates::DuplicateIds;
use crate::language::LanguageProfile;
use crate::manifest::build_manifest;
use crate::sample::{SampleGenerator, TemplateSampleGenerator};
use crate::template_engine::TemplateEngine;
use crate::writer::{write_chunks, write_text};
use chrono::{DateTime, Utc};
use samplegen_core::{Error, Result, SampleConfig, SampleId, SampleSpec};
use samplegen_schema::{ApiSchema, request};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Inputs and outputs of a run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// YAML sample configuration.
    pub sample_config: PathBuf,
    /// Serialized `CodeGeneratorRequest`.
    pub serialized_request: PathBuf,
    /// Directory of `*.hbs` templates.
    pub template_dir: PathBuf,
    /// Directory samples and the manifest are written under.
    pub output_dir: PathBuf,
    /// Timestamp for the manifest file name; omitted when `None`.
    pub manifest_time: Option<DateTime<Utc>>,
    /// Target language.
    pub language: LanguageProfile,
}

impl PipelineConfig {
    /// Creates a config writing to the current directory.
    #[must_use]
    pub fn new(
        sample_config: impl Into<PathBuf>,
        serialized_request: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sample_config: sample_config.into(),
            serialized_request: serialized_request.into(),
            template_dir: template_dir.into(),
            output_dir: PathBuf::from("."),
            manifest_time: None,
            language: LanguageProfile::default(),
        }
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the manifest timestamp.
    #[must_use]
    pub const fn with_manifest_time(mut self, time: Option<DateTime<Utc>>) -> Self {
        self.manifest_time = time;
        self
    }
}

/// Stage a run has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing done yet.
    Start,
    /// Request decoded and schema built.
    SchemaBuilt,
    /// Sample configuration loaded and ids counted.
    DuplicatesComputed,
    /// Samples are being generated and written.
    Generating,
    /// Manifest built, not yet written.
    ManifestBuilt,
    /// Manifest written.
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::SchemaBuilt => "schema_built",
            Self::DuplicatesComputed => "duplicates_computed",
            Self::Generating => "generating",
            Self::ManifestBuilt => "manifest_built",
            Self::Done => "done",
        })
    }
}

/// One written sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleReport {
    /// Sample id.
    pub id: String,
    /// File the sample was written to.
    pub path: PathBuf,
    /// Whether the id was shared with another spec.
    pub duplicate: bool,
    /// Bytes written.
    pub bytes: u64,
    /// Chunks written.
    pub chunks: usize,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Written samples in configuration order.
    pub samples: Vec<SampleReport>,
    /// Written manifest.
    pub manifest: PathBuf,
    /// Number of manifest entries.
    pub manifest_entries: usize,
}

impl RunReport {
    /// Total bytes across all sample files.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.samples.iter().map(|s| s.bytes).sum()
    }
}

/// Runs the generation stages over a [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The run configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs with templates from the configured directory and the
    /// template-backed generator.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage.
    pub fn run(&self) -> Result<RunReport> {
        let engine = TemplateEngine::from_directory(&self.config.template_dir).inspect_err(|err| {
            tracing::error!(stage = %Stage::Start, error = %err, "generation aborted");
        })?;
        let generator = TemplateSampleGenerator::new(self.config.language.clone());
        self.run_with(&engine, &generator)
    }

    /// Runs with a prepared engine and any generator.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage.
    pub fn run_with<G: SampleGenerator>(
        &self,
        engine: &TemplateEngine<'_>,
        generator: &G,
    ) -> Result<RunReport> {
        let mut stage = Stage::Start;
        let result = self.execute(engine, generator, &mut stage);
        if let Err(err) = &result {
            tracing::error!(
                stage = %stage,
                sample = err.sample_id().unwrap_or("-"),
                error = %err,
                "generation aborted"
            );
        }
        result
    }

    fn execute<G: SampleGenerator>(
        &self,
        engine: &TemplateEngine<'_>,
        generator: &G,
        stage: &mut Stage,
    ) -> Result<RunReport> {
        let cfg = &self.config;

        let request = request::load(&cfg.serialized_request)?;
        let schema = ApiSchema::from_request(&request)
            .map_err(|err| err.with_input_path(&cfg.serialized_request))?;
        *stage = Stage::SchemaBuilt;
        tracing::info!(
            stage = %stage,
            api = schema.naming().name(),
            version = schema.naming().version(),
            services = schema.services().len(),
            "schema built"
        );

        let config = SampleConfig::from_path(&cfg.sample_config)?;
        let duplicates = DuplicateIds::resolve(config.samples());
        *stage = Stage::DuplicatesComputed;
        tracing::info!(stage = %stage, samples = config.len(), "sample configuration loaded");

        *stage = Stage::Generating;
        let mut claimed: HashMap<PathBuf, SampleId> = HashMap::new();
        let mut written: Vec<(PathBuf, SampleSpec)> = Vec::with_capacity(config.len());
        let mut reports = Vec::with_capacity(config.len());

        for spec in config.samples() {
            let duplicate = duplicates.has_duplicates(spec.id());
            let (path, chunks) = generator
                .generate(spec, duplicate, engine, &schema)?
                .into_parts();

            check_relative(&path, spec)?;
            if let Some(first) = claimed.get(&path) {
                return Err(Error::PathCollision {
                    path,
                    first: first.to_string(),
                    second: spec.id().to_string(),
                });
            }

            let target = cfg.output_dir.join(&path);
            let stats = write_chunks(&target, chunks)?;
            tracing::info!(
                stage = %stage,
                sample = %spec.id(),
                path = %target.display(),
                bytes = stats.bytes,
                duplicate,
                "sample written"
            );

            claimed.insert(path.clone(), spec.id().clone());
            reports.push(SampleReport {
                id: spec.id().to_string(),
                path: target,
                duplicate,
                bytes: stats.bytes,
                chunks: stats.chunks,
            });
            written.push((path, spec.clone()));
        }

        let manifest = build_manifest(&written, &schema, &cfg.language, cfg.manifest_time)?;
        *stage = Stage::ManifestBuilt;

        let manifest_path = cfg.output_dir.join(manifest.file_name());
        write_text(&manifest_path, &manifest.render())?;
        *stage = Stage::Done;
        tracing::info!(
            stage = %stage,
            manifest = %manifest_path.display(),
            entries = manifest.entries().len(),
            "manifest written"
        );

        Ok(RunReport {
            samples: reports,
            manifest: manifest_path,
            manifest_entries: manifest.entries().len(),
        })
    }
}

/// Generated paths must stay inside the output directory.
fn check_relative(path: &Path, spec: &SampleSpec) -> Result<()> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if escapes || path.as_os_str().is_empty() {
        return Err(Error::ConfigError {
            sample: Some(spec.id().to_string()),
            message: format!("generated path {} leaves the output directory", path.display()),
        });
    }
    Ok(())
}
