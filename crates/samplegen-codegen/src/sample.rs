//! Sample generation.
//!
//! A generator turns one [`SampleSpec`] into an output path and a lazy,
//! single-pass sequence of text chunks. Nothing is rendered until the
//! caller pulls the next chunk, and the first rendering error ends the
//! sequence.

use crate::language::LanguageProfile;
use crate::template_engine::TemplateEngine;
use samplegen_core::{Error, Result, SampleSpec};
use samplegen_schema::{ApiSchema, CallingForm};
use serde_json::{Map, Value, json};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

/// Name of the template rendered for every sample.
pub const SAMPLE_TEMPLATE: &str = "sample";

/// Lazily produced chunks of one sample file.
pub type Chunks<'e> = Box<dyn Iterator<Item = Result<String>> + 'e>;

/// A sample ready to be written: where it goes and what it contains.
pub struct GeneratedSample<'e> {
    path: PathBuf,
    chunks: Chunks<'e>,
}

impl<'e> GeneratedSample<'e> {
    /// Pairs an output path with its chunk sequence.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, chunks: impl Iterator<Item = Result<String>> + 'e) -> Self {
        Self {
            path: path.into(),
            chunks: Box::new(chunks),
        }
    }

    /// Output path relative to the output directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Splits into path and chunks.
    #[must_use]
    pub fn into_parts(self) -> (PathBuf, Chunks<'e>) {
        (self.path, self.chunks)
    }
}

impl fmt::Debug for GeneratedSample<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedSample")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Produces a sample from its specification.
///
/// Implementations must be deterministic: a fresh generator fed the same
/// specs in the same order yields the same paths and the same chunks.
pub trait SampleGenerator {
    /// Generates one sample.
    ///
    /// `duplicate` is true when another spec in the configuration shares
    /// this spec's id.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` when the spec cannot be resolved
    /// against the schema. Rendering errors surface through the chunks.
    fn generate<'e>(
        &self,
        spec: &SampleSpec,
        duplicate: bool,
        engine: &'e TemplateEngine<'_>,
        schema: &ApiSchema,
    ) -> Result<GeneratedSample<'e>>;
}

/// Generator backed by the `sample` template.
///
/// The generator remembers which duplicate-id file stems it has handed out,
/// so use one instance per run.
#[derive(Debug, Clone, Default)]
pub struct TemplateSampleGenerator {
    language: LanguageProfile,
    issued: RefCell<HashMap<String, usize>>,
}

impl TemplateSampleGenerator {
    /// Creates a generator for a language.
    #[must_use]
    pub fn new(language: LanguageProfile) -> Self {
        Self {
            language,
            issued: RefCell::default(),
        }
    }

    /// The language samples are generated for.
    #[must_use]
    pub const fn language(&self) -> &LanguageProfile {
        &self.language
    }

    /// Output path for a spec, ignoring earlier calls.
    ///
    /// Unique ids map to `{base}/{id}.{ext}`. Shared ids get an eight
    /// character digest of the whole spec appended, so distinct specs land
    /// on distinct, reproducible paths.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the id is empty, contains control
    /// characters, or could escape the base directory.
    pub fn sample_path(&self, spec: &SampleSpec, duplicate: bool) -> Result<PathBuf> {
        Ok(self.path_for(&file_stem(spec, duplicate)?))
    }

    /// Output path for the next spec of a run.
    ///
    /// Like [`sample_path`](Self::sample_path), except that a duplicate
    /// stem already handed out gets its occurrence number appended:
    /// `a_<digest>`, then `a_<digest>_2`, `a_<digest>_3`.
    ///
    /// # Errors
    ///
    /// Same as [`sample_path`](Self::sample_path).
    pub fn claim_path(&self, spec: &SampleSpec, duplicate: bool) -> Result<PathBuf> {
        let mut stem = file_stem(spec, duplicate)?;
        if duplicate {
            let seen = {
                let mut issued = self.issued.borrow_mut();
                let seen = issued.entry(stem.clone()).or_insert(0);
                *seen += 1;
                *seen
            };
            if seen > 1 {
                stem = format!("{stem}_{seen}");
            }
        }
        Ok(self.path_for(&stem))
    }

    fn path_for(&self, stem: &str) -> PathBuf {
        Path::new(&self.language.base_path).join(format!("{stem}.{}", self.language.extension))
    }

    /// Builds the render context for a spec.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if `service` or `rpc` is missing or not
    /// found in the schema.
    pub fn context(&self, spec: &SampleSpec, duplicate: bool, schema: &ApiSchema) -> Result<Value> {
        let id = spec.id().as_str();
        let config_error = |message: String| Error::ConfigError {
            sample: Some(id.to_string()),
            message,
        };

        let service_name = spec
            .field_str("service")
            .ok_or_else(|| config_error("missing string field `service`".to_string()))?;
        let rpc_name = spec
            .field_str("rpc")
            .ok_or_else(|| config_error("missing string field `rpc`".to_string()))?;

        let service = schema
            .service(service_name)
            .ok_or_else(|| config_error(format!("service '{service_name}' not found")))?;
        let rpc = service
            .method(rpc_name)
            .ok_or_else(|| config_error(format!("rpc '{rpc_name}' not found on {}", service.full_name())))?;

        let calling_form = CallingForm::method_default(rpc);

        let mut sample: Map<String, Value> = spec.fields().clone();
        sample.insert("id".to_string(), Value::String(id.to_string()));
        sample.insert(
            "package_name".to_string(),
            Value::String(schema.naming().warehouse_package_name().to_string()),
        );
        sample
            .entry("response")
            .or_insert_with(|| Value::Array(Vec::new()));

        let calling_form_enum: Map<String, Value> = CallingForm::ALL
            .iter()
            .map(|form| (form.variant_name().to_string(), Value::String(form.as_str().to_string())))
            .collect();

        Ok(json!({
            "file_header": self.language.file_header,
            "sample": sample,
            "imports": [],
            "calling_form": calling_form.as_str(),
            "calling_form_enum": calling_form_enum,
            "api": schema.naming(),
            "service": {
                "name": service.name(),
                "full_name": service.full_name(),
            },
            "rpc": rpc,
            "duplicate": duplicate,
        }))
    }
}

impl SampleGenerator for TemplateSampleGenerator {
    fn generate<'e>(
        &self,
        spec: &SampleSpec,
        duplicate: bool,
        engine: &'e TemplateEngine<'_>,
        schema: &ApiSchema,
    ) -> Result<GeneratedSample<'e>> {
        let context = self.context(spec, duplicate, schema)?;
        let path = self.claim_path(spec, duplicate)?;

        tracing::debug!(
            sample = %spec.id(),
            path = %path.display(),
            calling_form = %context["calling_form"],
            "prepared sample"
        );

        let regions = VecDeque::from([
            Region::Literal(self.language.file_header.clone()),
            Region::Template(SAMPLE_TEMPLATE.to_string()),
        ]);

        Ok(GeneratedSample::new(
            path,
            RegionChunks {
                engine,
                regions,
                context,
                sample: spec.id().to_string(),
                failed: false,
            },
        ))
    }
}

#[derive(Debug)]
enum Region {
    Literal(String),
    Template(String),
}

/// Renders one region per `next` call.
struct RegionChunks<'e, 't> {
    engine: &'e TemplateEngine<'t>,
    regions: VecDeque<Region>,
    context: Value,
    sample: String,
    failed: bool,
}

impl Iterator for RegionChunks<'_, '_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.regions.pop_front()? {
            Region::Literal(text) => Some(Ok(text)),
            Region::Template(name) => match self.engine.render(&name, &self.context) {
                Ok(text) => {
                    tracing::debug!(sample = %self.sample, template = %name, bytes = text.len(), "rendered region");
                    Some(Ok(text))
                }
                Err(err) => {
                    self.failed = true;
                    self.regions.clear();
                    Some(Err(attribute(err, &self.sample)))
                }
            },
        }
    }
}

impl FusedIterator for RegionChunks<'_, '_> {}

fn attribute(err: Error, sample: &str) -> Error {
    match err {
        Error::TemplateError {
            template, message, ..
        } => Error::TemplateError {
            template,
            sample: Some(sample.to_string()),
            message,
        },
        other => other,
    }
}

fn file_stem(spec: &SampleSpec, duplicate: bool) -> Result<String> {
    let id = spec.id().as_str();
    validate_id(id)?;

    Ok(if duplicate {
        format!("{id}_{}", spec_digest(spec))
    } else {
        id.to_string()
    })
}

fn validate_id(id: &str) -> Result<()> {
    let problem = if id.trim().is_empty() {
        Some("is empty")
    } else if id.contains(['/', '\\']) {
        Some("contains a path separator")
    } else if id.contains("..") {
        Some("contains `..`")
    } else if id.contains(char::is_control) {
        Some("contains a control character")
    } else {
        None
    };

    problem.map_or(Ok(()), |problem| {
        Err(Error::ConfigError {
            sample: Some(id.to_string()),
            message: format!("sample id {problem}"),
        })
    })
}

/// First eight hex digits of a blake3 hash over the spec's canonical JSON.
fn spec_digest(spec: &SampleSpec) -> String {
    let canonical = spec.to_value().to_string();
    blake3::hash(canonical.as_bytes())
        .to_hex()
        .chars()
        .take(8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use samplegen_core::{SampleConfig, SampleId};
    use samplegen_schema::fixtures;

    fn schema() -> ApiSchema {
        ApiSchema::from_request(&fixtures::library_request()).unwrap()
    }

    fn spec(yaml: &str) -> SampleSpec {
        SampleConfig::from_yaml_str(yaml).unwrap().samples()[0].clone()
    }

    fn engine(template: &str) -> TemplateEngine<'static> {
        let mut engine = TemplateEngine::new();
        engine.register_template_string(SAMPLE_TEMPLATE, template).unwrap();
        engine
    }

    fn collect(sample: GeneratedSample<'_>) -> Vec<Result<String>> {
        sample.into_parts().1.collect()
    }

    const GET_BOOK: &str = "samples:\n- id: get_book\n  service: google.example.library.v1.Library\n  rpc: GetBook\n  region_tag: library_get_book\n";

    // ========================================================================
    // Paths
    // ========================================================================

    #[test]
    fn test_unique_path() {
        let generator = TemplateSampleGenerator::default();
        let path = generator.sample_path(&spec(GET_BOOK), false).unwrap();
        assert_eq!(path, PathBuf::from("samples/get_book.py"));
    }

    #[test]
    fn test_duplicate_paths_differ_by_content() {
        let generator = TemplateSampleGenerator::default();
        let a = spec("samples: [{id: x, rpc: GetBook}]");
        let b = spec("samples: [{id: x, rpc: ListShelves}]");

        let pa = generator.sample_path(&a, true).unwrap();
        let pb = generator.sample_path(&b, true).unwrap();
        assert_ne!(pa, pb);
        assert_eq!(pa, generator.sample_path(&a, true).unwrap());

        let name = pa.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("x_"));
        assert_eq!(name.len(), "x_".len() + 8 + ".py".len());
    }

    #[test]
    fn test_identical_duplicates_get_distinct_paths() {
        let generator = TemplateSampleGenerator::default();
        let a = spec("samples: [{id: a, rpc: GetBook}]");
        let b = spec("samples: [{id: b, rpc: GetBook}]");

        let first = generator.claim_path(&a, true).unwrap();
        let unique = generator.claim_path(&b, false).unwrap();
        let second = generator.claim_path(&a, true).unwrap();
        let third = generator.claim_path(&a, true).unwrap();

        assert_eq!(first, generator.sample_path(&a, true).unwrap());
        assert_eq!(unique, PathBuf::from("samples/b.py"));
        let stem = first.file_stem().unwrap().to_str().unwrap();
        assert_eq!(second, PathBuf::from(format!("samples/{stem}_2.py")));
        assert_eq!(third, PathBuf::from(format!("samples/{stem}_3.py")));
    }

    #[test]
    fn test_unique_ids_are_not_numbered() {
        let generator = TemplateSampleGenerator::default();
        let spec = spec(GET_BOOK);
        assert_eq!(
            generator.claim_path(&spec, false).unwrap(),
            generator.claim_path(&spec, false).unwrap()
        );
    }

    #[test]
    fn test_unsafe_ids_rejected() {
        let generator = TemplateSampleGenerator::default();
        for id in ["../escape", "a/b", "a\\b", "..", "", "nul\0", "line\nbreak", "tab\there"] {
            let spec = SampleSpec::new(SampleId::new(id), Map::new());
            let err = generator.sample_path(&spec, false).unwrap_err();
            assert!(err.is_config_error(), "{id:?} accepted");
        }
    }

    // ========================================================================
    // Context
    // ========================================================================

    #[test]
    fn test_context_contents() {
        let generator = TemplateSampleGenerator::default();
        let ctx = generator.context(&spec(GET_BOOK), false, &schema()).unwrap();

        assert_eq!(ctx["sample"]["id"], "get_book");
        assert_eq!(ctx["sample"]["package_name"], "google-example-library");
        assert_eq!(ctx["sample"]["response"], json!([]));
        assert_eq!(ctx["sample"]["region_tag"], "library_get_book");
        assert_eq!(ctx["calling_form"], "request");
        assert_eq!(ctx["calling_form_enum"]["RequestPaged"], "request_paged");
        assert_eq!(ctx["rpc"]["name"], "GetBook");
        assert_eq!(ctx["service"]["name"], "Library");
        assert_eq!(ctx["api"]["version"], "v1");
        assert_eq!(ctx["imports"], json!([]));
        assert_eq!(ctx["duplicate"], false);
    }

    #[test]
    fn test_context_keeps_explicit_response() {
        let generator = TemplateSampleGenerator::default();
        let spec = spec(
            "samples:\n- id: s\n  service: Library\n  rpc: ListShelves\n  response:\n  - print: [\"%s\", $resp.name]\n",
        );
        let ctx = generator.context(&spec, false, &schema()).unwrap();
        assert_eq!(ctx["sample"]["response"][0]["print"][1], "$resp.name");
        assert_eq!(ctx["calling_form"], "request_paged");
    }

    #[test]
    fn test_missing_rpc_is_config_error() {
        let generator = TemplateSampleGenerator::default();
        let err = generator
            .context(&spec("samples: [{id: s, service: Library}]"), false, &schema())
            .unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(err.sample_id(), Some("s"));
    }

    #[test]
    fn test_unknown_service_and_rpc() {
        let generator = TemplateSampleGenerator::default();
        let schema = schema();
        let err = generator
            .context(&spec("samples: [{id: s, service: Shop, rpc: GetBook}]"), false, &schema)
            .unwrap_err();
        assert!(err.to_string().contains("Shop"));

        let err = generator
            .context(&spec("samples: [{id: s, service: Library, rpc: Burn}]"), false, &schema)
            .unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("Burn"));
    }

    // ========================================================================
    // Chunks
    // ========================================================================

    #[test]
    fn test_chunks_header_then_body() {
        let engine = engine("def {{snake_case rpc.name}}():\n    pass\n");
        let generator = TemplateSampleGenerator::default();
        let sample = generator.generate(&spec(GET_BOOK), false, &engine, &schema()).unwrap();
        assert_eq!(sample.path(), Path::new("samples/get_book.py"));

        let chunks: Vec<String> = collect(sample).into_iter().map(Result::unwrap).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], LanguageProfile::python().file_header);
        assert_eq!(chunks[1], "def get_book():\n    pass\n");
    }

    #[test]
    fn test_error_ends_iteration() {
        let engine = engine("{{undefined_variable}}");
        let generator = TemplateSampleGenerator::default();
        let sample = generator.generate(&spec(GET_BOOK), false, &engine, &schema()).unwrap();
        let (_, mut chunks) = sample.into_parts();

        assert!(chunks.next().unwrap().is_ok());
        let err = chunks.next().unwrap().unwrap_err();
        assert!(err.is_template_error());
        assert_eq!(err.sample_id(), Some("get_book"));
        assert!(chunks.next().is_none());
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_rendering_is_lazy() {
        // No sample template registered: generation succeeds, pulling the
        // body fails.
        let engine = TemplateEngine::new();
        let generator = TemplateSampleGenerator::default();
        let sample = generator.generate(&spec(GET_BOOK), false, &engine, &schema()).unwrap();
        let results = collect(sample);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].as_ref().is_err_and(Error::is_template_error));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let engine = engine("{{sample.id}} {{calling_form}} {{duplicate}}");
        let schema = schema();
        let render = || {
            let generator = TemplateSampleGenerator::default();
            let sample = generator.generate(&spec(GET_BOOK), true, &engine, &schema).unwrap();
            let path = sample.path().to_path_buf();
            let text: String = collect(sample).into_iter().map(Result::unwrap).collect();
            (path, text)
        };
        assert_eq!(render(), render());
        assert!(render().1.ends_with("get_book request true"));
    }
}
