//! Sample configuration types.
//!
//! A sample configuration is a YAML document with a `samples` key holding an
//! ordered sequence of sample specifications. Each specification must carry
//! an `id`; every other key is kept as an opaque field bag for the templates.
//!
//! # Examples
//!
//! ```
//! use samplegen_core::SampleConfig;
//!
//! let config = SampleConfig::from_yaml_str(
//!     "samples:\n  - id: list_shelves\n    service: Library\n    rpc: ListShelves\n",
//! )?;
//! assert_eq!(config.len(), 1);
//! assert_eq!(config.samples()[0].id().as_str(), "list_shelves");
//! # Ok::<(), samplegen_core::Error>(())
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// Sample identifier (newtype over String).
///
/// Ids are compared by their exact string value. Several specifications may
/// share an id; the duplicate resolver decides what that means for them.
///
/// A numeric YAML id is stored as its decimal text, so `id: 1` and
/// `id: "1"` are the same id. Both name the file `1.py`, and treating them
/// as one id lets duplicate resolution keep their paths apart.
///
/// # Examples
///
/// ```
/// use samplegen_core::SampleId;
///
/// let id = SampleId::new("create_book");
/// assert_eq!(id.as_str(), "create_book");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleId(String);

impl SampleId {
    /// Creates a new sample identifier.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `SampleId` and returns the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SampleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SampleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One sample specification.
///
/// Holds the mandatory `id` plus every other key of the YAML mapping. The
/// pipeline only looks at `id`; templates see everything.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSpec {
    id: SampleId,
    fields: Map<String, Value>,
}

impl SampleSpec {
    /// Creates a specification from an id and its remaining fields.
    ///
    /// An `id` key inside `fields` is dropped; the explicit id wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use samplegen_core::{SampleId, SampleSpec};
    /// use serde_json::json;
    ///
    /// let fields = json!({"rpc": "GetBook"}).as_object().cloned().unwrap();
    /// let spec = SampleSpec::new(SampleId::new("get_book"), fields);
    /// assert_eq!(spec.field_str("rpc"), Some("GetBook"));
    /// ```
    #[must_use]
    pub fn new(id: SampleId, mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self { id, fields }
    }

    /// Builds a specification from a JSON value, validating the `id` field.
    ///
    /// `position` is the zero-based index in the configuration and is only
    /// used for error messages.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the value is not a mapping, or if `id`
    /// is missing or is not a string or number.
    pub fn from_value(value: Value, position: usize) -> Result<Self> {
        let Value::Object(mut fields) = value else {
            return Err(Error::ConfigError {
                sample: None,
                message: format!("sample #{position} is not a mapping"),
            });
        };

        let id = match fields.remove("id") {
            Some(Value::String(s)) => SampleId::new(s),
            Some(Value::Number(n)) => SampleId::new(n.to_string()),
            Some(other) => {
                return Err(Error::ConfigError {
                    sample: None,
                    message: format!(
                        "sample #{position} has a non-scalar `id` ({})",
                        value_kind(&other)
                    ),
                });
            }
            None => {
                return Err(Error::ConfigError {
                    sample: None,
                    message: format!("sample #{position} is missing required field `id`"),
                });
            }
        };

        Ok(Self { id, fields })
    }

    /// Returns the sample id.
    #[must_use]
    pub const fn id(&self) -> &SampleId {
        &self.id
    }

    /// Returns the open field bag (everything except `id`).
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns a field by name if it is a string.
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Returns the full mapping, `id` included, as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("id".to_string(), Value::String(self.id.as_str().to_string()));
        Value::Object(map)
    }
}

/// Ordered sequence of sample specifications.
///
/// Order is significant: it is the generation order and the manifest order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleConfig {
    samples: Vec<SampleSpec>,
}

impl SampleConfig {
    /// Creates a configuration from already validated specifications.
    #[must_use]
    pub const fn new(samples: Vec<SampleSpec>) -> Self {
        Self { samples }
    }

    /// Reads and parses a sample configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputError` if the file cannot be read or is not a
    /// YAML mapping with a `samples` sequence, and `Error::ConfigError` if a
    /// specification lacks a usable `id`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::InputError {
            path: path.to_path_buf(),
            message: "failed to read sample configuration".to_string(),
            source: Some(Box::new(e)),
        })?;

        Self::parse(&content).map_err(|err| match err {
            Error::InputError {
                message, source, ..
            } => Error::InputError {
                path: path.to_path_buf(),
                message,
                source,
            },
            other => other,
        })
    }

    /// Parses a sample configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Same as [`SampleConfig::from_path`]; input errors carry an empty path.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::parse(content)
    }

    fn parse(content: &str) -> Result<Self> {
        let document: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| Error::InputError {
                path: Default::default(),
                message: "sample configuration is not valid YAML".to_string(),
                source: Some(Box::new(e)),
            })?;

        let document = serde_json::to_value(document).map_err(|e| Error::InputError {
            path: Default::default(),
            message: "sample configuration contains non-string mapping keys".to_string(),
            source: Some(Box::new(e)),
        })?;

        let samples = match document.get("samples") {
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                return Err(Error::InputError {
                    path: Default::default(),
                    message: "`samples` must be a sequence".to_string(),
                    source: None,
                });
            }
            None => {
                return Err(Error::InputError {
                    path: Default::default(),
                    message: "missing top-level `samples` key".to_string(),
                    source: None,
                });
            }
        };

        let samples = samples
            .into_iter()
            .enumerate()
            .map(|(position, value)| SampleSpec::from_value(value, position))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count = samples.len(), "parsed sample configuration");

        Ok(Self { samples })
    }

    /// Returns the specifications in configuration order.
    #[must_use]
    pub fn samples(&self) -> &[SampleSpec] {
        &self.samples
    }

    /// Returns the number of specifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if the configuration holds no specifications.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_preserves_order() {
        let config = SampleConfig::from_yaml_str(
            "samples:\n  - id: a\n  - id: b\n  - id: a\n",
        )
        .unwrap();

        let ids: Vec<_> = config.samples().iter().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_parse_keeps_extra_fields() {
        let config = SampleConfig::from_yaml_str(
            r#"
samples:
  - id: create_book
    service: Library
    rpc: CreateBook
    region_tag: library_create_book
    request:
      - field: book.title
        value: "Dune"
"#,
        )
        .unwrap();

        let spec = &config.samples()[0];
        assert_eq!(spec.field_str("service"), Some("Library"));
        assert_eq!(spec.field_str("rpc"), Some("CreateBook"));
        assert!(spec.field("request").unwrap().is_array());
        assert!(spec.field("id").is_none());
    }

    #[test]
    fn test_empty_samples() {
        let config = SampleConfig::from_yaml_str("samples: []\n").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_missing_samples_key() {
        let err = SampleConfig::from_yaml_str("other: 1\n").unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_samples_not_a_sequence() {
        let err = SampleConfig::from_yaml_str("samples: {id: a}\n").unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = SampleConfig::from_yaml_str("samples: [\n").unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_missing_id_is_config_error() {
        let err = SampleConfig::from_yaml_str("samples:\n  - rpc: GetBook\n").unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("`id`"));
    }

    #[test]
    fn test_non_scalar_id_is_config_error() {
        let err = SampleConfig::from_yaml_str("samples:\n  - id: [1, 2]\n").unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("sequence"));
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let config = SampleConfig::from_yaml_str("samples:\n  - id: 42\n").unwrap();
        assert_eq!(config.samples()[0].id().as_str(), "42");
    }

    #[test]
    fn test_numeric_and_string_ids_are_equal() {
        let config = SampleConfig::from_yaml_str("samples:\n  - id: 1\n  - id: \"1\"\n").unwrap();
        assert_eq!(config.samples()[0].id(), config.samples()[1].id());
    }

    #[test]
    fn test_from_path_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not_samples: true\n").unwrap();

        let err = SampleConfig::from_path(file.path()).unwrap_err();
        match err {
            Error::InputError { path, .. } => assert_eq!(path, file.path()),
            other => panic!("expected input error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = SampleConfig::from_path(Path::new("/nonexistent/samples.yaml")).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_spec_to_value_includes_id() {
        let fields = json!({"rpc": "GetBook"}).as_object().cloned().unwrap();
        let spec = SampleSpec::new(SampleId::new("get_book"), fields);
        assert_eq!(spec.to_value(), json!({"id": "get_book", "rpc": "GetBook"}));
    }

    #[test]
    fn test_spec_from_non_mapping() {
        let err = SampleSpec::from_value(json!("just a string"), 3).unwrap_err();
        assert!(err.to_string().contains("#3"));
    }
}
