//! Generator options parsed from the request parameter string.
//!
//! The parameter string is a comma-separated list of `key` or `key=value`
//! items. Repeated keys accumulate. Unknown keys are logged and ignored.
//!
//! # Examples
//!
//! ```
//! use samplegen_schema::Options;
//!
//! let opts = Options::build("warehouse-package-name=acme-library,transport=grpc+rest");
//! assert_eq!(opts.warehouse_package_name(), Some("acme-library"));
//! assert_eq!(opts.transport(), &["grpc".to_string(), "rest".to_string()]);
//! ```

use std::collections::BTreeMap;

/// Option keys the generator understands.
const KNOWN_OPTIONS: &[&str] = &[
    "add-iam-methods",
    "autogen-snippets",
    "lazy-import",
    "metadata",
    "old-naming",
    "proto-plus-deps",
    "python-gapic-name",
    "rest-numeric-enums",
    "retry-config",
    "samples",
    "service-yaml",
    "transport",
    "warehouse-package-name",
];

/// Parsed generator options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    name: Option<String>,
    warehouse_package_name: Option<String>,
    old_naming: bool,
    transport: Vec<String>,
    raw: BTreeMap<String, Vec<String>>,
}

impl Options {
    /// Parses the parameter string.
    #[must_use]
    pub fn build(parameter: &str) -> Self {
        let mut raw: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for item in parameter.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = item
                .split_once('=')
                .map_or((item, ""), |(k, v)| (k.trim(), v.trim()));

            if !KNOWN_OPTIONS.contains(&key) {
                tracing::warn!(option = key, "ignoring unrecognized generator option");
                continue;
            }

            raw.entry(key.to_string()).or_default().push(value.to_string());
        }

        let last = |key: &str| {
            raw.get(key)
                .and_then(|values| values.last())
                .filter(|v| !v.is_empty())
                .cloned()
        };

        let transport = raw
            .get("transport")
            .and_then(|values| values.last())
            .map(|v| {
                v.split('+')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_else(|| vec!["grpc".to_string()]);

        Self {
            name: last("python-gapic-name"),
            warehouse_package_name: last("warehouse-package-name"),
            old_naming: raw.contains_key("old-naming"),
            transport,
            raw,
        }
    }

    /// Overridden api name (`python-gapic-name`).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Overridden distribution name (`warehouse-package-name`).
    #[must_use]
    pub fn warehouse_package_name(&self) -> Option<&str> {
        self.warehouse_package_name.as_deref()
    }

    /// Whether `old-naming` was requested.
    #[must_use]
    pub const fn old_naming(&self) -> bool {
        self.old_naming
    }

    /// Transports to generate for; defaults to `grpc`.
    #[must_use]
    pub fn transport(&self) -> &[String] {
        &self.transport
    }

    /// All values recorded for a recognized key, in the order given.
    #[must_use]
    pub fn values(&self, key: &str) -> &[String] {
        self.raw.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}
