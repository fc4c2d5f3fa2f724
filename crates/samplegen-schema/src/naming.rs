//! Naming information derived from the API's proto package.
//!
//! A package such as `google.cloud.vision.v1` splits into a namespace
//! (`google.cloud`), an api name (`vision`) and a version (`v1`).
//!
//! # Examples
//!
//! ```
//! use samplegen_schema::{Naming, Options};
//!
//! let naming = Naming::build("google.cloud.vision.v1", &Options::default())?;
//! assert_eq!(naming.name(), "vision");
//! assert_eq!(naming.version(), "v1");
//! assert_eq!(naming.namespace(), &["google".to_string(), "cloud".to_string()]);
//! assert_eq!(naming.warehouse_package_name(), "google-cloud-vision");
//! # Ok::<(), samplegen_core::Error>(())
//! ```

use crate::Options;
use regex::Regex;
use samplegen_core::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::LazyLock;

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v[0-9]+(p[0-9]+)?((alpha|beta)[0-9]*)?$").expect("valid version regex")
});

/// Naming of the API being sampled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Naming {
    name: String,
    namespace: Vec<String>,
    version: String,
    product_name: String,
    proto_package: String,
    warehouse_package_name: String,
}

impl Naming {
    /// Derives naming from a proto package and generator options.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputError` if the package is empty.
    pub fn build(package: &str, opts: &Options) -> Result<Self> {
        let mut segments: Vec<String> = package
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let version = match segments.last() {
            Some(last) if VERSION.is_match(last) && segments.len() > 1 => {
                segments.pop().unwrap_or_default()
            }
            _ => String::new(),
        };

        let Some(package_name) = segments.pop() else {
            // The request path is filled in by callers that know it.
            return Err(Error::InputError {
                path: PathBuf::new(),
                message: "no proto package found among the files to generate".to_string(),
                source: None,
            });
        };

        let name = opts.name().map_or(package_name, str::to_string);
        let namespace = segments;

        let warehouse_package_name = opts.warehouse_package_name().map_or_else(
            || {
                namespace
                    .iter()
                    .chain(std::iter::once(&name))
                    .map(|s| s.to_lowercase().replace('_', "-"))
                    .collect::<Vec<_>>()
                    .join("-")
            },
            str::to_string,
        );

        Ok(Self {
            product_name: title_case(&name),
            name,
            namespace,
            version,
            proto_package: package.to_string(),
            warehouse_package_name,
        })
    }

    /// Api name, e.g. `vision`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace segments preceding the name.
    #[must_use]
    pub fn namespace(&self) -> &[String] {
        &self.namespace
    }

    /// Version segment, or empty if the package is unversioned.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Human readable product name, e.g. `Vision`.
    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Full proto package the naming was derived from.
    #[must_use]
    pub fn proto_package(&self) -> &str {
        &self.proto_package
    }

    /// Distribution package name the samples import from.
    #[must_use]
    pub fn warehouse_package_name(&self) -> &str {
        &self.warehouse_package_name
    }
}

fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_package() {
        let naming = Naming::build("google.example.library.v1", &Options::default()).unwrap();
        assert_eq!(naming.name(), "library");
        assert_eq!(naming.version(), "v1");
        assert_eq!(naming.product_name(), "Library");
        assert_eq!(naming.warehouse_package_name(), "google-example-library");
        assert_eq!(naming.proto_package(), "google.example.library.v1");
    }

    #[test]
    fn test_prerelease_versions() {
        for version in ["v1beta1", "v2alpha", "v1p1beta1", "v3"] {
            let naming =
                Naming::build(&format!("acme.shelf.{version}"), &Options::default()).unwrap();
            assert_eq!(naming.version(), version);
            assert_eq!(naming.name(), "shelf");
        }
    }

    #[test]
    fn test_unversioned_package() {
        let naming = Naming::build("acme.bookstore", &Options::default()).unwrap();
        assert_eq!(naming.name(), "bookstore");
        assert_eq!(naming.version(), "");
        assert_eq!(naming.namespace(), &["acme".to_string()]);
    }

    #[test]
    fn test_single_segment_version_is_name() {
        let naming = Naming::build("v1", &Options::default()).unwrap();
        assert_eq!(naming.name(), "v1");
        assert_eq!(naming.version(), "");
    }

    #[test]
    fn test_underscored_name() {
        let naming = Naming::build("acme.asset_inventory.v1", &Options::default()).unwrap();
        assert_eq!(naming.product_name(), "Asset Inventory");
        assert_eq!(naming.warehouse_package_name(), "acme-asset-inventory");
    }

    #[test]
    fn test_option_overrides() {
        let opts = Options::build("python-gapic-name=shelves,warehouse-package-name=acme-shelves");
        let naming = Naming::build("acme.library.v2", &opts).unwrap();
        assert_eq!(naming.name(), "shelves");
        assert_eq!(naming.warehouse_package_name(), "acme-shelves");
        assert_eq!(naming.version(), "v2");
    }

    #[test]
    fn test_empty_package_rejected() {
        let err = Naming::build("", &Options::default()).unwrap_err();
        assert!(err.is_input_error());
    }
}
