//! Serialized `CodeGeneratorRequest` ingestion.

use prost::Message as _;
use prost_types::compiler::CodeGeneratorRequest;
use samplegen_core::{Error, Result};
use std::path::Path;

/// Reads and decodes a serialized request file.
///
/// # Errors
///
/// Returns `Error::InputError` naming `path` if the file cannot be read or
/// does not decode as a `CodeGeneratorRequest`.
pub fn load(path: &Path) -> Result<CodeGeneratorRequest> {
    let bytes = std::fs::read(path).map_err(|e| Error::InputError {
        path: path.to_path_buf(),
        message: "failed to read serialized request".to_string(),
        source: Some(Box::new(e)),
    })?;

    decode(&bytes, path)
}

/// Decodes request bytes; `origin` is only used in error messages.
///
/// # Errors
///
/// Returns `Error::InputError` if the bytes are not a valid request.
pub fn decode(bytes: &[u8], origin: &Path) -> Result<CodeGeneratorRequest> {
    let request = CodeGeneratorRequest::decode(bytes).map_err(|e| Error::InputError {
        path: origin.to_path_buf(),
        message: "failed to decode CodeGeneratorRequest".to_string(),
        source: Some(Box::new(e)),
    })?;

    tracing::debug!(
        files = request.proto_file.len(),
        to_generate = request.file_to_generate.len(),
        "decoded generation request"
    );

    Ok(request)
}

/// Returns the longest common package prefix of the files marked for
/// generation, compared segment by segment.
///
/// Files not named in `file_to_generate` do not participate. The result is
/// empty when no file matches or the packages share no leading segment.
///
/// # Examples
///
/// ```
/// use prost_types::FileDescriptorProto;
/// use prost_types::compiler::CodeGeneratorRequest;
/// use samplegen_schema::request::common_package_prefix;
///
/// let file = |name: &str, package: &str| FileDescriptorProto {
///     name: Some(name.to_string()),
///     package: Some(package.to_string()),
///     ..Default::default()
/// };
/// let req = CodeGeneratorRequest {
///     file_to_generate: vec!["a.proto".into(), "b.proto".into()],
///     proto_file: vec![
///         file("a.proto", "google.cloud.vision.v1"),
///         file("b.proto", "google.cloud.vision.v1.types"),
///         file("dep.proto", "google.protobuf"),
///     ],
///     ..Default::default()
/// };
/// assert_eq!(common_package_prefix(&req), "google.cloud.vision.v1");
/// ```
#[must_use]
pub fn common_package_prefix(request: &CodeGeneratorRequest) -> String {
    let mut packages = request
        .proto_file
        .iter()
        .filter(|file| request.file_to_generate.iter().any(|n| n == file.name()))
        .map(|file| file.package().split('.').filter(|s| !s.is_empty()).collect::<Vec<_>>());

    let Some(mut prefix) = packages.next() else {
        return String::new();
    };

    for segments in packages {
        let shared = prefix
            .iter()
            .zip(&segments)
            .take_while(|(a, b)| a == b)
            .count();
        prefix.truncate(shared);
    }

    prefix.join(".")
}
