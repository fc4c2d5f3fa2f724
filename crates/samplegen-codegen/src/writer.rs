//! Streams generated chunks to disk.

use samplegen_core::{Error, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// What a write produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteStats {
    /// Bytes written.
    pub bytes: u64,
    /// Chunks written.
    pub chunks: usize,
}

/// Writes `chunks` to `path` in order, creating parent directories and
/// truncating any existing file.
///
/// Each chunk is written as soon as it is produced, so only one chunk is
/// held in memory at a time.
///
/// A failing chunk stops the write and its error is returned; the chunks
/// before it stay on disk.
///
/// # Errors
///
/// Returns `Error::IoError` naming `path` if the file cannot be created or
/// written, or the first error yielded by `chunks`.
///
/// # Examples
///
/// ```
/// use samplegen_codegen::writer::write_chunks;
///
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("samples/hello.py");
/// let stats = write_chunks(&path, ["print(", "'hi'", ")\n"].map(|s| Ok(s.to_string())))?;
/// assert_eq!(stats.chunks, 3);
/// assert_eq!(std::fs::read_to_string(&path)?, "print('hi')\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_chunks<I>(path: &Path, chunks: I) -> Result<WriteStats>
where
    I: IntoIterator<Item = Result<String>>,
{
    let io_error = |source| Error::IoError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut out = BufWriter::new(File::create(path).map_err(io_error)?);
    let mut stats = WriteStats::default();

    for chunk in chunks {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                // Keep what was already produced.
                out.flush().map_err(io_error)?;
                return Err(err);
            }
        };
        out.write_all(chunk.as_bytes()).map_err(io_error)?;
        stats.bytes += chunk.len() as u64;
        stats.chunks += 1;
        tracing::trace!(path = %path.display(), bytes = chunk.len(), "wrote chunk");
    }

    out.flush().map_err(io_error)?;
    tracing::debug!(path = %path.display(), bytes = stats.bytes, chunks = stats.chunks, "wrote file");
    Ok(stats)
}

/// Writes a whole string to `path`, creating parent directories.
///
/// # Errors
///
/// Returns `Error::IoError` naming `path` on failure.
pub fn write_text(path: &Path, text: &str) -> Result<WriteStats> {
    write_chunks(path, std::iter::once(Ok(text.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ok(parts: &[&str]) -> Vec<Result<String>> {
        parts.iter().map(|s| Ok((*s).to_string())).collect()
    }

    #[test]
    fn test_content_is_concatenation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.py");
        let parts = ["# header\n", "def main():\n", "    pass\n"];

        let stats = write_chunks(&path, ok(&parts)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), parts.concat());
        assert_eq!(stats.chunks, 3);
        assert_eq!(stats.bytes, parts.concat().len() as u64);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep/nested/dir/file.py");
        write_text(&path, "x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_truncates_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.py");
        write_text(&path, "a much longer original content").unwrap();
        write_text(&path, "short").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn test_empty_sequence_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.py");
        let stats = write_chunks(&path, Vec::new()).unwrap();
        assert_eq!(stats, WriteStats::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_chunk_error_leaves_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.py");
        let chunks = vec![
            Ok("first\n".to_string()),
            Err(Error::TemplateError {
                template: "sample".to_string(),
                sample: Some("s".to_string()),
                message: "boom".to_string(),
            }),
            Ok("never\n".to_string()),
        ];

        let err = write_chunks(&path, chunks).unwrap_err();
        assert!(err.is_template_error());
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        write_text(&blocker, "x").unwrap();

        let err = write_text(&blocker.join("child.py"), "y").unwrap_err();
        assert!(err.is_io_error());
        assert!(err.to_string().contains("file"));
    }
}
