//! Writing formatted files back to disk.

use crate::engine::FormatOutput;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} changed on disk while it was being formatted", path.display())]
    Modified { path: PathBuf },
}

/// Write `output` back to its file if formatting changed it.
///
/// The file must still hold the text that was formatted; a concurrent edit
/// is reported instead of overwritten. Returns whether the file was written.
pub fn write_formatted(output: &FormatOutput) -> Result<bool, OutputError> {
    if !output.is_changed() {
        return Ok(false);
    }
    let io_error = |source| OutputError::Io {
        path: output.path.clone(),
        source,
    };
    let current = fs::read_to_string(&output.path).map_err(io_error)?;
    if current != output.source {
        return Err(OutputError::Modified {
            path: output.path.clone(),
        });
    }
    atomic_write(&output.path, output.output.as_bytes()).map_err(io_error)?;
    debug!(path = %output.path.display(), "wrote formatted file");
    Ok(true)
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full content lands or the file is left untouched.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
    // same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn formatted(path: PathBuf, source: &str, output: &str) -> FormatOutput {
        FormatOutput {
            path,
            source: source.to_string(),
            output: output.to_string(),
            changes: Vec::new(),
        }
    }

    #[test]
    fn test_writes_changed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("A.swift");
        fs::write(&path, "let a :Int").unwrap();
        let written = write_formatted(&formatted(path.clone(), "let a :Int", "let a: Int")).unwrap();
        assert!(written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "let a: Int");
    }

    #[test]
    fn test_unchanged_file_not_touched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("A.swift");
        let written = write_formatted(&formatted(path.clone(), "x", "x")).unwrap();
        assert!(!written);
        assert!(!path.exists());
    }

    #[test]
    fn test_concurrent_edit_detected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("A.swift");
        fs::write(&path, "let b :Int").unwrap();
        let result = write_formatted(&formatted(path.clone(), "let a :Int", "let a: Int"));
        assert!(matches!(result, Err(OutputError::Modified { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "let b :Int");
    }
}
