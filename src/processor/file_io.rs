//! # File I/O Module
//!
//! This module provides the reading and writing primitives used by the
//! reconciler. Writes never touch the target in place: content goes to a
//! temporary sibling which is then renamed over the original.

use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

/// Prefix of the temporary sibling created while rewriting a file.
pub const TEMP_FILE_PREFIX: &str = ".autocopyright-";

/// Suffix of the temporary sibling created while rewriting a file.
pub const TEMP_FILE_SUFFIX: &str = ".temp";

/// File I/O operations for the processor.
pub struct FileIO;

impl FileIO {
  /// Reads a file as UTF-8 text.
  ///
  /// Returns `Ok(None)` if `path` is a directory.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not valid UTF-8.
  pub fn read_text(path: &Path) -> Result<Option<String>> {
    if path.is_dir() {
      return Ok(None);
    }

    let bytes = match std::fs::read(path) {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == std::io::ErrorKind::IsADirectory => return Ok(None),
      Err(e) => return Err(e).with_context(|| format!("Failed to read file: {}", path.display())),
    };

    let content = String::from_utf8(bytes).with_context(|| format!("File is not valid UTF-8: {}", path.display()))?;
    Ok(Some(content))
  }

  /// Replaces the content of `path` atomically.
  ///
  /// The new content is written to a temporary file in the same directory,
  /// the original permissions are copied onto it, and it is renamed over
  /// `path`. On failure the temporary file is removed and `path` is left as
  /// it was.
  pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
      .prefix(TEMP_FILE_PREFIX)
      .suffix(TEMP_FILE_SUFFIX)
      .tempfile_in(parent)
      .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;

    temp
      .write_all(content.as_bytes())
      .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
    temp
      .as_file()
      .sync_all()
      .with_context(|| format!("Failed to flush temporary file for {}", path.display()))?;

    if let Ok(metadata) = std::fs::metadata(path) {
      std::fs::set_permissions(temp.path(), metadata.permissions())
        .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;
    }

    temp
      .persist(path)
      .map_err(|e| e.error)
      .with_context(|| format!("Failed to replace file: {}", path.display()))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_read_text_directory_is_none() {
    let temp_dir = tempfile::tempdir().unwrap();
    assert!(FileIO::read_text(temp_dir.path()).unwrap().is_none());
  }

  #[test]
  fn test_read_text_rejects_invalid_utf8() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("latin1.py");
    std::fs::write(&path, [b'#', b' ', 0xE9, b'\n']).unwrap();

    let err = FileIO::read_text(&path).unwrap_err();
    assert!(err.to_string().contains("not valid UTF-8"));
  }

  #[test]
  fn test_read_text_missing_file_is_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    assert!(FileIO::read_text(&temp_dir.path().join("missing.py")).is_err());
  }

  #[test]
  fn test_write_atomic_leaves_no_temp_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("main.py");
    std::fs::write(&path, "print('old')\n").unwrap();

    FileIO::write_atomic(&path, "print('new')\n").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "print('new')\n");
    let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
  }

  #[cfg(unix)]
  #[test]
  fn test_write_atomic_preserves_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("run.sh");
    std::fs::write(&path, "#!/bin/sh\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    FileIO::write_atomic(&path, "#!/bin/sh\necho hi\n").unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
  }
}
