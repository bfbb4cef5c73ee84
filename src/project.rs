//! # Project Metadata Module
//!
//! Loads the project configuration file (`pyproject.toml`, `Cargo.toml`, or
//! an explicitly chosen TOML file) whose contents are exposed to license
//! templates as the `project` variable. Metadata is optional: a missing or
//! unreadable file degrades to "no metadata" instead of failing the run.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Files looked up in the working directory, in order, when no project file
/// is configured explicitly.
pub const PROJECT_FILE_CANDIDATES: &[&str] = &["pyproject.toml", "Cargo.toml"];

/// Error type for project metadata loading.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
  /// The project file could not be read.
  #[error("Failed to read project file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The project file contains invalid TOML.
  #[error("Failed to parse project file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },
}

/// Parsed project configuration document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectMetadata {
  source: PathBuf,
  document: toml::Table,
}

impl ProjectMetadata {
  /// Wraps an already parsed document.
  pub const fn new(source: PathBuf, document: toml::Table) -> Self {
    Self { source, document }
  }

  /// Reads and parses a TOML project file.
  pub fn load(path: &Path) -> Result<Self, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|e| ProjectError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let document: toml::Table = toml::from_str(&content).map_err(|e| ProjectError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    debug!("Loaded {} chars from {}", content.len(), path.display());
    Ok(Self::new(path.to_path_buf(), document))
  }

  /// Locates and loads project metadata for a run.
  ///
  /// With `explicit` set, only that file is tried (relative paths resolve
  /// against `cwd`). Otherwise the first existing entry of
  /// [`PROJECT_FILE_CANDIDATES`] in `cwd` is used. Any failure is logged and
  /// yields `None`.
  pub fn discover(cwd: &Path, explicit: Option<&Path>) -> Option<Self> {
    let path = match explicit {
      Some(path) => cwd.join(path),
      None => {
        let Some(found) = PROJECT_FILE_CANDIDATES
          .iter()
          .map(|name| cwd.join(name))
          .find(|candidate| candidate.is_file())
        else {
          debug!("No project file found in {}", cwd.display());
          return None;
        };
        found
      }
    };

    match Self::load(&path) {
      Ok(metadata) => Some(metadata),
      Err(ProjectError::ReadError { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
        debug!("Project file {} does not exist", path.display());
        None
      }
      Err(e) => {
        warn!("{e}; continuing without project metadata");
        None
      }
    }
  }

  /// Path the metadata was loaded from.
  pub fn source(&self) -> &Path {
    &self.source
  }

  /// Top-level table of the document.
  pub const fn table(&self) -> &toml::Table {
    &self.document
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_discover_prefers_pyproject() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
      temp_dir.path().join("pyproject.toml"),
      "[tool.poetry]\nname = \"example\"\n",
    )
    .unwrap();
    std::fs::write(temp_dir.path().join("Cargo.toml"), "[package]\nname = \"crate\"\n").unwrap();

    let metadata = ProjectMetadata::discover(temp_dir.path(), None).unwrap();
    assert_eq!(metadata.source(), temp_dir.path().join("pyproject.toml"));
    assert!(metadata.table().contains_key("tool"));
  }

  #[test]
  fn test_discover_falls_back_to_cargo_manifest() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("Cargo.toml"), "[package]\nname = \"crate\"\n").unwrap();

    let metadata = ProjectMetadata::discover(temp_dir.path(), None).unwrap();
    assert!(metadata.table().contains_key("package"));
  }

  #[test]
  fn test_discover_degrades_to_none() {
    let temp_dir = tempfile::tempdir().unwrap();
    assert!(ProjectMetadata::discover(temp_dir.path(), None).is_none());
    assert!(ProjectMetadata::discover(temp_dir.path(), Some(Path::new("missing.toml"))).is_none());

    std::fs::write(temp_dir.path().join("pyproject.toml"), "this is = = not toml").unwrap();
    assert!(ProjectMetadata::discover(temp_dir.path(), None).is_none());
  }

  #[test]
  fn test_load_reports_parse_errors() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "[unclosed").unwrap();

    assert!(matches!(
      ProjectMetadata::load(&path),
      Err(ProjectError::ParseError { .. })
    ));
  }
}
