//! # File Collector Module
//!
//! This module enumerates candidate paths inside a directory. Each user glob
//! is matched recursively, as `**/<glob>`, against the directory-relative
//! path of every entry below the directory. A `*` never crosses a `/`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::exclusion::to_forward_slash;

/// Options used for every glob match.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: true,
  require_literal_leading_dot: false,
};

/// Recursive glob matcher for one set of user globs.
#[derive(Debug, Clone)]
pub struct FileCollector {
  patterns: Vec<Pattern>,
}

impl FileCollector {
  /// Compiles the user globs.
  ///
  /// # Errors
  ///
  /// Returns an error if a glob is not a valid pattern.
  pub fn new(globs: &[String]) -> Result<Self> {
    let patterns = globs
      .iter()
      .map(|glob| Pattern::new(&format!("**/{glob}")).with_context(|| format!("Invalid glob pattern: {glob}")))
      .collect::<Result<Vec<_>>>()?;

    Ok(Self { patterns })
  }

  /// Returns `true` if the directory-relative `relative` path matches any glob.
  pub fn matches(&self, relative: &Path) -> bool {
    let relative = to_forward_slash(relative);
    self
      .patterns
      .iter()
      .any(|pattern| pattern.matches_with(&relative, MATCH_OPTIONS))
  }

  /// Collects every entry below `dir` that matches a glob.
  ///
  /// Directories are included when their name matches; symbolic links are
  /// not followed. Unreadable entries are logged and skipped.
  pub fn collect(&self, dir: &Path) -> Vec<PathBuf> {
    debug!("Scanning directory: {}", dir.display());
    let start_time = std::time::Instant::now();

    let mut matched = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
      let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
          warn!("Error walking {}: {}", dir.display(), e);
          continue;
        }
      };

      let Ok(relative) = entry.path().strip_prefix(dir) else {
        continue;
      };
      if self.matches(relative) {
        matched.push(entry.into_path());
      }
    }

    debug!(
      "Found {} matching entries in {}ms",
      matched.len(),
      start_time.elapsed().as_millis()
    );

    matched
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn collector(globs: &[&str]) -> FileCollector {
    let globs: Vec<String> = globs.iter().map(|g| (*g).to_string()).collect();
    FileCollector::new(&globs).unwrap()
  }

  #[test]
  fn test_matches_recursively() {
    let collector = collector(&["*.py"]);
    assert!(collector.matches(Path::new("main.py")));
    assert!(collector.matches(Path::new("pkg/sub/mod.py")));
    assert!(!collector.matches(Path::new("pkg/mod.pyc")));
    assert!(!collector.matches(Path::new("README.md")));
  }

  #[test]
  fn test_star_does_not_cross_separator() {
    let collector = collector(&["pkg/*.py"]);
    assert!(collector.matches(Path::new("pkg/mod.py")));
    assert!(collector.matches(Path::new("src/pkg/mod.py")));
    assert!(!collector.matches(Path::new("pkg/sub/mod.py")));
  }

  #[test]
  fn test_invalid_glob() {
    assert!(FileCollector::new(&["[".to_string()]).is_err());
  }

  #[test]
  fn test_collect_includes_matching_directories() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    std::fs::create_dir_all(root.join("logging")).unwrap();
    std::fs::create_dir_all(root.join("pkg.d")).unwrap();
    std::fs::write(root.join("__init__.py"), "").unwrap();
    std::fs::write(root.join("logging/log.py"), "").unwrap();
    std::fs::write(root.join("notes.txt"), "").unwrap();

    let mut found = collector(&["*.py", "*.d"]).collect(root);
    found.sort();

    assert_eq!(
      found,
      vec![root.join("__init__.py"), root.join("logging/log.py"), root.join("pkg.d")]
    );
  }
}
