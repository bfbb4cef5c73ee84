//! # Exclusion Module
//!
//! This module decides which candidate files are left alone before they ever
//! reach the reconciler. A file is excluded when:
//! - the git ignore oracle (if one is available) reports it as ignored
//! - any user supplied exclude pattern matches its path
//! - one of its path components is the `.git` metadata directory
//! - it is the license template itself
//!
//! Exclude patterns are regular expressions matched against the absolute,
//! forward-slash form of the path, anchored at the start. Before compiling,
//! `{cwd}` and `{directory}` are replaced with the absolute working directory
//! and the absolute directory being scanned.
//!
//! ## Example
//!
//! ```rust
//! use std::path::Path;
//!
//! use autocopyright::exclusion::ExclusionPatterns;
//! use autocopyright::file_filter::FileFilter;
//!
//! # fn main() -> anyhow::Result<()> {
//! let patterns = ExclusionPatterns::new(vec!["{directory}/vendor/".to_string()]);
//! let filter = patterns.resolve(Path::new("/work"), Path::new("/work/project"))?;
//!
//! let result = filter.should_process(Path::new("/work/project/vendor/lib.py"))?;
//! assert!(!result.should_process);
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::file_filter::{CompositeFilter, FileFilter, FilterResult};
use crate::git::IgnoreOracle;

/// Placeholder replaced with the absolute current working directory.
pub const CWD_PLACEHOLDER: &str = "{cwd}";

/// Placeholder replaced with the absolute directory being scanned.
pub const DIRECTORY_PLACEHOLDER: &str = "{directory}";

/// Name of the version-control metadata directory that is never touched.
pub const VCS_DIR_NAME: &str = ".git";

/// Error type for exclusion pattern handling.
#[derive(Debug, thiserror::Error)]
pub enum ExclusionError {
  /// A resolved exclude pattern is not a valid regular expression.
  #[error("Invalid exclude pattern '{pattern}' (resolved to '{resolved}'): {source}")]
  InvalidPattern {
    pattern: String,
    resolved: String,
    source: regex::Error,
  },
}

/// Renders a path with `/` separators, the form patterns are matched against.
pub fn to_forward_slash(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}

/// Exclude patterns as supplied by the user, before placeholder substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionPatterns {
  patterns: Vec<String>,
}

impl ExclusionPatterns {
  pub const fn new(patterns: Vec<String>) -> Self {
    Self { patterns }
  }

  pub fn as_slice(&self) -> &[String] {
    &self.patterns
  }

  /// Replaces `{cwd}` and `{directory}` in every pattern.
  ///
  /// No other brace sequences are interpreted, so regex quantifiers such as
  /// `a{2}` pass through untouched.
  pub fn substitute(&self, cwd: &Path, directory: &Path) -> Vec<String> {
    let cwd = to_forward_slash(cwd);
    let directory = to_forward_slash(directory);

    self
      .patterns
      .iter()
      .map(|pattern| {
        pattern
          .replace(CWD_PLACEHOLDER, &cwd)
          .replace(DIRECTORY_PLACEHOLDER, &directory)
      })
      .collect()
  }

  /// Substitutes placeholders and compiles the patterns for one directory.
  ///
  /// # Errors
  ///
  /// Returns [`ExclusionError::InvalidPattern`] for the first pattern that
  /// does not compile.
  pub fn resolve(&self, cwd: &Path, directory: &Path) -> Result<PatternFilter, ExclusionError> {
    let mut rules = Vec::with_capacity(self.patterns.len());

    for (pattern, resolved) in self.patterns.iter().zip(self.substitute(cwd, directory)) {
      // Anchor at the start only: a pattern matches any path it is a prefix of.
      let regex = Regex::new(&format!("^(?:{resolved})")).map_err(|source| ExclusionError::InvalidPattern {
        pattern: pattern.clone(),
        resolved: resolved.clone(),
        source,
      })?;
      debug!("Using exclude pattern: {:?}", resolved);
      rules.push((resolved, regex));
    }

    Ok(PatternFilter { rules })
  }
}

/// Filter that skips files whose path matches a resolved exclude pattern.
pub struct PatternFilter {
  rules: Vec<(String, Regex)>,
}

impl FileFilter for PatternFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    let path_str = to_forward_slash(path);
    match self.rules.iter().find(|(_, regex)| regex.is_match(&path_str)) {
      Some((source, _)) => Ok(FilterResult::skip(format!("Matches exclude pattern {source}"))),
      None => Ok(FilterResult::process()),
    }
  }
}

/// Filter that consults the version-control ignore oracle.
pub struct IgnoreOracleFilter {
  oracle: Box<dyn IgnoreOracle>,
}

impl IgnoreOracleFilter {
  pub fn new(oracle: Box<dyn IgnoreOracle>) -> Self {
    Self { oracle }
  }
}

impl FileFilter for IgnoreOracleFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    if self.oracle.is_ignored(path)? {
      Ok(FilterResult::skip("Ignored by git"))
    } else {
      Ok(FilterResult::process())
    }
  }
}

/// Filter that skips anything inside a `.git` directory.
pub struct VcsDirectoryFilter;

impl FileFilter for VcsDirectoryFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    let in_vcs_dir = path
      .components()
      .any(|component| matches!(component, Component::Normal(name) if name == VCS_DIR_NAME));
    if in_vcs_dir {
      Ok(FilterResult::skip("Inside .git directory"))
    } else {
      Ok(FilterResult::process())
    }
  }
}

/// Filter that skips the license template so it never receives a notice.
pub struct LicenseFileFilter {
  license_path: PathBuf,
}

impl LicenseFileFilter {
  pub const fn new(license_path: PathBuf) -> Self {
    Self { license_path }
  }
}

impl FileFilter for LicenseFileFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    if path == self.license_path {
      Ok(FilterResult::skip("License template"))
    } else {
      Ok(FilterResult::process())
    }
  }
}

/// Per-directory exclusion decision, combining all four exclusion rules.
///
/// Checks run in a fixed order (ignore oracle, patterns, `.git`, license
/// template) and the first hit provides the reason.
pub struct ExclusionEvaluator {
  filter: CompositeFilter,
}

impl ExclusionEvaluator {
  /// Builds the evaluator for one scanned directory.
  ///
  /// # Parameters
  ///
  /// * `oracle` - Git ignore oracle, `None` when the directory is not under
  ///   version control
  /// * `patterns` - Raw exclude patterns
  /// * `cwd` - Absolute working directory, substituted for `{cwd}`
  /// * `directory` - Absolute scanned directory, substituted for `{directory}`
  /// * `license_path` - Resolved path of the license template
  ///
  /// # Errors
  ///
  /// Returns an error if an exclude pattern is not a valid regex.
  pub fn new(
    oracle: Option<Box<dyn IgnoreOracle>>,
    patterns: &ExclusionPatterns,
    cwd: &Path,
    directory: &Path,
    license_path: &Path,
  ) -> Result<Self, ExclusionError> {
    let mut filter = CompositeFilter::default();
    if let Some(oracle) = oracle {
      filter.add_filter(Box::new(IgnoreOracleFilter::new(oracle)));
    }
    filter.add_filter(Box::new(patterns.resolve(cwd, directory)?));
    filter.add_filter(Box::new(VcsDirectoryFilter));
    filter.add_filter(Box::new(LicenseFileFilter::new(license_path.to_path_buf())));

    Ok(Self { filter })
  }

  /// Returns `Some(reason)` if `path` is excluded, `None` otherwise.
  pub fn exclusion_reason(&self, path: &Path) -> Result<Option<String>> {
    let result = self.filter.should_process(path)?;
    if result.should_process {
      Ok(None)
    } else {
      Ok(Some(result.reason.unwrap_or_else(|| "Excluded".to_string())))
    }
  }

  pub fn is_excluded(&self, path: &Path) -> Result<bool> {
    Ok(self.exclusion_reason(path)?.is_some())
  }
}

impl FileFilter for ExclusionEvaluator {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    self.filter.should_process(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct FixedOracle(&'static str);

  impl IgnoreOracle for FixedOracle {
    fn is_ignored(&self, path: &Path) -> Result<bool> {
      Ok(path.to_string_lossy().contains(self.0))
    }
  }

  #[test]
  fn test_substitute_placeholders() {
    let patterns = ExclusionPatterns::new(vec![
      "{directory}/logging/*.*".to_string(),
      "{cwd}/test_dir/logging/*.*".to_string(),
      r"a{2}\.py".to_string(),
    ]);

    let resolved = patterns.substitute(Path::new("/home/user"), Path::new("/home/user/test_dir"));
    assert_eq!(
      resolved,
      vec![
        "/home/user/test_dir/logging/*.*".to_string(),
        "/home/user/test_dir/logging/*.*".to_string(),
        r"a{2}\.py".to_string(),
      ]
    );
  }

  #[test]
  fn test_pattern_filter_is_prefix_anchored() {
    let patterns = ExclusionPatterns::new(vec![r"/work/src/gen".to_string()]);
    let filter = patterns.resolve(Path::new("/work"), Path::new("/work/src")).unwrap();

    assert!(!filter.should_process(Path::new("/work/src/gen/a.py")).unwrap().should_process);
    assert!(!filter.should_process(Path::new("/work/src/generated.py")).unwrap().should_process);
    // Not anchored anywhere but the start
    assert!(filter.should_process(Path::new("/other/work/src/gen/a.py")).unwrap().should_process);
  }

  #[test]
  fn test_invalid_pattern() {
    let patterns = ExclusionPatterns::new(vec!["{directory}/(unclosed".to_string()]);
    let err = patterns.resolve(Path::new("/w"), Path::new("/w/d")).err().unwrap();
    let ExclusionError::InvalidPattern { pattern, resolved, .. } = err;
    assert_eq!(pattern, "{directory}/(unclosed");
    assert_eq!(resolved, "/w/d/(unclosed");
  }

  #[test]
  fn test_vcs_directory_filter() {
    let filter = VcsDirectoryFilter;
    assert!(!filter.should_process(Path::new("/repo/.git/hooks/pre-commit.py")).unwrap().should_process);
    assert!(filter.should_process(Path::new("/repo/.github/workflows/ci.py")).unwrap().should_process);
    assert!(filter.should_process(Path::new("/repo/src/git.py")).unwrap().should_process);
  }

  #[test]
  fn test_evaluator_reasons_in_order() {
    let patterns = ExclusionPatterns::new(vec!["{directory}/skip".to_string()]);
    let evaluator = ExclusionEvaluator::new(
      Some(Box::new(FixedOracle("ignored"))),
      &patterns,
      Path::new("/w"),
      Path::new("/w/d"),
      Path::new("/w/d/license.md.jinja2"),
    )
    .unwrap();

    assert_eq!(
      evaluator.exclusion_reason(Path::new("/w/d/skip/ignored.py")).unwrap().as_deref(),
      Some("Ignored by git")
    );
    assert_eq!(
      evaluator.exclusion_reason(Path::new("/w/d/skip/a.py")).unwrap().as_deref(),
      Some("Matches exclude pattern /w/d/skip")
    );
    assert_eq!(
      evaluator.exclusion_reason(Path::new("/w/d/.git/config")).unwrap().as_deref(),
      Some("Inside .git directory")
    );
    assert_eq!(
      evaluator.exclusion_reason(Path::new("/w/d/license.md.jinja2")).unwrap().as_deref(),
      Some("License template")
    );
    assert!(!evaluator.is_excluded(Path::new("/w/d/main.py")).unwrap());
  }

  #[test]
  fn test_evaluator_without_oracle() {
    let evaluator = ExclusionEvaluator::new(
      None,
      &ExclusionPatterns::default(),
      Path::new("/w"),
      Path::new("/w/d"),
      Path::new("/w/license.txt"),
    )
    .unwrap();

    assert!(!evaluator.is_excluded(Path::new("/w/d/ignored.py")).unwrap());
    assert!(evaluator.is_excluded(Path::new("/w/license.txt")).unwrap());
  }
}
