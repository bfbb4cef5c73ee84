//! # Git Module
//!
//! This module wraps the version-control side of exclusion: discovering the
//! repository that contains a scanned directory and asking it whether a path
//! is ignored by `.gitignore` rules.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{ErrorCode, Repository};
use tracing::{debug, trace};

/// Trait for answering "is this path ignored by version control?".
///
/// Implementations are consulted once per candidate file, on the thread that
/// enumerates candidates.
pub trait IgnoreOracle {
  /// Returns `true` if version control ignores `path`.
  fn is_ignored(&self, path: &Path) -> Result<bool>;
}

/// Ignore oracle backed by a git repository.
pub struct GitIgnoreOracle {
  repo: Repository,
  workdir: PathBuf,
}

impl GitIgnoreOracle {
  /// Opens the repository containing `dir`, searching parent directories.
  ///
  /// Returns `Ok(None)` when `dir` is not inside a git working tree (bare
  /// repositories count as "not a working tree").
  ///
  /// # Errors
  ///
  /// Returns an error if a repository exists but cannot be opened.
  pub fn discover(dir: &Path) -> Result<Option<Self>> {
    let repo = match Repository::discover(dir) {
      Ok(repo) => repo,
      Err(e) if e.code() == ErrorCode::NotFound => {
        debug!("No git repository found for {}", dir.display());
        return Ok(None);
      }
      Err(e) => return Err(e).with_context(|| format!("Failed to open git repository for {}", dir.display())),
    };

    let Some(workdir) = repo.workdir() else {
      debug!("Git repository for {} is bare", dir.display());
      return Ok(None);
    };

    // Canonical form so it shares a prefix with canonicalized scan directories.
    let workdir = workdir
      .canonicalize()
      .with_context(|| format!("Failed to resolve git working tree {}", workdir.display()))?;
    debug!("Using git repository at {}", workdir.display());

    Ok(Some(Self { repo, workdir }))
  }

  /// Root of the working tree this oracle answers for.
  pub fn workdir(&self) -> &Path {
    &self.workdir
  }
}

impl IgnoreOracle for GitIgnoreOracle {
  fn is_ignored(&self, path: &Path) -> Result<bool> {
    let relative = path.strip_prefix(&self.workdir).unwrap_or(path);
    let ignored = self
      .repo
      .is_path_ignored(relative)
      .with_context(|| format!("Failed to check git ignore rules for {}", path.display()))?;
    trace!("git ignore check for {}: {}", relative.display(), ignored);
    Ok(ignored)
  }
}

/// Returns `true` if `dir` is inside a git working tree.
pub fn is_git_repository(dir: &Path) -> bool {
  matches!(GitIgnoreOracle::discover(dir), Ok(Some(_)))
}
