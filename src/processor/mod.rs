//! # Processor Module
//!
//! This module contains the core of a run: enumerating candidate files in the
//! configured directories, filtering them through the exclusion rules, and
//! reconciling each survivor against the rendered notice.
//!
//! The module is organized into several submodules:
//! - [`file_io`] - UTF-8 reading and atomic replacement of files
//! - [`content_transformer`] - Shebang handling and notice insertion
//! - [`file_collector`] - Recursive glob matching inside a directory
//! - [`reconciler`] - The per-file read-decide-write step
//!
//! The [`Processor`] struct is the main entry point; it produces a
//! [`RunReport`] whose [`exit_code`](RunReport::exit_code) is the process
//! exit status.

mod content_transformer;
mod file_collector;
mod file_io;
mod reconciler;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
pub use content_transformer::{ContentTransformer, NOTICE_SEPARATOR, SHEBANG_MARKER};
pub use file_collector::FileCollector;
pub use file_io::{FileIO, TEMP_FILE_PREFIX, TEMP_FILE_SUFFIX};
use futures::stream::{self, StreamExt};
pub use reconciler::Reconciler;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::exclusion::{ExclusionEvaluator, ExclusionPatterns};
use crate::git::{GitIgnoreOracle, IgnoreOracle};
use crate::project::ProjectMetadata;
use crate::templates::{Notice, RenderContext, TemplateManager, render_notice};

/// Why a file was left as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum UnchangedReason {
  /// The extension is on the binary denylist; the file was not read.
  BinaryExtension,
  /// The beginning of the file is similar enough to the notice.
  NoticePresent { ratio: f64 },
  /// The path is a directory.
  Directory,
  /// An exclusion rule matched; carries the rule description.
  Excluded(String),
}

/// Result of reconciling one path.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
  /// The notice was inserted.
  Changed,
  /// The file was left untouched.
  Unchanged(UnchangedReason),
}

impl FileOutcome {
  pub const fn is_changed(&self) -> bool {
    matches!(self, Self::Changed)
  }
}

/// Outcomes of every path seen during a run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
  outcomes: Vec<(PathBuf, FileOutcome)>,
}

impl RunReport {
  pub const fn new() -> Self {
    Self { outcomes: Vec::new() }
  }

  pub fn record(&mut self, path: PathBuf, outcome: FileOutcome) {
    self.outcomes.push((path, outcome));
  }

  /// Outcomes in the order they were recorded (not stable across runs).
  pub fn outcomes(&self) -> &[(PathBuf, FileOutcome)] {
    &self.outcomes
  }

  /// Outcome recorded for `path`, if it was seen.
  pub fn outcome_for(&self, path: &Path) -> Option<&FileOutcome> {
    self
      .outcomes
      .iter()
      .find(|(recorded, _)| recorded == path)
      .map(|(_, outcome)| outcome)
  }

  /// Returns `true` if at least one file was modified.
  pub fn had_changes(&self) -> bool {
    self.outcomes.iter().any(|(_, outcome)| outcome.is_changed())
  }

  /// Aggregate status: 1 if any file changed, else 0.
  pub fn exit_code(&self) -> u8 {
    u8::from(self.had_changes())
  }

  pub fn changed_paths(&self) -> impl Iterator<Item = &Path> {
    self
      .outcomes
      .iter()
      .filter(|(_, outcome)| outcome.is_changed())
      .map(|(path, _)| path.as_path())
  }

  pub fn changed_count(&self) -> usize {
    self.changed_paths().count()
  }

  /// Number of files that already carried the notice.
  pub fn compliant_count(&self) -> usize {
    self
      .outcomes
      .iter()
      .filter(|(_, outcome)| matches!(outcome, FileOutcome::Unchanged(UnchangedReason::NoticePresent { .. })))
      .count()
  }

  /// Number of paths skipped without inspection (excluded, binary, directory).
  pub fn skipped_count(&self) -> usize {
    self.outcomes.len() - self.changed_count() - self.compliant_count()
  }

  /// One-line summary of the run.
  pub fn summary(&self) -> String {
    format!(
      "{} updated, {} already compliant, {} skipped",
      self.changed_count(),
      self.compliant_count(),
      self.skipped_count()
    )
  }
}

/// Runs the whole add-notice pipeline for one [`RunConfig`].
#[derive(Debug, Clone)]
pub struct Processor {
  config: RunConfig,
  /// Absolute working directory; relative paths and `{cwd}` resolve here
  cwd: PathBuf,
}

impl Processor {
  /// Creates a processor rooted at the current working directory.
  ///
  /// # Errors
  ///
  /// Returns an error if the current directory cannot be determined.
  pub fn new(config: RunConfig) -> Result<Self> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(Self::with_working_dir(config, cwd))
  }

  /// Creates a processor that treats `cwd` as the working directory.
  pub fn with_working_dir(config: RunConfig, cwd: impl Into<PathBuf>) -> Self {
    let cwd = cwd.into();
    let cwd = cwd.canonicalize().unwrap_or(cwd);
    Self { config, cwd }
  }

  pub const fn config(&self) -> &RunConfig {
    &self.config
  }

  pub fn working_dir(&self) -> &Path {
    &self.cwd
  }

  /// Runs the processor to completion.
  ///
  /// Configuration problems (missing template, render failure, invalid
  /// exclude pattern or glob) are reported before any file is touched. The
  /// first per-file error aborts the run; files already written stay
  /// written.
  pub async fn run(&self) -> Result<RunReport> {
    let license = self.license_path()?;
    let notice = self.render_notice(&license)?;

    // Walking the tree and querying git both block
    let processor = self.clone();
    let (candidates, mut report) = tokio::task::spawn_blocking(move || {
      let mut report = RunReport::new();
      let candidates = processor.collect_candidates(&license, &mut report)?;
      Ok::<_, anyhow::Error>((candidates, report))
    })
    .await
    .context("Candidate enumeration task failed")??;
    debug!("Collected {} candidate paths", candidates.len());

    self.dispatch(Reconciler::new(notice), candidates, &mut report).await?;

    Ok(report)
  }

  /// Resolves the license template path; it must exist.
  pub fn license_path(&self) -> Result<PathBuf> {
    let license = self.cwd.join(&self.config.license);
    license
      .canonicalize()
      .with_context(|| format!("License template not found: {}", license.display()))
  }

  /// Renders the notice from the template at `license`.
  pub fn render_notice(&self, license: &Path) -> Result<Notice> {
    let mut template = TemplateManager::new();
    template.load_template(license)?;

    let project = ProjectMetadata::discover(&self.cwd, self.config.project_file.as_deref());
    let context = RenderContext::current(project);

    render_notice(&template, &context, &self.config.comment_symbol)
      .with_context(|| format!("Failed to render license template {}", license.display()))
  }

  /// Enumerates the paths to reconcile, recording excluded ones in `report`.
  ///
  /// Every path appears at most once, even when several globs or directories
  /// reach it. Exclusion is decided per directory: a path excluded by one
  /// directory's rules is still a candidate if another directory keeps it.
  pub fn collect_candidates(&self, license: &Path, report: &mut RunReport) -> Result<Vec<PathBuf>> {
    let collector = FileCollector::new(&self.config.globs)?;
    let patterns = ExclusionPatterns::new(self.config.exclude.clone());
    for pattern in patterns.as_slice() {
      debug!("Using exclude pattern: {:?}", pattern);
    }

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    let mut excluded = BTreeMap::new();

    for directory in &self.config.directories {
      let joined = self.cwd.join(directory);
      let directory = joined
        .canonicalize()
        .with_context(|| format!("Failed to resolve directory {}", joined.display()))?;

      let oracle: Option<Box<dyn IgnoreOracle>> = match GitIgnoreOracle::discover(&directory)? {
        Some(oracle) => Some(Box::new(oracle)),
        None if self.config.allow_untracked => {
          info!(
            "Directory {} is not a git repository, processing without git ignore rules",
            directory.display()
          );
          None
        }
        None => {
          warn!("Directory {} is not a git repository, skipping", directory.display());
          continue;
        }
      };

      let evaluator = ExclusionEvaluator::new(oracle, &patterns, &self.cwd, &directory, license)?;

      for path in collector.collect(&directory) {
        if seen.contains(&path) {
          continue;
        }

        if let Some(reason) = evaluator.exclusion_reason(&path)? {
          debug!("Excluded {} in {} ({})", path.display(), directory.display(), reason);
          excluded.entry(path).or_insert(reason);
          continue;
        }

        seen.insert(path.clone());
        candidates.push(path);
      }
    }

    for (path, reason) in excluded {
      if seen.contains(&path) {
        continue;
      }
      info!("Excluded {} ({})", path.display(), reason);
      report.record(path, FileOutcome::Unchanged(UnchangedReason::Excluded(reason)));
    }

    Ok(candidates)
  }

  async fn dispatch(&self, reconciler: Reconciler, candidates: Vec<PathBuf>, report: &mut RunReport) -> Result<()> {
    let pool = self.config.pool;
    if pool <= 1 {
      debug!("Processing {} files sequentially", candidates.len());
      for path in candidates {
        let outcome = reconciler.reconcile(&path)?;
        report.record(path, outcome);
      }
      return Ok(());
    }

    debug!("Processing {} files with {} workers", candidates.len(), pool);
    let reconciler = Arc::new(reconciler);

    let mut results = stream::iter(candidates)
      .map(|path| {
        let reconciler = Arc::clone(&reconciler);
        tokio::task::spawn_blocking(move || {
          let outcome = reconciler.reconcile(&path);
          (path, outcome)
        })
      })
      .buffer_unordered(pool);

    while let Some(joined) = results.next().await {
      let (path, outcome) = joined.context("Worker task failed")?;
      report.record(path, outcome?);
    }

    Ok(())
  }
}
