//! # Reconciler Module
//!
//! This module brings one file into compliance with the notice: it leaves
//! binary files, directories and files that already carry the notice alone,
//! and rewrites everything else with the notice inserted at the top (after a
//! shebang, if there is one).

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, trace};

use super::content_transformer::ContentTransformer;
use super::file_io::FileIO;
use super::{FileOutcome, UnchangedReason};
use crate::file_filter::{BinaryExtensionFilter, FileFilter};
use crate::info_log;
use crate::similarity::{LevenshteinDetector, NoticeDetector, SIMILARITY_THRESHOLD, leading_chars};
use crate::templates::Notice;

/// Per-file read-decide-write step.
///
/// Holds only read-only state, so one instance is shared by every worker.
pub struct Reconciler {
  notice: Notice,
  detector: Arc<dyn NoticeDetector>,
}

impl Reconciler {
  /// Creates a reconciler using the Levenshtein notice detector.
  pub fn new(notice: Notice) -> Self {
    Self::with_detector(notice, Arc::new(LevenshteinDetector))
  }

  pub fn with_detector(notice: Notice, detector: Arc<dyn NoticeDetector>) -> Self {
    Self { notice, detector }
  }

  /// Reconciles a single path.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read, is not valid UTF-8, or
  /// cannot be replaced.
  pub fn reconcile(&self, path: &Path) -> Result<FileOutcome> {
    let filter_result = BinaryExtensionFilter.should_process(path)?;
    if !filter_result.should_process {
      trace!(
        "Skipping: {} ({})",
        path.display(),
        filter_result.reason.as_deref().unwrap_or("binary")
      );
      return Ok(FileOutcome::Unchanged(UnchangedReason::BinaryExtension));
    }

    let Some(content) = FileIO::read_text(path)? else {
      trace!("Skipping: {} (directory)", path.display());
      return Ok(FileOutcome::Unchanged(UnchangedReason::Directory));
    };
    debug!("Inspecting file {}", path.display());

    let (shebang, body) = ContentTransformer::split_shebang(&content);

    let notice = self.notice.as_str();
    let beginning = leading_chars(body, self.notice.char_len());
    let ratio = self.detector.similarity(notice, beginning);
    debug!("Ratio {:.3} for {}", ratio, path.display());

    if ratio > SIMILARITY_THRESHOLD {
      return Ok(FileOutcome::Unchanged(UnchangedReason::NoticePresent { ratio }));
    }

    let new_content = ContentTransformer::compose(shebang, notice, body);
    FileIO::write_atomic(path, &new_content)?;
    info_log!("Updated {}", path.display());

    Ok(FileOutcome::Changed)
  }
}
