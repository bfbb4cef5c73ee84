//! # File Filter Module
//!
//! This module contains the building blocks for deciding which files are
//! handed to the reconciler: the [`FileFilter`] trait, the [`FilterResult`]
//! it produces, a [`CompositeFilter`] chaining several filters, and the
//! fixed binary-extension denylist.

use std::path::Path;

use anyhow::Result;

/// Result of a file filtering operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
  /// Whether the file should be processed
  pub should_process: bool,
  /// Reason why the file should not be processed (if any)
  pub reason: Option<String>,
}

impl FilterResult {
  /// Creates a new FilterResult indicating the file should be processed.
  pub const fn process() -> Self {
    Self {
      should_process: true,
      reason: None,
    }
  }

  /// Creates a new FilterResult indicating the file should be skipped.
  pub fn skip(reason: impl Into<String>) -> Self {
    Self {
      should_process: false,
      reason: Some(reason.into()),
    }
  }
}

/// Trait for components that filter files based on certain criteria.
///
/// Filters run on the thread that enumerates candidates, so implementations
/// are not required to be `Sync` (a git repository handle is not).
pub trait FileFilter {
  /// Determines whether a file should be processed.
  fn should_process(&self, path: &Path) -> Result<FilterResult>;
}

/// Filter that combines multiple filters; the first skip wins.
#[derive(Default)]
pub struct CompositeFilter {
  filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
  /// Adds a filter to the end of the chain.
  pub fn add_filter(&mut self, filter: Box<dyn FileFilter>) {
    self.filters.push(filter);
  }
}

impl FileFilter for CompositeFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    for filter in &self.filters {
      let result = filter.should_process(path)?;
      if !result.should_process {
        return Ok(result);
      }
    }
    Ok(FilterResult::process())
  }
}

/// Extensions of files that are never read or modified.
///
/// Compared case-insensitively against the final extension of a path
/// (`archive.tar.gz` is checked as `gz`).
pub const BINARY_EXTENSIONS: &[&str] = &[
  // Executables and compiled artifacts
  "exe", "bin", "dll", "so", "o", "a", "pyc", "pyo", "iso", "img", "dmg", "elf", "class", "msi", "jar", "deb", "rpm",
  "apk",
  // Images
  "bmp", "dib", "jpg", "jpeg", "jfif", "jp2", "png", "svg", "gif", "tiff", "webp", "ico", "psd", "heic", "heif", "raw",
  "cr2", "nef", "arw", "dds",
  // Video
  "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ts", "3gp", "mxf", "rm", "ogv", "vob", "dv",
  "f4v", "asf",
  // Audio
  "mp3", "wav", "flac", "aac", "ogg", "wma", "m4a", "alac", "aiff", "pcm", "amr", "opus",
  // Archives
  "zip", "rar", "7z", "tar", "gz", "bz2", "xz", "lz", "tgz",
  // Fonts
  "ttf", "otf", "woff", "woff2", "eot", "pfb", "pfa",
  // Documents
  "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf",
  // 3D models and CAD
  "obj", "stl", "fbx", "dae", "glb", "gltf", "3ds", "dwg", "dxf",
  // Generic data
  "dat", "db", "bak", "log", "msg", "torrent",
];

/// Returns `true` when the path's extension is in [`BINARY_EXTENSIONS`].
pub fn is_binary_extension(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| BINARY_EXTENSIONS.iter().any(|candidate| candidate.eq_ignore_ascii_case(ext)))
}

/// Filter that skips files whose extension marks them as binary content.
pub struct BinaryExtensionFilter;

impl FileFilter for BinaryExtensionFilter {
  fn should_process(&self, path: &Path) -> Result<FilterResult> {
    if is_binary_extension(path) {
      Ok(FilterResult::skip("Binary file extension"))
    } else {
      Ok(FilterResult::process())
    }
  }
}
