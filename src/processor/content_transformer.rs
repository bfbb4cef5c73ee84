//! # Content Transformer Module
//!
//! This module splits a leading shebang off file content and composes the
//! new content once a notice has to be inserted.

/// Marker that starts an interpreter line.
pub const SHEBANG_MARKER: &str = "#!";

/// Separator between the notice and the original content: two blank lines.
pub const NOTICE_SEPARATOR: &str = "\n\n\n";

/// Content transformation utilities for notice insertion.
pub struct ContentTransformer;

impl ContentTransformer {
  /// Splits a shebang line off `content`.
  ///
  /// Returns the shebang (without its newline) and the remaining content.
  /// Content that does not start with `#!` is returned unchanged.
  ///
  /// ```rust
  /// use autocopyright::processor::ContentTransformer;
  ///
  /// let (shebang, rest) = ContentTransformer::split_shebang("#!/usr/bin/env python3\nprint(1)\n");
  /// assert_eq!(shebang, Some("#!/usr/bin/env python3"));
  /// assert_eq!(rest, "print(1)\n");
  /// ```
  pub fn split_shebang(content: &str) -> (Option<&str>, &str) {
    if !content.starts_with(SHEBANG_MARKER) {
      return (None, content);
    }

    match content.split_once('\n') {
      Some((shebang, rest)) => (Some(shebang), rest),
      None => (Some(content), ""),
    }
  }

  /// Builds the new file content with `notice` inserted.
  pub fn compose(shebang: Option<&str>, notice: &str, content: &str) -> String {
    let extra = shebang.map_or(0, |s| s.len() + 1);
    let mut composed = String::with_capacity(extra + notice.len() + NOTICE_SEPARATOR.len() + content.len());

    if let Some(shebang) = shebang {
      composed.push_str(shebang);
      composed.push('\n');
    }
    composed.push_str(notice);
    composed.push_str(NOTICE_SEPARATOR);
    composed.push_str(content);

    composed
  }
}
