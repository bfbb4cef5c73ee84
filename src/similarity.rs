//! # Similarity Module
//!
//! This module decides whether a file already carries the notice. The
//! detection algorithm sits behind the [`NoticeDetector`] trait so it can be
//! replaced without touching the reconciler.

/// Ratio above which the start of a file counts as already having the notice.
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Trait for notice detectors.
pub trait NoticeDetector: Send + Sync {
  /// Similarity between `notice` and the beginning of `content`, in `(-inf, 1]`.
  fn similarity(&self, notice: &str, content: &str) -> f64;
}

/// Edit-distance based detector.
///
/// Compares the notice with the leading slice of the content that has the
/// same length in characters. A changed year or author name costs only a
/// few edits, so such a notice is still recognised.
#[derive(Debug, Default, Clone, Copy)]
pub struct LevenshteinDetector;

impl NoticeDetector for LevenshteinDetector {
  fn similarity(&self, notice: &str, content: &str) -> f64 {
    similarity_ratio(notice, content)
  }
}

/// `1 - distance / len(notice)` over the first `len(notice)` characters of
/// `content`. Lengths are counted in characters, not bytes.
///
/// An empty notice yields `0.0`; callers reject empty notices up front.
pub fn similarity_ratio(notice: &str, content: &str) -> f64 {
  let notice_len = notice.chars().count();
  if notice_len == 0 {
    return 0.0;
  }

  let beginning = leading_chars(content, notice_len);
  let distance = levenshtein(notice, beginning);
  1.0 - (distance as f64 / notice_len as f64)
}

/// The first `count` characters of `text` (all of it if shorter).
pub fn leading_chars(text: &str, count: usize) -> &str {
  match text.char_indices().nth(count) {
    Some((byte_idx, _)) => &text[..byte_idx],
    None => text,
  }
}

/// Character-level Levenshtein edit distance, two rows of state.
pub fn levenshtein(a: &str, b: &str) -> usize {
  if a == b {
    return 0;
  }

  let a_chars: Vec<char> = a.chars().collect();
  let b_chars: Vec<char> = b.chars().collect();
  if a_chars.is_empty() {
    return b_chars.len();
  }
  if b_chars.is_empty() {
    return a_chars.len();
  }

  let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
  let mut curr = vec![0usize; b_chars.len() + 1];

  for (i, &ac) in a_chars.iter().enumerate() {
    curr[0] = i + 1;
    for (j, &bc) in b_chars.iter().enumerate() {
      let cost = usize::from(ac != bc);
      curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
    }
    std::mem::swap(&mut prev, &mut curr);
  }

  prev[b_chars.len()]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_levenshtein() {
    assert_eq!(levenshtein("", ""), 0);
    assert_eq!(levenshtein("abc", ""), 3);
    assert_eq!(levenshtein("", "abc"), 3);
    assert_eq!(levenshtein("kitten", "sitting"), 3);
    assert_eq!(levenshtein("flaw", "lawn"), 2);
    assert_eq!(levenshtein("2023", "2026"), 1);
    // Multi-byte characters count as one edit each
    assert_eq!(levenshtein("“Software”", "\"Software\""), 2);
  }

  #[test]
  fn test_leading_chars() {
    assert_eq!(leading_chars("hello world", 5), "hello");
    assert_eq!(leading_chars("héllo", 2), "hé");
    assert_eq!(leading_chars("abc", 10), "abc");
    assert_eq!(leading_chars("abc", 0), "");
  }

  #[test]
  fn test_similarity_ratio_exact_and_empty() {
    let notice = "# Copyright 2026 Example\n#\n# All rights reserved.";
    assert_eq!(similarity_ratio(notice, notice), 1.0);
    assert_eq!(similarity_ratio(notice, &format!("{notice}\n\n\nprint('x')\n")), 1.0);
    assert_eq!(similarity_ratio(notice, ""), 0.0);
    assert_eq!(similarity_ratio("", "anything"), 0.0);
  }

  #[test]
  fn test_detector_tolerates_small_changes() {
    let detector = LevenshteinDetector;
    let notice = "# Copyright 2026 Example Author <author@example.com>\n#\n# All rights reserved.";
    let older = "# Copyright 2023 Example Author <author@example.com>\n#\n# All rights reserved.\n\nimport os\n";
    assert!(detector.similarity(notice, older) > SIMILARITY_THRESHOLD);

    let unrelated = "import os\nimport sys\n\ndef main():\n    print('hello world, nothing to see')\n";
    assert!(detector.similarity(notice, unrelated) <= SIMILARITY_THRESHOLD);
  }

  #[test]
  fn test_threshold_is_strict() {
    // 10 characters with 2 edits gives exactly 0.8, which is not enough.
    assert!(LevenshteinDetector.similarity("abcdefghij", "abcdefghXY") <= SIMILARITY_THRESHOLD);
    assert!(LevenshteinDetector.similarity("abcdefghij", "abcdefghiY") > SIMILARITY_THRESHOLD);
  }
}
