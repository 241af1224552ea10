//! Substring search and global replace over a [`LineSequence`].
//!
//! Matching is plain substring containment on `str` (no regex, no case
//! folding). [`find`] is lazy and read-only; [`find_and_replace`] rewrites
//! line content in place and never changes line order.

use thiserror::Error;

use crate::sequence::{
  LineSequence,
  Lines,
};

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
  #[error("search pattern must not be empty")]
  EmptyPattern,
}

/// Lazily yields the positions of lines containing `pattern`, in ascending
/// order. An empty iterator means "not found".
///
/// An empty `pattern` is contained in every line.
pub fn find<'a>(sequence: &'a LineSequence, pattern: &'a str) -> Matches<'a> {
  Matches {
    lines: sequence.iter(),
    pattern,
  }
}

/// Iterator returned by [`find`].
#[derive(Debug, Clone)]
pub struct Matches<'a> {
  lines:   Lines<'a>,
  pattern: &'a str,
}

impl Iterator for Matches<'_> {
  type Item = usize;

  fn next(&mut self) -> Option<usize> {
    let pattern = self.pattern;
    self
      .lines
      .find(|(_, text)| text.contains(pattern))
      .map(|(position, _)| position)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (0, self.lines.size_hint().1)
  }
}

/// Outcome of [`find_and_replace`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceSummary {
  /// Number of lines whose content changed.
  pub lines:        usize,
  /// Total number of occurrences replaced across all lines.
  pub replacements: usize,
}

/// Replaces every non-overlapping occurrence of `from` with `to` on every
/// line.
///
/// Each line is scanned left to right and the scan resumes after the text
/// just inserted, so a `to` that itself contains `from` is never matched
/// again and the call always terminates.
///
/// # Errors
/// Returns [`SearchError::EmptyPattern`] if `from` is empty. The sequence is
/// left untouched in that case.
pub fn find_and_replace(sequence: &mut LineSequence, from: &str, to: &str) -> Result<ReplaceSummary> {
  if from.is_empty() {
    return Err(SearchError::EmptyPattern);
  }

  let mut summary = ReplaceSummary::default();
  for position in 1..=sequence.len() {
    let Ok(text) = sequence.get(position) else {
      break;
    };
    let Some((replaced, count)) = replace_all(text, from, to) else {
      continue;
    };
    if sequence.set(position, replaced).is_ok() {
      summary.lines += 1;
      summary.replacements += count;
    }
  }

  tracing::debug!(
    lines = summary.lines,
    replacements = summary.replacements,
    "find and replace"
  );
  Ok(summary)
}

/// Returns the rewritten line and the number of occurrences replaced, or
/// `None` when `from` does not occur in `text`.
fn replace_all(text: &str, from: &str, to: &str) -> Option<(String, usize)> {
  let mut matches = text.match_indices(from).peekable();
  matches.peek()?;

  let mut out = String::with_capacity(text.len());
  let mut last = 0;
  let mut count = 0;
  for (start, matched) in matches {
    out.push_str(&text[last..start]);
    out.push_str(to);
    last = start + matched.len();
    count += 1;
  }
  out.push_str(&text[last..]);
  Some((out, count))
}
