//! Editing session: a line sequence plus its undo log.
//!
//! [`Buffer`] is the programmatic surface a front end drives, one call per
//! user action. It owns a [`LineSequence`] and an [`UndoLog`] and keeps them
//! in step: a mutation that succeeds pushes exactly one [`UndoRecord`], a
//! mutation that fails touches neither.
//!
//! # Example
//!
//! ```
//! use the_linebuf::Buffer;
//!
//! let mut buffer = Buffer::new();
//! buffer.insert_end("hello");
//! buffer.insert_end("world");
//! buffer.insert_at(1, "hi").unwrap();
//! assert_eq!(buffer.delete_at(2).unwrap(), "hello");
//!
//! buffer.undo_last().unwrap();
//! assert_eq!(buffer.lines(), ["hi", "hello", "world"]);
//! ```
//!
//! # Sharing
//!
//! The sequence, its index and the undo log form one consistency unit and are
//! not separately lockable. Hosts that need a buffer on several threads wrap it
//! in a [`SharedBuffer`], which serializes whole operations behind one lock.

use std::{
  fmt,
  sync::Arc,
};

use parking_lot::{
  Mutex,
  MutexGuard,
};
use thiserror::Error;

use crate::{
  history::{
    UndoError,
    UndoLog,
    UndoRecord,
  },
  search::{
    self,
    Matches,
    ReplaceSummary,
    SearchError,
  },
  sequence::{
    LineSequence,
    Lines,
    SequenceError,
  },
};

pub type Result<T> = std::result::Result<T, BufferError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
  #[error(transparent)]
  Sequence(#[from] SequenceError),
  #[error(transparent)]
  Undo(#[from] UndoError),
  #[error(transparent)]
  Search(#[from] SearchError),
}

#[derive(Debug, Default, Clone)]
pub struct Buffer {
  lines:   LineSequence,
  history: UndoLog,
}

impl Buffer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a buffer seeded with `lines`. The seed is not undoable.
  pub fn from_lines<I, S>(lines: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      lines:   lines.into_iter().collect(),
      history: UndoLog::new(),
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.lines.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// Appends `text` as the last line and returns its position.
  pub fn insert_end(&mut self, text: impl Into<String>) -> usize {
    let position = self.lines.push(text);
    self.history.record(UndoRecord::Inserted { position });
    tracing::trace!(position, "inserted line at end");
    position
  }

  /// Inserts `text` at `position` (`1..=len + 1`).
  ///
  /// # Errors
  /// Returns [`SequenceError::OutOfRange`] for any other position.
  pub fn insert_at(&mut self, position: usize, text: impl Into<String>) -> Result<()> {
    self.lines.insert(position, text)?;
    self.history.record(UndoRecord::Inserted { position });
    tracing::trace!(position, "inserted line");
    Ok(())
  }

  /// Deletes the line at `position` (`1..=len`) and returns its text.
  ///
  /// # Errors
  /// Returns [`SequenceError::OutOfRange`] for any other position.
  pub fn delete_at(&mut self, position: usize) -> Result<String> {
    let text = self.lines.remove(position)?;
    self.history.record(UndoRecord::Deleted {
      position,
      text: text.clone(),
    });
    tracing::trace!(position, "deleted line");
    Ok(text)
  }

  /// Overwrites the line at `position` (`1..=len`) and returns the prior text.
  ///
  /// # Errors
  /// Returns [`SequenceError::OutOfRange`] for any other position.
  pub fn update_at(&mut self, position: usize, text: impl Into<String>) -> Result<String> {
    let prior = self.lines.set(position, text)?;
    self.history.record(UndoRecord::Updated {
      position,
      text: prior.clone(),
    });
    tracing::trace!(position, "updated line");
    Ok(prior)
  }

  /// # Errors
  /// Returns [`SequenceError::OutOfRange`] unless `1 <= position <= len`.
  pub fn get_at(&self, position: usize) -> Result<&str> {
    Ok(self.lines.get(position)?)
  }

  pub fn iter(&self) -> Lines<'_> {
    self.lines.iter()
  }

  /// Copies the current lines out, in order.
  pub fn lines(&self) -> Vec<String> {
    self.iter().map(|(_, text)| text.to_owned()).collect()
  }

  pub fn sequence(&self) -> &LineSequence {
    &self.lines
  }

  pub fn find<'a>(&'a self, pattern: &'a str) -> Matches<'a> {
    search::find(&self.lines, pattern)
  }

  pub fn contains(&self, pattern: &str) -> bool {
    self.find(pattern).next().is_some()
  }

  /// Replaces every occurrence of `from` with `to` on every line.
  ///
  /// The replacement is not recorded in the undo log.
  ///
  /// # Errors
  /// Returns [`SearchError::EmptyPattern`] if `from` is empty.
  pub fn find_and_replace(&mut self, from: &str, to: &str) -> Result<ReplaceSummary> {
    Ok(search::find_and_replace(&mut self.lines, from, to)?)
  }

  /// Reverts the most recent recorded mutation and returns its record.
  ///
  /// # Errors
  /// - [`UndoError::EmptyLog`] if there is nothing to undo.
  /// - [`UndoError::StaleTarget`] if the recorded position no longer exists;
  ///   the lines are left unchanged and the record is discarded.
  pub fn undo_last(&mut self) -> Result<UndoRecord> {
    Ok(self.history.undo_last(&mut self.lines)?)
  }

  #[inline]
  pub fn can_undo(&self) -> bool {
    !self.history.is_empty()
  }

  #[inline]
  pub fn undo_depth(&self) -> usize {
    self.history.len()
  }
}

impl<S: Into<String>> FromIterator<S> for Buffer {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self::from_lines(iter)
  }
}

impl<'a> IntoIterator for &'a Buffer {
  type Item = (usize, &'a str);
  type IntoIter = Lines<'a>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Numbered listing, one `position: text` row per line.
impl fmt::Display for Buffer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (position, text) in self {
      writeln!(f, "{position}: {text}")?;
    }
    Ok(())
  }
}

/// A [`Buffer`] behind a single exclusive lock.
#[derive(Debug, Default, Clone)]
pub struct SharedBuffer {
  inner: Arc<Mutex<Buffer>>,
}

impl SharedBuffer {
  pub fn new(buffer: Buffer) -> Self {
    Self {
      inner: Arc::new(Mutex::new(buffer)),
    }
  }

  /// Locks the whole buffer for the duration of the guard.
  pub fn lock(&self) -> MutexGuard<'_, Buffer> {
    self.inner.lock()
  }
}

impl From<Buffer> for SharedBuffer {
  fn from(buffer: Buffer) -> Self {
    Self::new(buffer)
  }
}
