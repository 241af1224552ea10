//! Single-step undo built from inverse operations.
//!
//! Every successful mutation of a [`Buffer`] pushes one [`UndoRecord`]
//! describing how to reverse it. [`UndoLog::undo_last`] pops the newest record
//! and replays its inverse straight against the [`LineSequence`], bypassing the
//! log, so an undo is never itself undoable. Calling it repeatedly keeps
//! unwinding until the log is empty.
//!
//! Records carry logical positions, not line handles. The log relies on being
//! replayed in strict LIFO order against the state the mutations produced;
//! when a recorded position no longer fits the current buffer the undo is
//! refused with [`UndoError::StaleTarget`] rather than guessing.
//!
//! [`Buffer`]: crate::buffer::Buffer

use std::fmt;

use thiserror::Error;

use crate::sequence::{
  LineSequence,
  SequenceError,
};

pub type Result<T> = std::result::Result<T, UndoError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UndoError {
  #[error("nothing to undo")]
  EmptyLog,
  #[error("cannot undo {record}: line {} no longer exists", .record.position())]
  StaleTarget { record: UndoRecord },
}

/// The inverse of one completed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoRecord {
  /// A line was inserted at `position`; undo removes it.
  Inserted { position: usize },
  /// `text` was deleted from `position`; undo puts it back.
  Deleted { position: usize, text: String },
  /// The line at `position` held `text` before an update; undo restores it.
  Updated { position: usize, text: String },
}

impl UndoRecord {
  pub fn position(&self) -> usize {
    match self {
      Self::Inserted { position }
      | Self::Deleted { position, .. }
      | Self::Updated { position, .. } => *position,
    }
  }

  /// Applies the inverse to `sequence`.
  ///
  /// Nothing is touched when the recorded position is out of range.
  fn revert(&self, sequence: &mut LineSequence) -> std::result::Result<(), SequenceError> {
    match self {
      Self::Inserted { position } => sequence.remove(*position).map(drop),
      Self::Deleted { position, text } => sequence.insert(*position, text.clone()),
      Self::Updated { position, text } => sequence.set(*position, text.clone()).map(drop),
    }
  }
}

impl fmt::Display for UndoRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Inserted { position } => write!(f, "insertion at line {position}"),
      Self::Deleted { position, .. } => write!(f, "deletion of line {position}"),
      Self::Updated { position, .. } => write!(f, "update of line {position}"),
    }
  }
}

/// Last-in-first-out stack of [`UndoRecord`]s.
#[derive(Debug, Default, Clone)]
pub struct UndoLog {
  records: Vec<UndoRecord>,
}

impl UndoLog {
  pub fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.records.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// The record the next [`undo_last`](Self::undo_last) would replay.
  pub fn peek(&self) -> Option<&UndoRecord> {
    self.records.last()
  }

  pub fn record(&mut self, entry: UndoRecord) {
    self.records.push(entry);
  }

  /// Pops the newest record and reverts it on `sequence`.
  ///
  /// Returns the consumed record on success. A stale record is consumed as
  /// well, so the following call moves on to the next older mutation.
  ///
  /// # Errors
  /// - [`UndoError::EmptyLog`] if there is nothing recorded.
  /// - [`UndoError::StaleTarget`] if the recorded position is out of range for
  ///   `sequence`; `sequence` is left unchanged.
  pub fn undo_last(&mut self, sequence: &mut LineSequence) -> Result<UndoRecord> {
    let record = self.records.pop().ok_or(UndoError::EmptyLog)?;
    match record.revert(sequence) {
      Ok(()) => {
        tracing::debug!(%record, remaining = self.records.len(), "undo applied");
        Ok(record)
      },
      Err(err) => {
        tracing::warn!(%record, %err, "dropping stale undo record");
        Err(UndoError::StaleTarget { record })
      },
    }
  }
}
