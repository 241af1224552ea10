//! In-memory line buffer with positional editing, substring search and
//! single-step undo.
//!
//! The pieces, leaf first:
//!
//! - [`sequence`]: ordered line storage. Lines sit in a slot-map arena linked
//!   in order, and a private position index gives O(1) reads.
//! - [`history`]: the undo log, a stack of inverse operations.
//! - [`search`]: stateless find and find-and-replace.
//! - [`buffer`]: the editing session tying a sequence to its undo log.
//!
//! Positions are 1-based line numbers throughout.

pub mod buffer;
pub mod history;
mod line_index;
pub mod search;
pub mod sequence;

pub use buffer::{
  Buffer,
  BufferError,
  SharedBuffer,
};
pub use history::{
  UndoError,
  UndoRecord,
};
pub use search::{
  ReplaceSummary,
  SearchError,
};
pub use sequence::{
  LineSequence,
  SequenceError,
};
