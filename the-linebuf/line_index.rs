//! Position to line handle cache.
//!
//! [`LineIndex`] mirrors the link order of a [`LineSequence`] as a flat vector
//! so positional reads are O(1). It is owned by the sequence and patched
//! before every structural mutation returns, so a lookup never observes a
//! stale mapping.
//!
//! [`LineSequence`]: crate::sequence::LineSequence

use crate::sequence::LineId;

#[derive(Debug, Default, Clone)]
pub(crate) struct LineIndex {
  // slot `p - 1` holds the line at logical position `p`
  ids: Vec<LineId>,
}

impl LineIndex {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      ids: Vec::with_capacity(capacity),
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.ids.len()
  }

  /// Returns the line at the 1-based `position`, if any.
  #[inline]
  pub fn resolve(&self, position: usize) -> Option<LineId> {
    position
      .checked_sub(1)
      .and_then(|slot| self.ids.get(slot))
      .copied()
  }

  #[inline]
  pub fn push(&mut self, id: LineId) {
    self.ids.push(id);
  }

  /// Shifts every entry at or after `position` one slot later.
  ///
  /// `position` must lie in `1..=len + 1`.
  pub fn insert(&mut self, position: usize, id: LineId) {
    debug_assert!(position >= 1 && position <= self.ids.len() + 1);
    self.ids.insert(position - 1, id);
  }

  /// Drops the entry at `position` and shifts the tail one slot earlier.
  ///
  /// `position` must lie in `1..=len`.
  pub fn remove(&mut self, position: usize) -> LineId {
    debug_assert!(position >= 1 && position <= self.ids.len());
    self.ids.remove(position - 1)
  }

  /// Recomputes the whole index by walking the links from `head`.
  pub fn rebuild(&mut self, head: Option<LineId>, mut next: impl FnMut(LineId) -> Option<LineId>) {
    self.ids.clear();
    let mut cursor = head;
    while let Some(id) = cursor {
      self.ids.push(id);
      cursor = next(id);
    }
  }

  pub fn iter(&self) -> impl DoubleEndedIterator<Item = LineId> + ExactSizeIterator + '_ {
    self.ids.iter().copied()
  }
}
