//! Ordered line storage with O(1) positional access.
//!
//! Lines live in a slot-map arena and are chained through `next` links, which
//! are the single source of truth for line order. A [`LineIndex`] mirrors that
//! order as a flat vector so that `get`/`set` and the predecessor lookup of a
//! splice never walk the chain.
//!
//! # Positions
//!
//! All positions are 1-based logical line numbers. After every completed
//! operation the lines occupy exactly `1..=len`. Reads and in-place updates
//! accept `1..=len`, inserts accept `1..=len + 1`.
//!
//! # Failure
//!
//! Bounds are checked against the current length before anything is touched,
//! so a failed call leaves links, arena and index exactly as they were.

use std::{
  iter::FusedIterator,
  mem,
};

use slotmap::HopSlotMap;
use thiserror::Error;

use crate::line_index::LineIndex;

slotmap::new_key_type! {
  /// Stable handle of a line inside a [`LineSequence`] arena.
  pub struct LineId;
}

pub type Result<T> = std::result::Result<T, SequenceError>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
  /// `max` is the largest position the rejected operation would have accepted.
  #[error("line {position} is out of range (valid lines: 1..={max})")]
  OutOfRange { position: usize, max: usize },
}

#[derive(Debug, Clone)]
struct Node {
  text: String,
  next: Option<LineId>,
}

#[derive(Debug, Default, Clone)]
pub struct LineSequence {
  nodes: HopSlotMap<LineId, Node>,
  head:  Option<LineId>,
  tail:  Option<LineId>,
  index: LineIndex,
}

impl LineSequence {
  pub fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.index.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.head.is_none()
  }

  fn check_bounds(position: usize, max: usize) -> Result<()> {
    if position == 0 || position > max {
      return Err(SequenceError::OutOfRange { position, max });
    }
    Ok(())
  }

  fn id_at(&self, position: usize) -> Result<LineId> {
    self.index.resolve(position).ok_or(SequenceError::OutOfRange {
      position,
      max: self.len(),
    })
  }

  /// Returns the text of the line at `position`.
  pub fn get(&self, position: usize) -> Result<&str> {
    let id = self.id_at(position)?;
    Ok(self.nodes[id].text.as_str())
  }

  /// Appends `text` as the new last line and returns its position.
  pub fn push(&mut self, text: impl Into<String>) -> usize {
    let id = self.nodes.insert(Node {
      text: text.into(),
      next: None,
    });
    match self.tail {
      Some(tail) => self.nodes[tail].next = Some(id),
      None => self.head = Some(id),
    }
    self.tail = Some(id);
    self.index.push(id);
    self.len()
  }

  /// Inserts `text` so that it ends up at `position`, shifting the line
  /// previously there (and everything after it) one position later.
  ///
  /// # Errors
  /// Returns [`SequenceError::OutOfRange`] unless `1 <= position <= len + 1`.
  pub fn insert(&mut self, position: usize, text: impl Into<String>) -> Result<()> {
    Self::check_bounds(position, self.len() + 1)?;
    if position == self.len() + 1 {
      self.push(text);
      return Ok(());
    }

    let prev = match position {
      1 => None,
      _ => Some(self.id_at(position - 1)?),
    };
    let next = match prev {
      Some(prev) => self.nodes[prev].next,
      None => self.head,
    };
    let id = self.nodes.insert(Node {
      text: text.into(),
      next,
    });
    match prev {
      Some(prev) => self.nodes[prev].next = Some(id),
      None => self.head = Some(id),
    }
    self.index.insert(position, id);

    debug_assert!(self.is_index_consistent());
    Ok(())
  }

  /// Unlinks the line at `position` and returns its text.
  ///
  /// # Errors
  /// Returns [`SequenceError::OutOfRange`] unless `1 <= position <= len`.
  pub fn remove(&mut self, position: usize) -> Result<String> {
    let id = self.id_at(position)?;
    let prev = match position {
      1 => None,
      _ => Some(self.id_at(position - 1)?),
    };

    let node = self.nodes.remove(id).ok_or(SequenceError::OutOfRange {
      position,
      max: self.len(),
    })?;
    match prev {
      Some(prev) => self.nodes[prev].next = node.next,
      None => self.head = node.next,
    }
    if node.next.is_none() {
      self.tail = prev;
    }
    self.index.remove(position);

    debug_assert!(self.is_index_consistent());
    Ok(node.text)
  }

  /// Replaces the text of the line at `position`, returning the previous text.
  ///
  /// Line order is untouched, so the index stays valid.
  ///
  /// # Errors
  /// Returns [`SequenceError::OutOfRange`] unless `1 <= position <= len`.
  pub fn set(&mut self, position: usize, text: impl Into<String>) -> Result<String> {
    let id = self.id_at(position)?;
    Ok(mem::replace(&mut self.nodes[id].text, text.into()))
  }

  /// Iterates `(position, text)` pairs in order by following the links.
  pub fn iter(&self) -> Lines<'_> {
    Lines {
      sequence:  self,
      cursor:    self.head,
      position:  0,
      remaining: self.len(),
    }
  }

  /// Walks the links and checks that the index agrees with them slot by slot
  /// and that no unreachable line is left in the arena.
  pub fn is_index_consistent(&self) -> bool {
    let mut cursor = self.head;
    let mut last = None;
    for id in self.index.iter() {
      if cursor != Some(id) {
        return false;
      }
      last = cursor;
      cursor = self.nodes.get(id).and_then(|node| node.next);
    }
    cursor.is_none() && last == self.tail && self.nodes.len() == self.index.len()
  }
}

impl<S: Into<String>> FromIterator<S> for LineSequence {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    let iter = iter.into_iter();
    let mut nodes = HopSlotMap::with_capacity_and_key(iter.size_hint().0);
    let mut head = None;
    let mut tail: Option<LineId> = None;
    for text in iter {
      let id = nodes.insert(Node {
        text: text.into(),
        next: None,
      });
      match tail {
        Some(tail) => nodes[tail].next = Some(id),
        None => head = Some(id),
      }
      tail = Some(id);
    }

    let mut index = LineIndex::with_capacity(nodes.len());
    index.rebuild(head, |id| nodes.get(id).and_then(|node| node.next));
    Self {
      nodes,
      head,
      tail,
      index,
    }
  }
}

impl<'a> IntoIterator for &'a LineSequence {
  type Item = (usize, &'a str);
  type IntoIter = Lines<'a>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Iterator over the lines of a [`LineSequence`], see [`LineSequence::iter`].
#[derive(Debug, Clone)]
pub struct Lines<'a> {
  sequence:  &'a LineSequence,
  cursor:    Option<LineId>,
  position:  usize,
  remaining: usize,
}

impl<'a> Iterator for Lines<'a> {
  type Item = (usize, &'a str);

  fn next(&mut self) -> Option<Self::Item> {
    let node = self.sequence.nodes.get(self.cursor?)?;
    self.cursor = node.next;
    self.position += 1;
    self.remaining = self.remaining.saturating_sub(1);
    Some((self.position, node.text.as_str()))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl ExactSizeIterator for Lines<'_> {}

impl FusedIterator for Lines<'_> {}

#[cfg(test)]
mod test {
  use quickcheck::{
    Arbitrary,
    Gen,
  };

  use super::*;

  fn contents(sequence: &LineSequence) -> Vec<&str> {
    sequence.iter().map(|(_, text)| text).collect()
  }

  #[test]
  fn push_appends() {
    let mut sequence = LineSequence::new();
    assert!(sequence.is_empty());
    assert_eq!(sequence.push("hello"), 1);
    assert_eq!(sequence.push("world"), 2);
    assert_eq!(sequence.len(), 2);
    assert_eq!(sequence.get(1), Ok("hello"));
    assert_eq!(sequence.get(2), Ok("world"));
    assert!(sequence.is_index_consistent());
  }

  #[test]
  fn insert_at_front_middle_and_end() {
    let mut sequence: LineSequence = ["b", "d"].into_iter().collect();
    sequence.insert(1, "a").unwrap();
    sequence.insert(3, "c").unwrap();
    sequence.insert(5, "e").unwrap();
    assert_eq!(contents(&sequence), ["a", "b", "c", "d", "e"]);
    assert!(sequence.is_index_consistent());

    // the tail must follow an append through `insert`
    sequence.push("f");
    assert_eq!(sequence.get(6), Ok("f"));
    assert!(sequence.is_index_consistent());
  }

  #[test]
  fn insert_into_empty() {
    let mut sequence = LineSequence::new();
    sequence.insert(1, "only").unwrap();
    assert_eq!(contents(&sequence), ["only"]);
    assert_eq!(
      sequence.insert(3, "nope"),
      Err(SequenceError::OutOfRange {
        position: 3,
        max:      2,
      })
    );
  }

  #[test]
  fn insert_bounds() {
    let mut sequence: LineSequence = ["a", "b"].into_iter().collect();
    assert!(sequence.insert(0, "x").is_err());
    assert!(sequence.insert(4, "x").is_err());
    assert_eq!(contents(&sequence), ["a", "b"]);
    sequence.insert(3, "c").unwrap();
    assert_eq!(contents(&sequence), ["a", "b", "c"]);
  }

  #[test]
  fn remove_head_middle_tail() {
    let mut sequence: LineSequence = ["a", "b", "c", "d"].into_iter().collect();
    assert_eq!(sequence.remove(2), Ok("b".to_string()));
    assert_eq!(sequence.remove(1), Ok("a".to_string()));
    assert_eq!(sequence.remove(2), Ok("d".to_string()));
    assert_eq!(contents(&sequence), ["c"]);
    assert!(sequence.is_index_consistent());

    sequence.push("e");
    assert_eq!(contents(&sequence), ["c", "e"]);

    assert_eq!(sequence.remove(2), Ok("e".to_string()));
    assert_eq!(sequence.remove(1), Ok("c".to_string()));
    assert!(sequence.is_empty());
    assert!(sequence.is_index_consistent());

    sequence.push("again");
    assert_eq!(contents(&sequence), ["again"]);
  }

  #[test]
  fn remove_out_of_range() {
    let mut sequence: LineSequence = ["a"].into_iter().collect();
    assert_eq!(
      sequence.remove(2),
      Err(SequenceError::OutOfRange {
        position: 2,
        max:      1,
      })
    );
    assert!(sequence.remove(0).is_err());
    assert_eq!(contents(&sequence), ["a"]);
    assert!(LineSequence::new().remove(1).is_err());
  }

  #[test]
  fn set_returns_prior_text() {
    let mut sequence: LineSequence = ["a", "b"].into_iter().collect();
    assert_eq!(sequence.set(2, "B"), Ok("b".to_string()));
    assert_eq!(sequence.get(2), Ok("B"));
    assert!(sequence.set(3, "C").is_err());
    assert_eq!(contents(&sequence), ["a", "B"]);
  }

  #[test]
  fn iter_is_restartable_and_exact() {
    let sequence: LineSequence = ["x", "y", "z"].into_iter().collect();
    let lines = sequence.iter();
    assert_eq!(lines.len(), 3);
    let first: Vec<_> = lines.clone().collect();
    let second: Vec<_> = (&sequence).into_iter().collect();
    assert_eq!(first, vec![(1, "x"), (2, "y"), (3, "z")]);
    assert_eq!(first, second);
  }

  #[derive(Debug, Clone)]
  enum Op {
    Push(String),
    Insert(usize, String),
    Remove(usize),
    Set(usize, String),
  }

  impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
      // small positions so that in-range and out-of-range both show up
      let position = usize::arbitrary(g) % 8;
      match u8::arbitrary(g) % 4 {
        0 => Op::Push(String::arbitrary(g)),
        1 => Op::Insert(position, String::arbitrary(g)),
        2 => Op::Remove(position),
        _ => Op::Set(position, String::arbitrary(g)),
      }
    }
  }

  quickcheck::quickcheck! {
      fn matches_vec_model(ops: Vec<Op>) -> bool {
          let mut sequence = LineSequence::new();
          let mut model: Vec<String> = Vec::new();
          for op in ops {
              match op {
                  Op::Push(text) => {
                      sequence.push(text.clone());
                      model.push(text);
                  },
                  Op::Insert(position, text) => {
                      let ok = (1..=model.len() + 1).contains(&position);
                      if sequence.insert(position, text.clone()).is_ok() != ok {
                          return false;
                      }
                      if ok {
                          model.insert(position - 1, text);
                      }
                  },
                  Op::Remove(position) => {
                      let expected = (1..=model.len())
                          .contains(&position)
                          .then(|| model.remove(position - 1));
                      if sequence.remove(position).ok() != expected {
                          return false;
                      }
                  },
                  Op::Set(position, text) => {
                      let expected = (1..=model.len())
                          .contains(&position)
                          .then(|| mem::replace(&mut model[position - 1], text.clone()));
                      if sequence.set(position, text).ok() != expected {
                          return false;
                      }
                  },
              }
              let positions_ok = sequence
                  .iter()
                  .map(|(position, _)| position)
                  .eq(1..=model.len());
              if !positions_ok || !sequence.is_index_consistent() {
                  return false;
              }
          }
          sequence.iter().map(|(_, text)| text).eq(model.iter().map(String::as_str))
      }
  }
}
