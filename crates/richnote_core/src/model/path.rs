//! Tree addressing by child-index paths.
//!
//! A path lists child indexes from the document root down to one node. The
//! empty path addresses the root itself.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Child-index path from the root to one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn new(indexes: Vec<usize>) -> Self {
        Self(indexes)
    }

    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Index within the parent. `None` for the root.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Parent path. The root is its own parent.
    pub fn parent(&self) -> Path {
        let mut indexes = self.0.clone();
        indexes.pop();
        Self(indexes)
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indexes = self.0.clone();
        indexes.push(index);
        Self(indexes)
    }

    /// Next sibling path.
    pub fn next(&self) -> Path {
        self.offset_last(1)
    }

    /// Previous sibling path. `None` for first children and the root.
    pub fn previous(&self) -> Option<Path> {
        match self.last() {
            Some(index) if index > 0 => Some(self.with_last(index - 1)),
            _ => None,
        }
    }

    /// Replaces the last index.
    pub fn with_last(&self, index: usize) -> Path {
        let mut indexes = self.0.clone();
        if let Some(last) = indexes.last_mut() {
            *last = index;
        }
        Self(indexes)
    }

    fn offset_last(&self, delta: usize) -> Path {
        match self.last() {
            Some(index) => self.with_last(index + delta),
            None => self.clone(),
        }
    }

    /// Prefix of length `depth`.
    pub fn truncated(&self, depth: usize) -> Path {
        Self(self.0[..depth.min(self.0.len())].to_vec())
    }

    /// Ancestor paths from the outermost down to the parent, root excluded.
    pub fn ancestors(&self) -> Vec<Path> {
        (1..self.0.len()).map(|depth| self.truncated(depth)).collect()
    }

    /// True when `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn is_ancestor_or_self(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Document-order comparison where ancestors compare equal to their
    /// descendants.
    pub fn compare(&self, other: &Path) -> Ordering {
        for (left, right) in self.0.iter().zip(other.0.iter()) {
            match left.cmp(right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }

    pub fn is_before(&self, other: &Path) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &Path) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Longest shared prefix.
    pub fn common(&self, other: &Path) -> Path {
        let depth = self
            .0
            .iter()
            .zip(other.0.iter())
            .take_while(|(left, right)| left == right)
            .count();
        self.truncated(depth)
    }

    pub(crate) fn set(&mut self, depth: usize, index: usize) {
        self.0[depth] = index;
    }

    pub(crate) fn get(&self, depth: usize) -> usize {
        self.0[depth]
    }

    pub(crate) fn splice_at(&mut self, depth: usize, replacement: &[usize]) {
        self.0.remove(depth);
        for (offset, index) in replacement.iter().enumerate() {
            self.0.insert(depth + offset, *index);
        }
    }

    pub(crate) fn remove_at(&mut self, depth: usize) {
        self.0.remove(depth);
    }
}

impl From<Vec<usize>> for Path {
    fn from(value: Vec<usize>) -> Self {
        Self(value)
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(value: [usize; N]) -> Self {
        Self(value.to_vec())
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
