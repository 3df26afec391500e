//! Undo/redo history built from reversible operation batches.
//!
//! # Responsibility
//! - Keep the undo (past) and redo (future) stacks of one session.
//! - Coalesce contiguous typing into one undo step when enabled.
//!
//! # Invariants
//! - Pushing a new committed batch clears the redo stack.
//! - A batch is undone by applying the inverses of its operations in
//!   reverse order.
//! - The undo stack never exceeds the configured limit.

use crate::model::range::Range;
use crate::ops::Operation;
use log::debug;

/// Operations committed by one command plus the selections around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub operations: Vec<Operation>,
    pub selection_before: Option<Range>,
    pub selection_after: Option<Range>,
}

impl Batch {
    /// Operations that revert this batch, in application order.
    pub fn inverse_operations(&self) -> Vec<Operation> {
        self.operations.iter().rev().map(Operation::inverse).collect()
    }

    /// True when `next` continues typing right where this batch stopped.
    fn continues_typing(&self, next: &Batch) -> bool {
        let (
            Some(Operation::InsertText {
                path, offset, text, ..
            }),
            [Operation::InsertText {
                path: next_path,
                offset: next_offset,
                ..
            }],
        ) = (self.operations.last(), next.operations.as_slice())
        else {
            return false;
        };
        path == next_path && offset + text.chars().count() == *next_offset
    }
}

/// Undo and redo stacks owned by one editor session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    undos: Vec<Batch>,
    redos: Vec<Batch>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.undos.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redos.is_empty()
    }

    pub fn undos(&self) -> &[Batch] {
        &self.undos
    }

    pub fn redos(&self) -> &[Batch] {
        &self.redos
    }

    /// Records a newly committed batch and clears the redo stack.
    pub fn commit(&mut self, batch: Batch, limit: usize, merge_typing: bool) {
        self.redos.clear();
        if merge_typing {
            if let Some(last) = self.undos.last_mut() {
                if last.continues_typing(&batch) {
                    last.operations.extend(batch.operations);
                    last.selection_after = batch.selection_after;
                    return;
                }
            }
        }
        self.undos.push(batch);
        if self.undos.len() > limit {
            let evicted = self.undos.len() - limit;
            self.undos.drain(..evicted);
            debug!("event=history_evict module=history status=ok evicted={evicted}");
        }
    }

    /// Pops the most recent batch to undo.
    pub(crate) fn take_undo(&mut self) -> Option<Batch> {
        self.undos.pop()
    }

    /// Pops the most recently undone batch to redo.
    pub(crate) fn take_redo(&mut self) -> Option<Batch> {
        self.redos.pop()
    }

    pub(crate) fn push_redo(&mut self, batch: Batch) {
        self.redos.push(batch);
    }

    /// Pushes a redone batch back without touching the redo stack.
    pub(crate) fn push_undo(&mut self, batch: Batch) {
        self.undos.push(batch);
    }
}

#[cfg(test)]
mod tests {
    use super::{Batch, History};
    use crate::model::path::Path;
    use crate::ops::Operation;

    fn typing(offset: usize, text: &str) -> Batch {
        Batch {
            operations: vec![Operation::InsertText {
                path: Path::from([0, 0]),
                offset,
                text: text.to_string(),
            }],
            selection_before: None,
            selection_after: None,
        }
    }

    #[test]
    fn commit_clears_redo_stack() {
        let mut history = History::new();
        history.commit(typing(0, "a"), 10, false);
        let undone = history.take_undo().expect("undo entry");
        history.push_redo(undone);
        assert!(history.can_redo());

        history.commit(typing(0, "b"), 10, false);
        assert!(!history.can_redo());
        assert_eq!(history.undos().len(), 1);
    }

    #[test]
    fn contiguous_typing_coalesces() {
        let mut history = History::new();
        history.commit(typing(0, "ab"), 10, true);
        history.commit(typing(2, "c"), 10, true);
        history.commit(typing(9, "z"), 10, true);
        assert_eq!(history.undos().len(), 2);
        assert_eq!(history.undos()[0].operations.len(), 2);
    }

    #[test]
    fn limit_evicts_oldest_batches() {
        let mut history = History::new();
        for index in 0..5 {
            history.commit(typing(index * 10, "x"), 3, false);
        }
        assert_eq!(history.undos().len(), 3);
        assert_eq!(
            history.undos()[0].operations,
            typing(20, "x").operations
        );
    }

    #[test]
    fn inverse_operations_run_backwards() {
        let batch = Batch {
            operations: vec![
                Operation::InsertText {
                    path: Path::from([0, 0]),
                    offset: 0,
                    text: "a".to_string(),
                },
                Operation::InsertText {
                    path: Path::from([0, 0]),
                    offset: 1,
                    text: "b".to_string(),
                },
            ],
            selection_before: None,
            selection_after: None,
        };
        let inverse = batch.inverse_operations();
        assert_eq!(inverse[0], batch.operations[1].inverse());
        assert_eq!(inverse[1], batch.operations[0].inverse());
    }
}
