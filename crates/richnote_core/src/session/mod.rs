//! Editor session: the single owner of one document, its selection and its
//! history.
//!
//! # Responsibility
//! - Run every mutation as a transaction against a working copy.
//! - Commit document, selection and history together, or nothing at all.
//! - Notify registered observers after each commit, undo and redo.
//!
//! # Invariants
//! - The committed document always satisfies every structural invariant.
//! - A command that fails leaves document, selection and history untouched.
//! - A command that changes nothing pushes no history entry.
//!
//! # See also
//! - `session::commands` for the toolbar-level commands.

mod commands;
pub mod dialog;
pub mod error;
mod normalize;
pub mod queries;
mod transaction;
mod transforms;

use crate::config::EditorConfig;
use crate::history::{Batch, History};
use crate::model::document::Document;
use crate::model::kind::{BlockFormat, ElementKind, MarkFormat};
use crate::model::node::{Element, Marks, Node};
use crate::model::path::Path;
use crate::model::range::{Edge, Range};
use crate::ops::{apply_operation, Operation};
use crate::session::error::{EditorError, EditorResult};
use crate::session::transaction::Transaction;
use log::{debug, error, info, warn};
use uuid::Uuid;

/// Stable identifier of one editing session.
pub type SessionId = Uuid;

/// Receives the full document after every committed change.
pub trait ChangeObserver: Send {
    fn on_change(&mut self, document: &Document);
}

impl<F> ChangeObserver for F
where
    F: FnMut(&Document) + Send,
{
    fn on_change(&mut self, document: &Document) {
        self(document)
    }
}

/// Outcome of a command run against a working copy, not yet committed.
struct Prepared {
    document: Document,
    selection_before: Option<Range>,
    selection_after: Option<Range>,
    operations: Vec<Operation>,
}

pub struct EditorSession {
    id: SessionId,
    config: EditorConfig,
    document: Document,
    selection: Option<Range>,
    pending_marks: Option<Marks>,
    history: History,
    observers: Vec<Box<dyn ChangeObserver>>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("selection", &self.selection)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Document::default())
    }
}

impl EditorSession {
    /// Opens a session on `initial` with the default configuration.
    pub fn new(initial: Document) -> Self {
        Self::with_config(initial, EditorConfig::default())
    }

    pub fn with_config(initial: Document, config: EditorConfig) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            config: config.normalized(),
            document: initial,
            selection: None,
            pending_marks: None,
            history: History::new(),
            observers: Vec::new(),
        };
        info!(
            "event=session_open module=editor status=ok session={} blocks={}",
            session.id,
            session.document.children().len()
        );
        session
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Marks queued for the next inserted text, if any.
    pub fn pending_marks(&self) -> Option<Marks> {
        self.pending_marks
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn subscribe(&mut self, observer: impl ChangeObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Replaces the selection after checking both points exist.
    pub fn select(&mut self, range: Range) -> EditorResult<()> {
        self.check_range(&range)?;
        self.selection = Some(range);
        self.pending_marks = None;
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selection = None;
        self.pending_marks = None;
    }

    /// Collapses the selection onto one of its edges.
    pub fn collapse(&mut self, edge: Edge) -> EditorResult<()> {
        let range = self.selection.as_ref().ok_or(EditorError::NoSelection)?;
        let point = range.edge(edge);
        self.selection = Some(Range::collapsed(point));
        self.pending_marks = None;
        Ok(())
    }

    fn check_range(&self, range: &Range) -> EditorResult<()> {
        for point in range.points() {
            if !self.document.has_point(point) {
                return Err(EditorError::InvalidTarget(point.path.clone()));
            }
        }
        Ok(())
    }

    /// Marks that typing at the cursor would produce.
    pub fn marks(&self) -> Option<Marks> {
        queries::current_marks(&self.document, self.selection.as_ref(), self.pending_marks)
    }

    pub fn is_block_active(&self, format: BlockFormat) -> bool {
        queries::is_block_active(&self.document, self.selection.as_ref(), format)
    }

    pub fn is_mark_active(&self, format: MarkFormat) -> bool {
        queries::is_mark_active(
            &self.document,
            self.selection.as_ref(),
            self.pending_marks,
            format,
        )
    }

    pub fn is_link_active(&self) -> bool {
        queries::is_link_active(&self.document, self.selection.as_ref())
    }

    /// Changes the kind of the element at `path`.
    ///
    /// # Errors
    /// - `InvalidTarget` when `path` is not an element or the change would
    ///   cross the inline/block, void or list boundary.
    pub fn set_node_type(&mut self, path: &Path, kind: ElementKind) -> EditorResult<()> {
        let path = path.clone();
        self.run_command("set_node_type", move |tx| {
            transforms::set_node_type(tx, &path, kind)
        })
    }

    /// Wraps the selected nodes in a new `kind` element.
    pub fn wrap_nodes(&mut self, kind: ElementKind, split: bool) -> EditorResult<()> {
        self.run_command("wrap_nodes", move |tx| {
            transforms::wrap_nodes(tx, kind, split).map(|_| ())
        })
    }

    /// Lifts the children of the matched elements on the selection.
    pub fn unwrap_nodes(
        &mut self,
        matcher: impl Fn(&Element) -> bool,
        split: bool,
    ) -> EditorResult<()> {
        self.run_command("unwrap_nodes", move |tx| {
            transforms::unwrap_nodes(tx, &matcher, split)
        })
    }

    /// Inserts `node` at the selection; the selection ends after it.
    pub fn insert_node(&mut self, node: Node) -> EditorResult<()> {
        self.run_command("insert_node", move |tx| {
            transforms::insert_node(tx, node).map(|_| ())
        })
    }

    /// Types `text` at the cursor using any pending marks.
    pub fn insert_text(&mut self, text: &str) -> EditorResult<()> {
        let marks = self.pending_marks;
        self.run_command("insert_text", move |tx| {
            transforms::insert_text(tx, text, marks)
        })
    }

    /// Removes the content of an expanded selection.
    pub fn delete_fragment(&mut self) -> EditorResult<()> {
        self.run_command("delete_fragment", transforms::delete_fragment)
    }

    /// Runs `mutation` on a working copy and commits it as one history batch.
    pub(crate) fn run_command<F>(&mut self, command: &'static str, mutation: F) -> EditorResult<()>
    where
        F: FnOnce(&mut Transaction) -> EditorResult<()>,
    {
        let Prepared {
            document,
            selection_before,
            selection_after,
            operations,
        } = match self.prepare(mutation) {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(
                    "event=command_rejected module=editor status=error session={} command={} error={}",
                    self.id, command, err
                );
                return Err(err);
            }
        };

        self.pending_marks = None;
        if operations.is_empty() {
            self.selection = selection_after;
            debug!(
                "event=command_noop module=editor status=ok session={} command={}",
                self.id, command
            );
            return Ok(());
        }

        let op_count = operations.len();
        self.history.commit(
            Batch {
                operations,
                selection_before,
                selection_after: selection_after.clone(),
            },
            self.config.history_limit,
            self.config.merge_typing && command == "insert_text",
        );
        self.document = document;
        self.selection = selection_after;
        info!(
            "event=command_commit module=editor status=ok session={} command={} ops={}",
            self.id, command, op_count
        );
        self.notify();
        Ok(())
    }

    fn prepare<F>(&self, mutation: F) -> EditorResult<Prepared>
    where
        F: FnOnce(&mut Transaction) -> EditorResult<()>,
    {
        let selection = self.selection.clone();
        if let Some(range) = &selection {
            self.check_range(range)?;
        }

        let mut tx = Transaction::new(self.document.clone(), selection.clone());
        mutation(&mut tx)?;
        let applied = tx.operation_count();
        normalize::normalize(&mut tx)?;
        if tx.operation_count() > applied {
            debug!(
                "event=normalize module=editor status=ok session={} fixes={}",
                self.id,
                tx.operation_count() - applied
            );
        }
        tx.document().validate()?;
        let (document, selection_after, operations) = tx.finish();
        Ok(Prepared {
            document,
            selection_before: selection,
            selection_after,
            operations,
        })
    }

    /// Reverts the most recent batch. Returns `false` when there is nothing
    /// to undo.
    pub fn undo(&mut self) -> EditorResult<bool> {
        let Some(batch) = self.history.take_undo() else {
            debug!("event=undo_skipped module=history status=ok session={}", self.id);
            return Ok(false);
        };
        let mut document = self.document.clone();
        for op in batch.inverse_operations() {
            if let Err(err) = apply_operation(&mut document, &op) {
                error!(
                    "event=undo module=history status=error session={} op={} error={}",
                    self.id,
                    op.name(),
                    err
                );
                self.history.push_undo(batch);
                return Err(err.into());
            }
        }
        self.document = document;
        self.selection = batch.selection_before.clone();
        self.pending_marks = None;
        info!(
            "event=undo module=history status=ok session={} ops={}",
            self.id,
            batch.operations.len()
        );
        self.history.push_redo(batch);
        self.notify();
        Ok(true)
    }

    /// Re-applies the most recently undone batch. Returns `false` when there
    /// is nothing to redo.
    pub fn redo(&mut self) -> EditorResult<bool> {
        let Some(batch) = self.history.take_redo() else {
            debug!("event=redo_skipped module=history status=ok session={}", self.id);
            return Ok(false);
        };
        let mut document = self.document.clone();
        for op in &batch.operations {
            if let Err(err) = apply_operation(&mut document, op) {
                error!(
                    "event=redo module=history status=error session={} op={} error={}",
                    self.id,
                    op.name(),
                    err
                );
                self.history.push_redo(batch);
                return Err(err.into());
            }
        }
        self.document = document;
        self.selection = batch.selection_after.clone();
        self.pending_marks = None;
        info!(
            "event=redo module=history status=ok session={} ops={}",
            self.id,
            batch.operations.len()
        );
        self.history.push_undo(batch);
        self.notify();
        Ok(true)
    }

    fn notify(&mut self) {
        for observer in &mut self.observers {
            observer.on_change(&self.document);
        }
    }
}
