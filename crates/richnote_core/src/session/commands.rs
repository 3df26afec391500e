//! Toolbar-level commands.
//!
//! # Invariants
//! - `toggle_block` unwraps list ancestors before retyping blocks, so a
//!   list never ends up holding anything but list items.
//! - Calling `toggle_block` or `toggle_mark` twice with the same format
//!   restores the previous structure.

use crate::model::kind::{BlockFormat, ElementKind, MarkFormat};
use crate::model::node::Element;
use crate::session::dialog::{normalize_embed_id, normalize_required_input, DialogKind};
use crate::session::error::{EditorError, EditorResult};
use crate::session::queries::{is_link, is_list};
use crate::session::{transforms, EditorSession};
use log::debug;

impl EditorSession {
    /// Toggles `format` on every block of the selection.
    ///
    /// Active formats turn back into paragraphs. List formats retype the
    /// blocks as list items and wrap them in one list per run of blocks
    /// between voids.
    pub fn toggle_block(&mut self, format: BlockFormat) -> EditorResult<()> {
        let active = self.is_block_active(format);
        self.run_command("toggle_block", move |tx| {
            transforms::unwrap_nodes(tx, &is_list, true)?;
            let kind = if active {
                ElementKind::Paragraph
            } else if format.is_list() {
                ElementKind::ListItem
            } else {
                format.kind()
            };
            transforms::set_block_types(tx, &kind)?;
            if !active && format.is_list() {
                transforms::wrap_nodes(tx, format.kind(), false)?;
            }
            Ok(())
        })
    }

    /// Toggles `format` on the selected text.
    ///
    /// A collapsed selection only flips the pending marks used by the next
    /// `insert_text`; no history entry is recorded.
    pub fn toggle_mark(&mut self, format: MarkFormat) -> EditorResult<()> {
        let range = self.selection.clone().ok_or(EditorError::NoSelection)?;
        if range.is_collapsed() {
            self.check_range(&range)?;
            let marks = self.marks().unwrap_or_default();
            let toggled = marks.with(format, !marks.has(format));
            self.pending_marks = Some(toggled);
            debug!(
                "event=pending_marks module=editor status=ok session={} mark={} active={}",
                self.id,
                format.as_str(),
                toggled.has(format)
            );
            return Ok(());
        }
        let active = self.is_mark_active(format);
        self.run_command("toggle_mark", move |tx| {
            transforms::set_marks(tx, format, !active)
        })
    }

    /// Links the selection to `url`.
    ///
    /// An enclosing link is unwrapped first. A collapsed selection inserts a
    /// link whose text is the URL; an expanded one wraps the selected text
    /// and collapses the selection to the end of the new link.
    pub fn insert_link(&mut self, url: &str) -> EditorResult<()> {
        let url = normalize_required_input(url, DialogKind::Link.field())?;
        let link_active = self.is_link_active();
        self.run_command("insert_link", move |tx| {
            if link_active {
                transforms::unwrap_nodes(tx, &is_link, false)?;
            }
            if tx.require_selection()?.is_collapsed() {
                transforms::insert_node(tx, Element::link(url.clone(), url).into())?;
                return Ok(());
            }
            let wrappers = transforms::wrap_nodes(tx, ElementKind::Link { url }, true)?;
            if let Some(end) = wrappers
                .last()
                .and_then(|path| tx.document().end_point(path))
            {
                tx.collapse_to(end);
            }
            Ok(())
        })
    }

    /// Unwraps every link on the selection; no-op when none is active.
    pub fn remove_link(&mut self) -> EditorResult<()> {
        if self.selection.is_none() {
            return Err(EditorError::NoSelection);
        }
        if !self.is_link_active() {
            return Ok(());
        }
        self.run_command("remove_link", |tx| {
            transforms::unwrap_nodes(tx, &is_link, false)
        })
    }

    /// Inserts an image block at the selection.
    pub fn insert_image(&mut self, url: &str) -> EditorResult<()> {
        let url = normalize_required_input(url, DialogKind::Image.field())?;
        self.run_command("insert_image", move |tx| {
            transforms::insert_node(tx, Element::image(url).into()).map(|_| ())
        })
    }

    /// Inserts an embed block; `source` is an id or a status URL.
    pub fn insert_embed(&mut self, source: &str) -> EditorResult<()> {
        let id = normalize_embed_id(source)?;
        self.run_command("insert_embed", move |tx| {
            transforms::insert_node(tx, Element::embed(id).into()).map(|_| ())
        })
    }
}
