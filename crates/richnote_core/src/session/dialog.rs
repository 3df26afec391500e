//! Insertion dialogs for links, images and embeds.
//!
//! # Responsibility
//! - Hold user input between "open dialog" and "submit".
//! - Reject blank input before the mutation engine runs.
//!
//! # Invariants
//! - Opening, editing and cancelling a dialog never mutate the session.
//! - Submitting trims the input; blank input fails with `EmptyInput`.

use crate::session::error::{EditorError, EditorResult};
use crate::session::EditorSession;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static STATUS_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/status(?:es)?/(\d+)").expect("valid status id regex"));

/// Which insertion a dialog performs on submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Link,
    Image,
    Embed,
}

impl DialogKind {
    /// Name of the single required input field.
    pub fn field(self) -> &'static str {
        match self {
            Self::Link | Self::Image => "url",
            Self::Embed => "id",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Image => "image",
            Self::Embed => "embed",
        }
    }
}

/// Pending insertion holding the user's raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionDialog {
    kind: DialogKind,
    input: String,
}

impl InsertionDialog {
    pub fn new(kind: DialogKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    pub fn kind(&self) -> DialogKind {
        self.kind
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    /// Closes the dialog without touching the document or history.
    pub fn cancel(self) {
        debug!(
            "event=dialog_cancel module=dialog status=ok kind={}",
            self.kind.as_str()
        );
    }
}

/// Trims `value`; blank values fail with `EmptyInput(field)`.
pub fn normalize_required_input(value: &str, field: &'static str) -> EditorResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EditorError::EmptyInput(field));
    }
    Ok(trimmed.to_string())
}

/// Accepts a bare embed id or a status URL (`.../status/<digits>`) and
/// returns the id.
pub fn normalize_embed_id(value: &str) -> EditorResult<String> {
    let trimmed = normalize_required_input(value, DialogKind::Embed.field())?;
    match STATUS_ID_RE
        .captures(&trimmed)
        .and_then(|captures| captures.get(1))
    {
        Some(id) => Ok(id.as_str().to_string()),
        None => Ok(trimmed),
    }
}

impl EditorSession {
    pub fn open_dialog(&self, kind: DialogKind) -> InsertionDialog {
        debug!(
            "event=dialog_open module=dialog status=ok session={} kind={}",
            self.id,
            kind.as_str()
        );
        InsertionDialog::new(kind)
    }

    /// Runs the insertion the dialog was opened for.
    ///
    /// # Errors
    /// - `EmptyInput` when the trimmed input is blank; nothing is mutated.
    /// - Any error of the underlying insertion command.
    pub fn submit_dialog(&mut self, dialog: InsertionDialog) -> EditorResult<()> {
        match dialog.kind {
            DialogKind::Link => self.insert_link(&dialog.input),
            DialogKind::Image => self.insert_image(&dialog.input),
            DialogKind::Embed => self.insert_embed(&dialog.input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_embed_id, normalize_required_input, DialogKind};
    use crate::model::range::{Point, Range};
    use crate::session::error::EditorError;
    use crate::session::EditorSession;

    #[test]
    fn blank_input_is_rejected_with_field_name() {
        assert_eq!(
            normalize_required_input("   ", "url"),
            Err(EditorError::EmptyInput("url"))
        );
        assert_eq!(
            normalize_required_input("  https://x.com ", "url").unwrap(),
            "https://x.com"
        );
    }

    #[test]
    fn embed_id_is_extracted_from_status_urls() {
        assert_eq!(
            normalize_embed_id("https://twitter.com/someone/status/1234567890?s=20").unwrap(),
            "1234567890"
        );
        assert_eq!(normalize_embed_id(" 42 ").unwrap(), "42");
        assert_eq!(normalize_embed_id(""), Err(EditorError::EmptyInput("id")));
    }

    #[test]
    fn blank_insertions_name_the_dialog_field() {
        let mut session = EditorSession::default();
        session
            .select(Range::collapsed(Point::new([0, 0], 0)))
            .expect("select");
        assert_eq!(
            session.insert_image(" "),
            Err(EditorError::EmptyInput(DialogKind::Image.field()))
        );
        assert_eq!(
            session.insert_link("\t"),
            Err(EditorError::EmptyInput(DialogKind::Link.field()))
        );
        assert_eq!(session.insert_embed(""), Err(EditorError::EmptyInput("id")));
        assert!(!session.can_undo());
    }
}
