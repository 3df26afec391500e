//! Toolbar command surface.
//!
//! # Responsibility
//! - Parse stable command strings coming from hosts into typed commands.
//! - Dispatch commands to the session and report button state.
//!
//! # Invariants
//! - Parsing never touches a session.
//! - The link button removes an active link instead of opening a dialog.

use crate::model::kind::{
    parse_block_format, parse_mark_format, BlockFormat, FormatParseError, MarkFormat,
};
use crate::session::dialog::{DialogKind, InsertionDialog};
use crate::session::error::EditorResult;
use crate::session::EditorSession;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One toolbar action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarCommand {
    ToggleMark(MarkFormat),
    ToggleBlock(BlockFormat),
    InsertLink(String),
    RemoveLink,
    InsertImage(String),
    InsertEmbed(String),
    Undo,
    Redo,
}

/// Command-string parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarParseError {
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidFormat(FormatParseError),
}

impl Display for ToolbarParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCommand(command) => write!(f, "unknown toolbar command `{command}`"),
            Self::MissingArgument(command) => write!(f, "`{command}` requires an argument"),
            Self::InvalidFormat(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ToolbarParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidFormat(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormatParseError> for ToolbarParseError {
    fn from(value: FormatParseError) -> Self {
        Self::InvalidFormat(value)
    }
}

impl ToolbarCommand {
    /// Parses `command` (e.g. `toggle_mark`) with its optional argument
    /// (e.g. `bold`).
    pub fn parse(command: &str, argument: Option<&str>) -> Result<Self, ToolbarParseError> {
        let name = command.trim();
        let required = |label: &'static str| {
            argument
                .map(str::to_string)
                .ok_or(ToolbarParseError::MissingArgument(label))
        };
        match name {
            "toggle_mark" => Ok(Self::ToggleMark(parse_mark_format(
                &required("toggle_mark")?,
            )?)),
            "toggle_block" => Ok(Self::ToggleBlock(parse_block_format(
                &required("toggle_block")?,
            )?)),
            "insert_link" => Ok(Self::InsertLink(required("insert_link")?)),
            "remove_link" => Ok(Self::RemoveLink),
            "insert_image" => Ok(Self::InsertImage(required("insert_image")?)),
            "insert_embed" => Ok(Self::InsertEmbed(required("insert_embed")?)),
            "undo" => Ok(Self::Undo),
            "redo" => Ok(Self::Redo),
            other => Err(ToolbarParseError::UnknownCommand(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ToggleMark(_) => "toggle_mark",
            Self::ToggleBlock(_) => "toggle_block",
            Self::InsertLink(_) => "insert_link",
            Self::RemoveLink => "remove_link",
            Self::InsertImage(_) => "insert_image",
            Self::InsertEmbed(_) => "insert_embed",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

/// Active/enabled state of every toolbar button.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolbarState {
    pub active_marks: Vec<MarkFormat>,
    pub active_blocks: Vec<BlockFormat>,
    pub link_active: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl ToolbarState {
    pub fn is_mark_active(&self, format: MarkFormat) -> bool {
        self.active_marks.contains(&format)
    }

    pub fn is_block_active(&self, format: BlockFormat) -> bool {
        self.active_blocks.contains(&format)
    }
}

impl EditorSession {
    pub fn toolbar_state(&self) -> ToolbarState {
        ToolbarState {
            active_marks: MarkFormat::all()
                .iter()
                .copied()
                .filter(|format| self.is_mark_active(*format))
                .collect(),
            active_blocks: BlockFormat::all()
                .iter()
                .copied()
                .filter(|format| self.is_block_active(*format))
                .collect(),
            link_active: self.is_link_active(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Runs one toolbar command.
    pub fn dispatch(&mut self, command: ToolbarCommand) -> EditorResult<()> {
        match command {
            ToolbarCommand::ToggleMark(format) => self.toggle_mark(format),
            ToolbarCommand::ToggleBlock(format) => self.toggle_block(format),
            ToolbarCommand::InsertLink(url) => self.insert_link(&url),
            ToolbarCommand::RemoveLink => self.remove_link(),
            ToolbarCommand::InsertImage(url) => self.insert_image(&url),
            ToolbarCommand::InsertEmbed(source) => self.insert_embed(&source),
            ToolbarCommand::Undo => self.undo().map(|_| ()),
            ToolbarCommand::Redo => self.redo().map(|_| ()),
        }
    }

    /// Link button: removes an active link, otherwise opens the link dialog.
    pub fn link_button(&mut self) -> EditorResult<Option<InsertionDialog>> {
        if self.is_link_active() {
            self.remove_link()?;
            return Ok(None);
        }
        Ok(Some(self.open_dialog(DialogKind::Link)))
    }
}

#[cfg(test)]
mod tests {
    use super::{ToolbarCommand, ToolbarParseError};
    use crate::model::kind::{BlockFormat, FormatParseError, MarkFormat};

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            ToolbarCommand::parse("toggle_mark", Some("bold")),
            Ok(ToolbarCommand::ToggleMark(MarkFormat::Bold))
        );
        assert_eq!(
            ToolbarCommand::parse("toggle_block", Some("numbered-list")),
            Ok(ToolbarCommand::ToggleBlock(BlockFormat::NumberedList))
        );
        assert_eq!(
            ToolbarCommand::parse(" undo ", None),
            Ok(ToolbarCommand::Undo)
        );
    }

    #[test]
    fn rejects_unknown_or_incomplete_commands() {
        assert_eq!(
            ToolbarCommand::parse("explode", None),
            Err(ToolbarParseError::UnknownCommand("explode".to_string()))
        );
        assert_eq!(
            ToolbarCommand::parse("insert_image", None),
            Err(ToolbarParseError::MissingArgument("insert_image"))
        );
        assert!(matches!(
            ToolbarCommand::parse("toggle_mark", Some("strike")),
            Err(ToolbarParseError::InvalidFormat(
                FormatParseError::UnsupportedMarkFormat(_)
            ))
        ));
    }
}
