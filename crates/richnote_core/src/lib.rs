//! Core rich-text document model and command engine for RichNote.
//! This crate is the single source of truth for document invariants.

pub mod config;
pub mod history;
pub mod logging;
pub mod model;
pub mod ops;
pub mod render;
pub mod session;
pub mod toolbar;

pub use config::EditorConfig;
pub use history::{Batch, History};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::document::{Document, DocumentValidationError};
pub use model::kind::{
    parse_block_format, parse_mark_format, BlockFormat, ElementKind, FormatParseError,
    MarkFormat, NodeType,
};
pub use model::node::{Element, Marks, Node, TextRun};
pub use model::path::Path;
pub use model::range::{Edge, Point, Range};
pub use ops::{Operation, OperationError};
pub use render::{render_document, render_html, render_node, Markup};
pub use session::dialog::{DialogKind, InsertionDialog};
pub use session::error::{EditorError, EditorResult};
pub use session::{ChangeObserver, EditorSession, SessionId};
pub use toolbar::{ToolbarCommand, ToolbarParseError, ToolbarState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
