//! Element kinds and the per-type capability table.
//!
//! # Responsibility
//! - Define the closed set of element kinds a document may contain.
//! - Answer `is_void` / `is_inline` / `is_list` from one lookup keyed by type tag.
//! - Parse stable string ids used by the toolbar surface.
//!
//! # Invariants
//! - Capabilities are fixed per type tag; they never depend on element data.
//! - String ids are kebab-case and match the serialized `type` field.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Type tag of an element, without attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    BlockQuote,
    BulletedList,
    NumberedList,
    ListItem,
    Image,
    Embed,
    Link,
}

/// Structural capabilities of one element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCapabilities {
    /// Carries no editable text; holds exactly one empty placeholder run.
    pub is_void: bool,
    /// Renders within text flow instead of occupying its own line.
    pub is_inline: bool,
    /// May only contain `list-item` children.
    pub is_list: bool,
}

const BLOCK: NodeCapabilities = NodeCapabilities {
    is_void: false,
    is_inline: false,
    is_list: false,
};
const LIST: NodeCapabilities = NodeCapabilities {
    is_void: false,
    is_inline: false,
    is_list: true,
};
const VOID_BLOCK: NodeCapabilities = NodeCapabilities {
    is_void: true,
    is_inline: false,
    is_list: false,
};
const INLINE: NodeCapabilities = NodeCapabilities {
    is_void: false,
    is_inline: true,
    is_list: false,
};

impl NodeType {
    /// Looks up the capability row for this type tag.
    pub fn capabilities(self) -> NodeCapabilities {
        match self {
            Self::Paragraph
            | Self::HeadingOne
            | Self::HeadingTwo
            | Self::BlockQuote
            | Self::ListItem => BLOCK,
            Self::BulletedList | Self::NumberedList => LIST,
            Self::Image | Self::Embed => VOID_BLOCK,
            Self::Link => INLINE,
        }
    }

    pub fn is_void(self) -> bool {
        self.capabilities().is_void
    }

    pub fn is_inline(self) -> bool {
        self.capabilities().is_inline
    }

    pub fn is_list(self) -> bool {
        self.capabilities().is_list
    }

    /// Stable string id, identical to the serialized `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::HeadingOne => "heading-one",
            Self::HeadingTwo => "heading-two",
            Self::BlockQuote => "block-quote",
            Self::BulletedList => "bulleted-list",
            Self::NumberedList => "numbered-list",
            Self::ListItem => "list-item",
            Self::Image => "image",
            Self::Embed => "embed",
            Self::Link => "link",
        }
    }
}

impl Display for NodeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element kind with its attributes.
///
/// Serialized as an internally tagged `type` field so an element reads like
/// `{"type": "link", "url": "...", "children": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    BlockQuote,
    BulletedList,
    NumberedList,
    ListItem,
    Image { url: String },
    Embed { id: String },
    Link { url: String },
}

impl ElementKind {
    /// Returns the attribute-free type tag.
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Paragraph => NodeType::Paragraph,
            Self::HeadingOne => NodeType::HeadingOne,
            Self::HeadingTwo => NodeType::HeadingTwo,
            Self::BlockQuote => NodeType::BlockQuote,
            Self::BulletedList => NodeType::BulletedList,
            Self::NumberedList => NodeType::NumberedList,
            Self::ListItem => NodeType::ListItem,
            Self::Image { .. } => NodeType::Image,
            Self::Embed { .. } => NodeType::Embed,
            Self::Link { .. } => NodeType::Link,
        }
    }

    pub fn is_void(&self) -> bool {
        self.node_type().is_void()
    }

    pub fn is_inline(&self) -> bool {
        self.node_type().is_inline()
    }

    pub fn is_list(&self) -> bool {
        self.node_type().is_list()
    }

    pub fn is_block(&self) -> bool {
        !self.is_inline()
    }
}

/// Block formats exposed by the toolbar `toggle_block` buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFormat {
    HeadingOne,
    HeadingTwo,
    BlockQuote,
    BulletedList,
    NumberedList,
}

impl BlockFormat {
    /// Element kind this format retags (or wraps) blocks with.
    pub fn kind(self) -> ElementKind {
        match self {
            Self::HeadingOne => ElementKind::HeadingOne,
            Self::HeadingTwo => ElementKind::HeadingTwo,
            Self::BlockQuote => ElementKind::BlockQuote,
            Self::BulletedList => ElementKind::BulletedList,
            Self::NumberedList => ElementKind::NumberedList,
        }
    }

    pub fn node_type(self) -> NodeType {
        self.kind().node_type()
    }

    pub fn is_list(self) -> bool {
        self.node_type().is_list()
    }

    pub fn as_str(self) -> &'static str {
        self.node_type().as_str()
    }

    /// Every toolbar block format, in toolbar order.
    pub fn all() -> &'static [BlockFormat] {
        &[
            Self::HeadingOne,
            Self::HeadingTwo,
            Self::BlockQuote,
            Self::NumberedList,
            Self::BulletedList,
        ]
    }
}

/// Boolean text formatting flags carried by text runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkFormat {
    Bold,
    Italic,
    Underline,
}

impl MarkFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
        }
    }

    /// Every mark, in render nesting order (outermost first).
    pub fn all() -> &'static [MarkFormat] {
        &[Self::Bold, Self::Italic, Self::Underline]
    }
}

/// Format id parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatParseError {
    Empty,
    UnsupportedBlockFormat(String),
    UnsupportedMarkFormat(String),
}

impl Display for FormatParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "format value must not be empty"),
            Self::UnsupportedBlockFormat(value) => {
                write!(f, "block format is unsupported: {value}")
            }
            Self::UnsupportedMarkFormat(value) => {
                write!(f, "mark format is unsupported: {value}")
            }
        }
    }
}

impl Error for FormatParseError {}

/// Parses one toolbar block format from its string id.
pub fn parse_block_format(value: &str) -> Result<BlockFormat, FormatParseError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(FormatParseError::Empty);
    }
    BlockFormat::all()
        .iter()
        .copied()
        .find(|format| format.as_str() == normalized)
        .ok_or_else(|| FormatParseError::UnsupportedBlockFormat(normalized.to_string()))
}

/// Parses one mark format from its string id.
pub fn parse_mark_format(value: &str) -> Result<MarkFormat, FormatParseError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(FormatParseError::Empty);
    }
    MarkFormat::all()
        .iter()
        .copied()
        .find(|format| format.as_str() == normalized)
        .ok_or_else(|| FormatParseError::UnsupportedMarkFormat(normalized.to_string()))
}
