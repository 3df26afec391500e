//! Document nodes: text runs and elements.
//!
//! # Responsibility
//! - Define the tagged union every document tree is built from.
//! - Keep formatting marks on text runs only.
//!
//! # Invariants
//! - Text runs are leaves; elements exclusively own their ordered children.
//! - Text offsets are counted in `char`s, never bytes.

use crate::model::kind::{ElementKind, MarkFormat};
use serde::{Deserialize, Serialize};

/// Boolean formatting flags of one text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Marks {
    pub fn has(&self, format: MarkFormat) -> bool {
        match format {
            MarkFormat::Bold => self.bold,
            MarkFormat::Italic => self.italic,
            MarkFormat::Underline => self.underline,
        }
    }

    /// Returns a copy with `format` set to `value`.
    pub fn with(mut self, format: MarkFormat, value: bool) -> Self {
        match format {
            MarkFormat::Bold => self.bold = value,
            MarkFormat::Italic => self.italic = value,
            MarkFormat::Underline => self.underline = value,
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.bold && !self.italic && !self.underline
    }
}

/// Leaf node holding text and its marks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    /// Empty run used as the placeholder child of void and empty elements.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    /// Text length in chars; all offsets address this unit.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the text between two char offsets.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let from = byte_index(&self.text, start);
        let to = byte_index(&self.text, end);
        &self.text[from..to]
    }
}

/// Byte position of a char offset, clamped to the text end.
pub(crate) fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// Non-leaf node: a kind plus its ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub kind: ElementKind,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(kind: ElementKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    /// Element holding one plain text run.
    pub fn with_text(kind: ElementKind, text: impl Into<String>) -> Self {
        Self::new(kind, vec![Node::Text(TextRun::new(text))])
    }

    /// Void element with its single empty placeholder run.
    pub fn void(kind: ElementKind) -> Self {
        Self::new(kind, vec![Node::Text(TextRun::empty())])
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::with_text(ElementKind::Paragraph, text)
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::void(ElementKind::Image { url: url.into() })
    }

    pub fn embed(id: impl Into<String>) -> Self {
        Self::void(ElementKind::Embed { id: id.into() })
    }

    pub fn link(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_text(ElementKind::Link { url: url.into() }, text)
    }

    /// True when all children are text runs or inline elements.
    pub fn has_inline_content(&self) -> bool {
        self.children.iter().all(Node::is_inline_content)
    }

    /// Concatenated text of every descendant run.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

/// One node of the document tree.
///
/// Untagged on the wire: a text run is recognized by its `text` field, an
/// element by its `type` and `children` fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(TextRun),
    Element(Element),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextRun::new(text))
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            Self::Text(run) => Some(run),
            Self::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Text runs and inline elements both flow inside a block.
    pub fn is_inline_content(&self) -> bool {
        match self {
            Self::Text(_) => true,
            Self::Element(element) => element.kind.is_inline(),
        }
    }

    pub fn is_block(&self) -> bool {
        !self.is_inline_content()
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Self::Text(_) => &[],
            Self::Element(element) => &element.children,
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(run) => out.push_str(&run.text),
            Self::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<TextRun> for Node {
    fn from(value: TextRun) -> Self {
        Self::Text(value)
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{byte_index, Element, Marks, Node, TextRun};
    use crate::model::kind::MarkFormat;

    #[test]
    fn marks_toggle_individual_flags() {
        let marks = Marks::default().with(MarkFormat::Italic, true);
        assert!(marks.has(MarkFormat::Italic));
        assert!(!marks.has(MarkFormat::Bold));
        assert!(marks.with(MarkFormat::Italic, false).is_empty());
    }

    #[test]
    fn text_offsets_count_chars() {
        let run = TextRun::new("héllo wörld");
        assert_eq!(run.len(), 11);
        assert_eq!(run.slice(1, 5), "éllo");
        assert_eq!(byte_index("ab", 10), 2);
    }

    #[test]
    fn void_elements_hold_one_empty_run() {
        let image = Element::image("https://img.example/a.png");
        assert_eq!(image.children, vec![Node::Text(TextRun::empty())]);
        assert!(image.kind.is_void());
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let paragraph = Element::new(
            crate::model::kind::ElementKind::Paragraph,
            vec![
                Node::text("see "),
                Element::link("https://x.com", "here").into(),
                Node::text("."),
            ],
        );
        assert_eq!(paragraph.text_content(), "see here.");
        assert!(paragraph.has_inline_content());
    }
}
