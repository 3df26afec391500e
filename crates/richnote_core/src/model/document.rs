//! Document tree root, traversal and invariant validation.
//!
//! # Responsibility
//! - Own the top-level block sequence of one editing session.
//! - Resolve paths to nodes and enumerate nodes in document order.
//! - Validate structural invariants on construction and deserialization.
//!
//! # Invariants
//! - The root holds at least one node and only block nodes.
//! - Every element has at least one child.
//! - Lists contain only `list-item` elements.
//! - Void elements contain exactly one empty text run.
//! - Inline elements contain only text runs.
//! - A block holds either only blocks or only inline content.

use crate::model::kind::ElementKind;
use crate::model::node::{Element, Node, TextRun};
use crate::model::path::Path;
use crate::model::range::Point;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Structural invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentValidationError {
    /// The root has no nodes.
    EmptyDocument,
    /// A text run or inline element sits directly under the root.
    InlineAtRoot(Path),
    /// An element has no children.
    EmptyElement(Path),
    /// A list holds something other than a list item.
    ListChildNotItem(Path),
    /// A void element does not hold exactly one empty text run.
    InvalidVoidChildren(Path),
    /// An inline element holds something other than text runs.
    InlineChildNotText(Path),
    /// A block mixes block children with inline content.
    MixedChildren(Path),
}

impl Display for DocumentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDocument => write!(f, "document must contain at least one block"),
            Self::InlineAtRoot(path) => {
                write!(f, "inline content is not allowed at document root: {path}")
            }
            Self::EmptyElement(path) => write!(f, "element must have children: {path}"),
            Self::ListChildNotItem(path) => {
                write!(f, "list may only contain list-item children: {path}")
            }
            Self::InvalidVoidChildren(path) => write!(
                f,
                "void element must contain exactly one empty text run: {path}"
            ),
            Self::InlineChildNotText(path) => {
                write!(f, "inline element may only contain text runs: {path}")
            }
            Self::MixedChildren(path) => {
                write!(f, "block mixes block and inline children: {path}")
            }
        }
    }
}

impl Error for DocumentValidationError {}

/// Ordered tree of blocks edited by one session.
///
/// Serialized as the bare array of top-level nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Node>", into = "Vec<Node>")]
pub struct Document {
    children: Vec<Node>,
}

impl Default for Document {
    /// One paragraph holding one empty text run.
    fn default() -> Self {
        Self {
            children: vec![Element::paragraph("").into()],
        }
    }
}

impl TryFrom<Vec<Node>> for Document {
    type Error = DocumentValidationError;

    fn try_from(value: Vec<Node>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Document> for Vec<Node> {
    fn from(value: Document) -> Self {
        value.children
    }
}

impl Document {
    /// Builds a document and validates every invariant.
    pub fn new(children: Vec<Node>) -> Result<Self, DocumentValidationError> {
        let document = Self { children };
        document.validate()?;
        Ok(document)
    }

    /// Parses the host's JSON value shape.
    pub fn from_json_str(value: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(value)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Node at `path`. The root path resolves to no node.
    pub fn node(&self, path: &Path) -> Option<&Node> {
        let (first, rest) = path.as_slice().split_first()?;
        let mut node = self.children.get(*first)?;
        for index in rest {
            node = node.children().get(*index)?;
        }
        Some(node)
    }

    pub(crate) fn node_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let (first, rest) = path.as_slice().split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for index in rest {
            node = match node {
                Node::Element(element) => element.children.get_mut(*index)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    /// Children of the root or of the element at `path`.
    pub fn children_at(&self, path: &Path) -> Option<&[Node]> {
        if path.is_root() {
            return Some(&self.children);
        }
        self.element(path).map(|element| element.children.as_slice())
    }

    pub(crate) fn children_at_mut(&mut self, path: &Path) -> Option<&mut Vec<Node>> {
        if path.is_root() {
            return Some(&mut self.children);
        }
        match self.node_mut(path)? {
            Node::Element(element) => Some(&mut element.children),
            Node::Text(_) => None,
        }
    }

    pub fn element(&self, path: &Path) -> Option<&Element> {
        self.node(path).and_then(Node::as_element)
    }

    pub fn text(&self, path: &Path) -> Option<&TextRun> {
        self.node(path).and_then(Node::as_text)
    }

    /// True when `point` addresses an existing text run and a valid offset.
    pub fn has_point(&self, point: &Point) -> bool {
        self.text(&point.path)
            .is_some_and(|run| point.offset <= run.len())
    }

    /// Every text run with its path, in document order.
    pub fn texts(&self) -> Vec<(Path, &TextRun)> {
        let mut out = Vec::new();
        collect_texts(&self.children, &Path::root(), &mut out);
        out
    }

    /// Every node with its path, in document order (parents first).
    pub fn descendants(&self) -> Vec<(Path, &Node)> {
        let mut out = Vec::new();
        collect_nodes(&self.children, &Path::root(), &mut out);
        out
    }

    /// Nodes touched by the span from `start` to `end`, ancestors included.
    pub fn nodes_between(&self, start: &Path, end: &Path) -> Vec<(Path, &Node)> {
        self.descendants()
            .into_iter()
            .filter(|(path, _)| !path.is_before(start) && !path.is_after(end))
            .collect()
    }

    /// First point inside the node at `path` (or the whole document).
    pub fn start_point(&self, path: &Path) -> Option<Point> {
        self.texts()
            .into_iter()
            .find(|(text_path, _)| path.is_ancestor_or_self(text_path))
            .map(|(text_path, _)| Point::new(text_path, 0))
    }

    /// Last point inside the node at `path` (or the whole document).
    pub fn end_point(&self, path: &Path) -> Option<Point> {
        self.texts()
            .into_iter()
            .rev()
            .find(|(text_path, _)| path.is_ancestor_or_self(text_path))
            .map(|(text_path, run)| Point::new(text_path, run.len()))
    }

    /// Last text run located entirely before `path`.
    pub fn previous_text(&self, path: &Path) -> Option<(Path, &TextRun)> {
        self.texts()
            .into_iter()
            .rev()
            .find(|(text_path, _)| text_path.is_before(path))
    }

    /// First text run located entirely after `path`.
    pub fn next_text(&self, path: &Path) -> Option<(Path, &TextRun)> {
        self.texts()
            .into_iter()
            .find(|(text_path, _)| text_path.is_after(path))
    }

    /// Nearest strict ancestor that is a block element.
    pub fn block_above(&self, path: &Path) -> Option<Path> {
        self.ancestor_matching(path, |element| element.kind.is_block())
    }

    /// Nearest strict ancestor that is a void element.
    pub fn void_above(&self, path: &Path) -> Option<Path> {
        self.ancestor_matching(path, |element| element.kind.is_void())
    }

    /// Nearest strict ancestor element accepted by `matcher`.
    pub fn ancestor_matching(
        &self,
        path: &Path,
        matcher: impl Fn(&Element) -> bool,
    ) -> Option<Path> {
        path.ancestors()
            .into_iter()
            .rev()
            .find(|ancestor| self.element(ancestor).is_some_and(&matcher))
    }

    /// Checks every structural invariant.
    pub fn validate(&self) -> Result<(), DocumentValidationError> {
        if self.children.is_empty() {
            return Err(DocumentValidationError::EmptyDocument);
        }
        for (index, child) in self.children.iter().enumerate() {
            let path = Path::from([index]);
            if child.is_inline_content() {
                return Err(DocumentValidationError::InlineAtRoot(path));
            }
            validate_node(child, &path)?;
        }
        Ok(())
    }
}

fn validate_node(node: &Node, path: &Path) -> Result<(), DocumentValidationError> {
    let Node::Element(element) = node else {
        return Ok(());
    };
    if element.children.is_empty() {
        return Err(DocumentValidationError::EmptyElement(path.clone()));
    }

    let kind = &element.kind;
    if kind.is_void() {
        let valid = matches!(element.children.as_slice(), [Node::Text(run)] if run.is_empty());
        if !valid {
            return Err(DocumentValidationError::InvalidVoidChildren(path.clone()));
        }
        return Ok(());
    }

    for (index, child) in element.children.iter().enumerate() {
        let child_path = path.child(index);
        if kind.is_list() && !is_list_item(child) {
            return Err(DocumentValidationError::ListChildNotItem(child_path));
        }
        if kind.is_inline() && !child.is_text() {
            return Err(DocumentValidationError::InlineChildNotText(child_path));
        }
        validate_node(child, &child_path)?;
    }

    let inline_children = element
        .children
        .iter()
        .filter(|child| child.is_inline_content())
        .count();
    if inline_children != 0 && inline_children != element.children.len() {
        return Err(DocumentValidationError::MixedChildren(path.clone()));
    }
    Ok(())
}

fn is_list_item(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|element| element.kind == ElementKind::ListItem)
}

fn collect_texts<'a>(nodes: &'a [Node], parent: &Path, out: &mut Vec<(Path, &'a TextRun)>) {
    for (index, node) in nodes.iter().enumerate() {
        let path = parent.child(index);
        match node {
            Node::Text(run) => out.push((path, run)),
            Node::Element(element) => collect_texts(&element.children, &path, out),
        }
    }
}

fn collect_nodes<'a>(nodes: &'a [Node], parent: &Path, out: &mut Vec<(Path, &'a Node)>) {
    for (index, node) in nodes.iter().enumerate() {
        let path = parent.child(index);
        out.push((path.clone(), node));
        collect_nodes(node.children(), &path, out);
    }
}
