//! Projection of the document tree onto presentational markup.
//!
//! Rendering is pure: it reads a document and never mutates it. Element
//! types map to tags (`paragraph` → `p`, `bulleted-list` → `ul.list-disc`,
//! ...); text runs render as a `span` whose marks nest `strong`, `em` and
//! `u` from the outside in.

use crate::model::document::Document;
use crate::model::kind::ElementKind;
use crate::model::node::{Element, Node, TextRun};

const SELF_CLOSING_TAG: &str = "img";

/// Presentational element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Element {
        tag: &'static str,
        attributes: Vec<(&'static str, String)>,
        children: Vec<Markup>,
    },
    Text(String),
}

impl Markup {
    pub fn element(tag: &'static str, children: Vec<Markup>) -> Self {
        Self::Element {
            tag,
            attributes: Vec::new(),
            children,
        }
    }

    /// Adds one attribute to an element; text is returned unchanged.
    pub fn with_attribute(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let Self::Element { attributes, .. } = &mut self {
            attributes.push((name, value.into()));
        }
        self
    }

    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Self::Element { tag, .. } => Some(*tag),
            Self::Text(_) => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str()),
            Self::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[Markup] {
        match self {
            Self::Element { children, .. } => children,
            Self::Text(_) => &[],
        }
    }

    /// Serializes to HTML with text and attribute values escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => escape_into(text, out),
            Self::Element {
                tag,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, out);
                    out.push('"');
                }
                out.push('>');
                if *tag == SELF_CLOSING_TAG {
                    return;
                }
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
}

/// Renders every top-level block.
pub fn render_document(document: &Document) -> Vec<Markup> {
    document.children().iter().map(render_node).collect()
}

/// Renders the whole document as one HTML string.
pub fn render_html(document: &Document) -> String {
    render_document(document)
        .iter()
        .map(Markup::to_html)
        .collect()
}

pub fn render_node(node: &Node) -> Markup {
    match node {
        Node::Text(run) => render_leaf(run),
        Node::Element(element) => render_element(element),
    }
}

fn render_children(element: &Element) -> Vec<Markup> {
    element.children.iter().map(render_node).collect()
}

fn render_element(element: &Element) -> Markup {
    let children = render_children(element);
    match &element.kind {
        ElementKind::Paragraph => Markup::element("p", children),
        ElementKind::BlockQuote => Markup::element("blockquote", children),
        ElementKind::BulletedList => {
            Markup::element("ul", children).with_attribute("class", "list-disc")
        }
        ElementKind::HeadingOne => Markup::element("h1", children),
        ElementKind::HeadingTwo => Markup::element("h2", children),
        ElementKind::ListItem => Markup::element("li", children),
        ElementKind::NumberedList => {
            Markup::element("ol", children).with_attribute("class", "list-decimal")
        }
        ElementKind::Link { url } => Markup::element("a", children).with_attribute("href", url),
        ElementKind::Image { url } => {
            let mut content = children;
            content.push(
                Markup::element("img", Vec::new())
                    .with_attribute("contenteditable", "false")
                    .with_attribute("class", "img-fluid w-100")
                    .with_attribute("src", url),
            );
            Markup::element("div", content).with_attribute("class", "w-100")
        }
        ElementKind::Embed { id } => Markup::element("div", children)
            .with_attribute("class", "embed")
            .with_attribute("contenteditable", "false")
            .with_attribute("data-embed-id", id),
    }
}

/// Wraps the run's text in `u`, `em`, `strong` (innermost first) and a
/// final `span`.
pub fn render_leaf(run: &TextRun) -> Markup {
    let mut content = Markup::Text(run.text.clone());
    if run.marks.underline {
        content = Markup::element("u", vec![content]);
    }
    if run.marks.italic {
        content = Markup::element("em", vec![content]);
    }
    if run.marks.bold {
        content = Markup::element("strong", vec![content]);
    }
    Markup::element("span", vec![content])
}
