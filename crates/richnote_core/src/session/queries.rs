//! Read-only questions asked about a document and a selection.
//!
//! # Responsibility
//! - Answer "is this block/mark/link active" for the toolbar.
//! - Compute the node spans that mutations operate on.
//!
//! # Invariants
//! - Block queries use the unhung range: an expanded range whose end sits
//!   at offset 0 of a text run does not count the node it barely touches.
//! - Queries never mutate.

use crate::model::document::Document;
use crate::model::kind::{BlockFormat, MarkFormat};
use crate::model::node::{Element, Marks, Node};
use crate::model::path::Path;
use crate::model::range::{Point, Range};

/// Pulls an expanded range's end back out of a block it only touches at
/// offset 0.
///
/// The result is forward (anchor is the start). Collapsed ranges and
/// ranges whose end is not at offset 0 are returned as-is.
pub fn unhang_range(document: &Document, range: &Range) -> Range {
    let (start, end) = range.edges();
    if range.is_collapsed() || end.offset != 0 {
        return Range::new(start, end);
    }
    let end_block = document
        .block_above(&end.path)
        .unwrap_or_else(|| end.path.clone());

    let candidate = document
        .texts()
        .into_iter()
        .rev()
        .filter(|(path, _)| path.is_before(&end.path))
        .find(|(path, run)| !run.is_empty() || path.is_before(&end_block))
        .map(|(path, run)| Point::new(path, run.len()));

    match candidate {
        Some(candidate) if !candidate.is_before(&start) => Range::new(start, candidate),
        _ => Range::new(start, end),
    }
}

/// Non-void blocks with inline content, plus voids, touched by `range`.
pub(crate) fn lowest_blocks(document: &Document, range: &Range) -> Vec<Path> {
    let (start, end) = range.edges();
    document
        .nodes_between(&start.path, &end.path)
        .into_iter()
        .filter_map(|(path, node)| match node {
            Node::Element(element) if element.kind.is_block() && element.has_inline_content() => {
                Some(path)
            }
            _ => None,
        })
        .collect()
}

/// Lowest elements accepted by `matcher` touched by `range`.
///
/// A match that contains another match is dropped.
pub(crate) fn lowest_matches(
    document: &Document,
    range: &Range,
    matcher: &dyn Fn(&Element) -> bool,
) -> Vec<Path> {
    let (start, end) = range.edges();
    let matches: Vec<Path> = document
        .nodes_between(&start.path, &end.path)
        .into_iter()
        .filter_map(|(path, node)| match node {
            Node::Element(element) if matcher(element) => Some(path),
            _ => None,
        })
        .collect();
    matches
        .iter()
        .filter(|path| !matches.iter().any(|other| path.is_ancestor_of(other)))
        .cloned()
        .collect()
}

/// Child index span of `parent` whose subtrees lie on the path span of
/// `range`.
pub(crate) fn block_child_span(
    document: &Document,
    parent: &Path,
    range: &Range,
) -> Option<(usize, usize)> {
    let (start, end) = range.edges();
    let count = document.children_at(parent)?.len();
    let covered: Vec<usize> = (0..count)
        .filter(|index| {
            let child = parent.child(*index);
            !child.is_before(&start.path) && !child.is_after(&end.path)
        })
        .collect();
    Some((*covered.first()?, *covered.last()?))
}

/// Child index span of `block` covered by `range`, where a child that the
/// range only touches at one of its edges is left out.
pub(crate) fn inline_child_span(
    document: &Document,
    block: &Path,
    range: &Range,
) -> Option<(usize, usize)> {
    let (start, end) = range.edges();
    let count = document.children_at(block)?.len();
    let covered: Vec<usize> = (0..count)
        .filter(|index| {
            let child = block.child(*index);
            if child.is_before(&start.path) || child.is_after(&end.path) {
                return false;
            }
            if range.is_collapsed() {
                return true;
            }
            let holds_start = child.is_ancestor_or_self(&start.path);
            let holds_end = child.is_ancestor_or_self(&end.path);
            if holds_start && !holds_end && document.end_point(&child).as_ref() == Some(&start) {
                return false;
            }
            if holds_end && !holds_start && document.start_point(&child).as_ref() == Some(&end) {
                return false;
            }
            true
        })
        .collect();
    Some((*covered.first()?, *covered.last()?))
}

/// Editable text runs an expanded `range` actually covers.
///
/// Void placeholder runs and runs touched only at an edge are excluded.
pub(crate) fn covered_texts(document: &Document, range: &Range) -> Vec<Path> {
    if range.is_collapsed() {
        return Vec::new();
    }
    let (start, end) = range.edges();
    document
        .texts()
        .into_iter()
        .filter(|(path, run)| {
            if path.is_before(&start.path) || path.is_after(&end.path) {
                return false;
            }
            if document.void_above(path).is_some() {
                return false;
            }
            let at_start = *path == start.path;
            let at_end = *path == end.path;
            if at_start && at_end {
                return start.offset < end.offset;
            }
            if at_start && start.offset >= run.len() && !run.is_empty() {
                return false;
            }
            !(at_end && end.offset == 0)
        })
        .map(|(path, _)| path)
        .collect()
}

/// Marks that typing at a collapsed selection would produce.
pub fn current_marks(
    document: &Document,
    selection: Option<&Range>,
    pending: Option<Marks>,
) -> Option<Marks> {
    let selection = selection?;
    if let Some(pending) = pending {
        return Some(pending);
    }
    document
        .text(&selection.anchor.path)
        .map(|run| run.marks)
}

pub fn is_block_active(
    document: &Document,
    selection: Option<&Range>,
    format: BlockFormat,
) -> bool {
    let Some(selection) = selection else {
        return false;
    };
    let range = unhang_range(document, selection);
    let (start, end) = range.edges();
    document
        .nodes_between(&start.path, &end.path)
        .into_iter()
        .any(|(_, node)| {
            node.as_element()
                .is_some_and(|element| element.kind.node_type() == format.node_type())
        })
}

/// Collapsed: the pending marks, else the marks at the cursor.
/// Expanded: true only when every covered editable text carries the mark.
pub fn is_mark_active(
    document: &Document,
    selection: Option<&Range>,
    pending: Option<Marks>,
    format: MarkFormat,
) -> bool {
    let Some(range) = selection else {
        return false;
    };
    if range.is_collapsed() {
        return current_marks(document, Some(range), pending).is_some_and(|marks| marks.has(format));
    }
    let covered = covered_texts(document, range);
    !covered.is_empty()
        && covered.iter().all(|path| {
            document
                .text(path)
                .is_some_and(|run| run.marks.has(format))
        })
}

/// True when any link element lies on the selection's path span.
pub fn is_link_active(document: &Document, selection: Option<&Range>) -> bool {
    let Some(range) = selection else {
        return false;
    };
    let (start, end) = range.edges();
    document
        .nodes_between(&start.path, &end.path)
        .into_iter()
        .any(|(_, node)| node.as_element().is_some_and(is_link))
}

pub(crate) fn is_link(element: &Element) -> bool {
    matches!(element.kind, crate::model::kind::ElementKind::Link { .. })
}

pub(crate) fn is_list(element: &Element) -> bool {
    element.kind.is_list()
}

#[cfg(test)]
mod tests {
    use super::{covered_texts, is_block_active, unhang_range};
    use crate::model::document::Document;
    use crate::model::kind::{BlockFormat, ElementKind};
    use crate::model::node::Element;
    use crate::model::path::Path;
    use crate::model::range::{Point, Range};

    fn fixture() -> Document {
        Document::new(vec![
            Element::with_text(ElementKind::HeadingOne, "title").into(),
            Element::paragraph("body").into(),
        ])
        .expect("fixture should be valid")
    }

    #[test]
    fn unhang_pulls_end_out_of_touched_block() {
        let document = fixture();
        let range = Range::new(Point::new([0, 0], 0), Point::new([1, 0], 0));
        let unhung = unhang_range(&document, &range);
        assert_eq!(unhung.end(), Point::new([0, 0], 5));
        assert!(!is_block_active(
            &document,
            Some(&range),
            BlockFormat::HeadingTwo
        ));
        assert!(is_block_active(
            &document,
            Some(&range),
            BlockFormat::HeadingOne
        ));
    }

    #[test]
    fn unhang_keeps_ranges_ending_mid_text() {
        let document = fixture();
        let range = Range::new(Point::new([1, 0], 2), Point::new([0, 0], 1));
        let unhung = unhang_range(&document, &range);
        assert_eq!(unhung.anchor, Point::new([0, 0], 1));
        assert_eq!(unhung.focus, Point::new([1, 0], 2));
    }

    #[test]
    fn covered_texts_skip_edge_touches() {
        let document = fixture();
        let range = Range::new(Point::new([0, 0], 5), Point::new([1, 0], 2));
        assert_eq!(covered_texts(&document, &range), vec![Path::from([1, 0])]);
    }
}
