//! Structural mutations composed from primitive operations.
//!
//! # Responsibility
//! - Express node-type changes, wrapping, unwrapping, insertion and
//!   deletion as sequences of [`Operation`]s applied to a [`Transaction`].
//!
//! # Invariants
//! - Every helper reads the working copy fresh after each applied op;
//!   stored paths are only reused through refs or when an op provably
//!   leaves them untouched.
//! - Helpers may leave adjacent runs unmerged; normalization runs later.
//!
//! # See also
//! - `session::normalize` for the cleanup pass.

use crate::model::kind::{ElementKind, MarkFormat};
use crate::model::node::{Element, Marks, Node, TextRun};
use crate::model::path::Path;
use crate::model::range::{Point, Range};
use crate::ops::{NodeProperties, Operation};
use crate::session::error::{EditorError, EditorResult};
use crate::session::queries::{
    block_child_span, covered_texts, inline_child_span, lowest_blocks, lowest_matches,
    unhang_range,
};
use crate::session::transaction::Transaction;

fn missing(path: &Path) -> EditorError {
    EditorError::InvalidTarget(path.clone())
}

fn kind_at(tx: &Transaction, path: &Path) -> EditorResult<ElementKind> {
    tx.document()
        .element(path)
        .map(|element| element.kind.clone())
        .ok_or_else(|| missing(path))
}

fn child_count(tx: &Transaction, path: &Path) -> usize {
    tx.document().children_at(path).map_or(0, <[Node]>::len)
}

/// Changes the kind of the element at `path`.
///
/// Void elements are left untouched. Text runs and inline/block, void or
/// list/non-list changes are rejected.
pub(crate) fn set_node_type(
    tx: &mut Transaction,
    path: &Path,
    kind: ElementKind,
) -> EditorResult<()> {
    let current = kind_at(tx, path)?;
    if current == kind || current.is_void() {
        return Ok(());
    }
    if current.is_inline() != kind.is_inline()
        || kind.is_void()
        || current.is_list() != kind.is_list()
    {
        return Err(missing(path));
    }
    tx.apply(Operation::SetNode {
        path: path.clone(),
        properties: NodeProperties::Element(current),
        new_properties: NodeProperties::Element(kind),
    })
}

/// Sets `kind` on every non-void lowest block of the selection.
pub(crate) fn set_block_types(tx: &mut Transaction, kind: &ElementKind) -> EditorResult<()> {
    let range = unhang_range(tx.document(), &tx.require_selection()?);
    for path in lowest_blocks(tx.document(), &range) {
        let current = kind_at(tx, &path)?;
        if current.is_void() || current == *kind {
            continue;
        }
        set_node_type(tx, &path, kind.clone())?;
    }
    Ok(())
}

/// Splits the run at `point` when the offset is strictly inside it.
fn split_text_at(tx: &mut Transaction, point: &Point) -> EditorResult<bool> {
    let run = tx
        .document()
        .text(&point.path)
        .ok_or_else(|| missing(&point.path))?;
    if point.offset == 0 || point.offset >= run.len() {
        return Ok(false);
    }
    let marks = run.marks;
    tx.apply(Operation::SplitNode {
        path: point.path.clone(),
        position: point.offset,
        properties: NodeProperties::Text(marks),
    })?;
    Ok(true)
}

fn split_element(tx: &mut Transaction, path: &Path, position: usize) -> EditorResult<()> {
    let kind = kind_at(tx, path)?;
    tx.apply(Operation::SplitNode {
        path: path.clone(),
        position,
        properties: NodeProperties::Element(kind),
    })
}

/// Splits the runs under both selection edges so the range covers whole runs.
fn split_selection_edges(tx: &mut Transaction) -> EditorResult<()> {
    let end = tx.require_selection()?.end();
    split_text_at(tx, &end)?;
    let start = tx.require_selection()?.start();
    split_text_at(tx, &start)?;
    Ok(())
}

/// Sets or clears `format` on every run the expanded selection covers.
pub(crate) fn set_marks(tx: &mut Transaction, format: MarkFormat, value: bool) -> EditorResult<()> {
    split_selection_edges(tx)?;
    let range = tx.require_selection()?;
    for path in covered_texts(tx.document(), &range) {
        let marks = tx
            .document()
            .text(&path)
            .map(|run| run.marks)
            .ok_or_else(|| missing(&path))?;
        let next = marks.with(format, value);
        if next != marks {
            tx.apply(Operation::SetNode {
                path,
                properties: NodeProperties::Text(marks),
                new_properties: NodeProperties::Text(next),
            })?;
        }
    }
    Ok(())
}

/// Wraps the selected content in new `kind` elements and returns their
/// paths in document order.
///
/// Inline wrappers are created once per block; block wrappers enclose the
/// span from the first to the last selected block. List wrappers skip voids
/// and enclose each run of blocks between them separately. With `split`,
/// partially covered runs or containers are split first so that only the
/// selection is wrapped.
pub(crate) fn wrap_nodes(
    tx: &mut Transaction,
    kind: ElementKind,
    split: bool,
) -> EditorResult<Vec<Path>> {
    if kind.is_void() {
        return Err(missing(&tx.require_selection()?.anchor.path));
    }
    if kind.is_inline() {
        wrap_inline(tx, kind, split)
    } else {
        wrap_blocks(tx, kind, split)
    }
}

fn wrap_inline(tx: &mut Transaction, kind: ElementKind, split: bool) -> EditorResult<Vec<Path>> {
    if split {
        split_selection_edges(tx)?;
    }
    let range = tx.require_selection()?;
    let blocks: Vec<Path> = lowest_blocks(tx.document(), &range)
        .into_iter()
        .filter(|path| {
            tx.document()
                .element(path)
                .is_some_and(|element| !element.kind.is_void())
        })
        .collect();

    let mut wrappers = Vec::new();
    for block in blocks.iter().rev() {
        let Some((first, last)) = inline_child_span(tx.document(), block, &range) else {
            continue;
        };
        let children = tx.document().children_at(block).ok_or_else(|| missing(block))?;
        if let Some(nested) = children[first..=last].iter().position(|child| !child.is_text()) {
            return Err(EditorError::InvalidTarget(block.child(first + nested)));
        }
        let path = block.child(first);
        tx.apply(Operation::WrapNode {
            path: path.clone(),
            len: last - first + 1,
            kind: kind.clone(),
        })?;
        wrappers.push(path);
    }
    wrappers.reverse();
    Ok(wrappers)
}

/// Parent path shared by two block paths.
fn common_parent(first: &Path, last: &Path) -> Path {
    if first == last {
        first.parent()
    } else {
        first.common(last)
    }
}

fn wrap_blocks(tx: &mut Transaction, kind: ElementKind, split: bool) -> EditorResult<Vec<Path>> {
    let range = unhang_range(tx.document(), &tx.require_selection()?);
    let blocks = lowest_blocks(tx.document(), &range);
    let (Some(first), Some(last)) = (blocks.first().cloned(), blocks.last().cloned()) else {
        return Ok(Vec::new());
    };
    let first_ref = tx.path_ref(first.clone());
    let last_ref = tx.path_ref(last.clone());

    if split {
        let depth = common_parent(&first, &last).len();
        for level in (depth + 1..last.len()).rev() {
            let container = last.truncated(level);
            let position = last.get(level) + 1;
            if position < child_count(tx, &container) {
                split_element(tx, &container, position)?;
            }
        }
        for level in (depth + 1..first.len()).rev() {
            let first = tx.path(first_ref).ok_or_else(|| missing(&first))?;
            let position = first.get(level);
            if position > 0 {
                split_element(tx, &first.truncated(level), position)?;
            }
        }
    }

    let first = tx.path(first_ref).ok_or_else(|| missing(&first))?;
    let last = tx.path(last_ref).ok_or_else(|| missing(&last))?;
    let common = common_parent(&first, &last);
    let depth = common.len();
    let (start, end) = (first.get(depth), last.get(depth));
    let spans = if kind.is_list() {
        non_void_spans(tx, &common, start, end)
    } else {
        vec![(start, end)]
    };

    let mut wrappers = Vec::new();
    let mut shift = 0;
    for (from, to) in spans {
        let path = common.child(from - shift);
        let len = to - from + 1;
        tx.apply(Operation::WrapNode {
            path: path.clone(),
            len,
            kind: kind.clone(),
        })?;
        wrappers.push(path);
        shift += len - 1;
    }
    Ok(wrappers)
}

/// Maximal runs of non-void children of `parent` within `start..=end`.
fn non_void_spans(tx: &Transaction, parent: &Path, start: usize, end: usize) -> Vec<(usize, usize)> {
    let children = tx.document().children_at(parent).unwrap_or(&[]);
    let mut spans = Vec::new();
    let mut current: Option<(usize, usize)> = None;
    for index in start..=end {
        let void = children
            .get(index)
            .and_then(Node::as_element)
            .is_some_and(|element| element.kind.is_void());
        if void {
            spans.extend(current.take());
        } else {
            current = Some(current.map_or((index, index), |(from, _)| (from, index)));
        }
    }
    spans.extend(current);
    spans
}

/// Lifts the children of the lowest elements accepted by `matcher` into
/// their parents.
///
/// With `split`, only the children on the selection's span are lifted; the
/// rest stay in the (split) matched element.
pub(crate) fn unwrap_nodes(
    tx: &mut Transaction,
    matcher: &dyn Fn(&Element) -> bool,
    split: bool,
) -> EditorResult<()> {
    let range = unhang_range(tx.document(), &tx.require_selection()?);
    let matches = lowest_matches(tx.document(), &range, matcher);

    for path in matches.iter().rev() {
        let kind = kind_at(tx, path)?;
        let count = child_count(tx, path);
        if count == 0 {
            continue;
        }
        let (first, last) = if split {
            let current = unhang_range(tx.document(), &tx.require_selection()?);
            block_child_span(tx.document(), path, &current).unwrap_or((0, count - 1))
        } else {
            (0, count - 1)
        };

        let mut target = path.clone();
        if last + 1 < count {
            split_element(tx, &target, last + 1)?;
        }
        if first > 0 {
            split_element(tx, &target, first)?;
            target = target.next();
        }
        tx.apply(Operation::UnwrapNode {
            path: target,
            len: last - first + 1,
            kind,
        })?;
    }
    Ok(())
}

/// Inserts `node` at the selection and collapses the selection to its end.
///
/// Blocks land beside the block holding the cursor (beside the whole list
/// for anything but a list item), splitting it when the cursor is inside.
/// Inline content splits the run under the cursor.
pub(crate) fn insert_node(tx: &mut Transaction, node: Node) -> EditorResult<Path> {
    if tx.require_selection()?.is_expanded() {
        delete_fragment(tx)?;
    }
    let point = tx.require_selection()?.anchor;
    let path = match &node {
        Node::Element(element) if element.kind.is_block() => {
            block_insertion_path(tx, &point, &element.kind)?
        }
        Node::Element(_) => {
            let point = editable_point(tx, point)?;
            let target = tx
                .document()
                .ancestor_matching(&point.path, |element| element.kind.is_inline())
                .unwrap_or_else(|| point.path.clone());
            split_for_insertion(tx, &point, &target)?
        }
        Node::Text(_) => {
            let point = editable_point(tx, point)?;
            let target = point.path.clone();
            split_for_insertion(tx, &point, &target)?
        }
    };
    tx.apply(Operation::InsertNode {
        path: path.clone(),
        node,
    })?;
    if let Some(end) = tx.document().end_point(&path) {
        tx.collapse_to(end);
    }
    Ok(path)
}

fn block_insertion_path(
    tx: &mut Transaction,
    point: &Point,
    kind: &ElementKind,
) -> EditorResult<Path> {
    let document = tx.document();
    let mut target = document
        .block_above(&point.path)
        .ok_or_else(|| missing(&point.path))?;
    if *kind != ElementKind::ListItem {
        loop {
            let parent = target.parent();
            let climb = !parent.is_root()
                && document
                    .element(&parent)
                    .is_some_and(|element| element.kind.is_list() || element.kind == ElementKind::ListItem);
            if !climb {
                break;
            }
            target = parent;
        }
    }
    if document.end_point(&target).as_ref() == Some(point) {
        return Ok(target.next());
    }
    split_for_insertion(tx, point, &target)
}

/// Splits every level from the run at `point` up to `target` and returns
/// the path where a sibling of `target` should be inserted.
fn split_for_insertion(tx: &mut Transaction, point: &Point, target: &Path) -> EditorResult<Path> {
    if !target.is_ancestor_or_self(&point.path) {
        return Err(missing(target));
    }
    let run_len = tx
        .document()
        .text(&point.path)
        .map(TextRun::len)
        .ok_or_else(|| missing(&point.path))?;
    let index = point.path.last().ok_or_else(|| missing(&point.path))?;
    let mut position = if point.offset == 0 {
        index
    } else if point.offset >= run_len {
        index + 1
    } else {
        split_text_at(tx, point)?;
        index + 1
    };
    if point.path == *target {
        return Ok(point.path.with_last(position));
    }

    let mut level = point.path.parent();
    loop {
        let index = level.last().ok_or_else(|| missing(target))?;
        let count = child_count(tx, &level);
        position = if position == 0 {
            index
        } else if position >= count {
            index + 1
        } else {
            split_element(tx, &level, position)?;
            index + 1
        };
        if level == *target {
            return Ok(level.with_last(position));
        }
        level = level.parent();
    }
}

/// Moves `point` out of a void to the next editable run, creating an
/// empty paragraph after the void when none follows.
fn editable_point(tx: &mut Transaction, point: Point) -> EditorResult<Point> {
    let document = tx.document();
    let Some(void) = document.void_above(&point.path) else {
        return Ok(point);
    };
    let next = document
        .texts()
        .into_iter()
        .find(|(path, _)| path.is_after(&void) && document.void_above(path).is_none())
        .map(|(path, _)| Point::new(path, 0));
    if let Some(next) = next {
        return Ok(next);
    }
    let path = void.truncated(1).next();
    tx.apply(Operation::InsertNode {
        path: path.clone(),
        node: Element::paragraph("").into(),
    })?;
    Ok(Point::new(path.child(0), 0))
}

/// Inserts `text` at the cursor, replacing an expanded selection first.
///
/// When `marks` differ from the run under the cursor the text goes into a
/// new run carrying them.
pub(crate) fn insert_text(
    tx: &mut Transaction,
    text: &str,
    marks: Option<Marks>,
) -> EditorResult<()> {
    if text.is_empty() {
        return Ok(());
    }
    if tx.require_selection()?.is_expanded() {
        delete_fragment(tx)?;
    }
    let anchor = tx.require_selection()?.anchor;
    let point = editable_point(tx, anchor)?;
    let run_marks = tx
        .document()
        .text(&point.path)
        .map(|run| run.marks)
        .ok_or_else(|| missing(&point.path))?;

    match marks {
        Some(marks) if marks != run_marks => {
            tx.collapse_to(point);
            insert_node(tx, Node::Text(TextRun::with_marks(text, marks)))?;
        }
        _ => {
            tx.apply(Operation::InsertText {
                path: point.path.clone(),
                offset: point.offset,
                text: text.to_string(),
            })?;
            let offset = point.offset + text.chars().count();
            tx.collapse_to(Point::new(point.path, offset));
        }
    }
    Ok(())
}

fn remove_text(tx: &mut Transaction, path: &Path, from: usize, to: usize) -> EditorResult<()> {
    if from >= to {
        return Ok(());
    }
    let text = tx
        .document()
        .text(path)
        .map(|run| run.slice(from, to).to_string())
        .ok_or_else(|| missing(path))?;
    tx.apply(Operation::RemoveText {
        path: path.clone(),
        offset: from,
        text,
    })
}

/// Highest nodes strictly between the runs at `start` and `end`.
fn collect_between(nodes: &[Node], parent: &Path, start: &Path, end: &Path, out: &mut Vec<Path>) {
    for (index, node) in nodes.iter().enumerate() {
        let path = parent.child(index);
        if path == *start || path == *end {
            continue;
        }
        if path.is_ancestor_of(start) || path.is_ancestor_of(end) {
            collect_between(node.children(), &path, start, end, out);
        } else if path.is_after(start) && path.is_before(end) {
            out.push(path);
        }
    }
}

/// Deletes the content of an expanded selection and collapses it to the
/// start.
///
/// Voids touched by the selection are removed whole. When the two edge
/// blocks are adjacent siblings the end block is merged into the start one.
pub(crate) fn delete_fragment(tx: &mut Transaction) -> EditorResult<()> {
    let range = tx.require_selection()?;
    if range.is_collapsed() {
        return Ok(());
    }
    let (start, end) = range.edges();
    let document = tx.document();
    let start_void = document.void_above(&start.path);
    let end_void = document.void_above(&end.path);

    if start.path == end.path {
        if start_void.is_none() {
            remove_text(tx, &start.path, start.offset, end.offset)?;
        }
        tx.collapse_to(start);
        return Ok(());
    }

    let start_block = document.block_above(&start.path);
    let end_block = document.block_above(&end.path);
    let mut doomed = Vec::new();
    collect_between(document.children(), &Path::root(), &start.path, &end.path, &mut doomed);
    doomed.extend(start_void.iter().cloned());
    doomed.extend(end_void.iter().cloned());
    doomed.sort_by(|a, b| a.compare(b));
    doomed.dedup();

    if end_void.is_none() {
        remove_text(tx, &end.path, 0, end.offset)?;
    }
    if start_void.is_none() {
        let len = tx
            .document()
            .text(&start.path)
            .map(TextRun::len)
            .ok_or_else(|| missing(&start.path))?;
        remove_text(tx, &start.path, start.offset, len)?;
    }

    let anchor = tx.point_ref(start.clone());
    let start_block = start_block.map(|path| tx.path_ref(path));
    let end_block = end_block.map(|path| tx.path_ref(path));
    for path in doomed.iter().rev() {
        let node = tx.document().node(path).cloned().ok_or_else(|| missing(path))?;
        tx.apply(Operation::RemoveNode {
            path: path.clone(),
            node,
        })?;
    }

    if start_void.is_none() && end_void.is_none() {
        let first = start_block.and_then(|handle| tx.path(handle));
        let second = end_block.and_then(|handle| tx.path(handle));
        if let (Some(first), Some(second)) = (first, second) {
            if second == first.next() {
                let position = child_count(tx, &first);
                let kind = kind_at(tx, &second)?;
                tx.apply(Operation::MergeNode {
                    path: second,
                    position,
                    properties: NodeProperties::Element(kind),
                })?;
            }
        }
    }

    let point = match tx.point(anchor).or_else(|| tx.selection().map(Range::start)) {
        Some(point) => point,
        None => refill_removed_slot(tx, doomed.first())?,
    };
    tx.collapse_to(point);
    Ok(())
}

/// Inserts an empty paragraph where the first removed top-level block was,
/// for deletions that left no text to hold the cursor.
fn refill_removed_slot(tx: &mut Transaction, first_removed: Option<&Path>) -> EditorResult<Point> {
    let root = Path::root();
    let index = first_removed
        .and_then(|path| path.as_slice().first().copied())
        .unwrap_or(0)
        .min(child_count(tx, &root));
    let path = root.child(index);
    tx.apply(Operation::InsertNode {
        path: path.clone(),
        node: Element::paragraph("").into(),
    })?;
    Ok(Point::new(path.child(0), 0))
}

#[cfg(test)]
mod tests {
    use super::{delete_fragment, insert_node, set_node_type, unwrap_nodes, wrap_nodes};
    use crate::model::document::Document;
    use crate::model::kind::ElementKind;
    use crate::model::node::{Element, Node};
    use crate::model::path::Path;
    use crate::model::range::{Point, Range};
    use crate::session::error::EditorError;
    use crate::session::queries::is_list;
    use crate::session::transaction::Transaction;

    fn paragraphs(texts: &[&str]) -> Document {
        Document::new(
            texts
                .iter()
                .map(|text| Element::paragraph(*text).into())
                .collect(),
        )
        .expect("fixture should be valid")
    }

    #[test]
    fn set_node_type_rejects_text_and_inline_changes() {
        let mut tx = Transaction::new(paragraphs(&["a"]), None);
        let err = set_node_type(&mut tx, &Path::from([0, 0]), ElementKind::HeadingOne)
            .expect_err("text run has no type");
        assert_eq!(err, EditorError::InvalidTarget(Path::from([0, 0])));
        assert!(set_node_type(
            &mut tx,
            &Path::from([0]),
            ElementKind::Link {
                url: "https://x.com".to_string()
            }
        )
        .is_err());
        set_node_type(&mut tx, &Path::from([0]), ElementKind::HeadingTwo).expect("heading");
        assert_eq!(
            tx.document().element(&Path::from([0])).map(|e| e.kind.clone()),
            Some(ElementKind::HeadingTwo)
        );
    }

    #[test]
    fn wrap_blocks_then_unwrap_with_split_lifts_middle_item() {
        let mut tx = Transaction::new(
            paragraphs(&["a", "b", "c"]),
            Some(Range::new(Point::new([0, 0], 0), Point::new([2, 0], 1))),
        );
        for index in 0..3 {
            set_node_type(&mut tx, &Path::from([index]), ElementKind::ListItem).expect("item");
        }
        let wrapped = wrap_nodes(&mut tx, ElementKind::BulletedList, false).expect("wrap");
        assert_eq!(wrapped, vec![Path::from([0])]);
        assert_eq!(tx.document().children().len(), 1);

        tx.collapse_to(Point::new([0, 1, 0], 0));
        unwrap_nodes(&mut tx, &is_list, true).expect("unwrap");
        let kinds: Vec<_> = tx
            .document()
            .children()
            .iter()
            .filter_map(Node::as_element)
            .map(|element| element.kind.clone())
            .collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::BulletedList,
                ElementKind::ListItem,
                ElementKind::BulletedList
            ]
        );
        assert_eq!(tx.selection().map(Range::start), Some(Point::new([1, 0], 0)));
    }

    #[test]
    fn inline_wrap_splits_runs_at_edges() {
        let mut tx = Transaction::new(
            paragraphs(&["hello world"]),
            Some(Range::new(Point::new([0, 0], 6), Point::new([0, 0], 11))),
        );
        let wrapped = wrap_nodes(
            &mut tx,
            ElementKind::Link {
                url: "https://x.com".to_string(),
            },
            true,
        )
        .expect("wrap");
        assert_eq!(wrapped, vec![Path::from([0, 1])]);
        let link = tx.document().element(&Path::from([0, 1])).expect("link");
        assert_eq!(link.text_content(), "world");
        assert_eq!(
            tx.document().text(&Path::from([0, 0])).map(|run| run.text.as_str()),
            Some("hello ")
        );
    }

    #[test]
    fn block_insert_splits_paragraph_at_cursor() {
        let mut tx = Transaction::new(
            paragraphs(&["abcd"]),
            Some(Range::collapsed(Point::new([0, 0], 2))),
        );
        let path = insert_node(&mut tx, Element::image("https://img").into()).expect("insert");
        assert_eq!(path, Path::from([1]));
        let texts: Vec<String> = tx
            .document()
            .children()
            .iter()
            .map(Node::text_content)
            .collect();
        assert_eq!(texts, vec!["ab", "", "cd"]);
        assert_eq!(
            tx.selection(),
            Some(&Range::collapsed(Point::new([1, 0], 0)))
        );
    }

    #[test]
    fn delete_fragment_merges_adjacent_blocks() {
        let mut tx = Transaction::new(
            paragraphs(&["abc", "mid", "xyz"]),
            Some(Range::new(Point::new([2, 0], 1), Point::new([0, 0], 1))),
        );
        delete_fragment(&mut tx).expect("delete");
        assert_eq!(tx.document().children().len(), 1);
        assert_eq!(tx.document().children()[0].text_content(), "ayz");
        assert_eq!(
            tx.selection(),
            Some(&Range::collapsed(Point::new([0, 0], 1)))
        );
    }
}
