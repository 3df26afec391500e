//! Working copy that one command mutates before it is committed.
//!
//! # Invariants
//! - Every applied operation is recorded in order.
//! - The selection and every tracked ref are mapped across each operation.
//! - A point inside a removed node relocates to the end of the previous
//!   text run, or to the start of the next one.

use crate::model::document::Document;
use crate::model::path::Path;
use crate::model::range::{Point, Range};
use crate::ops::{apply_operation, transform_path, transform_point, Operation};
use crate::session::error::{EditorError, EditorResult};

/// Handle to a point tracked across operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PointRef(usize);

/// Handle to a path tracked across operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PathRef(usize);

pub(crate) struct Transaction {
    document: Document,
    selection: Option<Range>,
    operations: Vec<Operation>,
    point_refs: Vec<Option<Point>>,
    path_refs: Vec<Option<Path>>,
}

impl Transaction {
    pub(crate) fn new(document: Document, selection: Option<Range>) -> Self {
        Self {
            document,
            selection,
            operations: Vec::new(),
            point_refs: Vec::new(),
            path_refs: Vec::new(),
        }
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    pub(crate) fn require_selection(&self) -> EditorResult<Range> {
        self.selection.clone().ok_or(EditorError::NoSelection)
    }

    pub(crate) fn collapse_to(&mut self, point: Point) {
        self.selection = Some(Range::collapsed(point));
    }

    /// Applies `op` to the working copy and maps selection and refs.
    pub(crate) fn apply(&mut self, op: Operation) -> EditorResult<()> {
        let fallback = match &op {
            Operation::RemoveNode { path, .. } => self.relocation_point(path),
            _ => None,
        };
        apply_operation(&mut self.document, &op)?;

        let map = |point: &Point| {
            transform_point(point, &op)
                .or_else(|| fallback.as_ref().and_then(|spare| transform_point(spare, &op)))
        };
        self.selection = match self.selection.take() {
            Some(range) => match (map(&range.anchor), map(&range.focus)) {
                (Some(anchor), Some(focus)) => Some(Range::new(anchor, focus)),
                _ => None,
            },
            None => None,
        };
        for slot in &mut self.point_refs {
            *slot = slot.take().and_then(|point| map(&point));
        }
        for slot in &mut self.path_refs {
            *slot = slot.take().and_then(|path| transform_path(&path, &op));
        }

        self.operations.push(op);
        Ok(())
    }

    /// Where a point inside the removed node at `removed` should land.
    fn relocation_point(&self, removed: &Path) -> Option<Point> {
        if let Some((path, run)) = self.document.previous_text(removed) {
            return Some(Point::new(path, run.len()));
        }
        self.document
            .next_text(removed)
            .map(|(path, _)| Point::new(path, 0))
    }

    pub(crate) fn point_ref(&mut self, point: Point) -> PointRef {
        self.point_refs.push(Some(point));
        PointRef(self.point_refs.len() - 1)
    }

    pub(crate) fn point(&self, handle: PointRef) -> Option<Point> {
        self.point_refs.get(handle.0).cloned().flatten()
    }

    pub(crate) fn path_ref(&mut self, path: Path) -> PathRef {
        self.path_refs.push(Some(path));
        PathRef(self.path_refs.len() - 1)
    }

    pub(crate) fn path(&self, handle: PathRef) -> Option<Path> {
        self.path_refs.get(handle.0).cloned().flatten()
    }

    pub(crate) fn operation_count(&self) -> usize {
        self.operations.len()
    }

    pub(crate) fn finish(self) -> (Document, Option<Range>, Vec<Operation>) {
        (self.document, self.selection, self.operations)
    }
}

#[cfg(test)]
mod tests {
    use super::Transaction;
    use crate::model::document::Document;
    use crate::model::node::{Element, Node};
    use crate::model::path::Path;
    use crate::model::range::{Point, Range};
    use crate::ops::Operation;

    fn two_paragraphs() -> Document {
        Document::new(vec![
            Element::paragraph("first").into(),
            Element::paragraph("second").into(),
        ])
        .expect("fixture should be valid")
    }

    #[test]
    fn removed_selection_relocates_to_previous_text_end() {
        let document = two_paragraphs();
        let node = document
            .node(&Path::from([1]))
            .cloned()
            .expect("second paragraph");
        let mut tx = Transaction::new(
            document,
            Some(Range::collapsed(Point::new([1, 0], 2))),
        );
        tx.apply(Operation::RemoveNode {
            path: Path::from([1]),
            node,
        })
        .expect("remove applies");
        assert_eq!(
            tx.selection(),
            Some(&Range::collapsed(Point::new([0, 0], 5)))
        );
    }

    #[test]
    fn refs_follow_inserted_siblings() {
        let mut tx = Transaction::new(two_paragraphs(), None);
        let path = tx.path_ref(Path::from([1]));
        let point = tx.point_ref(Point::new([1, 0], 3));
        tx.apply(Operation::InsertNode {
            path: Path::from([0]),
            node: Node::Element(Element::paragraph("zero")),
        })
        .expect("insert applies");
        assert_eq!(tx.path(path), Some(Path::from([2])));
        assert_eq!(tx.point(point), Some(Point::new([2, 0], 3)));
        assert_eq!(tx.operation_count(), 1);
    }
}
