use crate::model::document::Document;
use crate::model::node::{byte_index, Element, Node, TextRun};
use crate::model::path::Path;
use crate::ops::{NodeProperties, Operation, OperationError};

/// Applies one operation in place.
///
/// On error the document may be partially modified; callers apply
/// operations to a working copy and drop it on failure.
pub fn apply_operation(document: &mut Document, op: &Operation) -> Result<(), OperationError> {
    match op {
        Operation::InsertNode { path, node } => {
            let (siblings, index) = siblings_mut(document, path)?;
            if index > siblings.len() {
                return Err(OperationError::InvalidPath(path.clone()));
            }
            siblings.insert(index, node.clone());
        }
        Operation::RemoveNode { path, .. } => {
            let (siblings, index) = siblings_mut(document, path)?;
            if index >= siblings.len() {
                return Err(OperationError::InvalidPath(path.clone()));
            }
            siblings.remove(index);
        }
        Operation::InsertText { path, offset, text } => {
            let run = text_mut(document, path)?;
            if *offset > run.len() {
                return Err(invalid_offset(path, *offset));
            }
            let at = byte_index(&run.text, *offset);
            run.text.insert_str(at, text);
        }
        Operation::RemoveText { path, offset, text } => {
            let run = text_mut(document, path)?;
            let end = offset + text.chars().count();
            if end > run.len() {
                return Err(invalid_offset(path, end));
            }
            let from = byte_index(&run.text, *offset);
            let to = byte_index(&run.text, end);
            run.text.replace_range(from..to, "");
        }
        Operation::SplitNode {
            path,
            position,
            properties,
        } => {
            let tail = split_off(document, path, *position, properties)?;
            let (siblings, index) = siblings_mut(document, path)?;
            siblings.insert(index + 1, tail);
        }
        Operation::MergeNode { path, position, .. } => {
            let previous = path
                .previous()
                .ok_or_else(|| OperationError::InvalidPath(path.clone()))?;
            let (siblings, index) = siblings_mut(document, path)?;
            if index >= siblings.len() {
                return Err(OperationError::InvalidPath(path.clone()));
            }
            let node = siblings.remove(index);
            merge_into(document, &previous, node, *position)?;
        }
        Operation::SetNode {
            path,
            new_properties,
            ..
        } => {
            let node = document
                .node_mut(path)
                .ok_or_else(|| OperationError::InvalidPath(path.clone()))?;
            match (node, new_properties) {
                (Node::Element(element), NodeProperties::Element(kind)) => {
                    element.kind = kind.clone();
                }
                (Node::Text(run), NodeProperties::Text(marks)) => run.marks = *marks,
                _ => return Err(OperationError::PropertiesMismatch(path.clone())),
            }
        }
        Operation::WrapNode { path, len, kind } => {
            let (siblings, index) = siblings_mut(document, path)?;
            if *len == 0 || index + len > siblings.len() {
                return Err(invalid_offset(path, index + len));
            }
            let wrapped = siblings.drain(index..index + len).collect::<Vec<_>>();
            siblings.insert(index, Element::new(kind.clone(), wrapped).into());
        }
        Operation::UnwrapNode { path, len, kind } => {
            let (siblings, index) = siblings_mut(document, path)?;
            let matches = siblings.get(index).is_some_and(|node| {
                node.as_element()
                    .is_some_and(|element| element.kind == *kind && element.children.len() == *len)
            });
            if !matches {
                return Err(OperationError::InvalidPath(path.clone()));
            }
            if let Node::Element(element) = siblings.remove(index) {
                for (offset, child) in element.children.into_iter().enumerate() {
                    siblings.insert(index + offset, child);
                }
            }
        }
    }
    Ok(())
}

fn invalid_offset(path: &Path, offset: usize) -> OperationError {
    OperationError::InvalidOffset {
        path: path.clone(),
        offset,
    }
}

fn siblings_mut<'a>(
    document: &'a mut Document,
    path: &Path,
) -> Result<(&'a mut Vec<Node>, usize), OperationError> {
    let index = path
        .last()
        .ok_or_else(|| OperationError::InvalidPath(path.clone()))?;
    let siblings = document
        .children_at_mut(&path.parent())
        .ok_or_else(|| OperationError::InvalidPath(path.clone()))?;
    Ok((siblings, index))
}

fn text_mut<'a>(document: &'a mut Document, path: &Path) -> Result<&'a mut TextRun, OperationError> {
    match document.node_mut(path) {
        Some(Node::Text(run)) => Ok(run),
        _ => Err(OperationError::InvalidPath(path.clone())),
    }
}

fn split_off(
    document: &mut Document,
    path: &Path,
    position: usize,
    properties: &NodeProperties,
) -> Result<Node, OperationError> {
    let node = document
        .node_mut(path)
        .ok_or_else(|| OperationError::InvalidPath(path.clone()))?;
    match (node, properties) {
        (Node::Text(run), NodeProperties::Text(marks)) => {
            if position > run.len() {
                return Err(invalid_offset(path, position));
            }
            let at = byte_index(&run.text, position);
            let tail = run.text.split_off(at);
            Ok(TextRun::with_marks(tail, *marks).into())
        }
        (Node::Element(element), NodeProperties::Element(kind)) => {
            if position > element.children.len() {
                return Err(invalid_offset(path, position));
            }
            let tail = element.children.split_off(position);
            Ok(Element::new(kind.clone(), tail).into())
        }
        _ => Err(OperationError::PropertiesMismatch(path.clone())),
    }
}

fn merge_into(
    document: &mut Document,
    previous: &Path,
    node: Node,
    position: usize,
) -> Result<(), OperationError> {
    let target = document
        .node_mut(previous)
        .ok_or_else(|| OperationError::InvalidPath(previous.clone()))?;
    match (target, node) {
        (Node::Text(target), Node::Text(run)) => {
            if target.len() != position {
                return Err(invalid_offset(previous, position));
            }
            target.text.push_str(&run.text);
        }
        (Node::Element(target), Node::Element(element)) => {
            if target.children.len() != position {
                return Err(invalid_offset(previous, position));
            }
            target.children.extend(element.children);
        }
        _ => return Err(OperationError::PropertiesMismatch(previous.clone())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::apply_operation;
    use crate::model::document::Document;
    use crate::model::kind::ElementKind;
    use crate::model::node::{Element, Marks, Node, TextRun};
    use crate::model::path::Path;
    use crate::ops::{NodeProperties, Operation, OperationError};

    fn doc(children: Vec<Node>) -> Document {
        Document::new(children).expect("fixture should be valid")
    }

    fn round_trip(document: &Document, op: Operation) -> Document {
        let mut changed = document.clone();
        apply_operation(&mut changed, &op).expect("forward apply");
        let mut restored = changed.clone();
        apply_operation(&mut restored, &op.inverse()).expect("inverse apply");
        assert_eq!(&restored, document, "inverse must restore {}", op.name());
        changed
    }

    #[test]
    fn split_and_merge_text_runs() {
        let original = doc(vec![Element::paragraph("hello world").into()]);
        let changed = round_trip(
            &original,
            Operation::SplitNode {
                path: Path::from([0, 0]),
                position: 5,
                properties: NodeProperties::Text(Marks::default()),
            },
        );
        assert_eq!(
            changed.children_at(&Path::from([0])).map(<[Node]>::len),
            Some(2)
        );
        assert_eq!(
            changed.text(&Path::from([0, 1])),
            Some(&TextRun::new(" world"))
        );
    }

    #[test]
    fn wrap_and_unwrap_siblings() {
        let original = doc(vec![
            Element::with_text(ElementKind::ListItem, "a").into(),
            Element::with_text(ElementKind::ListItem, "b").into(),
            Element::paragraph("c").into(),
        ]);
        let changed = round_trip(
            &original,
            Operation::WrapNode {
                path: Path::from([0]),
                len: 2,
                kind: ElementKind::NumberedList,
            },
        );
        assert_eq!(changed.children().len(), 2);
        assert_eq!(
            changed.element(&Path::from([0])).map(|element| &element.kind),
            Some(&ElementKind::NumberedList)
        );
    }

    #[test]
    fn text_edits_use_char_offsets() {
        let original = doc(vec![Element::paragraph("naïve").into()]);
        let changed = round_trip(
            &original,
            Operation::RemoveText {
                path: Path::from([0, 0]),
                offset: 2,
                text: "ïv".to_string(),
            },
        );
        assert_eq!(changed.text(&Path::from([0, 0])), Some(&TextRun::new("nae")));
    }

    #[test]
    fn set_node_rejects_mismatched_properties() {
        let mut document = doc(vec![Element::paragraph("x").into()]);
        let err = apply_operation(
            &mut document,
            &Operation::SetNode {
                path: Path::from([0, 0]),
                properties: NodeProperties::Element(ElementKind::Paragraph),
                new_properties: NodeProperties::Element(ElementKind::HeadingOne),
            },
        )
        .unwrap_err();
        assert_eq!(err, OperationError::PropertiesMismatch(Path::from([0, 0])));
    }

    #[test]
    fn remove_rejects_missing_path() {
        let mut document = Document::default();
        let err = apply_operation(
            &mut document,
            &Operation::RemoveNode {
                path: Path::from([3]),
                node: Node::text(""),
            },
        )
        .unwrap_err();
        assert_eq!(err, OperationError::InvalidPath(Path::from([3])));
    }
}
