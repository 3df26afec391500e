//! Post-command cleanup pass.
//!
//! Fixes are found one at a time and applied through the transaction so
//! they land in the same undo batch as the command that caused them.

use crate::model::document::Document;
use crate::model::node::{Element, Node, TextRun};
use crate::model::path::Path;
use crate::ops::{NodeProperties, Operation};
use crate::session::error::EditorResult;
use crate::session::transaction::Transaction;
use log::warn;

const MAX_PASSES: usize = 10_000;

/// Applies fixes until the document is stable.
///
/// Rules:
/// - an element without children gets an empty run, an empty list is removed;
/// - adjacent runs with equal marks are merged;
/// - an empty run next to another run is removed;
/// - inline elements are flanked by runs on both sides.
pub(crate) fn normalize(tx: &mut Transaction) -> EditorResult<()> {
    for _ in 0..MAX_PASSES {
        match next_fix(tx.document()) {
            Some(op) => tx.apply(op)?,
            None => return Ok(()),
        }
    }
    warn!("event=normalize_abort module=editor status=error passes={MAX_PASSES}");
    Ok(())
}

fn next_fix(document: &Document) -> Option<Operation> {
    document
        .descendants()
        .into_iter()
        .find_map(|(path, node)| match node {
            Node::Element(element) => element_fix(&path, element),
            Node::Text(_) => None,
        })
}

fn empty_run_at(path: Path) -> Operation {
    Operation::InsertNode {
        path,
        node: Node::Text(TextRun::empty()),
    }
}

fn element_fix(path: &Path, element: &Element) -> Option<Operation> {
    if element.children.is_empty() {
        if element.kind.is_list() {
            return Some(Operation::RemoveNode {
                path: path.clone(),
                node: Node::Element(element.clone()),
            });
        }
        return Some(empty_run_at(path.child(0)));
    }
    if !element.has_inline_content() {
        return None;
    }

    let children = &element.children;
    let last = children.len() - 1;
    for (index, child) in children.iter().enumerate() {
        match child {
            Node::Element(inline) if inline.kind.is_inline() && element.kind.is_block() => {
                if index == 0 {
                    return Some(empty_run_at(path.child(0)));
                }
                if index == last || !children[index + 1].is_text() {
                    return Some(empty_run_at(path.child(index + 1)));
                }
            }
            Node::Text(run) if index > 0 => {
                let Node::Text(previous) = &children[index - 1] else {
                    continue;
                };
                if previous.marks == run.marks {
                    return Some(Operation::MergeNode {
                        path: path.child(index),
                        position: previous.len(),
                        properties: NodeProperties::Text(run.marks),
                    });
                }
                if previous.is_empty() {
                    return Some(Operation::RemoveNode {
                        path: path.child(index - 1),
                        node: Node::Text(previous.clone()),
                    });
                }
                if run.is_empty() {
                    return Some(Operation::RemoveNode {
                        path: path.child(index),
                        node: Node::Text(run.clone()),
                    });
                }
            }
            _ => {}
        }
    }
    None
}
