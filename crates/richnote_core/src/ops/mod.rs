//! Primitive tree operations.
//!
//! # Responsibility
//! - Describe every structural change as a reversible operation.
//! - Apply operations to a document and map paths/points across them.
//!
//! # Invariants
//! - `op.inverse().inverse() == op`.
//! - Applying `op` then `op.inverse()` restores the exact previous tree.
//! - Operations may leave transient invariant violations; the session
//!   normalizes and validates before committing a batch.

mod apply;
mod transform;

pub use apply::apply_operation;
pub use transform::{transform_path, transform_point, transform_range};

use crate::model::kind::ElementKind;
use crate::model::node::{Marks, Node};
use crate::model::path::Path;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Properties copied on split and changed by `SetNode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeProperties {
    Element(ElementKind),
    Text(Marks),
}

/// One reversible change to the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Inserts `node` so that it ends up at `path`.
    InsertNode { path: Path, node: Node },
    /// Removes the node at `path`; `node` is the removed value.
    RemoveNode { path: Path, node: Node },
    /// Inserts `text` into the run at `path` at char `offset`.
    InsertText {
        path: Path,
        offset: usize,
        text: String,
    },
    /// Removes `text` from the run at `path` starting at char `offset`.
    RemoveText {
        path: Path,
        offset: usize,
        text: String,
    },
    /// Splits the node at `path` at `position` (char offset for runs, child
    /// index for elements); the tail becomes the next sibling with
    /// `properties`.
    SplitNode {
        path: Path,
        position: usize,
        properties: NodeProperties,
    },
    /// Merges the node at `path` into its previous sibling, which held
    /// `position` chars/children before the merge.
    MergeNode {
        path: Path,
        position: usize,
        properties: NodeProperties,
    },
    /// Replaces element kind or text marks.
    SetNode {
        path: Path,
        properties: NodeProperties,
        new_properties: NodeProperties,
    },
    /// Wraps `len` siblings starting at `path` into a new `kind` element.
    WrapNode {
        path: Path,
        len: usize,
        kind: ElementKind,
    },
    /// Replaces the `kind` element at `path`, holding `len` children, with
    /// those children.
    UnwrapNode {
        path: Path,
        len: usize,
        kind: ElementKind,
    },
}

impl Operation {
    /// Operation that exactly undoes `self`.
    pub fn inverse(&self) -> Operation {
        match self {
            Self::InsertNode { path, node } => Self::RemoveNode {
                path: path.clone(),
                node: node.clone(),
            },
            Self::RemoveNode { path, node } => Self::InsertNode {
                path: path.clone(),
                node: node.clone(),
            },
            Self::InsertText { path, offset, text } => Self::RemoveText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            },
            Self::RemoveText { path, offset, text } => Self::InsertText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            },
            Self::SplitNode {
                path,
                position,
                properties,
            } => Self::MergeNode {
                path: path.next(),
                position: *position,
                properties: properties.clone(),
            },
            Self::MergeNode {
                path,
                position,
                properties,
            } => Self::SplitNode {
                path: path.with_last(path.last().unwrap_or(0).saturating_sub(1)),
                position: *position,
                properties: properties.clone(),
            },
            Self::SetNode {
                path,
                properties,
                new_properties,
            } => Self::SetNode {
                path: path.clone(),
                properties: new_properties.clone(),
                new_properties: properties.clone(),
            },
            Self::WrapNode { path, len, kind } => Self::UnwrapNode {
                path: path.clone(),
                len: *len,
                kind: kind.clone(),
            },
            Self::UnwrapNode { path, len, kind } => Self::WrapNode {
                path: path.clone(),
                len: *len,
                kind: kind.clone(),
            },
        }
    }

    /// Path the operation targets.
    pub fn path(&self) -> &Path {
        match self {
            Self::InsertNode { path, .. }
            | Self::RemoveNode { path, .. }
            | Self::InsertText { path, .. }
            | Self::RemoveText { path, .. }
            | Self::SplitNode { path, .. }
            | Self::MergeNode { path, .. }
            | Self::SetNode { path, .. }
            | Self::WrapNode { path, .. }
            | Self::UnwrapNode { path, .. } => path,
        }
    }

    /// Stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InsertNode { .. } => "insert_node",
            Self::RemoveNode { .. } => "remove_node",
            Self::InsertText { .. } => "insert_text",
            Self::RemoveText { .. } => "remove_text",
            Self::SplitNode { .. } => "split_node",
            Self::MergeNode { .. } => "merge_node",
            Self::SetNode { .. } => "set_node",
            Self::WrapNode { .. } => "wrap_node",
            Self::UnwrapNode { .. } => "unwrap_node",
        }
    }
}

/// Operation could not be applied to the current tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// Path does not resolve to a node of the expected shape.
    InvalidPath(Path),
    /// Char offset or child position lies outside the target.
    InvalidOffset { path: Path, offset: usize },
    /// Properties do not match the node variant (text vs element).
    PropertiesMismatch(Path),
}

impl OperationError {
    pub fn path(&self) -> &Path {
        match self {
            Self::InvalidPath(path) => path,
            Self::InvalidOffset { path, .. } => path,
            Self::PropertiesMismatch(path) => path,
        }
    }
}

impl Display for OperationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(path) => write!(f, "operation path is invalid: {path}"),
            Self::InvalidOffset { path, offset } => {
                write!(f, "operation offset {offset} is out of range at {path}")
            }
            Self::PropertiesMismatch(path) => {
                write!(f, "operation properties do not match node at {path}")
            }
        }
    }
}

impl Error for OperationError {}
