use crate::model::path::Path;
use crate::model::range::{Point, Range};
use crate::ops::Operation;

/// Maps `path` across `op`. `None` when the addressed node no longer exists.
///
/// A node split at `path` itself maps to the new (second) half.
pub fn transform_path(path: &Path, op: &Operation) -> Option<Path> {
    let mut next = path.clone();
    match op {
        Operation::InsertText { .. } | Operation::RemoveText { .. } | Operation::SetNode { .. } => {}
        Operation::InsertNode { path: at, .. } => {
            if let Some((depth, index)) = sibling_slot(at, path) {
                if path.get(depth) >= index {
                    next.set(depth, path.get(depth) + 1);
                }
            }
        }
        Operation::RemoveNode { path: at, .. } => {
            if at.is_ancestor_or_self(path) {
                return None;
            }
            if let Some((depth, index)) = sibling_slot(at, path) {
                if path.get(depth) > index {
                    next.set(depth, path.get(depth) - 1);
                }
            }
        }
        Operation::MergeNode {
            path: at, position, ..
        } => {
            if let Some((depth, index)) = sibling_slot(at, path) {
                let current = path.get(depth);
                if current == index {
                    next.set(depth, current - 1);
                    if path.len() > at.len() {
                        next.set(depth + 1, path.get(depth + 1) + position);
                    }
                } else if current > index {
                    next.set(depth, current - 1);
                }
            }
        }
        Operation::SplitNode {
            path: at, position, ..
        } => {
            if let Some((depth, index)) = sibling_slot(at, path) {
                let current = path.get(depth);
                if current == index {
                    if path.len() == at.len() {
                        next.set(depth, current + 1);
                    } else if path.get(depth + 1) >= *position {
                        next.set(depth, current + 1);
                        next.set(depth + 1, path.get(depth + 1) - position);
                    }
                } else if current > index {
                    next.set(depth, current + 1);
                }
            }
        }
        Operation::WrapNode { path: at, len, .. } => {
            if let Some((depth, index)) = sibling_slot(at, path) {
                let current = path.get(depth);
                if current >= index + len {
                    next.set(depth, current - len + 1);
                } else if current >= index {
                    next.splice_at(depth, &[index, current - index]);
                }
            }
        }
        Operation::UnwrapNode { path: at, len, .. } => {
            if let Some((depth, index)) = sibling_slot(at, path) {
                let current = path.get(depth);
                if current == index {
                    if path.len() == at.len() {
                        return None;
                    }
                    next.set(depth, index + path.get(depth + 1));
                    next.remove_at(depth + 1);
                } else if current > index {
                    next.set(depth, current + len - 1);
                }
            }
        }
    }
    Some(next)
}

/// Depth and index of `at` when `path` lies under `at`'s parent.
fn sibling_slot(at: &Path, path: &Path) -> Option<(usize, usize)> {
    let index = at.last()?;
    let parent = at.parent();
    if parent.is_ancestor_of(path) {
        Some((parent.len(), index))
    } else {
        None
    }
}

/// Maps `point` across `op` with forward affinity: a point sitting exactly
/// at an insertion or split position moves with the inserted/split content.
pub fn transform_point(point: &Point, op: &Operation) -> Option<Point> {
    match op {
        Operation::InsertText { path, offset, text } if *path == point.path => {
            let mut next = point.clone();
            if point.offset >= *offset {
                next.offset += text.chars().count();
            }
            Some(next)
        }
        Operation::RemoveText { path, offset, text } if *path == point.path => {
            let mut next = point.clone();
            if point.offset > *offset {
                next.offset -= (point.offset - offset).min(text.chars().count());
            }
            Some(next)
        }
        Operation::MergeNode { path, position, .. } if *path == point.path => Some(Point {
            path: transform_path(&point.path, op)?,
            offset: point.offset + position,
        }),
        Operation::SplitNode { path, position, .. } if *path == point.path => {
            if point.offset >= *position {
                Some(Point {
                    path: path.next(),
                    offset: point.offset - position,
                })
            } else {
                Some(point.clone())
            }
        }
        _ => Some(Point {
            path: transform_path(&point.path, op)?,
            offset: point.offset,
        }),
    }
}

/// Maps both ends of `range`. `None` when either end no longer exists.
pub fn transform_range(range: &Range, op: &Operation) -> Option<Range> {
    Some(Range {
        anchor: transform_point(&range.anchor, op)?,
        focus: transform_point(&range.focus, op)?,
    })
}
