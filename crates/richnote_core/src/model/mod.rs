//! Rich document data model.
//!
//! # Responsibility
//! - Define the node tree, element kinds, paths and selection ranges.
//! - Keep structural invariants checkable independently of editing code.
//!
//! # Invariants
//! - Children are exclusively owned by one parent; the tree has no cycles.
//! - Formatting marks live on text runs only.

pub mod document;
pub mod kind;
pub mod node;
pub mod path;
pub mod range;
