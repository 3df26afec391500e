//! Editor command errors.

use crate::model::document::DocumentValidationError;
use crate::model::path::Path;
use crate::ops::OperationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by editor session commands.
pub type EditorResult<T> = Result<T, EditorError>;

/// Recoverable command failures.
///
/// Every variant leaves the session unchanged: document, selection and
/// history keep their previous values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// A mutation was attempted without an active selection.
    NoSelection,
    /// A path or point refers to a node that is not present.
    InvalidTarget(Path),
    /// A required input field was blank after trimming.
    EmptyInput(&'static str),
    /// The command would break a structural invariant.
    InvalidDocument(DocumentValidationError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSelection => write!(f, "no active selection"),
            Self::InvalidTarget(path) => write!(f, "target node not found: {path}"),
            Self::EmptyInput(field) => write!(f, "`{field}` must not be blank"),
            Self::InvalidDocument(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDocument(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OperationError> for EditorError {
    fn from(value: OperationError) -> Self {
        Self::InvalidTarget(value.path().clone())
    }
}

impl From<DocumentValidationError> for EditorError {
    fn from(value: DocumentValidationError) -> Self {
        Self::InvalidDocument(value)
    }
}
