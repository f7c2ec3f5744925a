//! Error types for the editor

use crate::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("No node at path {0}")]
    InvalidPath(Path),

    #[error("Node at {0} is not a text leaf")]
    NotAText(Path),

    #[error("Node at {0} is not an element")]
    NotAnElement(Path),

    #[error("Offset {offset} is out of range for text of length {len} at {path}")]
    OffsetOutOfRange { path: Path, offset: usize, len: usize },

    #[error("Editor has no selection")]
    NoSelection,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Normalization did not settle after {iterations} repairs")]
    NormalizationDiverged { iterations: usize },

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }
}

/// Structural problems found in a serialized document before it becomes active
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Void node at {path} has {count} children (expected one empty text)")]
    VoidChildren { path: Path, count: usize },

    #[error("Void node at {path} has a non-text child")]
    VoidNonTextChild { path: Path },

    #[error("Inline node at {path} is not inside a block")]
    InlineAtTopLevel { path: Path },

    #[error("Text leaf at {path} is not inside a block")]
    TextAtTopLevel { path: Path },

    #[error("Block node at {path} is nested inside an inline")]
    BlockInsideInline { path: Path },

    #[error("Selection does not fit the document: {0}")]
    InvalidSelection(String),
}

pub type EditorResult<T> = Result<T, EditorError>;
