//! Error types for the notepad core
//!
//! No error here is fatal: each one degrades a single operation and leaves
//! the in-memory session as it was.

use thiserror::Error;

/// Result type alias for notepad operations
pub type Result<T> = std::result::Result<T, NotepadError>;

/// Main error type for the notepad core
#[derive(Error, Debug)]
pub enum NotepadError {
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Search pattern is empty")]
    EmptyPattern,

    #[error("Document not found: {0}")]
    NotFound(u64),

    #[error("Cannot delete the last document")]
    LastDocument,
}

impl NotepadError {
    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(self, NotepadError::NotFound(_))
    }
}

impl From<regex_lite::Error> for NotepadError {
    fn from(err: regex_lite::Error) -> Self {
        NotepadError::InvalidPattern(err.to_string())
    }
}
