//! Error types for document operations.

use thiserror::Error;

/// Result type for document operations.
pub type SlideResult<T> = Result<T, SlideError>;

/// Errors that can occur in document operations.
#[derive(Debug, Error)]
pub enum SlideError {
    /// Element not found in the document.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// An element with this ID already exists in the document.
    #[error("Duplicate element id: {0}")]
    DuplicateElement(String),

    /// The document violates a structural invariant.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
