//! Document store errors

use thiserror::Error;

/// Errors from citizen/vehicle/document record management
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(String),
}

impl DocumentError {
    pub fn validation(message: impl Into<String>) -> Self {
        DocumentError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DocumentError::NotFound(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::NotFound(_))
    }
}
