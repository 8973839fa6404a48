//! Ledger domain errors

use core_kernel::UnknownKind;
use thiserror::Error;

/// Errors surfaced by the payment ledger and the statement aggregator
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Bad input: non-positive amount, oversized remarks, unknown kind
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unresolvable document, payment, or citizen id
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        LedgerError::NotFound(message.into())
    }

    /// Returns true if this error maps to a 404-equivalent
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound(_))
    }
}

impl From<UnknownKind> for LedgerError {
    fn from(err: UnknownKind) -> Self {
        LedgerError::Validation(err.to_string())
    }
}
