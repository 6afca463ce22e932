use thiserror::Error;

use crate::domain::TransactionId;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),
    #[error("Ledger not loaded")]
    NotLoaded,
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LedgerError {
    /// Returns true for failures of the durable store rather than of the request.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            LedgerError::Persistence(_) | LedgerError::Io(_) | LedgerError::Serde(_)
        )
    }
}
