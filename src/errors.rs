use thiserror::Error;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Storage quota exceeded while writing `{key}` (limit {limit} bytes)")]
    QuotaExceeded { key: String, limit: usize },
    #[error("Invalid backup: {0}")]
    InvalidBackup(String),
    #[error("{0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl LedgerError {
    /// True when the failure came from the storage layer rather than user input.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            LedgerError::Io(_) | LedgerError::Storage(_) | LedgerError::QuotaExceeded { .. }
        )
    }
}
