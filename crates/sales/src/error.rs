use thiserror::Error;

/// Errors raised by sale processing and the stock cache.
#[derive(Debug, Error)]
pub enum SalesError {
    /// The process lock could not be acquired within the bounded wait.
    /// No writes have happened; the caller should resubmit.
    #[error("Another sale or cache rebuild is in progress, retry later")]
    Busy,

    /// No ledger rows exist for the given sale id.
    #[error("Sale not found: {sale_id}")]
    SaleNotFound { sale_id: String },

    /// The request cannot be processed as submitted.
    #[error("Invalid sale request: {reason}")]
    InvalidRequest { reason: String },

    #[error(transparent)]
    Store(#[from] tablestore::TableStoreError),

    #[error(transparent)]
    Record(#[from] records::RecordError),
}

impl SalesError {
    /// Whether the caller can expect a plain resubmit to succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SalesError::Busy)
    }
}

/// Result type for sale processing.
pub type Result<T> = std::result::Result<T, SalesError>;
