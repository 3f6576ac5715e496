use thiserror::Error;

/// Errors raised while decoding typed records from table rows.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A cell held a value the record type cannot accept.
    #[error("Invalid value in table {table}, column {column}: {reason}")]
    InvalidValue {
        table: String,
        column: String,
        reason: String,
    },

    /// A schema or store error from the table layer (missing column,
    /// missing table).
    #[error(transparent)]
    Store(#[from] tablestore::TableStoreError),
}

/// Result type for record decoding.
pub type Result<T> = std::result::Result<T, RecordError>;
