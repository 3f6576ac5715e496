use thiserror::Error;

/// Errors that can occur when interacting with the table store.
#[derive(Debug, Error)]
pub enum TableStoreError {
    /// The named table does not exist in the store.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// A row index referenced a row outside the table's data range.
    #[error("Row {index} out of bounds for table {table}")]
    RowOutOfBounds { table: String, index: usize },

    /// A required column is missing from a table's header.
    #[error("Required column {column} missing from table {table}")]
    MissingColumn { table: String, column: String },

    /// The store reported itself unavailable. Retryable.
    #[error("Table store unavailable: {0}")]
    Unavailable(String),

    /// A call to the store timed out. Retryable.
    #[error("Table store timeout: {0}")]
    Timeout(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TableStoreError {
    /// Returns true for the service-unavailable/timeout class of errors
    /// that the retry policy may re-attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            TableStoreError::Unavailable(_) | TableStoreError::Timeout(_) => true,
            TableStoreError::Database(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed
            ),
            _ => false,
        }
    }
}

/// Result type for table store operations.
pub type Result<T> = std::result::Result<T, TableStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(TableStoreError::Unavailable("503".into()).is_transient());
        assert!(TableStoreError::Timeout("deadline".into()).is_transient());
        assert!(!TableStoreError::TableNotFound("Products".into()).is_transient());
        assert!(
            !TableStoreError::MissingColumn {
                table: "Products".into(),
                column: "CODIGO_ID".into(),
            }
            .is_transient()
        );
    }
}
