use thiserror::Error;

/// Errors raised while building a catalog snapshot.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A table the build cannot proceed without is absent.
    #[error("Required table is missing: {table}")]
    MissingTable { table: String },

    #[error(transparent)]
    Store(#[from] tablestore::TableStoreError),

    #[error(transparent)]
    Record(#[from] records::RecordError),
}

/// Result type for catalog building.
pub type Result<T> = std::result::Result<T, CatalogError>;
