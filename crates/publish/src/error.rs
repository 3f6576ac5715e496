use thiserror::Error;

/// Errors that abort a publish cycle.
///
/// Individual secondary-sink failures are not errors; they are captured
/// per sink in the publish report.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A sink is misconfigured (missing endpoint, credential or id).
    /// Never retried.
    #[error("Publish configuration error: {reason}")]
    Config { reason: String },

    /// The primary sink rejected the snapshot; the cycle is abandoned.
    #[error("Primary sink {sink} failed: {message}")]
    Primary { sink: String, message: String },

    #[error(transparent)]
    Catalog(#[from] catalog::CatalogError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Result type for publishing.
pub type Result<T> = std::result::Result<T, PublishError>;
