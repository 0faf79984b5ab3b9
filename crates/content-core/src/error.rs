//! Error types for content-core

use crate::store::StoreError;

/// Result type for content-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in content-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Identifier does not parse as a known namespace plus a non-empty base id
    #[error("Invalid document id '{id}': {reason}")]
    InvalidIdKind { id: String, reason: String },

    /// Document (or a document referenced by an action) does not exist
    #[error("Document not found: {id}")]
    NotFound { id: String },

    /// An edit was requested with nothing to change
    #[error("No changes requested")]
    NoChangesRequested,

    /// An edit named a system field (`_id`, `_rev`, ...), which only the store may set
    #[error("Field '{field}' is reserved for the system")]
    ReservedField { field: String },

    /// Failure reported by the backing store, passed through unchanged
    #[error(transparent)]
    ExternalActionFailure(#[from] StoreError),

    /// Failure scoped to a single item of a batch
    #[error("Batch item {index} failed: {message}")]
    BatchItemFailure { index: usize, message: String },

    /// Batch exceeds the configured fan-out cap
    #[error("Batch of {size} items exceeds the maximum of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Invalid or incomplete client configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlParse(#[from] toml::de::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_id(id: &str, reason: impl Into<String>) -> Self {
        Error::InvalidIdKind {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(id: impl ToString) -> Self {
        Error::NotFound { id: id.to_string() }
    }
}
