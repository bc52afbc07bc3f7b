//! Lake error types.

use chrono::NaiveDate;

/// Errors that can occur in the snapshot storage layer.
#[derive(Debug, thiserror::Error)]
pub enum LakeError {
    /// A snapshot with identical identity and content is already published.
    /// Callers treat this as a deterministic no-op for idempotent re-runs.
    #[error("snapshot already exists: {provider}/{dataset}/dt={as_of} content {content_id}")]
    AlreadyExists {
        provider: String,
        dataset: String,
        as_of: NaiveDate,
        content_id: String,
    },

    /// The storage root could not be opened.
    #[error("invalid storage root '{root}': {reason}")]
    InvalidRoot { root: String, reason: String },

    /// A stored object does not follow the partition layout or sidecar
    /// schema.
    #[error("invalid layout at {path}: {reason}")]
    InvalidLayout { path: String, reason: String },

    /// Rows could not be encoded against the contract schema.
    #[error("encode error: {0}")]
    Encode(String),

    /// Underlying object store operation failed.
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// Arrow construction or IPC write failed.
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// Sidecar (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local filesystem error (root creation).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
