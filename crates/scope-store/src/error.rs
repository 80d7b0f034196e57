use std::path::PathBuf;

use scope_types::{ObjectId, TypeError};

/// Errors from the scope storage areas.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record references a blob the object store does not hold.
    #[error("object not found: {0}")]
    MissingObject(ObjectId),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {id}: computed {computed}")]
    HashMismatch { id: ObjectId, computed: ObjectId },

    /// Components are stored per version; an unpinned identifier cannot be.
    #[error("component {0} has no exact version")]
    Unversioned(String),

    /// A JSON record exists but cannot be decoded.
    #[error("corrupt record at {path}: {reason}")]
    CorruptRecord { path: PathBuf, reason: String },

    /// Serialization failure on write.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Directory walk failure while enumerating an area.
    #[error("failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    #[error(transparent)]
    Type(#[from] TypeError),

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
