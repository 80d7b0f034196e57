//! Error types for dependency map operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepsError {
    /// Only pinned, local identifiers own an entry.
    #[error("dependency map key must be a local, versioned id: {0}")]
    InvalidKey(String),

    /// The persisted map could not be decoded.
    #[error("malformed dependency map: {0}")]
    Malformed(String),

    #[error(transparent)]
    Store(#[from] scope_store::StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DepsResult<T> = std::result::Result<T, DepsError>;
