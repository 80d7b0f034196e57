use std::path::PathBuf;

use scope_types::TypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("scope not found at {0} or any parent directory")]
    ScopeNotFound(PathBuf),

    #[error("component {0} is not in this scope")]
    BitNotInScope(String),

    #[error("component {0} is missing from the source store")]
    MissingComponent(String),

    #[error("component {id} failed validation: {reason}")]
    Validation { id: String, reason: String },

    #[error("version {0} was exported and cannot be untagged")]
    ExportedVersion(String),

    #[error("version {id} is required by {}", dependents.join(", "))]
    HasDependents { id: String, dependents: Vec<String> },

    #[error("build of {id} failed: {reason}")]
    Build { id: String, reason: String },

    #[error(transparent)]
    Type(TypeError),

    #[error(transparent)]
    Store(#[from] scope_store::StoreError),

    #[error(transparent)]
    Deps(#[from] scope_deps::DepsError),

    #[error(transparent)]
    Archive(#[from] scope_archive::ArchiveError),

    #[error(transparent)]
    Remote(#[from] scope_remote::RemoteError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TypeError> for ScopeError {
    fn from(e: TypeError) -> Self {
        match e {
            TypeError::Validation { id, reason } => Self::Validation { id, reason },
            other => Self::Type(other),
        }
    }
}

pub type ScopeResult<T> = Result<T, ScopeError>;
