use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid remote alias {alias:?}: {reason}")]
    InvalidAlias { alias: String, reason: String },

    #[error("remote {0} was not found")]
    RemoteNotFound(String),

    #[error("remote {0} already exists")]
    AlreadyExists(String),

    #[error("address {0} is not served by any supported transport")]
    UnsupportedTransport(String),

    /// The peer answered with an error.
    #[error("remote {alias} failed: {reason}")]
    Remote { alias: String, reason: String },

    #[error("cannot locate the home directory")]
    HomeNotFound,

    #[error("failed to parse {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("failed to serialize configuration: {0}")]
    ConfigSerialize(String),

    #[error("archive error: {0}")]
    Archive(#[from] scope_archive::ArchiveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RemoteResult<T> = Result<T, RemoteError>;
