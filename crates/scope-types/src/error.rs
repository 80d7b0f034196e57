use thiserror::Error;

/// Errors produced while parsing, resolving or validating foundation types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid component id \"{id}\": {reason}")]
    InvalidId { id: String, reason: String },

    #[error("invalid version \"{0}\": expected major.minor.patch")]
    InvalidVersion(String),

    /// `latest` was requested but the history holds no version at all.
    #[error("component {0} was not found")]
    ComponentNotFound(String),

    /// An explicit version was requested that the history does not contain.
    #[error("version {version} of component {id} was not found")]
    VersionNotFound { id: String, version: String },

    #[error("version {requested} must be greater than the current version {current}")]
    VersionNotGreater { requested: String, current: String },

    #[error("version {0} cannot be bumped any further")]
    VersionOverflow(String),

    #[error("component {id} failed validation: {reason}")]
    Validation { id: String, reason: String },
}
