//! Error types for the workspace crate.

use std::path::PathBuf;

use scope_core::ScopeError;
use scope_store::StoreError;
use scope_types::TypeError;

/// Errors that can occur during workspace operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// No workspace (a directory holding `.scope`) at or above the path.
    #[error("not inside a workspace: {0}")]
    NotAWorkspace(PathBuf),

    /// The identifier has no workspace entry.
    #[error("component {0} is not tracked by this workspace")]
    MissingWorkspaceComponent(String),

    /// The workspace claims the component was exported but the scope holds
    /// no readable record of it.
    #[error("component {0} is marked exported but the scope has no record of it; import it before changing it")]
    ImportPending(String),

    /// `add` of a component the workspace already tracks.
    #[error("component {0} is already tracked")]
    AlreadyTracked(String),

    /// The component directory or one of the files its manifest names is gone.
    #[error("files of component {id} are missing under {}", root.display())]
    MissingFiles { id: String, root: PathBuf },

    /// `tag` without `--force` found no new or modified components.
    #[error("nothing to tag")]
    NothingToTag,

    /// The component has no staged version to export.
    #[error("component {0} has no staged version to export")]
    NothingToExport(String),

    /// No remote was named and the scope does not have exactly one.
    #[error("no remote given and no single configured remote to default to")]
    NoRemote,

    /// The version history record exists but could not be read.
    #[error("version history of {id} is unreadable: {reason}")]
    UnreadableHistory { id: String, reason: String },

    /// The workspace map file could not be parsed or written.
    #[error("workspace map error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for workspace results.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
