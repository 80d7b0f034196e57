//! Workspace tracking for scope components.
//!
//! A workspace is a directory of component sources plus a `.scope` scope
//! they are tagged into. The `.scopemap` file records which directory holds
//! which component and whether its version was exported. That record is
//! intent only: every `status`, `tag` and `export` first reconciles it
//! against the scope's version history and rewrites it to match.
//!
//! # Key Types
//!
//! - [`Workspace`] -- Tracked directories plus their scope
//! - [`WorkspaceMap`] -- The persisted tracking map
//! - [`ComponentStatus`] -- New, staged, exported, modified, missing, import pending
//! - [`StatusReport`] / [`ExportReport`] -- Operation results

pub mod entry;
pub mod error;
pub mod files;
pub mod map;
pub mod reconcile;
pub mod status;
pub mod workspace;

pub use entry::MapEntry;
pub use error::{WorkspaceError, WorkspaceResult};
pub use files::WorkspaceFiles;
pub use map::{WorkspaceMap, WORKSPACE_MAP_FILE};
pub use reconcile::{classify, resolve_entry, HistoryState, Resolution};
pub use status::{
    ComponentState, ComponentStatus, ExportReport, StatusReport, IMPORT_PENDING_MESSAGE,
    NOTHING_TO_TAG_OR_EXPORT, NO_LOCAL_CHANGES,
};
pub use workspace::{is_workspace, ComponentView, Target, Workspace};
