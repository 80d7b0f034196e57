//! Reconciliation rules.
//!
//! Pure functions deciding, for one workspace entry, what identifier it
//! should carry and how it classifies. The scope's version history is the
//! only source of truth for versions and export state; the version a
//! workspace entry records is never trusted on its own.
//!
//! Rules, in evaluation order:
//!
//! 1. An entry marked exported whose history is absent or unreadable is
//!    import pending and is left exactly as it is.
//! 2. No history at all: the component is new; any recorded version is
//!    dropped.
//! 3. Otherwise the entry is resynchronized to the maximum tagged version,
//!    under the alias it was exported to if it was.
//! 4. Files are then compared: missing beats everything but import pending,
//!    differing digests are modified, the rest are staged or exported.

use std::collections::BTreeMap;

use scope_store::VersionHistory;
use scope_types::{ComponentId, ObjectId, Version};

use crate::entry::MapEntry;
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::status::ComponentStatus;

/// What the scope holds for one namespace/name.
#[derive(Clone, Debug)]
pub enum HistoryState {
    Absent,
    Unreadable(String),
    Present(VersionHistory),
}

/// What the scope says a tracked entry is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    ImportPending,
    New,
    Tagged {
        version: Version,
        exported_to: Option<String>,
        files: BTreeMap<String, ObjectId>,
    },
}

/// Resolve a tracked identifier against the scope's history.
///
/// Returns the identifier the entry should be keyed by and the resolution.
pub fn resolve_entry(
    tracked: &ComponentId,
    entry: &MapEntry,
    history: &HistoryState,
) -> WorkspaceResult<(ComponentId, Resolution)> {
    let untagged = || (tracked.to_local().without_version(), Resolution::New);
    match history {
        HistoryState::Absent | HistoryState::Unreadable(_) if entry.exported => {
            Ok((tracked.clone(), Resolution::ImportPending))
        }
        HistoryState::Unreadable(reason) => Err(WorkspaceError::UnreadableHistory {
            id: tracked.to_string(),
            reason: reason.clone(),
        }),
        HistoryState::Absent => Ok(untagged()),
        HistoryState::Present(history) => match history.latest() {
            None => Ok(untagged()),
            Some((version, record)) => {
                let id = tracked
                    .to_local()
                    .with_version(version)
                    .with_scope(record.exported_to.clone());
                Ok((
                    id,
                    Resolution::Tagged {
                        version,
                        exported_to: record.exported_to.clone(),
                        files: record.files.clone(),
                    },
                ))
            }
        },
    }
}

/// Classify a resolved entry given the digests of its workspace files, or
/// `None` when those files are missing.
pub fn classify(
    resolution: &Resolution,
    workspace_files: Option<&BTreeMap<String, ObjectId>>,
) -> ComponentStatus {
    let Some(digests) = workspace_files else {
        return match resolution {
            Resolution::ImportPending => ComponentStatus::ImportPending,
            _ => ComponentStatus::Missing,
        };
    };
    match resolution {
        Resolution::ImportPending => ComponentStatus::ImportPending,
        Resolution::New => ComponentStatus::New,
        Resolution::Tagged { files, .. } if files != digests => ComponentStatus::Modified,
        Resolution::Tagged {
            exported_to: Some(_), ..
        } => ComponentStatus::Exported,
        Resolution::Tagged { .. } => ComponentStatus::Staged,
    }
}
