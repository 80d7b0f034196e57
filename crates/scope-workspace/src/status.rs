//! Reconciliation result types.

use std::fmt;

use scope_types::ComponentId;
use serde::{Deserialize, Serialize};

/// Reported when there is nothing new, modified or staged.
pub const NOTHING_TO_TAG_OR_EXPORT: &str = "nothing to tag or export";

/// Reported when some tracked components are pending import.
pub const IMPORT_PENDING_MESSAGE: &str =
    "some components are marked exported but the scope has no record of them; import them before tagging or exporting";

/// Reported when an export touched no workspace entry.
pub const NO_LOCAL_CHANGES: &str = "no local changes have been made";

/// Classification of one component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentStatus {
    /// Never tagged in the scope.
    New,
    /// Latest version tagged but not exported.
    Staged,
    /// Latest version pushed to a remote.
    Exported,
    /// Workspace files differ from the latest tagged version.
    Modified,
    /// Component directory or implementation file is gone.
    Missing,
    /// Marked exported in the workspace, unknown to the scope.
    ImportPending,
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Staged => "staged",
            Self::Exported => "exported",
            Self::Modified => "modified",
            Self::Missing => "missing",
            Self::ImportPending => "import pending",
        };
        f.write_str(s)
    }
}

/// One reconciled component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentState {
    /// Identifier after resynchronization with the scope.
    pub id: ComponentId,
    pub status: ComponentStatus,
    /// Tracked directory; `None` for components only the scope knows.
    pub root: Option<String>,
}

impl ComponentState {
    pub fn is_tracked(&self) -> bool {
        self.root.is_some()
    }
}

/// Result of `status`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub components: Vec<ComponentState>,
}

impl StatusReport {
    pub fn new(components: Vec<ComponentState>) -> Self {
        Self { components }
    }

    /// Identifiers with the given classification, in report order.
    pub fn with_status(&self, status: ComponentStatus) -> Vec<&ComponentId> {
        self.components
            .iter()
            .filter(|c| c.status == status)
            .map(|c| &c.id)
            .collect()
    }

    pub fn status_of(&self, id: &ComponentId) -> Option<ComponentStatus> {
        self.components
            .iter()
            .find(|c| c.id.same_component(id))
            .map(|c| c.status)
    }

    /// `true` when nothing is waiting to be tagged or exported.
    pub fn is_clean(&self) -> bool {
        self.components.iter().all(|c| {
            matches!(c.status, ComponentStatus::Exported | ComponentStatus::Missing)
        })
    }

    pub fn has_import_pending(&self) -> bool {
        self.components
            .iter()
            .any(|c| c.status == ComponentStatus::ImportPending)
    }

    /// Fixed summary lines.
    pub fn messages(&self) -> Vec<&'static str> {
        let mut messages = Vec::new();
        if self.has_import_pending() {
            messages.push(IMPORT_PENDING_MESSAGE);
        }
        if self.is_clean() {
            messages.push(NOTHING_TO_TAG_OR_EXPORT);
        }
        messages
    }
}

/// Result of `export`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    pub remote: String,
    /// Tracked components, under their new exported identifiers.
    pub exported: Vec<ComponentId>,
    /// Components exported from the scope without a workspace entry.
    pub untracked: Vec<ComponentId>,
}

impl ExportReport {
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            exported: Vec::new(),
            untracked: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.exported.len() + self.untracked.len()
    }

    pub fn messages(&self) -> Vec<String> {
        if self.total() == 0 {
            return vec![NOTHING_TO_TAG_OR_EXPORT.to_string()];
        }
        let mut messages = vec![format!("exported {} components to {}", self.total(), self.remote)];
        if self.exported.is_empty() {
            messages.push(NO_LOCAL_CHANGES.to_string());
        } else if !self.untracked.is_empty() {
            messages.push(format!(
                "{} of them are not tracked by this workspace; {NO_LOCAL_CHANGES} for those",
                self.untracked.len()
            ));
        }
        messages
    }
}
