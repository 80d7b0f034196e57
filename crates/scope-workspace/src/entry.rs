//! Workspace map entries.

use serde::{Deserialize, Serialize};

use crate::reconcile::Resolution;

/// A tracked component directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    /// Component directory, relative to the workspace root.
    pub root: String,
    /// Whether the tracked version has been pushed to a remote.
    #[serde(default)]
    pub exported: bool,
}

impl MapEntry {
    /// Create an entry for a component that was never exported.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            exported: false,
        }
    }

    /// The entry as the scope's history says it should read.
    pub fn resynced(&self, resolution: &Resolution) -> Self {
        let exported = match resolution {
            Resolution::ImportPending => self.exported,
            Resolution::New => false,
            Resolution::Tagged { exported_to, .. } => exported_to.is_some(),
        };
        Self {
            root: self.root.clone(),
            exported,
        }
    }
}
