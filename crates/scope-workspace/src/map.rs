//! The workspace map (`.scopemap`).
//!
//! Records, per tracked component directory, the identifier the workspace
//! believes it has and whether that version was exported. The map is intent
//! only: reconciliation rewrites it from the scope's version history.

use std::collections::BTreeMap;
use std::path::Path;

use scope_types::ComponentId;
use serde::{Deserialize, Serialize};

use crate::entry::MapEntry;
use crate::error::{WorkspaceError, WorkspaceResult};

/// File name of the workspace map in the workspace root.
pub const WORKSPACE_MAP_FILE: &str = ".scopemap";

/// Identifier string -> [`MapEntry`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceMap {
    entries: BTreeMap<String, MapEntry>,
}

impl WorkspaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the map at `path`; a missing file is an empty map.
    pub fn read(path: &Path) -> WorkspaceResult<Self> {
        match scope_store::read_json(path) {
            Ok(Some(map)) => Ok(map),
            Ok(None) => Ok(Self::new()),
            Err(e) => Err(WorkspaceError::Serialization(e.to_string())),
        }
    }

    pub fn write(&self, path: &Path) -> WorkspaceResult<()> {
        scope_store::write_json(path, self)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&MapEntry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: MapEntry) -> Option<MapEntry> {
        self.entries.insert(key.into(), entry)
    }

    pub fn remove(&mut self, key: &str) -> Option<MapEntry> {
        self.entries.remove(key)
    }

    /// The entry tracking `id`'s namespace/name, whatever its version or origin.
    pub fn find(&self, id: &ComponentId) -> Option<(&str, &MapEntry)> {
        self.entries
            .iter()
            .find(|(key, _)| {
                key.parse::<ComponentId>()
                    .is_ok_and(|tracked| tracked.same_component(id))
            })
            .map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MapEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
