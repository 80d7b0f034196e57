use std::collections::BTreeMap;
use std::path::Path;

use scope_types::ComponentId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DepsError, DepsResult};

/// File name of the dependency map inside a scope.
pub const DEPENDENCY_MAP_FILE: &str = "dependencies.json";

/// The edge set recorded for one stored component.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdges {
    /// Resolved, pinned dependency ids. Sorted and free of duplicates.
    #[serde(default)]
    pub dependencies: Vec<ComponentId>,
    /// Dependency id string -> remote alias it is fetched from.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub remotes: BTreeMap<String, String>,
}

impl DependencyEdges {
    /// Dependency ids in the order they were recorded.
    pub fn get_bit_ids(&self) -> &[ComponentId] {
        &self.dependencies
    }

    /// Every dependency paired with the remote it originates from, `None`
    /// for dependencies this scope resolves itself.
    pub fn get_remotes(&self) -> Vec<(ComponentId, Option<String>)> {
        self.dependencies
            .iter()
            .map(|id| (id.clone(), self.remote_of(id).map(str::to_string)))
            .collect()
    }

    pub fn remote_of(&self, id: &ComponentId) -> Option<&str> {
        self.remotes.get(&id.to_string()).map(String::as_str)
    }
}

/// Owned `id@version` -> [`DependencyEdges`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyMap {
    entries: BTreeMap<String, DependencyEdges>,
}

fn key_of(id: &ComponentId) -> DepsResult<String> {
    if !id.is_local() || id.exact_version().is_none() {
        return Err(DepsError::InvalidKey(id.to_string()));
    }
    Ok(id.to_string())
}

impl DependencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruct from raw file contents. Empty input yields an empty map.
    pub fn load(raw: &[u8]) -> DepsResult<Self> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }
        serde_json::from_slice(raw).map_err(|e| DepsError::Malformed(e.to_string()))
    }

    /// Read the map at `path`; a missing file yields an empty map.
    pub fn read(path: &Path) -> DepsResult<Self> {
        match std::fs::read(path) {
            Ok(raw) => Self::load(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Rewrite the whole file.
    pub fn write(&self, path: &Path) -> DepsResult<()> {
        scope_store::write_json(path, self)?;
        debug!(entries = self.entries.len(), path = %path.display(), "flushed dependency map");
        Ok(())
    }

    /// Record the dependencies resolved for `component` when it was stored.
    ///
    /// Dependencies owned by another scope are associated with that scope's
    /// alias; local ones carry no remote.
    pub fn set_bit(&mut self, component: &ComponentId, resolved: &[ComponentId]) -> DepsResult<()> {
        let key = key_of(component)?;
        let mut dependencies: Vec<ComponentId> = resolved.to_vec();
        dependencies.sort();
        dependencies.dedup();
        let remotes = dependencies
            .iter()
            .filter_map(|d| d.scope.clone().map(|alias| (d.to_string(), alias)))
            .collect();
        self.entries.insert(
            key,
            DependencyEdges {
                dependencies,
                remotes,
            },
        );
        Ok(())
    }

    /// The edges recorded for `id`, or `None` if this scope does not own it.
    pub fn get(&self, id: &ComponentId) -> Option<&DependencyEdges> {
        let key = key_of(id).ok()?;
        self.entries.get(&key)
    }

    pub fn remove(&mut self, id: &ComponentId) -> Option<DependencyEdges> {
        let key = key_of(id).ok()?;
        self.entries.remove(&key)
    }

    /// Owned ids whose recorded dependencies include `dependency`.
    pub fn dependents_of(&self, dependency: &ComponentId) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, edges)| edges.dependencies.contains(dependency))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
