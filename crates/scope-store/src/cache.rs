//! Metadata cache: version histories and build outputs.
//!
//! The version history of a `namespace/name` is the scope's record of every
//! version ever tagged for it and where each was exported. Reconciliation
//! treats it as ground truth, so an unreadable history is an error rather
//! than an empty one.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use scope_types::{ComponentId, ObjectId, Version};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::fs::{read_json, remove_file_if_exists, write_atomic, write_json};

const HISTORY_DIR: &str = "history";
const DIST_DIR: &str = "dist";

/// What the scope knows about one tagged version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// Remote alias the version was pushed to. `None` while staged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_to: Option<String>,
    /// Digests of the tagged files, keyed `impl/<name>` / `spec/<name>`.
    #[serde(default)]
    pub files: BTreeMap<String, ObjectId>,
    pub tagged_at: DateTime<Utc>,
}

impl VersionRecord {
    pub fn is_exported(&self) -> bool {
        self.exported_to.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionHistory {
    #[serde(default)]
    pub versions: BTreeMap<Version, VersionRecord>,
}

impl VersionHistory {
    pub fn versions(&self) -> BTreeSet<Version> {
        self.versions.keys().copied().collect()
    }

    pub fn latest(&self) -> Option<(Version, &VersionRecord)> {
        self.versions.iter().next_back().map(|(v, r)| (*v, r))
    }

    pub fn record(&self, version: &Version) -> Option<&VersionRecord> {
        self.versions.get(version)
    }

    pub fn insert(&mut self, version: Version, files: BTreeMap<String, ObjectId>) {
        self.versions.insert(
            version,
            VersionRecord {
                exported_to: None,
                files,
                tagged_at: Utc::now(),
            },
        );
    }

    /// Returns `false` if the version is unknown.
    pub fn mark_exported(&mut self, version: &Version, remote: &str) -> bool {
        match self.versions.get_mut(version) {
            Some(record) => {
                record.exported_to = Some(remote.to_string());
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, version: &Version) -> Option<VersionRecord> {
        self.versions.remove(version)
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct CacheArea {
    root: PathBuf,
}

impl CacheArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure(&self) -> StoreResult<()> {
        std::fs::create_dir_all(self.root.join(HISTORY_DIR))?;
        std::fs::create_dir_all(self.root.join(DIST_DIR))?;
        Ok(())
    }

    fn history_path(&self, id: &ComponentId) -> PathBuf {
        self.root
            .join(HISTORY_DIR)
            .join(&id.namespace)
            .join(format!("{}.json", id.name))
    }

    /// `Ok(None)` when nothing was ever tagged; `CorruptRecord` when the
    /// record exists but cannot be read back.
    pub fn read_history(&self, id: &ComponentId) -> StoreResult<Option<VersionHistory>> {
        read_json(&self.history_path(id))
    }

    /// Persist a history. An empty history removes the record.
    pub fn write_history(&self, id: &ComponentId, history: &VersionHistory) -> StoreResult<()> {
        let path = self.history_path(id);
        if history.is_empty() {
            remove_file_if_exists(&path)?;
            return Ok(());
        }
        write_json(&path, history)
    }

    /// Every `namespace/name` with a history record, sorted.
    pub fn list(&self) -> StoreResult<Vec<ComponentId>> {
        let dir = self.root.join(HISTORY_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in walkdir::WalkDir::new(&dir).min_depth(2).max_depth(2) {
            let entry = entry.map_err(|e| StoreError::Walk {
                path: dir.clone(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let (Some(name), Some(namespace)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.parent().and_then(|p| p.file_name()).and_then(|s| s.to_str()),
            ) else {
                continue;
            };
            if name.starts_with('.') || namespace.starts_with('.') {
                continue;
            }
            ids.push(ComponentId::new(namespace, name));
        }
        ids.sort();
        Ok(ids)
    }

    pub fn dist_dir(&self, id: &ComponentId) -> StoreResult<PathBuf> {
        let version = id
            .exact_version()
            .ok_or_else(|| StoreError::Unversioned(id.to_string()))?;
        Ok(self
            .root
            .join(DIST_DIR)
            .join(&id.namespace)
            .join(&id.name)
            .join(version.to_string()))
    }

    /// Store build outputs for a tagged version, replacing earlier ones.
    pub fn write_dist(&self, id: &ComponentId, outputs: &BTreeMap<String, Vec<u8>>) -> StoreResult<PathBuf> {
        let dir = self.dist_dir(id)?;
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        for (name, bytes) in outputs {
            write_atomic(&dir.join(name), bytes)?;
        }
        Ok(dir)
    }
}
