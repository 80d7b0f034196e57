//! Per-version component storage rooted at one directory.
//!
//! Layout: `<root>/<ns>/<name>/<version>.json` for records and
//! `<root>/<ns>/<name>/objects/..` for the blobs they reference. The scope's
//! source store and each external origin are one `ComponentArea` apiece.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use scope_types::{Component, ComponentId, Version};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::{StoreError, StoreResult};
use crate::fs::{read_json, remove_file_if_exists, write_json, FsObjectStore};
use crate::record::ComponentRecord;

const OBJECTS_DIR: &str = "objects";
const RECORD_EXT: &str = "json";

#[derive(Clone, Debug)]
pub struct ComponentArea {
    root: PathBuf,
}

impl ComponentArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure(&self) -> StoreResult<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn component_dir(&self, id: &ComponentId) -> PathBuf {
        self.root.join(&id.namespace).join(&id.name)
    }

    fn objects(&self, id: &ComponentId) -> FsObjectStore {
        FsObjectStore::new(self.component_dir(id).join(OBJECTS_DIR))
    }

    fn record_path(&self, id: &ComponentId) -> StoreResult<PathBuf> {
        let version = id
            .exact_version()
            .ok_or_else(|| StoreError::Unversioned(id.to_string()))?;
        Ok(self.component_dir(id).join(format!("{version}.{RECORD_EXT}")))
    }

    /// Persist a component at its exact version, overwriting any previous copy.
    pub fn set(&self, component: &Component) -> StoreResult<ComponentRecord> {
        let path = self.record_path(&component.id)?;
        let record = ComponentRecord::store(component, &self.objects(&component.id))?;
        write_json(&path, &record)?;
        debug!(id = %component.id, path = %path.display(), "stored component");
        Ok(record)
    }

    pub fn record(&self, id: &ComponentId) -> StoreResult<Option<ComponentRecord>> {
        read_json(&self.record_path(id)?)
    }

    /// Load a component with its file contents. `Ok(None)` if not stored.
    pub fn load(&self, id: &ComponentId) -> StoreResult<Option<Component>> {
        match self.record(id)? {
            Some(record) => Ok(Some(record.hydrate(&self.objects(id))?)),
            None => Ok(None),
        }
    }

    pub fn contains(&self, id: &ComponentId) -> StoreResult<bool> {
        Ok(self.record_path(id)?.is_file())
    }

    /// Versions stored for `id`'s namespace/name, whatever version `id` names.
    pub fn versions(&self, id: &ComponentId) -> StoreResult<BTreeSet<Version>> {
        let dir = self.component_dir(id);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };
        let mut versions = BTreeSet::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            if let Some(version) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<Version>().ok())
            {
                versions.insert(version);
            }
        }
        Ok(versions)
    }

    /// Remove one stored version. Once no versions remain, the component
    /// directory and its blobs go too. Returns `true` if the version existed.
    pub fn clean(&self, id: &ComponentId) -> StoreResult<bool> {
        let removed = remove_file_if_exists(&self.record_path(id)?)?;
        if self.versions(id)?.is_empty() {
            let dir = self.component_dir(id);
            if dir.exists() {
                std::fs::remove_dir_all(&dir)?;
            }
            let ns_dir = self.root.join(&id.namespace);
            if ns_dir.read_dir().map(|mut d| d.next().is_none()).unwrap_or(false) {
                std::fs::remove_dir(&ns_dir)?;
            }
        }
        if removed {
            debug!(id = %id, "removed component version");
        }
        Ok(removed)
    }

    /// The stored `namespace/name` pairs as a restartable walk.
    pub fn walk(&self) -> ComponentWalk {
        ComponentWalk {
            root: self.root.clone(),
        }
    }
}

/// A restartable, lazy enumeration of the components in an area.
///
/// Every call to [`ComponentWalk::iter`] re-reads the directory tree, so the
/// sequence reflects the area at the time iteration starts.
#[derive(Clone, Debug)]
pub struct ComponentWalk {
    root: PathBuf,
}

impl ComponentWalk {
    pub fn iter(&self) -> ComponentIds {
        let inner = self.root.is_dir().then(|| {
            WalkDir::new(&self.root)
                .min_depth(2)
                .max_depth(2)
                .sort_by_file_name()
                .into_iter()
        });
        ComponentIds {
            root: self.root.clone(),
            inner,
        }
    }
}

impl<'a> IntoIterator for &'a ComponentWalk {
    type Item = StoreResult<ComponentId>;
    type IntoIter = ComponentIds;

    fn into_iter(self) -> ComponentIds {
        self.iter()
    }
}

fn hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Iterator over unversioned identifiers, produced by [`ComponentWalk`].
pub struct ComponentIds {
    root: PathBuf,
    inner: Option<walkdir::IntoIter>,
}

impl Iterator for ComponentIds {
    type Item = StoreResult<ComponentId>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.as_mut()?;
        loop {
            let entry: DirEntry = match inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(Err(StoreError::Walk {
                        path: self.root.clone(),
                        reason: e.to_string(),
                    }))
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let namespace = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if hidden(&name) || hidden(&namespace) {
                continue;
            }
            return Some(format!("{namespace}/{name}").parse().map_err(StoreError::from));
        }
    }
}
