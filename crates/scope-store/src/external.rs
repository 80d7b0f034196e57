use std::path::{Path, PathBuf};

use scope_types::{Component, ComponentId, TypeError};

use crate::area::ComponentArea;
use crate::error::StoreResult;

/// Cache of components owned by other scopes, one [`ComponentArea`] per origin.
#[derive(Clone, Debug)]
pub struct ExternalStore {
    root: PathBuf,
}

impl ExternalStore {
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

    fn area_for(&self, id: &ComponentId) -> StoreResult<ComponentArea> {
        let origin = id.scope.as_deref().ok_or_else(|| TypeError::InvalidId {
            id: id.to_string(),
            reason: "external components must name their origin scope".into(),
        })?;
        Ok(ComponentArea::new(self.root.join(origin)))
    }

    pub fn set(&self, component: &Component) -> StoreResult<()> {
        self.area_for(&component.id)?.set(component)?;
        Ok(())
    }

    pub fn load(&self, id: &ComponentId) -> StoreResult<Option<Component>> {
        self.area_for(id)?.load(id)
    }

    pub fn contains(&self, id: &ComponentId) -> StoreResult<bool> {
        self.area_for(id)?.contains(id)
    }
}
