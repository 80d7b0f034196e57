use std::collections::BTreeMap;

use scope_types::{Component, ComponentId, Manifest, ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// On-disk form of a stored component: metadata plus blob references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub id: ComponentId,
    pub manifest: Manifest,
    pub impl_files: BTreeMap<String, ObjectId>,
    #[serde(default)]
    pub spec_files: BTreeMap<String, ObjectId>,
    #[serde(default)]
    pub dependencies: Vec<ComponentId>,
}

impl ComponentRecord {
    /// Write every file of `component` into `objects` and describe it.
    pub fn store(component: &Component, objects: &dyn ObjectStore) -> StoreResult<Self> {
        let write_all = |files: &BTreeMap<String, Vec<u8>>| -> StoreResult<BTreeMap<String, ObjectId>> {
            files
                .iter()
                .map(|(name, bytes)| Ok((name.clone(), objects.write(bytes)?)))
                .collect()
        };
        Ok(Self {
            id: component.id.clone(),
            manifest: component.manifest.clone(),
            impl_files: write_all(&component.impl_files)?,
            spec_files: write_all(&component.spec_files)?,
            dependencies: component.dependencies.clone(),
        })
    }

    /// Rebuild the component by reading its blobs back.
    pub fn hydrate(&self, objects: &dyn ObjectStore) -> StoreResult<Component> {
        let read_all = |files: &BTreeMap<String, ObjectId>| -> StoreResult<BTreeMap<String, Vec<u8>>> {
            files
                .iter()
                .map(|(name, id)| {
                    let bytes = objects.read(id)?.ok_or(StoreError::MissingObject(*id))?;
                    Ok((name.clone(), bytes))
                })
                .collect()
        };
        Ok(Component {
            id: self.id.clone(),
            manifest: self.manifest.clone(),
            impl_files: read_all(&self.impl_files)?,
            spec_files: read_all(&self.spec_files)?,
            dependencies: self.dependencies.clone(),
        })
    }

    /// Digests keyed the same way as [`Component::file_digests`].
    pub fn file_digests(&self) -> BTreeMap<String, ObjectId> {
        let impl_files = self.impl_files.iter().map(|(n, id)| (format!("impl/{n}"), *id));
        let spec_files = self.spec_files.iter().map(|(n, id)| (format!("spec/{n}"), *id));
        impl_files.chain(spec_files).collect()
    }
}
