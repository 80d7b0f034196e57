//! Reading component directories in the workspace.

use std::collections::BTreeMap;
use std::path::Path;

use scope_types::{
    digest_files, validate_file_name, Component, ComponentId, Manifest, ObjectId, TypeError, MANIFEST_FILE,
};

use crate::error::WorkspaceResult;

/// The manifest of a component directory and the files it names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceFiles {
    pub manifest: Manifest,
    pub impl_files: BTreeMap<String, Vec<u8>>,
    pub spec_files: BTreeMap<String, Vec<u8>>,
}

impl WorkspaceFiles {
    /// Read `dir`. `None` when the directory, its manifest or its
    /// implementation file does not exist. File names the manifest gives
    /// must stay inside `dir`.
    pub fn read(dir: &Path) -> WorkspaceResult<Option<Self>> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Ok(None);
        }
        let manifest = Manifest::from_json(&std::fs::read(&manifest_path)?)?;
        for name in std::iter::once(&manifest.impl_file).chain(manifest.spec_file.as_ref()) {
            validate_file_name(name).map_err(|reason| TypeError::Validation {
                id: dir.display().to_string(),
                reason,
            })?;
        }
        let Some(implementation) = read_if_file(dir, &manifest.impl_file)? else {
            return Ok(None);
        };
        let impl_files = BTreeMap::from([(manifest.impl_file.clone(), implementation)]);
        let mut spec_files = BTreeMap::new();
        if let Some(spec) = &manifest.spec_file {
            if let Some(bytes) = read_if_file(dir, spec)? {
                spec_files.insert(spec.clone(), bytes);
            }
        }
        Ok(Some(Self {
            manifest,
            impl_files,
            spec_files,
        }))
    }

    /// Digests comparable with a version record.
    pub fn digests(&self) -> BTreeMap<String, ObjectId> {
        digest_files(&self.impl_files, &self.spec_files)
    }

    pub fn dependency_ids(&self) -> Result<Vec<ComponentId>, TypeError> {
        self.manifest.dependency_ids()
    }

    pub fn into_component(self, id: ComponentId) -> Result<Component, TypeError> {
        Component::new(id, self.manifest, self.impl_files, self.spec_files)
    }
}

fn read_if_file(dir: &Path, name: &str) -> WorkspaceResult<Option<Vec<u8>>> {
    let path = dir.join(name);
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Some(std::fs::read(path)?))
}
