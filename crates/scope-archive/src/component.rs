//! Packing components into archives and back.

use std::collections::BTreeMap;

use scope_types::{Component, ComponentId, Manifest};
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, ArchiveResult};
use crate::Archive;

const IMPL_PREFIX: &str = "impl/";
const SPEC_PREFIX: &str = "spec/";

/// Contents of the manifest entry of a component archive.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentHeader {
    id: ComponentId,
    manifest: Manifest,
    #[serde(default)]
    dependencies: Vec<ComponentId>,
    #[serde(default)]
    impl_files: Vec<String>,
    #[serde(default)]
    spec_files: Vec<String>,
}

/// Bundle a component, named by its identifier.
pub fn pack_component(component: &Component) -> ArchiveResult<Archive> {
    let header = ComponentHeader {
        id: component.id.clone(),
        manifest: component.manifest.clone(),
        dependencies: component.dependencies.clone(),
        impl_files: component.impl_files.keys().cloned().collect(),
        spec_files: component.spec_files.keys().cloned().collect(),
    };
    let manifest =
        serde_json::to_vec(&header).map_err(|e| ArchiveError::Serialization(e.to_string()))?;

    let mut files = BTreeMap::new();
    for (name, bytes) in &component.impl_files {
        files.insert(format!("{IMPL_PREFIX}{name}"), bytes.clone());
    }
    for (name, bytes) in &component.spec_files {
        files.insert(format!("{SPEC_PREFIX}{name}"), bytes.clone());
    }
    Ok(Archive {
        name: component.id.to_string(),
        manifest,
        files,
    })
}

/// Rebuild a component from an archive produced by [`pack_component`].
pub fn unpack_component(archive: &Archive) -> ArchiveResult<Component> {
    let header: ComponentHeader = serde_json::from_slice(&archive.manifest)
        .map_err(|e| ArchiveError::Serialization(e.to_string()))?;

    let take = |prefix: &str, names: &[String]| -> ArchiveResult<BTreeMap<String, Vec<u8>>> {
        names
            .iter()
            .map(|name| {
                let key = format!("{prefix}{name}");
                let bytes = archive.files.get(&key).ok_or_else(|| ArchiveError::CorruptEntry {
                    offset: 0,
                    reason: format!("{} lists {key} but does not contain it", archive.name),
                })?;
                Ok((name.clone(), bytes.clone()))
            })
            .collect()
    };
    let impl_files = take(IMPL_PREFIX, &header.impl_files)?;
    let spec_files = take(SPEC_PREFIX, &header.spec_files)?;

    let listed = impl_files.len() + spec_files.len();
    if archive.files.len() != listed {
        let extra = archive
            .files
            .keys()
            .find(|k| {
                let known_impl = k.strip_prefix(IMPL_PREFIX).is_some_and(|n| impl_files.contains_key(n));
                let known_spec = k.strip_prefix(SPEC_PREFIX).is_some_and(|n| spec_files.contains_key(n));
                !(known_impl || known_spec)
            })
            .cloned()
            .unwrap_or_default();
        return Err(ArchiveError::UnexpectedEntry {
            archive: archive.name.clone(),
            entry: extra,
        });
    }

    Ok(Component {
        id: header.id,
        manifest: header.manifest,
        impl_files,
        spec_files,
        dependencies: header.dependencies,
    })
}
