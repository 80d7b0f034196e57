//! Components and their manifests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::ComponentId;
use crate::object::ObjectId;

/// File name of the manifest inside a component directory and an archive.
pub const MANIFEST_FILE: &str = "component.json";

/// Declared metadata of a component.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Implementation entry file.
    #[serde(rename = "impl")]
    pub impl_file: String,
    /// Spec (test) entry file.
    #[serde(rename = "spec", default, skip_serializing_if = "Option::is_none")]
    pub spec_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tester: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Remotes the component itself declares, alias -> address.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub remotes: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new(impl_file: impl Into<String>) -> Self {
        Self {
            impl_file: impl_file.into(),
            ..Self::default()
        }
    }

    pub fn from_json(raw: &[u8]) -> Result<Self, TypeError> {
        serde_json::from_slice(raw).map_err(|e| TypeError::Validation {
            id: MANIFEST_FILE.into(),
            reason: format!("malformed manifest: {e}"),
        })
    }

    /// Declared dependencies as identifiers.
    pub fn dependency_ids(&self) -> Result<Vec<ComponentId>, TypeError> {
        self.dependencies.iter().map(|d| d.parse()).collect()
    }

    pub fn compiler_id(&self) -> Result<Option<ComponentId>, TypeError> {
        self.compiler.as_deref().map(str::parse).transpose()
    }
}

/// A named, versioned unit of code.
///
/// Immutable once constructed; the repository engine owns any side effects
/// such as building or storing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    pub id: ComponentId,
    pub manifest: Manifest,
    pub impl_files: BTreeMap<String, Vec<u8>>,
    pub spec_files: BTreeMap<String, Vec<u8>>,
    pub dependencies: Vec<ComponentId>,
}

impl Component {
    /// Build a component whose dependency list comes from the manifest.
    pub fn new(
        id: ComponentId,
        manifest: Manifest,
        impl_files: BTreeMap<String, Vec<u8>>,
        spec_files: BTreeMap<String, Vec<u8>>,
    ) -> Result<Self, TypeError> {
        let dependencies = manifest.dependency_ids()?;
        Ok(Self {
            id,
            manifest,
            impl_files,
            spec_files,
            dependencies,
        })
    }

    pub fn has_compiler(&self) -> bool {
        self.manifest.compiler.is_some()
    }

    /// Content digests of every file, keyed `impl/<name>` and `spec/<name>`.
    pub fn file_digests(&self) -> BTreeMap<String, ObjectId> {
        digest_files(&self.impl_files, &self.spec_files)
    }

    /// Structural validation run before a component is stored.
    pub fn validate(&self) -> Result<(), TypeError> {
        let fail = |reason: String| TypeError::Validation {
            id: self.id.to_string(),
            reason,
        };

        if self.id.exact_version().is_none() {
            return Err(fail("a stored component must carry an exact version".into()));
        }
        if self.manifest.impl_file.is_empty() {
            return Err(fail("manifest does not name an implementation file".into()));
        }
        if !self.impl_files.contains_key(&self.manifest.impl_file) {
            return Err(fail(format!(
                "implementation file {} is missing",
                self.manifest.impl_file
            )));
        }
        if let Some(spec) = &self.manifest.spec_file {
            if !self.spec_files.contains_key(spec) {
                return Err(fail(format!("spec file {spec} is missing")));
            }
        }
        for name in self.impl_files.keys().chain(self.spec_files.keys()) {
            validate_file_name(name).map_err(fail)?;
        }
        for reference in [&self.manifest.compiler, &self.manifest.tester].into_iter().flatten() {
            reference
                .parse::<ComponentId>()
                .map_err(|e| fail(format!("bad plugin reference: {e}")))?;
        }
        if self.dependencies.iter().any(|d| d.same_component(&self.id) && d.scope == self.id.scope) {
            return Err(fail("a component cannot depend on itself".into()));
        }
        Ok(())
    }
}

/// Digest implementation and spec files the way [`Component::file_digests`] does.
pub fn digest_files(
    impl_files: &BTreeMap<String, Vec<u8>>,
    spec_files: &BTreeMap<String, Vec<u8>>,
) -> BTreeMap<String, ObjectId> {
    let impls = impl_files
        .iter()
        .map(|(name, data)| (format!("impl/{name}"), ObjectId::digest(data)));
    let specs = spec_files
        .iter()
        .map(|(name, data)| (format!("spec/{name}"), ObjectId::digest(data)));
    impls.chain(specs).collect()
}

/// A file name a manifest may use: relative, non-empty, no `..` parts.
pub fn validate_file_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("file names must not be empty".into());
    }
    if name.starts_with('/') || name.starts_with('\\') {
        return Err(format!("file name {name} must be relative"));
    }
    if name.split(['/', '\\']).any(|part| part == ".." || part.is_empty()) {
        return Err(format!("file name {name} is not a clean relative path"));
    }
    Ok(())
}
