use std::path::Path;

use scope_remote::Remotes;
use scope_store::{read_json, write_json};
use serde::{Deserialize, Serialize};

use crate::error::ScopeResult;

pub const SCOPE_META_FILE: &str = "scope.json";

/// Contents of `scope.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeMeta {
    pub name: String,
    /// The scope's own remote table.
    #[serde(default)]
    pub remotes: Remotes,
}

impl ScopeMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remotes: Remotes::new(),
        }
    }

    /// Read `scope.json` under `root`. A missing file yields `None`.
    pub fn read(root: &Path) -> ScopeResult<Option<Self>> {
        Ok(read_json(&root.join(SCOPE_META_FILE))?)
    }

    pub fn write(&self, root: &Path) -> ScopeResult<()> {
        write_json(&root.join(SCOPE_META_FILE), self)?;
        Ok(())
    }
}

/// Name for a scope rooted at `path`: its directory name, or the parent's
/// when the scope lives in a hidden directory such as `.scope`.
pub fn default_name(path: &Path) -> String {
    let name = |p: &Path| p.file_name().map(|n| n.to_string_lossy().into_owned());
    match name(path) {
        Some(n) if !n.starts_with('.') => n,
        _ => path.parent().and_then(name).unwrap_or_else(|| "scope".into()),
    }
}
