//! Component identifiers: `[scope/]namespace/name[@version]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::version::{Version, VersionSpec};

/// Characters that may not appear in any identifier segment.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '@', ':', '\\', '*', '?'];

/// Identifies a component, optionally pinned to a version and optionally owned
/// by another scope.
///
/// Identifiers without an origin scope are local to the scope that resolves
/// them. Equality is structural (version included); use
/// [`ComponentId::same_component`] to compare ignoring version and origin.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    pub scope: Option<String>,
    pub namespace: String,
    pub name: String,
    pub version: Option<VersionSpec>,
}

impl ComponentId {
    /// A local, unversioned identifier.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: None,
            namespace: namespace.into(),
            name: name.into(),
            version: None,
        }
    }

    pub fn is_local(&self) -> bool {
        self.scope.is_none()
    }

    /// Same `namespace/name`, whatever the version or origin.
    pub fn same_component(&self, other: &ComponentId) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }

    /// The `namespace/name` key used by per-component storage.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    /// The pinned version, if any.
    pub fn exact_version(&self) -> Option<Version> {
        self.version.and_then(|v| v.exact())
    }

    pub fn with_version(&self, version: Version) -> Self {
        Self {
            version: Some(VersionSpec::Exact(version)),
            ..self.clone()
        }
    }

    pub fn without_version(&self) -> Self {
        Self {
            version: None,
            ..self.clone()
        }
    }

    pub fn with_scope(&self, scope: Option<String>) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    pub fn to_local(&self) -> Self {
        self.with_scope(None)
    }
}

fn validate_segment(id: &str, segment: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidId {
        id: id.to_string(),
        reason: reason.to_string(),
    };
    if segment.is_empty() {
        return Err(invalid("segments must not be empty"));
    }
    if segment.starts_with('.') {
        return Err(invalid("segments must not start with '.'"));
    }
    if segment.contains("..") {
        return Err(invalid("segments must not contain '..'"));
    }
    if let Some(ch) = segment.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(&format!("contains forbidden character {ch:?}")));
    }
    Ok(())
}

impl FromStr for ComponentId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, version) = match s.split_once('@') {
            Some((path, version)) => (path, Some(version.parse::<VersionSpec>()?)),
            None => (s, None),
        };
        let segments: Vec<&str> = path.split('/').collect();
        for segment in &segments {
            validate_segment(s, segment)?;
        }
        let (scope, namespace, name) = match segments.as_slice() {
            [namespace, name] => (None, *namespace, *name),
            [scope, namespace, name] => (Some(scope.to_string()), *namespace, *name),
            _ => {
                return Err(TypeError::InvalidId {
                    id: s.to_string(),
                    reason: "expected [scope/]namespace/name".into(),
                })
            }
        };
        Ok(Self {
            scope,
            namespace: namespace.to_string(),
            name: name.to_string(),
            version,
        })
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "{scope}/")?;
        }
        write!(f, "{}/{}", self.namespace, self.name)?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({self})")
    }
}

impl Serialize for ComponentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ComponentId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_local_unversioned() {
        let id: ComponentId = "bar/foo".parse().unwrap();
        assert!(id.is_local());
        assert_eq!(id.namespace, "bar");
        assert_eq!(id.name, "foo");
        assert_eq!(id.version, None);
        assert_eq!(id.to_string(), "bar/foo");
    }

    #[test]
    fn parse_scoped_versioned() {
        let id: ComponentId = "origin/bar/foo@0.0.1".parse().unwrap();
        assert_eq!(id.scope.as_deref(), Some("origin"));
        assert_eq!(id.exact_version(), Some(Version::new(0, 0, 1)));
        assert_eq!(id.to_string(), "origin/bar/foo@0.0.1");
    }

    #[test]
    fn parse_latest() {
        let id: ComponentId = "bar/foo@latest".parse().unwrap();
        assert_eq!(id.version, Some(VersionSpec::Latest));
        assert_eq!(id.exact_version(), None);
    }

    #[test]
    fn reject_malformed() {
        for bad in ["foo", "a/b/c/d", "bar//foo", "bar/.foo", "bar/fo o", "bar/foo@1.2", "/bar/foo"] {
            assert!(bad.parse::<ComponentId>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn same_component_ignores_version_and_scope() {
        let a: ComponentId = "bar/foo@0.0.1".parse().unwrap();
        let b: ComponentId = "origin/bar/foo@0.0.2".parse().unwrap();
        let c: ComponentId = "bar/baz@0.0.1".parse().unwrap();
        assert!(a.same_component(&b));
        assert!(!a.same_component(&c));
        assert_ne!(a, b);
    }

    #[test]
    fn version_and_scope_helpers() {
        let id: ComponentId = "bar/foo".parse().unwrap();
        let pinned = id.with_version(Version::new(1, 0, 0));
        assert_eq!(pinned.to_string(), "bar/foo@1.0.0");
        assert_eq!(pinned.without_version(), id);
        let remote = pinned.with_scope(Some("origin".into()));
        assert_eq!(remote.to_string(), "origin/bar/foo@1.0.0");
        assert_eq!(remote.to_local(), pinned);
        assert_eq!(remote.key(), "bar/foo");
    }

    #[test]
    fn serde_as_string() {
        let id: ComponentId = "origin/bar/foo@0.0.1".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"origin/bar/foo@0.0.1\"");
        assert_eq!(serde_json::from_str::<ComponentId>(&json).unwrap(), id);
    }
}
