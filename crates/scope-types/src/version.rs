//! Semantic versions and the resolver that maps requests onto a history.
//!
//! A history is the set of distinct versions a scope has recorded for one
//! `namespace/name`. Ordering is plain major.minor.patch precedence, so two
//! distinct versions never compare equal and "latest" is always well defined.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::ComponentId;

/// Version assigned to the first tag of a component.
pub const INITIAL_VERSION: Version = Version::new(0, 0, 1);

/// A `major.minor.patch` version.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Apply a bump, ignoring any history. `None` when the bumped field
    /// would overflow.
    pub fn bump(&self, bump: &VersionBump) -> Option<Self> {
        match bump {
            VersionBump::Major => Some(Self::new(self.major.checked_add(1)?, 0, 0)),
            VersionBump::Minor => Some(Self::new(self.major, self.minor.checked_add(1)?, 0)),
            VersionBump::Patch => Some(Self::new(self.major, self.minor, self.patch.checked_add(1)?)),
            VersionBump::Explicit(v) => Some(*v),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({self})")
    }
}

impl FromStr for Version {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let mut next = || -> Result<u64, TypeError> {
            let part = parts
                .next()
                .ok_or_else(|| TypeError::InvalidVersion(s.to_string()))?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TypeError::InvalidVersion(s.to_string()));
            }
            part.parse()
                .map_err(|_| TypeError::InvalidVersion(s.to_string()))
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(TypeError::InvalidVersion(s.to_string()));
        }
        Ok(version)
    }
}

// Versions are map keys in the history records, so they go through serde as
// plain strings.
impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The version part of an identifier: either pinned or `latest`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VersionSpec {
    Latest,
    Exact(Version),
}

impl VersionSpec {
    pub fn exact(&self) -> Option<Version> {
        match self {
            Self::Latest => None,
            Self::Exact(v) => Some(*v),
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Exact(v) => write!(f, "{v}"),
        }
    }
}

impl FromStr for VersionSpec {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "latest" {
            Ok(Self::Latest)
        } else {
            s.parse().map(Self::Exact)
        }
    }
}

/// How the next version is derived when tagging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
    Explicit(Version),
}

impl Default for VersionBump {
    fn default() -> Self {
        Self::Patch
    }
}

/// Resolve the version an identifier refers to against `history`.
///
/// An unversioned identifier is treated as `latest`.
pub fn resolve_version(id: &ComponentId, history: &BTreeSet<Version>) -> Result<Version, TypeError> {
    match id.version.unwrap_or(VersionSpec::Latest) {
        VersionSpec::Latest => history
            .last()
            .copied()
            .ok_or_else(|| TypeError::ComponentNotFound(id.to_string())),
        VersionSpec::Exact(v) if history.contains(&v) => Ok(v),
        VersionSpec::Exact(v) => Err(TypeError::VersionNotFound {
            id: id.without_version().to_string(),
            version: v.to_string(),
        }),
    }
}

/// Compute the version the next tag receives.
///
/// The result is always strictly greater than `max(history)`. An empty history
/// yields [`INITIAL_VERSION`] for relative bumps; an explicit version is taken
/// as-is on an empty history.
pub fn next_version(history: &BTreeSet<Version>, bump: &VersionBump) -> Result<Version, TypeError> {
    let Some(current) = history.last() else {
        return Ok(match bump {
            VersionBump::Explicit(v) => *v,
            _ => INITIAL_VERSION,
        });
    };
    let next = current.bump(bump).ok_or_else(|| TypeError::VersionOverflow(current.to_string()))?;
    if next <= *current {
        return Err(TypeError::VersionNotGreater {
            requested: next.to_string(),
            current: current.to_string(),
        });
    }
    Ok(next)
}
