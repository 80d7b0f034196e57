use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, RemoteResult};
use crate::names::validate_alias;

/// A named pointer to another scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Remote {
    pub alias: String,
    pub address: String,
}

impl Remote {
    pub fn new(alias: impl Into<String>, address: impl Into<String>) -> RemoteResult<Self> {
        let alias = alias.into();
        validate_alias(&alias)?;
        Ok(Self {
            alias,
            address: address.into(),
        })
    }
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.alias, self.address)
    }
}

/// Alias -> address table. Used for both the global and the scope table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Remotes(BTreeMap<String, String>);

impl Remotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Global table overlaid with the scope table; the scope table wins on
    /// alias collisions.
    pub fn merge(global: &Remotes, local: &Remotes) -> Remotes {
        let mut merged = global.0.clone();
        merged.extend(local.0.iter().map(|(a, addr)| (a.clone(), addr.clone())));
        Remotes(merged)
    }

    pub fn get(&self, alias: &str) -> Option<Remote> {
        self.0.get(alias).map(|address| Remote {
            alias: alias.to_string(),
            address: address.clone(),
        })
    }

    pub fn resolve(&self, alias: &str) -> RemoteResult<Remote> {
        self.get(alias)
            .ok_or_else(|| RemoteError::RemoteNotFound(alias.to_string()))
    }

    pub fn add(&mut self, remote: Remote) -> RemoteResult<()> {
        if self.0.contains_key(&remote.alias) {
            return Err(RemoteError::AlreadyExists(remote.alias));
        }
        self.0.insert(remote.alias, remote.address);
        Ok(())
    }

    pub fn remove(&mut self, alias: &str) -> RemoteResult<Remote> {
        let address = self
            .0
            .remove(alias)
            .ok_or_else(|| RemoteError::RemoteNotFound(alias.to_string()))?;
        Ok(Remote {
            alias: alias.to_string(),
            address,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Remote> + '_ {
        self.0.iter().map(|(alias, address)| Remote {
            alias: alias.clone(),
            address: address.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Remote> for Remotes {
    fn from_iter<I: IntoIterator<Item = Remote>>(iter: I) -> Self {
        Remotes(iter.into_iter().map(|r| (r.alias, r.address)).collect())
    }
}
