//! Scope repository engine.
//!
//! A [`Scope`] stores versioned components in its `sources` area, remembers
//! what each stored version depended on, and exchanges components with peer
//! scopes through the [`RemoteTransport`](scope_remote::RemoteTransport)
//! contract. Components are fetched together with their full transitive
//! dependency set; exporting a component moves its source copy to the remote
//! it was pushed to.
//!
//! Peers addressed by a filesystem path are reached through [`FsConnector`].

pub mod build;
pub mod config;
pub mod error;
pub mod local;
pub mod meta;
pub mod scope;

pub use build::{Compiler, NoopCompiler};
pub use config::ScopeConfig;
pub use error::{ScopeError, ScopeResult};
pub use local::{local_path, FsConnector, LocalTransport};
pub use meta::{default_name, ScopeMeta, SCOPE_META_FILE};
pub use scope::{find_scope_root, has_scope, Scope, WORKSPACE_SCOPE_DIR};

// Re-export key types
pub use scope_remote::{Remote, Remotes};
pub use scope_types::{Component, ComponentId, Manifest, Version, VersionBump};
