//! Foundation types for component scopes.
//!
//! Every other crate in the workspace depends on `scope-types`.
//!
//! # Key Types
//!
//! - [`ComponentId`]: `[scope/]namespace/name[@version]` identifier
//! - [`Version`] / [`VersionSpec`] / [`VersionBump`]: semantic versions,
//!   with [`resolve_version`] and [`next_version`] operating on a history
//! - [`Component`] / [`Manifest`]: a stored unit of code and its metadata
//! - [`ObjectId`]: BLAKE3 content address of a file blob

pub mod component;
pub mod error;
pub mod id;
pub mod object;
pub mod version;

pub use component::{digest_files, validate_file_name, Component, Manifest, MANIFEST_FILE};
pub use error::TypeError;
pub use id::ComponentId;
pub use object::ObjectId;
pub use version::{next_version, resolve_version, Version, VersionBump, VersionSpec, INITIAL_VERSION};
