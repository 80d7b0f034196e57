//! Dependency map of a scope.
//!
//! Each component the scope owns is recorded at the version it was stored,
//! together with the dependencies resolved for it at that moment and the
//! remote every foreign dependency came from. The map is persisted as a
//! single JSON file and rewritten in full on every flush.
//!
//! - [`DependencyMap`]: the persisted map
//! - [`DependencyEdges`]: one entry: dependency ids plus their remotes

pub mod error;
pub mod map;

pub use error::{DepsError, DepsResult};
pub use map::{DependencyEdges, DependencyMap, DEPENDENCY_MAP_FILE};
