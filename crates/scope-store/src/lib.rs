//! Storage areas of a scope.
//!
//! A scope keeps four areas on disk:
//!
//! - **sources**: components owned by the scope ([`ComponentArea`])
//! - **external**: components fetched from other scopes ([`ExternalStore`])
//! - **tmp**: archives staged for transfer ([`TmpArea`])
//! - **cache**: version histories and build outputs ([`CacheArea`])
//!
//! File contents live in content-addressed blob stores behind the
//! [`ObjectStore`] trait, implemented on disk by [`FsObjectStore`].

pub mod area;
pub mod cache;
pub mod error;
pub mod external;
pub mod fs;
#[cfg(test)]
pub(crate) mod memory;
pub mod record;
pub mod tmp;
pub mod traits;

pub use area::{ComponentArea, ComponentIds, ComponentWalk};
pub use cache::{CacheArea, VersionHistory, VersionRecord};
pub use error::{StoreError, StoreResult};
pub use external::ExternalStore;
pub use fs::{read_json, write_atomic, write_json, FsObjectStore};
pub use record::ComponentRecord;
pub use tmp::TmpArea;
pub use traits::ObjectStore;
