//! Remote registry for scopes.
//!
//! A remote is a named pointer to another scope. Scopes see the merge of the
//! user-wide table in `~/.scope/config.toml` and their own table; the scope's
//! entry wins when both define an alias. Peers are reached only through the
//! [`RemoteTransport`] contract.

pub mod config;
pub mod error;
pub mod names;
pub mod remote;
pub mod transport;

pub use config::GlobalConfig;
pub use error::{RemoteError, RemoteResult};
pub use names::validate_alias;
pub use remote::{Remote, Remotes};
pub use transport::{RemoteConnector, RemoteTransport};
