use std::sync::Arc;

use async_trait::async_trait;
use scope_archive::Archive;
use scope_types::ComponentId;

use crate::error::RemoteResult;
use crate::remote::Remote;

/// The narrow contract between a scope and a peer scope.
///
/// Fetch hands identifiers to the peer and receives one archive per
/// component in their transitive closure; push hands over one archive.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Name the peer scope reports for itself.
    async fn name(&self) -> RemoteResult<String>;
    async fn fetch(&self, ids: &[ComponentId]) -> RemoteResult<Vec<Archive>>;
    async fn push(&self, archive: Archive) -> RemoteResult<()>;
    /// Components the peer owns, at their latest version.
    async fn list(&self) -> RemoteResult<Vec<ComponentId>>;
}

/// Opens a transport for a resolved remote.
pub trait RemoteConnector: Send + Sync {
    fn connect(&self, remote: &Remote) -> RemoteResult<Arc<dyn RemoteTransport>>;
}
