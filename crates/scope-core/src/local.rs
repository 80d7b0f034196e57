//! Transport to a scope on the local filesystem.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use scope_archive::Archive;
use scope_remote::{Remote, RemoteConnector, RemoteError, RemoteResult, RemoteTransport};
use scope_types::ComponentId;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ScopeConfig;
use crate::error::ScopeError;
use crate::scope::Scope;

/// Filesystem path named by a remote address: a bare path or a `file://`
/// URL. `None` for any other scheme.
pub fn local_path(address: &str) -> Option<PathBuf> {
    let path = address.strip_prefix("file://").unwrap_or(address);
    if path.is_empty() || path.contains("://") {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Serves the remote protocol from a scope opened in-process.
pub struct LocalTransport {
    alias: String,
    scope: Mutex<Scope>,
}

impl LocalTransport {
    pub fn new(alias: impl Into<String>, scope: Scope) -> Self {
        Self {
            alias: alias.into(),
            scope: Mutex::new(scope),
        }
    }

    fn remote_error(&self, e: ScopeError) -> RemoteError {
        RemoteError::Remote {
            alias: self.alias.clone(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl RemoteTransport for LocalTransport {
    async fn name(&self) -> RemoteResult<String> {
        Ok(self.scope.lock().await.name().to_string())
    }

    async fn fetch(&self, ids: &[ComponentId]) -> RemoteResult<Vec<Archive>> {
        let scope = self.scope.lock().await;
        scope.fetch(ids).await.map_err(|e| self.remote_error(e))
    }

    async fn push(&self, archive: Archive) -> RemoteResult<()> {
        let mut scope = self.scope.lock().await;
        scope
            .upload(&archive)
            .await
            .map(|_| ())
            .map_err(|e| self.remote_error(e))
    }

    async fn list(&self) -> RemoteResult<Vec<ComponentId>> {
        let scope = self.scope.lock().await;
        scope.list_components().map_err(|e| self.remote_error(e))
    }
}

/// Connects to remotes addressed by filesystem path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsConnector;

impl RemoteConnector for FsConnector {
    fn connect(&self, remote: &Remote) -> RemoteResult<Arc<dyn RemoteTransport>> {
        let path = local_path(&remote.address)
            .ok_or_else(|| RemoteError::UnsupportedTransport(remote.address.clone()))?;
        debug!(remote = %remote, "opening local scope");
        let scope = Scope::open(path, ScopeConfig::default()).map_err(|e| RemoteError::Remote {
            alias: remote.alias.clone(),
            reason: e.to_string(),
        })?;
        Ok(Arc::new(LocalTransport::new(remote.alias.clone(), scope)))
    }
}
