use std::fmt;
use std::sync::Arc;

use scope_remote::{GlobalConfig, RemoteConnector, Remotes};

use crate::build::{Compiler, NoopCompiler};
use crate::local::FsConnector;

/// Everything a scope takes from outside its own directory.
///
/// Loaded once per invocation and handed to [`Scope`](crate::Scope)
/// construction; the global remote table is merged with the scope's own
/// table at the point of use.
#[derive(Clone)]
pub struct ScopeConfig {
    pub global_remotes: Remotes,
    pub connector: Arc<dyn RemoteConnector>,
    pub compiler: Arc<dyn Compiler>,
}

impl ScopeConfig {
    pub fn from_global(global: GlobalConfig) -> Self {
        Self {
            global_remotes: global.remotes,
            ..Self::default()
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn RemoteConnector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_compiler(mut self, compiler: Arc<dyn Compiler>) -> Self {
        self.compiler = compiler;
        self
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            global_remotes: Remotes::new(),
            connector: Arc::new(FsConnector),
            compiler: Arc::new(NoopCompiler),
        }
    }
}

impl fmt::Debug for ScopeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeConfig")
            .field("global_remotes", &self.global_remotes)
            .finish_non_exhaustive()
    }
}
