//! Build hook invoked when a component names a compiler.

use std::collections::BTreeMap;

use async_trait::async_trait;
use scope_types::{Component, ComponentId};
use tracing::debug;

use crate::error::ScopeResult;

/// Compiles a component with the compiler its manifest names.
///
/// Returns build outputs keyed by relative path; they are stored under the
/// scope's `cache/dist` for the component's version.
#[async_trait]
pub trait Compiler: Send + Sync {
    async fn compile(
        &self,
        compiler: &ComponentId,
        component: &Component,
    ) -> ScopeResult<BTreeMap<String, Vec<u8>>>;
}

/// Used when no compiler runtime is registered: produces no outputs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCompiler;

#[async_trait]
impl Compiler for NoopCompiler {
    async fn compile(
        &self,
        compiler: &ComponentId,
        component: &Component,
    ) -> ScopeResult<BTreeMap<String, Vec<u8>>> {
        debug!(%compiler, id = %component.id, "no compiler runtime registered, skipping build");
        Ok(BTreeMap::new())
    }
}
