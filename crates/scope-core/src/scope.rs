//! The scope repository engine.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use futures::future::{try_join_all, BoxFuture, FutureExt};
use scope_archive::{pack_component, unpack_component, Archive};
use scope_deps::{DependencyMap, DEPENDENCY_MAP_FILE};
use scope_remote::{Remote, Remotes};
use scope_store::{CacheArea, ComponentArea, ExternalStore, TmpArea, VersionHistory};
use scope_types::{resolve_version, Component, ComponentId, Version};
use tracing::{debug, info, warn};

use crate::config::ScopeConfig;
use crate::error::{ScopeError, ScopeResult};
use crate::meta::{default_name, ScopeMeta};

const SOURCES_DIR: &str = "sources";
const EXTERNAL_DIR: &str = "external";
const TMP_DIR: &str = "tmp";
const CACHE_DIR: &str = "cache";

/// Directory a workspace keeps its scope in.
pub const WORKSPACE_SCOPE_DIR: &str = ".scope";

/// A directory is a scope root when it holds a source store.
pub fn has_scope(path: &Path) -> bool {
    path.join(SOURCES_DIR).is_dir()
}

/// Walk up from `start` to the first directory that is a scope root or
/// holds one in a `.scope` subdirectory.
pub fn find_scope_root(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        if has_scope(dir) {
            return Some(dir.to_path_buf());
        }
        let nested = dir.join(WORKSPACE_SCOPE_DIR);
        has_scope(&nested).then_some(nested)
    })
}

/// A versioned repository of components rooted at one directory.
///
/// The instance owns its directory tree for the lifetime of the process.
/// The dependency map is loaded once and flushed after every mutation.
pub struct Scope {
    path: PathBuf,
    created: bool,
    meta: ScopeMeta,
    sources: ComponentArea,
    external: ExternalStore,
    tmp: TmpArea,
    cache: CacheArea,
    dependency_map: DependencyMap,
    config: ScopeConfig,
}

impl Scope {
    /// Open the scope at `path` if one exists there, otherwise return a new,
    /// not yet persisted scope. Call [`Scope::ensure_dir`] to write it.
    pub fn create(path: impl Into<PathBuf>, name: Option<&str>, config: ScopeConfig) -> ScopeResult<Self> {
        let path = path.into();
        if has_scope(&path) {
            return Self::open(path, config);
        }
        let name = name.map(str::to_string).unwrap_or_else(|| default_name(&path));
        info!(path = %path.display(), %name, "initializing new scope");
        Ok(Self::assemble(path, true, ScopeMeta::new(name), DependencyMap::new(), config))
    }

    /// Find the nearest scope at or above `path` and load it.
    pub fn load(path: &Path, config: ScopeConfig) -> ScopeResult<Self> {
        let root = find_scope_root(path).ok_or_else(|| ScopeError::ScopeNotFound(path.to_path_buf()))?;
        Self::open(root, config)
    }

    /// Load the scope rooted exactly at `root`.
    pub fn open(root: PathBuf, config: ScopeConfig) -> ScopeResult<Self> {
        if !has_scope(&root) {
            return Err(ScopeError::ScopeNotFound(root));
        }
        let dependency_map = DependencyMap::read(&root.join(DEPENDENCY_MAP_FILE))?;
        let meta = match ScopeMeta::read(&root)? {
            Some(meta) => meta,
            None => {
                warn!(path = %root.display(), "scope has no metadata file, using defaults");
                ScopeMeta::new(default_name(&root))
            }
        };
        debug!(path = %root.display(), name = %meta.name, owned = dependency_map.len(), "loaded scope");
        Ok(Self::assemble(root, false, meta, dependency_map, config))
    }

    fn assemble(
        path: PathBuf,
        created: bool,
        meta: ScopeMeta,
        dependency_map: DependencyMap,
        config: ScopeConfig,
    ) -> Self {
        Self {
            sources: ComponentArea::new(path.join(SOURCES_DIR)),
            external: ExternalStore::new(path.join(EXTERNAL_DIR)),
            tmp: TmpArea::new(path.join(TMP_DIR)),
            cache: CacheArea::new(path.join(CACHE_DIR)),
            path,
            created,
            meta,
            dependency_map,
            config,
        }
    }

    // ---- Accessors ----

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// `true` until the scope has been written to disk.
    pub fn created(&self) -> bool {
        self.created
    }

    pub fn meta(&self) -> &ScopeMeta {
        &self.meta
    }

    pub fn sources(&self) -> &ComponentArea {
        &self.sources
    }

    pub fn external(&self) -> &ExternalStore {
        &self.external
    }

    pub fn tmp(&self) -> &TmpArea {
        &self.tmp
    }

    pub fn cache(&self) -> &CacheArea {
        &self.cache
    }

    pub fn dependency_map(&self) -> &DependencyMap {
        &self.dependency_map
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Create every storage area and flush the dependency map and metadata.
    /// Safe to call repeatedly.
    pub fn ensure_dir(&mut self) -> ScopeResult<()> {
        self.cache.ensure()?;
        self.sources.ensure()?;
        self.external.ensure()?;
        self.tmp.ensure()?;
        self.flush_dependency_map()?;
        self.meta.write(&self.path)?;
        self.created = false;
        Ok(())
    }

    fn flush_dependency_map(&self) -> ScopeResult<()> {
        self.dependency_map.write(&self.path.join(DEPENDENCY_MAP_FILE))?;
        Ok(())
    }

    // ---- Remotes ----

    /// The global table overlaid with this scope's table.
    pub fn remotes(&self) -> Remotes {
        Remotes::merge(&self.config.global_remotes, &self.meta.remotes)
    }

    pub fn add_remote(&mut self, remote: Remote) -> ScopeResult<()> {
        self.meta.remotes.add(remote)?;
        self.meta.write(&self.path)?;
        Ok(())
    }

    pub fn remove_remote(&mut self, alias: &str) -> ScopeResult<Remote> {
        let removed = self.meta.remotes.remove(alias)?;
        self.meta.write(&self.path)?;
        Ok(removed)
    }

    fn resolve_remote(&self, alias: &str, known: &Remotes) -> ScopeResult<Remote> {
        match known.get(alias) {
            Some(remote) => Ok(remote),
            None => Ok(self.remotes().resolve(alias)?),
        }
    }

    /// Components a remote owns, at their latest versions.
    pub async fn list_remote(&self, alias: &str) -> ScopeResult<Vec<ComponentId>> {
        let remote = self.remotes().resolve(alias)?;
        let transport = self.config.connector.connect(&remote)?;
        Ok(transport.list().await?)
    }

    // ---- History ----

    /// The version history of `id`'s namespace/name. `None` if nothing was
    /// ever tagged; an error if the record is unreadable.
    pub fn history(&self, id: &ComponentId) -> ScopeResult<Option<VersionHistory>> {
        Ok(self.cache.read_history(id)?)
    }

    pub fn versions(&self, id: &ComponentId) -> ScopeResult<BTreeSet<Version>> {
        Ok(self.history(id)?.map(|h| h.versions()).unwrap_or_default())
    }

    /// Pin `id` to a version present in the history.
    pub fn resolve(&self, id: &ComponentId) -> ScopeResult<(ComponentId, Version)> {
        let version = resolve_version(id, &self.versions(id)?)?;
        Ok((id.with_version(version), version))
    }

    fn exported_to(&self, id: &ComponentId, version: &Version) -> ScopeResult<Option<String>> {
        Ok(self
            .history(id)?
            .and_then(|h| h.record(version).and_then(|r| r.exported_to.clone())))
    }

    /// Every component with a history, at its latest version.
    pub fn list_components(&self) -> ScopeResult<Vec<ComponentId>> {
        let mut ids = Vec::new();
        for id in self.cache.list()? {
            if let Some((version, _)) = self.history(&id)?.as_ref().and_then(|h| h.latest()) {
                ids.push(id.with_version(version));
            }
        }
        Ok(ids)
    }

    /// Components whose latest version was tagged but never exported.
    pub fn local_staged(&self) -> ScopeResult<Vec<ComponentId>> {
        let mut staged = Vec::new();
        for id in self.cache.list()? {
            let Some(history) = self.history(&id)? else {
                continue;
            };
            if let Some((version, record)) = history.latest() {
                if !record.is_exported() {
                    staged.push(id.with_version(version));
                }
            }
        }
        Ok(staged)
    }

    // ---- Components ----

    /// Store a component after resolving and fetching its dependencies.
    ///
    /// Nothing is written until every dependency has been fetched and the
    /// build step has run. Returns the fetched dependencies followed by the
    /// component itself.
    pub async fn put(&mut self, component: Component) -> ScopeResult<Vec<Component>> {
        component.validate()?;
        let id = component.id.clone();
        let invalid = |reason: &str| ScopeError::Validation {
            id: id.to_string(),
            reason: reason.to_string(),
        };
        if !id.is_local() {
            return Err(invalid("only local components can be stored in sources"));
        }
        let version = id.exact_version().ok_or_else(|| invalid("missing exact version"))?;

        let declared: Remotes = component
            .manifest
            .remotes
            .iter()
            .map(|(alias, address)| Remote::new(alias.clone(), address.clone()))
            .collect::<Result<_, _>>()?;
        let remotes = Remotes::merge(&declared, &self.remotes());

        let fetched = self.fetch_closure(&component.dependencies, &remotes).await?;
        let outputs = match component.manifest.compiler_id()? {
            Some(compiler) => self.config.compiler.compile(&compiler, &component).await?,
            None => BTreeMap::new(),
        };
        let mut history = self.cache.read_history(&id)?.unwrap_or_default();

        for dependency in fetched.iter().filter(|c| !c.id.is_local()) {
            self.external.set(dependency)?;
        }
        let resolved: Vec<ComponentId> = fetched.iter().map(|c| c.id.clone()).collect();
        self.dependency_map.set_bit(&id, &resolved)?;
        self.sources.set(&component)?;
        history.insert(version, component.file_digests());
        self.cache.write_history(&id, &history)?;
        if !outputs.is_empty() {
            let dist = self.cache.write_dist(&id, &outputs)?;
            debug!(%id, dist = %dist.display(), "stored build outputs");
        }
        self.flush_dependency_map()?;

        info!(%id, dependencies = resolved.len(), "stored component");
        let mut all = fetched;
        all.push(component);
        Ok(all)
    }

    /// The component and its full transitive dependency set, dependencies
    /// first.
    ///
    /// Foreign identifiers are fetched from their remote. A local version
    /// that was exported, and so no longer has a source copy, is fetched
    /// back from the remote it was exported to.
    pub fn get<'a>(
        &'a self,
        id: &'a ComponentId,
        remotes: &'a Remotes,
    ) -> BoxFuture<'a, ScopeResult<Vec<Component>>> {
        async move {
            if !id.is_local() {
                return self.get_external(id, remotes).await;
            }
            let (pinned, version) = self.resolve(id)?;
            if !self.sources.contains(&pinned)? {
                if let Some(alias) = self.exported_to(&pinned, &version)? {
                    debug!(id = %pinned, remote = %alias, "source was exported, fetching it back");
                    return self.get_external(&pinned.with_scope(Some(alias)), remotes).await;
                }
            }
            let edges = self
                .dependency_map
                .get(&pinned)
                .ok_or_else(|| ScopeError::BitNotInScope(pinned.to_string()))?;
            let mut all = self.fetch_closure(edges.get_bit_ids(), remotes).await?;
            let own = self
                .sources
                .load(&pinned)?
                .ok_or_else(|| ScopeError::MissingComponent(pinned.to_string()))?;
            all.push(own);
            Ok(dedupe(all))
        }
        .boxed()
    }

    /// Sibling closures are fetched concurrently; the first failure aborts.
    async fn fetch_closure(&self, ids: &[ComponentId], remotes: &Remotes) -> ScopeResult<Vec<Component>> {
        let closures = try_join_all(ids.iter().map(|id| self.get(id, remotes))).await?;
        Ok(dedupe(closures.into_iter().flatten()))
    }

    async fn get_external(&self, id: &ComponentId, remotes: &Remotes) -> ScopeResult<Vec<Component>> {
        let alias = id
            .scope
            .clone()
            .ok_or_else(|| ScopeError::BitNotInScope(id.to_string()))?;
        let remote = self.resolve_remote(&alias, remotes)?;
        let transport = self.config.connector.connect(&remote)?;
        let wanted = [id.to_local()];
        debug!(%id, remote = %remote, "fetching from remote");
        let archives = transport.fetch(&wanted).await?;
        archives
            .iter()
            .map(|archive| Ok(tag_origin(unpack_component(archive)?, &alias)))
            .collect()
    }

    /// Load one stored component without its dependencies. Unversioned ids
    /// load the latest stored version.
    pub fn get_one(&self, id: &ComponentId) -> ScopeResult<Component> {
        let missing = || ScopeError::MissingComponent(id.to_string());
        let pinned = match id.exact_version() {
            Some(_) => id.to_local(),
            None => {
                let latest = self.sources.versions(id)?.into_iter().next_back().ok_or_else(missing)?;
                id.to_local().with_version(latest)
            }
        };
        self.sources.load(&pinned)?.ok_or_else(missing)
    }

    /// Serve a pull: the deduplicated closures of `ids`, one archive each.
    pub async fn fetch(&self, ids: &[ComponentId]) -> ScopeResult<Vec<Archive>> {
        let remotes = self.remotes();
        let components = self.fetch_closure(ids, &remotes).await?;
        info!(requested = ids.len(), components = components.len(), "serving fetch");
        components
            .iter()
            .map(|c| Ok(pack_component(c)?))
            .collect()
    }

    /// Send a staged component to `remote`. Once the remote accepts it the
    /// source copy is dropped and the version is recorded as exported.
    pub async fn push(&self, id: &ComponentId, remote: &Remote) -> ScopeResult<ComponentId> {
        let (pinned, version) = self.resolve(&id.to_local())?;
        let component = self
            .sources
            .load(&pinned)?
            .ok_or_else(|| ScopeError::MissingComponent(pinned.to_string()))?;
        let archive = pack_component(&owned_by_remote(component, &remote.alias))?;
        let name = archive.name.clone();
        self.tmp.stage(&name, &archive.to_bytes()?)?;

        let transport = self.config.connector.connect(remote)?;
        transport.push(archive).await?;

        self.tmp.discard(&name)?;
        self.sources.clean(&pinned)?;
        let mut history = self.cache.read_history(&pinned)?.unwrap_or_default();
        history.mark_exported(&version, &remote.alias);
        self.cache.write_history(&pinned, &history)?;
        info!(id = %pinned, remote = %remote.alias, "exported component");
        Ok(pinned)
    }

    /// Receive a pushed archive and store it as a local component.
    pub async fn upload(&mut self, archive: &Archive) -> ScopeResult<Vec<Component>> {
        let mut component = unpack_component(archive)?;
        component.id = component.id.to_local();
        debug!(name = %archive.name, "receiving upload");
        self.put(component).await
    }

    /// Remove a staged version. Exported versions and versions other stored
    /// components depend on are refused.
    pub fn untag(&mut self, id: &ComponentId) -> ScopeResult<ComponentId> {
        let (pinned, version) = self.resolve(id)?;
        let mut history = self.cache.read_history(&pinned)?.unwrap_or_default();
        if history.record(&version).is_some_and(|r| r.is_exported()) {
            return Err(ScopeError::ExportedVersion(pinned.to_string()));
        }
        let dependents = self.dependency_map.dependents_of(&pinned);
        if !dependents.is_empty() {
            return Err(ScopeError::HasDependents {
                id: pinned.to_string(),
                dependents,
            });
        }
        self.sources.clean(&pinned)?;
        history.remove(&version);
        self.cache.write_history(&pinned, &history)?;
        self.dependency_map.remove(&pinned);
        self.flush_dependency_map()?;
        info!(id = %pinned, "untagged component");
        Ok(pinned)
    }

    /// Every component in the source store at its latest stored version.
    pub fn list_sources(&self) -> ScopeResult<Vec<Component>> {
        self.sources
            .walk()
            .iter()
            .map(|id| self.get_one(&id?))
            .collect()
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("path", &self.path)
            .field("name", &self.meta.name)
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

/// Mark a component received from `alias` as owned by it, along with the
/// dependencies it resolves inside that scope.
fn tag_origin(mut component: Component, alias: &str) -> Component {
    let origin = Some(alias.to_string());
    if component.id.is_local() {
        component.id = component.id.with_scope(origin.clone());
    }
    for dependency in &mut component.dependencies {
        if dependency.is_local() {
            *dependency = dependency.with_scope(origin.clone());
        }
    }
    component
}

/// Inverse of [`tag_origin`] for a push: dependencies owned by the scope
/// `alias` names are addressed as that scope's own components.
fn owned_by_remote(mut component: Component, alias: &str) -> Component {
    let localize = |id: ComponentId| {
        if id.scope.as_deref() == Some(alias) {
            id.to_local()
        } else {
            id
        }
    };
    component.dependencies = component.dependencies.into_iter().map(localize).collect();
    component.manifest.dependencies = component
        .manifest
        .dependencies
        .into_iter()
        .map(|raw| match raw.parse::<ComponentId>() {
            Ok(id) => localize(id).to_string(),
            Err(_) => raw,
        })
        .collect();
    component
}

/// Keep the first occurrence of every identifier.
fn dedupe(components: impl IntoIterator<Item = Component>) -> Vec<Component> {
    let mut seen = HashSet::new();
    components
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use scope_remote::RemoteError;
    use scope_types::{Manifest, TypeError};

    use super::*;
    use crate::build::Compiler;

    fn id(s: &str) -> ComponentId {
        s.parse().unwrap()
    }

    fn component(raw: &str, deps: &[&str]) -> Component {
        let mut manifest = Manifest::new("index.js");
        manifest.dependencies = deps.iter().map(|d| d.to_string()).collect();
        let files = BTreeMap::from([("index.js".to_string(), format!("// {raw}").into_bytes())]);
        Component::new(id(raw), manifest, files, BTreeMap::new()).unwrap()
    }

    fn scope_at(path: &Path, name: &str) -> Scope {
        let mut scope = Scope::create(path, Some(name), ScopeConfig::default()).unwrap();
        scope.ensure_dir().unwrap();
        scope
    }

    fn ids(components: &[Component]) -> Vec<String> {
        components.iter().map(|c| c.id.to_string()).collect()
    }

    #[test]
    fn create_is_uncommitted_until_ensure_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("shared");
        let mut scope = Scope::create(&root, None, ScopeConfig::default()).unwrap();
        assert!(scope.created());
        assert_eq!(scope.name(), "shared");
        assert!(!has_scope(&root));

        scope.ensure_dir().unwrap();
        scope.ensure_dir().unwrap();
        assert!(has_scope(&root));
        assert!(root.join("scope.json").is_file());
        assert!(root.join(DEPENDENCY_MAP_FILE).is_file());

        let again = Scope::create(&root, Some("other"), ScopeConfig::default()).unwrap();
        assert!(!again.created());
        assert_eq!(again.name(), "shared");
    }

    #[test]
    fn load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        scope_at(&dir.path().join(WORKSPACE_SCOPE_DIR), "project");
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let scope = Scope::load(&nested, ScopeConfig::default()).unwrap();
        assert_eq!(scope.path(), dir.path().join(WORKSPACE_SCOPE_DIR));
        assert_eq!(scope.name(), "project");
    }

    #[test]
    fn load_without_scope_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Scope::load(dir.path(), ScopeConfig::default()),
            Err(ScopeError::ScopeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn put_then_get_returns_recorded_closure() {
        let dir = tempfile::tempdir().unwrap();
        let mut scope = scope_at(dir.path(), "local");
        scope.put(component("ns/base@0.0.1", &[])).await.unwrap();
        scope.put(component("ns/bar@0.0.1", &["ns/base"])).await.unwrap();
        let stored = scope.put(component("ns/foo@0.0.1", &["ns/bar@0.0.1"])).await.unwrap();
        assert_eq!(ids(&stored), vec!["ns/base@0.0.1", "ns/bar@0.0.1", "ns/foo@0.0.1"]);

        let edges = scope.dependency_map().get(&id("ns/foo@0.0.1")).unwrap();
        assert_eq!(edges.dependencies, vec![id("ns/bar@0.0.1"), id("ns/base@0.0.1")]);

        let got = scope.get(&id("ns/foo"), &Remotes::new()).await.unwrap();
        let mut got_ids = ids(&got);
        got_ids.sort();
        assert_eq!(got_ids, vec!["ns/bar@0.0.1", "ns/base@0.0.1", "ns/foo@0.0.1"]);
        assert_eq!(got.last().unwrap(), &component("ns/foo@0.0.1", &["ns/bar@0.0.1"]));

        let reloaded = Scope::load(dir.path(), ScopeConfig::default()).unwrap();
        assert_eq!(reloaded.dependency_map(), scope.dependency_map());
    }

    #[tokio::test]
    async fn failed_fetch_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut scope = scope_at(dir.path(), "local");
        let err = scope
            .put(component("ns/foo@0.0.1", &["ns/absent"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ScopeError::Type(TypeError::ComponentNotFound(_))));
        assert!(scope.dependency_map().is_empty());
        assert!(scope.history(&id("ns/foo")).unwrap().is_none());
        assert!(scope.sources().versions(&id("ns/foo")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_manifest_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut scope = scope_at(dir.path(), "local");
        let mut bad = component("ns/foo@0.0.1", &[]);
        bad.manifest.impl_file = "missing.js".into();
        assert!(matches!(scope.put(bad).await, Err(ScopeError::Validation { .. })));
    }

    #[tokio::test]
    async fn get_unowned_version_is_bit_not_in_scope() {
        let dir = tempfile::tempdir().unwrap();
        let mut scope = scope_at(dir.path(), "local");
        scope.put(component("ns/foo@0.0.1", &[])).await.unwrap();
        std::fs::write(dir.path().join(DEPENDENCY_MAP_FILE), b"{}").unwrap();

        let reloaded = Scope::load(dir.path(), ScopeConfig::default()).unwrap();
        assert!(matches!(
            reloaded.get(&id("ns/foo"), &Remotes::new()).await,
            Err(ScopeError::BitNotInScope(_))
        ));
        assert!(matches!(
            reloaded.get(&id("ns/foo@0.0.9"), &Remotes::new()).await,
            Err(ScopeError::Type(TypeError::VersionNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn get_one_and_list_sources() {
        let dir = tempfile::tempdir().unwrap();
        let mut scope = scope_at(dir.path(), "local");
        scope.put(component("ns/foo@0.0.1", &[])).await.unwrap();
        scope.put(component("ns/foo@0.0.2", &[])).await.unwrap();
        scope.put(component("array/flat@0.0.1", &[])).await.unwrap();

        assert_eq!(scope.get_one(&id("ns/foo")).unwrap().id, id("ns/foo@0.0.2"));
        assert_eq!(scope.get_one(&id("ns/foo@0.0.1")).unwrap().id, id("ns/foo@0.0.1"));
        assert!(matches!(scope.get_one(&id("ns/nope")), Err(ScopeError::MissingComponent(_))));

        assert_eq!(ids(&scope.list_sources().unwrap()), vec!["array/flat@0.0.1", "ns/foo@0.0.2"]);
        let staged: Vec<String> = scope.local_staged().unwrap().iter().map(|i| i.to_string()).collect();
        assert_eq!(staged, vec!["array/flat@0.0.1", "ns/foo@0.0.2"]);
    }

    #[tokio::test]
    async fn push_cleans_source_and_get_fetches_it_back() {
        let dir = tempfile::tempdir().unwrap();
        let origin_path = dir.path().join("origin");
        scope_at(&origin_path, "origin");
        let mut local = scope_at(&dir.path().join("local"), "local");
        let origin = Remote::new("origin", origin_path.to_string_lossy()).unwrap();
        local.add_remote(origin.clone()).unwrap();

        local.put(component("ns/bar@0.0.1", &[])).await.unwrap();
        let pushed = local.push(&id("ns/bar"), &origin).await.unwrap();
        assert_eq!(pushed, id("ns/bar@0.0.1"));

        assert!(!local.sources().contains(&pushed).unwrap());
        assert!(local.local_staged().unwrap().is_empty());
        let history = local.history(&pushed).unwrap().unwrap();
        assert_eq!(history.latest().unwrap().1.exported_to.as_deref(), Some("origin"));
        assert!(local.tmp().read("ns/bar@0.0.1").unwrap().is_none());

        let remote_side = Scope::load(&origin_path, ScopeConfig::default()).unwrap();
        assert_eq!(remote_side.get_one(&id("ns/bar")).unwrap().id, id("ns/bar@0.0.1"));

        let back = local.get(&id("ns/bar"), &local.remotes()).await.unwrap();
        assert_eq!(ids(&back), vec!["origin/ns/bar@0.0.1"]);
    }

    #[tokio::test]
    async fn foreign_dependencies_land_in_external() {
        let dir = tempfile::tempdir().unwrap();
        let origin_path = dir.path().join("origin");
        let mut origin = scope_at(&origin_path, "origin");
        origin.put(component("utils/pad@0.0.1", &[])).await.unwrap();
        origin.put(component("utils/pad@0.0.2", &[])).await.unwrap();

        let mut local = scope_at(&dir.path().join("local"), "local");
        local
            .add_remote(Remote::new("origin", format!("file://{}", origin_path.display())).unwrap())
            .unwrap();
        let stored = local
            .put(component("ns/foo@0.0.1", &["origin/utils/pad"]))
            .await
            .unwrap();
        assert_eq!(ids(&stored), vec!["origin/utils/pad@0.0.2", "ns/foo@0.0.1"]);
        assert!(local.external().contains(&id("origin/utils/pad@0.0.2")).unwrap());

        let edges = local.dependency_map().get(&id("ns/foo@0.0.1")).unwrap();
        assert_eq!(edges.remote_of(&id("origin/utils/pad@0.0.2")), Some("origin"));

        let got = local.get(&id("ns/foo@0.0.1"), &Remotes::new()).await.unwrap();
        assert_eq!(ids(&got), vec!["origin/utils/pad@0.0.2", "ns/foo@0.0.1"]);
        assert_eq!(local.list_remote("origin").await.unwrap(), vec![id("utils/pad@0.0.2")]);
    }

    #[tokio::test]
    async fn push_back_to_the_owner_of_a_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let origin_path = dir.path().join("origin");
        let mut origin = scope_at(&origin_path, "origin");
        origin.put(component("utils/pad@0.0.1", &[])).await.unwrap();

        let mut local = scope_at(&dir.path().join("local"), "local");
        let remote = Remote::new("origin", origin_path.to_string_lossy()).unwrap();
        local.add_remote(remote.clone()).unwrap();
        local
            .put(component("ns/foo@0.0.1", &["origin/utils/pad"]))
            .await
            .unwrap();

        assert_eq!(local.push(&id("ns/foo"), &remote).await.unwrap(), id("ns/foo@0.0.1"));

        let origin = Scope::load(&origin_path, ScopeConfig::default()).unwrap();
        let stored = origin.get_one(&id("ns/foo@0.0.1")).unwrap();
        assert_eq!(stored.dependencies, vec![id("utils/pad")]);
        assert_eq!(stored.manifest.dependencies, vec!["utils/pad".to_string()]);
        let edges = origin.dependency_map().get(&id("ns/foo@0.0.1")).unwrap();
        assert_eq!(edges.dependencies, vec![id("utils/pad@0.0.1")]);
        assert_eq!(edges.remote_of(&id("utils/pad@0.0.1")), None);
    }

    #[tokio::test]
    async fn fetch_packs_deduplicated_closures() {
        let dir = tempfile::tempdir().unwrap();
        let mut scope = scope_at(dir.path(), "origin");
        scope.put(component("ns/base@0.0.1", &[])).await.unwrap();
        scope.put(component("ns/a@0.0.1", &["ns/base"])).await.unwrap();
        scope.put(component("ns/b@0.0.1", &["ns/base"])).await.unwrap();

        let archives = scope.fetch(&[id("ns/a"), id("ns/b")]).await.unwrap();
        let names: Vec<&str> = archives.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["ns/base@0.0.1", "ns/a@0.0.1", "ns/b@0.0.1"]);
    }

    #[tokio::test]
    async fn unsupported_transport_and_unknown_remote() {
        let dir = tempfile::tempdir().unwrap();
        let mut scope = scope_at(dir.path(), "local");
        scope.put(component("ns/foo@0.0.1", &[])).await.unwrap();
        let http = Remote::new("web", "https://scopes.example.com/shared").unwrap();
        assert!(matches!(
            scope.push(&id("ns/foo"), &http).await,
            Err(ScopeError::Remote(RemoteError::UnsupportedTransport(_)))
        ));
        assert!(scope.sources().contains(&id("ns/foo@0.0.1")).unwrap());

        assert!(matches!(
            scope.get(&id("nowhere/ns/foo"), &Remotes::new()).await,
            Err(ScopeError::Remote(RemoteError::RemoteNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn untag_staged_only() {
        let dir = tempfile::tempdir().unwrap();
        let origin_path = dir.path().join("origin");
        scope_at(&origin_path, "origin");
        let mut scope = scope_at(&dir.path().join("local"), "local");
        let origin = Remote::new("origin", origin_path.to_string_lossy()).unwrap();

        scope.put(component("ns/foo@0.0.1", &[])).await.unwrap();
        scope.push(&id("ns/foo"), &origin).await.unwrap();
        scope.put(component("ns/foo@0.0.2", &[])).await.unwrap();
        scope.put(component("ns/bar@0.0.1", &["ns/foo@0.0.2"])).await.unwrap();

        assert!(matches!(
            scope.untag(&id("ns/foo@0.0.2")),
            Err(ScopeError::HasDependents { .. })
        ));
        assert!(matches!(
            scope.untag(&id("ns/foo@0.0.1")),
            Err(ScopeError::ExportedVersion(_))
        ));

        assert_eq!(scope.untag(&id("ns/bar")).unwrap(), id("ns/bar@0.0.1"));
        assert!(scope.history(&id("ns/bar")).unwrap().is_none());
        assert!(scope.dependency_map().get(&id("ns/bar@0.0.1")).is_none());
        scope.untag(&id("ns/foo")).unwrap();
        let versions: Vec<Version> = scope.versions(&id("ns/foo")).unwrap().into_iter().collect();
        assert_eq!(versions, vec![Version::new(0, 0, 1)]);
    }

    struct Bundler;

    #[async_trait]
    impl Compiler for Bundler {
        async fn compile(
            &self,
            _compiler: &ComponentId,
            component: &Component,
        ) -> ScopeResult<BTreeMap<String, Vec<u8>>> {
            let source = &component.impl_files[&component.manifest.impl_file];
            Ok(BTreeMap::from([("dist/index.js".to_string(), source.to_ascii_uppercase())]))
        }
    }

    #[tokio::test]
    async fn compiler_outputs_go_to_dist() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScopeConfig::default().with_compiler(Arc::new(Bundler));
        let mut scope = Scope::create(dir.path(), Some("local"), config).unwrap();
        scope.ensure_dir().unwrap();

        let mut c = component("ns/foo@0.0.1", &[]);
        c.manifest.compiler = Some("tools/babel@1.0.0".into());
        scope.put(c).await.unwrap();

        let dist = scope.cache().dist_dir(&id("ns/foo@0.0.1")).unwrap();
        assert_eq!(std::fs::read(dist.join("dist/index.js")).unwrap(), b"// NS/FOO@0.0.1");
    }
}
