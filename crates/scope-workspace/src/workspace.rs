//! The workspace: tracked component directories plus the scope they are
//! tagged into.

use std::path::{Path, PathBuf};

use scope_core::{has_scope, Scope, ScopeConfig, ScopeError, WORKSPACE_SCOPE_DIR};
use scope_remote::Remote;
use scope_store::StoreError;
use scope_types::{next_version, ComponentId, VersionBump};
use tracing::{debug, info, warn};

use crate::entry::MapEntry;
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::files::WorkspaceFiles;
use crate::map::{WorkspaceMap, WORKSPACE_MAP_FILE};
use crate::reconcile::{classify, resolve_entry, HistoryState};
use crate::status::{ComponentState, ComponentStatus, ExportReport, StatusReport};

/// Which components an operation applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    One(ComponentId),
    All,
}

/// A workspace read for display, see [`Workspace::show`].
#[derive(Clone, Debug)]
pub struct ComponentView {
    pub state: ComponentState,
    /// Manifest in the workspace, if its files are present.
    pub manifest: Option<scope_types::Manifest>,
    /// Versions the scope has tagged.
    pub versions: Vec<scope_types::Version>,
}

/// A directory holding `.scopemap` and a `.scope` scope.
pub struct Workspace {
    root: PathBuf,
    map: WorkspaceMap,
    scope: Scope,
}

impl Workspace {
    /// Open the workspace at `root`, creating its scope and map if needed.
    pub fn init(root: impl Into<PathBuf>, config: ScopeConfig) -> WorkspaceResult<Self> {
        let root = root.into();
        let scope_root = root.join(WORKSPACE_SCOPE_DIR);
        let mut scope = Scope::create(scope_root, None, config)?;
        if scope.created() {
            scope.ensure_dir()?;
            info!(root = %root.display(), "initialized workspace");
        }
        let map = WorkspaceMap::read(&root.join(WORKSPACE_MAP_FILE))?;
        let workspace = Self { root, map, scope };
        workspace.write_map()?;
        Ok(workspace)
    }

    /// Find the workspace at or above `path`: the nearest directory holding
    /// a `.scope` scope or a `.scopemap`.
    ///
    /// A map whose scope was deleted gets a fresh scope that stays
    /// uncommitted until something is tagged into it.
    pub fn load(path: &Path, config: ScopeConfig) -> WorkspaceResult<Self> {
        let root = path
            .ancestors()
            .find(|dir| is_workspace(dir) || dir.join(WORKSPACE_MAP_FILE).is_file())
            .ok_or_else(|| WorkspaceError::NotAWorkspace(path.to_path_buf()))?
            .to_path_buf();
        let scope = Scope::create(root.join(WORKSPACE_SCOPE_DIR), None, config)?;
        if scope.created() {
            warn!(root = %root.display(), "workspace scope is missing, starting an empty one");
        }
        let map = WorkspaceMap::read(&root.join(WORKSPACE_MAP_FILE))?;
        debug!(root = %root.display(), tracked = map.len(), "loaded workspace");
        Ok(Self { root, map, scope })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn map(&self) -> &WorkspaceMap {
        &self.map
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn write_map(&self) -> WorkspaceResult<()> {
        self.map.write(&self.root.join(WORKSPACE_MAP_FILE))
    }

    /// Start tracking the component directory `dir` as `id`.
    pub fn add(&mut self, dir: &Path, id: &ComponentId) -> WorkspaceResult<ComponentId> {
        if let Some((key, _)) = self.map.find(id) {
            return Err(WorkspaceError::AlreadyTracked(key.to_string()));
        }
        let absolute = if dir.is_absolute() { dir.to_path_buf() } else { self.root.join(dir) };
        if !absolute.is_dir() {
            return Err(WorkspaceError::MissingFiles {
                id: id.to_string(),
                root: absolute,
            });
        }
        let relative = absolute.strip_prefix(&self.root).unwrap_or(&absolute);
        let key = id.to_local().without_version();
        self.map
            .insert(key.to_string(), MapEntry::new(relative.to_string_lossy()));
        self.write_map()?;
        info!(id = %key, root = %relative.display(), "tracking component");
        Ok(key)
    }

    fn history_state(&self, id: &ComponentId) -> WorkspaceResult<HistoryState> {
        match self.scope.history(id) {
            Ok(Some(history)) => Ok(HistoryState::Present(history)),
            Ok(None) => Ok(HistoryState::Absent),
            Err(ScopeError::Store(StoreError::CorruptRecord { reason, .. })) => Ok(HistoryState::Unreadable(reason)),
            Err(e) => Err(e.into()),
        }
    }

    /// Rebuild the map from the scope's history and classify every
    /// component. Touches nothing on disk.
    fn reconcile(&self) -> WorkspaceResult<(WorkspaceMap, Vec<ComponentState>)> {
        let mut map = WorkspaceMap::new();
        let mut states = Vec::with_capacity(self.map.len());
        for (key, entry) in self.map.iter() {
            let tracked: ComponentId = key.parse()?;
            let history = self.history_state(&tracked)?;
            let (id, resolution) = resolve_entry(&tracked, entry, &history)?;
            let files = WorkspaceFiles::read(&self.root.join(&entry.root))?;
            let status = classify(&resolution, files.map(|f| f.digests()).as_ref());
            let updated = entry.resynced(&resolution);
            if id != tracked || updated != *entry {
                info!(from = %tracked, to = %id, exported = updated.exported, "resynchronized workspace entry");
            }
            map.insert(id.to_string(), updated);
            states.push(ComponentState {
                id,
                status,
                root: Some(entry.root.clone()),
            });
        }
        for id in self.scope.local_staged()? {
            if !states.iter().any(|s| s.id.same_component(&id)) {
                debug!(%id, "staged in scope without a workspace entry");
                states.push(ComponentState {
                    id,
                    status: ComponentStatus::Staged,
                    root: None,
                });
            }
        }
        Ok((map, states))
    }

    /// Reconcile, persist the repaired map and report.
    pub fn status(&mut self) -> WorkspaceResult<StatusReport> {
        let (map, states) = self.reconcile()?;
        self.map = map;
        self.write_map()?;
        Ok(StatusReport::new(states))
    }

    /// Reconciled view of one tracked component. Persists nothing.
    pub fn show(&self, id: &ComponentId) -> WorkspaceResult<ComponentView> {
        let (_, states) = self.reconcile()?;
        let state = states
            .into_iter()
            .find(|s| s.is_tracked() && s.id.same_component(id))
            .ok_or_else(|| WorkspaceError::MissingWorkspaceComponent(id.to_string()))?;
        let manifest = match &state.root {
            Some(root) => WorkspaceFiles::read(&self.root.join(root))?.map(|f| f.manifest),
            None => None,
        };
        let versions = match state.status {
            ComponentStatus::ImportPending => Vec::new(),
            _ => self.scope.versions(&state.id)?.into_iter().collect(),
        };
        Ok(ComponentView {
            state,
            manifest,
            versions,
        })
    }

    /// Tag tracked components into the scope.
    ///
    /// Versions come from the scope's history. Without `force` only new and
    /// modified components are tagged. Dependencies are tagged before the
    /// components that name them.
    pub async fn tag(
        &mut self,
        target: &Target,
        bump: &VersionBump,
        force: bool,
    ) -> WorkspaceResult<Vec<ComponentId>> {
        let (map, states) = self.reconcile()?;
        let selected: Vec<ComponentState> = match target {
            Target::One(id) => vec![states
                .into_iter()
                .find(|s| s.is_tracked() && s.id.same_component(id))
                .ok_or_else(|| WorkspaceError::MissingWorkspaceComponent(id.to_string()))?],
            Target::All => states.into_iter().filter(ComponentState::is_tracked).collect(),
        };
        if let Some(pending) = selected.iter().find(|s| s.status == ComponentStatus::ImportPending) {
            return Err(WorkspaceError::ImportPending(pending.id.to_string()));
        }
        if let (Target::One(_), Some(missing)) = (
            target,
            selected.iter().find(|s| s.status == ComponentStatus::Missing),
        ) {
            return Err(self.missing_files(missing));
        }

        let mut candidates = Vec::new();
        for state in selected {
            let wanted = force || matches!(state.status, ComponentStatus::New | ComponentStatus::Modified);
            if !wanted || state.status == ComponentStatus::Missing {
                continue;
            }
            let files = self.read_files(&state)?;
            candidates.push((state, files));
        }
        if candidates.is_empty() {
            return Err(WorkspaceError::NothingToTag);
        }

        self.map = map;
        if self.scope.created() {
            self.scope.ensure_dir()?;
        }
        let ordered = dependencies_first(
            candidates,
            |(state, _)| &state.id,
            |(_, files)| files.dependency_ids().unwrap_or_default(),
        );

        let mut tagged = Vec::with_capacity(ordered.len());
        for (state, files) in ordered {
            let version = next_version(&self.scope.versions(&state.id)?, bump)?;
            let id = state.id.to_local().with_version(version);
            self.scope.put(files.into_component(id.clone())?).await?;

            let root = state.root.unwrap_or_default();
            self.map.remove(&state.id.to_string());
            self.map.insert(id.to_string(), MapEntry::new(root));
            self.write_map()?;
            info!(from = %state.id, to = %id, "tagged component");
            tagged.push(id);
        }
        Ok(tagged)
    }

    fn read_files(&self, state: &ComponentState) -> WorkspaceResult<WorkspaceFiles> {
        let root = state.root.as_deref().unwrap_or_default();
        WorkspaceFiles::read(&self.root.join(root))?.ok_or_else(|| self.missing_files(state))
    }

    fn missing_files(&self, state: &ComponentState) -> WorkspaceError {
        WorkspaceError::MissingFiles {
            id: state.id.to_string(),
            root: self.root.join(state.root.as_deref().unwrap_or_default()),
        }
    }

    /// The named remote, or the only configured one.
    pub fn select_remote(&self, alias: Option<&str>) -> WorkspaceResult<Remote> {
        let remotes = self.scope.remotes();
        match alias {
            Some(alias) => Ok(remotes.resolve(alias).map_err(ScopeError::from)?),
            None if remotes.len() == 1 => remotes.iter().next().ok_or(WorkspaceError::NoRemote),
            None => Err(WorkspaceError::NoRemote),
        }
    }

    /// Push staged versions to a remote.
    ///
    /// Targets are taken from the scope, so components staged there without
    /// a workspace entry can be exported too; their export changes nothing
    /// in the workspace. Dependencies are pushed before their dependents.
    pub async fn export(&mut self, target: &Target, remote: Option<&str>) -> WorkspaceResult<ExportReport> {
        let (map, states) = self.reconcile()?;
        let pending = states.iter().find(|s| {
            s.status == ComponentStatus::ImportPending
                && match target {
                    Target::One(id) => s.id.same_component(id),
                    Target::All => true,
                }
        });
        if let Some(pending) = pending {
            return Err(WorkspaceError::ImportPending(pending.id.to_string()));
        }
        let remote = self.select_remote(remote)?;

        let staged = self.scope.local_staged()?;
        let targets = match target {
            Target::One(id) => match staged.into_iter().find(|s| s.same_component(id)) {
                Some(found) => self.with_staged_dependencies(found)?,
                None if states.iter().any(|s| s.is_tracked() && s.id.same_component(id)) => {
                    return Err(WorkspaceError::NothingToExport(id.to_string()))
                }
                None => return Err(WorkspaceError::MissingWorkspaceComponent(id.to_string())),
            },
            Target::All => staged,
        };

        self.map = map;
        let dependency_map = self.scope.dependency_map();
        let ordered = dependencies_first(
            targets,
            |id| id,
            |id| {
                dependency_map
                    .get(id)
                    .map(|edges| edges.get_bit_ids().to_vec())
                    .unwrap_or_default()
            },
        );

        let mut report = ExportReport::new(remote.alias.clone());
        for id in ordered {
            let pushed = self.scope.push(&id, &remote).await?;
            match self.map.remove(&pushed.to_string()) {
                Some(entry) => {
                    let exported = pushed.with_scope(Some(remote.alias.clone()));
                    self.map.insert(
                        exported.to_string(),
                        MapEntry {
                            exported: true,
                            ..entry
                        },
                    );
                    report.exported.push(exported);
                }
                None => report.untracked.push(pushed),
            }
            self.write_map()?;
        }
        info!(remote = %remote.alias, exported = report.total(), "export finished");
        Ok(report)
    }

    /// `id` and every local dependency in its closure that is still staged.
    fn with_staged_dependencies(&self, id: ComponentId) -> WorkspaceResult<Vec<ComponentId>> {
        let mut closure: Vec<ComponentId> = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if closure.contains(&next) {
                continue;
            }
            if let Some(edges) = self.scope.dependency_map().get(&next) {
                for dependency in edges.get_bit_ids() {
                    if dependency.is_local() && self.scope.sources().contains(dependency)? {
                        debug!(%dependency, dependent = %next, "exporting staged dependency");
                        pending.push(dependency.clone());
                    }
                }
            }
            closure.push(next);
        }
        Ok(closure)
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("tracked", &self.map.len())
            .field("scope", &self.scope)
            .finish()
    }
}

/// `true` if `path` already holds a workspace scope.
pub fn is_workspace(path: &Path) -> bool {
    has_scope(&path.join(WORKSPACE_SCOPE_DIR))
}

/// Order `items` so that every item comes after the items it depends on.
/// Items caught in a cycle keep their given order.
fn dependencies_first<T>(
    items: Vec<T>,
    id_of: impl Fn(&T) -> &ComponentId,
    deps_of: impl Fn(&T) -> Vec<ComponentId>,
) -> Vec<T> {
    let mut ordered = Vec::with_capacity(items.len());
    let mut remaining = items;
    while !remaining.is_empty() {
        let blocked: Vec<bool> = remaining
            .iter()
            .map(|item| {
                let own = id_of(item);
                deps_of(item).iter().any(|dep| {
                    remaining
                        .iter()
                        .any(|other| !id_of(other).same_component(own) && id_of(other).same_component(dep))
                })
            })
            .collect();
        if blocked.iter().all(|b| *b) {
            ordered.append(&mut remaining);
            break;
        }
        let mut next = Vec::new();
        for (item, blocked) in remaining.into_iter().zip(blocked) {
            if blocked {
                next.push(item);
            } else {
                ordered.push(item);
            }
        }
        remaining = next;
    }
    ordered
}

#[cfg(test)]
mod tests {
    use scope_types::Version;

    use super::*;
    use crate::status::{IMPORT_PENDING_MESSAGE, NOTHING_TO_TAG_OR_EXPORT, NO_LOCAL_CHANGES};

    fn id(s: &str) -> ComponentId {
        s.parse().unwrap()
    }

    fn write_component(root: &Path, dir: &str, source: &str, deps: &[&str]) {
        let path = root.join(dir);
        std::fs::create_dir_all(&path).unwrap();
        let manifest = serde_json::json!({ "impl": "index.js", "dependencies": deps });
        std::fs::write(path.join("component.json"), manifest.to_string()).unwrap();
        std::fs::write(path.join("index.js"), source).unwrap();
    }

    fn workspace(root: &Path) -> Workspace {
        Workspace::init(root, ScopeConfig::default()).unwrap()
    }

    fn reload(root: &Path) -> Workspace {
        Workspace::load(root, ScopeConfig::default()).unwrap()
    }

    fn map_bytes(root: &Path) -> Vec<u8> {
        std::fs::read(root.join(WORKSPACE_MAP_FILE)).unwrap()
    }

    fn copy_dir(from: &Path, to: &Path) {
        std::fs::create_dir_all(to).unwrap();
        for entry in std::fs::read_dir(from).unwrap() {
            let entry = entry.unwrap();
            let target = to.join(entry.file_name());
            if entry.file_type().unwrap().is_dir() {
                copy_dir(&entry.path(), &target);
            } else {
                std::fs::copy(entry.path(), &target).unwrap();
            }
        }
    }

    /// A workspace with an `origin` remote scope next to it.
    fn with_origin(dir: &Path) -> Workspace {
        let origin = dir.join("origin");
        let mut scope = Scope::create(&origin, Some("origin"), ScopeConfig::default()).unwrap();
        scope.ensure_dir().unwrap();
        let mut ws = workspace(&dir.join("ws"));
        ws.scope_mut()
            .add_remote(Remote::new("origin", origin.to_string_lossy()).unwrap())
            .unwrap();
        ws
    }

    #[test]
    fn init_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        assert!(is_workspace(dir.path()));
        assert_eq!(ws.scope().name(), dir.path().file_name().unwrap().to_string_lossy());
        assert!(dir.path().join(WORKSPACE_MAP_FILE).is_file());

        let nested = dir.path().join("components").join("foo");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(reload(&nested).root(), dir.path());
    }

    #[test]
    fn load_outside_workspace_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Workspace::load(dir.path(), ScopeConfig::default()),
            Err(WorkspaceError::NotAWorkspace(_))
        ));
    }

    #[test]
    fn add_tracks_once() {
        let dir = tempfile::tempdir().unwrap();
        write_component(dir.path(), "foo", "a", &[]);
        let mut ws = workspace(dir.path());
        assert_eq!(ws.add(Path::new("foo"), &id("ns/foo@1.0.0")).unwrap(), id("ns/foo"));
        assert_eq!(ws.map().get("ns/foo").unwrap().root, "foo");
        assert!(matches!(
            ws.add(Path::new("foo"), &id("ns/foo")),
            Err(WorkspaceError::AlreadyTracked(_))
        ));
        assert!(matches!(
            ws.add(Path::new("nope"), &id("ns/nope")),
            Err(WorkspaceError::MissingFiles { .. })
        ));
    }

    #[tokio::test]
    async fn tag_then_status() {
        let dir = tempfile::tempdir().unwrap();
        write_component(dir.path(), "foo", "a", &[]);
        let mut ws = workspace(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        assert_eq!(ws.status().unwrap().status_of(&id("ns/foo")), Some(ComponentStatus::New));

        let tagged = ws.tag(&Target::One(id("ns/foo")), &VersionBump::Patch, false).await.unwrap();
        assert_eq!(tagged, vec![id("ns/foo@0.0.1")]);
        assert!(ws.map().get("ns/foo@0.0.1").is_some());

        let report = ws.status().unwrap();
        assert_eq!(report.with_status(ComponentStatus::Staged), vec![&id("ns/foo@0.0.1")]);
        assert!(matches!(
            ws.tag(&Target::All, &VersionBump::Patch, false).await,
            Err(WorkspaceError::NothingToTag)
        ));

        std::fs::write(dir.path().join("foo/index.js"), "b").unwrap();
        assert_eq!(ws.status().unwrap().status_of(&id("ns/foo")), Some(ComponentStatus::Modified));
        let tagged = ws.tag(&Target::All, &VersionBump::Minor, false).await.unwrap();
        assert_eq!(tagged, vec![id("ns/foo@0.1.0")]);
    }

    #[tokio::test]
    async fn status_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_component(dir.path(), "foo", "a", &[]);
        write_component(dir.path(), "bar", "b", &[]);
        let mut ws = workspace(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        ws.add(Path::new("bar"), &id("ns/bar")).unwrap();
        ws.tag(&Target::One(id("ns/foo")), &VersionBump::Patch, false).await.unwrap();

        let first_report = ws.status().unwrap();
        let first = map_bytes(dir.path());
        let second_report = reload(dir.path()).status().unwrap();
        assert_eq!(first, map_bytes(dir.path()));
        assert_eq!(first_report, second_report);
    }

    #[tokio::test]
    async fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_component(dir.path(), "foo", "a", &[]);
        let mut ws = workspace(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        std::fs::remove_dir_all(dir.path().join("foo")).unwrap();

        assert_eq!(ws.status().unwrap().status_of(&id("ns/foo")), Some(ComponentStatus::Missing));
        assert!(matches!(
            ws.tag(&Target::One(id("ns/foo")), &VersionBump::Patch, true).await,
            Err(WorkspaceError::MissingFiles { .. })
        ));
    }

    #[tokio::test]
    async fn orphaned_version_resyncs_to_scope_max() {
        let dir = tempfile::tempdir().unwrap();
        write_component(dir.path(), "foo", "a", &[]);
        let mut ws = workspace(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        ws.tag(&Target::All, &VersionBump::Patch, false).await.unwrap();
        ws.tag(&Target::All, &VersionBump::Patch, true).await.unwrap();
        assert!(ws.map().get("ns/foo@0.0.2").is_some());

        ws.scope_mut().untag(&id("ns/foo@0.0.2")).unwrap();
        let report = ws.status().unwrap();
        assert_eq!(report.with_status(ComponentStatus::Staged), vec![&id("ns/foo@0.0.1")]);
        assert!(ws.map().get("ns/foo@0.0.1").is_some());

        ws.scope_mut().untag(&id("ns/foo")).unwrap();
        assert_eq!(ws.status().unwrap().status_of(&id("ns/foo")), Some(ComponentStatus::New));
        assert!(ws.map().get("ns/foo").is_some());
    }

    #[tokio::test]
    async fn deleted_map_then_force_tag() {
        let dir = tempfile::tempdir().unwrap();
        let ws_root = dir.path().join("ws");
        let saved = dir.path().join("saved");
        write_component(&ws_root, "foo", "a", &[]);
        let mut ws = with_origin(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        ws.tag(&Target::One(id("ns/foo")), &VersionBump::Patch, false).await.unwrap();
        copy_dir(&ws_root, &saved);

        std::fs::remove_file(ws_root.join(WORKSPACE_MAP_FILE)).unwrap();
        let mut ws = reload(&ws_root);
        assert!(ws.map().is_empty());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        let tagged = ws.tag(&Target::One(id("ns/foo")), &VersionBump::Patch, true).await.unwrap();
        assert_eq!(tagged, vec![id("ns/foo@0.0.2")]);

        std::fs::remove_dir_all(&ws_root).unwrap();
        copy_dir(&saved, &ws_root);
        let mut ws = reload(&ws_root);
        let report = ws.status().unwrap();
        assert_eq!(report.with_status(ComponentStatus::Staged), vec![&id("ns/foo@0.0.1")]);
        assert!(!ws.map().get("ns/foo@0.0.1").unwrap().exported);

        let exported = ws.export(&Target::One(id("ns/foo")), None).await.unwrap();
        assert_eq!(exported.exported, vec![id("origin/ns/foo@0.0.1")]);
        assert!(ws.map().get("origin/ns/foo@0.0.1").unwrap().exported);
        assert_eq!(ws.status().unwrap().messages(), vec![NOTHING_TO_TAG_OR_EXPORT]);
    }

    #[tokio::test]
    async fn retag_after_rewrite_bumps_from_scope_max() {
        let dir = tempfile::tempdir().unwrap();
        let ws_root = dir.path().join("ws");
        write_component(&ws_root, "foo", "a", &[]);
        let mut ws = with_origin(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        ws.tag(&Target::One(id("ns/foo")), &VersionBump::Patch, false).await.unwrap();
        let snapshot = map_bytes(&ws_root);

        std::fs::remove_file(ws_root.join(WORKSPACE_MAP_FILE)).unwrap();
        let mut ws = reload(&ws_root);
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        ws.tag(&Target::One(id("ns/foo")), &VersionBump::Patch, true).await.unwrap();

        std::fs::write(ws_root.join(WORKSPACE_MAP_FILE), &snapshot).unwrap();
        let mut ws = reload(&ws_root);
        let report = ws.status().unwrap();
        assert_eq!(report.with_status(ComponentStatus::Staged), vec![&id("ns/foo@0.0.2")]);
        assert!(!ws.map().get("ns/foo@0.0.2").unwrap().exported);
    }

    #[tokio::test]
    async fn wiped_scope_metadata_is_import_pending() {
        let dir = tempfile::tempdir().unwrap();
        let ws_root = dir.path().join("ws");
        write_component(&ws_root, "foo", "a", &[]);
        let mut ws = with_origin(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        ws.tag(&Target::All, &VersionBump::Patch, false).await.unwrap();
        ws.export(&Target::All, Some("origin")).await.unwrap();
        let snapshot = map_bytes(&ws_root);

        std::fs::remove_dir_all(ws.scope().cache().root()).unwrap();
        std::fs::write(ws_root.join(WORKSPACE_MAP_FILE), &snapshot).unwrap();
        let mut ws = reload(&ws_root);

        assert!(matches!(
            ws.tag(&Target::One(id("ns/foo")), &VersionBump::Patch, true).await,
            Err(WorkspaceError::ImportPending(_))
        ));
        assert!(matches!(
            ws.export(&Target::All, None).await,
            Err(WorkspaceError::ImportPending(_))
        ));
        assert_eq!(map_bytes(&ws_root), snapshot);

        let report = ws.status().unwrap();
        assert_eq!(report.with_status(ComponentStatus::ImportPending), vec![&id("origin/ns/foo@0.0.1")]);
        assert!(report.messages().contains(&IMPORT_PENDING_MESSAGE));
        assert_eq!(map_bytes(&ws_root), snapshot);
    }

    #[tokio::test]
    async fn deleted_scope_directory_with_exported_entry() {
        let dir = tempfile::tempdir().unwrap();
        let ws_root = dir.path().join("ws");
        write_component(&ws_root, "foo", "a", &[]);
        let mut ws = with_origin(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        ws.tag(&Target::All, &VersionBump::Patch, false).await.unwrap();
        ws.export(&Target::All, Some("origin")).await.unwrap();
        let snapshot = map_bytes(&ws_root);

        std::fs::remove_dir_all(ws_root.join(WORKSPACE_SCOPE_DIR)).unwrap();
        let mut ws = reload(&ws_root);
        assert!(ws.scope().created());

        assert!(matches!(
            ws.tag(&Target::One(id("ns/foo")), &VersionBump::Patch, true).await,
            Err(WorkspaceError::ImportPending(_))
        ));
        let report = ws.status().unwrap();
        assert_eq!(report.with_status(ComponentStatus::ImportPending), vec![&id("origin/ns/foo@0.0.1")]);
        assert!(report.messages().contains(&IMPORT_PENDING_MESSAGE));
        assert_eq!(map_bytes(&ws_root), snapshot);
        assert!(!ws_root.join(WORKSPACE_SCOPE_DIR).exists());
    }

    #[tokio::test]
    async fn deleted_scope_directory_with_staged_entry() {
        let dir = tempfile::tempdir().unwrap();
        write_component(dir.path(), "foo", "a", &[]);
        let mut ws = workspace(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        ws.tag(&Target::All, &VersionBump::Patch, false).await.unwrap();
        assert!(ws.map().get("ns/foo@0.0.1").is_some());

        std::fs::remove_dir_all(dir.path().join(WORKSPACE_SCOPE_DIR)).unwrap();
        let mut ws = reload(dir.path());
        assert_eq!(ws.status().unwrap().status_of(&id("ns/foo")), Some(ComponentStatus::New));
        assert!(ws.map().get("ns/foo").is_some());

        let tagged = ws.tag(&Target::One(id("ns/foo")), &VersionBump::Patch, false).await.unwrap();
        assert_eq!(tagged, vec![id("ns/foo@0.0.1")]);
        assert!(is_workspace(dir.path()));
        assert!(!reload(dir.path()).scope().created());
    }

    #[tokio::test]
    async fn export_of_untracked_staged_component() {
        let dir = tempfile::tempdir().unwrap();
        let ws_root = dir.path().join("ws");
        write_component(&ws_root, "foo", "a", &[]);
        let mut ws = with_origin(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        ws.tag(&Target::All, &VersionBump::Patch, false).await.unwrap();
        std::fs::remove_file(ws_root.join(WORKSPACE_MAP_FILE)).unwrap();
        let mut ws = reload(&ws_root);

        let report = ws.status().unwrap();
        assert_eq!(report.components.len(), 1);
        assert_eq!(report.components[0].status, ComponentStatus::Staged);
        assert!(!report.components[0].is_tracked());
        assert!(matches!(
            ws.show(&id("ns/foo")),
            Err(WorkspaceError::MissingWorkspaceComponent(_))
        ));

        let exported = ws.export(&Target::All, None).await.unwrap();
        assert_eq!(exported.untracked, vec![id("ns/foo@0.0.1")]);
        assert!(exported.messages().contains(&NO_LOCAL_CHANGES.to_string()));
        assert!(ws.map().is_empty());
    }

    #[tokio::test]
    async fn export_one_untracked_staged_component() {
        let dir = tempfile::tempdir().unwrap();
        let ws_root = dir.path().join("ws");
        write_component(&ws_root, "foo", "a", &[]);
        let mut ws = with_origin(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        ws.tag(&Target::All, &VersionBump::Patch, false).await.unwrap();
        std::fs::remove_file(ws_root.join(WORKSPACE_MAP_FILE)).unwrap();
        let mut ws = reload(&ws_root);

        let report = ws.export(&Target::One(id("ns/foo")), None).await.unwrap();
        assert!(report.exported.is_empty());
        assert_eq!(report.untracked, vec![id("ns/foo@0.0.1")]);
        assert!(report.messages().contains(&NO_LOCAL_CHANGES.to_string()));
        assert!(ws.map().is_empty());
        assert!(ws.scope().local_staged().unwrap().is_empty());
    }

    #[tokio::test]
    async fn export_one_takes_staged_dependencies_along() {
        let dir = tempfile::tempdir().unwrap();
        let ws_root = dir.path().join("ws");
        write_component(&ws_root, "app", "app", &["ns/zed"]);
        write_component(&ws_root, "zed", "zed", &[]);
        let mut ws = with_origin(dir.path());
        ws.add(Path::new("app"), &id("ns/app")).unwrap();
        ws.add(Path::new("zed"), &id("ns/zed")).unwrap();
        ws.tag(&Target::All, &VersionBump::Patch, false).await.unwrap();

        let report = ws.export(&Target::One(id("ns/app")), None).await.unwrap();
        assert_eq!(report.exported, vec![id("origin/ns/zed@0.0.1"), id("origin/ns/app@0.0.1")]);
        assert!(ws.map().get("origin/ns/zed@0.0.1").unwrap().exported);

        let origin = Scope::load(&dir.path().join("origin"), ScopeConfig::default()).unwrap();
        assert!(origin.dependency_map().get(&id("ns/app@0.0.1")).is_some());
        assert!(origin.dependency_map().get(&id("ns/zed@0.0.1")).is_some());
    }

    #[tokio::test]
    async fn export_pushes_dependencies_first() {
        let dir = tempfile::tempdir().unwrap();
        let ws_root = dir.path().join("ws");
        write_component(&ws_root, "app", "app", &["ns/zed"]);
        write_component(&ws_root, "zed", "zed", &[]);
        let mut ws = with_origin(dir.path());
        ws.add(Path::new("app"), &id("ns/app")).unwrap();
        ws.add(Path::new("zed"), &id("ns/zed")).unwrap();

        let tagged = ws.tag(&Target::All, &VersionBump::Patch, false).await.unwrap();
        assert_eq!(tagged, vec![id("ns/zed@0.0.1"), id("ns/app@0.0.1")]);

        let report = ws.export(&Target::All, None).await.unwrap();
        assert_eq!(report.exported, vec![id("origin/ns/zed@0.0.1"), id("origin/ns/app@0.0.1")]);

        let origin = Scope::load(&dir.path().join("origin"), ScopeConfig::default()).unwrap();
        let edges = origin.dependency_map().get(&id("ns/app@0.0.1")).unwrap();
        assert_eq!(edges.dependencies, vec![id("ns/zed@0.0.1")]);

        let view = ws.show(&id("ns/app")).unwrap();
        assert_eq!(view.state.status, ComponentStatus::Exported);
        assert_eq!(view.versions, vec![Version::new(0, 0, 1)]);
        assert_eq!(view.manifest.unwrap().dependencies, vec!["ns/zed".to_string()]);
    }

    #[tokio::test]
    async fn export_needs_a_remote() {
        let dir = tempfile::tempdir().unwrap();
        write_component(dir.path(), "foo", "a", &[]);
        let mut ws = workspace(dir.path());
        ws.add(Path::new("foo"), &id("ns/foo")).unwrap();
        assert!(matches!(
            ws.export(&Target::All, None).await,
            Err(WorkspaceError::NoRemote)
        ));
        assert!(matches!(
            ws.export(&Target::One(id("ns/foo")), Some("origin")).await,
            Err(WorkspaceError::Scope(_))
        ));
    }

    #[test]
    fn ordering_puts_dependencies_first() {
        let items = vec![
            (id("ns/a"), vec![id("ns/b")]),
            (id("ns/b"), vec![id("ns/c@0.0.1")]),
            (id("ns/c"), vec![]),
            (id("ns/x"), vec![id("ns/y")]),
            (id("ns/y"), vec![id("ns/x")]),
        ];
        let ordered: Vec<String> = dependencies_first(items, |(id, _)| id, |(_, deps)| deps.clone())
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect();
        assert_eq!(ordered, vec!["ns/c", "ns/b", "ns/a", "ns/x", "ns/y"]);
    }
}
