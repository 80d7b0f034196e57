//! User-wide configuration at `~/.scope/config.toml`.
//!
//! ```toml
//! [remotes]
//! origin = "/srv/scopes/shared"
//! ```
//!
//! Every function has two forms: `fn_at(home, ..)` takes the home directory
//! explicitly and is what tests use; `fn(..)` resolves it with
//! `dirs::home_dir()` and delegates.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RemoteError, RemoteResult};
use crate::remote::{Remote, Remotes};

const CONFIG_DIR: &str = ".scope";
const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub remotes: Remotes,
}

/// `<home>/.scope/config.toml`
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Load the global configuration. A missing file is an empty configuration.
pub fn load_at(home: &Path) -> RemoteResult<GlobalConfig> {
    let path = config_path_at(home);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(GlobalConfig::default()),
        Err(e) => return Err(e.into()),
    };
    toml::from_str(&contents).map_err(|e| RemoteError::ConfigParse {
        path,
        reason: e.to_string(),
    })
}

pub fn load() -> RemoteResult<GlobalConfig> {
    load_at(&home()?)
}

/// Write the configuration through a sibling temp file and rename.
pub fn save_at(home: &Path, config: &GlobalConfig) -> RemoteResult<()> {
    let path = config_path_at(home);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| RemoteError::ConfigSerialize(e.to_string()))?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, &path)?;
    debug!(path = %path.display(), remotes = config.remotes.len(), "saved global config");
    Ok(())
}

pub fn save(config: &GlobalConfig) -> RemoteResult<()> {
    save_at(&home()?, config)
}

/// Add a remote to the global table.
pub fn add_remote_at(home: &Path, remote: Remote) -> RemoteResult<()> {
    let mut config = load_at(home)?;
    config.remotes.add(remote)?;
    save_at(home, &config)
}

pub fn add_remote(remote: Remote) -> RemoteResult<()> {
    add_remote_at(&home()?, remote)
}

/// Remove a remote from the global table.
pub fn remove_remote_at(home: &Path, alias: &str) -> RemoteResult<Remote> {
    let mut config = load_at(home)?;
    let removed = config.remotes.remove(alias)?;
    save_at(home, &config)?;
    Ok(removed)
}

pub fn remove_remote(alias: &str) -> RemoteResult<Remote> {
    remove_remote_at(&home()?, alias)
}

fn home() -> RemoteResult<PathBuf> {
    dirs::home_dir().ok_or(RemoteError::HomeNotFound)
}
