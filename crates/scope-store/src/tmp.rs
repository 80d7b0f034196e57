use std::path::{Path, PathBuf};

use crate::error::StoreResult;
use crate::fs::{remove_file_if_exists, write_atomic};

const ARCHIVE_EXT: &str = "scpa";

/// Transient staging area for archives awaiting transfer.
#[derive(Clone, Debug)]
pub struct TmpArea {
    root: PathBuf,
}

impl TmpArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure(&self) -> StoreResult<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Path an archive called `name` is staged at. Path separators in the
    /// name are flattened so every archive sits directly under the root.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let file: String = name
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' | '@' => c,
                _ => '_',
            })
            .collect();
        self.root.join(format!("{file}.{ARCHIVE_EXT}"))
    }

    pub fn stage(&self, name: &str, bytes: &[u8]) -> StoreResult<PathBuf> {
        let path = self.path_for(name);
        write_atomic(&path, bytes)?;
        Ok(path)
    }

    pub fn read(&self, name: &str) -> StoreResult<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn discard(&self, name: &str) -> StoreResult<bool> {
        remove_file_if_exists(&self.path_for(name))
    }

    /// Drop everything staged. Returns how many archives were removed.
    pub fn clear(&self) -> StoreResult<usize> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ARCHIVE_EXT)
                && remove_file_if_exists(&path)?
            {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
