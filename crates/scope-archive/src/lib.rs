//! Archive payloads for moving components between scopes.
//!
//! An archive is a named bundle holding one manifest entry (serialized
//! component metadata) and any number of named file blobs. It is the only
//! unit exchanged by fetch and push.
//!
//! # Format
//!
//! - **Header**: `SCPA` magic, format version, archive name, entry count
//! - **Entries**: type byte, name, sizes, CRC32, zstd-compressed data
//! - **Trailer**: BLAKE3 checksum of everything before it

pub mod component;
pub mod entry;
pub mod error;
pub mod reader;
pub mod writer;

use std::collections::BTreeMap;

use tracing::trace;

pub use component::{pack_component, unpack_component};
pub use entry::{ArchiveEntry, EntryKind};
pub use error::{ArchiveError, ArchiveResult};
pub use reader::ArchiveReader;
pub use writer::ArchiveWriter;

/// Name under which the manifest entry is written.
pub const MANIFEST_ENTRY: &str = "component.json";

/// A decoded archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Archive {
    pub name: String,
    pub manifest: Vec<u8>,
    /// Logical file name -> contents.
    pub files: BTreeMap<String, Vec<u8>>,
}

impl Archive {
    pub fn to_bytes(&self) -> ArchiveResult<Vec<u8>> {
        let mut writer = ArchiveWriter::new(&self.name);
        writer.add_manifest(&self.manifest);
        for (name, data) in &self.files {
            writer.add_file(name, data);
        }
        let bytes = writer.finish()?;
        trace!(name = %self.name, size = bytes.len(), "encoded archive");
        Ok(bytes)
    }

    pub fn from_bytes(data: &[u8]) -> ArchiveResult<Self> {
        let (name, entries) = ArchiveReader::new(data)?.read_all()?;
        let mut manifest = None;
        let mut files = BTreeMap::new();
        for entry in entries {
            match entry.kind {
                EntryKind::Manifest if manifest.is_none() => manifest = Some(entry.data),
                EntryKind::Manifest => {
                    return Err(ArchiveError::UnexpectedEntry {
                        archive: name,
                        entry: entry.name,
                    })
                }
                EntryKind::File => {
                    files.insert(entry.name, entry.data);
                }
            }
        }
        let manifest = manifest.ok_or_else(|| ArchiveError::MissingManifest(name.clone()))?;
        Ok(Self {
            name,
            manifest,
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_roundtrip() {
        let archive = Archive {
            name: "ns/foo@0.0.1".into(),
            manifest: b"{}".to_vec(),
            files: BTreeMap::from([("impl/index.js".to_string(), vec![0xAB; 100_000])]),
        };
        let bytes = archive.to_bytes().unwrap();
        assert!(bytes.len() < 100_000);
        assert_eq!(Archive::from_bytes(&bytes).unwrap(), archive);
    }

    #[test]
    fn archive_without_manifest_is_rejected() {
        let mut writer = ArchiveWriter::new("ns/foo@0.0.1");
        writer.add_file("impl/index.js", b"x");
        let bytes = writer.finish().unwrap();
        assert!(matches!(Archive::from_bytes(&bytes), Err(ArchiveError::MissingManifest(_))));
    }

    #[test]
    fn second_manifest_is_rejected() {
        let mut writer = ArchiveWriter::new("ns/foo@0.0.1");
        writer.add_manifest(b"{}");
        writer.add_manifest(b"{}");
        assert!(matches!(
            Archive::from_bytes(&writer.finish().unwrap()),
            Err(ArchiveError::UnexpectedEntry { .. })
        ));
    }
}
