use crate::entry::{ArchiveEntry, EntryKind};
use crate::error::{ArchiveError, ArchiveResult};

pub(crate) const MAGIC: &[u8; 4] = b"SCPA";
pub(crate) const FORMAT_VERSION: u32 = 1;
const ZSTD_LEVEL: i32 = 3;

/// Builds the binary form of an archive.
///
/// Layout: magic, version (u32 BE), name (varint length + UTF-8), entry
/// count (u32 BE), then per entry a type byte, the entry name, the
/// uncompressed and compressed sizes as varints, the CRC32 of the
/// compressed bytes (u32 BE) and the zstd-compressed data. A BLAKE3 hash of
/// everything before it closes the archive.
pub struct ArchiveWriter {
    name: String,
    entries: Vec<ArchiveEntry>,
}

impl ArchiveWriter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn add_manifest(&mut self, data: &[u8]) {
        self.add(EntryKind::Manifest, crate::MANIFEST_ENTRY, data);
    }

    pub fn add_file(&mut self, name: &str, data: &[u8]) {
        self.add(EntryKind::File, name, data);
    }

    fn add(&mut self, kind: EntryKind, name: &str, data: &[u8]) {
        self.entries.push(ArchiveEntry {
            kind,
            name: name.to_string(),
            data: data.to_vec(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> ArchiveResult<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        encode_str(&mut out, &self.name);
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());

        for entry in &self.entries {
            out.push(entry.kind.type_byte());
            encode_str(&mut out, &entry.name);

            let compressed = zstd::encode_all(entry.data.as_slice(), ZSTD_LEVEL)
                .map_err(|e| ArchiveError::CompressionFailed(e.to_string()))?;
            encode_varint(&mut out, entry.data.len() as u64);
            encode_varint(&mut out, compressed.len() as u64);
            out.extend_from_slice(&crc32fast::hash(&compressed).to_be_bytes());
            out.extend_from_slice(&compressed);
        }

        let checksum = *blake3::hash(&out).as_bytes();
        out.extend_from_slice(&checksum);
        Ok(out)
    }
}

fn encode_str(buf: &mut Vec<u8>, s: &str) {
    encode_varint(buf, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

pub(crate) fn encode_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Returns `(value, bytes_consumed)`.
pub(crate) fn decode_varint(data: &[u8], offset: u64) -> ArchiveResult<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in data.iter().enumerate() {
        value |= ((byte & 0x7F) as u64) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        if shift >= 64 {
            return Err(ArchiveError::CorruptEntry {
                offset,
                reason: "varint overflow".into(),
            });
        }
    }
    Err(ArchiveError::CorruptEntry {
        offset,
        reason: "truncated varint".into(),
    })
}
