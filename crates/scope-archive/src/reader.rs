use crate::entry::{ArchiveEntry, EntryKind};
use crate::error::{ArchiveError, ArchiveResult};
use crate::writer::{decode_varint, FORMAT_VERSION, MAGIC};

const CHECKSUM_LEN: usize = 32;

/// Sequential decoder for the format produced by
/// [`ArchiveWriter`](crate::ArchiveWriter).
#[derive(Debug)]
pub struct ArchiveReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ArchiveReader<'a> {
    /// Validate framing and the trailing checksum.
    pub fn new(data: &'a [u8]) -> ArchiveResult<Self> {
        if data.len() < 8 + CHECKSUM_LEN {
            return Err(ArchiveError::CorruptEntry {
                offset: 0,
                reason: "archive data too short".into(),
            });
        }
        if &data[0..4] != MAGIC {
            return Err(ArchiveError::InvalidMagic {
                expected: String::from_utf8_lossy(MAGIC).into(),
                actual: String::from_utf8_lossy(&data[0..4]).into(),
            });
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&data[4..8]);
        let version = u32::from_be_bytes(version);
        if version != FORMAT_VERSION {
            return Err(ArchiveError::UnsupportedVersion(version));
        }
        let (body, trailer) = data.split_at(data.len() - CHECKSUM_LEN);
        if blake3::hash(body).as_bytes() != trailer {
            return Err(ArchiveError::ChecksumMismatch);
        }
        Ok(Self { data: body, pos: 8 })
    }

    fn corrupt(&self, reason: impl Into<String>) -> ArchiveError {
        ArchiveError::CorruptEntry {
            offset: self.pos as u64,
            reason: reason.into(),
        }
    }

    fn take(&mut self, len: usize) -> ArchiveResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| self.corrupt("entry extends beyond archive"))?;
        let data = self.data;
        let slice = &data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn varint(&mut self) -> ArchiveResult<u64> {
        let (value, consumed) = decode_varint(&self.data[self.pos..], self.pos as u64)?;
        self.pos += consumed;
        Ok(value)
    }

    fn string(&mut self) -> ArchiveResult<String> {
        let len = self.varint()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| self.corrupt("name is not UTF-8"))
    }

    fn u32(&mut self) -> ArchiveResult<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    /// Decode the archive name and every entry.
    pub fn read_all(mut self) -> ArchiveResult<(String, Vec<ArchiveEntry>)> {
        let name = self.string()?;
        let count = self.u32()?;
        let mut entries = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let type_byte = self.take(1)?[0];
            let kind = EntryKind::from_type_byte(type_byte)
                .ok_or_else(|| self.corrupt(format!("unknown type byte: {type_byte}")))?;
            let entry_name = self.string()?;
            let size = self.varint()?;
            let compressed_size = self.varint()? as usize;
            let expected_crc = self.u32()?;
            let compressed = self.take(compressed_size)?;

            if crc32fast::hash(compressed) != expected_crc {
                return Err(ArchiveError::CrcMismatch { name: entry_name });
            }
            let data = zstd::decode_all(compressed)
                .map_err(|e| ArchiveError::DecompressionFailed(e.to_string()))?;
            if data.len() as u64 != size {
                return Err(self.corrupt(format!(
                    "size mismatch: expected {size}, got {}",
                    data.len()
                )));
            }
            entries.push(ArchiveEntry {
                kind,
                name: entry_name,
                data,
            });
        }

        if self.pos != self.data.len() {
            return Err(self.corrupt("trailing bytes after last entry"));
        }
        Ok((name, entries))
    }
}
