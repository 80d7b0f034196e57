use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("invalid archive magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unsupported archive version: {0}")]
    UnsupportedVersion(u32),

    #[error("archive checksum mismatch")]
    ChecksumMismatch,

    #[error("corrupt archive entry at offset {offset}: {reason}")]
    CorruptEntry { offset: u64, reason: String },

    #[error("CRC32 mismatch for entry {name}")]
    CrcMismatch { name: String },

    #[error("archive {0} has no manifest entry")]
    MissingManifest(String),

    #[error("archive entry {entry} is not listed in the manifest of {archive}")]
    UnexpectedEntry { archive: String, entry: String },

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Type(#[from] scope_types::TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
