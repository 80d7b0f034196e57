/// Type tag for archive entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// Serialized component metadata. Exactly one per archive.
    Manifest,
    /// A named file blob.
    File,
}

impl EntryKind {
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::Manifest => 1,
            Self::File => 2,
        }
    }

    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Manifest),
            2 => Some(Self::File),
            _ => None,
        }
    }
}

/// A single entry of an archive, uncompressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub kind: EntryKind,
    pub name: String,
    pub data: Vec<u8>,
}
