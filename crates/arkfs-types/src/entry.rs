use std::fmt;

use serde::{Deserialize, Serialize};

/// On-disk type tag for a directory entry.
pub const TAG_DIRECTORY: u8 = 0x01;
/// On-disk type tag for a file entry.
pub const TAG_FILE: u8 = 0x02;

/// The kind of a namespace entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// A directory: owns a set of child entries keyed by name.
    Directory,
    /// A file: references exactly one blob by id.
    File,
}

impl EntryKind {
    /// The 1-byte tag stored with every entry.
    pub fn type_tag(self) -> u8 {
        match self {
            Self::Directory => TAG_DIRECTORY,
            Self::File => TAG_FILE,
        }
    }

    /// Decode a stored type tag. Returns `None` for unknown tags.
    pub fn from_type_tag(tag: u8) -> Option<Self> {
        match tag {
            TAG_DIRECTORY => Some(Self::Directory),
            TAG_FILE => Some(Self::File),
            _ => None,
        }
    }

    /// Returns `true` for [`EntryKind::Directory`].
    pub fn is_dir(self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::File => write!(f, "file"),
        }
    }
}

/// One record in a directory listing: the child's name and kind.
///
/// Listings are ordered lexicographically by name, matching the iteration
/// order of the backing store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// The child's path segment, unique among its siblings.
    pub name: String,
    /// Directory or file.
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}
