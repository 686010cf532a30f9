//! File metadata types — node kinds, stat results, directory entries.

use serde::{Deserialize, Serialize};

/// Kind of a filesystem node.
///
/// The numeric values are part of the host contract: `File = 1`,
/// `Directory = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FileKind {
    File = 1,
    Directory = 2,
}

impl FileKind {
    /// The host's numeric code for this kind.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::File => write!(f, "file"),
            FileKind::Directory => write!(f, "directory"),
        }
    }
}

/// Metadata reported by `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// Node kind.
    pub kind: FileKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Last modification time, milliseconds since the Unix epoch.
    pub mtime_ms: u64,
}

/// A single entry returned by `read_directory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Name of the entry (not the full path).
    pub name: String,
    /// Kind of the entry.
    pub kind: FileKind,
}
