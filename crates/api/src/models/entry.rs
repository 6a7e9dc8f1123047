use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    Archive,
}

/// A classpath candidate on the local file system. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl CandidateEntry {
    pub fn new(path: PathBuf, kind: EntryKind) -> Self {
        Self { path, kind }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), EntryKind::Directory)
    }

    pub fn archive(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), EntryKind::Archive)
    }

    /// Classify by what is currently on disk; anything that is not a
    /// directory is treated as an archive.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Self::directory(path)
        } else {
            Self::archive(path)
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

impl From<CandidateEntry> for PathBuf {
    fn from(entry: CandidateEntry) -> Self {
        entry.path
    }
}
