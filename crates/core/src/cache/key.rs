use crate::error::{ClasscopeError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use xxhash_rust::xxh3::xxh3_64;

pub const MARKER_EXTENSION: &str = "cached";
pub const LOCK_EXTENSION: &str = "lock";

/// Identity of one unpacked collection.
///
/// Name, canonical path, length and modification time are all hashed, so a
/// rebuilt archive lands in a fresh slot without any purge.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CollectionKey {
    pub name: String,
    pub canonical_path: PathBuf,
    pub len: u64,
    pub mtime_ms: u128,
}

impl CollectionKey {
    pub fn from_archive(path: &Path) -> Result<Self> {
        let canonical_path = fs::canonicalize(path)
            .map_err(|e| ClasscopeError::io(format!("resolving {}", path.display()), e))?;
        let metadata = fs::metadata(&canonical_path)
            .map_err(|e| ClasscopeError::io(format!("reading metadata of {}", path.display()), e))?;
        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let name = canonical_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "collection".to_string());

        Ok(Self {
            name,
            canonical_path,
            len: metadata.len(),
            mtime_ms,
        })
    }

    pub fn hash(&self) -> u64 {
        let key_str = format!(
            "{}:{}:{}:{}",
            self.name,
            self.canonical_path.display(),
            self.len,
            self.mtime_ms
        );
        xxh3_64(key_str.as_bytes())
    }

    /// Directory name of the slot, e.g. `app-1f2e3d4c5b6a7980`
    pub fn derived_name(&self) -> String {
        let safe: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}-{:016x}", safe, self.hash())
    }
}

/// Files backing one cached unpack: contents, completion marker, and lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSlot {
    pub name: String,
    pub target: PathBuf,
    pub marker: PathBuf,
    pub lock: PathBuf,
}

impl CacheSlot {
    pub fn new(root: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            target: root.join(name),
            marker: root.join(format!("{}.{}", name, MARKER_EXTENSION)),
            lock: root.join(format!("{}.{}", name, LOCK_EXTENSION)),
        }
    }

    pub fn for_key(root: &Path, key: &CollectionKey) -> Self {
        Self::new(root, &key.derived_name())
    }

    pub fn is_complete(&self) -> bool {
        self.target.is_dir() && self.marker.is_file()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.exists()
    }
}
