use super::key::{CacheSlot, CollectionKey, LOCK_EXTENSION, MARKER_EXTENSION};
use super::lock::{PollingFileLock, SlotLock};
use crate::config::{DEFAULT_LOCK_TIMEOUT, MAX_LOCK_TIMEOUT};
use crate::error::{ClasscopeError, Result};
use classcope_api::{
    CacheStats, CandidateEntry, CollectionCacheManager, SlotState, SlotSummary,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Compiled-class directories inside a collection archive
pub const CLASSES_DIRS: &[&str] = &["BOOT-INF/classes", "WEB-INF/classes"];
/// Nested library directories inside a collection archive
pub const LIBRARY_DIRS: &[&str] = &["BOOT-INF/lib", "WEB-INF/lib"];

/// Unpacks collection archives once per [`CollectionKey`] under a shared root.
///
/// Safe to share between threads and between processes pointed at the same
/// root: each slot is mutated only while its lock file is held.
pub struct CollectionCache {
    root: PathBuf,
    timeout: Duration,
    lock: Arc<dyn SlotLock>,
    extractions: AtomicUsize,
}

impl CollectionCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            timeout: DEFAULT_LOCK_TIMEOUT,
            lock: Arc::new(PollingFileLock::new()),
            extractions: AtomicUsize::new(0),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.min(MAX_LOCK_TIMEOUT);
        self
    }

    pub fn with_lock(mut self, lock: Arc<dyn SlotLock>) -> Self {
        self.lock = lock;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of extraction passes this instance performed
    pub fn extraction_count(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }

    pub fn slot_for(&self, archive: &Path) -> Result<CacheSlot> {
        Ok(CacheSlot::for_key(
            &self.root,
            &CollectionKey::from_archive(archive)?,
        ))
    }

    /// Class directories and library archives of `archive`, unpacking it on first use
    pub fn unpack(&self, archive: &Path) -> Result<Vec<CandidateEntry>> {
        let slot = self.slot_for(archive)?;
        fs::create_dir_all(&self.root).map_err(|e| {
            ClasscopeError::io(format!("creating cache root {}", self.root.display()), e)
        })?;

        let _guard = self.lock.acquire(&slot.lock, self.timeout)?;

        if slot.is_complete() {
            debug!("Reusing unpacked {} from {}", archive.display(), slot.target.display());
            return read_slot(&slot.target)
                .map_err(|e| ClasscopeError::io(format!("reading {}", slot.target.display()), e));
        }

        self.extractions.fetch_add(1, Ordering::SeqCst);
        info!("Unpacking {} into {}", archive.display(), slot.target.display());

        let extracted = clear_stale(&slot)
            .and_then(|()| extract_into(archive, &slot.target))
            .and_then(|entries| File::create(&slot.marker).map(|_| entries));

        match extracted {
            Ok(entries) => {
                debug!("Unpacked {} entries from {}", entries.len(), archive.display());
                Ok(entries)
            }
            Err(source) => {
                if let Err(e) = fs::remove_dir_all(&slot.target) {
                    if e.kind() != io::ErrorKind::NotFound {
                        warn!("Failed to clean up {}: {}", slot.target.display(), e);
                    }
                }
                Err(ClasscopeError::Extraction {
                    archive: archive.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Every slot under the root, grouped by derived name
    pub fn slots(&self) -> Vec<SlotSummary> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut names = BTreeSet::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if path.is_dir() {
                names.insert(file_name.to_string());
            } else if let Some((stem, ext)) = file_name.rsplit_once('.') {
                if ext == MARKER_EXTENSION || ext == LOCK_EXTENSION {
                    names.insert(stem.to_string());
                }
            }
        }

        names
            .into_iter()
            .map(|name| {
                let slot = CacheSlot::new(&self.root, &name);
                let state = if slot.is_locked() {
                    SlotState::Locked
                } else if slot.is_complete() {
                    SlotState::Complete
                } else {
                    SlotState::Incomplete
                };
                let (size_bytes, file_count) = disk_usage(&slot.target);
                SlotSummary {
                    name,
                    target: slot.target,
                    state,
                    size_bytes,
                    file_count,
                }
            })
            .collect()
    }

    /// Remove all slots that are not currently locked.
    ///
    /// Each slot is removed while holding its lock, taken without waiting; a
    /// slot another agent holds is skipped.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for summary in self.slots() {
            if summary.state == SlotState::Locked {
                debug!("Skipping locked slot {}", summary.name);
                continue;
            }
            let slot = CacheSlot::new(&self.root, &summary.name);
            let _guard = match self.lock.acquire(&slot.lock, Duration::ZERO) {
                Ok(guard) => guard,
                Err(ClasscopeError::LockTimeout { .. }) => {
                    debug!("Slot {} was locked meanwhile, skipping", summary.name);
                    continue;
                }
                Err(e) => return Err(e),
            };
            // Marker first: a target without a marker is never reused
            remove_if_present(&slot.marker, false)?;
            remove_if_present(&slot.target, true)?;
            removed += 1;
        }
        Ok(removed)
    }
}

impl CollectionCacheManager for CollectionCache {
    fn stats(&self) -> CacheStats {
        let slots = self.slots();
        CacheStats {
            cache_dir: self.root.clone(),
            total_slots: slots.len(),
            complete_slots: slots
                .iter()
                .filter(|s| s.state == SlotState::Complete)
                .count(),
            total_bytes: slots.iter().map(|s| s.size_bytes).sum(),
        }
    }

    fn slots(&self) -> Vec<SlotSummary> {
        self.slots()
    }

    fn clear(&self) -> std::result::Result<usize, String> {
        self.clear().map_err(|e| e.to_string())
    }
}

/// Remove leftovers of an earlier pass that never wrote its marker
fn clear_stale(slot: &CacheSlot) -> io::Result<()> {
    if slot.marker.exists() {
        fs::remove_file(&slot.marker)?;
    }
    if slot.target.exists() {
        debug!("Discarding stale contents at {}", slot.target.display());
        fs::remove_dir_all(&slot.target)?;
    }
    Ok(())
}

/// Single streaming pass over the archive. Everything is written to disk;
/// class directories and direct children of library directories are returned.
fn extract_into(archive: &Path, target: &Path) -> io::Result<Vec<CandidateEntry>> {
    fs::create_dir_all(target)?;
    let mut zip = ZipArchive::new(File::open(archive)?)?;

    let mut classes = BTreeSet::new();
    let mut libraries = BTreeMap::new();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name().map(|p| normalize(&p)) else {
            warn!("Skipping unsafe entry {:?} in {}", entry.name(), archive.display());
            continue;
        };
        // Classify by the path actually written, so a later read of the slot agrees
        let name = relative_name(&relative);
        if name.is_empty() {
            continue;
        }

        if let Some(dir) = CLASSES_DIRS.iter().find(|d| is_within(&name, d)) {
            classes.insert(*dir);
        }

        let out = target.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = File::create(&out)?;
        io::copy(&mut entry, &mut writer)?;

        if LIBRARY_DIRS.iter().any(|d| is_direct_child(&name, d)) {
            libraries.insert(out.clone(), CandidateEntry::archive(out));
        }
    }

    let mut entries: Vec<CandidateEntry> = CLASSES_DIRS
        .iter()
        .filter(|d| classes.contains(*d))
        .map(|d| CandidateEntry::directory(target.join(d)))
        .collect();
    entries.extend(libraries.into_values());
    Ok(entries)
}

/// Same result as the extraction pass, read back from a complete slot
fn read_slot(target: &Path) -> io::Result<Vec<CandidateEntry>> {
    let mut entries: Vec<CandidateEntry> = CLASSES_DIRS
        .iter()
        .map(|d| target.join(d))
        .filter(|p| p.is_dir())
        .map(CandidateEntry::directory)
        .collect();

    let mut libraries = BTreeSet::new();
    for dir in LIBRARY_DIRS {
        let lib_dir = target.join(dir);
        if !lib_dir.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&lib_dir)? {
            let path = entry?.path();
            if path.is_file() {
                libraries.insert(path);
            }
        }
    }
    entries.extend(libraries.into_iter().map(CandidateEntry::archive));
    Ok(entries)
}

/// Drop `.` components and fold `..` into the preceding component
fn normalize(path: &Path) -> PathBuf {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::ParentDir => {
                clean.pop();
            }
            _ => {}
        }
    }
    clean
}

/// `/`-separated form of a relative path, for prefix checks against archive layouts
fn relative_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_within(name: &str, dir: &str) -> bool {
    name.strip_prefix(dir)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn is_direct_child(name: &str, dir: &str) -> bool {
    name.strip_prefix(dir)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

fn disk_usage(path: &Path) -> (u64, usize) {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .fold((0, 0), |(bytes, count), e| {
            (bytes + e.metadata().map(|m| m.len()).unwrap_or(0), count + 1)
        })
}

fn remove_if_present(path: &Path, dir: bool) -> Result<()> {
    let removed = if dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match removed {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ClasscopeError::io(format!("removing {}", path.display()), e)),
    }
}
