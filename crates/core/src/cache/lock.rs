//! Cross-process slot lock.
//!
//! [`PollingFileLock`] emulates an advisory mutex on the file system for
//! environments without a native lock API: acquisition atomically creates the
//! lock file and, while another agent holds it, polls at a fixed interval until
//! the timeout runs out. There is no cancellation; a call ends in success or
//! timeout. Another [`SlotLock`] (e.g. an OS advisory lock) can be substituted
//! without changing callers.

use crate::error::{ClasscopeError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub trait SlotLock: Send + Sync {
    /// Block until the lock at `path` is held or `timeout` elapses
    fn acquire(&self, path: &Path, timeout: Duration) -> Result<LockGuard>;
}

/// Held lock. Dropping it releases the lock by deleting the lock file.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    handle: Option<File>,
}

impl LockGuard {
    /// Guard that keeps `handle` open for as long as the lock is held
    pub fn with_handle(path: PathBuf, handle: File) -> Self {
        Self {
            path,
            handle: Some(handle),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Close before unlinking; some platforms refuse to delete open files
        drop(self.handle.take());
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Released lock {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to release lock {}: {}", self.path.display(), e),
        }
    }
}

/// Bounded spin on atomic lock-file creation
#[derive(Debug, Clone)]
pub struct PollingFileLock {
    interval: Duration,
}

impl PollingFileLock {
    pub fn new() -> Self {
        Self {
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    fn try_create(path: &Path) -> std::io::Result<Option<File>> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                // Holder id is diagnostics only
                let _ = writeln!(file, "pid {}", std::process::id());
                Ok(Some(file))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Default for PollingFileLock {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotLock for PollingFileLock {
    fn acquire(&self, path: &Path, timeout: Duration) -> Result<LockGuard> {
        let started = Instant::now();
        let mut contended = false;

        loop {
            let created = Self::try_create(path)
                .map_err(|e| ClasscopeError::io(format!("creating lock {}", path.display()), e))?;
            if let Some(handle) = created {
                if contended {
                    debug!(
                        "Acquired lock {} after {:?}",
                        path.display(),
                        started.elapsed()
                    );
                }
                return Ok(LockGuard::with_handle(path.to_path_buf(), handle));
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                let holder = fs::read_to_string(path)
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
                return Err(ClasscopeError::LockTimeout {
                    path: path.to_path_buf(),
                    elapsed,
                    holder,
                });
            }

            if !contended {
                debug!("Waiting for lock {}", path.display());
                contended = true;
            }
            std::thread::sleep(self.interval.min(timeout - elapsed));
        }
    }
}
