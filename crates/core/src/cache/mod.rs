//! Unpack cache for collection archives.
//!
//! # Slot layout
//!
//! | Path | Meaning |
//! |------|---------|
//! | `<root>/<name>/` | Unpacked contents, mirroring the archive layout |
//! | `<root>/<name>.cached` | Marker: contents complete and valid |
//! | `<root>/<name>.lock` | Transient: an agent is extracting |
//!
//! A target directory is either absent, complete with its marker, or being
//! written while the lock is held. Stale slots are never deleted proactively.

pub mod collection;
pub mod key;
pub mod lock;

pub use collection::{CLASSES_DIRS, CollectionCache, LIBRARY_DIRS};
pub use key::{CacheSlot, CollectionKey};
pub use lock::{LockGuard, POLL_INTERVAL, PollingFileLock, SlotLock};
