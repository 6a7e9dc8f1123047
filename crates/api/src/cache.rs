use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// State of one cached unpack slot, read from its marker and lock files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    /// Target directory and marker present
    Complete,
    /// Lock held; another agent is extracting
    Locked,
    /// Leftovers without a marker (stale marker or externally removed contents)
    Incomplete,
}

/// Summary of a cached collection slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSummary {
    pub name: String,
    pub target: PathBuf,
    pub state: SlotState,
    pub size_bytes: u64,
    pub file_count: usize,
}

/// Statistics for a collection cache root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub cache_dir: PathBuf,
    pub total_slots: usize,
    pub complete_slots: usize,
    pub total_bytes: u64,
}

/// Service interface for inspecting and clearing unpacked collections
pub trait CollectionCacheManager: Send + Sync {
    /// Get cache statistics
    fn stats(&self) -> CacheStats;

    /// Scan all slots under the cache root
    fn slots(&self) -> Vec<SlotSummary>;

    /// Remove every slot whose lock is not held; returns how many were removed
    fn clear(&self) -> Result<usize, String>;
}
