use classcope_api::{CandidateEntry, CollectionCacheManager, SlotState};
use classcope_core::CollectionCache;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::info;

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show cache statistics
    Stats,
    /// List unpacked collection slots
    List {
        /// Sort by size or name
        #[arg(long, value_parser = ["size", "name"])]
        sort: Option<String>,
        /// Filter by slot name pattern
        #[arg(long)]
        filter: Option<String>,
    },
    /// Remove every slot not currently locked
    Clear,
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Slot")]
    name: String,
    #[tabled(rename = "State")]
    state: &'static str,
    #[tabled(rename = "Files")]
    files: usize,
    #[tabled(rename = "Size")]
    size: String,
}

#[derive(Tabled)]
pub(crate) struct EntryRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&CandidateEntry> for EntryRow {
    fn from(entry: &CandidateEntry) -> Self {
        Self {
            kind: if entry.is_directory() { "dir" } else { "archive" },
            path: entry.path.display().to_string(),
        }
    }
}

pub fn run(cmd: CacheCommands, root: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let cache = CollectionCache::new(root);

    match cmd {
        CacheCommands::Stats => {
            let stats = cache.stats();
            println!("Cache Directory: {}", stats.cache_dir.display());
            println!("Total Slots:     {}", stats.total_slots);
            println!("Complete Slots:  {}", stats.complete_slots);
            println!("Total Size:      {}", format_size(stats.total_bytes));
        }
        CacheCommands::List { sort, filter } => {
            let mut slots = cache.slots();

            if let Some(pattern) = filter {
                slots.retain(|s| s.name.contains(&pattern));
            }

            if let Some(key) = sort {
                match key.as_str() {
                    "size" => slots.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes)),
                    "name" => slots.sort_by(|a, b| a.name.cmp(&b.name)),
                    _ => {}
                }
            }

            let rows: Vec<SlotRow> = slots
                .into_iter()
                .map(|s| SlotRow {
                    name: s.name,
                    state: match s.state {
                        SlotState::Complete => "complete",
                        SlotState::Locked => "locked",
                        SlotState::Incomplete => "incomplete",
                    },
                    files: s.file_count,
                    size: format_size(s.size_bytes),
                })
                .collect();

            if rows.is_empty() {
                println!("No unpacked collections found.");
            } else {
                println!("{}", Table::new(rows));
            }
        }
        CacheCommands::Clear => {
            let removed = cache.clear()?;
            info!("Cleared {} slots under {}", removed, cache.root().display());
            println!("Removed {} slots.", removed);
        }
    }

    Ok(())
}

pub fn unpack(
    archive: &Path,
    root: PathBuf,
    timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let archive = std::path::absolute(archive)?;
    let cache = CollectionCache::new(root).with_timeout(timeout);
    let entries = cache.unpack(&archive)?;
    let slot = cache.slot_for(&archive)?;

    println!("Slot: {}", slot.target.display());
    if entries.is_empty() {
        println!("No class directories or libraries in {}", archive.display());
    } else {
        let rows: Vec<EntryRow> = entries.iter().map(EntryRow::from).collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
    }
}
