//! Candidate extraction for a single loading context.
//!
//! Strategies, first success wins per context:
//! 1. Collection markers (with a cache root): unpack nested collections
//! 2. Source URIs the context tracks natively
//! 3. Source URIs read structurally from the host object
//! 4. Roots of every manifest resource in the context's namespace

pub mod uri;

use crate::cache::{CLASSES_DIRS, CollectionCache, LIBRARY_DIRS};
use crate::error::Result;
use crate::matcher::ARCHIVE_EXTENSIONS;
use classcope_api::{CandidateEntry, LoadingContext};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Resource paths that mark a context as exposing a nested collection
pub const COLLECTION_MARKERS: &[&str] = &[
    "BOOT-INF/classes",
    "BOOT-INF/lib",
    "WEB-INF/classes",
    "WEB-INF/lib",
];

pub const MANIFEST_RESOURCE: &str = "META-INF/MANIFEST.MF";

pub struct CandidateExtractor<'c> {
    cache: Option<&'c CollectionCache>,
}

impl<'c> CandidateExtractor<'c> {
    pub fn new(cache: Option<&'c CollectionCache>) -> Self {
        Self { cache }
    }

    /// Candidates of one context. Only collection unpacking can fail.
    pub fn extract(&self, context: &dyn LoadingContext) -> Result<Vec<CandidateEntry>> {
        if let Some(cache) = self.cache {
            if let Some(entries) = self.from_collections(context, cache)? {
                debug!("{}: {} entries from collections", context.name(), entries.len());
                return Ok(entries);
            }
        }

        if let Some(urls) = context.source_urls() {
            debug!("{}: using native source list", context.name());
            return Ok(valid_classpath_entries(urls));
        }

        match context.probe_urls() {
            Ok(urls) => {
                debug!("{}: using structural source list", context.name());
                return Ok(valid_classpath_entries(urls));
            }
            Err(e) => debug!("{}: {}", context.name(), e),
        }

        Ok(manifest_roots(context))
    }

    fn from_collections(
        &self,
        context: &dyn LoadingContext,
        cache: &CollectionCache,
    ) -> Result<Option<Vec<CandidateEntry>>> {
        let mut hits = Vec::new();
        for marker in COLLECTION_MARKERS {
            match context.resources(marker) {
                Ok(urls) => hits.extend(urls.into_iter().map(|u| (*marker, u))),
                Err(e) => debug!("{}: marker lookup failed: {}", context.name(), e),
            }
        }
        if hits.is_empty() {
            return Ok(None);
        }

        let mut archives = HashSet::new();
        let mut entries = Vec::new();
        for (marker, url) in hits {
            if let Some(archive) = uri::archive_path(&url) {
                if archives.insert(archive.clone()) {
                    entries.extend(cache.unpack(&archive)?);
                }
            } else if let Some(dir) = uri::file_path(&url) {
                entries.extend(exploded_entries(marker, &dir));
            }
        }
        Ok(Some(entries))
    }
}

/// Keep local archives with an allowed extension, and directories
fn valid_classpath_entries(urls: Vec<Url>) -> Vec<CandidateEntry> {
    urls.iter()
        .filter_map(uri::file_path)
        .filter_map(|path| {
            if path.is_dir() {
                Some(CandidateEntry::directory(path))
            } else if has_archive_extension(&path) {
                Some(CandidateEntry::archive(path))
            } else {
                None
            }
        })
        .collect()
}

fn manifest_roots(context: &dyn LoadingContext) -> Vec<CandidateEntry> {
    let urls = match context.resources(MANIFEST_RESOURCE) {
        Ok(urls) => urls,
        Err(e) => {
            debug!("{}: manifest scan failed: {}", context.name(), e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    urls.iter()
        .filter_map(|url| uri::containing_root(url, MANIFEST_RESOURCE))
        .filter(|root| seen.insert(root.clone()))
        .map(CandidateEntry::from_path)
        .collect()
}

/// Marker that resolved to a plain directory: an already unpacked collection
fn exploded_entries(marker: &str, dir: &Path) -> Vec<CandidateEntry> {
    if CLASSES_DIRS.contains(&marker) {
        return vec![CandidateEntry::directory(dir)];
    }
    if !LIBRARY_DIRS.contains(&marker) {
        return Vec::new();
    }
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = read
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files.into_iter().map(CandidateEntry::archive).collect()
}

fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ARCHIVE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
