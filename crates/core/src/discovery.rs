//! Classpath discovery: walk the hierarchy, extract candidates per context,
//! flatten, deduplicate, filter, then fall back to the environment list.

use crate::cache::CollectionCache;
use crate::config::{DiscoveryOptions, Properties};
use crate::error::Result;
use crate::extract::CandidateExtractor;
use crate::filter::ClasspathFilter;
use crate::walker::walk;
use classcope_api::{CandidateEntry, ContextRef, MatchMode};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct ClasspathDiscovery {
    cache: Option<CollectionCache>,
    fallback: Option<Vec<PathBuf>>,
}

impl ClasspathDiscovery {
    pub fn new(options: &DiscoveryOptions) -> Self {
        Self {
            cache: options
                .cache_root
                .as_ref()
                .map(|root| CollectionCache::new(root).with_timeout(options.lock_timeout)),
            fallback: options.fallback_classpath.clone(),
        }
    }

    pub fn cache(&self) -> Option<&CollectionCache> {
        self.cache.as_ref()
    }

    /// Deduplicated candidates of `root` and everything it delegates to
    pub fn candidates(&self, root: &ContextRef) -> Result<Vec<CandidateEntry>> {
        let extractor = CandidateExtractor::new(self.cache.as_ref());
        let mut visited = HashSet::new();
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for context in walk(root.clone(), &mut visited) {
            for entry in extractor.extract(context.as_ref())? {
                if seen.insert(entry.path.clone()) {
                    entries.push(entry);
                }
            }
        }
        Ok(entries)
    }

    pub fn discover<S: AsRef<str>>(
        &self,
        root: &ContextRef,
        names: &[S],
        mode: MatchMode,
    ) -> Result<Option<Vec<PathBuf>>> {
        let filter = ClasspathFilter::new(names);
        let candidates = self.candidates(root)?;
        debug!("{} candidates from {}", candidates.len(), root.name());

        if !candidates.is_empty() {
            if let Some(found) = filter.apply(candidates, mode) {
                return Ok(Some(into_paths(found)));
            }
        }
        Ok(self.discover_fallback(&filter, mode))
    }

    /// Match against the environment-provided list only
    pub(crate) fn discover_fallback(
        &self,
        filter: &ClasspathFilter,
        mode: MatchMode,
    ) -> Option<Vec<PathBuf>> {
        let fallback = self.fallback.as_ref()?;
        let entries: Vec<CandidateEntry> = fallback
            .iter()
            .cloned()
            .map(CandidateEntry::from_path)
            .collect();
        let found = filter.apply(entries, mode)?;
        info!("Using environment classpath ({} entries)", found.len());
        Some(into_paths(found))
    }
}

/// Discover a classpath satisfying `names`, reading overrides from the environment
pub fn discover_classpath<S: AsRef<str>>(
    context: &ContextRef,
    names: &[S],
    mode: MatchMode,
    cache_root: Option<&Path>,
) -> Result<Option<Vec<PathBuf>>> {
    let mut options = DiscoveryOptions::from_properties(&Properties::from_env());
    options.cache_root = cache_root.map(Path::to_path_buf);
    ClasspathDiscovery::new(&options).discover(context, names, mode)
}

fn into_paths(entries: Vec<CandidateEntry>) -> Vec<PathBuf> {
    entries.into_iter().map(PathBuf::from).collect()
}
