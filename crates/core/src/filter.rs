//! Reduce a flat candidate list to what a caller's required names need.

use crate::matcher::VersionedNameMatcher;
use classcope_api::{CandidateEntry, MatchMode};

pub struct ClasspathFilter {
    matchers: Vec<VersionedNameMatcher>,
}

impl ClasspathFilter {
    pub fn new<S: AsRef<str>>(required: &[S]) -> Self {
        Self {
            matchers: required
                .iter()
                .map(|name| VersionedNameMatcher::new(name.as_ref()))
                .collect(),
        }
    }

    pub fn apply(&self, entries: Vec<CandidateEntry>, mode: MatchMode) -> Option<Vec<CandidateEntry>> {
        match mode {
            MatchMode::RequireAll => self.take_if_contains_all(entries),
            MatchMode::RequireAllMinimal => self.filter_if_contains_all(&entries),
            MatchMode::RequireAny => self.take_if_contains_any(entries),
        }
    }

    /// Whole list, if every required name matches some entry
    pub fn take_if_contains_all(&self, entries: Vec<CandidateEntry>) -> Option<Vec<CandidateEntry>> {
        self.matchers
            .iter()
            .all(|m| entries.iter().any(|e| m.matches_entry(e)))
            .then_some(entries)
    }

    /// First matching entry per required name, in requirement order
    pub fn filter_if_contains_all(&self, entries: &[CandidateEntry]) -> Option<Vec<CandidateEntry>> {
        self.matchers
            .iter()
            .map(|m| entries.iter().find(|e| m.matches_entry(e)).cloned())
            .collect()
    }

    /// Whole list, if at least one required name matches
    pub fn take_if_contains_any(&self, entries: Vec<CandidateEntry>) -> Option<Vec<CandidateEntry>> {
        self.matchers
            .iter()
            .any(|m| entries.iter().any(|e| m.matches_entry(e)))
            .then_some(entries)
    }
}
