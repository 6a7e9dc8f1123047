//! Version-tolerant library name matching.
//!
//! `runtime.jar` matches `runtime.jar`, `runtime` (a classes directory) and
//! `runtime-1.3.0.jar`, but not `runtime-extra.jar`.

use classcope_api::CandidateEntry;
use regex::Regex;
use std::path::Path;

/// Archive extensions accepted on the classpath
pub const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip"];

#[derive(Debug, Clone)]
pub struct VersionedNameMatcher {
    base: String,
    stem: String,
    pattern: Option<Regex>,
}

impl VersionedNameMatcher {
    pub fn new(base: &str) -> Self {
        let (stem, extension) = split_archive_name(base);
        let extensions = match extension {
            Some(ext) => regex::escape(ext),
            None => ARCHIVE_EXTENSIONS.join("|"),
        };
        let pattern = Regex::new(&format!(
            r"^{}(?:-\d[^/\\]*)?\.(?:{})$",
            regex::escape(stem),
            extensions
        ))
        .ok();

        Self {
            base: base.to_string(),
            stem: stem.to_string(),
            pattern,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Base name with its archive extension stripped
    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn matches(&self, candidate: &str) -> bool {
        candidate == self.base
            || candidate == self.stem
            || self
                .pattern
                .as_ref()
                .is_some_and(|re| re.is_match(candidate))
    }

    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.matches(name))
    }

    /// Classpath rule: the entry's own name matches, or the entry is a
    /// directory whose name or an ancestor directory's name is the library name.
    pub fn matches_entry(&self, entry: &CandidateEntry) -> bool {
        if self.matches_path(&entry.path) {
            return true;
        }
        entry.is_directory()
            && entry
                .path
                .ancestors()
                .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
                .any(|name| name == self.base || name == self.stem)
    }
}

/// Match a candidate file name against a base library name
pub fn matches(base: &str, candidate: &str) -> bool {
    VersionedNameMatcher::new(base).matches(candidate)
}

fn split_archive_name(base: &str) -> (&str, Option<&str>) {
    if let Some((stem, ext)) = base.rsplit_once('.') {
        if !stem.is_empty() && ARCHIVE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            return (stem, Some(ext));
        }
    }
    (base, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_directory_names() {
        assert!(matches("runtime.jar", "runtime.jar"));
        assert!(matches("runtime.jar", "runtime"));
    }

    #[test]
    fn test_version_suffix() {
        assert!(matches("runtime.jar", "runtime-1.3.0.jar"));
        assert!(matches("runtime.jar", "runtime-2.jar"));
        assert!(matches("kotlin-stdlib.jar", "kotlin-stdlib-1.9.22-RC.jar"));
    }

    #[test]
    fn test_rejects_unrelated_prefix() {
        assert!(!matches("runtime.jar", "runtime-extra.jar"));
        assert!(!matches("runtime.jar", "runtimes.jar"));
        assert!(!matches("runtime.jar", "runtime-.jar"));
        assert!(!matches("runtime.jar", "runtime-1.0.zip"));
        assert!(!matches("kotlin-stdlib.jar", "kotlin-stdlib-jdk8-1.8.0.jar"));
    }

    #[test]
    fn test_bare_name_accepts_any_archive_extension() {
        assert!(matches("a", "a-1.0.jar"));
        assert!(matches("a", "a.zip"));
        assert!(matches("a", "a"));
        assert!(!matches("a", "ab-1.0.jar"));
    }

    #[test]
    fn test_regex_metacharacters_in_base() {
        assert!(matches("lib+extras.jar", "lib+extras-1.0.jar"));
        assert!(!matches("lib+extras.jar", "libbextras-1.0.jar"));
    }

    #[test]
    fn test_directory_ancestor_rule() {
        let matcher = VersionedNameMatcher::new("runtime.jar");
        assert!(matcher.matches_entry(&CandidateEntry::directory("/build/runtime/classes/main")));
        assert!(!matcher.matches_entry(&CandidateEntry::archive("/build/runtime/other.jar")));
        assert!(matcher.matches_entry(&CandidateEntry::archive("/libs/runtime-1.0.jar")));
    }
}
