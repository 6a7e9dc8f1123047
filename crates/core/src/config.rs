//! Override properties and discovery options.
//!
//! Overrides are plain string keys, read once per resolution call from an
//! immutable [`Properties`] snapshot. Nothing here is hierarchical.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

pub mod keys {
    /// Aggregate script classpath (path list)
    pub const SCRIPT_CLASSPATH: &str = "CLASSCOPE_SCRIPT_CLASSPATH";
    /// Compiler classpath (path list)
    pub const COMPILER_CLASSPATH: &str = "CLASSCOPE_COMPILER_CLASSPATH";
    /// Single compiler archive, used when the list override is absent
    pub const COMPILER_JAR: &str = "CLASSCOPE_COMPILER_JAR";
    pub const STDLIB_JAR: &str = "CLASSCOPE_STDLIB_JAR";
    pub const REFLECT_JAR: &str = "CLASSCOPE_REFLECT_JAR";
    pub const SCRIPT_RUNTIME_JAR: &str = "CLASSCOPE_SCRIPT_RUNTIME_JAR";
    pub const UNPACK_LOCK_TIMEOUT_MS: &str = "CLASSCOPE_UNPACK_LOCK_TIMEOUT_MS";
    /// Flat list provided by the environment; the last discovery fallback
    pub const HOST_CLASSPATH: &str = "CLASSPATH";

    pub(crate) const PREFIX: &str = "CLASSCOPE_";
}

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const MAX_LOCK_TIMEOUT: Duration = Duration::from_millis(600_000);

/// Immutable snapshot of override properties.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: BTreeMap<String, String>,
}

impl Properties {
    /// Snapshot every `CLASSCOPE_*` variable plus `CLASSPATH`
    pub fn from_env() -> Self {
        Self::from_os_pairs(std::env::vars_os())
    }

    /// Keep the recognised keys; entries that are not valid UTF-8 are skipped
    pub fn from_os_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        Self::from_pairs(pairs.into_iter().filter_map(|(k, v)| {
            let key = k.into_string().ok()?;
            if !(key.starts_with(keys::PREFIX) || key == keys::HOST_CLASSPATH) {
                return None;
            }
            match v.into_string() {
                Ok(value) => Some((key, value)),
                Err(_) => {
                    tracing::warn!("Ignoring {}: value is not valid UTF-8", key);
                    None
                }
            }
        }))
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `key`, ignoring blank values
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    /// Split a platform path list (`:` on Unix, `;` on Windows)
    pub fn path_list(&self, key: &str) -> Option<Vec<PathBuf>> {
        let paths: Vec<PathBuf> = std::env::split_paths(self.get(key)?)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        if paths.is_empty() { None } else { Some(paths) }
    }

    /// Lock timeout, clamped to `[0, 600000]` ms. Unparsable values fall back to the default.
    pub fn lock_timeout(&self) -> Duration {
        match self.get(keys::UNPACK_LOCK_TIMEOUT_MS) {
            Some(raw) => match raw.parse::<i64>() {
                Ok(ms) => Duration::from_millis(ms.clamp(0, MAX_LOCK_TIMEOUT.as_millis() as i64) as u64),
                Err(_) => {
                    tracing::warn!(
                        "Ignoring unparsable {}={:?}",
                        keys::UNPACK_LOCK_TIMEOUT_MS,
                        raw
                    );
                    DEFAULT_LOCK_TIMEOUT
                }
            },
            None => DEFAULT_LOCK_TIMEOUT,
        }
    }
}

/// Options shared by classpath discovery and library resolution
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Where nested collections are unpacked. `None` disables unpacking.
    pub cache_root: Option<PathBuf>,
    pub lock_timeout: Duration,
    /// Environment-provided flat list tried when nothing else matches
    pub fallback_classpath: Option<Vec<PathBuf>>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            cache_root: None,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            fallback_classpath: None,
        }
    }
}

impl DiscoveryOptions {
    pub fn from_properties(properties: &Properties) -> Self {
        Self {
            cache_root: None,
            lock_timeout: properties.lock_timeout(),
            fallback_classpath: properties.path_list(keys::HOST_CLASSPATH),
        }
    }

    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(root.into());
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout.min(MAX_LOCK_TIMEOUT);
        self
    }

    /// Get the default cache location
    pub fn default_cache_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("classcope")
            .join("collections")
    }
}
