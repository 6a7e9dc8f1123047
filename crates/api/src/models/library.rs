use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// How a library file was located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LibraryOrigin {
    /// Dedicated per-library override property
    Property { key: String },
    /// Versioned name match inside an explicitly configured classpath
    OverrideClasspath { key: String },
    /// Marker resource found through the requested (or ambient) context
    ContextResource { marker: String },
    /// Marker resource found by walking up from the marker's defining context
    DefiningContext { marker: String },
}

impl fmt::Display for LibraryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryOrigin::Property { key } => write!(f, "property {}", key),
            LibraryOrigin::OverrideClasspath { key } => write!(f, "classpath override {}", key),
            LibraryOrigin::ContextResource { marker } => write!(f, "context resource {}", marker),
            LibraryOrigin::DefiningContext { marker } => write!(f, "defining context of {}", marker),
        }
    }
}

/// A single resolved library file. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryReference {
    /// Well-known file name the lookup asked for (e.g. `runtime.jar`)
    pub name: String,
    pub path: PathBuf,
    pub origin: LibraryOrigin,
}

impl LibraryReference {
    pub fn new(name: impl Into<String>, path: PathBuf, origin: LibraryOrigin) -> Self {
        Self {
            name: name.into(),
            path,
            origin,
        }
    }
}
