//! Classpath discovery for an embedded compiler and script runtime.
//!
//! Walks a host's loading-context hierarchy, unpacks nested collection
//! archives into a shared cache, and picks out the library files a caller
//! asks for by (versioned) name.

pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod filter;
pub mod host;
pub mod logging;
pub mod matcher;
pub mod resolver;
pub mod walker;

pub use cache::CollectionCache;
pub use config::{DiscoveryOptions, Properties};
pub use discovery::{ClasspathDiscovery, discover_classpath};
pub use error::{ClasscopeError, Result};
pub use extract::CandidateExtractor;
pub use filter::ClasspathFilter;
pub use host::FsLoadingContext;
pub use matcher::VersionedNameMatcher;
pub use resolver::{KnownLibraryResolver, resolve_known_library};
