//! Resolution of single well-known library files.
//!
//! Order per library: dedicated override property, versioned match in an
//! explicit compiler classpath, marker resource through the requested (or
//! ambient) context, then marker resource walking up from the marker's
//! defining context. A result that does not exist on disk counts as absent.
//!
//! Results are memoized per resolver instance, never globally.

pub mod catalog;

use crate::config::{DiscoveryOptions, Properties, keys};
use crate::discovery::ClasspathDiscovery;
use crate::error::{ClasscopeError, Result};
use crate::extract::uri;
use crate::filter::ClasspathFilter;
use crate::matcher::VersionedNameMatcher;
use crate::walker::walk;
use catalog::KnownLibrary;
use classcope_api::{CandidateEntry, ContextRef, LibraryOrigin, LibraryReference, MatchMode};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct KnownLibraryResolver {
    properties: Properties,
    discovery: ClasspathDiscovery,
    /// Context searched when a lookup names none
    ambient: Option<ContextRef>,
    /// Context that defines the marker classes
    marker_home: Option<ContextRef>,
    resolved: DashMap<&'static str, Option<LibraryReference>>,
    compiler_classpath: OnceCell<Vec<PathBuf>>,
    script_classpath: OnceCell<Vec<PathBuf>>,
}

impl KnownLibraryResolver {
    pub fn new(properties: Properties) -> Self {
        let options = DiscoveryOptions::from_properties(&properties);
        Self::with_options(properties, options)
    }

    pub fn with_options(properties: Properties, options: DiscoveryOptions) -> Self {
        Self {
            properties,
            discovery: ClasspathDiscovery::new(&options),
            ambient: None,
            marker_home: None,
            resolved: DashMap::new(),
            compiler_classpath: OnceCell::new(),
            script_classpath: OnceCell::new(),
        }
    }

    pub fn with_ambient_context(mut self, context: ContextRef) -> Self {
        self.ambient = Some(context);
        self
    }

    pub fn with_marker_home(mut self, context: ContextRef) -> Self {
        self.marker_home = Some(context);
        self
    }

    /// Memoized resolution through the ambient context
    pub fn resolve(&self, library: &KnownLibrary) -> Option<LibraryReference> {
        if let Some(hit) = self.resolved.get(library.id) {
            return hit.value().clone();
        }
        let found = self.resolve_library(
            library.property,
            library.file_name,
            library.marker_class,
            None,
        );
        match &found {
            Some(r) => info!("Resolved {} at {} via {}", library.id, r.path.display(), r.origin),
            None => debug!("Could not resolve {}", library.id),
        }
        self.resolved
            .entry(library.id)
            .or_insert(found)
            .value()
            .clone()
    }

    /// Like [`resolve`](Self::resolve), failing with the override to set
    pub fn require(&self, library: &KnownLibrary) -> Result<LibraryReference> {
        self.resolve(library).ok_or_else(|| ClasscopeError::NotFound {
            what: format!("{} ({})", library.id, library.file_name),
            property: library.hint_property(),
        })
    }

    /// Unmemoized lookup of one library file
    pub fn resolve_library(
        &self,
        property: Option<&str>,
        file_name: &str,
        marker_class: &str,
        context: Option<&ContextRef>,
    ) -> Option<LibraryReference> {
        if let Some(key) = property {
            if let Some(path) = self.properties.path(key) {
                if path.exists() {
                    return Some(LibraryReference::new(
                        file_name,
                        path,
                        LibraryOrigin::Property { key: key.to_string() },
                    ));
                }
                debug!("Ignoring {}={}: no such file", key, path.display());
            }
        }

        let matcher = VersionedNameMatcher::new(file_name);

        if let Some((key, classpath)) = self.explicit_compiler_classpath() {
            if let Some(path) = classpath.iter().find(|p| matcher.matches_path(p)) {
                if path.exists() {
                    return Some(LibraryReference::new(
                        file_name,
                        path.clone(),
                        LibraryOrigin::OverrideClasspath { key: key.to_string() },
                    ));
                }
            }
        }

        let resource = catalog::marker_resource(marker_class);

        if let Some(requested) = context.or(self.ambient.as_ref()) {
            let is_marker_home = self
                .marker_home
                .as_ref()
                .is_some_and(|home| home.id() == requested.id());
            if !is_marker_home {
                let by_name = find_marker_root(requested, &resource, |root| {
                    matcher.matches_entry(&CandidateEntry::from_path(root))
                });
                if let Some(path) = by_name {
                    return Some(LibraryReference::new(
                        file_name,
                        path,
                        LibraryOrigin::ContextResource {
                            marker: marker_class.to_string(),
                        },
                    ));
                }
            }
        }

        let home = self.marker_home.as_ref()?;
        find_marker_root(home, &resource, |_| true).map(|path| {
            LibraryReference::new(
                file_name,
                path,
                LibraryOrigin::DefiningContext {
                    marker: marker_class.to_string(),
                },
            )
        })
    }

    pub fn stdlib_or_none(&self) -> Option<PathBuf> {
        self.resolve(&catalog::STDLIB).map(|r| r.path)
    }

    pub fn stdlib(&self) -> Result<PathBuf> {
        self.require(&catalog::STDLIB).map(|r| r.path)
    }

    pub fn reflect_or_none(&self) -> Option<PathBuf> {
        self.resolve(&catalog::REFLECT).map(|r| r.path)
    }

    pub fn reflect(&self) -> Result<PathBuf> {
        self.require(&catalog::REFLECT).map(|r| r.path)
    }

    pub fn script_runtime_or_none(&self) -> Option<PathBuf> {
        self.resolve(&catalog::SCRIPT_RUNTIME).map(|r| r.path)
    }

    pub fn script_runtime(&self) -> Result<PathBuf> {
        self.require(&catalog::SCRIPT_RUNTIME).map(|r| r.path)
    }

    /// Stdlib and script runtime, whichever resolve
    pub fn standard_jars(&self) -> Vec<PathBuf> {
        [self.stdlib_or_none(), self.script_runtime_or_none()]
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn standard_jars_with_reflect(&self) -> Vec<PathBuf> {
        let mut jars = self.standard_jars();
        jars.extend(self.reflect_or_none());
        jars
    }

    /// Full compiler classpath. The compiler archive itself is mandatory.
    pub fn compiler_classpath(&self) -> Result<Vec<PathBuf>> {
        self.compiler_classpath
            .get_or_try_init(|| self.find_compiler_classpath())
            .cloned()
    }

    /// Classpath for compiling scripts against the runtime
    pub fn script_classpath(&self) -> Result<Vec<PathBuf>> {
        self.script_classpath
            .get_or_try_init(|| self.find_script_classpath())
            .cloned()
    }

    fn find_compiler_classpath(&self) -> Result<Vec<PathBuf>> {
        let not_found = || ClasscopeError::NotFound {
            what: format!("compiler archive ({})", catalog::COMPILER.file_name),
            property: keys::COMPILER_CLASSPATH,
        };

        if let Some((key, classpath)) = self.explicit_compiler_classpath() {
            let matcher = VersionedNameMatcher::new(catalog::COMPILER.file_name);
            debug!("Using compiler classpath from {}", key);
            return if classpath.iter().any(|p| matcher.matches_path(p) && p.exists()) {
                Ok(classpath)
            } else {
                Err(not_found())
            };
        }

        if self.resolve(&catalog::COMPILER).is_none() {
            return Err(not_found());
        }

        let mut classpath: Vec<PathBuf> = Vec::new();
        for library in catalog::COMPILER_CLASSPATH {
            if let Some(found) = self.resolve(library) {
                if !classpath.contains(&found.path) {
                    classpath.push(found.path);
                }
            }
        }
        Ok(classpath)
    }

    fn find_script_classpath(&self) -> Result<Vec<PathBuf>> {
        if let Some(classpath) = self.properties.path_list(keys::SCRIPT_CLASSPATH) {
            return Ok(classpath);
        }

        let names: Vec<&str> = catalog::SCRIPT_CLASSPATH
            .iter()
            .map(|l| l.file_name)
            .collect();
        let found = match &self.ambient {
            Some(context) => self
                .discovery
                .discover(context, &names, MatchMode::RequireAllMinimal)?,
            None => self
                .discovery
                .discover_fallback(&ClasspathFilter::new(&names), MatchMode::RequireAllMinimal),
        };

        found.ok_or_else(|| ClasscopeError::NotFound {
            what: "script compilation classpath".to_string(),
            property: keys::SCRIPT_CLASSPATH,
        })
    }

    fn explicit_compiler_classpath(&self) -> Option<(&'static str, Vec<PathBuf>)> {
        if let Some(list) = self.properties.path_list(keys::COMPILER_CLASSPATH) {
            return Some((keys::COMPILER_CLASSPATH, list));
        }
        self.properties
            .path(keys::COMPILER_JAR)
            .filter(|p| p.exists())
            .map(|p| (keys::COMPILER_JAR, vec![p]))
    }
}

/// First existing root holding `resource`, searching `context` and its ancestors
fn find_marker_root(
    context: &ContextRef,
    resource: &str,
    accept: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    let mut visited = HashSet::new();
    for current in walk(context.clone(), &mut visited) {
        let urls = match current.resources(resource) {
            Ok(urls) => urls,
            Err(e) => {
                debug!("{}: {}", current.name(), e);
                continue;
            }
        };
        let found = urls
            .iter()
            .filter_map(|url| uri::containing_root(url, resource))
            .find(|root| root.exists() && accept(root.as_path()));
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Resolve one library with overrides read from the environment.
///
/// `context` is searched by name for the marker class; `marker_home`, when
/// given, is the context defining it and is searched regardless of file name.
pub fn resolve_known_library(
    override_key: &str,
    file_name: &str,
    marker_class: &str,
    context: Option<&ContextRef>,
    marker_home: Option<&ContextRef>,
) -> Option<PathBuf> {
    let mut resolver = KnownLibraryResolver::new(Properties::from_env());
    if let Some(home) = marker_home {
        resolver = resolver.with_marker_home(home.clone());
    }
    resolver
        .resolve_library(Some(override_key), file_name, marker_class, context)
        .map(|r| r.path)
}
