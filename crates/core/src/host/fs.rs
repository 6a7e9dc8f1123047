use crate::extract::uri;
use classcope_api::{ApiError, ApiResult, ContextId, ContextRef, LoadingContext, ParentLinks};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use url::Url;
use zip::ZipArchive;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A loading context backed by an ordered list of directories and archives.
///
/// Directory roots answer `file:` URIs and archive roots answer
/// `jar:file:...!/path` URIs. An opaque context hides its root list, the way
/// hosts without a URL accessor do, so only resource lookups see it.
#[derive(Debug)]
pub struct FsLoadingContext {
    id: ContextId,
    name: String,
    roots: Vec<PathBuf>,
    parents: ParentLinks,
    opaque: bool,
}

impl FsLoadingContext {
    pub fn new(name: impl Into<String>, roots: Vec<PathBuf>) -> Self {
        Self {
            id: ContextId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            roots,
            parents: ParentLinks::None,
            opaque: false,
        }
    }

    pub fn with_parent(mut self, parent: ContextRef) -> Self {
        self.parents = ParentLinks::Single(parent);
        self
    }

    pub fn with_parents(mut self, parents: Vec<ContextRef>) -> Self {
        self.parents = ParentLinks::Multi(parents);
        self
    }

    pub fn opaque(mut self) -> Self {
        self.opaque = true;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn into_ref(self) -> ContextRef {
        Arc::new(self)
    }

    /// Build a single-parent chain; the first list is the innermost context
    pub fn chain(layers: Vec<Vec<PathBuf>>) -> Option<ContextRef> {
        layers
            .into_iter()
            .enumerate()
            .rev()
            .fold(None, |parent: Option<ContextRef>, (i, roots)| {
                let context = FsLoadingContext::new(format!("layer{}", i), roots);
                Some(match parent {
                    Some(parent) => context.with_parent(parent).into_ref(),
                    None => context.into_ref(),
                })
            })
    }

    fn lookup_in_archive(archive: &Path, path: &str) -> Option<Url> {
        let file = File::open(archive).ok()?;
        let zip = match ZipArchive::new(file) {
            Ok(zip) => zip,
            Err(e) => {
                debug!("Not a readable archive {}: {}", archive.display(), e);
                return None;
            }
        };
        let dir_prefix = format!("{}/", path);
        let found = zip
            .file_names()
            .any(|name| name == path || name.starts_with(&dir_prefix));
        if found {
            uri::jar_url(archive, path)
        } else {
            None
        }
    }
}

impl LoadingContext for FsLoadingContext {
    fn id(&self) -> ContextId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn parents(&self) -> ApiResult<ParentLinks> {
        Ok(self.parents.clone())
    }

    fn resources(&self, path: &str) -> ApiResult<Vec<Url>> {
        let path = path.trim_matches('/');
        let mut urls = Vec::new();
        for root in &self.roots {
            if root.is_dir() {
                let candidate = root.join(path);
                if candidate.exists() {
                    let url = Url::from_file_path(&candidate).map_err(|_| {
                        ApiError::InvalidArgument(format!("not absolute: {}", candidate.display()))
                    })?;
                    urls.push(url);
                }
            } else if root.is_file() {
                urls.extend(Self::lookup_in_archive(root, path));
            }
        }
        Ok(urls)
    }

    fn source_urls(&self) -> Option<Vec<Url>> {
        if self.opaque {
            return None;
        }
        Some(
            self.roots
                .iter()
                .filter_map(|root| {
                    if root.is_dir() {
                        Url::from_directory_path(root).ok()
                    } else {
                        Url::from_file_path(root).ok()
                    }
                })
                .collect(),
        )
    }
}
