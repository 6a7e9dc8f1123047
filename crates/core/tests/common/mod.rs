use classcope_api::{ApiError, ApiResult, ContextId, ContextRef, LoadingContext, ParentLinks};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use url::Url;

pub const CLASS_BYTES: &[u8] = &[0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];

#[allow(dead_code)]
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    for (name, bytes) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
    }
    zip.finish().unwrap();
}

/// A packaged web application with classes, two direct libraries, and a nested one
#[allow(dead_code)]
pub fn write_war(path: &Path) {
    write_jar(
        path,
        &[
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
            ("WEB-INF/", b""),
            ("WEB-INF/classes/", b""),
            ("WEB-INF/classes/com/example/App.class", CLASS_BYTES),
            ("WEB-INF/lib/", b""),
            ("WEB-INF/lib/a-1.0.jar", b"jar a"),
            ("WEB-INF/lib/b.jar", b"jar b"),
            ("WEB-INF/lib/nested/c.jar", b"jar c"),
            ("index.html", b"<html></html>"),
        ],
    );
}

#[allow(dead_code)]
pub fn file_url(path: &Path) -> Url {
    Url::from_file_path(path).unwrap()
}

/// Scriptable context for strategies the file-system adapter never exercises
#[allow(dead_code)]
pub struct MockContext {
    id: u64,
    parents: Mutex<Option<ParentLinks>>,
    resources: HashMap<String, Vec<Url>>,
    resources_fail: bool,
    sources: Option<Vec<Url>>,
    structural: Option<Vec<Url>>,
}

#[allow(dead_code)]
impl MockContext {
    pub fn new(id: u64) -> Self {
        Self {
            id: 10_000 + id,
            parents: Mutex::new(Some(ParentLinks::None)),
            resources: HashMap::new(),
            resources_fail: false,
            sources: None,
            structural: None,
        }
    }

    pub fn with_resource(mut self, path: &str, urls: Vec<Url>) -> Self {
        self.resources.insert(path.to_string(), urls);
        self
    }

    pub fn with_sources(mut self, urls: Vec<Url>) -> Self {
        self.sources = Some(urls);
        self
    }

    pub fn with_structural_urls(mut self, urls: Vec<Url>) -> Self {
        self.structural = Some(urls);
        self
    }

    /// Every introspection call fails
    pub fn opaque(mut self) -> Self {
        self.parents = Mutex::new(None);
        self.resources_fail = true;
        self
    }

    pub fn link(&self, links: ParentLinks) {
        *self.parents.lock().unwrap() = Some(links);
    }

    pub fn into_arc(self) -> Arc<MockContext> {
        Arc::new(self)
    }
}

impl LoadingContext for MockContext {
    fn id(&self) -> ContextId {
        ContextId(self.id)
    }

    fn parents(&self) -> ApiResult<ParentLinks> {
        self.parents
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::unsupported("parents", self.name()))
    }

    fn resources(&self, path: &str) -> ApiResult<Vec<Url>> {
        if self.resources_fail {
            return Err(ApiError::unsupported("resources", self.name()));
        }
        Ok(self.resources.get(path).cloned().unwrap_or_default())
    }

    fn source_urls(&self) -> Option<Vec<Url>> {
        self.sources.clone()
    }

    fn probe_urls(&self) -> ApiResult<Vec<Url>> {
        self.structural
            .clone()
            .ok_or_else(|| ApiError::unsupported("structural urls", self.name()))
    }
}

#[allow(dead_code)]
pub fn as_ref(context: &Arc<MockContext>) -> ContextRef {
    context.clone()
}
