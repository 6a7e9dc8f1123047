//! URI to file-system path conversion for resource lookups.

use std::path::PathBuf;
use url::Url;

/// Local path of a `file:` URI
pub fn file_path(url: &Url) -> Option<PathBuf> {
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

/// Archive behind a `jar:file:/x.jar!/inner/path` URI
pub fn archive_path(url: &Url) -> Option<PathBuf> {
    if url.scheme() != "jar" {
        return None;
    }
    let (inner, _) = url.path().split_once("!/")?;
    file_path(&Url::parse(inner).ok()?)
}

/// Archive or directory that contains `resource`, given a URI returned by a
/// lookup of that resource
pub fn containing_root(url: &Url, resource: &str) -> Option<PathBuf> {
    match url.scheme() {
        "jar" => archive_path(url),
        "file" => {
            let mut path = file_path(url)?;
            for _ in resource.split('/').filter(|s| !s.is_empty()) {
                path = path.parent()?.to_path_buf();
            }
            Some(path)
        }
        _ => None,
    }
}

/// `jar:` URI for `resource` inside the archive at `archive`
pub fn jar_url(archive: &std::path::Path, resource: &str) -> Option<Url> {
    let base = Url::from_file_path(archive).ok()?;
    Url::parse(&format!("jar:{}!/{}", base, resource.trim_start_matches('/'))).ok()
}
