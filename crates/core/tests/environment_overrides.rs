//! Entry points that read their overrides from the process environment.
//! Tests here mutate the environment and are serialized through one lock.

mod common;

use classcope_api::MatchMode;
use classcope_core::config::keys;
use classcope_core::resolver::catalog;
use classcope_core::{
    ClasscopeError, CollectionCache, FsLoadingContext, discover_classpath, resolve_known_library,
};
use common::{CLASS_BYTES, write_jar, write_war};
use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

static ENV: Mutex<()> = Mutex::new(());

/// Environment changes that are undone on drop
struct ScopedEnv {
    keys: Vec<&'static str>,
    _lock: MutexGuard<'static, ()>,
}

fn scoped_env(vars: Vec<(&'static str, Option<OsString>)>) -> ScopedEnv {
    let lock = ENV.lock().unwrap_or_else(|e| e.into_inner());
    let mut keys = Vec::new();
    for (key, value) in vars {
        match value {
            Some(value) => unsafe { std::env::set_var(key, value) },
            None => unsafe { std::env::remove_var(key) },
        }
        keys.push(key);
    }
    ScopedEnv { keys, _lock: lock }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for key in &self.keys {
            unsafe { std::env::remove_var(key) };
        }
    }
}

#[test]
#[cfg(unix)]
fn undecodable_variable_does_not_abort_discovery() {
    use std::os::unix::ffi::OsStringExt;

    let _env = scoped_env(vec![
        ("CLASSCOPE_TEST_UNRELATED", Some(OsString::from_vec(vec![0xff, 0xfe]))),
        ("UNRELATED_BYTES", Some(OsString::from_vec(vec![0xff, 0xfe]))),
    ]);
    let dir = tempfile::tempdir().unwrap();
    let lib = dir.path().join("a-1.0.jar");
    let context = FsLoadingContext::new("app", vec![lib.clone()]).into_ref();

    let found = discover_classpath(&context, &["a.jar"], MatchMode::RequireAll, None).unwrap();
    assert_eq!(found, Some(vec![lib]));
}

#[test]
fn host_classpath_backs_discovery() {
    let dir = tempfile::tempdir().unwrap();
    let runtime = dir.path().join("runtime-1.3.0.jar");
    let _env = scoped_env(vec![(
        keys::HOST_CLASSPATH,
        Some(std::env::join_paths([&runtime]).unwrap()),
    )]);
    let empty = FsLoadingContext::new("empty", vec![]).into_ref();

    let found =
        discover_classpath(&empty, &["runtime.jar"], MatchMode::RequireAll, None).unwrap();
    assert_eq!(found, Some(vec![runtime]));

    let missing =
        discover_classpath(&empty, &["other.jar"], MatchMode::RequireAll, None).unwrap();
    assert_eq!(missing, None);
}

#[test]
fn lock_timeout_override_reaches_the_cache() {
    let _env = scoped_env(vec![
        (keys::UNPACK_LOCK_TIMEOUT_MS, Some(OsString::from("0"))),
        (keys::HOST_CLASSPATH, None),
    ]);
    let dir = tempfile::tempdir().unwrap();
    let war = dir.path().join("app.war");
    write_war(&war);
    let root = dir.path().join("cache");
    fs::create_dir_all(&root).unwrap();

    // Abandoned lock from another agent
    let slot = CollectionCache::new(&root).slot_for(&war).unwrap();
    fs::write(&slot.lock, "pid 4242\n").unwrap();

    let context = FsLoadingContext::new("webapp", vec![war]).into_ref();
    let started = Instant::now();
    let err = discover_classpath(&context, &["a.jar"], MatchMode::RequireAll, Some(&root))
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(5));
    match err {
        ClasscopeError::LockTimeout { path, holder, .. } => {
            assert_eq!(path, slot.lock);
            assert_eq!(holder.as_deref(), Some("pid 4242"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn library_override_is_read_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let custom = dir.path().join("custom-stdlib.jar");
    fs::write(&custom, b"").unwrap();
    let _env = scoped_env(vec![
        (keys::STDLIB_JAR, Some(custom.clone().into_os_string())),
        (keys::COMPILER_CLASSPATH, None),
        (keys::COMPILER_JAR, None),
    ]);

    let found = resolve_known_library(
        keys::STDLIB_JAR,
        catalog::STDLIB.file_name,
        catalog::STDLIB.marker_class,
        None,
        None,
    );
    assert_eq!(found, Some(custom));
}

#[test]
fn marker_home_is_searched_by_the_free_function() {
    let _env = scoped_env(vec![
        (keys::STDLIB_JAR, None),
        (keys::COMPILER_CLASSPATH, None),
        (keys::COMPILER_JAR, None),
    ]);
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("runtime-bundle.jar");
    write_jar(&bundle, &[("kotlin/Unit.class", CLASS_BYTES)]);
    let app = FsLoadingContext::new("app", vec![bundle.clone()]).into_ref();
    let home = FsLoadingContext::new("runtime", vec![bundle.clone()]).into_ref();

    let resolve = |marker_home: Option<&classcope_api::ContextRef>| {
        resolve_known_library(
            keys::STDLIB_JAR,
            catalog::STDLIB.file_name,
            catalog::STDLIB.marker_class,
            Some(&app),
            marker_home,
        )
    };

    // The archive name does not match, so only the defining context finds it
    assert_eq!(resolve(None), None);
    assert_eq!(resolve(Some(&home)), Some(bundle));
}
