mod common;

use classcope_api::CandidateEntry;
use classcope_core::ClasscopeError;
use classcope_core::cache::{CacheSlot, CollectionCache, CollectionKey};
use common::{write_jar, write_war};
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

#[test]
fn unpack_returns_class_dirs_and_direct_libraries() {
    let dir = tempfile::tempdir().unwrap();
    let war = dir.path().join("app.war");
    write_war(&war);
    let root = dir.path().join("cache");

    let cache = CollectionCache::new(&root);
    let entries = cache.unpack(&war).unwrap();
    let slot = cache.slot_for(&war).unwrap();

    assert_eq!(
        entries,
        vec![
            CandidateEntry::directory(slot.target.join("WEB-INF/classes")),
            CandidateEntry::archive(slot.target.join("WEB-INF/lib/a-1.0.jar")),
            CandidateEntry::archive(slot.target.join("WEB-INF/lib/b.jar")),
        ]
    );

    // Everything lands on disk, returned or not
    assert!(slot.target.join("WEB-INF/classes/com/example/App.class").is_file());
    assert!(slot.target.join("WEB-INF/lib/nested/c.jar").is_file());
    assert!(slot.target.join("index.html").is_file());
    assert!(slot.marker.is_file());
    assert!(!slot.lock.exists());
}

#[test]
fn repeat_unpack_extracts_once() {
    let dir = tempfile::tempdir().unwrap();
    let war = dir.path().join("app.war");
    write_war(&war);
    let root = dir.path().join("cache");

    let cache = CollectionCache::new(&root);
    let first = cache.unpack(&war).unwrap();
    let second = cache.unpack(&war).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.extraction_count(), 1);

    // Another agent on the same root reads the completed slot
    let other = CollectionCache::new(&root);
    assert_eq!(other.unpack(&war).unwrap(), first);
    assert_eq!(other.extraction_count(), 0);
}

#[test]
fn rebuilt_archive_gets_fresh_slot_and_keeps_stale_one() {
    let dir = tempfile::tempdir().unwrap();
    let war = dir.path().join("app.war");
    write_war(&war);
    let root = dir.path().join("cache");
    let cache = CollectionCache::new(&root);

    cache.unpack(&war).unwrap();
    let old_slot = cache.slot_for(&war).unwrap();

    write_jar(
        &war,
        &[
            ("WEB-INF/lib/a-2.0.jar", b"jar a, rebuilt"),
            ("WEB-INF/lib/d.jar", b"jar d"),
        ],
    );
    let new_entries = cache.unpack(&war).unwrap();
    let new_slot = cache.slot_for(&war).unwrap();

    assert_ne!(old_slot.name, new_slot.name);
    assert_eq!(cache.extraction_count(), 2);
    assert_eq!(
        new_entries,
        vec![
            CandidateEntry::archive(new_slot.target.join("WEB-INF/lib/a-2.0.jar")),
            CandidateEntry::archive(new_slot.target.join("WEB-INF/lib/d.jar")),
        ]
    );
    assert!(old_slot.marker.is_file());
    assert!(old_slot.target.join("WEB-INF/lib/a-1.0.jar").is_file());
}

#[test]
fn touched_archive_changes_key() {
    let dir = tempfile::tempdir().unwrap();
    let war = dir.path().join("app.war");
    write_war(&war);
    let before = CollectionKey::from_archive(&war).unwrap();

    let file = fs::File::options().write(true).open(&war).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(120))
        .unwrap();
    drop(file);

    let after = CollectionKey::from_archive(&war).unwrap();
    assert_eq!(before.len, after.len);
    assert_ne!(before.derived_name(), after.derived_name());
}

#[test]
fn concurrent_callers_share_one_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let war = dir.path().join("app.war");
    write_war(&war);
    let root = dir.path().join("cache");

    let agents = 8;
    let barrier = Arc::new(Barrier::new(agents));
    let handles: Vec<_> = (0..agents)
        .map(|_| {
            let barrier = barrier.clone();
            let war = war.clone();
            let root = root.clone();
            thread::spawn(move || {
                // Separate instances, as separate processes would have
                let cache = CollectionCache::new(&root).with_timeout(Duration::from_secs(60));
                barrier.wait();
                let entries = cache.unpack(&war).unwrap();
                (entries, cache.extraction_count())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let extractions: usize = results.iter().map(|(_, n)| n).sum();
    assert_eq!(extractions, 1);

    let expected = &results[0].0;
    assert_eq!(expected.len(), 3);
    for (entries, _) in &results {
        assert_eq!(entries, expected);
        for entry in entries {
            assert!(entry.path.exists());
        }
    }
}

#[test]
fn abandoned_lock_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let war = dir.path().join("app.war");
    write_war(&war);
    let root = dir.path().join("cache");
    fs::create_dir_all(&root).unwrap();

    let timeout = Duration::from_millis(400);
    let cache = CollectionCache::new(&root).with_timeout(timeout);
    let slot = cache.slot_for(&war).unwrap();
    fs::write(&slot.lock, "pid 99999\n").unwrap();

    let started = Instant::now();
    let err = cache.unpack(&war).unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ClasscopeError::LockTimeout { .. }), "{err}");
    assert!(elapsed >= timeout, "gave up after {elapsed:?}");
    assert!(elapsed < timeout + Duration::from_secs(5), "took {elapsed:?}");
    assert!(!slot.target.exists());
    assert!(slot.lock.exists());
    assert_eq!(cache.extraction_count(), 0);
}

#[test]
fn failed_extraction_leaves_no_slot() {
    let dir = tempfile::tempdir().unwrap();
    let war = dir.path().join("broken.war");
    fs::write(&war, b"this is not an archive").unwrap();
    let root = dir.path().join("cache");

    let cache = CollectionCache::new(&root);
    let err = cache.unpack(&war).unwrap_err();
    let slot = cache.slot_for(&war).unwrap();

    assert!(matches!(err, ClasscopeError::Extraction { .. }), "{err}");
    assert!(!slot.target.exists());
    assert!(!slot.marker.exists());
    assert!(!slot.lock.exists());
}

#[test]
fn externally_removed_contents_are_unpacked_again() {
    let dir = tempfile::tempdir().unwrap();
    let war = dir.path().join("app.war");
    write_war(&war);
    let root = dir.path().join("cache");
    let cache = CollectionCache::new(&root);

    let first = cache.unpack(&war).unwrap();
    let slot: CacheSlot = cache.slot_for(&war).unwrap();
    fs::remove_dir_all(&slot.target).unwrap();
    assert!(slot.marker.exists());

    let second = cache.unpack(&war).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.extraction_count(), 2);
    assert!(slot.marker.is_file());
}

#[test]
fn leftover_contents_without_marker_are_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let war = dir.path().join("app.war");
    write_war(&war);
    let root = dir.path().join("cache");
    let cache = CollectionCache::new(&root);

    let slot = cache.slot_for(&war).unwrap();
    fs::create_dir_all(slot.target.join("WEB-INF/lib")).unwrap();
    fs::write(slot.target.join("WEB-INF/lib/garbage.jar"), b"half").unwrap();

    let entries = cache.unpack(&war).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(!slot.target.join("WEB-INF/lib/garbage.jar").exists());
}

#[test]
fn dotted_entry_names_give_the_same_result_on_reuse() {
    let dir = tempfile::tempdir().unwrap();
    let war = dir.path().join("dotted.war");
    write_jar(
        &war,
        &[
            ("./WEB-INF/classes/X.class", common::CLASS_BYTES),
            ("./WEB-INF/lib/a-1.0.jar", b"jar a"),
        ],
    );
    let root = dir.path().join("cache");

    let first = CollectionCache::new(&root).unpack(&war).unwrap();
    let second = CollectionCache::new(&root).unpack(&war).unwrap();
    let slot = CollectionCache::new(&root).slot_for(&war).unwrap();

    assert_eq!(
        first,
        vec![
            CandidateEntry::directory(slot.target.join("WEB-INF/classes")),
            CandidateEntry::archive(slot.target.join("WEB-INF/lib/a-1.0.jar")),
        ]
    );
    assert_eq!(first, second);
}
