//! The authoritative in-memory note index
//!
//! `NoteIndex` owns all mutable state: a TTL-bounded snapshot of every
//! note's extracted metadata, swapped atomically on rebuild. Readers see
//! either the previous full snapshot or the new one, never a partially
//! populated list. Rebuilds are serialized by a rebuild lock; a second
//! `ensure_fresh` arriving mid-rebuild waits for the in-flight rebuild
//! instead of starting its own.

mod snapshot;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::config::IndexConfig;
use crate::locate::FileLocator;
use crate::logging::CacheMetrics;
use crate::note::Note;
pub use snapshot::Snapshot;

/// Inspectable index status for diagnostics and UI glue
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndexStats {
    pub note_count: usize,
    pub cache_age_ms: u64,
    pub cache_valid: bool,
    pub root_exists: bool,
}

/// TTL- and size-bounded cache of note metadata for one repository root
pub struct NoteIndex {
    config: IndexConfig,
    clock: Arc<dyn Clock>,
    locator: FileLocator,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    /// Serializes rebuilds; held only while building-and-swapping
    rebuild_lock: Mutex<()>,
    /// Set by `invalidate`, cleared after the next rebuild
    dirty: AtomicBool,
    metrics: CacheMetrics,
}

impl NoteIndex {
    pub fn new(config: IndexConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Construct with an injected clock, for deterministic TTL tests
    pub fn with_clock(config: IndexConfig, clock: Arc<dyn Clock>) -> Self {
        let locator = FileLocator::new(config.clone());
        NoteIndex {
            config,
            clock,
            locator,
            snapshot: RwLock::new(None),
            rebuild_lock: Mutex::new(()),
            dirty: AtomicBool::new(false),
            metrics: CacheMetrics::new(),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Rebuild the index if it is missing, expired, or invalidated;
    /// otherwise a no-op served from the current snapshot.
    #[tracing::instrument(skip(self, root), fields(root = %root.display()))]
    pub fn ensure_fresh(&self, root: &Path) {
        if self.is_fresh() {
            self.metrics.record_hit();
            return;
        }

        let _guard = self
            .rebuild_lock
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        // An overlapping call may have finished the rebuild while this one
        // waited on the lock
        if self.is_fresh() {
            self.metrics.record_hit();
            return;
        }
        self.metrics.record_miss();

        let built_at = self.clock.now();
        let snapshot = Snapshot::build(root, &self.config, &self.locator, built_at);
        self.swap(Arc::new(snapshot));
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// Force the next `ensure_fresh` to rebuild regardless of TTL.
    ///
    /// Called by external file-watch glue on write/create/delete events.
    /// Consumers holding derived caches (e.g. the neighborhood memo) key
    /// them by snapshot epoch, so the swap invalidates those too.
    pub fn invalidate(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Case-insensitive lookup by file stem
    pub fn find_by_name(&self, name: &str) -> Option<Arc<Note>> {
        self.current().and_then(|s| s.find_by_name(name))
    }

    /// Case-insensitive lookup by alias
    pub fn find_by_alias(&self, alias: &str) -> Option<Arc<Note>> {
        self.current().and_then(|s| s.find_by_alias(alias))
    }

    /// All notes in the current snapshot
    pub fn all_notes(&self) -> Vec<Arc<Note>> {
        self.current()
            .map(|s| s.notes.clone())
            .unwrap_or_default()
    }

    /// Notes carrying the given tag
    pub fn notes_with_tag(&self, tag: &str) -> Vec<Arc<Note>> {
        self.current()
            .map(|s| s.notes_with_tag(tag))
            .unwrap_or_default()
    }

    /// Distinct tags with note counts, sorted by tag
    pub fn tag_counts(&self) -> std::collections::BTreeMap<String, usize> {
        self.current().map(|s| s.tag_counts()).unwrap_or_default()
    }

    /// Epoch of the current snapshot, for derived-cache keying
    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.current().map(|s| s.built_at)
    }

    /// Index status for diagnostics
    pub fn stats(&self) -> IndexStats {
        match self.current() {
            Some(snapshot) => IndexStats {
                note_count: snapshot.notes.len(),
                cache_age_ms: self.age_ms(&snapshot),
                cache_valid: self.is_fresh(),
                root_exists: snapshot.root_exists,
            },
            None => IndexStats {
                note_count: 0,
                cache_age_ms: 0,
                cache_valid: false,
                root_exists: false,
            },
        }
    }

    /// Cache hit rate over this index's lifetime, for diagnostics
    pub fn cache_hit_rate(&self) -> f64 {
        self.metrics.hit_rate()
    }

    fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn swap(&self, snapshot: Arc<Snapshot>) {
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Some(snapshot);
    }

    fn is_fresh(&self) -> bool {
        if self.dirty.load(Ordering::SeqCst) {
            return false;
        }
        match self.current() {
            Some(snapshot) => self.age_ms(&snapshot) <= self.config.ttl_ms,
            None => false,
        }
    }

    fn age_ms(&self, snapshot: &Snapshot) -> u64 {
        (self.clock.now() - snapshot.built_at)
            .num_milliseconds()
            .max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use std::fs;
    use std::sync::atomic::AtomicUsize;

    fn vault_with(notes: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in notes {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    fn index_with_clock(clock: Arc<FakeClock>) -> NoteIndex {
        NoteIndex::with_clock(IndexConfig::default(), clock)
    }

    #[test]
    fn test_rebuild_and_lookup() {
        let dir = vault_with(&[
            ("a.md", "---\ntitle: Alpha\naliases: [A, first]\n---\n[[b]]\n"),
            ("b.md", "---\ntitle: Beta\n---\n[[a]]\n"),
        ]);
        let index = NoteIndex::new(IndexConfig::default());
        index.ensure_fresh(dir.path());

        assert_eq!(index.all_notes().len(), 2);
        let a = index.find_by_name("A").unwrap();
        assert_eq!(a.title, "Alpha");
        assert_eq!(index.find_by_alias("a").unwrap().file_name, "a");
        assert_eq!(index.find_by_alias("FIRST").unwrap().file_name, "a");
        assert!(index.find_by_name("missing").is_none());
    }

    #[test]
    fn test_single_scan_within_ttl() {
        let dir = vault_with(&[("a.md", "x\n")]);
        let clock = Arc::new(FakeClock::default());
        let index = index_with_clock(Arc::clone(&clock));

        index.ensure_fresh(dir.path());
        let first_built = index.built_at().unwrap();

        clock.advance_ms(1000);
        index.ensure_fresh(dir.path());
        assert_eq!(index.built_at().unwrap(), first_built);
    }

    #[test]
    fn test_rebuild_after_ttl_expiry() {
        let dir = vault_with(&[("a.md", "x\n")]);
        let clock = Arc::new(FakeClock::default());
        let index = index_with_clock(Arc::clone(&clock));

        index.ensure_fresh(dir.path());
        let first_built = index.built_at().unwrap();

        clock.advance_ms(30_001);
        index.ensure_fresh(dir.path());
        assert!(index.built_at().unwrap() > first_built);
    }

    #[test]
    fn test_invalidate_forces_rescan() {
        let dir = vault_with(&[("a.md", "x\n")]);
        let clock = Arc::new(FakeClock::default());
        let index = index_with_clock(Arc::clone(&clock));

        index.ensure_fresh(dir.path());
        assert_eq!(index.all_notes().len(), 1);

        fs::write(dir.path().join("b.md"), "y\n").unwrap();
        clock.advance_ms(1);
        index.ensure_fresh(dir.path());
        // Within TTL and not invalidated: the new file is not yet visible
        assert_eq!(index.all_notes().len(), 1);

        index.invalidate();
        clock.advance_ms(1);
        index.ensure_fresh(dir.path());
        assert_eq!(index.all_notes().len(), 2);
    }

    #[test]
    fn test_deleted_file_removed_on_rebuild() {
        let dir = vault_with(&[("a.md", "x\n"), ("b.md", "y\n")]);
        let index = NoteIndex::new(IndexConfig::default());
        index.ensure_fresh(dir.path());
        assert_eq!(index.all_notes().len(), 2);

        fs::remove_file(dir.path().join("b.md")).unwrap();
        index.invalidate();
        index.ensure_fresh(dir.path());
        let notes = index.all_notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].file_name, "a");
    }

    #[test]
    fn test_empty_root_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(FakeClock::default());
        let index = index_with_clock(Arc::clone(&clock));

        index.ensure_fresh(dir.path());
        let built = index.built_at().unwrap();
        assert!(index.all_notes().is_empty());

        // A second call within the TTL is served from the cached empty result
        clock.advance_ms(100);
        index.ensure_fresh(dir.path());
        assert_eq!(index.built_at().unwrap(), built);
    }

    #[test]
    fn test_stats_missing_root() {
        let index = NoteIndex::new(IndexConfig::default());
        index.ensure_fresh(Path::new("/no/such/root"));
        let stats = index.stats();
        assert_eq!(stats.note_count, 0);
        assert!(!stats.root_exists);
        assert!(stats.cache_valid);
    }

    #[test]
    fn test_stats_age_tracks_clock() {
        let dir = vault_with(&[("a.md", "x\n")]);
        let clock = Arc::new(FakeClock::default());
        let index = index_with_clock(Arc::clone(&clock));

        index.ensure_fresh(dir.path());
        clock.advance_ms(1234);
        let stats = index.stats();
        assert_eq!(stats.note_count, 1);
        assert_eq!(stats.cache_age_ms, 1234);
        assert!(stats.cache_valid);
        assert!(stats.root_exists);

        clock.advance_ms(30_000);
        assert!(!index.stats().cache_valid);
    }

    #[test]
    fn test_unreadable_file_skipped() {
        let dir = vault_with(&[("good.md", "fine\n")]);
        // A directory with a markdown extension cannot be read as a file
        fs::create_dir(dir.path().join("bad.md")).unwrap();

        let index = NoteIndex::new(IndexConfig::default());
        index.ensure_fresh(dir.path());
        let notes = index.all_notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].file_name, "good");
    }

    #[test]
    fn test_concurrent_readers_see_full_snapshots() {
        let dir = vault_with(&[
            ("a.md", "[[b]]\n"),
            ("b.md", "[[a]]\n"),
            ("c.md", "[[a]]\n"),
        ]);
        let index = Arc::new(NoteIndex::new(IndexConfig::default()));
        index.ensure_fresh(dir.path());

        let observed_partial = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let index = Arc::clone(&index);
            let root = dir.path().to_path_buf();
            let partial = Arc::clone(&observed_partial);
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    index.invalidate();
                    index.ensure_fresh(&root);
                    let n = index.all_notes().len();
                    // Snapshots are swapped whole: 0 or 3, never in between
                    if n != 0 && n != 3 {
                        partial.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(observed_partial.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_tag_counts() {
        let dir = vault_with(&[
            ("a.md", "---\ntags: [work]\n---\n#shared\n"),
            ("b.md", "#shared and #other\n"),
        ]);
        let index = NoteIndex::new(IndexConfig::default());
        index.ensure_fresh(dir.path());

        let counts = index.tag_counts();
        assert_eq!(counts.get("shared"), Some(&2));
        assert_eq!(counts.get("work"), Some(&1));
        assert_eq!(counts.get("other"), Some(&1));
        assert_eq!(index.notes_with_tag("shared").len(), 2);
    }
}
