//! Immutable index snapshots
//!
//! A rebuild assembles a complete `Snapshot` off to the side; readers only
//! ever observe a fully-built snapshot through an `Arc` swap.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::IndexConfig;
use crate::locate::FileLocator;
use crate::note::Note;

/// Rebuild yields to the scheduler after this many files, as a cooperative
/// hint for single-threaded hosts; not a correctness requirement.
const YIELD_BATCH: usize = 32;

/// One fully-built, immutable view of the repository
#[derive(Debug)]
pub struct Snapshot {
    /// Authoritative note list, in located (sorted-path) order
    pub notes: Vec<Arc<Note>>,
    /// Case-folded file name -> index into `notes` (first wins on collision)
    by_name: HashMap<String, usize>,
    /// Case-folded alias -> index into `notes` (first wins on collision)
    by_alias: HashMap<String, usize>,
    /// Tag -> indices into `notes`
    by_tag: HashMap<String, Vec<usize>>,
    /// Timestamp of this rebuild
    pub built_at: DateTime<Utc>,
    /// Whether the root existed and was a directory at rebuild time
    pub root_exists: bool,
}

impl Snapshot {
    /// Build a snapshot by locating and reading every markdown file under `root`
    #[tracing::instrument(skip(root, config, locator), fields(root = %root.display()))]
    pub fn build(
        root: &Path,
        config: &IndexConfig,
        locator: &FileLocator,
        built_at: DateTime<Utc>,
    ) -> Snapshot {
        let start = std::time::Instant::now();
        let root_exists = root.is_dir();
        let paths = locator.locate(root);

        let mut notes: Vec<Arc<Note>> = Vec::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            match Note::read(path, config) {
                Ok(note) => notes.push(Arc::new(note)),
                Err(e) => {
                    // Unreadable files are skipped, not fatal
                    debug!(path = %path.display(), error = %e, "skipping unreadable file");
                }
            }
            if (i + 1) % YIELD_BATCH == 0 {
                thread::yield_now();
            }
        }

        let mut snapshot = Snapshot {
            notes,
            by_name: HashMap::new(),
            by_alias: HashMap::new(),
            by_tag: HashMap::new(),
            built_at,
            root_exists,
        };
        snapshot.build_lookup_maps();

        debug!(
            note_count = snapshot.notes.len(),
            root_exists, "index snapshot built"
        );
        crate::trace_time!(start, "snapshot_build", note_count = snapshot.notes.len());
        snapshot
    }

    /// An empty snapshot, used before the first rebuild
    pub fn empty(built_at: DateTime<Utc>) -> Snapshot {
        Snapshot {
            notes: Vec::new(),
            by_name: HashMap::new(),
            by_alias: HashMap::new(),
            by_tag: HashMap::new(),
            built_at,
            root_exists: false,
        }
    }

    fn build_lookup_maps(&mut self) {
        for (idx, note) in self.notes.iter().enumerate() {
            self.by_name
                .entry(note.file_name.to_lowercase())
                .or_insert(idx);
            for alias in &note.aliases {
                self.by_alias.entry(alias.to_lowercase()).or_insert(idx);
            }
            for tag in &note.tags {
                self.by_tag.entry(tag.clone()).or_default().push(idx);
            }
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<Arc<Note>> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&idx| Arc::clone(&self.notes[idx]))
    }

    pub fn find_by_alias(&self, alias: &str) -> Option<Arc<Note>> {
        self.by_alias
            .get(&alias.to_lowercase())
            .map(|&idx| Arc::clone(&self.notes[idx]))
    }

    pub fn notes_with_tag(&self, tag: &str) -> Vec<Arc<Note>> {
        self.by_tag
            .get(&tag.to_lowercase())
            .map(|indices| {
                indices
                    .iter()
                    .map(|&idx| Arc::clone(&self.notes[idx]))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Distinct tags with their note counts
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        self.by_tag
            .iter()
            .map(|(tag, indices)| (tag.clone(), indices.len()))
            .collect()
    }
}
