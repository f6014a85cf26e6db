//! Depth-1 link neighborhoods
//!
//! Derives incoming/outgoing adjacency for one note from the index's
//! extracted links. Deliberately local: multi-hop traversal is the
//! caller's responsibility (with its own visited-set and depth budget),
//! never hidden default recursion.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::index::NoteIndex;

/// Incoming/outgoing adjacency for one note
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Neighborhood {
    /// Notes this note links to (deduplicated, self excluded)
    pub outgoing: BTreeSet<String>,
    /// File names of notes linking here
    pub incoming: BTreeSet<String>,
}

struct CachedNeighborhood {
    value: Neighborhood,
    cached_at: DateTime<Utc>,
    /// Snapshot epoch the value was derived from; a rebuild retires it
    epoch: Option<DateTime<Utc>>,
}

/// Neighborhood queries over a shared [`NoteIndex`], memoized under a
/// short TTL to absorb bursty redraw requests for the same note
pub struct LinkGraph {
    index: Arc<NoteIndex>,
    clock: Arc<dyn Clock>,
    cache: Mutex<HashMap<String, CachedNeighborhood>>,
}

impl LinkGraph {
    pub fn new(index: Arc<NoteIndex>) -> Self {
        Self::with_clock(index, Arc::new(SystemClock))
    }

    pub fn with_clock(index: Arc<NoteIndex>, clock: Arc<dyn Clock>) -> Self {
        LinkGraph {
            index,
            clock,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Compute (or recall) the depth-1 neighborhood of `file_name`.
    ///
    /// Unknown notes yield an empty neighborhood. Incoming links cost one
    /// O(N) scan over the index, bounded by `max_files`.
    #[tracing::instrument(skip(self, root), fields(root = %root.display()))]
    pub fn neighborhood(&self, file_name: &str, root: &Path) -> Neighborhood {
        self.index.ensure_fresh(root);
        let epoch = self.index.built_at();
        let key = file_name.to_lowercase();

        if let Some(cached) = self.recall(&key, epoch) {
            return cached;
        }

        let value = self.compute(&key);
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(
            key,
            CachedNeighborhood {
                value: value.clone(),
                cached_at: self.clock.now(),
                epoch,
            },
        );
        value
    }

    /// Drop all memoized neighborhoods
    pub fn clear(&self) {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn recall(&self, key: &str, epoch: Option<DateTime<Utc>>) -> Option<Neighborhood> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let cached = cache.get(key)?;
        if cached.epoch != epoch {
            return None;
        }
        let age_ms = (self.clock.now() - cached.cached_at).num_milliseconds().max(0) as u64;
        if age_ms > self.index.config().graph_ttl_ms {
            return None;
        }
        Some(cached.value.clone())
    }

    fn compute(&self, folded_name: &str) -> Neighborhood {
        let mut neighborhood = Neighborhood::default();

        if let Some(note) = self.index.find_by_name(folded_name) {
            neighborhood.outgoing = note
                .outbound_links
                .iter()
                .filter(|target| target.to_lowercase() != folded_name)
                .cloned()
                .collect();
        }

        for other in self.index.all_notes() {
            if other.file_name.to_lowercase() == folded_name {
                continue;
            }
            let links_here = other
                .outbound_links
                .iter()
                .any(|target| target.to_lowercase() == folded_name);
            if links_here {
                neighborhood.incoming.insert(other.file_name.clone());
            }
        }

        neighborhood
    }
}
