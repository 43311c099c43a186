use api::v1::{CacheStats, PathRecord, StoredPath};
use dashmap::DashMap;
use dotgrid::Viewport;
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// In-memory path sets keyed by viewport, plus hit/miss counters.
pub struct PathStore {
    entries: DashMap<Viewport, ViewportEntry>,
    max_viewports: usize,
    max_paths_per_viewport: usize,
    next_path_id: AtomicU64,
    write_seq: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    // Serializes the capacity check and eviction with the insert.
    write_lock: Mutex<()>,
}

struct ViewportEntry {
    paths: Arc<Vec<PathRecord>>,
    written_seq: u64,
}

impl PathStore {
    pub fn new(max_viewports: usize, max_paths_per_viewport: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_viewports: max_viewports.max(1),
            max_paths_per_viewport,
            next_path_id: AtomicU64::new(1),
            write_seq: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    #[inline]
    pub fn max_paths_per_viewport(&self) -> usize {
        self.max_paths_per_viewport
    }

    /// Number of cached viewports.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a viewport. Only a non-empty set counts as a hit.
    pub fn get(&self, viewport: Viewport) -> Option<Arc<Vec<PathRecord>>> {
        let found = self
            .entries
            .get(&viewport)
            .map(|e| e.paths.clone())
            .filter(|paths| !paths.is_empty());

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Replaces the set stored for `viewport`, assigning fresh ids.
    ///
    /// When the store is full, the least recently written viewport is evicted
    /// first. Returns the number of paths stored.
    pub fn insert(&self, viewport: Viewport, paths: Vec<StoredPath>) -> usize {
        if paths.is_empty() {
            return 0;
        }

        let records: Vec<PathRecord> = paths
            .into_iter()
            .map(|p| PathRecord {
                id: format!("p-{}", self.next_path_id.fetch_add(1, Ordering::Relaxed)),
                from: p.from,
                to: p.to,
                points: p.points,
            })
            .collect();
        let stored = records.len();

        let _guard = self.write_lock.lock();
        if !self.entries.contains_key(&viewport) && self.entries.len() >= self.max_viewports {
            self.evict_oldest();
        }
        let written_seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            viewport,
            ViewportEntry { paths: Arc::new(records), written_seq },
        );
        stored
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().written_seq)
            .map(|e| *e.key());
        if let Some(viewport) = oldest {
            self.entries.remove(&viewport);
            tracing::info!(%viewport, "Evicted oldest cached viewport");
        }
    }

    /// Drops one viewport, or every viewport when `None`. Returns how many
    /// viewports were removed.
    pub fn clear(&self, viewport: Option<Viewport>) -> usize {
        let _guard = self.write_lock.lock();
        match viewport {
            Some(v) => self.entries.remove(&v).map_or(0, |_| 1),
            None => {
                let n = self.entries.len();
                self.entries.clear();
                n
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            hits,
            misses,
            hit_rate: if total == 0 { 0.0 } else { hits as f64 / total as f64 },
            viewports: self.entries.len(),
            paths: self.entries.iter().map(|e| e.paths.len()).sum(),
        }
    }

    /// Zeroes the hit/miss counters, returning the stats from before the reset.
    pub fn reset_stats(&self) -> CacheStats {
        let before = self.stats();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotgrid::GridPoint;

    fn stored(n: usize) -> Vec<StoredPath> {
        (0..n)
            .map(|i| StoredPath {
                from: "a".into(),
                to: "b".into(),
                variation: (i % 5) as u32,
                points: vec![GridPoint::new(0, 0), GridPoint::new(30, 30)],
                distance: 42.4,
            })
            .collect()
    }

    #[test]
    fn miss_then_hit() {
        let store = PathStore::new(8, 100);
        let vp = Viewport::new(1280, 800);
        assert!(store.get(vp).is_none());
        assert_eq!(store.insert(vp, stored(3)), 3);
        assert_eq!(store.get(vp).map(|p| p.len()), Some(3));

        let stats = store.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!((stats.viewports, stats.paths), (1, 3));
    }

    #[test]
    fn insert_replaces_and_renumbers() {
        let store = PathStore::new(8, 100);
        let vp = Viewport::new(800, 600);
        store.insert(vp, stored(2));
        store.insert(vp, stored(1));
        let paths = store.get(vp).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].id, "p-3");
    }

    #[test]
    fn empty_insert_is_ignored() {
        let store = PathStore::new(8, 100);
        assert_eq!(store.insert(Viewport::new(1, 1), Vec::new()), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn full_store_evicts_least_recently_written() {
        let store = PathStore::new(2, 100);
        let (a, b, c) = (Viewport::new(1, 1), Viewport::new(2, 2), Viewport::new(3, 3));
        store.insert(a, stored(1));
        store.insert(b, stored(1));
        store.insert(a, stored(1));
        store.insert(c, stored(1));

        assert_eq!(store.len(), 2);
        assert!(store.get(b).is_none());
        assert!(store.get(a).is_some());
        assert!(store.get(c).is_some());
    }

    #[test]
    fn clear_one_or_all() {
        let store = PathStore::new(8, 100);
        store.insert(Viewport::new(1, 1), stored(1));
        store.insert(Viewport::new(2, 2), stored(1));
        assert_eq!(store.clear(Some(Viewport::new(9, 9))), 0);
        assert_eq!(store.clear(Some(Viewport::new(1, 1))), 1);
        assert_eq!(store.clear(None), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn reset_stats_returns_previous_counters() {
        let store = PathStore::new(8, 100);
        store.get(Viewport::new(1, 1));
        let before = store.reset_stats();
        assert_eq!(before.misses, 1);
        assert_eq!(store.stats().misses, 0);
    }
}
