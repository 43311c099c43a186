//! Cache-aside loading of path sets.

use crate::store::PathCache;
use dotgrid::{generate_paths, GridConfig, Hotspot, Path, Viewport};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOrigin {
    /// Served verbatim by the remote store.
    Cache,
    /// Computed locally after a miss or a store failure.
    Generated,
}

#[derive(Debug)]
pub struct LoadedPaths {
    pub paths: Vec<Path>,
    pub origin: PathOrigin,
    /// Write-back of freshly generated paths, if one was started. Dropping the
    /// handle does not cancel it.
    pub write_back: Option<JoinHandle<()>>,
}

pub struct PathSource<C> {
    cache: Arc<C>,
    config: Arc<GridConfig>,
    write_back: bool,
}

impl<C: PathCache> PathSource<C> {
    pub fn new(cache: C, config: Arc<GridConfig>, write_back: bool) -> Self {
        Self { cache: Arc::new(cache), config, write_back }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Returns the stored set for `viewport`, or generates one locally.
    ///
    /// Never fails: a store error or an empty answer both fall through to local
    /// generation, after which the new set is written back in the background.
    /// Generation runs on the blocking pool, seeded from `rng`.
    pub async fn load<R: Rng + ?Sized>(
        &self,
        viewport: Viewport,
        hotspots: &[Hotspot],
        rng: &mut R,
    ) -> LoadedPaths {
        match self.cache.fetch(viewport).await {
            Ok(paths) if !paths.is_empty() => {
                tracing::debug!(%viewport, paths = paths.len(), "Loaded paths from store");
                return LoadedPaths { paths, origin: PathOrigin::Cache, write_back: None };
            }
            Ok(_) => tracing::debug!(%viewport, "Path store miss"),
            Err(e) => tracing::warn!(%viewport, error = %e, "Path store unavailable, generating locally"),
        }

        let paths = self.generate(viewport, hotspots, rng.gen()).await;
        let write_back = (self.write_back && !paths.is_empty())
            .then(|| self.spawn_store(viewport, paths.clone()));

        LoadedPaths { paths, origin: PathOrigin::Generated, write_back }
    }

    async fn generate(&self, viewport: Viewport, hotspots: &[Hotspot], seed: u64) -> Vec<Path> {
        let config = self.config.clone();
        let hotspots = hotspots.to_vec();
        let task = tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            generate_paths(&hotspots, viewport, &config, &mut rng)
        });
        match task.await {
            Ok(paths) => paths,
            Err(e) => {
                tracing::error!(%viewport, error = %e, "Path generation task failed");
                Vec::new()
            }
        }
    }

    /// Fire-and-forget persistence; failures are logged and not retried.
    fn spawn_store(&self, viewport: Viewport, paths: Vec<Path>) -> JoinHandle<()> {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            match cache.store(viewport, &paths).await {
                Ok(stored) => tracing::debug!(%viewport, stored, "Stored generated paths"),
                Err(e) => tracing::warn!(%viewport, error = %e, "Failed to store generated paths"),
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::StoreError;
    use async_trait::async_trait;
    use dotgrid::{compute_hotspots, GridPoint};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-process stand-in for the HTTP store.
    #[derive(Default)]
    pub(crate) struct MemoryCache {
        pub entries: Mutex<HashMap<Viewport, Vec<Path>>>,
        pub offline: bool,
    }

    #[async_trait]
    impl PathCache for MemoryCache {
        async fn fetch(&self, viewport: Viewport) -> Result<Vec<Path>, StoreError> {
            if self.offline {
                return Err(StoreError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
            }
            Ok(self.entries.lock().get(&viewport).cloned().unwrap_or_default())
        }

        async fn store(&self, viewport: Viewport, paths: &[Path]) -> Result<usize, StoreError> {
            if self.offline {
                return Err(StoreError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
            }
            self.entries.lock().insert(viewport, paths.to_vec());
            Ok(paths.len())
        }

        async fn clear(&self, viewport: Option<Viewport>) -> Result<usize, StoreError> {
            let mut entries = self.entries.lock();
            Ok(match viewport {
                Some(v) => entries.remove(&v).map_or(0, |_| 1),
                None => {
                    let n = entries.len();
                    entries.clear();
                    n
                }
            })
        }
    }

    fn source(cache: MemoryCache) -> PathSource<MemoryCache> {
        PathSource::new(cache, Arc::new(GridConfig::default()), true)
    }

    #[tokio::test]
    async fn miss_generates_and_writes_back() {
        let src = source(MemoryCache::default());
        let vp = Viewport::new(1024, 768);
        let hotspots = compute_hotspots(vp, src.config());
        let mut rng = StdRng::seed_from_u64(1);

        let loaded = src.load(vp, &hotspots, &mut rng).await;
        assert_eq!(loaded.origin, PathOrigin::Generated);
        assert!(!loaded.paths.is_empty());
        loaded.write_back.expect("write-back started").await.unwrap();

        let again = src.load(vp, &hotspots, &mut rng).await;
        assert_eq!(again.origin, PathOrigin::Cache);
        assert_eq!(again.paths, loaded.paths);
        assert!(again.write_back.is_none());
    }

    #[tokio::test]
    async fn offline_store_falls_back_to_local_generation() {
        let src = source(MemoryCache { offline: true, ..MemoryCache::default() });
        let vp = Viewport::new(1024, 768);
        let hotspots = compute_hotspots(vp, src.config());
        let mut rng = StdRng::seed_from_u64(2);

        let loaded = src.load(vp, &hotspots, &mut rng).await;
        assert_eq!(loaded.origin, PathOrigin::Generated);
        assert!(!loaded.paths.is_empty());
        // The failed write-back is swallowed.
        loaded.write_back.unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn cached_set_is_returned_verbatim() {
        let vp = Viewport::new(300, 300);
        let cached = vec![Path {
            id: "p-1".into(),
            from: "x".into(),
            to: "y".into(),
            points: vec![GridPoint::new(0, 0), GridPoint::new(30, 0)],
        }];
        let cache = MemoryCache::default();
        cache.entries.lock().insert(vp, cached.clone());
        let src = source(cache);

        let mut rng = StdRng::seed_from_u64(3);
        let loaded = src.load(vp, &[], &mut rng).await;
        assert_eq!(loaded.origin, PathOrigin::Cache);
        assert_eq!(loaded.paths, cached);
    }

    #[tokio::test]
    async fn write_back_can_be_disabled() {
        let src = PathSource::new(MemoryCache::default(), Arc::new(GridConfig::default()), false);
        let vp = Viewport::new(800, 600);
        let hotspots = compute_hotspots(vp, src.config());
        let mut rng = StdRng::seed_from_u64(4);

        let loaded = src.load(vp, &hotspots, &mut rng).await;
        assert!(loaded.write_back.is_none());
        assert!(src.cache().entries.lock().is_empty());
    }

    #[tokio::test]
    async fn generation_is_reproducible_for_a_seed() {
        let src = PathSource::new(MemoryCache::default(), Arc::new(GridConfig::default()), false);
        let vp = Viewport::new(1024, 768);
        let hotspots = compute_hotspots(vp, src.config());

        let a = src.load(vp, &hotspots, &mut StdRng::seed_from_u64(5)).await;
        let b = src.load(vp, &hotspots, &mut StdRng::seed_from_u64(5)).await;
        assert_eq!(a.origin, PathOrigin::Generated);
        assert_eq!(a.paths, b.paths);
    }
}
