use crate::source::{PathOrigin, PathSource};
use crate::store::PathCache;
use dotgrid::render::{render_svg, RenderOptions, Scene};
use dotgrid::{compute_hotspots, GridConfig, Hotspot, Lattice, Path, PointerTracker, Viewport};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;

/// One mounted backdrop: the viewport, its hotspots and paths, and the pointer
/// tracker driving which paths are shown.
///
/// Path sets load asynchronously. A load only lands if the backdrop is still
/// alive and no resize happened since it was started.
pub struct Backdrop<C> {
    inner: Arc<Mutex<SessionState>>,
    source: Arc<PathSource<C>>,
    config: Arc<GridConfig>,
}

struct SessionState {
    viewport: Viewport,
    hotspots: Vec<Hotspot>,
    paths: Vec<Path>,
    origin: Option<PathOrigin>,
    tracker: PointerTracker,
    epoch: u64,
    rng: StdRng,
    pending_write: Option<JoinHandle<()>>,
}

impl<C: PathCache> Backdrop<C> {
    /// Builds the grid for `viewport` and starts loading its paths.
    pub fn mount(
        source: PathSource<C>,
        viewport: Viewport,
        seed: Option<u64>,
    ) -> (Self, JoinHandle<()>) {
        let config = Arc::new(source.config().clone());
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = SessionState {
            viewport,
            hotspots: compute_hotspots(viewport, &config),
            paths: Vec::new(),
            origin: None,
            tracker: PointerTracker::new(viewport, &config),
            epoch: 0,
            rng,
            pending_write: None,
        };
        let backdrop = Self {
            inner: Arc::new(Mutex::new(state)),
            source: Arc::new(source),
            config,
        };
        let load = backdrop.spawn_load();
        (backdrop, load)
    }

    /// Regenerates the grid for a new viewport and reloads its paths.
    ///
    /// Returns `None` when the size did not change.
    pub fn resize(&self, viewport: Viewport) -> Option<JoinHandle<()>> {
        {
            let mut st = self.inner.lock();
            if st.viewport == viewport {
                return None;
            }
            tracing::debug!(from = %st.viewport, to = %viewport, "Viewport resized");
            st.viewport = viewport;
            st.hotspots = compute_hotspots(viewport, &self.config);
            st.paths.clear();
            st.origin = None;
            st.tracker.reset(viewport, &self.config);
            st.epoch += 1;
        }
        Some(self.spawn_load())
    }

    fn spawn_load(&self) -> JoinHandle<()> {
        let (viewport, hotspots, epoch, seed) = {
            let mut st = self.inner.lock();
            let seed: u64 = st.rng.gen();
            (st.viewport, st.hotspots.clone(), st.epoch, seed)
        };
        let weak: Weak<Mutex<SessionState>> = Arc::downgrade(&self.inner);
        let source = self.source.clone();

        tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(seed);
            let loaded = source.load(viewport, &hotspots, &mut rng).await;

            let Some(inner) = weak.upgrade() else {
                tracing::debug!(%viewport, "Backdrop dropped before paths arrived");
                return;
            };
            let mut st = inner.lock();
            if st.epoch != epoch {
                tracing::debug!(%viewport, "Discarding paths for a stale viewport");
                return;
            }
            tracing::info!(
                %viewport,
                origin = ?loaded.origin,
                paths = loaded.paths.len(),
                "Paths ready"
            );
            st.paths = loaded.paths;
            st.origin = Some(loaded.origin);
            st.pending_write = loaded.write_back;
            st.tracker.invalidate();
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.inner.lock().viewport
    }

    pub fn origin(&self) -> Option<PathOrigin> {
        self.inner.lock().origin
    }

    pub fn path_count(&self) -> usize {
        self.inner.lock().paths.len()
    }

    pub fn hotspot_count(&self) -> usize {
        self.inner.lock().hotspots.len()
    }

    pub fn active_ids(&self) -> Vec<String> {
        self.inner.lock().tracker.active_ids().to_vec()
    }

    /// Records a pointer position; processed on the next [`Backdrop::frame`].
    pub fn pointer_moved(&self, x: f64, y: f64) {
        self.inner.lock().tracker.pointer_moved(x, y);
    }

    /// Runs one animation frame. Returns `true` if the active paths changed.
    pub fn frame(&self) -> bool {
        let mut guard = self.inner.lock();
        let st = &mut *guard;
        st.tracker.frame(&st.hotspots, &st.paths, &mut st.rng)
    }

    /// Hands out the background write-back of the last generated set, if any.
    pub fn take_pending_write(&self) -> Option<JoinHandle<()>> {
        self.inner.lock().pending_write.take()
    }

    pub fn render(&self, options: &RenderOptions) -> String {
        let st = self.inner.lock();
        let scene = Scene {
            lattice: Lattice::new(st.viewport, &self.config),
            width: st.viewport.width,
            height: st.viewport.height,
            hotspots: &st.hotspots,
            active: st.tracker.active_paths(&st.paths),
            source: st.tracker.source(),
        };
        render_svg(&scene, options)
    }
}
