//! Pointer tracking: maps continuous pointer movement onto hotspots and picks
//! which paths are on screen.

use crate::config::GridConfig;
use crate::grid::{GridPoint, Hotspot, Lattice, Viewport};
use crate::path::Path;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Reverse;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// No pointer event has been seen yet.
    Idle,
    /// At least one pointer event arrived; stays here for the tracker's lifetime.
    Tracking,
}

/// Per-session pointer state.
///
/// Raw pointer events only overwrite the pending position. The work happens in
/// [`PointerTracker::frame`], which the host calls once per animation frame, so
/// a burst of events costs at most one recomputation.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    lattice: Lattice,
    max_trail_steps: i32,
    max_active_paths: usize,
    state: TrackerState,
    pending: Option<(f64, f64)>,
    last: Option<(f64, f64)>,
    source: Option<GridPoint>,
    active_hotspot: Option<String>,
    active: Vec<String>,
}

impl PointerTracker {
    pub fn new(viewport: Viewport, config: &GridConfig) -> Self {
        Self {
            lattice: Lattice::new(viewport, config),
            max_trail_steps: i32::try_from(config.max_trail_steps).unwrap_or(i32::MAX),
            max_active_paths: config.max_active_paths.max(1),
            state: TrackerState::Idle,
            pending: None,
            last: None,
            source: None,
            active_hotspot: None,
            active: Vec::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// The trailing source marker, once the first frame has been processed.
    #[inline]
    pub fn source(&self) -> Option<GridPoint> {
        self.source
    }

    #[inline]
    pub fn active_hotspot(&self) -> Option<&str> {
        self.active_hotspot.as_deref()
    }

    #[inline]
    pub fn active_ids(&self) -> &[String] {
        &self.active
    }

    /// Resolves the active ids against the current path set.
    pub fn active_paths<'a>(&self, paths: &'a [Path]) -> Vec<&'a Path> {
        self.active
            .iter()
            .filter_map(|id| paths.iter().find(|p| &p.id == id))
            .collect()
    }

    /// Records a raw pointer position. Cheap; call it for every event.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if self.state == TrackerState::Idle {
            tracing::debug!("Pointer tracking started");
            self.state = TrackerState::Tracking;
        }
        self.pending = Some((x, y));
        self.last = Some((x, y));
    }

    /// Rebuilds the lattice for a new viewport and forgets everything derived
    /// from the old one. The Idle/Tracking state is kept.
    pub fn reset(&mut self, viewport: Viewport, config: &GridConfig) {
        self.lattice = Lattice::new(viewport, config);
        self.source = None;
        self.invalidate();
    }

    /// Forces the next frame to re-select the bundle, e.g. after the path set
    /// has been replaced. A pointer resting in place is re-queued so the
    /// selection does not wait for the next move.
    pub fn invalidate(&mut self) {
        self.active_hotspot = None;
        self.active.clear();
        self.pending = self.pending.or(self.last);
    }

    /// Processes the latest pending pointer position, if any.
    ///
    /// Returns `true` when the active path set changed.
    pub fn frame<R: Rng + ?Sized>(
        &mut self,
        hotspots: &[Hotspot],
        paths: &[Path],
        rng: &mut R,
    ) -> bool {
        let Some((x, y)) = self.pending.take() else {
            return false;
        };

        let snapped = self.lattice.snap(x, y);
        self.source = Some(self.trail(snapped));

        let Some(nearest) = nearest_hotspot(hotspots, x, y) else {
            return false;
        };
        if self.active_hotspot.as_deref() == Some(nearest.id.as_str()) {
            return false;
        }

        let bundle = select_bundle(paths, &nearest.id, self.max_active_paths, rng);
        tracing::debug!(
            hotspot = %nearest.id,
            active = bundle.len(),
            "Active hotspot changed"
        );
        self.active_hotspot = Some(nearest.id.clone());
        self.active = bundle.into_iter().map(|p| p.id.clone()).collect();
        true
    }

    /// Moves the source marker toward `target` by at most `max_trail_steps`
    /// lattice steps per axis.
    fn trail(&self, target: GridPoint) -> GridPoint {
        let Some(prev) = self.source else {
            return target;
        };
        let reach = self.max_trail_steps * self.lattice.spacing();
        GridPoint::new(
            prev.x + (target.x - prev.x).clamp(-reach, reach),
            prev.y + (target.y - prev.y).clamp(-reach, reach),
        )
    }
}

/// The hotspot closest to a raw pointer position.
pub fn nearest_hotspot(hotspots: &[Hotspot], x: f64, y: f64) -> Option<&Hotspot> {
    hotspots.iter().min_by(|a, b| {
        a.point()
            .distance_to(x, y)
            .total_cmp(&b.point().distance_to(x, y))
    })
}

/// Chooses up to `max_active` paths leaving `hotspot`, all ending at the same
/// destination.
///
/// Destinations are ranked by how many variations they have; only those with
/// at least `min(max_active, 2)` qualify. When none qualifies, a single path
/// from any destination is returned instead.
pub fn select_bundle<'a, R: Rng + ?Sized>(
    paths: &'a [Path],
    hotspot: &str,
    max_active: usize,
    rng: &mut R,
) -> Vec<&'a Path> {
    let threshold = max_active.min(2);
    let mut groups: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();
    for p in paths.iter().filter(|p| p.from == hotspot) {
        groups.entry(p.to.as_str()).or_default().push(p);
    }

    let best = groups
        .iter()
        .filter(|(_, group)| group.len() >= threshold)
        .max_by_key(|(to, group)| (group.len(), Reverse(**to)));

    match best {
        Some((_, group)) => group.choose_multiple(rng, max_active).copied().collect(),
        None => {
            let fallback: Vec<&Path> = groups.values().flatten().take(1).copied().collect();
            if !fallback.is_empty() {
                tracing::debug!(hotspot, "No destination meets the variation threshold");
            }
            fallback
        }
    }
}
