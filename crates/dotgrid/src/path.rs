//! Randomized lattice walks between hotspot pairs.

use crate::config::GridConfig;
use crate::grid::{GridPoint, Hotspot, Lattice, Viewport};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One drawable route from hotspot `from` to hotspot `to`.
///
/// Several paths may share the same `(from, to)` pair; each is a separate
/// variation produced by an independent walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub id: String,
    pub from: String,
    pub to: String,
    pub points: Vec<GridPoint>,
}

impl Path {
    #[inline]
    pub fn start(&self) -> Option<GridPoint> {
        self.points.first().copied()
    }

    #[inline]
    pub fn end(&self) -> Option<GridPoint> {
        self.points.last().copied()
    }

    /// Straight-line distance between the first and last point.
    pub fn span(&self) -> f64 {
        match (self.start(), self.end()) {
            (Some(a), Some(b)) => a.distance(&b),
            _ => 0.0,
        }
    }
}

/// Walks the lattice from `start` toward `end`.
///
/// Each step moves to a random unvisited dot within two spacings that is
/// strictly closer to `end`. The walk stops once it is within one spacing of
/// `end` or when no such dot exists; `end` is then appended unconditionally,
/// so the result always starts at `start` and finishes at `end`.
pub fn walk<R: Rng + ?Sized>(
    lattice: &Lattice,
    start: GridPoint,
    end: GridPoint,
    rng: &mut R,
) -> Vec<GridPoint> {
    let step = lattice.spacing() as f64;
    let mut points = vec![start];
    let mut visited = HashSet::from([start]);
    let mut current = start;

    while current.distance(&end) > step {
        let remaining = current.distance(&end);
        let candidates: Vec<GridPoint> = lattice
            .near(current, 2.0 * step)
            .filter(|p| p.distance(&end) < remaining && !visited.contains(p))
            .collect();

        let Some(&next) = candidates.choose(rng) else {
            tracing::trace!(?current, ?end, "Walk reached a dead end");
            break;
        };

        visited.insert(next);
        points.push(next);
        current = next;
    }

    points.push(end);
    points
}

/// Connects every ordered hotspot pair inside the distance band.
///
/// Pairs outside `[min_pair_distance, max_pair_distance)` are skipped; this
/// keeps the path count roughly linear in the hotspot count. Each eligible
/// pair gets between `min_variations` and `max_variations` walks.
pub fn generate_paths<R: Rng + ?Sized>(
    hotspots: &[Hotspot],
    viewport: Viewport,
    config: &GridConfig,
    rng: &mut R,
) -> Vec<Path> {
    let lattice = Lattice::new(viewport, config);
    let mut paths = Vec::new();

    for from in hotspots {
        for to in hotspots {
            if from.point() == to.point() {
                continue;
            }
            let distance = from.point().distance(&to.point());
            if distance < config.min_pair_distance || distance >= config.max_pair_distance {
                continue;
            }

            let variations = rng.gen_range(config.min_variations..=config.max_variations);
            for v in 0..variations {
                paths.push(Path {
                    id: format!("{}->{}#{v}", from.id, to.id),
                    from: from.id.clone(),
                    to: to.id.clone(),
                    points: walk(&lattice, from.point(), to.point(), rng),
                });
            }
        }
    }

    tracing::debug!(
        %viewport,
        hotspots = hotspots.len(),
        paths = paths.len(),
        "Generated paths"
    );
    paths
}
