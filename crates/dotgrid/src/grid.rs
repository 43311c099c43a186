//! Lattice and hotspot construction for a viewport.

use crate::config::GridConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::iter;

/// A dot on the lattice, in integer pixels from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &GridPoint) -> f64 {
        self.distance_to(other.x as f64, other.y as f64)
    }

    /// Euclidean distance to a raw (sub-pixel) position.
    #[inline]
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = self.x as f64 - x;
        let dy = self.y as f64 - y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Visible area in pixels. Doubles as the key under which path sets are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width and height in signed pixel space, saturating at `i32::MAX`.
    #[inline]
    pub fn extent(&self) -> (i32, i32) {
        (
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An addressable lattice node that can serve as a path endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hotspot {
    pub id: String,
    pub x: i32,
    pub y: i32,
}

impl Hotspot {
    #[inline]
    pub fn point(&self) -> GridPoint {
        GridPoint::new(self.x, self.y)
    }
}

/// The full set of dots covering a viewport.
///
/// Dots sit at `(col * spacing, row * spacing)` for `col` in `0..=cols` and
/// `row` in `0..=rows`. Nothing is materialized; queries are answered from the
/// dimensions alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lattice {
    spacing: i32,
    cols: i32,
    rows: i32,
}

impl Lattice {
    pub fn new(viewport: Viewport, config: &GridConfig) -> Self {
        let spacing = config.spacing_px().max(1);
        let (w, h) = viewport.extent();
        Self { spacing, cols: w / spacing, rows: h / spacing }
    }

    #[inline]
    pub fn spacing(&self) -> i32 {
        self.spacing
    }

    #[inline]
    pub fn cols(&self) -> i32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn len(&self) -> usize {
        (self.cols as usize + 1).saturating_mul(self.rows as usize + 1)
    }

    /// Always false: the origin dot exists even for a zero-sized viewport.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, p: GridPoint) -> bool {
        p.x >= 0
            && p.y >= 0
            && p.x % self.spacing == 0
            && p.y % self.spacing == 0
            && p.x / self.spacing <= self.cols
            && p.y / self.spacing <= self.rows
    }

    /// Every dot, row-major.
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (0..=self.rows).flat_map(move |row| {
            (0..=self.cols).map(move |col| GridPoint::new(col * self.spacing, row * self.spacing))
        })
    }

    /// Dots strictly closer than `radius` to `p`, excluding `p` itself.
    ///
    /// `p` does not have to be on the lattice (edge hotspots usually are not).
    pub fn near(&self, p: GridPoint, radius: f64) -> impl Iterator<Item = GridPoint> + '_ {
        let reach = radius.ceil() as i32;
        let s = self.spacing;
        let col_lo = (p.x - reach).div_euclid(s).max(0);
        let col_hi = (p.x + reach + s - 1).div_euclid(s).min(self.cols);
        let row_lo = (p.y - reach).div_euclid(s).max(0);
        let row_hi = (p.y + reach + s - 1).div_euclid(s).min(self.rows);

        (row_lo..=row_hi)
            .flat_map(move |row| (col_lo..=col_hi).map(move |col| GridPoint::new(col * s, row * s)))
            .filter(move |q| *q != p && q.distance(&p) < radius)
    }

    /// Rounds a raw pointer position to the nearest dot, clamped to the lattice.
    pub fn snap(&self, x: f64, y: f64) -> GridPoint {
        let s = self.spacing as f64;
        let col = ((x / s).round() as i32).clamp(0, self.cols);
        let row = ((y / s).round() as i32).clamp(0, self.rows);
        GridPoint::new(col * self.spacing, row * self.spacing)
    }
}

/// Picks the hotspot subset of the lattice for `viewport`.
///
/// Hotspots sit every `hotspot_stride` cells, pulled in so that none lies
/// closer than one spacing to the right or bottom border. An extra column and
/// row of hotspots is laid along the right and bottom edges so those borders
/// are covered even when the cell counts are not multiples of the stride.
/// Identical inputs always give the identical, duplicate-free list.
pub fn compute_hotspots(viewport: Viewport, config: &GridConfig) -> Vec<Hotspot> {
    let lattice = Lattice::new(viewport, config);
    let s = lattice.spacing();
    let stride = config.hotspot_stride.max(1) as usize;
    let (cols, rows) = (lattice.cols(), lattice.rows());
    let (w, h) = viewport.extent();
    let (max_x, max_y) = (w - s, h - s);

    let place = |col: i32, row: i32| {
        GridPoint::new((col * s).min(max_x).max(0), (row * s).min(max_y).max(0))
    };
    let strided = |n: i32| (0..=n).step_by(stride);

    let mut seen = HashSet::new();
    let mut hotspots = Vec::new();
    let mut push = |id: String, p: GridPoint| {
        if seen.insert(p) {
            hotspots.push(Hotspot { id, x: p.x, y: p.y });
        }
    };

    for row in strided(rows) {
        for col in strided(cols) {
            push(format!("h-{col}-{row}"), place(col, row));
        }
    }
    for row in strided(rows).chain(iter::once(rows)) {
        push(format!("h-r-{row}"), place(cols, row));
    }
    for col in strided(cols).chain(iter::once(cols)) {
        push(format!("h-b-{col}"), place(col, rows));
    }

    tracing::debug!(%viewport, count = hotspots.len(), "Computed hotspots");
    hotspots
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cfg() -> GridConfig {
        GridConfig::default()
    }

    #[test]
    fn example_viewport_has_origin_and_right_edge() {
        let hotspots = compute_hotspots(Viewport::new(1200, 800), &cfg());
        assert!(hotspots.iter().any(|h| h.x == 0 && h.y == 0));
        assert!(hotspots.iter().any(|h| h.x == 1170));
        assert!(hotspots.iter().any(|h| h.y == 770));
        assert!(hotspots.iter().all(|h| h.x <= 1170 && h.y <= 770));
    }

    #[test]
    fn stride_places_interior_hotspots() {
        let hotspots = compute_hotspots(Viewport::new(1200, 800), &cfg());
        let pts: HashSet<_> = hotspots.iter().map(Hotspot::point).collect();
        assert!(pts.contains(&GridPoint::new(180, 180)));
        assert!(pts.contains(&GridPoint::new(1080, 720)));
        assert!(!pts.contains(&GridPoint::new(30, 0)));
    }

    #[test]
    fn zero_viewport_degenerates_quietly() {
        let hotspots = compute_hotspots(Viewport::new(0, 0), &cfg());
        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0].point(), GridPoint::new(0, 0));
    }

    #[test]
    fn lattice_neighbours_are_the_eight_surrounding_dots() {
        let lattice = Lattice::new(Viewport::new(300, 300), &cfg());
        let mut near: Vec<_> = lattice.near(GridPoint::new(60, 60), 60.0).collect();
        near.sort();
        assert_eq!(near.len(), 8);
        assert!(near.iter().all(|p| (p.x - 60).abs() <= 30 && (p.y - 60).abs() <= 30));

        let corner: Vec<_> = lattice.near(GridPoint::new(0, 0), 60.0).collect();
        assert_eq!(corner.len(), 3);
    }

    #[test]
    fn lattice_neighbours_of_off_lattice_point() {
        let lattice = Lattice::new(Viewport::new(1210, 300), &cfg());
        let near: Vec<_> = lattice.near(GridPoint::new(1180, 0), 60.0).collect();
        assert!(near.contains(&GridPoint::new(1170, 0)));
        assert!(near.contains(&GridPoint::new(1200, 30)));
        assert!(near.iter().all(|p| lattice.contains(*p)));
    }

    #[test]
    fn huge_viewport_saturates_instead_of_wrapping() {
        let lattice = Lattice::new(Viewport::new(u32::MAX, u32::MAX), &cfg());
        let side = i32::MAX / 30;
        assert_eq!((lattice.cols(), lattice.rows()), (side, side));
        let per_axis = side as usize + 1;
        assert_eq!(lattice.len(), per_axis.saturating_mul(per_axis));
        assert!(lattice.contains(GridPoint::new(side * 30, side * 30)));
    }

    #[test]
    fn snap_rounds_and_clamps() {
        let lattice = Lattice::new(Viewport::new(300, 300), &cfg());
        assert_eq!(lattice.snap(44.0, 46.0), GridPoint::new(30, 60));
        assert_eq!(lattice.snap(-20.0, 1000.0), GridPoint::new(0, 300));
    }

    proptest! {
        #[test]
        fn prop_hotspots_are_deterministic(w in 0u32..2600, h in 0u32..1600) {
            let a = compute_hotspots(Viewport::new(w, h), &cfg());
            let b = compute_hotspots(Viewport::new(w, h), &cfg());
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_edges_are_covered(w in 0u32..2600, h in 0u32..1600) {
            let hotspots = compute_hotspots(Viewport::new(w, h), &cfg());
            let right = w as i32 - 30;
            let bottom = h as i32 - 30;
            prop_assert!(hotspots.iter().any(|p| p.x >= right));
            prop_assert!(hotspots.iter().any(|p| p.y >= bottom));
        }

        #[test]
        fn prop_hotspot_positions_are_unique(w in 0u32..2600, h in 0u32..1600) {
            let hotspots = compute_hotspots(Viewport::new(w, h), &cfg());
            let unique: HashSet<_> = hotspots.iter().map(Hotspot::point).collect();
            prop_assert_eq!(unique.len(), hotspots.len());
        }
    }
}
