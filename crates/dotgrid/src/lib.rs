//! DOTGRID: the geometry behind the interactive dot-grid backdrop.
//!
//! - A viewport is covered by a uniform lattice of dots (`spacing` px apart).
//! - Every `hotspot_stride` cells a dot is promoted to a hotspot; the right
//!   and bottom edges always get hotspots so the whole viewport is reachable.
//! - Hotspot pairs inside the distance band are connected by several
//!   randomized lattice walks ("variations").
//! - The pointer tracker snaps the pointer to the lattice, trails a source
//!   marker behind it and selects a coherent bundle of paths to display.
//! - `render` turns the current scene into a standalone SVG document.
//!
//! Everything here is synchronous and single-threaded. Randomness is always
//! injected as `&mut impl Rng`, so callers decide between a seeded generator
//! (tests, reproducible runs) and `rand::thread_rng()`.

pub mod config;
pub mod grid;
pub mod path;
pub mod render;
pub mod tracker;

pub use config::{ConfigError, GridConfig};
pub use grid::{compute_hotspots, GridPoint, Hotspot, Lattice, Viewport};
pub use path::{generate_paths, walk, Path};
pub use tracker::{PointerTracker, TrackerState};
