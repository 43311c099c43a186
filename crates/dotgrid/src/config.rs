use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Read-only tuning shared by the grid, the path generator and the tracker.
///
/// A single value is built at startup and passed down by reference; nothing in
/// this crate keeps a global copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Distance between neighbouring lattice dots, in pixels.
    pub spacing: u32,
    /// A hotspot is placed every `hotspot_stride` lattice cells.
    pub hotspot_stride: u32,
    /// Pairs closer than this are never connected (inclusive bound).
    pub min_pair_distance: f64,
    /// Pairs at or beyond this distance are never connected.
    pub max_pair_distance: f64,
    /// Fewest variations generated per eligible pair.
    pub min_variations: u32,
    /// Most variations generated per eligible pair.
    pub max_variations: u32,
    /// Size of the bundle the tracker displays at once.
    pub max_active_paths: usize,
    /// How far (in lattice steps, per axis) the source marker may move per frame.
    pub max_trail_steps: u32,
    /// Modulus applied to a path's index to derive its stored `variation`.
    pub variation_slots: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing: 30,
            hotspot_stride: 6,
            min_pair_distance: 200.0,
            max_pair_distance: 600.0,
            min_variations: 3,
            max_variations: 5,
            max_active_paths: 2,
            max_trail_steps: 3,
            variation_slots: 5,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("spacing must be greater than zero")]
    ZeroSpacing,
    #[error("hotspot_stride must be greater than zero")]
    ZeroStride,
    #[error("distance band is empty: min {min} >= max {max}")]
    EmptyDistanceBand { min: f64, max: f64 },
    #[error("variation range is inverted: min {min} > max {max}")]
    InvertedVariations { min: u32, max: u32 },
    #[error("max_active_paths must be greater than zero")]
    ZeroActivePaths,
    #[error("variation_slots must be greater than zero")]
    ZeroVariationSlots,
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spacing == 0 {
            return Err(ConfigError::ZeroSpacing);
        }
        if self.hotspot_stride == 0 {
            return Err(ConfigError::ZeroStride);
        }
        if !(self.min_pair_distance < self.max_pair_distance) {
            return Err(ConfigError::EmptyDistanceBand {
                min: self.min_pair_distance,
                max: self.max_pair_distance,
            });
        }
        if self.min_variations > self.max_variations {
            return Err(ConfigError::InvertedVariations {
                min: self.min_variations,
                max: self.max_variations,
            });
        }
        if self.max_active_paths == 0 {
            return Err(ConfigError::ZeroActivePaths);
        }
        if self.variation_slots == 0 {
            return Err(ConfigError::ZeroVariationSlots);
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn spacing_px(&self) -> i32 {
        i32::try_from(self.spacing).unwrap_or(i32::MAX)
    }
}
