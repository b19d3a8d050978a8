//! Simulation configuration
//!
//! `SimConfig` fixes everything that must not change after a world exists:
//! grid dimensions, the chunk partition, the tick cadence, the RNG seed and
//! the world-space scale. It is validated once, when the world is built.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crumble_simulation::DEFAULT_SEED;

/// Rejected configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: usize, height: usize },

    #[error("chunk size must be non-zero")]
    ZeroChunkSize,

    #[error("tick interval must be positive, got {0}")]
    NonPositiveTickInterval(f32),

    #[error("pixels per unit must be positive, got {0}")]
    NonPositivePixelsPerUnit(f32),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Grid and stepping parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Side length of an activity chunk in cells; edge chunks may be partial
    pub chunk_size: usize,
    /// Skip chunks that saw no mutation during the previous tick
    pub use_chunk_optimization: bool,
    /// Also wake the adjacent chunk when a write lands on a chunk border
    pub wake_neighbor_chunks: bool,
    /// Seconds between sweeps when driven through `World::update`
    pub tick_interval: f32,
    /// Seed for the cell RNG (zero falls back to the default seed)
    pub seed: u32,
    /// Cells per world unit
    pub pixels_per_unit: f32,
    /// Rigid body gravity in world units per second squared
    pub gravity: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            chunk_size: 32,
            use_chunk_optimization: true,
            wake_neighbor_chunks: false,
            tick_interval: 0.02,
            seed: DEFAULT_SEED,
            pixels_per_unit: 100.0,
            gravity: -9.81,
        }
    }
}

impl SimConfig {
    /// Default configuration with different grid dimensions
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.tick_interval.is_nan() || self.tick_interval <= 0.0 {
            return Err(ConfigError::NonPositiveTickInterval(self.tick_interval));
        }
        if self.pixels_per_unit.is_nan() || self.pixels_per_unit <= 0.0 {
            return Err(ConfigError::NonPositivePixelsPerUnit(self.pixels_per_unit));
        }
        Ok(())
    }

    /// Parse and validate a RON document; missing fields take their defaults
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of chunks along each axis, counting partial edge chunks
    pub fn chunk_dims(&self) -> (usize, usize) {
        (
            self.width.div_ceil(self.chunk_size),
            self.height.div_ceil(self.chunk_size),
        )
    }
}
