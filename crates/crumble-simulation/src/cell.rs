//! The per-cell value type

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::materials::{FIRE_SPAWN_GREEN, MaterialKind, fire_color};

/// Squared momentum above which a cell is handed to the ballistic stepper
pub const BALLISTIC_THRESHOLD_SQ: f32 = 0.01;

/// Single grid cell
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub material: MaterialKind,
    /// Cached display color, recomputed whenever the material is set
    pub color: [u8; 4],
    /// Remaining ticks for fire, smoke and bomb cells
    pub lifetime: f32,
    /// Cells per tick; nonzero only while thrown
    pub momentum: Vec2,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        material: MaterialKind::Empty,
        color: MaterialKind::Empty.base_color(),
        lifetime: 0.0,
        momentum: Vec2::ZERO,
    };

    /// Fresh cell of `material`.
    ///
    /// `color_roll` and `life_roll` are uniform draws in `[0, 1)` used for fire
    /// color jitter and for picking a lifetime inside the material's range.
    pub fn spawn(material: MaterialKind, color_roll: f32, life_roll: f32) -> Self {
        let color = match material {
            MaterialKind::Fire => {
                let (lo, hi) = FIRE_SPAWN_GREEN;
                fire_color(lo + color_roll * (hi - lo))
            }
            other => other.base_color(),
        };
        let (lo, hi) = material.lifetime_range();
        Self {
            material,
            color,
            lifetime: lo + life_roll * (hi - lo),
            momentum: Vec2::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.material.is_empty()
    }

    /// Whether this cell moves under its own momentum this tick
    pub fn is_ballistic(&self) -> bool {
        self.momentum.length_squared() > BALLISTIC_THRESHOLD_SQ
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}
