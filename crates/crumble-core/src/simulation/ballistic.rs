//! Ballistic cells - debris thrown by explosions until it lands

use glam::IVec2;

use crate::world::{Grid, SimStats};

/// Advances cells that carry momentum
pub struct BallisticStepper;

impl BallisticStepper {
    /// Downward momentum added per tick, in cells per tick
    pub const GRAVITY: f32 = 0.5;
    /// Air drag applied per tick
    pub const DRAG: f32 = 0.98;
    /// Momentum kept when entering a liquid
    pub const LIQUID_DAMPING: f32 = 0.5;
    /// Momentum factor when bouncing off a solid
    pub const RESTITUTION: f32 = -0.5;
    /// Squared speed below which a bounce comes to rest
    pub const REST_SPEED_SQ: f32 = 1.0;

    /// Advance the ballistic cell at (x, y) by one tick
    pub fn step(grid: &mut Grid, x: i32, y: i32, stats: &mut dyn SimStats) {
        let Some(cell) = grid.get(x, y).copied() else {
            return;
        };

        // 1. Gravity and drag
        let mut momentum = cell.momentum;
        momentum.y -= Self::GRAVITY;
        momentum *= Self::DRAG;
        grid.wake_at(x, y);

        // 2. Where the cell wants to be
        let from = IVec2::new(x, y);
        let target = from + momentum.round().as_ivec2();

        let Some(target_material) = grid.material_at(target.x, target.y) else {
            grid.set_momentum(x, y, glam::Vec2::ZERO);
            return;
        };

        if target == from {
            grid.set_momentum(x, y, momentum);
            return;
        }

        // 3. Fly through anything that is not solid, bounce off the rest
        if target_material.is_displaceable() {
            if target_material.is_liquid() {
                momentum *= Self::LIQUID_DAMPING;
            }
            if grid.move_or_swap(from, target) {
                grid.set_momentum(target.x, target.y, momentum);
                stats.record_cell_moved();
            }
        } else {
            momentum *= Self::RESTITUTION;
            if momentum.length_squared() < Self::REST_SPEED_SQ {
                momentum = glam::Vec2::ZERO;
            }
            grid.set_momentum(x, y, momentum);
        }
    }
}
