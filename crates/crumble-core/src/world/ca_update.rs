//! Cellular automata update logic - one rule per material per tick

use glam::IVec2;

use crumble_simulation::{FIRE_FLICKER_GREEN, MaterialKind, bomb_color, fire_color};

use super::grid::Grid;
use crate::simulation::{BallisticStepper, ExplosionSystem};
use crate::world::{SimStats, WorldRng};

/// Cellular automata updater - applies each material's rule to a cell
pub struct CellularAutomataUpdater;

impl CellularAutomataUpdater {
    /// Chance that a gas cell touching fire detonates instead of igniting
    pub const GAS_EXPLOSION_CHANCE: f32 = 0.1;
    pub const GAS_EXPLOSION_RADIUS: i32 = 5;
    pub const BOMB_EXPLOSION_RADIUS: i32 = 10;
    /// Fire needs more than this much lifetime left to spread upward
    pub const FIRE_SPREAD_MIN_LIFETIME: f32 = 10.0;
    pub const FIRE_SPREAD_CHANCE: f32 = 0.1;
    pub const FIRE_SPREAD_LIFETIME: (f32, f32) = (40.0, 80.0);
    pub const SMOKE_DRIFT_CHANCE: f32 = 0.5;

    /// Run the rule for the cell at (x, y), if it has not been processed
    /// yet this tick. Cells carrying momentum are handed to the ballistic
    /// stepper instead of their material rule.
    pub fn update_cell<R: WorldRng + ?Sized>(
        grid: &mut Grid,
        x: i32,
        y: i32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        let Some(cell) = grid.get(x, y).copied() else {
            return;
        };
        if cell.is_empty() || grid.is_updated(x, y) {
            return;
        }
        if cell.is_ballistic() {
            BallisticStepper::step(grid, x, y, stats);
            return;
        }

        match cell.material {
            MaterialKind::Sand => Self::update_sand(grid, x, y, stats),
            MaterialKind::Water => Self::update_water(grid, x, y, stats, rng),
            MaterialKind::Gas => Self::update_gas(grid, x, y, stats, rng),
            MaterialKind::Fire => Self::update_fire(grid, x, y, stats, rng),
            MaterialKind::Smoke => Self::update_smoke(grid, x, y, stats, rng),
            MaterialKind::Bomb => Self::update_bomb(grid, x, y, stats, rng),
            MaterialKind::Stone | MaterialKind::Mineral | MaterialKind::Empty => {}
        }
    }

    /// Sand falls, then slides down-left, then down-right
    pub fn update_sand(grid: &mut Grid, x: i32, y: i32, stats: &mut dyn SimStats) {
        let from = IVec2::new(x, y);
        for dx in [0, -1, 1] {
            if Self::try_move(grid, from, IVec2::new(x + dx, y - 1), MaterialKind::is_displaceable, stats) {
                return;
            }
        }
    }

    /// Water falls through empty space and gas, otherwise spreads sideways
    pub fn update_water<R: WorldRng + ?Sized>(
        grid: &mut Grid,
        x: i32,
        y: i32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        let from = IVec2::new(x, y);
        let open = |m: MaterialKind| m.is_empty() || m.is_gas();

        // Try to move down
        if Self::try_move(grid, from, IVec2::new(x, y - 1), open, stats) {
            return;
        }

        // Random side first, then the other
        let dir = rng.gen_direction();
        if Self::try_move(grid, from, IVec2::new(x + dir, y), open, stats) {
            return;
        }
        Self::try_move(grid, from, IVec2::new(x - dir, y), open, stats);
    }

    /// Gas rises through empty space and liquid. Touching fire it either
    /// ignites or, rarely, detonates.
    pub fn update_gas<R: WorldRng + ?Sized>(
        grid: &mut Grid,
        x: i32,
        y: i32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        if Self::has_neighbor(grid, x, y, MaterialKind::Fire) {
            if rng.check_probability(Self::GAS_EXPLOSION_CHANCE) {
                ExplosionSystem::explode(grid, x, y, Self::GAS_EXPLOSION_RADIUS, stats, rng);
            } else {
                Self::convert(grid, x, y, MaterialKind::Fire, stats, rng);
            }
            return;
        }

        let from = IVec2::new(x, y);
        let rises_into = |m: MaterialKind| m.is_empty() || m.is_liquid();
        if Self::try_move(grid, from, IVec2::new(x, y + 1), rises_into, stats) {
            return;
        }

        let dir = rng.gen_direction();
        if Self::try_move(grid, from, IVec2::new(x + dir, y), MaterialKind::is_empty, stats) {
            return;
        }
        Self::try_move(grid, from, IVec2::new(x - dir, y), MaterialKind::is_empty, stats);
    }

    /// Fire burns down its lifetime, flickers, ignites gas and climbs
    pub fn update_fire<R: WorldRng + ?Sized>(
        grid: &mut Grid,
        x: i32,
        y: i32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        grid.wake_at(x, y);
        let Some(lifetime) = Self::tick_lifetime(grid, x, y) else {
            return;
        };

        if lifetime <= 0.0 {
            let ash = if rng.gen_f32() > 0.5 {
                MaterialKind::Smoke
            } else {
                MaterialKind::Empty
            };
            Self::convert(grid, x, y, ash, stats, rng);
            return;
        }

        let (lo, hi) = FIRE_FLICKER_GREEN;
        let green = rng.gen_range_f32(lo, hi);
        if let Some(cell) = grid.cell_mut(x, y) {
            cell.color = fire_color(green);
        }

        // Ignite touching gas
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx != 0 || dy != 0) && grid.material_at(x + dx, y + dy) == Some(MaterialKind::Gas) {
                    Self::convert(grid, x + dx, y + dy, MaterialKind::Fire, stats, rng);
                }
            }
        }

        // Climb into empty space above
        if lifetime > Self::FIRE_SPREAD_MIN_LIFETIME
            && grid.material_at(x, y + 1) == Some(MaterialKind::Empty)
            && rng.check_probability(Self::FIRE_SPREAD_CHANCE)
        {
            Self::convert(grid, x, y + 1, MaterialKind::Fire, stats, rng);
            let (lo, hi) = Self::FIRE_SPREAD_LIFETIME;
            grid.set_lifetime(x, y + 1, rng.gen_range_f32(lo, hi));
        }
    }

    /// Smoke fades, rises, and drifts sideways when blocked
    pub fn update_smoke<R: WorldRng + ?Sized>(
        grid: &mut Grid,
        x: i32,
        y: i32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        grid.wake_at(x, y);
        let Some(lifetime) = Self::tick_lifetime(grid, x, y) else {
            return;
        };

        if lifetime <= 0.0 {
            Self::convert(grid, x, y, MaterialKind::Empty, stats, rng);
            return;
        }

        let from = IVec2::new(x, y);
        if Self::try_move(grid, from, IVec2::new(x, y + 1), MaterialKind::is_empty, stats) {
            return;
        }
        if rng.check_probability(Self::SMOKE_DRIFT_CHANCE) {
            let dir = rng.gen_direction();
            Self::try_move(grid, from, IVec2::new(x + dir, y), MaterialKind::is_empty, stats);
        }
    }

    /// Bombs blink while their fuse burns and fall straight down. They go
    /// off when the fuse runs out or fire touches them.
    pub fn update_bomb<R: WorldRng + ?Sized>(
        grid: &mut Grid,
        x: i32,
        y: i32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        grid.wake_at(x, y);
        let Some(fuse) = Self::tick_lifetime(grid, x, y) else {
            return;
        };
        if let Some(cell) = grid.cell_mut(x, y) {
            cell.color = bomb_color(fuse);
        }

        if fuse <= 0.0 || Self::has_neighbor(grid, x, y, MaterialKind::Fire) {
            ExplosionSystem::explode(grid, x, y, Self::BOMB_EXPLOSION_RADIUS, stats, rng);
            return;
        }

        Self::try_move(
            grid,
            IVec2::new(x, y),
            IVec2::new(x, y - 1),
            MaterialKind::is_displaceable,
            stats,
        );
    }

    /// Move (or swap) into `to` when its material passes `accepts`
    fn try_move(
        grid: &mut Grid,
        from: IVec2,
        to: IVec2,
        accepts: impl Fn(MaterialKind) -> bool,
        stats: &mut dyn SimStats,
    ) -> bool {
        match grid.material_at(to.x, to.y) {
            Some(target) if accepts(target) => {
                let moved = grid.move_or_swap(from, to);
                if moved {
                    stats.record_cell_moved();
                }
                moved
            }
            _ => false,
        }
    }

    /// Replace a cell in place and mark it processed for this tick
    fn convert<R: WorldRng + ?Sized>(
        grid: &mut Grid,
        x: i32,
        y: i32,
        material: MaterialKind,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        grid.set(x, y, material, rng);
        grid.mark_updated(x, y);
        stats.record_state_change();
    }

    /// Decrement a cell's lifetime by one tick and return what is left
    fn tick_lifetime(grid: &mut Grid, x: i32, y: i32) -> Option<f32> {
        let cell = grid.cell_mut(x, y)?;
        cell.lifetime -= 1.0;
        Some(cell.lifetime)
    }

    /// Whether any of the 8 surrounding cells holds `material`
    pub fn has_neighbor(grid: &Grid, x: i32, y: i32, material: MaterialKind) -> bool {
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx != 0 || dy != 0) && grid.material_at(x + dx, y + dy) == Some(material) {
                    return true;
                }
            }
        }
        false
    }
}
