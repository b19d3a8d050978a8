//! Endless digging - scroll the grid up under a falling body
//!
//! The grid never moves in world space. When the tracked body sinks into the
//! bottom buffer, every cell is shifted up, fresh terrain is generated in the
//! vacated rows and every body is lifted by the same distance, so contacts
//! stay where they were.

use crumble_simulation::{FastRng, MaterialKind};

use super::grid::Grid;
use super::world::{BodyId, World};
use crate::world::WorldRng;

/// Source of terrain for rows that scroll into view
pub trait RowFiller {
    /// Fill grid row `y`; `depth` is the row's absolute depth below the start
    fn fill_row(&mut self, grid: &mut Grid, y: i32, depth: u64, rng: &mut FastRng);
}

/// Every row is the same material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidFill(pub MaterialKind);

impl RowFiller for SolidFill {
    fn fill_row(&mut self, grid: &mut Grid, y: i32, _depth: u64, rng: &mut FastRng) {
        grid.fill_rect(0, y, grid.width() as i32, 1, self.0, rng);
    }
}

/// Stone with scattered mineral veins and buried bombs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OreFill {
    pub mineral_chance: f32,
    pub bomb_chance: f32,
}

impl Default for OreFill {
    fn default() -> Self {
        Self {
            mineral_chance: 0.03,
            bomb_chance: 0.005,
        }
    }
}

impl RowFiller for OreFill {
    fn fill_row(&mut self, grid: &mut Grid, y: i32, _depth: u64, rng: &mut FastRng) {
        for x in 0..grid.width() as i32 {
            let roll = rng.gen_f32();
            let material = if roll < self.mineral_chance {
                MaterialKind::Mineral
            } else if roll < self.mineral_chance + self.bomb_chance {
                MaterialKind::Bomb
            } else {
                MaterialKind::Stone
            };
            grid.set(x, y, material, rng);
        }
    }
}

/// Keeps one body above the bottom buffer of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct InfiniteScroller {
    pub tracked: BodyId,
    /// Fraction of the grid height kept below the tracked body
    pub buffer_fraction: f32,
    /// Rows scrolled so far
    pub depth: u64,
}

impl InfiniteScroller {
    pub fn new(tracked: BodyId) -> Self {
        Self {
            tracked,
            buffer_fraction: 0.4,
            depth: 0,
        }
    }

    /// Clear the grid and fill the bottom `fraction` of it
    pub fn prepare(&mut self, world: &mut World, filler: &mut dyn RowFiller, fraction: f32) {
        world.clear();
        let rows = (world.height() as f32 * fraction.clamp(0.0, 1.0)).floor() as usize;
        world.refill_rows(rows, self.depth, filler);
    }

    /// Scroll if the tracked body is inside the buffer. Returns rows scrolled.
    pub fn update(&mut self, world: &mut World, filler: &mut dyn RowFiller) -> usize {
        let Some(body) = world.body(self.tracked) else {
            return 0;
        };
        let cell = world.world_to_grid(body.position);
        let safe = (world.height() as f32 * self.buffer_fraction) as i32;
        if cell.y >= safe {
            return 0;
        }

        let rows = (safe - cell.y) as usize;
        world.scroll_up(rows);
        world.refill_rows(rows, self.depth, filler);
        let lift = world.mapping().cells_to_world(rows as f32);
        world.shift_bodies(glam::Vec2::new(0.0, lift));
        self.depth += rows as u64;

        log::info!("Scrolled {rows} rows, depth now {}", self.depth);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::body::RigidBody;
    use glam::{IVec2, Vec2};

    #[test]
    fn test_ore_fill_mix() {
        let mut grid = Grid::new(200, 50, 32);
        let mut rng = FastRng::new(8);
        let mut filler = OreFill::default();
        for y in 0..50 {
            filler.fill_row(&mut grid, y, y as u64, &mut rng);
        }
        let total = 200 * 50;
        let stone = grid.count(MaterialKind::Stone);
        let mineral = grid.count(MaterialKind::Mineral);
        let bomb = grid.count(MaterialKind::Bomb);
        assert_eq!(stone + mineral + bomb, total);
        assert!(stone > total * 9 / 10);
        assert!(mineral > 0);
    }

    #[test]
    fn test_body_above_buffer_does_not_scroll() {
        let mut world = World::new(SimConfig::with_size(100, 100)).unwrap();
        let id = world.add_body(RigidBody::circle(Vec2::new(0.0, 0.2), 0.05));
        let mut scroller = InfiniteScroller::new(id);
        assert_eq!(scroller.update(&mut world, &mut SolidFill(MaterialKind::Stone)), 0);
        assert_eq!(scroller.depth, 0);
    }

    #[test]
    fn test_scroll_lifts_body_and_terrain() {
        let mut world = World::new(SimConfig::with_size(100, 100)).unwrap();
        // Grid row 20 at world y = 0.205 - 0.5
        let id = world.add_body(RigidBody::circle(Vec2::new(0.0, -0.295), 0.05));
        world.set_cell(10, 30, MaterialKind::Mineral);
        let mut scroller = InfiniteScroller::new(id);

        let rows = scroller.update(&mut world, &mut SolidFill(MaterialKind::Stone));

        assert_eq!(rows, 20);
        assert_eq!(scroller.depth, 20);
        assert_eq!(world.material_at(10, 50), Some(MaterialKind::Mineral));
        assert_eq!(world.grid().count(MaterialKind::Stone), 20 * 100);
        let cell = world.world_to_grid(world.body(id).unwrap().position);
        assert_eq!(cell, IVec2::new(50, 40));
    }

    #[test]
    fn test_prepare_fills_bottom() {
        let mut world = World::new(SimConfig::with_size(40, 40)).unwrap();
        world.set_cell(5, 35, MaterialKind::Sand);
        let id = world.add_body(RigidBody::circle(Vec2::new(0.0, 0.15), 0.05));
        let mut scroller = InfiniteScroller::new(id);
        scroller.prepare(&mut world, &mut SolidFill(MaterialKind::Stone), 0.6);
        assert_eq!(world.grid().count(MaterialKind::Stone), 24 * 40);
        assert_eq!(world.grid().count(MaterialKind::Sand), 0);
    }
}
