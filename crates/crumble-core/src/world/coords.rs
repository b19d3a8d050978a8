//! Mapping between world space and grid cells
//!
//! The grid is centered on the world origin: world (0, 0) lands in the middle
//! cell, and one world unit spans `pixels_per_unit` cells on both axes.

use glam::{IVec2, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapping {
    pub width: usize,
    pub height: usize,
    pub pixels_per_unit: f32,
}

impl GridMapping {
    pub fn new(width: usize, height: usize, pixels_per_unit: f32) -> Self {
        Self {
            width,
            height,
            pixels_per_unit,
        }
    }

    /// Size of the whole grid in world units
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) / self.pixels_per_unit
    }

    /// Cell containing a world position. May be out of range.
    pub fn world_to_grid(&self, pos: Vec2) -> IVec2 {
        let local = pos + self.world_size() * 0.5;
        (local * self.pixels_per_unit).floor().as_ivec2()
    }

    /// World position of a cell's center
    pub fn grid_to_world(&self, cell: IVec2) -> Vec2 {
        (cell.as_vec2() + Vec2::splat(0.5)) / self.pixels_per_unit - self.world_size() * 0.5
    }

    /// Convert a distance in cells to world units
    pub fn cells_to_world(&self, cells: f32) -> f32 {
        cells / self.pixels_per_unit
    }

    /// Convert a distance in world units to cells
    pub fn world_to_cells(&self, distance: f32) -> f32 {
        distance * self.pixels_per_unit
    }

    /// Horizontal world extent `(left, right)`
    pub fn horizontal_bounds(&self) -> (f32, f32) {
        let half = self.world_size().x * 0.5;
        (-half, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_center() {
        let mapping = GridMapping::new(256, 256, 100.0);
        assert_eq!(mapping.world_to_grid(Vec2::ZERO), IVec2::new(128, 128));
    }

    #[test]
    fn test_corners() {
        let mapping = GridMapping::new(256, 128, 100.0);
        assert_eq!(mapping.world_to_grid(Vec2::new(-1.28, -0.64)), IVec2::new(0, 0));
        assert_eq!(mapping.world_to_grid(Vec2::new(-1.3, 0.0)).x, -2);
    }

    #[test]
    fn test_grid_to_world_round_trips_cell() {
        let mapping = GridMapping::new(200, 100, 50.0);
        for cell in [IVec2::new(0, 0), IVec2::new(17, 42), IVec2::new(199, 99)] {
            assert_eq!(mapping.world_to_grid(mapping.grid_to_world(cell)), cell);
        }
    }

    #[test]
    fn test_horizontal_bounds() {
        let mapping = GridMapping::new(256, 256, 100.0);
        let (left, right) = mapping.horizontal_bounds();
        assert!((left + 1.28).abs() < 1e-6);
        assert!((right - 1.28).abs() < 1e-6);
    }
}
