//! Grid store - the cell array, processed stamps and bounds-checked access
//!
//! Coordinates are cell indices with (0, 0) at the bottom-left and +y up.
//! Every accessor takes signed coordinates so neighbor offsets can be applied
//! without casts; anything outside `[0, width) x [0, height)` reads as `None`
//! and writes as a no-op.

use glam::{IVec2, Vec2};
use thiserror::Error;

use crumble_simulation::{Cell, MaterialKind};

use super::chunk_manager::ChunkManager;
use crate::world::WorldRng;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfRange { x: i32, y: i32 },
}

/// Owns every cell plus the activity partition that tracks writes to them
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    /// A cell was processed this tick when its stamp equals `current_stamp`
    stamps: Vec<u32>,
    current_stamp: u32,
    chunks: ChunkManager,
}

impl Grid {
    pub fn new(width: usize, height: usize, chunk_size: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; width * height],
            stamps: vec![0; width * height],
            current_stamp: 1,
            chunks: ChunkManager::new(width, height, chunk_size),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn chunks(&self) -> &ChunkManager {
        &self.chunks
    }

    pub fn chunks_mut(&mut self) -> &mut ChunkManager {
        &mut self.chunks
    }

    /// Row-major cell slice, row 0 first
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn try_get(&self, x: i32, y: i32) -> Result<&Cell, GridError> {
        self.get(x, y).ok_or(GridError::OutOfRange { x, y })
    }

    /// Material at (x, y), `None` outside the grid
    #[inline]
    pub fn material_at(&self, x: i32, y: i32) -> Option<MaterialKind> {
        self.get(x, y).map(|c| c.material)
    }

    /// In-place access without waking anything; callers that change the
    /// material go through `set` or `write` instead
    pub fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    #[inline]
    fn wake(&mut self, x: i32, y: i32) {
        self.chunks.wake_at(x as usize, y as usize);
    }

    /// Wake the chunk owning (x, y)
    pub fn wake_at(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            self.wake(x, y);
        }
    }

    /// Place a fresh cell of `material`, drawing fire color and lifetime from
    /// `rng`. Wakes the owning chunk; does not mark the cell processed.
    pub fn set<R: WorldRng + ?Sized>(&mut self, x: i32, y: i32, material: MaterialKind, rng: &mut R) {
        let Some(i) = self.index(x, y) else {
            log::trace!("Dropped write of {material} outside grid at ({x}, {y})");
            return;
        };
        let color_roll = if material == MaterialKind::Fire { rng.gen_f32() } else { 0.0 };
        let (lo, hi) = material.lifetime_range();
        let life_roll = if hi > lo { rng.gen_f32() } else { 0.0 };
        self.cells[i] = Cell::spawn(material, color_roll, life_roll);
        self.wake(x, y);
    }

    pub fn set_lifetime(&mut self, x: i32, y: i32, lifetime: f32) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.lifetime = lifetime;
        }
    }

    pub fn set_momentum(&mut self, x: i32, y: i32, momentum: Vec2) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.momentum = momentum;
        }
    }

    pub fn add_momentum(&mut self, x: i32, y: i32, delta: Vec2) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.momentum += delta;
        }
    }

    /// Start a new tick: processed stamps reset and untouched chunks sleep
    pub fn begin_tick(&mut self) {
        self.current_stamp = self.current_stamp.wrapping_add(1);
        if self.current_stamp == 0 {
            self.stamps.fill(0);
            self.current_stamp = 1;
        }
        self.chunks.begin_tick();
    }

    pub fn mark_updated(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.stamps[i] = self.current_stamp;
        }
    }

    pub fn is_updated(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .is_some_and(|i| self.stamps[i] == self.current_stamp)
    }

    /// Move a cell to `to`, leaving Empty behind. The destination is marked
    /// processed and both chunks are woken. Returns false if either end is
    /// outside the grid.
    pub fn move_cell(&mut self, from: IVec2, to: IVec2) -> bool {
        let (Some(src), Some(dst)) = (self.index(from.x, from.y), self.index(to.x, to.y)) else {
            return false;
        };
        self.cells[dst] = self.cells[src];
        self.cells[src] = Cell::EMPTY;
        self.stamps[dst] = self.current_stamp;
        self.wake(from.x, from.y);
        self.wake(to.x, to.y);
        true
    }

    /// Exchange two cells; both positions are marked processed
    pub fn swap_cells(&mut self, a: IVec2, b: IVec2) -> bool {
        let (Some(ia), Some(ib)) = (self.index(a.x, a.y), self.index(b.x, b.y)) else {
            return false;
        };
        self.cells.swap(ia, ib);
        self.stamps[ia] = self.current_stamp;
        self.stamps[ib] = self.current_stamp;
        self.wake(a.x, a.y);
        self.wake(b.x, b.y);
        true
    }

    /// Move into an empty destination, swap with anything else
    pub fn move_or_swap(&mut self, from: IVec2, to: IVec2) -> bool {
        match self.material_at(to.x, to.y) {
            Some(MaterialKind::Empty) => self.move_cell(from, to),
            Some(_) => self.swap_cells(from, to),
            None => false,
        }
    }

    /// Reset every cell to Empty and wake the whole grid
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
        self.chunks.wake_all();
    }

    /// Set every in-range cell of the rectangle with its bottom-left at (x, y)
    pub fn fill_rect<R: WorldRng + ?Sized>(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        material: MaterialKind,
        rng: &mut R,
    ) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i32);
        let y1 = y.saturating_add(h).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.set(px, py, material, rng);
            }
        }
    }

    /// Shift the whole grid up by `rows`. Row `y` receives row `y - rows`
    /// with its full state; the bottom `rows` rows become Empty and the top
    /// `rows` rows are discarded.
    pub fn scroll_up(&mut self, rows: usize) {
        if rows == 0 {
            return;
        }
        if rows >= self.height {
            self.clear();
            return;
        }
        let shift = rows * self.width;
        let kept = (self.height - rows) * self.width;
        self.cells.copy_within(0..kept, shift);
        self.stamps.copy_within(0..kept, shift);
        self.cells[..shift].fill(Cell::EMPTY);
        self.stamps[..shift].fill(0);
        self.chunks.wake_all();
    }

    /// Number of cells holding `material`
    pub fn count(&self, material: MaterialKind) -> usize {
        self.cells.iter().filter(|c| c.material == material).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crumble_simulation::FastRng;

    fn grid() -> Grid {
        Grid::new(16, 12, 8)
    }

    #[test]
    fn test_out_of_range_reads() {
        let grid = grid();
        assert!(grid.get(-1, 0).is_none());
        assert!(grid.get(16, 0).is_none());
        assert!(grid.get(0, 12).is_none());
        assert_eq!(grid.try_get(3, 99), Err(GridError::OutOfRange { x: 3, y: 99 }));
        assert_eq!(grid.material_at(0, 0), Some(MaterialKind::Empty));
    }

    #[test]
    fn test_out_of_range_writes_are_noops() {
        let mut grid = grid();
        let mut rng = FastRng::default();
        grid.set(-5, 3, MaterialKind::Sand, &mut rng);
        grid.set(3, 40, MaterialKind::Sand, &mut rng);
        grid.set_lifetime(100, 100, 5.0);
        assert_eq!(grid.count(MaterialKind::Sand), 0);
    }

    #[test]
    fn test_set_assigns_lifetime_and_color() {
        let mut grid = grid();
        let mut rng = FastRng::default();
        grid.set(1, 1, MaterialKind::Smoke, &mut rng);
        let cell = grid.get(1, 1).unwrap();
        assert!(cell.lifetime >= 100.0 && cell.lifetime < 200.0);
        assert_eq!(cell.color, MaterialKind::Smoke.base_color());
        assert!(!grid.is_updated(1, 1));
    }

    #[test]
    fn test_set_wakes_sleeping_chunk() {
        let mut grid = grid();
        let mut rng = FastRng::default();
        grid.begin_tick();
        assert!(grid.chunks().is_sleeping(1, 1));
        grid.set(10, 10, MaterialKind::Water, &mut rng);
        assert!(!grid.chunks().is_sleeping(1, 1));
    }

    #[test]
    fn test_move_marks_destination() {
        let mut grid = grid();
        let mut rng = FastRng::default();
        grid.set(2, 5, MaterialKind::Sand, &mut rng);
        assert!(grid.move_cell(IVec2::new(2, 5), IVec2::new(2, 4)));
        assert_eq!(grid.material_at(2, 5), Some(MaterialKind::Empty));
        assert_eq!(grid.material_at(2, 4), Some(MaterialKind::Sand));
        assert!(grid.is_updated(2, 4));
        assert!(!grid.is_updated(2, 5));
    }

    #[test]
    fn test_swap_marks_both() {
        let mut grid = grid();
        let mut rng = FastRng::default();
        grid.set(2, 5, MaterialKind::Sand, &mut rng);
        grid.set(2, 4, MaterialKind::Water, &mut rng);
        assert!(grid.swap_cells(IVec2::new(2, 5), IVec2::new(2, 4)));
        assert_eq!(grid.material_at(2, 5), Some(MaterialKind::Water));
        assert_eq!(grid.material_at(2, 4), Some(MaterialKind::Sand));
        assert!(grid.is_updated(2, 5));
        assert!(grid.is_updated(2, 4));
    }

    #[test]
    fn test_begin_tick_clears_processed() {
        let mut grid = grid();
        grid.mark_updated(4, 4);
        assert!(grid.is_updated(4, 4));
        grid.begin_tick();
        assert!(!grid.is_updated(4, 4));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut grid = grid();
        let mut rng = FastRng::default();
        grid.fill_rect(-2, -2, 5, 5, MaterialKind::Stone, &mut rng);
        assert_eq!(grid.count(MaterialKind::Stone), 9);
        grid.fill_rect(14, 10, 10, 10, MaterialKind::Sand, &mut rng);
        assert_eq!(grid.count(MaterialKind::Sand), 4);
    }

    #[test]
    fn test_scroll_up_moves_rows() {
        let mut grid = grid();
        let mut rng = FastRng::default();
        grid.set(3, 0, MaterialKind::Bomb, &mut rng);
        grid.set_lifetime(3, 0, 42.0);
        grid.set(0, 11, MaterialKind::Stone, &mut rng);

        grid.scroll_up(2);

        let moved = grid.get(3, 2).unwrap();
        assert_eq!(moved.material, MaterialKind::Bomb);
        assert_eq!(moved.lifetime, 42.0);
        assert_eq!(grid.material_at(3, 0), Some(MaterialKind::Empty));
        assert_eq!(grid.material_at(3, 1), Some(MaterialKind::Empty));
        // Top row discarded
        assert_eq!(grid.count(MaterialKind::Stone), 0);
    }

    #[test]
    fn test_scroll_up_edges() {
        let mut grid = grid();
        let mut rng = FastRng::default();
        grid.fill_rect(0, 0, 16, 12, MaterialKind::Sand, &mut rng);
        grid.scroll_up(0);
        assert_eq!(grid.count(MaterialKind::Sand), 16 * 12);
        grid.scroll_up(12);
        assert_eq!(grid.count(MaterialKind::Empty), 16 * 12);
    }

    #[test]
    fn test_clear_wakes_everything() {
        let mut grid = grid();
        let mut rng = FastRng::default();
        grid.fill_rect(0, 0, 16, 12, MaterialKind::Water, &mut rng);
        grid.begin_tick();
        grid.begin_tick();
        grid.clear();
        assert_eq!(grid.count(MaterialKind::Empty), 16 * 12);
        assert_eq!(grid.chunks().active_count(), grid.chunks().total());
    }
}
