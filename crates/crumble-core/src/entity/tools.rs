//! Brush tools for painting and erasing cells

use glam::IVec2;

use crumble_simulation::MaterialKind;

use crate::world::{Grid, WorldRng};

/// Cells of the disc of `radius` around `center`, clipped to the grid
fn disc(grid: &Grid, center: IVec2, radius: i32) -> impl Iterator<Item = IVec2> + '_ {
    let radius = radius.max(0);
    let r_sq = radius * radius;
    (-radius..=radius)
        .flat_map(move |dy| (-radius..=radius).map(move |dx| IVec2::new(dx, dy)))
        .filter(move |d| d.length_squared() <= r_sq)
        .map(move |d| center + d)
        .filter(|p| grid.in_bounds(p.x, p.y))
}

/// Paint every cell within `radius` of `center` with `material`.
/// Returns the number of cells written.
pub fn draw_circle<R: WorldRng + ?Sized>(
    grid: &mut Grid,
    center: IVec2,
    radius: i32,
    material: MaterialKind,
    rng: &mut R,
) -> usize {
    let cells: Vec<IVec2> = disc(grid, center, radius).collect();
    for p in &cells {
        grid.set(p.x, p.y, material, rng);
    }
    cells.len()
}

/// Clear sand, stone and mineral within `radius` of `center`; everything
/// else is left alone. Returns the number of cells cleared.
pub fn erase_solids<R: WorldRng + ?Sized>(
    grid: &mut Grid,
    center: IVec2,
    radius: i32,
    rng: &mut R,
) -> usize {
    let cells: Vec<IVec2> = disc(grid, center, radius)
        .filter(|p| {
            matches!(
                grid.material_at(p.x, p.y),
                Some(MaterialKind::Sand | MaterialKind::Stone | MaterialKind::Mineral)
            )
        })
        .collect();
    for p in &cells {
        grid.set(p.x, p.y, MaterialKind::Empty, rng);
    }
    cells.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crumble_simulation::FastRng;

    #[test]
    fn test_draw_circle_fills_disc() {
        let mut grid = Grid::new(32, 32, 16);
        let mut rng = FastRng::default();
        // r = 1 is a plus sign
        assert_eq!(draw_circle(&mut grid, IVec2::new(10, 10), 1, MaterialKind::Sand, &mut rng), 5);
        assert_eq!(grid.material_at(11, 10), Some(MaterialKind::Sand));
        assert_eq!(grid.material_at(11, 11), Some(MaterialKind::Empty));
    }

    #[test]
    fn test_draw_circle_clips_to_grid() {
        let mut grid = Grid::new(32, 32, 16);
        let mut rng = FastRng::default();
        let written = draw_circle(&mut grid, IVec2::new(0, 0), 3, MaterialKind::Stone, &mut rng);
        // Quarter disc of radius 3 including the axes
        assert_eq!(written, 11);
        assert_eq!(grid.count(MaterialKind::Stone), 11);
    }

    #[test]
    fn test_erase_keeps_liquids() {
        let mut grid = Grid::new(32, 32, 16);
        let mut rng = FastRng::default();
        grid.fill_rect(0, 0, 32, 16, MaterialKind::Stone, &mut rng);
        grid.fill_rect(0, 16, 32, 16, MaterialKind::Water, &mut rng);
        let cleared = erase_solids(&mut grid, IVec2::new(16, 16), 4, &mut rng);
        assert!(cleared > 0);
        assert_eq!(grid.count(MaterialKind::Water), 32 * 16);
        assert_eq!(grid.material_at(16, 15), Some(MaterialKind::Empty));
    }
}
