//! Explosions - a point event that burns a disc and throws the ring around it

use glam::Vec2;

use crumble_simulation::MaterialKind;

use crate::world::{Grid, SimStats, WorldRng};

/// What an explosion did, for logging and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplosionReport {
    /// Cells turned into fire inside the blast disc
    pub ignited: usize,
    /// Cells given momentum by the shockwave
    pub pushed: usize,
}

/// Explosion propagation
pub struct ExplosionSystem;

impl ExplosionSystem {
    /// How far past the blast radius the shockwave reaches, in cells
    pub const SHOCK_MARGIN: i32 = 8;
    /// Shockwave momentum per cell of distance inside the shock ring
    pub const SHOCK_FORCE: f32 = 1.5;
    /// Chance a stone cell inside the disc survives
    pub const STONE_SURVIVAL: f32 = 0.5;
    /// Chance a mineral cell inside the disc survives
    pub const MINERAL_SURVIVAL: f32 = 0.8;
    /// Lifetime range of blast fire, in ticks
    pub const BLAST_FIRE_LIFETIME: (f32, f32) = (3.0, 6.0);
    /// Outward speed range of blast fire, in cells per tick
    pub const BLAST_FIRE_SPEED: (f32, f32) = (5.0, 10.0);

    /// Detonate at (cx, cy).
    ///
    /// Inside `radius` every cell becomes short-lived fire thrown outward,
    /// except stone and mineral that survive their roll. Between `radius` and
    /// `radius + SHOCK_MARGIN`, sand, water, stone and bombs are pushed away
    /// from the center and marked processed for the current tick.
    pub fn explode<R: WorldRng + ?Sized>(
        grid: &mut Grid,
        cx: i32,
        cy: i32,
        radius: i32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) -> ExplosionReport {
        let radius = radius.max(0);
        let shock = radius.saturating_add(Self::SHOCK_MARGIN);
        let mut report = ExplosionReport::default();

        stats.record_explosion();

        // Clip the blast square to the grid; far-away centers touch nothing
        let reach = shock as i64;
        let x0 = (cx as i64 - reach).max(0);
        let x1 = (cx as i64 + reach).min(grid.width() as i64 - 1);
        let y0 = (cy as i64 - reach).max(0);
        let y1 = (cy as i64 + reach).min(grid.height() as i64 - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let (x, y) = (x as i32, y as i32);
                let Some(material) = grid.material_at(x, y) else {
                    continue;
                };
                let offset = Vec2::new((x as i64 - cx as i64) as f32, (y as i64 - cy as i64) as f32);
                let dist = offset.length();

                if dist <= radius as f32 {
                    let spared = match material {
                        MaterialKind::Stone => rng.gen_f32() > 1.0 - Self::STONE_SURVIVAL,
                        MaterialKind::Mineral => rng.gen_f32() > 1.0 - Self::MINERAL_SURVIVAL,
                        _ => false,
                    };
                    if spared {
                        continue;
                    }
                    grid.set(x, y, MaterialKind::Fire, rng);
                    let (lo, hi) = Self::BLAST_FIRE_LIFETIME;
                    grid.set_lifetime(x, y, rng.gen_range_f32(lo, hi));
                    let (lo, hi) = Self::BLAST_FIRE_SPEED;
                    grid.set_momentum(x, y, offset.normalize_or_zero() * rng.gen_range_f32(lo, hi));
                    stats.record_state_change();
                    report.ignited += 1;
                } else if dist <= shock as f32 && Self::is_throwable(material) {
                    grid.add_momentum(x, y, Self::shock_impulse(offset, radius));
                    grid.mark_updated(x, y);
                    grid.wake_at(x, y);
                    report.pushed += 1;
                }
            }
        }

        if radius >= 10 {
            log::debug!(
                "Explosion at ({cx}, {cy}) r={radius}: {} ignited, {} pushed",
                report.ignited,
                report.pushed
            );
        }

        report
    }

    /// Materials the shockwave can throw
    pub fn is_throwable(material: MaterialKind) -> bool {
        matches!(
            material,
            MaterialKind::Sand | MaterialKind::Water | MaterialKind::Stone | MaterialKind::Bomb
        )
    }

    /// Momentum the shockwave would give a throwable cell at `offset` from
    /// the center, or zero outside the ring
    pub fn shock_impulse(offset: Vec2, radius: i32) -> Vec2 {
        let shock = radius.saturating_add(Self::SHOCK_MARGIN) as f32;
        let dist = offset.length();
        if dist <= radius as f32 || dist > shock {
            return Vec2::ZERO;
        }
        offset.normalize_or_zero() * (shock - dist) * Self::SHOCK_FORCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::NoopStats;
    use crumble_simulation::FastRng;

    #[test]
    fn test_disc_becomes_fire() {
        let mut grid = Grid::new(64, 64, 16);
        let mut rng = FastRng::new(1);
        grid.fill_rect(0, 0, 64, 64, MaterialKind::Sand, &mut rng);

        let report = ExplosionSystem::explode(&mut grid, 32, 32, 5, &mut NoopStats, &mut rng);

        for y in 27..=37 {
            for x in 27..=37 {
                let d = (((x - 32) * (x - 32) + (y - 32) * (y - 32)) as f32).sqrt();
                if d <= 5.0 {
                    let cell = grid.get(x, y).unwrap();
                    assert_eq!(cell.material, MaterialKind::Fire);
                    assert!(cell.lifetime >= 3.0 && cell.lifetime < 6.0);
                }
            }
        }
        assert_eq!(report.ignited, grid.count(MaterialKind::Fire));
        assert!(report.pushed > 0);
    }

    #[test]
    fn test_center_fire_has_no_momentum() {
        let mut grid = Grid::new(32, 32, 16);
        let mut rng = FastRng::new(3);
        ExplosionSystem::explode(&mut grid, 16, 16, 3, &mut NoopStats, &mut rng);
        assert_eq!(grid.get(16, 16).unwrap().momentum, Vec2::ZERO);
        let edge = grid.get(19, 16).unwrap();
        assert!(edge.momentum.x >= 5.0 && edge.momentum.y == 0.0);
    }

    #[test]
    fn test_shock_ring_pushes_outward() {
        let mut grid = Grid::new(64, 64, 16);
        let mut rng = FastRng::new(5);
        grid.set(40, 32, MaterialKind::Water, &mut rng);
        grid.set(24, 32, MaterialKind::Mineral, &mut rng);

        ExplosionSystem::explode(&mut grid, 32, 32, 4, &mut NoopStats, &mut rng);

        let water = grid.get(40, 32).unwrap();
        assert_eq!(water.material, MaterialKind::Water);
        // shock = 12, dist = 8 -> (12 - 8) * 1.5 = 6
        assert!((water.momentum.x - 6.0).abs() < 1e-5);
        assert!(grid.is_updated(40, 32));

        // Mineral is not throwable
        assert_eq!(grid.get(24, 32).unwrap().momentum, Vec2::ZERO);
    }

    #[test]
    fn test_edge_of_grid_is_clipped() {
        let mut grid = Grid::new(16, 16, 8);
        let mut rng = FastRng::new(9);
        let report = ExplosionSystem::explode(&mut grid, 0, 0, 3, &mut NoopStats, &mut rng);
        // Quarter disc of radius 3 around the corner: 11 cells
        assert_eq!(report.ignited, 11);
    }

    #[test]
    fn test_stone_partially_survives() {
        let mut grid = Grid::new(64, 64, 16);
        let mut rng = FastRng::new(11);
        grid.fill_rect(0, 0, 64, 64, MaterialKind::Stone, &mut rng);
        let report = ExplosionSystem::explode(&mut grid, 32, 32, 10, &mut NoopStats, &mut rng);
        let disc_cells = 317;
        assert!(report.ignited > disc_cells / 4);
        assert!(report.ignited < disc_cells * 3 / 4);
    }

    #[test]
    fn test_far_away_center_touches_nothing() {
        let mut grid = Grid::new(32, 32, 16);
        let mut rng = FastRng::new(13);
        grid.fill_rect(0, 0, 32, 32, MaterialKind::Sand, &mut rng);

        for (cx, cy) in [(i32::MAX, i32::MIN), (i32::MIN, i32::MAX), (-1000, 16), (16, 5000)] {
            let report = ExplosionSystem::explode(&mut grid, cx, cy, 5, &mut NoopStats, &mut rng);
            assert_eq!(report, ExplosionReport::default());
        }
        let report = ExplosionSystem::explode(&mut grid, 16, 16, i32::MAX, &mut NoopStats, &mut rng);
        assert_eq!(report.ignited, 32 * 32);
        assert_eq!(grid.count(MaterialKind::Sand), 0);
    }

    #[test]
    fn test_shock_impulse_matches_ring() {
        assert_eq!(ExplosionSystem::shock_impulse(Vec2::new(2.0, 0.0), 5), Vec2::ZERO);
        assert_eq!(ExplosionSystem::shock_impulse(Vec2::new(20.0, 0.0), 5), Vec2::ZERO);
        let v = ExplosionSystem::shock_impulse(Vec2::new(0.0, -9.0), 5);
        assert!((v.y + 6.0).abs() < 1e-5);
    }
}
