//! Hardness-based grinding of terrain

use glam::{IVec2, Vec2};

use crumble_simulation::MaterialKind;

use crate::world::{Grid, SimStats, WorldRng};

/// Drill head parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrillBit {
    /// Highest hardness this bit can break
    pub power: u8,
    /// Grinding disc radius in cells
    pub size: i32,
    /// Random cells attempted per grind
    pub attempts: u32,
}

impl Default for DrillBit {
    fn default() -> Self {
        Self {
            power: 3,
            size: 18,
            attempts: 100,
        }
    }
}

/// Chance that a single grind attempt breaks a cell of `material`
///
/// Empty and water are never ground. Anything harder than `power` resists.
/// Otherwise the chance is `1 / hardness`; materials without hardness (gas,
/// fire, smoke, bombs) always break.
pub fn break_chance(material: MaterialKind, power: u8) -> f32 {
    if matches!(material, MaterialKind::Empty | MaterialKind::Water) {
        return 0.0;
    }
    match material.hardness() {
        0 => 1.0,
        h if h > power => 0.0,
        h => 1.0 / h as f32,
    }
}

/// Uniform point in the unit disc
fn random_in_unit_disc<R: WorldRng + ?Sized>(rng: &mut R) -> Vec2 {
    loop {
        let p = Vec2::new(rng.gen_range_f32(-1.0, 1.0), rng.gen_range_f32(-1.0, 1.0));
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Try `bit.attempts` random cells inside the bit's disc around `center`,
/// clearing those that fail their hardness roll. Returns how many broke.
pub fn grind<R: WorldRng + ?Sized>(
    grid: &mut Grid,
    center: IVec2,
    bit: &DrillBit,
    stats: &mut dyn SimStats,
    rng: &mut R,
) -> usize {
    let mut broken = 0;
    for _ in 0..bit.attempts {
        let offset = (random_in_unit_disc(rng) * bit.size as f32).round().as_ivec2();
        let target = center + offset;
        let Some(material) = grid.material_at(target.x, target.y) else {
            continue;
        };
        let chance = break_chance(material, bit.power);
        if chance > 0.0 && rng.gen_f32() <= chance {
            grid.set(target.x, target.y, MaterialKind::Empty, rng);
            stats.record_state_change();
            broken += 1;
        }
    }
    broken
}

/// Whether any cell within `radius` of `center` blocks a digger
///
/// Only terrain counts: sand, stone and mineral. Bombs and liquids do not
/// stop a drill.
pub fn area_blocked(grid: &Grid, center: IVec2, radius: i32) -> bool {
    let r_sq = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > r_sq {
                continue;
            }
            if matches!(
                grid.material_at(center.x + dx, center.y + dy),
                Some(MaterialKind::Sand | MaterialKind::Stone | MaterialKind::Mineral)
            ) {
                return true;
            }
        }
    }
    false
}
