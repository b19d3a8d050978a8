//! Material tags and their static property tables

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every material a cell can hold
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum MaterialKind {
    #[default]
    Empty = 0,
    Stone = 1,
    Sand = 2,
    Water = 3,
    Mineral = 4,
    Gas = 5,
    Fire = 6,
    Smoke = 7,
    Bomb = 8,
}

/// How a material behaves physically
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialType {
    /// Blocks movement and collides with bodies (stone, sand, mineral, bomb)
    Solid,
    /// Flows sideways, drags bodies (water)
    Liquid,
    /// Rises and disperses (gas, smoke, fire)
    Gas,
}

/// Lifetime ranges handed to freshly placed cells, in ticks
pub const FIRE_LIFETIME: (f32, f32) = (50.0, 100.0);
pub const SMOKE_LIFETIME: (f32, f32) = (100.0, 200.0);
pub const BOMB_FUSE: f32 = 150.0;

/// Fire green-channel jitter on creation, as a fraction of 255
pub const FIRE_SPAWN_GREEN: (f32, f32) = (0.2, 0.6);
/// Fire green-channel flicker while burning
pub const FIRE_FLICKER_GREEN: (f32, f32) = (0.1, 0.7);

/// Color shown by a bomb during the "on" half of its blink cycle
pub const BOMB_WARNING_COLOR: [u8; 4] = [255, 0, 0, 255];

impl MaterialKind {
    pub const ALL: [MaterialKind; 9] = [
        MaterialKind::Empty,
        MaterialKind::Stone,
        MaterialKind::Sand,
        MaterialKind::Water,
        MaterialKind::Mineral,
        MaterialKind::Gas,
        MaterialKind::Fire,
        MaterialKind::Smoke,
        MaterialKind::Bomb,
    ];

    /// Physical class, `None` for empty space
    pub const fn material_type(self) -> Option<MaterialType> {
        match self {
            MaterialKind::Empty => None,
            MaterialKind::Sand | MaterialKind::Stone | MaterialKind::Mineral | MaterialKind::Bomb => {
                Some(MaterialType::Solid)
            }
            MaterialKind::Water => Some(MaterialType::Liquid),
            MaterialKind::Gas | MaterialKind::Smoke | MaterialKind::Fire => Some(MaterialType::Gas),
        }
    }

    pub const fn is_solid(self) -> bool {
        matches!(self.material_type(), Some(MaterialType::Solid))
    }

    pub const fn is_liquid(self) -> bool {
        matches!(self.material_type(), Some(MaterialType::Liquid))
    }

    /// Fire counts as a gas for displacement purposes
    pub const fn is_gas(self) -> bool {
        matches!(self.material_type(), Some(MaterialType::Gas))
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, MaterialKind::Empty)
    }

    /// Whether falling or thrown cells may enter a cell holding this material
    pub const fn is_displaceable(self) -> bool {
        !self.is_solid()
    }

    /// Resistance to drilling. Zero means the material cannot be drilled.
    pub const fn hardness(self) -> u8 {
        match self {
            MaterialKind::Sand => 1,
            MaterialKind::Stone => 5,
            MaterialKind::Mineral => 10,
            _ => 0,
        }
    }

    /// Lifetime range for a freshly placed cell, `(0, 0)` for timeless materials
    pub const fn lifetime_range(self) -> (f32, f32) {
        match self {
            MaterialKind::Fire => FIRE_LIFETIME,
            MaterialKind::Smoke => SMOKE_LIFETIME,
            MaterialKind::Bomb => (BOMB_FUSE, BOMB_FUSE),
            _ => (0.0, 0.0),
        }
    }

    /// Base RGBA color. Fire returns its mid-flicker color.
    pub const fn base_color(self) -> [u8; 4] {
        match self {
            MaterialKind::Empty => [0, 0, 0, 255],
            MaterialKind::Stone => [128, 128, 128, 255],
            MaterialKind::Sand => [255, 204, 51, 255],
            MaterialKind::Water => [51, 102, 255, 255],
            MaterialKind::Mineral => [204, 51, 204, 255],
            MaterialKind::Gas => [153, 255, 153, 128],
            MaterialKind::Fire => [255, 102, 0, 255],
            MaterialKind::Smoke => [128, 128, 128, 204],
            MaterialKind::Bomb => [51, 51, 51, 255],
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            MaterialKind::Empty => "empty",
            MaterialKind::Stone => "stone",
            MaterialKind::Sand => "sand",
            MaterialKind::Water => "water",
            MaterialKind::Mineral => "mineral",
            MaterialKind::Gas => "gas",
            MaterialKind::Fire => "fire",
            MaterialKind::Smoke => "smoke",
            MaterialKind::Bomb => "bomb",
        }
    }
}

/// Fire color for a green fraction in `[0, 1]`
pub fn fire_color(green: f32) -> [u8; 4] {
    [255, (green.clamp(0.0, 1.0) * 255.0) as u8, 0, 255]
}

/// Bomb color for the given remaining fuse
pub fn bomb_color(fuse: f32) -> [u8; 4] {
    if (fuse as i32).rem_euclid(20) < 10 {
        BOMB_WARNING_COLOR
    } else {
        MaterialKind::Bomb.base_color()
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown material: {0}")]
pub struct UnknownMaterial(pub String);

impl FromStr for MaterialKind {
    type Err = UnknownMaterial;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        MaterialKind::ALL
            .into_iter()
            .find(|m| m.name() == lower)
            .ok_or_else(|| UnknownMaterial(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_tables_are_disjoint() {
        for m in MaterialKind::ALL {
            let flags = [m.is_solid(), m.is_liquid(), m.is_gas()];
            let set = flags.iter().filter(|f| **f).count();
            if m == MaterialKind::Empty {
                assert_eq!(set, 0);
            } else {
                assert_eq!(set, 1, "{m} must belong to exactly one class");
            }
        }
    }

    #[test]
    fn test_solid_set() {
        assert!(MaterialKind::Sand.is_solid());
        assert!(MaterialKind::Stone.is_solid());
        assert!(MaterialKind::Mineral.is_solid());
        assert!(MaterialKind::Bomb.is_solid());
        assert!(!MaterialKind::Water.is_solid());
        assert!(MaterialKind::Fire.is_gas());
    }

    #[test]
    fn test_hardness() {
        assert_eq!(MaterialKind::Sand.hardness(), 1);
        assert_eq!(MaterialKind::Stone.hardness(), 5);
        assert_eq!(MaterialKind::Mineral.hardness(), 10);
        assert_eq!(MaterialKind::Water.hardness(), 0);
    }

    #[test]
    fn test_parse_names() {
        for m in MaterialKind::ALL {
            assert_eq!(m.name().parse::<MaterialKind>(), Ok(m));
        }
        assert_eq!("  SAND ".parse::<MaterialKind>(), Ok(MaterialKind::Sand));
        assert!("lava".parse::<MaterialKind>().is_err());
    }

    #[test]
    fn test_bomb_blink() {
        assert_eq!(bomb_color(145.0), BOMB_WARNING_COLOR);
        assert_eq!(bomb_color(150.0), MaterialKind::Bomb.base_color());
        assert_eq!(bomb_color(9.0), BOMB_WARNING_COLOR);
        assert_eq!(bomb_color(15.0), MaterialKind::Bomb.base_color());
    }

    #[test]
    fn test_fire_color_clamps() {
        assert_eq!(fire_color(2.0), [255, 255, 0, 255]);
        assert_eq!(fire_color(0.0), [255, 0, 0, 255]);
    }
}
