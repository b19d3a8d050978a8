//! Material simulation data for Crumble
//!
//! This crate provides the foundational data types for the falling-sand grid:
//! - Material tags and their property tables (MaterialKind, MaterialType)
//! - The cell value type (Cell)
//! - The xorshift32 generator driving per-cell randomness (FastRng)

mod cell;
mod materials;
mod rng;

pub use cell::{BALLISTIC_THRESHOLD_SQ, Cell};
pub use materials::{
    BOMB_FUSE, BOMB_WARNING_COLOR, FIRE_FLICKER_GREEN, FIRE_LIFETIME, FIRE_SPAWN_GREEN,
    MaterialKind, MaterialType, SMOKE_LIFETIME, UnknownMaterial, bomb_color, fire_color,
};
pub use rng::{DEFAULT_SEED, FastRng};
