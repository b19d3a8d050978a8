//! Dynamite - a body with a fuse

use serde::{Deserialize, Serialize};

/// Fuse state attached to a body through `World::add_dynamite`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dynamite {
    /// Seconds left before detonation
    pub fuse: f32,
    /// Blast radius in cells
    pub radius: i32,
    exploded: bool,
}

impl Default for Dynamite {
    fn default() -> Self {
        Self::new(3.0, 10)
    }
}

impl Dynamite {
    pub const FAST_BLINK_BELOW: f32 = 1.0;

    pub fn new(fuse: f32, radius: i32) -> Self {
        Self {
            fuse,
            radius,
            exploded: false,
        }
    }

    /// Burn the fuse. Returns true exactly once, on the call that empties it.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.exploded {
            return false;
        }
        self.fuse -= dt;
        if self.fuse <= 0.0 {
            self.exploded = true;
            return true;
        }
        false
    }

    pub fn has_exploded(&self) -> bool {
        self.exploded
    }

    /// Warning blink: slow half-second pulses, then fast once under a second
    pub fn is_flashing(&self, time: f32) -> bool {
        if self.fuse < Self::FAST_BLINK_BELOW {
            (time * 10.0).rem_euclid(1.0) < 0.5
        } else {
            self.fuse.rem_euclid(0.5) < 0.25
        }
    }
}
