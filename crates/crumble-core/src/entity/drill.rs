//! Drill unit - a steerable digger that grinds through terrain
//!
//! The drill is not a rigid body: it moves kinematically, refuses to enter
//! any disc containing terrain and grinds that terrain down instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::simulation::DrillBit;
use crate::world::World;

/// Movement and grinding parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillParams {
    /// World units per second
    pub max_speed: f32,
    pub acceleration: f32,
    /// Speed lost per second without input
    pub deceleration: f32,
    /// Collision radius in world units
    pub unit_radius: f32,
    /// Highest hardness the drill can break
    pub power: u8,
    /// Grinding radius in cells, a little wider than the collision disc
    pub size: i32,
    /// Grind attempts per blocked update
    pub attempts: u32,
}

impl Default for DrillParams {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            acceleration: 10.0,
            deceleration: 5.0,
            unit_radius: 0.16,
            power: 3,
            size: 18,
            attempts: 100,
        }
    }
}

/// What happened during one drill update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrillOutcome {
    pub moved: bool,
    /// Blocked by terrain and ground at it instead of moving
    pub drilling: bool,
    pub cells_broken: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillUnit {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading in radians, follows the velocity while moving
    pub angle: f32,
    pub params: DrillParams,
}

impl DrillUnit {
    pub fn new(position: Vec2) -> Self {
        Self::with_params(position, DrillParams::default())
    }

    pub fn with_params(position: Vec2, params: DrillParams) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            params,
        }
    }

    pub fn bit(&self) -> DrillBit {
        DrillBit {
            power: self.params.power,
            size: self.params.size,
            attempts: self.params.attempts,
        }
    }

    /// Apply steering input (any length, normalized here) for `dt` seconds
    pub fn steer(&mut self, input: Vec2, dt: f32) {
        let direction = input.normalize_or_zero();
        if direction != Vec2::ZERO {
            self.velocity += direction * self.params.acceleration * dt;
            self.velocity = self.velocity.clamp_length_max(self.params.max_speed);
        } else {
            let drop = self.params.deceleration * dt;
            if self.velocity.length() <= drop {
                self.velocity = Vec2::ZERO;
            } else {
                self.velocity -= self.velocity.normalize() * drop;
            }
        }
    }

    /// Steer, then either move or grind at the blocked destination
    pub fn update(&mut self, input: Vec2, dt: f32, world: &mut World) -> DrillOutcome {
        self.steer(input, dt);
        if self.velocity == Vec2::ZERO {
            return DrillOutcome::default();
        }

        let next = self.position + self.velocity * dt;
        let center = world.world_to_grid(next);
        let radius = world.mapping().world_to_cells(self.params.unit_radius).ceil() as i32;

        let outcome = if world.area_blocked(center, radius) {
            self.velocity = Vec2::ZERO;
            let cells_broken = world.grind(center, &self.bit());
            DrillOutcome {
                moved: false,
                drilling: true,
                cells_broken,
            }
        } else {
            self.position = next;
            DrillOutcome {
                moved: true,
                ..DrillOutcome::default()
            }
        };

        if self.velocity.length_squared() > 0.1 {
            self.angle = self.velocity.y.atan2(self.velocity.x);
        }
        outcome
    }
}
