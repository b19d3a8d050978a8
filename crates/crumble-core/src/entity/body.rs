//! Rigid bodies that live alongside the grid

use std::f32::consts::TAU;

use glam::{Mat2, Vec2};
use serde::{Deserialize, Serialize};

/// Collision shape, in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
    /// Collides through a single point at the body origin
    None,
}

/// Upper bound on samples along a circle rim or one box edge
const MAX_EDGE_SAMPLES: usize = 1024;

fn edge_samples(length: f32, min: usize) -> usize {
    let count = length.ceil();
    if count.is_nan() || count <= 0.0 {
        return min;
    }
    (count.min(MAX_EDGE_SAMPLES as f32) as usize).max(min)
}

impl Collider {
    /// Whether the shape has finite, positive dimensions. Degenerate shapes
    /// collide through their origin like `Collider::None`.
    pub fn is_valid(&self) -> bool {
        match *self {
            Collider::Circle { radius } => radius.is_finite() && radius > 0.0,
            Collider::Box { half_extents } => half_extents.is_finite() && half_extents.min_element() > 0.0,
            Collider::None => true,
        }
    }

    /// Radius used to turn surface speed into spin, zero for point bodies
    pub fn rolling_radius(&self) -> f32 {
        if !self.is_valid() {
            return 0.0;
        }
        match *self {
            Collider::Circle { radius } => radius,
            Collider::Box { half_extents } => half_extents.min_element(),
            Collider::None => 0.0,
        }
    }

    /// Local-space boundary samples plus the center
    ///
    /// Circles get `max(12, ceil(2πr · density))` evenly spaced rim points.
    /// Boxes get `max(3, ceil(size · density))` intervals along each edge.
    /// Counts are capped at `MAX_EDGE_SAMPLES`.
    pub fn sample_points(&self, points_per_unit: f32) -> Vec<Vec2> {
        if !self.is_valid() {
            return vec![Vec2::ZERO];
        }
        match *self {
            Collider::Circle { radius } => {
                let count = edge_samples(TAU * radius * points_per_unit, 12);
                let mut points: Vec<Vec2> = (0..count)
                    .map(|i| Vec2::from_angle(i as f32 * TAU / count as f32) * radius)
                    .collect();
                points.push(Vec2::ZERO);
                points
            }
            Collider::Box { half_extents } => {
                let size = half_extents * 2.0;
                let count_x = edge_samples(size.x * points_per_unit, 3);
                let count_y = edge_samples(size.y * points_per_unit, 3);
                let mut points = Vec::with_capacity(2 * (count_x + count_y) + 1);
                for i in 0..=count_x {
                    let x = -half_extents.x + size.x * i as f32 / count_x as f32;
                    points.push(Vec2::new(x, half_extents.y));
                    points.push(Vec2::new(x, -half_extents.y));
                }
                for i in 1..count_y {
                    let y = -half_extents.y + size.y * i as f32 / count_y as f32;
                    points.push(Vec2::new(-half_extents.x, y));
                    points.push(Vec2::new(half_extents.x, y));
                }
                points.push(Vec2::ZERO);
                points
            }
            Collider::None => vec![Vec2::ZERO],
        }
    }
}

/// Per-body collision response parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyParams {
    /// Boundary sample density, in points per world unit of perimeter
    pub points_per_unit: f32,
    /// Restitution for impacts faster than `BOUNCE_MIN_SPEED`
    pub bounce: f32,
    /// Coulomb friction coefficient
    pub friction: f32,
    /// Velocity kept per step while any sample is in liquid
    pub water_drag: f32,
    pub sub_steps: u32,
    /// Speed below which a touching body is damped toward rest
    pub sleep_threshold: f32,
    /// Depenetration distance scale, in world units
    pub skin_width: f32,
    /// Neighborhood radius in cells scanned for contact normals
    pub normal_sample_radius: i32,
    pub depenetration_iterations: u32,
    /// Factor applied to velocity each sub-step while resting
    pub rest_damping: f32,
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            points_per_unit: 10.0,
            bounce: 0.5,
            friction: 0.5,
            water_drag: 0.9,
            sub_steps: 8,
            sleep_threshold: 0.05,
            skin_width: 0.01,
            normal_sample_radius: 5,
            depenetration_iterations: 8,
            rest_damping: 0.8,
        }
    }
}

/// Digging behavior for bodies that carve the terrain they hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Destructive {
    /// Radius in cells of the disc cleared at each contact
    pub radius: i32,
    /// Scale of the random kick along the contact normal, world units/s
    pub kick: f32,
}

impl Default for Destructive {
    fn default() -> Self {
        Self { radius: 5, kick: 0.5 }
    }
}

/// A rigid body colliding against the grid
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians, counter-clockwise
    pub angle: f32,
    /// Radians per second
    pub angular_velocity: f32,
    pub mass: f32,
    pub collider: Collider,
    pub params: BodyParams,
    pub destructive: Option<Destructive>,
    /// Whether any sample touched solid terrain during the last step
    pub grounded: bool,
    /// Whether any sample was in liquid during the last step
    pub in_liquid: bool,
    samples: Vec<Vec2>,
}

impl RigidBody {
    pub fn new(position: Vec2, collider: Collider, params: BodyParams) -> Self {
        let samples = collider.sample_points(params.points_per_unit);
        Self {
            position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            mass: 1.0,
            collider,
            params,
            destructive: None,
            grounded: false,
            in_liquid: false,
            samples,
        }
    }

    pub fn circle(position: Vec2, radius: f32) -> Self {
        Self::new(position, Collider::Circle { radius }, BodyParams::default())
    }

    pub fn rectangle(position: Vec2, half_extents: Vec2) -> Self {
        Self::new(position, Collider::Box { half_extents }, BodyParams::default())
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Non-positive masses are clamped to a small positive value
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass.max(f32::EPSILON);
        self
    }

    pub fn with_destructive(mut self, destructive: Destructive) -> Self {
        self.destructive = Some(destructive);
        self
    }

    /// Local-space sample points
    pub fn samples(&self) -> &[Vec2] {
        &self.samples
    }

    /// Sample points in world space at the body's position plus `offset`
    pub fn world_samples(&self, offset: Vec2) -> impl Iterator<Item = Vec2> + '_ {
        let rotation = Mat2::from_angle(self.angle);
        let origin = self.position + offset;
        self.samples.iter().map(move |p| origin + rotation * *p)
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Shift the body without touching its velocity
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
