//! Rigid body vs grid collision - impulses, friction, rolling and digging
//!
//! Bodies never see the grid as geometry. Each sub-step they test their
//! sample ring one sub-step ahead, and every sample that lands in a solid
//! cell becomes a contact. A contact normal is recovered from the voxel
//! staircase by looking at where the open cells around the contact are.

use glam::{IVec2, Vec2};

use crumble_simulation::MaterialKind;

use super::coords::GridMapping;
use super::grid::Grid;
use crate::entity::body::RigidBody;
use crate::world::{SimStats, WorldRng};

/// Per-step summary, mostly for tests and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactReport {
    /// Sub-steps in which at least one sample touched solid terrain
    pub contact_steps: u32,
    /// Cells cleared by destructive bodies
    pub carved: usize,
    pub in_liquid: bool,
}

/// Rigid body vs grid collision solver
pub struct GridCollisionSolver;

impl GridCollisionSolver {
    /// Impacts slower than this do not bounce
    pub const BOUNCE_MIN_SPEED: f32 = 1.0;
    /// Smoothing factor when steering spin toward the rolling speed
    pub const ROLL_SMOOTHING: f32 = 0.2;
    pub const MIN_NORMAL_RADIUS: i32 = 4;
    pub const MAX_NORMAL_RADIUS: i32 = 9;

    /// Advance one body by `dt` seconds in `params.sub_steps` sub-steps
    #[allow(clippy::too_many_arguments)]
    pub fn step<R: WorldRng + ?Sized>(
        body: &mut RigidBody,
        grid: &mut Grid,
        mapping: &GridMapping,
        gravity: f32,
        dt: f32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) -> ContactReport {
        let sub_steps = body.params.sub_steps.max(1);
        let dt_sub = dt / sub_steps as f32;
        let mut report = ContactReport::default();
        let mut contacts: Vec<IVec2> = Vec::with_capacity(body.samples().len());

        for _ in 0..sub_steps {
            // 1. Gravity
            body.velocity.y += gravity * dt_sub;

            // 2. Probe the sample ring where it will be after this sub-step
            contacts.clear();
            let mut in_liquid = false;
            for point in body.world_samples(body.velocity * dt_sub) {
                let cell = mapping.world_to_grid(point);
                match grid.material_at(cell.x, cell.y) {
                    Some(m) if m.is_solid() => contacts.push(cell),
                    Some(m) if m.is_liquid() => in_liquid = true,
                    _ => {}
                }
            }

            if !contacts.is_empty() {
                report.contact_steps += 1;
                let radius = body
                    .params
                    .normal_sample_radius
                    .clamp(Self::MIN_NORMAL_RADIUS, Self::MAX_NORMAL_RADIUS);
                let sum: Vec2 = contacts
                    .iter()
                    .map(|c| Self::contact_normal(grid, *c, radius))
                    .sum();
                let normal = Self::average_normal(sum, contacts.len());

                // 3. Impulse and friction
                Self::resolve_impulse(body, normal);

                // 4. Push out of anything we already sank into
                Self::depenetrate(body, grid, mapping, normal);

                // 5. Spin toward rolling without slipping
                Self::roll(body, normal);

                // 6. Settle slow bodies
                if body.speed() < body.params.sleep_threshold {
                    body.velocity *= body.params.rest_damping;
                    body.angular_velocity *= body.params.rest_damping;
                }
            }

            // 7. Liquid drag
            if in_liquid {
                body.velocity *= 1.0 - (1.0 - body.params.water_drag) / sub_steps as f32;
                report.in_liquid = true;
            }

            // 8. Dig
            if !contacts.is_empty()
                && let Some(destructive) = body.destructive
            {
                for cell in &contacts {
                    report.carved += Self::carve(grid, *cell, destructive.radius, stats, rng);
                }
                let normal = Self::average_normal(
                    contacts
                        .iter()
                        .map(|c| Self::contact_normal(grid, *c, Self::MIN_NORMAL_RADIUS))
                        .sum(),
                    contacts.len(),
                );
                let tangent = Vec2::new(normal.y, -normal.x);
                body.velocity += normal * rng.gen_range_f32(0.2, 0.6) * destructive.kick
                    + tangent * rng.gen_range_f32(-0.5, 0.5) * destructive.kick;
            }

            // 9. Side walls
            Self::apply_world_bounds(body, mapping);

            // 10. Integrate
            body.position += body.velocity * dt_sub;
            body.angle += body.angular_velocity * dt_sub;
        }

        body.grounded = report.contact_steps > 0;
        body.in_liquid = report.in_liquid;
        report
    }

    /// Direction from the solid at `cell` toward open space
    ///
    /// Every open cell within `radius` pulls the normal toward itself with
    /// weight `1 / distance`. Cells outside the grid are ignored.
    pub fn contact_normal(grid: &Grid, cell: IVec2, radius: i32) -> Vec2 {
        let mut normal = Vec2::ZERO;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(material) = grid.material_at(cell.x + dx, cell.y + dy) else {
                    continue;
                };
                if !material.is_solid() {
                    let offset = Vec2::new(dx as f32, dy as f32);
                    normal += offset / offset.length_squared();
                }
            }
        }
        normal.normalize_or_zero()
    }

    fn average_normal(sum: Vec2, count: usize) -> Vec2 {
        let normal = (sum / count.max(1) as f32).normalize_or_zero();
        if normal == Vec2::ZERO { Vec2::Y } else { normal }
    }

    /// Single-contact impulse against infinitely heavy terrain plus
    /// Coulomb friction
    fn resolve_impulse(body: &mut RigidBody, normal: Vec2) {
        let velocity = body.velocity;
        let along_normal = velocity.dot(normal);
        if along_normal >= 0.0 {
            return;
        }

        let restitution = if velocity.length() < Self::BOUNCE_MIN_SPEED {
            0.0
        } else {
            body.params.bounce
        };
        let inv_mass = 1.0 / body.mass;
        let j = -(1.0 + restitution) * along_normal / inv_mass;
        body.velocity += normal * j * inv_mass;

        let tangent = velocity - normal * along_normal;
        if tangent.length_squared() > 1e-4 {
            let tangent = tangent.normalize();
            let max_friction = j * body.params.friction;
            let jt = (-velocity.dot(tangent) / inv_mass).clamp(-max_friction, max_friction);
            body.velocity += tangent * jt * inv_mass;
        }
    }

    /// Whether any sample at the current position sits in a solid cell
    pub fn overlaps_solid(body: &RigidBody, grid: &Grid, mapping: &GridMapping) -> bool {
        body.world_samples(Vec2::ZERO).any(|p| {
            let cell = mapping.world_to_grid(p);
            grid.material_at(cell.x, cell.y).is_some_and(MaterialKind::is_solid)
        })
    }

    fn depenetrate(body: &mut RigidBody, grid: &Grid, mapping: &GridMapping, normal: Vec2) {
        let nudge = body.params.skin_width * 0.25;
        for _ in 0..body.params.depenetration_iterations {
            if !Self::overlaps_solid(body, grid, mapping) {
                break;
            }
            body.position += normal * nudge;
        }
    }

    fn roll(body: &mut RigidBody, normal: Vec2) {
        let radius = body.collider.rolling_radius();
        if radius <= f32::EPSILON {
            return;
        }
        let surface_tangent = Vec2::new(normal.y, -normal.x);
        let target = -body.velocity.dot(surface_tangent) / radius;
        body.angular_velocity += (target - body.angular_velocity) * Self::ROLL_SMOOTHING;
    }

    /// Clear non-empty cells in a disc; returns how many changed
    fn carve<R: WorldRng + ?Sized>(
        grid: &mut Grid,
        center: IVec2,
        radius: i32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) -> usize {
        let mut carved = 0;
        let r_sq = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > r_sq {
                    continue;
                }
                let (x, y) = (center.x + dx, center.y + dy);
                if matches!(grid.material_at(x, y), Some(m) if !m.is_empty()) {
                    grid.set(x, y, MaterialKind::Empty, rng);
                    stats.record_state_change();
                    carved += 1;
                }
            }
        }
        carved
    }

    /// Reflect off the left and right edges of the grid
    fn apply_world_bounds(body: &mut RigidBody, mapping: &GridMapping) {
        let extent = match body.collider {
            crate::entity::body::Collider::Circle { radius } => radius,
            crate::entity::body::Collider::Box { half_extents } => half_extents.length(),
            crate::entity::body::Collider::None => 0.0,
        };
        let (left, right) = mapping.horizontal_bounds();
        if body.position.x - extent < left && body.velocity.x < 0.0 {
            body.position.x = left + extent;
            body.velocity.x = -body.velocity.x * body.params.bounce;
        } else if body.position.x + extent > right && body.velocity.x > 0.0 {
            body.position.x = right - extent;
            body.velocity.x = -body.velocity.x * body.params.bounce;
        }
    }
}
