//! World - owns the grid, the bodies and the tick driver

use std::collections::BTreeMap;

use glam::{IVec2, Vec2};

use crumble_simulation::{Cell, FastRng, MaterialKind};

use super::body_physics::GridCollisionSolver;
use super::ca_update::CellularAutomataUpdater;
use super::coords::GridMapping;
use super::grid::Grid;
use super::infinite_scroll::RowFiller;
use super::stats::SimCounters;
use crate::config::{ConfigError, SimConfig};
use crate::entity::body::RigidBody;
use crate::entity::dynamite::Dynamite;
use crate::entity::tools;
use crate::simulation::{DrillBit, ExplosionReport, ExplosionSystem, mining};

/// Handle for a body owned by a `World`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(u64);

impl BodyId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// The simulation context
pub struct World {
    config: SimConfig,
    grid: Grid,
    mapping: GridMapping,
    rng: FastRng,
    stats: SimCounters,

    bodies: BTreeMap<BodyId, RigidBody>,
    dynamites: BTreeMap<BodyId, Dynamite>,
    next_body_id: u64,

    /// Time not yet consumed by fixed-interval ticks
    time_accumulator: f32,
}

impl World {
    /// Cap on ticks run by a single `update` call
    pub const MAX_TICKS_PER_UPDATE: u32 = 8;

    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut grid = Grid::new(config.width, config.height, config.chunk_size);
        grid.chunks_mut().enabled = config.use_chunk_optimization;
        grid.chunks_mut().wake_neighbors = config.wake_neighbor_chunks;

        let (cols, rows) = config.chunk_dims();
        log::info!(
            "Created {}x{} world ({}x{} chunks of {}, seed {})",
            config.width,
            config.height,
            cols,
            rows,
            config.chunk_size,
            config.seed
        );

        Ok(Self {
            mapping: GridMapping::new(config.width, config.height, config.pixels_per_unit),
            rng: FastRng::new(config.seed),
            grid,
            stats: SimCounters::default(),
            bodies: BTreeMap::new(),
            dynamites: BTreeMap::new(),
            next_body_id: 1,
            time_accumulator: 0.0,
            config,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn mapping(&self) -> &GridMapping {
        &self.mapping
    }

    pub fn rng_mut(&mut self) -> &mut FastRng {
        &mut self.rng
    }

    pub fn stats(&self) -> &SimCounters {
        &self.stats
    }

    // ===== Grid =====

    pub fn set_cell(&mut self, x: i32, y: i32, material: MaterialKind) {
        self.grid.set(x, y, material, &mut self.rng);
    }

    pub fn get_cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.grid.get(x, y).copied()
    }

    pub fn material_at(&self, x: i32, y: i32) -> Option<MaterialKind> {
        self.grid.material_at(x, y)
    }

    pub fn set_lifetime(&mut self, x: i32, y: i32, lifetime: f32) {
        self.grid.set_lifetime(x, y, lifetime);
    }

    pub fn is_solid(material: MaterialKind) -> bool {
        material.is_solid()
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, material: MaterialKind) {
        self.grid.fill_rect(x, y, w, h, material, &mut self.rng);
    }

    pub fn scroll_up(&mut self, rows: usize) {
        log::debug!("Scrolling grid up by {rows} rows");
        self.grid.scroll_up(rows);
    }

    /// Refill the bottom `rows` rows through `filler`. The topmost refilled
    /// row sits at absolute depth `depth`, and depth grows toward row 0.
    pub fn refill_rows(&mut self, rows: usize, depth: u64, filler: &mut dyn RowFiller) {
        let rows = rows.min(self.grid.height());
        for y in 0..rows {
            let row_depth = depth + (rows - 1 - y) as u64;
            filler.fill_row(&mut self.grid, y as i32, row_depth, &mut self.rng);
        }
    }

    /// Paint a disc of `material`
    pub fn paint_circle(&mut self, center: IVec2, radius: i32, material: MaterialKind) -> usize {
        tools::draw_circle(&mut self.grid, center, radius, material, &mut self.rng)
    }

    /// Clear terrain in a disc, keeping liquids and gases
    pub fn erase_solids(&mut self, center: IVec2, radius: i32) -> usize {
        tools::erase_solids(&mut self.grid, center, radius, &mut self.rng)
    }

    pub fn area_blocked(&self, center: IVec2, radius: i32) -> bool {
        mining::area_blocked(&self.grid, center, radius)
    }

    pub fn grind(&mut self, center: IVec2, bit: &DrillBit) -> usize {
        mining::grind(&mut self.grid, center, bit, &mut self.stats, &mut self.rng)
    }

    pub fn explode(&mut self, x: i32, y: i32, radius: i32) -> ExplosionReport {
        ExplosionSystem::explode(&mut self.grid, x, y, radius, &mut self.stats, &mut self.rng)
    }

    pub fn world_to_grid(&self, pos: Vec2) -> IVec2 {
        self.mapping.world_to_grid(pos)
    }

    pub fn grid_to_world(&self, cell: IVec2) -> Vec2 {
        self.mapping.grid_to_world(cell)
    }

    // ===== Chunks =====

    /// Chunks swept during the most recent tick
    pub fn active_chunk_count(&self) -> usize {
        self.stats.active_chunks
    }

    pub fn total_chunk_count(&self) -> usize {
        self.grid.chunks().total()
    }

    pub fn is_chunk_sleeping(&self, cx: usize, cy: usize) -> bool {
        self.grid.chunks().is_sleeping(cx, cy)
    }

    pub fn set_chunk_optimization(&mut self, enabled: bool) {
        self.config.use_chunk_optimization = enabled;
        self.grid.chunks_mut().enabled = enabled;
        if !enabled {
            self.grid.chunks_mut().wake_all();
        }
    }

    // ===== Stepping =====

    /// Run one sweep over every active chunk
    pub fn step(&mut self) {
        // 1. New stamp, sleep chunks that saw nothing last tick
        self.grid.begin_tick();

        // 2. Sweep chunks bottom row first, cells bottom row first
        let (cols, rows) = (self.grid.chunks().cols(), self.grid.chunks().rows());
        let mut swept = 0;
        for cy in 0..rows {
            for cx in 0..cols {
                if !self.grid.chunks().is_active(cx, cy) {
                    continue;
                }
                swept += 1;
                let (x0, y0, x1, y1) = self.grid.chunks().bounds(cx, cy);
                for y in y0..y1 {
                    for x in x0..x1 {
                        CellularAutomataUpdater::update_cell(
                            &mut self.grid,
                            x as i32,
                            y as i32,
                            &mut self.stats,
                            &mut self.rng,
                        );
                    }
                }
            }
        }

        self.stats.ticks += 1;
        self.stats.active_chunks = swept;
    }

    /// Advance by wall-clock time, running as many fixed ticks as fit.
    /// Returns the number of ticks run.
    pub fn update(&mut self, dt: f32) -> u32 {
        let interval = self.config.tick_interval;
        self.time_accumulator += dt.max(0.0);

        let mut ticks = 0;
        while self.time_accumulator >= interval && ticks < Self::MAX_TICKS_PER_UPDATE {
            self.step();
            self.time_accumulator -= interval;
            ticks += 1;
        }

        // Falling behind: drop the backlog instead of spiraling
        if self.time_accumulator > interval * 2.0 {
            log::debug!(
                "Dropping {:.3}s of simulation backlog",
                self.time_accumulator - interval
            );
            self.time_accumulator = interval;
        }
        ticks
    }

    // ===== Bodies =====

    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        let id = BodyId(self.next_body_id);
        self.next_body_id += 1;
        log::debug!("Added body {} at {:?}", id.0, body.position);
        self.bodies.insert(id, body);
        id
    }

    pub fn remove_body(&mut self, id: BodyId) -> Option<RigidBody> {
        self.dynamites.remove(&id);
        let body = self.bodies.remove(&id);
        if body.is_some() {
            log::debug!("Removed body {}", id.0);
        }
        body
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&id)
    }

    /// Bodies in insertion order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Attach a fuse to a body; it explodes and is removed when the fuse runs out
    pub fn add_dynamite(&mut self, body: RigidBody, dynamite: Dynamite) -> BodyId {
        let id = self.add_body(body);
        self.dynamites.insert(id, dynamite);
        id
    }

    pub fn dynamite(&self, id: BodyId) -> Option<&Dynamite> {
        self.dynamites.get(&id)
    }

    /// Move every body, e.g. after the grid scrolled under them
    pub fn shift_bodies(&mut self, delta: Vec2) {
        for body in self.bodies.values_mut() {
            body.translate(delta);
        }
    }

    /// Advance every body by `dt` seconds, then burn dynamite fuses.
    /// Returns the ids of dynamite that went off.
    pub fn step_bodies(&mut self, dt: f32) -> Vec<BodyId> {
        for body in self.bodies.values_mut() {
            GridCollisionSolver::step(
                body,
                &mut self.grid,
                &self.mapping,
                self.config.gravity,
                dt,
                &mut self.stats,
                &mut self.rng,
            );
        }

        let expired: Vec<BodyId> = self
            .dynamites
            .iter_mut()
            .filter_map(|(id, dynamite)| dynamite.tick(dt).then_some(*id))
            .collect();

        for id in &expired {
            let Some(dynamite) = self.dynamites.remove(id) else {
                continue;
            };
            if let Some(body) = self.bodies.remove(id) {
                let cell = self.mapping.world_to_grid(body.position);
                let report = self.explode(cell.x, cell.y, dynamite.radius);
                log::debug!(
                    "Dynamite {} exploded at ({}, {}): {} ignited, {} pushed",
                    id.0,
                    cell.x,
                    cell.y,
                    report.ignited,
                    report.pushed
                );
            }
        }
        expired
    }
}
