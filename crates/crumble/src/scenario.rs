//! Canned scenarios for the headless runner

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use glam::{IVec2, Vec2};
use web_time::Instant;

use crumble_core::entity::{BodyParams, Collider, Destructive, DrillUnit, Dynamite, RigidBody};
use crumble_core::world::{BodyId, InfiniteScroller, OreFill, World};
use crumble_simulation::MaterialKind;

/// Available scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Sand poured onto a stone ledge
    Sandpile,
    /// A gas pocket under water, lit from below
    Fireworks,
    /// A stone tower with bombs and a stick of dynamite
    Demolition,
    /// A destructive ball digging into endless ore
    Dig,
    /// A disc and a crate dropped onto a stone floor
    Drop,
    /// A drill unit boring down through a sand bed onto bedrock
    Drill,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::Sandpile,
        Scenario::Fireworks,
        Scenario::Demolition,
        Scenario::Dig,
        Scenario::Drop,
        Scenario::Drill,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Sandpile => "sandpile",
            Scenario::Fireworks => "fireworks",
            Scenario::Demolition => "demolition",
            Scenario::Dig => "dig",
            Scenario::Drop => "drop",
            Scenario::Drill => "drill",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Sandpile => "sand poured onto a stone ledge",
            Scenario::Fireworks => "gas pocket under water, lit from below",
            Scenario::Demolition => "stone tower with bombs and dynamite",
            Scenario::Dig => "destructive ball digging through endless ore",
            Scenario::Drop => "disc and crate dropped onto a stone floor",
            Scenario::Drill => "drill unit boring through sand onto bedrock",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        match Scenario::ALL.into_iter().find(|sc| sc.name() == wanted) {
            Some(scenario) => Ok(scenario),
            None => bail!(
                "Unknown scenario '{}'. Valid options: {}",
                s,
                Scenario::ALL.map(|sc| sc.name()).join(", ")
            ),
        }
    }
}

/// Per-tick hooks a scenario needs beyond the sweep
enum Driver {
    Plain,
    /// Keep pouring sand from a point until the given tick
    Pour { at: IVec2, until: u64 },
    Scroll {
        scroller: InfiniteScroller,
        filler: OreFill,
    },
    /// Steer a drill unit in a fixed direction every tick
    Drill { unit: DrillUnit, input: Vec2, broken: u64 },
}

/// What a scenario run produced
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub ticks: u64,
    pub elapsed_ms: f64,
    pub cells_moved: u64,
    pub state_changes: u64,
    pub explosions: u64,
    pub active_chunks: usize,
    pub total_chunks: usize,
    /// Non-empty material counts at the end of the run
    pub census: Vec<(MaterialKind, usize)>,
    /// Final body positions in world units
    pub bodies: Vec<(BodyId, Vec2)>,
    /// Rows scrolled, for scenarios that dig
    pub depth: u64,
    /// Cells ground away by a drill unit
    pub cells_drilled: u64,
}

impl ScenarioReport {
    pub fn summary(&self) -> String {
        let census = self
            .census
            .iter()
            .map(|(m, n)| format!("{m}={n}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{}: {} ticks in {:.1}ms | moved {} | changed {} | explosions {} | chunks {}/{} | depth {} | drilled {} | {}",
            self.scenario,
            self.ticks,
            self.elapsed_ms,
            self.cells_moved,
            self.state_changes,
            self.explosions,
            self.active_chunks,
            self.total_chunks,
            self.depth,
            self.cells_drilled,
            census
        )
    }
}

/// Build the scenario's initial state in `world`
fn setup(scenario: Scenario, world: &mut World, params: &BodyParams) -> Driver {
    let (w, h) = (world.width() as i32, world.height() as i32);
    match scenario {
        Scenario::Sandpile => {
            world.fill_rect(0, 0, w, h / 8, MaterialKind::Stone);
            world.fill_rect(w / 4, h / 2, w / 4, 3, MaterialKind::Stone);
            Driver::Pour {
                at: IVec2::new(w / 3, h - 4),
                until: 400,
            }
        }
        Scenario::Fireworks => {
            world.fill_rect(0, 0, w, h / 10, MaterialKind::Stone);
            world.fill_rect(w / 4, h / 10, w / 2, h / 6, MaterialKind::Gas);
            world.fill_rect(w / 4, h / 10 + h / 6, w / 2, h / 10, MaterialKind::Water);
            world.set_cell(w / 2, h / 10, MaterialKind::Fire);
            Driver::Plain
        }
        Scenario::Demolition => {
            world.fill_rect(0, 0, w, h / 8, MaterialKind::Stone);
            world.fill_rect(w / 2 - 20, h / 8, 40, h / 3, MaterialKind::Stone);
            world.fill_rect(w / 2 - 10, h / 8 + h / 3, 20, 6, MaterialKind::Mineral);
            for dx in [-12, 0, 12] {
                world.set_cell(w / 2 + dx, h / 8 + h / 3 + 6, MaterialKind::Bomb);
            }
            let top = world.grid_to_world(IVec2::new(w / 4, h / 8 + 4));
            let dynamite = RigidBody::new(
                top,
                Collider::Box {
                    half_extents: Vec2::new(0.02, 0.05),
                },
                params.clone(),
            );
            world.add_dynamite(dynamite, Dynamite::default());
            Driver::Plain
        }
        Scenario::Dig => {
            let start = world.grid_to_world(IVec2::new(w / 2, h - 10));
            let ball = RigidBody::new(
                start,
                Collider::Circle { radius: 0.05 },
                params.clone(),
            )
            .with_destructive(Destructive::default());
            let id = world.add_body(ball);
            let mut scroller = InfiniteScroller::new(id);
            let mut filler = OreFill::default();
            scroller.prepare(world, &mut filler, 0.6);
            Driver::Scroll { scroller, filler }
        }
        Scenario::Drop => {
            world.fill_rect(0, 0, w, h / 5, MaterialKind::Stone);
            world.fill_rect(w / 2, h / 5, w / 2, 4, MaterialKind::Water);
            let disc = RigidBody::new(
                world.grid_to_world(IVec2::new(w / 3, h - 20)),
                Collider::Circle { radius: 0.06 },
                params.clone(),
            )
            .with_velocity(Vec2::new(0.6, 0.0));
            let crate_body = RigidBody::new(
                world.grid_to_world(IVec2::new(2 * w / 3, h - 20)),
                Collider::Box {
                    half_extents: Vec2::new(0.05, 0.05),
                },
                params.clone(),
            );
            world.add_body(disc);
            world.add_body(crate_body);
            Driver::Plain
        }
        Scenario::Drill => {
            world.fill_rect(0, 0, w, h / 10, MaterialKind::Stone);
            world.fill_rect(0, h / 10, w, h / 2 - h / 10, MaterialKind::Sand);
            let unit = DrillUnit::new(world.grid_to_world(IVec2::new(w / 2, h / 2 + 20)));
            Driver::Drill {
                unit,
                input: Vec2::NEG_Y,
                broken: 0,
            }
        }
    }
}

/// Run `scenario` for `ticks` ticks. Each tick is one sweep followed by one
/// body step of the configured tick interval.
pub fn run(scenario: Scenario, world: &mut World, params: &BodyParams, ticks: u64) -> ScenarioReport {
    log::info!("Running scenario '{}' ({}) for {} ticks", scenario, scenario.description(), ticks);
    let mut driver = setup(scenario, world, params);
    let dt = world.config().tick_interval;
    let start = Instant::now();

    for tick in 0..ticks {
        world.step();
        world.step_bodies(dt);
        match &mut driver {
            Driver::Plain => {}
            Driver::Pour { at, until } => {
                if tick < *until {
                    world.paint_circle(*at, 2, MaterialKind::Sand);
                }
            }
            Driver::Scroll { scroller, filler } => {
                scroller.update(world, filler);
            }
            Driver::Drill { unit, input, broken } => {
                let outcome = unit.update(*input, dt, world);
                *broken += outcome.cells_broken as u64;
            }
        }
    }

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let stats = *world.stats();
    let census = MaterialKind::ALL
        .into_iter()
        .filter(|m| !m.is_empty())
        .map(|m| (m, world.grid().count(m)))
        .filter(|(_, n)| *n > 0)
        .collect();
    let depth = match &driver {
        Driver::Scroll { scroller, .. } => scroller.depth,
        _ => 0,
    };
    let cells_drilled = match &driver {
        Driver::Drill { broken, .. } => *broken,
        _ => 0,
    };

    ScenarioReport {
        scenario,
        ticks,
        elapsed_ms,
        cells_moved: stats.cells_moved,
        state_changes: stats.state_changes,
        explosions: stats.explosions,
        active_chunks: world.active_chunk_count(),
        total_chunks: world.total_chunk_count(),
        census,
        bodies: world.bodies().map(|(id, b)| (id, b.position)).collect(),
        depth,
        cells_drilled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crumble_core::SimConfig;

    fn small_world() -> World {
        World::new(SimConfig::with_size(128, 128)).unwrap()
    }

    #[test]
    fn test_parse_scenarios() {
        assert_eq!("sandpile".parse::<Scenario>().unwrap(), Scenario::Sandpile);
        assert_eq!(" Dig ".parse::<Scenario>().unwrap(), Scenario::Dig);
        let err = "volcano".parse::<Scenario>().unwrap_err().to_string();
        assert!(err.contains("demolition"));
    }

    #[test]
    fn test_sandpile_grows() {
        let mut world = small_world();
        let report = run(Scenario::Sandpile, &mut world, &BodyParams::default(), 120);
        assert_eq!(report.ticks, 120);
        assert!(report.cells_moved > 0);
        assert!(world.grid().count(MaterialKind::Sand) > 0);
    }

    #[test]
    fn test_demolition_blows_up() {
        let mut world = small_world();
        let report = run(Scenario::Demolition, &mut world, &BodyParams::default(), 200);
        // Three bombs and the dynamite all go off within 200 ticks
        assert!(report.explosions >= 4, "{}", report.summary());
        assert!(report.bodies.is_empty());
    }

    #[test]
    fn test_drill_bores_into_sand() {
        let mut world = small_world();
        let report = run(Scenario::Drill, &mut world, &BodyParams::default(), 120);
        assert!(report.cells_drilled > 0, "{}", report.summary());
        let sand_bed = 128 * (64 - 12);
        assert_eq!(
            world.grid().count(MaterialKind::Sand),
            sand_bed - report.cells_drilled as usize
        );
        // Bedrock is too hard for the default bit
        assert_eq!(world.grid().count(MaterialKind::Stone), 128 * 12);
    }

    #[test]
    fn test_every_scenario_runs() {
        for scenario in Scenario::ALL {
            let mut world = small_world();
            let report = run(scenario, &mut world, &BodyParams::default(), 30);
            assert_eq!(report.scenario, scenario);
            assert!(report.summary().starts_with(scenario.name()));
        }
    }
}
