//! Runner configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `crumble.ron` file (if exists)
//! 3. Environment variables prefixed with `CRUMBLE_`
//!
//! Example environment variable: `CRUMBLE_SIM__CHUNK_SIZE=16`

use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::{Deserialize, Serialize};

use crumble_core::SimConfig;
use crumble_core::entity::BodyParams;

/// Everything the headless runner needs
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub sim: SimConfig,

    #[serde(default)]
    pub body: BodyParams,

    #[serde(default)]
    pub run: RunConfig,
}

/// Scenario and benchmark settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ticks a scenario runs for
    pub ticks: u64,
    /// Ticks the benchmark runs for
    pub bench_ticks: u64,
    /// Benchmark ticks excluded from the min/max statistics
    pub bench_warmup_ticks: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            bench_ticks: 1000,
            bench_warmup_ticks: 25,
        }
    }
}

impl AppConfig {
    /// Load with layered priority from `crumble.ron` in the working directory
    pub fn load() -> Result<Self> {
        Self::load_from("crumble")
    }

    /// Same as [`AppConfig::load`] with a different config file name (the
    /// extension may be omitted)
    pub fn load_from(file_name: &str) -> Result<Self> {
        let builder = Self::defaults()
            .context("Failed to set configuration defaults")?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(
                File::with_name(file_name)
                    .format(config::FileFormat::Ron)
                    .required(false),
            )
            // Layer 3: Environment variables (CRUMBLE_SIM__WIDTH, etc.)
            .add_source(Environment::with_prefix("CRUMBLE").separator("__"));

        let config = builder.build().context("Failed to build configuration")?;

        let app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app.sim.validate().context("Invalid simulation configuration")?;
        Ok(app)
    }

    // Layer 1: Compiled defaults
    fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let sim = SimConfig::default();
        let body = BodyParams::default();
        let run = RunConfig::default();
        Config::builder()
            .set_default("sim.width", sim.width as i64)?
            .set_default("sim.height", sim.height as i64)?
            .set_default("sim.chunk_size", sim.chunk_size as i64)?
            .set_default("sim.use_chunk_optimization", sim.use_chunk_optimization)?
            .set_default("sim.wake_neighbor_chunks", sim.wake_neighbor_chunks)?
            .set_default("sim.tick_interval", sim.tick_interval as f64)?
            .set_default("sim.seed", sim.seed as i64)?
            .set_default("sim.pixels_per_unit", sim.pixels_per_unit as f64)?
            .set_default("sim.gravity", sim.gravity as f64)?
            .set_default("body.points_per_unit", body.points_per_unit as f64)?
            .set_default("body.bounce", body.bounce as f64)?
            .set_default("body.friction", body.friction as f64)?
            .set_default("body.water_drag", body.water_drag as f64)?
            .set_default("body.sub_steps", body.sub_steps as i64)?
            .set_default("body.sleep_threshold", body.sleep_threshold as f64)?
            .set_default("body.skin_width", body.skin_width as f64)?
            .set_default("body.normal_sample_radius", body.normal_sample_radius as i64)?
            .set_default("body.depenetration_iterations", body.depenetration_iterations as i64)?
            .set_default("body.rest_damping", body.rest_damping as f64)?
            .set_default("run.ticks", run.ticks as i64)?
            .set_default("run.bench_ticks", run.bench_ticks as i64)?
            .set_default("run.bench_warmup_ticks", run.bench_warmup_ticks as i64)
    }
}
