pub mod config;
pub mod entity;
pub mod simulation;
pub mod world;

pub use config::{ConfigError, SimConfig};
pub use world::World;
