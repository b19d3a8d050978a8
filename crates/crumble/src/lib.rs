//! Crumble headless runner - configuration, scenarios and the stress benchmark

pub mod bench;
pub mod config;
pub mod scenario;

pub use config::AppConfig;
pub use scenario::{Scenario, ScenarioReport};
