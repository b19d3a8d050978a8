//! Simulation systems - explosions, ballistic debris, drilling

mod ballistic;
mod explosion;
pub mod mining;

pub use ballistic::BallisticStepper;
pub use explosion::{ExplosionReport, ExplosionSystem};
pub use mining::DrillBit;
