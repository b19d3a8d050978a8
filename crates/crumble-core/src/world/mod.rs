//! World management - grid, chunks, cell rules and rigid body coupling

mod body_physics;
mod ca_update;
mod chunk_manager;
mod coords;
mod grid;
pub mod infinite_scroll;
pub mod rng_trait;
pub mod stats;
#[allow(clippy::module_inception)]
mod world;

pub use body_physics::{ContactReport, GridCollisionSolver};
pub use ca_update::CellularAutomataUpdater;
pub use chunk_manager::{Chunk, ChunkManager};
pub use coords::GridMapping;
pub use grid::{Grid, GridError};
pub use infinite_scroll::{InfiniteScroller, OreFill, RowFiller, SolidFill};
pub use rng_trait::WorldRng;
pub use stats::{NoopStats, SimCounters, SimStats};
pub use world::{BodyId, World};
