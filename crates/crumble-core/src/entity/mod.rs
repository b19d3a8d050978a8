//! Things that live alongside the grid - bodies, dynamite, the drill, brushes

pub mod body;
pub mod drill;
pub mod dynamite;
pub mod tools;

pub use body::{BodyParams, Collider, Destructive, RigidBody};
pub use drill::{DrillOutcome, DrillParams, DrillUnit};
pub use dynamite::Dynamite;
