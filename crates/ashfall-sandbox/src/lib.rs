//! Ashfall Sandbox - headless runner for the actor simulation.
//!
//! Loads a scene and weapon data, steps the world for a fixed number of
//! ticks and reports the state as JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod runner;
pub mod scene;
pub mod snapshot;

pub use config::SandboxConfig;
pub use runner::{RunSummary, Runner};
pub use scene::{Placement, Scene};
pub use snapshot::{ActorSnapshot, WorldSnapshot};
