//! # Ashfall Sim
//!
//! Actor simulation core for a 2D side-scroller.
//!
//! This crate provides:
//! - Logical clock and timers
//! - Derived hitboxes and tile collision (solid, one-way, slopes)
//! - Actor kinematics with gravity and knockback
//! - Weapon abilities as chained, animation-timed stages
//! - The damage and knockback pipeline with invulnerability windows
//! - Per-species behaviours, an actor arena and the fixed-step world loop
//! - TOML configuration and weapon data loading
//!
//! Rendering, input capture and level files are outside this crate. The world
//! consumes geometry through [`GeometrySource`], frame timing through
//! [`AnimationSignals`], and reports spawns, despawns and events to an
//! [`EntitySink`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ability;
pub mod actor;
pub mod animation;
pub mod behavior;
pub mod collision;
pub mod combat;
pub mod config;
pub mod events;
pub mod hitbox;
pub mod loader;
pub mod physics;
pub mod tile;
pub mod timer;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ability::*;
    pub use crate::actor::*;
    pub use crate::animation::*;
    pub use crate::behavior::*;
    pub use crate::collision::*;
    pub use crate::combat::*;
    pub use crate::config::*;
    pub use crate::events::*;
    pub use crate::hitbox::*;
    pub use crate::loader::*;
    pub use crate::physics::*;
    pub use crate::tile::*;
    pub use crate::timer::*;
    pub use crate::world::*;
    pub use ashfall_common::{ActorId, ConfigError, Direction, Rect, SimError, SimResult};
}

pub use prelude::*;
