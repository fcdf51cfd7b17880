//! Error types for Ashfall.
//!
//! Only programmer/content errors live here. Expected gameplay refusals
//! (cooldowns, invulnerability, busy weapons) are ordinary outcomes and are
//! reported through return values instead.

use thiserror::Error;

use crate::ids::ActorId;

/// Top-level error type for simulation operations.
#[derive(Debug, Error)]
pub enum SimError {
    /// Content or configuration is malformed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ability index does not exist on the weapon
    #[error("Ability index {index} out of range (weapon has {len} abilities)")]
    AbilityIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of abilities on the weapon
        len: usize,
    },

    /// Actor handle is stale or was never issued
    #[error("Unknown actor: {0}")]
    UnknownActor(ActorId),

    /// Actor has no weapon equipped
    #[error("Actor {0} has no weapon")]
    NoWeapon(ActorId),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Content errors detected while building tiles, weapons or config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Slope orientation name is not one of the four known orientations
    #[error("Invalid tile orientation: {0:?}")]
    InvalidTileOrientation(String),

    /// Tile kind name is unknown
    #[error("Unknown tile kind: {0:?}")]
    UnknownTileKind(String),

    /// Ability definition fails validation
    #[error("Invalid ability {ability:?}: {reason}")]
    InvalidAbility {
        /// Ability name
        ability: String,
        /// What is wrong with it
        reason: String,
    },

    /// Two weapons share a name
    #[error("Duplicate weapon: {0:?}")]
    DuplicateWeapon(String),

    /// TOML parsing failed
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type alias for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
