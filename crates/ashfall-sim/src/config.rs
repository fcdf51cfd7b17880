//! Simulation configuration.
//!
//! Loaded from a TOML file. Every field has a default, so a partial file (or
//! no file at all) yields a runnable configuration.

use std::fs;
use std::path::Path;

use ashfall_common::{ConfigError, SimResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::physics::PhysicsConfig;

/// Tunable simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Logical milliseconds per tick
    pub tick_ms: u64,
    /// Gravity, terminal velocity and collision tuning
    pub physics: PhysicsConfig,
    /// Stamina restored to every living actor each tick
    pub stamina_regen_per_tick: f32,
    /// Margin around an actor within which tiles are considered nearby
    pub query_margin: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            physics: PhysicsConfig::default(),
            stamina_regen_per_tick: 0.25,
            query_margin: 32.0,
        }
    }
}

impl SimConfig {
    /// Parses a configuration from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a configuration file. A missing file yields the defaults; a
    /// malformed one is an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::TileOrder;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.tick_ms, 16);
        assert_eq!(config.physics.gravity, 0.9);
        assert_eq!(config.physics.tile_order, TileOrder::ReverseInsertion);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimConfig::from_toml_str(
            r#"
            tick_ms = 10

            [physics]
            gravity = 0.5
            tile_order = "nearest_first"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.tick_ms, 10);
        assert_eq!(config.physics.gravity, 0.5);
        assert_eq!(config.physics.terminal_velocity, 15.0);
        assert_eq!(config.physics.tile_order, TileOrder::NearestFirst);
        assert_eq!(config.query_margin, 32.0);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(matches!(
            SimConfig::from_toml_str("tick_ms = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = SimConfig::load_from("/nonexistent/ashfall-sim.toml").expect("defaults");
        assert_eq!(config, SimConfig::default());
    }
}
