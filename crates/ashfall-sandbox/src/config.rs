//! Sandbox configuration.
//!
//! Run length, scene and weapon sources, plus the simulation settings.
//! Loaded from and saved to a TOML file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ashfall_sim::SimConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "ashfall.toml";

/// Sandbox run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    // === Run ===
    /// Ticks to simulate
    pub ticks: u64,
    /// Print a snapshot every N ticks (0 = only at the end)
    pub snapshot_every: u64,
    /// Pretty-print snapshots
    pub pretty: bool,
    /// Drive players with a scripted walk-and-swing intent
    pub autoplay: bool,

    // === Content ===
    /// Scene file (None = built-in arena)
    pub scene_path: Option<PathBuf>,
    /// Directory of weapon `*.toml` files
    pub weapons_dir: Option<PathBuf>,

    // === Simulation ===
    /// Clock, physics and regen tuning
    pub sim: SimConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            snapshot_every: 0,
            pretty: true,
            autoplay: true,

            scene_path: None,
            weapons_dir: None,

            sim: SimConfig::default(),
        }
    }
}

impl SandboxConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(mut config) => {
                    config.validate();
                    info!("Loaded config from {}", path.display());
                    config
                },
                Err(e) => {
                    warn!("Failed to parse config file: {e}");
                    Self::default()
                },
            },
            Err(e) => {
                warn!("Failed to read config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp values to ranges the simulation can run with.
    pub fn validate(&mut self) {
        self.ticks = self.ticks.clamp(1, 1_000_000);
        self.sim.tick_ms = self.sim.tick_ms.clamp(1, 1000);
        self.sim.query_margin = self.sim.query_margin.max(0.0);
        self.sim.stamina_regen_per_tick = self.sim.stamina_regen_per_tick.max(0.0);
    }
}
