//! # Ashfall
//!
//! Headless entry point: `ashfall [config.toml]`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use ashfall_sandbox::config::CONFIG_FILE;
use ashfall_sandbox::{Runner, SandboxConfig, Scene};
use ashfall_sim::WeaponTable;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive("ashfall=info".parse()?))
        .init();

    info!("Ashfall sandbox starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_string());
    let config = SandboxConfig::load_from(&config_path);
    if !Path::new(&config_path).exists() {
        if let Err(e) = config.save_to(&config_path) {
            warn!("Failed to save config: {e}");
        }
    }

    let mut weapons = WeaponTable::new();
    if let Some(dir) = &config.weapons_dir {
        weapons.load_dir(dir)?;
    }

    let scene = match &config.scene_path {
        Some(path) => Scene::load(path)?,
        None => Scene::arena(),
    };

    let mut runner = Runner::new(&config, scene, &weapons)?;
    let stdout = io::stdout();
    let summary = runner.run(config.ticks, config.snapshot_every, |snapshot| {
        let mut out = stdout.lock();
        writeln!(out, "{}", snapshot.to_json(config.pretty)?)?;
        Ok(())
    })?;

    info!(
        "Ran {} ticks: {} spawned, {} removed, {} alive",
        summary.ticks, summary.spawned, summary.removed, summary.survivors
    );
    Ok(())
}
