//! Weapon data loading.
//!
//! Weapons are authored in TOML:
//!
//! ```toml
//! [[weapon]]
//! name = "sword"
//!
//! [[weapon.ability]]
//! name = "slash"
//! cooldown_ms = 400
//!
//! [[weapon.ability.stage]]
//! name = "slash_1"
//! frame_count = 4
//! frame_ms = 50
//! attack = { width_fraction = 1.0 }
//! active_frames = { first = 1, last = 2 }
//! hit = { damage = 10.0, knockback_x = 4.0, invulnerability_ms = 300 }
//! ```
//!
//! Every weapon is validated as it is registered; the first bad definition
//! aborts the load.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use ashfall_common::{ConfigError, SimResult};
use serde::Deserialize;
use tracing::{debug, info};

use crate::ability::WeaponSpec;

#[derive(Deserialize)]
struct WeaponFile {
    #[serde(default)]
    weapon: Vec<WeaponSpec>,
}

/// Validated weapon definitions, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct WeaponTable {
    by_name: AHashMap<String, usize>,
    weapons: Vec<WeaponSpec>,
}

impl WeaponTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of weapons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    /// True if no weapons are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    /// Validates and adds a weapon. Names are case-insensitive and unique.
    pub fn register(&mut self, weapon: WeaponSpec) -> Result<(), ConfigError> {
        let key = weapon.name.to_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(ConfigError::DuplicateWeapon(weapon.name));
        }
        weapon.validate()?;

        debug!(
            "Registered weapon {:?} with {} abilities",
            weapon.name,
            weapon.abilities.len()
        );
        self.by_name.insert(key, self.weapons.len());
        self.weapons.push(weapon);
        Ok(())
    }

    /// Looks up a weapon by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&WeaponSpec> {
        self.by_name
            .get(&name.to_lowercase())
            .and_then(|&index| self.weapons.get(index))
    }

    /// Weapons in load order.
    pub fn iter(&self) -> impl Iterator<Item = &WeaponSpec> {
        self.weapons.iter()
    }

    /// Parses and registers every `[[weapon]]` in `content`.
    ///
    /// Returns the number of weapons added.
    pub fn load_str(&mut self, content: &str) -> Result<usize, ConfigError> {
        let file: WeaponFile = toml::from_str(content)?;
        let count = file.weapon.len();
        for weapon in file.weapon {
            self.register(weapon)?;
        }
        Ok(count)
    }

    /// Builds a table from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut table = Self::new();
        table.load_str(content)?;
        Ok(table)
    }

    /// Loads one weapon file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> SimResult<usize> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let count = self.load_str(&content)?;
        info!("Loaded {count} weapons from {}", path.display());
        Ok(count)
    }

    /// Loads every `*.toml` file in a directory, in file-name order.
    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> SimResult<usize> {
        let mut paths: Vec<_> = fs::read_dir(dir.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        let mut total = 0;
        for path in paths {
            total += self.load_file(&path)?;
        }
        Ok(total)
    }
}
