//! Scene setup.
//!
//! A scene is a tile layer plus a list of actor placements. Placements may
//! name a weapon from the loaded [`WeaponTable`] instead of inlining one.
//!
//! The culling margin is not part of the scene; the runner applies the
//! configured `sim.query_margin`.
//!
//! ```toml
//! [[tile]]
//! kind = "solid"
//! x = -64.0
//! y = 200.0
//! width = 1024.0
//! height = 32.0
//!
//! [[actor]]
//! x = 0.0
//! y = 168.0
//! armed_with = "sword"
//!
//! [actor.spec]
//! kind = "player"
//! width = 32
//! height = 32
//! max_health = 100
//! ```

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ashfall_sim::prelude::*;
use serde::Deserialize;
use tracing::{debug, info};

/// Where and what to spawn.
#[derive(Debug, Clone, Deserialize)]
pub struct Placement {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Weapon table entry to equip
    #[serde(default)]
    pub armed_with: Option<String>,
    /// Actor template
    pub spec: ActorSpec,
}

#[derive(Deserialize)]
struct SceneFile {
    #[serde(default)]
    tile: Vec<TileSpec>,
    #[serde(default)]
    actor: Vec<Placement>,
}

/// Terrain and starting actors.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Collision tiles
    pub layer: TileLayer,
    /// Actors spawned at start
    pub placements: Vec<Placement>,
}

impl Scene {
    /// Parses a scene from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SceneFile = toml::from_str(content)?;
        let mut layer = TileLayer::new(0.0);
        for spec in file.tile {
            layer.push(Tile::try_from(spec)?);
        }
        Ok(Self {
            layer,
            placements: file.actor,
        })
    }

    /// Loads a scene file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scene {}", path.display()))?;
        let scene = Self::from_toml_str(&content)
            .with_context(|| format!("parsing scene {}", path.display()))?;
        info!(
            "Loaded scene {} ({} tiles, {} actors)",
            path.display(),
            scene.layer.len(),
            scene.placements.len()
        );
        Ok(scene)
    }

    /// A flat arena with a slope, a ledge, a patrolling grunt, a hunter and
    /// an exploding archer.
    #[must_use]
    pub fn arena() -> Self {
        let layer = TileLayer::new(0.0)
            .with(Tile::solid(-64.0, 200.0, 1024.0, 32.0))
            .with(Tile::solid(-96.0, 0.0, 32.0, 232.0))
            .with(Tile::solid(960.0, 0.0, 32.0, 232.0))
            .with(Tile::slope(SlopeOrientation::AscendRight, 480.0, 168.0, 32.0))
            .with(Tile::one_way(600.0, 120.0, 96.0, 8.0));

        let mut placements = vec![Placement {
            x: 0.0,
            y: 168.0,
            armed_with: None,
            spec: ActorSpec::new(ActorKind::Player, 32, 32, 100)
                .with_stamina(50)
                .with_weapon(sword()),
        }];

        placements.push(Placement {
            x: 260.0,
            y: 168.0,
            armed_with: None,
            spec: ActorSpec::new(ActorKind::Enemy, 32, 32, 30)
                .with_behavior(Behavior::patrol(1.5, 2000))
                .with_death_effect(DeathEffect::DropCurrency { amount: 5 }),
        });

        placements.push(Placement {
            x: 420.0,
            y: 168.0,
            armed_with: None,
            spec: ActorSpec::new(ActorKind::Enemy, 32, 32, 60)
                .with_behavior(Behavior::hunter(2.0, 320.0, 36.0, 0))
                .with_weapon(sword()),
        });

        placements.push(Placement {
            x: 640.0,
            y: 88.0,
            armed_with: None,
            spec: ActorSpec::new(ActorKind::Enemy, 32, 32, 20)
                .with_behavior(Behavior::hunter(0.0, 320.0, 240.0, 0))
                .with_weapon(bow())
                .with_death_effect(DeathEffect::Explode {
                    radius: 48.0,
                    damage: 5.0,
                    lifetime_ms: 160,
                })
                .with_death_effect(DeathEffect::SpawnEffect {
                    name: "smoke".to_string(),
                }),
        });

        Self { layer, placements }
    }

    /// Spawns every placement into `world`, resolving named weapons.
    pub fn populate(&self, world: &mut World, weapons: &WeaponTable) -> Result<Vec<ActorId>> {
        let mut ids = Vec::with_capacity(self.placements.len());
        for placement in &self.placements {
            let mut spec = placement.spec.clone();
            if let Some(name) = &placement.armed_with {
                let weapon = weapons
                    .get(name)
                    .ok_or_else(|| anyhow!("unknown weapon {name:?}"))?;
                spec.weapon = Some(weapon.clone());
            }

            let id = world.spawn(spec, placement.x, placement.y)?;
            debug!("Placed {id} at ({}, {})", placement.x, placement.y);
            ids.push(id);
        }
        Ok(ids)
    }
}

/// Two-stage melee chain.
fn sword() -> WeaponSpec {
    let cut = AbilityStage::new("cut", 4, 48).with_attack(
        AttackShape::reach(1.2),
        FrameWindow::new(1, 2),
        HitProfile::new(10.0, 4.0, -3.0).with_invulnerability(Invulnerability::Grant(300)),
    );
    let thrust = AbilityStage::new("thrust", 3, 48)
        .with_attack(
            AttackShape::reach(1.5),
            FrameWindow::new(1, 1),
            HitProfile::new(14.0, 6.0, -4.0).with_invulnerability(Invulnerability::Grant(300)),
        )
        .with_motion(StageMotion::Impulse {
            vel_x: 2.0,
            vel_y: 0.0,
        });

    WeaponSpec::new("sword").with_ability(
        Ability::new("slash", 400)
            .with_stamina_cost(5.0)
            .with_stage(cut)
            .with_stage(thrust),
    )
}

/// Fires an arrow on the release frame.
fn bow() -> WeaponSpec {
    let arrow = ActorSpec::new(ActorKind::Projectile, 8, 4, 1)
        .with_gravity_scale(0.0)
        .with_behavior(Behavior::projectile(
            6.0,
            1500,
            HitProfile::new(8.0, 3.0, -2.0),
        ));
    let draw = AbilityStage::new("draw", 3, 64)
        .with_motion(StageMotion::Hold)
        .with_spawn(2, arrow);

    WeaponSpec::new("bow").with_ability(Ability::new("shoot", 900).with_stage(draw))
}
