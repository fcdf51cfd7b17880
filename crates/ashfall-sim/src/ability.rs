//! Weapons, abilities and the stage state machine.
//!
//! A weapon owns an ordered list of abilities. An ability is a chain of
//! stages; each stage plays one animation clip and may carry an attack
//! hitbox that is live during a window of frames. Holding the ability's
//! input when a stage's clip completes advances the chain; releasing it ends
//! the chain and starts the ability's cooldown.

use ahash::AHashSet;
use ashfall_common::{ActorId, ConfigError, SimError, SimResult};
use serde::{Deserialize, Serialize};

use crate::actor::ActorSpec;
use crate::animation::{AnimationCue, AnimationSignals};
use crate::combat::HitProfile;
use crate::hitbox::AttackShape;
use crate::timer::{SimTime, Timer};

/// Inclusive range of frames during which a stage's attack is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameWindow {
    /// First active frame
    pub first: u32,
    /// Last active frame
    pub last: u32,
}

impl FrameWindow {
    /// Creates a window.
    #[must_use]
    pub const fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// Whether `frame` lies inside the window.
    #[must_use]
    pub const fn contains(&self, frame: u32) -> bool {
        frame >= self.first && frame <= self.last
    }
}

/// What a stage does to its wielder's movement.
///
/// Attacks are stationary: every active stage zeroes horizontal velocity.
/// An impulse only overrides that on the stage's first tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum StageMotion {
    /// Horizontal velocity is zeroed every tick
    #[default]
    Hold,
    /// Velocity is set once on the stage's first tick, then held; x follows
    /// the facing
    Impulse {
        /// Forward speed
        vel_x: f32,
        /// Vertical speed (negative = up)
        vel_y: f32,
    },
}

/// An actor created partway through a stage (projectile, summon).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpawn {
    /// Frame at which the spawn happens
    pub frame: u32,
    /// Template of the spawned actor
    pub template: Box<ActorSpec>,
}

/// One step of an ability chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityStage {
    /// Stage name, used for the animation clip
    pub name: String,
    /// Frames in the clip
    pub frame_count: u32,
    /// Duration of each frame
    pub frame_ms: u64,
    /// Attack hitbox shape; `None` for stages that never hit
    #[serde(default)]
    pub attack: Option<AttackShape>,
    /// Frames during which the attack is live
    #[serde(default)]
    pub active_frames: Option<FrameWindow>,
    /// Damage and knockback applied per target
    #[serde(default)]
    pub hit: HitProfile,
    /// Effect on the wielder's movement
    #[serde(default)]
    pub motion: StageMotion,
    /// Actor spawned during the stage
    #[serde(default)]
    pub spawn: Option<StageSpawn>,
}

impl AbilityStage {
    /// A stage that plays a clip and does nothing else.
    #[must_use]
    pub fn new(name: impl Into<String>, frame_count: u32, frame_ms: u64) -> Self {
        Self {
            name: name.into(),
            frame_count,
            frame_ms,
            attack: None,
            active_frames: None,
            hit: HitProfile::default(),
            motion: StageMotion::Hold,
            spawn: None,
        }
    }

    /// Adds an attack live during `window`.
    #[must_use]
    pub fn with_attack(mut self, shape: AttackShape, window: FrameWindow, hit: HitProfile) -> Self {
        self.attack = Some(shape);
        self.active_frames = Some(window);
        self.hit = hit;
        self
    }

    /// Sets the motion.
    #[must_use]
    pub fn with_motion(mut self, motion: StageMotion) -> Self {
        self.motion = motion;
        self
    }

    /// Spawns `template` at `frame`.
    #[must_use]
    pub fn with_spawn(mut self, frame: u32, template: ActorSpec) -> Self {
        self.spawn = Some(StageSpawn {
            frame,
            template: Box::new(template),
        });
        self
    }

    /// Attack shape if the attack is live on `frame`.
    #[must_use]
    pub fn live_attack(&self, frame: u32) -> Option<AttackShape> {
        match (self.attack, self.active_frames) {
            (Some(shape), Some(window)) if window.contains(frame) => Some(shape),
            _ => None,
        }
    }
}

/// A named chain of stages with a shared cooldown and stamina cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    /// Ability name
    pub name: String,
    /// Cooldown started when the chain ends
    #[serde(default)]
    pub cooldown_ms: u64,
    /// Stamina paid when the chain starts
    #[serde(default)]
    pub stamina_cost: f32,
    /// Stages in chain order
    #[serde(default, rename = "stage")]
    pub stages: Vec<AbilityStage>,
}

impl Ability {
    /// Creates an ability with no stages.
    #[must_use]
    pub fn new(name: impl Into<String>, cooldown_ms: u64) -> Self {
        Self {
            name: name.into(),
            cooldown_ms,
            stamina_cost: 0.0,
            stages: Vec::new(),
        }
    }

    /// Appends a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: AbilityStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Sets the stamina cost.
    #[must_use]
    pub fn with_stamina_cost(mut self, cost: f32) -> Self {
        self.stamina_cost = cost;
        self
    }

    /// Checks the stage data for contradictions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidAbility {
            ability: self.name.clone(),
            reason,
        };

        if self.stages.is_empty() {
            return Err(invalid("no stages".into()));
        }
        if self.stamina_cost < 0.0 {
            return Err(invalid("negative stamina cost".into()));
        }
        for stage in &self.stages {
            if stage.frame_count == 0 || stage.frame_ms == 0 {
                return Err(invalid(format!("stage {:?} has an empty clip", stage.name)));
            }
            if let Some(window) = stage.active_frames {
                if window.first > window.last || window.last >= stage.frame_count {
                    return Err(invalid(format!(
                        "stage {:?} active frames {}..={} outside clip of {} frames",
                        stage.name, window.first, window.last, stage.frame_count
                    )));
                }
                if stage.attack.is_none() {
                    return Err(invalid(format!(
                        "stage {:?} has active frames but no attack",
                        stage.name
                    )));
                }
            }
            if let Some(spawn) = &stage.spawn {
                if spawn.frame >= stage.frame_count {
                    return Err(invalid(format!(
                        "stage {:?} spawns on frame {} of {}",
                        stage.name, spawn.frame, stage.frame_count
                    )));
                }
                spawn.template.validate().map_err(|e| {
                    invalid(format!("stage {:?} spawn template: {e}", stage.name))
                })?;
            }
        }
        Ok(())
    }
}

/// Weapon definition as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    /// Weapon name
    pub name: String,
    /// Abilities in slot order
    #[serde(default, rename = "ability")]
    pub abilities: Vec<Ability>,
}

impl WeaponSpec {
    /// Creates a weapon with no abilities.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abilities: Vec::new(),
        }
    }

    /// Appends an ability.
    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Validates every ability.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.abilities.iter().try_for_each(Ability::validate)
    }
}

/// What the weapon is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeaponState {
    /// No ability in progress
    #[default]
    Idle,
    /// Playing a stage
    Active {
        /// Ability index
        ability: usize,
        /// Stage index within the ability
        stage: usize,
    },
}

/// Result of a request to start an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityUse {
    /// The first stage started
    Started,
    /// The ability's cooldown has not run out
    CoolingDown {
        /// Milliseconds left
        remaining_ms: u64,
    },
    /// Another stage is playing
    Busy,
    /// Not enough stamina
    Exhausted,
}

/// Per-tick result of [`Weapon::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageTick {
    /// Nothing playing
    Idle,
    /// A stage is playing on `frame`
    Playing {
        /// Ability index
        ability: usize,
        /// Stage index
        stage: usize,
        /// Current animation frame
        frame: u32,
    },
    /// The previous stage completed and the chain moved on to `stage`
    Advanced {
        /// Ability index
        ability: usize,
        /// New stage index
        stage: usize,
    },
    /// The chain ended and the cooldown started
    Finished {
        /// Ability index
        ability: usize,
    },
}

/// An equipped weapon and its runtime state.
#[derive(Debug, Clone)]
pub struct Weapon {
    name: String,
    abilities: Vec<Ability>,
    cooldowns: Vec<Timer>,
    state: WeaponState,
    stage_started_at: SimTime,
    hit_set: AHashSet<ActorId>,
    spawned: bool,
    motion_applied: bool,
}

impl Weapon {
    /// Builds a weapon with every cooldown ready.
    #[must_use]
    pub fn new(spec: WeaponSpec) -> Self {
        let cooldowns = spec
            .abilities
            .iter()
            .map(|ability| Timer::new(ability.cooldown_ms))
            .collect();
        Self {
            name: spec.name,
            abilities: spec.abilities,
            cooldowns,
            state: WeaponState::Idle,
            stage_started_at: SimTime::ZERO,
            hit_set: AHashSet::new(),
            spawned: false,
            motion_applied: false,
        }
    }

    /// Weapon name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of abilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    /// True if the weapon has no abilities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// Ability at `index`.
    #[must_use]
    pub fn ability(&self, index: usize) -> Option<&Ability> {
        self.abilities.get(index)
    }

    /// Cooldown timer of the ability at `index`.
    #[must_use]
    pub fn cooldown(&self, index: usize) -> Option<&Timer> {
        self.cooldowns.get(index)
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> WeaponState {
        self.state
    }

    /// Whether a stage is playing.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, WeaponState::Active { .. })
    }

    /// When the current stage started.
    #[must_use]
    pub const fn stage_started_at(&self) -> SimTime {
        self.stage_started_at
    }

    /// Stage being played.
    #[must_use]
    pub fn current_stage(&self) -> Option<&AbilityStage> {
        match self.state {
            WeaponState::Idle => None,
            WeaponState::Active { ability, stage } => self
                .abilities
                .get(ability)
                .and_then(|ability| ability.stages.get(stage)),
        }
    }

    /// Targets already struck during the current stage.
    #[must_use]
    pub fn hit_set(&self) -> &AHashSet<ActorId> {
        &self.hit_set
    }

    /// Starts the first stage of an ability.
    ///
    /// Refusals (busy, cooling down, out of stamina) leave the weapon
    /// untouched and are reported as outcomes. Only an index the weapon does
    /// not have is an error.
    pub fn try_start(&mut self, index: usize, now: SimTime, stamina: f32) -> SimResult<AbilityUse> {
        let ability = self
            .abilities
            .get(index)
            .ok_or(SimError::AbilityIndexOutOfRange {
                index,
                len: self.abilities.len(),
            })?;

        if self.is_active() {
            return Ok(AbilityUse::Busy);
        }
        let cooldown = &self.cooldowns[index];
        if !cooldown.is_expired(now) {
            return Ok(AbilityUse::CoolingDown {
                remaining_ms: cooldown.remaining(now),
            });
        }
        if stamina < ability.stamina_cost {
            return Ok(AbilityUse::Exhausted);
        }

        self.enter_stage(index, 0, now);
        Ok(AbilityUse::Started)
    }

    fn enter_stage(&mut self, ability: usize, stage: usize, now: SimTime) {
        self.state = WeaponState::Active { ability, stage };
        self.stage_started_at = now;
        self.hit_set.clear();
        self.spawned = false;
        self.motion_applied = false;
    }

    fn finish(&mut self, ability: usize, now: SimTime) {
        if let Some(cooldown) = self.cooldowns.get_mut(ability) {
            cooldown.start(now);
        }
        self.state = WeaponState::Idle;
        self.hit_set.clear();
    }

    /// Animation cue for the stage being played.
    #[must_use]
    pub fn cue(&self, actor: ActorId, now: SimTime) -> Option<AnimationCue> {
        let WeaponState::Active { ability, stage } = self.state else {
            return None;
        };
        let clip = self.current_stage()?;
        Some(AnimationCue {
            actor,
            ability,
            stage,
            started_at: self.stage_started_at,
            now,
            frame_count: clip.frame_count,
            frame_ms: clip.frame_ms,
        })
    }

    /// Moves the state machine forward one tick.
    ///
    /// A completed stage advances the chain while `held` names this ability
    /// and another stage follows; otherwise the chain ends and the ability's
    /// cooldown starts at `now`.
    pub fn advance(
        &mut self,
        actor: ActorId,
        now: SimTime,
        held: Option<usize>,
        animation: &dyn AnimationSignals,
    ) -> StageTick {
        let Some(cue) = self.cue(actor, now) else {
            return StageTick::Idle;
        };

        if !animation.completed_once(&cue) {
            return StageTick::Playing {
                ability: cue.ability,
                stage: cue.stage,
                frame: animation.current_frame(&cue),
            };
        }

        let chain_len = self.abilities.get(cue.ability).map_or(0, |a| a.stages.len());
        if held == Some(cue.ability) && cue.stage + 1 < chain_len {
            self.enter_stage(cue.ability, cue.stage + 1, now);
            StageTick::Advanced {
                ability: cue.ability,
                stage: cue.stage + 1,
            }
        } else {
            self.finish(cue.ability, now);
            StageTick::Finished {
                ability: cue.ability,
            }
        }
    }

    /// Cuts the current chain short. The cooldown starts as if it had ended.
    ///
    /// Returns `false` if nothing was playing.
    pub fn interrupt(&mut self, now: SimTime) -> bool {
        match self.state {
            WeaponState::Idle => false,
            WeaponState::Active { ability, .. } => {
                self.finish(ability, now);
                true
            },
        }
    }

    /// Records a struck target. Returns `false` if it was already struck
    /// during this stage.
    pub fn register_hit(&mut self, target: ActorId) -> bool {
        self.hit_set.insert(target)
    }

    /// Motion to apply this tick; `None` while idle. Impulses are handed out
    /// once per stage and degrade to [`StageMotion::Hold`] afterwards.
    pub fn take_motion(&mut self) -> Option<StageMotion> {
        let motion = self.current_stage()?.motion;
        match motion {
            StageMotion::Hold => Some(motion),
            StageMotion::Impulse { .. } if self.motion_applied => Some(StageMotion::Hold),
            StageMotion::Impulse { .. } => {
                self.motion_applied = true;
                Some(motion)
            },
        }
    }

    /// Spawn template due on `frame`, handed out once per stage.
    pub fn take_spawn(&mut self, frame: u32) -> Option<ActorSpec> {
        if self.spawned {
            return None;
        }
        let spawn = self.current_stage()?.spawn.as_ref()?;
        if frame < spawn.frame {
            return None;
        }
        let template = (*spawn.template).clone();
        self.spawned = true;
        Some(template)
    }
}
