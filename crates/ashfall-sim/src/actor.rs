//! Actors: the dynamic entities of the simulation.
//!
//! One record type covers players, enemies, summons, projectiles and hazards.
//! Species differences live in the pluggable [`Behavior`], the optional
//! [`Weapon`] and the list of [`DeathEffect`]s rather than in subclasses.

use ashfall_common::{ActorId, Direction, Rect, SimError, SimResult};
use serde::{Deserialize, Serialize};

use crate::ability::{AbilityUse, Weapon, WeaponSpec};
use crate::behavior::{Behavior, Intent};
use crate::physics::Body;
use crate::timer::{SimTime, Timer};

/// Which team an actor fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Player and friendly summons
    Allies,
    /// Enemies
    Hostiles,
}

impl Side {
    /// The side this one attacks.
    #[must_use]
    pub const fn opposing(self) -> Self {
        match self {
            Self::Allies => Self::Hostiles,
            Self::Hostiles => Self::Allies,
        }
    }
}

/// Kind tag used by targeting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// Player character
    Player,
    /// Hostile creature
    Enemy,
    /// Friendly creature summoned by the player
    Summon,
    /// Fired missile
    Projectile,
    /// Area effect such as an explosion
    Hazard,
}

impl ActorKind {
    /// Side this kind fights for by default.
    #[must_use]
    pub const fn default_side(self) -> Side {
        match self {
            Self::Enemy => Side::Hostiles,
            _ => Side::Allies,
        }
    }

    /// Whether attacks can land on this kind.
    #[must_use]
    pub const fn is_targetable(self) -> bool {
        matches!(self, Self::Player | Self::Enemy | Self::Summon)
    }
}

/// Whether a damaging hit opens an invulnerability window on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Invulnerability {
    /// Target becomes invulnerable for this many milliseconds
    Grant(u64),
    /// No window; the same source may hit again next tick
    Withhold,
}

impl Invulnerability {
    /// Maps a raw duration, treating zero as [`Invulnerability::Withhold`].
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::Withhold
        } else {
            Self::Grant(ms)
        }
    }
}

impl Default for Invulnerability {
    fn default() -> Self {
        Self::Withhold
    }
}

/// A single application of damage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Damage {
    /// Health removed
    pub amount: f32,
    /// Window granted on success
    pub invulnerability: Invulnerability,
}

impl Damage {
    /// Damage that opens an invulnerability window.
    #[must_use]
    pub const fn windowed(amount: f32, invulnerability_ms: u64) -> Self {
        Self {
            amount,
            invulnerability: Invulnerability::from_millis(invulnerability_ms),
        }
    }

    /// Damage that never opens a window (damage over time, explosions).
    #[must_use]
    pub const fn continuous(amount: f32) -> Self {
        Self {
            amount,
            invulnerability: Invulnerability::Withhold,
        }
    }
}

/// Result of [`Actor::take_damage`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Target was invulnerable or already dead; nothing changed
    Ignored,
    /// Damage landed and the target survived
    Applied {
        /// Health actually removed
        dealt: f32,
    },
    /// Damage landed and reduced health to zero
    Killed {
        /// Health actually removed
        dealt: f32,
    },
}

impl DamageOutcome {
    /// Health actually removed.
    #[must_use]
    pub fn dealt(&self) -> f32 {
        match self {
            Self::Ignored => 0.0,
            Self::Applied { dealt } | Self::Killed { dealt } => *dealt,
        }
    }
}

/// Result of [`Actor::apply_knockback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnockbackOutcome {
    /// Target was invulnerable or dead; velocity untouched
    Ignored,
    /// Velocity overwritten
    Applied {
        /// An in-progress attack was cut short
        interrupted: bool,
    },
}

/// Something that happens when an actor dies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "effect")]
pub enum DeathEffect {
    /// Leave a currency pickup
    DropCurrency {
        /// Amount of currency
        amount: u32,
    },
    /// Spawn an explosion hazard centred on the corpse
    Explode {
        /// Square half-extent of the blast
        radius: f32,
        /// Damage per tick to anything caught inside
        damage: f32,
        /// How long the blast lingers
        lifetime_ms: u64,
    },
    /// Play a named effect clip on the corpse
    SpawnEffect {
        /// Clip name
        name: String,
    },
}

/// Template an actor is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSpec {
    /// Kind tag
    pub kind: ActorKind,
    /// Team; defaults from the kind
    #[serde(default)]
    pub side: Option<Side>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Maximum health
    pub max_health: u32,
    /// Maximum stamina
    #[serde(default)]
    pub max_stamina: u32,
    /// Gravity multiplier
    #[serde(default = "default_gravity_scale")]
    pub gravity_scale: f32,
    /// Movement policy
    #[serde(default)]
    pub behavior: Behavior,
    /// Equipped weapon
    #[serde(default)]
    pub weapon: Option<WeaponSpec>,
    /// On-death effects
    #[serde(default)]
    pub death_effects: Vec<DeathEffect>,
}

fn default_gravity_scale() -> f32 {
    1.0
}

impl ActorSpec {
    /// Creates a spec with no weapon and no death effects.
    #[must_use]
    pub fn new(kind: ActorKind, width: u32, height: u32, max_health: u32) -> Self {
        Self {
            kind,
            side: None,
            width,
            height,
            max_health,
            max_stamina: 0,
            gravity_scale: 1.0,
            behavior: Behavior::default(),
            weapon: None,
            death_effects: Vec::new(),
        }
    }

    /// Sets the behaviour.
    #[must_use]
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Equips a weapon.
    #[must_use]
    pub fn with_weapon(mut self, weapon: WeaponSpec) -> Self {
        self.weapon = Some(weapon);
        self
    }

    /// Sets the stamina pool.
    #[must_use]
    pub fn with_stamina(mut self, max_stamina: u32) -> Self {
        self.max_stamina = max_stamina;
        self
    }

    /// Overrides the side.
    #[must_use]
    pub fn on_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    /// Sets the gravity multiplier.
    #[must_use]
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Adds an on-death effect.
    #[must_use]
    pub fn with_death_effect(mut self, effect: DeathEffect) -> Self {
        self.death_effects.push(effect);
        self
    }

    /// Checks the weapon, including any spawn templates it carries, and that
    /// a hunter's ability index exists on it.
    pub fn validate(&self) -> SimResult<()> {
        let abilities = match &self.weapon {
            Some(weapon) => {
                weapon.validate()?;
                weapon.abilities.len()
            },
            None => 0,
        };
        if let Behavior::Hunter { ability, .. } = self.behavior {
            if ability >= abilities {
                return Err(SimError::AbilityIndexOutOfRange {
                    index: ability,
                    len: abilities,
                });
            }
        }
        Ok(())
    }
}

/// A simulated entity.
///
/// Invariants: `0 <= health <= max_health`, `0 <= stamina <= max_stamina`,
/// and an invulnerable actor always has a running invulnerability timer.
#[derive(Debug, Clone)]
pub struct Actor {
    id: ActorId,
    kind: ActorKind,
    side: Side,
    owner: Option<ActorId>,
    body: Body,
    health: f32,
    max_health: u32,
    stamina: f32,
    max_stamina: u32,
    invulnerable: bool,
    invulnerability: Timer,
    dead: bool,
    weapon: Option<Weapon>,
    behavior: Behavior,
    death_effects: Vec<DeathEffect>,
    intent: Intent,
}

impl Actor {
    /// Builds an actor from a spec at the given spawn point.
    #[must_use]
    pub fn from_spec(id: ActorId, spec: ActorSpec, x: f32, y: f32) -> Self {
        let body = Body::new(x, y, spec.width, spec.height).with_gravity_scale(spec.gravity_scale);
        Self {
            id,
            kind: spec.kind,
            side: spec.side.unwrap_or_else(|| spec.kind.default_side()),
            owner: None,
            body,
            health: spec.max_health as f32,
            max_health: spec.max_health,
            stamina: spec.max_stamina as f32,
            max_stamina: spec.max_stamina,
            invulnerable: false,
            invulnerability: Timer::default(),
            dead: false,
            weapon: spec.weapon.map(Weapon::new),
            behavior: spec.behavior,
            death_effects: spec.death_effects,
            intent: Intent::default(),
        }
    }

    /// Arena handle.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Kind tag.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Team.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Actor that fired or summoned this one.
    #[must_use]
    pub const fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: ActorId) {
        self.owner = Some(owner);
    }

    pub(crate) fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    /// Kinematic state.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    pub(crate) fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Current bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.body.bounds()
    }

    /// Position (top-left).
    #[must_use]
    pub fn position(&self) -> (f32, f32) {
        (self.body.x, self.body.y)
    }

    /// Velocity per tick.
    #[must_use]
    pub fn velocity(&self) -> (f32, f32) {
        (self.body.vel_x, self.body.vel_y)
    }

    /// Facing.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.body.direction
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Current stamina.
    #[must_use]
    pub const fn stamina(&self) -> f32 {
        self.stamina
    }

    /// Maximum stamina.
    #[must_use]
    pub const fn max_stamina(&self) -> u32 {
        self.max_stamina
    }

    /// Whether health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Raw invulnerability flag, as last updated by the tick.
    #[must_use]
    pub const fn invulnerable_flag(&self) -> bool {
        self.invulnerable
    }

    /// Whether the actor is protected at `now`.
    #[must_use]
    pub fn is_invulnerable(&self, now: SimTime) -> bool {
        self.invulnerable && !self.invulnerability.is_expired(now)
    }

    /// Invulnerability timer.
    #[must_use]
    pub const fn invulnerability(&self) -> &Timer {
        &self.invulnerability
    }

    /// Equipped weapon.
    #[must_use]
    pub const fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    pub(crate) fn weapon_mut(&mut self) -> Option<&mut Weapon> {
        self.weapon.as_mut()
    }

    /// Movement policy.
    #[must_use]
    pub const fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut Behavior {
        &mut self.behavior
    }

    /// On-death effects.
    #[must_use]
    pub fn death_effects(&self) -> &[DeathEffect] {
        &self.death_effects
    }

    /// Latest intent from the controller.
    #[must_use]
    pub const fn intent(&self) -> &Intent {
        &self.intent
    }

    /// Replaces the intent, rejecting held ability indices the weapon lacks.
    pub fn set_intent(&mut self, intent: Intent) -> SimResult<()> {
        if let Some(index) = intent.held_ability {
            let len = self.weapon.as_ref().map_or(0, Weapon::len);
            if index >= len {
                return Err(SimError::AbilityIndexOutOfRange { index, len });
            }
        }
        self.intent = intent;
        Ok(())
    }

    pub(crate) fn replace_intent(&mut self, intent: Intent) {
        self.intent = intent;
    }

    /// Sets health, clamped into `[0, max_health]`. Reaching zero kills.
    /// NaN counts as zero.
    pub fn set_health(&mut self, health: f32) {
        let health = if health.is_nan() { 0.0 } else { health };
        self.health = health.clamp(0.0, self.max_health as f32);
        if self.health <= 0.0 {
            self.dead = true;
        }
    }

    /// Restores health up to the maximum. Dead actors stay dead.
    pub fn heal(&mut self, amount: f32) {
        if !self.dead {
            self.set_health(self.health + amount.max(0.0));
        }
    }

    /// Sets stamina, clamped into `[0, max_stamina]`.
    pub fn set_stamina(&mut self, stamina: f32) {
        self.stamina = stamina.clamp(0.0, self.max_stamina as f32);
    }

    /// Removes damage unless the actor is invulnerable or dead.
    ///
    /// A [`Invulnerability::Grant`] hit (re)starts the invulnerability timer
    /// with that hit's duration.
    pub fn take_damage(&mut self, damage: Damage, now: SimTime) -> DamageOutcome {
        if self.dead || self.is_invulnerable(now) {
            return DamageOutcome::Ignored;
        }

        let before = self.health;
        self.set_health(before - damage.amount.max(0.0));
        let dealt = before - self.health;

        if let Invulnerability::Grant(ms) = damage.invulnerability {
            self.invulnerable = true;
            self.invulnerability.set_duration(ms);
            self.invulnerability.start(now);
        }

        if self.dead {
            DamageOutcome::Killed { dealt }
        } else {
            DamageOutcome::Applied { dealt }
        }
    }

    /// Overwrites velocity with a knockback unless invulnerable or dead.
    ///
    /// Knockback lasts until the actor lands and cuts short any attack it was
    /// performing.
    pub fn apply_knockback(&mut self, vel_x: f32, vel_y: f32, now: SimTime) -> KnockbackOutcome {
        if self.dead || self.is_invulnerable(now) {
            return KnockbackOutcome::Ignored;
        }

        self.body.knocked_back = true;
        self.body.vel_x = vel_x;
        self.body.vel_y = vel_y;

        let interrupted = self
            .weapon
            .as_mut()
            .is_some_and(|weapon| weapon.interrupt(now));
        KnockbackOutcome::Applied { interrupted }
    }

    /// Starts an ability on the equipped weapon, paying its stamina cost.
    pub fn use_ability(&mut self, index: usize, now: SimTime) -> SimResult<AbilityUse> {
        let stamina = self.stamina;
        let weapon = self.weapon.as_mut().ok_or(SimError::NoWeapon(self.id))?;
        let outcome = weapon.try_start(index, now, stamina)?;
        if outcome == AbilityUse::Started {
            let cost = weapon.ability(index).map_or(0.0, |ability| ability.stamina_cost);
            self.set_stamina(stamina - cost);
        }
        Ok(outcome)
    }

    /// Clears an invulnerability window whose timer has run out.
    pub fn expire_invulnerability(&mut self, now: SimTime) {
        if self.invulnerable && self.invulnerability.is_expired(now) {
            self.invulnerable = false;
        }
    }

    /// Regenerates stamina by `amount`.
    pub fn regenerate_stamina(&mut self, amount: f32) {
        self.set_stamina(self.stamina + amount);
    }

    /// Marks the actor dead without damage (lifetime expiry, despawn).
    pub fn kill(&mut self) {
        self.health = 0.0;
        self.dead = true;
    }
}
