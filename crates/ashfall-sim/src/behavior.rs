//! Per-species movement and decision policies.
//!
//! A behaviour turns what an actor perceives into an [`Intent`]. The world
//! converts the intent into velocity and ability input, so behaviours never
//! touch physics directly.

use ashfall_common::{ActorId, Direction};
use serde::{Deserialize, Serialize};

use crate::combat::HitProfile;
use crate::timer::{SimTime, Timer};

/// What an actor wants to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Intent {
    /// Horizontal input axis in `[-1, 1]`
    pub move_x: f32,
    /// Jump if grounded
    pub jump: bool,
    /// Ability whose input is held
    pub held_ability: Option<usize>,
    /// Turn to face this way without walking
    #[serde(default)]
    pub face: Option<Direction>,
}

impl Intent {
    /// Walk toward `direction`.
    #[must_use]
    pub fn walk(direction: Direction) -> Self {
        Self {
            move_x: direction.sign(),
            ..Self::default()
        }
    }

    /// Also hold `ability`.
    #[must_use]
    pub const fn holding(mut self, ability: usize) -> Self {
        self.held_ability = Some(ability);
        self
    }
}

/// The closest opposing actor, as seen by a behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    /// Target handle
    pub id: ActorId,
    /// Horizontal offset from the observer's centre to the target's
    pub dx: f32,
    /// Vertical offset from the observer's centre to the target's
    pub dy: f32,
}

impl Sighting {
    /// Straight-line distance.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.dx.hypot(self.dy)
    }
}

/// Inputs to [`Behavior::think`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    /// Tick time
    pub now: SimTime,
    /// Facing
    pub direction: Direction,
    /// Standing on ground
    pub grounded: bool,
    /// Stopped by a wall last tick
    pub blocked: bool,
    /// Nearest live opponent
    pub nearest: Option<Sighting>,
}

/// Movement policy of an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Behavior {
    /// Driven by externally supplied intent
    Controlled {
        /// Walk speed per tick
        speed: f32,
        /// Upward speed of a jump
        jump_velocity: f32,
    },
    /// Walks back and forth, turning at walls and on a timer
    Patrol {
        /// Walk speed per tick
        speed: f32,
        /// Time between turns
        turn_every_ms: u64,
        /// Turn timer
        #[serde(skip)]
        turn: Timer,
    },
    /// Chases and attacks the nearest opponent in sight
    Hunter {
        /// Walk speed per tick
        speed: f32,
        /// How far it can see
        sight_range: f32,
        /// Distance at which it attacks
        attack_range: f32,
        /// Ability index used to attack
        ability: usize,
        /// How long it keeps chasing a target it lost sight of
        #[serde(default = "default_memory_ms")]
        memory_ms: u64,
        /// Last known horizontal offset of the target
        #[serde(skip)]
        last_seen_dx: Option<f32>,
        /// Memory timer
        #[serde(skip)]
        memory: Timer,
    },
    /// Flies straight until it hits something or expires
    Projectile {
        /// Speed per tick along the launch direction
        speed: f32,
        /// Lifetime
        lifetime_ms: u64,
        /// Applied to the first target struck
        hit: HitProfile,
        /// Keeps flying through targets
        #[serde(default)]
        pierce: bool,
        /// Targets already struck
        #[serde(skip)]
        struck: Vec<ActorId>,
        /// Lifetime timer
        #[serde(skip)]
        life: Timer,
    },
    /// Stationary area that hurts every overlapping opponent each tick
    Hazard {
        /// Lifetime
        lifetime_ms: u64,
        /// Applied to overlapping targets
        hit: HitProfile,
        /// Lifetime timer
        #[serde(skip)]
        life: Timer,
    },
}

const fn default_memory_ms() -> u64 {
    1500
}

impl Default for Behavior {
    fn default() -> Self {
        Self::Controlled {
            speed: 3.0,
            jump_velocity: 12.0,
        }
    }
}

impl Behavior {
    /// Patrol with the given speed and turn interval.
    #[must_use]
    pub const fn patrol(speed: f32, turn_every_ms: u64) -> Self {
        Self::Patrol {
            speed,
            turn_every_ms,
            turn: Timer::new(turn_every_ms),
        }
    }

    /// Hunter with the given ranges.
    #[must_use]
    pub const fn hunter(speed: f32, sight_range: f32, attack_range: f32, ability: usize) -> Self {
        Self::Hunter {
            speed,
            sight_range,
            attack_range,
            ability,
            memory_ms: default_memory_ms(),
            last_seen_dx: None,
            memory: Timer::new(default_memory_ms()),
        }
    }

    /// Projectile with the given flight parameters.
    #[must_use]
    pub const fn projectile(speed: f32, lifetime_ms: u64, hit: HitProfile) -> Self {
        Self::Projectile {
            speed,
            lifetime_ms,
            hit,
            pierce: false,
            struck: Vec::new(),
            life: Timer::new(lifetime_ms),
        }
    }

    /// Hazard with the given lifetime.
    #[must_use]
    pub const fn hazard(lifetime_ms: u64, hit: HitProfile) -> Self {
        Self::Hazard {
            lifetime_ms,
            hit,
            life: Timer::new(lifetime_ms),
        }
    }

    /// Walk speed applied to the intent's input axis.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        match self {
            Self::Controlled { speed, .. }
            | Self::Patrol { speed, .. }
            | Self::Hunter { speed, .. } => *speed,
            Self::Projectile { .. } | Self::Hazard { .. } => 0.0,
        }
    }

    /// Upward jump speed, for behaviours that can jump.
    #[must_use]
    pub const fn jump_velocity(&self) -> Option<f32> {
        match self {
            Self::Controlled { jump_velocity, .. } => Some(*jump_velocity),
            _ => None,
        }
    }

    /// Whether the world drives velocity from the intent.
    #[must_use]
    pub const fn steers(&self) -> bool {
        matches!(
            self,
            Self::Controlled { .. } | Self::Patrol { .. } | Self::Hunter { .. }
        )
    }

    /// Hit carried by contact-damage behaviours.
    #[must_use]
    pub const fn contact_hit(&self) -> Option<&HitProfile> {
        match self {
            Self::Projectile { hit, .. } | Self::Hazard { hit, .. } => Some(hit),
            _ => None,
        }
    }

    /// Starts timers that run from the moment of spawning.
    pub fn on_spawn(&mut self, now: SimTime) {
        match self {
            Self::Patrol {
                turn,
                turn_every_ms,
                ..
            } => {
                turn.set_duration(*turn_every_ms);
                turn.start(now);
            },
            Self::Hunter {
                memory, memory_ms, ..
            } => memory.set_duration(*memory_ms),
            Self::Projectile {
                life, lifetime_ms, ..
            }
            | Self::Hazard {
                life, lifetime_ms, ..
            } => {
                life.set_duration(*lifetime_ms);
                life.start(now);
            },
            Self::Controlled { .. } => {},
        }
    }

    /// Whether a limited-lifetime actor has run out of time.
    #[must_use]
    pub fn expired(&self, now: SimTime) -> bool {
        match self {
            Self::Projectile { life, .. } | Self::Hazard { life, .. } => {
                life.is_started() && life.is_expired(now)
            },
            _ => false,
        }
    }

    /// Decides this tick's intent. `current` is the externally supplied
    /// intent, which only [`Behavior::Controlled`] honours.
    pub fn think(&mut self, current: Intent, view: &Perception) -> Intent {
        match self {
            Self::Controlled { .. } => current,
            Self::Patrol { turn, .. } => {
                let mut heading = view.direction;
                if view.blocked || turn.is_expired(view.now) {
                    heading = heading.flipped();
                    turn.start(view.now);
                }
                Intent::walk(heading)
            },
            Self::Hunter {
                sight_range,
                attack_range,
                ability,
                last_seen_dx,
                memory,
                ..
            } => {
                let visible = view.nearest.filter(|s| s.distance() <= *sight_range);
                if let Some(sighting) = visible {
                    *last_seen_dx = Some(sighting.dx);
                    memory.start(view.now);
                    let toward = Direction::from_velocity(sighting.dx).unwrap_or(view.direction);
                    if sighting.dx.abs() <= *attack_range && sighting.dy.abs() <= *attack_range {
                        return Intent {
                            face: Some(toward),
                            ..Intent::default()
                        }
                        .holding(*ability);
                    }
                    return Intent::walk(toward);
                }
                match *last_seen_dx {
                    Some(dx) if !memory.is_expired(view.now) => {
                        Intent::walk(Direction::from_velocity(dx).unwrap_or(view.direction))
                    },
                    _ => {
                        *last_seen_dx = None;
                        Intent::default()
                    },
                }
            },
            Self::Projectile { .. } | Self::Hazard { .. } => Intent::default(),
        }
    }
}
