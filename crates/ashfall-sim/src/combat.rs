//! Damage and knockback pipeline.
//!
//! Every successful hit goes through [`apply_hit`]: knockback first, then
//! damage. Knockback is checked against the invulnerability window that
//! existed before the hit, so the window opened by this hit's damage never
//! cancels its own knockback.

use ashfall_common::{ActorId, Direction};
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, Damage, DamageOutcome, Invulnerability, KnockbackOutcome};
use crate::timer::SimTime;

/// Damage and knockback carried by an attack, as authored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HitProfile {
    /// Health removed
    pub damage: f32,
    /// Horizontal knockback speed, pointed away from the attacker
    pub knockback_x: f32,
    /// Vertical knockback speed (negative = up)
    pub knockback_y: f32,
    /// Window granted on the target, authored as `invulnerability_ms`
    #[serde(rename = "invulnerability_ms", with = "invulnerability_ms")]
    pub invulnerability: Invulnerability,
}

/// `invulnerability_ms = 0` in data means no window.
mod invulnerability_ms {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::actor::Invulnerability;

    pub fn serialize<S: Serializer>(value: &Invulnerability, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Invulnerability::Grant(ms) => serializer.serialize_u64(*ms),
            Invulnerability::Withhold => serializer.serialize_u64(0),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Invulnerability, D::Error> {
        u64::deserialize(deserializer).map(Invulnerability::from_millis)
    }
}

impl HitProfile {
    /// Creates a profile that grants no invulnerability.
    #[must_use]
    pub const fn new(damage: f32, knockback_x: f32, knockback_y: f32) -> Self {
        Self {
            damage,
            knockback_x,
            knockback_y,
            invulnerability: Invulnerability::Withhold,
        }
    }

    /// Sets the invulnerability granted on hit.
    #[must_use]
    pub const fn with_invulnerability(mut self, invulnerability: Invulnerability) -> Self {
        self.invulnerability = invulnerability;
        self
    }

    /// Whether the hit moves its target.
    #[must_use]
    pub fn has_knockback(&self) -> bool {
        self.knockback_x != 0.0 || self.knockback_y != 0.0
    }

    /// Damage component.
    #[must_use]
    pub const fn damage(&self) -> Damage {
        Damage {
            amount: self.damage,
            invulnerability: self.invulnerability,
        }
    }
}

/// One resolved contact between a source and a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Attacking actor
    pub source: ActorId,
    /// Direction the knockback pushes toward
    pub push: Direction,
    /// Authored values
    pub profile: HitProfile,
}

impl Hit {
    /// Creates a hit pushing toward `push`.
    #[must_use]
    pub const fn new(source: ActorId, push: Direction, profile: HitProfile) -> Self {
        Self {
            source,
            push,
            profile,
        }
    }
}

/// What a hit did to its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    /// Knockback result; `None` if the hit carried none
    pub knockback: Option<KnockbackOutcome>,
    /// Damage result
    pub damage: DamageOutcome,
}

impl HitReport {
    /// Whether anything changed on the target.
    #[must_use]
    pub fn landed(&self) -> bool {
        !matches!(self.damage, DamageOutcome::Ignored)
            || matches!(self.knockback, Some(KnockbackOutcome::Applied { .. }))
    }
}

/// Applies `hit` to `target` at `now`.
pub fn apply_hit(target: &mut Actor, hit: &Hit, now: SimTime) -> HitReport {
    let knockback = hit.profile.has_knockback().then(|| {
        target.apply_knockback(
            hit.profile.knockback_x * hit.push.sign(),
            hit.profile.knockback_y,
            now,
        )
    });
    let damage = target.take_damage(hit.profile.damage(), now);
    HitReport { knockback, damage }
}

/// Direction that pushes `target` away from `source`, horizontally.
///
/// Ties break toward `fallback`.
#[must_use]
pub fn push_away(source_center_x: f32, target_center_x: f32, fallback: Direction) -> Direction {
    if target_center_x > source_center_x {
        Direction::Right
    } else if target_center_x < source_center_x {
        Direction::Left
    } else {
        fallback
    }
}
