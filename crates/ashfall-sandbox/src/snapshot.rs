//! JSON snapshots of the world state.

use ashfall_common::{ActorId, Direction};
use ashfall_sim::prelude::*;
use serde::Serialize;

/// One actor as seen from outside the simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorSnapshot {
    /// Handle
    pub id: ActorId,
    /// Kind tag
    pub kind: ActorKind,
    /// Team
    pub side: Side,
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Velocity per tick
    pub velocity: (f32, f32),
    /// Facing
    pub direction: Direction,
    /// Current health
    pub health: f32,
    /// Current stamina
    pub stamina: f32,
    /// Inside an invulnerability window
    pub invulnerable: bool,
    /// Airborne
    pub falling: bool,
    /// Standing on something after the last physics step
    pub grounded: bool,
    /// Pushed out of a wall during the last physics step
    pub on_wall: bool,
    /// Weapon activity, if armed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon: Option<String>,
}

impl ActorSnapshot {
    /// Captures `actor` at `now` with its last resolver contact.
    #[must_use]
    pub fn capture(actor: &Actor, contact: Contact, now: SimTime) -> Self {
        let (x, y) = actor.position();
        Self {
            id: actor.id(),
            kind: actor.kind(),
            side: actor.side(),
            x,
            y,
            velocity: actor.velocity(),
            direction: actor.direction(),
            health: actor.health(),
            stamina: actor.stamina(),
            invulnerable: actor.is_invulnerable(now),
            falling: actor.body().falling,
            grounded: contact.grounded,
            on_wall: contact.wall,
            weapon: actor
                .weapon()
                .map(|weapon| format!("{}: {:?}", weapon.name(), weapon.state())),
        }
    }
}

/// The world at one tick plus the events raised since the last snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    /// Ticks run so far
    pub tick: u64,
    /// Logical time in milliseconds
    pub now_ms: u64,
    /// Live actors in slot order
    pub actors: Vec<ActorSnapshot>,
    /// Events drained from the bus
    pub events: Vec<SimEvent>,
}

impl WorldSnapshot {
    /// Captures every live actor in `world`.
    #[must_use]
    pub fn capture(world: &World, events: Vec<SimEvent>) -> Self {
        let now = world.now();
        Self {
            tick: world.clock().ticks(),
            now_ms: now.as_millis(),
            actors: world
                .iter()
                .map(|actor| {
                    let contact = world.last_contact(actor.id()).unwrap_or_default();
                    ActorSnapshot::capture(actor, contact, now)
                })
                .collect(),
            events,
        }
    }

    /// Serializes to JSON.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
