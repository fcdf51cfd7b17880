//! Simulation output: the entity sink and the event bus.

use ashfall_common::ActorId;
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::actor::ActorKind;

/// Presentation layer a spawned entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Players, enemies, summons
    Actors,
    /// Projectiles and hazards
    Projectiles,
    /// Collectibles
    Pickups,
    /// Purely visual effects
    Effects,
}

/// A collectible left in the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pickup {
    /// Currency drop
    Currency {
        /// Amount
        amount: u32,
    },
}

/// A visual effect with no simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Floating number showing damage dealt
    DamageNumber {
        /// Damage dealt
        amount: f32,
    },
    /// Named effect clip
    Named {
        /// Clip name
        name: String,
    },
}

/// Something the presentation layer should create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpawnRequest {
    /// An actor entered the arena
    Actor {
        /// Arena handle
        id: ActorId,
        /// Kind tag
        kind: ActorKind,
        /// Spawn x
        x: f32,
        /// Spawn y
        y: f32,
    },
    /// A pickup was dropped
    Pickup {
        /// What was dropped
        pickup: Pickup,
        /// World x
        x: f32,
        /// World y
        y: f32,
    },
    /// An effect should play
    Effect {
        /// Effect to play
        effect: Effect,
        /// World x
        x: f32,
        /// World y
        y: f32,
    },
}

/// Event types emitted by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Presentation entity requested
    SpawnRequested {
        /// Request
        request: SpawnRequest,
        /// Layer to place it on
        layer: Layer,
    },
    /// Actor removed from the arena
    Despawned {
        /// Actor handle
        id: ActorId,
    },
    /// Health was removed
    Damaged {
        /// Target
        target: ActorId,
        /// Source, if an actor
        source: Option<ActorId>,
        /// Amount removed
        amount: f32,
    },
    /// Knockback velocity was imposed
    KnockedBack {
        /// Target
        target: ActorId,
        /// An attack was interrupted
        interrupted: bool,
    },
    /// Health reached zero
    Died {
        /// Actor handle
        id: ActorId,
        /// Kind tag
        kind: ActorKind,
    },
    /// An ability stage started and its clip must restart from frame zero
    AnimationRestart {
        /// Performing actor
        actor: ActorId,
        /// Ability index
        ability: usize,
        /// Stage index
        stage: usize,
    },
    /// An actor touched down on ground
    Landed {
        /// Actor handle
        id: ActorId,
    },
}

/// Receiver of everything the simulation creates, destroys or reports.
pub trait EntitySink {
    /// A presentation entity should be created on `layer`.
    fn spawn(&mut self, request: SpawnRequest, layer: Layer);

    /// An actor left the arena.
    fn despawn(&mut self, id: ActorId);

    /// Any other notification. Ignored by default.
    fn notify(&mut self, _event: SimEvent) {}
}

/// Bounded event channel. Events published while it is full are dropped.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<SimEvent>,
    receiver: Receiver<SimEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Publishes an event. Returns `false` if the bus was full.
    pub fn publish(&self, event: SimEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(err) => {
                warn!("Event bus full, dropping {:?}", err.into_inner());
                false
            },
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<SimEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

impl EntitySink for EventBus {
    fn spawn(&mut self, request: SpawnRequest, layer: Layer) {
        self.publish(SimEvent::SpawnRequested { request, layer });
    }

    fn despawn(&mut self, id: ActorId) {
        self.publish(SimEvent::Despawned { id });
    }

    fn notify(&mut self, event: SimEvent) {
        self.publish(event);
    }
}
