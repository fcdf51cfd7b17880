//! Actor arena and the simulation step.
//!
//! Actors live in slots addressed by generational [`ActorId`]s. Nothing is
//! inserted or removed while a step iterates: spawns and removals produced
//! during the step are queued and applied in a compaction pass at its end.
//!
//! A step runs, in order: behaviours, physics and collision, abilities and
//! their hits, projectile and hazard contact, deaths, compaction, queued
//! spawns. The clock is sampled once at the start and every comparison in
//! the step uses that instant.

use ahash::AHashSet;
use ashfall_common::{ActorId, Direction, Rect, SimError, SimResult};
use tracing::{debug, trace, warn};

use crate::ability::{AbilityUse, StageMotion, StageTick};
use crate::actor::{
    Actor, ActorKind, ActorSpec, Damage, DamageOutcome, DeathEffect, KnockbackOutcome, Side,
};
use crate::animation::AnimationSignals;
use crate::behavior::{Behavior, Intent, Perception, Sighting};
use crate::collision::Contact;
use crate::combat::{apply_hit, push_away, Hit, HitProfile, HitReport};
use crate::config::SimConfig;
use crate::events::{Effect, EntitySink, Layer, Pickup, SimEvent, SpawnRequest};
use crate::hitbox::attack_box;
use crate::physics::{self, PhysicsConfig};
use crate::tile::GeometrySource;
use crate::timer::{SimClock, SimTime};

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    actor: Option<Actor>,
    contact: Contact,
}

/// An actor waiting for the end-of-step spawn pass.
#[derive(Debug, Clone)]
struct PendingSpawn {
    spec: ActorSpec,
    x: f32,
    y: f32,
    owner: Option<ActorId>,
    side: Option<Side>,
    facing: Direction,
}

/// Counters for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Time the step ran at
    pub now: SimTime,
    /// Actors added by the step
    pub spawned: usize,
    /// Actors removed by the step
    pub removed: usize,
}

/// The set of live actors and the clock that drives them.
#[derive(Debug)]
pub struct World {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
    clock: SimClock,
    physics: PhysicsConfig,
    stamina_regen: f32,
    pending_spawns: Vec<PendingSpawn>,
    pending_removals: Vec<ActorId>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(&SimConfig::default())
    }
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            clock: SimClock::new(config.tick_ms),
            physics: config.physics,
            stamina_regen: config.stamina_regen_per_tick,
            pending_spawns: Vec::new(),
            pending_removals: Vec::new(),
        }
    }

    /// Current logical time.
    #[must_use]
    pub const fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// The clock.
    #[must_use]
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Physics tuning in use.
    #[must_use]
    pub const fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    /// Number of live actors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// True if the arena holds no actors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Adds an actor immediately.
    ///
    /// Fails if the template's weapon data is invalid or its behaviour names an
    /// ability the weapon lacks.
    pub fn spawn(&mut self, spec: ActorSpec, x: f32, y: f32) -> SimResult<ActorId> {
        spec.validate()?;
        let id = self.insert(spec, x, y);
        debug!("Spawned actor {id} at ({x}, {y})");
        Ok(id)
    }

    /// Removes an actor immediately. Not for use during a step.
    pub fn remove(&mut self, id: ActorId) -> SimResult<Actor> {
        let slot = self
            .slot_mut(id)
            .ok_or(SimError::UnknownActor(id))?;
        let actor = slot.actor.take().ok_or(SimError::UnknownActor(id))?;
        slot.generation = id.next_generation().generation();
        slot.contact = Contact::default();
        self.free_list.push(id.index());
        self.live -= 1;
        debug!("Removed actor {id}");
        Ok(actor)
    }

    fn insert(&mut self, spec: ActorSpec, x: f32, y: f32) -> ActorId {
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                u32::try_from(self.slots.len() - 1).unwrap_or(u32::MAX)
            },
        };
        let now = self.clock.now();
        let slot = &mut self.slots[index as usize];
        let id = ActorId::new(index, slot.generation);
        let mut actor = Actor::from_spec(id, spec, x, y);
        actor.behavior_mut().on_spawn(now);
        slot.actor = Some(actor);
        slot.contact = Contact::default();
        self.live += 1;
        id
    }

    fn slot(&self, id: ActorId) -> Option<&Slot> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
    }

    fn slot_mut(&mut self, id: ActorId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
    }

    /// Looks up an actor.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.slot(id).and_then(|slot| slot.actor.as_ref())
    }

    fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.slot_mut(id).and_then(|slot| slot.actor.as_mut())
    }

    /// Looks up an actor, failing on stale handles.
    pub fn actor(&self, id: ActorId) -> SimResult<&Actor> {
        self.get(id).ok_or(SimError::UnknownActor(id))
    }

    fn actor_mut(&mut self, id: ActorId) -> SimResult<&mut Actor> {
        self.get_mut(id).ok_or(SimError::UnknownActor(id))
    }

    /// Contact summary from the actor's last physics step.
    #[must_use]
    pub fn last_contact(&self, id: ActorId) -> Option<Contact> {
        self.slot(id)
            .filter(|slot| slot.actor.is_some())
            .map(|slot| slot.contact)
    }

    /// Every live actor, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.slots.iter().filter_map(|slot| slot.actor.as_ref())
    }

    /// Handles of every live actor, in slot order.
    #[must_use]
    pub fn ids(&self) -> Vec<ActorId> {
        self.iter().map(Actor::id).collect()
    }

    /// Living, targetable actors on `side`.
    pub fn live_targets(&self, side: Side) -> impl Iterator<Item = &Actor> {
        self.iter().filter(move |actor| {
            actor.side() == side && actor.kind().is_targetable() && !actor.is_dead()
        })
    }

    /// Replaces an actor's intent.
    pub fn set_intent(&mut self, id: ActorId, intent: Intent) -> SimResult<()> {
        self.actor_mut(id)?.set_intent(intent)
    }

    /// Starts an ability at the current time.
    pub fn use_ability(&mut self, id: ActorId, index: usize) -> SimResult<AbilityUse> {
        let now = self.clock.now();
        self.actor_mut(id)?.use_ability(index, now)
    }

    /// Damages an actor at the current time.
    pub fn take_damage(&mut self, id: ActorId, damage: Damage) -> SimResult<DamageOutcome> {
        let now = self.clock.now();
        Ok(self.actor_mut(id)?.take_damage(damage, now))
    }

    /// Knocks an actor back at the current time.
    pub fn apply_knockback(
        &mut self,
        id: ActorId,
        vel_x: f32,
        vel_y: f32,
    ) -> SimResult<KnockbackOutcome> {
        let now = self.clock.now();
        Ok(self.actor_mut(id)?.apply_knockback(vel_x, vel_y, now))
    }

    /// Advances the simulation one tick.
    pub fn step(
        &mut self,
        geometry: &dyn GeometrySource,
        animation: &dyn AnimationSignals,
        sink: &mut dyn EntitySink,
    ) -> StepReport {
        let now = self.clock.advance();
        let ids = self.ids();
        trace!("Step at {}ms over {} actors", now.as_millis(), ids.len());

        for &id in &ids {
            self.think(id, now);
        }
        for &id in &ids {
            self.move_actor(id, geometry, now, sink);
        }
        for &id in &ids {
            self.run_weapon(id, now, animation, sink);
        }
        for &id in &ids {
            self.run_contact_damage(id, now, sink);
        }
        for &id in &ids {
            self.handle_death(id, sink);
        }

        let removed = self.compact(sink);
        let spawned = self.flush_spawns(now, sink);
        StepReport {
            now,
            spawned,
            removed,
        }
    }

    fn nearest_opponent(&self, observer: &Actor) -> Option<Sighting> {
        let bounds = observer.bounds();
        self.live_targets(observer.side().opposing())
            .map(|target| {
                let other = target.bounds();
                Sighting {
                    id: target.id(),
                    dx: other.center_x() - bounds.center_x(),
                    dy: other.center_y() - bounds.center_y(),
                }
            })
            .min_by(|a, b| a.distance().total_cmp(&b.distance()))
    }

    fn think(&mut self, id: ActorId, now: SimTime) {
        let Some(slot) = self.slot(id) else { return };
        let Some(actor) = slot.actor.as_ref() else {
            return;
        };
        if actor.is_dead() {
            return;
        }

        let nearest = match actor.behavior() {
            Behavior::Hunter { .. } => self.nearest_opponent(actor),
            _ => None,
        };
        let view = Perception {
            now,
            direction: actor.direction(),
            grounded: actor.body().is_grounded(),
            blocked: slot.contact.wall,
            nearest,
        };
        let current = *actor.intent();

        let Some(actor) = self.get_mut(id) else { return };
        let intent = actor.behavior_mut().think(current, &view);
        if !actor.behavior().steers() {
            return;
        }
        actor.replace_intent(intent);

        let rooted = actor.weapon().is_some_and(|weapon| weapon.is_active());
        let speed = actor.behavior().speed();
        let jump = actor.behavior().jump_velocity();
        let body = actor.body_mut();
        if body.knocked_back {
            return;
        }
        if !rooted {
            body.vel_x = intent.move_x.clamp(-1.0, 1.0) * speed;
        }
        if let Some(direction) = intent.face {
            body.direction = direction;
        }
        if let (true, Some(jump_velocity)) = (intent.jump, jump) {
            if body.is_grounded() {
                body.vel_y = -jump_velocity;
                body.jumping = true;
                body.falling = true;
            }
        }
    }

    fn move_actor(
        &mut self,
        id: ActorId,
        geometry: &dyn GeometrySource,
        now: SimTime,
        sink: &mut dyn EntitySink,
    ) {
        let config = self.physics;
        let regen = self.stamina_regen;
        let Some(slot) = self.slot_mut(id) else { return };
        let Some(actor) = slot.actor.as_mut() else {
            return;
        };
        if actor.is_dead() || actor.kind() == ActorKind::Hazard {
            return;
        }

        let was_grounded = slot.contact.grounded;
        let is_projectile = actor.kind() == ActorKind::Projectile;
        let tiles = geometry.nearby_tiles(&actor.bounds());
        let contact = physics::step_body(actor.body_mut(), &tiles, &config);
        actor.expire_invulnerability(now);
        actor.regenerate_stamina(regen);
        slot.contact = contact;

        if is_projectile {
            if contact.wall || contact.landed || contact.ceiling || contact.slope {
                trace!("Projectile {id} struck terrain");
                self.pending_removals.push(id);
            }
            return;
        }
        if contact.landed && !was_grounded {
            sink.notify(SimEvent::Landed { id });
        }
    }

    fn run_weapon(
        &mut self,
        id: ActorId,
        now: SimTime,
        animation: &dyn AnimationSignals,
        sink: &mut dyn EntitySink,
    ) {
        let Some(actor) = self.get_mut(id) else { return };
        if actor.is_dead() || actor.weapon().is_none() {
            return;
        }
        let held = actor.intent().held_ability;

        if let (Some(index), Some(false)) = (held, actor.weapon().map(|w| w.is_active())) {
            match actor.use_ability(index, now) {
                Ok(AbilityUse::Started) => {
                    trace!("Actor {id} started ability {index}");
                    sink.notify(SimEvent::AnimationRestart {
                        actor: id,
                        ability: index,
                        stage: 0,
                    });
                },
                Ok(_) => {},
                Err(err) => warn!("Actor {id} holds an unusable ability: {err}"),
            }
        }

        let Some(weapon) = actor.weapon_mut() else { return };
        let frame = match weapon.advance(id, now, held, animation) {
            StageTick::Idle => return,
            StageTick::Finished { ability } => {
                trace!("Actor {id} finished ability {ability}");
                return;
            },
            StageTick::Advanced { ability, stage } => {
                actor.body_mut().vel_x = 0.0;
                sink.notify(SimEvent::AnimationRestart {
                    actor: id,
                    ability,
                    stage,
                });
                return;
            },
            StageTick::Playing { frame, .. } => frame,
        };

        let motion = weapon.take_motion();
        let spawn = weapon.take_spawn(frame);
        let attack = weapon
            .current_stage()
            .and_then(|stage| stage.live_attack(frame).map(|shape| (shape, stage.hit)));

        let direction = actor.direction();
        let side = actor.side();
        let bounds = actor.bounds();
        let body = actor.body_mut();
        match motion {
            Some(StageMotion::Hold) => body.vel_x = 0.0,
            Some(StageMotion::Impulse { vel_x, vel_y }) => {
                body.vel_x = vel_x * direction.sign();
                if vel_y != 0.0 {
                    body.vel_y = vel_y;
                    body.falling = true;
                }
            },
            None => {},
        }

        if let Some(spec) = spawn {
            let x = match direction {
                Direction::Right => bounds.right(),
                Direction::Left => bounds.x - spec.width as f32,
            };
            let y = bounds.center_y() - spec.height as f32 / 2.0;
            self.pending_spawns.push(PendingSpawn {
                spec,
                x,
                y,
                owner: Some(id),
                side: Some(side),
                facing: direction,
            });
        }

        let Some((shape, profile)) = attack else { return };
        let area = attack_box(&bounds, direction, &shape);
        let struck: Vec<ActorId> = self
            .live_targets(side.opposing())
            .filter(|target| target.id() != id && target.bounds().intersects(&area))
            .map(Actor::id)
            .collect();

        for target in struck {
            let fresh = self
                .get_mut(id)
                .and_then(Actor::weapon_mut)
                .is_some_and(|weapon| weapon.register_hit(target));
            if fresh {
                let hit = Hit::new(id, direction, profile);
                self.deliver(target, &hit, now, sink);
            }
        }
    }

    fn run_contact_damage(&mut self, id: ActorId, now: SimTime, sink: &mut dyn EntitySink) {
        let Some(actor) = self.get(id) else { return };
        if actor.is_dead() || self.pending_removals.contains(&id) {
            return;
        }
        let Some(profile) = actor.behavior().contact_hit().copied() else {
            return;
        };

        if actor.behavior().expired(now) {
            trace!("Actor {id} expired");
            self.pending_removals.push(id);
            return;
        }

        let bounds = actor.bounds();
        let direction = actor.direction();
        let side = actor.side();
        let source = actor.owner().unwrap_or(id);
        let (pierce, struck_before) = match actor.behavior() {
            Behavior::Projectile { pierce, struck, .. } => (*pierce, struck.clone()),
            _ => (true, Vec::new()),
        };
        let is_projectile = actor.kind() == ActorKind::Projectile;

        let targets: Vec<(ActorId, Rect)> = self
            .live_targets(side.opposing())
            .filter(|target| {
                target.bounds().intersects(&bounds) && !struck_before.contains(&target.id())
            })
            .map(|target| (target.id(), target.bounds()))
            .collect();

        for (target, target_bounds) in targets {
            let push = if is_projectile {
                direction
            } else {
                push_away(bounds.center_x(), target_bounds.center_x(), direction)
            };
            let hit = Hit::new(source, push, profile);
            self.deliver(target, &hit, now, sink);

            if is_projectile {
                if let Some(Behavior::Projectile { struck, .. }) =
                    self.get_mut(id).map(Actor::behavior_mut)
                {
                    struck.push(target);
                }
                if !pierce {
                    self.pending_removals.push(id);
                    break;
                }
            }
        }
    }

    fn deliver(&mut self, target: ActorId, hit: &Hit, now: SimTime, sink: &mut dyn EntitySink) {
        let Some(actor) = self.get_mut(target) else { return };
        let report: HitReport = apply_hit(actor, hit, now);
        if !report.landed() {
            trace!("Hit from {} on {target} had no effect", hit.source);
            return;
        }
        let bounds = actor.bounds();

        if let Some(KnockbackOutcome::Applied { interrupted }) = report.knockback {
            sink.notify(SimEvent::KnockedBack {
                target,
                interrupted,
            });
        }
        let dealt = report.damage.dealt();
        if dealt > 0.0 {
            sink.notify(SimEvent::Damaged {
                target,
                source: Some(hit.source),
                amount: dealt,
            });
            sink.spawn(
                SpawnRequest::Effect {
                    effect: Effect::DamageNumber { amount: dealt },
                    x: bounds.center_x(),
                    y: bounds.y,
                },
                Layer::Effects,
            );
        }
    }

    fn handle_death(&mut self, id: ActorId, sink: &mut dyn EntitySink) {
        let Some(actor) = self.get(id) else { return };
        if !actor.is_dead() || self.pending_removals.contains(&id) {
            return;
        }

        let kind = actor.kind();
        let side = actor.side();
        let bounds = actor.bounds();
        let effects = actor.death_effects().to_vec();
        debug!("Actor {id} ({kind:?}) died");
        sink.notify(SimEvent::Died { id, kind });

        for effect in effects {
            match effect {
                DeathEffect::DropCurrency { amount } => sink.spawn(
                    SpawnRequest::Pickup {
                        pickup: Pickup::Currency { amount },
                        x: bounds.center_x(),
                        y: bounds.bottom(),
                    },
                    Layer::Pickups,
                ),
                DeathEffect::Explode {
                    radius,
                    damage,
                    lifetime_ms,
                } => {
                    let size = (radius * 2.0).max(1.0) as u32;
                    let spec = ActorSpec::new(ActorKind::Hazard, size, size, 1)
                        .with_gravity_scale(0.0)
                        .with_behavior(Behavior::hazard(
                            lifetime_ms,
                            HitProfile::new(damage, 0.0, 0.0),
                        ));
                    self.pending_spawns.push(PendingSpawn {
                        spec,
                        x: bounds.center_x() - radius,
                        y: bounds.center_y() - radius,
                        owner: Some(id),
                        side: Some(side),
                        facing: Direction::Right,
                    });
                },
                DeathEffect::SpawnEffect { name } => sink.spawn(
                    SpawnRequest::Effect {
                        effect: Effect::Named { name },
                        x: bounds.center_x(),
                        y: bounds.center_y(),
                    },
                    Layer::Effects,
                ),
            }
        }
        self.pending_removals.push(id);
    }

    fn compact(&mut self, sink: &mut dyn EntitySink) -> usize {
        let mut seen = AHashSet::new();
        let removals = std::mem::take(&mut self.pending_removals);
        let mut removed = 0;
        for id in removals {
            if !seen.insert(id) {
                continue;
            }
            if self.remove(id).is_ok() {
                sink.despawn(id);
                removed += 1;
            }
        }
        removed
    }

    fn flush_spawns(&mut self, now: SimTime, sink: &mut dyn EntitySink) -> usize {
        let pending = std::mem::take(&mut self.pending_spawns);
        let count = pending.len();
        for spawn in pending {
            let kind = spawn.spec.kind;
            let id = self.insert(spawn.spec, spawn.x, spawn.y);
            if let Some(actor) = self.get_mut(id) {
                if let Some(owner) = spawn.owner {
                    actor.set_owner(owner);
                }
                if let Some(side) = spawn.side {
                    actor.set_side(side);
                }
                let speed = match actor.behavior() {
                    Behavior::Projectile { speed, .. } => Some(*speed),
                    _ => None,
                };
                let body = actor.body_mut();
                body.direction = spawn.facing;
                if let Some(speed) = speed {
                    body.vel_x = speed * spawn.facing.sign();
                }
            }
            debug!("Spawned {kind:?} {id} at {}ms", now.as_millis());
            sink.spawn(
                SpawnRequest::Actor {
                    id,
                    kind,
                    x: spawn.x,
                    y: spawn.y,
                },
                layer_for(kind),
            );
        }
        count
    }
}

fn layer_for(kind: ActorKind) -> Layer {
    match kind {
        ActorKind::Player | ActorKind::Enemy | ActorKind::Summon => Layer::Actors,
        ActorKind::Projectile | ActorKind::Hazard => Layer::Projectiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{Ability, AbilityStage, FrameWindow, WeaponSpec};
    use crate::actor::Invulnerability;
    use crate::animation::TimelineAnimation;
    use crate::events::EventBus;
    use crate::hitbox::AttackShape;
    use crate::tile::{Tile, TileLayer};

    fn floor() -> TileLayer {
        TileLayer::new(32.0).with(Tile::solid(-1000.0, 200.0, 4000.0, 32.0))
    }

    fn sword() -> WeaponSpec {
        let stage = AbilityStage::new("swing", 4, 32).with_attack(
            AttackShape::reach(1.5),
            FrameWindow::new(0, 3),
            HitProfile::new(10.0, 0.0, 0.0),
        );
        WeaponSpec::new("sword").with_ability(Ability::new("swing", 200).with_stage(stage))
    }

    fn player() -> ActorSpec {
        ActorSpec::new(ActorKind::Player, 32, 32, 100).with_weapon(sword())
    }

    fn enemy() -> ActorSpec {
        ActorSpec::new(ActorKind::Enemy, 32, 32, 50).with_behavior(Behavior::Controlled {
            speed: 0.0,
            jump_velocity: 0.0,
        })
    }

    #[test]
    fn test_spawn_and_lookup() {
        let mut world = World::default();
        let id = world.spawn(player(), 0.0, 0.0).expect("spawn");
        assert_eq!(world.len(), 1);
        assert_eq!(world.actor(id).expect("live").kind(), ActorKind::Player);
    }

    #[test]
    fn test_stale_handle_after_remove() {
        let mut world = World::default();
        let id = world.spawn(player(), 0.0, 0.0).expect("spawn");
        world.remove(id).expect("remove");

        let reused = world.spawn(enemy(), 0.0, 0.0).expect("spawn");
        assert_eq!(reused, id.next_generation());
        assert!(matches!(world.actor(id), Err(SimError::UnknownActor(_))));
    }

    #[test]
    fn test_hunter_with_missing_ability_rejected() {
        let mut world = World::default();
        let spec = ActorSpec::new(ActorKind::Enemy, 32, 32, 10)
            .with_behavior(Behavior::hunter(1.0, 200.0, 30.0, 2));
        assert!(matches!(
            world.spawn(spec, 0.0, 0.0),
            Err(SimError::AbilityIndexOutOfRange { index: 2, len: 0 })
        ));
    }

    #[test]
    fn test_actor_settles_on_floor() {
        let mut world = World::default();
        let mut bus = EventBus::default();
        let id = world.spawn(player(), 0.0, 150.0).expect("spawn");

        for _ in 0..30 {
            world.step(&floor(), &TimelineAnimation, &mut bus);
        }
        let actor = world.actor(id).expect("live");
        assert_eq!(actor.position().1, 168.0);
        assert!(actor.body().is_grounded());
        assert!(bus
            .drain()
            .iter()
            .any(|event| *event == SimEvent::Landed { id }));
    }

    #[test]
    fn test_walking_wielder_stops_while_swinging() {
        let mut world = World::default();
        let mut bus = EventBus::default();
        let layer = floor();
        let id = world.spawn(player(), 0.0, 168.0).expect("spawn");
        world
            .set_intent(id, Intent::walk(Direction::Right).holding(0))
            .expect("live");

        world.step(&layer, &TimelineAnimation, &mut bus);
        let planted = world.actor(id).expect("live").position().0;

        for _ in 0..5 {
            let actor = world.actor(id).expect("live");
            assert!(actor.weapon().expect("armed").is_active());
            assert_eq!(actor.velocity().0, 0.0);
            assert_eq!(actor.position().0, planted);
            world.step(&layer, &TimelineAnimation, &mut bus);
        }
    }

    #[test]
    fn test_impulse_lasts_one_tick() {
        let lunge = AbilityStage::new("lunge", 4, 32).with_motion(StageMotion::Impulse {
            vel_x: 6.0,
            vel_y: 0.0,
        });
        let spear = WeaponSpec::new("spear").with_ability(Ability::new("lunge", 200).with_stage(lunge));
        let mut world = World::default();
        let mut bus = EventBus::default();
        let layer = floor();
        let id = world
            .spawn(ActorSpec::new(ActorKind::Player, 32, 32, 100).with_weapon(spear), 0.0, 168.0)
            .expect("spawn");
        world
            .set_intent(id, Intent::walk(Direction::Right).holding(0))
            .expect("live");

        world.step(&layer, &TimelineAnimation, &mut bus);
        assert_eq!(world.actor(id).expect("live").velocity().0, 6.0);

        for _ in 0..3 {
            world.step(&layer, &TimelineAnimation, &mut bus);
            assert_eq!(world.actor(id).expect("live").velocity().0, 0.0);
        }
    }

    #[test]
    fn test_swing_hits_each_target_once() {
        let mut world = World::default();
        let mut bus = EventBus::default();
        let hero = world.spawn(player(), 0.0, 168.0).expect("spawn");
        let foe = world.spawn(enemy(), 40.0, 168.0).expect("spawn");

        world.set_intent(hero, Intent::default().holding(0)).expect("intent");
        for _ in 0..6 {
            world.step(&floor(), &TimelineAnimation, &mut bus);
        }

        assert_eq!(world.actor(foe).expect("live").health(), 40.0);
    }

    #[test]
    fn test_ignored_hit_raises_no_events() {
        let mut world = World::default();
        let mut bus = EventBus::default();
        let hero = world.spawn(player(), 0.0, 168.0).expect("spawn");
        let foe = world.spawn(enemy(), 40.0, 168.0).expect("spawn");
        world
            .take_damage(foe, Damage::windowed(1.0, 10_000))
            .expect("live");

        world.set_intent(hero, Intent::default().holding(0)).expect("intent");
        for _ in 0..6 {
            world.step(&floor(), &TimelineAnimation, &mut bus);
        }

        assert_eq!(world.actor(foe).expect("live").health(), 49.0);
        assert!(!bus.drain().iter().any(|event| matches!(
            event,
            SimEvent::Damaged { target, .. } | SimEvent::KnockedBack { target, .. } if *target == foe
        )));
    }

    #[test]
    fn test_death_drops_and_despawns() {
        let mut world = World::default();
        let mut bus = EventBus::default();
        let spec = enemy().with_death_effect(DeathEffect::DropCurrency { amount: 3 });
        let foe = world.spawn(spec, 0.0, 168.0).expect("spawn");

        world
            .take_damage(foe, Damage::windowed(500.0, 0))
            .expect("damage");
        let report = world.step(&floor(), &TimelineAnimation, &mut bus);

        assert_eq!(report.removed, 1);
        assert!(world.get(foe).is_none());
        let events = bus.drain();
        assert!(events.contains(&SimEvent::Died {
            id: foe,
            kind: ActorKind::Enemy
        }));
        assert!(events.contains(&SimEvent::Despawned { id: foe }));
        assert!(events.iter().any(|event| matches!(
            event,
            SimEvent::SpawnRequested {
                layer: Layer::Pickups,
                ..
            }
        )));
    }

    #[test]
    fn test_explosion_hits_every_tick() {
        let mut world = World::default();
        let mut bus = EventBus::default();
        let bomber = enemy().with_death_effect(DeathEffect::Explode {
            radius: 48.0,
            damage: 2.0,
            lifetime_ms: 1000,
        });
        let bomber = world.spawn(bomber, 0.0, 168.0).expect("spawn");
        let hero = world.spawn(player(), 20.0, 168.0).expect("spawn");

        world
            .take_damage(bomber, Damage::continuous(500.0))
            .expect("damage");
        let report = world.step(&floor(), &TimelineAnimation, &mut bus);
        assert_eq!(report.spawned, 1);

        world.step(&floor(), &TimelineAnimation, &mut bus);
        world.step(&floor(), &TimelineAnimation, &mut bus);
        assert_eq!(world.actor(hero).expect("live").health(), 96.0);
        assert!(!world.actor(hero).expect("live").invulnerable_flag());
    }

    #[test]
    fn test_projectile_spawned_and_hits() {
        let arrow = ActorSpec::new(ActorKind::Projectile, 8, 4, 1)
            .with_gravity_scale(0.0)
            .with_behavior(Behavior::projectile(
                10.0,
                2000,
                HitProfile::new(7.0, 0.0, 0.0).with_invulnerability(Invulnerability::Grant(200)),
            ));
        let shot = AbilityStage::new("shoot", 2, 32).with_spawn(0, arrow);
        let bow = WeaponSpec::new("bow").with_ability(Ability::new("shoot", 1000).with_stage(shot));

        let mut world = World::default();
        let mut bus = EventBus::default();
        let archer = world
            .spawn(ActorSpec::new(ActorKind::Player, 32, 32, 100).with_weapon(bow), 0.0, 168.0)
            .expect("spawn");
        let foe = world.spawn(enemy(), 120.0, 168.0).expect("spawn");

        world.use_ability(archer, 0).expect("use");
        let report = world.step(&floor(), &TimelineAnimation, &mut bus);
        assert_eq!(report.spawned, 1);

        for _ in 0..20 {
            world.step(&floor(), &TimelineAnimation, &mut bus);
        }
        assert_eq!(world.actor(foe).expect("live").health(), 43.0);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_live_targets_filters_side_and_death() {
        let mut world = World::default();
        world.spawn(player(), 0.0, 0.0).expect("spawn");
        let foe = world.spawn(enemy(), 0.0, 0.0).expect("spawn");
        world.spawn(enemy(), 0.0, 0.0).expect("spawn");
        world
            .take_damage(foe, Damage::continuous(1000.0))
            .expect("damage");

        assert_eq!(world.live_targets(Side::Hostiles).count(), 1);
        assert_eq!(world.live_targets(Side::Allies).count(), 1);
    }
}
