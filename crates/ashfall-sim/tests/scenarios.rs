//! End-to-end scenarios driven through the public API.

use ashfall_sim::prelude::*;

fn floor() -> TileLayer {
    TileLayer::new(32.0).with(Tile::solid(-1000.0, 200.0, 4000.0, 32.0))
}

fn sword(cooldown_ms: u64) -> WeaponSpec {
    let swing = AbilityStage::new("swing", 4, 32).with_attack(
        AttackShape::reach(1.5),
        FrameWindow::new(0, 3),
        HitProfile::new(10.0, 0.0, 0.0),
    );
    WeaponSpec::new("sword").with_ability(Ability::new("swing", cooldown_ms).with_stage(swing))
}

fn dummy() -> ActorSpec {
    ActorSpec::new(ActorKind::Enemy, 32, 32, 100).with_behavior(Behavior::Controlled {
        speed: 0.0,
        jump_velocity: 0.0,
    })
}

#[test]
fn test_free_fall_reaches_terminal_velocity() {
    let config = PhysicsConfig::default();
    let mut body = Body::new(100.0, 100.0, 32, 32);

    let mut expected_y = 100.0_f32;
    for tick in 1..=20 {
        step_body(&mut body, &[], &config);
        expected_y += (0.9 * tick as f32).min(15.0);
    }

    assert_eq!(body.vel_y, 15.0);
    assert!((body.y - expected_y).abs() < 1e-2, "y = {}", body.y);
    assert!((body.y - 282.4).abs() < 1e-2);
}

#[test]
fn test_free_fall_through_world_step() {
    let mut world = World::default();
    let mut bus = EventBus::default();
    let id = world.spawn(dummy(), 100.0, 100.0).expect("spawn");

    for _ in 0..20 {
        world.step(&TileLayer::new(32.0), &TimelineAnimation, &mut bus);
    }

    let actor = world.actor(id).expect("live");
    assert_eq!(actor.velocity().1, 15.0);
    assert!((actor.position().1 - 282.4).abs() < 1e-2);
}

#[test]
fn test_second_hit_within_window_is_suppressed() {
    let mut enemy = Actor::from_spec(ActorId::new(0, 0), dummy(), 0.0, 0.0);

    enemy.take_damage(Damage::windowed(30.0, 500), SimTime::ZERO);
    assert_eq!(enemy.health(), 70.0);
    assert!(enemy.invulnerable_flag());

    let outcome = enemy.take_damage(Damage::windowed(30.0, 500), SimTime::from_millis(100));
    assert_eq!(outcome, DamageOutcome::Ignored);
    assert_eq!(enemy.health(), 70.0);
    assert_eq!(enemy.invulnerability().started_at(), Some(SimTime::ZERO));
}

#[test]
fn test_wall_push_uses_horizontal_band_width() {
    let wall = [Tile::solid(200.0, 100.0, 32.0, 32.0)];
    let mut body = Body::new(190.0, 100.0, 32, 32).with_velocity(4.0, 0.0);

    let contact = step_body(&mut body, &wall, &PhysicsConfig::default());

    assert!(contact.wall);
    assert!((body.x - (200.0 - 32.0 * 3.0 / 5.0)).abs() < 1e-4);
    assert_ne!(body.x, 200.0 - 32.0);
}

#[test]
fn test_knockback_cleared_on_landing() {
    let mut world = World::default();
    let mut bus = EventBus::default();
    let id = world.spawn(dummy(), 0.0, 168.0).expect("spawn");

    world.apply_knockback(id, 5.0, -8.0).expect("knockback");
    for _ in 0..60 {
        world.step(&floor(), &TimelineAnimation, &mut bus);
    }

    let actor = world.actor(id).expect("live");
    assert!(!actor.body().knocked_back);
    assert!(!actor.body().falling);
    assert!(!actor.body().jumping);
    assert_eq!(actor.velocity().0, 0.0);
}

#[test]
fn test_swing_hits_once_then_again_on_next_swing() {
    let mut world = World::default();
    let mut bus = EventBus::default();
    let hero = world
        .spawn(
            ActorSpec::new(ActorKind::Player, 32, 32, 100).with_weapon(sword(0)),
            0.0,
            168.0,
        )
        .expect("spawn");
    let foe = world.spawn(dummy(), 40.0, 168.0).expect("spawn");

    world
        .set_intent(hero, Intent::default().holding(0))
        .expect("intent");

    // 128ms clip at 16ms per tick: the first swing covers ticks 1 to 9.
    for _ in 0..9 {
        world.step(&floor(), &TimelineAnimation, &mut bus);
    }
    assert_eq!(world.actor(foe).expect("live").health(), 90.0);

    world.step(&floor(), &TimelineAnimation, &mut bus);
    assert_eq!(world.actor(foe).expect("live").health(), 80.0);

    let restarts = bus
        .drain()
        .into_iter()
        .filter(|event| matches!(event, SimEvent::AnimationRestart { .. }))
        .count();
    assert_eq!(restarts, 2);
}

#[test]
fn test_cooldown_gate_blocks_restart() {
    let mut world = World::default();
    let mut bus = EventBus::default();
    let hero = world
        .spawn(
            ActorSpec::new(ActorKind::Player, 32, 32, 100).with_weapon(sword(500)),
            0.0,
            168.0,
        )
        .expect("spawn");
    let foe = world.spawn(dummy(), 40.0, 168.0).expect("spawn");

    assert_eq!(world.use_ability(hero, 0).ok(), Some(AbilityUse::Started));

    // Clip ends at 128ms, so the cooldown runs until 628ms.
    loop {
        world.step(&floor(), &TimelineAnimation, &mut bus);
        if world.now() >= SimTime::from_millis(628) {
            break;
        }
        let outcome = world.use_ability(hero, 0).expect("valid index");
        assert_ne!(outcome, AbilityUse::Started, "at {:?}", world.now());
        assert_eq!(world.actor(foe).expect("live").health(), 90.0);
    }

    assert_eq!(world.use_ability(hero, 0).ok(), Some(AbilityUse::Started));
    world.step(&floor(), &TimelineAnimation, &mut bus);
    assert_eq!(world.actor(foe).expect("live").health(), 80.0);
}

#[test]
fn test_out_of_range_ability_is_error() {
    let mut world = World::default();
    let hero = world
        .spawn(
            ActorSpec::new(ActorKind::Player, 32, 32, 100).with_weapon(sword(0)),
            0.0,
            0.0,
        )
        .expect("spawn");

    assert!(matches!(
        world.use_ability(hero, 4),
        Err(SimError::AbilityIndexOutOfRange { index: 4, len: 1 })
    ));
    assert!(world
        .set_intent(hero, Intent::default().holding(9))
        .is_err());
}

#[test]
fn test_knockback_interrupts_swing() {
    let mut world = World::default();
    let mut bus = EventBus::default();
    let hero = world
        .spawn(
            ActorSpec::new(ActorKind::Player, 32, 32, 100).with_weapon(sword(300)),
            0.0,
            168.0,
        )
        .expect("spawn");

    world.use_ability(hero, 0).expect("use");
    world.step(&floor(), &TimelineAnimation, &mut bus);

    let outcome = world.apply_knockback(hero, -4.0, -6.0).expect("knockback");
    assert_eq!(outcome, KnockbackOutcome::Applied { interrupted: true });

    let weapon = world.actor(hero).expect("live").weapon().expect("armed");
    assert_eq!(weapon.state(), WeaponState::Idle);
    assert!(!weapon.cooldown(0).expect("cooldown").is_expired(world.now()));
}

#[test]
fn test_hunter_closes_in_and_attacks() {
    let mut world = World::default();
    let mut bus = EventBus::default();
    let hunter = ActorSpec::new(ActorKind::Enemy, 32, 32, 60)
        .with_weapon(sword(200))
        .with_behavior(Behavior::hunter(2.0, 400.0, 40.0, 0));
    world.spawn(hunter, 200.0, 168.0).expect("spawn");
    let hero = world
        .spawn(
            ActorSpec::new(ActorKind::Player, 32, 32, 100).with_behavior(Behavior::Controlled {
                speed: 0.0,
                jump_velocity: 0.0,
            }),
            0.0,
            168.0,
        )
        .expect("spawn");

    for _ in 0..120 {
        world.step(&floor(), &TimelineAnimation, &mut bus);
    }

    assert!(world.actor(hero).expect("live").health() < 100.0);
}

#[test]
fn test_weapon_table_feeds_world() {
    let table = WeaponTable::from_toml_str(
        r#"
        [[weapon]]
        name = "club"

        [[weapon.ability]]
        name = "bonk"
        cooldown_ms = 100

        [[weapon.ability.stage]]
        name = "bonk"
        frame_count = 2
        frame_ms = 48
        attack = { width_fraction = 1.5 }
        active_frames = { first = 0, last = 1 }
        hit = { damage = 25.0, invulnerability_ms = 0 }
        "#,
    )
    .expect("valid table");
    let club = table.get("club").cloned().expect("club");

    let mut world = World::default();
    let mut bus = EventBus::default();
    let hero = world
        .spawn(
            ActorSpec::new(ActorKind::Player, 32, 32, 100).with_weapon(club),
            0.0,
            168.0,
        )
        .expect("spawn");
    let foe = world.spawn(dummy(), 40.0, 168.0).expect("spawn");

    world.use_ability(hero, 0).expect("use");
    world.step(&floor(), &TimelineAnimation, &mut bus);
    assert_eq!(world.actor(foe).expect("live").health(), 75.0);
}
