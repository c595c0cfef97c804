//! Tick integration tests for bodies, contacts, forces and damage.

#![allow(dead_code, unused_imports)]

use bevy_ecs::message::Messages;
use bevy_ecs::prelude::*;
use glam::Vec2;

use enemysim::components::animation::AnimationSelector;
use enemysim::components::body::{Body, BodySense, HookCtx};
use enemysim::components::capabilities::Owner;
use enemysim::components::damage::{Health, INSTANT_KILL, MAX_HEALTH};
use enemysim::components::entityinfo::EntityInfo;
use enemysim::components::facing::Facing;
use enemysim::components::fixture::{Fixture, FixtureType, Side};
use enemysim::components::shape::{Rect, Shape};
use enemysim::components::signals::Signals;
use enemysim::components::sprite::SpriteFrame;
use enemysim::components::timer::Timers;
use enemysim::enemies::bouncer::{AIRBORNE_FLAG, BOUNCE_TIMER, DEFAULT_BOUNCE_IMPULSE};
use enemysim::enemies::saucer::LAUGH_SOUND;
use enemysim::enemies::register_all;
use enemysim::events::audio::SoundRequest;
use enemysim::events::damage::DamageEvent;
use enemysim::resources::contacts::Contacts;
use enemysim::resources::entityfactory::spawn_entity;
use enemysim::resources::simconfig::SimConfig;
use enemysim::resources::worldtime::WorldTime;
use enemysim::simulation::Simulation;
use enemysim::spawn::SpawnConfig;
use enemysim::systems::body::step_bodies;
use enemysim::systems::contacts::{detect_contacts, resolve_senses};
use enemysim::systems::damage::{ENEMY_DAMAGE_SOUND, PLAYER_DAMAGE_SOUND};

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn make_world(delta: f32) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime {
        elapsed: 0.0,
        delta,
        time_scale: 1.0,
        frame_count: 0,
    });
    world.init_resource::<Contacts>();
    world.init_resource::<Messages<SoundRequest>>();
    world
}

fn make_sim() -> Simulation {
    let mut sim = Simulation::new(SimConfig::unscaled());
    register_all(&mut sim);
    sim
}

fn at(x: f32, y: f32) -> SpawnConfig {
    SpawnConfig::new().with("position", Vec2::new(x, y))
}

fn tick_n(sim: &mut Simulation, n: u32, dt: f32) {
    for _ in 0..n {
        sim.tick(dt);
    }
}

fn tick_bodies(world: &mut World) {
    let mut schedule = Schedule::default();
    schedule.add_systems(step_bodies);
    schedule.run(world);
}

fn tick_contacts(world: &mut World) {
    let mut schedule = Schedule::default();
    schedule.add_systems((detect_contacts, resolve_senses).chain());
    schedule.run(world);
}

fn body(sim: &Simulation, e: Entity) -> &Body {
    sim.world().get::<Body>(e).unwrap()
}

fn health(sim: &Simulation, e: Entity) -> i32 {
    sim.world().get::<Health>(e).unwrap().current
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[test]
fn step_bodies_applies_gravity_then_moves() {
    let mut world = make_world(0.5);
    let e = world
        .spawn(Body::with_size(1.0, 1.0).with_gravity(Vec2::new(0.0, -10.0), true))
        .id();
    tick_bodies(&mut world);
    let body = world.get::<Body>(e).unwrap();
    assert!(approx_eq(body.velocity().y, -5.0));
    assert!(approx_eq(body.bounds.y, -2.5));
    assert!(approx_eq(body.position_delta().y, -2.5));
}

#[test]
fn step_bodies_runs_hooks_with_entity_timers() {
    let mut world = make_world(0.25);
    let mut body = Body::with_size(1.0, 1.0).with_velocity(Vec2::new(4.0, 0.0));
    body.put_post_hook("count", |_: &mut Body, ctx: &mut HookCtx<'_>| {
        let n = ctx.signals.integer("steps").unwrap_or(0);
        ctx.signals.set_integer("steps", n + 1);
        ctx.sounds.push(SoundRequest::once("step"));
    });
    let e = world.spawn((body, Signals::default())).id();
    tick_bodies(&mut world);
    tick_bodies(&mut world);
    assert_eq!(world.get::<Signals>(e).unwrap().integer("steps"), Some(2));
    assert!(approx_eq(world.get::<Body>(e).unwrap().bounds.x, 2.0));

    let mut messages = world.resource_mut::<Messages<SoundRequest>>();
    let sounds: Vec<SoundRequest> = messages.drain().collect();
    assert_eq!(sounds.len(), 2);
}

#[test]
fn dummy_falls_under_simulation_gravity() {
    let mut sim = make_sim();
    let dummy = sim
        .spawn("dummy", at(0.0, 10.0).with("gravity_on", true))
        .unwrap();
    sim.tick(0.5);
    let b = body(&sim, dummy);
    assert!(approx_eq(b.velocity().y, -15.0));
    assert!(approx_eq(b.bounds.y, 2.5));
}

// ---------------------------------------------------------------------------
// Bouncer end to end
// ---------------------------------------------------------------------------

#[test]
fn bouncer_waits_jumps_and_lands_back() {
    let mut sim = make_sim();
    let dt = 1.0 / 64.0;
    let b = sim.spawn("bouncer", at(0.0, 0.0)).unwrap();

    tick_n(&mut sim, 47, dt);
    {
        let body = body(&sim, b);
        assert!(approx_eq(body.bounds.y, 0.0));
        assert_eq!(body.velocity(), Vec2::ZERO);
        assert!(!body.physics.gravity_on);
        let signals = sim.world().get::<Signals>(b).unwrap();
        assert!(!signals.has_flag(AIRBORNE_FLAG));
        let selector = sim.world().get::<AnimationSelector>(b).unwrap();
        assert_eq!(selector.current_key(), Some("still"));
    }

    // tick 48: the bounce timer crosses 0.75 s
    sim.tick(dt);
    {
        let body = body(&sim, b);
        let vy = DEFAULT_BOUNCE_IMPULSE - 30.0 * dt;
        assert!(body.physics.gravity_on);
        assert!(approx_eq(body.velocity().y, vy));
        assert!(approx_eq(body.bounds.y, vy * dt));
        let selector = sim.world().get::<AnimationSelector>(b).unwrap();
        assert_eq!(selector.current_key(), Some("jump"));
    }

    let mut landed_at = None;
    for tick in 49..200 {
        sim.tick(dt);
        if !body(&sim, b).physics.gravity_on {
            landed_at = Some(tick);
            break;
        }
    }
    let landed_at = landed_at.expect("bouncer never landed");
    // about 1.2 s of flight
    assert!(landed_at > 48 + 60 && landed_at < 48 + 90, "landed at {landed_at}");
    {
        let body = body(&sim, b);
        assert!(approx_eq(body.bounds.y, 0.0));
        assert_eq!(body.velocity(), Vec2::ZERO);
        let timers = sim.world().get::<Timers>(b).unwrap();
        assert_eq!(timers.get(BOUNCE_TIMER).unwrap().elapsed(), 0.0);
    }

    // the landing restarts the wait
    tick_n(&mut sim, 47, dt);
    assert!(!body(&sim, b).physics.gravity_on);
    sim.tick(dt);
    assert!(body(&sim, b).physics.gravity_on);
}

#[test]
fn bouncer_jumps_at_three_quarters_of_a_second_at_sixty_hz() {
    let mut sim = make_sim();
    let dt = sim.config().fixed_dt;
    assert_eq!(dt, 1.0 / 60.0);
    // without gravity the impulse is visible as-is after the step
    let floating = sim
        .spawn("bouncer", at(0.0, 100.0).with("gravity", 0.0f32))
        .unwrap();
    let falling = sim.spawn("bouncer", at(4.0, 100.0)).unwrap();

    for _ in 0..44 {
        assert_eq!(sim.advance(dt), 1);
    }
    assert_eq!(body(&sim, floating).velocity().y, 0.0);
    assert_eq!(body(&sim, falling).velocity().y, 0.0);
    assert!(approx_eq(body(&sim, falling).bounds.y, 100.0));

    // tick 45: t = 0.75
    assert_eq!(sim.advance(dt), 1);
    assert!(approx_eq(sim.time().elapsed, 0.75));
    assert_eq!(body(&sim, floating).velocity().y, DEFAULT_BOUNCE_IMPULSE);
    let falling = body(&sim, falling);
    assert!(falling.physics.gravity_on);
    assert!(approx_eq(
        falling.velocity().y,
        DEFAULT_BOUNCE_IMPULSE - 30.0 * dt
    ));
    assert!(falling.bounds.y > 100.0);
}

#[test]
fn enemies_face_the_target() {
    let mut sim = make_sim();
    let bouncer = sim.spawn("bouncer", at(0.0, 0.0)).unwrap();
    sim.spawn("dummy", at(6.0, 0.0)).unwrap();
    sim.tick(1.0 / 60.0);
    assert_eq!(
        sim.world().get::<Facing>(bouncer).copied(),
        Some(Facing::Right)
    );
    assert!(!sim.world().get::<SpriteFrame>(bouncer).unwrap().flip_x);
}

#[test]
fn saucer_laughs_when_target_is_close() {
    let mut sim = make_sim();
    sim.spawn("dummy", at(0.0, 0.0)).unwrap();
    let saucer = sim.spawn("saucer", at(0.0, 3.0)).unwrap();
    sim.tick(1.0 / 60.0);
    let sounds = sim.drain_sounds();
    assert!(sounds.contains(&SoundRequest::once(LAUGH_SOUND)));
    assert!(
        sim.world()
            .get::<Signals>(saucer)
            .unwrap()
            .has_flag("laughing")
    );

    // cooling down: no second laugh on the next tick
    sim.tick(1.0 / 60.0);
    assert!(!sim.drain_sounds().contains(&SoundRequest::once(LAUGH_SOUND)));
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

#[test]
fn contacts_write_block_senses() {
    let mut world = make_world(0.1);
    let floor = world
        .spawn(
            Body::new(Rect::new(-5.0, -1.0, 10.0, 1.0))
                .with_fixture(Fixture::new(FixtureType::Block, Shape::rect(10.0, 1.0))),
        )
        .id();
    let walker = world
        .spawn(
            Body::new(Rect::new(0.0, 0.0, 1.0, 1.0))
                .with_fixture(
                    Fixture::new(FixtureType::Feet, Shape::rect(0.5, 0.1))
                        .with_offset(Vec2::new(0.0, -0.5)),
                )
                .with_fixture(
                    Fixture::new(FixtureType::Head, Shape::rect(0.5, 0.1))
                        .with_offset(Vec2::new(0.0, 0.5)),
                ),
        )
        .id();
    tick_contacts(&mut world);

    let body = world.get::<Body>(walker).unwrap();
    assert!(body.is_sensing(BodySense::FeetOnGround));
    assert!(!body.is_sensing(BodySense::HeadTouchingBlock));
    assert!(!world.get::<Body>(floor).unwrap().is_sensing(BodySense::FeetOnGround));

    // step off the floor: the sense is gone next tick
    world.get_mut::<Body>(walker).unwrap().bounds.y = 3.0;
    tick_contacts(&mut world);
    assert!(!world.get::<Body>(walker).unwrap().is_sensing(BodySense::FeetOnGround));
}

// ---------------------------------------------------------------------------
// Forces
// ---------------------------------------------------------------------------

#[test]
fn magnet_pulls_pushable_dummy() {
    let mut sim = make_sim();
    sim.spawn("magnet", at(0.0, 0.0)).unwrap();
    // dummy is 1.25 tall: its center lands on (2, 0)
    let dummy = sim.spawn("dummy", at(2.0, -0.625)).unwrap();
    sim.tick(0.5);
    let b = body(&sim, dummy);
    assert!(approx_eq(b.velocity().x, -10.0));
    assert!(approx_eq(b.velocity().y, 0.0));
    assert!(b.is_sensing(BodySense::ForceApplied));
}

#[test]
fn magnet_leaves_enemies_alone() {
    let mut sim = make_sim();
    sim.spawn("magnet", at(0.0, 0.0)).unwrap();
    let bouncer = sim.spawn("bouncer", at(2.0, -0.5)).unwrap();
    sim.tick(0.1);
    let b = body(&sim, bouncer);
    assert_eq!(b.velocity(), Vec2::ZERO);
    assert!(!b.is_sensing(BodySense::ForceApplied));
}

#[test]
fn magnet_detaches_shot_owner() {
    let mut sim = make_sim();
    sim.spawn("magnet", at(0.0, 0.0)).unwrap();
    let dummy = sim.spawn("dummy", at(-20.0, 0.0)).unwrap();
    let shot = spawn_entity(
        sim.world_mut(),
        "shot",
        at(1.5, 0.0).with("velocity", Vec2::ZERO),
        Some(dummy),
    )
    .unwrap();
    assert_eq!(sim.world().get::<Owner>(shot), Some(&Owner(dummy)));

    sim.tick(0.1);
    assert!(sim.world().get::<Owner>(shot).is_none());
    assert!(body(&sim, shot).velocity().x < 0.0);
}

// ---------------------------------------------------------------------------
// Damage
// ---------------------------------------------------------------------------

#[test]
fn shot_damages_enemy_once_and_dies() {
    let mut sim = make_sim();
    let bouncer = sim.spawn("bouncer", at(0.0, 0.0)).unwrap();
    let shot = sim
        .spawn("shot", at(0.0, 0.5).with("velocity", Vec2::ZERO))
        .unwrap();

    sim.tick(1.0 / 60.0);
    assert_eq!(health(&sim, bouncer), MAX_HEALTH - 10);
    let hits = sim.drain_messages::<DamageEvent>();
    assert_eq!(
        hits,
        vec![DamageEvent {
            damager: shot,
            target: bouncer,
            amount: 10,
            lethal: false,
        }]
    );
    assert!(sim.drain_sounds().contains(&SoundRequest::once(ENEMY_DAMAGE_SOUND)));

    sim.tick(1.0 / 60.0);
    assert!(!sim.is_alive(shot));
    assert!(sim.world().get_entity(shot).is_err());
    assert_eq!(health(&sim, bouncer), MAX_HEALTH - 10);
    assert!(sim.drain_messages::<DamageEvent>().is_empty());
}

#[test]
fn full_charged_shot_kills_outright() {
    let mut sim = make_sim();
    let bouncer = sim.spawn("bouncer", at(0.0, 0.0)).unwrap();
    sim.spawn(
        "shot",
        at(0.0, 0.5)
            .with("velocity", Vec2::ZERO)
            .with("charged", true),
    )
    .unwrap();

    sim.tick(1.0 / 60.0);
    let hits = sim.drain_messages::<DamageEvent>();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].amount, INSTANT_KILL);
    assert!(hits[0].lethal);
    assert!(!sim.is_alive(bouncer));
}

#[test]
fn shots_do_not_hurt_their_owners_kind() {
    let mut sim = make_sim();
    let owner = sim.spawn("bouncer", at(-10.0, 0.0)).unwrap();
    let other = sim.spawn("bouncer", at(0.0, 0.0)).unwrap();
    spawn_entity(
        sim.world_mut(),
        "shot",
        at(0.0, 0.5).with("velocity", Vec2::ZERO),
        Some(owner),
    )
    .unwrap();

    sim.tick(1.0 / 60.0);
    assert_eq!(health(&sim, other), MAX_HEALTH);
    assert!(sim.drain_messages::<DamageEvent>().is_empty());
}

#[test]
fn shield_blocks_the_hit() {
    let mut sim = make_sim();
    let bouncer = sim.spawn("bouncer", at(0.0, 0.0)).unwrap();
    sim.world_mut()
        .get_mut::<Body>(bouncer)
        .unwrap()
        .add_fixture(Fixture::new(FixtureType::Shield, Shape::rect(2.0, 2.0)));
    let shot = sim
        .spawn("shot", at(0.0, 0.5).with("velocity", Vec2::ZERO))
        .unwrap();

    sim.tick(1.0 / 60.0);
    assert_eq!(health(&sim, bouncer), MAX_HEALTH);
    assert!(sim.is_alive(shot));
}

#[test]
fn enemy_contact_hurts_dummy_with_cooldown() {
    let mut sim = make_sim();
    let dummy = sim.spawn("dummy", at(0.0, 0.0)).unwrap();
    sim.spawn("bouncer", at(0.2, 0.0).with("bounce_delay", 10.0f32))
        .unwrap();

    sim.tick(0.1);
    assert_eq!(health(&sim, dummy), MAX_HEALTH - 3);
    assert!(sim.drain_sounds().contains(&SoundRequest::once(PLAYER_DAMAGE_SOUND)));

    // still overlapping, but cooling down for 0.75 s
    tick_n(&mut sim, 5, 0.1);
    assert_eq!(health(&sim, dummy), MAX_HEALTH - 3);

    tick_n(&mut sim, 3, 0.1);
    assert_eq!(health(&sim, dummy), MAX_HEALTH - 6);
}
