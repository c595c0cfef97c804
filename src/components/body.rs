//! Kinematic body with fixtures and ordered process hooks.
//!
//! The [`Body`] component owns an entity's bounds, its velocity physics and its
//! [`Fixture`]s. Each tick [`Body::step`] runs:
//!
//! 1. pre-process hooks, in registration order
//! 2. friction, `v *= exp(-f * dt)` on each axis whose friction is enabled
//! 3. gravity, `v += g * dt` when gravity is on
//! 4. velocity clamp to `[-clamp, clamp]` per axis
//! 5. `position += v * dt`
//! 6. post-process hooks, in registration order
//!
//! Hooks are named. Re-registering a name replaces the hook in place without
//! changing its position in the order. [`DEFAULT_HOOK`] is the slot an entity
//! uses for its own hook.
//!
//! Bodies never mutate each other. Pushes from other entities arrive as
//! [`VelocityAlteration`]s resolved by the contact systems.

use std::fmt;

use bevy_ecs::prelude::Component;
use glam::Vec2;
use rustc_hash::FxHashSet;

use crate::components::fixture::{Fixture, FixtureType, VelocityAlteration};
use crate::components::shape::Rect;
use crate::components::signals::Signals;
use crate::components::timer::Timers;
use crate::events::audio::SoundRequest;

/// Reserved hook name for the owning entity's own hook.
pub const DEFAULT_HOOK: &str = "default";

/// Facts written by contact resolution each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodySense {
    FeetOnGround,
    SideTouchingBlockLeft,
    SideTouchingBlockRight,
    HeadTouchingBlock,
    ForceApplied,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsData {
    pub velocity: Vec2,
    pub gravity: Vec2,
    pub gravity_on: bool,
    pub friction: Vec2,
    pub default_friction: Vec2,
    pub apply_friction_x: bool,
    pub apply_friction_y: bool,
    /// Absolute per-axis bound on velocity.
    pub velocity_clamp: Vec2,
}

impl Default for PhysicsData {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity: Vec2::ZERO,
            gravity_on: false,
            friction: Vec2::ZERO,
            default_friction: Vec2::ZERO,
            apply_friction_x: false,
            apply_friction_y: false,
            velocity_clamp: Vec2::splat(f32::INFINITY),
        }
    }
}

/// Mutable entity state a hook may touch besides the body itself.
pub struct HookCtx<'a> {
    pub dt: f32,
    pub timers: &'a mut Timers,
    pub signals: &'a mut Signals,
    pub sounds: &'a mut Vec<SoundRequest>,
}

pub type BodyHook = Box<dyn FnMut(&mut Body, &mut HookCtx<'_>) + Send + Sync>;

#[derive(Component, Default)]
pub struct Body {
    pub bounds: Rect,
    pub physics: PhysicsData,
    pub fixtures: Vec<Fixture>,
    pre_hooks: Vec<(String, BodyHook)>,
    post_hooks: Vec<(String, BodyHook)>,
    senses: FxHashSet<BodySense>,
    position_delta: Vec2,
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |hooks: &Vec<(String, BodyHook)>| {
            hooks.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>()
        };
        f.debug_struct("Body")
            .field("bounds", &self.bounds)
            .field("physics", &self.physics)
            .field("fixtures", &self.fixtures)
            .field("pre_hooks", &names(&self.pre_hooks))
            .field("post_hooks", &names(&self.post_hooks))
            .field("senses", &self.senses)
            .finish()
    }
}

#[derive(Clone, Copy)]
enum HookPhase {
    Pre,
    Post,
}

impl Body {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }

    pub fn with_size(width: f32, height: f32) -> Self {
        Self::new(Rect::new(0.0, 0.0, width, height))
    }

    pub fn with_gravity(mut self, gravity: Vec2, on: bool) -> Self {
        self.physics.gravity = gravity;
        self.physics.gravity_on = on;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.physics.velocity = velocity;
        self
    }

    pub fn with_velocity_clamp(mut self, clamp: Vec2) -> Self {
        self.physics.velocity_clamp = clamp.abs();
        self
    }

    /// Friction for both axes, also used as the per-tick reset value.
    pub fn with_friction(mut self, friction: Vec2) -> Self {
        self.physics.friction = friction;
        self.physics.default_friction = friction;
        self.physics.apply_friction_x = friction.x > 0.0;
        self.physics.apply_friction_y = friction.y > 0.0;
        self
    }

    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixtures.push(fixture);
        self
    }

    pub fn add_fixture(&mut self, fixture: Fixture) {
        self.fixtures.push(fixture);
    }

    pub fn fixtures_of(&self, kind: FixtureType) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter().filter(move |f| f.kind == kind)
    }

    pub fn fixtures_of_mut(&mut self, kind: FixtureType) -> impl Iterator<Item = &mut Fixture> {
        self.fixtures.iter_mut().filter(move |f| f.kind == kind)
    }

    /// Bottom-left corner.
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.bounds.x, self.bounds.y)
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.bounds.x = position.x;
        self.bounds.y = position.y;
    }

    pub fn center(&self) -> Vec2 {
        self.bounds.center()
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.bounds.set_center(center);
    }

    pub fn set_bottom_center(&mut self, point: Vec2) {
        self.bounds.set_bottom_center(point);
    }

    pub fn velocity(&self) -> Vec2 {
        self.physics.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.physics.velocity = velocity;
    }

    /// Movement over the last [`Body::step`], hooks included.
    pub fn position_delta(&self) -> Vec2 {
        self.position_delta
    }

    pub fn is_sensing(&self, sense: BodySense) -> bool {
        self.senses.contains(&sense)
    }

    pub fn set_sense(&mut self, sense: BodySense, on: bool) {
        if on {
            self.senses.insert(sense);
        } else {
            self.senses.remove(&sense);
        }
    }

    pub fn clear_senses(&mut self) {
        self.senses.clear();
    }

    pub fn apply_alteration(&mut self, alteration: &VelocityAlteration) {
        alteration.apply_to(&mut self.physics.velocity);
    }

    pub fn put_pre_hook<F>(&mut self, name: impl Into<String>, hook: F)
    where
        F: FnMut(&mut Body, &mut HookCtx<'_>) + Send + Sync + 'static,
    {
        put_hook(&mut self.pre_hooks, name.into(), Box::new(hook));
    }

    pub fn put_post_hook<F>(&mut self, name: impl Into<String>, hook: F)
    where
        F: FnMut(&mut Body, &mut HookCtx<'_>) + Send + Sync + 'static,
    {
        put_hook(&mut self.post_hooks, name.into(), Box::new(hook));
    }

    pub fn remove_hook(&mut self, name: &str) {
        self.pre_hooks.retain(|(n, _)| n != name);
        self.post_hooks.retain(|(n, _)| n != name);
    }

    pub fn pre_hook_names(&self) -> impl Iterator<Item = &str> {
        self.pre_hooks.iter().map(|(n, _)| n.as_str())
    }

    pub fn post_hook_names(&self) -> impl Iterator<Item = &str> {
        self.post_hooks.iter().map(|(n, _)| n.as_str())
    }

    /// Advance the body by `dt` seconds.
    pub fn step(&mut self, dt: f32, ctx: &mut HookCtx<'_>) {
        ctx.dt = dt;
        let start = self.position();

        self.run_hooks(HookPhase::Pre, ctx);

        let p = &mut self.physics;
        if p.apply_friction_x && p.friction.x > 0.0 {
            p.velocity.x *= (-p.friction.x * dt).exp();
        }
        if p.apply_friction_y && p.friction.y > 0.0 {
            p.velocity.y *= (-p.friction.y * dt).exp();
        }
        if p.gravity_on {
            p.velocity += p.gravity * dt;
        }
        let clamp = p.velocity_clamp.abs();
        p.velocity = p.velocity.clamp(-clamp, clamp);
        let delta = p.velocity * dt;
        p.friction = p.default_friction;
        self.bounds.translate(delta);

        self.run_hooks(HookPhase::Post, ctx);

        self.position_delta = self.position() - start;
    }

    fn run_hooks(&mut self, phase: HookPhase, ctx: &mut HookCtx<'_>) {
        let mut hooks = match phase {
            HookPhase::Pre => std::mem::take(&mut self.pre_hooks),
            HookPhase::Post => std::mem::take(&mut self.post_hooks),
        };
        for (_, hook) in hooks.iter_mut() {
            hook(self, ctx);
        }
        // hooks registered by a running hook land after the existing ones
        let slot = match phase {
            HookPhase::Pre => &mut self.pre_hooks,
            HookPhase::Post => &mut self.post_hooks,
        };
        for (name, hook) in std::mem::take(slot) {
            put_hook(&mut hooks, name, hook);
        }
        *slot = hooks;
    }
}

fn put_hook(hooks: &mut Vec<(String, BodyHook)>, name: String, hook: BodyHook) {
    match hooks.iter_mut().find(|(n, _)| *n == name) {
        Some(slot) => slot.1 = hook,
        None => hooks.push((name, hook)),
    }
}

/// Hook that lands the body on `floor_y`.
///
/// When the body moves downward with its bottom at or below the floor, it snaps
/// to the floor, stops, turns gravity off and calls `on_land`. Register it as a
/// post-process hook so the snap happens on the step that crossed the floor.
pub fn floor_clamp_hook<F>(floor_y: f32, mut on_land: F) -> BodyHook
where
    F: FnMut(&mut Body, &mut HookCtx<'_>) + Send + Sync + 'static,
{
    Box::new(move |body: &mut Body, ctx: &mut HookCtx<'_>| {
        if body.physics.velocity.y < 0.0 && body.bounds.y <= floor_y {
            body.bounds.y = floor_y;
            body.physics.velocity = Vec2::ZERO;
            body.physics.gravity_on = false;
            on_land(body, ctx);
        }
    })
}

impl Body {
    /// Register a prebuilt hook such as [`floor_clamp_hook`].
    pub fn put_boxed_post_hook(&mut self, name: impl Into<String>, hook: BodyHook) {
        put_hook(&mut self.post_hooks, name.into(), hook);
    }

    pub fn put_boxed_pre_hook(&mut self, name: impl Into<String>, hook: BodyHook) {
        put_hook(&mut self.pre_hooks, name.into(), hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::shape::Shape;
    use std::sync::{Arc, Mutex};

    struct Scratch {
        timers: Timers,
        signals: Signals,
        sounds: Vec<SoundRequest>,
    }

    impl Scratch {
        fn new() -> Self {
            Self {
                timers: Timers::new(),
                signals: Signals::default(),
                sounds: Vec::new(),
            }
        }

        fn ctx(&mut self) -> HookCtx<'_> {
            HookCtx {
                dt: 0.0,
                timers: &mut self.timers,
                signals: &mut self.signals,
                sounds: &mut self.sounds,
            }
        }
    }

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn gravity_integrates_velocity_and_position() {
        let g = -20.0;
        let dt = 1.0 / 240.0;
        let mut body = Body::new(Rect::new(0.0, 100.0, 1.0, 1.0))
            .with_gravity(Vec2::new(0.0, g), true);
        let mut s = Scratch::new();
        let steps = 240;
        for _ in 0..steps {
            body.step(dt, &mut s.ctx());
        }
        let t = steps as f32 * dt;
        assert!(approx_eq(body.velocity().y, g * t, 1e-3));
        // semi-implicit Euler overshoots by g*t*dt/2
        assert!(approx_eq(body.position().y, 100.0 + g * t * t / 2.0, 0.1));
    }

    #[test]
    fn gravity_off_does_nothing() {
        let mut body = Body::with_size(1.0, 1.0).with_gravity(Vec2::new(0.0, -10.0), false);
        let mut s = Scratch::new();
        body.step(0.5, &mut s.ctx());
        assert_eq!(body.velocity(), Vec2::ZERO);
        assert_eq!(body.position(), Vec2::ZERO);
    }

    #[test]
    fn velocity_clamped_before_position_update() {
        let mut body = Body::with_size(1.0, 1.0).with_velocity_clamp(Vec2::new(2.0, 2.0));
        body.set_velocity(Vec2::new(10.0, -10.0));
        let mut s = Scratch::new();
        body.step(1.0, &mut s.ctx());
        assert_eq!(body.velocity(), Vec2::new(2.0, -2.0));
        assert_eq!(body.position(), Vec2::new(2.0, -2.0));
    }

    #[test]
    fn friction_decays_exponentially() {
        let mut body = Body::with_size(1.0, 1.0).with_friction(Vec2::new(2.0, 0.0));
        body.set_velocity(Vec2::new(10.0, 5.0));
        let mut s = Scratch::new();
        body.step(0.5, &mut s.ctx());
        assert!(approx_eq(body.velocity().x, 10.0 * (-1.0f32).exp(), 1e-4));
        assert_eq!(body.velocity().y, 5.0);
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut body = Body::with_size(1.0, 1.0);
        for name in ["a", "b", DEFAULT_HOOK] {
            let log = log.clone();
            body.put_pre_hook(name, move |_, _| log.lock().unwrap().push(format!("pre:{name}")));
        }
        let post_log = log.clone();
        body.put_post_hook("after", move |_, _| post_log.lock().unwrap().push("post".into()));

        // replacing keeps the slot
        let replaced = log.clone();
        body.put_pre_hook("a", move |_, _| replaced.lock().unwrap().push("pre:a2".into()));

        let mut s = Scratch::new();
        body.step(0.1, &mut s.ctx());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["pre:a2", "pre:b", "pre:default", "post"]
        );
        assert_eq!(body.pre_hook_names().collect::<Vec<_>>(), vec!["a", "b", "default"]);
    }

    #[test]
    fn pre_hook_can_override_velocity() {
        let mut body = Body::with_size(1.0, 1.0);
        body.put_pre_hook(DEFAULT_HOOK, |b, _| b.physics.velocity.x = 4.0);
        let mut s = Scratch::new();
        body.step(0.5, &mut s.ctx());
        assert_eq!(body.position().x, 2.0);
        assert_eq!(body.position_delta(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn floor_clamp_snaps_and_reports_landing() {
        let mut body = Body::new(Rect::new(0.0, 100.5, 1.0, 1.0))
            .with_gravity(Vec2::new(0.0, -10.0), true);
        body.set_velocity(Vec2::new(0.0, -5.0));
        body.put_boxed_post_hook(
            "floor",
            floor_clamp_hook(100.0, |_, ctx| ctx.signals.set_flag("landed")),
        );
        let mut s = Scratch::new();
        body.step(0.25, &mut s.ctx());
        assert_eq!(body.position().y, 100.0);
        assert_eq!(body.velocity(), Vec2::ZERO);
        assert!(!body.physics.gravity_on);
        assert!(s.signals.has_flag("landed"));
    }

    #[test]
    fn floor_clamp_ignores_upward_motion() {
        let mut body = Body::new(Rect::new(0.0, 99.0, 1.0, 1.0));
        body.set_velocity(Vec2::new(0.0, 4.0));
        body.put_boxed_post_hook("floor", floor_clamp_hook(100.0, |_, _| {}));
        let mut s = Scratch::new();
        body.step(0.1, &mut s.ctx());
        assert!(body.velocity().y > 0.0);
    }

    #[test]
    fn fixtures_by_kind() {
        let body = Body::with_size(1.0, 1.0)
            .with_fixture(Fixture::new(FixtureType::Damager, Shape::square(1.0)))
            .with_fixture(Fixture::new(FixtureType::Damageable, Shape::square(1.0)))
            .with_fixture(Fixture::new(FixtureType::Damager, Shape::circle(0.5)));
        assert_eq!(body.fixtures_of(FixtureType::Damager).count(), 2);
        assert_eq!(body.fixtures_of(FixtureType::Shield).count(), 0);
    }

    #[test]
    fn senses_toggle() {
        let mut body = Body::with_size(1.0, 1.0);
        body.set_sense(BodySense::FeetOnGround, true);
        assert!(body.is_sensing(BodySense::FeetOnGround));
        body.clear_senses();
        assert!(!body.is_sensing(BodySense::FeetOnGround));
    }
}
