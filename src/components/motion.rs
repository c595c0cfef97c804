//! Closed-form motion functions and the definitions that apply them to bodies.
//!
//! Every [`MotionFunction`] is a pure function of elapsed time. The same
//! configuration always reproduces the same trajectory from the same spawn
//! time, regardless of frame count or the body's current position.
//!
//! A [`MotionDefinition`] pairs a motion with an apply callback that writes the
//! value into a [`Body`]. Definitions live in the [`Motions`] component and are
//! replaced wholesale when parameters change.

use std::f32::consts::TAU;
use std::fmt;

use bevy_ecs::prelude::Component;
use glam::Vec2;

use crate::components::body::Body;

pub trait MotionFunction: Send + Sync {
    fn value_at(&self, elapsed: f32) -> Vec2;
}

/// Moves along x at `speed` while bobbing on y.
///
/// `value = origin + (speed * t, amplitude * sin(frequency * t + phase))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineWave {
    pub origin: Vec2,
    pub speed: f32,
    pub amplitude: f32,
    /// Angular frequency, radians per second.
    pub frequency: f32,
    pub phase: f32,
}

impl SineWave {
    pub fn new(origin: Vec2, speed: f32, amplitude: f32, frequency: f32) -> Self {
        Self {
            origin,
            speed,
            amplitude,
            frequency,
            phase: 0.0,
        }
    }

    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }
}

impl MotionFunction for SineWave {
    fn value_at(&self, t: f32) -> Vec2 {
        self.origin
            + Vec2::new(
                self.speed * t,
                self.amplitude * (self.frequency * t + self.phase).sin(),
            )
    }
}

/// Independent sinusoid on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillation {
    pub origin: Vec2,
    pub amplitude: Vec2,
    /// Cycles per second, per axis.
    pub frequency: Vec2,
    /// Phase offset in radians, per axis.
    pub phase: Vec2,
}

impl Oscillation {
    pub fn new(origin: Vec2, amplitude: Vec2, frequency: Vec2) -> Self {
        Self {
            origin,
            amplitude,
            frequency,
            phase: Vec2::ZERO,
        }
    }

    pub fn with_phase(mut self, phase: Vec2) -> Self {
        self.phase = phase;
        self
    }
}

impl MotionFunction for Oscillation {
    fn value_at(&self, t: f32) -> Vec2 {
        let angle = self.frequency * TAU * t + self.phase;
        self.origin + self.amplitude * Vec2::new(angle.x.sin(), angle.y.sin())
    }
}

/// End point of a line of `radius` spinning around `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatingLine {
    pub origin: Vec2,
    pub radius: f32,
    /// Degrees per second.
    pub speed: f32,
    /// Angle at t = 0, in degrees.
    pub start_degrees: f32,
}

impl RotatingLine {
    pub fn new(origin: Vec2, radius: f32, speed: f32) -> Self {
        Self {
            origin,
            radius,
            speed,
            start_degrees: 0.0,
        }
    }

    pub fn with_start(mut self, degrees: f32) -> Self {
        self.start_degrees = degrees;
        self
    }

    pub fn degrees_at(&self, t: f32) -> f32 {
        (self.start_degrees + self.speed * t).rem_euclid(360.0)
    }

    /// Point at `scale` of the radius along the line.
    pub fn scaled_point(&self, t: f32, scale: f32) -> Vec2 {
        let rad = self.degrees_at(t).to_radians();
        self.origin + Vec2::new(rad.cos(), rad.sin()) * self.radius * scale
    }
}

impl MotionFunction for RotatingLine {
    fn value_at(&self, t: f32) -> Vec2 {
        self.scaled_point(t, 1.0)
    }
}

/// Constant velocity from a start point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMotion {
    pub start: Vec2,
    pub velocity: Vec2,
}

impl MotionFunction for LinearMotion {
    fn value_at(&self, t: f32) -> Vec2 {
        self.start + self.velocity * t
    }
}

/// Small-angle pendulum hanging from `anchor`.
///
/// `theta(t) = max_angle * cos(sqrt(g / length) * t)`, measured from straight
/// down. The value is the bob position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pendulum {
    pub anchor: Vec2,
    pub length: f32,
    pub gravity: f32,
    /// Initial swing angle in radians.
    pub max_angle: f32,
}

impl Pendulum {
    pub fn new(anchor: Vec2, length: f32, gravity: f32, max_angle: f32) -> Self {
        Self {
            anchor,
            length,
            gravity,
            max_angle,
        }
    }

    pub fn angle_at(&self, t: f32) -> f32 {
        if self.length <= 0.0 {
            return 0.0;
        }
        let omega = (self.gravity.abs() / self.length).sqrt();
        self.max_angle * (omega * t).cos()
    }

    /// Point `distance` along the rod from the anchor.
    pub fn point_from_anchor(&self, t: f32, distance: f32) -> Vec2 {
        let theta = self.angle_at(t);
        self.anchor + Vec2::new(theta.sin(), -theta.cos()) * distance
    }
}

impl MotionFunction for Pendulum {
    fn value_at(&self, t: f32) -> Vec2 {
        self.point_from_anchor(t, self.length)
    }
}

pub type MotionApply = Box<dyn Fn(Vec2, &mut Body) + Send + Sync>;

pub struct MotionDefinition {
    pub motion: Box<dyn MotionFunction>,
    pub apply: MotionApply,
    pub elapsed: f32,
}

impl fmt::Debug for MotionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionDefinition")
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

impl MotionDefinition {
    pub fn new<M, F>(motion: M, apply: F) -> Self
    where
        M: MotionFunction + 'static,
        F: Fn(Vec2, &mut Body) + Send + Sync + 'static,
    {
        Self {
            motion: Box::new(motion),
            apply: Box::new(apply),
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` and write the new value into `body`.
    pub fn step(&mut self, dt: f32, body: &mut Body) {
        self.elapsed += dt;
        let value = self.motion.value_at(self.elapsed);
        (self.apply)(value, body);
    }

    pub fn value(&self) -> Vec2 {
        self.motion.value_at(self.elapsed)
    }
}

/// Ready-made apply callbacks.
pub mod apply {
    use super::*;

    pub fn set_center(value: Vec2, body: &mut Body) {
        body.set_center(value);
    }

    pub fn set_center_y(value: Vec2, body: &mut Body) {
        let c = body.center();
        body.set_center(Vec2::new(c.x, value.y));
    }

    /// Treat the value as a velocity.
    pub fn set_velocity(value: Vec2, body: &mut Body) {
        body.set_velocity(value);
    }

    pub fn translate(value: Vec2, body: &mut Body) {
        body.bounds.translate(value);
    }
}

/// Active motions of an entity, stepped in insertion order.
#[derive(Component, Debug, Default)]
pub struct Motions {
    entries: Vec<(String, MotionDefinition)>,
}

impl Motions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, def: MotionDefinition) -> Self {
        self.put(name, def);
        self
    }

    /// Insert or replace the named definition. A replacement starts at t = 0.
    pub fn put(&mut self, name: impl Into<String>, def: MotionDefinition) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = def,
            None => self.entries.push((name, def)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<MotionDefinition> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, name: &str) -> Option<&MotionDefinition> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn reset(&mut self) {
        for (_, def) in self.entries.iter_mut() {
            def.elapsed = 0.0;
        }
    }

    pub fn step(&mut self, dt: f32, body: &mut Body) {
        for (_, def) in self.entries.iter_mut() {
            def.step(dt, body);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
