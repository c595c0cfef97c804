//! Typed collision volumes attached to a [`Body`](super::body::Body).
//!
//! A fixture's world shape is the body's center plus the fixture offset. Several
//! fixtures of different kinds may overlap on the same body; contact systems pair
//! them by [`FixtureType`] to decide what happens (push, damage, sensing).
//!
//! Force and bouncer fixtures may carry a velocity-alteration callback. It runs
//! when the fixture overlaps a pushable party and returns how the *other* body's
//! velocity should change. Returning [`VelocityAlteration::add_none`] vetoes the
//! push entirely.

use std::fmt;
use std::sync::Arc;

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::components::capabilities::{Capabilities, Capability, Category};
use crate::components::facing::Facing;
use crate::components::shape::{Shape, WorldShape};
use crate::components::timer::Timers;
use crate::events::audio::SoundRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixtureType {
    Body,
    Block,
    Damager,
    Damageable,
    Force,
    Bouncer,
    Shield,
    Side,
    Feet,
    Head,
    Death,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Small property bag for type-specific fixture metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureProps {
    pub side: Option<Side>,
    pub direction: Option<Direction>,
    /// Death fixtures: kill on touch instead of dealing negotiated damage.
    pub instant: bool,
    pub strings: FxHashMap<String, String>,
    pub floats: FxHashMap<String, f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterationAction {
    Add,
    Set,
    None,
}

/// Requested change to a body's velocity, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityAlteration {
    pub x: f32,
    pub y: f32,
    pub action_x: AlterationAction,
    pub action_y: AlterationAction,
}

impl VelocityAlteration {
    pub fn new(x: f32, y: f32, action_x: AlterationAction, action_y: AlterationAction) -> Self {
        Self {
            x,
            y,
            action_x,
            action_y,
        }
    }

    pub fn add(x: f32, y: f32) -> Self {
        Self::new(x, y, AlterationAction::Add, AlterationAction::Add)
    }

    pub fn set(x: f32, y: f32) -> Self {
        Self::new(x, y, AlterationAction::Set, AlterationAction::Set)
    }

    /// The veto: leaves the other body untouched.
    pub fn add_none() -> Self {
        Self::new(0.0, 0.0, AlterationAction::None, AlterationAction::None)
    }

    pub fn is_none(&self) -> bool {
        self.action_x == AlterationAction::None && self.action_y == AlterationAction::None
    }

    /// Apply to a velocity in place.
    pub fn apply_to(&self, velocity: &mut Vec2) {
        match self.action_x {
            AlterationAction::Add => velocity.x += self.x,
            AlterationAction::Set => velocity.x = self.x,
            AlterationAction::None => {}
        }
        match self.action_y {
            AlterationAction::Add => velocity.y += self.y,
            AlterationAction::Set => velocity.y = self.y,
            AlterationAction::None => {}
        }
    }
}

/// Read-only snapshot of one side of a fixture contact.
#[derive(Debug, Clone)]
pub struct ContactParty {
    pub entity: Entity,
    pub fixture: FixtureType,
    /// World-space center of the fixture.
    pub center: Vec2,
    /// World-space center of the owning body.
    pub body_center: Vec2,
    pub velocity: Vec2,
    pub facing: Option<Facing>,
    pub capabilities: Option<Capabilities>,
}

impl ContactParty {
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities
            .as_ref()
            .is_some_and(|c| c.has(capability))
    }

    pub fn is(&self, category: Category) -> bool {
        self.capabilities.as_ref().is_some_and(|c| c.is(category))
    }
}

/// What a velocity-alteration callback sees and may touch.
///
/// `own` is the party carrying the force fixture; its timers and sound buffer
/// are writable so the callback can start cooldowns or play a sound.
pub struct AlterationCtx<'a> {
    pub own: &'a ContactParty,
    pub other: &'a ContactParty,
    pub dt: f32,
    pub timers: &'a mut Timers,
    pub sounds: &'a mut Vec<SoundRequest>,
}

pub type AlterationFn = Arc<dyn Fn(&mut AlterationCtx<'_>) -> VelocityAlteration + Send + Sync>;

#[derive(Clone)]
pub struct Fixture {
    pub kind: FixtureType,
    pub shape: Shape,
    /// Offset of the fixture center from the body center.
    pub offset: Vec2,
    pub active: bool,
    pub props: FixtureProps,
    pub velocity_alteration: Option<AlterationFn>,
    /// Pushing an ownable party clears its owner.
    pub detach_owner_on_push: bool,
}

impl fmt::Debug for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixture")
            .field("kind", &self.kind)
            .field("shape", &self.shape)
            .field("offset", &self.offset)
            .field("active", &self.active)
            .field("props", &self.props)
            .field("velocity_alteration", &self.velocity_alteration.is_some())
            .field("detach_owner_on_push", &self.detach_owner_on_push)
            .finish()
    }
}

impl Fixture {
    pub fn new(kind: FixtureType, shape: Shape) -> Self {
        Self {
            kind,
            shape,
            offset: Vec2::ZERO,
            active: true,
            props: FixtureProps::default(),
            velocity_alteration: None,
            detach_owner_on_push: false,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.props.side = Some(side);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.props.direction = Some(direction);
        self
    }

    pub fn instant(mut self) -> Self {
        self.props.instant = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn with_alteration<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut AlterationCtx<'_>) -> VelocityAlteration + Send + Sync + 'static,
    {
        self.velocity_alteration = Some(Arc::new(f));
        self
    }

    pub fn detaching_owner(mut self) -> Self {
        self.detach_owner_on_push = true;
        self
    }

    pub fn world_center(&self, body_center: Vec2) -> Vec2 {
        body_center + self.offset
    }

    pub fn world_shape(&self, body_center: Vec2) -> WorldShape {
        self.shape.world(self.world_center(body_center))
    }

    pub fn side(&self) -> Option<Side> {
        self.props.side
    }
}
