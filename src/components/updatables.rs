//! Per-tick update callbacks and the context they run with.

use std::fmt;

use bevy_ecs::prelude::{Component, Entity};

use crate::components::body::Body;
use crate::components::children::OwnedChildren;
use crate::components::facing::Facing;
use crate::components::motion::Motions;
use crate::components::signals::Signals;
use crate::components::timer::Timers;
use crate::error::SimResult;
use crate::events::audio::SoundRequest;
use crate::resources::target::TargetSnapshot;
use crate::spawn::{SpawnConfig, SpawnRequest};

/// Everything an update callback or state behavior may read or mutate.
///
/// Only the entity's own components are writable. Other entities are visible
/// through the [`TargetSnapshot`]; new entities are requested through
/// [`UpdateCtx::spawn_child`] and appear at the end of the tick.
pub struct UpdateCtx<'a> {
    pub entity: Entity,
    pub tag: &'a str,
    pub dt: f32,
    pub body: &'a mut Body,
    pub timers: &'a mut Timers,
    pub signals: &'a mut Signals,
    pub facing: Option<&'a mut Facing>,
    pub children: Option<&'a mut OwnedChildren>,
    pub motions: Option<&'a mut Motions>,
    pub target: Option<TargetSnapshot>,
    pub spawns: &'a mut Vec<SpawnRequest>,
    pub sounds: &'a mut Vec<SoundRequest>,
    /// Set to queue this entity for destruction.
    pub kill: bool,
}

impl UpdateCtx<'_> {
    pub fn facing(&self) -> Facing {
        self.facing.as_deref().copied().unwrap_or_default()
    }

    pub fn set_facing(&mut self, facing: Facing) {
        if let Some(f) = self.facing.as_deref_mut() {
            *f = facing;
        }
    }

    /// Turn toward the tracked target, if there is one.
    pub fn face_target(&mut self) {
        if let Some(target) = self.target {
            let facing = Facing::toward(self.body.center().x, target.center.x);
            self.set_facing(facing);
        }
    }

    pub fn spawn(&mut self, tag: impl Into<String>, config: SpawnConfig) {
        self.spawns.push(SpawnRequest::new(tag, config));
    }

    /// Spawn an entity tracked in this entity's [`OwnedChildren`].
    pub fn spawn_child(&mut self, tag: impl Into<String>, config: SpawnConfig) {
        self.spawns
            .push(SpawnRequest::new(tag, config).child_of(self.entity));
    }

    pub fn play_sound(&mut self, tag: impl Into<String>, looped: bool) {
        self.sounds.push(SoundRequest {
            tag: tag.into(),
            looped,
        });
    }

    pub fn die(&mut self) {
        self.kill = true;
    }

    pub fn live_children(&self) -> usize {
        self.children.as_deref().map_or(0, OwnedChildren::len)
    }
}

pub type UpdateFn = Box<dyn FnMut(&mut UpdateCtx<'_>) -> SimResult<()> + Send + Sync>;

/// Ordered, append-only list of update callbacks.
#[derive(Component, Default)]
pub struct Updatables {
    callbacks: Vec<UpdateFn>,
}

impl fmt::Debug for Updatables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updatables")
            .field("len", &self.callbacks.len())
            .finish()
    }
}

impl Updatables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut UpdateCtx<'_>) -> SimResult<()> + Send + Sync + 'static,
    {
        self.add(f);
        self
    }

    pub fn add<F>(&mut self, f: F)
    where
        F: FnMut(&mut UpdateCtx<'_>) -> SimResult<()> + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(f));
    }

    /// Run every callback in order, stopping at the first error.
    pub fn run(&mut self, ctx: &mut UpdateCtx<'_>) -> SimResult<()> {
        for callback in self.callbacks.iter_mut() {
            callback(ctx)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// Owned scratch state for building an [`UpdateCtx`] outside the ECS.
#[cfg(test)]
pub(crate) struct CtxParts {
    pub body: Body,
    pub timers: Timers,
    pub signals: Signals,
    pub facing: Facing,
    pub spawns: Vec<SpawnRequest>,
    pub sounds: Vec<SoundRequest>,
}

#[cfg(test)]
impl CtxParts {
    pub fn new(body: Body) -> Self {
        Self {
            body,
            timers: Timers::new(),
            signals: Signals::default(),
            facing: Facing::default(),
            spawns: Vec::new(),
            sounds: Vec::new(),
        }
    }

    pub fn ctx(&mut self, dt: f32) -> UpdateCtx<'_> {
        UpdateCtx {
            entity: Entity::PLACEHOLDER,
            tag: "test",
            dt,
            body: &mut self.body,
            timers: &mut self.timers,
            signals: &mut self.signals,
            facing: Some(&mut self.facing),
            children: None,
            motions: None,
            target: None,
            spawns: &mut self.spawns,
            sounds: &mut self.sounds,
            kill: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use glam::Vec2;

    #[test]
    fn callbacks_run_in_order_and_stop_on_error() {
        let mut updatables = Updatables::new()
            .with(|ctx| {
                ctx.signals.set_integer("n", 1);
                Ok(())
            })
            .with(|ctx| {
                let n = ctx.signals.integer("n").unwrap_or(0);
                ctx.signals.set_integer("n", n * 10);
                Err(SimError::NotImplemented {
                    entity: ctx.tag.to_string(),
                    state: "x".into(),
                })
            })
            .with(|ctx| {
                ctx.signals.set_flag("unreachable");
                Ok(())
            });
        let mut parts = CtxParts::new(Body::with_size(1.0, 1.0));
        let result = updatables.run(&mut parts.ctx(0.1));
        assert!(result.is_err());
        assert_eq!(parts.signals.integer("n"), Some(10));
        assert!(!parts.signals.has_flag("unreachable"));
        assert_eq!(updatables.len(), 3);
    }

    #[test]
    fn face_target_and_requests() {
        let mut parts = CtxParts::new(Body::with_size(2.0, 2.0));
        let mut ctx = parts.ctx(0.1);
        ctx.target = Some(TargetSnapshot {
            entity: Entity::PLACEHOLDER,
            center: Vec2::new(-10.0, 0.0),
            velocity: Vec2::ZERO,
            facing: None,
        });
        ctx.face_target();
        assert_eq!(ctx.facing(), Facing::Left);
        ctx.spawn_child("shot", SpawnConfig::new());
        ctx.play_sound("dink", false);
        ctx.die();
        assert!(ctx.kill);
        assert_eq!(parts.spawns.len(), 1);
        assert_eq!(parts.spawns[0].parent, Some(Entity::PLACEHOLDER));
        assert_eq!(parts.sounds, vec![SoundRequest::once("dink")]);
    }
}
