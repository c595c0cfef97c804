//! The entity enemies aim at, snapshotted once per tick.

use bevy_ecs::prelude::{Entity, Resource};
use glam::Vec2;

use crate::components::facing::Facing;

/// Read-only copy of the tracked entity's public state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSnapshot {
    pub entity: Entity,
    pub center: Vec2,
    pub velocity: Vec2,
    pub facing: Option<Facing>,
}

/// Tracked target, refreshed by [`crate::systems::target::track_target`].
///
/// `snapshot` is `None` when no live entity exposes the target capability.
#[derive(Resource, Debug, Clone, Default)]
pub struct Target {
    pub snapshot: Option<TargetSnapshot>,
}

impl Target {
    pub fn center(&self) -> Option<Vec2> {
        self.snapshot.map(|s| s.center)
    }
}
