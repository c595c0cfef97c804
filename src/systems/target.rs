//! Target tracking.
//!
//! Enemies aim at a single tracked entity, usually the player. The snapshot is
//! taken before any entity updates, so every entity sees the same target
//! state for the whole tick.

use bevy_ecs::prelude::*;

use crate::components::body::Body;
use crate::components::capabilities::{Capabilities, Capability};
use crate::components::entityinfo::EntityInfo;
use crate::components::facing::Facing;
use crate::resources::target::{Target, TargetSnapshot};

/// Snapshot the live entity exposing [`Capability::Target`].
///
/// When several qualify the lowest entity id wins, keeping runs reproducible.
pub fn track_target(
    mut target: ResMut<Target>,
    query: Query<(Entity, &EntityInfo, &Capabilities, &Body, Option<&Facing>)>,
) {
    target.snapshot = query
        .iter()
        .filter(|(_, info, caps, _, _)| info.alive && caps.has(Capability::Target))
        .min_by_key(|(entity, ..)| *entity)
        .map(|(entity, _, _, body, facing)| TargetSnapshot {
            entity,
            center: body.center(),
            velocity: body.velocity(),
            facing: facing.copied(),
        });
}
