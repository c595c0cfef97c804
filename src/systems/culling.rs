use bevy_ecs::prelude::*;
use log::debug;

use crate::components::body::Body;
use crate::components::cullable::Cullable;
use crate::components::entityinfo::EntityInfo;
use crate::resources::cullbounds::CullBounds;
use crate::resources::queues::{DespawnQueue, DespawnReason};
use crate::resources::worldtime::WorldTime;

/// Queue entities that stayed out of bounds past their grace period or
/// outlived their lifetime. Removal happens in the end-of-tick flush.
pub fn cull_entities(
    time: Res<WorldTime>,
    bounds: Res<CullBounds>,
    mut despawn_queue: ResMut<DespawnQueue>,
    mut query: Query<(Entity, &EntityInfo, &Body, &mut Cullable)>,
) {
    for (entity, info, body, mut cullable) in query.iter_mut() {
        if !info.alive {
            continue;
        }
        if cullable.update(time.delta, bounds.contains(&body.bounds)) {
            debug!(target: "sim", "culling {} {entity}", info.tag);
            despawn_queue.push(entity, DespawnReason::Culled);
        }
    }
}
