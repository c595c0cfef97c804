//! End-of-tick structural changes.
//!
//! These run after every per-entity system, at the only point in the tick
//! where entities appear or disappear:
//!
//! 1. [`flush_despawns`] destroys queued entities and their owned children.
//! 2. [`prune_children`] drops dead entries from surviving parents.
//! 3. [`flush_spawns`] spawns the requested entities, which start updating on
//!    the next tick.

use bevy_ecs::prelude::*;
use log::error;

use crate::components::children::OwnedChildren;
use crate::components::entityinfo::EntityInfo;
use crate::resources::entityfactory::{destroy_entity, spawn_entity};
use crate::resources::queues::{DespawnQueue, SpawnQueue};

pub fn flush_despawns(world: &mut World) {
    loop {
        let pending = world.resource_mut::<DespawnQueue>().drain();
        if pending.is_empty() {
            break;
        }
        for (entity, reason) in pending {
            destroy_entity(world, entity, reason);
        }
    }
}

pub fn prune_children(mut parents: Query<&mut OwnedChildren>, infos: Query<&EntityInfo>) {
    for mut children in parents.iter_mut() {
        children.prune(|child| infos.get(child).is_ok_and(|info| info.alive));
    }
}

/// Spawn queued requests. Requests whose parent died this tick are dropped;
/// a failing spawn is logged and does not affect the others.
pub fn flush_spawns(world: &mut World) {
    let pending = world.resource_mut::<SpawnQueue>().drain();
    for request in pending {
        if let Some(parent) = request.parent {
            let alive = world
                .get::<EntityInfo>(parent)
                .is_some_and(|info| info.alive);
            if !alive {
                continue;
            }
        }
        if let Err(err) = spawn_entity(world, &request.tag, request.config, request.parent) {
            error!(target: "sim", "requested spawn of `{}` failed: {err}", request.tag);
        }
    }
}
