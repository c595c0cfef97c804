//! Spawn and despawn notifications.
//!
//! Written by the end-of-tick flush systems once the structural change has
//! been applied, so readers always see entities that exist (spawned) or are
//! already gone (despawned).

use bevy_ecs::message::Message;
use bevy_ecs::prelude::Entity;

use crate::resources::queues::DespawnReason;

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Spawned {
        entity: Entity,
        tag: String,
        parent: Option<Entity>,
    },
    Despawned {
        entity: Entity,
        tag: String,
        reason: DespawnReason,
    },
}

impl LifecycleEvent {
    pub fn entity(&self) -> Entity {
        match self {
            LifecycleEvent::Spawned { entity, .. } | LifecycleEvent::Despawned { entity, .. } => {
                *entity
            }
        }
    }
}
