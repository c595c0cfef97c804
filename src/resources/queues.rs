//! Deferred structural changes.
//!
//! Systems never spawn or despawn simulated entities mid-iteration. They push
//! requests here and the end-of-tick flush systems apply them.

use bevy_ecs::prelude::{Entity, Resource};

use crate::spawn::SpawnRequest;

#[derive(Resource, Debug, Default)]
pub struct SpawnQueue {
    pub pending: Vec<SpawnRequest>,
}

impl SpawnQueue {
    pub fn push(&mut self, request: SpawnRequest) {
        self.pending.push(request);
    }

    pub fn drain(&mut self) -> Vec<SpawnRequest> {
        std::mem::take(&mut self.pending)
    }
}

/// Why an entity is leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespawnReason {
    Culled,
    Killed,
    Failed,
    Parent,
}

#[derive(Resource, Debug, Default)]
pub struct DespawnQueue {
    pub pending: Vec<(Entity, DespawnReason)>,
}

impl DespawnQueue {
    /// Queue once; later requests for the same entity are ignored.
    pub fn push(&mut self, entity: Entity, reason: DespawnReason) {
        if !self.pending.iter().any(|(e, _)| *e == entity) {
            self.pending.push((entity, reason));
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.pending.iter().any(|(e, _)| *e == entity)
    }

    pub fn drain(&mut self) -> Vec<(Entity, DespawnReason)> {
        std::mem::take(&mut self.pending)
    }
}
