use bevy_ecs::prelude::Component;

/// Identity and liveness of a simulated entity.
///
/// `tag` names the definition that spawned it. `alive` turns false when the
/// entity is destroyed, just before `on_destroy` runs. An entity merely queued
/// in [`DespawnQueue`](crate::resources::queues::DespawnQueue) is still alive
/// until the end-of-tick flush; systems that must ignore it check the queue.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct EntityInfo {
    pub tag: String,
    pub alive: bool,
    /// Times this entity has been (re)spawned.
    pub spawn_count: u32,
}

impl EntityInfo {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            alive: true,
            spawn_count: 1,
        }
    }
}
