//! Entity definition registry and lifecycle driver.
//!
//! [`EntityFactory`] maps entity tags to their [`EntityDefinition`]s. The free
//! functions [`spawn_entity`], [`respawn_entity`] and [`destroy_entity`] take
//! the factory out of the world for the duration of the call, so definitions
//! get full `EntityWorldMut` access while they build or tear down an entity.
//!
//! Guarantees:
//! - `init` runs at most once per definition, before its first spawn.
//! - A failed `on_spawn` leaves nothing behind: the partial entity is despawned
//!   and the error is returned to the caller.
//! - Destroying an entity destroys its owned children, recursively.

use std::fmt;

use bevy_ecs::prelude::*;
use log::{debug, info, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::components::children::OwnedChildren;
use crate::components::entityinfo::EntityInfo;
use crate::entity::{EntityDefinition, SpawnCtx};
use crate::error::{SimError, SimResult};
use crate::events::lifecycle::LifecycleEvent;
use crate::resources::assets::AssetRegistry;
use crate::resources::queues::DespawnReason;
use crate::resources::simconfig::SimConfig;
use crate::resources::target::Target;
use crate::spawn::SpawnConfig;

#[derive(Resource, Default)]
pub struct EntityFactory {
    definitions: FxHashMap<String, Box<dyn EntityDefinition>>,
    initialized: FxHashSet<String>,
}

impl fmt::Debug for EntityFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.tags().collect();
        tags.sort_unstable();
        f.debug_struct("EntityFactory")
            .field("definitions", &tags)
            .field("initialized", &self.initialized.len())
            .finish()
    }
}

impl EntityFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its tag, replacing any previous one.
    pub fn register(&mut self, definition: impl EntityDefinition + 'static) {
        let tag = definition.tag().to_string();
        if self
            .definitions
            .insert(tag.clone(), Box::new(definition))
            .is_some()
        {
            warn!(target: "factory", "definition `{tag}` replaced");
            self.initialized.remove(&tag);
        }
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.definitions.contains_key(tag)
    }

    pub fn is_initialized(&self, tag: &str) -> bool {
        self.initialized.contains(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    fn ensure_initialized(&mut self, world: &mut World, tag: &str) -> SimResult<()> {
        if self.initialized.contains(tag) {
            return Ok(());
        }
        let definition = self
            .definitions
            .get_mut(tag)
            .ok_or_else(|| SimError::UnknownEntityType(tag.to_string()))?;
        let mut assets = world.get_resource_or_insert_with(AssetRegistry::default);
        definition.init(&mut assets)?;
        self.initialized.insert(tag.to_string());
        debug!(target: "factory", "initialized `{tag}`");
        Ok(())
    }

    fn spawn_ctx(world: &World, parent: Option<Entity>) -> SpawnCtx {
        SpawnCtx {
            sim: world.get_resource::<SimConfig>().cloned().unwrap_or_default(),
            parent,
            target: world.get_resource::<Target>().and_then(|t| t.snapshot),
        }
    }

    fn spawn_in(
        &mut self,
        world: &mut World,
        tag: &str,
        mut config: SpawnConfig,
        parent: Option<Entity>,
    ) -> SimResult<Entity> {
        self.ensure_initialized(world, tag)?;
        let definition = self
            .definitions
            .get(tag)
            .ok_or_else(|| SimError::UnknownEntityType(tag.to_string()))?;
        config.set_tag(tag);
        let ctx = Self::spawn_ctx(world, parent);

        let mut entity = world.spawn(EntityInfo::new(tag));
        if let Err(err) = definition.on_spawn(&mut entity, &config, &ctx) {
            entity.despawn();
            warn!(target: "factory", "spawn of `{tag}` failed: {err}");
            return Err(err);
        }
        let id = entity.id();

        if let Some(parent) = parent {
            match world.get_entity_mut(parent) {
                Ok(mut owner) => {
                    if let Some(mut children) = owner.get_mut::<OwnedChildren>() {
                        children.add(id);
                    } else {
                        let mut children = OwnedChildren::new();
                        children.add(id);
                        owner.insert(children);
                    }
                }
                Err(_) => warn!(target: "factory", "`{tag}` spawned for missing parent {parent}"),
            }
        }

        world.write_message(LifecycleEvent::Spawned {
            entity: id,
            tag: tag.to_string(),
            parent,
        });
        info!(target: "factory", "spawned `{tag}` as {id}");
        Ok(id)
    }

    fn respawn_in(
        &mut self,
        world: &mut World,
        entity: Entity,
        mut config: SpawnConfig,
    ) -> SimResult<()> {
        let tag = world
            .get::<EntityInfo>(entity)
            .map(|info| info.tag.clone())
            .ok_or_else(|| SimError::NoSuchEntity(entity.to_string()))?;
        self.ensure_initialized(world, &tag)?;

        // Children of the previous incarnation leave with it.
        let children = world
            .get_mut::<OwnedChildren>(entity)
            .map(|mut c| c.drain())
            .unwrap_or_default();
        for child in children {
            self.destroy_in(world, child, DespawnReason::Parent);
        }

        let definition = self
            .definitions
            .get(&tag)
            .ok_or_else(|| SimError::UnknownEntityType(tag.clone()))?;
        config.set_tag(&tag);
        let ctx = Self::spawn_ctx(world, None);

        let mut e = world
            .get_entity_mut(entity)
            .map_err(|_| SimError::NoSuchEntity(entity.to_string()))?;
        e.retain::<EntityInfo>();
        if let Some(mut info) = e.get_mut::<EntityInfo>() {
            info.alive = true;
            info.spawn_count += 1;
        }
        if let Err(err) = definition.on_spawn(&mut e, &config, &ctx) {
            e.despawn();
            warn!(target: "factory", "respawn of `{tag}` failed: {err}");
            return Err(err);
        }
        debug!(target: "factory", "respawned `{tag}` as {entity}");
        Ok(())
    }

    fn destroy_in(&self, world: &mut World, entity: Entity, reason: DespawnReason) -> bool {
        let Ok(mut e) = world.get_entity_mut(entity) else {
            return false;
        };
        let tag = e
            .get::<EntityInfo>()
            .map(|info| info.tag.clone())
            .unwrap_or_default();
        if let Some(mut info) = e.get_mut::<EntityInfo>() {
            info.alive = false;
        }
        if let Some(definition) = self.definitions.get(&tag) {
            definition.on_destroy(&mut e);
        }
        let children = e
            .get_mut::<OwnedChildren>()
            .map(|mut c| c.drain())
            .unwrap_or_default();
        e.despawn();
        debug!(target: "factory", "despawned `{tag}` {entity} ({reason:?})");
        world.write_message(LifecycleEvent::Despawned {
            entity,
            tag,
            reason,
        });

        for child in children {
            self.destroy_in(world, child, DespawnReason::Parent);
        }
        true
    }
}

/// Spawn a new entity of type `tag`.
pub fn spawn_entity(
    world: &mut World,
    tag: &str,
    config: SpawnConfig,
    parent: Option<Entity>,
) -> SimResult<Entity> {
    world
        .try_resource_scope(|world, mut factory: Mut<EntityFactory>| {
            factory.spawn_in(world, tag, config, parent)
        })
        .unwrap_or_else(|| Err(SimError::UnknownEntityType(tag.to_string())))
}

/// Reactivate an existing entity with a fresh configuration.
///
/// Every component except [`EntityInfo`] is dropped before `on_spawn` runs, so
/// the reused entity ends up indistinguishable from a freshly spawned one.
pub fn respawn_entity(world: &mut World, entity: Entity, config: SpawnConfig) -> SimResult<()> {
    world
        .try_resource_scope(|world, mut factory: Mut<EntityFactory>| {
            factory.respawn_in(world, entity, config)
        })
        .unwrap_or_else(|| Err(SimError::NoSuchEntity(entity.to_string())))
}

/// Run `on_destroy`, despawn the entity and then its owned children.
///
/// Returns false when the entity no longer exists.
pub fn destroy_entity(world: &mut World, entity: Entity, reason: DespawnReason) -> bool {
    world
        .try_resource_scope(|world, factory: Mut<EntityFactory>| {
            factory.destroy_in(world, entity, reason)
        })
        .unwrap_or(false)
}
