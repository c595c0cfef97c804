//! Entity definitions.
//!
//! An entity is a bevy `Entity` plus the components its definition inserts.
//! A definition is the thin per-type configuration layer: it resolves its
//! assets once, then builds the entity's parts from a [`SpawnConfig`] every
//! time an instance is (re)spawned.
//!
//! Lifecycle, as driven by
//! [`EntityFactory`](crate::resources::entityfactory::EntityFactory):
//!
//! 1. `init` runs once per definition, lazily, before its first spawn.
//! 2. `on_spawn` runs on every spawn and respawn. It must insert every
//!    time-varying component (body, timers, facing, brain, animations) so a
//!    reused entity behaves exactly like a fresh one.
//! 3. `on_destroy` runs once when the instance leaves the simulation, before
//!    its owned children are destroyed with it.

use bevy_ecs::prelude::Entity;
use bevy_ecs::world::EntityWorldMut;

use crate::error::SimResult;
use crate::resources::assets::AssetRegistry;
use crate::resources::simconfig::SimConfig;
use crate::resources::target::TargetSnapshot;
use crate::spawn::SpawnConfig;

/// World facts handed to `on_spawn`.
#[derive(Debug, Clone)]
pub struct SpawnCtx {
    pub sim: SimConfig,
    pub parent: Option<Entity>,
    pub target: Option<TargetSnapshot>,
}

impl SpawnCtx {
    /// Tiles to world units.
    pub fn scale(&self, tiles: f32) -> f32 {
        tiles * self.sim.ppm
    }
}

pub trait EntityDefinition: Send + Sync {
    fn tag(&self) -> &'static str;

    fn init(&mut self, _assets: &mut AssetRegistry) -> SimResult<()> {
        Ok(())
    }

    fn on_spawn(
        &self,
        entity: &mut EntityWorldMut<'_>,
        config: &SpawnConfig,
        ctx: &SpawnCtx,
    ) -> SimResult<()>;

    fn on_destroy(&self, _entity: &mut EntityWorldMut<'_>) {}
}
