//! Per-entity update callbacks.
//!
//! Each live entity with [`Updatables`] gets one [`UpdateCtx`] per tick built
//! from its own components. Requests the callbacks leave behind are collected
//! after the entity finishes:
//!
//! - spawn requests go to [`SpawnQueue`]
//! - sounds become `SoundRequest` messages
//! - `die()` and callback errors queue the entity in [`DespawnQueue`]
//!
//! A failing entity is logged and culled at the end of the tick; the other
//! entities keep running.

use bevy_ecs::prelude::*;
use log::error;

use crate::components::body::Body;
use crate::components::children::OwnedChildren;
use crate::components::entityinfo::EntityInfo;
use crate::components::facing::Facing;
use crate::components::motion::Motions;
use crate::components::signals::Signals;
use crate::components::timer::Timers;
use crate::components::updatables::{UpdateCtx, Updatables};
use crate::error::SimResult;
use crate::events::audio::SoundRequest;
use crate::resources::queues::{DespawnQueue, DespawnReason, SpawnQueue};
use crate::resources::target::Target;
use crate::resources::worldtime::WorldTime;
use crate::spawn::SpawnRequest;

/// Requests gathered from one entity's callbacks.
#[derive(Default)]
pub(crate) struct Outbox {
    pub spawns: Vec<SpawnRequest>,
    pub sounds: Vec<SoundRequest>,
}

impl Outbox {
    /// Hand the gathered requests to the world and queue the entity if it died
    /// or failed.
    pub(crate) fn settle(
        &mut self,
        entity: Entity,
        tag: &str,
        outcome: SimResult<bool>,
        spawn_queue: &mut SpawnQueue,
        despawn_queue: &mut DespawnQueue,
        sounds: &mut MessageWriter<SoundRequest>,
    ) {
        sounds.write_batch(self.sounds.drain(..));
        match outcome {
            Ok(kill) => {
                spawn_queue.pending.append(&mut self.spawns);
                if kill {
                    despawn_queue.push(entity, DespawnReason::Killed);
                }
            }
            Err(err) => {
                error!(target: "sim", "{tag} {entity}: {err}");
                self.spawns.clear();
                despawn_queue.push(entity, DespawnReason::Failed);
            }
        }
    }
}

/// Run every entity's update callbacks in registration order.
#[allow(clippy::type_complexity)]
pub fn run_updatables(
    time: Res<WorldTime>,
    target: Res<Target>,
    mut spawn_queue: ResMut<SpawnQueue>,
    mut despawn_queue: ResMut<DespawnQueue>,
    mut sounds: MessageWriter<SoundRequest>,
    mut query: Query<(
        Entity,
        &EntityInfo,
        &mut Updatables,
        &mut Body,
        &mut Timers,
        &mut Signals,
        Option<&mut Facing>,
        Option<&mut OwnedChildren>,
        Option<&mut Motions>,
    )>,
) {
    let mut outbox = Outbox::default();
    for (entity, info, mut updatables, mut body, mut timers, mut signals, facing, children, motions) in
        query.iter_mut()
    {
        if !info.alive || despawn_queue.contains(entity) {
            continue;
        }
        let mut ctx = UpdateCtx {
            entity,
            tag: &info.tag,
            dt: time.delta,
            body: &mut body,
            timers: &mut timers,
            signals: &mut signals,
            facing: facing.map(Mut::into_inner),
            children: children.map(Mut::into_inner),
            motions: motions.map(Mut::into_inner),
            target: target.snapshot,
            spawns: &mut outbox.spawns,
            sounds: &mut outbox.sounds,
            kill: false,
        };
        let outcome = updatables.run(&mut ctx).map(|()| ctx.kill);
        outbox.settle(
            entity,
            &info.tag,
            outcome,
            &mut spawn_queue,
            &mut despawn_queue,
            &mut sounds,
        );
    }
}
