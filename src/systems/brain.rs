//! State machine driver.
//!
//! [`run_brains`] is generic over the state tag type. Each enemy family with
//! its own state enum registers one instance, see
//! [`Simulation::register_brain`](crate::simulation::Simulation::register_brain).
//! Brains run after the plain update callbacks, so guards see the signals
//! those callbacks wrote this tick.

use bevy_ecs::prelude::*;

use crate::components::body::Body;
use crate::components::children::OwnedChildren;
use crate::components::entityinfo::EntityInfo;
use crate::components::facing::Facing;
use crate::components::motion::Motions;
use crate::components::signals::Signals;
use crate::components::statemachine::{Brain, StateTag};
use crate::components::timer::Timers;
use crate::components::updatables::UpdateCtx;
use crate::events::audio::SoundRequest;
use crate::resources::queues::{DespawnQueue, SpawnQueue};
use crate::resources::target::Target;
use crate::resources::worldtime::WorldTime;
use crate::systems::updatables::Outbox;

/// Advance each `Brain<S>` and run the behavior of its current state.
///
/// A state without a behavior fails the entity with `NotImplemented`; it is
/// logged and culled like any other failing update.
#[allow(clippy::type_complexity)]
pub fn run_brains<S: StateTag>(
    time: Res<WorldTime>,
    target: Res<Target>,
    mut spawn_queue: ResMut<SpawnQueue>,
    mut despawn_queue: ResMut<DespawnQueue>,
    mut sounds: MessageWriter<SoundRequest>,
    mut query: Query<(
        Entity,
        &EntityInfo,
        &mut Brain<S>,
        &mut Body,
        &mut Timers,
        &mut Signals,
        Option<&mut Facing>,
        Option<&mut OwnedChildren>,
        Option<&mut Motions>,
    )>,
) {
    let mut outbox = Outbox::default();
    for (entity, info, mut brain, mut body, mut timers, mut signals, facing, children, motions) in
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
        let outcome = brain.run(&mut ctx).map(|()| ctx.kill);
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
