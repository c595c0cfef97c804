//! Body integration.
//!
//! Steps every [`Body`] by the tick delta. Hooks get the entity's own timers,
//! signals and a sound buffer; entities without timers or signals get an empty
//! scratch store that is discarded afterwards.

use bevy_ecs::prelude::*;

use crate::components::body::{Body, HookCtx};
use crate::components::entityinfo::EntityInfo;
use crate::components::signals::Signals;
use crate::components::timer::Timers;
use crate::events::audio::SoundRequest;
use crate::resources::worldtime::WorldTime;

pub fn step_bodies(
    time: Res<WorldTime>,
    mut sounds: MessageWriter<SoundRequest>,
    mut query: Query<(
        Option<&EntityInfo>,
        &mut Body,
        Option<&mut Timers>,
        Option<&mut Signals>,
    )>,
) {
    let mut spare_timers = Timers::new();
    let mut spare_signals = Signals::default();
    let mut buffer = Vec::new();
    for (info, mut body, timers, signals) in query.iter_mut() {
        if info.is_some_and(|i| !i.alive) {
            continue;
        }
        let mut ctx = HookCtx {
            dt: time.delta,
            timers: timers.map(Mut::into_inner).unwrap_or(&mut spare_timers),
            signals: signals.map(Mut::into_inner).unwrap_or(&mut spare_signals),
            sounds: &mut buffer,
        };
        body.step(time.delta, &mut ctx);
    }
    sounds.write_batch(buffer);
}
