//! Time update systems.
//!
//! [`update_world_time`] advances the shared
//! [`WorldTime`](crate::resources::worldtime::WorldTime) resource once per
//! tick, applying `time_scale` to the provided delta. [`tick_timers`] then
//! advances every entity-owned clock by the scaled delta, before any update
//! callback observes them, so just-finished edges are visible for exactly the
//! tick on which they happen.
use bevy_ecs::prelude::*;

use crate::components::damage::Health;
use crate::components::timer::Timers;
use crate::resources::worldtime::WorldTime;

/// Update elapsed, delta and frame count on the `WorldTime` resource.
///
/// `dt` is expected to be the unscaled tick delta in seconds. The system
/// applies the current `time_scale` and writes both `elapsed` and `delta`.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_dt = dt * wt.time_scale;
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.frame_count += 1;
}

/// Advance named timers and damage cooldowns.
pub fn tick_timers(
    time: Res<WorldTime>,
    mut timers: Query<&mut Timers>,
    mut healths: Query<&mut Health>,
) {
    let dt = time.delta;
    for mut t in timers.iter_mut() {
        t.update_all(dt);
    }
    for mut health in healths.iter_mut() {
        health.update(dt);
    }
}
