use bevy_ecs::prelude::*;

use crate::components::body::Body;
use crate::components::motion::Motions;
use crate::resources::worldtime::WorldTime;

/// Feed each motion function's value to its apply callback.
///
/// Runs after update callbacks, which may have swapped motions in, and before
/// the body step, so `set_velocity` style motions are integrated this tick.
pub fn run_motions(time: Res<WorldTime>, mut query: Query<(&mut Motions, &mut Body)>) {
    for (mut motions, mut body) in query.iter_mut() {
        motions.step(time.delta, &mut body);
    }
}
