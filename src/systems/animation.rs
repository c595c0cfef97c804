//! Animation selection and sprite sync.
//!
//! Runs last among the per-entity systems so the key suppliers see the final
//! signals, facing and state of the tick.

use bevy_ecs::prelude::*;

use crate::components::animation::AnimationSelector;
use crate::components::facing::Facing;
use crate::components::signals::Signals;
use crate::components::sprite::SpriteFrame;
use crate::resources::worldtime::WorldTime;

/// Re-evaluate each selector's key, advance the active animation and copy
/// the resulting frame into the entity's [`SpriteFrame`].
pub fn select_animations(
    time: Res<WorldTime>,
    mut query: Query<(
        &mut AnimationSelector,
        &Signals,
        Option<&Facing>,
        Option<&mut SpriteFrame>,
    )>,
) {
    for (mut selector, signals, facing, sprite) in query.iter_mut() {
        selector.update(time.delta, signals);
        let Some(mut sprite) = sprite else {
            continue;
        };
        match selector.current() {
            Some(animation) => {
                let (row, column) = animation.current_frame();
                sprite.texture = Some(animation.texture);
                sprite.row = row;
                sprite.column = column;
                sprite.hidden = false;
            }
            None => sprite.hidden = true,
        }
        sprite.flip_x = facing.is_some_and(|f| f.is_left());
    }
}
