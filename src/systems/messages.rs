use bevy_ecs::message::{Message, Messages};
use bevy_ecs::prelude::ResMut;

/// Swap a message queue's buffers.
///
/// Runs at the start of every tick, so messages written during a tick stay
/// readable after it returns and are dropped one tick later.
pub fn update_messages<M: Message>(mut messages: ResMut<Messages<M>>) {
    messages.update();
}
