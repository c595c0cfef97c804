//! Bridge carrying sound requests out of the ECS world.
//!
//! Use [`setup_sound`] once during initialization. It inserts the
//! [`SoundBridge`] and the `Messages<SoundRequest>` mailbox and returns the
//! receiving end for whatever plays the sounds. The simulation never waits on
//! the consumer; requests sent after it hung up are dropped.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::events::audio::SoundRequest;

#[derive(Resource, Debug, Clone)]
pub struct SoundBridge {
    pub tx: Sender<SoundRequest>,
}

/// Register bridge resources and hand back the consumer side.
pub fn setup_sound(world: &mut World) -> Receiver<SoundRequest> {
    let (tx, rx) = unbounded::<SoundRequest>();
    world.insert_resource(SoundBridge { tx });
    world.insert_resource(Messages::<SoundRequest>::default());
    rx
}
