//! Sound request forwarding.
//!
//! Entities request sounds by writing `SoundRequest` messages (through their
//! context buffers). [`forward_sounds`] hands them to the external consumer
//! through [`SoundBridge`]; playback never blocks the tick.
//!
//! See also: [`crate::events::audio`] and [`crate::resources::audio`].

use bevy_ecs::prelude::*;

use crate::events::audio::SoundRequest;
use crate::resources::audio::SoundBridge;

/// Forward this tick's sound requests to the bridge.
///
/// Without a bridge the requests are only left in the message queue.
pub fn forward_sounds(bridge: Option<Res<SoundBridge>>, mut reader: MessageReader<SoundRequest>) {
    let Some(bridge) = bridge else {
        reader.clear();
        return;
    };
    for request in reader.read() {
        // a consumer that hung up just stops hearing us
        let _ = bridge.tx.send(request.clone());
    }
}
