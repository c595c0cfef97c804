use bevy_ecs::message::Message;

/// Fire-and-forget sound request.
///
/// Hooks and update callbacks push these into their context buffers; the tick
/// collects them into `Messages<SoundRequest>` and forwards them to the
/// external consumer behind [`crate::resources::audio::SoundBridge`].
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct SoundRequest {
    pub tag: String,
    pub looped: bool,
}

impl SoundRequest {
    pub fn once(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            looped: false,
        }
    }

    pub fn looped(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            looped: true,
        }
    }
}
