use bevy_ecs::prelude::Component;

use crate::resources::assets::TextureHandle;

/// Frame an external renderer should draw for this entity.
///
/// Written by the animation sync step from the active animation and the
/// entity's facing. The simulation never reads it back.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpriteFrame {
    pub texture: Option<TextureHandle>,
    pub row: usize,
    pub column: usize,
    pub flip_x: bool,
    pub hidden: bool,
}
