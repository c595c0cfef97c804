use bevy_ecs::prelude::Resource;
use glam::Vec2;

use crate::components::shape::Rect;

/// Visible area; bodies outside it start their out-of-bounds grace timer.
///
/// `None` disables out-of-bounds culling, which headless runs use when no
/// camera exists.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CullBounds {
    pub rect: Option<Rect>,
}

impl CullBounds {
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            rect: Some(Rect::centered(center, size)),
        }
    }

    pub fn contains(&self, bounds: &Rect) -> bool {
        self.rect.is_none_or(|r| r.overlaps(bounds))
    }
}
