//! Removal policies.
//!
//! [`Cullable`] holds the two ways an entity leaves the simulation on its own:
//! staying outside the [`CullBounds`](crate::resources::cullbounds::CullBounds)
//! for longer than a grace period, or outliving a fixed lifetime. Culling is
//! only ever requested during the tick; the entity is destroyed at the end of
//! it.

use bevy_ecs::prelude::Component;

use crate::components::timer::Timer;

#[derive(Component, Debug, Clone, Default)]
pub struct Cullable {
    /// Runs while the body is out of bounds, resets when it comes back.
    pub out_of_bounds: Option<Timer>,
    pub lifetime: Option<Timer>,
}

impl Cullable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn out_of_bounds(mut self, grace: f32) -> Self {
        self.out_of_bounds = Some(Timer::new(grace));
        self
    }

    pub fn lifetime(mut self, seconds: f32) -> Self {
        self.lifetime = Some(Timer::new(seconds));
        self
    }

    /// Advance both policies. Returns true when the entity should be culled.
    pub fn update(&mut self, dt: f32, in_bounds: bool) -> bool {
        let mut cull = false;
        if let Some(grace) = self.out_of_bounds.as_mut() {
            if in_bounds {
                grace.reset();
            } else {
                grace.update(dt);
                cull |= grace.is_finished();
            }
        }
        if let Some(life) = self.lifetime.as_mut() {
            life.update(dt);
            cull |= life.is_finished();
        }
        cull
    }
}
