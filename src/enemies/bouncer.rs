//! Bouncer: sits on its spawn height for `bounce_delay` seconds, jumps with
//! `bounce_impulse`, falls back, snaps onto the spawn height and starts over.
//!
//! Spawn keys:
//! - `position` (required): bottom-center spawn point, also the landing height
//! - `bounce_delay` = 0.75 s
//! - `bounce_impulse` = 18 tiles/s
//! - `gravity` = simulation gravity, tiles/s²
//! - `facing` = left
//! - `cull_time` = simulation cull time

use bevy_ecs::world::EntityWorldMut;
use glam::Vec2;

use crate::components::animation::{Animation, AnimationSelector, Condition, KeySupplier};
use crate::components::body::{DEFAULT_HOOK, floor_clamp_hook};
use crate::components::damage::{Damager, DamagerVariant, Health, MAX_HEALTH};
use crate::components::facing::Facing;
use crate::components::signals::Signals;
use crate::components::sprite::SpriteFrame;
use crate::components::timer::{Timer, Timers};
use crate::components::updatables::Updatables;
use crate::enemies::{
    Regions, enemy_body, enemy_capabilities, enemy_negotiations, offscreen_cull, standing_bounds,
};
use crate::entity::{EntityDefinition, SpawnCtx};
use crate::error::SimResult;
use crate::resources::assets::AssetRegistry;
use crate::spawn::SpawnConfig;

pub const TAG: &str = "bouncer";
pub const BOUNCE_TIMER: &str = "bounce";
pub const AIRBORNE_FLAG: &str = "airborne";
pub const DEFAULT_BOUNCE_DELAY: f32 = 0.75;
pub const DEFAULT_BOUNCE_IMPULSE: f32 = 18.0;
const SIZE: Vec2 = Vec2::new(1.0, 1.0);

#[derive(Debug, Default)]
pub struct Bouncer {
    regions: Regions,
}

impl EntityDefinition for Bouncer {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn init(&mut self, assets: &mut AssetRegistry) -> SimResult<()> {
        self.regions = Regions::load(assets, &["bouncer_still", "bouncer_jump"])?;
        Ok(())
    }

    fn on_spawn(
        &self,
        entity: &mut EntityWorldMut<'_>,
        config: &SpawnConfig,
        ctx: &SpawnCtx,
    ) -> SimResult<()> {
        let bounds = standing_bounds(config, ctx, SIZE)?;
        let delay = config.f32_or("bounce_delay", DEFAULT_BOUNCE_DELAY)?;
        let impulse = ctx.scale(config.f32_or("bounce_impulse", DEFAULT_BOUNCE_IMPULSE)?);
        let gravity = ctx.scale(config.f32_or("gravity", ctx.sim.gravity)?);
        let facing = config.facing_or("facing", Facing::Left)?;

        let mut body = enemy_body(bounds).with_gravity(Vec2::new(0.0, gravity), false);
        body.put_boxed_post_hook(
            DEFAULT_HOOK,
            floor_clamp_hook(bounds.y, |_, hook| hook.timers.reset(BOUNCE_TIMER)),
        );

        let updatables = Updatables::new().with(move |ctx| {
            if ctx.timers.is_just_finished(BOUNCE_TIMER) {
                ctx.body.physics.velocity.y = impulse;
                ctx.body.physics.gravity_on = true;
            }
            let airborne = ctx.body.physics.gravity_on;
            ctx.signals.put_flag(AIRBORNE_FLAG, airborne);
            ctx.face_target();
            Ok(())
        });

        let animations = AnimationSelector::new(
            KeySupplier::rules("still").when(Condition::has_flag(AIRBORNE_FLAG), "jump"),
        )
        .with("still", Animation::still(self.regions.get("bouncer_still")))
        .with(
            "jump",
            Animation::new(self.regions.get("bouncer_jump"), 1, 2, 0.1, true),
        );

        entity.insert((
            body,
            Timers::new().with(BOUNCE_TIMER, Timer::new(delay)),
            Signals::default(),
            facing,
            updatables,
            animations,
            SpriteFrame::default(),
            enemy_capabilities(),
            enemy_negotiations(),
            Damager::new(DamagerVariant::EnemyContact),
            Health::new(MAX_HEALTH),
            offscreen_cull(config, ctx)?,
        ));
        Ok(())
    }
}
