//! Saucer: flies a sine wave from its spawn point and laughs, on a cooldown,
//! whenever the target comes within `laugh_range`.

use bevy_ecs::world::EntityWorldMut;
use glam::Vec2;

use crate::components::animation::{Animation, AnimationSelector, Condition, KeySupplier};
use crate::components::damage::{Damager, DamagerVariant, Health};
use crate::components::facing::Facing;
use crate::components::motion::{MotionDefinition, Motions, SineWave, apply};
use crate::components::signals::Signals;
use crate::components::sprite::SpriteFrame;
use crate::components::timer::{Timer, Timers};
use crate::components::updatables::Updatables;
use crate::enemies::{
    Regions, centered_bounds, enemy_body, enemy_capabilities, enemy_negotiations, offscreen_cull,
};
use crate::entity::{EntityDefinition, SpawnCtx};
use crate::error::SimResult;
use crate::resources::assets::AssetRegistry;
use crate::spawn::SpawnConfig;

pub const TAG: &str = "saucer";
pub const LAUGH_TIMER: &str = "laugh";
pub const LAUGH_SOUND: &str = "saucer_laugh";
const SIZE: Vec2 = Vec2::new(1.0, 0.75);
const HEALTH: i32 = 10;

#[derive(Debug, Default)]
pub struct Saucer {
    regions: Regions,
}

impl EntityDefinition for Saucer {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn init(&mut self, assets: &mut AssetRegistry) -> SimResult<()> {
        self.regions = Regions::load(assets, &["saucer_fly", "saucer_laugh"])?;
        Ok(())
    }

    fn on_spawn(
        &self,
        entity: &mut EntityWorldMut<'_>,
        config: &SpawnConfig,
        ctx: &SpawnCtx,
    ) -> SimResult<()> {
        let bounds = centered_bounds(config, ctx, SIZE)?;
        let facing = config.facing_or("facing", Facing::Left)?;
        let speed = ctx.scale(config.f32_or("speed", 3.0)?) * facing.value();
        let amplitude = ctx.scale(config.f32_or("amplitude", 1.0)?);
        let frequency = config.f32_or("frequency", 4.0)?;
        let cooldown = config.f32_or("laugh_cooldown", 1.5)?;
        let range = ctx.scale(config.f32_or("laugh_range", 3.0)?);

        let motions = Motions::new().with(
            "fly",
            MotionDefinition::new(
                SineWave::new(bounds.center(), speed, amplitude, frequency),
                apply::set_center,
            ),
        );

        // first sighting laughs right away
        let mut timers = Timers::new().with(LAUGH_TIMER, Timer::new(cooldown));
        timers.set_to_end(LAUGH_TIMER);

        let updatables = Updatables::new().with(move |ctx| {
            let close = ctx
                .target
                .is_some_and(|t| t.center.distance(ctx.body.center()) <= range);
            if close && ctx.timers.is_finished(LAUGH_TIMER) {
                ctx.timers.reset(LAUGH_TIMER);
                ctx.play_sound(LAUGH_SOUND, false);
            }
            let laughing = !ctx.timers.is_finished(LAUGH_TIMER);
            ctx.signals.put_flag("laughing", laughing);
            Ok(())
        });

        let animations = AnimationSelector::new(
            KeySupplier::rules("fly").when(Condition::has_flag("laughing"), "laugh"),
        )
        .with("fly", Animation::new(self.regions.get("saucer_fly"), 1, 2, 0.1, true))
        .with(
            "laugh",
            Animation::new(self.regions.get("saucer_laugh"), 1, 3, 0.1, false),
        );

        entity.insert((
            enemy_body(bounds),
            timers,
            Signals::default(),
            facing,
            motions,
            updatables,
            animations,
            SpriteFrame::default(),
            enemy_capabilities(),
            enemy_negotiations(),
            Damager::new(DamagerVariant::EnemyContact),
            Health::new(HEALTH),
            offscreen_cull(config, ctx)?,
        ));
        Ok(())
    }
}
