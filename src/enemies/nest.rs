//! Nest: a stationary spawner. Every `spawn_delay` seconds it releases a
//! child (a saucer by default) while fewer than `max_children` of its children
//! are alive. Destroying the nest destroys its children.

use bevy_ecs::world::EntityWorldMut;
use glam::Vec2;

use crate::components::animation::{Animation, AnimationSelector, KeySupplier};
use crate::components::children::OwnedChildren;
use crate::components::damage::{Damager, DamagerVariant, Health};
use crate::components::facing::Facing;
use crate::components::signals::Signals;
use crate::components::sprite::SpriteFrame;
use crate::components::timer::{Timer, Timers};
use crate::components::updatables::Updatables;
use crate::enemies::{Regions, enemy_body, enemy_capabilities, enemy_negotiations, standing_bounds};
use crate::entity::{EntityDefinition, SpawnCtx};
use crate::error::SimResult;
use crate::resources::assets::AssetRegistry;
use crate::spawn::SpawnConfig;

pub const TAG: &str = "nest";
pub const SPAWN_TIMER: &str = "spawn";
const SIZE: Vec2 = Vec2::new(2.0, 1.0);
const HEALTH: i32 = 20;

#[derive(Debug, Default)]
pub struct Nest {
    regions: Regions,
}

impl EntityDefinition for Nest {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn init(&mut self, assets: &mut AssetRegistry) -> SimResult<()> {
        self.regions = Regions::load(assets, &["nest"])?;
        Ok(())
    }

    fn on_spawn(
        &self,
        entity: &mut EntityWorldMut<'_>,
        config: &SpawnConfig,
        ctx: &SpawnCtx,
    ) -> SimResult<()> {
        let bounds = standing_bounds(config, ctx, SIZE)?;
        let delay = config.f32_or("spawn_delay", 2.0)?;
        let max_children = config.i32_or("max_children", 3)?.max(0) as usize;
        let child = config.str_or("child", super::saucer::TAG)?.to_string();
        let lift = ctx.scale(1.0);

        let updatables = Updatables::new().with(move |ctx| {
            if !ctx.timers.is_finished(SPAWN_TIMER) || ctx.live_children() >= max_children {
                return Ok(());
            }
            ctx.timers.reset(SPAWN_TIMER);
            let origin = ctx.body.bounds.bottom_center() + Vec2::new(0.0, ctx.body.bounds.height + lift);
            let facing = match ctx.target {
                Some(t) => Facing::toward(origin.x, t.center.x),
                None => ctx.facing(),
            };
            let bag = SpawnConfig::new()
                .with("position", origin)
                .with("facing", facing);
            ctx.spawn_child(child.as_str(), bag);
            Ok(())
        });

        entity.insert((
            enemy_body(bounds),
            Timers::new().with(SPAWN_TIMER, Timer::new(delay)),
            Signals::default(),
            config.facing_or("facing", Facing::Left)?,
            OwnedChildren::new(),
            updatables,
            AnimationSelector::new(KeySupplier::rules("idle"))
                .with("idle", Animation::still(self.regions.get("nest"))),
            SpriteFrame::default(),
            enemy_capabilities(),
            enemy_negotiations(),
            Damager::new(DamagerVariant::EnemyContact),
            Health::new(HEALTH),
        ));
        Ok(())
    }
}
