//! Shot: a projectile. Spawned as a child, it belongs to its parent and deals
//! bullet damage, or charged-shot damage when `charged` is set. It dies on its
//! first accepted hit, at the end of its lifetime or off screen.

use bevy_ecs::world::EntityWorldMut;
use glam::Vec2;

use crate::components::animation::{Animation, AnimationSelector, Condition, KeySupplier};
use crate::components::body::Body;
use crate::components::capabilities::{Capabilities, Capability, Category, Owner};
use crate::components::damage::{DamageReactions, Damager, DamagerState, DamagerVariant};
use crate::components::facing::Facing;
use crate::components::fixture::{Fixture, FixtureType};
use crate::components::shape::Shape;
use crate::components::signals::Signals;
use crate::components::sprite::SpriteFrame;
use crate::components::timer::Timers;
use crate::components::updatables::Updatables;
use crate::enemies::{Regions, centered_bounds, offscreen_cull};
use crate::entity::{EntityDefinition, SpawnCtx};
use crate::error::SimResult;
use crate::resources::assets::AssetRegistry;
use crate::spawn::SpawnConfig;

pub const TAG: &str = "shot";
pub const HIT_FLAG: &str = "hit";
const SIZE: Vec2 = Vec2::new(0.25, 0.25);

#[derive(Debug, Default)]
pub struct Shot {
    regions: Regions,
}

impl EntityDefinition for Shot {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn init(&mut self, assets: &mut AssetRegistry) -> SimResult<()> {
        self.regions = Regions::load(assets, &["shot", "charged_shot"])?;
        Ok(())
    }

    fn on_spawn(
        &self,
        entity: &mut EntityWorldMut<'_>,
        config: &SpawnConfig,
        ctx: &SpawnCtx,
    ) -> SimResult<()> {
        let bounds = centered_bounds(config, ctx, SIZE)?;
        let facing = config.facing_or("facing", Facing::Right)?;
        let charged = config.bool_or("charged", false)?;
        let speed = config.f32_or("speed", 8.0)?;
        let velocity = config.vec2_or("velocity", Vec2::new(speed * facing.value(), 0.0))?;
        let lifetime = config.f32_or("lifetime", 1.5)?;

        let shape = Shape::rect(bounds.width, bounds.height);
        let body = Body::new(bounds)
            .with_fixture(Fixture::new(FixtureType::Body, shape))
            .with_fixture(Fixture::new(FixtureType::Damager, shape))
            .with_velocity(velocity * ctx.sim.ppm);

        let damager = if charged {
            Damager::new(DamagerVariant::ChargedShot).with_state(DamagerState::charged())
        } else {
            Damager::new(DamagerVariant::Bullet)
        };
        let signals = if charged {
            Signals::default().with_flag("charged")
        } else {
            Signals::default()
        };

        entity.insert((
            body,
            Timers::new(),
            signals,
            facing,
            damager,
            DamageReactions::new().otherwise(|r| r.signals.set_flag(HIT_FLAG)),
            Updatables::new().with(|ctx| {
                if ctx.signals.take_flag(HIT_FLAG) {
                    ctx.die();
                }
                Ok(())
            }),
            AnimationSelector::new(
                KeySupplier::rules("shot").when(Condition::has_flag("charged"), "charged"),
            )
            .with("shot", Animation::still(self.regions.get("shot")))
            .with(
                "charged",
                Animation::new(self.regions.get("charged_shot"), 1, 2, 0.05, true),
            ),
            SpriteFrame::default(),
            Capabilities::new(Category::Projectile)
                .with(Capability::Damager)
                .with(Capability::Ownable)
                .with(Capability::Pushable),
            offscreen_cull(config, ctx)?.lifetime(lifetime),
        ));
        if let Some(parent) = ctx.parent {
            entity.insert(Owner(parent));
        }
        Ok(())
    }
}
