//! Dummy: a player stand-in. It is the tracked target, takes enemy damage,
//! can be pushed and, when `shoot_every` is set, fires owned shots in its
//! facing direction.

use bevy_ecs::world::EntityWorldMut;
use glam::Vec2;

use crate::components::animation::{Animation, AnimationSelector, KeySupplier};
use crate::components::body::Body;
use crate::components::capabilities::{Capabilities, Capability, Category};
use crate::components::damage::{
    DamageNegotiationTable, DamagerVariant, Health, INSTANT_KILL, MAX_HEALTH,
};
use crate::components::facing::Facing;
use crate::components::fixture::{Fixture, FixtureType, Side};
use crate::components::shape::Shape;
use crate::components::signals::Signals;
use crate::components::sprite::SpriteFrame;
use crate::components::timer::{Timer, Timers};
use crate::components::updatables::Updatables;
use crate::enemies::{Regions, standing_bounds};
use crate::entity::{EntityDefinition, SpawnCtx};
use crate::error::SimResult;
use crate::resources::assets::AssetRegistry;
use crate::spawn::SpawnConfig;

pub const TAG: &str = "dummy";
pub const SHOOT_TIMER: &str = "shoot";
const SIZE: Vec2 = Vec2::new(0.75, 1.25);
const DAMAGE_COOLDOWN: f32 = 0.75;

/// How the player takes enemy damage.
pub fn player_negotiations() -> DamageNegotiationTable {
    DamageNegotiationTable::new()
        .with(DamagerVariant::EnemyContact, 3)
        .with(DamagerVariant::Bullet, 2)
        .with(DamagerVariant::Fireball, 3)
        .with(DamagerVariant::Explosion, 4)
        .with(DamagerVariant::Asteroid, 4)
        .with(DamagerVariant::Spike, INSTANT_KILL)
}

#[derive(Debug, Default)]
pub struct Dummy {
    regions: Regions,
}

impl EntityDefinition for Dummy {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn init(&mut self, assets: &mut AssetRegistry) -> SimResult<()> {
        self.regions = Regions::load(assets, &["dummy"])?;
        Ok(())
    }

    fn on_spawn(
        &self,
        entity: &mut EntityWorldMut<'_>,
        config: &SpawnConfig,
        ctx: &SpawnCtx,
    ) -> SimResult<()> {
        let bounds = standing_bounds(config, ctx, SIZE)?;
        let velocity = config.vec2_or("velocity", Vec2::ZERO)? * ctx.sim.ppm;
        let gravity_on = config.bool_or("gravity_on", false)?;
        let shoot_every = config.f32_or("shoot_every", 0.0)?;
        let charged = config.bool_or("charged", false)?;
        let (w, h) = (bounds.width, bounds.height);

        let body = Body::new(bounds)
            .with_gravity(Vec2::new(0.0, ctx.scale(ctx.sim.gravity)), gravity_on)
            .with_velocity(velocity)
            .with_fixture(Fixture::new(FixtureType::Body, Shape::rect(w, h)))
            .with_fixture(Fixture::new(FixtureType::Damageable, Shape::rect(w * 0.8, h * 0.9)))
            .with_fixture(
                Fixture::new(FixtureType::Feet, Shape::rect(w * 0.5, 0.1 * h))
                    .with_offset(Vec2::new(0.0, -h / 2.0)),
            )
            .with_fixture(
                Fixture::new(FixtureType::Head, Shape::rect(w * 0.5, 0.1 * h))
                    .with_offset(Vec2::new(0.0, h / 2.0)),
            )
            .with_fixture(
                Fixture::new(FixtureType::Side, Shape::rect(0.1 * w, h * 0.5))
                    .with_offset(Vec2::new(-w / 2.0, 0.0))
                    .with_side(Side::Left),
            )
            .with_fixture(
                Fixture::new(FixtureType::Side, Shape::rect(0.1 * w, h * 0.5))
                    .with_offset(Vec2::new(w / 2.0, 0.0))
                    .with_side(Side::Right),
            );

        let mut timers = Timers::new();
        let mut updatables = Updatables::new();
        if shoot_every > 0.0 {
            timers.insert(SHOOT_TIMER, Timer::new(shoot_every));
            updatables.add(move |ctx| {
                if ctx.timers.is_just_finished(SHOOT_TIMER) {
                    ctx.timers.reset(SHOOT_TIMER);
                    let facing = ctx.facing();
                    let bag = SpawnConfig::new()
                        .with("position", ctx.body.center())
                        .with("facing", facing)
                        .with("charged", charged);
                    ctx.spawn_child(super::shot::TAG, bag);
                }
                Ok(())
            });
        }

        entity.insert((
            body,
            timers,
            Signals::default(),
            config.facing_or("facing", Facing::Right)?,
            updatables,
            AnimationSelector::new(KeySupplier::rules("stand"))
                .with("stand", Animation::still(self.regions.get("dummy"))),
            SpriteFrame::default(),
            Capabilities::new(Category::Player)
                .with(Capability::Target)
                .with(Capability::Faceable)
                .with(Capability::Pushable)
                .with(Capability::Damageable),
            player_negotiations(),
            Health::new(MAX_HEALTH).with_cooldown(DAMAGE_COOLDOWN),
        ));
        Ok(())
    }
}
