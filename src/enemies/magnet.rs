//! Magnet: a hazard whose FORCE fixture pulls pushable bodies toward its
//! center. Other enemies are left alone through the veto, and any projectile
//! it pulls loses its owner.

use bevy_ecs::world::EntityWorldMut;
use glam::Vec2;

use crate::components::animation::{Animation, AnimationSelector, KeySupplier};
use crate::components::body::Body;
use crate::components::capabilities::{Capabilities, Category};
use crate::components::fixture::{Fixture, FixtureType, VelocityAlteration};
use crate::components::shape::Shape;
use crate::components::signals::Signals;
use crate::components::sprite::SpriteFrame;
use crate::components::timer::Timers;
use crate::enemies::{Regions, centered_bounds};
use crate::entity::{EntityDefinition, SpawnCtx};
use crate::error::SimResult;
use crate::resources::assets::AssetRegistry;
use crate::spawn::SpawnConfig;

pub const TAG: &str = "magnet";
const SIZE: Vec2 = Vec2::new(1.0, 1.0);

#[derive(Debug, Default)]
pub struct Magnet {
    regions: Regions,
}

impl EntityDefinition for Magnet {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn init(&mut self, assets: &mut AssetRegistry) -> SimResult<()> {
        self.regions = Regions::load(assets, &["magnet"])?;
        Ok(())
    }

    fn on_spawn(
        &self,
        entity: &mut EntityWorldMut<'_>,
        config: &SpawnConfig,
        ctx: &SpawnCtx,
    ) -> SimResult<()> {
        let bounds = centered_bounds(config, ctx, SIZE)?;
        let radius = ctx.scale(config.f32_or("radius", 4.0)?);
        let strength = ctx.scale(config.f32_or("strength", 20.0)?);

        let pull = Fixture::new(FixtureType::Force, Shape::circle(radius))
            .with_alteration(move |c| {
                if c.other.is(Category::Enemy) || c.other.is(Category::Boss) {
                    return VelocityAlteration::add_none();
                }
                let toward = (c.own.body_center - c.other.body_center).normalize_or_zero();
                let delta = toward * strength * c.dt;
                VelocityAlteration::add(delta.x, delta.y)
            })
            .detaching_owner();

        let body = Body::new(bounds)
            .with_fixture(Fixture::new(FixtureType::Block, Shape::rect(bounds.width, bounds.height)))
            .with_fixture(pull);

        entity.insert((
            body,
            Timers::new(),
            Signals::default(),
            AnimationSelector::new(KeySupplier::rules("pulse"))
                .with("pulse", Animation::new(self.regions.get("magnet"), 1, 4, 0.125, true)),
            SpriteFrame::default(),
            Capabilities::new(Category::Hazard),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bevy_ecs::prelude::Entity;

    use super::*;
    use crate::components::capabilities::Capability;
    use crate::components::fixture::{AlterationCtx, ContactParty};

    fn party(center: Vec2, category: Category) -> ContactParty {
        ContactParty {
            entity: Entity::PLACEHOLDER,
            fixture: FixtureType::Body,
            center,
            body_center: center,
            velocity: Vec2::ZERO,
            facing: None,
            capabilities: Some(Capabilities::new(category).with(Capability::Pushable)),
        }
    }

    fn pull_of(fixture: &Fixture, other: &ContactParty) -> VelocityAlteration {
        let own = party(Vec2::ZERO, Category::Hazard);
        let mut timers = Timers::new();
        let mut sounds = Vec::new();
        let callback = fixture.velocity_alteration.clone().unwrap();
        callback(&mut AlterationCtx {
            own: &own,
            other,
            dt: 0.5,
            timers: &mut timers,
            sounds: &mut sounds,
        })
    }

    #[test]
    fn pulls_players_and_ignores_enemies() {
        let mut world = bevy_ecs::world::World::new();
        let ctx = SpawnCtx {
            sim: crate::resources::simconfig::SimConfig::unscaled(),
            parent: None,
            target: None,
        };
        let config = SpawnConfig::new().with("position", Vec2::ZERO);
        let mut e = world.spawn_empty();
        Magnet::default().on_spawn(&mut e, &config, &ctx).unwrap();
        let id = e.id();
        let body = world.get::<Body>(id).unwrap();
        let force = body.fixtures_of(FixtureType::Force).next().unwrap();
        assert!(force.detach_owner_on_push);

        let mut v = Vec2::ZERO;
        pull_of(force, &party(Vec2::new(2.0, 0.0), Category::Player)).apply_to(&mut v);
        assert_eq!(v, Vec2::new(-10.0, 0.0));

        assert!(pull_of(force, &party(Vec2::new(2.0, 0.0), Category::Enemy)).is_none());
    }
}
