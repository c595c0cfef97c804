//! Demo entity definitions.
//!
//! Each definition is a thin configuration over the shared substrate: sizes,
//! speeds, sprite keys and a few callbacks. Positions in spawn bags are in
//! world units; sizes, speeds and accelerations are in tiles and get scaled by
//! [`SimConfig::ppm`](crate::resources::simconfig::SimConfig) at spawn.
//!
//! - [`bouncer`] – waits, jumps, lands back on its spawn height, repeats
//! - [`saucer`] – sine-wave flyer that laughs when the target is close
//! - [`magnet`] – pulls pushable bodies in, ignores other enemies
//! - [`nest`] – hazard spawning tracked saucer children
//! - [`shot`] – owned projectile dealing bullet or charged-shot damage
//! - [`dummy`] – player stand-in the enemies target
//! - [`springer`] – state-machine driven jumper

pub mod bouncer;
pub mod dummy;
pub mod magnet;
pub mod nest;
pub mod saucer;
pub mod shot;
pub mod springer;

use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::components::body::Body;
use crate::components::capabilities::{Capabilities, Capability, Category};
use crate::components::cullable::Cullable;
use crate::components::damage::{
    DamageNegotiationTable, DamagerState, DamagerVariant, INSTANT_KILL,
};
use crate::components::fixture::{Fixture, FixtureType};
use crate::components::shape::{Rect, Shape};
use crate::entity::SpawnCtx;
use crate::error::SimResult;
use crate::resources::assets::{AssetRegistry, TextureHandle};
use crate::simulation::Simulation;
use crate::spawn::SpawnConfig;

/// Atlas holding every demo sprite.
pub const ATLAS: &str = "enemies";

/// Register every demo definition and the state types they drive.
pub fn register_all(sim: &mut Simulation) {
    sim.register(bouncer::Bouncer::default());
    sim.register(saucer::Saucer::default());
    sim.register(magnet::Magnet::default());
    sim.register(nest::Nest::default());
    sim.register(shot::Shot::default());
    sim.register(dummy::Dummy::default());
    sim.register(springer::Springer::default());
    sim.register_brain::<springer::SpringerState>();
}

/// Sprite regions a definition resolved in `init`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Regions(FxHashMap<&'static str, TextureHandle>);

impl Regions {
    pub(crate) fn load(assets: &mut AssetRegistry, sprites: &[&'static str]) -> SimResult<Self> {
        let mut regions = FxHashMap::default();
        for sprite in sprites {
            regions.insert(*sprite, assets.load_if_absent(ATLAS, sprite)?);
        }
        Ok(Self(regions))
    }

    pub(crate) fn get(&self, sprite: &str) -> TextureHandle {
        self.0.get(sprite).copied().unwrap_or_default()
    }
}

/// Bounds of `size` tiles standing on the bag's `position`.
pub(crate) fn standing_bounds(config: &SpawnConfig, ctx: &SpawnCtx, size: Vec2) -> SimResult<Rect> {
    let position = config.require_vec2("position")?;
    let mut bounds = Rect::new(0.0, 0.0, size.x * ctx.sim.ppm, size.y * ctx.sim.ppm);
    bounds.set_bottom_center(position);
    Ok(bounds)
}

/// Bounds of `size` tiles centered on the bag's `position`.
pub(crate) fn centered_bounds(config: &SpawnConfig, ctx: &SpawnCtx, size: Vec2) -> SimResult<Rect> {
    let position = config.require_vec2("position")?;
    Ok(Rect::centered(position, size * ctx.sim.ppm))
}

/// Body, damager and damageable fixtures covering the whole bounds.
pub(crate) fn enemy_body(bounds: Rect) -> Body {
    let shape = Shape::rect(bounds.width, bounds.height);
    Body::new(bounds)
        .with_fixture(Fixture::new(FixtureType::Body, shape))
        .with_fixture(Fixture::new(FixtureType::Damager, shape))
        .with_fixture(Fixture::new(FixtureType::Damageable, shape))
}

pub(crate) fn enemy_capabilities() -> Capabilities {
    Capabilities::new(Category::Enemy)
        .with(Capability::Faceable)
        .with(Capability::Animated)
        .with(Capability::Damager)
        .with(Capability::Damageable)
}

fn charged_shot_damage(state: &DamagerState) -> i32 {
    if state.fully_charged { INSTANT_KILL } else { 15 }
}

/// How ordinary enemies take player weapons.
pub(crate) fn enemy_negotiations() -> DamageNegotiationTable {
    DamageNegotiationTable::new()
        .with(DamagerVariant::Bullet, 10)
        .with_fn(DamagerVariant::ChargedShot, charged_shot_damage)
        .with(DamagerVariant::ChargedShotExplosion, 15)
        .with(DamagerVariant::Fireball, 15)
        .with(DamagerVariant::Explosion, 15)
}

pub(crate) fn offscreen_cull(config: &SpawnConfig, ctx: &SpawnCtx) -> SimResult<Cullable> {
    Ok(Cullable::new().out_of_bounds(config.f32_or("cull_time", ctx.sim.cull_time)?))
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::components::entityinfo::EntityInfo;
    use crate::resources::simconfig::SimConfig;
    use crate::simulation::Simulation;

    pub(crate) fn make_sim() -> Simulation {
        let mut sim = Simulation::new(SimConfig::unscaled());
        super::register_all(&mut sim);
        sim
    }

    pub(crate) fn tag_of(sim: &Simulation, entity: bevy_ecs::prelude::Entity) -> Option<String> {
        sim.world().get::<EntityInfo>(entity).map(|i| i.tag.clone())
    }
}
