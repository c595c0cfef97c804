//! The simulation driver.
//!
//! [`Simulation`] owns the `World` and the per-tick `Schedule`. One call to
//! [`Simulation::tick`] runs, in this order:
//!
//! 1. message buffer swap, target snapshot, timers
//! 2. update callbacks, then state machines (one system per registered state
//!    type), then motion functions
//! 3. body step (hooks, friction, gravity, clamp, integration)
//! 4. contacts: detection, senses, pushes, damage
//! 5. culling, animation selection and sprite sync, sound forwarding
//! 6. despawns, child pruning, spawns
//!
//! Every system sees the world the previous one left; nothing runs in
//! parallel, and entities only appear or disappear in step 6.

use bevy_ecs::message::{Message, Messages};
use bevy_ecs::prelude::*;
use crossbeam_channel::Receiver;
use log::{error, info, warn};

use crate::components::entityinfo::EntityInfo;
use crate::components::statemachine::StateTag;
use crate::entity::EntityDefinition;
use crate::error::SimResult;
use crate::events::audio::SoundRequest;
use crate::events::damage::DamageEvent;
use crate::events::lifecycle::LifecycleEvent;
use crate::resources::assets::{AssetProvider, AssetRegistry};
use crate::resources::audio::setup_sound;
use crate::resources::contacts::Contacts;
use crate::resources::cullbounds::CullBounds;
use crate::resources::entityfactory::{
    EntityFactory, destroy_entity, respawn_entity, spawn_entity,
};
use crate::resources::queues::{DespawnQueue, DespawnReason, SpawnQueue};
use crate::resources::simconfig::SimConfig;
use crate::resources::target::Target;
use crate::resources::worldtime::WorldTime;
use crate::spawn::SpawnConfig;
use crate::systems::animation::select_animations;
use crate::systems::audio::forward_sounds;
use crate::systems::body::step_bodies;
use crate::systems::brain::run_brains;
use crate::systems::contacts::{detect_contacts, resolve_senses};
use crate::systems::culling::cull_entities;
use crate::systems::damage::resolve_damage;
use crate::systems::forces::resolve_forces;
use crate::systems::lifecycle::{flush_despawns, flush_spawns, prune_children};
use crate::systems::messages::update_messages;
use crate::systems::motion::run_motions;
use crate::systems::target::track_target;
use crate::systems::time::{tick_timers, update_world_time};
use crate::systems::updatables::run_updatables;

pub struct Simulation {
    world: World,
    schedule: Schedule,
    accumulator: f32,
    sounds: Receiver<SoundRequest>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let mut world = World::new();
        info!(
            "simulation: dt={} ppm={} gravity={}",
            config.fixed_dt, config.ppm, config.gravity
        );
        if let Err(e) = config.validate() {
            warn!("simulation: {e}; advance() will not run ticks");
        }
        world.insert_resource(config);
        world.insert_resource(WorldTime::default());
        world.init_resource::<Target>();
        world.init_resource::<Contacts>();
        world.init_resource::<CullBounds>();
        world.init_resource::<SpawnQueue>();
        world.init_resource::<DespawnQueue>();
        world.init_resource::<EntityFactory>();
        world.init_resource::<AssetRegistry>();
        world.init_resource::<Messages<DamageEvent>>();
        world.init_resource::<Messages<LifecycleEvent>>();
        let sounds = setup_sound(&mut world);

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                update_messages::<SoundRequest>,
                update_messages::<DamageEvent>,
                update_messages::<LifecycleEvent>,
                track_target,
                tick_timers,
                run_updatables,
                run_motions,
                step_bodies,
                detect_contacts,
                resolve_senses,
                resolve_forces,
                resolve_damage,
                cull_entities,
                select_animations,
                forward_sounds,
                flush_despawns,
                prune_children,
                flush_spawns,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            accumulator: 0.0,
            sounds,
        }
    }

    /// Replace the headless asset provider.
    pub fn with_assets(mut self, provider: impl AssetProvider + 'static) -> Self {
        self.world.insert_resource(AssetRegistry::new(provider));
        self
    }

    pub fn register(&mut self, definition: impl EntityDefinition + 'static) {
        self.world
            .resource_mut::<EntityFactory>()
            .register(definition);
    }

    /// Drive `Brain<S>` components. Call once per state type in use.
    pub fn register_brain<S: StateTag>(&mut self) {
        self.schedule
            .add_systems(run_brains::<S>.after(run_updatables).before(run_motions));
    }

    pub fn set_cull_bounds(&mut self, bounds: CullBounds) {
        self.world.insert_resource(bounds);
    }

    /// Spawn immediately, outside the tick.
    pub fn spawn(&mut self, tag: &str, config: SpawnConfig) -> SimResult<Entity> {
        spawn_entity(&mut self.world, tag, config, None)
    }

    pub fn respawn(&mut self, entity: Entity, config: SpawnConfig) -> SimResult<()> {
        respawn_entity(&mut self.world, entity, config)
    }

    /// Destroy immediately, outside the tick.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        destroy_entity(&mut self.world, entity, DespawnReason::Killed)
    }

    /// Run one tick of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
    }

    /// Feed a real frame delta to the fixed-step accumulator and run as many
    /// ticks as fit. Returns the number of ticks run.
    ///
    /// Runs nothing while the timing config is invalid (see
    /// [`SimConfig::validate`]).
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let (fixed_dt, max_frame_dt) = {
            let config = self.world.resource::<SimConfig>();
            if let Err(e) = config.validate() {
                error!("advance: {e}");
                return 0;
            }
            (config.fixed_dt, config.max_frame_dt)
        };
        self.accumulator += frame_dt.max(0.0).min(max_frame_dt);
        let mut ticks = 0;
        while self.accumulator >= fixed_dt {
            self.tick(fixed_dt);
            self.accumulator -= fixed_dt;
            ticks += 1;
        }
        ticks
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn time(&self) -> WorldTime {
        *self.world.resource::<WorldTime>()
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    /// Live entities carrying `tag`.
    pub fn entities_tagged(&mut self, tag: &str) -> Vec<Entity> {
        let mut query = self.world.query::<(Entity, &EntityInfo)>();
        let mut found: Vec<Entity> = query
            .iter(&self.world)
            .filter(|(_, info)| info.alive && info.tag == tag)
            .map(|(entity, _)| entity)
            .collect();
        found.sort_unstable();
        found
    }

    pub fn live_count(&mut self) -> usize {
        let mut query = self.world.query::<&EntityInfo>();
        query.iter(&self.world).filter(|info| info.alive).count()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world
            .get::<EntityInfo>(entity)
            .is_some_and(|info| info.alive)
    }

    /// Take every message of type `M` still buffered.
    pub fn drain_messages<M: Message>(&mut self) -> Vec<M> {
        self.world
            .get_resource_mut::<Messages<M>>()
            .map(|mut messages| messages.drain().collect())
            .unwrap_or_default()
    }

    /// Sound requests forwarded so far and not yet consumed.
    pub fn drain_sounds(&self) -> Vec<SoundRequest> {
        self.sounds.try_iter().collect()
    }

    pub fn sound_receiver(&self) -> &Receiver<SoundRequest> {
        &self.sounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_runs_whole_ticks_and_keeps_remainder() {
        let mut sim = Simulation::new(SimConfig {
            fixed_dt: 0.25,
            max_frame_dt: 1.0,
            ..SimConfig::unscaled()
        });
        assert_eq!(sim.advance(0.6), 2);
        assert_eq!(sim.advance(0.4), 2);
        assert_eq!(sim.time().frame_count, 4);
        assert!((sim.time().elapsed - 1.0).abs() < 1e-6);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut sim = Simulation::new(SimConfig {
            fixed_dt: 0.25,
            max_frame_dt: 0.5,
            ..SimConfig::unscaled()
        });
        assert_eq!(sim.advance(10.0), 2);
    }

    #[test]
    fn invalid_timing_runs_no_ticks() {
        let mut sim = Simulation::new(SimConfig {
            fixed_dt: 0.0,
            ..SimConfig::unscaled()
        });
        assert_eq!(sim.advance(1.0 / 60.0), 0);

        let mut sim = Simulation::new(SimConfig {
            max_frame_dt: -1.0,
            ..SimConfig::unscaled()
        });
        assert_eq!(sim.advance(1.0 / 60.0), 0);
        assert_eq!(sim.time().frame_count, 0);
    }

    #[test]
    fn rejected_config_file_still_advances() {
        let mut config = SimConfig::unscaled();
        assert!(config.load_from_str("[simulation]\nfixed_dt = 0\n").is_err());
        assert!(config.load_from_str("[simulation]\nmax_frame_dt = -1\n").is_err());
        let mut sim = Simulation::new(config);
        assert_eq!(sim.advance(1.0 / 60.0), 1);
    }

    #[test]
    fn nan_frames_add_nothing() {
        let mut sim = Simulation::new(SimConfig::unscaled());
        assert_eq!(sim.advance(f32::NAN), 0);
        assert_eq!(sim.advance(-1.0), 0);
    }
}
