//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the simulation world:
//! configuration, timing, the entity factory, deferred spawn and despawn
//! queues and the per-tick contact list.
//!
//! Overview
//! - `assets` – sprite regions resolved through a pluggable provider
//! - `audio` – channel bridge carrying sound requests to the host
//! - `contacts` – fixture overlaps found this tick
//! - `cullbounds` – visible area entities are culled against
//! - `entityfactory` – registered definitions and spawn, respawn, destroy
//! - `queues` – spawns and despawns deferred to the end of the tick
//! - `simconfig` – tick rate, units and defaults, loadable from INI
//! - `target` – snapshot of the entity enemies aim at
//! - `worldtime` – elapsed time, delta and tick count
pub mod assets;
pub mod audio;
pub mod contacts;
pub mod cullbounds;
pub mod entityfactory;
pub mod queues;
pub mod simconfig;
pub mod target;
pub mod worldtime;
