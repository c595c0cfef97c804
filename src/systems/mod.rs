//! Simulation systems.
//!
//! This module groups all ECS systems run by the per-tick schedule built in
//! [`crate::simulation`], listed here roughly in execution order.
//!
//! Submodules overview
//! - [`messages`] – rotate message buffers at the start of a tick
//! - [`target`] – snapshot the tracked target
//! - [`time`] – advance world time, entity timers and damage cooldowns
//! - [`updatables`] – run per-entity update callbacks
//! - [`brain`] – advance state machines and run state behaviors
//! - [`motion`] – evaluate motion functions
//! - [`body`] – step bodies and run their process hooks
//! - [`contacts`] – find fixture overlaps and write body senses
//! - [`forces`] – apply velocity alterations from force and bouncer fixtures
//! - [`damage`] – negotiate and apply damage from damager contacts
//! - [`culling`] – queue entities out of bounds or past their lifetime
//! - [`animation`] – select animations and sync sprite frames
//! - [`audio`] – forward sound requests to the audio bridge
//! - [`lifecycle`] – flush despawns, prune children and flush spawns

pub mod animation;
pub mod audio;
pub mod body;
pub mod brain;
pub mod contacts;
pub mod culling;
pub mod damage;
pub mod forces;
pub mod lifecycle;
pub mod messages;
pub mod motion;
pub mod target;
pub mod time;
pub mod updatables;
