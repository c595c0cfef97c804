//! Enemy simulation library.
//!
//! This module exposes the simulation's ECS components, resources, systems and
//! messages, the entity factory and the demo enemy definitions, for use in
//! integration tests and as a reusable library.
//!
//! [`simulation::Simulation`] is the entry point: it owns the world, the
//! per-tick schedule and the fixed-step accumulator.

pub mod components;
pub mod enemies;
pub mod entity;
pub mod error;
pub mod events;
pub mod resources;
pub mod simulation;
pub mod spawn;
pub mod systems;
