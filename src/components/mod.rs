//! ECS components for simulated entities.
//!
//! This module groups all component types attached to entities in the
//! simulation. Components hold per-entity data and the callbacks that drive
//! behavior: bodies and fixtures, timers, damage, motions, state machines and
//! animation selection.
//!
//! Submodules overview:
//! - [`animation`] – keyed animations and the selector that picks one per tick
//! - [`body`] – kinematic body with fixtures, physics data and process hooks
//! - [`capabilities`] – category and capability set consulted by contact resolution
//! - [`children`] – live entities spawned and owned by a parent
//! - [`cullable`] – out-of-bounds grace period and lifetime budget
//! - [`damage`] – health, damager variants and damage negotiation tables
//! - [`entityinfo`] – tag, alive flag and spawn count of every factory entity
//! - [`facing`] – horizontal facing used for movement and sprite flipping
//! - [`fixture`] – typed contact shapes and velocity alterations
//! - [`motion`] – parametric motion functions keyed by name
//! - [`shape`] – rectangles, circles and overlap tests
//! - [`signals`] – per-entity facts read by guards and key suppliers
//! - [`sprite`] – texture region and frame the renderer would draw
//! - [`statemachine`] – guarded finite state machines and brains
//! - [`timer`] – named count-up timers with just-finished detection
//! - [`updatables`] – ordered per-tick callbacks and their context

pub mod animation;
pub mod body;
pub mod capabilities;
pub mod children;
pub mod cullable;
pub mod damage;
pub mod entityinfo;
pub mod facing;
pub mod fixture;
pub mod motion;
pub mod shape;
pub mod signals;
pub mod sprite;
pub mod statemachine;
pub mod timer;
pub mod updatables;
