//! Capability queries used instead of concrete type checks.
//!
//! Collision callbacks and damage reactions never ask "is this a MagFly?".
//! They ask which [`Category`] the other entity belongs to and whether it
//! exposes a given [`Capability`].

use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Player,
    Enemy,
    Boss,
    Projectile,
    Hazard,
    Block,
    Item,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Faceable,
    Animated,
    /// Carries an [`Owner`] that can be detached.
    Ownable,
    /// Accepts velocity alterations from force and bouncer fixtures.
    Pushable,
    Damager,
    Damageable,
    /// Can be tracked as the simulation's [`crate::resources::target::Target`].
    Target,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Capabilities {
    pub category: Category,
    set: SmallVec<[Capability; 4]>,
}

impl Capabilities {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            set: SmallVec::new(),
        }
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.insert(capability);
        self
    }

    pub fn insert(&mut self, capability: Capability) {
        if !self.set.contains(&capability) {
            self.set.push(capability);
        }
    }

    pub fn remove(&mut self, capability: Capability) {
        self.set.retain(|c| *c != capability);
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.set.contains(&capability)
    }

    pub fn is(&self, category: Category) -> bool {
        self.category == category
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.set.iter()
    }
}

/// The entity that fired an ownable projectile.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub Entity);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_are_a_set() {
        let mut caps = Capabilities::new(Category::Enemy)
            .with(Capability::Damager)
            .with(Capability::Damager)
            .with(Capability::Faceable);
        assert_eq!(caps.iter().count(), 2);
        assert!(caps.has(Capability::Faceable));
        caps.remove(Capability::Faceable);
        assert!(!caps.has(Capability::Faceable));
        assert!(caps.is(Category::Enemy));
        assert!(!caps.is(Category::Player));
    }
}
