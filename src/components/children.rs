//! Child entities spawned and tracked by a parent.

use bevy_ecs::prelude::{Component, Entity};

/// Entities spawned by this one.
///
/// Children that die are pruned at the end of the tick. When the parent is
/// destroyed, its remaining children are destroyed with it.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedChildren {
    children: Vec<Entity>,
}

impl OwnedChildren {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, child: Entity) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub fn contains(&self, child: Entity) -> bool {
        self.children.contains(&child)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.children.iter().copied()
    }

    /// Keep only children for which `alive` answers true; returns how many were dropped.
    pub fn prune(&mut self, mut alive: impl FnMut(Entity) -> bool) -> usize {
        let before = self.children.len();
        self.children.retain(|e| alive(*e));
        before - self.children.len()
    }

    pub fn drain(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;

    #[test]
    fn prune_drops_dead_children() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut children = OwnedChildren::new();
        children.add(a);
        children.add(b);
        children.add(a);
        assert_eq!(children.len(), 2);
        let dropped = children.prune(|e| e == b);
        assert_eq!(dropped, 1);
        assert!(children.contains(b));
        assert!(!children.contains(a));
    }
}
