//! Fixture overlaps found this tick.

use bevy_ecs::prelude::{Entity, Resource};

use crate::components::fixture::FixtureType;

/// One overlapping pair of active fixtures on two different entities.
///
/// Each unordered pair is recorded once, with `a` holding the entity that
/// sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: Entity,
    pub a_fixture: usize,
    pub a_kind: FixtureType,
    pub b: Entity,
    pub b_fixture: usize,
    pub b_kind: FixtureType,
}

#[derive(Resource, Debug, Default)]
pub struct Contacts {
    pub list: Vec<Contact>,
}

impl Contacts {
    /// Pairs of `x` against `y`, oriented so the `x` side comes first.
    pub fn pairs(&self, x: FixtureType, y: FixtureType) -> impl Iterator<Item = (Entity, usize, Entity, usize)> + '_ {
        self.list.iter().filter_map(move |c| {
            if c.a_kind == x && c.b_kind == y {
                Some((c.a, c.a_fixture, c.b, c.b_fixture))
            } else if c.b_kind == x && c.a_kind == y {
                Some((c.b, c.b_fixture, c.a, c.a_fixture))
            } else {
                None
            }
        })
    }
}
