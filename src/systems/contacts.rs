//! Fixture overlap detection and sensing.
//!
//! [`detect_contacts`] rebuilds [`Contacts`] after bodies moved. Later systems
//! only read the list, so every contact rule in a tick works from the same
//! positions.

use bevy_ecs::prelude::*;

use crate::components::body::{Body, BodySense};
use crate::components::entityinfo::EntityInfo;
use crate::components::fixture::{FixtureType, Side};
use crate::components::shape::WorldShape;
use crate::resources::contacts::{Contact, Contacts};

/// Pair every overlapping pair of active fixtures on different entities.
pub fn detect_contacts(
    mut contacts: ResMut<Contacts>,
    query: Query<(Entity, &Body, Option<&EntityInfo>)>,
) {
    let mut placed: Vec<(Entity, usize, FixtureType, WorldShape)> = Vec::new();
    for (entity, body, info) in query.iter() {
        if info.is_some_and(|i| !i.alive) {
            continue;
        }
        let center = body.center();
        for (index, fixture) in body.fixtures.iter().enumerate() {
            if fixture.active {
                placed.push((entity, index, fixture.kind, fixture.world_shape(center)));
            }
        }
    }
    placed.sort_by_key(|(entity, index, ..)| (*entity, *index));

    contacts.list.clear();
    for (i, (a, a_fixture, a_kind, a_shape)) in placed.iter().enumerate() {
        for (b, b_fixture, b_kind, b_shape) in &placed[i + 1..] {
            if a != b && a_shape.overlaps(b_shape) {
                contacts.list.push(Contact {
                    a: *a,
                    a_fixture: *a_fixture,
                    a_kind: *a_kind,
                    b: *b,
                    b_fixture: *b_fixture,
                    b_kind: *b_kind,
                });
            }
        }
    }
}

/// Rewrite block-contact senses from this tick's contacts.
pub fn resolve_senses(contacts: Res<Contacts>, mut bodies: Query<&mut Body>) {
    for mut body in bodies.iter_mut() {
        body.clear_senses();
    }
    for (entity, _, _, _) in contacts.pairs(FixtureType::Feet, FixtureType::Block) {
        if let Ok(mut body) = bodies.get_mut(entity) {
            body.set_sense(BodySense::FeetOnGround, true);
        }
    }
    for (entity, _, _, _) in contacts.pairs(FixtureType::Head, FixtureType::Block) {
        if let Ok(mut body) = bodies.get_mut(entity) {
            body.set_sense(BodySense::HeadTouchingBlock, true);
        }
    }
    for (entity, fixture, _, _) in contacts.pairs(FixtureType::Side, FixtureType::Block) {
        if let Ok(mut body) = bodies.get_mut(entity) {
            let Some(side_fixture) = body.fixtures.get(fixture) else {
                continue;
            };
            // unlabeled side fixtures take their side from the offset
            let side = side_fixture.side().unwrap_or(if side_fixture.offset.x < 0.0 {
                Side::Left
            } else {
                Side::Right
            });
            let sense = match side {
                Side::Left => BodySense::SideTouchingBlockLeft,
                Side::Right => BodySense::SideTouchingBlockRight,
            };
            body.set_sense(sense, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy_ecs::schedule::Schedule;
    use glam::Vec2;

    use super::*;
    use crate::components::fixture::Fixture;
    use crate::components::shape::{Rect, Shape};

    #[test]
    fn feet_on_block_and_left_side() {
        let mut world = World::new();
        world.init_resource::<Contacts>();
        let walker = world
            .spawn(
                Body::new(Rect::new(0.0, 1.0, 2.0, 2.0))
                    .with_fixture(
                        Fixture::new(FixtureType::Feet, Shape::rect(1.0, 0.2))
                            .with_offset(Vec2::new(0.0, -1.0)),
                    )
                    .with_fixture(
                        Fixture::new(FixtureType::Side, Shape::rect(0.2, 1.0))
                            .with_offset(Vec2::new(-1.0, 0.0)),
                    ),
            )
            .id();
        // floor under the feet, wall touching the left side
        world.spawn(
            Body::new(Rect::new(-10.0, 0.0, 20.0, 1.0))
                .with_fixture(Fixture::new(FixtureType::Block, Shape::rect(20.0, 1.0))),
        );
        world.spawn(
            Body::new(Rect::new(-0.2, 1.5, 0.2, 1.0))
                .with_fixture(Fixture::new(FixtureType::Block, Shape::rect(0.2, 1.0))),
        );

        let mut schedule = Schedule::default();
        schedule.add_systems((detect_contacts, resolve_senses).chain());
        schedule.run(&mut world);

        let body = world.get::<Body>(walker).unwrap();
        assert!(body.is_sensing(BodySense::FeetOnGround));
        assert!(body.is_sensing(BodySense::SideTouchingBlockLeft));
        assert!(!body.is_sensing(BodySense::SideTouchingBlockRight));
        assert!(!body.is_sensing(BodySense::HeadTouchingBlock));
    }

    #[test]
    fn inactive_fixtures_never_touch() {
        let mut world = World::new();
        world.init_resource::<Contacts>();
        world.spawn(
            Body::new(Rect::new(0.0, 0.0, 1.0, 1.0))
                .with_fixture(Fixture::new(FixtureType::Damager, Shape::square(1.0)).inactive()),
        );
        world.spawn(
            Body::new(Rect::new(0.0, 0.0, 1.0, 1.0))
                .with_fixture(Fixture::new(FixtureType::Damageable, Shape::square(1.0))),
        );
        let mut schedule = Schedule::default();
        schedule.add_systems(detect_contacts);
        schedule.run(&mut world);
        assert!(world.resource::<Contacts>().list.is_empty());
    }
}
