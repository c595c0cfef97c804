//! Push resolution.
//!
//! FORCE and BOUNCER fixtures carrying a velocity-alteration callback push the
//! bodies of pushable entities they overlap. The callback runs with the
//! pushing entity's timers and decides how the other body's velocity changes;
//! returning the veto leaves the other body alone. Bodies never touch each
//! other directly, the alteration is applied here by the system that owns the
//! contact.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::body::{Body, BodySense};
use crate::components::capabilities::{Capabilities, Capability, Owner};
use crate::components::facing::Facing;
use crate::components::fixture::{AlterationCtx, ContactParty, FixtureType};
use crate::components::timer::Timers;
use crate::events::audio::SoundRequest;
use crate::resources::contacts::Contacts;
use crate::resources::worldtime::WorldTime;

const PUSHERS: [FixtureType; 2] = [FixtureType::Force, FixtureType::Bouncer];
const PUSHED: [FixtureType; 5] = [
    FixtureType::Body,
    FixtureType::Damageable,
    FixtureType::Feet,
    FixtureType::Head,
    FixtureType::Side,
];

fn party(
    entity: Entity,
    fixture: usize,
    bodies: &Query<&mut Body>,
    capabilities: &Query<&Capabilities>,
    facings: &Query<&Facing>,
) -> Option<ContactParty> {
    let body = bodies.get(entity).ok()?;
    let fixture = body.fixtures.get(fixture)?;
    let body_center = body.center();
    Some(ContactParty {
        entity,
        fixture: fixture.kind,
        center: fixture.world_center(body_center),
        body_center,
        velocity: body.velocity(),
        facing: facings.get(entity).ok().copied(),
        capabilities: capabilities.get(entity).ok().cloned(),
    })
}

/// Apply velocity alterations from force and bouncer fixtures.
///
/// Each (pusher entity, pushed entity) pair is pushed at most once per tick
/// per pusher fixture, however many of the pushed entity's fixtures it
/// overlaps.
pub fn resolve_forces(
    time: Res<WorldTime>,
    contacts: Res<Contacts>,
    mut commands: Commands,
    mut sounds: MessageWriter<SoundRequest>,
    mut bodies: Query<&mut Body>,
    mut timers: Query<&mut Timers>,
    capabilities: Query<&Capabilities>,
    facings: Query<&Facing>,
    owners: Query<&Owner>,
) {
    let mut pushes: Vec<(Entity, usize, Entity, usize)> = Vec::new();
    for pusher in PUSHERS {
        for pushed in PUSHED {
            for push in contacts.pairs(pusher, pushed) {
                if !pushes
                    .iter()
                    .any(|p| p.0 == push.0 && p.1 == push.1 && p.2 == push.2)
                {
                    pushes.push(push);
                }
            }
        }
    }

    let mut spare_timers = Timers::new();
    let mut buffer = Vec::new();
    for (own_entity, own_fixture, other_entity, other_fixture) in pushes {
        let Some(own) = party(own_entity, own_fixture, &bodies, &capabilities, &facings) else {
            continue;
        };
        let Some(other) = party(other_entity, other_fixture, &bodies, &capabilities, &facings)
        else {
            continue;
        };
        if !other.has(Capability::Pushable) {
            continue;
        }
        let Some((callback, detach)) = bodies
            .get(own_entity)
            .ok()
            .and_then(|b| b.fixtures.get(own_fixture))
            .and_then(|f| {
                f.velocity_alteration
                    .clone()
                    .map(|cb| (cb, f.detach_owner_on_push))
            })
        else {
            continue;
        };

        let own_timers = match timers.get_mut(own_entity) {
            Ok(t) => t.into_inner(),
            Err(_) => &mut spare_timers,
        };
        let mut ctx = AlterationCtx {
            own: &own,
            other: &other,
            dt: time.delta,
            timers: own_timers,
            sounds: &mut buffer,
        };
        let alteration = callback(&mut ctx);
        if alteration.is_none() {
            continue;
        }

        if let Ok(mut body) = bodies.get_mut(other_entity) {
            body.apply_alteration(&alteration);
            body.set_sense(BodySense::ForceApplied, true);
        }
        if detach && other.has(Capability::Ownable) && owners.contains(other_entity) {
            debug!(target: "sim", "{own_entity} detached owner of {other_entity}");
            commands.entity(other_entity).remove::<Owner>();
        }
    }
    sounds.write_batch(buffer);
}
