//! Damage resolution.
//!
//! For every DAMAGER (or DEATH) fixture overlapping a DAMAGEABLE fixture of
//! another entity this tick, one hit is resolved per (damager, target) pair:
//!
//! 1. A SHIELD fixture of the target overlapping the damager blocks the hit.
//! 2. Friendly fire is blocked: the damager's owner, or the damager itself
//!    when unowned, must not share the target's category.
//! 3. The target's [`DamageNegotiationTable`] turns the damager variant into
//!    an amount. Instant DEATH fixtures deal [`INSTANT_KILL`].
//! 4. [`Health::take_damage`] applies it unless the target is invincible or
//!    still cooling down from the previous hit.
//! 5. An accepted hit emits a [`DamageEvent`], plays a sound and fires the
//!    damager's [`DamageReactions`] exactly once. Depleted targets are queued
//!    for despawn.
//!
//! Damagers and targets already queued for despawn take no part.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::body::Body;
use crate::components::capabilities::{Capabilities, Category, Owner};
use crate::components::damage::{
    DamageNegotiationTable, DamageReactions, Damager, Health, INSTANT_KILL, ReactionCtx,
};
use crate::components::entityinfo::EntityInfo;
use crate::components::fixture::FixtureType;
use crate::components::signals::Signals;
use crate::components::timer::Timers;
use crate::events::audio::SoundRequest;
use crate::events::damage::DamageEvent;
use crate::resources::contacts::Contacts;
use crate::resources::queues::{DespawnQueue, DespawnReason};

/// Sound played when an enemy takes damage.
pub const ENEMY_DAMAGE_SOUND: &str = "enemy_damage";
/// Sound played when the player takes damage.
pub const PLAYER_DAMAGE_SOUND: &str = "player_damage";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hit {
    damager: Entity,
    target: Entity,
    instant: bool,
}

fn collect_hits(contacts: &Contacts, bodies: &Query<&Body>) -> Vec<Hit> {
    let mut hits: Vec<Hit> = Vec::new();
    let mut push = |hit: Hit| {
        match hits
            .iter_mut()
            .find(|h| h.damager == hit.damager && h.target == hit.target)
        {
            Some(existing) => existing.instant |= hit.instant,
            None => hits.push(hit),
        }
    };
    for (damager, _, target, _) in contacts.pairs(FixtureType::Damager, FixtureType::Damageable) {
        push(Hit {
            damager,
            target,
            instant: false,
        });
    }
    for (damager, fixture, target, _) in contacts.pairs(FixtureType::Death, FixtureType::Damageable)
    {
        let instant = bodies
            .get(damager)
            .ok()
            .and_then(|b| b.fixtures.get(fixture))
            .is_some_and(|f| f.props.instant);
        push(Hit {
            damager,
            target,
            instant,
        });
    }
    hits
}

fn shielded(contacts: &Contacts, damager: Entity, target: Entity) -> bool {
    [FixtureType::Damager, FixtureType::Death].into_iter().any(|kind| {
        contacts
            .pairs(kind, FixtureType::Shield)
            .any(|(d, _, t, _)| d == damager && t == target)
    })
}

#[allow(clippy::too_many_arguments)]
pub fn resolve_damage(
    contacts: Res<Contacts>,
    mut despawn_queue: ResMut<DespawnQueue>,
    mut damage_events: MessageWriter<DamageEvent>,
    mut sounds: MessageWriter<SoundRequest>,
    bodies: Query<&Body>,
    infos: Query<&EntityInfo>,
    capabilities: Query<&Capabilities>,
    mut damagers: Query<(
        Option<&Damager>,
        Option<&Owner>,
        Option<&mut DamageReactions>,
        Option<&mut Timers>,
        Option<&mut Signals>,
    )>,
    mut targets: Query<(&mut Health, Option<&DamageNegotiationTable>)>,
) {
    let category = |entity: Entity| capabilities.get(entity).ok().map(|c| c.category);
    let mut spare_timers = Timers::new();
    let mut spare_signals = Signals::default();
    let mut buffer = Vec::new();

    for hit in collect_hits(&contacts, &bodies) {
        let gone = |e: Entity| infos.get(e).is_ok_and(|i| !i.alive) || despawn_queue.contains(e);
        if gone(hit.target) || gone(hit.damager) {
            continue;
        }
        if shielded(&contacts, hit.damager, hit.target) {
            debug!(target: "damage", "{} blocked by shield of {}", hit.damager, hit.target);
            continue;
        }
        let Ok((damager, owner, reactions, timers, signals)) = damagers.get_mut(hit.damager) else {
            continue;
        };
        let target_category = category(hit.target);
        let source = owner.map(|o| o.0).unwrap_or(hit.damager);
        if target_category.is_some() && category(source) == target_category {
            continue;
        }

        let Ok((mut health, table)) = targets.get_mut(hit.target) else {
            continue;
        };
        let amount = if hit.instant {
            INSTANT_KILL
        } else {
            match (damager, table) {
                (Some(d), Some(t)) => t.negotiate(d.variant, &d.state),
                _ => 0,
            }
        };
        if !health.take_damage(amount) {
            continue;
        }
        let lethal = health.is_depleted();
        debug!(
            target: "damage",
            "{} hit {} for {amount} ({} left)",
            hit.damager, hit.target, health.current
        );

        damage_events.write(DamageEvent {
            damager: hit.damager,
            target: hit.target,
            amount,
            lethal,
        });
        buffer.push(SoundRequest::once(match target_category {
            Some(Category::Player) => PLAYER_DAMAGE_SOUND,
            _ => ENEMY_DAMAGE_SOUND,
        }));
        if let Some(mut reactions) = reactions {
            let mut ctx = ReactionCtx {
                target: hit.target,
                amount,
                timers: timers.map(Mut::into_inner).unwrap_or(&mut spare_timers),
                signals: signals.map(Mut::into_inner).unwrap_or(&mut spare_signals),
                sounds: &mut buffer,
            };
            reactions.fire(target_category, &mut ctx);
        }
        if lethal {
            despawn_queue.push(hit.target, DespawnReason::Killed);
        }
    }
    sounds.write_batch(buffer);
}
