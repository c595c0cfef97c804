//! Damage negotiation and health.
//!
//! A damageable entity carries a [`DamageNegotiationTable`] translating the
//! incoming damager's [`DamagerVariant`] (and its [`DamagerState`]) into an
//! amount. A variant with no entry gets the table's explicit default, which is
//! a deliberate fallback and never an error.
//!
//! The on-damage-inflicted side of a hit lives in [`DamageReactions`] on the
//! *damager* entity, keyed by the category of the entity it hurt.

use std::fmt;

use bevy_ecs::prelude::{Component, Entity};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::components::capabilities::Category;
use crate::components::signals::Signals;
use crate::components::timer::{Timer, Timers};
use crate::events::audio::SoundRequest;

pub const MAX_HEALTH: i32 = 30;

/// Amount that always depletes a full health bar.
pub const INSTANT_KILL: i32 = MAX_HEALTH;

/// Invulnerability window after taking damage, in seconds.
pub const DEFAULT_DAMAGE_COOLDOWN: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamagerVariant {
    Bullet,
    ChargedShot,
    ChargedShotExplosion,
    Fireball,
    Explosion,
    Asteroid,
    EnemyContact,
    Spike,
}

impl DamagerVariant {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_lowercase().as_str() {
            "bullet" => DamagerVariant::Bullet,
            "charged_shot" => DamagerVariant::ChargedShot,
            "charged_shot_explosion" => DamagerVariant::ChargedShotExplosion,
            "fireball" => DamagerVariant::Fireball,
            "explosion" => DamagerVariant::Explosion,
            "asteroid" => DamagerVariant::Asteroid,
            "enemy_contact" => DamagerVariant::EnemyContact,
            "spike" => DamagerVariant::Spike,
            _ => return None,
        })
    }
}

/// Runtime sub-state of a damager, handed to dynamic negotiations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamagerState {
    pub fully_charged: bool,
}

impl DamagerState {
    pub fn charged() -> Self {
        Self {
            fully_charged: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DamageNegotiation {
    Fixed(i32),
    Dynamic(fn(&DamagerState) -> i32),
}

impl DamageNegotiation {
    pub fn amount(&self, state: &DamagerState) -> i32 {
        match self {
            DamageNegotiation::Fixed(amount) => *amount,
            DamageNegotiation::Dynamic(f) => f(state),
        }
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct DamageNegotiationTable {
    entries: FxHashMap<DamagerVariant, DamageNegotiation>,
    default_amount: i32,
}

impl DamageNegotiationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, variant: DamagerVariant, amount: i32) -> Self {
        self.entries
            .insert(variant, DamageNegotiation::Fixed(amount));
        self
    }

    pub fn with_fn(mut self, variant: DamagerVariant, f: fn(&DamagerState) -> i32) -> Self {
        self.entries.insert(variant, DamageNegotiation::Dynamic(f));
        self
    }

    /// Amount for variants without an entry. Zero unless set.
    pub fn with_default(mut self, amount: i32) -> Self {
        self.default_amount = amount;
        self
    }

    pub fn default_amount(&self) -> i32 {
        self.default_amount
    }

    pub fn contains(&self, variant: DamagerVariant) -> bool {
        self.entries.contains_key(&variant)
    }

    pub fn negotiate(&self, variant: DamagerVariant, state: &DamagerState) -> i32 {
        self.entries
            .get(&variant)
            .map_or(self.default_amount, |n| n.amount(state))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Marks an entity whose damager fixtures hurt damageables.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Damager {
    pub variant: DamagerVariant,
    pub state: DamagerState,
}

impl Damager {
    pub fn new(variant: DamagerVariant) -> Self {
        Self {
            variant,
            state: DamagerState::default(),
        }
    }

    pub fn with_state(mut self, state: DamagerState) -> Self {
        self.state = state;
        self
    }
}

#[derive(Component, Debug, Clone)]
pub struct Health {
    pub current: i32,
    pub max: i32,
    pub invincible: bool,
    /// Running while the entity ignores further damage.
    pub cooldown: Timer,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self {
            current: max,
            max,
            invincible: false,
            cooldown: Timer::new(DEFAULT_DAMAGE_COOLDOWN).into_ended(),
        }
    }

    pub fn with_cooldown(mut self, seconds: f32) -> Self {
        self.cooldown = Timer::new(seconds).into_ended();
        self
    }

    pub fn invincible(mut self) -> Self {
        self.invincible = true;
        self
    }

    pub fn can_be_damaged(&self) -> bool {
        !self.invincible && self.cooldown.is_finished()
    }

    /// Apply `amount`; returns whether any damage was taken.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if amount <= 0 || !self.can_be_damaged() {
            return false;
        }
        self.current = (self.current - amount).max(0);
        self.cooldown.reset();
        true
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    pub fn ratio(&self) -> f32 {
        if self.max <= 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.cooldown.update(dt);
    }
}

/// What an on-damage-inflicted reaction may touch on the damager entity.
pub struct ReactionCtx<'a> {
    pub target: Entity,
    pub amount: i32,
    pub timers: &'a mut Timers,
    pub signals: &'a mut Signals,
    pub sounds: &'a mut Vec<SoundRequest>,
}

pub type DamageReaction = Box<dyn FnMut(&mut ReactionCtx<'_>) + Send + Sync>;

/// On-damage-inflicted callbacks, keyed by the hurt entity's category.
#[derive(Component, Default)]
pub struct DamageReactions {
    by_category: FxHashMap<Category, DamageReaction>,
    fallback: Option<DamageReaction>,
}

impl fmt::Debug for DamageReactions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DamageReactions")
            .field("categories", &self.by_category.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl DamageReactions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(mut self, category: Category, f: F) -> Self
    where
        F: FnMut(&mut ReactionCtx<'_>) + Send + Sync + 'static,
    {
        self.by_category.insert(category, Box::new(f));
        self
    }

    /// Reaction for categories without their own entry.
    pub fn otherwise<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut ReactionCtx<'_>) + Send + Sync + 'static,
    {
        self.fallback = Some(Box::new(f));
        self
    }

    /// Run the reaction for one inflicted hit. Returns whether one ran.
    pub fn fire(&mut self, category: Option<Category>, ctx: &mut ReactionCtx<'_>) -> bool {
        let keyed = category.and_then(|c| self.by_category.get_mut(&c));
        match keyed.or(self.fallback.as_mut()) {
            Some(reaction) => {
                reaction(ctx);
                true
            }
            None => false,
        }
    }
}
