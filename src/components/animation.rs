//! Keyed animation selection.
//!
//! An [`AnimationSelector`] owns one [`Animation`] per key and a
//! [`KeySupplier`] that names the key to show from the entity's [`Signals`].
//! Every key keeps its own playhead:
//!
//! - switching to a key shown before resumes where it left off when its
//!   [`EntryPolicy`] is `Resume` (the default for looping animations)
//! - a key shown for the first time, or one with `Restart` (the default for
//!   one-shot animations), starts from frame zero
//!
//! Frame selection uses per-frame durations. Frame `i` is active while the
//! playhead is before the end of frame `i`, so a playhead sitting exactly on a
//! boundary shows the next frame.

use std::sync::Arc;

use bevy_ecs::prelude::Component;
use log::warn;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::components::signals::Signals;
use crate::resources::assets::TextureHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPolicy {
    Resume,
    Restart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub texture: TextureHandle,
    pub rows: usize,
    pub columns: usize,
    durations: Vec<f32>,
    pub looping: bool,
    pub policy: EntryPolicy,
    elapsed: f32,
    finished: bool,
}

impl Animation {
    /// Grid animation with one duration for every frame.
    pub fn new(
        texture: TextureHandle,
        rows: usize,
        columns: usize,
        frame_duration: f32,
        looping: bool,
    ) -> Self {
        let frames = rows * columns;
        Self::with_durations(texture, rows, columns, vec![frame_duration; frames], looping)
    }

    pub fn with_durations(
        texture: TextureHandle,
        rows: usize,
        columns: usize,
        durations: Vec<f32>,
        looping: bool,
    ) -> Self {
        Self {
            texture,
            rows,
            columns: columns.max(1),
            durations,
            looping,
            policy: if looping {
                EntryPolicy::Resume
            } else {
                EntryPolicy::Restart
            },
            elapsed: 0.0,
            finished: false,
        }
    }

    /// Single still frame.
    pub fn still(texture: TextureHandle) -> Self {
        Self::new(texture, 1, 1, 1.0, true)
    }

    pub fn with_policy(mut self, policy: EntryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn frame_count(&self) -> usize {
        self.durations.len()
    }

    pub fn duration(&self) -> f32 {
        self.durations.iter().sum()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn update(&mut self, dt: f32) {
        let total = self.duration();
        if total <= 0.0 || self.finished {
            return;
        }
        self.set_current_time(self.elapsed + dt);
    }

    pub fn set_current_time(&mut self, time: f32) {
        let total = self.duration();
        if total <= 0.0 {
            self.elapsed = 0.0;
            return;
        }
        if self.looping {
            self.elapsed = time.rem_euclid(total);
            self.finished = false;
        } else if time >= total {
            self.elapsed = total;
            self.finished = true;
        } else {
            self.elapsed = time.max(0.0);
            self.finished = false;
        }
    }

    pub fn current_index(&self) -> usize {
        let mut end = 0.0;
        for (i, d) in self.durations.iter().enumerate() {
            end += d;
            if self.elapsed < end {
                return i;
            }
        }
        self.durations.len().saturating_sub(1)
    }

    /// (row, column) of the current frame in the texture grid.
    pub fn current_frame(&self) -> (usize, usize) {
        let i = self.current_index();
        (i / self.columns, i % self.columns)
    }

    /// Jump to the start of frame `index`, clamped to the last frame.
    pub fn set_index(&mut self, index: usize) {
        let index = index.min(self.durations.len().saturating_sub(1));
        self.elapsed = self.durations[..index].iter().sum();
        self.finished = false;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.finished = false;
    }

    /// True once a one-shot animation reached its end. Looping never finishes.
    pub fn is_finished(&self) -> bool {
        !self.looping && self.finished
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    fn holds<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
        }
    }
}

/// Data-driven predicate over [`Signals`]. Missing keys evaluate to false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    ScalarCmp { key: String, op: CmpOp, value: f32 },
    IntegerCmp { key: String, op: CmpOp, value: i32 },
    TextIs { key: String, value: String },
    HasFlag { key: String },
    LacksFlag { key: String },
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn has_flag(key: impl Into<String>) -> Self {
        Condition::HasFlag { key: key.into() }
    }

    pub fn text_is(key: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::TextIs {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn evaluate(&self, signals: &Signals) -> bool {
        match self {
            Condition::ScalarCmp { key, op, value } => signals
                .scalar(key)
                .is_some_and(|v| op.holds(v, *value)),
            Condition::IntegerCmp { key, op, value } => signals
                .integer(key)
                .is_some_and(|v| op.holds(v, *value)),
            Condition::TextIs { key, value } => signals.text(key) == Some(value.as_str()),
            Condition::HasFlag { key } => signals.has_flag(key),
            Condition::LacksFlag { key } => !signals.has_flag(key),
            Condition::All(all) => all.iter().all(|c| c.evaluate(signals)),
            Condition::Any(any) => any.iter().any(|c| c.evaluate(signals)),
            Condition::Not(c) => !c.evaluate(signals),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimRule {
    pub when: Condition,
    pub key: String,
}

pub type KeyFn = Arc<dyn Fn(&Signals) -> String + Send + Sync>;

/// Produces the animation key for this tick.
#[derive(Clone)]
pub enum KeySupplier {
    Func(KeyFn),
    /// First matching rule wins, else the fallback.
    Rules {
        rules: Vec<AnimRule>,
        fallback: String,
    },
}

impl KeySupplier {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Signals) -> String + Send + Sync + 'static,
    {
        KeySupplier::Func(Arc::new(f))
    }

    pub fn rules(fallback: impl Into<String>) -> Self {
        KeySupplier::Rules {
            rules: Vec::new(),
            fallback: fallback.into(),
        }
    }

    /// Append a rule; no effect on a `Func` supplier.
    pub fn when(mut self, when: Condition, key: impl Into<String>) -> Self {
        if let KeySupplier::Rules { rules, .. } = &mut self {
            rules.push(AnimRule {
                when,
                key: key.into(),
            });
        }
        self
    }

    pub fn key(&self, signals: &Signals) -> String {
        match self {
            KeySupplier::Func(f) => f(signals),
            KeySupplier::Rules { rules, fallback } => rules
                .iter()
                .find(|r| r.when.evaluate(signals))
                .map_or_else(|| fallback.clone(), |r| r.key.clone()),
        }
    }
}

#[derive(Component)]
pub struct AnimationSelector {
    animations: FxHashMap<String, Animation>,
    supplier: KeySupplier,
    current: Option<String>,
    shown: FxHashSet<String>,
    warned: FxHashSet<String>,
}

impl std::fmt::Debug for AnimationSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationSelector")
            .field("keys", &self.animations.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl AnimationSelector {
    pub fn new(supplier: KeySupplier) -> Self {
        Self {
            animations: FxHashMap::default(),
            supplier,
            current: None,
            shown: FxHashSet::default(),
            warned: FxHashSet::default(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, animation: Animation) -> Self {
        self.animations.insert(key.into(), animation);
        self
    }

    pub fn current_key(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&Animation> {
        self.current.as_ref().and_then(|k| self.animations.get(k))
    }

    pub fn get(&self, key: &str) -> Option<&Animation> {
        self.animations.get(key)
    }

    /// Re-evaluate the key. Returns whether the active animation changed.
    pub fn select(&mut self, signals: &Signals) -> bool {
        let key = self.supplier.key(signals);
        if self.current.as_deref() == Some(key.as_str()) {
            return false;
        }
        let Some(animation) = self.animations.get_mut(&key) else {
            if self.warned.insert(key.clone()) {
                warn!(target: "animation", "no animation for key `{key}`, keeping {:?}", self.current);
            }
            return false;
        };
        let first_time = self.shown.insert(key.clone());
        if first_time || animation.policy == EntryPolicy::Restart {
            animation.reset();
        }
        self.current = Some(key);
        true
    }

    /// Advance the active animation only.
    pub fn advance(&mut self, dt: f32) {
        if let Some(animation) = self.current.as_ref().and_then(|k| self.animations.get_mut(k)) {
            animation.update(dt);
        }
    }

    pub fn update(&mut self, dt: f32, signals: &Signals) {
        self.select(signals);
        self.advance(dt);
    }

    /// Forget the active key and every playhead, as on a fresh spawn.
    pub fn reset(&mut self) {
        self.current = None;
        self.shown.clear();
        for animation in self.animations.values_mut() {
            animation.reset();
        }
    }
}
