//! Countdown timers with edge detection.
//!
//! A [`Timer`] accumulates elapsed time up to its duration. Besides the level
//! query [`Timer::is_finished`], it exposes the edge query
//! [`Timer::is_just_finished`], which is true only for the single update that
//! crossed the duration.
//!
//! Two ways to (re)start a timer exist and they are not interchangeable:
//!
//! - [`Timer::reset`] rewinds to zero; the timer will fire its edge again.
//! - [`Timer::set_to_end`] jumps to the end *without* the edge. Entities use it
//!   to spawn already "settled" (e.g. a cooldown that starts expired) without
//!   running the side effects tied to the edge.
//!
//! Elapsed time is a running `f32` sum of tick deltas, so it can land a hair
//! short of the duration (45 ticks of `1/60` do not add up to exactly `0.75`).
//! Anything within [`FINISH_TOLERANCE`] of the end snaps onto it.
//!
//! The [`Timers`] component stores an entity's named timers.

use bevy_ecs::prelude::Component;
use rustc_hash::FxHashMap;

/// Relative slack, per second of duration, under which a timer counts as done.
pub const FINISH_TOLERANCE: f32 = 1e-5;

#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    duration: f32,
    elapsed: f32,
    just_finished: bool,
}

impl Timer {
    pub fn new(duration: f32) -> Self {
        Timer {
            duration: duration.max(0.0),
            elapsed: 0.0,
            just_finished: false,
        }
    }

    /// Builder variant of [`Timer::set_to_end`].
    pub fn into_ended(mut self) -> Self {
        self.set_to_end();
        self
    }

    /// Advance by `dt` seconds, clamped at the duration.
    pub fn update(&mut self, dt: f32) {
        let was_finished = self.is_finished();
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.snap_to_end();
        self.just_finished = !was_finished && self.is_finished();
    }

    fn snap_to_end(&mut self) {
        if self.duration - self.elapsed <= FINISH_TOLERANCE * self.duration.max(1.0) {
            self.elapsed = self.duration;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn is_just_finished(&self) -> bool {
        self.just_finished
    }

    pub fn is_at_beginning(&self) -> bool {
        self.elapsed == 0.0
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.just_finished = false;
    }

    /// Mark finished without raising the just-finished edge.
    pub fn set_to_end(&mut self) {
        self.elapsed = self.duration;
        self.just_finished = false;
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Change the duration, keeping elapsed time clamped to it.
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.elapsed = self.elapsed.min(self.duration);
        self.snap_to_end();
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Progress in `[0, 1]`; a zero-length timer reports 1.
    pub fn ratio(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }
}

/// Named timers owned by an entity.
///
/// Queries for a name that was never inserted answer `false`.
#[derive(Component, Debug, Clone, Default)]
pub struct Timers {
    timers: FxHashMap<String, Timer>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, timer: Timer) -> Self {
        self.insert(name, timer);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, timer: Timer) {
        self.timers.insert(name.into(), timer);
    }

    pub fn get(&self, name: &str) -> Option<&Timer> {
        self.timers.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Timer> {
        self.timers.get_mut(name)
    }

    pub fn update(&mut self, name: &str, dt: f32) {
        if let Some(timer) = self.timers.get_mut(name) {
            timer.update(dt);
        }
    }

    pub fn update_all(&mut self, dt: f32) {
        for timer in self.timers.values_mut() {
            timer.update(dt);
        }
    }

    pub fn reset(&mut self, name: &str) {
        if let Some(timer) = self.timers.get_mut(name) {
            timer.reset();
        }
    }

    pub fn set_to_end(&mut self, name: &str) {
        if let Some(timer) = self.timers.get_mut(name) {
            timer.set_to_end();
        }
    }

    pub fn is_finished(&self, name: &str) -> bool {
        self.timers.get(name).is_some_and(Timer::is_finished)
    }

    pub fn is_just_finished(&self, name: &str) -> bool {
        self.timers.get(name).is_some_and(Timer::is_just_finished)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn reset_clears_both_flags() {
        let mut t = Timer::new(1.0);
        t.update(2.0);
        assert!(t.is_finished());
        assert!(t.is_just_finished());
        t.reset();
        assert!(!t.is_finished());
        assert!(!t.is_just_finished());
        assert!(t.is_at_beginning());
    }

    #[test]
    fn set_to_end_is_finished_but_never_just_finished() {
        let mut t = Timer::new(1.0);
        t.set_to_end();
        assert!(t.is_finished());
        assert!(!t.is_just_finished());
        t.update(0.0);
        assert!(t.is_finished());
        assert!(!t.is_just_finished());
    }

    #[test]
    fn sixtieths_finish_on_the_exact_tick() {
        let dt = 1.0_f32 / 60.0;
        let mut t = Timer::new(0.75);
        for _ in 0..44 {
            t.update(dt);
            assert!(!t.is_finished());
        }
        t.update(dt);
        assert!(t.is_just_finished());
        assert_eq!(t.elapsed(), 0.75);
        t.update(dt);
        assert!(t.is_finished());
        assert!(!t.is_just_finished());
    }

    #[test]
    fn just_finished_fires_exactly_once() {
        let duration = 0.75;
        let mut t = Timer::new(duration);
        t.update(duration - EPS);
        assert!(!t.is_finished());
        assert!(!t.is_just_finished());

        t.update(2.0 * EPS);
        assert!(t.is_finished());
        assert!(t.is_just_finished());

        t.update(0.1);
        assert!(t.is_finished());
        assert!(!t.is_just_finished());
    }

    #[test]
    fn elapsed_is_clamped_at_duration() {
        let mut t = Timer::new(0.5);
        t.update(3.0);
        assert_eq!(t.elapsed(), 0.5);
        assert_eq!(t.ratio(), 1.0);
    }

    #[test]
    fn edge_fires_again_after_reset() {
        let mut t = Timer::new(0.25);
        t.update(0.25);
        assert!(t.is_just_finished());
        t.reset();
        t.update(0.125);
        assert!(!t.is_just_finished());
        t.update(0.125);
        assert!(t.is_just_finished());
    }

    #[test]
    fn into_ended_builder() {
        let t = Timer::new(2.0).into_ended();
        assert!(t.is_finished());
        assert!(!t.is_just_finished());
    }

    #[test]
    fn set_duration_clamps_elapsed() {
        let mut t = Timer::new(2.0);
        t.update(1.5);
        t.set_duration(1.0);
        assert!(t.is_finished());
        assert_eq!(t.elapsed(), 1.0);
    }

    #[test]
    fn named_timers_missing_name_is_false() {
        let timers = Timers::new();
        assert!(!timers.is_finished("nope"));
        assert!(!timers.is_just_finished("nope"));
    }

    #[test]
    fn named_timers_update_all() {
        let mut timers = Timers::new()
            .with("short", Timer::new(0.5))
            .with("long", Timer::new(2.0));
        timers.update_all(1.0);
        assert!(timers.is_just_finished("short"));
        assert!(!timers.is_finished("long"));
        timers.reset("short");
        assert!(!timers.is_finished("short"));
        timers.set_to_end("long");
        assert!(timers.is_finished("long"));
        assert!(!timers.is_just_finished("long"));
        assert_eq!(timers.len(), 2);
    }
}
