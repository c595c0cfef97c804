// Per-entity facts written by update callbacks and read by guards and key suppliers

use bevy_ecs::prelude::Component;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Default, Component)]
pub struct Signals {
    pub scalars: FxHashMap<String, f32>,
    pub integers: FxHashMap<String, i32>,
    pub flags: FxHashSet<String>,
    pub texts: FxHashMap<String, String>,
}

impl Signals {
    pub fn with_flag(mut self, key: impl Into<String>) -> Self {
        self.set_flag(key);
        self
    }
    pub fn with_scalar(mut self, key: impl Into<String>, value: f32) -> Self {
        self.set_scalar(key, value);
        self
    }
    pub fn set_scalar(&mut self, key: impl Into<String>, value: f32) {
        self.scalars.insert(key.into(), value);
    }
    pub fn scalar(&self, key: &str) -> Option<f32> {
        self.scalars.get(key).copied()
    }
    pub fn scalar_or(&self, key: &str, default: f32) -> f32 {
        self.scalar(key).unwrap_or(default)
    }
    pub fn set_integer(&mut self, key: impl Into<String>, value: i32) {
        self.integers.insert(key.into(), value);
    }
    pub fn integer(&self, key: &str) -> Option<i32> {
        self.integers.get(key).copied()
    }
    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.texts.insert(key.into(), value.into());
    }
    pub fn text(&self, key: &str) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }
    pub fn set_flag(&mut self, key: impl Into<String>) {
        self.flags.insert(key.into());
    }
    /// Set or clear a flag from a boolean.
    pub fn put_flag(&mut self, key: impl Into<String>, on: bool) {
        let key = key.into();
        if on {
            self.flags.insert(key);
        } else {
            self.flags.remove(&key);
        }
    }
    pub fn clear_flag(&mut self, key: &str) {
        self.flags.remove(key);
    }
    pub fn has_flag(&self, key: &str) -> bool {
        self.flags.contains(key)
    }
    /// Clears the flag and reports whether it was set.
    pub fn take_flag(&mut self, key: &str) -> bool {
        self.flags.remove(key)
    }
    pub fn clear(&mut self) {
        self.scalars.clear();
        self.integers.clear();
        self.flags.clear();
        self.texts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_flag_sets_and_clears() {
        let mut s = Signals::default();
        s.put_flag("grounded", true);
        assert!(s.has_flag("grounded"));
        s.put_flag("grounded", false);
        assert!(!s.has_flag("grounded"));
    }

    #[test]
    fn take_flag_consumes() {
        let mut s = Signals::default().with_flag("hit");
        assert!(s.take_flag("hit"));
        assert!(!s.take_flag("hit"));
    }

    #[test]
    fn scalar_defaults() {
        let s = Signals::default().with_scalar("speed", 2.5);
        assert_eq!(s.scalar("speed"), Some(2.5));
        assert_eq!(s.scalar_or("missing", 1.0), 1.0);
        assert_eq!(s.integer("missing"), None);
        assert_eq!(s.text("missing"), None);
    }
}
