//! Spawn configuration bags.
//!
//! A [`SpawnConfig`] is the key→value bag an entity receives each time it is
//! (re)activated. Required keys are read with the `require_*` accessors, which
//! fail with an error naming the entity type and the key. Optional keys use the
//! `*_or` accessors with an explicit default.
//!
//! Bags deserialize from plain JSON objects:
//!
//! ```json
//! { "bounds": { "x": 0, "y": 100, "width": 16, "height": 16 },
//!   "facing": "left", "bounce_delay": 0.75, "origin": [4.0, 2.0] }
//! ```

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::components::facing::Facing;
use crate::components::shape::Rect;
use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpawnValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Vec2(Vec2),
    Rect(Rect),
    Str(String),
    Facing(Facing),
}

impl SpawnValue {
    fn as_f32(&self) -> Option<f32> {
        match self {
            SpawnValue::Float(v) => Some(*v as f32),
            SpawnValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    fn as_i32(&self) -> Option<i32> {
        match self {
            SpawnValue::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }

    fn as_facing(&self) -> Option<Facing> {
        match self {
            SpawnValue::Facing(f) => Some(*f),
            SpawnValue::Str(s) => Facing::parse(s),
            _ => None,
        }
    }
}

impl From<bool> for SpawnValue {
    fn from(v: bool) -> Self {
        SpawnValue::Bool(v)
    }
}
impl From<i32> for SpawnValue {
    fn from(v: i32) -> Self {
        SpawnValue::Int(v as i64)
    }
}
impl From<f32> for SpawnValue {
    fn from(v: f32) -> Self {
        SpawnValue::Float(v as f64)
    }
}
impl From<&str> for SpawnValue {
    fn from(v: &str) -> Self {
        SpawnValue::Str(v.to_string())
    }
}
impl From<String> for SpawnValue {
    fn from(v: String) -> Self {
        SpawnValue::Str(v)
    }
}
impl From<Vec2> for SpawnValue {
    fn from(v: Vec2) -> Self {
        SpawnValue::Vec2(v)
    }
}
impl From<Rect> for SpawnValue {
    fn from(v: Rect) -> Self {
        SpawnValue::Rect(v)
    }
}
impl From<Facing> for SpawnValue {
    fn from(v: Facing) -> Self {
        SpawnValue::Facing(v)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpawnConfig {
    entries: FxHashMap<String, SpawnValue>,
    /// Entity type named in errors; set by the factory before spawning.
    #[serde(skip)]
    tag: String,
}

macro_rules! accessors {
    ($require:ident, $or:ident, $ty:ty, $expected:literal, $conv:expr) => {
        pub fn $require(&self, key: &str) -> SimResult<$ty> {
            let value = self.entries.get(key).ok_or_else(|| self.missing(key))?;
            let conv: fn(&SpawnValue) -> Option<$ty> = $conv;
            conv(value).ok_or_else(|| self.invalid(key, $expected))
        }

        pub fn $or(&self, key: &str, default: $ty) -> SimResult<$ty> {
            match self.entries.get(key) {
                None => Ok(default),
                Some(_) => self.$require(key),
            }
        }
    };
}

impl SpawnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<SpawnValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SpawnValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SpawnValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    fn missing(&self, key: &str) -> SimError {
        SimError::MissingSpawnKey {
            entity: self.tag.clone(),
            key: key.to_string(),
        }
    }

    fn invalid(&self, key: &str, expected: &'static str) -> SimError {
        SimError::InvalidSpawnValue {
            entity: self.tag.clone(),
            key: key.to_string(),
            expected,
        }
    }

    accessors!(require_f32, f32_or, f32, "a number", SpawnValue::as_f32);
    accessors!(require_i32, i32_or, i32, "an integer", SpawnValue::as_i32);
    accessors!(require_bool, bool_or, bool, "a boolean", |v| match v {
        SpawnValue::Bool(b) => Some(*b),
        _ => None,
    });
    accessors!(require_vec2, vec2_or, Vec2, "a 2D vector", |v| match v {
        SpawnValue::Vec2(p) => Some(*p),
        _ => None,
    });
    accessors!(require_rect, rect_or, Rect, "a rectangle", |v| match v {
        SpawnValue::Rect(r) => Some(*r),
        _ => None,
    });
    accessors!(require_facing, facing_or, Facing, "`left` or `right`", SpawnValue::as_facing);

    pub fn require_str(&self, key: &str) -> SimResult<&str> {
        match self.entries.get(key) {
            Some(SpawnValue::Str(s)) => Ok(s),
            Some(_) => Err(self.invalid(key, "a string")),
            None => Err(self.missing(key)),
        }
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> SimResult<&'a str> {
        match self.entries.get(key) {
            None => Ok(default),
            Some(_) => self.require_str(key),
        }
    }
}

/// Request to spawn an entity at the end of the current tick.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub tag: String,
    pub config: SpawnConfig,
    /// Entity that tracks the spawned one as an owned child.
    pub parent: Option<Entity>,
}

impl SpawnRequest {
    pub fn new(tag: impl Into<String>, config: SpawnConfig) -> Self {
        Self {
            tag: tag.into(),
            config,
            parent: None,
        }
    }

    pub fn child_of(mut self, parent: Entity) -> Self {
        self.parent = Some(parent);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_bag() {
        let mut cfg = SpawnConfig::from_json(
            r#"{
                "bounds": { "x": 1.0, "y": 100.0, "width": 16.0, "height": 16.0 },
                "facing": "left",
                "delay": 0.75,
                "count": 3,
                "origin": [4.0, 2.0],
                "armed": true
            }"#,
        )
        .unwrap();
        cfg.set_tag("bouncer");
        assert_eq!(cfg.require_rect("bounds").unwrap().y, 100.0);
        assert_eq!(cfg.require_facing("facing").unwrap(), Facing::Left);
        assert_eq!(cfg.require_f32("delay").unwrap(), 0.75);
        assert_eq!(cfg.require_i32("count").unwrap(), 3);
        assert_eq!(cfg.require_f32("count").unwrap(), 3.0);
        assert_eq!(cfg.require_vec2("origin").unwrap(), Vec2::new(4.0, 2.0));
        assert!(cfg.require_bool("armed").unwrap());
    }

    #[test]
    fn missing_key_names_entity_and_key() {
        let mut cfg = SpawnConfig::new();
        cfg.set_tag("saucer");
        let err = cfg.require_rect("bounds").unwrap_err();
        assert_eq!(
            err,
            SimError::MissingSpawnKey {
                entity: "saucer".into(),
                key: "bounds".into()
            }
        );
        assert_eq!(err.to_string(), "saucer: missing required spawn key `bounds`");
    }

    #[test]
    fn wrong_type_is_invalid_not_defaulted() {
        let cfg = SpawnConfig::new().with("speed", "fast");
        assert!(matches!(
            cfg.f32_or("speed", 1.0),
            Err(SimError::InvalidSpawnValue { .. })
        ));
        assert_eq!(cfg.f32_or("other", 1.0).unwrap(), 1.0);
        assert_eq!(cfg.str_or("speed", "slow").unwrap(), "fast");
    }

    #[test]
    fn programmatic_facing() {
        let cfg = SpawnConfig::new().with("facing", Facing::Left);
        assert_eq!(cfg.facing_or("facing", Facing::Right).unwrap(), Facing::Left);
    }
}
