//! Left/right orientation.
//!
//! Facing flips the sprite and mirrors horizontal offsets and speeds. Entities
//! without the capability simply do not carry the component.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Sign applied to horizontal quantities: -1 for left, +1 for right.
    pub fn value(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    pub fn flip(&mut self) {
        *self = self.flipped();
    }

    /// Facing that looks from `from_x` toward `target_x`. Ties face right.
    pub fn toward(from_x: f32, target_x: f32) -> Self {
        if target_x < from_x {
            Facing::Left
        } else {
            Facing::Right
        }
    }

    pub fn is_left(self) -> bool {
        self == Facing::Left
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Some(Facing::Left),
            "right" => Some(Facing::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toward_picks_side() {
        assert_eq!(Facing::toward(10.0, 2.0), Facing::Left);
        assert_eq!(Facing::toward(10.0, 20.0), Facing::Right);
        assert_eq!(Facing::toward(10.0, 10.0), Facing::Right);
    }

    #[test]
    fn flip_and_value() {
        let mut f = Facing::Left;
        assert_eq!(f.value(), -1.0);
        f.flip();
        assert_eq!(f, Facing::Right);
        assert_eq!(f.value(), 1.0);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Facing::parse("LEFT"), Some(Facing::Left));
        assert_eq!(Facing::parse("up"), None);
    }
}
