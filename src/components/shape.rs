//! Axis-aligned collision shapes.
//!
//! [`Rect`] is used for body bounds and culling; [`Shape`] describes a fixture
//! volume relative to an attachment point, and [`WorldShape`] is that volume
//! resolved in world space for overlap tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Rectangle anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    /// Returns (min, max), normalizing negative sizes.
    pub fn min_max(&self) -> (Vec2, Vec2) {
        let p0 = Vec2::new(self.x, self.y);
        let p1 = p0 + Vec2::new(self.width, self.height);
        (p0.min(p1), p0.max(p1))
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x - self.width / 2.0;
        self.y = center.y - self.height / 2.0;
    }

    /// Bottom-center point, the usual anchor for grounded enemies.
    pub fn bottom_center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y)
    }

    pub fn set_bottom_center(&mut self, point: Vec2) {
        self.x = point.x - self.width / 2.0;
        self.y = point.y;
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        let (min_a, max_a) = self.min_max();
        let (min_b, max_b) = other.min_max();
        min_a.x < max_b.x && max_a.x > min_b.x && min_a.y < max_b.y && max_a.y > min_b.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        let (min, max) = self.min_max();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

/// Fixture volume, centered on the fixture's attachment point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect { size: Vec2 },
    Circle { radius: f32 },
}

impl Shape {
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Rect {
            size: Vec2::new(width, height),
        }
    }

    pub fn square(side: f32) -> Self {
        Self::rect(side, side)
    }

    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    /// Resolve this shape around a world-space center.
    pub fn world(&self, center: Vec2) -> WorldShape {
        match *self {
            Shape::Rect { size } => WorldShape::Rect(Rect::centered(center, size)),
            Shape::Circle { radius } => WorldShape::Circle { center, radius },
        }
    }
}

/// A shape placed in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldShape {
    Rect(Rect),
    Circle { center: Vec2, radius: f32 },
}

impl WorldShape {
    pub fn overlaps(&self, other: &WorldShape) -> bool {
        match (self, other) {
            (WorldShape::Rect(a), WorldShape::Rect(b)) => a.overlaps(b),
            (
                WorldShape::Circle {
                    center: ca,
                    radius: ra,
                },
                WorldShape::Circle {
                    center: cb,
                    radius: rb,
                },
            ) => ca.distance_squared(*cb) < (ra + rb) * (ra + rb),
            (WorldShape::Rect(r), WorldShape::Circle { center, radius })
            | (WorldShape::Circle { center, radius }, WorldShape::Rect(r)) => {
                rect_circle_overlap(r, *center, *radius)
            }
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            WorldShape::Rect(r) => r.center(),
            WorldShape::Circle { center, .. } => *center,
        }
    }
}

fn rect_circle_overlap(rect: &Rect, center: Vec2, radius: f32) -> bool {
    let (min, max) = rect.min_max();
    let closest = center.clamp(min, max);
    closest.distance_squared(center) < radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn rect_negative_size_is_normalized() {
        let a = Rect::new(10.0, 10.0, -10.0, -10.0);
        let b = Rect::new(5.0, 5.0, 1.0, 1.0);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn centered_rect_round_trips_center() {
        let r = Rect::centered(Vec2::new(3.0, 4.0), Vec2::new(2.0, 6.0));
        assert_eq!(r.center(), Vec2::new(3.0, 4.0));
        assert_eq!(r.x, 2.0);
        assert_eq!(r.y, 1.0);
    }

    #[test]
    fn bottom_center_anchor() {
        let mut r = Rect::new(0.0, 0.0, 4.0, 4.0);
        r.set_bottom_center(Vec2::new(10.0, 100.0));
        assert_eq!(r.x, 8.0);
        assert_eq!(r.y, 100.0);
        assert_eq!(r.bottom_center(), Vec2::new(10.0, 100.0));
    }

    #[test]
    fn circle_circle_overlap() {
        let a = Shape::circle(1.0).world(Vec2::ZERO);
        let b = Shape::circle(1.0).world(Vec2::new(1.5, 0.0));
        let c = Shape::circle(1.0).world(Vec2::new(2.5, 0.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn rect_circle_overlap_uses_closest_point() {
        let r = Shape::square(2.0).world(Vec2::ZERO);
        let near = Shape::circle(0.5).world(Vec2::new(1.2, 0.0));
        let corner_miss = Shape::circle(0.5).world(Vec2::new(1.4, 1.4));
        assert!(r.overlaps(&near));
        assert!(near.overlaps(&r));
        assert!(!r.overlaps(&corner_miss));
    }
}
