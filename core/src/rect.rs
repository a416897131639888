//! Rectangles.

use cgmath::{Point2, Vector2, Zero};

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<f64>,

    /// Rectangle size.
    pub size: Vector2<f64>,
}

impl Rect {
    /// Shorthand for creating a rectangle from its components.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect {
            origin: Point2::new(x, y),
            size: Vector2::new(width, height),
        }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point2::new(0., 0.),
            size: Vector2::zero(),
        }
    }

    /// Returns a rectangle of the given size at the origin.
    pub fn from_size(size: Vector2<f64>) -> Rect {
        Rect {
            origin: Point2::new(0., 0.),
            size,
        }
    }

    /// Returns the center point.
    pub fn center(&self) -> Point2<f64> {
        self.origin + self.size / 2.
    }

    /// Returns the rectangle moved to the origin, i.e. the bounds of a view with this frame.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size)
    }

    /// Returns true if the point is inside the rectangle.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }

    /// Returns a new rectangle with the given origin.
    pub fn with_origin(&self, origin: Point2<f64>) -> Rect {
        Rect {
            origin,
            size: self.size,
        }
    }

    /// Returns a new rectangle with the origin's x coordinate replaced.
    pub fn with_x(&self, x: f64) -> Rect {
        self.with_origin(Point2::new(x, self.origin.y))
    }

    /// Returns a new rectangle with the origin's y coordinate replaced.
    pub fn with_y(&self, y: f64) -> Rect {
        self.with_origin(Point2::new(self.origin.x, y))
    }

    /// Linearly interpolates origin and size.
    pub fn lerp(&self, other: Rect, t: f64) -> Rect {
        Rect {
            origin: Point2::new(
                lerp(self.origin.x, other.origin.x, t),
                lerp(self.origin.y, other.origin.y, t),
            ),
            size: Vector2::new(
                lerp(self.size.x, other.size.x, t),
                lerp(self.size.y, other.size.y, t),
            ),
        }
    }
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
