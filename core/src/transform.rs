//! 2D affine transforms.

use cgmath::{Matrix3, Point2, SquareMatrix, Vector3};

/// A 2D affine transform in homogeneous coordinates.
///
/// Views apply their transform about the center of their frame, so a scale never moves the
/// view’s center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform(pub Matrix3<f64>);

impl Default for Transform {
    fn default() -> Self {
        Transform::identity()
    }
}

impl Transform {
    pub fn identity() -> Transform {
        Transform(Matrix3::identity())
    }

    /// A scale transform.
    pub fn scale(sx: f64, sy: f64) -> Transform {
        Transform(Matrix3::new(sx, 0., 0., 0., sy, 0., 0., 0., 1.))
    }

    /// Transforms a point.
    pub fn apply(&self, point: Point2<f64>) -> Point2<f64> {
        let v = self.0 * Vector3::new(point.x, point.y, 1.);
        Point2::new(v.x, v.y)
    }

    /// Returns the inverse transform, or None if the transform is degenerate (e.g. a zero scale).
    pub fn invert(&self) -> Option<Transform> {
        self.0.invert().map(Transform)
    }

    pub fn is_identity(&self) -> bool {
        self.0 == Matrix3::identity()
    }

    /// Component-wise interpolation.
    ///
    /// Good enough for scales and translations, which is all popups animate.
    pub fn lerp(&self, other: Transform, t: f64) -> Transform {
        Transform(self.0 + (other.0 - self.0) * t)
    }
}
