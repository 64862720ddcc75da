pub mod affine;
pub mod angle;
pub mod point;
pub mod quadrature;
pub mod solve;

pub use affine::AffineTransform;
pub use point::{Point, ORIGIN};

/// 2D point type used at the nalgebra boundary.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type used at the nalgebra boundary.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3x3 homogeneous matrix backing [`AffineTransform`].
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Default tolerance for floating-point comparisons.
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Default maximum deviation when flattening curves.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Tolerance predicate for floating-point comparisons.
///
/// There is no process-wide epsilon: every [`crate::path::Path`] binds one at
/// construction and passes it down to the math it calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Epsilon(pub f64);

impl Default for Epsilon {
    fn default() -> Self {
        Self(DEFAULT_EPSILON)
    }
}

impl Epsilon {
    /// Returns the raw tolerance.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns true if `a` and `b` differ by at most epsilon.
    #[must_use]
    pub fn equal(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.0
    }

    /// Returns true if the angles `a` and `b` are equal modulo 2π.
    #[must_use]
    pub fn angle_equal(self, a: f64, b: f64) -> bool {
        let d = angle::angle_norm(a - b);
        d <= self.0 || std::f64::consts::TAU - self.0 <= d
    }

    /// Returns true if `f` lies in `[lower, upper]` with epsilon slack on both ends.
    #[must_use]
    pub fn interval(self, f: f64, lower: f64, upper: f64) -> bool {
        lower - self.0 <= f && f <= upper + self.0
    }

    /// Returns true if `f` lies in `(lower, upper)` and at least epsilon away from both ends.
    #[must_use]
    pub fn interval_exclusive(self, f: f64, lower: f64, upper: f64) -> bool {
        lower + self.0 < f && f < upper - self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn equality() {
        let eps = Epsilon::default();
        assert!(eps.equal(1.0, 1.0 + 1e-11));
        assert!(!eps.equal(1.0, 1.0 + 1e-9));
        assert!(Epsilon(0.1).equal(1.0, 1.05));
    }

    #[test]
    fn angles() {
        let eps = Epsilon::default();
        assert!(eps.angle_equal(0.0, 2.0 * PI));
        assert!(eps.angle_equal(-PI, PI));
        assert!(eps.angle_equal(1e-11, 2.0 * PI - 1e-11));
        assert!(!eps.angle_equal(0.0, PI));
    }

    #[test]
    fn intervals() {
        let eps = Epsilon::default();
        assert!(eps.interval(1.0, 0.0, 1.0));
        assert!(eps.interval(-1e-11, 0.0, 1.0));
        assert!(!eps.interval(1.1, 0.0, 1.0));
        assert!(eps.interval_exclusive(0.5, 0.0, 1.0));
        assert!(!eps.interval_exclusive(1.0 - 1e-11, 0.0, 1.0));
        assert!(!eps.interval_exclusive(0.0, 0.0, 1.0));
    }
}
