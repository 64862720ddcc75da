use std::fmt;

use super::solve::solve_quadratic;
use super::{Epsilon, Matrix3, Point};

/// A 2D affine transformation: a linear map followed by a translation.
///
/// Composition right-multiplies, so `IDENTITY.translate(..).rotate(..)` rotates
/// first and translates second, the same order as SVG transform lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    m: Matrix3,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    pub const IDENTITY: Self = Self {
        m: Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0),
    };

    /// Creates a transform from its row-major coefficients
    /// `[[a, b, tx], [c, d, ty]]`.
    #[must_use]
    pub fn new(a: f64, b: f64, tx: f64, c: f64, d: f64, ty: f64) -> Self {
        Self {
            m: Matrix3::new(a, b, tx, c, d, ty, 0.0, 0.0, 1.0),
        }
    }

    /// Returns the coefficient at `row` (0 or 1) and `col` (0 to 2).
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[(row, col)]
    }

    /// Returns the backing homogeneous matrix.
    #[must_use]
    pub fn matrix(&self) -> &Matrix3 {
        &self.m
    }

    /// Composes `self · q`, applying `q` first.
    #[must_use]
    pub fn mul(&self, q: &AffineTransform) -> Self {
        Self { m: self.m * q.m }
    }

    /// Applies the transform to a point.
    #[must_use]
    pub fn dot(&self, p: Point) -> Point {
        let v = self.m * nalgebra::Vector3::new(p.x, p.y, 1.0);
        Point::new(v.x, v.y)
    }

    /// Applies only the linear part, as for direction vectors.
    #[must_use]
    pub fn dot_vector(&self, p: Point) -> Point {
        let v = self.m * nalgebra::Vector3::new(p.x, p.y, 0.0);
        Point::new(v.x, v.y)
    }

    #[must_use]
    pub fn translate(&self, x: f64, y: f64) -> Self {
        self.mul(&Self::new(1.0, 0.0, x, 0.0, 1.0, y))
    }

    #[must_use]
    pub fn scale(&self, x: f64, y: f64) -> Self {
        self.mul(&Self::new(x, 0.0, 0.0, 0.0, y, 0.0))
    }

    /// Scales around the point `(x, y)`.
    #[must_use]
    pub fn scale_about(&self, sx: f64, sy: f64, x: f64, y: f64) -> Self {
        self.translate(x, y).scale(sx, sy).translate(-x, -y)
    }

    /// Rotates counter clockwise by `rot` degrees.
    #[must_use]
    pub fn rotate(&self, rot: f64) -> Self {
        let (sin, cos) = rot.to_radians().sin_cos();
        self.mul(&Self::new(cos, -sin, 0.0, sin, cos, 0.0))
    }

    /// Rotates counter clockwise by `rot` degrees around the point `(x, y)`.
    #[must_use]
    pub fn rotate_about(&self, rot: f64, x: f64, y: f64) -> Self {
        self.translate(x, y).rotate(rot).translate(-x, -y)
    }

    #[must_use]
    pub fn shear(&self, x: f64, y: f64) -> Self {
        self.mul(&Self::new(1.0, x, 0.0, y, 1.0, 0.0))
    }

    /// Mirrors along the y-axis, negating x.
    #[must_use]
    pub fn reflect_x(&self) -> Self {
        self.scale(-1.0, 1.0)
    }

    /// Mirrors along the x-axis, negating y.
    #[must_use]
    pub fn reflect_y(&self) -> Self {
        self.scale(1.0, -1.0)
    }

    /// Transposes the linear part and drops the translation.
    #[must_use]
    pub fn transpose(&self) -> Self {
        Self::new(
            self.m[(0, 0)],
            self.m[(1, 0)],
            0.0,
            self.m[(0, 1)],
            self.m[(1, 1)],
            0.0,
        )
    }

    /// Determinant of the linear part.
    #[must_use]
    pub fn det(&self) -> f64 {
        self.m[(0, 0)] * self.m[(1, 1)] - self.m[(0, 1)] * self.m[(1, 0)]
    }

    /// Returns the inverse, or `None` when the linear part is singular.
    #[must_use]
    pub fn inv(&self) -> Option<Self> {
        if self.det() == 0.0 {
            return None;
        }
        self.m.try_inverse().map(|m| Self { m })
    }

    /// Returns true if all coefficients are equal within `eps`.
    #[must_use]
    pub fn equals(&self, q: &AffineTransform, eps: Epsilon) -> bool {
        self.m
            .iter()
            .zip(q.m.iter())
            .all(|(a, b)| eps.equal(*a, *b))
    }

    /// Eigen-decomposition of the linear part.
    ///
    /// Returns `(λ1, λ2, v1, v2)` with `λ1 ≤ λ2` and unit eigenvectors. When the
    /// matrix has no real eigenvalues both are NaN and the vectors are zero. A
    /// repeated eigenvalue is returned twice.
    #[must_use]
    pub fn eigen(&self, eps: Epsilon) -> (f64, f64, Point, Point) {
        let (m00, m01, m10, m11) = (
            self.m[(0, 0)],
            self.m[(0, 1)],
            self.m[(1, 0)],
            self.m[(1, 1)],
        );
        let (lambda1, mut lambda2) = solve_quadratic(1.0, -m00 - m11, self.det(), eps);
        if lambda1.is_nan() && lambda2.is_nan() {
            return (lambda1, lambda2, Point::default(), Point::default());
        } else if lambda2.is_nan() {
            lambda2 = lambda1;
        }

        let (v1, v2) = if !eps.equal(m10, 0.0) {
            (
                Point::new(lambda1 - m11, m10).norm(1.0),
                Point::new(lambda2 - m11, m10).norm(1.0),
            )
        } else if !eps.equal(m01, 0.0) {
            (
                Point::new(m01, lambda1 - m00).norm(1.0),
                Point::new(m01, lambda2 - m00).norm(1.0),
            )
        } else if (lambda1 - m00).abs() <= (lambda1 - m11).abs() {
            (Point::new(1.0, 0.0), Point::new(0.0, 1.0))
        } else {
            (Point::new(0.0, 1.0), Point::new(1.0, 0.0))
        };
        (lambda1, lambda2, v1, v2)
    }

    /// Decomposes into `(tx, ty, phi, sx, sy, theta)` such that the transform equals
    /// `translate(tx, ty)·rotate(phi)·scale(sx, sy)·rotate(theta)`, angles in degrees.
    #[must_use]
    pub fn decompose(&self, eps: Epsilon) -> (f64, f64, f64, f64, f64, f64) {
        let (m00, m01, m10, m11) = (
            self.m[(0, 0)],
            self.m[(0, 1)],
            self.m[(1, 0)],
            self.m[(1, 1)],
        );
        let e = (m00 + m11) / 2.0;
        let f = (m00 - m11) / 2.0;
        let g = (m10 + m01) / 2.0;
        let h = (m10 - m01) / 2.0;
        let q = e.hypot(h);
        let r = f.hypot(g);
        let (sx, sy) = (q + r, q - r);
        let a1 = g.atan2(f);
        let a2 = h.atan2(e);
        let mut theta = ((a2 - a1) / 2.0).to_degrees();
        let mut phi = ((a2 + a1) / 2.0).to_degrees();
        if eps.equal(sx, 1.0) && eps.equal(sy, 1.0) {
            theta += phi;
            phi = 0.0;
        }
        (self.m[(0, 2)], self.m[(1, 2)], phi, sx, sy, theta)
    }

    /// Returns true if the transform preserves angles and length ratios.
    #[must_use]
    pub fn is_similarity(&self, eps: Epsilon) -> bool {
        let (_, _, _, sx, sy, _) = self.decompose(eps);
        eps.equal(sx.abs(), sy.abs())
    }
}

impl fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} {}; {} {}) + ({},{})",
            self.m[(0, 0)],
            self.m[(0, 1)],
            self.m[(1, 0)],
            self.m[(1, 1)],
            self.m[(0, 2)],
            self.m[(1, 2)]
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const EPS: Epsilon = Epsilon(1e-10);
    const I: AffineTransform = AffineTransform::IDENTITY;

    fn assert_point(p: Point, x: f64, y: f64) {
        assert!(p.equals(Point::new(x, y), EPS), "{p} != ({x},{y})");
    }

    #[test]
    fn apply() {
        let p = Point::new(3.0, 4.0);
        assert_point(I.translate(2.0, 2.0).dot(p), 5.0, 6.0);
        assert_point(I.scale(2.0, 2.0).dot(p), 6.0, 8.0);
        assert_point(I.scale(1.0, -1.0).dot(p), 3.0, -4.0);
        assert_point(I.scale_about(2.0, -1.0, 2.0, 2.0).dot(p), 4.0, 0.0);
        assert_point(I.shear(1.0, 0.0).dot(p), 7.0, 4.0);
        assert_point(I.rotate(90.0).dot(p), -4.0, 3.0);
        let about = I.rotate_about(90.0, 5.0, 5.0).dot(p);
        assert!(about.equals(p.rot(90.0_f64.to_radians(), Point::new(5.0, 5.0)), EPS));
        assert_point(I.reflect_x().dot(p), -3.0, 4.0);
        assert_point(I.reflect_y().dot(p), 3.0, -4.0);
        assert_point(I.rotate(90.0).transpose().dot(p), 4.0, -3.0);
        assert_point(I.translate(5.0, 5.0).dot_vector(p), 3.0, 4.0);
    }

    #[test]
    fn inverse_and_composition() {
        assert!(I
            .scale(2.0, 4.0)
            .inv()
            .unwrap()
            .equals(&I.scale(0.5, 0.25), EPS));
        assert!(I.rotate(90.0).inv().unwrap().equals(&I.rotate(-90.0), EPS));
        assert!(I
            .rotate(90.0)
            .scale(2.0, 1.0)
            .equals(&I.scale(1.0, 2.0).rotate(90.0), EPS));
        assert!(I.scale(0.0, 1.0).inv().is_none());

        let t = I.translate(3.0, -1.0).rotate(30.0).scale(2.0, 0.5);
        let p = Point::new(1.5, 2.5);
        assert!(t.inv().unwrap().dot(t.dot(p)).equals(p, Epsilon(1e-9)));
    }

    #[test]
    fn eigen() {
        let (l1, l2, v1, v2) = I.rotate(-90.0).scale(2.0, 1.0).rotate(90.0).eigen(EPS);
        assert_abs_diff_eq!(l1, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(l2, 2.0, epsilon = 1e-9);
        assert_point(v1, 1.0, 0.0);
        assert_point(v2, 0.0, 1.0);

        let half_sqrt2 = 1.0 / 2.0_f64.sqrt();
        let (l1, l2, v1, v2) = I.shear(1.0, 1.0).eigen(EPS);
        assert_abs_diff_eq!(l1, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(l2, 2.0, epsilon = 1e-9);
        assert_point(v1, -half_sqrt2, half_sqrt2);
        assert_point(v2, half_sqrt2, half_sqrt2);

        let (l1, l2, v1, v2) = I.shear(1.0, 0.0).eigen(EPS);
        assert_abs_diff_eq!(l1, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(l2, 1.0, epsilon = 1e-9);
        assert_point(v1, 1.0, 0.0);
        assert_point(v2, 1.0, 0.0);

        let (l1, l2, v1, v2) = I.scale(f64::NAN, f64::NAN).eigen(EPS);
        assert!(l1.is_nan() && l2.is_nan());
        assert_eq!(v1, Point::default());
        assert_eq!(v2, Point::default());
    }

    #[test]
    fn decompose() {
        let (tx, ty, phi, sx, sy, theta) =
            I.translate(1.0, 2.0).rotate(30.0).scale(2.0, 1.0).decompose(EPS);
        assert_abs_diff_eq!(tx, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ty, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(phi, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sx, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sy, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(theta, 0.0, epsilon = 1e-9);

        let t = I.translate(-4.0, 0.5).rotate(20.0).scale(3.0, 0.5).rotate(-65.0);
        let (tx, ty, phi, sx, sy, theta) = t.decompose(EPS);
        let rebuilt = I.translate(tx, ty).rotate(phi).scale(sx, sy).rotate(theta);
        assert!(rebuilt.equals(&t, Epsilon(1e-9)));
    }

    #[test]
    fn similarity() {
        assert!(I.translate(1.0, 1.0).is_similarity(EPS));
        assert!(I.rotate(33.0).scale(2.0, 2.0).is_similarity(EPS));
        assert!(!I.scale(2.0, 1.0).is_similarity(EPS));
        assert!(!I.shear(2.0, -1.0).is_similarity(EPS));
    }
}
