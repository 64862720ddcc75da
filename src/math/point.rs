use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use super::{Epsilon, Point2, Vector2};

/// A 2D point or vector, always passed by value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The origin `(0, 0)`.
pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true when both coordinates are equal within `eps`.
    #[must_use]
    pub fn equals(self, q: Point, eps: Epsilon) -> bool {
        eps.equal(self.x, q.x) && eps.equal(self.y, q.y)
    }

    #[must_use]
    pub fn is_zero(self, eps: Epsilon) -> bool {
        self.equals(ORIGIN, eps)
    }

    #[must_use]
    pub fn dot(self, q: Point) -> f64 {
        self.x * q.x + self.y * q.y
    }

    /// Returns the z-component of the cross product `self × q`.
    #[must_use]
    pub fn perp_dot(self, q: Point) -> f64 {
        self.x * q.y - self.y * q.x
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Returns the vector scaled to length `len`. A zero vector stays zero.
    #[must_use]
    pub fn norm(self, len: f64) -> Point {
        let d = self.length();
        if d == 0.0 {
            return ORIGIN;
        }
        self * (len / d)
    }

    /// Rotates by 90 degrees clockwise.
    #[must_use]
    pub fn rot90cw(self) -> Point {
        Point::new(self.y, -self.x)
    }

    /// Rotates by 90 degrees counter clockwise.
    #[must_use]
    pub fn rot90ccw(self) -> Point {
        Point::new(-self.y, self.x)
    }

    /// Rotates by `phi` radians counter clockwise around `origin`.
    #[must_use]
    pub fn rot(self, phi: f64, origin: Point) -> Point {
        let (sinphi, cosphi) = phi.sin_cos();
        let d = self - origin;
        Point::new(
            origin.x + cosphi * d.x - sinphi * d.y,
            origin.y + sinphi * d.x + cosphi * d.y,
        )
    }

    /// Linear interpolation towards `q`, `t = 0` yields `self`.
    #[must_use]
    pub fn interpolate(self, q: Point, t: f64) -> Point {
        Point::new((1.0 - t) * self.x + t * q.x, (1.0 - t) * self.y + t * q.y)
    }

    /// Angle of the vector with the x-axis in `(-π, π]`.
    #[must_use]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Signed angle from `self` to `q` in `(-π, π]`.
    #[must_use]
    pub fn angle_between(self, q: Point) -> f64 {
        self.perp_dot(q).atan2(self.dot(q))
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, q: Point) -> Point {
        Point::new(self.x + q.x, self.y + q.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, q: Point) {
        self.x += q.x;
        self.y += q.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, q: Point) -> Point {
        Point::new(self.x - q.x, self.y - q.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, q: Point) {
        self.x -= q.x;
        self.y -= q.y;
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, f: f64) -> Point {
        Point::new(self.x * f, self.y * f)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, f: f64) -> Point {
        Point::new(self.x / f, self.y / f)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<Point2> for Point {
    fn from(p: Point2) -> Self {
        Point::new(p.x, p.y)
    }
}

impl From<Point> for Point2 {
    fn from(p: Point) -> Self {
        Point2::new(p.x, p.y)
    }
}

impl From<Vector2> for Point {
    fn from(v: Vector2) -> Self {
        Point::new(v.x, v.y)
    }
}

impl From<Point> for Vector2 {
    fn from(p: Point) -> Self {
        Vector2::new(p.x, p.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
