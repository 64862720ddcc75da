use crate::math::quadrature::{gauss_legendre5, gauss_legendre7};
use crate::math::solve::{solve_cubic, solve_quadratic};
use crate::math::{Epsilon, Point};

/// A quadratic Bézier curve with one control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadBezier {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
}

impl QuadBezier {
    #[must_use]
    pub fn new(p0: Point, p1: Point, p2: Point) -> Self {
        Self { p0, p1, p2 }
    }

    #[must_use]
    pub fn pos(&self, t: f64) -> Point {
        self.p0 * (1.0 - 2.0 * t + t * t) + self.p1 * (2.0 * t - 2.0 * t * t) + self.p2 * (t * t)
    }

    #[must_use]
    pub fn deriv(&self, t: f64) -> Point {
        self.p0 * (-2.0 + 2.0 * t) + self.p1 * (2.0 - 4.0 * t) + self.p2 * (2.0 * t)
    }

    #[must_use]
    pub fn deriv2(&self) -> Point {
        self.p0 * 2.0 + self.p1 * -4.0 + self.p2 * 2.0
    }

    /// Signed radius of curvature at `t`, NaN where the curve is straight. It is
    /// positive when the curve bends counter clockwise.
    #[must_use]
    pub fn curvature_radius(&self, t: f64, eps: Epsilon) -> f64 {
        curvature_radius(self.deriv(t), self.deriv2(), eps)
    }

    /// Exact arc length.
    #[must_use]
    pub fn length(&self, eps: Epsilon) -> f64 {
        let a = self.p0 - self.p1 * 2.0 + self.p2;
        let b = self.p1 * 2.0 - self.p0 * 2.0;
        let a_coef = 4.0 * a.dot(a);
        let b_coef = 4.0 * a.dot(b);
        let c_coef = b.dot(b);
        if eps.equal(a_coef, 0.0) {
            // control point halfway, a straight line
            return (self.p2 - self.p0).length();
        }
        if eps.equal(c_coef, 0.0) || eps.equal(a_coef + b_coef + c_coef, 0.0) {
            // control point on an end point, the closed form divides by zero
            let speed = |t: f64| self.deriv(t).length();
            return gauss_legendre5(&speed, 0.0, 1.0);
        }

        let sabc = 2.0 * (a_coef + b_coef + c_coef).sqrt();
        let a2 = a_coef.sqrt();
        let a32 = 2.0 * a_coef * a2;
        let c2 = 2.0 * c_coef.sqrt();
        let ba = b_coef / a2;
        (a32 * sabc
            + a2 * b_coef * (sabc - c2)
            + (4.0 * c_coef * a_coef - b_coef * b_coef) * ((2.0 * a2 + ba + sabc) / (ba + c2)).ln())
            / (4.0 * a32)
    }

    /// Splits at `t` into the parts before and after.
    #[must_use]
    pub fn split(&self, t: f64) -> (QuadBezier, QuadBezier) {
        let q1 = self.p0.interpolate(self.p1, t);
        let r1 = self.p1.interpolate(self.p2, t);
        let mid = q1.interpolate(r1, t);
        (
            QuadBezier::new(self.p0, q1, mid),
            QuadBezier::new(mid, r1, self.p2),
        )
    }

    /// Degree elevation to the identical cubic curve.
    #[must_use]
    pub fn to_cubic(&self) -> CubicBezier {
        CubicBezier::new(
            self.p0,
            self.p0.interpolate(self.p1, 2.0 / 3.0),
            self.p2.interpolate(self.p1, 2.0 / 3.0),
            self.p2,
        )
    }

    /// Shortest distance from `q` to the curve.
    #[must_use]
    pub fn distance(&self, q: Point, eps: Epsilon) -> f64 {
        let f = self.p0 - self.p1 * 2.0 + self.p2;
        let g = self.p1 * 2.0 - self.p0 * 2.0;
        let h = self.p0 - q;

        let a = 4.0 * f.dot(f);
        let b = 6.0 * f.dot(g);
        let c = 2.0 * (2.0 * f.dot(h) + g.dot(g));
        let d = 2.0 * g.dot(h);

        let (t0, t1, t2) = solve_cubic(a, b, c, d, eps);
        [t0, t1, t2, 0.0, 1.0]
            .into_iter()
            .filter(|t| !t.is_nan())
            .map(|t| (self.pos(t.clamp(0.0, 1.0)) - q).length())
            .fold(f64::INFINITY, f64::min)
    }

    /// Splits the curve where its x-derivative vanishes.
    #[must_use]
    pub fn x_monotone(&self, eps: Epsilon) -> Vec<QuadBezier> {
        let denom = self.p0.x - 2.0 * self.p1.x + self.p2.x;
        if !eps.equal(denom, 0.0) {
            let t = (self.p0.x - self.p1.x) / denom;
            if 0.0 < t && t < 1.0 {
                let (q, r) = self.split(t);
                return vec![q, r];
            }
        }
        vec![*self]
    }

    /// Approximates the curve by line segments within `tolerance`.
    ///
    /// Returns the polyline vertices after `p0`, ending in `p2`.
    #[must_use]
    pub fn flatten(&self, tolerance: f64, eps: Epsilon) -> Vec<Point> {
        let mut out = Vec::new();
        let mut curve = *self;
        loop {
            if curve.p0.equals(curve.p1, eps) {
                break;
            }
            let d = curve.p1 - curve.p0;
            let denom = d.length();
            let s2nom = d.perp_dot(curve.p2 - curve.p0);
            let t = 2.0 * (tolerance * (denom / s2nom).abs()).sqrt();
            if t >= 1.0 || t.is_nan() {
                break;
            }
            curve = curve.split(t).1;
            out.push(curve.p0);
        }
        out.push(self.p2);
        out
    }
}

/// A cubic Bézier curve with two control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicBezier {
    #[must_use]
    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    #[must_use]
    pub fn pos(&self, t: f64) -> Point {
        let tt = t * t;
        let ttt = tt * t;
        self.p0 * (1.0 - 3.0 * t + 3.0 * tt - ttt)
            + self.p1 * (3.0 * t - 6.0 * tt + 3.0 * ttt)
            + self.p2 * (3.0 * tt - 3.0 * ttt)
            + self.p3 * ttt
    }

    #[must_use]
    pub fn deriv(&self, t: f64) -> Point {
        let tt = t * t;
        self.p0 * (-3.0 + 6.0 * t - 3.0 * tt)
            + self.p1 * (3.0 - 12.0 * t + 9.0 * tt)
            + self.p2 * (6.0 * t - 9.0 * tt)
            + self.p3 * (3.0 * tt)
    }

    #[must_use]
    pub fn deriv2(&self, t: f64) -> Point {
        self.p0 * (6.0 - 6.0 * t)
            + self.p1 * (18.0 * t - 12.0)
            + self.p2 * (6.0 - 18.0 * t)
            + self.p3 * (6.0 * t)
    }

    #[must_use]
    pub fn deriv3(&self) -> Point {
        self.p0 * -6.0 + self.p1 * 18.0 + self.p2 * -18.0 + self.p3 * 6.0
    }

    /// Signed radius of curvature at `t`, NaN where the curve is straight. It is
    /// positive when the curve bends counter clockwise.
    #[must_use]
    pub fn curvature_radius(&self, t: f64, eps: Epsilon) -> f64 {
        curvature_radius(self.deriv(t), self.deriv2(t), eps)
    }

    /// Normal of length `d` to the right of the curve at its start.
    ///
    /// Falls back to later control points when earlier ones coincide, and is zero
    /// when all four points coincide.
    #[must_use]
    pub fn start_normal(&self, d: f64) -> Point {
        [self.p1, self.p2, self.p3]
            .into_iter()
            .map(|p| p - self.p0)
            .find(|n| n.x != 0.0 || n.y != 0.0)
            .map_or_else(Point::default, |n| n.rot90cw().norm(d))
    }

    /// Normal of length `d` to the right of the curve at its end.
    #[must_use]
    pub fn end_normal(&self, d: f64) -> Point {
        [self.p2, self.p1, self.p0]
            .into_iter()
            .map(|p| self.p3 - p)
            .find(|n| n.x != 0.0 || n.y != 0.0)
            .map_or_else(Point::default, |n| n.rot90cw().norm(d))
    }

    /// Arc length, integrated per segment between inflection points.
    #[must_use]
    pub fn length(&self, eps: Epsilon) -> f64 {
        let (t1, t2) = self.inflections(eps);
        let mut pieces = Vec::with_capacity(3);
        if 0.0 < t1 && t1 < 1.0 && 0.0 < t2 && t2 < 1.0 {
            let (first, rest) = self.split(t1);
            let (second, third) = rest.split((t2 - t1) / (1.0 - t1));
            pieces.extend([first, second, third]);
        } else if 0.0 < t1 && t1 < 1.0 {
            let (first, second) = self.split(t1);
            pieces.extend([first, second]);
        } else {
            pieces.push(*self);
        }

        pieces
            .iter()
            .map(|c| gauss_legendre7(&|t| c.deriv(t).length(), 0.0, 1.0))
            .sum()
    }

    /// Splits at `t` into the parts before and after.
    #[must_use]
    pub fn split(&self, t: f64) -> (CubicBezier, CubicBezier) {
        let pm = self.p1.interpolate(self.p2, t);

        let q1 = self.p0.interpolate(self.p1, t);
        let q2 = q1.interpolate(pm, t);

        let r2 = self.p2.interpolate(self.p3, t);
        let r1 = pm.interpolate(r2, t);

        let mid = q2.interpolate(r1, t);
        (
            CubicBezier::new(self.p0, q1, q2, mid),
            CubicBezier::new(mid, r1, r2, self.p3),
        )
    }

    /// Parameters of the inflection points strictly inside `(0, 1)`, NaN when absent.
    ///
    /// A single inflection point is always returned first.
    #[must_use]
    pub fn inflections(&self, eps: Epsilon) -> (f64, f64) {
        let (p0, p1, p2, p3) = (self.p0, self.p1, self.p2, self.p3);
        let a3 = p0 * -1.0 + p1 * 3.0 - p2 * 3.0 + p3;
        let b3 = p0 - p1 * 2.0 + p2;
        let c3 = p1 - p0;

        let a = a3.y * b3.x - a3.x * b3.y;
        let b = a3.y * c3.x - a3.x * c3.y;
        let c = b3.y * c3.x - b3.x * c3.y;
        let (mut x1, mut x2) = solve_quadratic(a, b, c, eps);

        let half = eps.0 / 2.0;
        if x1 < half || 1.0 - half < x1 {
            x1 = f64::NAN;
        }
        if x2 < half || 1.0 - half < x2 {
            x2 = f64::NAN;
        } else if x1.is_nan() {
            std::mem::swap(&mut x1, &mut x2);
        }
        (x1, x2)
    }

    #[must_use]
    pub fn num_inflections(&self, eps: Epsilon) -> usize {
        match self.inflections(eps) {
            (_, t2) if !t2.is_nan() => 2,
            (t1, _) if !t1.is_nan() => 1,
            _ => 0,
        }
    }

    /// Parameter range around the inflection point at `t` that lies within
    /// `tolerance` of a straight line. Infinite when `t` is NaN.
    #[must_use]
    pub fn inflection_range(&self, t: f64, tolerance: f64, eps: Epsilon) -> (f64, f64) {
        if t.is_nan() {
            return (f64::INFINITY, f64::INFINITY);
        }

        let c = if eps.equal(t, 0.0) { *self } else { self.split(t).1 };
        let ns = c.p3 - c.p0;
        let mut nr = c.p1 - c.p0;
        if nr.is_zero(eps) {
            nr = c.p2 - c.p0;
        }
        if nr.is_zero(eps) {
            // p0, p1 and p2 coincide
            return (0.0, 1.0);
        }

        let s3 = ns.perp_dot(nr).abs() / nr.length();
        if eps.equal(s3, 0.0) {
            return (0.0, 1.0);
        }

        let tf = (tolerance / s3).cbrt();
        (t - tf * (1.0 - t), t + tf * (1.0 - t))
    }

    /// Splits the curve where its x-derivative vanishes.
    #[must_use]
    pub fn x_monotone(&self, eps: Epsilon) -> Vec<CubicBezier> {
        let a = -self.p0.x + 3.0 * self.p1.x - 3.0 * self.p2.x + self.p3.x;
        let b = 2.0 * self.p0.x - 4.0 * self.p1.x + 2.0 * self.p2.x;
        let c = -self.p0.x + self.p1.x;

        let mut out = Vec::with_capacity(3);
        let mut rest = *self;
        let (t1, mut t2) = solve_quadratic(a, b, c, eps);
        let mut split = false;
        if !t1.is_nan() && eps.interval_exclusive(t1, 0.0, 1.0) {
            let (q, r) = rest.split(t1);
            out.push(q);
            rest = r;
            split = true;
        }
        if !t2.is_nan() && eps.interval_exclusive(t2, 0.0, 1.0) {
            if split {
                t2 = (t2 - t1) / (1.0 - t1);
            }
            let (q, r) = rest.split(t2);
            out.push(q);
            rest = r;
        }
        out.push(rest);
        out
    }

    /// Approximates the curve by line segments within `tolerance`.
    ///
    /// Returns the polyline vertices after `p0`, ending in `p3`.
    #[must_use]
    pub fn flatten(&self, tolerance: f64, eps: Epsilon) -> Vec<Point> {
        let mut points = self.stroke(0.0, tolerance, eps);
        points.remove(0);
        points
    }

    /// Approximates the curve offset by `d` to its right by line segments, after
    /// Hain et al. (2005).
    ///
    /// Returns the polyline including its start point. Flat ranges around
    /// inflection points are replaced by single lines.
    #[must_use]
    pub fn stroke(&self, d: f64, tolerance: f64, eps: Epsilon) -> Vec<Point> {
        let tolerance = tolerance.max(eps.0);
        let mut out = vec![self.p0 + self.start_normal(d)];

        let (t1, t2) = self.inflections(eps);
        if t1.is_nan() && t2.is_nan() {
            self.flatten_smooth(&mut out, d, tolerance, eps);
            return out;
        }

        let (t1min, t1max) = self.inflection_range(t1, tolerance, eps);
        let (t2min, t2max) = self.inflection_range(t2, tolerance, eps);

        if t2.is_nan() && t1min <= 0.0 && 1.0 <= t1max {
            self.push_end_line(&mut out, d, eps);
            return out;
        }

        if 0.0 < t1min {
            self.split(t1min).0.flatten_smooth(&mut out, d, tolerance, eps);
        }

        if 0.0 < t1max && t1max < 1.0 && t1max < t2min {
            let q = self.split(t1max).1;
            q.push_start_line(&mut out, d, eps);
            if 1.0 <= t2min {
                q.flatten_smooth(&mut out, d, tolerance, eps);
                return out;
            }
        } else if 1.0 <= t2min {
            self.push_end_line(&mut out, d, eps);
            return out;
        }

        if 0.0 < t2min {
            let q = self.split(t1max).1;
            if t2min < t1max {
                q.push_start_line(&mut out, d, eps);
            } else {
                let t = (t2min - t1max) / (1.0 - t1max);
                q.split(t).0.flatten_smooth(&mut out, d, tolerance, eps);
            }
        }

        if t2max < 1.0 {
            let q = self.split(t2max).1;
            q.push_start_line(&mut out, d, eps);
            q.flatten_smooth(&mut out, d, tolerance, eps);
        } else {
            self.push_end_line(&mut out, d, eps);
        }
        out
    }

    /// Subdivides a curve without inflection points, pushing offset vertices.
    fn flatten_smooth(&self, out: &mut Vec<Point>, d: f64, tolerance: f64, eps: Epsilon) {
        let mut c = *self;
        loop {
            let mut dir = c.p1 - c.p0;
            if c.p0.equals(c.p1, eps) {
                dir = c.p2 - c.p0;
                if c.p0.equals(c.p2, eps) {
                    // p0, p1 and p2 coincide, a straight line
                    out.push(c.p3);
                    return;
                }
            }
            let denom = dir.length();

            let s2inv = denom / dir.perp_dot(c.p2 - c.p0);
            let t2 = 2.0 * (tolerance * s2inv.abs() / 3.0).sqrt();

            // s3 tracks curvature better when s2 is small
            let s3inv = denom / dir.perp_dot(c.p3 - c.p0);
            let t3 = 2.0 * (tolerance * s3inv.abs()).cbrt();

            let t = t2.min(t3);
            if 1.0 <= t || t.is_nan() {
                break;
            }
            c = c.split(t).1;
            c.push_start_line(out, d, eps);
        }
        c.push_end_line(out, d, eps);
    }

    fn is_degenerate(&self, eps: Epsilon) -> bool {
        self.p0.equals(self.p3, eps) && (self.p0.equals(self.p1, eps) || self.p0.equals(self.p2, eps))
    }

    fn push_start_line(&self, out: &mut Vec<Point>, d: f64, eps: Epsilon) {
        if !self.is_degenerate(eps) {
            out.push(self.p0 + self.start_normal(d));
        }
    }

    fn push_end_line(&self, out: &mut Vec<Point>, d: f64, eps: Epsilon) {
        if !self.is_degenerate(eps) {
            out.push(self.p3 + self.end_normal(d));
        }
    }
}

fn curvature_radius(dp: Point, ddp: Point, eps: Epsilon) -> f64 {
    let a = dp.perp_dot(ddp);
    if eps.equal(a, 0.0) {
        return f64::NAN;
    }
    (dp.x * dp.x + dp.y * dp.y).powf(1.5) / a
}
