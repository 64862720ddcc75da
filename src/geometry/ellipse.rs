use std::f64::consts::PI;

use crate::math::angle::{angle_between, angle_norm};
use crate::math::quadrature::gauss_legendre5;
use crate::math::{Epsilon, Point};

use super::bezier::{CubicBezier, QuadBezier};

/// Position on the ellipse at angle `theta`.
#[must_use]
pub fn ellipse_pos(rx: f64, ry: f64, phi: f64, center: Point, theta: f64) -> Point {
    let (sintheta, costheta) = theta.sin_cos();
    let (sinphi, cosphi) = phi.sin_cos();
    Point::new(
        center.x + rx * costheta * cosphi - ry * sintheta * sinphi,
        center.y + rx * costheta * sinphi + ry * sintheta * cosphi,
    )
}

/// Derivative with respect to `theta`, reversed when `sweep` is false.
#[must_use]
pub fn ellipse_deriv(rx: f64, ry: f64, phi: f64, sweep: bool, theta: f64) -> Point {
    let (sintheta, costheta) = theta.sin_cos();
    let (sinphi, cosphi) = phi.sin_cos();
    let d = Point::new(
        -rx * sintheta * cosphi - ry * costheta * sinphi,
        -rx * sintheta * sinphi + ry * costheta * cosphi,
    );
    if sweep {
        d
    } else {
        -d
    }
}

#[must_use]
pub fn ellipse_deriv2(rx: f64, ry: f64, phi: f64, theta: f64) -> Point {
    let (sintheta, costheta) = theta.sin_cos();
    let (sinphi, cosphi) = phi.sin_cos();
    Point::new(
        -rx * costheta * cosphi + ry * sintheta * sinphi,
        -rx * costheta * sinphi - ry * sintheta * cosphi,
    )
}

/// Signed radius of curvature, positive for counter clockwise arcs. The rotation
/// does not affect it.
#[must_use]
pub fn ellipse_curvature_radius(rx: f64, ry: f64, sweep: bool, theta: f64, eps: Epsilon) -> f64 {
    let dp = ellipse_deriv(rx, ry, 0.0, sweep, theta);
    let ddp = ellipse_deriv2(rx, ry, 0.0, theta);
    let a = dp.perp_dot(ddp);
    if eps.equal(a, 0.0) {
        return f64::NAN;
    }
    (dp.x * dp.x + dp.y * dp.y).powf(1.5) / a
}

/// Normal of length `d` to the right of the direction of travel.
#[must_use]
pub fn ellipse_normal(rx: f64, ry: f64, phi: f64, sweep: bool, theta: f64, d: f64) -> Point {
    ellipse_deriv(rx, ry, phi, sweep, theta).rot90cw().norm(d)
}

/// Arc length between two angles, accurate to about one percent.
#[must_use]
pub fn ellipse_length(rx: f64, ry: f64, theta1: f64, theta2: f64) -> f64 {
    let (lo, hi) = if theta2 < theta1 {
        (theta2, theta1)
    } else {
        (theta1, theta2)
    };
    let speed = |theta: f64| ellipse_deriv(rx, ry, 0.0, true, theta).length();
    gauss_legendre5(&speed, lo, hi)
}

/// Splits the arc from `theta0` to `theta1` at `theta`.
///
/// Returns the split point and the large-arc flags of both halves, or `None` when
/// `theta` is outside the arc.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn ellipse_split(
    rx: f64,
    ry: f64,
    phi: f64,
    center: Point,
    theta0: f64,
    theta1: f64,
    theta: f64,
    eps: Epsilon,
) -> Option<(Point, bool, bool)> {
    if !angle_between(theta, theta0, theta1, eps) {
        return None;
    }

    let mid = ellipse_pos(rx, ry, phi, center, theta);
    let large0 = PI < (theta - theta0).abs();
    let large1 = !large0 && PI < (theta - theta1).abs();
    Some((mid, large0, large1))
}

/// An elliptical arc in SVG endpoint form.
///
/// The free functions of this module take the center form instead: radii
/// `rx, ry`, rotation `phi` in radians and the angle `theta` measured before
/// the ellipse is stretched and rotated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipticArc {
    pub start: Point,
    pub rx: f64,
    pub ry: f64,
    /// Rotation of the x-axis in radians.
    pub phi: f64,
    pub large: bool,
    pub sweep: bool,
    pub end: Point,
}

impl EllipticArc {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(start: Point, rx: f64, ry: f64, phi: f64, large: bool, sweep: bool, end: Point) -> Self {
        Self {
            start,
            rx,
            ry,
            phi,
            large,
            sweep,
            end,
        }
    }

    /// Scale factor by which the radii fall short of spanning the end points.
    /// Values above one mean the radii must grow.
    #[must_use]
    pub fn radii_correction(&self) -> f64 {
        let diff = self.start - self.end;
        let (sinphi, cosphi) = self.phi.sin_cos();
        let x1p = (cosphi * diff.x + sinphi * diff.y) / 2.0;
        let y1p = (-sinphi * diff.x + cosphi * diff.y) / 2.0;
        (x1p * x1p / self.rx / self.rx + y1p * y1p / self.ry / self.ry).sqrt()
    }

    /// Converts to center form `(center, theta0, theta1)`.
    ///
    /// `theta0` lies in `[0, 2π)` and `theta1` in `(-2π, 4π)`; the arc runs
    /// clockwise when `theta1 < theta0`.
    #[must_use]
    pub fn to_center(&self, eps: Epsilon) -> (Point, f64, f64) {
        let (x1, y1, x2, y2) = (self.start.x, self.start.y, self.end.x, self.end.y);
        let (mut rx, mut ry, phi) = (self.rx, self.ry, self.phi);
        if eps.equal(x1, x2) && eps.equal(y1, y2) {
            return (self.start, 0.0, 0.0);
        } else if eps.equal((x2 - x1).abs(), rx) && eps.equal(y1, y2) && eps.equal(phi, 0.0) {
            // half circle between horizontal neighbours
            let center = Point::new(x1 + (x2 - x1) / 2.0, y1);
            let theta = if x1 < x2 { PI } else { 0.0 };
            let delta = if self.sweep { PI } else { -PI };
            return (center, theta, theta + delta);
        }

        // half distance between the end points in the unrotated frame
        let (sinphi, cosphi) = phi.sin_cos();
        let x1p = cosphi * (x1 - x2) / 2.0 + sinphi * (y1 - y2) / 2.0;
        let y1p = -sinphi * (x1 - x2) / 2.0 + cosphi * (y1 - y2) / 2.0;

        let radii_check = x1p * x1p / rx / rx + y1p * y1p / ry / ry;
        if 1.0 < radii_check {
            let scale = radii_check.sqrt();
            rx *= scale;
            ry *= scale;
        }

        let mut sq = (rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p)
            / (rx * rx * y1p * y1p + ry * ry * x1p * x1p);
        if sq <= eps.0 {
            // end points opposite through the center
            sq = 0.0;
        }
        let mut coef = sq.sqrt();
        if self.large == self.sweep {
            coef = -coef;
        }
        let cxp = coef * rx * y1p / ry;
        let cyp = coef * -ry * x1p / rx;
        let center = Point::new(
            cosphi * cxp - sinphi * cyp + (x1 + x2) / 2.0,
            sinphi * cxp + cosphi * cyp + (y1 + y2) / 2.0,
        );

        let ux = (x1p - cxp) / rx;
        let uy = (y1p - cyp) / ry;
        let vx = -(x1p + cxp) / rx;
        let vy = -(y1p + cyp) / ry;

        let mut theta = (ux / (ux * ux + uy * uy).sqrt()).acos();
        if uy < 0.0 {
            theta = -theta;
        }
        let theta = angle_norm(theta);

        let delta_cos = ((ux * vx + uy * vy) / ((ux * ux + uy * uy) * (vx * vx + vy * vy)).sqrt())
            .clamp(-1.0, 1.0);
        let mut delta = delta_cos.acos();
        if ux * vy - uy * vx < 0.0 {
            delta = -delta;
        }
        if !self.sweep && 0.0 < delta {
            delta -= 2.0 * PI;
        } else if self.sweep && delta < 0.0 {
            delta += 2.0 * PI;
        }
        (center, theta, theta + delta)
    }

    /// Number of pieces of at most a quarter turn, with their angular step.
    fn quarter_steps(theta0: f64, theta1: f64, sweep: bool) -> (usize, f64) {
        let span = (theta1 - theta0).abs();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = (span / (PI / 2.0)).ceil() as usize;
        if n == 0 {
            return (0, 0.0);
        }
        #[allow(clippy::cast_precision_loss)]
        let dtheta = span / n as f64;
        (n, if sweep { dtheta } else { -dtheta })
    }

    /// Approximates by quadratic Béziers of at most a quarter turn each, after
    /// Maisonobe (2003).
    #[must_use]
    pub fn to_quads(&self, eps: Epsilon) -> Vec<QuadBezier> {
        let (center, theta0, theta1) = self.to_center(eps);
        let (n, dtheta) = Self::quarter_steps(theta0, theta1, self.sweep);
        let kappa = (dtheta.abs() / 2.0).tan();

        let mut start = self.start;
        let mut start_deriv = ellipse_deriv(self.rx, self.ry, self.phi, self.sweep, theta0);
        (1..=n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let theta = theta0 + i as f64 * dtheta;
                let end = ellipse_pos(self.rx, self.ry, self.phi, center, theta);
                let quad = QuadBezier::new(start, start + start_deriv * kappa, end);
                start_deriv = ellipse_deriv(self.rx, self.ry, self.phi, self.sweep, theta);
                start = end;
                quad
            })
            .collect()
    }

    /// Approximates by cubic Béziers of at most a quarter turn each, after
    /// Maisonobe (2003).
    #[must_use]
    pub fn to_cubics(&self, eps: Epsilon) -> Vec<CubicBezier> {
        let (center, theta0, theta1) = self.to_center(eps);
        let (n, dtheta) = Self::quarter_steps(theta0, theta1, self.sweep);
        let step = dtheta.abs();
        let kappa = step.sin() * ((4.0 + 3.0 * (step / 2.0).tan().powi(2)).sqrt() - 1.0) / 3.0;

        let mut start = self.start;
        let mut start_deriv = ellipse_deriv(self.rx, self.ry, self.phi, self.sweep, theta0);
        (1..=n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let theta = theta0 + i as f64 * dtheta;
                let end = ellipse_pos(self.rx, self.ry, self.phi, center, theta);
                let end_deriv = ellipse_deriv(self.rx, self.ry, self.phi, self.sweep, theta);
                let cubic = CubicBezier::new(
                    start,
                    start + start_deriv * kappa,
                    end - end_deriv * kappa,
                    end,
                );
                start_deriv = end_deriv;
                start = end;
                cubic
            })
            .collect()
    }

    /// Splits the arc at its leftmost and rightmost points.
    ///
    /// Returns the end points of the pieces in order; each piece is a small arc
    /// with the same radii, rotation and sweep.
    #[must_use]
    pub fn x_monotone(&self, eps: Epsilon) -> Vec<Point> {
        let sign = if self.sweep { 1.0 } else { -1.0 };
        let (center, theta0, theta1) = self.to_center(eps);
        let (sinphi, cosphi) = self.phi.sin_cos();
        let theta_right = (-self.ry * sinphi).atan2(self.rx * cosphi);
        let theta_left = theta_right + PI;

        // an extremum at the start point does not split the arc
        let ahead = |theta: f64| {
            if eps.angle_equal(theta, theta0) {
                2.0 * PI
            } else {
                angle_norm(sign * (theta - theta0))
            }
        };
        let mut ends = Vec::new();
        let mut left = ahead(theta_left) < ahead(theta_right);
        let mut t = theta0;
        // an arc spans at most two extrema
        for _ in 0..4 {
            if eps.angle_equal(t, theta1) {
                break;
            }
            let extremum = if left { theta_left } else { theta_right };
            let dt = angle_norm(sign * (theta1 - t)).min(angle_norm(sign * (extremum - t)));
            t += sign * dt;
            ends.push(ellipse_pos(self.rx, self.ry, self.phi, center, t));
            left = !left;
        }
        if let Some(last) = ends.last_mut() {
            *last = self.end;
        }
        ends
    }

    /// Approximates the arc by line segments within `tolerance`.
    ///
    /// Returns the polyline vertices after the start, ending in the end point.
    /// Circular arcs place vertices so that the segments alternate around the arc.
    #[must_use]
    pub fn flatten(&self, tolerance: f64, eps: Epsilon) -> Vec<Point> {
        if !eps.equal(self.rx, self.ry) {
            let mut out = Vec::new();
            for cubic in self.to_cubics(eps) {
                out.extend(cubic.flatten(tolerance, eps));
            }
            match out.last_mut() {
                Some(last) => *last = self.end,
                None => out.push(self.end),
            }
            return out;
        }

        let mut r = self.rx;
        let (center, theta0, theta1) = self.to_center(eps);
        let (theta0, theta1) = (theta0 + self.phi, theta1 + self.phi);

        // segments run from arc+tolerance to arc+tolerance, touching arc-tolerance between
        let dtheta = (theta1 - theta0).abs();
        let mut thetam = (r / (r + tolerance)).acos();
        let mut thetat = (r / (r + 2.0 * tolerance)).acos();
        let n = ((dtheta - thetam * 2.0) / (thetat * 2.0)).ceil().max(0.0);

        // spread the vertices evenly
        let ratio = dtheta / (thetam * 2.0 + thetat * 2.0 * n);
        thetam *= ratio;
        thetat *= ratio;
        r += ratio * tolerance;

        let mut out = Vec::new();
        let mut theta = thetam + thetat;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        for _ in 0..n as usize {
            let t = theta0 + theta.copysign(theta1 - theta0);
            out.push(center + Point::new(r * t.cos(), r * t.sin()));
            theta += 2.0 * thetat;
        }
        out.push(self.end);
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const EPS: Epsilon = Epsilon(1e-10);

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn assert_points(got: &[Point], want: &[Point], tolerance: f64) {
        assert_eq!(got.len(), want.len(), "{got:?} != {want:?}");
        for (a, b) in got.iter().zip(want) {
            assert!(a.equals(*b, Epsilon(tolerance)), "{got:?} != {want:?}");
        }
    }

    #[test]
    fn evaluation() {
        let half_pi = PI / 2.0;
        assert!(ellipse_pos(2.0, 1.0, half_pi, p(1.0, 0.5), 0.0).equals(p(1.0, 2.5), EPS));
        assert!(ellipse_deriv(2.0, 1.0, half_pi, true, 0.0).equals(p(-1.0, 0.0), EPS));
        assert!(ellipse_deriv(2.0, 1.0, half_pi, false, 0.0).equals(p(1.0, 0.0), EPS));
        assert!(ellipse_deriv2(2.0, 1.0, half_pi, 0.0).equals(p(0.0, -2.0), EPS));
        assert!(ellipse_normal(2.0, 1.0, half_pi, true, 0.0, 1.0).equals(p(0.0, 1.0), EPS));
        assert!(ellipse_normal(2.0, 1.0, half_pi, false, 0.0, 1.0).equals(p(0.0, -1.0), EPS));
    }

    #[test]
    fn curvature_and_length() {
        assert_abs_diff_eq!(ellipse_curvature_radius(2.0, 1.0, true, 0.0, EPS), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(ellipse_curvature_radius(2.0, 1.0, false, 0.0, EPS), -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(
            ellipse_curvature_radius(2.0, 1.0, true, PI / 2.0, EPS),
            4.0,
            epsilon = 1e-12
        );
        assert!(ellipse_curvature_radius(2.0, 0.0, true, 0.0, EPS).is_nan());
        assert_abs_diff_eq!(ellipse_length(2.0, 1.0, 0.0, PI / 2.0), 2.422_110_222_0, epsilon = 1e-2);
    }

    #[test]
    fn radii_correction() {
        let arc = EllipticArc::new(p(0.0, 0.0), 0.1, 0.1, 0.0, false, false, p(1.0, 0.0));
        assert_abs_diff_eq!(arc.radii_correction(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn to_center() {
        let s = 1.0 / 2.0_f64.sqrt();
        let cases = [
            ((0.0, 0.0), 2.0, 2.0, 0.0, false, false, (2.0, 2.0), (2.0, 0.0, PI, PI / 2.0)),
            ((0.0, 0.0), 2.0, 2.0, 0.0, true, false, (2.0, 2.0), (0.0, 2.0, 1.5 * PI, 0.0)),
            ((0.0, 0.0), 2.0, 2.0, 0.0, true, true, (2.0, 2.0), (2.0, 0.0, PI, 2.5 * PI)),
            ((0.0, 0.0), 2.0, 1.0, PI / 2.0, false, false, (1.0, 2.0), (1.0, 0.0, PI / 2.0, 0.0)),
            ((0.0, 0.0), 0.1, 0.1, 0.0, false, false, (1.0, 0.0), (0.5, 0.0, PI, 0.0)),
            ((0.0, 0.0), 1.0, 1.0, 0.0, false, false, (0.0, 0.0), (0.0, 0.0, 0.0, 0.0)),
            ((8.2, 18.0), 0.2, 0.2, 0.0, false, true, (7.8, 18.0), (8.0, 18.0, 0.0, PI)),
            ((7.8, 18.0), 0.2, 0.2, 0.0, false, true, (8.2, 18.0), (8.0, 18.0, PI, 2.0 * PI)),
            ((-s, 0.0), 1.0, 1.0, 0.0, false, false, (s, 0.0), (0.0, -s, 0.75 * PI, 0.25 * PI)),
        ];
        for (start, rx, ry, phi, large, sweep, end, (cx, cy, theta0, theta1)) in cases {
            let arc = EllipticArc::new(p(start.0, start.1), rx, ry, phi, large, sweep, p(end.0, end.1));
            let (center, t0, t1) = arc.to_center(EPS);
            assert!(center.equals(p(cx, cy), Epsilon(1e-9)), "{arc:?}: {center}");
            assert_abs_diff_eq!(t0, theta0, epsilon = 1e-9);
            assert_abs_diff_eq!(t1, theta1, epsilon = 1e-9);
        }
    }

    #[test]
    fn split() {
        let (mid, large0, large1) =
            ellipse_split(2.0, 1.0, 0.0, p(0.0, 0.0), PI, 0.0, PI / 2.0, EPS).unwrap();
        assert!(mid.equals(p(0.0, 1.0), EPS));
        assert!(!large0 && !large1);

        assert!(ellipse_split(2.0, 1.0, 0.0, p(0.0, 0.0), PI, 0.0, -PI / 2.0, EPS).is_none());

        let (mid, large0, large1) =
            ellipse_split(2.0, 1.0, 0.0, p(0.0, 0.0), 0.0, PI * 7.0 / 4.0, PI / 2.0, EPS).unwrap();
        assert!(mid.equals(p(0.0, 1.0), EPS));
        assert!(!large0 && large1);

        let (mid, large0, large1) =
            ellipse_split(2.0, 1.0, 0.0, p(0.0, 0.0), 0.0, PI * 7.0 / 4.0, PI * 3.0 / 2.0, EPS)
                .unwrap();
        assert!(mid.equals(p(0.0, -1.0), EPS));
        assert!(large0 && !large1);
    }

    #[test]
    fn bezier_approximation() {
        let arc = EllipticArc::new(p(0.0, 0.0), 100.0, 100.0, 0.0, false, false, p(200.0, 0.0));

        let quads = arc.to_quads(EPS);
        assert_eq!(quads.len(), 2);
        assert_points(&[quads[0].p1, quads[0].p2], &[p(0.0, 100.0), p(100.0, 100.0)], 1e-9);
        assert_points(&[quads[1].p1, quads[1].p2], &[p(200.0, 100.0), p(200.0, 0.0)], 1e-9);

        let cubics = arc.to_cubics(EPS);
        assert_eq!(cubics.len(), 2);
        assert_points(
            &[cubics[0].p1, cubics[0].p2, cubics[0].p3],
            &[p(0.0, 54.858), p(45.142, 100.0), p(100.0, 100.0)],
            1e-3,
        );
        assert_points(
            &[cubics[1].p1, cubics[1].p2, cubics[1].p3],
            &[p(154.858, 100.0), p(200.0, 54.858), p(200.0, 0.0)],
            1e-3,
        );
    }

    #[test]
    fn x_monotone() {
        let arc = EllipticArc::new(p(0.0, 0.0), 100.0, 50.0, 0.0, false, false, p(0.0, 100.0));
        assert_points(&arc.x_monotone(EPS), &[p(-100.0, 50.0), p(0.0, 100.0)], 1e-9);

        let end = p(100.0 / 2.0_f64.sqrt(), 100.0 / 2.0_f64.sqrt());
        let arc = EllipticArc::new(p(0.0, 0.0), 50.0, 25.0, PI / 4.0, false, false, end);
        assert_points(&arc.x_monotone(EPS), &[p(-4.1731, 11.6383), end], 1e-3);
    }

    #[test]
    fn flatten_circle() {
        let arc = EllipticArc::new(p(0.0, 0.0), 100.0, 100.0, 0.0, false, false, p(200.0, 0.0));
        assert_points(
            &arc.flatten(1.0, EPS),
            &[
                p(3.8513, 30.6285),
                p(20.8474, 62.5902),
                p(48.0297, 86.4971),
                p(81.9001, 99.2726),
                p(118.0998, 99.2726),
                p(151.9702, 86.4971),
                p(179.1525, 62.5902),
                p(196.1486, 30.6285),
                p(200.0, 0.0),
            ],
            1e-3,
        );
    }

    #[test]
    fn flatten_ellipse_stays_within_tolerance() {
        let arc = EllipticArc::new(p(0.0, 0.0), 100.0, 50.0, 0.3, false, true, p(120.0, 40.0));
        let (center, _, _) = arc.to_center(EPS);
        let points = arc.flatten(0.5, EPS);
        assert!(points.len() > 4);
        assert_eq!(points.last().copied(), Some(arc.end));
        for q in points {
            // back into the unit circle frame
            let d = (q - center).rot(-arc.phi, Point::default());
            let r = ((d.x / arc.rx).powi(2) + (d.y / arc.ry).powi(2)).sqrt();
            assert!((r - 1.0).abs() < 0.05, "{q} off the ellipse: {r}");
        }
    }
}
