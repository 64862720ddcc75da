use std::f64::consts::PI;
use std::fmt;

use tracing::debug;

use crate::error::{GeometryError, Result, VecpathError};
use crate::geometry::ellipse::{ellipse_deriv, ellipse_pos};
use crate::geometry::{CubicBezier, EllipticArc, QuadBezier};
use crate::math::angle::{angle_between, angle_between_exclusive, angle_norm, angle_time};
use crate::math::solve::{real_roots, solve_cubic, solve_quadratic};
use crate::math::{Epsilon, Point, ORIGIN};
use crate::path::{format_number, segment_fast_bounds, Path, Segment};

/// A point where two segments meet.
///
/// `dir` holds the tangent angles of both segments at the hit. At end points a
/// curve's direction is nudged by twice epsilon towards its bend, so that
/// [`Intersection::is_into`] stays decisive for touching segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Point,
    /// Parameter along each segment in `[0, 1]`.
    pub t: [f64; 2],
    /// Direction of travel of each segment at the point, in radians.
    pub dir: [f64; 2],
    /// The segments touch instead of cross. End points always count as touching.
    pub tangent: bool,
    /// The segments overlap; `tangent` is set as well.
    pub same: bool,
}

impl Intersection {
    /// Creates an intersection, clamping both parameters into `[0, 1]`.
    #[must_use]
    pub fn new(point: Point, t: [f64; 2], dir: [f64; 2], tangent: bool, same: bool) -> Self {
        Self {
            point,
            t: t.map(|t| t.clamp(0.0, 1.0)),
            dir,
            tangent,
            same,
        }
    }

    /// Returns true if the first segment heads into the left-hand side of the
    /// second, that is the second segment passes to the right of the first.
    #[must_use]
    pub fn is_into(&self) -> bool {
        angle_between_exclusive(self.dir[1] - self.dir[0], PI, 2.0 * PI)
    }

    /// The same intersection seen from the other segment.
    #[must_use]
    pub fn swap(self) -> Self {
        Self {
            t: [self.t[1], self.t[0]],
            dir: [self.dir[1], self.dir[0]],
            ..self
        }
    }

    #[must_use]
    pub fn equals(&self, o: &Intersection, eps: Epsilon) -> bool {
        self.point.equals(o.point, eps)
            && eps.equal(self.t[0], o.t[0])
            && eps.equal(self.t[1], o.t[1])
            && eps.angle_equal(self.dir[0], o.dir[0])
            && eps.angle_equal(self.dir[1], o.dir[1])
            && self.tangent == o.tangent
            && self.same == o.same
    }
}

impl fmt::Display for Intersection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = format_number;
        write!(
            f,
            "({{{},{}}} t={{{},{}}} dir={{{}°,{}°}}",
            n(self.point.x),
            n(self.point.y),
            n(self.t[0]),
            n(self.t[1]),
            n(angle_norm(self.dir[0]).to_degrees()),
            n(angle_norm(self.dir[1]).to_degrees())
        )?;
        if self.same {
            f.write_str(" Same")?;
        } else if self.tangent {
            f.write_str(" Tangent")?;
        }
        f.write_str(")")
    }
}

/// An arc in center form, angles running from `theta0` to `theta1`.
#[derive(Debug, Clone, Copy)]
struct CenterArc {
    center: Point,
    rx: f64,
    ry: f64,
    phi: f64,
    theta0: f64,
    theta1: f64,
}

impl CenterArc {
    fn new(arc: &EllipticArc, eps: Epsilon) -> Self {
        let (center, theta0, theta1) = arc.to_center(eps);
        Self {
            center,
            rx: arc.rx,
            ry: arc.ry,
            phi: arc.phi,
            theta0,
            theta1,
        }
    }

    fn from_segment(start: Point, seg: &Segment, eps: Epsilon) -> Option<Self> {
        match *seg {
            Segment::ArcTo {
                rx,
                ry,
                phi,
                large,
                sweep,
                end,
            } => Some(Self::new(
                &EllipticArc::new(start, rx, ry, phi, large, sweep, end),
                eps,
            )),
            _ => None,
        }
    }

    fn sweep(&self) -> bool {
        self.theta0 <= self.theta1
    }

    fn is_circle(&self, eps: Epsilon) -> bool {
        eps.equal(self.rx, self.ry)
    }
}

/// Intersects segment `a` starting at `a0` with segment `b` starting at `b0`.
///
/// `t[0]` and `dir[0]` of each result refer to `a`. A `MoveTo` on either side has
/// no intersections.
///
/// # Errors
///
/// Returns [`GeometryError::UnsupportedIntersection`] for pairs of curves without
/// a solver: quadratic, cubic and arc against each other, and arcs that are not
/// both circular.
pub fn intersect_segments(
    a0: Point,
    a: &Segment,
    b0: Point,
    b: &Segment,
    eps: Epsilon,
) -> Result<Vec<Intersection>> {
    let is_line = |s: &Segment| matches!(s, Segment::LineTo(_) | Segment::Close(_));
    let mut zs = Vec::new();
    match (a, b) {
        (Segment::MoveTo(_), _) | (_, Segment::MoveTo(_)) => {}
        _ if is_line(a) => intersect_line(&mut zs, a0, a.end(), b0, b, eps),
        _ if is_line(b) => {
            intersect_line(&mut zs, b0, b.end(), a0, a, eps);
            for z in &mut zs {
                *z = z.swap();
            }
        }
        (Segment::ArcTo { .. }, Segment::ArcTo { .. }) => {
            match (
                CenterArc::from_segment(a0, a, eps),
                CenterArc::from_segment(b0, b, eps),
            ) {
                (Some(ca), Some(cb)) if ca.is_circle(eps) && cb.is_circle(eps) => {
                    circle_circle(&mut zs, &ca, &cb, eps);
                }
                _ => return Err(unsupported(a, b)),
            }
        }
        _ => return Err(unsupported(a, b)),
    }
    Ok(zs)
}

fn unsupported(a: &Segment, b: &Segment) -> VecpathError {
    debug!(first = a.name(), second = b.name(), "unsupported segment intersection");
    GeometryError::UnsupportedIntersection {
        first: a.name(),
        second: b.name(),
    }
    .into()
}

/// Intersects the line `l0`-`l1` with any segment; every kind has a solver.
pub(crate) fn intersect_line(
    zs: &mut Vec<Intersection>,
    l0: Point,
    l1: Point,
    b0: Point,
    b: &Segment,
    eps: Epsilon,
) {
    match *b {
        Segment::MoveTo(_) => {}
        Segment::LineTo(b1) | Segment::Close(b1) => line_line(zs, l0, l1, b0, b1, eps),
        Segment::QuadTo(cp, b1) => line_quad(zs, l0, l1, &QuadBezier::new(b0, cp, b1), eps),
        Segment::CubeTo(cp1, cp2, b1) => {
            line_cube(zs, l0, l1, &CubicBezier::new(b0, cp1, cp2, b1), eps);
        }
        Segment::ArcTo {
            rx,
            ry,
            phi,
            large,
            sweep,
            end,
        } => {
            let arc = EllipticArc::new(b0, rx, ry, phi, large, sweep, end);
            line_ellipse(zs, l0, l1, &CenterArc::new(&arc, eps), eps);
        }
    }
}

/// Turns `dir` slightly counter clockwise when `ccw` is set, clockwise otherwise.
fn nudge(dir: f64, ccw: bool, eps: Epsilon) -> f64 {
    if ccw {
        angle_norm(dir + 2.0 * eps.0)
    } else {
        angle_norm(dir - 2.0 * eps.0)
    }
}

fn is_end(t: f64, eps: Epsilon) -> bool {
    eps.equal(t, 0.0) || eps.equal(t, 1.0)
}

fn line_line(zs: &mut Vec<Intersection>, a0: Point, a1: Point, b0: Point, b1: Point, eps: Epsilon) {
    if a0.equals(a1, eps) || b0.equals(b1, eps) {
        // zero-length close
        return;
    }

    let da = a1 - a0;
    let db = b1 - b0;
    let dir = [da.angle(), db.angle()];
    let div = da.perp_dot(db);

    // normalized so that very short segments still compare against epsilon
    if eps.equal(div / (da.length() * db.length()), 0.0) {
        if !eps.equal((b0 - a0).perp_dot(db), 0.0) {
            return;
        }
        // overlapping, measure along the direction of a
        let along = |p: Point| p.rot(-dir[0], ORIGIN).x;
        let (a, b, c, d) = (along(a0), along(a1), along(b0), along(b1));
        let within = |x: f64| eps.interval(x, c.min(d), c.max(d));
        let ta = |x: f64| (x - a) / (b - a);
        let tb = |x: f64| (x - c) / (d - c);
        let mut add = |p: Point, t: [f64; 2], same: bool| {
            zs.push(Intersection::new(p, t, dir, true, same));
        };
        if within(a) && within(b) {
            // a-b inside c-d
            add(a0, [0.0, tb(a)], true);
            add(a1, [1.0, tb(b)], true);
        } else if eps.interval(c, a, b) && eps.interval(d, a, b) {
            // c-d inside a-b
            if c < d {
                add(b0, [ta(c), 0.0], true);
                add(b1, [ta(d), 1.0], true);
            } else {
                add(b1, [ta(d), 1.0], true);
                add(b0, [ta(c), 0.0], true);
            }
        } else if within(a) {
            let same = a < d - eps.0 || a < c - eps.0;
            add(a0, [0.0, tb(a)], same);
            if a < d - eps.0 {
                add(b1, [ta(d), 1.0], true);
            } else if a < c - eps.0 {
                add(b0, [ta(c), 0.0], true);
            }
        } else if within(b) {
            let same = c < b - eps.0 || d < b - eps.0;
            if c < b - eps.0 {
                add(b0, [ta(c), 0.0], true);
            } else if d < b - eps.0 {
                add(b1, [ta(d), 1.0], true);
            }
            add(a1, [1.0, tb(b)], same);
        }
        return;
    } else if a1.equals(b0, eps) {
        // shared end points are common, skip the numerics
        zs.push(Intersection::new(a1, [1.0, 0.0], dir, true, false));
        return;
    } else if a0.equals(b1, eps) {
        zs.push(Intersection::new(a0, [0.0, 1.0], dir, true, false));
        return;
    }

    let ta = db.perp_dot(a0 - b0) / div;
    let tb = da.perp_dot(a0 - b0) / div;
    if eps.interval(ta, 0.0, 1.0) && eps.interval(tb, 0.0, 1.0) {
        let tangent = is_end(ta, eps) || is_end(tb, eps);
        zs.push(Intersection::new(a0.interpolate(a1, ta), [ta, tb], dir, tangent, false));
    }
}

/// Parameter of `pos` along the line, measured on its dominant axis.
fn line_time(l0: Point, l1: Point, pos: Point) -> f64 {
    if (l1.y - l0.y).abs() <= (l1.x - l0.x).abs() {
        (pos.x - l0.x) / (l1.x - l0.x)
    } else {
        (pos.y - l0.y) / (l1.y - l0.y)
    }
}

/// Whether the nudge at an end point goes counter clockwise: at the curve's
/// start when it bends counter clockwise, at its end when it bends clockwise.
fn end_nudge_ccw(bends_ccw: bool, t: f64, s: f64, eps: Epsilon) -> bool {
    bends_ccw == (eps.equal(t, 0.0) || !eps.equal(t, 1.0) && eps.equal(s, 0.0))
}

fn line_quad(zs: &mut Vec<Intersection>, l0: Point, l1: Point, quad: &QuadBezier, eps: Epsilon) {
    if l0.equals(l1, eps) {
        return;
    }

    // the line as normal·x = bias
    let normal = Point::new(l1.y - l0.y, l0.x - l1.x);
    let bias = l0.dot(normal);
    let QuadBezier { p0, p1, p2 } = *quad;
    let (r0, r1) = solve_quadratic(
        normal.dot(p0 - p1 * 2.0 + p2),
        normal.dot((p1 - p0) * 2.0),
        normal.dot(p0) - bias,
        eps,
    );

    let dira = (l1 - l0).angle();
    for root in real_roots([r0, r1]) {
        if !eps.interval(root, 0.0, 1.0) {
            continue;
        }
        let pos = quad.pos(root);
        let s = line_time(l0, l1, pos);
        if !eps.interval(s, 0.0, 1.0) {
            continue;
        }
        let deriv = quad.deriv(root);
        let mut dirb = deriv.angle();
        let endpoint = is_end(root, eps) || is_end(s, eps);
        if endpoint {
            let bends_ccw = 0.0 <= deriv.perp_dot(quad.deriv2());
            dirb = nudge(dirb, end_nudge_ccw(bends_ccw, root, s, eps), eps);
        }
        let tangent = endpoint || eps.equal(normal.dot(deriv), 0.0);
        zs.push(Intersection::new(pos, [s, root], [dira, dirb], tangent, false));
    }
}

fn line_cube(zs: &mut Vec<Intersection>, l0: Point, l1: Point, cube: &CubicBezier, eps: Epsilon) {
    if l0.equals(l1, eps) {
        return;
    }

    let normal = Point::new(l1.y - l0.y, l0.x - l1.x);
    let bias = l0.dot(normal);
    let CubicBezier { p0, p1, p2, p3 } = *cube;
    let (r0, r1, r2) = solve_cubic(
        normal.dot(p3 - p0 + p1 * 3.0 - p2 * 3.0),
        normal.dot(p0 * 3.0 - p1 * 6.0 + p2 * 3.0),
        normal.dot(p1 * 3.0 - p0 * 3.0),
        normal.dot(p0) - bias,
        eps,
    );

    let dira = (l1 - l0).angle();
    for root in real_roots([r0, r1, r2]) {
        if !eps.interval(root, 0.0, 1.0) {
            continue;
        }
        let pos = cube.pos(root);
        let s = line_time(l0, l1, pos);
        if !eps.interval(s, 0.0, 1.0) {
            continue;
        }
        let deriv = cube.deriv(root);
        let mut dirb = deriv.angle();
        let mut tangent = eps.equal(normal.dot(deriv), 0.0);
        let endpoint = is_end(root, eps) || is_end(s, eps);
        if endpoint {
            let bends_ccw = 0.0 <= deriv.perp_dot(cube.deriv2(root));
            dirb = nudge(dirb, end_nudge_ccw(bends_ccw, root, s, eps), eps);
        } else if eps.angle_equal(dira, dirb) || eps.angle_equal(dira, dirb + PI) {
            // parallel yet crossing at an inflection point
            if cube.deriv2(root).is_zero(eps) {
                dirb = nudge(dirb, 0.0 < deriv.perp_dot(cube.deriv3()), eps);
                tangent = false;
            }
        }
        zs.push(Intersection::new(pos, [s, root], [dira, dirb], endpoint || tangent, false));
    }
}

/// Adds a line-arc hit given by the line parameter `t` in `t_range` and the
/// ellipse angle `angle`.
#[allow(clippy::too_many_arguments)]
fn add_line_arc(
    zs: &mut Vec<Intersection>,
    arc: &CenterArc,
    pos: Point,
    dir: [f64; 2],
    t: f64,
    (t0, t1): (f64, f64),
    angle: f64,
    tangent: bool,
    eps: Epsilon,
) {
    let (theta0, theta1) = (arc.theta0, arc.theta1);
    // bring the angle into the arc's own range of turns
    let lower = theta0.min(theta1);
    let angle = lower - eps.0 + angle_norm(angle - lower + eps.0);

    let mut dirb = dir[1];
    let endpoint = eps.equal(t, t0)
        || eps.equal(t, t1)
        || eps.equal(angle, theta0)
        || eps.equal(angle, theta1);
    if endpoint {
        let ccw = arc.sweep()
            == (eps.equal(angle, theta0) || !eps.equal(angle, theta1) && eps.equal(t, t0));
        dirb = nudge(dirb, ccw, eps);
    }

    let t = if eps.equal(t, t0) {
        0.0
    } else if eps.equal(t, t1) {
        1.0
    } else {
        (t - t0) / (t1 - t0)
    };
    let s = if eps.equal(angle, theta0) {
        0.0
    } else if eps.equal(angle, theta1) {
        1.0
    } else {
        (angle - theta0) / (theta1 - theta0)
    };
    zs.push(Intersection::new(pos, [t, s], [dir[0], dirb], endpoint || tangent, false));
}

fn distinct_roots(r0: f64, r1: f64, eps: Epsilon) -> Vec<f64> {
    let mut roots = real_roots([r0, r1]);
    if roots.len() == 2 && eps.equal(roots[0], roots[1]) {
        roots.pop();
    }
    roots
}

fn line_circle(zs: &mut Vec<Intersection>, l0: Point, l1: Point, arc: &CenterArc, eps: Epsilon) {
    if l0.equals(l1, eps) {
        return;
    }

    // |l0 + t·d - center|² = r² with d of unit length, so t runs over [0, length]
    let (center, radius) = (arc.center, arc.rx);
    let dir = l1 - l0;
    let diff = l0 - center;
    let length = dir.length();
    let d = dir / length;
    let (r0, r1) = solve_quadratic(1.0, 2.0 * d.dot(diff), diff.dot(diff) - radius * radius, eps);
    let mut roots = distinct_roots(r0, r1, eps);

    // snap the closest root onto line end points lying on the circle
    if !roots.is_empty() {
        let two = roots.len() == 2;
        if eps.equal((l0 - center).length(), radius) {
            let i = usize::from(two && roots[1].abs() <= roots[0].abs());
            roots[i] = 0.0;
        }
        if eps.equal((l1 - center).length(), radius) {
            let i = usize::from(two && (roots[1] - length).abs() <= (roots[0] - length).abs());
            roots[i] = length;
        }
    }

    let dira = dir.angle();
    let tangent = roots.len() == 1;
    for root in roots {
        let pos = diff + dir * (root / length);
        let angle = (pos.y * radius).atan2(pos.x * radius);
        if eps.interval(root, 0.0, length) && angle_between(angle, arc.theta0, arc.theta1, eps) {
            let dirb = ellipse_deriv(radius, radius, 0.0, arc.sweep(), angle).angle();
            add_line_arc(
                zs,
                arc,
                center + pos,
                [dira, dirb],
                root,
                (0.0, length),
                angle,
                tangent,
                eps,
            );
        }
    }
}

fn line_ellipse(zs: &mut Vec<Intersection>, l0: Point, l1: Point, arc: &CenterArc, eps: Epsilon) {
    if arc.is_circle(eps) {
        line_circle(zs, l0, l1, arc, eps);
        return;
    } else if l0.equals(l1, eps) {
        return;
    }

    let dira = (l1 - l0).angle();

    // center the ellipse at the origin and undo its rotation
    let l0 = (l0 - arc.center).rot(-arc.phi, ORIGIN);
    let l1 = (l1 - arc.center).rot(-arc.phi, ORIGIN);

    // line c·x + d·y + e = 0
    let c = l0.y - l1.y;
    let d = l1.x - l0.x;
    let e = l0.perp_dot(l1);
    let horizontal = c.abs() <= d.abs();

    // substitute into x²/a + y²/b = 1, solving for x when the line is mostly
    // horizontal and for y otherwise
    let a = arc.rx * arc.rx;
    let b = arc.ry * arc.ry;
    let qa = a * c * c + b * d * d;
    let (qb, qc) = if horizontal {
        (2.0 * a * c * e, a * e * e - a * b * d * d)
    } else {
        (2.0 * b * d * e, b * e * e - a * b * c * c)
    };
    let (r0, r1) = solve_quadratic(qa, qb, qc, eps);
    let roots = distinct_roots(r0, r1, eps);

    let tangent = roots.len() == 1;
    for root in roots {
        let (x, y, t0, t1) = if horizontal {
            (root, -e / d - c * root / d, l0.x, l1.x)
        } else {
            (-e / c - d * root / c, root, l0.y, l1.y)
        };
        let angle = (y * arc.rx).atan2(x * arc.ry);
        if eps.interval(root, t0.min(t1), t0.max(t1))
            && angle_between(angle, arc.theta0, arc.theta1, eps)
        {
            let pos = Point::new(x, y).rot(arc.phi, ORIGIN) + arc.center;
            let dirb = ellipse_deriv(arc.rx, arc.ry, arc.phi, arc.sweep(), angle).angle();
            add_line_arc(zs, arc, pos, [dira, dirb], root, (t0, t1), angle, tangent, eps);
        }
    }
}

fn circle_circle(zs: &mut Vec<Intersection>, a: &CenterArc, b: &CenterArc, eps: Epsilon) {
    // direction of travel on a circle at angle theta
    let travel = |theta: f64, sweep: bool| {
        if sweep {
            angle_norm(theta + PI / 2.0)
        } else {
            angle_norm(theta - PI / 2.0)
        }
    };

    let dtheta0 = a.theta1 - a.theta0;
    let start0 = angle_norm(a.theta0 + a.phi);
    let end0 = start0 + dtheta0;
    let sweep0 = 0.0 <= dtheta0;

    let dtheta1 = b.theta1 - b.theta0;
    let mut start1 = angle_norm(b.theta0 + b.phi);
    let mut end1 = start1 + dtheta1;
    let sweep1 = 0.0 <= dtheta1;

    let (c0, r0, c1, r1) = (a.center, a.rx, b.center, b.rx);
    if c0.equals(c1, eps) && eps.equal(r0, r1) {
        // the same circle, arcs touch or overlap
        let (mut t_offset, mut dir_offset) = (0.0, 0.0);
        if sweep0 != sweep1 {
            // keep the order of the first arc
            std::mem::swap(&mut start1, &mut end1);
            dir_offset = PI;
            t_offset = 1.0;
        }
        let at = |theta: f64| ellipse_pos(r0, r0, 0.0, c0, theta);
        let mut add = |theta: f64, t: [f64; 2]| {
            let dir = travel(theta, sweep0);
            zs.push(Intersection::new(
                at(theta),
                t,
                [dir, angle_norm(dir + dir_offset)],
                true,
                true,
            ));
        };

        let t = angle_time(start0, start1, end1, eps);
        if eps.interval(t, 0.0, 1.0) {
            add(start0, [0.0, (t - t_offset).abs()]);
        }
        let t = angle_time(start1, start0, end0, eps);
        if eps.interval_exclusive(t, 0.0, 1.0) {
            add(start1, [t, t_offset]);
        }
        let t = angle_time(end1, start0, end0, eps);
        if eps.interval_exclusive(t, 0.0, 1.0) {
            add(end1, [t, 1.0 - t_offset]);
        }
        let t = angle_time(end0, start1, end1, eps);
        if eps.interval(t, 0.0, 1.0) {
            add(end0, [1.0, (t - t_offset).abs()]);
        }
        return;
    }

    let dist = (c0 - c1).length();
    if dist < (r0 - r1).abs() || r0 + r1 < dist {
        return;
    }
    let dist2 = dist * dist;
    let k = r0 * r0 - r1 * r1;
    let b = 0.5 * k / dist2;
    let c = 0.5 * (2.0 * (r0 * r0 + r1 * r1) / dist2 - k * k / (dist2 * dist2) - 1.0).max(0.0).sqrt();

    let mid = (c1 - c0) * (0.5 + b);
    let dev = Point::new(c1.y - c0.y, c0.x - c1.x) * c;
    let tangent = dev.is_zero(eps);
    let devs = if tangent { vec![dev] } else { vec![dev, -dev] };
    for dev in devs {
        let angle0 = (mid + dev).angle();
        let angle1 = (c0 - c1 + mid + dev).angle();
        let t0 = angle_time(angle0, start0, end0, eps);
        let t1 = angle_time(angle1, start1, end1, eps);
        if eps.interval(t0, 0.0, 1.0) && eps.interval(t1, 0.0, 1.0) {
            let dir = [travel(angle0, sweep0), travel(angle1, sweep1)];
            let endpoint = is_end(t0, eps) || is_end(t1, eps);
            zs.push(Intersection::new(c0 + mid + dev, [t0, t1], dir, tangent || endpoint, false));
        }
    }
}

/// Intersection of the infinite line through `a0`, `a1` with the segment `b0`-`b1`.
#[must_use]
pub fn intersection_ray_line(a0: Point, a1: Point, b0: Point, b1: Point, eps: Epsilon) -> Option<Point> {
    let da = a1 - a0;
    let db = b1 - b0;
    let div = da.perp_dot(db);
    if eps.equal(div, 0.0) {
        return None;
    }
    let tb = da.perp_dot(a0 - b0) / div;
    eps.interval(tb, 0.0, 1.0).then(|| b0.interpolate(b1, tb))
}

/// Intersections of the infinite line through `l0`, `l1` with a circle.
///
/// Both points coincide when the line is tangent.
#[must_use]
pub fn intersection_ray_circle(l0: Point, l1: Point, c: Point, r: f64) -> Option<(Point, Point)> {
    let d = (l1 - l0).norm(1.0);
    let dist = (l0 - c).perp_dot(d);
    let discriminant = r * r - dist * dist;
    if discriminant < 0.0 {
        return None;
    }
    let discriminant = discriminant.sqrt();

    let ax = dist * d.y;
    let mut bx = d.x * discriminant;
    if d.y < 0.0 {
        bx = -bx;
    }
    let ay = -dist * d.x;
    let by = d.y.abs() * discriminant;
    Some((c + Point::new(ax + bx, ay + by), c + Point::new(ax - bx, ay - by)))
}

/// Intersections of two circles, `None` when they are apart, nested or identical.
#[must_use]
pub fn intersection_circle_circle(
    c0: Point,
    r0: f64,
    c1: Point,
    r1: f64,
    eps: Epsilon,
) -> Option<(Point, Point)> {
    let dist = (c0 - c1).length();
    if dist < (r0 - r1).abs() || r0 + r1 < dist || c0.equals(c1, eps) {
        return None;
    }
    let dist2 = dist * dist;
    let k = r0 * r0 - r1 * r1;
    let b = 0.5 * k / dist2;
    let c = 0.5 * (2.0 * (r0 * r0 + r1 * r1) / dist2 - k * k / (dist2 * dist2) - 1.0).max(0.0).sqrt();

    let mid = (c0 + c1) * 0.5 + (c1 - c0) * b;
    let dev = Point::new(c1.y - c0.y, c0.x - c1.x) * c;
    Some((mid + dev, mid - dev))
}

impl Path {
    /// All intersections between segments of this path and segments of `q`, in
    /// the order of this path's segments.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::UnsupportedIntersection`] when two curves without
    /// a solver come close enough that their bounding boxes overlap.
    pub fn intersections(&self, q: &Path) -> Result<Vec<Intersection>> {
        let eps = self.epsilon();
        let mut zs = Vec::new();
        for (a0, a) in self.iter() {
            if let Segment::MoveTo(_) = a {
                continue;
            }
            let box_a = segment_fast_bounds(a0, &a, eps).expand(eps.0);
            for (b0, b) in q.iter() {
                if let Segment::MoveTo(_) = b {
                    continue;
                }
                if !box_a.overlaps(&segment_fast_bounds(b0, &b, eps).expand(eps.0)) {
                    continue;
                }
                zs.extend(intersect_segments(a0, &a, b0, &b, eps)?);
            }
        }
        Ok(zs)
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

    fn line(x: f64, y: f64) -> Segment {
        Segment::LineTo(p(x, y))
    }

    fn assert_point(got: Point, want: Point) {
        assert!(got.equals(want, Epsilon(1e-9)), "{got} != {want}");
    }

    #[test]
    fn line_line_crossing() {
        let zs = intersect_segments(ORIGIN, &line(10.0, 10.0), p(0.0, 10.0), &line(10.0, 0.0), EPS)
            .unwrap();
        assert_eq!(zs.len(), 1);
        let z = zs[0];
        assert_point(z.point, p(5.0, 5.0));
        assert_abs_diff_eq!(z.t[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(z.t[1], 0.5, epsilon = 1e-12);
        assert!(!z.tangent && !z.same);
        assert!(z.is_into());
        assert_eq!(z.to_string(), "({5,5} t={0.5,0.5} dir={45°,315°})");

        let zs = intersect_segments(p(0.0, 10.0), &line(10.0, 0.0), ORIGIN, &line(10.0, 10.0), EPS)
            .unwrap();
        assert!(!zs[0].is_into());
    }

    #[test]
    fn line_line_touching_and_parallel() {
        let zs =
            intersect_segments(ORIGIN, &line(10.0, 0.0), p(10.0, 0.0), &line(10.0, 10.0), EPS).unwrap();
        assert_eq!(zs.len(), 1);
        assert_eq!(zs[0].t, [1.0, 0.0]);
        assert!(zs[0].tangent);

        let zs = intersect_segments(ORIGIN, &line(10.0, 0.0), p(0.0, 5.0), &line(10.0, 5.0), EPS).unwrap();
        assert!(zs.is_empty());

        let zs = intersect_segments(ORIGIN, &line(10.0, 0.0), p(20.0, 5.0), &line(20.0, 10.0), EPS)
            .unwrap();
        assert!(zs.is_empty());

        // zero-length close
        let zs = intersect_segments(ORIGIN, &Segment::Close(ORIGIN), ORIGIN, &line(10.0, 0.0), EPS)
            .unwrap();
        assert!(zs.is_empty());
    }

    #[test]
    fn line_line_overlapping() {
        let zs = intersect_segments(ORIGIN, &line(10.0, 0.0), p(5.0, 0.0), &line(15.0, 0.0), EPS).unwrap();
        assert_eq!(zs.len(), 2);
        assert_point(zs[0].point, p(5.0, 0.0));
        assert_eq!(zs[0].t, [0.5, 0.0]);
        assert_point(zs[1].point, p(10.0, 0.0));
        assert_eq!(zs[1].t, [1.0, 0.5]);
        assert!(zs.iter().all(|z| z.tangent && z.same));

        // running in opposite directions
        let zs = intersect_segments(ORIGIN, &line(10.0, 0.0), p(15.0, 0.0), &line(5.0, 0.0), EPS).unwrap();
        assert_eq!(zs.len(), 2);
        assert_point(zs[0].point, p(5.0, 0.0));
        assert_point(zs[1].point, p(10.0, 0.0));

        let zs = intersect_segments(p(2.0, 0.0), &line(4.0, 0.0), ORIGIN, &line(10.0, 0.0), EPS).unwrap();
        assert_eq!(zs.len(), 2);
        assert_eq!(zs[0].t[0], 0.0);
        assert_abs_diff_eq!(zs[0].t[1], 0.2, epsilon = 1e-12);
        assert_eq!(zs[1].t[0], 1.0);
        assert_abs_diff_eq!(zs[1].t[1], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn line_quad() {
        let quad = Segment::QuadTo(p(5.0, 10.0), p(10.0, 0.0));
        let zs = intersect_segments(p(0.0, 5.0), &line(10.0, 5.0), ORIGIN, &quad, EPS).unwrap();
        assert_eq!(zs.len(), 1);
        assert_point(zs[0].point, p(5.0, 5.0));
        assert!(zs[0].tangent);

        let zs = intersect_segments(p(0.0, 3.75), &line(10.0, 3.75), ORIGIN, &quad, EPS).unwrap();
        assert_eq!(zs.len(), 2);
        let mut points: Vec<_> = zs.iter().map(|z| z.point).collect();
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_point(points[0], p(2.5, 3.75));
        assert_point(points[1], p(7.5, 3.75));
        assert!(zs.iter().all(|z| !z.tangent));

        // curve first swaps the parameters
        let swapped = intersect_segments(ORIGIN, &quad, p(0.0, 3.75), &line(10.0, 3.75), EPS).unwrap();
        assert_eq!(swapped.len(), 2);
        for (z, w) in zs.iter().zip(&swapped) {
            assert!(z.swap().equals(w, EPS), "{z} {w}");
        }
    }

    #[test]
    fn line_cube() {
        let cube = Segment::CubeTo(p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0));
        let zs = intersect_segments(p(5.0, -10.0), &line(5.0, 10.0), ORIGIN, &cube, EPS).unwrap();
        assert_eq!(zs.len(), 1);
        assert_point(zs[0].point, p(5.0, 7.5));
        assert_abs_diff_eq!(zs[0].t[0], 0.875, epsilon = 1e-9);
        assert_abs_diff_eq!(zs[0].t[1], 0.5, epsilon = 1e-9);
        assert!(!zs[0].tangent);
    }

    #[test]
    fn line_arc() {
        // upper half of the circle around the origin with radius 5
        let arc = Segment::ArcTo {
            rx: 5.0,
            ry: 5.0,
            phi: 0.0,
            large: false,
            sweep: true,
            end: p(-5.0, 0.0),
        };
        let zs = intersect_segments(p(0.0, -10.0), &line(0.0, 10.0), p(5.0, 0.0), &arc, EPS).unwrap();
        assert_eq!(zs.len(), 1);
        assert_point(zs[0].point, p(0.0, 5.0));
        assert_abs_diff_eq!(zs[0].t[0], 0.75, epsilon = 1e-9);
        assert_abs_diff_eq!(zs[0].t[1], 0.5, epsilon = 1e-9);
        assert!(!zs[0].tangent);

        let swapped = intersect_segments(p(5.0, 0.0), &arc, p(0.0, -10.0), &line(0.0, 10.0), EPS).unwrap();
        assert!(zs[0].swap().equals(&swapped[0], EPS));

        // through the arc's end points
        let zs = intersect_segments(p(-10.0, 0.0), &line(10.0, 0.0), p(5.0, 0.0), &arc, EPS).unwrap();
        assert_eq!(zs.len(), 2);
        assert!(zs.iter().all(|z| z.tangent));
    }

    #[test]
    fn line_ellipse() {
        let arc = Segment::ArcTo {
            rx: 10.0,
            ry: 5.0,
            phi: 0.0,
            large: false,
            sweep: true,
            end: p(-10.0, 0.0),
        };
        let zs = intersect_segments(p(0.0, -10.0), &line(0.0, 10.0), p(10.0, 0.0), &arc, EPS).unwrap();
        assert_eq!(zs.len(), 1);
        assert_point(zs[0].point, p(0.0, 5.0));

        // same line walked downwards
        let zs = intersect_segments(p(0.0, 10.0), &line(0.0, -10.0), p(10.0, 0.0), &arc, EPS).unwrap();
        assert_eq!(zs.len(), 1);
        assert_abs_diff_eq!(zs[0].t[0], 0.25, epsilon = 1e-9);
    }

    #[test]
    fn circle_arcs() {
        let upper = |cx: f64| Segment::ArcTo {
            rx: 5.0,
            ry: 5.0,
            phi: 0.0,
            large: false,
            sweep: true,
            end: p(cx - 5.0, 0.0),
        };
        let zs = intersect_segments(p(5.0, 0.0), &upper(0.0), p(10.0, 0.0), &upper(5.0), EPS).unwrap();
        assert_eq!(zs.len(), 1);
        assert_point(zs[0].point, p(2.5, 5.0 * 3.0_f64.sqrt() / 2.0));
        assert!(!zs[0].tangent);

        // the same arc overlaps itself entirely
        let zs = intersect_segments(p(5.0, 0.0), &upper(0.0), p(5.0, 0.0), &upper(0.0), EPS).unwrap();
        assert_eq!(zs.len(), 2);
        assert!(zs.iter().all(|z| z.same));
    }

    #[test]
    fn unsupported_pairs() {
        let quad = Segment::QuadTo(p(5.0, 10.0), p(10.0, 0.0));
        let cube = Segment::CubeTo(p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0));
        let err = intersect_segments(ORIGIN, &quad, ORIGIN, &cube, EPS).unwrap_err();
        assert!(matches!(
            err,
            VecpathError::Geometry(GeometryError::UnsupportedIntersection {
                first: "QuadTo",
                second: "CubeTo"
            })
        ));

        let ellipse = Segment::ArcTo {
            rx: 10.0,
            ry: 5.0,
            phi: 0.0,
            large: false,
            sweep: true,
            end: p(-10.0, 0.0),
        };
        assert!(intersect_segments(p(10.0, 0.0), &ellipse, p(10.0, 0.0), &ellipse, EPS).is_err());

        let zs = intersect_segments(ORIGIN, &Segment::MoveTo(ORIGIN), ORIGIN, &quad, EPS).unwrap();
        assert!(zs.is_empty());
    }

    #[test]
    fn path_intersections() {
        let rect = Path::rectangle(0.0, 0.0, 10.0, 10.0);
        let cut = Path::parse_svg("M5 -5L5 15").unwrap();
        let zs = rect.intersections(&cut).unwrap();
        assert_eq!(zs.len(), 2);
        assert_point(zs[0].point, p(5.0, 0.0));
        assert_point(zs[1].point, p(5.0, 10.0));

        // curves far apart are never compared
        let a = Path::parse_svg("Q5 5 10 0").unwrap();
        let b = Path::parse_svg("M0 20Q5 25 10 20").unwrap();
        assert!(a.intersections(&b).unwrap().is_empty());
        assert!(a.intersections(&a).is_err());
    }

    #[test]
    fn rays_and_circles() {
        let z = intersection_ray_line(ORIGIN, p(1.0, 0.0), p(5.0, -1.0), p(5.0, 1.0), EPS).unwrap();
        assert_point(z, p(5.0, 0.0));
        assert!(intersection_ray_line(ORIGIN, p(1.0, 0.0), p(0.0, 1.0), p(5.0, 1.0), EPS).is_none());

        let (a, b) = intersection_ray_circle(p(-10.0, 0.0), p(10.0, 0.0), ORIGIN, 5.0).unwrap();
        assert_point(a, p(5.0, 0.0));
        assert_point(b, p(-5.0, 0.0));
        assert!(intersection_ray_circle(p(-10.0, 6.0), p(10.0, 6.0), ORIGIN, 5.0).is_none());

        let (a, b) = intersection_circle_circle(ORIGIN, 5.0, p(6.0, 0.0), 5.0, EPS).unwrap();
        assert_point(a, p(3.0, -4.0));
        assert_point(b, p(3.0, 4.0));
        assert!(intersection_circle_circle(ORIGIN, 5.0, ORIGIN, 5.0, EPS).is_none());
        assert!(intersection_circle_circle(ORIGIN, 1.0, p(10.0, 0.0), 1.0, EPS).is_none());
    }
}
