use std::f64::consts::PI;

use super::{Path, Segment};
use crate::geometry::ellipse::{ellipse_curvature_radius, ellipse_deriv, ellipse_length};
use crate::geometry::{CubicBezier, EllipticArc, QuadBezier, Rect};
use crate::math::angle::{angle_between, angle_norm};
use crate::math::solve::solve_quadratic;
use crate::math::{Epsilon, Point, ORIGIN};

/// Unit direction of `seg` starting at `start`, at parameter `t`.
///
/// Returns the zero vector for `MoveTo`.
pub(crate) fn segment_direction(start: Point, seg: &Segment, t: f64, eps: Epsilon) -> Point {
    match *seg {
        Segment::MoveTo(_) => ORIGIN,
        Segment::LineTo(end) | Segment::Close(end) => (end - start).norm(1.0),
        Segment::QuadTo(cp, end) => QuadBezier::new(start, cp, end).deriv(t).norm(1.0),
        Segment::CubeTo(cp1, cp2, end) => {
            CubicBezier::new(start, cp1, cp2, end).deriv(t).norm(1.0)
        }
        Segment::ArcTo {
            rx,
            ry,
            phi,
            large,
            sweep,
            end,
        } => {
            let arc = EllipticArc::new(start, rx, ry, phi, large, sweep, end);
            let (_, theta0, theta1) = arc.to_center(eps);
            let theta = theta0 + t * (theta1 - theta0);
            ellipse_deriv(rx, ry, phi, sweep, theta).norm(1.0)
        }
    }
}

/// Signed curvature of `seg` at parameter `t`, zero for straight segments.
pub(crate) fn segment_curvature(start: Point, seg: &Segment, t: f64, eps: Epsilon) -> f64 {
    match *seg {
        Segment::MoveTo(_) | Segment::LineTo(_) | Segment::Close(_) => 0.0,
        Segment::QuadTo(cp, end) => 1.0 / QuadBezier::new(start, cp, end).curvature_radius(t, eps),
        Segment::CubeTo(cp1, cp2, end) => {
            1.0 / CubicBezier::new(start, cp1, cp2, end).curvature_radius(t, eps)
        }
        Segment::ArcTo {
            rx,
            ry,
            phi,
            large,
            sweep,
            end,
        } => {
            let arc = EllipticArc::new(start, rx, ry, phi, large, sweep, end);
            let (_, theta0, theta1) = arc.to_center(eps);
            let theta = theta0 + t * (theta1 - theta0);
            1.0 / ellipse_curvature_radius(rx, ry, sweep, theta, eps)
        }
    }
}

/// Conservative bounding box of a single segment including its control points.
///
/// Arcs are bounded by the square around their full ellipse.
pub(crate) fn segment_fast_bounds(start: Point, seg: &Segment, eps: Epsilon) -> Rect {
    let r = Rect::new(start.x, start.y, start.x, start.y);
    match *seg {
        Segment::MoveTo(end) => Rect::new(end.x, end.y, end.x, end.y),
        Segment::LineTo(end) | Segment::Close(end) => r.add_point(end),
        Segment::QuadTo(cp, end) => r.add_point(cp).add_point(end),
        Segment::CubeTo(cp1, cp2, end) => r.add_point(cp1).add_point(cp2).add_point(end),
        Segment::ArcTo {
            rx,
            ry,
            phi,
            large,
            sweep,
            end,
        } => {
            let arc = EllipticArc::new(start, rx, ry, phi, large, sweep, end);
            let (center, _, _) = arc.to_center(eps);
            let d = rx.max(ry);
            r.add_point(end)
                .add_point(Point::new(center.x - d, center.y - d))
                .add_point(Point::new(center.x + d, center.y + d))
        }
    }
}

/// Resolves index `j` within a single subpath to a drawable segment and parameter.
///
/// The leading `MoveTo` maps to the start of the first segment and a zero-length
/// `Close` to the end of the segment before it.
fn resolve_index(segs: &[Segment], j: usize, t: f64, eps: Epsilon) -> Option<(usize, f64)> {
    let n = segs.len();
    if n < 2 {
        return None;
    }
    let last = if point_closed(segs, eps) { n - 1 } else { n };
    let (j, t) = if j == 0 {
        (1, 0.0)
    } else if j == last && j < n {
        (j - 1, 1.0)
    } else {
        (j, t)
    };
    (j < last).then_some((j, t))
}

fn point_closed(segs: &[Segment], eps: Epsilon) -> bool {
    let n = segs.len();
    n >= 2
        && matches!(segs[n - 1], Segment::Close(_))
        && segs[n - 2].end().equals(segs[n - 1].end(), eps)
}

fn subpath_direction(segs: &[Segment], j: usize, t: f64, eps: Epsilon) -> Point {
    match resolve_index(segs, j, t, eps) {
        Some((j, t)) => segment_direction(segs[j - 1].end(), &segs[j], t, eps),
        None => ORIGIN,
    }
}

fn subpath_curvature(segs: &[Segment], j: usize, t: f64, eps: Epsilon) -> f64 {
    match resolve_index(segs, j, t, eps) {
        Some((j, t)) => segment_curvature(segs[j - 1].end(), &segs[j], t, eps),
        None => 0.0,
    }
}

impl Path {
    /// Returns true if both paths have the same segments within epsilon.
    #[must_use]
    pub fn equals(&self, q: &Path) -> bool {
        self.segs.len() == q.segs.len()
            && self
                .segs
                .iter()
                .zip(&q.segs)
                .all(|(a, b)| a.equals(b, self.eps))
    }

    /// Returns true if `q` describes the same shape, possibly starting at another
    /// segment or running in the opposite direction.
    #[must_use]
    pub fn same(&self, q: &Path) -> bool {
        let n = self.segs.len();
        if n != q.segs.len() {
            return false;
        }
        let qr = q.reverse();
        let matches_at = |other: &Path, j: usize| {
            (0..n).all(|i| self.segs[i].equals(&other.segs[(j + i) % n], self.eps))
        };
        (0..n).any(|j| matches_at(q, j) || (qr.segs.len() == n && matches_at(&qr, j)))
    }

    /// Returns true if no value of the path is NaN or infinite.
    #[must_use]
    pub fn sane(&self) -> bool {
        self.segs
            .iter()
            .all(|seg| seg.values().iter().all(|v| v.is_finite()))
    }

    /// Returns true if the path holds only `MoveTo`, `LineTo` and `Close`.
    #[must_use]
    pub fn flat(&self) -> bool {
        self.segs.iter().all(|seg| {
            matches!(
                seg,
                Segment::MoveTo(_) | Segment::LineTo(_) | Segment::Close(_)
            )
        })
    }

    /// End points of all segments, omitting zero-length closes.
    #[must_use]
    pub fn coords(&self) -> Vec<Point> {
        let mut coords: Vec<Point> = Vec::with_capacity(self.segs.len());
        for seg in &self.segs {
            let end = seg.end();
            let skip = matches!(seg, Segment::Close(_))
                && coords.last().is_some_and(|last| last.equals(end, self.eps));
            if !skip {
                coords.push(end);
            }
        }
        coords
    }

    /// Unit direction at segment `seg` and `t` in `[0, 1]`.
    ///
    /// A `MoveTo` yields the starting direction of its subpath and a zero-length
    /// `Close` its final direction. Missing segments yield the zero vector.
    #[must_use]
    pub fn direction(&self, seg: usize, t: f64) -> Point {
        self.subpath_ranges()
            .into_iter()
            .find(|r| r.contains(&seg))
            .map_or(ORIGIN, |r| {
                subpath_direction(&self.segs[r.clone()], seg - r.start, t, self.eps)
            })
    }

    /// Curvature at segment `seg` and `t` in `[0, 1]`, zero for straight segments
    /// and missing segments.
    #[must_use]
    pub fn curvature(&self, seg: usize, t: f64) -> f64 {
        self.subpath_ranges()
            .into_iter()
            .find(|r| r.contains(&seg))
            .map_or(0.0, |r| {
                subpath_curvature(&self.segs[r.clone()], seg - r.start, t, self.eps)
            })
    }

    /// Directions at every coordinate of [`Path::coords`].
    ///
    /// Interior coordinates get the average of the incoming and outgoing direction,
    /// the start of a closed path is averaged with its closing segment.
    #[must_use]
    pub fn coord_directions(&self) -> Vec<Point> {
        if self.segs.len() <= 1 {
            return vec![ORIGIN];
        }
        let eps = self.eps;
        let n = self.segs.len();
        let last = if self.point_closed() { n - 1 } else { n };

        let mut dirs = Vec::with_capacity(last + 1);
        let mut closed = false;
        let mut dir_prev = ORIGIN;
        for i in 1..last {
            let dir = subpath_direction(&self.segs, i, 0.0, eps);
            dirs.push((dir_prev + dir).norm(1.0));
            dir_prev = subpath_direction(&self.segs, i, 1.0, eps);
            closed = matches!(self.segs[i], Segment::Close(_));
        }
        if closed {
            if let Some(first) = dirs.first_mut() {
                *first = (*first + dir_prev).norm(1.0);
            }
            dirs.push(dirs[0]);
        } else {
            dirs.push(dir_prev);
        }
        dirs
    }

    /// Returns true if the first subpath runs counter clockwise at its
    /// bottom-right-most coordinate.
    ///
    /// Empty paths and single straight segments count as counter clockwise.
    #[must_use]
    pub fn ccw(&self) -> bool {
        let eps = self.eps;
        let n = self.segs.len();
        let single_line = n == 2 && matches!(self.segs[1], Segment::LineTo(_) | Segment::Close(_));
        if n <= 1 || single_line {
            return true;
        }

        let monotone = self.x_monotone();
        let end = monotone.subpath_ranges().first().map_or(0, |r| r.end);
        let segs = &monotone.segs[..end];
        let count = if matches!(segs.last(), Some(Segment::Close(_))) {
            segs.len() - 1
        } else {
            segs.len()
        };
        if count < 2 {
            return true;
        }

        let mut k = 0;
        for (i, seg) in segs.iter().enumerate().take(count) {
            let (p, best) = (seg.end(), segs[k].end());
            if best.x < p.x || eps.equal(best.x, p.x) && p.y < best.y {
                k = i;
            }
        }

        let start = segs[0].end();
        let end_of = |i: usize| segs[i].end();
        let closing = start - end_of(count - 1);

        let (dir_prev, curv_prev) = if k == 0 {
            if closing.is_zero(eps) {
                (
                    segment_direction(end_of(count - 2), &segs[count - 1], 1.0, eps),
                    segment_curvature(end_of(count - 2), &segs[count - 1], 1.0, eps),
                )
            } else {
                (closing.norm(1.0), 0.0)
            }
        } else {
            (
                segment_direction(end_of(k - 1), &segs[k], 1.0, eps),
                segment_curvature(end_of(k - 1), &segs[k], 1.0, eps),
            )
        };
        let (dir_next, curv_next) = if k == count - 1 {
            (start - end_of(k), 0.0)
        } else {
            (
                segment_direction(end_of(k), &segs[k + 1], 0.0, eps),
                segment_curvature(end_of(k), &segs[k + 1], 0.0, eps),
            )
        };

        let angle_prev = angle_norm(dir_prev.angle() + PI);
        let angle_next = angle_norm(dir_next.angle());
        if eps.equal(angle_prev, angle_next) {
            // same tangent at the extreme point, the tighter bend is the inner one
            let curv_prev = -curv_prev;
            if !eps.equal(curv_prev, curv_next) {
                return curv_next < curv_prev;
            }
        }
        angle_next - angle_prev < 0.0
    }

    /// Conservative bounding box including all control points.
    #[must_use]
    pub fn fast_bounds(&self) -> Rect {
        let Some(first) = self.segs.first() else {
            return Rect::default();
        };
        let start = first.end();
        let r = Rect::new(start.x, start.y, start.x, start.y);
        self.iter().fold(r, |r, (start, seg)| {
            let b = segment_fast_bounds(start, &seg, self.eps);
            r.add_point(Point::new(b.x0, b.y0)).add_point(Point::new(b.x1, b.y1))
        })
    }

    /// Exact bounding box of the path.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let eps = self.eps;
        let Some(first) = self.segs.first() else {
            return Rect::default();
        };
        let start = first.end();
        let mut r = Rect::new(start.x, start.y, start.x, start.y);
        for (start, seg) in self.iter() {
            r = r.add_point(seg.end());
            match seg {
                Segment::QuadTo(cp, end) => {
                    let quad = QuadBezier::new(start, cp, end);
                    let axes = [(start.x, cp.x, end.x), (start.y, cp.y, end.y)];
                    for (axis, (s, c, e)) in axes.into_iter().enumerate() {
                        let denom = s - 2.0 * c + e;
                        if eps.equal(denom, 0.0) {
                            continue;
                        }
                        let t = (s - c) / denom;
                        if eps.interval_exclusive(t, 0.0, 1.0) {
                            r = add_axis(r, axis, quad.pos(t));
                        }
                    }
                }
                Segment::CubeTo(cp1, cp2, end) => {
                    let cube = CubicBezier::new(start, cp1, cp2, end);
                    let axes = [
                        (start.x, cp1.x, cp2.x, end.x),
                        (start.y, cp1.y, cp2.y, end.y),
                    ];
                    for (axis, (s, c1, c2, e)) in axes.into_iter().enumerate() {
                        let a = -s + 3.0 * c1 - 3.0 * c2 + e;
                        let b = 2.0 * s - 4.0 * c1 + 2.0 * c2;
                        let c = -s + c1;
                        let (t1, t2) = solve_quadratic(a, b, c, eps);
                        for t in [t1, t2] {
                            if !t.is_nan() && eps.interval_exclusive(t, 0.0, 1.0) {
                                r = add_axis(r, axis, cube.pos(t));
                            }
                        }
                    }
                }
                Segment::ArcTo {
                    rx,
                    ry,
                    phi,
                    large,
                    sweep,
                    end,
                } => {
                    let arc = EllipticArc::new(start, rx, ry, phi, large, sweep, end);
                    let (center, theta0, theta1) = arc.to_center(eps);

                    // angles of the four extremes of the rotated ellipse
                    let (sinphi, cosphi) = phi.sin_cos();
                    let theta_right = (-ry * sinphi).atan2(rx * cosphi);
                    let theta_top = (rx * cosphi).atan2(ry * sinphi);
                    let theta_left = theta_right + PI;
                    let theta_bottom = theta_top + PI;

                    let dx = (rx * rx * cosphi * cosphi + ry * ry * sinphi * sinphi).sqrt();
                    let dy = (rx * rx * sinphi * sinphi + ry * ry * cosphi * cosphi).sqrt();
                    if angle_between(theta_left, theta0, theta1, eps) {
                        r.x0 = r.x0.min(center.x - dx);
                    }
                    if angle_between(theta_right, theta0, theta1, eps) {
                        r.x1 = r.x1.max(center.x + dx);
                    }
                    if angle_between(theta_bottom, theta0, theta1, eps) {
                        r.y0 = r.y0.min(center.y - dy);
                    }
                    if angle_between(theta_top, theta0, theta1, eps) {
                        r.y1 = r.y1.max(center.y + dy);
                    }
                }
                Segment::MoveTo(_) | Segment::LineTo(_) | Segment::Close(_) => {}
            }
        }
        r
    }

    /// Total arc length of the path.
    #[must_use]
    pub fn length(&self) -> f64 {
        let eps = self.eps;
        self.iter()
            .map(|(start, seg)| match seg {
                Segment::MoveTo(_) => 0.0,
                Segment::LineTo(end) | Segment::Close(end) => (end - start).length(),
                Segment::QuadTo(cp, end) => QuadBezier::new(start, cp, end).length(eps),
                Segment::CubeTo(cp1, cp2, end) => {
                    CubicBezier::new(start, cp1, cp2, end).length(eps)
                }
                Segment::ArcTo {
                    rx,
                    ry,
                    phi,
                    large,
                    sweep,
                    end,
                } => {
                    let arc = EllipticArc::new(start, rx, ry, phi, large, sweep, end);
                    let (_, theta0, theta1) = arc.to_center(eps);
                    ellipse_length(rx, ry, theta0, theta1)
                }
            })
            .sum()
    }
}

/// Extends `r` along one axis (0 for x, 1 for y) to include `p`.
fn add_axis(mut r: Rect, axis: usize, p: Point) -> Rect {
    if axis == 0 {
        r.x0 = r.x0.min(p.x);
        r.x1 = r.x1.max(p.x);
    } else {
        r.y0 = r.y0.min(p.y);
        r.y1 = r.y1.max(p.y);
    }
    r
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn parse(s: &str) -> Path {
        Path::parse_svg(s).unwrap()
    }

    #[test]
    fn equality() {
        assert!(!parse("M5 0L5 10").equals(&parse("M5 0")));
        assert!(!parse("M5 0L5 10").equals(&parse("M5 0M5 10")));
        assert!(!parse("M5 0L5 10").equals(&parse("M5 0L5 9")));
        assert!(parse("M5 0L5 10").equals(&parse("M5 0L5 10")));
        assert!(parse("L1 0L1 1L0 1z").same(&parse("L0 1L1 1L1 0z")));
        assert!(!parse("L1 0L1 1L0 1z").same(&parse("L0 1L1 1L2 0z")));
    }

    #[test]
    fn sanity_and_flatness() {
        assert!(parse("L10 0L10 10z").sane());
        let mut p = Path::new();
        p.line_to(f64::NAN, 1.0);
        assert!(!p.sane());
        assert!(parse("L10 0L10 10z").flat());
        assert!(!parse("Q10 0 10 10").flat());
    }

    #[test]
    fn coordinates() {
        assert_eq!(
            parse("L5 10").coords(),
            vec![Point::new(0.0, 0.0), Point::new(5.0, 10.0)]
        );
        assert_eq!(
            parse("L5 10C2.5 10 0 5 0 0z").coords(),
            vec![Point::new(0.0, 0.0), Point::new(5.0, 10.0), Point::new(0.0, 0.0)]
        );
    }

    #[test]
    fn directions() {
        let p = parse("L10 0L10 10zM20 0Q30 0 30 10");
        assert_eq!(p.direction(0, 0.5), Point::new(1.0, 0.0));
        assert_eq!(p.direction(2, 0.0), Point::new(0.0, 1.0));
        let d = p.direction(3, 0.0);
        assert_abs_diff_eq!(d.x, -0.5_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(d.y, -0.5_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(p.direction(4, 0.0), Point::new(1.0, 0.0));
        assert_eq!(p.direction(5, 1.0), Point::new(0.0, 1.0));
        assert_eq!(p.direction(6, 0.0), ORIGIN);

        // zero-length close reports the final direction
        let p = Path::from_segments(
            vec![
                Segment::MoveTo(ORIGIN),
                Segment::LineTo(Point::new(10.0, 0.0)),
                Segment::LineTo(Point::new(10.0, 10.0)),
                Segment::LineTo(ORIGIN),
                Segment::Close(ORIGIN),
            ],
            Epsilon::default(),
        );
        assert!(p.point_closed());
        assert_eq!(p.direction(4, 0.0), p.direction(3, 1.0));
        assert_ne!(p.direction(4, 0.0), ORIGIN);
    }

    #[test]
    fn curvatures() {
        let p = parse("L10 0A5 5 0 0 1 20 0");
        assert_abs_diff_eq!(p.curvature(1, 0.5), 0.0);
        assert_abs_diff_eq!(p.curvature(2, 0.5), 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(parse("A5 5 0 0 0 10 0").curvature(1, 0.5), -0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(p.curvature(7, 0.5), 0.0);
    }

    #[test]
    fn coordinate_directions() {
        let dirs = parse("L10 0L10 10").coord_directions();
        assert_eq!(dirs.len(), 3);
        assert_eq!(dirs[0], Point::new(1.0, 0.0));
        assert_abs_diff_eq!(dirs[1].x, 0.5_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(dirs[1].y, 0.5_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(dirs[2], Point::new(0.0, 1.0));

        let dirs = parse("L10 0L10 10L0 10z").coord_directions();
        assert_eq!(dirs.len(), 5);
        assert_abs_diff_eq!(dirs[0].x, 0.5_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(dirs[0].y, -(0.5_f64.sqrt()), epsilon = 1e-12);
        assert_eq!(dirs[4], dirs[0]);

        assert_eq!(Path::new().coord_directions(), vec![ORIGIN]);
    }

    #[test]
    fn orientation() {
        let cases = [
            ("L10 0L10 10z", true),
            ("L10 0L10 -10z", false),
            ("M2 4L2 16L8 10z", false),
            ("M2 4L8 10L2 16z", true),
            ("M0 0L0 10L10 10L10 0z", false),
            ("L10 0", true),
            ("M10 0", true),
            ("Q0 -1 1 0", true),
            ("Q0 1 1 0", false),
            ("C0 -1 1 -1 1 0", true),
            ("C0 1 1 1 1 0", false),
            ("A1 1 0 0 1 2 0", true),
            ("A1 1 0 0 0 2 0", false),
            ("M0.31191406250000003 0.9650390625L0.3083984375 0.9724609375L0.3013671875 0.9724609375L0.29824218750000003 0.9646484375z", true),
        ];
        for (p, ccw) in cases {
            assert_eq!(parse(p).ccw(), ccw, "{p}");
        }
    }

    #[test]
    fn bounding_boxes() {
        let cases = [
            ("", Rect::default()),
            ("Q50 100 100 0", Rect::new(0.0, 0.0, 100.0, 50.0)),
            ("Q100 50 0 100", Rect::new(0.0, 0.0, 50.0, 100.0)),
            ("Q0 0 100 0", Rect::new(0.0, 0.0, 100.0, 0.0)),
            ("Q100 0 100 100", Rect::new(0.0, 0.0, 100.0, 100.0)),
            ("C0 100 100 100 100 0", Rect::new(0.0, 0.0, 100.0, 75.0)),
            ("C0 0 100 90 100 0", Rect::new(0.0, 0.0, 100.0, 40.0)),
            ("C0 90 100 0 100 0", Rect::new(0.0, 0.0, 100.0, 40.0)),
            ("C100 100 0 100 100 0", Rect::new(0.0, 0.0, 100.0, 75.0)),
            ("C66.667 0 100 33.333 100 100", Rect::new(0.0, 0.0, 100.0, 100.0)),
            (
                "M3.1125 1.7812C3.4406 1.7812 3.5562 1.5938 3.4578 1.2656",
                Rect::new(3.1125, 1.2656, 3.1125 + 0.379_252, 1.2656 + 0.515_599),
            ),
            ("A100 100 0 0 0 100 100", Rect::new(0.0, 0.0, 100.0, 100.0)),
            ("A50 100 90 0 0 200 0", Rect::new(0.0, 0.0, 200.0, 50.0)),
            ("A100 100 0 1 0 -100 100", Rect::new(-200.0, -100.0, 0.0, 100.0)),
            ("A100 100 0 1 1 -100 100", Rect::new(-100.0, 0.0, 100.0, 200.0)),
        ];
        for (p, want) in cases {
            let got = parse(p).bounds();
            assert_abs_diff_eq!(got.x0, want.x0, epsilon = 1e-6);
            assert_abs_diff_eq!(got.y0, want.y0, epsilon = 1e-6);
            assert_abs_diff_eq!(got.x1, want.x1, epsilon = 1e-6);
            assert_abs_diff_eq!(got.y1, want.y1, epsilon = 1e-6);
        }

        let fast = parse("C0 100 100 100 100 0").fast_bounds();
        assert_eq!(fast, Rect::new(0.0, 0.0, 100.0, 100.0));
        let fast = parse("A5 5 0 0 0 10 0").fast_bounds();
        assert_abs_diff_eq!(fast.y0, -5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fast.y1, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn lengths() {
        let cases: [(&str, f64); 12] = [
            ("M10 0z", 0.0),
            ("Q50 66.67 100 0", 124.533),
            ("Q100 0 100 0", 100.0),
            ("C0 66.67 100 66.67 100 0", 158.5864),
            ("C0 0 100 66.67 100 0", 125.746),
            ("C0 0 100 0 100 0", 100.0),
            ("C100 66.67 0 66.67 100 0", 143.9746),
            ("A10 20 0 0 0 20 0", 48.4422),
            ("A10 20 0 0 1 20 0", 48.4422),
            ("A10 20 0 1 0 20 0", 48.4422),
            ("A10 20 0 1 1 20 0", 48.4422),
            ("A10 20 30 0 0 20 0", 31.4622),
        ];
        for (p, want) in cases {
            let got = parse(p).length();
            assert_abs_diff_eq!(got, want, epsilon = 0.01 * want.max(1.0));
        }
    }
}
