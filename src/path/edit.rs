use tracing::debug;

use super::{Path, Segment};
use crate::geometry::ellipse::{ellipse_deriv, ellipse_split};
use crate::geometry::{CubicBezier, EllipticArc, QuadBezier};
use crate::math::quadrature::{gauss_legendre7, inv_speed_polynomial_chebyshev_approx};
use crate::math::angle::canonical_rotation;
use crate::math::{AffineTransform, Epsilon, Point, ORIGIN};

impl Path {
    /// Concatenates `q` after this path without connecting them.
    #[must_use]
    pub fn append(&self, q: &Path) -> Path {
        let mut out = if self.is_empty() {
            self.empty_like()
        } else {
            self.clone()
        };
        if !q.is_empty() {
            out.segs.extend_from_slice(&q.segs);
        }
        out
    }

    /// Continues this path with `q`.
    ///
    /// When `q` starts where this path ends, the first command of `q` runs through
    /// the builder so that colinear lines merge. Otherwise, or when this path ends
    /// in `Close`, the paths are appended.
    #[must_use]
    pub fn join(&self, q: &Path) -> Path {
        if q.is_empty() {
            return self.clone();
        } else if self.is_empty() {
            let mut out = q.clone();
            out.eps = self.eps;
            return out;
        }

        let mut out = self.clone();
        if self.closed() || !self.pos().equals(q.segs[0].end(), self.eps) {
            out.segs.extend_from_slice(&q.segs);
            return out;
        }

        out.push_segment(&q.segs[1]);
        let repair_from = out.segs.len();
        let start = out.start_pos();
        out.segs.extend_from_slice(&q.segs[2..]);

        // a Close inherited from q must return to the joined subpath's start
        for seg in &mut out.segs[repair_from..] {
            match seg {
                Segment::MoveTo(_) => break,
                Segment::Close(end) => {
                    *end = start;
                    break;
                }
                _ => {}
            }
        }
        out
    }

    /// Adds `seg` through the builder methods, continuing from the current position.
    pub(crate) fn push_segment(&mut self, seg: &Segment) {
        match *seg {
            Segment::MoveTo(end) => {
                self.move_to(end.x, end.y);
            }
            Segment::LineTo(end) => {
                self.line_to(end.x, end.y);
            }
            Segment::QuadTo(cp, end) => {
                self.quad_to(cp.x, cp.y, end.x, end.y);
            }
            Segment::CubeTo(cp1, cp2, end) => {
                self.cube_to(cp1.x, cp1.y, cp2.x, cp2.y, end.x, end.y);
            }
            Segment::ArcTo {
                rx,
                ry,
                phi,
                large,
                sweep,
                end,
            } => {
                self.arc_to_radians(rx, ry, phi, large, sweep, end);
            }
            Segment::Close(_) => {
                self.close();
            }
        }
    }

    /// Returns the path running in the opposite direction.
    ///
    /// Subpaths come out in reverse order and closed subpaths stay closed.
    #[must_use]
    pub fn reverse(&self) -> Path {
        let mut q = self.empty_like();
        let Some(last) = self.segs.last() else {
            return q;
        };

        let mut end = last.end();
        q.segs.push(Segment::MoveTo(end));

        let mut closed = false;
        let mut first = end;
        let mut start = end;
        for i in (0..self.segs.len()).rev() {
            end = if i > 0 { self.segs[i - 1].end() } else { ORIGIN };
            match self.segs[i] {
                Segment::MoveTo(_) => {
                    if closed {
                        q.segs.push(Segment::Close(first));
                        closed = false;
                    }
                    if i != 0 {
                        q.segs.push(Segment::MoveTo(end));
                        first = end;
                    }
                }
                Segment::Close(_) => {
                    if !start.equals(end, self.eps) {
                        q.segs.push(Segment::LineTo(end));
                    }
                    closed = true;
                }
                Segment::LineTo(_) => {
                    let subpath_start = i == 0 || matches!(self.segs[i - 1], Segment::MoveTo(_));
                    if closed && subpath_start {
                        q.segs.push(Segment::Close(first));
                        closed = false;
                    } else {
                        q.segs.push(Segment::LineTo(end));
                    }
                }
                Segment::QuadTo(cp, _) => q.segs.push(Segment::QuadTo(cp, end)),
                Segment::CubeTo(cp1, cp2, _) => q.segs.push(Segment::CubeTo(cp2, cp1, end)),
                Segment::ArcTo {
                    rx,
                    ry,
                    phi,
                    large,
                    sweep,
                    ..
                } => q.segs.push(Segment::ArcTo {
                    rx,
                    ry,
                    phi,
                    large,
                    sweep: !sweep,
                    end,
                }),
            }
            start = end;
        }
        if closed {
            q.segs.push(Segment::Close(first));
        }
        q
    }

    /// Splits the path before every `MoveTo` into independent subpaths.
    #[must_use]
    pub fn split(&self) -> Vec<Path> {
        let mut ps = Vec::new();
        let mut i = 0;
        for (j, seg) in self.segs.iter().enumerate() {
            if i < j && matches!(seg, Segment::MoveTo(_)) {
                ps.push(Path::from_segments(self.segs[i..j].to_vec(), self.eps));
                i = j;
            }
        }
        if i + 1 < self.segs.len() {
            ps.push(Path::from_segments(self.segs[i..].to_vec(), self.eps));
        }
        ps
    }

    /// Cuts the path at the given distances along its length.
    ///
    /// Curves are cut at the parameter found through an approximation of their
    /// inverse arc length. A `Close` becomes a `LineTo` in the pieces.
    #[must_use]
    pub fn split_at(&self, distances: &[f64]) -> Vec<Path> {
        if distances.is_empty() {
            return vec![self.clone()];
        }
        let eps = self.eps;
        let mut ts = distances.to_vec();
        ts.sort_by(f64::total_cmp);
        if ts.first() == Some(&0.0) {
            ts.remove(0);
        }

        let mut splitter = Splitter {
            ts: &ts,
            j: 0,
            total: 0.0,
            q: self.empty_like(),
            pieces: Vec::new(),
        };
        if let Some(Segment::MoveTo(p)) = self.segs.first() {
            splitter.q.move_to(p.x, p.y);
        }

        for ps in self.split() {
            for (start, seg) in ps.iter() {
                match seg {
                    Segment::MoveTo(end) => {
                        splitter.q.move_to(end.x, end.y);
                    }
                    Segment::LineTo(end) | Segment::Close(end) => {
                        if splitter.done() {
                            splitter.q.line_to(end.x, end.y);
                            continue;
                        }
                        let dt = (end - start).length();
                        let mut t_curve = splitter.total;
                        while let Some(t) = splitter.next_within(dt) {
                            let pos = start.interpolate(end, (t - splitter.total) / dt);
                            t_curve = t;
                            splitter.q.line_to(pos.x, pos.y);
                            splitter.cut(pos);
                        }
                        if t_curve < splitter.total + dt {
                            splitter.q.line_to(end.x, end.y);
                        }
                        splitter.total += dt;
                    }
                    Segment::QuadTo(cp, end) => {
                        if splitter.done() {
                            splitter.q.quad_to(cp.x, cp.y, end.x, end.y);
                            continue;
                        }
                        let quad = QuadBezier::new(start, cp, end);
                        let speed = |t: f64| quad.deriv(t).length();
                        let (inv_length, dt) =
                            inv_speed_polynomial_chebyshev_approx(20, gauss_legendre7, &speed, 0.0, 1.0);

                        let mut t0 = 0.0;
                        let mut rest = quad;
                        while let Some(t) = splitter.next_within(dt) {
                            let t = inv_length(t - splitter.total);
                            let (head, tail) = rest.split((t - t0) / (1.0 - t0));
                            t0 = t;
                            rest = tail;
                            splitter.q.quad_to(head.p1.x, head.p1.y, head.p2.x, head.p2.y);
                            splitter.cut(head.p2);
                        }
                        if !eps.equal(t0, 1.0) {
                            splitter.q.quad_to(rest.p1.x, rest.p1.y, rest.p2.x, rest.p2.y);
                        }
                        splitter.total += dt;
                    }
                    Segment::CubeTo(cp1, cp2, end) => {
                        if splitter.done() {
                            splitter.q.cube_to(cp1.x, cp1.y, cp2.x, cp2.y, end.x, end.y);
                            continue;
                        }
                        let cube = CubicBezier::new(start, cp1, cp2, end);
                        let speed = |t: f64| cube.deriv(t).length();
                        let n = 20 + 20 * cube.num_inflections(eps);
                        let (inv_length, dt) =
                            inv_speed_polynomial_chebyshev_approx(n, gauss_legendre7, &speed, 0.0, 1.0);

                        let mut t0 = 0.0;
                        let mut rest = cube;
                        while let Some(t) = splitter.next_within(dt) {
                            let t = inv_length(t - splitter.total);
                            let (head, tail) = rest.split((t - t0) / (1.0 - t0));
                            t0 = t;
                            rest = tail;
                            splitter.q.cube_to(
                                head.p1.x, head.p1.y, head.p2.x, head.p2.y, head.p3.x, head.p3.y,
                            );
                            splitter.cut(head.p3);
                        }
                        if !eps.equal(t0, 1.0) {
                            splitter.q.cube_to(
                                rest.p1.x, rest.p1.y, rest.p2.x, rest.p2.y, rest.p3.x, rest.p3.y,
                            );
                        }
                        splitter.total += dt;
                    }
                    Segment::ArcTo {
                        rx,
                        ry,
                        phi,
                        large,
                        sweep,
                        end,
                    } => {
                        if splitter.done() {
                            splitter.q.arc_to_radians(rx, ry, phi, large, sweep, end);
                            continue;
                        }
                        let arc = EllipticArc::new(start, rx, ry, phi, large, sweep, end);
                        let (center, theta0, theta1) = arc.to_center(eps);
                        let speed = |theta: f64| ellipse_deriv(rx, ry, 0.0, true, theta).length();
                        let (inv_length, dt) = inv_speed_polynomial_chebyshev_approx(
                            10,
                            gauss_legendre7,
                            &speed,
                            theta0,
                            theta1,
                        );

                        let mut start_theta = theta0;
                        let mut next_large = large;
                        while let Some(t) = splitter.next_within(dt) {
                            let theta = inv_length(t - splitter.total);
                            let Some((mid, large0, large1)) =
                                ellipse_split(rx, ry, phi, center, start_theta, theta1, theta, eps)
                            else {
                                debug!(theta, start_theta, theta1, "split angle outside arc, skipping cut");
                                continue;
                            };
                            splitter.q.arc_to_radians(rx, ry, phi, large0, sweep, mid);
                            splitter.cut(mid);
                            start_theta = theta;
                            next_large = large1;
                        }
                        if !eps.equal(start_theta, theta1) {
                            splitter.q.arc_to_radians(rx, ry, phi, next_large, sweep, end);
                        }
                        splitter.total += dt;
                    }
                }
            }
        }
        if splitter.q.len() > 1 {
            splitter.pieces.push(splitter.q);
        }
        splitter.pieces
    }

    /// Maps every point through `m`.
    ///
    /// Arcs are re-fitted to the transformed ellipse; a transform that collapses an
    /// arc turns it into a line.
    #[must_use]
    pub fn transform(&self, m: &AffineTransform) -> Path {
        let eps = self.eps;
        let (_, _, _, sx, sy, _) = m.decompose(eps);
        let segs = self
            .segs
            .iter()
            .map(|seg| match *seg {
                Segment::ArcTo {
                    rx,
                    ry,
                    phi,
                    large,
                    sweep,
                    end,
                } => transform_arc(m, rx, ry, phi, large, sweep, end, sx * sy < 0.0, eps),
                _ => seg.map_points(|p| m.dot(p)),
            })
            .collect();
        Path::from_segments(segs, eps)
    }

    #[must_use]
    pub fn translate(&self, x: f64, y: f64) -> Path {
        self.transform(&AffineTransform::IDENTITY.translate(x, y))
    }

    #[must_use]
    pub fn scale(&self, x: f64, y: f64) -> Path {
        self.transform(&AffineTransform::IDENTITY.scale(x, y))
    }
}

/// Recovers the radii and rotation of an arc's ellipse after mapping it through `m`.
///
/// The ellipse `x^T E x = 1` with `E = diag(1/rx², 1/ry²)` becomes
/// `x^T (T^-T E T^-1) x = 1`, whose eigen decomposition gives the new axes.
#[allow(clippy::too_many_arguments)]
fn transform_arc(
    m: &AffineTransform,
    rx: f64,
    ry: f64,
    phi: f64,
    large: bool,
    sweep: bool,
    end: Point,
    flip: bool,
    eps: Epsilon,
) -> Segment {
    let end = m.dot(end);
    let Some(inv) = m.rotate(phi.to_degrees()).inv() else {
        return Segment::LineTo(end);
    };
    let e = AffineTransform::IDENTITY.scale(1.0 / rx / rx, 1.0 / ry / ry);
    let q = inv.transpose().mul(&e).mul(&inv);

    let (lambda1, lambda2, v1, v2) = q.eigen(eps);
    let mut rx = 1.0 / lambda1.sqrt();
    let mut ry = 1.0 / lambda2.sqrt();
    let mut phi = v1.angle();
    if rx < ry {
        std::mem::swap(&mut rx, &mut ry);
        phi = v2.angle();
    }
    Segment::ArcTo {
        rx,
        ry,
        phi: canonical_rotation(phi),
        large,
        sweep: sweep != flip,
        end,
    }
}

/// Running state of [`Path::split_at`].
struct Splitter<'a> {
    ts: &'a [f64],
    j: usize,
    /// Length of the path consumed so far.
    total: f64,
    q: Path,
    pieces: Vec<Path>,
}

impl Splitter<'_> {
    fn done(&self) -> bool {
        self.j == self.ts.len()
    }

    /// Next cut distance falling within a segment of length `dt`, consuming it.
    fn next_within(&mut self, dt: f64) -> Option<f64> {
        let t = *self.ts.get(self.j)?;
        if self.total < t && t <= self.total + dt {
            self.j += 1;
            Some(t)
        } else {
            None
        }
    }

    /// Finishes the current piece at `pos` and starts the next one there.
    fn cut(&mut self, pos: Point) {
        let eps = self.q.epsilon();
        let piece = std::mem::replace(&mut self.q, Path::with_epsilon(eps));
        self.pieces.push(piece);
        self.q.move_to(pos.x, pos.y);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Path {
        Path::parse_svg(s).unwrap()
    }

    fn assert_close(got: &Path, want: &str, tolerance: f64) {
        let got_loose = Path::from_segments(got.segments().to_vec(), Epsilon(tolerance));
        assert!(got_loose.equals(&parse(want)), "{got} != {want}");
    }

    fn assert_pieces(got: &[Path], want: &[&str], tolerance: f64) {
        let shown: Vec<String> = got.iter().map(ToString::to_string).collect();
        assert_eq!(got.len(), want.len(), "{shown:?} != {want:?}");
        for (p, w) in got.iter().zip(want) {
            assert_close(p, w, tolerance);
        }
    }

    #[test]
    fn appending() {
        let p = parse("M5 0L5 10");
        assert_eq!(p.append(&Path::new()), p);
        assert_eq!(Path::new().append(&p), p);
        assert_close(&p.append(&parse("M5 15L10 15")), "M5 0L5 10M5 15L10 15", 1e-10);
        assert_close(
            &p.append(&parse("L10 15M20 15L25 15")),
            "M5 0L5 10M0 0L10 15M20 15L25 15",
            1e-10,
        );
    }

    #[test]
    fn joining() {
        let cases = [
            ("M5 0L5 10", "", "M5 0L5 10"),
            ("", "M5 0L5 10", "M5 0L5 10"),
            ("M5 0L5 10", "L10 15", "M5 0L5 10M0 0L10 15"),
            ("M5 0L5 10z", "M5 0L10 15", "M5 0L5 10zM5 0L10 15"),
            ("M5 0L5 10", "M5 10L10 15", "M5 0L5 10L10 15"),
            ("M5 0L5 10", "L10 15M20 15L25 15", "M5 0L5 10M0 0L10 15M20 15L25 15"),
            ("M5 0L5 10", "M5 10L10 15M20 15L25 15", "M5 0L5 10L10 15M20 15L25 15"),
            ("M5 0L10 5", "M10 5L15 10", "M5 0L15 10"),
            ("M5 0L10 5", "L5 5z", "M5 0L10 5M0 0L5 5z"),
            ("M5 0L10 5", "M10 5L10 10z", "M5 0L10 5L10 10z"),
        ];
        for (p, q, want) in cases {
            assert_close(&parse(p).join(&parse(q)), want, 1e-10);
        }
    }

    #[test]
    fn reversing() {
        let cases = [
            ("", ""),
            ("M5 5L5 10L10 5", "M10 5L5 10L5 5"),
            ("M5 5L5 10L10 5z", "M5 5L10 5L5 10z"),
            ("M5 5L5 10L10 5M10 10L10 20L20 10z", "M10 10L20 10L10 20zM10 5L5 10L5 5"),
            ("M5 5L5 10L10 5zM10 10L10 20L20 10z", "M10 10L20 10L10 20zM5 5L10 5L5 10z"),
            ("M5 5Q10 10 15 5", "M15 5Q10 10 5 5"),
            ("M5 5Q10 10 15 5z", "M5 5L15 5Q10 10 5 5z"),
            ("M5 5C5 10 10 10 10 5", "M10 5C10 10 5 10 5 5"),
            ("M5 5C5 10 10 10 10 5z", "M5 5L10 5C10 10 5 10 5 5z"),
            ("M5 5A2.5 5 0 0 0 10 5", "M10 5A5 2.5 90 0 1 5 5"),
            ("M5 5A2.5 5 0 1 1 10 5", "M10 5A5 2.5 90 1 0 5 5"),
            ("M5 5A2.5 5 0 0 0 10 5z", "M5 5L10 5A5 2.5 90 0 1 5 5z"),
            ("L0 5L5 5", "M5 5L0 5L0 0"),
            ("L-1 5L5 5z", "L5 5L-1 5z"),
            ("Q0 5 5 5z", "L5 5Q0 5 0 0z"),
            ("C0 5 5 5 5 0z", "L5 0C5 5 0 5 0 0z"),
            ("M5 5L10 10zL15 10", "M15 10L5 5M5 5L10 10z"),
            ("M5 5L10 10zM0 0L15 10", "M15 10L0 0M5 5L10 10z"),
        ];
        for (p, want) in cases {
            assert_close(&parse(p).reverse(), want, 1e-10);
        }
    }

    #[test]
    fn splitting() {
        assert_pieces(&parse("M5 5L6 6z").split(), &["M5 5L6 6z"], 1e-10);
        assert_pieces(&parse("L5 5M10 10L20 20z").split(), &["L5 5", "M10 10L20 20z"], 1e-10);
        assert_pieces(&parse("L5 5zL10 10").split(), &["L5 5z", "L10 10"], 1e-10);
        assert_pieces(
            &parse("M5 5L15 5zL10 10zL20 20").split(),
            &["M5 5L15 5z", "M5 5L10 10z", "M5 5L20 20"],
            1e-10,
        );

        let raw = Path::from_segments(
            vec![
                Segment::MoveTo(Point::new(5.0, 5.0)),
                Segment::MoveTo(Point::new(10.0, 10.0)),
                Segment::Close(Point::new(10.0, 10.0)),
            ],
            Epsilon::default(),
        );
        let ps = raw.split();
        assert_eq!(ps[0].to_string(), "M5 5");
        assert_eq!(ps[1].to_string(), "M10 10z");
    }

    #[test]
    fn splitting_at_lengths() {
        let cases: [(&str, &[f64], &[&str]); 10] = [
            ("L4 3L8 0z", &[], &["L4 3L8 0z"]),
            (
                "M2 0L4 3Q10 10 20 0C20 10 30 10 30 0A10 10 0 0 0 50 0z",
                &[0.0],
                &["M2 0L4 3Q10 10 20 0C20 10 30 10 30 0A10 10 0 0 0 50 0L2 0"],
            ),
            ("L4 3L8 0z", &[0.0, 5.0, 10.0, 18.0], &["L4 3", "M4 3L8 0", "M8 0L0 0"]),
            ("L4 3L8 0z", &[5.0, 20.0], &["L4 3", "M4 3L8 0L0 0"]),
            (
                "L4 3L8 0z",
                &[2.5, 7.5, 14.0],
                &["L2 1.5", "M2 1.5L4 3L6 1.5", "M6 1.5L8 0L4 0", "M4 0L0 0"],
            ),
            ("Q10 10 20 0", &[11.477_858], &["Q5 5 10 5", "M10 5Q15 5 20 0"]),
            (
                "C0 10 20 10 20 0",
                &[13.947_108],
                &["C0 5 5 7.5 10 7.5", "M10 7.5C15 7.5 20 5 20 0"],
            ),
            (
                "A10 10 0 0 1 -20 0",
                &[15.707_963],
                &["A10 10 0 0 1 -10 10", "M-10 10A10 10 0 0 1 -20 0"],
            ),
            (
                "A10 10 0 0 0 20 0",
                &[15.707_963],
                &["A10 10 0 0 0 10 10", "M10 10A10 10 0 0 0 20 0"],
            ),
            (
                "A10 10 0 1 0 2.9289 -7.0711",
                &[15.707_963],
                &["A10 10 0 0 0 10.024 9.9999", "M10.024 9.9999A10 10 0 1 0 2.9289 -7.0711"],
            ),
        ];
        for (p, ts, want) in cases {
            assert_pieces(&parse(p).split_at(ts), want, 1e-3);
        }
    }

    #[test]
    fn transforming() {
        let i = AffineTransform::IDENTITY;
        let cases = [
            (
                "L10 0Q15 10 20 0C23 10 27 10 30 0z",
                i.translate(0.0, 100.0),
                "M0 100L10 100Q15 110 20 100C23 110 27 110 30 100z",
            ),
            ("A10 10 0 0 0 20 0", i.translate(0.0, 10.0), "M0 10A10 10 0 0 0 20 10"),
            ("A10 10 0 0 0 20 0", i.scale(1.0, -1.0), "A10 10 0 0 1 20 0"),
            ("A10 5 0 0 0 20 0", i.rotate(270.0), "A10 5 90 0 0 0 -20"),
            (
                "A10 10 0 0 0 20 0",
                i.rotate(120.0).scale(1.0, -2.0),
                "A20 10 30 0 1 -10 17.3205080757",
            ),
        ];
        for (p, m, want) in cases {
            assert_close(&parse(p).transform(&m), want, 1e-9);
        }
        assert_close(&parse("L10 0").translate(1.0, 2.0), "M1 2L11 2", 1e-10);
        assert_close(&parse("L10 5").scale(2.0, -1.0), "L20 -5", 1e-10);
    }

    #[test]
    fn collapsing_transform_turns_arcs_into_lines() {
        let p = parse("A5 5 0 0 1 10 0").transform(&AffineTransform::IDENTITY.scale(1.0, 0.0));
        assert_eq!(p.segments()[1], Segment::LineTo(Point::new(10.0, 0.0)));
    }
}
