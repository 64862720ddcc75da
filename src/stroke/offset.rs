use crate::geometry::ellipse::{ellipse_curvature_radius, ellipse_normal};
use crate::geometry::{CubicBezier, EllipticArc, QuadBezier};
use crate::math::{Epsilon, Point};
use crate::operations::intersect_segments;
use crate::path::{Path, Segment};

use super::join::Bend;
use super::{Capper, Joiner};

#[derive(Debug, Clone, Copy)]
enum Shape {
    Line,
    Cubic(CubicBezier),
    Arc {
        rx: f64,
        ry: f64,
        phi: f64,
        large: bool,
        sweep: bool,
    },
}

/// One drawn segment with its normals and radii of curvature at both ends.
#[derive(Debug, Clone, Copy)]
struct StrokeState {
    shape: Shape,
    p0: Point,
    p1: Point,
    n0: Point,
    n1: Point,
    r0: f64,
    r1: f64,
}

impl StrokeState {
    fn line(p0: Point, p1: Point, half_width: f64) -> Self {
        let n = (p1 - p0).rot90cw().norm(half_width);
        Self {
            shape: Shape::Line,
            p0,
            p1,
            n0: n,
            n1: n,
            r0: f64::NAN,
            r1: f64::NAN,
        }
    }

    fn cubic(cubic: CubicBezier, half_width: f64, eps: Epsilon) -> Self {
        Self {
            shape: Shape::Cubic(cubic),
            p0: cubic.p0,
            p1: cubic.p3,
            n0: cubic.start_normal(half_width),
            n1: cubic.end_normal(half_width),
            r0: cubic.curvature_radius(0.0, eps),
            r1: cubic.curvature_radius(1.0, eps),
        }
    }
}

/// Drawn segments of a single subpath and whether it is closed.
fn stroke_states(p: &Path, half_width: f64) -> (Vec<StrokeState>, bool) {
    let eps = p.epsilon();
    let mut closed = false;
    let mut states = Vec::new();
    for (start, seg) in p.iter() {
        match seg {
            Segment::MoveTo(_) => {}
            Segment::LineTo(end) => states.push(StrokeState::line(start, end, half_width)),
            Segment::QuadTo(cp, end) => {
                let cubic = QuadBezier::new(start, cp, end).to_cubic();
                states.push(StrokeState::cubic(cubic, half_width, eps));
            }
            Segment::CubeTo(cp1, cp2, end) => {
                let cubic = CubicBezier::new(start, cp1, cp2, end);
                states.push(StrokeState::cubic(cubic, half_width, eps));
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
                states.push(StrokeState {
                    shape: Shape::Arc {
                        rx,
                        ry,
                        phi,
                        large,
                        sweep,
                    },
                    p0: start,
                    p1: end,
                    n0: ellipse_normal(rx, ry, phi, sweep, theta0, half_width),
                    n1: ellipse_normal(rx, ry, phi, sweep, theta1, half_width),
                    r0: ellipse_curvature_radius(rx, ry, sweep, theta0, eps),
                    r1: ellipse_curvature_radius(rx, ry, sweep, theta1, eps),
                });
            }
            Segment::Close(end) => {
                if !start.equals(end, eps) {
                    states.push(StrokeState::line(start, end, half_width));
                }
                closed = true;
            }
        }
    }
    (states, closed)
}

/// Cuts off the inner corner of a bend where the rail crosses itself.
///
/// `i` indexes the line added by the joiner on the inner side of the bend. When
/// the segments before and after it cross in a single point, the rail is
/// shortcut through that point. Only line-line bends are handled.
fn optimize_inner_bend(p: &mut Path, i: usize) {
    let n = p.len();
    if i < 2 || n <= i {
        return;
    }
    let eps = p.epsilon();
    let segs = p.segments();
    let a = segs[i - 1];
    let a0 = p.seg_start(i - 1);
    // a bend at the end of a closed rail wraps to the first segment
    let wraps = i + 1 == n;
    let (b0, b) = if wraps {
        (segs[0].end(), segs[1])
    } else {
        (segs[i].end(), segs[i + 1])
    };

    let is_line = |s: &Segment| matches!(s, Segment::LineTo(_) | Segment::Close(_));
    if !is_line(&a) || !is_line(&b) || (wraps && !matches!(segs[i], Segment::Close(_))) {
        return;
    }
    let Ok(zs) = intersect_segments(a0, &a, b0, &b, eps) else {
        return;
    };
    let [z] = zs.as_slice() else {
        return;
    };
    let interior = |t: f64| eps.interval_exclusive(t, 0.0, 1.0);
    if !interior(z.t[0]) || !interior(z.t[1]) {
        return;
    }

    let mut segs = p.segments().to_vec();
    if wraps {
        segs.truncate(i);
        segs[i - 1] = Segment::Close(z.point);
        segs[0] = Segment::MoveTo(z.point);
    } else {
        segs[i - 1] = match a {
            Segment::Close(_) => Segment::Close(z.point),
            _ => Segment::LineTo(z.point),
        };
        segs.remove(i);
    }
    *p = Path::from_segments(segs, eps);
}

impl Path {
    /// Offset rails to the right (`rhs`) and left (`lhs`) of a single subpath at
    /// distance `half_width`, joining segments with `joiner`.
    ///
    /// Curves are flattened within `tolerance`. For a closed subpath both rails
    /// are closed. An open subpath with `stroke_open` set yields its outline in
    /// `rhs`, capped with `capper` at both ends, and no `lhs`.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn rails(
        &self,
        half_width: f64,
        capper: Capper,
        joiner: Joiner,
        stroke_open: bool,
        tolerance: f64,
    ) -> (Path, Option<Path>) {
        let eps = self.epsilon();
        let (states, closed) = stroke_states(self, half_width);
        let mut rhs = self.empty_like();
        let mut lhs = self.empty_like();
        let (Some(first), Some(last)) = (states.first().copied(), states.last().copied()) else {
            return (rhs, Some(lhs));
        };

        let r_start = first.p0 + first.n0;
        let l_start = first.p0 - first.n0;
        rhs.move_to(r_start.x, r_start.y);
        lhs.move_to(l_start.x, l_start.y);

        let mut rhs_join = None;
        let mut lhs_join = None;
        for (i, cur) in states.iter().enumerate() {
            match cur.shape {
                Shape::Line => {
                    let r_end = cur.p1 + cur.n1;
                    let l_end = cur.p1 - cur.n1;
                    rhs.line_to(r_end.x, r_end.y);
                    lhs.line_to(l_end.x, l_end.y);
                }
                Shape::Cubic(cubic) => {
                    for q in cubic.stroke(half_width, tolerance, eps).iter().skip(1) {
                        rhs.line_to(q.x, q.y);
                    }
                    for q in cubic.stroke(-half_width, tolerance, eps).iter().skip(1) {
                        lhs.line_to(q.x, q.y);
                    }
                }
                Shape::Arc {
                    rx,
                    ry,
                    phi,
                    large,
                    sweep,
                } => {
                    let r_start = cur.p0 + cur.n0;
                    let l_start = cur.p0 - cur.n0;
                    let r_end = cur.p1 + cur.n1;
                    let l_end = cur.p1 - cur.n1;
                    // the right side lies outwards of a counter clockwise arc
                    let dr = if sweep { half_width } else { -half_width };

                    let mut r_lambda =
                        EllipticArc::new(r_start, rx + dr, ry + dr, phi, large, sweep, r_end)
                            .radii_correction();
                    let mut l_lambda =
                        EllipticArc::new(l_start, rx - dr, ry - dr, phi, large, sweep, l_end)
                            .radii_correction();
                    if r_lambda <= 1.0 && l_lambda <= 1.0 {
                        r_lambda = 1.0;
                        l_lambda = 1.0;
                    }
                    rhs.arc_to_radians(
                        r_lambda * (rx + dr),
                        r_lambda * (ry + dr),
                        phi,
                        large,
                        sweep,
                        r_end,
                    );
                    lhs.arc_to_radians(
                        l_lambda * (rx - dr),
                        l_lambda * (ry - dr),
                        phi,
                        large,
                        sweep,
                        l_end,
                    );
                }
            }

            if 0 < i {
                let prev = &states[i - 1];
                let cw = 0.0 <= prev.n1.rot90cw().dot(cur.n0);
                match (cw, rhs_join, lhs_join) {
                    (true, Some(j), _) => optimize_inner_bend(&mut rhs, j),
                    (false, _, Some(j)) => optimize_inner_bend(&mut lhs, j),
                    _ => {}
                }
            }
            rhs_join = None;
            lhs_join = None;

            let next = if i + 1 < states.len() {
                Some(&states[i + 1])
            } else if closed {
                Some(&first)
            } else {
                None
            };
            if let Some(next) = next {
                if !cur.n1.equals(next.n0, eps) {
                    rhs_join = Some(rhs.len());
                    lhs_join = Some(lhs.len());
                    let bend = Bend {
                        pivot: cur.p1,
                        n0: cur.n1,
                        n1: next.n0,
                        r0: cur.r1,
                        r1: next.r0,
                    };
                    joiner.join(&mut rhs, &mut lhs, half_width, &bend);
                }
            }
        }

        if closed {
            rhs.close();
            lhs.close();
            if 1 < states.len() {
                let cw = 0.0 <= last.n1.rot90cw().dot(first.n0);
                match (cw, rhs_join, lhs_join) {
                    (true, Some(j), _) => optimize_inner_bend(&mut rhs, j),
                    (false, _, Some(j)) => optimize_inner_bend(&mut lhs, j),
                    _ => {}
                }
            }
            rhs.optimize_close();
            lhs.optimize_close();
            (rhs, Some(lhs))
        } else if stroke_open {
            let lhs = lhs.reverse();
            capper.cap(&mut rhs, half_width, last.p1, last.n1);
            let mut outline = rhs.join(&lhs);
            capper.cap(&mut outline, half_width, first.p0, -first.n0);
            outline.close();
            outline.optimize_close();
            (outline, None)
        } else {
            (rhs, Some(lhs))
        }
    }
}
