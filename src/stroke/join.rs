use std::fmt;

use tracing::trace;

use crate::geometry::ellipse::{ellipse_normal, ellipse_pos};
use crate::geometry::EllipticArc;
use crate::math::angle::angle_norm;
use crate::math::Point;
use crate::operations::intersect::{
    intersection_circle_circle, intersection_ray_circle, intersection_ray_line,
};
use crate::path::Path;

/// Default ratio between miter length and half the stroke width.
pub const DEFAULT_MITER_LIMIT: f64 = 4.0;

/// Joiner used by [`Joiner::Miter`] and [`Joiner::Arcs`] beyond their limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GapJoiner {
    #[default]
    Bevel,
    Round,
}

impl GapJoiner {
    fn joiner(self) -> Joiner {
        match self {
            GapJoiner::Bevel => Joiner::Bevel,
            GapJoiner::Round => Joiner::Round,
        }
    }
}

/// Shape filling the gap at the outer side of a bend between two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Joiner {
    /// Straight line between both offset ends.
    Bevel,
    /// Circular arc around the bend.
    Round,
    /// Extends both sides as lines until they meet. Beyond `limit` times half the
    /// width, `gap` joins instead, or the miter is clipped at the limit when
    /// `gap` is `None`.
    Miter { gap: Option<GapJoiner>, limit: f64 },
    /// Extends both sides as circular arcs following the curvature at the bend,
    /// falling back to a miter between two straight segments.
    Arcs { gap: Option<GapJoiner>, limit: f64 },
}

impl Default for Joiner {
    fn default() -> Self {
        Joiner::miter()
    }
}

impl Joiner {
    /// Miter join falling back to a bevel beyond the default limit.
    #[must_use]
    pub fn miter() -> Self {
        Joiner::Miter {
            gap: Some(GapJoiner::Bevel),
            limit: DEFAULT_MITER_LIMIT,
        }
    }

    /// Miter join clipped at the default limit.
    #[must_use]
    pub fn miter_clip() -> Self {
        Joiner::Miter {
            gap: None,
            limit: DEFAULT_MITER_LIMIT,
        }
    }

    /// Arcs join falling back to a bevel beyond the default limit.
    #[must_use]
    pub fn arcs() -> Self {
        Joiner::Arcs {
            gap: Some(GapJoiner::Bevel),
            limit: DEFAULT_MITER_LIMIT,
        }
    }

    /// Arcs join clipped at the default limit.
    #[must_use]
    pub fn arcs_clip() -> Self {
        Joiner::Arcs {
            gap: None,
            limit: DEFAULT_MITER_LIMIT,
        }
    }

    /// Continues both rails around `bend`. The rails end at `pivot + n0` and
    /// `pivot - n0` and continue to `pivot + n1` and `pivot - n1` respectively.
    pub(crate) fn join(&self, rhs: &mut Path, lhs: &mut Path, half_width: f64, bend: &Bend) {
        match *self {
            Joiner::Bevel => bevel(rhs, lhs, bend),
            Joiner::Round => round(rhs, lhs, half_width, bend),
            Joiner::Miter { gap, limit } => miter(rhs, lhs, half_width, bend, gap, limit),
            Joiner::Arcs { gap, limit } => arcs(rhs, lhs, half_width, bend, gap, limit),
        }
    }
}

impl fmt::Display for Joiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Joiner::Bevel => "Bevel",
            Joiner::Round => "Round",
            Joiner::Miter { gap: Some(_), .. } => "Miter",
            Joiner::Miter { gap: None, .. } => "MiterClip",
            Joiner::Arcs { gap: Some(_), .. } => "Arcs",
            Joiner::Arcs { gap: None, .. } => "ArcsClip",
        };
        f.write_str(name)
    }
}

/// Geometry at the meeting point of two segments.
///
/// Normals point to the right of the direction of travel and have the length
/// of half the stroke width. Radii of curvature are signed, positive for counter
/// clockwise bends, and NaN for straight segments.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bend {
    pub pivot: Point,
    pub n0: Point,
    pub n1: Point,
    pub r0: f64,
    pub r1: f64,
}

impl Bend {
    /// Returns true if the path turns clockwise, or reverses, at the bend.
    pub fn cw(&self) -> bool {
        0.0 <= self.n0.rot90cw().dot(self.n1)
    }
}

fn bevel(rhs: &mut Path, lhs: &mut Path, b: &Bend) {
    let r_end = b.pivot + b.n1;
    let l_end = b.pivot - b.n1;
    rhs.line_to(r_end.x, r_end.y);
    lhs.line_to(l_end.x, l_end.y);
}

fn round(rhs: &mut Path, lhs: &mut Path, half_width: f64, b: &Bend) {
    let r_end = b.pivot + b.n1;
    let l_end = b.pivot - b.n1;
    if b.cw() {
        rhs.line_to(r_end.x, r_end.y);
        lhs.arc_to_radians(half_width, half_width, 0.0, false, false, l_end);
    } else {
        rhs.arc_to_radians(half_width, half_width, 0.0, false, true, r_end);
        lhs.line_to(l_end.x, l_end.y);
    }
}

/// Returns true if a join reaching `d` from the pivot exceeds the limit.
fn beyond_limit(limit: f64, half_width: f64, d: f64) -> bool {
    !limit.is_nan() && limit.max(1.001) * half_width < d.abs()
}

fn miter(
    rhs: &mut Path,
    lhs: &mut Path,
    half_width: f64,
    b: &Bend,
    gap: Option<GapJoiner>,
    limit: f64,
) {
    let eps = rhs.epsilon();
    if b.n0.equals(-b.n1, eps) {
        bevel(rhs, lhs, b);
        return;
    }

    let cw = b.cw();
    // the normals point inwards of a clockwise bend
    let hw = if cw { -half_width } else { half_width };

    // half the angle between the normals, its cosine is sin(θ/2) of the miter limit definition
    let theta = b.n0.angle_between(b.n1) / 2.0;
    let d = hw / theta.cos();
    let clip = beyond_limit(limit, half_width, d);
    if clip {
        if let Some(gap) = gap {
            gap.joiner().join(rhs, lhs, half_width, b);
            return;
        }
    }

    let r_end = b.pivot + b.n1;
    let l_end = b.pivot - b.n1;
    let mid = b.pivot + (b.n0 + b.n1).norm(d);
    let (outer, end) = if cw {
        (&mut *lhs, l_end)
    } else {
        (&mut *rhs, r_end)
    };
    if clip {
        let t = (limit.max(1.001) * half_width / d).abs();
        let mid0 = outer.pos().interpolate(mid, t);
        let mid1 = end.interpolate(mid, t);
        outer.line_to(mid0.x, mid0.y);
        outer.line_to(mid1.x, mid1.y);
    } else {
        outer.line_to(mid.x, mid.y);
    }
    rhs.line_to(r_end.x, r_end.y);
    lhs.line_to(l_end.x, l_end.y);
}

/// Of two points on the circle around `c`, the first one reached when running
/// from `pivot` along the circle.
fn closest_arc_intersection(c: Point, cw: bool, pivot: Point, i0: Point, i1: Point) -> Point {
    let theta_pivot = (pivot - c).angle();
    let mut dtheta0 = (i0 - c).angle() - theta_pivot;
    let mut dtheta1 = (i1 - c).angle() - theta_pivot;
    if cw {
        dtheta0 = -dtheta0;
        dtheta1 = -dtheta1;
    }
    if angle_norm(dtheta1) < angle_norm(dtheta0) {
        i1
    } else {
        i0
    }
}

#[allow(clippy::too_many_lines)]
fn arcs(
    rhs: &mut Path,
    lhs: &mut Path,
    half_width: f64,
    b: &Bend,
    gap: Option<GapJoiner>,
    limit: f64,
) {
    let eps = rhs.epsilon();
    if b.n0.equals(-b.n1, eps) {
        bevel(rhs, lhs, b);
        return;
    } else if b.r0.is_nan() && b.r1.is_nan() {
        miter(rhs, lhs, half_width, b, gap, limit);
        return;
    }

    let cw = b.cw();
    let hw = if cw { -half_width } else { half_width };

    // r is the radius of the path, R the radius of the stroke edge around center c
    let (r0, r1) = (b.r0, b.r1);
    let c0 = b.pivot + b.n0.norm(-r0);
    let c1 = b.pivot + b.n1.norm(-r1);
    let big_r0 = (r0 + hw).abs();
    let big_r1 = (r1 + hw).abs();

    let hits = if r0.is_nan() {
        let line = if cw { b.pivot - b.n0 } else { b.pivot + b.n0 };
        intersection_ray_circle(line, line + b.n0.rot90ccw(), c1, big_r1)
    } else if r1.is_nan() {
        let line = if cw { b.pivot - b.n1 } else { b.pivot + b.n1 };
        intersection_ray_circle(line, line + b.n1.rot90ccw(), c0, big_r0)
    } else {
        intersection_circle_circle(c0, big_r0, c1, big_r1, eps)
    };
    let Some((i0, i1)) = hits else {
        bevel(rhs, lhs, b);
        return;
    };

    let mut mid = if r0.is_nan() {
        closest_arc_intersection(c1, 0.0 <= r1, b.pivot, i0, i1)
    } else {
        closest_arc_intersection(c0, r0 < 0.0, b.pivot, i0, i1)
    };

    let clip = beyond_limit(limit, half_width, (mid - b.pivot).length());
    if clip {
        if let Some(gap) = gap {
            gap.joiner().join(rhs, lhs, half_width, b);
            return;
        }
    }

    let mut mid2 = mid;
    if clip {
        let limit = limit.max(1.001);
        let (start, end) = if cw {
            (b.pivot - b.n0, b.pivot - b.n1)
        } else {
            (b.pivot + b.n0, b.pivot + b.n1)
        };

        let (clip_mid, clip_normal) = if !r0.is_nan() && !r1.is_nan() && (0.0 < r0) == (0.0 < r1) {
            // both circles bend the same way, clip perpendicular to the pivot direction
            let v = (mid - b.pivot).norm(limit * half_width);
            (b.pivot + v, v.rot90ccw())
        } else {
            // follow the circle halfway between both stroke edges
            let r_mid = if r0.is_nan() {
                -(r1 + hw) * 2.0
            } else if r1.is_nan() {
                (r0 + hw) * 2.0
            } else {
                (r0 - r1) / 2.0
            };
            let sweep = 0.0 < r_mid;
            let big_mid = r_mid.abs();
            let arc = EllipticArc::new(b.pivot, big_mid, big_mid, 0.0, false, sweep, mid);
            let (c_mid, theta0, _) = arc.to_center(eps);
            let theta = theta0 + limit * half_width / r_mid;
            (
                ellipse_pos(big_mid, big_mid, 0.0, c_mid, theta),
                ellipse_normal(big_mid, big_mid, 0.0, sweep, theta, 1.0),
            )
        };

        let ray_end = clip_mid + clip_normal;
        let clipped_end = if r1.is_nan() {
            intersection_ray_line(clip_mid, ray_end, mid, end, eps)
        } else {
            intersection_ray_circle(clip_mid, ray_end, c1, big_r1)
                .map(|(i0, i1)| closest_arc_intersection(c1, 0.0 <= r1, b.pivot, i0, i1))
        };
        let clipped_start = if r0.is_nan() {
            intersection_ray_line(clip_mid, ray_end, start, mid, eps)
        } else {
            intersection_ray_circle(clip_mid, ray_end, c0, big_r0)
                .map(|(i0, i1)| closest_arc_intersection(c0, r0 < 0.0, b.pivot, i0, i1))
        };
        let (Some(q0), Some(q1)) = (clipped_start, clipped_end) else {
            trace!(pivot = %b.pivot, r0, r1, "clip line misses the join arcs, using bevel");
            bevel(rhs, lhs, b);
            return;
        };
        mid = q0;
        mid2 = q1;
    }

    let r_end = b.pivot + b.n1;
    let l_end = b.pivot - b.n1;
    let (outer, end) = if cw {
        rhs.line_to(r_end.x, r_end.y);
        (&mut *lhs, l_end)
    } else {
        (&mut *rhs, r_end)
    };
    if r0.is_nan() {
        outer.line_to(mid.x, mid.y);
    } else {
        outer.arc_to_radians(big_r0, big_r0, 0.0, false, 0.0 < r0, mid);
    }
    if clip {
        outer.line_to(mid2.x, mid2.y);
    }
    if r1.is_nan() {
        outer.line_to(end.x, end.y);
    } else {
        outer.arc_to_radians(big_r1, big_r1, 0.0, false, 0.0 < r1, end);
    }
    if !cw {
        lhs.line_to(l_end.x, l_end.y);
    }
}
