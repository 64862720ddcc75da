use std::f64::consts::{PI, TAU};

use super::{Path, Segment};
use crate::geometry::ellipse::ellipse_pos;
use crate::geometry::EllipticArc;
use crate::math::angle::canonical_rotation;
use crate::math::{Epsilon, Point, ORIGIN};

impl Path {
    /// Starts a new subpath at `(x, y)`. A trailing `MoveTo` is overwritten.
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        let end = Point::new(x, y);
        if let Some(Segment::MoveTo(p)) = self.segs.last_mut() {
            *p = end;
        } else {
            self.segs.push(Segment::MoveTo(end));
        }
        self
    }

    /// Inserts the implicit `MoveTo` that drawing commands need on an empty or closed path.
    fn ensure_subpath(&mut self) {
        match self.segs.last() {
            None => self.segs.push(Segment::MoveTo(ORIGIN)),
            Some(Segment::Close(end)) => {
                let end = *end;
                self.segs.push(Segment::MoveTo(end));
            }
            _ => {}
        }
    }

    /// Adds a straight line to `(x, y)`.
    ///
    /// Zero-length lines are dropped and a line continuing the previous one in the
    /// same direction extends it instead.
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        let start = self.pos();
        let end = Point::new(x, y);
        if start.equals(end, self.eps) {
            return self;
        }

        let n = self.segs.len();
        if let Some(Segment::LineTo(_)) = self.segs.last() {
            let prev_start = if n >= 2 { self.segs[n - 2].end() } else { ORIGIN };
            let da = start - prev_start;
            let db = end - start;
            // normalized so that very short segments still compare against epsilon
            let div = da.perp_dot(db) / (da.length() * db.length());
            if self.eps.equal(div, 0.0) && 0.0 < da.dot(db) {
                self.segs[n - 1] = Segment::LineTo(end);
                return self;
            }
        }

        self.ensure_subpath();
        self.segs.push(Segment::LineTo(end));
        self
    }

    /// Adds a quadratic Bézier through control point `(cpx, cpy)` to `(x, y)`.
    ///
    /// Degenerates to a line when the control point lies on the chord.
    pub fn quad_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) -> &mut Self {
        let eps = self.eps;
        let start = self.pos();
        let cp = Point::new(cpx, cpy);
        let end = Point::new(x, y);
        if start.equals(end, eps) && start.equals(cp, eps) {
            return self;
        }
        if !start.equals(end, eps)
            && (start.equals(cp, eps) || colinear_from_start(start, cp, end, eps))
            && (end.equals(cp, eps) || colinear_from_end(start, cp, end, eps))
        {
            return self.line_to(x, y);
        }

        self.ensure_subpath();
        self.segs.push(Segment::QuadTo(cp, end));
        self
    }

    /// Adds a cubic Bézier with control points `(cpx1, cpy1)` and `(cpx2, cpy2)`.
    ///
    /// Degenerates to a line when both control points lie on the chord.
    #[allow(clippy::too_many_arguments)]
    pub fn cube_to(
        &mut self,
        cpx1: f64,
        cpy1: f64,
        cpx2: f64,
        cpy2: f64,
        x: f64,
        y: f64,
    ) -> &mut Self {
        let eps = self.eps;
        let start = self.pos();
        let cp1 = Point::new(cpx1, cpy1);
        let cp2 = Point::new(cpx2, cpy2);
        let end = Point::new(x, y);
        if start.equals(end, eps) && start.equals(cp1, eps) && start.equals(cp2, eps) {
            return self;
        }
        let on_chord = |cp: Point| {
            start.equals(cp, eps)
                || end.equals(cp, eps)
                || colinear_from_start(start, cp, end, eps) && colinear_from_end(start, cp, end, eps)
        };
        if !start.equals(end, eps) && on_chord(cp1) && on_chord(cp2) {
            return self.line_to(x, y);
        }

        self.ensure_subpath();
        self.segs.push(Segment::CubeTo(cp1, cp2, end));
        self
    }

    /// Adds an elliptical arc to `(x, y)` in SVG endpoint notation, `rot` in degrees.
    ///
    /// The radii are normalized so that `rx >= ry`, and scaled up when too small to
    /// span the end points. A zero or infinite radius yields a line.
    #[allow(clippy::too_many_arguments)]
    pub fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        rot: f64,
        large: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> &mut Self {
        self.arc_to_radians(rx, ry, rot.to_radians(), large, sweep, Point::new(x, y))
    }

    /// Same as [`Path::arc_to`] with the rotation `phi` in radians.
    pub(crate) fn arc_to_radians(
        &mut self,
        rx: f64,
        ry: f64,
        phi: f64,
        large: bool,
        sweep: bool,
        end: Point,
    ) -> &mut Self {
        let eps = self.eps;
        let start = self.pos();
        if start.equals(end, eps) {
            return self;
        }
        if eps.equal(rx, 0.0) || rx.is_infinite() || eps.equal(ry, 0.0) || ry.is_infinite() {
            return self.line_to(end.x, end.y);
        }

        let (mut rx, mut ry, mut phi) = (rx.abs(), ry.abs(), phi);
        if eps.equal(rx, ry) {
            phi = 0.0;
        } else if rx < ry {
            std::mem::swap(&mut rx, &mut ry);
            phi += PI / 2.0;
        }
        let phi = canonical_rotation(phi);

        let lambda = EllipticArc::new(start, rx, ry, phi, large, sweep, end).radii_correction();
        if lambda > 1.0 {
            rx *= lambda;
            ry *= lambda;
        }

        self.ensure_subpath();
        self.segs.push(Segment::ArcTo {
            rx,
            ry,
            phi,
            large,
            sweep,
            end,
        });
        self
    }

    /// Adds an elliptical arc running from angle `theta0` to `theta1` (degrees, before
    /// rotation) of the ellipse with radii `rx`, `ry` rotated by `rot` degrees.
    ///
    /// The arc is counter clockwise when `theta0 < theta1`. Differences beyond 360°
    /// draw one full ellipse followed by the remainder.
    pub fn arc(&mut self, rx: f64, ry: f64, rot: f64, theta0: f64, theta1: f64) -> &mut Self {
        let phi = rot.to_radians();
        let theta0 = theta0.to_radians();
        let theta1 = theta1.to_radians();
        let dtheta = (theta1 - theta0).abs();

        let sweep = theta0 < theta1;
        let large = dtheta % TAU > PI;
        let p0 = ellipse_pos(rx, ry, phi, ORIGIN, theta0);
        let p1 = ellipse_pos(rx, ry, phi, ORIGIN, theta1);

        let start = self.pos();
        let center = start - p0;
        if dtheta >= TAU {
            let opposite = center - p0;
            self.arc_to(rx, ry, rot, large, sweep, opposite.x, opposite.y);
            self.arc_to(rx, ry, rot, large, sweep, start.x, start.y);
            if self.eps.equal(dtheta % TAU, 0.0) {
                return self;
            }
        }
        let end = center + p1;
        self.arc_to(rx, ry, rot, large, sweep, end.x, end.y)
    }

    /// Closes the current subpath with a line back to its start.
    ///
    /// A final line ending at, or running towards, the start is turned into the
    /// `Close` itself. Closing a lone `MoveTo` removes it.
    pub fn close(&mut self) -> &mut Self {
        let n = self.segs.len();
        match self.segs.last() {
            None | Some(Segment::Close(_)) => return self,
            Some(Segment::MoveTo(_)) => {
                self.segs.pop();
                return self;
            }
            _ => {}
        }

        let end = self.start_pos();
        if let Some(Segment::LineTo(start)) = self.segs.last().copied() {
            if start.equals(end, self.eps) {
                self.segs[n - 1] = Segment::Close(start);
                return self;
            }
            let prev_start = if n >= 2 { self.segs[n - 2].end() } else { ORIGIN };
            if self
                .eps
                .equal((end - start).angle_between(start - prev_start), 0.0)
            {
                self.segs[n - 1] = Segment::Close(end);
                return self;
            }
        }
        self.segs.push(Segment::Close(end));
        self
    }

    /// Moves the start of a closed last subpath forward when its first line continues
    /// the closing line in the same direction.
    pub(crate) fn optimize_close(&mut self) {
        if !self.closed() {
            return;
        }
        let Some(i_move) = self
            .segs
            .iter()
            .rposition(|seg| matches!(seg, Segment::MoveTo(_)))
        else {
            return;
        };

        let n = self.segs.len();
        let end = self.segs[i_move].end();
        if let Some(Segment::LineTo(next_end)) = self.segs.get(i_move + 1).copied() {
            if i_move + 2 < n - 1 {
                let start = self.segs[n - 2].end();
                if self
                    .eps
                    .equal((end - start).angle_between(next_end - end), 0.0)
                {
                    self.segs[n - 1] = Segment::Close(next_end);
                    self.segs[i_move] = Segment::MoveTo(next_end);
                    self.segs.remove(i_move + 1);
                }
            }
        }
    }

    /// Closed rectangle with its lower-left corner at `(x, y)`.
    #[must_use]
    pub fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Path {
        let mut p = Path::new();
        if w == 0.0 || h == 0.0 {
            return p;
        }
        p.move_to(x, y);
        p.line_to(x + w, y);
        p.line_to(x + w, y + h);
        p.line_to(x, y + h);
        p.close();
        p
    }

    /// Closed circle of radius `r` centered at `(cx, cy)`.
    #[must_use]
    pub fn circle(cx: f64, cy: f64, r: f64) -> Path {
        Path::ellipse(cx, cy, r, r)
    }

    /// Closed axis-aligned ellipse centered at `(cx, cy)`.
    #[must_use]
    pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Path {
        let mut p = Path::new();
        if rx == 0.0 || ry == 0.0 {
            return p;
        }
        p.move_to(cx + rx, cy);
        p.arc_to(rx, ry, 0.0, false, true, cx - rx, cy);
        p.arc_to(rx, ry, 0.0, false, true, cx + rx, cy);
        p.close();
        p
    }
}

/// Returns true if `cp` lies in the direction of `end` as seen from `start`.
fn colinear_from_start(start: Point, cp: Point, end: Point, eps: Epsilon) -> bool {
    eps.angle_equal((end - start).angle_between(cp - start), 0.0)
}

/// Returns true if `end` lies in the direction of the chord as seen from `cp`.
fn colinear_from_end(start: Point, cp: Point, end: Point, eps: Epsilon) -> bool {
    eps.angle_equal((end - start).angle_between(end - cp), 0.0)
}
