use std::fmt::{self, Write};

use super::{Path, Segment};
use crate::geometry::{EllipticArc, QuadBezier};
use crate::math::{Epsilon, Point};

/// Formats `v` with at most eight significant digits and no trailing zeros.
pub(crate) fn format_number(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return if v.is_finite() { "0".to_owned() } else { v.to_string() };
    }
    let magnitude = v.abs().log10().floor() as i32 + 1;
    let decimals = usize::try_from(8 - magnitude).unwrap_or(0);
    let mut s = format!("{v:.decimals$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s.remove(0);
    }
    s
}

/// Rounds `v` to the nearest integer when within epsilon of it, so that
/// rounding noise such as `-6.7e-16` is written as `0`.
fn snap(v: f64, eps: Epsilon) -> f64 {
    let r = v.round();
    if eps.equal(v, r) {
        r
    } else {
        v
    }
}

fn flag(b: bool) -> char {
    if b {
        '1'
    } else {
        '0'
    }
}

/// Control points of a curve command as a cubic, quadratics are degree elevated.
fn cubic_controls(start: Point, seg: &Segment) -> Option<(Point, Point, Point)> {
    match *seg {
        Segment::QuadTo(cp, end) => {
            let c = QuadBezier::new(start, cp, end).to_cubic();
            Some((c.p1, c.p2, c.p3))
        }
        Segment::CubeTo(cp1, cp2, end) => Some((cp1, cp2, end)),
        _ => None,
    }
}

impl fmt::Display for Path {
    /// Writes every segment verbatim in SVG-like notation, arc rotations in degrees.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segs {
            match *seg {
                Segment::MoveTo(p) => write!(f, "M{} {}", p.x, p.y)?,
                Segment::LineTo(p) => write!(f, "L{} {}", p.x, p.y)?,
                Segment::QuadTo(cp, p) => write!(f, "Q{} {} {} {}", cp.x, cp.y, p.x, p.y)?,
                Segment::CubeTo(cp1, cp2, p) => write!(
                    f,
                    "C{} {} {} {} {} {}",
                    cp1.x, cp1.y, cp2.x, cp2.y, p.x, p.y
                )?,
                Segment::ArcTo {
                    rx,
                    ry,
                    phi,
                    large,
                    sweep,
                    end,
                } => write!(
                    f,
                    "A{} {} {} {} {} {} {}",
                    rx,
                    ry,
                    phi.to_degrees(),
                    flag(large),
                    flag(sweep),
                    end.x,
                    end.y
                )?,
                Segment::Close(_) => f.write_str("z")?,
            }
        }
        Ok(())
    }
}

impl Path {
    /// Minified SVG path data.
    ///
    /// Axis-aligned lines become `H`/`V`, zero-length lines are dropped and arc flags
    /// are written without separators.
    #[must_use]
    pub fn to_svg(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let eps = self.eps;
        let n = |v: f64| format_number(snap(v, eps));
        let mut sb = String::new();
        for (start, seg) in self.iter() {
            // writing to a String cannot fail
            let _ = match seg {
                Segment::MoveTo(p) => write!(sb, "M{} {}", n(p.x), n(p.y)),
                Segment::LineTo(p) => {
                    let same_x = self.eps.equal(p.x, start.x);
                    let same_y = self.eps.equal(p.y, start.y);
                    match (same_x, same_y) {
                        (true, true) => Ok(()),
                        (true, false) => write!(sb, "V{}", n(p.y)),
                        (false, true) => write!(sb, "H{}", n(p.x)),
                        (false, false) => write!(sb, "L{} {}", n(p.x), n(p.y)),
                    }
                }
                Segment::QuadTo(cp, p) => {
                    write!(sb, "Q{} {} {} {}", n(cp.x), n(cp.y), n(p.x), n(p.y))
                }
                Segment::CubeTo(cp1, cp2, p) => write!(
                    sb,
                    "C{} {} {} {} {} {}",
                    n(cp1.x),
                    n(cp1.y),
                    n(cp2.x),
                    n(cp2.y),
                    n(p.x),
                    n(p.y)
                ),
                Segment::ArcTo {
                    mut rx,
                    mut ry,
                    phi,
                    large,
                    sweep,
                    end,
                } => {
                    let mut rot = phi.to_degrees();
                    if 90.0 <= rot {
                        std::mem::swap(&mut rx, &mut ry);
                        rot -= 90.0;
                    }
                    write!(
                        sb,
                        "A{} {} {} {}{}{} {}",
                        n(rx),
                        n(ry),
                        n(rot),
                        flag(large),
                        flag(sweep),
                        n(end.x),
                        n(end.y)
                    )
                }
                Segment::Close(_) => write!(sb, "z"),
            };
        }
        sb
    }

    /// PostScript path construction operators.
    ///
    /// Quadratic curves are elevated to `curveto`; arcs use the `ellipse`/`ellipsen`
    /// procedures taking the center, radii, start and end angle and rotation.
    #[must_use]
    pub fn to_ps(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let eps = self.eps;
        let n = |v: f64| format_number(snap(v, eps));
        let mut parts = Vec::with_capacity(self.segs.len());
        for (start, seg) in self.iter() {
            let part = match seg {
                Segment::MoveTo(p) => format!("{} {} moveto", n(p.x), n(p.y)),
                Segment::LineTo(p) => format!("{} {} lineto", n(p.x), n(p.y)),
                Segment::QuadTo(..) | Segment::CubeTo(..) => {
                    let Some((cp1, cp2, p)) = cubic_controls(start, &seg) else {
                        continue;
                    };
                    format!(
                        "{} {} {} {} {} {} curveto",
                        n(cp1.x),
                        n(cp1.y),
                        n(cp2.x),
                        n(cp2.y),
                        n(p.x),
                        n(p.y)
                    )
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
                    let (center, theta0, theta1) = arc.to_center(self.eps);
                    format!(
                        "{} {} {} {} {} {} {} {}",
                        n(center.x),
                        n(center.y),
                        n(rx),
                        n(ry),
                        n(theta0.to_degrees()),
                        n(theta1.to_degrees()),
                        n(phi.to_degrees()),
                        if sweep { "ellipse" } else { "ellipsen" }
                    )
                }
                Segment::Close(_) => "closepath".to_owned(),
            };
            parts.push(part);
        }
        parts.join(" ")
    }

    /// PDF content stream path operators, arcs are replaced by cubic curves first.
    #[must_use]
    pub fn to_pdf(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let eps = self.eps;
        let n = |v: f64| format_number(snap(v, eps));
        let p = self.replace_arcs();
        let mut parts = Vec::with_capacity(p.segs.len());
        for (start, seg) in p.iter() {
            let part = match seg {
                Segment::MoveTo(p) => format!("{} {} m", n(p.x), n(p.y)),
                Segment::LineTo(p) => format!("{} {} l", n(p.x), n(p.y)),
                Segment::Close(_) => "h".to_owned(),
                _ => {
                    let Some((cp1, cp2, p)) = cubic_controls(start, &seg) else {
                        continue;
                    };
                    format!(
                        "{} {} {} {} {} {} c",
                        n(cp1.x),
                        n(cp1.y),
                        n(cp2.x),
                        n(cp2.y),
                        n(p.x),
                        n(p.y)
                    )
                }
            };
            parts.push(part);
        }
        parts.join(" ")
    }
}
