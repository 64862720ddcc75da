use crate::geometry::{CubicBezier, EllipticArc, QuadBezier};
use crate::math::{Epsilon, Point};
use crate::path::{Path, Segment};

/// Supplies replacement paths for the segments of a path.
///
/// Each replacement must start at the segment's start point. Returning `None`
/// keeps the segment.
pub(crate) trait Replacer {
    fn line(&self, _start: Point, _end: Point) -> Option<Path> {
        None
    }

    fn quad(&self, _quad: &QuadBezier) -> Option<Path> {
        None
    }

    fn cube(&self, _cube: &CubicBezier) -> Option<Path> {
        None
    }

    fn arc(&self, _arc: &EllipticArc) -> Option<Path> {
        None
    }
}

/// Approximates all curves by line segments within a maximum deviation.
pub struct Flatten {
    tolerance: f64,
}

impl Flatten {
    /// Creates a new `Flatten` operation with the given maximum deviation.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Executes the flattening, returning a path of lines only.
    #[must_use]
    pub fn execute(&self, path: &Path) -> Path {
        path.replace(&FlattenReplacer {
            tolerance: self.tolerance,
            eps: path.epsilon(),
        })
    }
}

struct FlattenReplacer {
    tolerance: f64,
    eps: Epsilon,
}

pub(crate) fn polyline(start: Point, points: &[Point], eps: Epsilon) -> Path {
    let mut q = Path::with_epsilon(eps);
    q.move_to(start.x, start.y);
    for p in points {
        q.line_to(p.x, p.y);
    }
    q
}

impl Replacer for FlattenReplacer {
    fn quad(&self, quad: &QuadBezier) -> Option<Path> {
        let points = quad.flatten(self.tolerance, self.eps);
        Some(polyline(quad.p0, &points, self.eps))
    }

    fn cube(&self, cube: &CubicBezier) -> Option<Path> {
        let points = cube.flatten(self.tolerance, self.eps);
        Some(polyline(cube.p0, &points, self.eps))
    }

    fn arc(&self, arc: &EllipticArc) -> Option<Path> {
        let points = arc.flatten(self.tolerance, self.eps);
        Some(polyline(arc.start, &points, self.eps))
    }
}

struct ArcsToCubes {
    eps: Epsilon,
}

impl Replacer for ArcsToCubes {
    fn arc(&self, arc: &EllipticArc) -> Option<Path> {
        let mut q = Path::with_epsilon(self.eps);
        q.move_to(arc.start.x, arc.start.y);
        for c in arc.to_cubics(self.eps) {
            q.cube_to(c.p1.x, c.p1.y, c.p2.x, c.p2.y, c.p3.x, c.p3.y);
        }
        Some(q)
    }
}

struct XMonotone {
    eps: Epsilon,
}

impl Replacer for XMonotone {
    fn quad(&self, quad: &QuadBezier) -> Option<Path> {
        let mut q = Path::with_epsilon(self.eps);
        q.move_to(quad.p0.x, quad.p0.y);
        for piece in quad.x_monotone(self.eps) {
            q.quad_to(piece.p1.x, piece.p1.y, piece.p2.x, piece.p2.y);
        }
        Some(q)
    }

    fn cube(&self, cube: &CubicBezier) -> Option<Path> {
        let mut q = Path::with_epsilon(self.eps);
        q.move_to(cube.p0.x, cube.p0.y);
        for piece in cube.x_monotone(self.eps) {
            q.cube_to(piece.p1.x, piece.p1.y, piece.p2.x, piece.p2.y, piece.p3.x, piece.p3.y);
        }
        Some(q)
    }

    fn arc(&self, arc: &EllipticArc) -> Option<Path> {
        let mut q = Path::with_epsilon(self.eps);
        q.move_to(arc.start.x, arc.start.y);
        for end in arc.x_monotone(self.eps) {
            q.arc_to_radians(arc.rx, arc.ry, arc.phi, false, arc.sweep, end);
        }
        Some(q)
    }
}

impl Path {
    /// Rebuilds the path with segments swapped for what `replacer` returns.
    ///
    /// A replacement is joined onto the path so far and followed by a line to the
    /// original end point, which the builder drops when it is already there.
    pub(crate) fn replace(&self, replacer: &dyn Replacer) -> Path {
        let mut out = self.empty_like();
        for (start, seg) in self.iter() {
            let q = match seg {
                Segment::MoveTo(_) => None,
                Segment::LineTo(end) => replacer.line(start, end),
                Segment::Close(end) => replacer.line(start, end).map(|mut q| {
                    q.close();
                    q
                }),
                Segment::QuadTo(cp, end) => replacer.quad(&QuadBezier::new(start, cp, end)),
                Segment::CubeTo(cp1, cp2, end) => {
                    replacer.cube(&CubicBezier::new(start, cp1, cp2, end))
                }
                Segment::ArcTo {
                    rx,
                    ry,
                    phi,
                    large,
                    sweep,
                    end,
                } => replacer.arc(&EllipticArc::new(start, rx, ry, phi, large, sweep, end)),
            };
            match q {
                Some(q) => {
                    out = out.join(&q);
                    if let Segment::Close(_) = seg {
                        continue;
                    }
                    let end = seg.end();
                    out.line_to(end.x, end.y);
                }
                None => out.push_segment(&seg),
            }
        }
        out
    }

    /// Replaces all curves by lines deviating at most `tolerance` from them.
    #[must_use]
    pub fn flatten(&self, tolerance: f64) -> Path {
        Flatten::new(tolerance).execute(self)
    }

    /// Replaces arcs by cubic Béziers of at most a quarter turn each.
    #[must_use]
    pub fn replace_arcs(&self) -> Path {
        self.replace(&ArcsToCubes { eps: self.epsilon() })
    }

    /// Splits curves so that every segment is monotone in x.
    #[must_use]
    pub fn x_monotone(&self) -> Path {
        self.replace(&XMonotone { eps: self.epsilon() })
    }
}
