use std::f64::consts::PI;

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::error::Result;
use crate::geometry::ellipse::{ellipse_deriv, ellipse_pos};
use crate::geometry::{CubicBezier, EllipticArc, QuadBezier};
use crate::math::angle::angle_norm;
use crate::math::{Epsilon, Point};
use crate::operations::intersect_segments;
use crate::path::{segment_direction, segment_fast_bounds, FillRule, Path, Segment};

/// Distance of the fill probes from a piece, in multiples of epsilon.
const PROBE_DISTANCE: f64 = 1e4;

/// Distance below which piece end points are merged, in multiples of epsilon.
const SNAP_DISTANCE: f64 = 1e3;

slotmap::new_key_type! {
    struct VertexId;
    struct PieceId;
}

#[derive(Debug, Clone, Copy)]
struct Cut {
    t: f64,
    point: Point,
}

/// A kept piece of a segment running from vertex `from` to vertex `to`.
#[derive(Debug, Clone, Copy)]
struct Piece {
    from: VertexId,
    to: VertexId,
    seg: Segment,
}

/// Arena of kept pieces and the vertices they connect.
#[derive(Debug, Default)]
struct PieceGraph {
    vertices: SlotMap<VertexId, Point>,
    pieces: SlotMap<PieceId, Piece>,
}

impl PieceGraph {
    /// Returns the vertex at `p`, adding one unless an existing vertex lies within `snap`.
    fn vertex(&mut self, p: Point, snap: Epsilon) -> VertexId {
        if let Some(id) = self
            .vertices
            .iter()
            .find_map(|(id, q)| q.equals(p, snap).then_some(id))
        {
            return id;
        }
        self.vertices.insert(p)
    }

    fn position(&self, id: VertexId) -> Point {
        self.vertices.get(id).copied().unwrap_or_default()
    }

    /// Adds a piece from `start` along `seg`, unless it is degenerate or already present.
    fn add(&mut self, start: Point, seg: &Segment, snap: Epsilon) {
        let from = self.vertex(start, snap);
        let to = self.vertex(seg.end(), snap);
        if from == to {
            return;
        }
        let seg = with_end(seg, self.position(to));
        let duplicate = self
            .pieces
            .values()
            .any(|q| q.from == from && q.to == to && q.seg.equals(&seg, snap));
        if !duplicate {
            self.pieces.insert(Piece { from, to, seg });
        }
    }

    /// Direction of travel of a piece at its start (`t = 0`) or end (`t = 1`), in radians.
    fn angle(&self, piece: &Piece, t: f64, eps: Epsilon) -> f64 {
        segment_direction(self.position(piece.from), &piece.seg, t, eps).angle()
    }

    /// Removes and returns the piece leaving `at` with the sharpest left turn
    /// coming in along `incoming`.
    fn take_next(&mut self, at: VertexId, incoming: f64, eps: Epsilon) -> Option<Piece> {
        let id = self
            .pieces
            .iter()
            .filter(|(_, q)| q.from == at)
            .map(|(id, q)| (id, angle_norm(self.angle(q, 0.0, eps) - incoming - PI)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)?;
        self.pieces.remove(id)
    }
}

fn with_end(seg: &Segment, end: Point) -> Segment {
    match *seg {
        Segment::MoveTo(_) => Segment::MoveTo(end),
        Segment::LineTo(_) => Segment::LineTo(end),
        Segment::QuadTo(cp, _) => Segment::QuadTo(cp, end),
        Segment::CubeTo(cp1, cp2, _) => Segment::CubeTo(cp1, cp2, end),
        Segment::ArcTo {
            rx,
            ry,
            phi,
            large,
            sweep,
            ..
        } => Segment::ArcTo {
            rx,
            ry,
            phi,
            large,
            sweep,
            end,
        },
        Segment::Close(_) => Segment::Close(end),
    }
}

/// The segment from `start` run backwards, ending at `start`.
fn reversed(start: Point, seg: &Segment) -> Segment {
    match *seg {
        Segment::MoveTo(_) => Segment::MoveTo(start),
        Segment::LineTo(_) | Segment::Close(_) => Segment::LineTo(start),
        Segment::QuadTo(cp, _) => Segment::QuadTo(cp, start),
        Segment::CubeTo(cp1, cp2, _) => Segment::CubeTo(cp2, cp1, start),
        Segment::ArcTo {
            rx,
            ry,
            phi,
            large,
            sweep,
            ..
        } => Segment::ArcTo {
            rx,
            ry,
            phi,
            large,
            sweep: !sweep,
            end: start,
        },
    }
}

/// Cuts `seg` at the sorted parameters in `cuts`, returning `(start, piece)` pairs.
/// A `Close` is cut into lines.
fn split_segment(start: Point, seg: &Segment, cuts: &[Cut], eps: Epsilon) -> Vec<(Point, Segment)> {
    let mut out = Vec::with_capacity(cuts.len() + 1);
    let mut p0 = start;
    match *seg {
        Segment::MoveTo(_) => {}
        Segment::LineTo(end) | Segment::Close(end) => {
            for cut in cuts {
                out.push((p0, Segment::LineTo(cut.point)));
                p0 = cut.point;
            }
            out.push((p0, Segment::LineTo(end)));
        }
        Segment::QuadTo(cp, end) => {
            let mut rest = QuadBezier::new(start, cp, end);
            let mut t0 = 0.0;
            for cut in cuts {
                let (head, tail) = rest.split((cut.t - t0) / (1.0 - t0));
                out.push((p0, Segment::QuadTo(head.p1, cut.point)));
                rest = tail;
                p0 = cut.point;
                t0 = cut.t;
            }
            out.push((p0, Segment::QuadTo(rest.p1, end)));
        }
        Segment::CubeTo(cp1, cp2, end) => {
            let mut rest = CubicBezier::new(start, cp1, cp2, end);
            let mut t0 = 0.0;
            for cut in cuts {
                let (head, tail) = rest.split((cut.t - t0) / (1.0 - t0));
                out.push((p0, Segment::CubeTo(head.p1, head.p2, cut.point)));
                rest = tail;
                p0 = cut.point;
                t0 = cut.t;
            }
            out.push((p0, Segment::CubeTo(rest.p1, rest.p2, end)));
        }
        Segment::ArcTo {
            rx,
            ry,
            phi,
            large,
            sweep,
            end,
        } => {
            let (_, theta0, theta1) = EllipticArc::new(start, rx, ry, phi, large, sweep, end).to_center(eps);
            let mut theta_start = theta0;
            let piece = |from: f64, to: f64, end: Point| Segment::ArcTo {
                rx,
                ry,
                phi,
                large: PI < (to - from).abs(),
                sweep,
                end,
            };
            for cut in cuts {
                let theta = theta0 + cut.t * (theta1 - theta0);
                out.push((p0, piece(theta_start, theta, cut.point)));
                theta_start = theta;
                p0 = cut.point;
            }
            out.push((p0, piece(theta_start, theta1, end)));
        }
    }
    out
}

/// Point halfway along the segment and the direction of travel there.
fn midpoint(start: Point, seg: &Segment, eps: Epsilon) -> (Point, Point) {
    match *seg {
        Segment::MoveTo(end) => (end, Point::default()),
        Segment::LineTo(end) | Segment::Close(end) => (start.interpolate(end, 0.5), end - start),
        Segment::QuadTo(cp, end) => {
            let quad = QuadBezier::new(start, cp, end);
            (quad.pos(0.5), quad.deriv(0.5))
        }
        Segment::CubeTo(cp1, cp2, end) => {
            let cube = CubicBezier::new(start, cp1, cp2, end);
            (cube.pos(0.5), cube.deriv(0.5))
        }
        Segment::ArcTo {
            rx,
            ry,
            phi,
            large,
            sweep,
            end,
        } => {
            let (center, theta0, theta1) =
                EllipticArc::new(start, rx, ry, phi, large, sweep, end).to_center(eps);
            let theta = (theta0 + theta1) / 2.0;
            (
                ellipse_pos(rx, ry, phi, center, theta),
                ellipse_deriv(rx, ry, phi, sweep, theta),
            )
        }
    }
}

impl Path {
    /// Removes self-intersections and overlaps, keeping the area filled under `rule`.
    ///
    /// Open subpaths are treated as closed. The result consists of closed
    /// subpaths running counter clockwise around filled area and clockwise
    /// around holes, and is filled identically under the non-zero rule.
    ///
    /// All segments are cut where they meet. Pieces separating filled from
    /// unfilled area are kept with the filled side on their left, and the kept
    /// pieces are stitched by taking the sharpest left turn at every vertex.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GeometryError::UnsupportedIntersection`] when two
    /// segments that come close have no intersection solver, such as two cubic
    /// Béziers.
    pub fn settle(&self, rule: FillRule) -> Result<Path> {
        let eps = self.epsilon();
        let snap = Epsilon(SNAP_DISTANCE * eps.0);

        let mut closed = self.empty_like();
        for mut sub in self.split() {
            sub.close();
            closed = closed.append(&sub);
        }

        let segs: Vec<(Point, Segment)> = closed
            .iter()
            .filter(|(start, seg)| match seg {
                Segment::MoveTo(_) => false,
                Segment::Close(end) => !start.equals(*end, eps),
                _ => true,
            })
            .collect();
        let boxes: Vec<_> = segs
            .iter()
            .map(|(start, seg)| segment_fast_bounds(*start, seg, eps).expand(eps.0))
            .collect();

        let mut cuts: Vec<Vec<Cut>> = vec![Vec::new(); segs.len()];
        for (i, (a0, a)) in segs.iter().enumerate() {
            for (j, (b0, b)) in segs.iter().enumerate().skip(i + 1) {
                if !boxes[i].overlaps(&boxes[j]) {
                    continue;
                }
                for z in intersect_segments(*a0, a, *b0, b, eps)? {
                    if eps.interval_exclusive(z.t[0], 0.0, 1.0) {
                        cuts[i].push(Cut {
                            t: z.t[0],
                            point: z.point,
                        });
                    }
                    if eps.interval_exclusive(z.t[1], 0.0, 1.0) {
                        cuts[j].push(Cut {
                            t: z.t[1],
                            point: z.point,
                        });
                    }
                }
            }
        }

        let delta = PROBE_DISTANCE * eps.0;
        let mut graph = PieceGraph::default();
        let mut count = 0;
        for ((start, seg), mut seg_cuts) in segs.iter().zip(cuts) {
            seg_cuts.sort_by(|a, b| a.t.total_cmp(&b.t));
            seg_cuts.dedup_by(|a, b| eps.equal(a.t, b.t));
            for (p0, piece) in split_segment(*start, seg, &seg_cuts, eps) {
                count += 1;
                let (mid, dir) = midpoint(p0, &piece, eps);
                let n = dir.rot90ccw().norm(delta);
                if n.is_zero(eps) {
                    continue;
                }
                let (pl, pr) = (mid + n, mid - n);
                let left = rule.fills(closed.windings(pl.x, pl.y).0);
                let right = rule.fills(closed.windings(pr.x, pr.y).0);
                if left == right {
                    continue;
                }
                if left {
                    graph.add(p0, &piece, snap);
                } else {
                    graph.add(piece.end(), &reversed(p0, &piece), snap);
                }
            }
        }
        let kept = graph.pieces.len();

        let mut out = self.empty_like();
        while let Some(first) = graph.pieces.keys().next() {
            let Some(mut piece) = graph.pieces.remove(first) else {
                break;
            };
            let origin = piece.from;
            let start = graph.position(origin);
            out.move_to(start.x, start.y);
            loop {
                out.push_segment(&piece.seg);
                if piece.to == origin {
                    break;
                }
                let incoming = graph.angle(&piece, 1.0, eps);
                match graph.take_next(piece.to, incoming, eps) {
                    Some(next) => piece = next,
                    None => {
                        trace!(at = %graph.position(piece.to), "contour does not close, closing it");
                        break;
                    }
                }
            }
            out.close();
        }

        debug!(%rule, segments = segs.len(), pieces = count, kept, "settled path");
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::{GeometryError, VecpathError};

    fn parse(s: &str) -> Path {
        Path::parse_svg(s).unwrap()
    }

    fn area(p: &Path) -> f64 {
        // shoelace over a fine flattening, positive for counter clockwise contours
        let flat = p.flatten(1e-4);
        flat.split()
            .iter()
            .map(|sub| {
                let mut pts = sub.coords();
                if sub.closed() {
                    pts.pop();
                }
                let n = pts.len();
                (0..n)
                    .map(|i| pts[i].perp_dot(pts[(i + 1) % n]))
                    .sum::<f64>()
                    / 2.0
            })
            .sum()
    }

    #[test]
    fn simple_shapes_are_kept() {
        let p = parse("M0 0L10 0L10 10L0 10z").settle(FillRule::NonZero).unwrap();
        assert!(p.same(&parse("M0 0L10 0L10 10L0 10z")), "{p}");

        // clockwise input comes out counter clockwise
        let p = parse("M0 0L0 10L10 10L10 0z").settle(FillRule::NonZero).unwrap();
        assert!(p.ccw());
        assert_relative_eq!(area(&p), 100.0, max_relative = 1e-9);
    }

    #[test]
    fn fill_rule_selects_side() {
        let cw = parse("M0 0L0 10L10 10L10 0z");
        assert!(cw.settle(FillRule::Positive).unwrap().is_empty());
        assert_relative_eq!(area(&cw.settle(FillRule::Negative).unwrap()), 100.0, max_relative = 1e-9);
    }

    #[test]
    fn overlapping_squares_merge() {
        let p = parse("M0 0L10 0L10 10L0 10zM5 5L15 5L15 15L5 15z");
        let settled = p.settle(FillRule::NonZero).unwrap();
        assert_eq!(settled.split().len(), 1, "{settled}");
        assert_relative_eq!(area(&settled), 175.0, max_relative = 1e-9);

        // even-odd punches out the overlap, leaving two L-shapes touching at corners
        let settled = p.settle(FillRule::EvenOdd).unwrap();
        assert_relative_eq!(area(&settled), 150.0, max_relative = 1e-9);
        assert!(!settled.contains(7.5, 7.5, FillRule::NonZero));
        assert!(settled.contains(2.5, 2.5, FillRule::NonZero));
        assert!(settled.contains(12.5, 12.5, FillRule::NonZero));
    }

    #[test]
    fn holes_run_clockwise() {
        let p = parse("M0 0L10 0L10 10L0 10zM2 2L8 2L8 8L2 8z");
        let settled = p.settle(FillRule::EvenOdd).unwrap();
        let subs = settled.split();
        assert_eq!(subs.len(), 2, "{settled}");
        assert_eq!(subs.iter().filter(|s| s.ccw()).count(), 1);
        assert_relative_eq!(area(&settled), 64.0, max_relative = 1e-9);
    }

    #[test]
    fn self_intersection_is_removed() {
        // a bow tie winds +1 in one lobe and -1 in the other
        let p = parse("M0 0L10 10L10 0L0 10z");
        let settled = p.settle(FillRule::NonZero).unwrap();
        assert_eq!(settled.split().len(), 2, "{settled}");
        assert!(settled.split().iter().all(Path::ccw));
        assert_relative_eq!(area(&settled), 50.0, max_relative = 1e-9);

        let positive = p.settle(FillRule::Positive).unwrap();
        assert_relative_eq!(area(&positive), 25.0, max_relative = 1e-9);
    }

    #[test]
    fn circles_are_cut_at_their_intersections() {
        let p = Path::circle(0.0, 0.0, 1.0).append(&Path::circle(1.0, 0.0, 1.0));
        let settled = p.settle(FillRule::NonZero).unwrap();
        assert_eq!(settled.split().len(), 1, "{settled}");
        // union of two unit circles one radius apart
        let lens = 2.0 * PI / 3.0 - 3.0_f64.sqrt() / 2.0;
        assert_relative_eq!(area(&settled), 2.0 * PI - lens, max_relative = 1e-3);
    }

    #[test]
    fn open_subpaths_are_closed() {
        let settled = parse("M0 0L10 0L10 10").settle(FillRule::NonZero).unwrap();
        assert!(settled.closed());
        assert_relative_eq!(area(&settled), 50.0, max_relative = 1e-9);
    }

    #[test]
    fn unsupported_pairs_fail() {
        let p = parse("M0 0C10 0 10 10 0 10zM5 -5C-5 -5 -5 15 5 15z");
        assert!(matches!(
            p.settle(FillRule::NonZero),
            Err(VecpathError::Geometry(GeometryError::UnsupportedIntersection { .. }))
        ));
    }
}
