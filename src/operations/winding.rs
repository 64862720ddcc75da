use super::intersect::{intersect_line, Intersection};
use crate::math::Point;
use crate::path::{segment_fast_bounds, FillRule, Path, Segment};

/// Returns true if the ray passes through a vertex of the path at `z`.
#[allow(clippy::float_cmp)]
fn on_vertex(z: &Intersection) -> bool {
    z.t[1] == 0.0 || z.t[1] == 1.0
}

/// Sums the windings of ray intersections as returned by
/// [`Path::ray_intersections`].
///
/// Upward crossings count positive and downward crossings negative. Touching
/// and overlapping contacts do not count. A vertex on the ray is reported by
/// both of its segments and counts once, only when the path passes through it.
/// The second value is true if the ray starts on the path.
#[must_use]
pub fn windings(zs: &[Intersection]) -> (i32, bool) {
    let mut n = 0;
    let mut boundary = false;
    let mut i = 0;
    while i < zs.len() {
        let z = zs[i];
        i += 1;
        if z.t[0] <= 0.0 {
            boundary = true;
            continue;
        }

        let d = if z.is_into() { -1 } else { 1 };
        if !on_vertex(&z) {
            if !z.same && !z.tangent {
                n += d;
            }
            continue;
        }
        if let Some(w) = zs.get(i).filter(|w| on_vertex(w) && w.point == z.point) {
            i += 1;
            if !z.same && !w.same && z.is_into() == w.is_into() {
                n += d;
            }
        }
    }
    (n, boundary)
}

impl Path {
    /// Intersections of the path with the ray from `(x, y)` towards positive x.
    ///
    /// The ray's parameter `t[0]` is zero exactly when the hit is at `(x, y)`
    /// and the segment parameter `t[1]` is exactly zero or one at vertices.
    /// Hits are sorted along the ray, with the two hits of a vertex adjacent
    /// and its point set to the vertex.
    #[must_use]
    pub fn ray_intersections(&self, x: f64, y: f64) -> Vec<Intersection> {
        let eps = self.epsilon();
        let segs = self.segments();
        let origin = Point::new(x, y);
        let far = Point::new(x.max(self.fast_bounds().x1) + 1.0, y);
        let along = |px: f64| {
            if eps.equal(px, x) {
                0.0
            } else {
                ((px - x) / (far.x - x)).clamp(0.0, 1.0)
            }
        };

        // hits with the index of the segment ending at their vertex
        let mut hits: Vec<(Intersection, Option<usize>)> = Vec::new();
        for range in self.subpath_ranges() {
            let drawn: Vec<(usize, Point, Segment)> = range
                .clone()
                .filter_map(|i| {
                    let (start, seg) = (self.seg_start(i), segs[i]);
                    let skip = match seg {
                        Segment::MoveTo(_) => true,
                        Segment::LineTo(end) | Segment::Close(end) => start.equals(end, eps),
                        _ => false,
                    };
                    (!skip).then_some((i, start, seg))
                })
                .collect();
            let Some(&(last, _, last_seg)) = drawn.last() else {
                continue;
            };
            let first = segs[range.start].end();
            let wraps = last_seg.end().equals(first, eps);

            for (k, &(i, start, seg)) in drawn.iter().enumerate() {
                let b = segment_fast_bounds(start, &seg, eps);
                if !eps.interval(y, b.y0, b.y1) || b.x1 + eps.0 < x {
                    continue;
                }
                let mut zs = Vec::new();
                intersect_line(&mut zs, origin, far, start, &seg, eps);
                for mut z in zs {
                    if z.point.x < x - eps.0 {
                        continue;
                    }
                    let vertex = if eps.equal(z.t[1], 0.0) {
                        z.t[1] = 0.0;
                        let key = match k.checked_sub(1) {
                            Some(prev) => drawn[prev].0,
                            None if wraps => last,
                            None => range.start,
                        };
                        Some((start, key))
                    } else if eps.equal(z.t[1], 1.0) {
                        z.t[1] = 1.0;
                        Some((seg.end(), i))
                    } else {
                        None
                    };
                    if let Some((p, _)) = vertex {
                        z.point = p;
                    }
                    z.t[0] = along(z.point.x);
                    hits.push((z, vertex.map(|(_, key)| key)));
                }
            }
        }
        hits.sort_by(|(a, ka), (b, kb)| a.t[0].total_cmp(&b.t[0]).then(ka.cmp(kb)));
        hits.into_iter().map(|(z, _)| z).collect()
    }

    /// Winding number at `(x, y)` summed over all subpaths, counter clockwise
    /// windings being positive.
    ///
    /// The second value is true if the point lies on the path; subpaths passing
    /// through it do not contribute.
    #[must_use]
    pub fn windings(&self, x: f64, y: f64) -> (i32, bool) {
        let mut n = 0;
        let mut boundary = false;
        for p in self.split() {
            let (ni, on_boundary) = windings(&p.ray_intersections(x, y));
            if on_boundary {
                boundary = true;
            } else {
                n += ni;
            }
        }
        (n, boundary)
    }

    /// Number of times the ray from `(x, y)` towards positive x crosses the path.
    ///
    /// Vertices count half for each of their segments and hits at the ray's
    /// start count as boundary instead.
    #[must_use]
    pub fn crossings(&self, x: f64, y: f64) -> (i32, bool) {
        let mut n = 0;
        let mut boundary = false;
        for p in self.split() {
            // in halves
            let mut ni = 0;
            for z in p.ray_intersections(x, y) {
                if z.t[0] <= 0.0 {
                    boundary = true;
                } else if on_vertex(&z) {
                    ni += if z.same { -1 } else { 1 };
                } else if !z.same && !z.tangent {
                    ni += 2;
                }
            }
            n += ni / 2;
        }
        (n, boundary)
    }

    /// Returns true if `(x, y)` is filled under `rule`. Points on the path are
    /// filled.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64, rule: FillRule) -> bool {
        let (n, boundary) = self.windings(x, y);
        boundary || rule.fills(n)
    }

    /// Whether each subpath is filled under `rule`, treating open subpaths as
    /// closed.
    ///
    /// A subpath's own orientation counts as one winding, other subpaths add
    /// their windings at its start point unless it lies on them.
    #[must_use]
    pub fn filling(&self, rule: FillRule) -> Vec<bool> {
        let ps = self.split();
        ps.iter()
            .enumerate()
            .map(|(i, p)| {
                let mut n = if p.ccw() { 1 } else { -1 };
                let pos = p.start_pos();
                for (j, q) in ps.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let (nj, on_boundary) = windings(&q.ray_intersections(pos.x, pos.y));
                    if !on_boundary {
                        n += nj;
                    }
                }
                rule.fills(n)
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Path {
        Path::parse_svg(s).unwrap()
    }

    #[test]
    fn crossings_and_windings() {
        let square = "L10 0L10 10L0 10z";
        let square_cw = "L0 10L10 10L10 0z";
        let cases: &[(&str, (f64, f64), i32, i32, bool)] = &[
            ("L10 10", (2.0, 5.0), 1, 1, false),
            ("L-10 10", (-2.0, 5.0), 0, 0, false),
            ("Q10 5 0 10", (2.0, 5.0), 1, 1, false),
            ("Q-10 5 0 10", (-2.0, 5.0), 0, 0, false),
            ("C10 0 10 10 0 10", (2.0, 5.0), 1, 1, false),
            ("C-10 0 -10 10 0 10", (-2.0, 5.0), 0, 0, false),
            ("A5 5 0 0 1 0 10", (2.0, 5.0), 1, 1, false),
            ("A5 5 0 0 0 0 10", (-2.0, 5.0), 0, 0, false),
            (square, (5.0, 5.0), 1, 1, false),
            (square_cw, (5.0, 5.0), 1, -1, false),
            // on the boundary
            (square, (0.0, 5.0), 1, 0, true),
            (square, (10.0, 5.0), 0, 0, true),
            (square, (0.0, 0.0), 0, 0, true),
            (square, (5.0, 0.0), 0, 0, true),
            (square, (10.0, 0.0), 0, 0, true),
            (square, (0.0, 10.0), 0, 0, true),
            (square, (5.0, 10.0), 0, 0, true),
            (square, (10.0, 10.0), 0, 0, true),
            (square_cw, (0.0, 5.0), 1, 0, true),
            (square_cw, (10.0, 5.0), 0, 0, true),
            (square_cw, (0.0, 0.0), 0, 0, true),
            (square_cw, (5.0, 0.0), 0, 0, true),
            (square_cw, (10.0, 10.0), 0, 0, true),
            // outside
            (square, (-1.0, 0.0), 0, 0, false),
            (square, (-1.0, 5.0), 2, 0, false),
            (square, (-1.0, 10.0), 0, 0, false),
            (square, (11.0, 0.0), 0, 0, false),
            (square, (11.0, 5.0), 0, 0, false),
            (square_cw, (-1.0, 0.0), 0, 0, false),
            (square_cw, (-1.0, 5.0), 2, 0, false),
            (square_cw, (-1.0, 10.0), 0, 0, false),
            ("L10 0L10 10L0 10L1 5z", (0.0, 5.0), 2, 0, false),
            // subpaths
            ("L10 0L10 10L0 10zM2 2L8 2L8 8L2 8z", (1.0, 1.0), 1, 1, false),
            ("L10 0L10 10L0 10zM2 2L8 2L8 8L2 8z", (3.0, 3.0), 2, 2, false),
            ("L10 0L10 10L0 10zM2 2L2 8L8 8L8 2z", (3.0, 3.0), 2, 0, false),
            ("L10 0L10 10L0 10zM2 2L2 8L8 8L8 2z", (0.0, 0.0), 0, 0, true),
            ("L10 0L10 10L0 10zM2 2L2 8L8 8L8 2z", (2.0, 2.0), 1, 1, true),
            ("L10 0L10 10L0 10zM5 5L15 5L15 15L5 15z", (7.5, 5.0), 1, 1, true),
            // through vertices
            ("L5 -5L10 0L5 5z", (5.0, 0.0), 1, 1, false),
            ("L5 -5L10 0L5 5z", (0.0, 0.0), 1, 0, true),
            ("L5 -5L10 0L5 5z", (10.0, 0.0), 0, 0, true),
            ("L5 -5L10 0L5 5z", (5.0, 5.0), 0, 0, true),
            ("L5 5L10 0L5 -5z", (5.0, 0.0), 1, -1, false),
            ("L5 5L10 0L5 -5z", (0.0, 0.0), 1, 0, true),
            ("M10 0A5 5 0 0 0 0 0A5 5 0 0 0 10 0z", (5.0, 0.0), 1, -1, false),
            ("M10 0A5 5 0 0 0 0 0A5 5 0 0 0 10 0z", (10.0, 0.0), 0, 0, true),
            ("M10 0A5 5 0 0 1 0 0A5 5 0 0 1 10 0z", (5.0, 0.0), 1, 1, false),
            ("M10 0A5 5 0 0 1 0 0A5 5 0 0 1 10 0z", (0.0, 0.0), 1, 0, true),
            // self intersecting
            ("L10 10L10 -10L-10 10L-10 -10z", (0.0, 0.0), 1, 0, true),
            ("L10 10L10 -10L-10 10L-10 -10z", (-1.0, 0.0), 3, 1, false),
            ("L10 10L10 -10L-10 10L20 40L20 -40L-10 -10z", (0.0, 0.0), 2, 0, true),
            ("L10 10L10 -10L-10 10L20 40L20 -40L-10 -10z", (1.0, 0.0), 2, -2, false),
            ("L10 10L10 -10L-10 10L20 40L20 -40L-10 -10z", (-1.0, 0.0), 4, 0, false),
        ];
        for &(data, (x, y), crossings, windings, boundary) in cases {
            let p = parse(data);
            assert_eq!(p.crossings(x, y), (crossings, boundary), "crossings of {data} at {x},{y}");
            assert_eq!(p.windings(x, y), (windings, boundary), "windings of {data} at {x},{y}");
        }
    }

    #[test]
    fn vertex_hits_are_paired() {
        let zs = parse("L10 10L10 -10L-10 10L-10 -10z").ray_intersections(-1.0, 0.0);
        assert_eq!(zs.len(), 4);
        let vertices: Vec<usize> = (0..zs.len()).filter(|&i| on_vertex(&zs[i])).collect();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1], vertices[0] + 1);
        assert_eq!(zs[vertices[0]].point, Point::new(0.0, 0.0));
        assert_eq!(zs[vertices[1]].point, Point::new(0.0, 0.0));
        assert!(zs.windows(2).all(|w| w[0].t[0] <= w[1].t[0]));
    }

    #[test]
    fn windings_through_vertices() {
        let diamond = parse("M0 -5L5 0L0 5L-5 0z");
        let zs = diamond.ray_intersections(-10.0, 0.0);
        assert_eq!(zs.iter().filter(|z| on_vertex(z)).count(), 4);
        assert_eq!(windings(&zs), (0, false));
        assert_eq!(windings(&diamond.ray_intersections(0.0, 0.0)).0, 1);
        assert_eq!(parse("M0 0L5 5L10 0z").windings(-1.0, 5.0), (0, false));
    }

    #[test]
    fn touching_curves_do_not_wind() {
        let p = parse("Q5 10 10 0z");
        assert_eq!(p.windings(-1.0, 5.0), (0, false));
        assert_eq!(p.crossings(-1.0, 5.0), (0, false));
        let circle = Path::circle(0.0, 0.0, 5.0);
        assert_eq!(circle.windings(-10.0, 5.0), (0, false));
        assert_eq!(circle.windings(0.0, 0.0).0.abs(), 1);
    }

    #[test]
    fn containment() {
        let p = parse("L10 0L10 10L0 10zM2 2L2 8L8 8L8 2z");
        assert!(p.contains(1.0, 1.0, FillRule::NonZero));
        assert!(!p.contains(5.0, 5.0, FillRule::NonZero));
        assert!(!p.contains(5.0, 5.0, FillRule::EvenOdd));
        assert!(p.contains(2.0, 5.0, FillRule::EvenOdd));
        assert!(!p.contains(20.0, 5.0, FillRule::NonZero));

        let p = parse("L10 0L10 10L0 10zM2 2L8 2L8 8L2 8z");
        assert!(p.contains(5.0, 5.0, FillRule::NonZero));
        assert!(!p.contains(5.0, 5.0, FillRule::EvenOdd));
        assert!(p.contains(5.0, 5.0, FillRule::Positive));
        assert!(!p.contains(5.0, 5.0, FillRule::Negative));
    }

    #[test]
    fn subpath_filling() {
        use FillRule::{EvenOdd, NonZero};
        let cases: &[(&str, &[bool], FillRule)] = &[
            ("M0 0", &[], NonZero),
            ("L10 10z", &[true], NonZero),
            ("C5 0 10 5 10 10z", &[true], NonZero),
            ("Q0 10 10 10z", &[true], NonZero),
            ("A10 10 0 0 1 10 10z", &[true], NonZero),
            ("L10 0L10 10L0 10zM2 2L8 2L8 8L2 8z", &[true, true], NonZero),
            ("L10 0L10 10L0 10zM2 2L8 2L8 8L2 8z", &[true, false], EvenOdd),
            ("L10 0L10 10L0 10zM2 2L2 8L8 8L8 2z", &[true, false], NonZero),
            ("L10 0L10 10L0 10zM2 2L2 8L8 8L8 2z", &[true, false], EvenOdd),
            ("L10 10L0 20zM2 4L8 10L2 16z", &[true, true], NonZero),
            ("L10 10L0 20zM2 4L8 10L2 16z", &[true, false], EvenOdd),
            ("L10 10L0 20zM2 4L2 16L8 10z", &[true, false], NonZero),
            ("L10 10L0 20zM2 4L10 10L2 16z", &[true, true], NonZero),
            ("L10 10L0 20zM2 4L2 16L10 10z", &[true, false], EvenOdd),
            ("L10 10L0 20zM-1 -2L-1 22L10 10z", &[false, true], NonZero),
            ("L10 10L0 20zM20 0L10 10L20 20z", &[true, true], NonZero),
            ("L10 10zM2 2L8 8z", &[true, true], NonZero),
            ("L10 10zM10 0L5 5L20 10z", &[true, true], NonZero),
            ("L10 -10L20 0L10 10zA10 10 0 0 1 20 0A10 10 0 0 1 0 0z", &[true, true], NonZero),
            ("L10 10L0 20", &[true], NonZero),
            ("L10 10L0 20M0 -5L0 5L-5 0z", &[true, true], NonZero),
            ("L10 10L0 20M0 -5L0 5L5 0z", &[true, true], NonZero),
        ];
        for &(data, want, rule) in cases {
            assert_eq!(parse(data).filling(rule), want, "{data} {rule}");
        }
    }
}
