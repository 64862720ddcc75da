mod builder;
mod edit;
mod export;
mod parse;
mod query;

use std::fmt;
use std::ops::Range;

use crate::math::{Epsilon, Point, ORIGIN};

pub(crate) use export::format_number;
pub(crate) use query::{segment_direction, segment_fast_bounds};

/// A single path command together with its end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubeTo(Point, Point, Point),
    /// Elliptical arc with `rx >= ry`, rotation `phi` in radians within `[0, π)`.
    ArcTo {
        rx: f64,
        ry: f64,
        phi: f64,
        large: bool,
        sweep: bool,
        end: Point,
    },
    /// Closes the subpath, `end` caches the subpath's start position.
    Close(Point),
}

impl Segment {
    /// End point of the command.
    #[must_use]
    pub fn end(&self) -> Point {
        match *self {
            Segment::MoveTo(end)
            | Segment::LineTo(end)
            | Segment::QuadTo(_, end)
            | Segment::CubeTo(_, _, end)
            | Segment::ArcTo { end, .. }
            | Segment::Close(end) => end,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Segment::MoveTo(_) => "MoveTo",
            Segment::LineTo(_) => "LineTo",
            Segment::QuadTo(..) => "QuadTo",
            Segment::CubeTo(..) => "CubeTo",
            Segment::ArcTo { .. } => "ArcTo",
            Segment::Close(_) => "Close",
        }
    }

    /// Applies `f` to every point of the command. Arc radii and flags are kept.
    #[must_use]
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Segment {
        match *self {
            Segment::MoveTo(end) => Segment::MoveTo(f(end)),
            Segment::LineTo(end) => Segment::LineTo(f(end)),
            Segment::QuadTo(cp, end) => Segment::QuadTo(f(cp), f(end)),
            Segment::CubeTo(cp1, cp2, end) => Segment::CubeTo(f(cp1), f(cp2), f(end)),
            Segment::ArcTo {
                rx,
                ry,
                phi,
                large,
                sweep,
                end,
            } => Segment::ArcTo {
                rx,
                ry,
                phi,
                large,
                sweep,
                end: f(end),
            },
            Segment::Close(end) => Segment::Close(f(end)),
        }
    }

    /// All scalar values of the command, used for tolerant comparisons.
    pub(crate) fn values(&self) -> Vec<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match *self {
            Segment::MoveTo(p) | Segment::LineTo(p) | Segment::Close(p) => vec![p.x, p.y],
            Segment::QuadTo(cp, p) => vec![cp.x, cp.y, p.x, p.y],
            Segment::CubeTo(cp1, cp2, p) => vec![cp1.x, cp1.y, cp2.x, cp2.y, p.x, p.y],
            Segment::ArcTo {
                rx,
                ry,
                phi,
                large,
                sweep,
                end,
            } => vec![rx, ry, phi, flag(large), flag(sweep), end.x, end.y],
        }
    }

    /// Returns true if both commands are of the same kind with values equal within `eps`.
    #[must_use]
    pub fn equals(&self, other: &Segment, eps: Epsilon) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
            && self
                .values()
                .iter()
                .zip(other.values())
                .all(|(a, b)| eps.equal(*a, b))
    }
}

/// Rule deciding which winding numbers are filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
    /// Fills counter clockwise windings only.
    Positive,
    /// Fills clockwise windings only.
    Negative,
}

impl FillRule {
    /// Returns true if a point with winding number `windings` is filled.
    #[must_use]
    pub fn fills(self, windings: i32) -> bool {
        match self {
            FillRule::NonZero => windings != 0,
            FillRule::EvenOdd => windings % 2 != 0,
            FillRule::Positive => 0 < windings,
            FillRule::Negative => windings < 0,
        }
    }
}

impl fmt::Display for FillRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FillRule::NonZero => "NonZero",
            FillRule::EvenOdd => "EvenOdd",
            FillRule::Positive => "Positive",
            FillRule::Negative => "Negative",
        };
        f.write_str(name)
    }
}

/// An ordered sequence of subpaths, each starting with a single `MoveTo`.
///
/// The builder methods keep the segments free of no-op commands, so queries can
/// rely on canonical segments.
///
/// Every path carries the [`Epsilon`] it was created with; all derived paths
/// inherit it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segs: Vec<Segment>,
    eps: Epsilon,
}

impl Path {
    /// Creates an empty path with the default epsilon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_epsilon(eps: Epsilon) -> Self {
        Self {
            segs: Vec::new(),
            eps,
        }
    }

    /// Builds a path from raw segments without canonicalization.
    #[must_use]
    pub fn from_segments(segs: Vec<Segment>, eps: Epsilon) -> Self {
        Self { segs, eps }
    }

    #[must_use]
    pub fn epsilon(&self) -> Epsilon {
        self.eps
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segs
    }

    /// Number of segments, `MoveTo` and `Close` included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    /// Returns true if the path holds no drawing command, only a lone `MoveTo` at most.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segs.len() <= 1
    }

    pub fn reset(&mut self) {
        self.segs.clear();
    }

    /// Empty path sharing this path's epsilon.
    #[must_use]
    pub(crate) fn empty_like(&self) -> Path {
        Path::with_epsilon(self.eps)
    }

    /// Current position, the end of the last command.
    #[must_use]
    pub fn pos(&self) -> Point {
        self.segs.last().map_or(ORIGIN, Segment::end)
    }

    /// Start of the current subpath, the position of the last `MoveTo`.
    #[must_use]
    pub fn start_pos(&self) -> Point {
        self.segs
            .iter()
            .rev()
            .find_map(|seg| match seg {
                Segment::MoveTo(p) => Some(*p),
                _ => None,
            })
            .unwrap_or(ORIGIN)
    }

    /// Start point of segment `i`, the end of the previous one.
    pub(crate) fn seg_start(&self, i: usize) -> Point {
        if i == 0 {
            ORIGIN
        } else {
            self.segs[i - 1].end()
        }
    }

    /// Iterates over `(start, segment)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Point, Segment)> + '_ {
        self.segs
            .iter()
            .scan(ORIGIN, |start, seg| {
                let item = (*start, *seg);
                *start = seg.end();
                Some(item)
            })
    }

    /// Index ranges of all subpaths.
    pub(crate) fn subpath_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        for (i, seg) in self.segs.iter().enumerate() {
            if matches!(seg, Segment::MoveTo(_)) && i != 0 {
                ranges.push(start..i);
                start = i;
            }
        }
        if start < self.segs.len() {
            ranges.push(start..self.segs.len());
        }
        ranges
    }

    /// Returns true if the last subpath ends in `Close`.
    #[must_use]
    pub fn closed(&self) -> bool {
        matches!(self.segs.last(), Some(Segment::Close(_)))
    }

    /// Returns true if the last subpath is closed by a zero-length `Close`.
    #[must_use]
    pub fn point_closed(&self) -> bool {
        let n = self.segs.len();
        n >= 2 && self.closed() && self.segs[n - 2].end().equals(self.segs[n - 1].end(), self.eps)
    }

    #[must_use]
    pub fn has_subpaths(&self) -> bool {
        self.segs
            .iter()
            .skip(1)
            .any(|seg| matches!(seg, Segment::MoveTo(_)))
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
    fn emptiness() {
        let mut p = Path::new();
        assert!(p.is_empty());
        p.move_to(5.0, 2.0);
        assert!(p.is_empty());
        p.line_to(6.0, 2.0);
        assert!(!p.is_empty());
        p.reset();
        assert_eq!(p.len(), 0);
    }

    #[test]
    fn closedness() {
        assert!(!parse("M5 0L5 10").closed());
        assert!(parse("M5 0L5 10z").closed());
        assert!(!parse("M5 0L5 10zM5 10").closed());
        assert!(parse("M5 0L5 10zM5 10z").closed());
        assert!(parse("M5 0L5 10L5 0z").closed());
        assert!(!parse("M5 0L5 10L0 0z").point_closed());
    }

    #[test]
    fn positions() {
        let p = parse("M5 0L5 10zM10 10L20 10");
        assert_eq!(p.pos(), Point::new(20.0, 10.0));
        assert_eq!(p.start_pos(), Point::new(10.0, 10.0));
        assert!(p.has_subpaths());
        assert_eq!(p.subpath_ranges(), vec![0..3, 3..5]);
        assert_eq!(Path::new().pos(), ORIGIN);
    }

    #[test]
    fn fill_rules() {
        assert!(FillRule::NonZero.fills(-2));
        assert!(!FillRule::NonZero.fills(0));
        assert!(FillRule::EvenOdd.fills(-1));
        assert!(!FillRule::EvenOdd.fills(2));
        assert!(FillRule::Positive.fills(1));
        assert!(!FillRule::Positive.fills(-1));
        assert!(FillRule::Negative.fills(-1));
        assert_eq!(FillRule::EvenOdd.to_string(), "EvenOdd");
    }
}
