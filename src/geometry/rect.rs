use std::fmt;

use crate::math::{AffineTransform, Point};
use crate::path::Path;

/// An axis-aligned rectangle spanning `(x0, y0)` to `(x1, y1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest rectangle containing all `points`, or `None` when empty.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let start = Rect::new(first.x, first.y, first.x, first.y);
        Some(points.fold(start, |r, p| r.add_point(p)))
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Returns true when the rectangle encloses no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    #[must_use]
    pub fn translate(&self, d: Point) -> Self {
        Rect::new(self.x0 + d.x, self.y0 + d.y, self.x1 + d.x, self.y1 + d.y)
    }

    /// Union with `q`. A rectangle without area does not contribute.
    #[must_use]
    pub fn add(&self, q: &Rect) -> Self {
        if q.is_empty() {
            return *self;
        } else if self.is_empty() {
            return *q;
        }
        Rect::new(
            self.x0.min(q.x0),
            self.y0.min(q.y0),
            self.x1.max(q.x1),
            self.y1.max(q.y1),
        )
    }

    /// Expands to include `p`.
    #[must_use]
    pub fn add_point(&self, p: Point) -> Self {
        Rect::new(
            self.x0.min(p.x),
            self.y0.min(p.y),
            self.x1.max(p.x),
            self.y1.max(p.y),
        )
    }

    /// Grows the rectangle by `d` on every side.
    #[must_use]
    pub fn expand(&self, d: f64) -> Self {
        Rect::new(self.x0 - d, self.y0 - d, self.x1 + d, self.y1 + d)
    }

    /// Bounding box of the transformed corners.
    #[must_use]
    pub fn transform(&self, m: &AffineTransform) -> Self {
        let corners = [
            Point::new(self.x0, self.y0),
            Point::new(self.x1, self.y0),
            Point::new(self.x1, self.y1),
            Point::new(self.x0, self.y1),
        ];
        Rect::from_points(corners.map(|p| m.dot(p))).unwrap_or_default()
    }

    /// Returns true if `p` lies inside or on the border.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        self.x0 <= p.x && p.x <= self.x1 && self.y0 <= p.y && p.y <= self.y1
    }

    #[must_use]
    pub fn contains_rect(&self, q: &Rect) -> bool {
        self.x0 <= q.x0 && q.x1 <= self.x1 && self.y0 <= q.y0 && q.y1 <= self.y1
    }

    /// Returns true if the interiors intersect; touching edges do not overlap.
    #[must_use]
    pub fn overlaps(&self, q: &Rect) -> bool {
        self.x0 < q.x1 && q.x0 < self.x1 && self.y0 < q.y1 && q.y0 < self.y1
    }

    /// Counter clockwise closed path around the rectangle.
    #[must_use]
    pub fn to_path(&self) -> Path {
        let mut p = Path::new();
        p.move_to(self.x0, self.y0);
        p.line_to(self.x1, self.y0);
        p.line_to(self.x1, self.y1);
        p.line_to(self.x0, self.y1);
        p.close();
        p
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            Point::new(self.x0, self.y0),
            Point::new(self.x1, self.y1)
        )
    }
}
