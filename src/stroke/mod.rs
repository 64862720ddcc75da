mod cap;
mod join;
mod offset;
mod settle;
mod style;

pub use cap::Capper;
pub use join::{GapJoiner, Joiner, DEFAULT_MITER_LIMIT};
pub use style::StrokeStyle;

use tracing::debug;

use crate::error::{Result, StrokeError};
use crate::geometry::EllipticArc;
use crate::math::{Epsilon, DEFAULT_TOLERANCE};
use crate::operations::{polyline, Replacer};
use crate::path::{FillRule, Path};

/// Flattens elliptical arcs, keeping circular ones.
struct EllipseFlattener {
    tolerance: f64,
    eps: Epsilon,
}

impl Replacer for EllipseFlattener {
    fn arc(&self, arc: &EllipticArc) -> Option<Path> {
        if self.eps.equal(arc.rx, arc.ry) {
            return None;
        }
        let points = arc.flatten(self.tolerance, self.eps);
        Some(polyline(arc.start, &points, self.eps))
    }
}

/// Settles a rail into counter clockwise contours around the area it encloses.
fn settle_rail(rail: &Path, tolerance: f64) -> Result<Path> {
    let rail = rail.replace(&EllipseFlattener {
        tolerance,
        eps: rail.epsilon(),
    });
    let rule = if rail.ccw() {
        FillRule::Positive
    } else {
        FillRule::Negative
    };
    rail.settle(rule)
        .map_err(|err| StrokeError::Failed(err.to_string()).into())
}

/// Strokes a path with a [`StrokeStyle`].
///
/// The stroke covers the area swept by a line of the stroke width dragged along
/// every subpath. It is built from offset rails joined at bends, capped at open
/// ends and settled into simple contours.
#[derive(Debug, Clone, Copy)]
pub struct Stroke {
    style: StrokeStyle,
}

impl Stroke {
    #[must_use]
    pub fn new(style: StrokeStyle) -> Self {
        Self { style }
    }

    /// Returns the outline of the stroke as a path filled with the non-zero
    /// rule.
    ///
    /// Closed subpaths yield an outer contour running counter clockwise and an
    /// inner contour running clockwise. Open subpaths yield a single capped
    /// contour.
    ///
    /// # Errors
    ///
    /// Returns an error if the outline cannot be freed of its
    /// self-intersections.
    pub fn execute(&self, path: &Path) -> Result<Path> {
        let style = &self.style;
        debug!(
            width = style.width(),
            capper = %style.capper(),
            joiner = %style.joiner(),
            segments = path.len(),
            "stroking path"
        );

        let hw = style.half_width();
        let tolerance = style.tolerance();
        let mut q = path.empty_like();
        for sub in path.split() {
            let (rhs, lhs) = sub.rails(hw, style.capper(), style.joiner(), true, tolerance);
            if rhs.is_empty() {
                continue;
            }
            match lhs {
                Some(lhs) => {
                    let (outer, inner) = if sub.ccw() { (rhs, lhs) } else { (lhs, rhs) };
                    q = q.append(&settle_rail(&outer, tolerance)?);
                    q = q.append(&settle_rail(&inner, tolerance)?.reverse());
                }
                None => q = q.append(&settle_rail(&rhs, tolerance)?),
            }
        }

        debug!(segments = q.len(), "stroked path");
        Ok(q)
    }
}

/// Grows (positive width) or shrinks (negative width) the area filled by a
/// path. Open subpaths are displaced to their right side.
#[derive(Debug, Clone, Copy)]
pub struct Offset {
    width: f64,
    rule: FillRule,
    tolerance: f64,
}

impl Offset {
    #[must_use]
    pub fn new(width: f64, rule: FillRule, tolerance: f64) -> Self {
        Self {
            width,
            rule,
            tolerance,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the tolerance is not positive, or if an offset
    /// contour cannot be freed of its self-intersections.
    pub fn execute(&self, path: &Path) -> Result<Path> {
        if self.tolerance <= 0.0 || !self.tolerance.is_finite() || !self.width.is_finite() {
            return Err(StrokeError::InvalidParameters(format!(
                "offset needs a finite width and a positive tolerance, got {} and {}",
                self.width, self.tolerance
            ))
            .into());
        }
        let eps = path.epsilon();
        if eps.equal(self.width, 0.0) {
            return Ok(path.clone());
        }
        debug!(width = self.width, rule = %self.rule, segments = path.len(), "offsetting path");

        let positive = 0.0 < self.width;
        let hw = self.width.abs();
        let filling = path.filling(self.rule);
        let mut q = path.empty_like();
        for (sub, filled) in path.split().iter().zip(filling) {
            let (rhs, lhs) = sub.rails(hw, Capper::Butt, Joiner::Round, false, self.tolerance);
            let closed = sub.closed();
            let rail = match lhs {
                Some(lhs) if closed && (sub.ccw() != filled) == positive => lhs,
                _ => rhs,
            };
            if rail.is_empty() {
                continue;
            }
            if closed {
                let settled = settle_rail(&rail, self.tolerance)?;
                q = q.append(&if filled { settled } else { settled.reverse() });
            } else {
                q = q.append(&rail);
            }
        }

        debug!(segments = q.len(), "offset path");
        Ok(q)
    }
}

impl Path {
    /// Strokes the path with the given width, caps and joins, flattening curves
    /// within `tolerance`. See [`Stroke`].
    ///
    /// # Errors
    ///
    /// Returns an error if `width` or `tolerance` is not a positive finite
    /// number, or if the outline cannot be settled.
    pub fn stroke(&self, width: f64, capper: Capper, joiner: Joiner, tolerance: f64) -> Result<Path> {
        let style = StrokeStyle::new(width)?
            .with_capper(capper)
            .with_joiner(joiner)
            .with_tolerance(tolerance)?;
        Stroke::new(style).execute(self)
    }

    /// Offsets the filled area of the path by `width` with round joins and the
    /// default tolerance. See [`Offset`].
    ///
    /// # Errors
    ///
    /// Returns an error if an offset contour cannot be settled.
    pub fn offset(&self, width: f64, rule: FillRule) -> Result<Path> {
        Offset::new(width, rule, DEFAULT_TOLERANCE).execute(self)
    }
}
