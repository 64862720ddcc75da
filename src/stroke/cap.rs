use std::fmt;

use crate::math::Point;
use crate::path::Path;

/// Shape added at the open ends of a stroked subpath.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Capper {
    /// Ends flush with the end point.
    #[default]
    Butt,
    /// Half circle around the end point.
    Round,
    /// Half square extending past the end point by half the width.
    Square,
}

impl Capper {
    /// Continues `p` from `pivot + n0` around the end at `pivot` to `pivot - n0`.
    /// The length of `n0` equals `half_width`.
    pub(crate) fn cap(self, p: &mut Path, half_width: f64, pivot: Point, n0: Point) {
        let end = pivot - n0;
        match self {
            Capper::Butt => {
                p.line_to(end.x, end.y);
            }
            Capper::Round => {
                p.arc_to_radians(half_width, half_width, 0.0, false, true, end);
            }
            Capper::Square => {
                let e = n0.rot90ccw();
                let corner0 = pivot + e + n0;
                let corner1 = pivot + e - n0;
                p.line_to(corner0.x, corner0.y);
                p.line_to(corner1.x, corner1.y);
                p.line_to(end.x, end.y);
            }
        }
    }
}

impl fmt::Display for Capper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capper::Butt => "Butt",
            Capper::Round => "Round",
            Capper::Square => "Square",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn capped(capper: Capper) -> Path {
        let mut p = Path::new();
        p.move_to(10.0, -1.0);
        capper.cap(&mut p, 1.0, Point::new(10.0, 0.0), Point::new(0.0, -1.0));
        p
    }

    #[test]
    fn caps() {
        assert!(capped(Capper::Butt).equals(&Path::parse_svg("M10 -1L10 1").unwrap()));
        assert!(capped(Capper::Square).equals(&Path::parse_svg("M10 -1L11 -1L11 1L10 1").unwrap()));
        assert!(capped(Capper::Round).equals(&Path::parse_svg("M10 -1A1 1 0 0 1 10 1").unwrap()));
    }

    #[test]
    fn names() {
        assert_eq!(Capper::default().to_string(), "Butt");
        assert_eq!(Capper::Square.to_string(), "Square");
    }
}
