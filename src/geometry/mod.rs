pub mod bezier;
pub mod ellipse;
pub mod rect;

pub use bezier::{CubicBezier, QuadBezier};
pub use ellipse::EllipticArc;
pub use rect::Rect;
