mod dash;
mod flatten;
pub mod intersect;
mod markers;
mod winding;

pub use dash::{dash_canonical, Dash};
pub use flatten::Flatten;
pub(crate) use flatten::{polyline, Replacer};
pub use intersect::{intersect_segments, Intersection};
pub use winding::windings;
