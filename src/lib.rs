pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod path;
pub mod stroke;

pub use error::{Result, VecpathError};
pub use path::{FillRule, Path, Segment};
