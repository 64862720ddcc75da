use crate::error::{Result, StrokeError};
use crate::math::DEFAULT_TOLERANCE;

use super::{Capper, Joiner};

/// Style parameters for stroking a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    width: f64,
    capper: Capper,
    joiner: Joiner,
    tolerance: f64,
}

impl StrokeStyle {
    /// Creates a stroke style with butt caps, miter joins and the default
    /// flattening tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if `width` is not a positive finite number.
    pub fn new(width: f64) -> Result<Self> {
        if width <= 0.0 || !width.is_finite() {
            return Err(StrokeError::InvalidParameters(format!(
                "stroke width must be positive, got {width}"
            ))
            .into());
        }
        Ok(Self {
            width,
            capper: Capper::default(),
            joiner: Joiner::default(),
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    #[must_use]
    pub fn with_capper(mut self, capper: Capper) -> Self {
        self.capper = capper;
        self
    }

    #[must_use]
    pub fn with_joiner(mut self, joiner: Joiner) -> Self {
        self.joiner = joiner;
        self
    }

    /// Sets the maximum deviation allowed when curves are flattened.
    ///
    /// # Errors
    ///
    /// Returns an error if `tolerance` is not a positive finite number.
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self> {
        if tolerance <= 0.0 || !tolerance.is_finite() {
            return Err(StrokeError::InvalidParameters(format!(
                "stroke tolerance must be positive, got {tolerance}"
            ))
            .into());
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Returns the stroke width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns half the stroke width.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.width * 0.5
    }

    #[must_use]
    pub fn capper(&self) -> Capper {
        self.capper
    }

    #[must_use]
    pub fn joiner(&self) -> Joiner {
        self.joiner
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::VecpathError;

    #[test]
    fn new_with_valid_width() {
        let style = StrokeStyle::new(2.0).unwrap();
        assert!((style.width() - 2.0).abs() < f64::EPSILON);
        assert!((style.half_width() - 1.0).abs() < f64::EPSILON);
        assert_eq!(style.capper(), Capper::Butt);
        assert_eq!(style.joiner(), Joiner::miter());
        assert!((style.tolerance() - DEFAULT_TOLERANCE).abs() < f64::EPSILON);
    }

    #[test]
    fn new_with_zero_width_fails() {
        let result = StrokeStyle::new(0.0);
        assert!(matches!(
            result,
            Err(VecpathError::Stroke(StrokeError::InvalidParameters(_)))
        ));
    }

    #[test]
    fn new_with_negative_or_nan_width_fails() {
        assert!(StrokeStyle::new(-1.0).is_err());
        assert!(StrokeStyle::new(f64::NAN).is_err());
    }

    #[test]
    fn builders() {
        let style = StrokeStyle::new(1.0)
            .unwrap()
            .with_capper(Capper::Round)
            .with_joiner(Joiner::Bevel)
            .with_tolerance(0.5)
            .unwrap();
        assert_eq!(style.capper(), Capper::Round);
        assert_eq!(style.joiner(), Joiner::Bevel);
        assert!((style.tolerance() - 0.5).abs() < f64::EPSILON);
        assert!(style.with_tolerance(0.0).is_err());
    }
}
