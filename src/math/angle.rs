use std::f64::consts::{PI, TAU};

use super::Epsilon;

/// Normalizes `theta` into `[0, 2π)`.
#[must_use]
pub fn angle_norm(theta: f64) -> f64 {
    let theta = theta % TAU;
    if theta < 0.0 {
        theta + TAU
    } else {
        theta
    }
}

/// Returns the fraction along the angle range `(lower, upper)` at which `theta` lies.
/// A range with `upper < lower` runs clockwise.
///
/// The result is snapped to exactly `0.0` or `1.0` when within epsilon. Angles
/// outside the range yield values outside `[0, 1]`.
#[must_use]
pub fn angle_time(theta: f64, lower: f64, upper: f64, eps: Epsilon) -> f64 {
    let (lower, upper, sweep) = if upper < lower {
        (upper, lower, false)
    } else {
        (lower, upper, true)
    };
    let theta = angle_norm(theta - lower + eps.0) - eps.0;
    let span = angle_norm(upper - lower);
    let mut t = theta / span;
    if !sweep {
        t = 1.0 - t;
    }
    if eps.equal(t, 0.0) {
        0.0
    } else if eps.equal(t, 1.0) {
        1.0
    } else {
        t
    }
}

/// Returns true if `theta` lies in the angle range, ends included with epsilon slack.
#[must_use]
pub fn angle_between(theta: f64, lower: f64, upper: f64, eps: Epsilon) -> bool {
    let (lower, upper) = if upper < lower {
        (upper, lower)
    } else {
        (lower, upper)
    };
    let theta = angle_norm(theta - lower + eps.0);
    let upper = angle_norm(upper - lower + 2.0 * eps.0);
    theta <= upper
}

/// Returns true if `theta` lies strictly inside the angle range.
#[must_use]
pub fn angle_between_exclusive(theta: f64, lower: f64, upper: f64) -> bool {
    let (lower, upper) = if upper < lower {
        (upper, lower)
    } else {
        (lower, upper)
    };
    let theta = angle_norm(theta - lower);
    let mut upper = angle_norm(upper - lower);
    if upper == 0.0 {
        upper = TAU;
    }
    0.0 < theta && theta < upper
}

/// Normalizes an ellipse rotation into `[0, π)`, its canonical range.
#[must_use]
pub fn canonical_rotation(phi: f64) -> f64 {
    let phi = angle_norm(phi);
    if PI <= phi {
        phi - PI
    } else {
        phi
    }
}
