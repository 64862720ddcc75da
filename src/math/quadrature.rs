use std::f64::consts::PI;

/// Signature shared by the fixed-order Gauss-Legendre rules.
pub type GaussLegendre = fn(&dyn Fn(f64) -> f64, f64, f64) -> f64;

/// Integrates `f` over `[a, b]` with 3-point Gauss-Legendre quadrature.
#[must_use]
pub fn gauss_legendre3(f: &dyn Fn(f64) -> f64, a: f64, b: f64) -> f64 {
    let c = (b - a) / 2.0;
    let d = (a + b) / 2.0;
    let qd1 = f(-0.774_596_669 * c + d);
    let qd2 = f(d);
    let qd3 = f(0.774_596_669 * c + d);
    c * ((5.0 / 9.0) * (qd1 + qd3) + (8.0 / 9.0) * qd2)
}

/// Integrates `f` over `[a, b]` with 5-point Gauss-Legendre quadrature.
#[must_use]
pub fn gauss_legendre5(f: &dyn Fn(f64) -> f64, a: f64, b: f64) -> f64 {
    let c = (b - a) / 2.0;
    let d = (a + b) / 2.0;
    let qd1 = f(-0.906_179_846 * c + d);
    let qd2 = f(-0.538_469_310 * c + d);
    let qd3 = f(d);
    let qd4 = f(0.538_469_310 * c + d);
    let qd5 = f(0.906_179_846 * c + d);
    c * (0.236_926_885 * (qd1 + qd5) + 0.478_628_670 * (qd2 + qd4) + 0.568_888_889 * qd3)
}

/// Integrates `f` over `[a, b]` with 7-point Gauss-Legendre quadrature.
#[must_use]
pub fn gauss_legendre7(f: &dyn Fn(f64) -> f64, a: f64, b: f64) -> f64 {
    let c = (b - a) / 2.0;
    let d = (a + b) / 2.0;
    let qd1 = f(-0.949_107_912 * c + d);
    let qd2 = f(-0.741_531_186 * c + d);
    let qd3 = f(-0.405_845_151 * c + d);
    let qd4 = f(d);
    let qd5 = f(0.405_845_151 * c + d);
    let qd6 = f(0.741_531_186 * c + d);
    let qd7 = f(0.949_107_912 * c + d);
    c * (0.129_484_966 * (qd1 + qd7)
        + 0.279_705_391 * (qd2 + qd6)
        + 0.381_830_051 * (qd3 + qd5)
        + 0.417_959_184 * qd4)
}

/// Approximates `f` on `[xmin, xmax]` by a Chebyshev polynomial of `n` terms.
///
/// The returned closure clamps its input to `[xmin, xmax]`, and its output to
/// `[ymin, ymax]` unless either bound is NaN.
#[must_use]
pub fn polynomial_chebyshev_approx(
    n: usize,
    f: &dyn Fn(f64) -> f64,
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
) -> impl Fn(f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let nf = n as f64;
    #[allow(clippy::cast_precision_loss)]
    let node = |k: usize| PI * (k as f64 + 0.5) / nf;

    let fs: Vec<f64> = (0..n)
        .map(|k| {
            let u = node(k).cos();
            f(xmin + (xmax - xmin) * (u + 1.0) / 2.0)
        })
        .collect();

    let c: Vec<f64> = (0..n)
        .map(|j| {
            #[allow(clippy::cast_precision_loss)]
            let jf = j as f64;
            let a: f64 = fs
                .iter()
                .enumerate()
                .map(|(k, fk)| fk * (jf * node(k)).cos())
                .sum();
            (2.0 / nf) * a
        })
        .collect();

    let (ymin, ymax) = if ymax < ymin { (ymax, ymin) } else { (ymin, ymax) };
    move |x: f64| {
        let x = x.clamp(xmin.min(xmax), xmax.max(xmin));
        let u = (x - xmin) / (xmax - xmin) * 2.0 - 1.0;
        let theta = u.clamp(-1.0, 1.0).acos();
        let a: f64 = c
            .iter()
            .enumerate()
            .map(|(j, cj)| {
                #[allow(clippy::cast_precision_loss)]
                let jf = j as f64;
                cj * (jf * theta).cos()
            })
            .sum();
        let y = c.first().map_or(0.0, |c0| a - 0.5 * c0);
        if ymin.is_nan() || ymax.is_nan() {
            y
        } else {
            y.clamp(ymin, ymax)
        }
    }
}

/// Builds the inverse of the arc length function of a curve with the given `speed`
/// over parameter range `[tmin, tmax]`.
///
/// Returns a closure mapping a length in `[0, L]` to the curve parameter, and the
/// total length `L`. The parameter range may be decreasing.
#[must_use]
pub fn inv_speed_polynomial_chebyshev_approx(
    n: usize,
    gauss_legendre: GaussLegendre,
    speed: &dyn Fn(f64) -> f64,
    tmin: f64,
    tmax: f64,
) -> (impl Fn(f64) -> f64, f64) {
    let length = |t: f64| gauss_legendre(speed, tmin, t).abs();
    let total = length(tmax);
    let param = |l: f64| bisection(&|t| length(t) - l, tmin, tmax);
    (
        polynomial_chebyshev_approx(n, &param, 0.0, total, tmin, tmax),
        total,
    )
}

/// Finds the root of the increasing function `f` between `xmin` and `xmax`.
///
/// `f(xmin)` must be the lower end, `xmax` may be smaller than `xmin`. Stops after 100
/// iterations or once within 0.1% of the range in either `x` or `f(x)`.
#[must_use]
pub fn bisection(f: &dyn Fn(f64) -> f64, mut xmin: f64, mut xmax: f64) -> f64 {
    const MAX_ITERATIONS: usize = 100;
    const TOLERANCE: f64 = 0.001;

    let tolerance_x = (xmax - xmin).abs() * TOLERANCE;
    let tolerance_y = (f(xmax) - f(xmin)).abs() * TOLERANCE;
    let mut x = (xmin + xmax) / 2.0;
    for _ in 0..MAX_ITERATIONS {
        x = (xmin + xmax) / 2.0;
        let y = f(x);
        if (xmax - xmin).abs() < tolerance_x || y.abs() < tolerance_y {
            break;
        }
        if 0.0 < y {
            xmax = x;
        } else {
            xmin = x;
        }
    }
    x
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn gauss_legendre_log() {
        let f = |x: f64| x.ln();
        assert_abs_diff_eq!(gauss_legendre3(&f, 0.0, 1.0), -0.947_672_383_6, epsilon = 1e-9);
        assert_abs_diff_eq!(gauss_legendre5(&f, 0.0, 1.0), -0.979_000_991_8, epsilon = 1e-9);
        assert_abs_diff_eq!(gauss_legendre7(&f, 0.0, 1.0), -0.988_738_922_3, epsilon = 1e-9);
    }

    #[test]
    fn gauss_legendre_polynomial_is_exact() {
        let f = |x: f64| 3.0 * x * x + 1.0;
        assert_abs_diff_eq!(gauss_legendre3(&f, 0.0, 2.0), 10.0, epsilon = 1e-7);
        assert_abs_diff_eq!(gauss_legendre7(&f, -1.0, 1.0), 4.0, epsilon = 1e-7);
    }

    #[test]
    fn chebyshev_square_is_exact_and_clamped() {
        let f = |x: f64| x * x;
        let g = polynomial_chebyshev_approx(3, &f, 0.0, 11.0, 0.0, 100.0);
        assert_abs_diff_eq!(g(0.0), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(g(5.0), 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(g(10.0), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(g(11.0), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn chebyshev_sine() {
        let f = |x: f64| x.sin();
        let approx = polynomial_chebyshev_approx(10, &f, 0.0, PI, f64::NAN, f64::NAN);
        for x in [0.1, 0.5, 1.0, 2.0, 3.0] {
            assert_abs_diff_eq!(approx(x), x.sin(), epsilon = 1e-6);
        }
    }

    #[test]
    fn inverse_speed_length() {
        let speed = |t: f64| (t.cos().powi(2) + 4.0 * t * t).sqrt();
        let (inv, length) =
            inv_speed_polynomial_chebyshev_approx(15, gauss_legendre7, &speed, 0.0, 2.0 * PI);
        assert_abs_diff_eq!(length, 40.051_641_425_9, epsilon = 1e-3);
        assert_abs_diff_eq!(inv(0.0), 0.0, epsilon = 5e-2);
        assert_abs_diff_eq!(inv(40.051_641), 2.0 * PI, epsilon = 1e-2);
        assert_abs_diff_eq!(inv(10.3539), PI, epsilon = 1e-2);
    }

    #[test]
    fn bisection_sqrt() {
        let x = bisection(&|x| x * x - 2.0, 0.0, 2.0);
        assert_abs_diff_eq!(x, 2.0_f64.sqrt(), epsilon = 3e-3);
    }
}
