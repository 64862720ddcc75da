use super::Epsilon;

/// Solves `a·x² + b·x + c = 0`.
///
/// Degenerates to the linear equation when `a ≈ 0`. When every term vanishes all
/// `x` satisfy the equation and `(0, NaN)` is returned.
#[must_use]
pub fn solve_quadratic(a: f64, b: f64, c: f64, eps: Epsilon) -> (f64, f64) {
    if eps.equal(a, 0.0) {
        if eps.equal(b, 0.0) {
            if eps.equal(c, 0.0) {
                return (0.0, f64::NAN);
            }
            return (f64::NAN, f64::NAN);
        }
        return (-c / b, f64::NAN);
    }

    if eps.equal(c, 0.0) {
        if eps.equal(b, 0.0) {
            return (0.0, f64::NAN);
        }
        return (0.0, -b / a);
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return (f64::NAN, f64::NAN);
    } else if eps.equal(discriminant, 0.0) {
        return (-b / (2.0 * a), f64::NAN);
    }

    // Citardauq formula: pick the branch where b and the radical share a sign
    // to avoid catastrophic cancellation.
    let mut q = discriminant.sqrt();
    if b < 0.0 {
        q = -q;
    }
    let x1 = -(b + q) / (2.0 * a);
    let x2 = c / (a * x1);
    if x2 < x1 {
        (x2, x1)
    } else {
        (x1, x2)
    }
}

/// Solves `a·x³ + b·x² + c·x + d = 0`, returning up to three real roots in ascending order.
/// Absent roots are `NaN` and come last.
#[must_use]
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64, eps: Epsilon) -> (f64, f64, f64) {
    let mut x1;
    let mut x2 = f64::NAN;
    let mut x3 = f64::NAN;
    if eps.equal(a, 0.0) {
        (x1, x2) = solve_quadratic(b, c, d, eps);
    } else {
        // monic form x³ + b·x² + c·x + d
        let (b, c, d) = (b / a, c / a, d / a);

        // depressed form y³ + c1·y + c0 with x = y - b/3
        let bthird = b / 3.0;
        let c0 = d - bthird * (c - 2.0 * bthird * bthird);
        let c1 = c - b * bthird;
        if eps.equal(c0, 0.0) {
            if c1 < 0.0 {
                let tmp = (-c1).sqrt();
                x1 = -tmp - bthird;
                x2 = tmp - bthird;
                x3 = -bthird;
            } else {
                x1 = -bthird;
            }
        } else if eps.equal(c1, 0.0) {
            x1 = -c0.cbrt() - bthird;
        } else {
            let mut delta = -(4.0 * c1 * c1 * c1 + 27.0 * c0 * c0);
            if eps.equal(delta, 0.0) {
                delta = 0.0;
            }

            if delta < 0.0 {
                // one real root
                let beta_re = -c0 / 2.0;
                let beta_im = (-delta / 108.0).sqrt();
                x1 = (beta_re - beta_im).cbrt() + (beta_re + beta_im).cbrt() - bthird;
            } else if 0.0 < delta {
                // three distinct real roots
                let beta_re = -c0 / 2.0;
                let beta_im = (delta / 108.0).sqrt();
                let theta = beta_im.atan2(beta_re) / 3.0;
                let (sintheta, costheta) = theta.sin_cos();
                let distance = (-c1 / 3.0).sqrt();
                let tmp = distance * sintheta * 3.0_f64.sqrt();
                x1 = 2.0 * distance * costheta - bthird;
                x2 = -distance * costheta - tmp - bthird;
                x3 = -distance * costheta + tmp - bthird;
            } else {
                // a double root and a single root
                let tmp = -3.0 * c0 / (2.0 * c1);
                x1 = tmp - bthird;
                x2 = -2.0 * tmp - bthird;
            }
        }
    }

    let before = |lhs: f64, rhs: f64| rhs < lhs || lhs.is_nan() && !rhs.is_nan();
    if before(x2, x3) {
        std::mem::swap(&mut x2, &mut x3);
    }
    if before(x1, x2) {
        std::mem::swap(&mut x1, &mut x2);
    }
    if before(x2, x3) {
        std::mem::swap(&mut x2, &mut x3);
    }
    (x1, x2, x3)
}

/// Collects the non-NaN roots into a vector, keeping their order.
#[must_use]
pub fn real_roots<const N: usize>(roots: [f64; N]) -> Vec<f64> {
    roots.into_iter().filter(|x| !x.is_nan()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const EPS: Epsilon = Epsilon(1e-10);

    fn same(a: f64, b: f64) -> bool {
        a.is_nan() && b.is_nan() || (a - b).abs() < 1e-9
    }

    #[test]
    fn quadratic() {
        let cases = [
            (0.0, 0.0, 0.0, 0.0, f64::NAN),
            (0.0, 0.0, 1.0, f64::NAN, f64::NAN),
            (0.0, 1.0, 1.0, -1.0, f64::NAN),
            (1.0, 1.0, 0.0, 0.0, -1.0),
            (1.0, -1.0, 0.0, 0.0, 1.0),
            (1.0, -2.0, 1.0, 1.0, f64::NAN),
            (1.0, 1.0, 1.0, f64::NAN, f64::NAN),
            (1.0, 1.0, 0.25, -0.5, f64::NAN),
            (2.0, -5.0, 2.0, 0.5, 2.0),
            (-4.0, 0.0, 0.0, 0.0, f64::NAN),
        ];
        for (a, b, c, e1, e2) in cases {
            let (x1, x2) = solve_quadratic(a, b, c, EPS);
            assert!(same(x1, e1) && same(x2, e2), "{a} {b} {c} => {x1} {x2}");
        }
    }

    #[test]
    fn quadratic_avoids_cancellation() {
        let (x1, x2) = solve_quadratic(1.0, -1e8, 1.0, EPS);
        assert_abs_diff_eq!(x1, 1e-8, epsilon = 1e-20);
        assert_abs_diff_eq!(x2, 1e8, epsilon = 1e-6);
    }

    #[test]
    fn cubic() {
        let cases = [
            (0.0, 0.0, 0.0, 0.0, [0.0, f64::NAN, f64::NAN]),
            (0.0, 1.0, 1.0, 0.25, [-0.5, f64::NAN, f64::NAN]),
            (1.0, 0.0, 0.0, 0.0, [0.0, f64::NAN, f64::NAN]),
            (1.0, 0.0, 0.0, -8.0, [2.0, f64::NAN, f64::NAN]),
            (1.0, -3.0, 3.0, -1.0, [1.0, f64::NAN, f64::NAN]),
            (1.0, -5.0, 8.0, -4.0, [1.0, 2.0, f64::NAN]),
            (1.0, -3.0, -9.0, -5.0, [-1.0, 5.0, f64::NAN]),
            (1.0, -15.0, 75.0, -125.0, [5.0, f64::NAN, f64::NAN]),
            (1.0, -3.0, -6.0, 8.0, [-2.0, 1.0, 4.0]),
            (16.0, -24.0, 24.0, -8.0, [0.5, f64::NAN, f64::NAN]),
            (1.0, 0.0, -7.0, 6.0, [-3.0, 1.0, 2.0]),
        ];
        for (a, b, c, d, e) in cases {
            let (x1, x2, x3) = solve_cubic(a, b, c, d, EPS);
            assert!(
                same(x1, e[0]) && same(x2, e[1]) && same(x3, e[2]),
                "{a} {b} {c} {d} => {x1} {x2} {x3}"
            );
        }
    }

    #[test]
    fn real_roots_drops_nan() {
        assert_eq!(real_roots([1.0, f64::NAN, 2.0]), vec![1.0, 2.0]);
        assert!(real_roots([f64::NAN, f64::NAN]).is_empty());
    }
}
