//! Closed-form quartic solver over the complex numbers.
//!
//! Reduces `a x^4 + b x^3 + c x^2 + d x + e = 0` to a depressed quartic and
//! factors it through the resolvent cubic (Ferrari's method). All four roots
//! are returned; callers decide which ones are real enough to use.

use num_complex::Complex64;

/// Below this magnitude a coefficient of the depressed quartic is zero.
const TOLERANCE: f64 = 1.0e-9;

/// Solve the quartic with leading coefficient `a != 0`.
pub fn solve_quartic(a: f64, b: f64, c: f64, d: f64, e: f64) -> [Complex64; 4] {
    let b = Complex64::from(b / a);
    let c = Complex64::from(c / a);
    let d = Complex64::from(d / a);
    let e = Complex64::from(e / a);

    let b2 = b * b;
    let b3 = b * b2;
    let b4 = b2 * b2;

    // Depressed quartic y^4 + alpha y^2 + beta y + gamma with x = y - b/4
    let alpha = -3.0 / 8.0 * b2 + c;
    let beta = b3 / 8.0 - b * c / 2.0 + d;
    let gamma = -3.0 / 256.0 * b4 + b2 * c / 16.0 - b * d / 4.0 + e;
    let shift = -b / 4.0;
    let alpha2 = alpha * alpha;

    if beta.norm() < TOLERANCE {
        // Biquadratic in y^2
        let rad = (alpha2 - 4.0 * gamma).sqrt();
        let r1 = ((-alpha + rad) / 2.0).sqrt();
        let r2 = ((-alpha - rad) / 2.0).sqrt();
        return [shift + r1, shift - r1, shift + r2, shift - r2];
    }

    let alpha3 = alpha * alpha2;
    let p = -(alpha2 / 12.0 + gamma);
    let q = -alpha3 / 108.0 + alpha * gamma / 3.0 - beta * beta / 8.0;
    let r = -q / 2.0 + (q * q / 4.0 + p * p * p / 27.0).sqrt();
    let u = r.cbrt();

    let mut y = -5.0 / 6.0 * alpha + u;
    if u.norm() < TOLERANCE {
        y -= q.cbrt();
    } else {
        y -= p / (3.0 * u);
    }

    let w = (alpha + 2.0 * y).sqrt();
    let r1 = (-(3.0 * alpha + 2.0 * y + 2.0 * beta / w)).sqrt();
    let r2 = (-(3.0 * alpha + 2.0 * y - 2.0 * beta / w)).sqrt();

    [
        shift + (w - r1) / 2.0,
        shift + (w + r1) / 2.0,
        shift + (-w - r2) / 2.0,
        shift + (-w + r2) / 2.0,
    ]
}
