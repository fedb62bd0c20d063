//! Standard normal density and distribution function for the closed forms.

const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

// Abramowitz and Stegun 7.1.26, |error| <= 1.5e-7
const A1: f64 = 0.254_829_592;
const A2: f64 = -0.284_496_736;
const A3: f64 = 1.421_413_741;
const A4: f64 = -1.453_152_027;
const A5: f64 = 1.061_405_429;
const P: f64 = 0.327_591_1;
// The polynomial at t = 1, in Horner order; dividing by it pins erfc(0) to 1.
const POLY_AT_ZERO: f64 = A1 + (A2 + (A3 + (A4 + A5)));

/// erfc through the rational approximation, normalised so erfc(0) = 1 and
/// reflected for negative inputs so that erfc(-x) = 2 - erfc(x).
#[inline]
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = (1.0 + P * z).recip();
    let poly = A1 + t * (A2 + t * (A3 + t * (A4 + t * A5)));
    let tail = t * (poly / POLY_AT_ZERO) * (-z * z).exp();
    if x < 0.0 {
        2.0 - tail
    } else {
        tail
    }
}

/// Φ(x) = erfc(-x / √2) / 2, accurate to 1e-7.
///
/// Φ(x) + Φ(-x) equals 1 to rounding, so put-call parity holds to machine
/// precision in the Black-Scholes formulas.
///
/// ```
/// use pricer_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-7);
/// assert!(norm_cdf(-3.0) < 0.01);
/// assert!(norm_cdf(3.0) > 0.99);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * std::f64::consts::FRAC_1_SQRT_2)
}

/// φ(x) = exp(-x² / 2) / √(2π).
///
/// ```
/// use pricer_models::analytical::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0) - 0.3989422804).abs() < 1e-10);
/// ```
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cdf_against_reference_values() {
        let table = [
            (0.0, 0.5),
            (1.0, 0.841_344_746_068_542_9),
            (-1.0, 0.158_655_253_931_457_07),
            (2.0, 0.977_249_868_051_820_8),
            (-2.0, 0.022_750_131_948_179_195),
            (3.0, 0.998_650_101_968_369_9),
        ];
        for (x, expected) in table {
            assert_relative_eq!(norm_cdf(x), expected, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_cdf_reflection_holds_to_rounding() {
        assert_eq!(norm_cdf(0.0), 0.5);
        for x in [-3.0, -1.5, -0.5, 0.0, 0.25, 1.0, 2.5] {
            assert_relative_eq!(norm_cdf(x) + norm_cdf(-x), 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_cdf_tails_and_monotonicity() {
        assert!((0.0..1e-6).contains(&norm_cdf(-8.0)));
        assert!(norm_cdf(8.0) > 0.999_999 && norm_cdf(8.0) <= 1.0);

        let grid: Vec<f64> = (-40..=40).map(|i| f64::from(i) * 0.1).collect();
        assert!(grid.windows(2).all(|w| norm_cdf(w[0]) <= norm_cdf(w[1])));
    }

    #[test]
    fn test_pdf_is_even() {
        assert_relative_eq!(norm_pdf(1.0), 0.241_970_724_519_143_4, epsilon = 1e-12);
        assert_eq!(norm_pdf(-1.3), norm_pdf(1.3));
    }
}
