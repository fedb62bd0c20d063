//! Bracketed root finding.

use super::SolverConfig;
use crate::types::SolverError;

/// Brent's method: inverse quadratic or secant steps, with bisection whenever
/// an interpolated step would leave the bracket or stall.
///
/// No derivatives are needed, and convergence is guaranteed for a continuous
/// function whose endpoint values differ in sign. The implied volatility
/// solver inverts every pricer through this type.
///
/// ```
/// use pricer_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
/// let f = |x: f64| x * x * x - x - 2.0;
///
/// let root = solver.find_root(f, 1.0, 2.0).unwrap();
/// assert!(f(root).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver {
    config: SolverConfig,
}

impl BrentSolver {
    /// Solver using `config` for tolerance and iteration cap.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solver with [`SolverConfig::default`].
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Root of `f` between `a` and `b`, in either order.
    ///
    /// Stops once `|f(x)|` or the half-width of the bracket drops below the
    /// tolerance.
    ///
    /// # Errors
    ///
    /// - [`SolverError::NoBracket`] when `f(a)` and `f(b)` share a sign
    /// - [`SolverError::NonFiniteObjective`] when `f` returns NaN or an infinity
    /// - [`SolverError::MaxIterationsExceeded`] when the cap is hit first
    /// - [`SolverError::InvalidInput`] for an invalid configuration
    pub fn find_root<F>(&self, f: F, a: f64, b: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
    {
        self.config.validate()?;
        let tol = self.config.tolerance;

        let (mut a, mut b) = (a, b);
        let (mut fa, mut fb) = (finite(f(a), a, 0)?, finite(f(b), b, 0)?);
        if fa * fb > 0.0 {
            return Err(SolverError::NoBracket { a, b });
        }

        // `b` is the best estimate, `a` the previous one and `c` the end of
        // the bracket opposite `b`. Every trial lands strictly inside [b, c].
        let (mut c, mut fc) = (b, fb);
        let mut step = 0.0;
        let mut last_step = 0.0;

        for iteration in 1..=self.config.max_iterations {
            if fb * fc > 0.0 || c == b {
                c = a;
                fc = fa;
                step = b - a;
                last_step = step;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let slack = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
            let half = 0.5 * (c - b);
            if fb.abs() < tol || half.abs() <= slack {
                return Ok(b);
            }

            let interpolated = if last_step.abs() >= slack && fa.abs() > fb.abs() {
                interpolated_step((a, fa), (b, fb), (c, fc), half, last_step, slack)
            } else {
                None
            };
            match interpolated {
                Some(d) => {
                    last_step = step;
                    step = d;
                }
                None => {
                    step = half;
                    last_step = half;
                }
            }

            a = b;
            fa = fb;
            b += if step.abs() > slack {
                step
            } else {
                slack.copysign(half)
            };
            fb = finite(f(b), b, iteration)?;
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

/// Inverse quadratic step through three distinct points, secant through two.
/// `None` asks for bisection: the step would leave the bracket or shrink it
/// more slowly than halving the previous step.
fn interpolated_step(
    (a, fa): (f64, f64),
    (b, fb): (f64, f64),
    (c, fc): (f64, f64),
    half: f64,
    last_step: f64,
    slack: f64,
) -> Option<f64> {
    let s = fb / fa;
    let (p, q) = if a == c {
        (2.0 * half * s, 1.0 - s)
    } else {
        let (q, r) = (fa / fc, fb / fc);
        (
            s * (2.0 * half * q * (q - r) - (b - a) * (r - 1.0)),
            (q - 1.0) * (r - 1.0) * (s - 1.0),
        )
    };
    // Orient the step towards `c`.
    let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };

    let limit = (3.0 * half * q - (slack * q).abs()).min((last_step * q).abs());
    (2.0 * p < limit).then(|| p / q)
}

#[inline]
fn finite(value: f64, x: f64, iterations: usize) -> Result<f64, SolverError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SolverError::NonFiniteObjective {
            iterations,
            params: vec![x],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, SQRT_2};

    #[test]
    fn test_square_root_of_two() {
        let root = BrentSolver::with_defaults()
            .find_root(|x| x * x - 2.0, 0.0, 2.0)
            .unwrap();
        assert!((root - SQRT_2).abs() < 1e-10, "{root}");
    }

    #[test]
    fn test_bracket_order_is_irrelevant() {
        let solver = BrentSolver::with_defaults();
        let forward = solver.find_root(f64::sin, 3.0, 4.0).unwrap();
        let backward = solver.find_root(f64::sin, 4.0, 3.0).unwrap();
        assert!((forward - PI).abs() < 1e-10);
        assert!((backward - PI).abs() < 1e-10);
    }

    #[test]
    fn test_transcendental_and_endpoint_roots() {
        let solver = BrentSolver::with_defaults();
        let f = |x: f64| x - x.cos();
        assert!(f(solver.find_root(f, 0.0, 1.0).unwrap()).abs() < 1e-10);
        assert!((solver.find_root(|x| x - 1.0, 0.0, 1.0).unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_tight_tolerance() {
        let tol = 1e-12;
        let root = BrentSolver::new(SolverConfig::new(tol, 100))
            .find_root(|x| x * x - 2.0, 0.0, 2.0)
            .unwrap();
        assert!((root * root - 2.0).abs() < tol || (root - SQRT_2).abs() < 2.0 * tol);
    }

    #[test]
    fn test_trials_stay_inside_bracket() {
        let cases: [(fn(f64) -> f64, f64, f64); 3] = [
            (|x| x.sqrt() - 0.2f64.sqrt(), 1e-7, 4.0),
            (|x| (x - 0.3).powi(3), 0.0, 4.0),
            (|x| x.ln() + 5.0, 1e-9, 10.0),
        ];
        for (f, lo, hi) in cases {
            let seen = std::cell::RefCell::new(Vec::new());
            let root = BrentSolver::new(SolverConfig::new(1e-12, 200))
                .find_root(
                    |x| {
                        seen.borrow_mut().push(x);
                        f(x)
                    },
                    lo,
                    hi,
                )
                .unwrap();
            assert!(f(root).abs() < 1e-6, "{root}");
            for x in seen.into_inner() {
                assert!((lo..=hi).contains(&x), "trial {x} left [{lo}, {hi}]");
            }
        }
    }

    // ========================================
    // Failures
    // ========================================

    #[test]
    fn test_same_sign_endpoints() {
        let err = BrentSolver::with_defaults()
            .find_root(|x| x * x + 1.0, -1.0, 1.0)
            .unwrap_err();
        assert_eq!(err, SolverError::NoBracket { a: -1.0, b: 1.0 });
    }

    #[test]
    fn test_nan_endpoint() {
        let err = BrentSolver::with_defaults()
            .find_root(f64::ln, -1.0, 2.0)
            .unwrap_err();
        assert!(matches!(err, SolverError::NonFiniteObjective { iterations: 0, .. }));
    }

    #[test]
    fn test_iteration_cap() {
        let err = BrentSolver::new(SolverConfig::new(1e-300, 3))
            .find_root(|x| x * x - 2.0, 0.0, 2.0)
            .unwrap_err();
        assert_eq!(err, SolverError::MaxIterationsExceeded { iterations: 3 });
    }

    #[test]
    fn test_invalid_config() {
        let err = BrentSolver::new(SolverConfig::new(0.0, 10))
            .find_root(|x| x, -1.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput(_)));
    }
}
