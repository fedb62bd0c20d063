//! Box-constrained Nelder-Mead simplex minimiser.
//!
//! Derivative free, so it tolerates objectives whose finite-difference
//! gradients are noisy (Monte Carlo pricing with a fixed seed, lattice prices
//! with their odd/even step oscillation). Every vertex is clamped into the
//! box; a non-finite objective value is treated as +∞ so the simplex moves
//! away from it.

use tracing::{debug, trace};

use super::{BoxBounds, TerminationReason};
use crate::types::{CancellationToken, SolverError};

/// Simplex coefficients and stopping rules.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NelderMeadConfig {
    /// Maximum number of simplex iterations.
    pub max_iterations: usize,
    /// Initial edge length as a fraction of each bound's width.
    pub initial_step: f64,
    /// Reflection coefficient.
    pub reflection: f64,
    /// Expansion coefficient.
    pub expansion: f64,
    /// Contraction coefficient.
    pub contraction: f64,
    /// Shrink coefficient.
    pub shrink: f64,
    /// Stop when both the value spread and the simplex radius fall below this.
    pub tolerance: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 240,
            initial_step: 0.08,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            tolerance: 1e-7,
        }
    }
}

impl NelderMeadConfig {
    /// Checks coefficient ranges.
    pub fn validate(&self) -> Result<(), SolverError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let in_unit = |v: f64| v > 0.0 && v < 1.0;
        let valid = self.max_iterations > 0
            && positive(self.initial_step)
            && positive(self.reflection)
            && self.expansion > self.reflection
            && in_unit(self.contraction)
            && in_unit(self.shrink)
            && positive(self.tolerance);
        if !valid {
            return Err(SolverError::InvalidInput(format!(
                "invalid Nelder-Mead configuration: {self:?}"
            )));
        }
        Ok(())
    }
}

/// Outcome of a Nelder-Mead run.
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadResult {
    /// Best vertex found.
    pub params: Vec<f64>,
    /// Objective at `params`.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Objective evaluations, including the initial simplex.
    pub evaluations: usize,
    /// Whether the simplex collapsed before the budget ran out.
    pub converged: bool,
    /// Why the solver stopped.
    pub termination: TerminationReason,
    /// Evaluations that returned a non-finite value.
    pub non_finite_trials: usize,
}

/// Nelder-Mead minimiser over a [`BoxBounds`] box.
///
/// ```
/// use pricer_core::math::solvers::{BoxBounds, NelderMeadSolver};
///
/// let bounds = BoxBounds::uniform(2, -2.0, 2.0).unwrap();
/// let f = |x: &[f64]| (x[0] - 1.0).powi(2) + (x[1] + 0.5).powi(2);
///
/// let result = NelderMeadSolver::with_defaults().minimize(f, &[0.0, 0.0], &bounds).unwrap();
/// assert!((result.params[0] - 1.0).abs() < 1e-3);
/// assert!((result.params[1] + 0.5).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NelderMeadSolver {
    config: NelderMeadConfig,
    cancel: Option<CancellationToken>,
}

impl NelderMeadSolver {
    /// Solver with the given configuration.
    pub fn new(config: NelderMeadConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Solver with default coefficients.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Check `token` before every iteration.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &NelderMeadConfig {
        &self.config
    }

    /// Minimises `objective` starting from `initial` (clamped into `bounds`).
    ///
    /// # Errors
    ///
    /// * `NonFiniteObjective` - the start is non-finite, or every other
    ///   evaluation was
    /// * `Cancelled` - the attached token fired between iterations
    /// * `InvalidInput` - bad configuration or dimension mismatch
    pub fn minimize<F>(
        &self,
        objective: F,
        initial: &[f64],
        bounds: &BoxBounds,
    ) -> Result<NelderMeadResult, SolverError>
    where
        F: Fn(&[f64]) -> f64,
    {
        self.config.validate()?;
        bounds.check_dimension(initial)?;

        let cfg = &self.config;
        let dim = bounds.dimension();
        let mut evaluations = 0usize;
        let mut finite_trials = 0usize;
        let mut non_finite_trials = 0usize;

        let mut eval = |x: &[f64]| -> f64 {
            evaluations += 1;
            let v = objective(x);
            if v.is_finite() {
                finite_trials += 1;
                v
            } else {
                non_finite_trials += 1;
                trace!(?x, "non-finite objective treated as +inf");
                f64::INFINITY
            }
        };

        let x0 = bounds.clamp(initial);
        let f0 = eval(&x0);
        if !f0.is_finite() {
            return Err(SolverError::NonFiniteObjective {
                iterations: 0,
                params: x0,
            });
        }

        let mut simplex = Vec::with_capacity(dim + 1);
        let mut values = Vec::with_capacity(dim + 1);
        simplex.push(x0.clone());
        values.push(f0);

        for d in 0..dim {
            let (lo, hi) = (bounds.lower()[d], bounds.upper()[d]);
            let step = (hi - lo) * cfg.initial_step;
            let mut x = x0.clone();
            x[d] = (x0[d] + step).min(hi);
            if (x[d] - x0[d]).abs() < 1e-14 {
                x[d] = (x0[d] - step).max(lo);
            }
            values.push(eval(&x));
            simplex.push(x);
        }

        let mut iterations = 0usize;
        let mut termination = TerminationReason::MaxIterations;

        for iter in 0..cfg.max_iterations {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                return Err(SolverError::Cancelled { iterations: iter });
            }
            iterations = iter + 1;

            let mut order: Vec<usize> = (0..simplex.len()).collect();
            order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
            simplex = order.iter().map(|&i| simplex[i].clone()).collect();
            values = order.iter().map(|&i| values[i]).collect();

            let centroid: Vec<f64> = (0..dim)
                .map(|d| simplex[..dim].iter().map(|x| x[d]).sum::<f64>() / dim as f64)
                .collect();

            let spread = (values[dim] - values[0]).abs();
            let radius = simplex
                .iter()
                .map(|x| distance(x, &centroid))
                .fold(0.0_f64, f64::max);
            if spread <= cfg.tolerance && radius <= cfg.tolerance {
                termination = TerminationReason::ObjectiveTolerance;
                break;
            }

            let towards = |from: &[f64], coeff: f64| -> Vec<f64> {
                let x: Vec<f64> = centroid
                    .iter()
                    .zip(from)
                    .map(|(c, f)| c + coeff * (f - c))
                    .collect();
                bounds.clamp(&x)
            };

            let xr = towards(&simplex[dim], -cfg.reflection);
            let fr = eval(&xr);

            if fr < values[0] {
                let xe = towards(&xr, cfg.expansion);
                let fe = eval(&xe);
                if fe < fr {
                    simplex[dim] = xe;
                    values[dim] = fe;
                } else {
                    simplex[dim] = xr;
                    values[dim] = fr;
                }
                continue;
            }

            if fr < values[dim - 1] {
                simplex[dim] = xr;
                values[dim] = fr;
                continue;
            }

            let xc = towards(&simplex[dim], cfg.contraction);
            let fc = eval(&xc);
            if fc < values[dim] {
                simplex[dim] = xc;
                values[dim] = fc;
                continue;
            }

            let best = simplex[0].clone();
            for i in 1..=dim {
                let shrunk: Vec<f64> = best
                    .iter()
                    .zip(&simplex[i])
                    .map(|(b, x)| b + cfg.shrink * (x - b))
                    .collect();
                simplex[i] = bounds.clamp(&shrunk);
                values[i] = eval(&simplex[i]);
            }
        }

        // The start vertex is the only evaluation that must be finite.
        if finite_trials <= 1 && non_finite_trials > 0 {
            return Err(SolverError::NonFiniteObjective {
                iterations,
                params: simplex[dim].clone(),
            });
        }

        let best = (0..values.len())
            .min_by(|&i, &j| values[i].total_cmp(&values[j]))
            .unwrap_or(0);

        debug!(
            iterations,
            evaluations,
            value = values[best],
            ?termination,
            "Nelder-Mead finished"
        );

        Ok(NelderMeadResult {
            params: simplex[best].clone(),
            value: values[best],
            iterations,
            evaluations,
            converged: termination.is_converged(),
            termination,
            non_finite_trials,
        })
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quadratic(x: &[f64]) -> f64 {
        (x[0] - 1.0).powi(2) + 2.0 * (x[1] + 0.5).powi(2)
    }

    #[test]
    fn test_default_coefficients() {
        let cfg = NelderMeadConfig::default();
        assert_eq!(cfg.max_iterations, 240);
        assert_relative_eq!(cfg.initial_step, 0.08);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_configuration() {
        let cfg = NelderMeadConfig {
            shrink: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_minimises_quadratic() {
        let bounds = BoxBounds::uniform(2, -3.0, 3.0).unwrap();
        let result = NelderMeadSolver::with_defaults()
            .minimize(quadratic, &[0.0, 0.0], &bounds)
            .unwrap();
        assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.params[1], -0.5, epsilon = 1e-3);
        assert!(result.value < 1e-6);
    }

    #[test]
    fn test_solution_on_bound() {
        let bounds = BoxBounds::uniform(1, 0.0, 2.0).unwrap();
        let result = NelderMeadSolver::with_defaults()
            .minimize(|x: &[f64]| (x[0] - 3.0).powi(2), &[0.5], &bounds)
            .unwrap();
        assert_relative_eq!(result.params[0], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_non_finite_region_is_avoided() {
        let bounds = BoxBounds::uniform(1, -5.0, 5.0).unwrap();
        let f = |x: &[f64]| {
            if x[0] > 1.0 {
                f64::NAN
            } else {
                (x[0] - 2.0).powi(2)
            }
        };
        let result = NelderMeadSolver::with_defaults()
            .minimize(f, &[0.0], &bounds)
            .unwrap();
        assert!(result.params[0] <= 1.0);
        assert!(result.value.is_finite());
        assert!(result.non_finite_trials > 0);
    }

    #[test]
    fn test_non_finite_start_is_an_error() {
        let bounds = BoxBounds::uniform(1, 0.0, 1.0).unwrap();
        let result = NelderMeadSolver::with_defaults().minimize(|_: &[f64]| f64::NAN, &[0.5], &bounds);
        assert!(matches!(result, Err(SolverError::NonFiniteObjective { .. })));
    }

    #[test]
    fn test_only_start_finite_is_an_error() {
        let bounds = BoxBounds::uniform(1, 0.0, 1.0).unwrap();
        let f = |x: &[f64]| if x[0] == 0.5 { 1.0 } else { f64::INFINITY };
        let config = NelderMeadConfig {
            max_iterations: 10,
            ..Default::default()
        };
        let result = NelderMeadSolver::new(config).minimize(f, &[0.5], &bounds);
        assert!(matches!(result, Err(SolverError::NonFiniteObjective { .. })));
    }

    #[test]
    fn test_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let bounds = BoxBounds::uniform(2, -3.0, 3.0).unwrap();
        let result = NelderMeadSolver::with_defaults()
            .with_cancellation(token)
            .minimize(quadratic, &[0.0, 0.0], &bounds);
        assert!(matches!(result, Err(SolverError::Cancelled { iterations: 0 })));
    }

    #[test]
    fn test_dimension_mismatch() {
        let bounds = BoxBounds::uniform(2, -3.0, 3.0).unwrap();
        assert!(NelderMeadSolver::with_defaults()
            .minimize(quadratic, &[0.0], &bounds)
            .is_err());
    }
}
