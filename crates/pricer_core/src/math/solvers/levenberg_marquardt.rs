//! Levenberg-Marquardt nonlinear least-squares solver.
//!
//! # Algorithm
//!
//! The Levenberg-Marquardt algorithm blends Gauss-Newton and gradient descent:
//!
//! ```text
//! (J^T J + λI) δ = -J^T r
//! p_{n+1} = clamp(p_n + δ)
//! ```
//!
//! where `J` is the forward-difference Jacobian of the residuals `r`, `λ` the
//! damping factor and `clamp` the optional box projection.
//!
//! A trial whose residuals are not all finite is rejected as if its objective
//! were +∞: the step is discarded, `λ` grows and the next iteration tries a
//! shorter step. NaN never reaches the next normal-equation solve.
//!
//! # Example
//!
//! ```
//! use pricer_core::math::solvers::{LevenbergMarquardtSolver, LMConfig};
//!
//! // Fit y = a * exp(-b * x)
//! let x_data = vec![0.0, 1.0, 2.0, 3.0, 4.0];
//! let y_data: Vec<f64> = x_data.iter().map(|x: &f64| 2.0 * (-0.5 * x).exp()).collect();
//!
//! let residuals = |params: &[f64]| -> Vec<f64> {
//!     x_data.iter().zip(&y_data).map(|(&x, &y)| params[0] * (-params[1] * x).exp() - y).collect()
//! };
//!
//! let solver = LevenbergMarquardtSolver::new(LMConfig::default());
//! let result = solver.solve(residuals, vec![1.0, 1.0]).unwrap();
//!
//! assert!(result.converged);
//! assert!((result.params[0] - 2.0).abs() < 1e-6);
//! ```

use tracing::{debug, trace};

use super::{BoxBounds, TerminationReason};
use crate::math::linalg::solve_cholesky;
use crate::types::{CancellationToken, SolverError};

/// Configuration for Levenberg-Marquardt solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LMConfig {
    /// Stop when the residual norm, or the relative objective improvement of
    /// an accepted step, falls below this value.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Initial damping factor.
    pub initial_lambda: f64,
    /// Factor to increase lambda on rejected step.
    pub lambda_up: f64,
    /// Factor to decrease lambda on accepted step.
    pub lambda_down: f64,
    /// Minimum damping factor.
    pub min_lambda: f64,
    /// Maximum damping factor.
    pub max_lambda: f64,
    /// Stop when the relative parameter step falls below this value.
    pub param_tolerance: f64,
    /// Relative bump for the forward-difference Jacobian.
    pub jacobian_epsilon: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            min_lambda: 1e-10,
            max_lambda: 1e10,
            param_tolerance: 1e-10,
            jacobian_epsilon: 1e-8,
        }
    }
}

impl LMConfig {
    /// Create a new LM configuration.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
            ..Default::default()
        }
    }

    /// Relaxed tolerances.
    pub fn fast() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            ..Default::default()
        }
    }

    /// Tight tolerances and a larger budget.
    pub fn high_precision() -> Self {
        Self {
            tolerance: 1e-14,
            max_iterations: 500,
            param_tolerance: 1e-14,
            ..Default::default()
        }
    }

    /// Checks tolerances, damping factors and the iteration budget.
    pub fn validate(&self) -> Result<(), SolverError> {
        let positive = [
            ("tolerance", self.tolerance),
            ("initial_lambda", self.initial_lambda),
            ("min_lambda", self.min_lambda),
            ("max_lambda", self.max_lambda),
            ("param_tolerance", self.param_tolerance),
            ("jacobian_epsilon", self.jacobian_epsilon),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SolverError::InvalidInput(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.lambda_up <= 1.0 || !(self.lambda_down > 0.0 && self.lambda_down < 1.0) {
            return Err(SolverError::InvalidInput(format!(
                "lambda_up must exceed 1 and lambda_down lie in (0, 1), got {} and {}",
                self.lambda_up, self.lambda_down
            )));
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidInput(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of Levenberg-Marquardt optimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct LMResult {
    /// Final parameters.
    pub params: Vec<f64>,
    /// Residual sum of squares at `params`.
    pub residual_ss: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether a tolerance (not the budget) stopped the solver.
    pub converged: bool,
    /// Final lambda value.
    pub final_lambda: f64,
    /// Why the solver stopped.
    pub termination: TerminationReason,
    /// Trial points rejected because their residuals were not finite.
    pub non_finite_trials: usize,
}

impl LMResult {
    /// Root mean square error over `n_observations` residuals.
    pub fn rmse(&self, n_observations: usize) -> f64 {
        if n_observations == 0 {
            return 0.0;
        }
        (self.residual_ss / n_observations as f64).sqrt()
    }
}

/// Levenberg-Marquardt nonlinear least-squares solver.
///
/// Solves `min_p ||f(p)||²` over an optional box, where `f` returns the
/// residual vector.
///
/// # Errors
///
/// * `NonFiniteObjective` - the starting point is non-finite, or no trial
///   within the budget produced finite residuals
/// * `Cancelled` - the attached token fired between iterations
/// * `InvalidInput` - bad configuration or a start vector that does not
///   match the bounds
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{BoxBounds, LevenbergMarquardtSolver};
///
/// let bounds = BoxBounds::uniform(2, 0.0, 2.5).unwrap();
/// let solver = LevenbergMarquardtSolver::with_defaults().with_bounds(bounds);
///
/// let result = solver
///     .solve(|p: &[f64]| vec![p[0] - 2.0, p[1] - 3.0], vec![0.0, 0.0])
///     .unwrap();
/// assert!((result.params[0] - 2.0).abs() < 1e-6);
/// assert!((result.params[1] - 2.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LevenbergMarquardtSolver {
    config: LMConfig,
    bounds: Option<BoxBounds>,
    cancel: Option<CancellationToken>,
}

impl LevenbergMarquardtSolver {
    /// Create a new LM solver with the given configuration.
    pub fn new(config: LMConfig) -> Self {
        Self {
            config,
            bounds: None,
            cancel: None,
        }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LMConfig::default())
    }

    /// Restrict every trial point to `bounds`.
    pub fn with_bounds(mut self, bounds: BoxBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Check `token` before every iteration.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Get the solver configuration.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Solve the nonlinear least-squares problem from `initial_params`.
    pub fn solve<F>(&self, residuals: F, initial_params: Vec<f64>) -> Result<LMResult, SolverError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        self.config.validate()?;
        if initial_params.is_empty() {
            return Err(SolverError::InvalidInput(
                "Empty parameter vector".to_string(),
            ));
        }
        if let Some(bounds) = &self.bounds {
            bounds.check_dimension(&initial_params)?;
        }

        let mut params = self.project(&initial_params);
        let mut r = residuals(&params);
        if r.is_empty() {
            return Err(SolverError::NumericalInstability(
                "Empty residual vector".to_string(),
            ));
        }
        let mut ss = sum_of_squares(&r);
        if !ss.is_finite() {
            return Err(SolverError::NonFiniteObjective {
                iterations: 0,
                params,
            });
        }

        let cfg = &self.config;
        let mut lambda = cfg.initial_lambda;
        let mut finite_trials = 0usize;
        let mut non_finite_trials = 0usize;
        let mut last_trial = params.clone();

        let finish = |params: Vec<f64>,
                      ss: f64,
                      iterations: usize,
                      lambda: f64,
                      termination: TerminationReason,
                      rejected: usize|
         -> Result<LMResult, SolverError> {
            Ok(LMResult {
                params,
                residual_ss: ss,
                iterations,
                converged: termination.is_converged(),
                final_lambda: lambda,
                termination,
                non_finite_trials: rejected,
            })
        };

        for iteration in 0..cfg.max_iterations {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                return Err(SolverError::Cancelled {
                    iterations: iteration,
                });
            }

            if ss.sqrt() < cfg.tolerance {
                return finish(
                    params,
                    ss,
                    iteration,
                    lambda,
                    TerminationReason::ResidualTolerance,
                    non_finite_trials,
                );
            }

            let Some(jacobian) = self.jacobian(&residuals, &params, &r) else {
                // No column could be differenced at a finite point.
                non_finite_trials += 1;
                lambda = (lambda * cfg.lambda_up).min(cfg.max_lambda);
                continue;
            };

            let Some(delta) = solve_normal_equations(&jacobian, &r, lambda) else {
                lambda = (lambda * cfg.lambda_up).min(cfg.max_lambda);
                continue;
            };

            let proposed: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
            let trial = self.project(&proposed);

            let step = trial
                .iter()
                .zip(&params)
                .map(|(t, p)| (t - p) * (t - p))
                .sum::<f64>()
                .sqrt();
            let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt().max(1.0);
            if step / param_norm < cfg.param_tolerance {
                return finish(
                    params,
                    ss,
                    iteration,
                    lambda,
                    TerminationReason::StepTolerance,
                    non_finite_trials,
                );
            }

            let new_r = residuals(&trial);
            let new_ss = sum_of_squares(&new_r);
            last_trial.clone_from(&trial);

            if !new_ss.is_finite() {
                non_finite_trials += 1;
                debug!(iteration, ?trial, lambda, "rejected non-finite trial");
                lambda = (lambda * cfg.lambda_up).min(cfg.max_lambda);
                continue;
            }
            finite_trials += 1;

            if new_ss < ss {
                let improvement = (ss - new_ss) / ss;
                params = trial;
                r = new_r;
                ss = new_ss;
                lambda = (lambda * cfg.lambda_down).max(cfg.min_lambda);
                trace!(iteration, ss, lambda, "accepted step");

                if improvement < cfg.tolerance {
                    return finish(
                        params,
                        ss,
                        iteration + 1,
                        lambda,
                        TerminationReason::ObjectiveTolerance,
                        non_finite_trials,
                    );
                }
            } else {
                lambda = (lambda * cfg.lambda_up).min(cfg.max_lambda);
            }
        }

        if finite_trials == 0 && non_finite_trials > 0 {
            return Err(SolverError::NonFiniteObjective {
                iterations: cfg.max_iterations,
                params: last_trial,
            });
        }

        finish(
            params,
            ss,
            cfg.max_iterations,
            lambda,
            TerminationReason::MaxIterations,
            non_finite_trials,
        )
    }

    fn project(&self, params: &[f64]) -> Vec<f64> {
        match &self.bounds {
            Some(bounds) => bounds.clamp(params),
            None => params.to_vec(),
        }
    }

    /// Forward-difference Jacobian, stepping backwards at an upper bound or when the
    /// forward point is non-finite. A column that cannot be differenced either way
    /// is left at zero; `None` if no column could be.
    fn jacobian<F>(&self, residuals: &F, params: &[f64], r0: &[f64]) -> Option<Vec<Vec<f64>>>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let n_params = params.len();
        let mut jacobian = vec![vec![0.0; n_params]; r0.len()];
        let mut usable = 0usize;

        for j in 0..n_params {
            let h = self.config.jacobian_epsilon * params[j].abs().max(1.0);
            for signed_h in [h, -h] {
                let mut bumped = params.to_vec();
                bumped[j] += signed_h;
                let bumped = self.project(&bumped);
                let denom = bumped[j] - params[j];
                if denom.abs() < f64::EPSILON * params[j].abs().max(1.0) {
                    continue;
                }
                let r_bumped = residuals(&bumped);
                if r_bumped.len() != r0.len() || r_bumped.iter().any(|x| !x.is_finite()) {
                    continue;
                }
                for (row, (rb, r)) in jacobian.iter_mut().zip(r_bumped.iter().zip(r0)) {
                    row[j] = (rb - r) / denom;
                }
                usable += 1;
                break;
            }
        }

        (usable > 0).then_some(jacobian)
    }
}

/// Solve (J^T J + λI) δ = -J^T r
fn solve_normal_equations(jacobian: &[Vec<f64>], residuals: &[f64], lambda: f64) -> Option<Vec<f64>> {
    let n_params = jacobian.first().map_or(0, Vec::len);

    let mut jtj = vec![vec![0.0; n_params]; n_params];
    let mut jtr = vec![0.0; n_params];
    for (row, &r) in jacobian.iter().zip(residuals) {
        for i in 0..n_params {
            for j in 0..n_params {
                jtj[i][j] += row[i] * row[j];
            }
            jtr[i] -= row[i] * r;
        }
    }
    for (i, row) in jtj.iter_mut().enumerate() {
        row[i] += lambda;
    }

    solve_cholesky(&jtj, &jtr)
}

#[inline]
fn sum_of_squares(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}
