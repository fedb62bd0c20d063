//! Volatility calibrator driving a local optimiser over any pricer.

use std::collections::BTreeMap;

use pricer_core::market_data::MarketEnvironment;
use pricer_core::math::solvers::{
    BoxBounds, LevenbergMarquardtSolver, NelderMeadSolver, TerminationReason,
};
use pricer_core::types::{CancellationToken, PricingError, SolverError};
use pricer_pricing::Pricer;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::bounds::{to_box, ParameterBounds};
use super::config::{CalibratorConfig, Optimiser};
use super::model::VolatilityModel;
use super::result::CalibrationResult;
use super::target::{CalibrationQuote, CalibrationTarget};

const OPERATION: &str = "calibration";

/// Fits a [`VolatilityModel`] to a [`CalibrationTarget`].
///
/// Every trial point is clamped into its bounds and turned into a fresh
/// [`MarketEnvironment`]; the base environment, the pricer and the target
/// are only read. A trial whose pricing fails or returns a non-finite price
/// is rejected and the optimiser keeps searching. If no finite trial can be
/// found the run fails with [`PricingError::CalibrationDivergence`].
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::MarketEnvironment;
/// use pricer_models::instruments::{Instrument, OptionType};
/// use pricer_optimiser::calibration::{
///     CalibrationTarget, Calibrator, ParameterBounds, VolatilityModel,
/// };
/// use pricer_pricing::analytical::AnalyticalPricer;
/// use pricer_pricing::Pricer;
///
/// let base = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
/// let truth = base.with_volatility(pricer_core::market_data::Volatility::flat(0.27).unwrap());
/// let pricer = AnalyticalPricer::new();
///
/// let quotes = [90.0, 100.0, 110.0].map(|k| {
///     let option = Instrument::european(OptionType::Call, k, 1.0).unwrap();
///     (option, pricer.price(&option, &truth).unwrap().price)
/// });
/// let target = CalibrationTarget::from_prices(quotes).unwrap();
///
/// let result = Calibrator::default()
///     .calibrate(
///         &target,
///         &pricer,
///         &base,
///         &VolatilityModel::Flat,
///         &[0.2],
///         &[ParameterBounds::volatility()],
///     )
///     .unwrap();
///
/// assert!(result.converged);
/// assert!((result.parameter("sigma").unwrap() - 0.27).abs() < 1e-6);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Calibrator {
    config: CalibratorConfig,
    cancel: Option<CancellationToken>,
}

impl Calibrator {
    /// Calibrator with a validated configuration.
    pub fn new(config: CalibratorConfig) -> Result<Self, PricingError> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: None,
        })
    }

    /// Stop between optimiser iterations once `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &CalibratorConfig {
        &self.config
    }

    /// Fit `model` so that `pricer` reproduces the target's market prices.
    ///
    /// `initial` and `bounds` must both have `model.dimension()` entries.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - dimension mismatch or invalid configuration
    /// * `CalibrationDivergence` - no finite objective value could be found
    /// * `Cancelled` - the cancellation token fired
    /// * any pricer error raised at the starting point other than a numerical one
    pub fn calibrate<P: Pricer + ?Sized>(
        &self,
        target: &CalibrationTarget,
        pricer: &P,
        base: &MarketEnvironment,
        model: &VolatilityModel,
        initial: &[f64],
        bounds: &[ParameterBounds],
    ) -> Result<CalibrationResult, PricingError> {
        self.config.validate()?;
        let dimension = model.dimension();
        if initial.len() != dimension || bounds.len() != dimension {
            return Err(PricingError::InvalidInput(format!(
                "model has {dimension} parameters, got {} initial values and {} bounds",
                initial.len(),
                bounds.len()
            )));
        }

        let objective = Objective {
            quotes: target.quotes(),
            pricer,
            base,
            model,
            bounds: to_box(bounds)?,
            parallel: self.config.parallel,
        };
        let start = objective.bounds.clamp(initial);

        // Configuration errors at the start are the caller's to fix.
        match objective.model_prices(&start) {
            Ok(_) | Err(PricingError::NumericalInstability(_)) => {}
            Err(err) => return Err(err),
        }

        info!(
            optimiser = ?self.config.optimiser,
            method = %pricer.method(),
            quotes = target.len(),
            parameters = dimension,
            "starting calibration"
        );

        let total = self.config.max_iterations();
        let fit = match self.config.optimiser {
            Optimiser::LevenbergMarquardt => {
                let mut solver = LevenbergMarquardtSolver::new(self.config.lm)
                    .with_bounds(objective.bounds.clone());
                if let Some(token) = &self.cancel {
                    solver = solver.with_cancellation(token.clone());
                }
                let result = solver
                    .solve(|p| objective.residuals(p), start)
                    .map_err(|e| solver_error(e, total))?;
                Fit {
                    params: result.params,
                    iterations: result.iterations,
                    termination: result.termination,
                    rejected: result.non_finite_trials,
                }
            }
            Optimiser::NelderMead => {
                let mut solver = NelderMeadSolver::new(self.config.nelder_mead);
                if let Some(token) = &self.cancel {
                    solver = solver.with_cancellation(token.clone());
                }
                let result = solver
                    .minimize(|p| objective.weighted_sse(p), &start, &objective.bounds)
                    .map_err(|e| solver_error(e, total))?;
                Fit {
                    params: result.params,
                    iterations: result.iterations,
                    termination: result.termination,
                    rejected: result.non_finite_trials,
                }
            }
        };

        let params = objective.bounds.clamp(&fit.params);
        let model_prices = objective.model_prices(&params)?;
        let quotes = target.quotes();
        let residual_error = weighted_sse(quotes, &model_prices);
        let rmse = (quotes
            .iter()
            .zip(&model_prices)
            .map(|(q, m)| (m - q.market_price).powi(2))
            .sum::<f64>()
            / quotes.len() as f64)
            .sqrt();
        if !residual_error.is_finite() {
            return Err(PricingError::CalibrationDivergence {
                iterations: fit.iterations,
                parameters: params,
                reason: "objective non-finite at the fitted point".to_string(),
            });
        }

        let converged = fit.termination.is_converged();
        info!(
            converged,
            iterations = fit.iterations,
            residual_error,
            rmse,
            rejected_trials = fit.rejected,
            termination = ?fit.termination,
            "calibration finished"
        );

        let fitted_parameters: BTreeMap<String, f64> = model
            .parameter_names()
            .into_iter()
            .zip(params.iter().copied())
            .collect();
        let environment = model.environment(base, &params)?;

        Ok(CalibrationResult {
            fitted_parameters,
            parameters: params,
            residual_error,
            rmse,
            iterations: fit.iterations,
            converged,
            termination: fit.termination,
            model_prices,
            rejected_trials: fit.rejected,
            environment,
        })
    }
}

struct Fit {
    params: Vec<f64>,
    iterations: usize,
    termination: TerminationReason,
    rejected: usize,
}

/// Prices every quote under a trial parameter vector.
struct Objective<'a, P: ?Sized> {
    quotes: &'a [CalibrationQuote],
    pricer: &'a P,
    base: &'a MarketEnvironment,
    model: &'a VolatilityModel,
    bounds: BoxBounds,
    parallel: bool,
}

impl<P: Pricer + ?Sized> Objective<'_, P> {
    fn model_prices(&self, params: &[f64]) -> Result<Vec<f64>, PricingError> {
        let trial = self.bounds.clamp(params);
        let env = self.model.environment(self.base, &trial)?;
        let price = |q: &CalibrationQuote| self.pricer.price(&q.instrument, &env).map(|r| r.price);
        if self.parallel {
            self.quotes.par_iter().map(price).collect()
        } else {
            self.quotes.iter().map(price).collect()
        }
    }

    /// `√w·(model − market)` per quote; NaN everywhere when the trial is rejected.
    fn residuals(&self, params: &[f64]) -> Vec<f64> {
        match self.model_prices(params) {
            Ok(prices) => {
                let residuals: Vec<f64> = self
                    .quotes
                    .iter()
                    .zip(&prices)
                    .map(|(q, m)| q.weight.sqrt() * (m - q.market_price))
                    .collect();
                if residuals.iter().all(|r| r.is_finite()) {
                    debug!(
                        ?params,
                        sse = residuals.iter().map(|r| r * r).sum::<f64>(),
                        "objective evaluated"
                    );
                } else {
                    warn!(?params, "rejected trial with non-finite model price");
                }
                residuals
            }
            Err(err) => {
                warn!(?params, error = %err, "rejected trial");
                vec![f64::NAN; self.quotes.len()]
            }
        }
    }

    fn weighted_sse(&self, params: &[f64]) -> f64 {
        self.residuals(params).iter().map(|r| r * r).sum()
    }
}

fn weighted_sse(quotes: &[CalibrationQuote], model_prices: &[f64]) -> f64 {
    quotes
        .iter()
        .zip(model_prices)
        .map(|(q, m)| q.weight * (m - q.market_price).powi(2))
        .sum()
}

fn solver_error(err: SolverError, total: usize) -> PricingError {
    match err {
        SolverError::NonFiniteObjective { iterations, params } => {
            PricingError::CalibrationDivergence {
                iterations,
                parameters: params,
                reason: "objective non-finite at every trial point".to_string(),
            }
        }
        SolverError::Cancelled { iterations } => {
            PricingError::cancelled(OPERATION, iterations, total)
        }
        SolverError::InvalidInput(msg) => PricingError::InvalidInput(msg),
        other => PricingError::NumericalInstability(other.to_string()),
    }
}
