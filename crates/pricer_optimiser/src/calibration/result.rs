//! Calibration outcome.

use std::collections::BTreeMap;

use pricer_core::market_data::MarketEnvironment;
use pricer_core::math::solvers::TerminationReason;

/// Fitted parameters and fit quality.
///
/// `converged` is true when a tolerance stopped the optimiser and false when
/// the iteration budget ran out; the latter is not an error.
#[derive(Clone, Debug)]
pub struct CalibrationResult {
    /// Fitted values keyed by parameter name.
    pub fitted_parameters: BTreeMap<String, f64>,
    /// Fitted values in model order.
    pub parameters: Vec<f64>,
    /// Weighted sum of squared price errors at the fitted point.
    pub residual_error: f64,
    /// Root mean squared price error (unweighted).
    pub rmse: f64,
    /// Optimiser iterations performed.
    pub iterations: usize,
    /// Whether a tolerance criterion stopped the run.
    pub converged: bool,
    /// Why the optimiser stopped.
    pub termination: TerminationReason,
    /// Model price of each quote at the fitted point, in quote order.
    pub model_prices: Vec<f64>,
    /// Trial points rejected because the objective was non-finite.
    pub rejected_trials: usize,
    /// Environment carrying the fitted volatilities.
    pub environment: MarketEnvironment,
}

impl CalibrationResult {
    /// Fitted value of a named parameter.
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.fitted_parameters.get(name).copied()
    }
}
