//! Calibrator configuration.

use pricer_core::math::solvers::{LMConfig, NelderMeadConfig};
use pricer_core::types::PricingError;

/// Local optimiser driving the calibration loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Optimiser {
    /// Damped Gauss-Newton on weighted residuals.
    #[default]
    LevenbergMarquardt,
    /// Derivative-free simplex search on the weighted sum of squares.
    NelderMead,
}

/// Configuration for [`Calibrator`](super::Calibrator).
///
/// Loaded from TOML as the `[calibrator]` table of
/// [`EngineSettings`](crate::settings::EngineSettings):
///
/// ```
/// use pricer_optimiser::calibration::{CalibratorConfig, Optimiser};
///
/// let config: CalibratorConfig = toml::from_str(
///     r#"
///     optimiser = "nelder_mead"
///     parallel = false
///
///     [nelder_mead]
///     max_iterations = 500
///     "#,
/// )
/// .unwrap();
/// assert_eq!(config.optimiser, Optimiser::NelderMead);
/// assert_eq!(config.nelder_mead.max_iterations, 500);
/// assert_eq!(config.lm.max_iterations, 100);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CalibratorConfig {
    /// Optimiser used by [`Calibrator::calibrate`](super::Calibrator::calibrate).
    pub optimiser: Optimiser,
    /// Levenberg-Marquardt settings.
    pub lm: LMConfig,
    /// Nelder-Mead settings.
    pub nelder_mead: NelderMeadConfig,
    /// Price the quotes of one objective evaluation in parallel.
    pub parallel: bool,
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            optimiser: Optimiser::LevenbergMarquardt,
            lm: LMConfig::default(),
            nelder_mead: NelderMeadConfig::default(),
            parallel: true,
        }
    }
}

impl CalibratorConfig {
    /// Select the optimiser.
    pub fn with_optimiser(mut self, optimiser: Optimiser) -> Self {
        self.optimiser = optimiser;
        self
    }

    /// Convergence tolerance for both optimisers.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.lm.tolerance = tolerance;
        self.nelder_mead.tolerance = tolerance;
        self
    }

    /// Iteration budget for both optimisers.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.lm.max_iterations = max_iterations;
        self.nelder_mead.max_iterations = max_iterations;
        self
    }

    /// Enable or disable parallel quote pricing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Iteration budget of the selected optimiser.
    pub fn max_iterations(&self) -> usize {
        match self.optimiser {
            Optimiser::LevenbergMarquardt => self.lm.max_iterations,
            Optimiser::NelderMead => self.nelder_mead.max_iterations,
        }
    }

    /// Validate the selected optimiser's settings.
    pub fn validate(&self) -> Result<(), PricingError> {
        let checked = match self.optimiser {
            Optimiser::LevenbergMarquardt => self.lm.validate(),
            Optimiser::NelderMead => self.nelder_mead.validate(),
        };
        checked.map_err(|e| PricingError::InvalidInput(format!("calibrator: {e}")))
    }
}
