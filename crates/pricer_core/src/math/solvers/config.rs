//! Solver configuration types.

use crate::types::SolverError;

/// Configuration for one-dimensional root finding.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert!(config.tolerance < 1e-8);
/// assert!(config.max_iterations >= 50);
///
/// let custom = SolverConfig {
///     tolerance: 1e-12,
///     max_iterations: 200,
/// };
/// assert!(custom.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    /// Convergence tolerance on `|f(x)|` and on the bracket half-width.
    pub tolerance: f64,

    /// Maximum number of iterations before giving up with
    /// `SolverError::MaxIterationsExceeded`.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    /// `tolerance` 1e-10, `max_iterations` 100.
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
        }
    }
}

impl SolverConfig {
    /// Create a configuration with the given tolerance and iteration budget.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Tight tolerance (1e-14) and a larger budget (500).
    pub fn high_precision() -> Self {
        Self::new(1e-14, 500)
    }

    /// Relaxed tolerance (1e-6) and a smaller budget (50).
    pub fn fast() -> Self {
        Self::new(1e-6, 50)
    }

    /// Checks that the tolerance is positive and the budget non-zero.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SolverError::InvalidInput(format!(
                "tolerance must be positive, got {}",
                self.tolerance
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

/// Why an iterative optimiser stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// Residual norm fell below the tolerance.
    ResidualTolerance,
    /// Relative improvement of the objective between accepted iterations fell
    /// below the tolerance (for Nelder-Mead, the simplex collapsed).
    ObjectiveTolerance,
    /// Parameter step became negligible.
    StepTolerance,
    /// Iteration budget exhausted.
    MaxIterations,
}

impl TerminationReason {
    /// True for every reason except [`TerminationReason::MaxIterations`].
    pub fn is_converged(self) -> bool {
        !matches!(self, Self::MaxIterations)
    }
}
