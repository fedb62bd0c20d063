//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: the error taxonomy shared by every pricer, the Greeks
//!   engine and the calibrator
//! - `InterpolationError`: Errors from interpolation operations
//! - `SolverError`: Errors from root-finding and optimisation solvers
//!
//! Every variant carries the instrument or parameter context that caused it,
//! so callers never have to guess which input was rejected.

use thiserror::Error;

use crate::market_data::MarketDataError;

/// Categorised pricing errors.
///
/// Pricers and the Greeks engine surface these immediately. The calibrator
/// recovers locally from single non-finite trials and only reports
/// [`PricingError::CalibrationDivergence`] when no finite trial exists.
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::InvalidPathCount { paths: 0 };
/// assert_eq!(format!("{}", err), "Invalid path count: 0 (must be at least 1)");
///
/// let err = PricingError::unsupported("AmericanCall K=100 T=1", "analytical");
/// assert!(format!("{}", err).contains("analytical"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The selected method cannot price this instrument.
    #[error("Unsupported instrument: {instrument} cannot be priced by the {method} method")]
    UnsupportedInstrument {
        /// Description of the rejected instrument
        instrument: String,
        /// Name of the pricing method
        method: String,
    },

    /// Lattice construction produced an unusable tree.
    #[error(
        "Invalid tree parameters: steps={steps}, sigma={volatility}, r={rate}, q={dividend_yield} \
         give risk-neutral probability {probability} outside (0, 1)"
    )]
    InvalidTreeParameters {
        /// Number of time slices requested
        steps: usize,
        /// Volatility used to build the tree
        volatility: f64,
        /// Risk-free rate
        rate: f64,
        /// Dividend yield
        dividend_yield: f64,
        /// The offending up-move probability (NaN when steps is zero)
        probability: f64,
    },

    /// Monte Carlo path count below one.
    #[error("Invalid path count: {paths} (must be at least 1)")]
    InvalidPathCount {
        /// Requested number of paths
        paths: usize,
    },

    /// Calibration objective could not be evaluated at any finite trial point.
    #[error("Calibration diverged after {iterations} iterations at {parameters:?}: {reason}")]
    CalibrationDivergence {
        /// Iterations performed before giving up
        iterations: usize,
        /// Last parameter vector tried
        parameters: Vec<f64>,
        /// What went wrong
        reason: String,
    },

    /// Cooperative cancellation was observed.
    #[error("{operation} cancelled after {completed} of {total} units")]
    Cancelled {
        /// Long-running operation that stopped
        operation: String,
        /// Units of work (batches, iterations) completed
        completed: usize,
        /// Units of work planned
        total: usize,
    },

    /// Implied volatility could not be recovered for a quote.
    #[error(
        "Implied volatility failed for K={strike}, T={maturity}, price={price}: {reason}"
    )]
    ImpliedVolatilityFailure {
        /// Strike of the quote
        strike: f64,
        /// Maturity of the quote in years
        maturity: f64,
        /// Observed market price
        price: f64,
        /// Underlying solver failure
        reason: String,
    },

    /// Computation produced a non-finite or otherwise unusable number.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Market data lookup failed.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),
}

impl PricingError {
    /// Build an [`PricingError::UnsupportedInstrument`] from any displayable context.
    pub fn unsupported(instrument: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UnsupportedInstrument {
            instrument: instrument.into(),
            method: method.into(),
        }
    }

    /// Build a [`PricingError::Cancelled`] for the named operation.
    pub fn cancelled(operation: impl Into<String>, completed: usize, total: usize) -> Self {
        Self::Cancelled {
            operation: operation.into(),
            completed,
            total,
        }
    }

    /// Returns true if this error reports cooperative cancellation.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Interpolation errors.
///
/// # Examples
/// ```
/// use pricer_core::types::InterpolationError;
///
/// let err = InterpolationError::OutOfBounds { x: 5.0, min: 0.0, max: 3.0 };
/// assert!(format!("{}", err).contains("outside valid domain"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationError {
    /// Query point outside valid interpolation domain.
    #[error("Query point {x} outside valid domain [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Insufficient data points for interpolation.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Axis values are not strictly increasing.
    #[error("Axis is not strictly increasing at index {index}")]
    NonMonotonicData {
        /// Index where the violation was detected
        index: usize,
    },

    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Root-finding and optimisation solver errors.
///
/// # Examples
/// ```
/// use pricer_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// The objective was non-finite at every point the solver could try.
    #[error("Objective non-finite after {iterations} iterations at {params:?}")]
    NonFiniteObjective {
        /// Iterations performed
        iterations: usize,
        /// Last parameters evaluated
        params: Vec<f64>,
    },

    /// A cancellation token fired between iterations.
    #[error("Solver cancelled after {iterations} iterations")]
    Cancelled {
        /// Iterations completed before the token was observed
        iterations: usize,
    },

    /// Solver inputs (bounds, starting point) are inconsistent.
    #[error("Invalid solver input: {0}")]
    InvalidInput(String),

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl From<InterpolationError> for PricingError {
    fn from(err: InterpolationError) -> Self {
        PricingError::MarketData(MarketDataError::Interpolation(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let err = PricingError::InvalidInput("Negative spot price".to_string());
        assert_eq!(format!("{}", err), "Invalid input: Negative spot price");
    }

    #[test]
    fn test_unsupported_instrument_carries_context() {
        let err = PricingError::unsupported("ExoticPath(asian) K=100 T=1", "lattice");
        let msg = format!("{}", err);
        assert!(msg.contains("ExoticPath(asian)"));
        assert!(msg.contains("lattice"));
    }

    #[test]
    fn test_invalid_tree_parameters_display() {
        let err = PricingError::InvalidTreeParameters {
            steps: 2,
            volatility: 0.01,
            rate: 0.5,
            dividend_yield: 0.0,
            probability: 1.7,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("steps=2"));
        assert!(msg.contains("1.7"));
    }

    #[test]
    fn test_cancelled_helpers() {
        let err = PricingError::cancelled("Monte Carlo", 3, 10);
        assert!(err.is_cancelled());
        assert_eq!(format!("{}", err), "Monte Carlo cancelled after 3 of 10 units");
        assert!(!PricingError::InvalidPathCount { paths: 0 }.is_cancelled());
    }

    #[test]
    fn test_divergence_lists_parameters() {
        let err = PricingError::CalibrationDivergence {
            iterations: 4,
            parameters: vec![0.2, 0.3],
            reason: "all trials non-finite".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("[0.2, 0.3]"));
        assert!(msg.contains("4 iterations"));
    }

    #[test]
    fn test_from_market_data_error() {
        let err: PricingError = MarketDataError::InvalidStrike { strike: -1.0 }.into();
        match err {
            PricingError::MarketData(MarketDataError::InvalidStrike { strike }) => {
                assert_eq!(strike, -1.0)
            }
            _ => panic!("Expected MarketData variant"),
        }
    }

    #[test]
    fn test_from_interpolation_error() {
        let err: PricingError = InterpolationError::InsufficientData { got: 1, need: 2 }.into();
        assert!(matches!(
            err,
            PricingError::MarketData(MarketDataError::Interpolation(_))
        ));
    }

    #[test]
    fn test_solver_error_display() {
        let err = SolverError::NoBracket { a: 0.0, b: 1.0 };
        assert!(format!("{}", err).contains("same sign"));

        let err = SolverError::Cancelled { iterations: 7 };
        assert_eq!(format!("{}", err), "Solver cancelled after 7 iterations");
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = PricingError::InvalidPathCount { paths: 0 };
        let _: &dyn std::error::Error = &err;
        let err = SolverError::MaxIterationsExceeded { iterations: 1 };
        let _: &dyn std::error::Error = &err;
    }
}
