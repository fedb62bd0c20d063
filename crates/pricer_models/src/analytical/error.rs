//! Input checks for the closed-form formulas.

use pricer_core::types::PricingError;
use thiserror::Error;

/// Why a closed-form evaluation refused its inputs.
///
/// ```
/// use pricer_models::analytical::AnalyticalError;
///
/// let err = AnalyticalError::InvalidVolatility { volatility: -0.2 };
/// assert_eq!(err.to_string(), "closed form needs sigma > 0, got -0.2");
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Volatility not positive and finite.
    #[error("closed form needs sigma > 0, got {volatility}")]
    InvalidVolatility {
        /// Rejected volatility
        volatility: f64,
    },

    /// Spot not positive and finite.
    #[error("closed form needs spot > 0, got {spot}")]
    InvalidSpot {
        /// Rejected spot
        spot: f64,
    },

    /// Rate not finite.
    #[error("closed form needs a finite rate, got {rate}")]
    InvalidRate {
        /// Rejected rate
        rate: f64,
    },

    /// Dividend yield negative or not finite.
    #[error("closed form needs dividend yield >= 0, got {dividend_yield}")]
    InvalidDividendYield {
        /// Rejected yield
        dividend_yield: f64,
    },

    /// A discrete average with no fixings.
    #[error("geometric average needs at least 1 fixing, got {fixings}")]
    InvalidFixingCount {
        /// Requested fixings
        fixings: usize,
    },

    /// Overflow or cancellation inside a formula.
    #[error("closed form unstable: {message}")]
    NumericalInstability {
        /// What went wrong
        message: String,
    },
}

impl From<AnalyticalError> for PricingError {
    fn from(err: AnalyticalError) -> Self {
        if let AnalyticalError::NumericalInstability { .. } = err {
            PricingError::NumericalInstability(err.to_string())
        } else {
            PricingError::InvalidInput(err.to_string())
        }
    }
}
