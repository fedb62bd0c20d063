//! Contract validation failures.

use pricer_core::types::PricingError;
use thiserror::Error;

/// Contract terms rejected at construction.
///
/// ```
/// use pricer_models::instruments::InstrumentError;
///
/// let err = InstrumentError::InvalidStrike { strike: -100.0 };
/// assert_eq!(err.to_string(), "strike -100 is not positive and finite");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstrumentError {
    /// Strike not positive and finite.
    #[error("strike {strike} is not positive and finite")]
    InvalidStrike {
        /// Rejected strike
        strike: f64,
    },

    /// Maturity not positive and finite.
    #[error("maturity {maturity} is not positive and finite")]
    InvalidMaturity {
        /// Rejected maturity in years
        maturity: f64,
    },

    /// Barrier level not positive and finite.
    #[error("barrier {barrier} is not positive and finite")]
    InvalidBarrier {
        /// Rejected level
        barrier: f64,
    },

    /// An exotic kind without a path payoff, or a path payoff on a vanilla kind.
    #[error("kind and payoff disagree: {message}")]
    PayoffMismatch {
        /// Which pairing was attempted
        message: String,
    },
}

impl From<InstrumentError> for PricingError {
    fn from(err: InstrumentError) -> Self {
        PricingError::InvalidInput(err.to_string())
    }
}
