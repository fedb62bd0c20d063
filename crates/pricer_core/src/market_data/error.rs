//! Failures building or querying market data.
//!
//! Every variant lifts into [`PricingError`](crate::types::PricingError), so
//! pricers apply `?` to market lookups directly.

use crate::types::InterpolationError;
use thiserror::Error;

/// Rejected market input or a lookup the data cannot answer.
///
/// ```
/// use pricer_core::market_data::MarketDataError;
///
/// let err = MarketDataError::InvalidVolatility { volatility: -0.1 };
/// assert_eq!(err.to_string(), "volatility must be positive and finite, got -0.1");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Spot not positive and finite.
    #[error("spot must be positive and finite, got {spot}")]
    InvalidSpot {
        /// Rejected spot
        spot: f64,
    },

    /// Rate not finite.
    #[error("rate must be finite, got {rate}")]
    InvalidRate {
        /// Rejected rate
        rate: f64,
    },

    /// Dividend yield negative or not finite.
    #[error("dividend yield must be finite and >= 0, got {dividend_yield}")]
    InvalidDividendYield {
        /// Rejected yield
        dividend_yield: f64,
    },

    /// Volatility not positive and finite.
    #[error("volatility must be positive and finite, got {volatility}")]
    InvalidVolatility {
        /// Rejected volatility
        volatility: f64,
    },

    /// Strike axis or query strike not positive.
    #[error("strike must be positive, got {strike}")]
    InvalidStrike {
        /// Rejected strike
        strike: f64,
    },

    /// Expiry axis or query expiry not positive.
    #[error("expiry must be positive, got {expiry}")]
    InvalidExpiry {
        /// Rejected expiry
        expiry: f64,
    },

    /// Query outside a surface built without extrapolation.
    #[error("{x} lies outside the surface axis [{min}, {max}]")]
    OutOfBounds {
        /// Query coordinate
        x: f64,
        /// Lowest node
        min: f64,
        /// Highest node
        max: f64,
    },

    /// Underlying interpolator failure.
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    /// Too few quotes or nodes to build from.
    #[error("need {need} data points, got {got}")]
    InsufficientData {
        /// Points supplied
        got: usize,
        /// Points required
        need: usize,
    },
}
