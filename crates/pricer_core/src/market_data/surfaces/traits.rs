//! Volatility surface trait definition.

use crate::market_data::error::MarketDataError;

/// Implied volatility lookup σ(K, T).
///
/// # Contract
///
/// - `volatility(strike, expiry)` returns σ > 0 for every accepted query
/// - non-positive strikes or expiries are rejected
///
/// # Example
///
/// ```
/// use pricer_core::market_data::surfaces::{VolatilitySurface, FlatVol};
///
/// let surface = FlatVol::new(0.20).unwrap();
/// assert_eq!(surface.volatility(100.0, 1.0).unwrap(), 0.20);
/// ```
pub trait VolatilitySurface {
    /// Implied volatility for the given strike and expiry (years).
    fn volatility(&self, strike: f64, expiry: f64) -> Result<f64, MarketDataError>;

    /// Range of strikes with quoted data.
    fn strike_domain(&self) -> (f64, f64);

    /// Range of expiries with quoted data.
    fn expiry_domain(&self) -> (f64, f64);
}

/// Shared argument validation for surface lookups.
pub(crate) fn check_query(strike: f64, expiry: f64) -> Result<(), MarketDataError> {
    if !strike.is_finite() || strike <= 0.0 {
        return Err(MarketDataError::InvalidStrike { strike });
    }
    if !expiry.is_finite() || expiry <= 0.0 {
        return Err(MarketDataError::InvalidExpiry { expiry });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Skew;

    impl VolatilitySurface for Skew {
        fn volatility(&self, strike: f64, expiry: f64) -> Result<f64, MarketDataError> {
            check_query(strike, expiry)?;
            Ok(0.2 + 0.001 * (100.0 - strike))
        }

        fn strike_domain(&self) -> (f64, f64) {
            (0.0, f64::INFINITY)
        }

        fn expiry_domain(&self) -> (f64, f64) {
            (0.0, f64::INFINITY)
        }
    }

    #[test]
    fn test_trait_object_lookup() {
        let surface: &dyn VolatilitySurface = &Skew;
        assert!((surface.volatility(90.0, 1.0).unwrap() - 0.21).abs() < 1e-12);
    }

    #[test]
    fn test_check_query_rejects_bad_inputs() {
        assert!(check_query(0.0, 1.0).is_err());
        assert!(check_query(100.0, 0.0).is_err());
        assert!(check_query(f64::NAN, 1.0).is_err());
        assert!(check_query(100.0, 1.0).is_ok());
    }
}
