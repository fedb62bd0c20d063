//! Flat volatility surface implementation.

use super::traits::check_query;
use super::VolatilitySurface;
use crate::market_data::error::MarketDataError;

/// Constant implied volatility for every strike and expiry.
///
/// ```
/// use pricer_core::market_data::surfaces::{VolatilitySurface, FlatVol};
///
/// let surface = FlatVol::new(0.25).unwrap();
/// assert_eq!(surface.volatility(80.0, 0.5).unwrap(), 0.25);
/// assert!(FlatVol::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatVol {
    sigma: f64,
}

impl FlatVol {
    /// Construct a flat surface; σ must be positive and finite.
    pub fn new(sigma: f64) -> Result<Self, MarketDataError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(MarketDataError::InvalidVolatility { volatility: sigma });
        }
        Ok(Self { sigma })
    }

    /// The constant volatility.
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl VolatilitySurface for FlatVol {
    fn volatility(&self, strike: f64, expiry: f64) -> Result<f64, MarketDataError> {
        check_query(strike, expiry)?;
        Ok(self.sigma)
    }

    fn strike_domain(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }

    fn expiry_domain(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_everywhere() {
        let surface = FlatVol::new(0.2).unwrap();
        for &(k, t) in &[(50.0, 0.1), (100.0, 1.0), (250.0, 10.0)] {
            assert_eq!(surface.volatility(k, t).unwrap(), 0.2);
        }
    }

    #[test]
    fn test_rejects_invalid_sigma() {
        assert!(FlatVol::new(-0.1).is_err());
        assert!(FlatVol::new(f64::NAN).is_err());
        assert!(FlatVol::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_invalid_query() {
        let surface = FlatVol::new(0.2).unwrap();
        match surface.volatility(-1.0, 1.0).unwrap_err() {
            MarketDataError::InvalidStrike { strike } => assert_eq!(strike, -1.0),
            _ => panic!("Expected InvalidStrike"),
        }
    }
}
