//! Greeks result type.

use std::fmt;

use pricer_models::analytical::Greeks;

use crate::result::PricingMethod;

/// How a [`GreekSet`] was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GreeksSource {
    /// Closed-form partial derivatives
    Analytical,
    /// Central finite differences over revalued scenarios
    FiniteDifference,
}

impl fmt::Display for GreeksSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GreeksSource::Analytical => write!(f, "analytical"),
            GreeksSource::FiniteDifference => write!(f, "finite-difference"),
        }
    }
}

/// Sensitivities of one (instrument, environment, method) triple.
///
/// - `delta`: ∂V/∂S
/// - `gamma`: ∂²V/∂S²
/// - `vega`: ∂V/∂σ, per unit of volatility
/// - `theta`: ∂V/∂t = −∂V/∂T, per year
/// - `rho`: ∂V/∂r, per unit of rate
///
/// # Examples
///
/// ```rust
/// use pricer_models::analytical::Greeks;
/// use pricer_pricing::greeks::{GreekSet, GreeksSource};
/// use pricer_pricing::PricingMethod;
///
/// let greeks = Greeks { delta: 0.6, gamma: 0.02, vega: 37.5, theta: -6.4, rho: 53.2 };
/// let set = GreekSet::from_greeks(greeks, PricingMethod::Analytical, GreeksSource::Analytical);
/// assert_eq!(set.delta, 0.6);
/// assert_eq!(set.greeks(), greeks);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GreekSet {
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S²
    pub gamma: f64,
    /// ∂V/∂σ
    pub vega: f64,
    /// ∂V/∂t
    pub theta: f64,
    /// ∂V/∂r
    pub rho: f64,
    /// Pricing method the sensitivities belong to.
    pub method: PricingMethod,
    /// Closed form or finite differences.
    pub source: GreeksSource,
}

impl GreekSet {
    /// Tags plain Greeks with their method and source.
    pub fn from_greeks(greeks: Greeks, method: PricingMethod, source: GreeksSource) -> Self {
        Self {
            delta: greeks.delta,
            gamma: greeks.gamma,
            vega: greeks.vega,
            theta: greeks.theta,
            rho: greeks.rho,
            method,
            source,
        }
    }

    /// The five sensitivities without their tags.
    pub fn greeks(&self) -> Greeks {
        Greeks {
            delta: self.delta,
            gamma: self.gamma,
            vega: self.vega,
            theta: self.theta,
            rho: self.rho,
        }
    }

    /// `true` if every sensitivity is finite.
    pub fn is_finite(&self) -> bool {
        [self.delta, self.gamma, self.vega, self.theta, self.rho]
            .iter()
            .all(|g| g.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_display() {
        assert_eq!(GreeksSource::Analytical.to_string(), "analytical");
        assert_eq!(GreeksSource::FiniteDifference.to_string(), "finite-difference");
    }

    #[test]
    fn test_is_finite() {
        let mut set = GreekSet::from_greeks(
            Greeks::default(),
            PricingMethod::Lattice,
            GreeksSource::FiniteDifference,
        );
        assert!(set.is_finite());
        set.gamma = f64::NAN;
        assert!(!set.is_finite());
    }
}
