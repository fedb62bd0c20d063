//! Black-Scholes-Merton pricing for European options.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·e^(-qT)·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·N(-d₂) - S·e^(-qT)·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r - q + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T

use super::distributions::{norm_cdf, norm_pdf};
use super::error::AnalyticalError;
use crate::instruments::OptionType;

/// Expiries at or below this are treated as expired.
const EXPIRY_EPSILON: f64 = 1e-10;

/// Closed-form sensitivities of one option.
///
/// Theta is the calendar-time derivative ∂V/∂t per year (= -∂V/∂T).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greeks {
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
}

/// Black-Scholes-Merton model for European option pricing.
///
/// # Examples
/// ```
/// use pricer_models::analytical::BlackScholes;
///
/// let bs = BlackScholes::new(100.0, 0.05, 0.02, 0.2).unwrap();
/// let call_price = bs.price_call(100.0, 1.0);
/// let put_price = bs.price_put(100.0, 1.0);
///
/// // Put-call parity: C - P = S·e^(-qT) - K·e^(-rT)
/// let forward_gap = 100.0 * (-0.02_f64).exp() - 100.0 * (-0.05_f64).exp();
/// assert!((call_price - put_price - forward_gap).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholes {
    spot: f64,
    rate: f64,
    dividend_yield: f64,
    volatility: f64,
}

impl BlackScholes {
    /// Creates a new Black-Scholes-Merton model.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidSpot` if spot <= 0
    /// - `AnalyticalError::InvalidRate` if rate is not finite
    /// - `AnalyticalError::InvalidDividendYield` if q < 0
    /// - `AnalyticalError::InvalidVolatility` if volatility <= 0
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    ///
    /// assert!(BlackScholes::new(100.0, 0.05, 0.0, 0.2).is_ok());
    /// assert!(BlackScholes::new(-100.0, 0.05, 0.0, 0.2).is_err());
    /// assert!(BlackScholes::new(100.0, 0.05, 0.0, 0.0).is_err());
    /// ```
    pub fn new(
        spot: f64,
        rate: f64,
        dividend_yield: f64,
        volatility: f64,
    ) -> Result<Self, AnalyticalError> {
        if !spot.is_finite() || spot <= 0.0 {
            return Err(AnalyticalError::InvalidSpot { spot });
        }
        if !rate.is_finite() {
            return Err(AnalyticalError::InvalidRate { rate });
        }
        if !dividend_yield.is_finite() || dividend_yield < 0.0 {
            return Err(AnalyticalError::InvalidDividendYield { dividend_yield });
        }
        if !volatility.is_finite() || volatility <= 0.0 {
            return Err(AnalyticalError::InvalidVolatility { volatility });
        }
        Ok(Self {
            spot,
            rate,
            dividend_yield,
            volatility,
        })
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Returns the risk-free rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the continuous dividend yield.
    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Computes the d1 term.
    ///
    /// d₁ = (ln(S/K) + (r - q + σ²/2)T) / (σ√T)
    ///
    /// Returns ±100 (or 0 at the money) for expired options.
    #[inline]
    pub fn d1(&self, strike: f64, expiry: f64) -> f64 {
        if expiry <= EXPIRY_EPSILON {
            return if self.spot > strike {
                100.0
            } else if self.spot < strike {
                -100.0
            } else {
                0.0
            };
        }
        let vol_sqrt_t = self.volatility * expiry.sqrt();
        let log_moneyness = (self.spot / strike).ln();
        let drift = (self.rate - self.dividend_yield + 0.5 * self.volatility * self.volatility) * expiry;
        (log_moneyness + drift) / vol_sqrt_t
    }

    /// Computes the d2 term: d₂ = d₁ - σ√T.
    #[inline]
    pub fn d2(&self, strike: f64, expiry: f64) -> f64 {
        if expiry <= EXPIRY_EPSILON {
            return self.d1(strike, expiry);
        }
        self.d1(strike, expiry) - self.volatility * expiry.sqrt()
    }

    #[inline]
    fn discounts(&self, expiry: f64) -> (f64, f64) {
        (
            (-self.rate * expiry).exp(),
            (-self.dividend_yield * expiry).exp(),
        )
    }

    /// European call price.
    ///
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    ///
    /// let bs = BlackScholes::new(100.0, 0.05, 0.0, 0.2).unwrap();
    /// assert!((bs.price_call(100.0, 1.0) - 10.4506).abs() < 1e-3);
    /// ```
    #[inline]
    pub fn price_call(&self, strike: f64, expiry: f64) -> f64 {
        if expiry <= EXPIRY_EPSILON {
            return (self.spot - strike).max(0.0);
        }
        let d1 = self.d1(strike, expiry);
        let d2 = self.d2(strike, expiry);
        let (df, qf) = self.discounts(expiry);
        (self.spot * qf * norm_cdf(d1) - strike * df * norm_cdf(d2)).max(0.0)
    }

    /// European put price.
    #[inline]
    pub fn price_put(&self, strike: f64, expiry: f64) -> f64 {
        if expiry <= EXPIRY_EPSILON {
            return (strike - self.spot).max(0.0);
        }
        let d1 = self.d1(strike, expiry);
        let d2 = self.d2(strike, expiry);
        let (df, qf) = self.discounts(expiry);
        (strike * df * norm_cdf(-d2) - self.spot * qf * norm_cdf(-d1)).max(0.0)
    }

    /// Price of a call or put.
    #[inline]
    pub fn price(&self, option_type: OptionType, strike: f64, expiry: f64) -> f64 {
        match option_type {
            OptionType::Call => self.price_call(strike, expiry),
            OptionType::Put => self.price_put(strike, expiry),
        }
    }

    /// Delta (∂V/∂S).
    ///
    /// - Call Delta = e^(-qT)·N(d₁)
    /// - Put Delta = -e^(-qT)·N(-d₁)
    #[inline]
    pub fn delta(&self, option_type: OptionType, strike: f64, expiry: f64) -> f64 {
        if expiry <= EXPIRY_EPSILON {
            return match option_type {
                OptionType::Call if self.spot > strike => 1.0,
                OptionType::Put if self.spot < strike => -1.0,
                _ => 0.0,
            };
        }
        let d1 = self.d1(strike, expiry);
        let (_, qf) = self.discounts(expiry);
        match option_type {
            OptionType::Call => qf * norm_cdf(d1),
            OptionType::Put => -qf * norm_cdf(-d1),
        }
    }

    /// Gamma (∂²V/∂S²) = e^(-qT)·φ(d₁) / (S·σ·√T), same for calls and puts.
    #[inline]
    pub fn gamma(&self, strike: f64, expiry: f64) -> f64 {
        if expiry <= EXPIRY_EPSILON {
            return 0.0;
        }
        let d1 = self.d1(strike, expiry);
        let (_, qf) = self.discounts(expiry);
        qf * norm_pdf(d1) / (self.spot * self.volatility * expiry.sqrt())
    }

    /// Vega (∂V/∂σ) = S·e^(-qT)·φ(d₁)·√T, same for calls and puts.
    #[inline]
    pub fn vega(&self, strike: f64, expiry: f64) -> f64 {
        if expiry <= EXPIRY_EPSILON {
            return 0.0;
        }
        let d1 = self.d1(strike, expiry);
        let (_, qf) = self.discounts(expiry);
        self.spot * qf * norm_pdf(d1) * expiry.sqrt()
    }

    /// Theta (∂V/∂t per year), usually negative.
    ///
    /// - Call: -S·e^(-qT)·φ(d₁)·σ/(2√T) + q·S·e^(-qT)·N(d₁) - r·K·e^(-rT)·N(d₂)
    /// - Put: -S·e^(-qT)·φ(d₁)·σ/(2√T) - q·S·e^(-qT)·N(-d₁) + r·K·e^(-rT)·N(-d₂)
    #[inline]
    pub fn theta(&self, option_type: OptionType, strike: f64, expiry: f64) -> f64 {
        if expiry <= EXPIRY_EPSILON {
            return 0.0;
        }
        let d1 = self.d1(strike, expiry);
        let d2 = self.d2(strike, expiry);
        let (df, qf) = self.discounts(expiry);
        let decay = -self.spot * qf * norm_pdf(d1) * self.volatility / (2.0 * expiry.sqrt());
        match option_type {
            OptionType::Call => {
                decay + self.dividend_yield * self.spot * qf * norm_cdf(d1)
                    - self.rate * strike * df * norm_cdf(d2)
            }
            OptionType::Put => {
                decay - self.dividend_yield * self.spot * qf * norm_cdf(-d1)
                    + self.rate * strike * df * norm_cdf(-d2)
            }
        }
    }

    /// Rho (∂V/∂r).
    ///
    /// - Call Rho = K·T·e^(-rT)·N(d₂)
    /// - Put Rho = -K·T·e^(-rT)·N(-d₂)
    #[inline]
    pub fn rho(&self, option_type: OptionType, strike: f64, expiry: f64) -> f64 {
        if expiry <= EXPIRY_EPSILON {
            return 0.0;
        }
        let d2 = self.d2(strike, expiry);
        let (df, _) = self.discounts(expiry);
        match option_type {
            OptionType::Call => strike * expiry * df * norm_cdf(d2),
            OptionType::Put => -strike * expiry * df * norm_cdf(-d2),
        }
    }

    /// All five sensitivities at once.
    pub fn greeks(&self, option_type: OptionType, strike: f64, expiry: f64) -> Greeks {
        Greeks {
            delta: self.delta(option_type, strike, expiry),
            gamma: self.gamma(strike, expiry),
            vega: self.vega(strike, expiry),
            theta: self.theta(option_type, strike, expiry),
            rho: self.rho(option_type, strike, expiry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn atm() -> BlackScholes {
        BlackScholes::new(100.0, 0.05, 0.0, 0.2).unwrap()
    }

    // ==========================================================
    // Constructor Tests
    // ==========================================================

    #[test]
    fn test_new_rejects_bad_inputs() {
        assert!(matches!(
            BlackScholes::new(0.0, 0.05, 0.0, 0.2),
            Err(AnalyticalError::InvalidSpot { .. })
        ));
        assert!(matches!(
            BlackScholes::new(100.0, f64::NAN, 0.0, 0.2),
            Err(AnalyticalError::InvalidRate { .. })
        ));
        assert!(matches!(
            BlackScholes::new(100.0, 0.05, -0.01, 0.2),
            Err(AnalyticalError::InvalidDividendYield { .. })
        ));
        assert!(matches!(
            BlackScholes::new(100.0, 0.05, 0.0, -0.2),
            Err(AnalyticalError::InvalidVolatility { .. })
        ));
    }

    #[test]
    fn test_negative_rate_allowed() {
        assert!(BlackScholes::new(100.0, -0.01, 0.0, 0.2).is_ok());
    }

    // ==========================================================
    // Pricing Tests
    // ==========================================================

    #[test]
    fn test_reference_call_price() {
        assert_relative_eq!(atm().price_call(100.0, 1.0), 10.4506, epsilon = 1e-3);
    }

    #[test]
    fn test_reference_put_price() {
        assert_relative_eq!(atm().price_put(100.0, 1.0), 5.5735, epsilon = 1e-3);
    }

    #[test]
    fn test_put_call_parity_with_dividends() {
        let bs = BlackScholes::new(105.0, 0.03, 0.04, 0.35).unwrap();
        for strike in [60.0, 90.0, 105.0, 140.0] {
            let lhs = bs.price_call(strike, 2.0) - bs.price_put(strike, 2.0);
            let rhs = 105.0 * (-0.08_f64).exp() - strike * (-0.06_f64).exp();
            assert_relative_eq!(lhs, rhs, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_dividend_lowers_call() {
        let with_q = BlackScholes::new(100.0, 0.05, 0.03, 0.2).unwrap();
        assert!(with_q.price_call(100.0, 1.0) < atm().price_call(100.0, 1.0));
        assert!(with_q.price_put(100.0, 1.0) > atm().price_put(100.0, 1.0));
    }

    #[test]
    fn test_expired_returns_intrinsic() {
        let bs = BlackScholes::new(110.0, 0.05, 0.0, 0.2).unwrap();
        assert_eq!(bs.price_call(100.0, 0.0), 10.0);
        assert_eq!(bs.price_put(100.0, 0.0), 0.0);
        assert_eq!(bs.delta(OptionType::Call, 100.0, 0.0), 1.0);
    }

    // ==========================================================
    // Greeks Tests
    // ==========================================================

    #[test]
    fn test_reference_greeks() {
        let g = atm().greeks(OptionType::Call, 100.0, 1.0);
        assert_relative_eq!(g.delta, 0.6368, epsilon = 1e-4);
        assert_relative_eq!(g.gamma, 0.018762, epsilon = 1e-5);
        assert_relative_eq!(g.vega, 37.524, epsilon = 1e-2);
        assert_relative_eq!(g.theta, -6.414, epsilon = 1e-2);
        assert_relative_eq!(g.rho, 53.232, epsilon = 1e-2);
    }

    #[test]
    fn test_delta_parity() {
        let bs = BlackScholes::new(100.0, 0.05, 0.02, 0.25).unwrap();
        let call = bs.delta(OptionType::Call, 95.0, 1.5);
        let put = bs.delta(OptionType::Put, 95.0, 1.5);
        assert_relative_eq!(call - put, (-0.03_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_greeks_match_finite_differences() {
        let bs = BlackScholes::new(100.0, 0.04, 0.01, 0.3).unwrap();
        let (k, t) = (110.0, 0.75);
        for option_type in [OptionType::Call, OptionType::Put] {
            let g = bs.greeks(option_type, k, t);
            let price = |s: f64, r: f64, v: f64, t: f64| {
                BlackScholes::new(s, r, 0.01, v).unwrap().price(option_type, k, t)
            };
            let h = 1e-4;
            let delta = (price(100.0 + h, 0.04, 0.3, t) - price(100.0 - h, 0.04, 0.3, t)) / (2.0 * h);
            let vega = (price(100.0, 0.04, 0.3 + h, t) - price(100.0, 0.04, 0.3 - h, t)) / (2.0 * h);
            let rho = (price(100.0, 0.04 + h, 0.3, t) - price(100.0, 0.04 - h, 0.3, t)) / (2.0 * h);
            let theta = -(price(100.0, 0.04, 0.3, t + h) - price(100.0, 0.04, 0.3, t - h)) / (2.0 * h);
            assert_relative_eq!(g.delta, delta, epsilon = 1e-4);
            assert_relative_eq!(g.vega, vega, epsilon = 1e-3);
            assert_relative_eq!(g.rho, rho, epsilon = 1e-3);
            assert_relative_eq!(g.theta, theta, epsilon = 1e-3);
        }
    }
}
