//! Geometric average Asian option closed forms.
//!
//! The geometric mean of lognormal prices is lognormal, so the option on it
//! has a Black-Scholes-type price. With ln G ~ N(μ, v):
//!
//! ```text
//! d2   = (μ - ln K) / √v,  d1 = d2 + √v
//! Call = e^(-rT) [e^(μ + v/2) N(d1) - K N(d2)]
//! Put  = e^(-rT) [K N(-d2) - e^(μ + v/2) N(-d1)]
//! ```
//!
//! Discrete sampling at t_i = iT/n, i = 1..n:
//!
//! ```text
//! μ = ln S + (r - q - σ²/2) T (n + 1) / (2n)
//! v = σ² T (n + 1)(2n + 1) / (6n²)
//! ```
//!
//! Continuous sampling is the n → ∞ limit (Kemna-Vorst, 1990): μ uses T/2 and
//! v = σ²T/3, i.e. σ_G = σ/√3 and F_G = S·exp((r - q - σ²/6)·T/2).

use super::black_scholes::BlackScholes;
use super::distributions::norm_cdf;
use super::error::AnalyticalError;
use crate::instruments::OptionType;

/// How the geometric average is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AsianSampling {
    /// `fixings` equally spaced dates ending at maturity (inception excluded).
    Discrete {
        /// Number of fixings
        fixings: usize,
    },
    /// Continuous monitoring over [0, T].
    Continuous,
}

/// Price of a geometric-average Asian option under `model`.
///
/// # Errors
/// `AnalyticalError::InvalidFixingCount` for zero discrete fixings.
///
/// # Examples
/// ```
/// use pricer_models::analytical::{geometric_asian_price, AsianSampling, BlackScholes};
/// use pricer_models::instruments::OptionType;
///
/// let bs = BlackScholes::new(100.0, 0.05, 0.0, 0.2).unwrap();
/// let asian = geometric_asian_price(&bs, OptionType::Call, 100.0, 1.0, AsianSampling::Continuous)
///     .unwrap();
/// // averaging damps volatility, so the Asian is cheaper than the vanilla
/// assert!(asian < bs.price_call(100.0, 1.0));
/// ```
pub fn geometric_asian_price(
    model: &BlackScholes,
    option_type: OptionType,
    strike: f64,
    maturity: f64,
    sampling: AsianSampling,
) -> Result<f64, AnalyticalError> {
    let (time_factor, variance_factor) = match sampling {
        AsianSampling::Discrete { fixings: 0 } => {
            return Err(AnalyticalError::InvalidFixingCount { fixings: 0 })
        }
        AsianSampling::Discrete { fixings } => {
            let n = fixings as f64;
            (
                (n + 1.0) / (2.0 * n),
                (n + 1.0) * (2.0 * n + 1.0) / (6.0 * n * n),
            )
        }
        AsianSampling::Continuous => (0.5, 1.0 / 3.0),
    };

    if maturity <= 0.0 {
        return Ok(option_type.intrinsic(model.spot(), strike));
    }

    let sigma = model.volatility();
    let carry = model.rate() - model.dividend_yield() - 0.5 * sigma * sigma;
    let mu = model.spot().ln() + carry * maturity * time_factor;
    let variance = sigma * sigma * maturity * variance_factor;
    let std_dev = variance.sqrt();

    let d2 = (mu - strike.ln()) / std_dev;
    let d1 = d2 + std_dev;
    let forward = (mu + 0.5 * variance).exp();
    let discount = (-model.rate() * maturity).exp();

    let price = match option_type {
        OptionType::Call => discount * (forward * norm_cdf(d1) - strike * norm_cdf(d2)),
        OptionType::Put => discount * (strike * norm_cdf(-d2) - forward * norm_cdf(-d1)),
    };
    if !price.is_finite() {
        return Err(AnalyticalError::NumericalInstability {
            message: format!("geometric Asian price {price} for K={strike}, T={maturity}"),
        });
    }
    Ok(price.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn model() -> BlackScholes {
        BlackScholes::new(100.0, 0.05, 0.01, 0.25).unwrap()
    }

    #[test]
    fn test_single_fixing_is_european() {
        let bs = model();
        for option_type in [OptionType::Call, OptionType::Put] {
            let asian = geometric_asian_price(
                &bs,
                option_type,
                95.0,
                1.0,
                AsianSampling::Discrete { fixings: 1 },
            )
            .unwrap();
            assert_relative_eq!(asian, bs.price(option_type, 95.0, 1.0), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_discrete_converges_to_continuous() {
        let bs = model();
        let continuous =
            geometric_asian_price(&bs, OptionType::Call, 100.0, 1.0, AsianSampling::Continuous)
                .unwrap();
        let dense = geometric_asian_price(
            &bs,
            OptionType::Call,
            100.0,
            1.0,
            AsianSampling::Discrete { fixings: 100_000 },
        )
        .unwrap();
        assert_relative_eq!(dense, continuous, epsilon = 1e-3);
    }

    #[test]
    fn test_kemna_vorst_reference() {
        // σ_G = σ/√3 on the adjusted forward, priced with Black's formula
        let bs = BlackScholes::new(100.0, 0.05, 0.0, 0.2).unwrap();
        let sigma_g = 0.2 / 3.0_f64.sqrt();
        let forward = 100.0 * ((0.05 - 0.2 * 0.2 / 6.0) * 0.5_f64).exp();
        let d1 = ((forward / 100.0).ln() + 0.5 * sigma_g * sigma_g) / sigma_g;
        let d2 = d1 - sigma_g;
        let expected = (-0.05_f64).exp() * (forward * norm_cdf(d1) - 100.0 * norm_cdf(d2));
        let price =
            geometric_asian_price(&bs, OptionType::Call, 100.0, 1.0, AsianSampling::Continuous)
                .unwrap();
        assert_relative_eq!(price, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_fixings_rejected() {
        assert!(matches!(
            geometric_asian_price(
                &model(),
                OptionType::Put,
                100.0,
                1.0,
                AsianSampling::Discrete { fixings: 0 }
            ),
            Err(AnalyticalError::InvalidFixingCount { .. })
        ));
    }
}
