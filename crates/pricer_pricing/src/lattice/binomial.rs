//! Cox-Ross-Rubinstein binomial tree.
//!
//! ```text
//! Δt = T / n
//! u  = e^(σ√Δt),  d = 1/u
//! p  = (e^((r - q)Δt) - d) / (u - d)
//! V(i, j) = e^(-rΔt) [p V(i+1, j+1) + (1 - p) V(i+1, j)]
//! ```
//!
//! American nodes take max(continuation, intrinsic), root included.
//! The tree matches the first two moments of the lognormal step, so the
//! price error decreases as O(1/n).

use pricer_core::market_data::MarketEnvironment;
use pricer_core::types::PricingError;
use pricer_models::instruments::Instrument;
use tracing::debug;

use crate::pricer::Pricer;
use crate::result::{PricingMethod, PricingResult};

/// Default number of time slices.
pub const DEFAULT_TREE_STEPS: usize = 200;

const METHOD: &str = "lattice";

/// Binomial tree pricer for European and American vanillas.
///
/// The step count is fixed at construction, so every call (including every
/// Greeks scenario) is valued on the same tree construction.
///
/// # Examples
///
/// ```rust
/// use pricer_core::market_data::MarketEnvironment;
/// use pricer_models::instruments::{Instrument, OptionType};
/// use pricer_pricing::lattice::BinomialTreePricer;
/// use pricer_pricing::Pricer;
///
/// let env = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
/// let put = Instrument::american(OptionType::Put, 100.0, 1.0).unwrap();
///
/// let result = BinomialTreePricer::new(500).price(&put, &env).unwrap();
/// assert!(result.price > 5.5735); // early exercise premium over the European
/// assert_eq!(result.diagnostic("steps"), Some(500.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinomialTreePricer {
    steps: usize,
}

impl Default for BinomialTreePricer {
    fn default() -> Self {
        Self::new(DEFAULT_TREE_STEPS)
    }
}

impl BinomialTreePricer {
    /// Pricer with `steps` time slices. Zero is rejected when pricing.
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }

    /// Number of time slices.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Pricer for BinomialTreePricer {
    fn price(
        &self,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Result<PricingResult, PricingError> {
        if instrument.is_path_dependent() {
            return Err(PricingError::unsupported(instrument.to_string(), METHOD));
        }

        let (strike, maturity) = (instrument.strike(), instrument.maturity());
        let sigma = env.volatility_for(strike, maturity)?;
        let (rate, q) = (env.rate(), env.dividend_yield());
        let steps = self.steps;

        let invalid = |probability: f64| PricingError::InvalidTreeParameters {
            steps,
            volatility: sigma,
            rate,
            dividend_yield: q,
            probability,
        };
        if steps == 0 {
            return Err(invalid(f64::NAN));
        }

        let dt = maturity / steps as f64;
        let u = (sigma * dt.sqrt()).exp();
        let d = 1.0 / u;
        let p = (((rate - q) * dt).exp() - d) / (u - d);
        if !p.is_finite() || p <= 0.0 || p >= 1.0 {
            return Err(invalid(p));
        }

        let discount = (-rate * dt).exp();
        let (disc_p, disc_1mp) = (discount * p, discount * (1.0 - p));
        let american = instrument.is_american();
        let spot = env.spot();
        // Price at slice i after j up-moves; exactly `spot` at the root.
        let node = |i: usize, j: usize| spot * u.powi(2 * j as i32 - i as i32);

        let mut values: Vec<f64> = (0..=steps)
            .map(|j| instrument.intrinsic(node(steps, j)))
            .collect();
        for i in (0..steps).rev() {
            for j in 0..=i {
                let continuation = disc_p * values[j + 1] + disc_1mp * values[j];
                values[j] = if american {
                    continuation.max(instrument.intrinsic(node(i, j)))
                } else {
                    continuation
                };
            }
        }

        let price = values[0].max(0.0);
        debug!(%instrument, steps, up = u, probability = p, price, "binomial tree price");

        Ok(PricingResult::new(price, PricingMethod::Lattice)
            .with_diagnostic("steps", steps as f64)
            .with_diagnostic("up_factor", u)
            .with_diagnostic("down_factor", d)
            .with_diagnostic("probability", p))
    }

    fn method(&self) -> PricingMethod {
        PricingMethod::Lattice
    }
}
