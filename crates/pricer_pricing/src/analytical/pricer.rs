//! Black-Scholes-Merton pricer.

use pricer_core::market_data::MarketEnvironment;
use pricer_core::types::PricingError;
use pricer_models::analytical::{BlackScholes, Greeks};
use pricer_models::instruments::{Instrument, Payoff};
use tracing::debug;

use crate::pricer::Pricer;
use crate::result::{PricingMethod, PricingResult};

const METHOD: &str = "analytical";

/// Closed-form pricer for European calls and puts.
///
/// American and path-dependent instruments are rejected with
/// `UnsupportedInstrument`; there is no silent fallback to another method.
///
/// # Examples
///
/// ```rust
/// use pricer_core::market_data::MarketEnvironment;
/// use pricer_models::instruments::{Instrument, OptionType};
/// use pricer_pricing::analytical::AnalyticalPricer;
/// use pricer_pricing::Pricer;
///
/// let env = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
/// let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
///
/// let result = AnalyticalPricer::new().price(&call, &env).unwrap();
/// assert!((result.price - 10.4506).abs() < 1e-3);
///
/// let american = Instrument::american(OptionType::Call, 100.0, 1.0).unwrap();
/// assert!(AnalyticalPricer::new().price(&american, &env).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticalPricer;

impl AnalyticalPricer {
    /// Creates the pricer.
    pub fn new() -> Self {
        Self
    }

    fn model(
        &self,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Result<BlackScholes, PricingError> {
        if !Self::supports(instrument) {
            return Err(PricingError::unsupported(instrument.to_string(), METHOD));
        }
        let sigma = env.volatility_for(instrument.strike(), instrument.maturity())?;
        Ok(BlackScholes::new(
            env.spot(),
            env.rate(),
            env.dividend_yield(),
            sigma,
        )?)
    }

    fn supports(instrument: &Instrument) -> bool {
        !instrument.is_american() && matches!(instrument.payoff(), Payoff::Vanilla(_))
    }
}

impl Pricer for AnalyticalPricer {
    fn price(
        &self,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Result<PricingResult, PricingError> {
        let model = self.model(instrument, env)?;
        let (strike, maturity) = (instrument.strike(), instrument.maturity());
        let price = model.price(instrument.option_type(), strike, maturity);
        if !price.is_finite() {
            return Err(PricingError::NumericalInstability(format!(
                "closed form returned {price} for {instrument}"
            )));
        }
        debug!(%instrument, price, "analytical price");

        Ok(PricingResult::new(price, PricingMethod::Analytical)
            .with_diagnostic("volatility", model.volatility())
            .with_diagnostic("d1", model.d1(strike, maturity))
            .with_diagnostic("d2", model.d2(strike, maturity)))
    }

    fn method(&self) -> PricingMethod {
        PricingMethod::Analytical
    }

    fn analytical_greeks(
        &self,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Option<Result<Greeks, PricingError>> {
        if !Self::supports(instrument) {
            return None;
        }
        Some(self.model(instrument, env).map(|model| {
            model.greeks(
                instrument.option_type(),
                instrument.strike(),
                instrument.maturity(),
            )
        }))
    }
}
