//! The capability interface shared by all pricing methods.

use pricer_core::market_data::MarketEnvironment;
use pricer_core::types::PricingError;
use pricer_models::analytical::Greeks;
use pricer_models::instruments::Instrument;

use crate::result::{PricingMethod, PricingResult};

/// A valuation method.
///
/// Implementations are immutable once built: every call reads the instrument
/// and environment it is given and nothing else, so one pricer can be shared
/// across threads and re-invoked under perturbed environments. The Greeks
/// engine and the calibrator rely on this to reuse the same seed or the same
/// tree construction for every scenario.
pub trait Pricer: Send + Sync {
    /// Prices `instrument` under `env`.
    ///
    /// # Errors
    ///
    /// `UnsupportedInstrument` when the method cannot handle the instrument
    /// kind; method-specific configuration errors otherwise.
    fn price(
        &self,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Result<PricingResult, PricingError>;

    /// The method implemented.
    fn method(&self) -> PricingMethod;

    /// Closed-form sensitivities, when the method has them.
    ///
    /// Returns `None` when the method has no closed form for this
    /// instrument; callers then fall back to finite differences.
    fn analytical_greeks(
        &self,
        _instrument: &Instrument,
        _env: &MarketEnvironment,
    ) -> Option<Result<Greeks, PricingError>> {
        None
    }
}

impl<P: Pricer + ?Sized> Pricer for &P {
    fn price(
        &self,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Result<PricingResult, PricingError> {
        (**self).price(instrument, env)
    }

    fn method(&self) -> PricingMethod {
        (**self).method()
    }

    fn analytical_greeks(
        &self,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Option<Result<Greeks, PricingError>> {
        (**self).analytical_greeks(instrument, env)
    }
}

impl<P: Pricer + ?Sized> Pricer for Box<P> {
    fn price(
        &self,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Result<PricingResult, PricingError> {
        (**self).price(instrument, env)
    }

    fn method(&self) -> PricingMethod {
        (**self).method()
    }

    fn analytical_greeks(
        &self,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Option<Result<Greeks, PricingError>> {
        (**self).analytical_greeks(instrument, env)
    }
}
