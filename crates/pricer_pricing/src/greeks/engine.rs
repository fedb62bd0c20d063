//! Bump-and-revalue Greeks over any [`Pricer`].
//!
//! ```text
//! Δ = (V(S+h) − V(S−h)) / 2h          h = spot_bump × S
//! Γ = (V(S+h) − 2V(S) + V(S−h)) / h²
//! ν = (V(σ+dσ) − V(σ−dσ)) / 2dσ
//! ρ = (V(r+dr) − V(r−dr)) / 2dr
//! Θ = −(V(T+dT) − V(T−dT)) / 2dT      dT = min(time_bump, T/2)
//! ```
//!
//! Every scenario is priced by the same pricer object, so a Monte Carlo
//! pricer replays the base evaluation's seed and a lattice pricer rebuilds
//! the same number of slices. Scenarios are independent and may run on the
//! rayon pool; the quotients are formed afterwards in a fixed order, so the
//! parallel and sequential paths give the same numbers.

use pricer_core::market_data::MarketEnvironment;
use pricer_core::types::PricingError;
use pricer_models::instruments::Instrument;
use rayon::prelude::*;
use tracing::debug;

use super::config::GreeksConfig;
use super::result::{GreekSet, GreeksSource};
use crate::pricer::Pricer;

/// Revaluation points, in evaluation order.
const BASE: usize = 0;
const SPOT_UP: usize = 1;
const SPOT_DOWN: usize = 2;
const VOL_UP: usize = 3;
const VOL_DOWN: usize = 4;
const RATE_UP: usize = 5;
const RATE_DOWN: usize = 6;
const TIME_UP: usize = 7;
const TIME_DOWN: usize = 8;

/// Computes [`GreekSet`]s for any pricing method.
///
/// # Examples
///
/// ```rust
/// use pricer_core::market_data::MarketEnvironment;
/// use pricer_models::instruments::{Instrument, OptionType};
/// use pricer_pricing::greeks::{GreeksConfig, GreeksEngine, GreeksSource};
/// use pricer_pricing::lattice::BinomialTreePricer;
///
/// let env = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
/// let put = Instrument::american(OptionType::Put, 100.0, 1.0).unwrap();
///
/// let engine = GreeksEngine::new(GreeksConfig::default()).unwrap();
/// let greeks = engine.compute(&BinomialTreePricer::new(400), &put, &env).unwrap();
///
/// assert_eq!(greeks.source, GreeksSource::FiniteDifference);
/// assert!(greeks.delta < 0.0 && greeks.delta > -1.0);
/// assert!(greeks.vega > 0.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GreeksEngine {
    config: GreeksConfig,
}

impl GreeksEngine {
    /// Creates an engine after validating `config`.
    pub fn new(config: GreeksConfig) -> Result<Self, PricingError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The engine configuration.
    pub fn config(&self) -> &GreeksConfig {
        &self.config
    }

    /// Greeks of `instrument` under `env` as seen by `pricer`.
    ///
    /// Closed forms are used when enabled and offered by the pricer;
    /// otherwise falls back to [`GreeksEngine::finite_difference`].
    ///
    /// # Errors
    ///
    /// Any error of the pricer, or of building a bumped scenario, is
    /// returned unchanged.
    pub fn compute<P: Pricer + ?Sized>(
        &self,
        pricer: &P,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Result<GreekSet, PricingError> {
        if self.config.use_analytical {
            if let Some(greeks) = pricer.analytical_greeks(instrument, env) {
                return Ok(GreekSet::from_greeks(
                    greeks?,
                    pricer.method(),
                    GreeksSource::Analytical,
                ));
            }
        }
        self.finite_difference(pricer, instrument, env)
    }

    /// Central finite-difference Greeks, ignoring any closed forms.
    pub fn finite_difference<P: Pricer + ?Sized>(
        &self,
        pricer: &P,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Result<GreekSet, PricingError> {
        let cfg = &self.config;
        let h = cfg.spot_bump * env.spot();
        let dt = cfg.time_bump.min(0.5 * instrument.maturity());
        let maturity = instrument.maturity();

        let scenarios: Vec<(Instrument, MarketEnvironment)> = vec![
            (*instrument, env.clone()),
            (*instrument, env.bump_spot(h)?),
            (*instrument, env.bump_spot(-h)?),
            (*instrument, env.bump_volatility(cfg.vol_bump)?),
            (*instrument, env.bump_volatility(-cfg.vol_bump)?),
            (*instrument, env.bump_rate(cfg.rate_bump)?),
            (*instrument, env.bump_rate(-cfg.rate_bump)?),
            (instrument.with_maturity(maturity + dt)?, env.clone()),
            (instrument.with_maturity(maturity - dt)?, env.clone()),
        ];

        let revalue = |(inst, scenario): &(Instrument, MarketEnvironment)| {
            pricer.price(inst, scenario).map(|r| r.price)
        };
        let v: Vec<f64> = if cfg.parallel {
            scenarios.par_iter().map(revalue).collect::<Result<_, _>>()?
        } else {
            scenarios.iter().map(revalue).collect::<Result<_, _>>()?
        };

        let set = GreekSet {
            delta: (v[SPOT_UP] - v[SPOT_DOWN]) / (2.0 * h),
            gamma: (v[SPOT_UP] - 2.0 * v[BASE] + v[SPOT_DOWN]) / (h * h),
            vega: (v[VOL_UP] - v[VOL_DOWN]) / (2.0 * cfg.vol_bump),
            theta: -(v[TIME_UP] - v[TIME_DOWN]) / (2.0 * dt),
            rho: (v[RATE_UP] - v[RATE_DOWN]) / (2.0 * cfg.rate_bump),
            method: pricer.method(),
            source: GreeksSource::FiniteDifference,
        };
        debug!(
            %instrument,
            method = %set.method,
            delta = set.delta,
            gamma = set.gamma,
            vega = set.vega,
            "finite-difference Greeks"
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytical::AnalyticalPricer;
    use crate::mc::{MonteCarloConfig, MonteCarloPricer};
    use crate::result::PricingMethod;
    use approx::assert_relative_eq;
    use pricer_models::instruments::OptionType;

    fn env() -> MarketEnvironment {
        MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GreeksConfig::new().with_rate_bump(0.0);
        assert!(matches!(
            GreeksEngine::new(config),
            Err(PricingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_analytical_source_when_available() {
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        let engine = GreeksEngine::default();
        let greeks = engine.compute(&AnalyticalPricer::new(), &call, &env()).unwrap();
        assert_eq!(greeks.source, GreeksSource::Analytical);
        assert_eq!(greeks.method, PricingMethod::Analytical);
        assert_relative_eq!(greeks.delta, 0.6368, epsilon = 1e-4);
    }

    #[test]
    fn test_finite_difference_matches_closed_form() {
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        let pricer = AnalyticalPricer::new();
        let exact = GreeksEngine::default().compute(&pricer, &call, &env()).unwrap();
        let engine = GreeksEngine::new(GreeksConfig::new().with_analytical(false)).unwrap();
        let bumped = engine.compute(&pricer, &call, &env()).unwrap();

        assert_eq!(bumped.source, GreeksSource::FiniteDifference);
        assert_relative_eq!(bumped.delta, exact.delta, epsilon = 1e-3);
        assert_relative_eq!(bumped.gamma, exact.gamma, epsilon = 1e-3);
        assert_relative_eq!(bumped.vega, exact.vega, epsilon = 1e-2);
        assert_relative_eq!(bumped.theta, exact.theta, epsilon = 1e-2);
        assert_relative_eq!(bumped.rho, exact.rho, epsilon = 1e-2);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let config = MonteCarloConfig::builder()
            .n_paths(20_000)
            .n_steps(1)
            .seed(7)
            .build()
            .unwrap();
        let pricer = MonteCarloPricer::new(config).unwrap();
        let put = Instrument::european(OptionType::Put, 100.0, 1.0).unwrap();

        let parallel = GreeksEngine::default().compute(&pricer, &put, &env()).unwrap();
        let sequential = GreeksEngine::new(GreeksConfig::new().with_parallel(false))
            .unwrap()
            .compute(&pricer, &put, &env())
            .unwrap();
        assert_eq!(parallel, sequential);
        assert!(parallel.delta < 0.0 && parallel.delta > -1.0);
    }

    #[test]
    fn test_time_bump_capped_for_short_maturity() {
        let call = Instrument::european(OptionType::Call, 100.0, 0.001).unwrap();
        let engine = GreeksEngine::new(GreeksConfig::new().with_analytical(false)).unwrap();
        let greeks = engine
            .compute(&AnalyticalPricer::new(), &call, &env())
            .unwrap();
        assert!(greeks.theta.is_finite());
        assert!(greeks.theta < 0.0);
    }
}
