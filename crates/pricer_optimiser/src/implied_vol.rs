//! Implied volatility by pricer inversion.
//!
//! Brent's method on `price(σ) − market_price` over `[min_vol, max_vol]`.
//! Any [`Pricer`] can be inverted; quote batches choose the closed form for
//! European exercise and the binomial tree for American exercise.

use pricer_core::market_data::{
    InterpolatedVolSurface, MarketEnvironment, VolQuote, VolSurfaceBuilder, Volatility,
};
use pricer_core::math::solvers::{BrentSolver, SolverConfig};
use pricer_core::types::{PricingError, SolverError};
use pricer_models::instruments::Instrument;
use pricer_pricing::analytical::AnalyticalPricer;
use pricer_pricing::lattice::BinomialTreePricer;
use pricer_pricing::Pricer;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::calibration::CalibrationQuote;

/// Bracket and stopping rules for the inversion.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImpliedVolConfig {
    /// Lower end of the volatility bracket.
    pub min_vol: f64,
    /// Upper end of the volatility bracket.
    pub max_vol: f64,
    /// Tolerance on the price error and on the bracket half-width.
    pub accuracy: f64,
    /// Brent iteration budget.
    pub max_evaluations: usize,
    /// Tree size used to invert American quotes.
    pub lattice_steps: usize,
}

impl Default for ImpliedVolConfig {
    fn default() -> Self {
        Self {
            min_vol: 1e-7,
            max_vol: 4.0,
            accuracy: 1e-4,
            max_evaluations: 100,
            lattice_steps: 200,
        }
    }
}

impl ImpliedVolConfig {
    /// Checks the bracket, tolerance and budgets.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !(self.min_vol > 0.0 && self.min_vol < self.max_vol && self.max_vol.is_finite()) {
            return Err(PricingError::InvalidInput(format!(
                "implied volatility bracket [{}, {}] must satisfy 0 < min < max",
                self.min_vol, self.max_vol
            )));
        }
        if !(self.accuracy.is_finite() && self.accuracy > 0.0) {
            return Err(PricingError::InvalidInput(format!(
                "implied volatility accuracy must be positive, got {}",
                self.accuracy
            )));
        }
        if self.max_evaluations == 0 || self.lattice_steps == 0 {
            return Err(PricingError::InvalidInput(
                "implied volatility budgets must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Inverts pricers for volatility.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::MarketEnvironment;
/// use pricer_models::instruments::{Instrument, OptionType};
/// use pricer_optimiser::calibration::CalibrationQuote;
/// use pricer_optimiser::implied_vol::ImpliedVolSolver;
///
/// let env = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
/// let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
///
/// let sigma = ImpliedVolSolver::default()
///     .implied_vol(&CalibrationQuote::new(call, 10.4506), &env)
///     .unwrap();
/// assert!((sigma - 0.2).abs() < 1e-4);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ImpliedVolSolver {
    config: ImpliedVolConfig,
}

impl ImpliedVolSolver {
    /// Solver with a validated configuration.
    pub fn new(config: ImpliedVolConfig) -> Result<Self, PricingError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &ImpliedVolConfig {
        &self.config
    }

    /// Flat volatility at which `pricer` reproduces `price` under `env`.
    ///
    /// Pricing failures inside the bracket count as non-finite objective
    /// values. When the low end cannot be priced (a tree whose probability
    /// leaves (0, 1)), the low end is doubled until it can.
    ///
    /// # Errors
    ///
    /// `ImpliedVolatilityFailure` when the price is outside the bracket's
    /// price range, or the solver fails.
    pub fn solve<P: Pricer + ?Sized>(
        &self,
        pricer: &P,
        instrument: &Instrument,
        env: &MarketEnvironment,
        price: f64,
    ) -> Result<f64, PricingError> {
        let failure = |reason: String| PricingError::ImpliedVolatilityFailure {
            strike: instrument.strike(),
            maturity: instrument.maturity(),
            price,
            reason,
        };
        if !price.is_finite() || price < 0.0 {
            return Err(failure("price must be finite and non-negative".to_string()));
        }

        let objective = |sigma: f64| {
            Volatility::flat(sigma)
                .map_err(PricingError::from)
                .and_then(|vol| pricer.price(instrument, &env.with_volatility(vol)))
                .map_or(f64::NAN, |r| r.price - price)
        };

        let mut low = self.config.min_vol;
        while !objective(low).is_finite() && low < self.config.max_vol {
            low = (low * 2.0).min(self.config.max_vol);
        }

        let solver = BrentSolver::new(SolverConfig::new(
            self.config.accuracy,
            self.config.max_evaluations,
        ));
        let sigma = solver
            .find_root(objective, low, self.config.max_vol)
            .map_err(|e| match e {
                SolverError::NoBracket { a, b } => failure(format!(
                    "price not attainable for volatility in [{a}, {b}]"
                )),
                other => failure(other.to_string()),
            })?;
        debug!(
            strike = instrument.strike(),
            maturity = instrument.maturity(),
            price,
            sigma,
            "implied volatility solved"
        );
        Ok(sigma)
    }

    /// Implied volatility of one quote under the environment's spot, rate
    /// and dividend yield.
    ///
    /// European quotes are inverted with the closed form, American quotes
    /// with a binomial tree of `lattice_steps` slices.
    ///
    /// # Errors
    ///
    /// `UnsupportedInstrument` for path-dependent payoffs; otherwise as
    /// [`solve`](Self::solve).
    pub fn implied_vol(
        &self,
        quote: &CalibrationQuote,
        env: &MarketEnvironment,
    ) -> Result<f64, PricingError> {
        let instrument = &quote.instrument;
        if instrument.is_path_dependent() {
            return Err(PricingError::unsupported(
                instrument.to_string(),
                "implied volatility",
            ));
        }
        if instrument.is_american() {
            let pricer = BinomialTreePricer::new(self.config.lattice_steps);
            self.solve(&pricer, instrument, env, quote.market_price)
        } else {
            self.solve(&AnalyticalPricer::new(), instrument, env, quote.market_price)
        }
    }

    /// Implied volatilities of a quote batch, solved in parallel.
    ///
    /// Failed quotes are logged and filled from their neighbours with
    /// [`fill_missing`]; the output order matches the input order.
    ///
    /// # Errors
    ///
    /// The first quote's error when every quote fails.
    pub fn implied_vols(
        &self,
        quotes: &[CalibrationQuote],
        env: &MarketEnvironment,
    ) -> Result<Vec<f64>, PricingError> {
        let solved: Vec<Result<f64, PricingError>> = quotes
            .par_iter()
            .map(|q| self.implied_vol(q, env))
            .collect();

        let failed = solved.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(
                failed,
                total = quotes.len(),
                failure_rate = failed as f64 / quotes.len() as f64,
                "implied volatility failures filled from neighbours"
            );
        }

        let mut vols = Vec::with_capacity(solved.len());
        let mut first_error = None;
        for result in solved {
            match result {
                Ok(sigma) => vols.push(Some(sigma)),
                Err(err) => {
                    debug!(error = %err, "implied volatility failed");
                    first_error.get_or_insert(err);
                    vols.push(None);
                }
            }
        }
        if failed == quotes.len() {
            return Err(first_error.unwrap_or_else(|| {
                PricingError::InvalidInput("no quotes to invert".to_string())
            }));
        }
        fill_missing(&mut vols);
        Ok(vols.into_iter().flatten().collect())
    }

    /// Implied volatility surface from a quote batch.
    ///
    /// Inverts every quote, then pivots the volatilities onto the strike ×
    /// expiry grid with [`VolSurfaceBuilder`] (total-variance interpolation).
    pub fn implied_surface(
        &self,
        quotes: &[CalibrationQuote],
        env: &MarketEnvironment,
    ) -> Result<InterpolatedVolSurface, PricingError> {
        let vols = self.implied_vols(quotes, env)?;
        let points: Vec<VolQuote> = quotes
            .iter()
            .zip(vols)
            .map(|(q, sigma)| VolQuote::new(q.instrument.strike(), q.instrument.maturity(), sigma))
            .collect();
        Ok(VolSurfaceBuilder::new().build(&points)?)
    }
}

/// Replaces `None` entries with the previous value, then leading ones with
/// the next value. All-`None` input is left unchanged.
///
/// ```
/// use pricer_optimiser::implied_vol::fill_missing;
///
/// let mut vols = vec![None, Some(0.2), None, Some(0.25)];
/// fill_missing(&mut vols);
/// assert_eq!(vols, vec![Some(0.2), Some(0.2), Some(0.2), Some(0.25)]);
/// ```
pub fn fill_missing(values: &mut [Option<f64>]) {
    let mut last = None;
    for v in values.iter_mut() {
        match v {
            Some(x) => last = Some(*x),
            None => *v = last,
        }
    }
    let mut next = None;
    for v in values.iter_mut().rev() {
        match v {
            Some(x) => next = Some(*x),
            None => *v = next,
        }
    }
}
