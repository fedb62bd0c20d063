//! Monte Carlo pricing engine.
//!
//! The [`MonteCarloPricer`] coordinates:
//! 1. Seeding: one run seed per pricer, one SplitMix64-derived stream per batch
//! 2. Path generation (terminal draw or full log-exact path)
//! 3. Payoff evaluation and discounting per path
//! 4. Ordered reduction of per-batch [`SampleStats`]
//!
//! # Determinism
//!
//! Batch `i` always covers the same paths and always draws from the same
//! stream, and batch statistics are merged in batch order after the
//! parallel map. Price and standard error are therefore bit-identical for
//! a given seed, whatever the size of the rayon pool.

use pricer_core::market_data::MarketEnvironment;
use pricer_core::types::{CancellationToken, PricingError};
use pricer_models::instruments::{Instrument, PathObserver, Payoff};
use rayon::prelude::*;
use tracing::{debug, info};

use super::config::MonteCarloConfig;
use super::lsm::LsmRun;
use super::paths::{GbmParams, StepCoefficients};
use super::stats::SampleStats;
use crate::pricer::Pricer;
use crate::result::{PricingMethod, PricingResult};
use crate::rng::{draw_seed, PricerRng};

const OPERATION: &str = "Monte Carlo";

/// Monte Carlo pricer for every instrument kind.
///
/// - European vanillas: one exact terminal draw per path
/// - path-dependent payoffs: a full path of `n_steps` exact GBM steps
/// - American vanillas: Longstaff-Schwartz regression on `n_steps` dates
///
/// The run seed is fixed at construction. Without a configured seed one is
/// drawn once and logged, and every later call reuses it, so bump-and-revalue
/// scenarios share the base evaluation's random numbers.
///
/// # Examples
///
/// ```rust
/// use pricer_core::market_data::MarketEnvironment;
/// use pricer_models::instruments::{Instrument, OptionType};
/// use pricer_pricing::mc::{MonteCarloConfig, MonteCarloPricer};
/// use pricer_pricing::Pricer;
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(20_000)
///     .n_steps(1)
///     .seed(42)
///     .build()
///     .unwrap();
/// let pricer = MonteCarloPricer::new(config).unwrap();
///
/// let env = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
/// let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
///
/// let first = pricer.price(&call, &env).unwrap();
/// let second = pricer.price(&call, &env).unwrap();
/// assert_eq!(first.price, second.price);
/// assert!((first.price - 10.4506).abs() < 4.0 * first.standard_error.unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct MonteCarloPricer {
    config: MonteCarloConfig,
    seed: u64,
    cancel: Option<CancellationToken>,
}

impl MonteCarloPricer {
    /// Creates a pricer, validating `config` and fixing the run seed.
    ///
    /// # Errors
    ///
    /// `InvalidPathCount` for zero (or too many) paths, `InvalidInput` for
    /// any other configuration problem.
    pub fn new(config: MonteCarloConfig) -> Result<Self, PricingError> {
        config.validate()?;
        let seed = match config.seed() {
            Some(seed) => seed,
            None => {
                let seed = draw_seed();
                info!(seed, "no Monte Carlo seed configured, drew one");
                seed
            }
        };
        Ok(Self {
            config,
            seed,
            cancel: None,
        })
    }

    /// Attaches a cancellation token, polled before every batch.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The run seed shared by every call on this pricer.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The simulation configuration.
    #[inline]
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Samples of one batch; `None` when cancellation was observed first.
    fn sample_batch(
        &self,
        batch: usize,
        instrument: &Instrument,
        params: &GbmParams,
    ) -> Option<SampleStats> {
        if self.cancelled() {
            return None;
        }
        let batch_size = self.config.batch_size();
        let start = batch * batch_size;
        let paths = batch_size.min(self.config.n_paths() - start);
        let mut rng = PricerRng::for_stream(self.seed, batch as u64);
        let df = params.discount_factor();
        let antithetic = self.config.antithetic();
        let mut stats = SampleStats::default();

        match instrument.payoff() {
            Payoff::Vanilla(option_type) => {
                let strike = instrument.strike();
                for _ in 0..paths {
                    let z = rng.gen_normal();
                    let mut value = option_type.intrinsic(params.terminal(z), strike);
                    if antithetic {
                        let twin = option_type.intrinsic(params.terminal(-z), strike);
                        value = 0.5 * (value + twin);
                    }
                    stats.push(df * value);
                }
            }
            Payoff::Path(payoff) => {
                let n_steps = self.config.n_steps();
                let step = StepCoefficients::new(params, n_steps);
                let strike = instrument.strike();
                let mut randoms = vec![0.0; n_steps];
                let mut observer = PathObserver::starting_at(params.spot);
                let walk = |sign: f64, observer: &mut PathObserver, randoms: &[f64]| {
                    observer.reset(params.spot);
                    let mut spot = params.spot;
                    for &z in randoms {
                        spot *= step.growth(sign * z);
                        observer.observe(spot);
                    }
                    payoff.evaluate(observer, strike)
                };
                for _ in 0..paths {
                    rng.fill_normal(&mut randoms);
                    let mut value = walk(1.0, &mut observer, &randoms);
                    if antithetic {
                        value = 0.5 * (value + walk(-1.0, &mut observer, &randoms));
                    }
                    stats.push(df * value);
                }
            }
        }
        Some(stats)
    }

    fn simulate(
        &self,
        instrument: &Instrument,
        params: &GbmParams,
    ) -> Result<SampleStats, PricingError> {
        let n_batches = self.config.n_batches();
        let partials: Vec<Option<SampleStats>> = (0..n_batches)
            .into_par_iter()
            .map(|batch| self.sample_batch(batch, instrument, params))
            .collect();

        let mut total = SampleStats::default();
        let mut completed = 0;
        for partial in &partials {
            if let Some(stats) = partial {
                total.merge(stats);
                completed += 1;
            }
        }
        if completed < n_batches {
            return Err(PricingError::cancelled(OPERATION, completed, n_batches));
        }
        Ok(total)
    }
}

impl Pricer for MonteCarloPricer {
    fn price(
        &self,
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Result<PricingResult, PricingError> {
        let params = GbmParams::for_instrument(instrument, env)?;

        let (mean, standard_error, steps_per_path) = if instrument.is_american() {
            let run = LsmRun {
                n_paths: self.config.n_paths(),
                n_steps: self.config.n_steps(),
                batch_size: self.config.batch_size(),
                antithetic: self.config.antithetic(),
                seed: self.seed,
                cancel: self.cancel.as_ref(),
            };
            let stats = run.run(instrument, &params)?;
            let exercise_now = instrument.intrinsic(params.spot);
            if exercise_now > stats.mean() {
                (exercise_now, 0.0, self.config.n_steps())
            } else {
                (stats.mean(), stats.standard_error(), self.config.n_steps())
            }
        } else {
            let stats = self.simulate(instrument, &params)?;
            let steps = if instrument.is_path_dependent() {
                self.config.n_steps()
            } else {
                1
            };
            (stats.mean(), stats.standard_error(), steps)
        };

        if !mean.is_finite() {
            return Err(PricingError::NumericalInstability(format!(
                "Monte Carlo estimate {mean} for {instrument}"
            )));
        }

        let paths = self.config.n_paths();
        let effective_paths = if self.config.antithetic() {
            2 * paths
        } else {
            paths
        };
        debug!(
            %instrument,
            paths,
            seed = self.seed,
            price = mean,
            standard_error,
            "Monte Carlo price"
        );

        Ok(PricingResult::new(mean.max(0.0), PricingMethod::MonteCarlo)
            .with_standard_error(standard_error)
            .with_diagnostic("paths", paths as f64)
            .with_diagnostic("effective_paths", effective_paths as f64)
            .with_diagnostic("steps_per_path", steps_per_path as f64)
            .with_diagnostic("batches", self.config.n_batches() as f64)
            .with_diagnostic("seed", self.seed as f64)
            .with_diagnostic("antithetic", if self.config.antithetic() { 1.0 } else { 0.0 }))
    }

    fn method(&self) -> PricingMethod {
        PricingMethod::MonteCarlo
    }
}
