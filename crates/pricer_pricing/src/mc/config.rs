//! Simulation settings for [`MonteCarloPricer`](super::MonteCarloPricer).

use super::error::ConfigError;

/// Upper limit on the path count.
pub const MAX_PATHS: usize = 10_000_000;

/// Upper limit on time steps per path.
pub const MAX_STEPS: usize = 10_000;

/// Paths simulated by one rayon task unless overridden.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// Path count, time grid, seeding and batching for one simulation.
///
/// Settings read from TOML skip the builder, so the pricer re-runs
/// [`validate`](Self::validate) on construction.
///
/// ```rust
/// use pricer_pricing::mc::MonteCarloConfig;
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(10_000)
///     .n_steps(52)
///     .seed(42)
///     .antithetic(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.n_batches(), 3);
/// assert_eq!(config.seed(), Some(42));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonteCarloConfig {
    n_paths: usize,
    n_steps: usize,
    seed: Option<u64>,
    antithetic: bool,
    batch_size: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            n_paths: 100_000,
            n_steps: 100,
            seed: None,
            antithetic: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl MonteCarloConfig {
    /// Starts a builder with no path or step count set.
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Paths to simulate. An antithetic pair counts once.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Time steps per path; for American payoffs these are the exercise dates.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Fixed seed, or `None` to draw one per pricer.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Whether each normal draw is paired with its negation.
    #[inline]
    pub fn antithetic(&self) -> bool {
        self.antithetic
    }

    /// Paths per parallel task.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Tasks the path count splits into; the last may be short.
    #[inline]
    pub fn n_batches(&self) -> usize {
        self.n_paths.div_ceil(self.batch_size.max(1))
    }

    /// Copy of these settings pinned to `seed`.
    pub fn with_seed(&self, seed: u64) -> Self {
        let mut pinned = self.clone();
        pinned.seed = Some(seed);
        pinned
    }

    /// Checks the counts against [`MAX_PATHS`] and [`MAX_STEPS`] and rejects
    /// an empty batch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_PATHS).contains(&self.n_paths) {
            Err(ConfigError::PathCount(self.n_paths))
        } else if !(1..=MAX_STEPS).contains(&self.n_steps) {
            Err(ConfigError::StepCount(self.n_steps))
        } else if self.batch_size == 0 {
            Err(ConfigError::EmptyBatch)
        } else {
            Ok(())
        }
    }
}

/// Builder for [`MonteCarloConfig`].
///
/// Path and step counts have no default here; every other field starts from
/// [`MonteCarloConfig::default`].
#[derive(Clone, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    n_paths: Option<usize>,
    n_steps: Option<usize>,
    seed: Option<u64>,
    antithetic: bool,
    batch_size: Option<usize>,
}

impl MonteCarloConfigBuilder {
    /// Path count.
    pub fn n_paths(self, n_paths: usize) -> Self {
        Self {
            n_paths: Some(n_paths),
            ..self
        }
    }

    /// Steps per path.
    pub fn n_steps(self, n_steps: usize) -> Self {
        Self {
            n_steps: Some(n_steps),
            ..self
        }
    }

    /// Fixes the generator seed.
    pub fn seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    /// Turns antithetic pairing on or off.
    pub fn antithetic(self, antithetic: bool) -> Self {
        Self { antithetic, ..self }
    }

    /// Overrides [`DEFAULT_BATCH_SIZE`].
    pub fn batch_size(self, batch_size: usize) -> Self {
        Self {
            batch_size: Some(batch_size),
            ..self
        }
    }

    /// Assembles and validates the settings.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] when a count was never given, otherwise
    /// whatever [`MonteCarloConfig::validate`] reports.
    pub fn build(self) -> Result<MonteCarloConfig, ConfigError> {
        let config = MonteCarloConfig {
            n_paths: self.n_paths.ok_or(ConfigError::Missing("n_paths"))?,
            n_steps: self.n_steps.ok_or(ConfigError::Missing("n_steps"))?,
            seed: self.seed,
            antithetic: self.antithetic,
            batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
        };
        config.validate()?;
        Ok(config)
    }
}
