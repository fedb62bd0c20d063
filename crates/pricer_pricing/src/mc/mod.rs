//! Monte Carlo simulation pricer.
//!
//! # Architecture
//!
//! ```text
//! MonteCarloPricer
//! ├── MonteCarloConfig  (paths, steps, seed, antithetic, batch size)
//! ├── PricerRng         (one SplitMix64-derived stream per batch)
//! ├── paths             (exact GBM steps, antithetic twins)
//! ├── lsm               (Longstaff-Schwartz for American exercise)
//! └── SampleStats       (per-batch moments, merged in batch order)
//! ```
//!
//! Batches run on the rayon pool. Every batch owns its random stream and its
//! partial sums, and the reduction happens sequentially after the parallel
//! map, so the thread count never changes a result.

mod config;
mod error;
mod lsm;
mod paths;
mod pricer;
mod stats;

pub use config::{
    MonteCarloConfig, MonteCarloConfigBuilder, DEFAULT_BATCH_SIZE, MAX_PATHS, MAX_STEPS,
};
pub use error::ConfigError;
pub use lsm::basis as lsm_basis;
pub use paths::{fill_path, GbmParams, StepCoefficients};
pub use pricer::MonteCarloPricer;
pub use stats::SampleStats;
