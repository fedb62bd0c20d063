//! Monte Carlo configuration errors.

use pricer_core::types::PricingError;
use thiserror::Error;

use super::config::{MAX_PATHS, MAX_STEPS};

/// Rejected simulation settings.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Path count of zero or above [`MAX_PATHS`].
    #[error("path count {0} outside 1..={max}", max = MAX_PATHS)]
    PathCount(usize),
    /// Step count of zero or above [`MAX_STEPS`].
    #[error("step count {0} outside 1..={max}", max = MAX_STEPS)]
    StepCount(usize),
    /// Batches must hold at least one path.
    #[error("batch size must be at least 1")]
    EmptyBatch,
    /// A required builder field was never set.
    #[error("{0} is required")]
    Missing(&'static str),
}

impl From<ConfigError> for PricingError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::PathCount(paths) => PricingError::InvalidPathCount { paths },
            other => PricingError::InvalidInput(format!("Monte Carlo config: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_limit() {
        assert_eq!(
            ConfigError::StepCount(20_000).to_string(),
            "step count 20000 outside 1..=10000"
        );
        assert_eq!(ConfigError::Missing("n_paths").to_string(), "n_paths is required");
    }

    #[test]
    fn test_path_count_keeps_its_own_variant() {
        let err: PricingError = ConfigError::PathCount(0).into();
        assert_eq!(err, PricingError::InvalidPathCount { paths: 0 });

        let err: PricingError = ConfigError::EmptyBatch.into();
        assert!(matches!(err, PricingError::InvalidInput(ref msg) if msg.starts_with("Monte Carlo config")));
    }
}
