//! Configuration for the Greeks engine.

use pricer_core::types::PricingError;

/// Bump widths and evaluation mode for the Greeks engine.
///
/// # Default Values
///
/// | Parameter | Default | Description |
/// |-----------|---------|-------------|
/// | `spot_bump` | 0.01 | Relative spot bump h/S |
/// | `vol_bump` | 0.001 | Absolute volatility bump |
/// | `rate_bump` | 0.0001 (1bp) | Absolute rate bump |
/// | `time_bump` | 1/365 | Maturity bump in years, capped at T/2 |
/// | `use_analytical` | true | Prefer the pricer's closed forms |
/// | `parallel` | true | Revalue scenarios on the rayon pool |
///
/// Wide bumps bias the difference quotient; narrow bumps amplify pricer
/// noise. Simulation Greeks in particular need bumps large compared with
/// the reported standard error, even with a shared seed.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::greeks::GreeksConfig;
///
/// let config = GreeksConfig::new()
///     .with_spot_bump(0.005)
///     .with_analytical(false);
/// assert!(config.validate().is_ok());
///
/// let bad = GreeksConfig::new().with_vol_bump(0.0);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GreeksConfig {
    /// Spot bump as a fraction of spot.
    pub spot_bump: f64,
    /// Absolute volatility bump.
    pub vol_bump: f64,
    /// Absolute rate bump.
    pub rate_bump: f64,
    /// Maturity bump in years.
    pub time_bump: f64,
    /// Return closed-form Greeks when the pricer has them.
    pub use_analytical: bool,
    /// Evaluate bump scenarios concurrently.
    pub parallel: bool,
}

impl Default for GreeksConfig {
    fn default() -> Self {
        Self {
            spot_bump: 1e-2,
            vol_bump: 1e-3,
            rate_bump: 1e-4,
            time_bump: 1.0 / 365.0,
            use_analytical: true,
            parallel: true,
        }
    }
}

impl GreeksConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the relative spot bump.
    pub fn with_spot_bump(mut self, bump: f64) -> Self {
        self.spot_bump = bump;
        self
    }

    /// Sets the volatility bump.
    pub fn with_vol_bump(mut self, bump: f64) -> Self {
        self.vol_bump = bump;
        self
    }

    /// Sets the rate bump.
    pub fn with_rate_bump(mut self, bump: f64) -> Self {
        self.rate_bump = bump;
        self
    }

    /// Sets the maturity bump.
    pub fn with_time_bump(mut self, bump: f64) -> Self {
        self.time_bump = bump;
        self
    }

    /// Enables or disables closed-form Greeks.
    pub fn with_analytical(mut self, use_analytical: bool) -> Self {
        self.use_analytical = use_analytical;
        self
    }

    /// Enables or disables concurrent scenario evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// `InvalidInput` naming the first bump that is not finite and positive.
    pub fn validate(&self) -> Result<(), PricingError> {
        let bumps = [
            ("spot_bump", self.spot_bump),
            ("vol_bump", self.vol_bump),
            ("rate_bump", self.rate_bump),
            ("time_bump", self.time_bump),
        ];
        for (name, value) in bumps {
            if !value.is_finite() || value <= 0.0 {
                return Err(PricingError::InvalidInput(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GreeksConfig::default();
        assert_eq!(config.spot_bump, 0.01);
        assert_eq!(config.rate_bump, 0.0001);
        assert!(config.use_analytical);
        assert!(config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder_pattern() {
        let config = GreeksConfig::new()
            .with_rate_bump(0.0005)
            .with_time_bump(0.01)
            .with_parallel(false);
        assert_eq!(config.rate_bump, 0.0005);
        assert_eq!(config.time_bump, 0.01);
        assert!(!config.parallel);
    }

    #[test]
    fn test_config_validation_names_bump() {
        let config = GreeksConfig {
            time_bump: -1.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("time_bump"));

        let config = GreeksConfig::new().with_spot_bump(f64::NAN);
        assert!(config.validate().is_err());
    }
}
