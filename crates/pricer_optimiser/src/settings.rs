//! Engine settings loaded from TOML.
//!
//! Every table is optional; missing tables and keys take their defaults.
//!
//! ```toml
//! lattice_steps = 500
//!
//! [monte_carlo]
//! n_paths = 50000
//! n_steps = 52
//! seed = 42
//! antithetic = true
//!
//! [greeks]
//! spot_bump = 0.005
//!
//! [calibrator]
//! optimiser = "levenberg_marquardt"
//!
//! [calibrator.lm]
//! max_iterations = 200
//!
//! [implied_vol]
//! accuracy = 1e-6
//! ```

use std::path::Path;

use pricer_core::types::PricingError;
use pricer_pricing::lattice::{BinomialTreePricer, DEFAULT_TREE_STEPS};
use pricer_pricing::{GreeksConfig, GreeksEngine, MonteCarloConfig, MonteCarloPricer};
use thiserror::Error;
use tracing::info;

use crate::calibration::{Calibrator, CalibratorConfig};
use crate::implied_vol::{ImpliedVolConfig, ImpliedVolSolver};

/// Settings loading errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML is malformed or has wrongly typed keys.
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// A section parsed but failed validation.
    #[error("Invalid settings: {0}")]
    Invalid(#[from] PricingError),
}

/// Configuration of every engine component.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Time slices of the lattice pricer.
    pub lattice_steps: usize,
    /// Simulation settings.
    pub monte_carlo: MonteCarloConfig,
    /// Bump sizes and scheduling for sensitivities.
    pub greeks: GreeksConfig,
    /// Optimiser selection and stopping rules.
    pub calibrator: CalibratorConfig,
    /// Implied volatility bracket and accuracy.
    pub implied_vol: ImpliedVolConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            lattice_steps: DEFAULT_TREE_STEPS,
            monte_carlo: MonteCarloConfig::default(),
            greeks: GreeksConfig::default(),
            calibrator: CalibratorConfig::default(),
            implied_vol: ImpliedVolConfig::default(),
        }
    }
}

impl EngineSettings {
    /// Parse and validate settings from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a TOML settings file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "loaded engine settings");
        Ok(settings)
    }

    /// Serialise back to TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), PricingError> {
        self.monte_carlo.validate()?;
        if self.lattice_steps == 0 {
            return Err(PricingError::InvalidInput(
                "lattice_steps must be at least 1".to_string(),
            ));
        }
        self.greeks.validate()?;
        self.calibrator.validate()?;
        self.implied_vol.validate()
    }

    /// Monte Carlo pricer with these settings.
    pub fn monte_carlo_pricer(&self) -> Result<MonteCarloPricer, PricingError> {
        MonteCarloPricer::new(self.monte_carlo.clone())
    }

    /// Binomial tree pricer with `lattice_steps` slices.
    pub fn lattice_pricer(&self) -> BinomialTreePricer {
        BinomialTreePricer::new(self.lattice_steps)
    }

    /// Greeks engine with these bumps.
    pub fn greeks_engine(&self) -> Result<GreeksEngine, PricingError> {
        GreeksEngine::new(self.greeks.clone())
    }

    /// Calibrator with these stopping rules.
    pub fn calibrator(&self) -> Result<Calibrator, PricingError> {
        Calibrator::new(self.calibrator)
    }

    /// Implied volatility solver with this bracket.
    pub fn implied_vol_solver(&self) -> Result<ImpliedVolSolver, PricingError> {
        ImpliedVolSolver::new(self.implied_vol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Optimiser;

    #[test]
    fn test_empty_document_gives_defaults() {
        let settings = EngineSettings::from_toml_str("").unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_partial_sections() {
        let settings = EngineSettings::from_toml_str(
            r#"
            lattice_steps = 750

            [monte_carlo]
            n_paths = 20000
            seed = 7

            [calibrator]
            optimiser = "nelder_mead"
            "#,
        )
        .unwrap();
        assert_eq!(settings.lattice_steps, 750);
        assert_eq!(settings.monte_carlo.n_paths(), 20_000);
        assert_eq!(settings.monte_carlo.seed(), Some(7));
        assert_eq!(settings.monte_carlo.n_steps(), 100);
        assert_eq!(settings.calibrator.optimiser, Optimiser::NelderMead);
        assert_eq!(settings.lattice_pricer().steps(), 750);
        assert_eq!(settings.monte_carlo_pricer().unwrap().seed(), 7);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EngineSettings::from_toml_str("lattice_steps = 0").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = EngineSettings::from_toml_str("[greeks]\nspot_bump = -0.01").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = EngineSettings::from_toml_str("[monte_carlo]\nn_paths = 0").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid(PricingError::InvalidPathCount { paths: 0 })
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = EngineSettings::from_toml_str("lattice_steps = \"many\"").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut settings = EngineSettings::default();
        settings.lattice_steps = 321;
        settings.calibrator = settings.calibrator.with_max_iterations(42);
        let text = settings.to_toml_string().unwrap();
        assert_eq!(EngineSettings::from_toml_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_missing_file() {
        let err = EngineSettings::from_file("/nonexistent/engine.toml").unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }
}
