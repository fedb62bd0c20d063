//! # Pricer Optimiser (L4: Calibration)
//!
//! Inverse problems on top of the valuation engines.
//!
//! This crate provides:
//! - [`calibration`]: fits flat, term-structure or grid volatility models to
//!   observed option prices with Levenberg-Marquardt or Nelder-Mead, using any
//!   [`Pricer`](pricer_pricing::Pricer) as the pricing function
//! - [`implied_vol`]: Brent inversion of a pricer for volatility, per quote or
//!   per batch, and implied surface construction
//! - [`settings`]: every engine configuration in one TOML document
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_core::market_data::{MarketEnvironment, Volatility};
//! use pricer_models::instruments::{Instrument, OptionType};
//! use pricer_optimiser::calibration::{
//!     CalibrationTarget, Calibrator, ParameterBounds, VolatilityModel,
//! };
//! use pricer_pricing::analytical::AnalyticalPricer;
//! use pricer_pricing::Pricer;
//!
//! let base = MarketEnvironment::flat(100.0, 0.02, 0.0, 0.2).unwrap();
//! let model = VolatilityModel::TermStructure { expiries: vec![0.5, 1.0] };
//! let truth = model.environment(&base, &[0.3, 0.25]).unwrap();
//!
//! let pricer = AnalyticalPricer::new();
//! let quotes = [0.5, 1.0].map(|t| {
//!     let call = Instrument::european(OptionType::Call, 100.0, t).unwrap();
//!     (call, pricer.price(&call, &truth).unwrap().price)
//! });
//! let target = CalibrationTarget::from_prices(quotes).unwrap();
//!
//! let result = Calibrator::default()
//!     .calibrate(
//!         &target,
//!         &pricer,
//!         &base,
//!         &model,
//!         &model.initial_guess(&base).unwrap(),
//!         &[ParameterBounds::volatility(); 2],
//!     )
//!     .unwrap();
//!
//! assert!(result.converged);
//! assert!((result.parameter("sigma_T0.5").unwrap() - 0.3).abs() < 1e-4);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calibration;
pub mod implied_vol;
pub mod settings;

pub use calibration::{
    CalibrationQuote, CalibrationResult, CalibrationTarget, Calibrator, CalibratorConfig,
    Optimiser, ParameterBounds, VolatilityModel,
};
pub use implied_vol::{ImpliedVolConfig, ImpliedVolSolver};
pub use settings::{EngineSettings, SettingsError};
