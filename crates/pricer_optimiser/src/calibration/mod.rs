//! Volatility calibration.
//!
//! A [`Calibrator`] fits a [`VolatilityModel`] (flat, term structure or
//! strike × expiry grid) to a [`CalibrationTarget`] by repeatedly pricing
//! the quotes with any [`Pricer`](pricer_pricing::Pricer) under trial
//! environments. Levenberg-Marquardt is the default optimiser; a bounded
//! Nelder-Mead simplex is available for non-smooth objectives such as
//! low-path Monte Carlo.

mod bounds;
mod calibrator;
mod config;
mod model;
mod result;
mod target;

pub use bounds::ParameterBounds;
pub use calibrator::Calibrator;
pub use config::{CalibratorConfig, Optimiser};
pub use model::VolatilityModel;
pub use result::CalibrationResult;
pub use target::{CalibrationQuote, CalibrationTarget};
