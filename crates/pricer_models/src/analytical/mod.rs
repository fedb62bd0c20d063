//! Analytical pricing formulas.
//!
//! - Black-Scholes-Merton with continuous dividend yield and closed-form Greeks
//! - Geometric-average Asian closed forms (discrete and continuous sampling)
//! - Standard normal CDF/PDF (erfc-based, Abramowitz-Stegun)

pub mod black_scholes;
pub mod distributions;
pub mod error;
pub mod geometric_asian;

pub use black_scholes::{BlackScholes, Greeks};
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
pub use geometric_asian::{geometric_asian_price, AsianSampling};
