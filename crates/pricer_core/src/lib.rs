//! # pricer_core: Foundation for the option pricing engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the 4-layer architecture, providing:
//! - Error taxonomy: `PricingError`, `SolverError`, `InterpolationError` (`types::error`)
//! - Day counts and time to maturity (`types::time`)
//! - Cooperative cancellation (`types::cancel`)
//! - The immutable `MarketEnvironment` snapshot and volatility surfaces (`market_data`)
//! - Interpolators, small dense linear algebra and solvers (`math`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - num-traits: generic interpolation over floating-point types
//! - chrono: date arithmetic for day counts
//! - thiserror: error derives
//! - tracing: structured diagnostics from surface building and solvers
//! - serde: serialisation of configuration types (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pricer_core::market_data::MarketEnvironment;
//! use pricer_core::types::time_to_maturity;
//!
//! let valuation = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! let expiry = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let t = time_to_maturity(valuation, expiry).unwrap();
//! assert!((t - 1.0).abs() < 1e-12);
//!
//! let env = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
//! assert!((env.forward(t) - 100.0 * 0.05_f64.exp()).abs() < 1e-12);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialisation for configuration, quotes and error types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
