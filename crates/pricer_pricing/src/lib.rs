//! # Pricer Pricing (L3: Valuation Engines)
//!
//! Interchangeable valuation methods behind one capability interface, and a
//! Greeks engine that treats them uniformly.
//!
//! This crate provides:
//! - [`Pricer`]: the capability trait every method implements
//! - [`analytical`]: Black-Scholes-Merton for European vanillas, with closed-form Greeks
//! - [`lattice`]: Cox-Ross-Rubinstein binomial tree with early exercise
//! - [`mc`]: batched, seed-deterministic Monte Carlo for every instrument kind,
//!   with Longstaff-Schwartz regression for American exercise
//! - [`rng`]: explicit, seedable random streams
//! - [`greeks`]: closed-form or bump-and-revalue sensitivities
//!
//! ## Design Principles
//!
//! - **Immutable inputs**: pricers only read the instrument and environment
//!   they are given, so one pricer can serve many threads and scenarios
//! - **No silent fallback**: a method that cannot price an instrument says so
//! - **Reproducible simulation**: the run seed is fixed per pricer and the
//!   parallel reduction happens in a fixed order
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_core::market_data::MarketEnvironment;
//! use pricer_models::instruments::{Instrument, OptionType};
//! use pricer_pricing::analytical::AnalyticalPricer;
//! use pricer_pricing::greeks::GreeksEngine;
//! use pricer_pricing::lattice::BinomialTreePricer;
//! use pricer_pricing::Pricer;
//!
//! let env = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
//! let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
//!
//! let pricers: Vec<Box<dyn Pricer>> = vec![
//!     Box::new(AnalyticalPricer::new()),
//!     Box::new(BinomialTreePricer::new(1000)),
//! ];
//! for pricer in &pricers {
//!     let result = pricer.price(&call, &env).unwrap();
//!     assert!((result.price - 10.4506).abs() < 1e-2);
//! }
//!
//! let greeks = GreeksEngine::default().compute(&AnalyticalPricer::new(), &call, &env).unwrap();
//! assert!(greeks.delta > 0.0 && greeks.delta < 1.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod greeks;
pub mod lattice;
pub mod mc;
pub mod rng;

mod pricer;
mod result;

pub use greeks::{GreekSet, GreeksConfig, GreeksEngine, GreeksSource};
pub use mc::{MonteCarloConfig, MonteCarloPricer};
pub use pricer::Pricer;
pub use result::{Diagnostics, PricingMethod, PricingResult};
