//! # Pricer Models (L2: Business Logic)
//!
//! Option contracts and closed-form valuation.
//!
//! This crate provides:
//! - Instrument definitions: European, American and path-dependent options
//!   with vanilla, Asian, barrier and lookback payoffs
//! - Streaming path statistics consumed by path payoffs
//! - Black-Scholes-Merton prices and Greeks with continuous dividend yield
//! - Geometric-average Asian closed forms, used as simulation references
//!
//! ## Design Principles
//!
//! - **Enum-based payoffs** for static dispatch
//! - **Immutable value objects**: instruments are validated once and never mutated
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_models::analytical::BlackScholes;
//! use pricer_models::instruments::{Instrument, OptionType};
//!
//! let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
//! let bs = BlackScholes::new(100.0, 0.05, 0.0, 0.2).unwrap();
//! let price = bs.price(call.option_type(), call.strike(), call.maturity());
//! assert!((price - 10.4506).abs() < 1e-3);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod instruments;
