//! Instrument definitions.
//!
//! - [`Instrument`]: kind, strike, maturity and payoff of one contract
//! - [`OptionType`], [`PathPayoff`]: terminal and trajectory payoffs
//! - [`PathObserver`]: streaming statistics consumed by path payoffs

mod error;
mod instrument;
mod observer;
mod payoff;

pub use error::InstrumentError;
pub use instrument::{Instrument, InstrumentKind, Payoff};
pub use observer::PathObserver;
pub use payoff::{Averaging, BarrierType, LookbackType, OptionType, PathPayoff};
