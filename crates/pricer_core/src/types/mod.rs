//! Core error, time and control types.
//!
//! This module provides:
//! - `error`: the shared pricing error taxonomy plus interpolation and solver errors
//! - `time`: day count conventions and Act/365 time-to-maturity
//! - `cancel`: a cloneable cooperative cancellation token

pub mod cancel;
pub mod error;
pub mod time;

pub use cancel::CancellationToken;
pub use error::{InterpolationError, PricingError, SolverError};
pub use time::{time_to_maturity, DayCountConvention};
