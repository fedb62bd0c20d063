//! Market data structures for option pricing.
//!
//! # Components
//!
//! - [`environment`]: the immutable [`MarketEnvironment`] snapshot and its [`Volatility`] input
//! - [`surfaces`]: volatility surface trait and implementations
//! - [`error`]: market data error types
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::MarketEnvironment;
//! use pricer_core::market_data::surfaces::VolatilitySurface;
//!
//! let env = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
//! assert_eq!(env.volatility().volatility(120.0, 2.0).unwrap(), 0.2);
//! ```

pub mod environment;
pub mod error;
pub mod surfaces;

pub use environment::{continuous_rate, MarketEnvironment, Volatility};
pub use error::MarketDataError;
pub use surfaces::{
    FlatVol, InterpolatedVolSurface, SurfaceInterpolation, VolQuote, VolSurfaceBuilder,
    VolatilitySurface,
};
