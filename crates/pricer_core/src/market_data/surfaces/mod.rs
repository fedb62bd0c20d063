//! Volatility surface abstractions for option pricing.
//!
//! This module provides:
//! - [`VolatilitySurface`]: trait for implied volatility lookup
//! - [`FlatVol`]: constant volatility
//! - [`InterpolatedVolSurface`]: strike × expiry grid with bilinear or total-variance interpolation
//! - [`VolSurfaceBuilder`]: builds a grid surface from scattered implied volatility quotes

mod builder;
mod flat;
mod interpolated;
mod traits;

pub use builder::{VolQuote, VolSurfaceBuilder};
pub use flat::FlatVol;
pub use interpolated::{InterpolatedVolSurface, SurfaceInterpolation};
pub use traits::VolatilitySurface;
