//! Numerical building blocks.
//!
//! - [`interpolators`]: linear and bilinear interpolation on sorted grids
//! - [`linalg`]: Cholesky solves and incremental normal equations
//! - [`solvers`]: Brent root finding, Levenberg-Marquardt and Nelder-Mead

pub mod interpolators;
pub mod linalg;
pub mod solvers;
