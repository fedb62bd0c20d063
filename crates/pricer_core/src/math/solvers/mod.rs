//! Root-finding and optimisation solvers.
//!
//! ## Root-Finding
//!
//! - [`BrentSolver`]: bracketing method without derivatives, used to invert
//!   pricers for implied volatility
//!
//! ## Optimisation
//!
//! - [`LevenbergMarquardtSolver`]: nonlinear least squares for calibration
//! - [`NelderMeadSolver`]: derivative-free simplex search
//!
//! Both optimisers accept [`BoxBounds`], reject trial points whose objective
//! is not finite, and check an optional
//! [`CancellationToken`](crate::types::CancellationToken) between iterations.
//!
//! ## Example
//!
//! ```
//! use pricer_core::math::solvers::{LevenbergMarquardtSolver, LMConfig};
//!
//! // Minimise (p[0] - 2)² + (p[1] - 3)²
//! let residuals = |params: &[f64]| -> Vec<f64> {
//!     vec![params[0] - 2.0, params[1] - 3.0]
//! };
//!
//! let solver = LevenbergMarquardtSolver::with_defaults();
//! let result = solver.solve(residuals, vec![0.0, 0.0]).unwrap();
//!
//! assert!(result.converged);
//! assert!((result.params[0] - 2.0).abs() < 1e-6);
//! ```

mod bounds;
mod brent;
mod config;
mod levenberg_marquardt;
mod nelder_mead;

pub use bounds::BoxBounds;
pub use brent::BrentSolver;
pub use config::{SolverConfig, TerminationReason};
pub use levenberg_marquardt::{LMConfig, LMResult, LevenbergMarquardtSolver};
pub use nelder_mead::{NelderMeadConfig, NelderMeadResult, NelderMeadSolver};
