//! Interpolation methods for numerical computation.
//!
//! ## Available Interpolators
//!
//! - [`LinearInterpolator`]: Piecewise linear interpolation between data points
//! - [`BilinearInterpolator`]: 2D grid interpolation for volatility surfaces
//!
//! Both are generic over `T: num_traits::Float` and share the [`locate`]
//! helper, which maps a query onto a grid cell and a linear weight.
//!
//! ## Example
//!
//! ```
//! use pricer_core::math::interpolators::{Interpolator, LinearInterpolator};
//!
//! let xs: [f64; 4] = [0.0, 1.0, 2.0, 3.0];
//! let ys = [0.0, 1.0, 4.0, 9.0];
//!
//! let interp = LinearInterpolator::new(&xs, &ys).unwrap();
//! assert_eq!(interp.domain(), (0.0, 3.0));
//!
//! let y = interp.interpolate(1.5).unwrap();
//! assert!((y - 2.5).abs() < 1e-10);
//! ```

mod bilinear;
mod linear;

pub use bilinear::BilinearInterpolator;
pub use linear::LinearInterpolator;

use crate::types::InterpolationError;
use num_traits::Float;

/// One-dimensional interpolation over a fixed domain.
pub trait Interpolator<T: Float> {
    /// Interpolated value at `x`, or `OutOfBounds` outside [`domain`](Self::domain).
    fn interpolate(&self, x: T) -> Result<T, InterpolationError>;

    /// Closed interval on which [`interpolate`](Self::interpolate) succeeds.
    fn domain(&self) -> (T, T);
}

/// Cell lookup on a sorted axis.
///
/// Returns `(i, j, w)` such that the value at `x` is `(1 - w) * v[i] + w * v[j]`.
/// Queries outside the axis are clamped to the nearest end node, and a
/// single-node axis always yields `(0, 0, 0)`.
pub fn locate<T: Float>(axis: &[T], x: T) -> (usize, usize, T) {
    let n = axis.len();
    if n <= 1 || x <= axis[0] {
        return (0, 0, T::zero());
    }
    if x >= axis[n - 1] {
        return (n - 1, n - 1, T::zero());
    }
    let hi = axis.partition_point(|&a| a <= x);
    let lo = hi - 1;
    let w = (x - axis[lo]) / (axis[hi] - axis[lo]);
    (lo, hi, w)
}

/// Checks that an axis is non-empty and strictly increasing.
pub(crate) fn validate_axis<T: Float>(axis: &[T], need: usize) -> Result<(), InterpolationError> {
    if axis.len() < need {
        return Err(InterpolationError::InsufficientData {
            got: axis.len(),
            need,
        });
    }
    for i in 1..axis.len() {
        if axis[i] <= axis[i - 1] {
            return Err(InterpolationError::NonMonotonicData { index: i });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_locate_interior() {
        let axis = [1.0, 2.0, 4.0];
        let (i, j, w) = locate(&axis, 3.0);
        assert_eq!((i, j), (1, 2));
        assert_relative_eq!(w, 0.5);
    }

    #[test]
    fn test_locate_on_node() {
        let axis = [1.0, 2.0, 4.0];
        let (i, j, w) = locate(&axis, 2.0);
        assert_eq!((i, j), (1, 2));
        assert_relative_eq!(w, 0.0);
    }

    #[test]
    fn test_locate_clamps() {
        let axis = [1.0, 2.0];
        assert_eq!(locate(&axis, 0.0), (0, 0, 0.0));
        assert_eq!(locate(&axis, 9.0), (1, 1, 0.0));
        assert_eq!(locate(&[5.0], 7.0), (0, 0, 0.0));
    }

    #[test]
    fn test_validate_axis() {
        assert!(validate_axis(&[1.0, 2.0], 2).is_ok());
        assert!(validate_axis::<f64>(&[], 1).is_err());
        assert_eq!(
            validate_axis(&[1.0, 1.0], 1),
            Err(InterpolationError::NonMonotonicData { index: 1 })
        );
    }
}
