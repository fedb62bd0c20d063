//! Linear interpolation implementation.

use super::{locate, Interpolator};
use crate::types::InterpolationError;
use num_traits::Float;

/// Piecewise linear interpolator.
///
/// Data points are sorted by x-coordinate during construction. At least two
/// points with distinct x values are required.
///
/// # Example
///
/// ```
/// use pricer_core::math::interpolators::{Interpolator, LinearInterpolator};
///
/// let interp = LinearInterpolator::<f64>::new(&[2.0, 0.0], &[4.0, 0.0]).unwrap();
/// assert_eq!(interp.domain(), (0.0, 2.0));
/// assert!((interp.interpolate(0.5).unwrap() - 1.0).abs() < 1e-12);
/// assert_eq!(interp.interpolate_clamped(5.0), 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
}

impl<T: Float> LinearInterpolator<T> {
    /// Construct a linear interpolator from x and y data points.
    ///
    /// # Errors
    ///
    /// * `InterpolationError::InvalidInput` - Mismatched lengths
    /// * `InterpolationError::InsufficientData` - Fewer than 2 points
    /// * `InterpolationError::NonMonotonicData` - Duplicate x values
    pub fn new(xs: &[T], ys: &[T]) -> Result<Self, InterpolationError> {
        if xs.len() != ys.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "xs and ys must have same length: got {} and {}",
                xs.len(),
                ys.len()
            )));
        }

        let mut pairs: Vec<(T, T)> = xs.iter().copied().zip(ys.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let (xs, ys): (Vec<T>, Vec<T>) = pairs.into_iter().unzip();

        super::validate_axis(&xs, 2)?;
        Ok(Self { xs, ys })
    }

    /// Sorted x-coordinates.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Interpolates with flat extrapolation beyond either end.
    pub fn interpolate_clamped(&self, x: T) -> T {
        let (i, j, w) = locate(&self.xs, x);
        self.ys[i] + w * (self.ys[j] - self.ys[i])
    }
}

impl<T: Float> Interpolator<T> for LinearInterpolator<T> {
    fn interpolate(&self, x: T) -> Result<T, InterpolationError> {
        let (min, max) = self.domain();
        if x < min || x > max {
            return Err(InterpolationError::OutOfBounds {
                x: x.to_f64().unwrap_or(f64::NAN),
                min: min.to_f64().unwrap_or(f64::NAN),
                max: max.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(self.interpolate_clamped(x))
    }

    #[inline]
    fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}
