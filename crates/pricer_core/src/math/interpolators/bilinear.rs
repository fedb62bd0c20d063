//! Bilinear 2D interpolation for surfaces.

use super::{locate, validate_axis};
use crate::types::InterpolationError;
use num_traits::Float;

/// Bilinear interpolator for 2D grid data.
///
/// The grid is stored as `zs[i][j] = z(xs[i], ys[j])`. Either axis may hold a
/// single node, in which case the surface is constant along that axis.
///
/// # Example
///
/// ```
/// use pricer_core::math::interpolators::BilinearInterpolator;
///
/// let xs: [f64; 3] = [0.0, 1.0, 2.0];
/// let ys = [0.0, 1.0];
/// let zs = [
///     &[0.0, 1.0][..],
///     &[2.0, 3.0][..],
///     &[4.0, 5.0][..],
/// ];
///
/// let interp = BilinearInterpolator::new(&xs, &ys, &zs).unwrap();
/// let z = interp.interpolate(0.5, 0.5).unwrap();
/// assert!((z - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BilinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
    zs: Vec<Vec<T>>,
}

impl<T: Float> BilinearInterpolator<T> {
    /// Construct a bilinear interpolator from grid data.
    ///
    /// # Errors
    ///
    /// * `InterpolationError::InsufficientData` - An empty axis
    /// * `InterpolationError::NonMonotonicData` - An axis not strictly increasing
    /// * `InterpolationError::InvalidInput` - Grid dimensions don't match axis lengths
    pub fn new(xs: &[T], ys: &[T], zs: &[&[T]]) -> Result<Self, InterpolationError> {
        validate_axis(xs, 1)?;
        validate_axis(ys, 1)?;

        if zs.len() != xs.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "Grid rows ({}) must match x-axis length ({})",
                zs.len(),
                xs.len()
            )));
        }
        for (i, row) in zs.iter().enumerate() {
            if row.len() != ys.len() {
                return Err(InterpolationError::InvalidInput(format!(
                    "Grid row {} length ({}) must match y-axis length ({})",
                    i,
                    row.len(),
                    ys.len()
                )));
            }
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs: zs.iter().map(|row| row.to_vec()).collect(),
        })
    }

    /// Interpolate value at `(x, y)`.
    ///
    /// ```text
    /// z = (1-u)(1-v)*z00 + u*(1-v)*z10 + (1-u)*v*z01 + u*v*z11
    /// ```
    ///
    /// Returns `OutOfBounds` if the point lies outside the grid.
    pub fn interpolate(&self, x: T, y: T) -> Result<T, InterpolationError> {
        check_bounds(x, self.domain_x())?;
        check_bounds(y, self.domain_y())?;
        Ok(self.interpolate_clamped(x, y))
    }

    /// Interpolate with flat extrapolation outside the grid.
    pub fn interpolate_clamped(&self, x: T, y: T) -> T {
        let (i0, i1, u) = locate(&self.xs, x);
        let (j0, j1, v) = locate(&self.ys, y);
        let one = T::one();

        let z00 = self.zs[i0][j0];
        let z10 = self.zs[i1][j0];
        let z01 = self.zs[i0][j1];
        let z11 = self.zs[i1][j1];

        (one - u) * (one - v) * z00 + u * (one - v) * z10 + (one - u) * v * z01 + u * v * z11
    }

    /// Valid domain for x.
    #[inline]
    pub fn domain_x(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Valid domain for y.
    #[inline]
    pub fn domain_y(&self) -> (T, T) {
        (self.ys[0], self.ys[self.ys.len() - 1])
    }
}

fn check_bounds<T: Float>(value: T, (min, max): (T, T)) -> Result<(), InterpolationError> {
    if value < min || value > max {
        return Err(InterpolationError::OutOfBounds {
            x: value.to_f64().unwrap_or(f64::NAN),
            min: min.to_f64().unwrap_or(f64::NAN),
            max: max.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plane() -> BilinearInterpolator<f64> {
        // z = x + 2y on a 3x3 grid
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 2.0];
        let rows: Vec<Vec<f64>> = xs
            .iter()
            .map(|&x| ys.iter().map(|&y| x + 2.0 * y).collect())
            .collect();
        let refs: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
        BilinearInterpolator::new(&xs, &ys, &refs).unwrap()
    }

    #[test]
    fn test_reproduces_plane() {
        let interp = plane();
        assert_relative_eq!(interp.interpolate(0.3, 1.7).unwrap(), 0.3 + 3.4, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate(2.0, 2.0).unwrap(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_bounds() {
        let interp = plane();
        assert!(interp.interpolate(-0.1, 1.0).is_err());
        assert!(interp.interpolate(1.0, 2.1).is_err());
    }

    #[test]
    fn test_clamped_extrapolation() {
        let interp = plane();
        assert_relative_eq!(interp.interpolate_clamped(5.0, -1.0), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_node_axis() {
        let interp = BilinearInterpolator::new(&[1.0], &[0.0, 1.0], &[&[2.0, 4.0][..]]).unwrap();
        assert_relative_eq!(interp.interpolate_clamped(3.0, 0.25), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = BilinearInterpolator::new(&[0.0, 1.0], &[0.0, 1.0], &[&[0.0, 1.0][..]]);
        assert!(matches!(result, Err(InterpolationError::InvalidInput(_))));
    }
}
