//! Interpolated volatility surface implementation.

use super::traits::check_query;
use super::VolatilitySurface;
use crate::market_data::error::MarketDataError;
use crate::math::interpolators::BilinearInterpolator;

/// How values between grid nodes are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceInterpolation {
    /// Bilinear in volatility over (expiry, strike).
    #[default]
    Bilinear,
    /// Bilinear in total variance σ²T, returning `sqrt(w / T)`.
    ///
    /// Before the first expiry the first slice's volatility is used, which is
    /// equivalent to variance growing linearly from zero at T = 0.
    TotalVariance,
}

/// Grid-based implied volatility surface.
///
/// The grid is organised as `vols[expiry_idx][strike_idx]`. Axes must be
/// strictly increasing and positive; a single node per axis is allowed, in
/// which case the surface is flat along that axis.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::surfaces::{
///     InterpolatedVolSurface, SurfaceInterpolation, VolatilitySurface,
/// };
///
/// let strikes = [90.0, 100.0, 110.0];
/// let expiries = [0.25, 0.5, 1.0];
/// let vols = [
///     &[0.22, 0.20, 0.21][..],
///     &[0.23, 0.21, 0.22][..],
///     &[0.24, 0.22, 0.23][..],
/// ];
///
/// let surface = InterpolatedVolSurface::new(&strikes, &expiries, &vols, false).unwrap();
/// assert!((surface.volatility(100.0, 0.5).unwrap() - 0.21).abs() < 1e-12);
///
/// let variance = surface.with_interpolation(SurfaceInterpolation::TotalVariance).unwrap();
/// assert!((variance.volatility(100.0, 0.5).unwrap() - 0.21).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedVolSurface {
    strikes: Vec<f64>,
    expiries: Vec<f64>,
    vols: Vec<Vec<f64>>,
    interpolation: SurfaceInterpolation,
    allow_extrapolation: bool,
    grid: BilinearInterpolator<f64>,
}

impl InterpolatedVolSurface {
    /// Construct a surface interpolating bilinearly in volatility.
    ///
    /// # Errors
    ///
    /// * `MarketDataError::InsufficientData` - an empty axis or a short grid row
    /// * `MarketDataError::InvalidStrike` / `InvalidExpiry` - non-positive axis values
    /// * `MarketDataError::InvalidVolatility` - a non-positive or non-finite node
    /// * `MarketDataError::Interpolation` - an axis that is not strictly increasing
    pub fn new(
        strikes: &[f64],
        expiries: &[f64],
        vols: &[&[f64]],
        allow_extrapolation: bool,
    ) -> Result<Self, MarketDataError> {
        let rows = vols.iter().map(|row| row.to_vec()).collect();
        Self::from_rows(
            strikes.to_vec(),
            expiries.to_vec(),
            rows,
            SurfaceInterpolation::Bilinear,
            allow_extrapolation,
        )
    }

    /// Construct from owned rows with an explicit interpolation mode.
    pub fn from_rows(
        strikes: Vec<f64>,
        expiries: Vec<f64>,
        vols: Vec<Vec<f64>>,
        interpolation: SurfaceInterpolation,
        allow_extrapolation: bool,
    ) -> Result<Self, MarketDataError> {
        if strikes.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }
        if expiries.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }
        if let Some(&strike) = strikes.iter().find(|k| !k.is_finite() || **k <= 0.0) {
            return Err(MarketDataError::InvalidStrike { strike });
        }
        if let Some(&expiry) = expiries.iter().find(|t| !t.is_finite() || **t <= 0.0) {
            return Err(MarketDataError::InvalidExpiry { expiry });
        }
        if vols.len() != expiries.len() {
            return Err(MarketDataError::InsufficientData {
                got: vols.len(),
                need: expiries.len(),
            });
        }
        for row in &vols {
            if row.len() != strikes.len() {
                return Err(MarketDataError::InsufficientData {
                    got: row.len(),
                    need: strikes.len(),
                });
            }
            if let Some(&volatility) = row.iter().find(|v| !v.is_finite() || **v <= 0.0) {
                return Err(MarketDataError::InvalidVolatility { volatility });
            }
        }

        let grid = build_grid(&strikes, &expiries, &vols, interpolation)?;
        Ok(Self {
            strikes,
            expiries,
            vols,
            interpolation,
            allow_extrapolation,
            grid,
        })
    }

    /// Same nodes, different interpolation mode.
    pub fn with_interpolation(
        &self,
        interpolation: SurfaceInterpolation,
    ) -> Result<Self, MarketDataError> {
        Self::from_rows(
            self.strikes.clone(),
            self.expiries.clone(),
            self.vols.clone(),
            interpolation,
            self.allow_extrapolation,
        )
    }

    /// Same axes with every node replaced, taken row-major (`[expiry][strike]`).
    pub fn with_nodes(&self, nodes: &[f64]) -> Result<Self, MarketDataError> {
        let n_strikes = self.strikes.len();
        if nodes.len() != n_strikes * self.expiries.len() {
            return Err(MarketDataError::InsufficientData {
                got: nodes.len(),
                need: n_strikes * self.expiries.len(),
            });
        }
        let rows = nodes.chunks(n_strikes).map(<[f64]>::to_vec).collect();
        Self::from_rows(
            self.strikes.clone(),
            self.expiries.clone(),
            rows,
            self.interpolation,
            self.allow_extrapolation,
        )
    }

    /// Every node shifted by `shift` (absolute volatility points).
    pub fn parallel_shift(&self, shift: f64) -> Result<Self, MarketDataError> {
        let nodes: Vec<f64> = self.nodes().map(|v| v + shift).collect();
        self.with_nodes(&nodes)
    }

    /// Strike axis.
    #[inline]
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Expiry axis.
    #[inline]
    pub fn expiries(&self) -> &[f64] {
        &self.expiries
    }

    /// Node volatilities, `[expiry][strike]`.
    #[inline]
    pub fn vols(&self) -> &[Vec<f64>] {
        &self.vols
    }

    /// Node volatilities flattened row-major.
    pub fn nodes(&self) -> impl Iterator<Item = f64> + '_ {
        self.vols.iter().flatten().copied()
    }

    /// Interpolation mode in use.
    #[inline]
    pub fn interpolation(&self) -> SurfaceInterpolation {
        self.interpolation
    }

    /// Whether queries outside the grid are clamped instead of rejected.
    #[inline]
    pub fn allow_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }
}

impl VolatilitySurface for InterpolatedVolSurface {
    fn volatility(&self, strike: f64, expiry: f64) -> Result<f64, MarketDataError> {
        check_query(strike, expiry)?;

        let (k_min, k_max) = self.strike_domain();
        let (t_min, t_max) = self.expiry_domain();
        if !self.allow_extrapolation {
            if strike < k_min || strike > k_max {
                return Err(MarketDataError::OutOfBounds {
                    x: strike,
                    min: k_min,
                    max: k_max,
                });
            }
            if expiry < t_min || expiry > t_max {
                return Err(MarketDataError::OutOfBounds {
                    x: expiry,
                    min: t_min,
                    max: t_max,
                });
            }
        }

        let k = strike.clamp(k_min, k_max);
        let t = expiry.clamp(t_min, t_max);
        let value = self.grid.interpolate_clamped(t, k);
        Ok(match self.interpolation {
            SurfaceInterpolation::Bilinear => value,
            SurfaceInterpolation::TotalVariance => (value / t).sqrt(),
        })
    }

    fn strike_domain(&self) -> (f64, f64) {
        (self.strikes[0], self.strikes[self.strikes.len() - 1])
    }

    fn expiry_domain(&self) -> (f64, f64) {
        (self.expiries[0], self.expiries[self.expiries.len() - 1])
    }
}

fn build_grid(
    strikes: &[f64],
    expiries: &[f64],
    vols: &[Vec<f64>],
    interpolation: SurfaceInterpolation,
) -> Result<BilinearInterpolator<f64>, MarketDataError> {
    let values: Vec<Vec<f64>> = match interpolation {
        SurfaceInterpolation::Bilinear => vols.to_vec(),
        SurfaceInterpolation::TotalVariance => vols
            .iter()
            .zip(expiries)
            .map(|(row, &t)| row.iter().map(|v| v * v * t).collect())
            .collect(),
    };
    let refs: Vec<&[f64]> = values.iter().map(Vec::as_slice).collect();
    Ok(BilinearInterpolator::new(expiries, strikes, &refs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(allow_extrapolation: bool) -> InterpolatedVolSurface {
        let strikes = [90.0, 100.0, 110.0];
        let expiries = [0.5, 1.0];
        let vols = [&[0.22, 0.20, 0.21][..], &[0.24, 0.22, 0.23][..]];
        InterpolatedVolSurface::new(&strikes, &expiries, &vols, allow_extrapolation).unwrap()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    #[test]
    fn test_rejects_unsorted_strikes() {
        let result = InterpolatedVolSurface::new(&[100.0, 90.0], &[1.0], &[&[0.2, 0.2][..]], true);
        assert!(matches!(result, Err(MarketDataError::Interpolation(_))));
    }

    #[test]
    fn test_rejects_non_positive_vol() {
        let result = InterpolatedVolSurface::new(&[90.0, 100.0], &[1.0], &[&[0.2, 0.0][..]], true);
        match result.unwrap_err() {
            MarketDataError::InvalidVolatility { volatility } => assert_eq!(volatility, 0.0),
            _ => panic!("Expected InvalidVolatility"),
        }
    }

    #[test]
    fn test_rejects_ragged_grid() {
        let result = InterpolatedVolSurface::new(
            &[90.0, 100.0],
            &[0.5, 1.0],
            &[&[0.2, 0.2][..], &[0.2][..]],
            true,
        );
        assert!(matches!(result, Err(MarketDataError::InsufficientData { .. })));
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    #[test]
    fn test_exact_at_nodes() {
        let surface = sample(false);
        assert_relative_eq!(surface.volatility(90.0, 0.5).unwrap(), 0.22);
        assert_relative_eq!(surface.volatility(110.0, 1.0).unwrap(), 0.23);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let surface = sample(false);
        let expected = 0.25 * (0.22 + 0.20 + 0.24 + 0.22);
        assert_relative_eq!(surface.volatility(95.0, 0.75).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_bounds_without_extrapolation() {
        let surface = sample(false);
        match surface.volatility(120.0, 0.75).unwrap_err() {
            MarketDataError::OutOfBounds { x, .. } => assert_eq!(x, 120.0),
            _ => panic!("Expected OutOfBounds"),
        }
        assert!(surface.volatility(100.0, 2.0).is_err());
    }

    #[test]
    fn test_flat_extrapolation() {
        let surface = sample(true);
        assert_relative_eq!(surface.volatility(200.0, 5.0).unwrap(), 0.23);
        assert_relative_eq!(surface.volatility(50.0, 0.1).unwrap(), 0.22);
    }

    #[test]
    fn test_total_variance_interpolates_variance() {
        let surface = sample(true)
            .with_interpolation(SurfaceInterpolation::TotalVariance)
            .unwrap();
        let w = 0.5 * (0.20_f64.powi(2) * 0.5) + 0.5 * (0.22_f64.powi(2) * 1.0);
        assert_relative_eq!(
            surface.volatility(100.0, 0.75).unwrap(),
            (w / 0.75).sqrt(),
            epsilon = 1e-12
        );
        // flat vol before the first slice
        assert_relative_eq!(surface.volatility(100.0, 0.1).unwrap(), 0.20, epsilon = 1e-12);
    }

    // ========================================================================
    // Derived surfaces
    // ========================================================================

    #[test]
    fn test_parallel_shift() {
        let shifted = sample(true).parallel_shift(0.01).unwrap();
        assert_relative_eq!(shifted.volatility(100.0, 0.5).unwrap(), 0.21, epsilon = 1e-12);
        assert!(sample(true).parallel_shift(-0.5).is_err());
    }

    #[test]
    fn test_with_nodes_round_trips() {
        let surface = sample(true);
        let nodes: Vec<f64> = surface.nodes().collect();
        assert_eq!(nodes.len(), 6);
        let rebuilt = surface.with_nodes(&nodes).unwrap();
        assert_eq!(rebuilt.vols(), surface.vols());
        assert!(surface.with_nodes(&nodes[..5]).is_err());
    }
}
