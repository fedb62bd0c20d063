//! Construction of a grid surface from scattered implied volatility quotes.
//!
//! Quotes rarely cover every strike at every expiry. The builder pivots them
//! onto the strike × expiry grid, averages duplicates in variance space,
//! fills the holes and hands the result to [`InterpolatedVolSurface`].

use tracing::debug;

use super::{InterpolatedVolSurface, SurfaceInterpolation};
use crate::market_data::error::MarketDataError;
use crate::math::interpolators::LinearInterpolator;

/// A single implied volatility observation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolQuote {
    /// Strike price
    pub strike: f64,
    /// Time to expiry in years
    pub expiry: f64,
    /// Implied volatility
    pub volatility: f64,
}

impl VolQuote {
    /// Creates a quote.
    pub fn new(strike: f64, expiry: f64, volatility: f64) -> Self {
        Self {
            strike,
            expiry,
            volatility,
        }
    }
}

/// Builds an [`InterpolatedVolSurface`] from scattered quotes.
///
/// Grid construction:
/// 1. axes are the sorted unique strikes and expiries of the quotes
/// 2. duplicate (strike, expiry) cells take the mean of σ²
/// 3. holes are filled by linear interpolation along strikes, then along
///    expiries (trailing holes repeat the last value)
/// 4. anything left is forward then backward filled along strikes
/// 5. node volatility is the square root of the cell variance
///
/// ```
/// use pricer_core::market_data::surfaces::{VolQuote, VolSurfaceBuilder, VolatilitySurface};
///
/// let quotes = vec![
///     VolQuote::new(90.0, 0.5, 0.25),
///     VolQuote::new(110.0, 0.5, 0.21),
///     VolQuote::new(100.0, 1.0, 0.22),
/// ];
/// let surface = VolSurfaceBuilder::new().build(&quotes).unwrap();
/// assert_eq!(surface.strikes(), &[90.0, 100.0, 110.0]);
/// assert!(surface.volatility(100.0, 1.0).unwrap() > 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct VolSurfaceBuilder {
    interpolation: SurfaceInterpolation,
    allow_extrapolation: bool,
}

impl Default for VolSurfaceBuilder {
    fn default() -> Self {
        Self {
            interpolation: SurfaceInterpolation::TotalVariance,
            allow_extrapolation: true,
        }
    }
}

impl VolSurfaceBuilder {
    /// Builder with total-variance interpolation and flat extrapolation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the interpolation mode of the built surface.
    pub fn interpolation(mut self, interpolation: SurfaceInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets whether the built surface clamps out-of-grid queries.
    pub fn allow_extrapolation(mut self, allow: bool) -> Self {
        self.allow_extrapolation = allow;
        self
    }

    /// Pivots, fills and builds the surface.
    pub fn build(&self, quotes: &[VolQuote]) -> Result<InterpolatedVolSurface, MarketDataError> {
        if quotes.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }
        for q in quotes {
            if !q.strike.is_finite() || q.strike <= 0.0 {
                return Err(MarketDataError::InvalidStrike { strike: q.strike });
            }
            if !q.expiry.is_finite() || q.expiry <= 0.0 {
                return Err(MarketDataError::InvalidExpiry { expiry: q.expiry });
            }
            if !q.volatility.is_finite() || q.volatility <= 0.0 {
                return Err(MarketDataError::InvalidVolatility {
                    volatility: q.volatility,
                });
            }
        }

        let strikes = unique_sorted(quotes.iter().map(|q| q.strike));
        let expiries = unique_sorted(quotes.iter().map(|q| q.expiry));
        let (ns, ne) = (strikes.len(), expiries.len());

        // variance[strike][expiry], accumulated as (sum, count)
        let mut acc = vec![vec![(0.0_f64, 0_usize); ne]; ns];
        for q in quotes {
            let i = index_of(&strikes, q.strike);
            let j = index_of(&expiries, q.expiry);
            acc[i][j].0 += q.volatility * q.volatility;
            acc[i][j].1 += 1;
        }
        let mut grid: Vec<Vec<Option<f64>>> = acc
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
                    .collect()
            })
            .collect();
        let holes = grid.iter().flatten().filter(|c| c.is_none()).count();

        for j in 0..ne {
            let mut column: Vec<Option<f64>> = grid.iter().map(|row| row[j]).collect();
            fill_linear(&strikes, &mut column);
            for (row, value) in grid.iter_mut().zip(column) {
                row[j] = value;
            }
        }
        for row in grid.iter_mut() {
            fill_linear(&expiries, row);
        }
        for j in 0..ne {
            let mut column: Vec<Option<f64>> = grid.iter().map(|row| row[j]).collect();
            fill_forward_backward(&mut column);
            for (row, value) in grid.iter_mut().zip(column) {
                row[j] = value;
            }
        }

        debug!(
            strikes = ns,
            expiries = ne,
            quotes = quotes.len(),
            holes,
            "built volatility grid"
        );

        let mut vols = vec![vec![0.0; ns]; ne];
        for (i, row) in grid.iter().enumerate() {
            for (j, cell) in row.iter().enumerate() {
                let variance = cell.ok_or(MarketDataError::InsufficientData { got: 0, need: 1 })?;
                vols[j][i] = variance.sqrt();
            }
        }

        InterpolatedVolSurface::from_rows(
            strikes,
            expiries,
            vols,
            self.interpolation,
            self.allow_extrapolation,
        )
    }
}

fn unique_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(f64::total_cmp);
    v.dedup();
    v
}

fn index_of(axis: &[f64], value: f64) -> usize {
    axis.partition_point(|&a| a < value)
}

/// Linear fill between known values; trailing holes repeat the last known value,
/// leading holes are left for the forward/backward pass.
fn fill_linear(axis: &[f64], values: &mut [Option<f64>]) {
    let (xs, ys): (Vec<f64>, Vec<f64>) = axis
        .iter()
        .zip(values.iter())
        .filter_map(|(&x, v)| v.map(|y| (x, y)))
        .unzip();
    let Some(&first) = xs.first() else {
        return;
    };
    let interp = LinearInterpolator::new(&xs, &ys).ok();
    let last_value = ys[ys.len() - 1];

    for (x, v) in axis.iter().zip(values.iter_mut()) {
        if v.is_some() || *x < first {
            continue;
        }
        *v = Some(match &interp {
            Some(interp) => interp.interpolate_clamped(*x),
            None => last_value,
        });
    }
}

fn fill_forward_backward(values: &mut [Option<f64>]) {
    let mut last = None;
    for v in values.iter_mut() {
        match v {
            Some(x) => last = Some(*x),
            None => *v = last,
        }
    }
    let mut next = None;
    for v in values.iter_mut().rev() {
        match v {
            Some(x) => next = Some(*x),
            None => *v = next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::surfaces::VolatilitySurface;
    use approx::assert_relative_eq;

    #[test]
    fn test_full_grid_is_preserved() {
        let quotes = vec![
            VolQuote::new(90.0, 0.5, 0.25),
            VolQuote::new(100.0, 0.5, 0.20),
            VolQuote::new(90.0, 1.0, 0.26),
            VolQuote::new(100.0, 1.0, 0.21),
        ];
        let surface = VolSurfaceBuilder::new().build(&quotes).unwrap();
        assert_eq!(surface.vols(), &[vec![0.25, 0.20], vec![0.26, 0.21]]);
    }

    #[test]
    fn test_duplicates_average_variance() {
        let quotes = vec![
            VolQuote::new(100.0, 1.0, 0.1),
            VolQuote::new(100.0, 1.0, 0.3),
        ];
        let surface = VolSurfaceBuilder::new().build(&quotes).unwrap();
        let expected = ((0.01 + 0.09) / 2.0_f64).sqrt();
        assert_relative_eq!(surface.volatility(100.0, 1.0).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_interior_hole_is_interpolated_in_variance() {
        let quotes = vec![
            VolQuote::new(90.0, 1.0, 0.30),
            VolQuote::new(110.0, 1.0, 0.20),
            VolQuote::new(100.0, 2.0, 0.25),
        ];
        let surface = VolSurfaceBuilder::new().build(&quotes).unwrap();
        // strike 100 at T=1 sits halfway between the two variances
        let expected = (0.5 * 0.09 + 0.5 * 0.04_f64).sqrt();
        assert_relative_eq!(surface.vols()[0][1], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_edge_holes_are_filled() {
        let quotes = vec![
            VolQuote::new(90.0, 0.5, 0.30),
            VolQuote::new(110.0, 2.0, 0.20),
        ];
        let surface = VolSurfaceBuilder::new().build(&quotes).unwrap();
        assert!(surface.nodes().all(|v| v.is_finite() && v > 0.0));
        assert_relative_eq!(surface.vols()[0][0], 0.30);
        assert_relative_eq!(surface.vols()[1][1], 0.20);
    }

    #[test]
    fn test_rejects_bad_quotes() {
        assert!(VolSurfaceBuilder::new().build(&[]).is_err());
        let nan = [VolQuote::new(100.0, 1.0, f64::NAN)];
        assert!(matches!(
            VolSurfaceBuilder::new().build(&nan),
            Err(MarketDataError::InvalidVolatility { .. })
        ));
    }

    #[test]
    fn test_fill_forward_backward() {
        let mut values = vec![None, Some(1.0), None, Some(3.0), None];
        fill_forward_backward(&mut values);
        assert_eq!(
            values,
            vec![Some(1.0), Some(1.0), Some(1.0), Some(3.0), Some(3.0)]
        );
    }
}
