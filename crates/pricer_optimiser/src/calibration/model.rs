//! Volatility parametrisations fitted by the calibrator.
//!
//! Each model maps a parameter vector to a fresh [`MarketEnvironment`]
//! built on top of a base snapshot (spot, rate, dividend yield). The base is
//! never modified.

use pricer_core::market_data::{
    InterpolatedVolSurface, MarketEnvironment, SurfaceInterpolation, Volatility,
    VolatilitySurface,
};
use pricer_core::types::PricingError;

/// Which volatility inputs are free parameters.
///
/// | Model | Parameters | Names |
/// |-------|------------|-------|
/// | `Flat` | 1 | `sigma` |
/// | `TermStructure` | one per expiry | `sigma_T<expiry>` |
/// | `Surface` | one per grid node, expiry-major | `sigma_T<expiry>_K<strike>` |
///
/// Term structures and surfaces interpolate linearly in total variance
/// across expiries and extrapolate flat.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::MarketEnvironment;
/// use pricer_optimiser::calibration::VolatilityModel;
///
/// let model = VolatilityModel::TermStructure { expiries: vec![0.5, 1.0] };
/// assert_eq!(model.parameter_names(), vec!["sigma_T0.5", "sigma_T1"]);
///
/// let base = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
/// let env = model.environment(&base, &[0.25, 0.2]).unwrap();
/// assert!((env.volatility_for(100.0, 0.5).unwrap() - 0.25).abs() < 1e-12);
/// assert!((base.volatility_for(100.0, 0.5).unwrap() - 0.2).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityModel {
    /// One volatility for every strike and maturity.
    Flat,
    /// One volatility per expiry node, flat in strike.
    TermStructure {
        /// Expiry nodes in years, strictly increasing
        expiries: Vec<f64>,
    },
    /// One volatility per (expiry, strike) node.
    Surface {
        /// Strike nodes, strictly increasing
        strikes: Vec<f64>,
        /// Expiry nodes in years, strictly increasing
        expiries: Vec<f64>,
    },
}

impl VolatilityModel {
    /// Number of free parameters.
    pub fn dimension(&self) -> usize {
        match self {
            Self::Flat => 1,
            Self::TermStructure { expiries } => expiries.len(),
            Self::Surface { strikes, expiries } => strikes.len() * expiries.len(),
        }
    }

    /// Parameter names in vector order.
    pub fn parameter_names(&self) -> Vec<String> {
        match self {
            Self::Flat => vec!["sigma".to_string()],
            Self::TermStructure { expiries } => {
                expiries.iter().map(|t| format!("sigma_T{t}")).collect()
            }
            Self::Surface { strikes, expiries } => expiries
                .iter()
                .flat_map(|t| strikes.iter().map(move |k| format!("sigma_T{t}_K{k}")))
                .collect(),
        }
    }

    /// Fresh environment carrying the volatilities in `params`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` on a dimension mismatch; market data errors for
    /// invalid axes or non-positive volatilities.
    pub fn environment(
        &self,
        base: &MarketEnvironment,
        params: &[f64],
    ) -> Result<MarketEnvironment, PricingError> {
        if self.dimension() == 0 {
            return Err(PricingError::InvalidInput(
                "volatility model has no nodes".to_string(),
            ));
        }
        if params.len() != self.dimension() {
            return Err(PricingError::InvalidInput(format!(
                "{} parameters given, model has {}",
                params.len(),
                self.dimension()
            )));
        }
        let volatility = match self {
            Self::Flat => Volatility::flat(params[0])?,
            Self::TermStructure { expiries } => {
                let rows = params.iter().map(|&v| vec![v]).collect();
                Volatility::surface(InterpolatedVolSurface::from_rows(
                    vec![base.spot()],
                    expiries.clone(),
                    rows,
                    SurfaceInterpolation::TotalVariance,
                    true,
                )?)
            }
            Self::Surface { strikes, expiries } => {
                let rows = params.chunks(strikes.len()).map(<[f64]>::to_vec).collect();
                Volatility::surface(InterpolatedVolSurface::from_rows(
                    strikes.clone(),
                    expiries.clone(),
                    rows,
                    SurfaceInterpolation::TotalVariance,
                    true,
                )?)
            }
        };
        Ok(base.with_volatility(volatility))
    }

    /// Starting point read from the base environment's volatility at each node.
    pub fn initial_guess(&self, base: &MarketEnvironment) -> Result<Vec<f64>, PricingError> {
        let vol = base.volatility();
        let guess = match self {
            Self::Flat => vec![vol.volatility(base.spot(), 1.0)?],
            Self::TermStructure { expiries } => expiries
                .iter()
                .map(|&t| vol.volatility(base.spot(), t))
                .collect::<Result<_, _>>()?,
            Self::Surface { strikes, expiries } => expiries
                .iter()
                .flat_map(|&t| strikes.iter().map(move |&k| (k, t)))
                .map(|(k, t)| vol.volatility(k, t))
                .collect::<Result<_, _>>()?,
        };
        Ok(guess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn base() -> MarketEnvironment {
        MarketEnvironment::flat(100.0, 0.03, 0.01, 0.2).unwrap()
    }

    #[test]
    fn test_flat_model() {
        let env = VolatilityModel::Flat.environment(&base(), &[0.35]).unwrap();
        assert_eq!(env.volatility_for(80.0, 3.0).unwrap(), 0.35);
        assert_eq!(env.rate(), 0.03);
        assert_eq!(env.dividend_yield(), 0.01);
    }

    #[test]
    fn test_surface_names_and_nodes() {
        let model = VolatilityModel::Surface {
            strikes: vec![90.0, 110.0],
            expiries: vec![0.5, 1.0],
        };
        assert_eq!(model.dimension(), 4);
        assert_eq!(
            model.parameter_names(),
            vec![
                "sigma_T0.5_K90",
                "sigma_T0.5_K110",
                "sigma_T1_K90",
                "sigma_T1_K110"
            ]
        );
        let env = model.environment(&base(), &[0.3, 0.2, 0.28, 0.22]).unwrap();
        assert_relative_eq!(env.volatility_for(110.0, 0.5).unwrap(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(env.volatility_for(90.0, 1.0).unwrap(), 0.28, epsilon = 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = VolatilityModel::Flat.environment(&base(), &[0.2, 0.3]).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput(_)));
    }

    #[test]
    fn test_initial_guess_reads_base() {
        let model = VolatilityModel::TermStructure {
            expiries: vec![0.25, 1.0, 2.0],
        };
        assert_eq!(model.initial_guess(&base()).unwrap(), vec![0.2, 0.2, 0.2]);
    }
}
