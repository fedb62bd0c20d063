//! Geometric Brownian Motion path generation.
//!
//! Paths use the log-space (exact) step, so there is no discretisation bias
//! at the simulated dates:
//!
//! ```text
//! S(t+dt) = S(t) × exp((r - q - σ²/2)dt + σ√dt × Z)
//! ```
//!
//! # Memory Layout
//!
//! Paths are stored in row-major order: `paths[path_idx * (n_steps + 1) + step_idx]`
//! where `step_idx = 0` contains the initial spot price.

use pricer_core::market_data::MarketEnvironment;
use pricer_core::types::PricingError;
use pricer_models::instruments::Instrument;

/// Risk-neutral GBM parameters for one instrument.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::GbmParams;
///
/// let params = GbmParams {
///     spot: 100.0,
///     rate: 0.05,
///     dividend_yield: 0.0,
///     volatility: 0.2,
///     maturity: 1.0,
/// };
/// assert!(params.is_valid());
/// // Z = 0 over the whole horizon grows at r - q - σ²/2
/// assert!((params.terminal(0.0) - 100.0 * 0.03_f64.exp()).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GbmParams {
    /// Initial spot price (S₀).
    pub spot: f64,
    /// Risk-free rate (r) - continuously compounded.
    pub rate: f64,
    /// Dividend yield (q) - continuous.
    pub dividend_yield: f64,
    /// Volatility (σ) - annualised.
    pub volatility: f64,
    /// Time to maturity (T) - in years.
    pub maturity: f64,
}

impl GbmParams {
    /// Parameters for `instrument` under `env`; σ is read at the instrument's
    /// strike and maturity.
    pub fn for_instrument(
        instrument: &Instrument,
        env: &MarketEnvironment,
    ) -> Result<Self, PricingError> {
        let volatility = env.volatility_for(instrument.strike(), instrument.maturity())?;
        let params = Self {
            spot: env.spot(),
            rate: env.rate(),
            dividend_yield: env.dividend_yield(),
            volatility,
            maturity: instrument.maturity(),
        };
        if !params.is_valid() {
            return Err(PricingError::InvalidInput(format!(
                "invalid simulation parameters {params:?} for {instrument}"
            )));
        }
        Ok(params)
    }

    /// `true` if all parameters are finite and positive where required.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.spot > 0.0
            && self.spot.is_finite()
            && self.rate.is_finite()
            && self.dividend_yield.is_finite()
            && self.volatility > 0.0
            && self.volatility.is_finite()
            && self.maturity > 0.0
            && self.maturity.is_finite()
    }

    /// Terminal price after one exact step over the whole horizon.
    #[inline]
    pub fn terminal(&self, z: f64) -> f64 {
        let step = StepCoefficients::new(self, 1);
        self.spot * step.growth(z)
    }

    /// e^{-rT}
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }
}

/// Precomputed drift and diffusion of one time step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepCoefficients {
    /// (r - q - σ²/2)dt
    pub drift_dt: f64,
    /// σ√dt
    pub vol_sqrt_dt: f64,
}

impl StepCoefficients {
    /// Coefficients for `n_steps` equal steps to maturity.
    #[inline]
    pub fn new(params: &GbmParams, n_steps: usize) -> Self {
        let dt = params.maturity / n_steps as f64;
        let sigma = params.volatility;
        Self {
            drift_dt: (params.rate - params.dividend_yield - 0.5 * sigma * sigma) * dt,
            vol_sqrt_dt: sigma * dt.sqrt(),
        }
    }

    /// Multiplicative growth factor for the normal draw `z`.
    #[inline]
    pub fn growth(&self, z: f64) -> f64 {
        (self.drift_dt + self.vol_sqrt_dt * z).exp()
    }
}

/// Fills `path` (length `randoms.len() + 1`) from `spot` using `sign × randoms`.
///
/// `sign = -1.0` produces the antithetic twin of the same draws.
#[inline]
pub fn fill_path(spot: f64, step: StepCoefficients, randoms: &[f64], sign: f64, path: &mut [f64]) {
    debug_assert_eq!(path.len(), randoms.len() + 1);
    path[0] = spot;
    for (i, &z) in randoms.iter().enumerate() {
        path[i + 1] = path[i] * step.growth(sign * z);
    }
}
