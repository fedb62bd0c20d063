//! Immutable market snapshot consumed by every pricer.
//!
//! A [`MarketEnvironment`] is never mutated. Scenario and perturbation
//! helpers (`with_*`, `bump_*`) return a new snapshot, so a Greeks engine or a
//! calibrator can always diff against the untouched baseline and share it
//! across threads without locking.

use std::sync::Arc;

use super::error::MarketDataError;
use super::surfaces::{FlatVol, InterpolatedVolSurface, VolatilitySurface};

/// Volatility input: a single number or a full surface.
///
/// The surface variant is reference counted, so cloning an environment (or
/// bumping its spot or rate) never copies the grid.
#[derive(Debug, Clone)]
pub enum Volatility {
    /// Same σ for every strike and maturity.
    Flat(FlatVol),
    /// σ(K, T) looked up on a grid.
    Surface(Arc<InterpolatedVolSurface>),
}

impl Volatility {
    /// Flat volatility; σ must be positive and finite.
    pub fn flat(sigma: f64) -> Result<Self, MarketDataError> {
        Ok(Self::Flat(FlatVol::new(sigma)?))
    }

    /// Wraps a surface.
    pub fn surface(surface: InterpolatedVolSurface) -> Self {
        Self::Surface(Arc::new(surface))
    }

    /// Parallel shift of σ by `shift` (every node for a surface).
    pub fn shifted(&self, shift: f64) -> Result<Self, MarketDataError> {
        match self {
            Self::Flat(flat) => Self::flat(flat.sigma() + shift),
            Self::Surface(surface) => Ok(Self::surface(surface.parallel_shift(shift)?)),
        }
    }
}

impl VolatilitySurface for Volatility {
    fn volatility(&self, strike: f64, expiry: f64) -> Result<f64, MarketDataError> {
        match self {
            Self::Flat(flat) => flat.volatility(strike, expiry),
            Self::Surface(surface) => surface.volatility(strike, expiry),
        }
    }

    fn strike_domain(&self) -> (f64, f64) {
        match self {
            Self::Flat(flat) => flat.strike_domain(),
            Self::Surface(surface) => surface.strike_domain(),
        }
    }

    fn expiry_domain(&self) -> (f64, f64) {
        match self {
            Self::Flat(flat) => flat.expiry_domain(),
            Self::Surface(surface) => surface.expiry_domain(),
        }
    }
}

impl From<FlatVol> for Volatility {
    fn from(flat: FlatVol) -> Self {
        Self::Flat(flat)
    }
}

impl From<InterpolatedVolSurface> for Volatility {
    fn from(surface: InterpolatedVolSurface) -> Self {
        Self::surface(surface)
    }
}

/// Spot, continuously compounded rate, dividend yield and volatility.
///
/// # Example
///
/// ```
/// use pricer_core::market_data::MarketEnvironment;
///
/// let env = MarketEnvironment::flat(100.0, 0.05, 0.0, 0.2).unwrap();
/// let bumped = env.bump_spot(1.0).unwrap();
///
/// assert_eq!(env.spot(), 100.0);
/// assert_eq!(bumped.spot(), 101.0);
/// assert!((env.discount_factor(1.0) - (-0.05_f64).exp()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone)]
pub struct MarketEnvironment {
    spot: f64,
    rate: f64,
    dividend_yield: f64,
    volatility: Volatility,
}

impl MarketEnvironment {
    /// Validated constructor.
    ///
    /// # Errors
    ///
    /// * `InvalidSpot` - spot not positive and finite
    /// * `InvalidRate` - rate not finite
    /// * `InvalidDividendYield` - yield negative or not finite
    pub fn new(
        spot: f64,
        rate: f64,
        dividend_yield: f64,
        volatility: impl Into<Volatility>,
    ) -> Result<Self, MarketDataError> {
        if !spot.is_finite() || spot <= 0.0 {
            return Err(MarketDataError::InvalidSpot { spot });
        }
        if !rate.is_finite() {
            return Err(MarketDataError::InvalidRate { rate });
        }
        if !dividend_yield.is_finite() || dividend_yield < 0.0 {
            return Err(MarketDataError::InvalidDividendYield { dividend_yield });
        }
        Ok(Self {
            spot,
            rate,
            dividend_yield,
            volatility: volatility.into(),
        })
    }

    /// Environment with a flat volatility.
    pub fn flat(
        spot: f64,
        rate: f64,
        dividend_yield: f64,
        sigma: f64,
    ) -> Result<Self, MarketDataError> {
        Self::new(spot, rate, dividend_yield, Volatility::flat(sigma)?)
    }

    /// Spot price.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Continuously compounded risk-free rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Continuous dividend yield.
    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    /// Volatility input.
    #[inline]
    pub fn volatility(&self) -> &Volatility {
        &self.volatility
    }

    /// σ for an option struck at `strike` expiring at `maturity`.
    pub fn volatility_for(&self, strike: f64, maturity: f64) -> Result<f64, MarketDataError> {
        self.volatility.volatility(strike, maturity)
    }

    /// e^{-rT}
    #[inline]
    pub fn discount_factor(&self, maturity: f64) -> f64 {
        (-self.rate * maturity).exp()
    }

    /// e^{-qT}
    #[inline]
    pub fn dividend_discount(&self, maturity: f64) -> f64 {
        (-self.dividend_yield * maturity).exp()
    }

    /// Forward price S·e^{(r-q)T}.
    #[inline]
    pub fn forward(&self, maturity: f64) -> f64 {
        self.spot * ((self.rate - self.dividend_yield) * maturity).exp()
    }

    /// New snapshot with a different spot.
    pub fn with_spot(&self, spot: f64) -> Result<Self, MarketDataError> {
        Self::new(spot, self.rate, self.dividend_yield, self.volatility.clone())
    }

    /// New snapshot with a different rate.
    pub fn with_rate(&self, rate: f64) -> Result<Self, MarketDataError> {
        Self::new(self.spot, rate, self.dividend_yield, self.volatility.clone())
    }

    /// New snapshot with a different dividend yield.
    pub fn with_dividend_yield(&self, dividend_yield: f64) -> Result<Self, MarketDataError> {
        Self::new(self.spot, self.rate, dividend_yield, self.volatility.clone())
    }

    /// New snapshot with a different volatility input.
    pub fn with_volatility(&self, volatility: impl Into<Volatility>) -> Self {
        Self {
            volatility: volatility.into(),
            ..self.clone()
        }
    }

    /// Spot shifted by `shift` (absolute).
    pub fn bump_spot(&self, shift: f64) -> Result<Self, MarketDataError> {
        self.with_spot(self.spot + shift)
    }

    /// Rate shifted by `shift` (absolute).
    pub fn bump_rate(&self, shift: f64) -> Result<Self, MarketDataError> {
        self.with_rate(self.rate + shift)
    }

    /// Volatility shifted in parallel by `shift` (absolute).
    pub fn bump_volatility(&self, shift: f64) -> Result<Self, MarketDataError> {
        Ok(self.with_volatility(self.volatility.shifted(shift)?))
    }
}

/// Converts an annually compounded rate to its continuous equivalent, ln(1 + r).
///
/// ```
/// use pricer_core::market_data::continuous_rate;
///
/// assert!((continuous_rate(0.05) - 0.04879).abs() < 1e-5);
/// assert!(continuous_rate(-1.5).is_nan());
/// ```
pub fn continuous_rate(annual_rate: f64) -> f64 {
    annual_rate.ln_1p()
}
