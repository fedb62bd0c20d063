//! The contract model shared by every pricer.

use std::fmt;

use chrono::NaiveDate;
use pricer_core::types::time::time_to_maturity;
use pricer_core::types::PricingError;

use super::error::InstrumentError;
use super::observer::PathObserver;
use super::payoff::{OptionType, PathPayoff};

/// Exercise style and payoff family of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstrumentKind {
    /// European call
    EuropeanCall,
    /// European put
    EuropeanPut,
    /// American call
    AmericanCall,
    /// American put
    AmericanPut,
    /// Path-dependent payoff, European exercise
    ExoticPath,
}

impl InstrumentKind {
    /// Returns true for the American kinds.
    #[inline]
    pub fn is_american(self) -> bool {
        matches!(self, InstrumentKind::AmericanCall | InstrumentKind::AmericanPut)
    }

    /// Call/put of a vanilla kind, `None` for [`InstrumentKind::ExoticPath`].
    #[inline]
    pub fn option_type(self) -> Option<OptionType> {
        match self {
            InstrumentKind::EuropeanCall | InstrumentKind::AmericanCall => Some(OptionType::Call),
            InstrumentKind::EuropeanPut | InstrumentKind::AmericanPut => Some(OptionType::Put),
            InstrumentKind::ExoticPath => None,
        }
    }

    fn vanilla(option_type: OptionType, american: bool) -> Self {
        match (option_type, american) {
            (OptionType::Call, false) => InstrumentKind::EuropeanCall,
            (OptionType::Put, false) => InstrumentKind::EuropeanPut,
            (OptionType::Call, true) => InstrumentKind::AmericanCall,
            (OptionType::Put, true) => InstrumentKind::AmericanPut,
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstrumentKind::EuropeanCall => "EuropeanCall",
            InstrumentKind::EuropeanPut => "EuropeanPut",
            InstrumentKind::AmericanCall => "AmericanCall",
            InstrumentKind::AmericanPut => "AmericanPut",
            InstrumentKind::ExoticPath => "ExoticPath",
        };
        f.write_str(name)
    }
}

/// Payoff attached to an instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payoff {
    /// Depends on the terminal price only.
    Vanilla(OptionType),
    /// Depends on the whole trajectory.
    Path(PathPayoff),
}

/// An option contract.
///
/// Instruments are immutable value objects: strike and maturity are
/// validated once, and the `with_*` methods return new instruments.
///
/// # Examples
/// ```
/// use pricer_models::instruments::{Instrument, InstrumentKind, OptionType};
///
/// let put = Instrument::new(InstrumentKind::AmericanPut, 100.0, 1.0).unwrap();
/// assert!(put.is_american());
/// assert_eq!(put.intrinsic(90.0), 10.0);
/// assert_eq!(put.to_string(), "AmericanPut K=100 T=1");
///
/// let european = put.european_equivalent().unwrap();
/// assert_eq!(european.kind(), InstrumentKind::EuropeanPut);
/// assert_eq!(european.option_type(), OptionType::Put);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instrument {
    kind: InstrumentKind,
    strike: f64,
    maturity: f64,
    payoff: Payoff,
}

impl Instrument {
    /// Vanilla instrument of the given kind.
    ///
    /// # Errors
    /// [`InstrumentError::PayoffMismatch`] for [`InstrumentKind::ExoticPath`]
    /// (use [`Instrument::exotic`]), and the strike/maturity range errors.
    pub fn new(kind: InstrumentKind, strike: f64, maturity: f64) -> Result<Self, InstrumentError> {
        let option_type = kind.option_type().ok_or_else(|| InstrumentError::PayoffMismatch {
            message: "ExoticPath instruments need a path payoff".to_string(),
        })?;
        Self::build(kind, strike, maturity, Payoff::Vanilla(option_type))
    }

    /// European call or put.
    pub fn european(
        option_type: OptionType,
        strike: f64,
        maturity: f64,
    ) -> Result<Self, InstrumentError> {
        Self::new(InstrumentKind::vanilla(option_type, false), strike, maturity)
    }

    /// American call or put.
    pub fn american(
        option_type: OptionType,
        strike: f64,
        maturity: f64,
    ) -> Result<Self, InstrumentError> {
        Self::new(InstrumentKind::vanilla(option_type, true), strike, maturity)
    }

    /// Path-dependent instrument. Barrier levels must be positive.
    pub fn exotic(payoff: PathPayoff, strike: f64, maturity: f64) -> Result<Self, InstrumentError> {
        if let PathPayoff::Barrier { barrier, .. } = payoff {
            if !barrier.is_finite() || barrier <= 0.0 {
                return Err(InstrumentError::InvalidBarrier { barrier });
            }
        }
        Self::build(InstrumentKind::ExoticPath, strike, maturity, Payoff::Path(payoff))
    }

    /// Vanilla instrument with maturity measured Actual/365 Fixed between two dates.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use pricer_models::instruments::{Instrument, InstrumentKind};
    ///
    /// let valuation = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    /// let expiry = NaiveDate::from_ymd_opt(2024, 7, 2).unwrap();
    /// let call = Instrument::from_dates(InstrumentKind::EuropeanCall, 100.0, valuation, expiry)
    ///     .unwrap();
    /// assert!((call.maturity() - 182.0 / 365.0).abs() < 1e-12);
    /// ```
    pub fn from_dates(
        kind: InstrumentKind,
        strike: f64,
        valuation: NaiveDate,
        expiry: NaiveDate,
    ) -> Result<Self, PricingError> {
        let maturity = time_to_maturity(valuation, expiry)?;
        Ok(Self::new(kind, strike, maturity)?)
    }

    fn build(
        kind: InstrumentKind,
        strike: f64,
        maturity: f64,
        payoff: Payoff,
    ) -> Result<Self, InstrumentError> {
        if !strike.is_finite() || strike <= 0.0 {
            return Err(InstrumentError::InvalidStrike { strike });
        }
        if !maturity.is_finite() || maturity <= 0.0 {
            return Err(InstrumentError::InvalidMaturity { maturity });
        }
        Ok(Self {
            kind,
            strike,
            maturity,
            payoff,
        })
    }

    /// Exercise style and payoff family.
    #[inline]
    pub fn kind(&self) -> InstrumentKind {
        self.kind
    }

    /// Strike price.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Time to maturity in years.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    /// The attached payoff.
    #[inline]
    pub fn payoff(&self) -> &Payoff {
        &self.payoff
    }

    /// Call or put; for path payoffs, the direction of the path payoff.
    #[inline]
    pub fn option_type(&self) -> OptionType {
        match self.payoff {
            Payoff::Vanilla(option_type) => option_type,
            Payoff::Path(path) => path.option_type(),
        }
    }

    /// Returns true if early exercise is allowed.
    #[inline]
    pub fn is_american(&self) -> bool {
        self.kind.is_american()
    }

    /// Returns true if the payoff needs the whole trajectory.
    #[inline]
    pub fn is_path_dependent(&self) -> bool {
        matches!(self.payoff, Payoff::Path(_))
    }

    /// Immediate exercise value at `spot`.
    ///
    /// Path payoffs are evaluated on the single-point path `[spot]`.
    pub fn intrinsic(&self, spot: f64) -> f64 {
        match self.payoff {
            Payoff::Vanilla(option_type) => option_type.intrinsic(spot, self.strike),
            Payoff::Path(path) => path.evaluate(&PathObserver::starting_at(spot), self.strike),
        }
    }

    /// Payout for a trajectory whose first element is the price at inception.
    ///
    /// Vanilla payoffs read the last element. Path payoffs treat every
    /// element after the first as a fixing. An empty path pays nothing.
    pub fn payoff_on_path(&self, path: &[f64]) -> f64 {
        let Some((&start, fixings)) = path.split_first() else {
            return 0.0;
        };
        match self.payoff {
            Payoff::Vanilla(option_type) => {
                let terminal = fixings.last().copied().unwrap_or(start);
                option_type.intrinsic(terminal, self.strike)
            }
            Payoff::Path(payoff) => {
                let mut observer = PathObserver::starting_at(start);
                for &price in fixings {
                    observer.observe(price);
                }
                payoff.evaluate(&observer, self.strike)
            }
        }
    }

    /// Same contract with a different maturity.
    pub fn with_maturity(&self, maturity: f64) -> Result<Self, InstrumentError> {
        Self::build(self.kind, self.strike, maturity, self.payoff)
    }

    /// Same contract with a different strike.
    pub fn with_strike(&self, strike: f64) -> Result<Self, InstrumentError> {
        Self::build(self.kind, strike, self.maturity, self.payoff)
    }

    /// The European contract with the same payoff sign, strike and maturity.
    /// `None` for path-dependent instruments.
    pub fn european_equivalent(&self) -> Option<Self> {
        match self.payoff {
            Payoff::Vanilla(option_type) => Some(Self {
                kind: InstrumentKind::vanilla(option_type, false),
                ..*self
            }),
            Payoff::Path(_) => None,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payoff {
            Payoff::Vanilla(_) => write!(f, "{}", self.kind)?,
            Payoff::Path(path) => write!(f, "{}({})", self.kind, path.name())?,
        }
        write!(f, " K={} T={}", self.strike, self.maturity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::{Averaging, BarrierType, LookbackType};
    use approx::assert_relative_eq;

    fn asian() -> PathPayoff {
        PathPayoff::Asian {
            option_type: OptionType::Call,
            averaging: Averaging::Arithmetic,
        }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    #[test]
    fn test_rejects_bad_terms() {
        assert_eq!(
            Instrument::new(InstrumentKind::EuropeanCall, 0.0, 1.0),
            Err(InstrumentError::InvalidStrike { strike: 0.0 })
        );
        assert!(matches!(
            Instrument::new(InstrumentKind::EuropeanCall, 100.0, -1.0),
            Err(InstrumentError::InvalidMaturity { .. })
        ));
        assert!(Instrument::new(InstrumentKind::EuropeanCall, f64::NAN, 1.0).is_err());
        assert!(matches!(
            Instrument::new(InstrumentKind::ExoticPath, 100.0, 1.0),
            Err(InstrumentError::PayoffMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_barrier() {
        let payoff = PathPayoff::Barrier {
            option_type: OptionType::Call,
            barrier_type: BarrierType::UpOut,
            barrier: -5.0,
        };
        assert!(matches!(
            Instrument::exotic(payoff, 100.0, 1.0),
            Err(InstrumentError::InvalidBarrier { .. })
        ));
    }

    #[test]
    fn test_constructors_pick_kind() {
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        assert_eq!(call.kind(), InstrumentKind::EuropeanCall);
        let put = Instrument::american(OptionType::Put, 100.0, 1.0).unwrap();
        assert_eq!(put.kind(), InstrumentKind::AmericanPut);
        assert!(!put.is_path_dependent());
    }

    #[test]
    fn test_from_dates_rejects_expired() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(Instrument::from_dates(InstrumentKind::EuropeanPut, 100.0, d, d).is_err());
    }

    // ========================================================================
    // Payoffs
    // ========================================================================

    #[test]
    fn test_vanilla_payoff_reads_terminal() {
        let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
        assert_eq!(call.payoff_on_path(&[100.0, 150.0, 104.0]), 4.0);
        assert_eq!(call.payoff_on_path(&[]), 0.0);
        assert_eq!(call.payoff_on_path(&[107.0]), 7.0);
    }

    #[test]
    fn test_path_payoff_skips_inception() {
        let instrument = Instrument::exotic(asian(), 100.0, 1.0).unwrap();
        // start (50) is not a fixing
        assert_relative_eq!(instrument.payoff_on_path(&[50.0, 104.0, 108.0]), 6.0);
        assert!(instrument.is_path_dependent());
        assert_eq!(instrument.european_equivalent(), None);
    }

    #[test]
    fn test_lookback_intrinsic() {
        let payoff = PathPayoff::Lookback {
            option_type: OptionType::Put,
            lookback_type: LookbackType::Fixed,
        };
        let instrument = Instrument::exotic(payoff, 100.0, 1.0).unwrap();
        assert_eq!(instrument.intrinsic(80.0), 20.0);
        assert_eq!(instrument.option_type(), OptionType::Put);
    }

    // ========================================================================
    // Derived instruments
    // ========================================================================

    #[test]
    fn test_with_methods_revalidate() {
        let call = Instrument::american(OptionType::Call, 100.0, 1.0).unwrap();
        let shorter = call.with_maturity(0.5).unwrap();
        assert_eq!(shorter.maturity(), 0.5);
        assert_eq!(shorter.kind(), InstrumentKind::AmericanCall);
        assert_eq!(call.maturity(), 1.0);
        assert!(call.with_strike(-1.0).is_err());
    }

    #[test]
    fn test_display() {
        let instrument = Instrument::exotic(asian(), 95.0, 0.5).unwrap();
        assert_eq!(
            instrument.to_string(),
            "ExoticPath(ArithmeticAsian) K=95 T=0.5"
        );
    }
}
