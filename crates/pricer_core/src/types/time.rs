//! Day count conventions and year-fraction helpers.
//!
//! Maturities throughout the engine are expressed in years. Dates coming from
//! an ingestion layer are converted here, by default with Actual/365 Fixed.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::error::PricingError;

/// Day count convention used to turn a date interval into a year fraction.
///
/// ```
/// use pricer_core::types::time::DayCountConvention;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
///
/// // 182 days / 365.0
/// let yf = DayCountConvention::Act365Fixed.year_fraction(start, end);
/// assert!((yf - 0.4986).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DayCountConvention {
    /// Actual/365 Fixed: actual_days / 365.0
    #[default]
    Act365Fixed,
    /// Actual/360: actual_days / 360.0
    Act360,
}

impl DayCountConvention {
    /// Returns the standard convention name.
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Act365Fixed => "ACT/365F",
            DayCountConvention::Act360 => "ACT/360",
        }
    }

    /// Signed year fraction between two dates (negative when `end < start`).
    pub fn year_fraction(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        let days = (end - start).num_days() as f64;
        match self {
            DayCountConvention::Act365Fixed => days / 365.0,
            DayCountConvention::Act360 => days / 360.0,
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayCountConvention {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACT/365" | "ACT/365F" | "ACTUAL365FIXED" => Ok(DayCountConvention::Act365Fixed),
            "ACT/360" | "ACTUAL360" => Ok(DayCountConvention::Act360),
            other => Err(PricingError::InvalidInput(format!(
                "unknown day count convention '{other}'"
            ))),
        }
    }
}

/// Time to maturity in years under Actual/365 Fixed.
///
/// Fails with `InvalidInput` when the expiry is not strictly after the
/// valuation date, since every instrument needs a positive maturity.
///
/// ```
/// use pricer_core::types::time::time_to_maturity;
/// use chrono::NaiveDate;
///
/// let valuation = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let expiry = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let t = time_to_maturity(valuation, expiry).unwrap();
/// assert!((t - 366.0 / 365.0).abs() < 1e-12);
/// ```
pub fn time_to_maturity(valuation: NaiveDate, expiry: NaiveDate) -> Result<f64, PricingError> {
    let t = DayCountConvention::Act365Fixed.year_fraction(valuation, expiry);
    if t <= 0.0 {
        return Err(PricingError::InvalidInput(format!(
            "expiry {expiry} is not after valuation date {valuation}"
        )));
    }
    Ok(t)
}
