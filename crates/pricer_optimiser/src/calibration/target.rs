//! Calibration target types.
//!
//! A target is the ordered set of market quotes the calibrator fits. Order
//! is preserved everywhere: residuals, model prices and implied volatilities
//! come back in quote order.

use pricer_core::types::PricingError;
use pricer_models::instruments::Instrument;

/// One observed option price.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalibrationQuote {
    /// Quoted contract
    pub instrument: Instrument,
    /// Observed market price
    pub market_price: f64,
    /// Weight of this quote in the objective
    pub weight: f64,
}

impl CalibrationQuote {
    /// Quote with unit weight.
    pub fn new(instrument: Instrument, market_price: f64) -> Self {
        Self {
            instrument,
            market_price,
            weight: 1.0,
        }
    }

    /// Set the weight for this quote.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Ordered, non-empty set of quotes.
///
/// # Examples
///
/// ```
/// use pricer_models::instruments::{Instrument, OptionType};
/// use pricer_optimiser::calibration::{CalibrationQuote, CalibrationTarget};
///
/// let call = Instrument::european(OptionType::Call, 100.0, 1.0).unwrap();
/// let target = CalibrationTarget::new(vec![CalibrationQuote::new(call, 10.45)]).unwrap();
/// assert_eq!(target.len(), 1);
///
/// assert!(CalibrationTarget::new(Vec::new()).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<CalibrationQuote>", into = "Vec<CalibrationQuote>")]
pub struct CalibrationTarget {
    quotes: Vec<CalibrationQuote>,
}

impl CalibrationTarget {
    /// Validates and wraps `quotes`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty set, a negative or non-finite price, or a
    /// weight that is not finite and positive.
    pub fn new(quotes: Vec<CalibrationQuote>) -> Result<Self, PricingError> {
        if quotes.is_empty() {
            return Err(PricingError::InvalidInput(
                "calibration target has no quotes".to_string(),
            ));
        }
        for (i, quote) in quotes.iter().enumerate() {
            if !quote.market_price.is_finite() || quote.market_price < 0.0 {
                return Err(PricingError::InvalidInput(format!(
                    "quote {i} ({}) has market price {}",
                    quote.instrument, quote.market_price
                )));
            }
            if !quote.weight.is_finite() || quote.weight <= 0.0 {
                return Err(PricingError::InvalidInput(format!(
                    "quote {i} ({}) has weight {}",
                    quote.instrument, quote.weight
                )));
            }
        }
        Ok(Self { quotes })
    }

    /// Unit-weight quotes from (instrument, price) pairs.
    pub fn from_prices(
        prices: impl IntoIterator<Item = (Instrument, f64)>,
    ) -> Result<Self, PricingError> {
        Self::new(
            prices
                .into_iter()
                .map(|(instrument, price)| CalibrationQuote::new(instrument, price))
                .collect(),
        )
    }

    /// Quotes in order.
    pub fn quotes(&self) -> &[CalibrationQuote] {
        &self.quotes
    }

    /// Number of quotes.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Always false for a constructed target.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Sum of the quote weights.
    pub fn total_weight(&self) -> f64 {
        self.quotes.iter().map(|q| q.weight).sum()
    }
}

impl TryFrom<Vec<CalibrationQuote>> for CalibrationTarget {
    type Error = PricingError;

    fn try_from(quotes: Vec<CalibrationQuote>) -> Result<Self, Self::Error> {
        Self::new(quotes)
    }
}

impl From<CalibrationTarget> for Vec<CalibrationQuote> {
    fn from(target: CalibrationTarget) -> Self {
        target.quotes
    }
}
