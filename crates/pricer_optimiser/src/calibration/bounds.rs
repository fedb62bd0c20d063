//! Box constraints on calibrated parameters.

use pricer_core::math::solvers::BoxBounds;
use pricer_core::types::PricingError;

/// Closed interval `[min, max]` for one parameter.
///
/// # Examples
///
/// ```
/// use pricer_optimiser::calibration::ParameterBounds;
///
/// let bounds = ParameterBounds::volatility();
/// assert_eq!(bounds.clamp(0.0), 1e-4);
/// assert_eq!(bounds.clamp(9.0), 5.0);
/// assert!(bounds.contains(0.2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParameterBounds {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl ParameterBounds {
    /// Validated interval; both ends finite with `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self, PricingError> {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(PricingError::InvalidInput(format!(
                "invalid parameter bounds [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    /// Bounds for a volatility node, `[1e-4, 5]`.
    pub fn volatility() -> Self {
        Self {
            min: 1e-4,
            max: 5.0,
        }
    }

    /// Clamp a value to these bounds.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Whether `value` lies in the interval.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Stacks per-parameter bounds into the solver's box.
pub(crate) fn to_box(bounds: &[ParameterBounds]) -> Result<BoxBounds, PricingError> {
    let lower = bounds.iter().map(|b| b.min).collect();
    let upper = bounds.iter().map(|b| b.max).collect();
    BoxBounds::new(lower, upper).map_err(|e| PricingError::InvalidInput(e.to_string()))
}
