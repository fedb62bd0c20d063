//! Pricing result types shared by every method.

use std::collections::BTreeMap;
use std::fmt;

/// Valuation method that produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PricingMethod {
    /// Closed-form Black-Scholes-Merton
    Analytical,
    /// Cox-Ross-Rubinstein binomial tree
    Lattice,
    /// Monte Carlo simulation
    MonteCarlo,
}

impl fmt::Display for PricingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingMethod::Analytical => write!(f, "analytical"),
            PricingMethod::Lattice => write!(f, "lattice"),
            PricingMethod::MonteCarlo => write!(f, "monte-carlo"),
        }
    }
}

/// Method-specific metadata keyed by name, in name order.
pub type Diagnostics = BTreeMap<String, f64>;

/// Price of one instrument under one environment.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::{PricingMethod, PricingResult};
///
/// let result = PricingResult::new(10.45, PricingMethod::MonteCarlo)
///     .with_standard_error(0.05)
///     .with_diagnostic("paths", 100_000.0);
///
/// assert!((result.confidence_95() - 0.098).abs() < 1e-12);
/// assert_eq!(result.diagnostic("paths"), Some(100_000.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Present value, never negative.
    pub price: f64,
    /// Method that produced the price.
    pub method: PricingMethod,
    /// Standard error of the estimate (simulation only).
    pub standard_error: Option<f64>,
    /// Method-specific metadata.
    pub diagnostics: Diagnostics,
}

impl PricingResult {
    /// Result with no standard error and no diagnostics.
    pub fn new(price: f64, method: PricingMethod) -> Self {
        Self {
            price,
            method,
            standard_error: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Attaches a standard error.
    pub fn with_standard_error(mut self, standard_error: f64) -> Self {
        self.standard_error = Some(standard_error);
        self
    }

    /// Adds one diagnostic entry.
    pub fn with_diagnostic(mut self, name: &str, value: f64) -> Self {
        self.diagnostics.insert(name.to_string(), value);
        self
    }

    /// Looks up a diagnostic entry.
    pub fn diagnostic(&self, name: &str) -> Option<f64> {
        self.diagnostics.get(name).copied()
    }

    /// Returns the 95% confidence interval half-width (zero without a standard error).
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.standard_error.unwrap_or(0.0)
    }

    /// Returns the 99% confidence interval half-width (zero without a standard error).
    #[inline]
    pub fn confidence_99(&self) -> f64 {
        2.576 * self.standard_error.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_result_has_no_interval() {
        let result = PricingResult::new(5.0, PricingMethod::Lattice);
        assert_eq!(result.confidence_95(), 0.0);
        assert_eq!(result.diagnostic("steps"), None);
    }

    #[test]
    fn test_diagnostics_are_ordered() {
        let result = PricingResult::new(1.0, PricingMethod::Lattice)
            .with_diagnostic("steps", 200.0)
            .with_diagnostic("probability", 0.5);
        let names: Vec<&str> = result.diagnostics.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["probability", "steps"]);
    }

    #[test]
    fn test_method_display() {
        assert_eq!(PricingMethod::MonteCarlo.to_string(), "monte-carlo");
    }
}
