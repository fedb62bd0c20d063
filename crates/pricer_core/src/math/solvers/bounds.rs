//! Box constraints for bounded optimisation.

use crate::types::SolverError;

/// Per-parameter `[lower, upper]` box.
///
/// Optimisers clamp every trial point into the box before evaluating the
/// objective.
///
/// ```
/// use pricer_core::math::solvers::BoxBounds;
///
/// let bounds = BoxBounds::new(vec![0.0, 1e-4], vec![1.0, 5.0]).unwrap();
/// assert_eq!(bounds.clamp(&[-1.0, 7.0]), vec![0.0, 5.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl BoxBounds {
    /// Validated constructor: equal non-zero lengths, finite `lower <= upper`.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, SolverError> {
        if lower.is_empty() || lower.len() != upper.len() {
            return Err(SolverError::InvalidInput(format!(
                "bounds need equal non-zero lengths, got {} lower and {} upper",
                lower.len(),
                upper.len()
            )));
        }
        for (i, (&lo, &hi)) in lower.iter().zip(&upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(SolverError::InvalidInput(format!(
                    "invalid bound at index {i}: [{lo}, {hi}]"
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Same `[lower, upper]` for `dim` parameters.
    pub fn uniform(dim: usize, lower: f64, upper: f64) -> Result<Self, SolverError> {
        Self::new(vec![lower; dim], vec![upper; dim])
    }

    /// Number of parameters.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Lower bounds.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper bounds.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Projects `x` onto the box.
    pub fn clamp(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&v, (&lo, &hi))| v.clamp(lo, hi))
            .collect()
    }

    /// True if every coordinate lies inside the box.
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dimension()
            && x
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(&v, (&lo, &hi))| v >= lo && v <= hi)
    }

    pub(crate) fn check_dimension(&self, x: &[f64]) -> Result<(), SolverError> {
        if x.len() != self.dimension() {
            return Err(SolverError::InvalidInput(format!(
                "parameter vector has {} entries, bounds have {}",
                x.len(),
                self.dimension()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_bounds() {
        assert!(BoxBounds::new(vec![1.0], vec![0.0]).is_err());
        assert!(BoxBounds::new(vec![f64::NAN], vec![0.0]).is_err());
        assert!(BoxBounds::new(vec![], vec![]).is_err());
        assert!(BoxBounds::new(vec![0.0, 0.0], vec![1.0]).is_err());
    }

    #[test]
    fn test_clamp_and_contains() {
        let bounds = BoxBounds::uniform(3, 0.0, 1.0).unwrap();
        assert_eq!(bounds.clamp(&[-0.5, 0.5, 1.5]), vec![0.0, 0.5, 1.0]);
        assert!(bounds.contains(&[0.0, 0.5, 1.0]));
        assert!(!bounds.contains(&[0.0, 0.5]));
        assert!(!bounds.contains(&[0.0, 0.5, 1.1]));
    }
}
