//! Streaming statistics over a simulated price path.
//!
//! Statistics are accumulated as prices are observed so the simulation never
//! has to keep the path in memory:
//!
//! - **Arithmetic average**: running sum / count
//! - **Geometric average**: exp(running log sum / count)
//! - **Maximum / minimum**: running extremes
//!
//! Averages run over fixing dates only. Extremes also include the price the
//! observer was started at, so barriers and lookbacks are monitored from
//! inception.

/// Streaming path statistics.
///
/// # Example
///
/// ```
/// use pricer_models::instruments::PathObserver;
///
/// let mut observer = PathObserver::starting_at(100.0);
/// for price in [105.0, 110.0, 95.0] {
///     observer.observe(price);
/// }
///
/// assert_eq!(observer.count(), 3);
/// assert!((observer.arithmetic_average() - 310.0 / 3.0).abs() < 1e-12);
/// assert_eq!(observer.maximum(), 110.0);
/// assert_eq!(observer.minimum(), 95.0);
/// assert_eq!(observer.terminal(), 95.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathObserver {
    running_sum: f64,
    running_log_sum: f64,
    running_max: f64,
    running_min: f64,
    count: usize,
    terminal: f64,
}

impl Default for PathObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PathObserver {
    /// Empty observer with no extremes.
    #[inline]
    pub fn new() -> Self {
        Self {
            running_sum: 0.0,
            running_log_sum: 0.0,
            running_max: f64::NEG_INFINITY,
            running_min: f64::INFINITY,
            count: 0,
            terminal: f64::NAN,
        }
    }

    /// Observer whose extremes start at `spot`; `spot` is not a fixing.
    #[inline]
    pub fn starting_at(spot: f64) -> Self {
        Self {
            running_max: spot,
            running_min: spot,
            terminal: spot,
            ..Self::new()
        }
    }

    /// Records a fixing.
    #[inline]
    pub fn observe(&mut self, price: f64) {
        self.running_sum += price;
        self.running_log_sum += price.ln();
        self.running_max = self.running_max.max(price);
        self.running_min = self.running_min.min(price);
        self.count += 1;
        self.terminal = price;
    }

    /// Restarts at `spot` for the next path.
    #[inline]
    pub fn reset(&mut self, spot: f64) {
        *self = Self::starting_at(spot);
    }

    /// Number of fixings observed.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of the fixings, or the terminal price if there are none.
    #[inline]
    pub fn arithmetic_average(&self) -> f64 {
        if self.count == 0 {
            self.terminal
        } else {
            self.running_sum / self.count as f64
        }
    }

    /// Geometric mean of the fixings, or the terminal price if there are none.
    #[inline]
    pub fn geometric_average(&self) -> f64 {
        if self.count == 0 {
            self.terminal
        } else {
            (self.running_log_sum / self.count as f64).exp()
        }
    }

    /// Highest price seen.
    #[inline]
    pub fn maximum(&self) -> f64 {
        self.running_max
    }

    /// Lowest price seen.
    #[inline]
    pub fn minimum(&self) -> f64 {
        self.running_min
    }

    /// Last price seen.
    #[inline]
    pub fn terminal(&self) -> f64 {
        self.terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_geometric_average() {
        let mut observer = PathObserver::starting_at(1.0);
        observer.observe(2.0);
        observer.observe(8.0);
        assert_relative_eq!(observer.geometric_average(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_start_counts_for_extremes_only() {
        let mut observer = PathObserver::starting_at(120.0);
        observer.observe(100.0);
        assert_eq!(observer.maximum(), 120.0);
        assert_eq!(observer.arithmetic_average(), 100.0);
    }

    #[test]
    fn test_no_fixings_falls_back_to_terminal() {
        let observer = PathObserver::starting_at(100.0);
        assert_eq!(observer.arithmetic_average(), 100.0);
        assert_eq!(observer.geometric_average(), 100.0);
    }

    #[test]
    fn test_reset() {
        let mut observer = PathObserver::starting_at(100.0);
        observer.observe(150.0);
        observer.reset(90.0);
        assert_eq!(observer.count(), 0);
        assert_eq!(observer.maximum(), 90.0);
        assert_eq!(observer.terminal(), 90.0);
    }
}
