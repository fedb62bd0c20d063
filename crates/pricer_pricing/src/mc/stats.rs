//! Running sample moments for simulation estimates.

/// Count, sum and sum of squares of a sample.
///
/// Partial statistics from independent batches merge exactly; merging in a
/// fixed order gives a bit-identical total regardless of how the batches
/// were scheduled.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::SampleStats;
///
/// let mut a = SampleStats::default();
/// a.push(1.0);
/// a.push(3.0);
/// let mut b = SampleStats::default();
/// b.push(5.0);
/// a.merge(&b);
///
/// assert_eq!(a.count(), 3);
/// assert_eq!(a.mean(), 3.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SampleStats {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl SampleStats {
    /// Adds one observation.
    #[inline]
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
        self.sum_sq += x * x;
    }

    /// Adds every observation of `other`.
    #[inline]
    pub fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }

    /// Number of observations.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sample mean; zero for an empty sample.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Unbiased sample variance; zero below two observations.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        ((self.sum_sq - n * mean * mean) / (n - 1.0)).max(0.0)
    }

    /// Standard error of the mean, √(s²/n).
    pub fn standard_error(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.variance() / self.count as f64).sqrt()
    }
}
