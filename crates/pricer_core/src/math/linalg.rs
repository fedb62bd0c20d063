//! Small dense linear algebra for normal equations.
//!
//! Matrices are row-major `Vec<Vec<f64>>`; the systems solved here are tiny
//! (calibration parameter counts, regression bases) so no external linear
//! algebra crate is needed.

/// Pivot magnitude below which a factorisation is treated as singular.
const PIVOT_EPS: f64 = 1e-30;

/// Solves `A x = b` for symmetric positive definite `A` by Cholesky
/// decomposition.
///
/// Returns `None` if `A` is not positive definite, the dimensions disagree,
/// or a pivot vanishes.
///
/// ```
/// use pricer_core::math::linalg::solve_cholesky;
///
/// let a = vec![vec![4.0, 2.0], vec![2.0, 2.0]];
/// let x = solve_cholesky(&a, &[8.0, 5.0]).unwrap();
/// assert!((x[0] - 1.5).abs() < 1e-12);
/// assert!((x[1] - 1.0).abs() < 1e-12);
/// ```
pub fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n || a.iter().any(|row| row.len() != n) {
        return None;
    }

    // A = L L^T
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                if l[j][j].abs() < PIVOT_EPS {
                    return None;
                }
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // L^T x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Accumulates the normal equations `XᵀX β = Xᵀy` one observation at a time.
///
/// Two accumulators built over disjoint observations can be merged, which
/// lets regressions be computed in parallel chunks and reduced in a fixed
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalEquations {
    xtx: Vec<Vec<f64>>,
    xty: Vec<f64>,
    count: usize,
}

impl NormalEquations {
    /// Empty system for `dim` regressors.
    pub fn new(dim: usize) -> Self {
        Self {
            xtx: vec![vec![0.0; dim]; dim],
            xty: vec![0.0; dim],
            count: 0,
        }
    }

    /// Adds one observation with regressors `x` and response `y`.
    pub fn add(&mut self, x: &[f64], y: f64) {
        for (i, &xi) in x.iter().enumerate() {
            for (j, &xj) in x.iter().enumerate() {
                self.xtx[i][j] += xi * xj;
            }
            self.xty[i] += xi * y;
        }
        self.count += 1;
    }

    /// Adds the sums of another accumulator of the same dimension.
    pub fn merge(&mut self, other: &Self) {
        for (row, other_row) in self.xtx.iter_mut().zip(&other.xtx) {
            for (a, b) in row.iter_mut().zip(other_row) {
                *a += b;
            }
        }
        for (a, b) in self.xty.iter_mut().zip(&other.xty) {
            *a += b;
        }
        self.count += other.count;
    }

    /// Number of observations added.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Least-squares coefficients, or `None` if the system is singular or has
    /// fewer observations than regressors.
    pub fn solve(&self) -> Option<Vec<f64>> {
        if self.count < self.xty.len() {
            return None;
        }
        solve_cholesky(&self.xtx, &self.xty)
    }
}
