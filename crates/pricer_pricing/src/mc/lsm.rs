//! Longstaff-Schwartz least-squares Monte Carlo for American exercise.
//!
//! Exercise is allowed at the `n_steps` simulated dates t_i = iT/n. Walking
//! backwards from maturity, the discounted realised cashflow of every
//! in-the-money path is regressed on the basis {1, x, x²} of moneyness
//! x = S/K; a path exercises when its intrinsic value exceeds the fitted
//! continuation value. Exercise at inception is decided by the caller.
//!
//! Regression sums are accumulated per batch and merged in batch order, so
//! the fitted boundary and the price do not depend on thread scheduling.

use pricer_core::math::linalg::NormalEquations;
use pricer_core::types::{CancellationToken, PricingError};
use pricer_models::instruments::Instrument;
use rayon::prelude::*;
use tracing::debug;

use super::paths::{fill_path, GbmParams, StepCoefficients};
use super::stats::SampleStats;
use crate::rng::PricerRng;

const OPERATION: &str = "Longstaff-Schwartz";

/// Regression basis at moneyness `x`.
#[inline]
pub fn basis(x: f64) -> [f64; 3] {
    [1.0, x, x * x]
}

/// Simulation settings for one regression run.
pub(crate) struct LsmRun<'a> {
    pub n_paths: usize,
    pub n_steps: usize,
    pub batch_size: usize,
    pub antithetic: bool,
    pub seed: u64,
    pub cancel: Option<&'a CancellationToken>,
}

/// Simulated trajectories of one batch and their running cashflow values.
struct Batch {
    /// Row-major (trajectory, date) prices, `n_steps + 1` per trajectory.
    prices: Vec<f64>,
    /// Cashflow of each trajectory, discounted to the current date.
    values: Vec<f64>,
    /// Antithetic twins are stored next to each other.
    paired: bool,
}

impl LsmRun<'_> {
    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(CancellationToken::is_cancelled)
    }

    /// Present values per path (pair averages when antithetic), before any
    /// exercise at inception.
    pub fn run(
        &self,
        instrument: &Instrument,
        params: &GbmParams,
    ) -> Result<SampleStats, PricingError> {
        let n_batches = self.n_paths.div_ceil(self.batch_size);
        let width = self.n_steps + 1;
        let step = StepCoefficients::new(params, self.n_steps);
        let step_discount = (-params.rate * params.maturity / self.n_steps as f64).exp();
        let strike = instrument.strike();

        let generated: Vec<Option<Batch>> = (0..n_batches)
            .into_par_iter()
            .map(|b| {
                if self.cancelled() {
                    return None;
                }
                let start = b * self.batch_size;
                let paths = self.batch_size.min(self.n_paths - start);
                Some(self.generate(b as u64, paths, params.spot, step, instrument))
            })
            .collect();
        let generated_count = generated.iter().filter(|b| b.is_some()).count();
        if generated_count < n_batches {
            return Err(PricingError::cancelled(OPERATION, generated_count, n_batches));
        }
        let mut batches: Vec<Batch> = generated.into_iter().flatten().collect();

        let dates = self.n_steps - 1;
        let mut exercised_dates = 0usize;
        for t in (1..self.n_steps).rev() {
            if self.cancelled() {
                return Err(PricingError::cancelled(OPERATION, dates - t, dates));
            }
            batches.par_iter_mut().for_each(|batch| {
                batch.values.iter_mut().for_each(|v| *v *= step_discount);
            });

            let regression = batches
                .par_iter()
                .map(|batch| {
                    let mut normal = NormalEquations::new(3);
                    for (p, value) in batch.values.iter().enumerate() {
                        let spot = batch.prices[p * width + t];
                        if instrument.intrinsic(spot) > 0.0 {
                            normal.add(&basis(spot / strike), *value);
                        }
                    }
                    normal
                })
                .collect::<Vec<_>>()
                .into_iter()
                .fold(NormalEquations::new(3), |mut acc, part| {
                    acc.merge(&part);
                    acc
                });

            let Some(beta) = regression.solve() else {
                continue;
            };
            exercised_dates += 1;
            batches.par_iter_mut().for_each(|batch| {
                for (p, value) in batch.values.iter_mut().enumerate() {
                    let spot = batch.prices[p * width + t];
                    let exercise = instrument.intrinsic(spot);
                    if exercise <= 0.0 {
                        continue;
                    }
                    let x = basis(spot / strike);
                    let continuation = beta[0] * x[0] + beta[1] * x[1] + beta[2] * x[2];
                    if exercise > continuation {
                        *value = exercise;
                    }
                }
            });
        }
        debug!(
            dates = self.n_steps,
            regressions = exercised_dates,
            "Longstaff-Schwartz backward induction finished"
        );

        let mut stats = SampleStats::default();
        for batch in &batches {
            if batch.paired {
                for pair in batch.values.chunks_exact(2) {
                    stats.push(step_discount * 0.5 * (pair[0] + pair[1]));
                }
            } else {
                for value in &batch.values {
                    stats.push(step_discount * value);
                }
            }
        }
        Ok(stats)
    }

    fn generate(
        &self,
        stream: u64,
        paths: usize,
        spot: f64,
        step: StepCoefficients,
        instrument: &Instrument,
    ) -> Batch {
        let width = self.n_steps + 1;
        let trajectories = if self.antithetic { 2 * paths } else { paths };
        let mut rng = PricerRng::for_stream(self.seed, stream);
        let mut randoms = vec![0.0; self.n_steps];
        let mut prices = vec![0.0; trajectories * width];

        let mut rows = prices.chunks_exact_mut(width);
        for _ in 0..paths {
            rng.fill_normal(&mut randoms);
            if let Some(row) = rows.next() {
                fill_path(spot, step, &randoms, 1.0, row);
            }
            if self.antithetic {
                if let Some(row) = rows.next() {
                    fill_path(spot, step, &randoms, -1.0, row);
                }
            }
        }

        let values = prices
            .chunks_exact(width)
            .map(|row| instrument.intrinsic(row[self.n_steps]))
            .collect();
        Batch {
            prices,
            values,
            paired: self.antithetic,
        }
    }
}
