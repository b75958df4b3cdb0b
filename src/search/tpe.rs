//! Tree-structured Parzen Estimator sampler.
//!
//! TPE models P(x|y) rather than P(y|x): completed trials are split at the
//! gamma quantile of the loss into a "good" and a "bad" group, a Parzen
//! density is fitted to each, and the next candidate maximizes the density
//! ratio l(x)/g(x), a proxy for expected improvement. Dimensions are modelled
//! independently over their quantized grids. The first `n_startup_trials`
//! proposals are uniform random to seed the densities.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::space::{QUniform, SearchSpace};
use super::trials::TrialHistory;

const DEFAULT_GAMMA: f64 = 0.25;
const DEFAULT_STARTUP_TRIALS: usize = 20;
const DEFAULT_CANDIDATES: usize = 24;

/// Independent-dimension TPE sampler over quantized-uniform spaces.
pub struct TpeSampler {
    gamma: f64,
    n_startup_trials: usize,
    n_candidates: usize,
    rng: StdRng,
}

impl TpeSampler {
    /// Create a sampler with default settings. `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            gamma: DEFAULT_GAMMA,
            n_startup_trials: DEFAULT_STARTUP_TRIALS,
            n_candidates: DEFAULT_CANDIDATES,
            rng: StdRng::seed_from_u64(seed.unwrap_or_else(rand::random)),
        }
    }

    /// Fraction of trials counted as "good". Clamped to (0, 1).
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma.clamp(f64::EPSILON, 1.0 - f64::EPSILON);
        self
    }

    /// Number of uniform random trials before the model kicks in.
    pub fn with_startup_trials(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Propose the next configuration given completed trials.
    pub fn suggest(&mut self, space: &SearchSpace, history: &TrialHistory) -> Vec<f64> {
        // Splitting needs at least one trial on each side.
        if history.len() < self.n_startup_trials.max(2) {
            return space.sample(&mut self.rng);
        }

        let (good, bad) = self.split_trials(history);
        space
            .dims()
            .iter()
            .enumerate()
            .map(|(i, dim)| {
                let good_vals: Vec<f64> = good.iter().map(|&t| t[i]).collect();
                let bad_vals: Vec<f64> = bad.iter().map(|&t| t[i]).collect();
                self.suggest_dim(&dim.range, &good_vals, &bad_vals)
            })
            .collect()
    }

    /// Partition trial values at the gamma quantile of the loss.
    fn split_trials<'h>(&self, history: &'h TrialHistory) -> (Vec<&'h [f64]>, Vec<&'h [f64]>) {
        let mut order: Vec<usize> = (0..history.len()).collect();
        order.sort_by(|&a, &b| {
            let (la, lb) = (history.records()[a].loss, history.records()[b].loss);
            la.partial_cmp(&lb).unwrap_or_else(|| {
                // NaN losses sort last, away from the good group.
                if la.is_nan() {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Less
                }
            })
        });

        let n = order.len();
        let n_good = ((self.gamma * n as f64).ceil() as usize).clamp(1, n - 1);
        let values = |i: usize| history.records()[order[i]].values.as_slice();
        let good = (0..n_good).map(values).collect();
        let bad = (n_good..n).map(values).collect();
        (good, bad)
    }

    /// Propose one dimension's value by maximizing l(x)/g(x) over candidates
    /// drawn from the good-group density l.
    fn suggest_dim(&mut self, range: &QUniform, good: &[f64], bad: &[f64]) -> f64 {
        let n_points = range.n_points();
        if n_points == 1 {
            return range.point(0);
        }

        let l = parzen_weights(range, good);
        let g = parzen_weights(range, bad);

        let candidates: Vec<usize> = match WeightedIndex::new(&l) {
            Ok(dist) => (0..self.n_candidates)
                .map(|_| dist.sample(&mut self.rng))
                .collect(),
            // Degenerate density, fall back to uniform candidates.
            Err(_) => (0..self.n_candidates)
                .map(|_| self.rng.random_range(0..n_points))
                .collect(),
        };

        let best = candidates
            .into_iter()
            .max_by(|&a, &b| {
                let ra = l[a] / (g[a] + f64::EPSILON);
                let rb = l[b] / (g[b] + f64::EPSILON);
                ra.partial_cmp(&rb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(0);
        range.point(best)
    }
}

/// Parzen density of `observations` evaluated on the grid, with a uniform
/// prior so every grid point keeps non-zero mass.
fn parzen_weights(range: &QUniform, observations: &[f64]) -> Vec<f64> {
    let n_points = range.n_points();
    let span = range.high - range.low;
    let bandwidth = (span / (1.0 + (observations.len() as f64).sqrt())).max(range.step);
    let prior = 1.0 / n_points as f64;

    (0..n_points)
        .map(|i| {
            let x = range.point(i);
            let kernel_sum: f64 = observations
                .iter()
                .map(|&obs| {
                    let z = (x - obs) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            prior + kernel_sum
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
