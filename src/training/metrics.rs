//! Evaluation metrics for model quality.
//!
//! Metrics are separate from loss functions - the ensemble is trained with
//! squared loss but monitored with an agreement metric. [`MetricFn`] is the
//! pluggable scoring seam: the trainer accepts any implementation, so
//! alternative agreement metrics can be substituted without touching its
//! control flow.

/// A metric for evaluating model quality.
///
/// Unlike objectives (which compute gradients for optimization), metrics
/// compute scalar values for monitoring and early stopping. Use
/// `higher_is_better()` to determine the improvement direction.
pub trait MetricFn: Send + Sync {
    /// Compute the metric value for predictions against targets.
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64;

    /// Whether higher values indicate better performance.
    fn higher_is_better(&self) -> bool;

    /// Name of the metric (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// NegativeKappa
// =============================================================================

/// Negated quadratic-weighted Cohen's kappa.
///
/// Kappa measures inter-rater agreement on an ordinal scale; the quadratic
/// weighting penalizes larger prediction-vs-truth discrepancies more heavily.
/// The value is negated so that minimization (the boosting convention)
/// corresponds to maximizing agreement: perfect agreement yields -1, chance
/// agreement yields 0.
///
/// Continuous predictions are rounded to the nearest integer rating and
/// clipped to the observed target range before the confusion matrix is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct NegativeKappa;

impl NegativeKappa {
    fn quadratic_weighted_kappa(predictions: &[f32], targets: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), targets.len());
        if targets.is_empty() {
            return 0.0;
        }

        let min_rating = targets.iter().fold(f32::INFINITY, |m, &t| m.min(t)).round() as i64;
        let max_rating = targets
            .iter()
            .fold(f32::NEG_INFINITY, |m, &t| m.max(t))
            .round() as i64;
        let n_ratings = (max_rating - min_rating + 1) as usize;
        if n_ratings < 2 {
            // Single observed rating: agreement beyond chance is undefined.
            return 0.0;
        }

        let rate = |v: f32| -> usize {
            let r = (v.round() as i64).clamp(min_rating, max_rating);
            (r - min_rating) as usize
        };

        let n = targets.len();
        let mut conf = vec![0.0f64; n_ratings * n_ratings];
        let mut hist_true = vec![0.0f64; n_ratings];
        let mut hist_pred = vec![0.0f64; n_ratings];
        for (&p, &t) in predictions.iter().zip(targets) {
            let (i, j) = (rate(t), rate(p));
            conf[i * n_ratings + j] += 1.0;
            hist_true[i] += 1.0;
            hist_pred[j] += 1.0;
        }

        let denom = (n_ratings - 1).pow(2) as f64;
        let mut observed = 0.0;
        let mut expected = 0.0;
        for i in 0..n_ratings {
            for j in 0..n_ratings {
                let weight = ((i as f64 - j as f64) * (i as f64 - j as f64)) / denom;
                observed += weight * conf[i * n_ratings + j];
                expected += weight * hist_true[i] * hist_pred[j] / n as f64;
            }
        }

        if expected == 0.0 {
            // Degenerate marginals (e.g. all predictions identical to a
            // single-class truth); no chance-corrected agreement to measure.
            return 0.0;
        }
        1.0 - observed / expected
    }
}

impl MetricFn for NegativeKappa {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        -Self::quadratic_weighted_kappa(predictions, targets)
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "kappa"
    }
}

// =============================================================================
// RMSE (Root Mean Squared Error)
// =============================================================================

/// Root Mean Squared Error: sqrt(mean((pred - target)^2)).
///
/// Lower is better. Secondary regression metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl MetricFn for Rmse {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), targets.len());
        if predictions.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &t)| {
                let diff = p as f64 - t as f64;
                diff * diff
            })
            .sum();
        (sum_sq / predictions.len() as f64).sqrt()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}
