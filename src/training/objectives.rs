//! Objective (loss) functions for gradient boosting.
//!
//! Objectives compute gradients and hessians for optimization. Stacked
//! ensembles are trained as plain regression over the agreement scale, so
//! [`SquaredLoss`] is the only built-in objective; the trait seam exists so a
//! different loss can be substituted without touching the trainer.

/// A (gradient, hessian) pair for one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradHess {
    pub grad: f32,
    pub hess: f32,
}

/// An objective (loss) function for training gradient boosted models.
pub trait ObjectiveFn: Send + Sync {
    /// Compute the initial base score (bias) from targets.
    fn base_score(&self, targets: &[f32]) -> f32;

    /// Compute gradients and hessians for the given predictions.
    ///
    /// `grad_hess` must have the same length as `predictions` and `targets`.
    fn gradients_into(&self, predictions: &[f32], targets: &[f32], grad_hess: &mut [GradHess]);

    /// Name of the objective (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// SquaredLoss
// =============================================================================

/// Squared error loss: `0.5 * (pred - target)^2`.
///
/// Gradient is `pred - target`, hessian is constant 1. Base score is the
/// target mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredLoss;

impl ObjectiveFn for SquaredLoss {
    fn base_score(&self, targets: &[f32]) -> f32 {
        if targets.is_empty() {
            return 0.0;
        }
        let sum: f64 = targets.iter().map(|&t| t as f64).sum();
        (sum / targets.len() as f64) as f32
    }

    fn gradients_into(&self, predictions: &[f32], targets: &[f32], grad_hess: &mut [GradHess]) {
        debug_assert_eq!(predictions.len(), targets.len());
        debug_assert_eq!(predictions.len(), grad_hess.len());
        for ((gh, &p), &t) in grad_hess.iter_mut().zip(predictions).zip(targets) {
            gh.grad = p - t;
            gh.hess = 1.0;
        }
    }

    fn name(&self) -> &'static str {
        "squared"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_score_is_mean() {
        let targets = [1.0f32, 2.0, 3.0];
        assert!((SquaredLoss.base_score(&targets) - 2.0).abs() < 1e-6);
        assert_eq!(SquaredLoss.base_score(&[]), 0.0);
    }

    #[test]
    fn gradients_are_residuals() {
        let preds = [1.0f32, 0.0];
        let targets = [0.0f32, 2.0];
        let mut gh = [GradHess::default(); 2];
        SquaredLoss.gradients_into(&preds, &targets, &mut gh);
        assert_eq!(gh[0], GradHess { grad: 1.0, hess: 1.0 });
        assert_eq!(gh[1], GradHess { grad: -2.0, hess: 1.0 });
    }
}
