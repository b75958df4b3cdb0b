//! GBDT trainer for gradient boosting.
//!
//! Orchestrates gradient computation, tree growing, prediction updates, and
//! early stopping. Use [`GBDTTrainer::train`] to train a forest.

use ndarray::ArrayView2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rayon::prelude::*;

use crate::repr::{Forest, Tree};
use crate::training::callback::EarlyStopping;
use crate::training::eval::{EvalSet, Evaluator};
use crate::training::logger::TrainingLogger;
use crate::training::metrics::MetricFn;
use crate::training::objectives::{GradHess, ObjectiveFn};
use crate::utils::Parallelism;

use super::GBDTParams;
use super::grower::{GrowerParams, TreeGrower};

// =============================================================================
// Errors
// =============================================================================

/// Data-validation errors raised before any boosting happens.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TrainError {
    /// The training feature matrix has no rows.
    #[error("training set is empty")]
    EmptyDataset,

    /// Labels and feature rows disagree.
    #[error("labels length {labels} does not match feature rows {rows}")]
    LengthMismatch { rows: usize, labels: usize },

    /// An eval set's labels and feature rows disagree.
    #[error("eval set '{name}': labels length {labels} does not match feature rows {rows}")]
    EvalLengthMismatch {
        name: String,
        rows: usize,
        labels: usize,
    },

    /// The round budget is zero.
    #[error("n_rounds must be at least 1")]
    NoRounds,
}

// =============================================================================
// TrainOutput
// =============================================================================

/// Result of one boosting run.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    /// The full forest, including rounds after the best iteration.
    pub forest: Forest,
    /// 1-based round index with the best monitored metric value.
    /// Always in `[1, n_rounds]`.
    pub best_iteration: usize,
    /// Best monitored metric value (the trial loss for minimized metrics).
    pub best_score: f64,
}

// =============================================================================
// GBDTTrainer
// =============================================================================

/// GBDT trainer.
///
/// Generic over the objective (gradient source) and the metric (monitored
/// quantity), so agreement metrics can drive early stopping while squared
/// loss drives the gradients.
pub struct GBDTTrainer<O: ObjectiveFn, M: MetricFn> {
    objective: O,
    metric: M,
    params: GBDTParams,
}

impl<O: ObjectiveFn, M: MetricFn> GBDTTrainer<O, M> {
    /// Create a new GBDT trainer.
    pub fn new(objective: O, metric: M, params: GBDTParams) -> Self {
        Self {
            objective,
            metric,
            params,
        }
    }

    /// Get reference to parameters.
    pub fn params(&self) -> &GBDTParams {
        &self.params
    }

    /// Train a forest.
    ///
    /// Trains up to `n_rounds` trees; if `early_stopping_rounds > 0`, stops
    /// once the monitored metric (last-listed eval set, else the training
    /// set) fails to improve for that many rounds. The returned forest keeps
    /// every trained tree; the best iteration is reported alongside it.
    ///
    /// **Note:** This method does NOT create a thread pool. The caller must
    /// set it up via [`run_with_threads`](crate::utils::run_with_threads) if
    /// desired.
    pub fn train(
        &self,
        features: ArrayView2<f32>,
        targets: &[f32],
        eval_sets: &[EvalSet<'_>],
        parallelism: Parallelism,
    ) -> Result<TrainOutput, TrainError> {
        let n_rows = features.nrows();
        let n_cols = features.ncols();

        if n_rows == 0 || n_cols == 0 {
            return Err(TrainError::EmptyDataset);
        }
        if targets.len() != n_rows {
            return Err(TrainError::LengthMismatch {
                rows: n_rows,
                labels: targets.len(),
            });
        }
        for eval_set in eval_sets {
            if eval_set.labels.len() != eval_set.features.nrows() {
                return Err(TrainError::EvalLengthMismatch {
                    name: eval_set.name.to_string(),
                    rows: eval_set.features.nrows(),
                    labels: eval_set.labels.len(),
                });
            }
        }
        if self.params.n_rounds == 0 {
            return Err(TrainError::NoRounds);
        }

        let grower = TreeGrower::new(
            features,
            GrowerParams {
                gain: self.params.gain.clone(),
                learning_rate: self.params.learning_rate,
                max_depth: self.params.max_depth,
            },
        );

        let mut rng = StdRng::seed_from_u64(self.params.seed.unwrap_or_else(rand::random));

        let base_score = self.objective.base_score(targets);
        let mut predictions = vec![base_score; n_rows];
        let mut eval_predictions: Vec<Vec<f32>> = eval_sets
            .iter()
            .map(|es| vec![base_score; es.labels.len()])
            .collect();

        let mut forest = Forest::new(base_score);
        let mut grad_hess = vec![GradHess::default(); n_rows];

        let mut early_stopping = EarlyStopping::new(
            self.params.early_stopping_rounds as usize,
            self.metric.higher_is_better(),
        );
        let evaluator = Evaluator::new(&self.metric);
        let logger = TrainingLogger::new(self.params.verbosity);
        logger.start_training(self.params.n_rounds as usize);

        for round in 0..self.params.n_rounds {
            self.objective
                .gradients_into(&predictions, targets, &mut grad_hess);
            self.subsample_rows(&mut grad_hess, &mut rng);
            let columns = self.sample_columns(n_cols, &mut rng);

            let tree = grower.grow(&grad_hess, &columns);

            add_tree_predictions(&tree, features, &mut predictions, parallelism);
            for (eval_set, preds) in eval_sets.iter().zip(eval_predictions.iter_mut()) {
                add_tree_predictions(&tree, eval_set.features, preds, parallelism);
            }
            forest.push_tree(tree);

            let metrics =
                evaluator.evaluate_round(&predictions, targets, eval_sets, &eval_predictions);
            logger.log_round(round as usize, &metrics);

            let monitored = Evaluator::<M>::monitored_value(&metrics);
            if early_stopping.should_stop(monitored) {
                logger.log_early_stopping(
                    round as usize,
                    early_stopping.best_round(),
                    self.metric.name(),
                );
                break;
            }
        }

        let best_iteration = early_stopping.best_round() + 1;
        let best_score = early_stopping.best_value().unwrap_or(f64::NAN);
        logger.log_best(best_iteration, best_score);

        Ok(TrainOutput {
            forest,
            best_iteration,
            best_score,
        })
    }

    /// Zero out the gradients of rows excluded by `subsample`.
    ///
    /// Excluded rows keep their position so tree routing stays intact; they
    /// simply contribute no mass to split statistics or leaf weights.
    fn subsample_rows(&self, grad_hess: &mut [GradHess], rng: &mut StdRng) {
        if self.params.subsample >= 1.0 {
            return;
        }
        let n_rows = grad_hess.len();
        let n_keep = ((n_rows as f32 * self.params.subsample).round() as usize).max(1);

        let mut keep = vec![false; n_rows];
        for idx in sample(rng, n_rows, n_keep) {
            keep[idx] = true;
        }
        for (gh, kept) in grad_hess.iter_mut().zip(&keep) {
            if !kept {
                *gh = GradHess::default();
            }
        }
    }

    /// Choose the feature subset for this tree per `colsample_bytree`.
    fn sample_columns(&self, n_cols: usize, rng: &mut StdRng) -> Vec<usize> {
        if self.params.colsample_bytree >= 1.0 {
            return (0..n_cols).collect();
        }
        let n_keep = ((n_cols as f32 * self.params.colsample_bytree).round() as usize).max(1);
        let mut columns: Vec<usize> = sample(rng, n_cols, n_keep).into_iter().collect();
        columns.sort_unstable();
        columns
    }
}

/// Add one tree's contribution to accumulated predictions.
fn add_tree_predictions(
    tree: &Tree,
    features: ArrayView2<f32>,
    out: &mut [f32],
    parallelism: Parallelism,
) {
    if parallelism.is_parallel() {
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, o)| *o += tree.predict_row(features.row(i)));
    } else {
        for (i, o) in out.iter_mut().enumerate() {
            *o += tree.predict_row(features.row(i));
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
