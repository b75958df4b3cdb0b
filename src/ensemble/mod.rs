//! Second-level ensemble training over stacked activations.
//!
//! [`EnsembleTrainer`] runs one complete training trial: it wires a
//! [`GBDTTrainer`] with the squared-loss objective and the negated kappa
//! metric, trains on a [`StackedData`] split, persists the resulting
//! [`Artifact`] and reports the trial loss. This is the unit of work the
//! hyperparameter search evaluates once per candidate configuration.

use ndarray::ArrayView2;
use thiserror::Error;

use crate::config::EnsembleConfig;
use crate::persist::{Artifact, ArtifactStore, StoreError};
use crate::stacking::StackedData;
use crate::training::gbdt::{GBDTTrainer, TrainError};
use crate::training::{EvalSet, NegativeKappa, SquaredLoss};
use crate::utils::Parallelism;

// =============================================================================
// Errors
// =============================================================================

/// Errors from a single ensemble training trial.
#[derive(Debug, Error)]
pub enum EnsembleError {
    #[error("training failed: {0}")]
    Train(#[from] TrainError),
    #[error("artifact persistence failed: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// TrialOutcome
// =============================================================================

/// Result of one training trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    /// Monitored loss at the best round. Negated kappa, so perfect
    /// agreement scores -1 and the search minimizes.
    pub loss: f64,
    /// 1-based best round; stored alongside the forest in the artifact.
    pub best_iteration: u32,
}

// =============================================================================
// EnsembleTrainer
// =============================================================================

/// Trains one gradient-boosted ensemble per hyperparameter configuration.
pub struct EnsembleTrainer<'a, S: ArtifactStore> {
    store: &'a S,
    parallelism: Parallelism,
}

impl<'a, S: ArtifactStore> EnsembleTrainer<'a, S> {
    pub fn new(store: &'a S, parallelism: Parallelism) -> Self {
        Self { store, parallelism }
    }

    /// Run one trial: train, persist the artifact under `artifact_name`,
    /// return the loss.
    ///
    /// The monitored metric is negated quadratic-weighted kappa on the
    /// validation split when `data.valid` is present, on the training split
    /// otherwise. The persisted forest keeps every trained round; consumers
    /// predict with `limit = best_iteration`.
    ///
    /// # Errors
    ///
    /// Fails on dataset shape errors, an empty round budget, or when the
    /// artifact cannot be persisted. A persistence failure is not swallowed:
    /// a trial whose model is lost must not count as evaluated.
    pub fn train(
        &self,
        config: &EnsembleConfig,
        data: &StackedData,
        artifact_name: &str,
    ) -> Result<TrialOutcome, EnsembleError> {
        let trainer = GBDTTrainer::new(SquaredLoss, NegativeKappa, config.to_trainer_params());

        let valid_view: Option<(ArrayView2<f32>, &[f32])> = data.valid.as_ref().map(|v| {
            (
                v.features.view(),
                v.labels.as_slice().expect("labels are contiguous"),
            )
        });
        let eval_sets: Vec<EvalSet<'_>> = valid_view
            .iter()
            .map(|(features, labels)| EvalSet::new("eval", *features, labels))
            .collect();

        let output = trainer.train(
            data.train_features.view(),
            data.train_labels
                .as_slice()
                .expect("labels are contiguous"),
            &eval_sets,
            self.parallelism,
        )?;

        let best_iteration = output.best_iteration as u32;
        let artifact = Artifact {
            forest: output.forest,
            best_iteration,
        };
        self.store.put(artifact_name, &artifact)?;

        Ok(TrialOutcome {
            loss: output.best_score,
            best_iteration,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
