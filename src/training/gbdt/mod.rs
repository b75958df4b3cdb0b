//! GBDT training: parameters, tree grower, and the boosting loop.

mod grower;
mod trainer;

pub use trainer::{GBDTTrainer, TrainError, TrainOutput};

use crate::training::Verbosity;

// =============================================================================
// GainParams
// =============================================================================

/// Gain computation parameters (regularization and split constraints).
#[derive(Clone, Debug)]
pub struct GainParams {
    /// L2 regularization term on leaf weights.
    pub reg_lambda: f32,
    /// Minimum loss reduction required to make a split (aka gamma).
    pub min_split_loss: f32,
    /// Minimum sum of hessians required on each side of a split.
    pub min_child_weight: f32,
    /// Maximum absolute leaf weight before shrinkage. 0 disables the cap.
    pub max_delta_step: f32,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            reg_lambda: 1.0,
            min_split_loss: 0.0,
            min_child_weight: 1.0,
            max_delta_step: 0.0,
        }
    }
}

// =============================================================================
// GBDTParams
// =============================================================================

/// Parameters for GBDT training.
#[derive(Clone, Debug)]
pub struct GBDTParams {
    /// Number of boosting rounds (trees to train).
    pub n_rounds: u32,
    /// Learning rate (shrinkage).
    pub learning_rate: f32,
    /// Maximum tree depth.
    pub max_depth: u32,
    /// Gain computation parameters (regularization, min child weight, etc.).
    pub gain: GainParams,
    /// Row subsampling ratio per round, in (0, 1].
    pub subsample: f32,
    /// Column subsampling ratio per tree, in (0, 1].
    pub colsample_bytree: f32,
    /// Early stopping rounds. Training stops if the monitored metric fails to
    /// improve for this many rounds. 0 disables early stopping.
    pub early_stopping_rounds: u32,
    /// Verbosity level for training output.
    pub verbosity: Verbosity,
    /// Random seed for subsampling. `None` seeds from entropy, so repeated
    /// runs with identical parameters may differ.
    pub seed: Option<u64>,
}

impl Default for GBDTParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.3,
            max_depth: 6,
            gain: GainParams::default(),
            subsample: 1.0,
            colsample_bytree: 1.0,
            early_stopping_rounds: 0,
            verbosity: Verbosity::default(),
            seed: None,
        }
    }
}
