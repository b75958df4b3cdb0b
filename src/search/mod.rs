//! Hyperparameter search driver.
//!
//! [`tune`] runs a sequential Bayesian search over the ensemble
//! hyperparameter space: each iteration the [`TpeSampler`] proposes a
//! configuration, one full ensemble is trained and persisted, and the
//! resulting loss feeds the sampler's model for the next proposal. Any trial
//! failure aborts the whole search; a lost trial would silently bias the
//! history.

pub mod space;
pub mod tpe;
pub mod trials;

pub use space::{ensemble_space, Dimension, QUniform, SearchSpace, SpaceError};
pub use tpe::TpeSampler;
pub use trials::{TrialHistory, TrialRecord};

use bon::Builder;
use thiserror::Error;

use crate::config::{ConfigError, EnsembleConfig};
use crate::ensemble::{EnsembleError, EnsembleTrainer};
use crate::persist::ArtifactStore;
use crate::stacking::{stack, ActivationPair, LabelPair, StackError, StackOptions, StackedData};
use crate::training::Verbosity;
use crate::utils::{run_with_threads, Parallelism};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum TuneError {
    #[error("stacking failed: {0}")]
    Stack(#[from] StackError),
    #[error("search space error: {0}")]
    Space(#[from] SpaceError),
    #[error("invalid candidate configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("trial failed: {0}")]
    Trial(#[from] EnsembleError),
    #[error("n_trials must be at least 1")]
    NoTrials,
}

// =============================================================================
// TuneOptions
// =============================================================================

/// Options controlling one search run.
#[derive(Debug, Clone, Builder)]
#[builder(derive(Clone, Debug))]
pub struct TuneOptions {
    /// Number of configurations to evaluate. Default: 100.
    #[builder(default = 100)]
    pub n_trials: usize,

    /// Uniform random trials before the TPE model engages. Default: 20.
    #[builder(default = 20)]
    pub n_startup_trials: usize,

    /// Round cap per trial. Default: 300.
    #[builder(default = 300)]
    pub n_rounds: u32,

    /// Early stopping patience per trial. Default: 50.
    #[builder(default = 50)]
    pub early_stopping_rounds: u32,

    /// Artifacts are stored as `<prefix>_<trial index>`.
    #[builder(default = "ensemble".to_string(), into)]
    pub artifact_prefix: String,

    /// Thread count: 0 = auto, 1 = sequential, n = exactly n.
    #[builder(default = 0)]
    pub n_threads: usize,

    #[builder(default)]
    pub verbosity: Verbosity,

    /// Seeds both the sampler and per-trial subsampling. `None` uses entropy.
    pub seed: Option<u64>,
}

impl Default for TuneOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

// =============================================================================
// SearchOutcome
// =============================================================================

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Index of the winning trial.
    pub best_trial: usize,
    /// Loss of the winning trial (negated kappa).
    pub best_loss: f64,
    /// The winning configuration.
    pub best_config: EnsembleConfig,
    /// Store name of the winning trial's artifact.
    pub best_artifact: String,
    /// Every completed trial, in evaluation order.
    pub history: TrialHistory,
}

// =============================================================================
// tune
// =============================================================================

/// Stack per-model activations and search the standard ensemble space.
///
/// Thin entry point over [`tune`] for callers holding raw activation pairs;
/// `stack_options` selects bilateral augmentation and no-held-out mode.
pub fn tune_models<S: ArtifactStore>(
    store: &S,
    models: &[ActivationPair],
    labels: &LabelPair,
    stack_options: StackOptions,
    options: &TuneOptions,
) -> Result<SearchOutcome, TuneError> {
    let data = stack(models, labels, stack_options)?;
    tune(store, &data, options)
}

/// Search the standard ensemble space. See [`tune_with_space`].
pub fn tune<S: ArtifactStore>(
    store: &S,
    data: &StackedData,
    options: &TuneOptions,
) -> Result<SearchOutcome, TuneError> {
    tune_with_space(store, data, &ensemble_space(), options)
}

/// Run the TPE search over `space`, training and persisting one ensemble per
/// trial.
///
/// # Errors
///
/// Fails fast on an empty trial budget and aborts on the first trial error,
/// including artifact persistence failures.
pub fn tune_with_space<S: ArtifactStore>(
    store: &S,
    data: &StackedData,
    space: &SearchSpace,
    options: &TuneOptions,
) -> Result<SearchOutcome, TuneError> {
    if options.n_trials == 0 {
        return Err(TuneError::NoTrials);
    }

    run_with_threads(options.n_threads, |parallelism| {
        run_search(store, data, space, options, parallelism)
    })
}

fn run_search<S: ArtifactStore>(
    store: &S,
    data: &StackedData,
    space: &SearchSpace,
    options: &TuneOptions,
    parallelism: Parallelism,
) -> Result<SearchOutcome, TuneError> {
    let mut sampler =
        TpeSampler::new(options.seed).with_startup_trials(options.n_startup_trials);
    let trainer = EnsembleTrainer::new(store, parallelism);
    let mut history = TrialHistory::new();

    let mut best: Option<(usize, f64, EnsembleConfig)> = None;

    for trial in 0..options.n_trials {
        let values = sampler.suggest(space, &history);
        let config = candidate_config(space, &values, options, trial)?;
        let artifact_name = format!("{}_{}", options.artifact_prefix, trial);

        let outcome = trainer.train(&config, data, &artifact_name)?;
        if options.verbosity >= Verbosity::Info {
            eprintln!(
                "trial {}: loss {:.6} (best round {})",
                trial, outcome.loss, outcome.best_iteration
            );
        }

        if best
            .as_ref()
            .is_none_or(|(_, best_loss, _)| outcome.loss < *best_loss)
        {
            best = Some((trial, outcome.loss, config.clone()));
        }
        history.push(TrialRecord {
            values,
            loss: outcome.loss,
        });
    }

    // n_trials >= 1, so at least one trial completed.
    let (best_trial, best_loss, best_config) = best.ok_or(TuneError::NoTrials)?;
    if options.verbosity >= Verbosity::Info {
        eprintln!("search done: trial {} with loss {:.6}", best_trial, best_loss);
    }

    Ok(SearchOutcome {
        best_trial,
        best_loss,
        best_config,
        best_artifact: format!("{}_{}", options.artifact_prefix, best_trial),
        history,
    })
}

/// Materialize a candidate value vector into a full training configuration.
fn candidate_config(
    space: &SearchSpace,
    values: &[f64],
    options: &TuneOptions,
    trial: usize,
) -> Result<EnsembleConfig, TuneError> {
    let value = |name: &str| space.value_of(values, name);
    let config = EnsembleConfig::builder()
        .learning_rate(value("learning_rate")? as f32)
        .min_split_loss(value("min_split_loss")? as f32)
        .max_depth(value("max_depth")? as u32)
        .min_child_weight(value("min_child_weight")? as f32)
        .max_delta_step(value("max_delta_step")? as f32)
        .subsample(value("subsample")? as f32)
        .colsample_bytree(value("colsample_bytree")? as f32)
        .n_rounds(options.n_rounds)
        .early_stopping_rounds(options.early_stopping_rounds)
        .verbosity(options.verbosity)
        // Derive a distinct but reproducible subsampling seed per trial.
        .maybe_seed(options.seed.map(|s| s.wrapping_add(trial as u64)))
        .build()?;
    Ok(config)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use crate::stacking::{stack, ActivationPair, LabelPair, StackOptions};
    use crate::testing::data::synthetic_activations;
    use crate::testing::store::FailingStore;

    fn stacked_fixture() -> StackedData {
        let (train, valid, train_labels, valid_labels) = synthetic_activations(60, 16, 4, 21);
        let models = vec![ActivationPair { train, valid }];
        let labels = LabelPair {
            train: train_labels,
            valid: valid_labels,
        };
        stack(&models, &labels, StackOptions::default()).unwrap()
    }

    fn fast_options(n_trials: usize) -> TuneOptions {
        TuneOptions::builder()
            .n_trials(n_trials)
            .n_startup_trials(2)
            .n_rounds(10)
            .early_stopping_rounds(3)
            .n_threads(1)
            .seed(5u64)
            .build()
    }

    #[test]
    fn zero_trials_is_rejected() {
        let store = MemoryStore::new();
        let data = stacked_fixture();
        let result = tune(&store, &data, &fast_options(0));
        assert!(matches!(result, Err(TuneError::NoTrials)));
        assert!(store.is_empty());
    }

    #[test]
    fn every_trial_persists_an_artifact() {
        let store = MemoryStore::new();
        let data = stacked_fixture();

        let outcome = tune(&store, &data, &fast_options(4)).unwrap();

        assert_eq!(store.len(), 4);
        assert_eq!(outcome.history.len(), 4);
        for trial in 0..4 {
            assert!(store.get(&format!("ensemble_{}", trial)).is_ok());
        }
        assert!(outcome.best_trial < 4);
        assert_eq!(
            outcome.best_artifact,
            format!("ensemble_{}", outcome.best_trial)
        );
    }

    #[test]
    fn store_failure_aborts_the_whole_search() {
        let store = FailingStore;
        let data = stacked_fixture();

        let result = tune(&store, &data, &fast_options(3));
        // The first trial's failed write propagates; no loss ever reaches
        // the history, so the sampler never observes a partial trial.
        assert!(matches!(
            result,
            Err(TuneError::Trial(EnsembleError::Store(_)))
        ));
    }

    #[test]
    fn best_matches_history_minimum() {
        let store = MemoryStore::new();
        let data = stacked_fixture();

        let outcome = tune(&store, &data, &fast_options(5)).unwrap();
        let (idx, record) = outcome.history.best().unwrap();
        assert_eq!(idx, outcome.best_trial);
        assert!((record.loss - outcome.best_loss).abs() < 1e-12);
    }

    #[test]
    fn tune_models_stacks_then_searches() {
        let (train, valid, train_labels, valid_labels) = synthetic_activations(40, 10, 3, 77);
        let models = vec![ActivationPair { train, valid }];
        let labels = LabelPair {
            train: train_labels,
            valid: valid_labels,
        };
        let store = MemoryStore::new();
        let outcome = tune_models(
            &store,
            &models,
            &labels,
            StackOptions::default(),
            &fast_options(2),
        )
        .unwrap();
        assert_eq!(outcome.history.len(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn candidate_values_map_into_config() {
        let space = ensemble_space();
        let values = vec![0.05, 0.1, 8.0, 3.0, 2.0, 0.7, 0.6];
        let options = fast_options(1);
        let config = candidate_config(&space, &values, &options, 0).unwrap();
        assert!((config.learning_rate - 0.05).abs() < 1e-6);
        assert_eq!(config.max_depth, 8);
        assert!((config.subsample - 0.7).abs() < 1e-6);
        assert_eq!(config.n_rounds, 10);
        assert_eq!(config.seed, Some(5));
    }
}
