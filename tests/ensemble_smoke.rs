//! End-to-end trial over synthetic activations.

use stackboost::config::EnsembleConfig;
use stackboost::ensemble::EnsembleTrainer;
use stackboost::persist::{ArtifactStore, DirStore, MemoryStore};
use stackboost::stacking::{stack, ActivationPair, LabelPair, StackOptions};
use stackboost::testing::data::synthetic_activations;
use stackboost::utils::Parallelism;

fn two_model_fixture(seed: u64) -> (Vec<ActivationPair>, LabelPair) {
    let (train_a, valid_a, train_labels, valid_labels) = synthetic_activations(100, 20, 4, seed);
    // Second model: same rows, its own activations. Labels come from the
    // first model's generator so both models describe the same examples.
    let (train_b, valid_b, _, _) = synthetic_activations(100, 20, 4, seed.wrapping_add(1));
    let models = vec![
        ActivationPair {
            train: train_a,
            valid: valid_a,
        },
        ActivationPair {
            train: train_b,
            valid: valid_b,
        },
    ];
    let labels = LabelPair {
        train: train_labels,
        valid: valid_labels,
    };
    (models, labels)
}

fn config(seed: u64) -> EnsembleConfig {
    EnsembleConfig::builder()
        .n_rounds(40)
        .early_stopping_rounds(10)
        .max_depth(4)
        .subsample(0.9)
        .seed(seed)
        .build()
        .unwrap()
}

#[test]
fn single_trial_trains_and_persists() {
    let (models, labels) = two_model_fixture(31);
    let data = stack(&models, &labels, StackOptions::default()).unwrap();
    assert_eq!(data.train_features.ncols(), 8);
    assert_eq!(data.train_features.nrows(), 100);

    let store = MemoryStore::new();
    let trainer = EnsembleTrainer::new(&store, Parallelism::Sequential);
    let outcome = trainer.train(&config(9), &data, "trial_0").unwrap();

    let artifact = store.get("trial_0").unwrap();
    assert_eq!(artifact.best_iteration, outcome.best_iteration);
    assert!((1..=40).contains(&outcome.best_iteration));
    assert!(artifact.forest.n_trees() >= outcome.best_iteration as usize);
    // Negated kappa; the signal is learnable so the trial should beat chance.
    assert!(outcome.loss >= -1.0 - 1e-9);
    assert!(outcome.loss < 0.0, "loss {} not better than chance", outcome.loss);
}

#[test]
fn seeded_reruns_agree() {
    let (models, labels) = two_model_fixture(17);
    let data = stack(&models, &labels, StackOptions::default()).unwrap();

    let store = MemoryStore::new();
    let trainer = EnsembleTrainer::new(&store, Parallelism::Sequential);
    let first = trainer.train(&config(5), &data, "a").unwrap();
    let second = trainer.train(&config(5), &data, "b").unwrap();

    assert_eq!(first.best_iteration, second.best_iteration);
    assert!((first.loss - second.loss).abs() < 1e-9);
}

#[test]
fn persisted_artifact_predicts_at_best_iteration() {
    let (models, labels) = two_model_fixture(3);
    let data = stack(&models, &labels, StackOptions::default()).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let store = DirStore::create(tmp.path()).unwrap();
    let trainer = EnsembleTrainer::new(&store, Parallelism::Sequential);
    let outcome = trainer.train(&config(1), &data, "model").unwrap();

    let artifact = store.get("model").unwrap();
    let preds = artifact
        .forest
        .predict(data.train_features.view(), Some(artifact.best_iteration as usize));
    assert_eq!(preds.len(), data.train_features.nrows());
    assert!(preds.iter().all(|p| p.is_finite()));
    assert_eq!(artifact.best_iteration, outcome.best_iteration);
}
