//! Synthetic activation generators for tests.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate a train/valid pair of synthetic activation matrices with
/// learnable integer labels.
///
/// Activations are uniform in [0, 1]; the label of each row is 1 when the
/// row mean exceeds 0.5, else 0, so a boosted ensemble can recover the
/// labels from the features. Returns
/// `(train, valid, train_labels, valid_labels)`.
pub fn synthetic_activations(
    n_train: usize,
    n_valid: usize,
    n_cols: usize,
    seed: u64,
) -> (Array2<f32>, Array2<f32>, Array1<f32>, Array1<f32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let (train, train_labels) = labelled_matrix(n_train, n_cols, &mut rng);
    let (valid, valid_labels) = labelled_matrix(n_valid, n_cols, &mut rng);
    (train, valid, train_labels, valid_labels)
}

fn labelled_matrix(n_rows: usize, n_cols: usize, rng: &mut StdRng) -> (Array2<f32>, Array1<f32>) {
    let features = Array2::from_shape_fn((n_rows, n_cols), |_| rng.random::<f32>());
    let labels = Array1::from_shape_fn(n_rows, |i| {
        let mean = features.row(i).mean().unwrap_or(0.0);
        if mean > 0.5 { 1.0 } else { 0.0 }
    });
    (features, labels)
}
