//! Feature stacking for second-stage ensemble training.
//!
//! Each base model contributes an activation matrix per split; [`stack`]
//! concatenates them horizontally into a single feature matrix per split.
//! Two optional transforms apply on top:
//!
//! - **bilateral**: realign the split boundary and run the symmetry augmenter
//!   ([`bilateralize`]) so paired rows are seen in both concatenation orders;
//! - **no-eval**: merge validation and training rows into one combined set,
//!   foregoing a held-out generalization estimate.

mod bilateral;

pub use bilateral::bilateralize;

use ndarray::{Array1, Array2, ArrayView2, Axis, concatenate, s};

// =============================================================================
// Errors
// =============================================================================

/// Shape errors raised while stacking activations.
///
/// All of these are unrecoverable for a search run: the matrices are shared
/// across every trial, so a shape violation aborts the whole search.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StackError {
    /// No base models supplied.
    #[error("at least one base model is required")]
    NoModels,

    /// A model's activation rows disagree with the first model's.
    #[error("{split} activations for model {model} have {got} rows, expected {expected}")]
    RowCountMismatch {
        split: &'static str,
        model: usize,
        expected: usize,
        got: usize,
    },

    /// Labels and activation rows disagree.
    #[error("{split} labels length {labels} does not match activation rows {rows}")]
    LabelLengthMismatch {
        split: &'static str,
        rows: usize,
        labels: usize,
    },

    /// The symmetry augmenter needs an even row count.
    #[error("bilateral augmentation requires an even row count, got {rows}")]
    OddRowCount { rows: usize },

    /// Bilateral realignment needs at least one validation row to move.
    #[error("bilateral mode requires a non-empty validation set")]
    EmptyValidation,
}

// =============================================================================
// Input types
// =============================================================================

/// One base model's activation matrices for both splits.
///
/// Rows are samples in a fixed ordering shared across all base models and the
/// label vectors; columns are that model's output features.
#[derive(Debug, Clone)]
pub struct ActivationPair {
    pub train: Array2<f32>,
    pub valid: Array2<f32>,
}

/// Label vectors for both splits, aligned by index with activation rows.
#[derive(Debug, Clone)]
pub struct LabelPair {
    pub train: Array1<f32>,
    pub valid: Array1<f32>,
}

/// Stacking mode flags. The two flags are orthogonal and may be combined.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackOptions {
    /// Apply split realignment plus the symmetry augmenter.
    pub bilateral: bool,
    /// Merge validation into training and train without a held-out set.
    pub no_eval: bool,
}

// =============================================================================
// Output types
// =============================================================================

/// A held-out validation split.
#[derive(Debug, Clone)]
pub struct ValidSplit {
    pub features: Array2<f32>,
    pub labels: Array1<f32>,
}

/// Stacked feature matrices ready for ensemble training.
#[derive(Debug, Clone)]
pub struct StackedData {
    pub train_features: Array2<f32>,
    pub train_labels: Array1<f32>,
    /// `None` in no-eval mode: all rows live in the training split.
    pub valid: Option<ValidSplit>,
}

impl StackedData {
    /// Total number of rows across both splits.
    pub fn n_rows(&self) -> usize {
        self.train_features.nrows() + self.valid.as_ref().map_or(0, |v| v.features.nrows())
    }

    /// Stacked feature width.
    pub fn n_features(&self) -> usize {
        self.train_features.ncols()
    }
}

// =============================================================================
// Stacking
// =============================================================================

/// Stack per-model activations into unified train/validation matrices.
///
/// Default mode concatenates all models' matrices per split and passes labels
/// through. With `bilateral`, the last validation row (and label) moves to
/// the front of training first - the original split boundary need not fall on
/// pair parity - and both splits are then symmetry-augmented. Whether the
/// moved row actually completes a pair is an upstream data-preparation
/// invariant this function cannot verify. With `no_eval`, validation rows are
/// placed ahead of training rows in one combined training set.
pub fn stack(
    models: &[ActivationPair],
    labels: &LabelPair,
    options: StackOptions,
) -> Result<StackedData, StackError> {
    validate_inputs(models, labels)?;

    let mut concat_train = hstack(models.iter().map(|m| m.train.view()));
    let mut concat_valid = hstack(models.iter().map(|m| m.valid.view()));
    let mut labels_train = labels.train.clone();
    let mut labels_valid = labels.valid.clone();

    if options.bilateral {
        if concat_valid.nrows() == 0 {
            return Err(StackError::EmptyValidation);
        }

        // Shift the boundary row so both splits regain even parity.
        let last = concat_valid.nrows() - 1;
        concat_train = vstack(&[concat_valid.slice(s![last.., ..]), concat_train.view()]);
        concat_valid = concat_valid.slice(s![..last, ..]).to_owned();

        labels_train = concatenate(
            Axis(0),
            &[labels_valid.slice(s![last..]), labels_train.view()],
        )
        .expect("label lengths validated");
        labels_valid = labels_valid.slice(s![..last]).to_owned();

        concat_train = bilateralize(concat_train.view())?;
        concat_valid = bilateralize(concat_valid.view())?;
    }

    if options.no_eval {
        // Validation rows first, then training rows, as one training set.
        let combined = vstack(&[concat_valid.view(), concat_train.view()]);
        let combined_labels = concatenate(Axis(0), &[labels_valid.view(), labels_train.view()])
            .expect("label lengths validated");
        return Ok(StackedData {
            train_features: combined,
            train_labels: combined_labels,
            valid: None,
        });
    }

    Ok(StackedData {
        train_features: concat_train,
        train_labels: labels_train,
        valid: Some(ValidSplit {
            features: concat_valid,
            labels: labels_valid,
        }),
    })
}

fn validate_inputs(models: &[ActivationPair], labels: &LabelPair) -> Result<(), StackError> {
    let Some(first) = models.first() else {
        return Err(StackError::NoModels);
    };

    let train_rows = first.train.nrows();
    let valid_rows = first.valid.nrows();
    for (idx, model) in models.iter().enumerate() {
        if model.train.nrows() != train_rows {
            return Err(StackError::RowCountMismatch {
                split: "train",
                model: idx,
                expected: train_rows,
                got: model.train.nrows(),
            });
        }
        if model.valid.nrows() != valid_rows {
            return Err(StackError::RowCountMismatch {
                split: "validation",
                model: idx,
                expected: valid_rows,
                got: model.valid.nrows(),
            });
        }
    }

    if labels.train.len() != train_rows {
        return Err(StackError::LabelLengthMismatch {
            split: "train",
            rows: train_rows,
            labels: labels.train.len(),
        });
    }
    if labels.valid.len() != valid_rows {
        return Err(StackError::LabelLengthMismatch {
            split: "validation",
            rows: valid_rows,
            labels: labels.valid.len(),
        });
    }
    Ok(())
}

fn hstack<'a>(views: impl Iterator<Item = ArrayView2<'a, f32>>) -> Array2<f32> {
    let views: Vec<_> = views.collect();
    concatenate(Axis(1), &views).expect("row counts validated")
}

fn vstack(views: &[ArrayView2<'_, f32>]) -> Array2<f32> {
    concatenate(Axis(0), views).expect("column counts match by construction")
}

// =============================================================================
// Tests
// =============================================================================
