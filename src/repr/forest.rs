//! Forest of regression trees.

use ndarray::ArrayView2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::Parallelism;

use super::Tree;

/// An additive ensemble of regression trees with a scalar base score.
///
/// Trees are stored in boosting order, so truncating to the first `k` trees
/// reproduces the model as of round `k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    trees: Vec<Tree>,
    base_score: f32,
}

impl Forest {
    /// Create an empty forest with the given base score.
    pub fn new(base_score: f32) -> Self {
        Self {
            trees: Vec::new(),
            base_score,
        }
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// The base score (initial prediction before any tree).
    #[inline]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// Get a reference to a specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    /// Iterate over trees in boosting order.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Predict into a preallocated buffer, one value per feature row.
    ///
    /// `limit` restricts prediction to the first `limit` trees (e.g. the best
    /// iteration from early stopping); `None` uses all trees.
    pub fn predict_into(
        &self,
        features: ArrayView2<f32>,
        out: &mut [f32],
        limit: Option<usize>,
        parallelism: Parallelism,
    ) {
        assert_eq!(features.nrows(), out.len(), "output length mismatch");
        let n = limit.unwrap_or(self.trees.len()).min(self.trees.len());
        let trees = &self.trees[..n];

        let predict_one = |i: usize| {
            let row = features.row(i);
            let mut acc = self.base_score;
            for tree in trees {
                acc += tree.predict_row(row);
            }
            acc
        };

        if parallelism.is_parallel() {
            out.par_iter_mut()
                .enumerate()
                .for_each(|(i, o)| *o = predict_one(i));
        } else {
            for (i, o) in out.iter_mut().enumerate() {
                *o = predict_one(i);
            }
        }
    }

    /// Predict for all rows, allocating the output.
    pub fn predict(&self, features: ArrayView2<f32>, limit: Option<usize>) -> Vec<f32> {
        let mut out = vec![0.0; features.nrows()];
        self.predict_into(features, &mut out, limit, Parallelism::Sequential);
        out
    }
}
