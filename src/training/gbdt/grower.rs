//! Depth-wise exact-greedy tree grower.
//!
//! Grows one regression tree from gradient/hessian pairs. Split finding is
//! exact: candidate features are sorted per node and every distinct threshold
//! is scanned. Stacked activation matrices are small, so no histogram binning
//! is needed.

use ndarray::ArrayView2;

use crate::repr::Tree;
use crate::training::objectives::GradHess;

use super::GainParams;

/// Parameters for a single tree growth.
#[derive(Clone, Debug)]
pub struct GrowerParams {
    pub gain: GainParams,
    pub learning_rate: f32,
    pub max_depth: u32,
}

/// Best split found for one node.
#[derive(Debug, Clone, Copy)]
struct SplitInfo {
    feature: usize,
    threshold: f32,
    gain: f64,
}

/// Grows one tree per call over a fixed feature matrix.
pub struct TreeGrower<'a> {
    features: ArrayView2<'a, f32>,
    params: GrowerParams,
}

impl<'a> TreeGrower<'a> {
    pub fn new(features: ArrayView2<'a, f32>, params: GrowerParams) -> Self {
        Self { features, params }
    }

    /// Grow a tree on all rows, splitting only on `columns`.
    ///
    /// Rows whose hessian was zeroed by subsampling contribute nothing to the
    /// statistics but are still routed through the tree.
    pub fn grow(&self, grad_hess: &[GradHess], columns: &[usize]) -> Tree {
        debug_assert_eq!(grad_hess.len(), self.features.nrows());
        let rows: Vec<u32> = (0..self.features.nrows() as u32).collect();

        let mut tree = Tree::new();
        let root = self.grow_node(&mut tree, &rows, 0, columns, grad_hess);
        tree.set_root(root);
        tree
    }

    fn grow_node(
        &self,
        tree: &mut Tree,
        rows: &[u32],
        depth: u32,
        columns: &[usize],
        grad_hess: &[GradHess],
    ) -> u32 {
        let (g_sum, h_sum) = Self::node_sums(rows, grad_hess);

        if depth >= self.params.max_depth || rows.len() < 2 {
            return tree.push_leaf(self.leaf_value(g_sum, h_sum));
        }

        match self.find_best_split(rows, columns, grad_hess, g_sum, h_sum) {
            None => tree.push_leaf(self.leaf_value(g_sum, h_sum)),
            Some(split) => {
                let (left_rows, right_rows): (Vec<u32>, Vec<u32>) = rows
                    .iter()
                    .partition(|&&r| self.features[[r as usize, split.feature]] < split.threshold);
                debug_assert!(!left_rows.is_empty() && !right_rows.is_empty());

                let left = self.grow_node(tree, &left_rows, depth + 1, columns, grad_hess);
                let right = self.grow_node(tree, &right_rows, depth + 1, columns, grad_hess);
                tree.push_split(split.feature as u32, split.threshold, left, right)
            }
        }
    }

    fn node_sums(rows: &[u32], grad_hess: &[GradHess]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(g, h), &r| {
            let gh = grad_hess[r as usize];
            (g + gh.grad as f64, h + gh.hess as f64)
        })
    }

    fn find_best_split(
        &self,
        rows: &[u32],
        columns: &[usize],
        grad_hess: &[GradHess],
        g_sum: f64,
        h_sum: f64,
    ) -> Option<SplitInfo> {
        let gain = &self.params.gain;
        let lambda = gain.reg_lambda as f64;
        let parent_score = g_sum * g_sum / (h_sum + lambda);

        let mut best: Option<SplitInfo> = None;
        let mut entries: Vec<(f32, f32, f32)> = Vec::with_capacity(rows.len());

        for &col in columns {
            entries.clear();
            entries.extend(rows.iter().map(|&r| {
                let gh = grad_hess[r as usize];
                (self.features[[r as usize, col]], gh.grad, gh.hess)
            }));
            entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut g_left = 0.0f64;
            let mut h_left = 0.0f64;
            for i in 1..entries.len() {
                g_left += entries[i - 1].1 as f64;
                h_left += entries[i - 1].2 as f64;

                // Equal feature values cannot be separated by a threshold.
                if entries[i].0 <= entries[i - 1].0 {
                    continue;
                }

                let g_right = g_sum - g_left;
                let h_right = h_sum - h_left;
                if h_left < gain.min_child_weight as f64 || h_right < gain.min_child_weight as f64 {
                    continue;
                }

                let split_gain = 0.5
                    * (g_left * g_left / (h_left + lambda) + g_right * g_right / (h_right + lambda)
                        - parent_score)
                    - gain.min_split_loss as f64;
                // Also rejects NaN from zero-hessian children under lambda=0.
                if !(split_gain > 0.0) {
                    continue;
                }

                if best.map_or(true, |b| split_gain > b.gain) {
                    best = Some(SplitInfo {
                        feature: col,
                        threshold: midpoint(entries[i - 1].0, entries[i].0),
                        gain: split_gain,
                    });
                }
            }
        }

        best
    }

    fn leaf_value(&self, g_sum: f64, h_sum: f64) -> f32 {
        let gain = &self.params.gain;
        let denom = h_sum + gain.reg_lambda as f64;
        if denom <= 0.0 {
            return 0.0;
        }
        let mut weight = -g_sum / denom;
        if gain.max_delta_step > 0.0 {
            let cap = gain.max_delta_step as f64;
            weight = weight.clamp(-cap, cap);
        }
        (self.params.learning_rate as f64 * weight) as f32
    }
}

/// Midpoint threshold between two adjacent sorted values.
fn midpoint(lo: f32, hi: f32) -> f32 {
    let mid = lo + (hi - lo) * 0.5;
    // Degenerate spacing: fall back to the upper value so `< threshold`
    // still separates the two rows.
    if mid > lo { mid } else { hi }
}
