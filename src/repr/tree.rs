//! Single regression tree with flat node storage.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// A node in a [`Tree`].
///
/// Nodes are stored in a flat vector; `left`/`right` are indices into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Internal split node: rows with `x[feature] < threshold` go left.
    Split {
        feature: u32,
        threshold: f32,
        left: u32,
        right: u32,
    },
    /// Terminal node. The value already includes learning-rate shrinkage.
    Leaf { value: f32 },
}

/// Regression tree.
///
/// Built bottom-up by the grower: children are pushed before their parent,
/// and the root is recorded explicitly once growth finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
    root: u32,
}

impl Tree {
    /// Create an empty tree. [`set_root`](Self::set_root) must be called
    /// before prediction.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: 0,
        }
    }

    /// Create a single-leaf tree.
    pub fn leaf(value: f32) -> Self {
        Self {
            nodes: vec![Node::Leaf { value }],
            root: 0,
        }
    }

    /// Append a leaf node, returning its index.
    pub fn push_leaf(&mut self, value: f32) -> u32 {
        self.nodes.push(Node::Leaf { value });
        (self.nodes.len() - 1) as u32
    }

    /// Append a split node, returning its index.
    ///
    /// `left` and `right` must already be valid node indices.
    pub fn push_split(&mut self, feature: u32, threshold: f32, left: u32, right: u32) -> u32 {
        debug_assert!((left as usize) < self.nodes.len());
        debug_assert!((right as usize) < self.nodes.len());
        self.nodes.push(Node::Split {
            feature,
            threshold,
            left,
            right,
        });
        (self.nodes.len() - 1) as u32
    }

    /// Record the root node index.
    pub fn set_root(&mut self, root: u32) {
        debug_assert!((root as usize) < self.nodes.len());
        self.root = root;
    }

    /// Number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf nodes.
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Predict the tree output for a single feature row.
    ///
    /// Comparisons with NaN are false, so NaN feature values fall right.
    #[inline]
    pub fn predict_row(&self, row: ArrayView1<f32>) -> f32 {
        let mut idx = self.root;
        loop {
            match self.nodes[idx as usize] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[feature as usize] < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump() -> Tree {
        // x[0] < 0.5 -> -1.0, else 1.0
        let mut tree = Tree::new();
        let left = tree.push_leaf(-1.0);
        let right = tree.push_leaf(1.0);
        let root = tree.push_split(0, 0.5, left, right);
        tree.set_root(root);
        tree
    }

    #[test]
    fn leaf_tree_predicts_constant() {
        let tree = Tree::leaf(0.25);
        let row = array![1.0f32, 2.0];
        assert_eq!(tree.predict_row(row.view()), 0.25);
    }

    #[test]
    fn stump_routes_rows() {
        let tree = stump();
        assert_eq!(tree.predict_row(array![0.0f32].view()), -1.0);
        assert_eq!(tree.predict_row(array![1.0f32].view()), 1.0);
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn nan_falls_right() {
        let tree = stump();
        assert_eq!(tree.predict_row(array![f32::NAN].view()), 1.0);
    }

    #[test]
    fn tree_serde_round_trip() {
        let tree = stump();
        let json = serde_json::to_string(&tree).unwrap();
        let back: Tree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
