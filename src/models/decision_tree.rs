//! Classification tree with the Gini criterion.
//!
//! Fitting is delegated to `linfa-trees`; the fitted tree is then copied into
//! a flat node list so that prediction and (de)serialisation never recurse,
//! whatever the depth of the tree.

use linfa::traits::Fit;
use linfa::Dataset;
use linfa_trees::{DecisionTree as LinfaTree, SplitQuality, TreeNode};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{LabelerError, Result};
use crate::models::classifier_trait::{check_fit_input, check_width, Classifier};

/// One node of the flattened tree. Children are indices into the node list;
/// a row goes left when `row[feature_idx] < threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Maximum depth; `None` grows until leaves are pure or too small.
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    /// Root at index 0; empty until fitted.
    nodes: Vec<Node>,
    n_features: usize,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new(None, 1)
    }
}

impl DecisionTree {
    pub fn new(max_depth: Option<usize>, min_samples_leaf: usize) -> Self {
        Self {
            max_depth,
            min_samples_leaf,
            nodes: Vec::new(),
            n_features: 0,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Get tree depth; a lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some(Node::Split { left, right, .. }) = self.nodes.get(idx) {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        deepest
    }

    /// Get number of leaves
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    fn predict_row(&self, row: ArrayView1<f64>) -> Result<usize> {
        let mut idx = 0;
        // a well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(Node::Leaf { class }) => return Ok(*class),
                Some(Node::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row[*feature_idx] < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                None => break,
            }
        }
        Err(LabelerError::ModelUnavailable(
            "decision tree nodes do not lead to a leaf".to_string(),
        ))
    }
}

/// Copy a fitted linfa tree into a node list, root first.
fn flatten(root: &TreeNode<f64, usize>) -> Result<Vec<Node>> {
    let mut nodes: Vec<Node> = Vec::new();
    // (node, parent index, is left child)
    let mut pending: Vec<(&TreeNode<f64, usize>, Option<(usize, bool)>)> = vec![(root, None)];

    while let Some((node, parent)) = pending.pop() {
        let idx = nodes.len();
        if let Some((parent_idx, is_left)) = parent {
            if let Some(Node::Split { left, right, .. }) = nodes.get_mut(parent_idx) {
                if is_left {
                    *left = idx;
                } else {
                    *right = idx;
                }
            }
        }

        if node.is_leaf() {
            let class = node.prediction().ok_or_else(|| {
                LabelerError::invalid("decision tree leaf without a prediction")
            })?;
            nodes.push(Node::Leaf { class });
            continue;
        }

        let children = node.children();
        match (children[0].as_deref(), children[1].as_deref()) {
            (Some(left), Some(right)) => {
                let (feature_idx, threshold, _) = node.split();
                nodes.push(Node::Split {
                    feature_idx,
                    threshold,
                    left: idx,
                    right: idx,
                });
                pending.push((right, Some((idx, false))));
                pending.push((left, Some((idx, true))));
            }
            _ => {
                return Err(LabelerError::invalid(
                    "decision tree split without two children",
                ))
            }
        }
    }
    Ok(nodes)
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_fit_input(x, y)?;
        if self.min_samples_leaf == 0 {
            return Err(LabelerError::invalid("min_samples_leaf must be at least 1"));
        }
        if self.max_depth == Some(0) {
            return Err(LabelerError::invalid("max_depth must be at least 1"));
        }

        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let tree = LinfaTree::<f64, usize>::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(self.max_depth)
            .min_weight_leaf(self.min_samples_leaf as f32)
            .fit(&dataset)
            .map_err(|e| LabelerError::invalid(format!("decision tree failed: {}", e)))?;

        self.nodes = flatten(tree.root_node())?;
        self.n_features = x.ncols();

        log::trace!(
            "decision tree fitted: depth {}, {} leaves",
            self.depth(),
            self.n_leaves()
        );
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        if self.nodes.is_empty() {
            return Err(LabelerError::NotFitted);
        }
        check_width(self.n_features, x)?;
        x.axis_iter(Axis(0))
            .map(|row| self.predict_row(row))
            .collect::<Result<Vec<_>>>()
            .map(Array1::from)
    }

    fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classifier_simple() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = array![0usize, 0, 1, 1];

        let mut tree = DecisionTree::default();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.depth(), 1);
        assert!(matches!(tree.nodes()[0], Node::Split { feature_idx: 0, .. }));
    }

    #[test]
    fn test_max_depth() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![0usize, 1, 0, 1, 0, 1];

        let mut tree = DecisionTree::new(Some(2), 1);
        tree.fit(&x, &y).unwrap();

        assert!(tree.depth() <= 2);
    }

    #[test]
    fn min_samples_leaf_limits_splits() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0usize, 0, 0, 1];

        let mut tree = DecisionTree::new(None, 2);
        tree.fit(&x, &y).unwrap();

        // isolating the last row would leave one row in a leaf
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.predict(&array![[1.0]]).unwrap(), array![0usize]);
    }

    #[test]
    fn constant_features_give_a_single_leaf() {
        let x = array![[1.0], [1.0], [1.0]];
        let y = array![2usize, 2, 5];

        let mut tree = DecisionTree::default();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.predict(&array![[9.0]]).unwrap(), array![2usize]);
    }

    #[test]
    fn predict_before_fit_is_not_fitted() {
        let tree = DecisionTree::default();
        assert!(matches!(
            tree.predict(&array![[1.0]]),
            Err(LabelerError::NotFitted)
        ));
    }

    /// A chain of `n` splits, each peeling off one leaf on the left.
    fn chain(n: usize) -> DecisionTree {
        let mut nodes = Vec::with_capacity(2 * n + 1);
        for k in 0..n {
            let idx = 2 * k;
            nodes.push(Node::Split {
                feature_idx: 0,
                threshold: k as f64 + 0.5,
                left: idx + 1,
                right: idx + 2,
            });
            nodes.push(Node::Leaf { class: k % 2 });
        }
        nodes.push(Node::Leaf { class: n % 2 });

        let mut tree = DecisionTree::default();
        tree.nodes = nodes;
        tree.n_features = 1;
        tree
    }

    #[test]
    fn deep_tree_survives_json() {
        let tree = chain(400);
        assert_eq!(tree.depth(), 400);

        let json = serde_json::to_string(&tree).unwrap();
        let restored: DecisionTree = serde_json::from_str(&json).unwrap();

        let x = Array2::from_shape_fn((401, 1), |(i, _)| i as f64);
        let expected: Array1<usize> = (0..401).map(|i| i % 2).collect();
        assert_eq!(tree.predict(&x).unwrap(), expected);
        assert_eq!(restored.predict(&x).unwrap(), expected);
        assert_eq!(restored.nodes(), tree.nodes());
    }

    #[test]
    fn cyclic_nodes_are_rejected_at_predict() {
        let mut tree = chain(1);
        tree.nodes[0] = Node::Split {
            feature_idx: 0,
            threshold: 0.5,
            left: 0,
            right: 0,
        };
        assert!(matches!(
            tree.predict(&array![[0.0]]),
            Err(LabelerError::ModelUnavailable(_))
        ));
    }
}
