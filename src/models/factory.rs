use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::{EstimatorKind, EstimatorParams};
use crate::error::Result;
use crate::models::classifier_trait::Classifier;
use crate::models::decision_tree::DecisionTree;
use crate::models::lda::LinearDiscriminant;
use crate::models::logistic::LogisticRegression;

/// The estimator slot of a pipeline. The set of families is closed, so
/// switching kinds is a matter of replacing the variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "model", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    LinearDiscriminant(LinearDiscriminant),
}

impl Estimator {
    /// Build an unfitted estimator from a `EstimatorParams`.
    pub fn new(params: &EstimatorParams) -> Self {
        match *params {
            EstimatorParams::LogisticRegression { c, max_iter, tol } => {
                Estimator::LogisticRegression(LogisticRegression::new(c, max_iter, tol))
            }
            EstimatorParams::DecisionTree {
                max_depth,
                min_samples_leaf,
            } => Estimator::DecisionTree(DecisionTree::new(max_depth, min_samples_leaf)),
            EstimatorParams::LinearDiscriminant { shrinkage } => {
                Estimator::LinearDiscriminant(LinearDiscriminant::new(shrinkage))
            }
        }
    }

    /// Swap in a fresh estimator for `params`, dropping any fitted state.
    pub fn select(&mut self, params: &EstimatorParams) {
        *self = Estimator::new(params);
    }

    pub fn kind(&self) -> EstimatorKind {
        match self {
            Estimator::LogisticRegression(_) => EstimatorKind::LogisticRegression,
            Estimator::DecisionTree(_) => EstimatorKind::DecisionTree,
            Estimator::LinearDiscriminant(_) => EstimatorKind::LinearDiscriminant,
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Estimator::LogisticRegression(model) => model,
            Estimator::DecisionTree(model) => model,
            Estimator::LinearDiscriminant(model) => model,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            Estimator::LogisticRegression(model) => model,
            Estimator::DecisionTree(model) => model,
            Estimator::LinearDiscriminant(model) => model,
        }
    }
}

impl Default for Estimator {
    fn default() -> Self {
        Estimator::new(&EstimatorParams::default())
    }
}

impl Classifier for Estimator {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        self.inner().predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}
