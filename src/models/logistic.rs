use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{LabelerError, Result};
use crate::models::classifier_trait::{check_fit_input, check_width, unique_labels, Classifier};

/// Multinomial logistic regression with an L2 penalty, backed by
/// `linfa-logistic`.
///
/// `c` is the inverse regularisation strength; it is handed to linfa as
/// `alpha = 1 / c`, which matches the usual `C`-parameterised objective up to a
/// constant factor. The intercept is not penalised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Inverse regularisation strength; must be positive.
    pub c: f64,
    pub max_iter: usize,
    /// Gradient tolerance passed to the solver.
    pub tol: f64,
    classes: Vec<usize>,
    n_features: usize,
    model: Option<MultiFittedLogisticRegression<f64, usize>>,
}

impl LogisticRegression {
    pub fn new(c: f64, max_iter: usize, tol: f64) -> Self {
        LogisticRegression {
            c,
            max_iter,
            tol,
            classes: Vec::new(),
            n_features: 0,
            model: None,
        }
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        LogisticRegression::new(1.0, 1000, 1e-6)
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_fit_input(x, y)?;
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(LabelerError::invalid(format!(
                "logistic regression C must be positive, got {}",
                self.c
            )));
        }
        if self.max_iter == 0 {
            return Err(LabelerError::invalid("logistic regression max_iter must be positive"));
        }

        let classes = unique_labels(y);
        if classes.len() < 2 {
            return Err(LabelerError::invalid(format!(
                "logistic regression needs at least two classes, got {}",
                classes.len()
            )));
        }

        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let model = MultiLogisticRegression::<f64>::default()
            .alpha(1.0 / self.c)
            .max_iterations(self.max_iter as u64)
            .gradient_tolerance(self.tol)
            .fit(&dataset)
            .map_err(|e| LabelerError::invalid(format!("logistic regression failed: {}", e)))?;

        log::trace!(
            "logistic regression fitted: C={}, {} classes",
            self.c,
            classes.len()
        );
        self.classes = classes;
        self.n_features = x.ncols();
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let model = self.model.as_ref().ok_or(LabelerError::NotFitted)?;
        check_width(self.n_features, x)?;
        let predicted: Array1<usize> = model.predict(x);
        Ok(predicted)
    }

    fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}
