use ndarray::{Array1, Array2};

use crate::error::{LabelerError, Result};
use crate::metrics::accuracy;

/// Common contract for the concrete estimators the pipeline can switch
/// between. Labels are class indices; each implementation predicts only the
/// indices it saw during `fit`.
pub trait Classifier {
    /// Fit on rows of `x` with labels `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>;

    /// Predict one class index per row. Fails with `NotFitted` before `fit`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>>;

    /// Mean accuracy on `x` against `y`.
    fn score(&self, x: &Array2<f64>, y: &Array1<usize>) -> Result<f64> {
        let predictions = self.predict(x)?;
        if predictions.len() != y.len() {
            return Err(LabelerError::invalid("prediction and label lengths differ"));
        }
        Ok(accuracy(y, &predictions))
    }

    fn is_fitted(&self) -> bool;

    /// Human readable name for logs.
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Shared argument checks for `fit`.
pub(crate) fn check_fit_input(x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
    if x.nrows() == 0 {
        return Err(LabelerError::invalid("cannot fit on zero rows"));
    }
    if x.nrows() != y.len() {
        return Err(LabelerError::invalid(format!(
            "x has {} rows but y has {} labels",
            x.nrows(),
            y.len()
        )));
    }
    Ok(())
}

/// Distinct labels of `y`, ascending.
pub(crate) fn unique_labels(y: &Array1<usize>) -> Vec<usize> {
    let mut labels: Vec<usize> = y.to_vec();
    labels.sort_unstable();
    labels.dedup();
    labels
}

pub(crate) fn check_width(expected: usize, x: &Array2<f64>) -> Result<()> {
    if x.ncols() != expected {
        return Err(LabelerError::FeatureArityMismatch {
            expected,
            actual: x.ncols(),
        });
    }
    Ok(())
}
