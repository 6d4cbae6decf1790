use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{LabelerError, Result};
use crate::models::classifier_trait::{check_fit_input, check_width, unique_labels, Classifier};

/// Linear discriminant analysis with a shared, optionally shrunk covariance.
///
/// Fitting estimates class means, empirical priors and the pooled
/// within-class covariance `S`. With shrinkage `s`, `S` is replaced by
/// `(1 - s) * S + s * (tr(S) / p) * I`; a small ridge is always added to the
/// diagonal so classes with constant features still yield a solvable system.
/// Prediction picks the class maximising
/// `x' S^-1 mu_k - mu_k' S^-1 mu_k / 2 + ln(prior_k)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearDiscriminant {
    pub shrinkage: f64,
    classes: Vec<usize>,
    means: Option<Array2<f64>>,
    priors: Option<Array1<f64>>,
    coef: Option<Array2<f64>>,
    intercept: Option<Array1<f64>>,
}

impl LinearDiscriminant {
    const RIDGE: f64 = 1e-6;

    pub fn new(shrinkage: f64) -> Self {
        LinearDiscriminant {
            shrinkage,
            classes: Vec::new(),
            means: None,
            priors: None,
            coef: None,
            intercept: None,
        }
    }

    pub fn means(&self) -> Option<&Array2<f64>> {
        self.means.as_ref()
    }

    pub fn priors(&self) -> Option<&Array1<f64>> {
        self.priors.as_ref()
    }

    fn decision_function(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (coef, intercept) = match (&self.coef, &self.intercept) {
            (Some(coef), Some(intercept)) => (coef, intercept),
            _ => return Err(LabelerError::NotFitted),
        };
        check_width(coef.ncols(), x)?;
        Ok(x.dot(&coef.t()) + intercept)
    }
}

impl Default for LinearDiscriminant {
    fn default() -> Self {
        LinearDiscriminant::new(0.0)
    }
}

impl Classifier for LinearDiscriminant {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        check_fit_input(x, y)?;
        if !(0.0..=1.0).contains(&self.shrinkage) {
            return Err(LabelerError::invalid(format!(
                "LDA shrinkage must be in [0, 1], got {}",
                self.shrinkage
            )));
        }

        let classes = unique_labels(y);
        let (n, p) = x.dim();
        let k = classes.len();

        let mut means = Array2::<f64>::zeros((k, p));
        let mut counts = vec![0usize; k];
        let positions: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        for (row, &pos) in x.axis_iter(Axis(0)).zip(positions.iter()) {
            let mut mean = means.row_mut(pos);
            mean += &row;
            counts[pos] += 1;
        }
        for (mut mean, &count) in means.axis_iter_mut(Axis(0)).zip(counts.iter()) {
            mean /= count as f64;
        }

        let mut cov = Array2::<f64>::zeros((p, p));
        for (row, &pos) in x.axis_iter(Axis(0)).zip(positions.iter()) {
            let centred = &row - &means.row(pos);
            for a in 0..p {
                for b in 0..p {
                    cov[[a, b]] += centred[a] * centred[b];
                }
            }
        }
        let dof = n.saturating_sub(k).max(1) as f64;
        cov /= dof;

        let mu = cov.diag().sum() / p as f64;
        let target = if mu > 0.0 { mu } else { 1.0 };
        cov *= 1.0 - self.shrinkage;
        for i in 0..p {
            cov[[i, i]] += self.shrinkage * target + Self::RIDGE * target.max(1.0);
        }

        let chol = cholesky(&cov)
            .ok_or_else(|| LabelerError::invalid("LDA covariance is not positive definite"))?;

        let priors = Array1::from_iter(counts.iter().map(|&c| c as f64 / n as f64));
        let mut coef = Array2::<f64>::zeros((k, p));
        let mut intercept = Array1::<f64>::zeros(k);
        for c in 0..k {
            let mean = means.row(c).to_owned();
            let w = cholesky_solve(&chol, &mean);
            intercept[c] = -0.5 * mean.dot(&w) + priors[c].ln();
            coef.row_mut(c).assign(&w);
        }

        self.classes = classes;
        self.means = Some(means);
        self.priors = Some(priors);
        self.coef = Some(coef);
        self.intercept = Some(intercept);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let scores = self.decision_function(x)?;
        Ok(scores
            .axis_iter(Axis(0))
            .map(|row| self.classes[argmax(row.iter().copied())])
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.coef.is_some()
    }

    fn name(&self) -> &str {
        "linear_discriminant"
    }
}

/// Lower-triangular Cholesky factor of a symmetric positive-definite matrix.
fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    Some(l)
}

/// Solve `L L' x = b` by forward then backward substitution.
fn cholesky_solve(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    x
}

/// Index of the first maximum.
fn argmax<I: Iterator<Item = f64>>(values: I) -> usize {
    let mut best_idx = 0;
    let mut best = f64::NEG_INFINITY;
    for (idx, value) in values.enumerate() {
        if value > best {
            best = value;
            best_idx = idx;
        }
    }
    best_idx
}
