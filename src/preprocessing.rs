//! Feature standardisation.
//!
//! `StandardScaler` learns per-column mean and population standard deviation
//! from training rows and maps every later row through `(x - mean) / std`.
//! Columns that are constant in the training data keep a scale of 1, so they
//! are centred but never divided by zero.
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{LabelerError, Result};

/// Per-column mean/std standardisation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    pub scale: Array1<f64>,
}

impl StandardScaler {
    /// Relative threshold under which a column is treated as constant.
    const CONSTANT_TOL: f64 = 1e-12;

    /// Fit from a matrix where rows are samples and columns are features.
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let (nrows, ncols) = x.dim();
        if nrows == 0 || ncols == 0 {
            return Err(LabelerError::invalid(format!(
                "cannot fit a scaler on a {}x{} matrix",
                nrows, ncols
            )));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(LabelerError::invalid("feature matrix contains NaN or infinite values"));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| LabelerError::invalid("empty feature matrix"))?;

        let mut scale = Array1::zeros(ncols);
        for (c, column) in x.axis_iter(Axis(1)).enumerate() {
            let mu = mean[c];
            let var = column.iter().map(|&v| (v - mu).powi(2)).sum::<f64>() / nrows as f64;
            let std = var.sqrt();
            scale[c] = if std <= Self::CONSTANT_TOL * mu.abs().max(1.0) {
                1.0
            } else {
                std
            };
        }

        Ok(StandardScaler { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(LabelerError::FeatureArityMismatch {
                expected: self.n_features(),
                actual: x.ncols(),
            });
        }
        Ok((x - &self.mean) / &self.scale)
    }

    pub fn fit_transform(x: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(x)?;
        let transformed = scaler.transform(x)?;
        Ok((scaler, transformed))
    }
}
