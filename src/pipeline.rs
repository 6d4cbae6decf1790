//! Scaler + estimator pipeline.
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::EstimatorParams;
use crate::error::{LabelerError, Result};
use crate::metrics::Scoring;
use crate::models::{Classifier, Estimator};
use crate::preprocessing::StandardScaler;

/// A standard scaler followed by one estimator. The scaler is fitted on the
/// training rows only and reused unchanged by `predict` and `score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    scaler: Option<StandardScaler>,
    estimator: Estimator,
    params: EstimatorParams,
}

impl Pipeline {
    pub fn new(params: EstimatorParams) -> Self {
        Pipeline {
            scaler: None,
            estimator: Estimator::new(&params),
            params,
        }
    }

    /// Replace the estimator configuration. Any fitted state is discarded.
    pub fn set_params(&mut self, params: EstimatorParams) {
        self.estimator.select(&params);
        self.scaler = None;
        self.params = params;
    }

    pub fn params(&self) -> &EstimatorParams {
        &self.params
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.scaler.is_some() && self.estimator.is_fitted()
    }

    /// Width of the rows the pipeline was fitted on.
    pub fn n_features(&self) -> Option<usize> {
        self.scaler.as_ref().map(StandardScaler::n_features)
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        // a failed fit must not leave a half-fitted pipeline behind
        self.scaler = None;
        self.estimator.select(&self.params);

        let (scaler, scaled) = StandardScaler::fit_transform(x)?;
        self.estimator.fit(&scaled, y)?;
        self.scaler = Some(scaler);
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let scaler = self.scaler.as_ref().ok_or(LabelerError::NotFitted)?;
        let scaled = scaler.transform(x)?;
        self.estimator.predict(&scaled)
    }

    pub fn score(&self, x: &Array2<f64>, y: &Array1<usize>, scoring: Scoring) -> Result<f64> {
        let predictions = self.predict(x)?;
        scoring.score(y, &predictions)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::new(EstimatorParams::default())
    }
}
