//! Durable storage for the selected pipeline.
//!
//! The artifact is one JSON document. Saving writes to a temporary file next
//! to the destination, syncs it and renames it into place, so a concurrent
//! reader sees either the previous model or the new one, never a torn write.
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::config::EstimatorParams;
use crate::error::{LabelerError, Result};
use crate::metrics::Scoring;
use crate::pipeline::Pipeline;

/// Everything needed to answer a prediction request without the training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedModel {
    pub pipeline: Pipeline,
    pub params: EstimatorParams,
    /// Class labels; predicted indices point into this list.
    pub classes: Vec<String>,
    pub feature_names: Vec<String>,
    pub n_features: usize,
    pub cv_score: f64,
    pub test_score: Option<f64>,
    pub scoring: Scoring,
    pub trained_at: DateTime<Utc>,
}

impl PersistedModel {
    /// Check that the artifact can serve predictions.
    pub fn validate(&self) -> Result<()> {
        if !self.pipeline.is_fitted() {
            return Err(LabelerError::ModelUnavailable(
                "stored pipeline is not fitted".to_string(),
            ));
        }
        if self.pipeline.n_features() != Some(self.n_features) {
            return Err(LabelerError::ModelUnavailable(format!(
                "stored pipeline expects {:?} features, artifact declares {}",
                self.pipeline.n_features(),
                self.n_features
            )));
        }
        if self.feature_names.len() != self.n_features {
            return Err(LabelerError::ModelUnavailable(format!(
                "{} feature names for {} features",
                self.feature_names.len(),
                self.n_features
            )));
        }
        if self.classes.is_empty() {
            return Err(LabelerError::ModelUnavailable(
                "stored model has no classes".to_string(),
            ));
        }
        if self.pipeline.params() != &self.params {
            return Err(LabelerError::ModelUnavailable(
                "stored parameters do not match the pipeline".to_string(),
            ));
        }
        Ok(())
    }

    /// Predict the label of one observation.
    pub fn predict_one(&self, values: &[f64]) -> Result<String> {
        if values.len() != self.n_features {
            return Err(LabelerError::FeatureArityMismatch {
                expected: self.n_features,
                actual: values.len(),
            });
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(LabelerError::invalid(format!(
                "feature values must be finite, got {}",
                bad
            )));
        }

        let x = Array2::from_shape_vec((1, values.len()), values.to_vec())
            .map_err(|e| LabelerError::invalid(e.to_string()))?;
        let predicted = self.pipeline.predict(&x)?;
        let index = predicted
            .first()
            .copied()
            .ok_or_else(|| LabelerError::invalid("estimator returned no prediction"))?;
        self.classes.get(index).cloned().ok_or_else(|| {
            LabelerError::ModelUnavailable(format!(
                "predicted class index {} is outside the stored class set",
                index
            ))
        })
    }
}

/// Location of a saved model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    pub path: PathBuf,
}

/// Reads and writes the model artifact at a fixed path.
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        ModelStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Atomically replace the stored artifact with `model`.
    ///
    /// The serialised bytes are parsed back before anything touches the
    /// destination, so a save either leaves a loadable artifact or fails.
    pub fn save(&self, model: &PersistedModel) -> Result<ModelHandle> {
        model.validate()?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let bytes = serde_json::to_vec_pretty(model).map_err(|e| LabelerError::Io(e.into()))?;
        // refuse to replace a good artifact with one that cannot be loaded
        serde_json::from_slice::<PersistedModel>(&bytes)
            .map_err(|e| {
                LabelerError::ModelUnavailable(format!("artifact would not load back: {}", e))
            })?
            .validate()?;

        let tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            writer.write_all(&bytes)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| LabelerError::Io(e.error))?;

        log::info!("Model saved to {}", self.path.display());
        Ok(ModelHandle {
            path: self.path.clone(),
        })
    }

    /// Load and validate the stored artifact.
    pub fn load(&self) -> Result<PersistedModel> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LabelerError::ModelUnavailable(format!(
                    "no trained model at {}",
                    self.path.display()
                )))
            }
            Err(e) => {
                return Err(LabelerError::ModelUnavailable(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let model: PersistedModel = serde_json::from_str(&content).map_err(|e| {
            LabelerError::ModelUnavailable(format!(
                "cannot parse {}: {}",
                self.path.display(),
                e
            ))
        })?;
        model.validate()?;
        Ok(model)
    }
}
