//! Entry points for the two external operations: training and prediction.
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{EstimatorParams, LabelerConfig};
use crate::data_handling::stratified_split;
use crate::error::Result;
use crate::io::read_dataset;
use crate::metrics::Scoring;
use crate::model_selection::GridSearch;
use crate::persistence::{ModelStore, PersistedModel};
use crate::pipeline::Pipeline;
use crate::predictor::Predictor;

/// Outcome of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Held-out score of the selected model, or its cross-validated score
    /// when the split left no rows for testing.
    pub accuracy: f64,
    pub cv_score: f64,
    pub test_score: Option<f64>,
    pub scoring: Scoring,
    pub params: EstimatorParams,
    pub n_train: usize,
    pub n_test: usize,
    pub model_path: PathBuf,
}

/// Load, split, search and persist.
pub struct TrainModelCommand {
    config: LabelerConfig,
}

impl TrainModelCommand {
    pub fn new(config: &LabelerConfig) -> Self {
        TrainModelCommand {
            config: config.clone(),
        }
    }

    pub fn execute(&self) -> Result<TrainingReport> {
        let design = &self.config.design;

        let data = read_dataset(&self.config.data.path, &self.config.data)?;
        data.log_summary();

        let split = stratified_split(&data, design.n_samples, design.test_fraction, design.seed)?;

        log::info!("Training model");
        let search = GridSearch::new(
            Pipeline::default(),
            self.config.models.candidates(),
            design.cv,
            design.scoring,
            design.seed,
        );
        let result = search.fit(&split.train, Some(&split.test))?;

        let accuracy = match result.test_score {
            Some(score) => score,
            None => {
                log::warn!(
                    "Test split is empty; reporting the cross-validated {} instead",
                    design.scoring
                );
                result.cv_score
            }
        };

        let persisted = PersistedModel {
            n_features: data.n_features(),
            feature_names: data.feature_names.clone(),
            classes: data.classes.clone(),
            params: result.params.clone(),
            pipeline: result.pipeline,
            cv_score: result.cv_score,
            test_score: result.test_score,
            scoring: design.scoring,
            trained_at: Utc::now(),
        };
        let handle = ModelStore::new(&self.config.model_path).save(&persisted)?;

        Ok(TrainingReport {
            accuracy,
            cv_score: result.cv_score,
            test_score: result.test_score,
            scoring: design.scoring,
            params: result.params,
            n_train: split.train.n_samples(),
            n_test: split.test.n_samples(),
            model_path: handle.path,
        })
    }
}

/// Inference request body, e.g. `{"Values": [5.1, 3.5, 1.4, 0.2]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "Values")]
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(rename = "Predicted class")]
    pub predicted_class: String,
}

/// Answer one inference request from the persisted model.
pub struct PredictCommand {
    predictor: Predictor,
}

impl PredictCommand {
    pub fn new(config: &LabelerConfig) -> Self {
        PredictCommand {
            predictor: Predictor::new(ModelStore::new(&config.model_path)),
        }
    }

    pub fn execute(&self, request: &PredictRequest) -> Result<PredictResponse> {
        let predicted_class = self.predictor.predict(&request.values)?;
        log::info!("Predicted class: {}", predicted_class);
        Ok(PredictResponse { predicted_class })
    }
}
