use rayon::prelude::*;
use serde::Serialize;

use crate::config::EstimatorParams;
use crate::data_handling::Dataset;
use crate::error::{LabelerError, Result};
use crate::metrics::Scoring;
use crate::model_selection::cv::StratifiedKFold;
use crate::model_selection::grid::Candidate;
use crate::pipeline::Pipeline;

/// Cross-validated outcome of one hyper-parameter combination.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub params: EstimatorParams,
    /// Mean over the successful folds; `None` when every fold failed.
    pub mean_score: Option<f64>,
    pub fold_scores: Vec<f64>,
    pub failed_folds: usize,
}

/// The refitted winner of a grid search.
#[derive(Debug, Clone)]
pub struct SelectionResult {
    pub pipeline: Pipeline,
    pub params: EstimatorParams,
    pub cv_score: f64,
    /// Score on the held-out rows, if any were supplied.
    pub test_score: Option<f64>,
    /// Every evaluated combination, in candidate order.
    pub evaluations: Vec<CandidateScore>,
}

/// Exhaustive search over candidate estimators and their grids, ranked by
/// stratified K-fold cross-validation.
#[derive(Debug, Clone)]
pub struct GridSearch {
    prototype: Pipeline,
    candidates: Vec<Candidate>,
    n_folds: usize,
    scoring: Scoring,
    seed: u64,
}

struct FoldData {
    train: Dataset,
    validation: Dataset,
}

impl GridSearch {
    pub fn new(
        pipeline: Pipeline,
        candidates: Vec<Candidate>,
        n_folds: usize,
        scoring: Scoring,
        seed: u64,
    ) -> Self {
        GridSearch {
            prototype: pipeline,
            candidates,
            n_folds,
            scoring,
            seed,
        }
    }

    /// Expand every candidate grid, in candidate order.
    fn settings(&self) -> Result<Vec<EstimatorParams>> {
        let mut settings = Vec::new();
        for candidate in &self.candidates {
            settings.extend(candidate.params()?);
        }
        Ok(settings)
    }

    /// Evaluate every combination on the same folds of `train`, refit the best
    /// one on all of `train` and score it on `test` when that is non-empty.
    ///
    /// # Errors
    ///
    /// * `NoCandidates` if there is nothing to evaluate.
    /// * `InvalidInput` if a grid names an unknown hyper-parameter.
    /// * `TrainingFailed` if no combination completes a fold, or the refit fails.
    pub fn fit(&self, train: &Dataset, test: Option<&Dataset>) -> Result<SelectionResult> {
        if self.candidates.is_empty() {
            return Err(LabelerError::NoCandidates);
        }
        let settings = self.settings()?;
        if settings.is_empty() {
            return Err(LabelerError::NoCandidates);
        }
        if train.is_empty() {
            return Err(LabelerError::DataUnavailable(
                "training split has no rows".to_string(),
            ));
        }

        let folds: Vec<FoldData> = StratifiedKFold::new(self.n_folds, self.seed)
            .split(train)
            .into_iter()
            .map(|fold| FoldData {
                train: train.select(&fold.train),
                validation: train.select(&fold.validation),
            })
            .collect();

        log::info!(
            "Grid search: {} combinations x {} folds, scoring={}",
            settings.len(),
            folds.len(),
            self.scoring
        );

        let outcomes: Vec<(CandidateScore, Option<LabelerError>)> = settings
            .par_iter()
            .map(|params| self.evaluate(params, &folds))
            .collect();

        let mut evaluations = Vec::with_capacity(outcomes.len());
        let mut first_error = None;
        let mut failures = 0usize;
        for (evaluation, error) in outcomes {
            failures += evaluation.failed_folds;
            if first_error.is_none() {
                first_error = error;
            }
            evaluations.push(evaluation);
        }

        let mut best: Option<(usize, f64)> = None;
        for (idx, evaluation) in evaluations.iter().enumerate() {
            if let Some(score) = evaluation.mean_score {
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((idx, score));
                }
            }
        }

        let (best_idx, cv_score) = match best {
            Some(best) => best,
            None => {
                let cause = first_error
                    .unwrap_or_else(|| LabelerError::invalid("no fold could be evaluated"));
                return Err(LabelerError::training_failed(failures, cause));
            }
        };
        let params = evaluations[best_idx].params.clone();
        log::info!("Best combination: {} ({}={:.4})", params, self.scoring, cv_score);

        let mut pipeline = self.prototype.clone();
        pipeline.set_params(params.clone());
        pipeline
            .fit(&train.x, &train.y)
            .map_err(|e| LabelerError::training_failed(1, e))?;

        let test_score = match test {
            Some(test) if !test.is_empty() => {
                let score = pipeline.score(&test.x, &test.y, self.scoring)?;
                log::info!("Held-out {}: {:.4} on {} rows", self.scoring, score, test.n_samples());
                Some(score)
            }
            _ => None,
        };

        Ok(SelectionResult {
            pipeline,
            params,
            cv_score,
            test_score,
            evaluations,
        })
    }

    /// Score one combination on every fold. Failed folds are logged and
    /// left out of the mean; the first failure is handed back to the caller.
    fn evaluate(
        &self,
        params: &EstimatorParams,
        folds: &[FoldData],
    ) -> (CandidateScore, Option<LabelerError>) {
        let mut pipeline = self.prototype.clone();
        pipeline.set_params(params.clone());

        let mut fold_scores = Vec::with_capacity(folds.len());
        let mut failed_folds = 0usize;
        let mut first_error = None;

        for (idx, fold) in folds.iter().enumerate() {
            let outcome = pipeline
                .fit(&fold.train.x, &fold.train.y)
                .and_then(|_| {
                    pipeline.score(&fold.validation.x, &fold.validation.y, self.scoring)
                });
            match outcome {
                Ok(score) => fold_scores.push(score),
                Err(e) => {
                    log::warn!("{} failed on fold {}: {}", params, idx, e);
                    failed_folds += 1;
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        let mean_score = if fold_scores.is_empty() {
            None
        } else {
            Some(fold_scores.iter().sum::<f64>() / fold_scores.len() as f64)
        };
        match mean_score {
            Some(score) => log::debug!("{}: mean {}={:.4}", params, self.scoring, score),
            None => log::warn!("{}: every fold failed, skipping", params),
        }

        (
            CandidateScore {
                params: params.clone(),
                mean_score,
                fold_scores,
                failed_folds,
            },
            first_error,
        )
    }
}
