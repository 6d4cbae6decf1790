//! Classification scores used to rank candidate pipelines.
use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{LabelerError, Result};

/// Scoring metric, selected by name in `design.json`. Higher is better for all.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    #[default]
    Accuracy,
    BalancedAccuracy,
    F1Macro,
    PrecisionMacro,
    RecallMacro,
}

impl FromStr for Scoring {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accuracy" => Ok(Scoring::Accuracy),
            "balanced_accuracy" => Ok(Scoring::BalancedAccuracy),
            "f1_macro" => Ok(Scoring::F1Macro),
            "precision_macro" => Ok(Scoring::PrecisionMacro),
            "recall_macro" => Ok(Scoring::RecallMacro),
            _ => Err(format!("Unknown scoring metric: {}", s)),
        }
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scoring::Accuracy => "accuracy",
            Scoring::BalancedAccuracy => "balanced_accuracy",
            Scoring::F1Macro => "f1_macro",
            Scoring::PrecisionMacro => "precision_macro",
            Scoring::RecallMacro => "recall_macro",
        };
        f.write_str(name)
    }
}

impl Scoring {
    pub fn score(&self, y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Result<f64> {
        if y_true.len() != y_pred.len() {
            return Err(LabelerError::invalid(format!(
                "label vectors differ in length: {} vs {}",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(LabelerError::invalid("cannot score an empty label vector"));
        }

        let score = match self {
            Scoring::Accuracy => accuracy(y_true, y_pred),
            Scoring::BalancedAccuracy => {
                let counts = ClassCounts::new(y_true, y_pred);
                // recall averaged over classes present in y_true
                let recalls: Vec<f64> = counts
                    .labels
                    .iter()
                    .filter(|&&k| counts.support[k] > 0)
                    .map(|&k| counts.recall(k))
                    .collect();
                recalls.iter().sum::<f64>() / recalls.len() as f64
            }
            Scoring::F1Macro => ClassCounts::new(y_true, y_pred).macro_average(|c, k| c.f1(k)),
            Scoring::PrecisionMacro => {
                ClassCounts::new(y_true, y_pred).macro_average(|c, k| c.precision(k))
            }
            Scoring::RecallMacro => {
                ClassCounts::new(y_true, y_pred).macro_average(|c, k| c.recall(k))
            }
        };
        Ok(score)
    }
}

/// Fraction of exact matches.
pub fn accuracy(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Per-class true positive / false positive / false negative tallies.
struct ClassCounts {
    tp: Vec<usize>,
    fp: Vec<usize>,
    support: Vec<usize>,
    /// Labels appearing in either vector, ascending.
    labels: Vec<usize>,
}

impl ClassCounts {
    fn new(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> Self {
        let n_classes = y_true
            .iter()
            .chain(y_pred.iter())
            .max()
            .map_or(0, |&m| m + 1);

        let mut tp = vec![0usize; n_classes];
        let mut fp = vec![0usize; n_classes];
        let mut support = vec![0usize; n_classes];
        let mut seen = vec![false; n_classes];

        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            support[t] += 1;
            seen[t] = true;
            seen[p] = true;
            if t == p {
                tp[t] += 1;
            } else {
                fp[p] += 1;
            }
        }

        let labels = (0..n_classes).filter(|&k| seen[k]).collect();
        ClassCounts {
            tp,
            fp,
            support,
            labels,
        }
    }

    fn precision(&self, k: usize) -> f64 {
        let predicted = self.tp[k] + self.fp[k];
        if predicted == 0 {
            0.0
        } else {
            self.tp[k] as f64 / predicted as f64
        }
    }

    fn recall(&self, k: usize) -> f64 {
        if self.support[k] == 0 {
            0.0
        } else {
            self.tp[k] as f64 / self.support[k] as f64
        }
    }

    fn f1(&self, k: usize) -> f64 {
        let p = self.precision(k);
        let r = self.recall(k);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    fn macro_average<F: Fn(&Self, usize) -> f64>(&self, metric: F) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        self.labels.iter().map(|&k| metric(self, k)).sum::<f64>() / self.labels.len() as f64
    }
}
