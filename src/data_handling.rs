//! In-memory labelled datasets and the stratified train/test splitter.
//!
//! A `Dataset` keeps features as a dense `Array2<f64>` and labels as indices
//! into an ordered class list, so estimators only ever see `usize` labels and
//! the label strings are resolved once at the edges (loading and prediction).
use std::collections::BTreeSet;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{LabelerError, Result};

#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature matrix, one row per observation.
    pub x: Array2<f64>,
    /// Class index per row, pointing into `classes`.
    pub y: Array1<usize>,
    /// Ordered class labels.
    pub classes: Vec<String>,
    pub feature_names: Vec<String>,
}

impl Dataset {
    pub fn new(
        x: Array2<f64>,
        y: Array1<usize>,
        classes: Vec<String>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(LabelerError::invalid(format!(
                "feature matrix has {} rows but {} labels were given",
                x.nrows(),
                y.len()
            )));
        }
        if feature_names.len() != x.ncols() {
            return Err(LabelerError::invalid(format!(
                "{} feature names for {} feature columns",
                feature_names.len(),
                x.ncols()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&label| label >= classes.len()) {
            return Err(LabelerError::invalid(format!(
                "label index {} out of range for {} classes",
                bad,
                classes.len()
            )));
        }

        Ok(Dataset {
            x,
            y,
            classes,
            feature_names,
        })
    }

    /// Build a dataset from row vectors and string labels. The class set is
    /// discovered from the labels and sorted.
    pub fn from_rows<S: AsRef<str>>(
        rows: &[Vec<f64>],
        labels: &[S],
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if rows.len() != labels.len() {
            return Err(LabelerError::invalid(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        let n_features = feature_names.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(LabelerError::invalid(format!(
                "row {} has {} values, expected {}",
                idx,
                row.len(),
                n_features
            )));
        }

        let classes: Vec<String> = labels
            .iter()
            .map(|l| l.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let y = labels
            .iter()
            .map(|l| {
                // present by construction
                classes
                    .binary_search_by(|c| c.as_str().cmp(l.as_ref()))
                    .unwrap_or_default()
            })
            .collect::<Array1<usize>>();

        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let x = Array2::from_shape_vec((rows.len(), n_features), flat)
            .map_err(|e| LabelerError::invalid(e.to_string()))?;

        Dataset::new(x, y, classes, feature_names)
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples() == 0
    }

    /// Number of rows per class, indexed like `classes`.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &label in self.y.iter() {
            counts[label] += 1;
        }
        counts
    }

    /// Row indices grouped by class, in source order.
    pub fn class_indices(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.classes.len()];
        for (row, &label) in self.y.iter().enumerate() {
            groups[label].push(row);
        }
        groups
    }

    /// New dataset holding the given rows, in the given order. The class list
    /// and feature names are kept as-is.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            classes: self.classes.clone(),
            feature_names: self.feature_names.clone(),
        }
    }

    pub fn class_label(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn log_summary(&self) {
        log::info!(
            "Dataset: {} rows, {} features, {} classes",
            self.n_samples(),
            self.n_features(),
            self.n_classes()
        );
        for (class, count) in self.classes.iter().zip(self.class_counts()) {
            log::debug!("  class '{}': {} rows", class, count);
        }
    }
}

/// Train/test partition of one source dataset.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
    /// Source rows in `train`, in train order.
    pub train_indices: Vec<usize>,
    /// Source rows in `test`, ascending.
    pub test_indices: Vec<usize>,
}

/// Split `data` into train and test sets, preserving class proportions.
///
/// At most `max_samples` rows go to training. When `max_samples` would take
/// every row, `floor(n * test_fraction)` rows are held out instead. Each class
/// receives a share of the training budget proportional to its frequency,
/// rounded by largest remainder so the shares sum exactly to the budget.
///
/// # Errors
///
/// * `DataUnavailable` if `data` is empty.
/// * `InsufficientData` if a class ends up with no training rows.
pub fn stratified_split(
    data: &Dataset,
    max_samples: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<Split> {
    let n = data.n_samples();
    if n == 0 {
        return Err(LabelerError::DataUnavailable(
            "cannot split an empty dataset".to_string(),
        ));
    }

    let budget = if max_samples < n {
        max_samples
    } else {
        let held_out = (n as f64 * test_fraction.clamp(0.0, 1.0)).floor() as usize;
        n - held_out.min(n)
    };

    let counts = data.class_counts();
    let quotas = apportion(&counts, budget, n);

    if let Some(empty) = quotas.iter().position(|&q| q == 0) {
        return Err(LabelerError::InsufficientData {
            class: data.classes[empty].clone(),
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_indices = Vec::with_capacity(budget);
    let mut test_indices = Vec::with_capacity(n - budget);

    for (mut rows, &quota) in data.class_indices().into_iter().zip(quotas.iter()) {
        rows.shuffle(&mut rng);
        train_indices.extend_from_slice(&rows[..quota]);
        test_indices.extend_from_slice(&rows[quota..]);
    }

    train_indices.shuffle(&mut rng);
    test_indices.sort_unstable();

    log::info!(
        "Stratified split: {} train rows, {} test rows (seed {})",
        train_indices.len(),
        test_indices.len(),
        seed
    );

    Ok(Split {
        train: data.select(&train_indices),
        test: data.select(&test_indices),
        train_indices,
        test_indices,
    })
}

/// Largest-remainder apportionment of `budget` rows over classes with
/// `counts`, proportional to `count / total`. Ties on the remainder go to the
/// lower class index.
fn apportion(counts: &[usize], budget: usize, total: usize) -> Vec<usize> {
    let mut quotas = Vec::with_capacity(counts.len());
    let mut remainders = Vec::with_capacity(counts.len());

    for (k, &count) in counts.iter().enumerate() {
        let exact = count * budget;
        quotas.push(exact / total);
        remainders.push((exact % total, k));
    }

    let assigned: usize = quotas.iter().sum();
    let mut leftover = budget.saturating_sub(assigned);

    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, k) in &remainders {
        if leftover == 0 {
            break;
        }
        if quotas[k] < counts[k] {
            quotas[k] += 1;
            leftover -= 1;
        }
    }

    quotas
}
